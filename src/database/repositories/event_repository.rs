use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{CreateEventInput, DailyEvent};

use super::submission_repository::RANK_ASSIGNMENT_SQL;

#[derive(Clone)]
pub struct EventRepository {
    pool: SqlitePool,
}

impl EventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_event(&self, input: &CreateEventInput, now: DateTime<Utc>) -> Result<DailyEvent> {
        let event = sqlx::query_as::<_, DailyEvent>(
            r#"
            INSERT INTO daily_events
                (id, squad_id, event_date, event_type, status, open_at, close_at, created_at, updated_at)
            VALUES
                (?1, ?2, ?3, ?4, 'scheduled', ?5, ?6, ?7, ?7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.squad_id)
        .bind(input.event_date)
        .bind(input.event_type)
        .bind(input.open_at)
        .bind(input.close_at)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    pub async fn get_event(&self, event_id: Uuid) -> Result<Option<DailyEvent>> {
        let event = sqlx::query_as::<_, DailyEvent>("SELECT * FROM daily_events WHERE id = ?1")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// scheduled -> open, setting the judge in the same guarded statement.
    /// Returns None when the event is no longer in `scheduled`.
    pub async fn open_event(
        &self,
        event_id: Uuid,
        judge_member_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DailyEvent>> {
        let event = sqlx::query_as::<_, DailyEvent>(
            r#"
            UPDATE daily_events
            SET status = 'open', judge_member_id = ?2, updated_at = ?3
            WHERE id = ?1 AND status = 'scheduled'
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(judge_member_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// open -> closed plus the rank assignment, in one transaction. Any
    /// submission that did not commit before the status flip sees a closed
    /// event and is rejected, so nothing arriving later is ever ranked.
    pub async fn close_and_rank(
        &self,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<DailyEvent>> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, DailyEvent>(
            r#"
            UPDATE daily_events
            SET status = 'closed', updated_at = ?2
            WHERE id = ?1 AND status = 'open'
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(event) = event else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(RANK_ASSIGNMENT_SQL)
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(event))
    }

    /// closed -> finalized. The guarded update is the at-most-once gate for
    /// every downstream side effect; None means this call lost the flip.
    pub async fn finalize_event(
        &self,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<DailyEvent>> {
        let event = sqlx::query_as::<_, DailyEvent>(
            r#"
            UPDATE daily_events
            SET status = 'finalized', updated_at = ?2
            WHERE id = ?1 AND status = 'closed'
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    pub async fn get_events_for_squad(&self, squad_id: Uuid) -> Result<Vec<DailyEvent>> {
        let events = sqlx::query_as::<_, DailyEvent>(
            "SELECT * FROM daily_events WHERE squad_id = ?1 ORDER BY event_date DESC",
        )
        .bind(squad_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
