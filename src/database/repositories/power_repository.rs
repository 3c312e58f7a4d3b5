use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{ActiveTarget, Power, PowerType};

#[derive(Clone)]
pub struct PowerRepository {
    pool: SqlitePool,
}

impl PowerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert keyed by the unique source event. Returns None when a power
    /// for this event already exists (lost the at-most-once race).
    pub async fn create(
        &self,
        squad_id: Uuid,
        holder_member_id: &str,
        power_type: PowerType,
        source_event_id: Uuid,
        granted_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<Power>> {
        let power = sqlx::query_as::<_, Power>(
            r#"
            INSERT INTO powers
                (id, squad_id, holder_member_id, power_type, source_event_id, granted_at, expires_at)
            VALUES
                (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (source_event_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(squad_id)
        .bind(holder_member_id)
        .bind(power_type)
        .bind(source_event_id)
        .bind(granted_at)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(power)
    }

    pub async fn get_by_id(&self, power_id: Uuid) -> Result<Option<Power>> {
        let power = sqlx::query_as::<_, Power>("SELECT * FROM powers WHERE id = ?1")
            .bind(power_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(power)
    }

    pub async fn get_by_source_event(&self, event_id: Uuid) -> Result<Option<Power>> {
        let power = sqlx::query_as::<_, Power>("SELECT * FROM powers WHERE source_event_id = ?1")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(power)
    }

    /// Compare-and-swap on the single-use marker. The `used_at IS NULL`
    /// predicate is what serializes concurrent use attempts: exactly one
    /// update hits a row, every other caller gets None back.
    pub async fn mark_used(
        &self,
        power_id: Uuid,
        used_at: DateTime<Utc>,
        metadata: Option<&str>,
    ) -> Result<Option<Power>> {
        let power = sqlx::query_as::<_, Power>(
            r#"
            UPDATE powers
            SET used_at = ?2, metadata = ?3
            WHERE id = ?1 AND used_at IS NULL
            RETURNING *
            "#,
        )
        .bind(power_id)
        .bind(used_at)
        .bind(metadata)
        .fetch_optional(&self.pool)
        .await?;

        Ok(power)
    }

    /// Target-lock use: the CAS and the ActiveTarget insert commit together,
    /// so a successful use always carries its target row and a lost race
    /// leaves nothing behind.
    pub async fn mark_used_with_target(
        &self,
        power_id: Uuid,
        used_at: DateTime<Utc>,
        metadata: Option<&str>,
        squad_id: Uuid,
        targeter_member_id: &str,
        target_member_id: &str,
    ) -> Result<Option<(Power, ActiveTarget)>> {
        let mut tx = self.pool.begin().await?;

        let power = sqlx::query_as::<_, Power>(
            r#"
            UPDATE powers
            SET used_at = ?2, metadata = ?3
            WHERE id = ?1 AND used_at IS NULL
            RETURNING *
            "#,
        )
        .bind(power_id)
        .bind(used_at)
        .bind(metadata)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(power) = power else {
            tx.rollback().await?;
            return Ok(None);
        };

        let target = sqlx::query_as::<_, ActiveTarget>(
            r#"
            INSERT INTO active_targets
                (id, power_id, squad_id, targeter_member_id, target_member_id, created_at)
            VALUES
                (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(power_id)
        .bind(squad_id)
        .bind(targeter_member_id)
        .bind(target_member_id)
        .bind(used_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some((power, target)))
    }

    pub async fn get_target_by_power(&self, power_id: Uuid) -> Result<Option<ActiveTarget>> {
        let target =
            sqlx::query_as::<_, ActiveTarget>("SELECT * FROM active_targets WHERE power_id = ?1")
                .bind(power_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(target)
    }

    /// Unused, unexpired powers for a squad, newest grant first.
    pub async fn active_powers(&self, squad_id: Uuid, now: DateTime<Utc>) -> Result<Vec<Power>> {
        let powers = sqlx::query_as::<_, Power>(
            r#"
            SELECT * FROM powers
            WHERE squad_id = ?1 AND used_at IS NULL AND expires_at > ?2
            ORDER BY granted_at DESC
            "#,
        )
        .bind(squad_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(powers)
    }
}
