use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{Crown, Headline, Rivalry};

#[derive(Clone)]
pub struct CrownRepository {
    pool: SqlitePool,
}

impl CrownRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert keyed by (squad, event). None means a crown for this event
    /// already exists; the caller returns the existing one instead.
    pub async fn create(
        &self,
        squad_id: Uuid,
        event_id: Uuid,
        holder_member_id: &str,
        granted_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<Crown>> {
        let crown = sqlx::query_as::<_, Crown>(
            r#"
            INSERT INTO crowns (id, squad_id, event_id, holder_member_id, granted_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (squad_id, event_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(squad_id)
        .bind(event_id)
        .bind(holder_member_id)
        .bind(granted_at)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(crown)
    }

    pub async fn get_by_id(&self, crown_id: Uuid) -> Result<Option<Crown>> {
        let crown = sqlx::query_as::<_, Crown>("SELECT * FROM crowns WHERE id = ?1")
            .bind(crown_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(crown)
    }

    pub async fn get_by_event(&self, squad_id: Uuid, event_id: Uuid) -> Result<Option<Crown>> {
        let crown =
            sqlx::query_as::<_, Crown>("SELECT * FROM crowns WHERE squad_id = ?1 AND event_id = ?2")
                .bind(squad_id)
                .bind(event_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(crown)
    }

    pub async fn active_crown(&self, squad_id: Uuid, now: DateTime<Utc>) -> Result<Option<Crown>> {
        let crown = sqlx::query_as::<_, Crown>(
            r#"
            SELECT * FROM crowns
            WHERE squad_id = ?1 AND expires_at > ?2
            ORDER BY granted_at DESC
            LIMIT 1
            "#,
        )
        .bind(squad_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(crown)
    }

    /// Upsert keyed by crown: a later headline replaces the earlier one.
    pub async fn upsert_headline(
        &self,
        crown_id: Uuid,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Headline> {
        let headline = sqlx::query_as::<_, Headline>(
            r#"
            INSERT INTO headlines (id, crown_id, content, declared_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (crown_id) DO UPDATE SET
                content = excluded.content,
                declared_at = excluded.declared_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(crown_id)
        .bind(content)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(headline)
    }

    /// Upsert keyed by crown, same supersede semantics as headlines.
    pub async fn upsert_rivalry(
        &self,
        crown_id: Uuid,
        rival_a: &str,
        rival_b: &str,
        now: DateTime<Utc>,
    ) -> Result<Rivalry> {
        let rivalry = sqlx::query_as::<_, Rivalry>(
            r#"
            INSERT INTO rivalries (id, crown_id, rival_a_member_id, rival_b_member_id, declared_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (crown_id) DO UPDATE SET
                rival_a_member_id = excluded.rival_a_member_id,
                rival_b_member_id = excluded.rival_b_member_id,
                declared_at = excluded.declared_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(crown_id)
        .bind(rival_a)
        .bind(rival_b)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(rivalry)
    }

    pub async fn get_headline(&self, crown_id: Uuid) -> Result<Option<Headline>> {
        let headline = sqlx::query_as::<_, Headline>("SELECT * FROM headlines WHERE crown_id = ?1")
            .bind(crown_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(headline)
    }

    pub async fn get_rivalry(&self, crown_id: Uuid) -> Result<Option<Rivalry>> {
        let rivalry = sqlx::query_as::<_, Rivalry>("SELECT * FROM rivalries WHERE crown_id = ?1")
            .bind(crown_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rivalry)
    }
}
