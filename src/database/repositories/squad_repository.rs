use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{MemberRole, Squad, SquadMember};

#[derive(Clone)]
pub struct SquadRepository {
    pool: SqlitePool,
}

impl SquadRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_squad(
        &self,
        name: &str,
        invite_code: &str,
        timezone: &str,
        now: DateTime<Utc>,
    ) -> Result<Squad> {
        let squad = sqlx::query_as::<_, Squad>(
            r#"
            INSERT INTO squads (id, name, invite_code, timezone, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(invite_code)
        .bind(timezone)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(squad)
    }

    pub async fn get_squad_by_id(&self, squad_id: Uuid) -> Result<Option<Squad>> {
        let squad = sqlx::query_as::<_, Squad>("SELECT * FROM squads WHERE id = ?1")
            .bind(squad_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(squad)
    }

    pub async fn get_squad_by_invite_code(&self, invite_code: &str) -> Result<Option<Squad>> {
        let squad = sqlx::query_as::<_, Squad>("SELECT * FROM squads WHERE invite_code = ?1")
            .bind(invite_code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(squad)
    }

    /// Idempotent membership insert; joining twice returns the existing row.
    pub async fn add_member(
        &self,
        squad_id: Uuid,
        member_id: &str,
        role: MemberRole,
        now: DateTime<Utc>,
    ) -> Result<SquadMember> {
        sqlx::query(
            r#"
            INSERT INTO squad_members (squad_id, member_id, role, joined_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (squad_id, member_id) DO NOTHING
            "#,
        )
        .bind(squad_id)
        .bind(member_id)
        .bind(role)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let member = sqlx::query_as::<_, SquadMember>(
            "SELECT * FROM squad_members WHERE squad_id = ?1 AND member_id = ?2",
        )
        .bind(squad_id)
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(member)
    }

    pub async fn get_member(&self, squad_id: Uuid, member_id: &str) -> Result<Option<SquadMember>> {
        let member = sqlx::query_as::<_, SquadMember>(
            "SELECT * FROM squad_members WHERE squad_id = ?1 AND member_id = ?2",
        )
        .bind(squad_id)
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    pub async fn is_member(&self, squad_id: Uuid, member_id: &str) -> Result<bool> {
        Ok(self.get_member(squad_id, member_id).await?.is_some())
    }

    pub async fn get_members(&self, squad_id: Uuid) -> Result<Vec<SquadMember>> {
        let members = sqlx::query_as::<_, SquadMember>(
            "SELECT * FROM squad_members WHERE squad_id = ?1 ORDER BY joined_at ASC, member_id ASC",
        )
        .bind(squad_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    /// Member ids with fewer strikes than the ceiling, in deterministic order.
    /// Members without a stats row count as zero strikes.
    pub async fn eligible_judges(&self, squad_id: Uuid, strike_ceiling: i64) -> Result<Vec<String>> {
        let member_ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT sm.member_id
            FROM squad_members sm
            LEFT JOIN member_stats ms
                ON ms.squad_id = sm.squad_id AND ms.member_id = sm.member_id
            WHERE sm.squad_id = ?1 AND COALESCE(ms.strike_count, 0) < ?2
            ORDER BY sm.member_id ASC
            "#,
        )
        .bind(squad_id)
        .bind(strike_ceiling)
        .fetch_all(&self.pool)
        .await?;

        Ok(member_ids)
    }
}
