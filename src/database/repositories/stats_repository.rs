use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::MemberStats;

#[derive(Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, squad_id: Uuid, member_id: &str) -> Result<Option<MemberStats>> {
        let stats = sqlx::query_as::<_, MemberStats>(
            "SELECT * FROM member_stats WHERE squad_id = ?1 AND member_id = ?2",
        )
        .bind(squad_id)
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stats)
    }

    pub async fn get_for_squad(&self, squad_id: Uuid) -> Result<Vec<MemberStats>> {
        let stats = sqlx::query_as::<_, MemberStats>(
            r#"
            SELECT * FROM member_stats
            WHERE squad_id = ?1
            ORDER BY lifetime_points DESC, member_id ASC
            "#,
        )
        .bind(squad_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    /// Applies a participation in one atomic upsert. Streak rules live in
    /// the CASE: same-day participation leaves the streak alone, a
    /// participation dated yesterday extends it, anything older restarts at
    /// one. Single statement, so concurrent calls for the same pair
    /// serialize at the store.
    pub async fn apply_participation(
        &self,
        squad_id: Uuid,
        member_id: &str,
        points: i64,
        today: NaiveDate,
        yesterday: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<MemberStats> {
        let stats = sqlx::query_as::<_, MemberStats>(
            r#"
            INSERT INTO member_stats
                (squad_id, member_id, weekly_points, lifetime_points, streak_length, strike_count, last_participation_date, updated_at)
            VALUES
                (?1, ?2, ?3, ?3, 1, 0, ?4, ?6)
            ON CONFLICT (squad_id, member_id) DO UPDATE SET
                weekly_points = weekly_points + ?3,
                lifetime_points = lifetime_points + ?3,
                streak_length = CASE
                    WHEN last_participation_date = ?4 THEN streak_length
                    WHEN last_participation_date = ?5 THEN streak_length + 1
                    ELSE 1
                END,
                last_participation_date = ?4,
                updated_at = ?6
            RETURNING *
            "#,
        )
        .bind(squad_id)
        .bind(member_id)
        .bind(points)
        .bind(today)
        .bind(yesterday)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    /// Penalty for a missed event: points floored at zero, streak reset,
    /// one more strike.
    pub async fn apply_miss_penalty(
        &self,
        squad_id: Uuid,
        member_id: &str,
        penalty: i64,
        now: DateTime<Utc>,
    ) -> Result<MemberStats> {
        let stats = sqlx::query_as::<_, MemberStats>(
            r#"
            INSERT INTO member_stats
                (squad_id, member_id, weekly_points, lifetime_points, streak_length, strike_count, last_participation_date, updated_at)
            VALUES
                (?1, ?2, 0, 0, 0, 1, NULL, ?4)
            ON CONFLICT (squad_id, member_id) DO UPDATE SET
                weekly_points = MAX(0, weekly_points - ?3),
                lifetime_points = MAX(0, lifetime_points - ?3),
                streak_length = 0,
                strike_count = strike_count + 1,
                updated_at = ?4
            RETURNING *
            "#,
        )
        .bind(squad_id)
        .bind(member_id)
        .bind(penalty)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    pub async fn reset_weekly(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE member_stats SET weekly_points = 0, updated_at = ?1 WHERE weekly_points <> 0",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn decay_strikes(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE member_stats SET strike_count = strike_count - 1, updated_at = ?1 WHERE strike_count > 0",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
