use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{Challenge, ChallengeStatus, ChallengeSubject, VoteChoice};

#[derive(Clone)]
pub struct ChallengeRepository {
    pool: SqlitePool,
}

impl ChallengeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        squad_id: Uuid,
        subject_kind: ChallengeSubject,
        subject_id: Uuid,
        challenger_member_id: &str,
        target_member_id: &str,
        threshold_pct: i64,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Challenge> {
        let challenge = sqlx::query_as::<_, Challenge>(
            r#"
            INSERT INTO challenges
                (id, squad_id, subject_kind, subject_id, challenger_member_id, target_member_id,
                 threshold_pct, deadline, status, opened_at)
            VALUES
                (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'active', ?9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(squad_id)
        .bind(subject_kind)
        .bind(subject_id)
        .bind(challenger_member_id)
        .bind(target_member_id)
        .bind(threshold_pct)
        .bind(deadline)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(challenge)
    }

    pub async fn get_by_id(&self, challenge_id: Uuid) -> Result<Option<Challenge>> {
        let challenge = sqlx::query_as::<_, Challenge>("SELECT * FROM challenges WHERE id = ?1")
            .bind(challenge_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(challenge)
    }

    /// Records one vote and bumps the matching tally, in one transaction.
    /// Returns None when the challenge left `active` before the vote
    /// landed. A duplicate (challenge, member) bubbles the unique violation.
    pub async fn record_vote(
        &self,
        challenge_id: Uuid,
        member_id: &str,
        choice: VoteChoice,
        now: DateTime<Utc>,
    ) -> Result<Option<Challenge>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO challenge_votes (challenge_id, member_id, choice, cast_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(challenge_id)
        .bind(member_id)
        .bind(choice)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let challenge = sqlx::query_as::<_, Challenge>(
            r#"
            UPDATE challenges
            SET votes_for = votes_for + (CASE WHEN ?2 = 'for' THEN 1 ELSE 0 END),
                votes_against = votes_against + (CASE WHEN ?2 = 'against' THEN 1 ELSE 0 END)
            WHERE id = ?1 AND status = 'active'
            RETURNING *
            "#,
        )
        .bind(challenge_id)
        .bind(choice)
        .fetch_optional(&mut *tx)
        .await?;

        if challenge.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;

        Ok(challenge)
    }

    /// active -> terminal, guarded so only one resolution ever lands.
    pub async fn resolve(
        &self,
        challenge_id: Uuid,
        outcome: ChallengeStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Challenge>> {
        let challenge = sqlx::query_as::<_, Challenge>(
            r#"
            UPDATE challenges
            SET status = ?2, resolved_at = ?3
            WHERE id = ?1 AND status = 'active'
            RETURNING *
            "#,
        )
        .bind(challenge_id)
        .bind(outcome)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(challenge)
    }

    pub async fn active_past_deadline(&self, now: DateTime<Utc>) -> Result<Vec<Challenge>> {
        let challenges = sqlx::query_as::<_, Challenge>(
            "SELECT * FROM challenges WHERE status = 'active' AND deadline <= ?1",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(challenges)
    }

    pub async fn has_voted(&self, challenge_id: Uuid, member_id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM challenge_votes WHERE challenge_id = ?1 AND member_id = ?2",
        )
        .bind(challenge_id)
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }
}
