use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{Submission, VoteTally};

/// Assigns 1-based dense ranks to every scored submission of an event,
/// ascending score first (lower is better), earliest submission breaking
/// ties, id as the final tiebreaker so reruns are byte-identical.
pub(crate) const RANK_ASSIGNMENT_SQL: &str = r#"
    WITH ordered AS (
        SELECT
            id,
            ROW_NUMBER() OVER (ORDER BY score ASC, submitted_at ASC, id ASC) AS pos
        FROM submissions
        WHERE event_id = ?1 AND score IS NOT NULL
    )
    UPDATE submissions
    SET "rank" = (SELECT pos FROM ordered WHERE ordered.id = submissions.id)
    WHERE event_id = ?1 AND score IS NOT NULL
"#;

#[derive(Clone)]
pub struct SubmissionRepository {
    pool: SqlitePool,
}

impl SubmissionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert guarded by the event being open: the status check and the
    /// insert are one atomic statement, so a submission can never slip in
    /// after the close transition commits. Returns None when the event is
    /// not open; a duplicate (event, member) bubbles the unique violation.
    pub async fn create(
        &self,
        event_id: Uuid,
        member_id: &str,
        score: Option<f64>,
        vote_choice: Option<&str>,
        media_ref: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions (id, event_id, member_id, score, vote_choice, media_ref, submitted_at)
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7
            WHERE EXISTS (SELECT 1 FROM daily_events WHERE id = ?2 AND status = 'open')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(member_id)
        .bind(score)
        .bind(vote_choice)
        .bind(media_ref)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(submission)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>("SELECT * FROM submissions WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(submission)
    }

    pub async fn get_by_event(&self, event_id: Uuid) -> Result<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, Submission>(
            "SELECT * FROM submissions WHERE event_id = ?1 ORDER BY submitted_at ASC, id ASC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }

    pub async fn get_by_event_and_member(
        &self,
        event_id: Uuid,
        member_id: &str,
    ) -> Result<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>(
            "SELECT * FROM submissions WHERE event_id = ?1 AND member_id = ?2",
        )
        .bind(event_id)
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(submission)
    }

    /// Re-runs the deterministic rank assignment; safe to call repeatedly.
    pub async fn rank_event(&self, event_id: Uuid) -> Result<u64> {
        let result = sqlx::query(RANK_ASSIGNMENT_SQL)
            .bind(event_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Ordered tally for vote events, highest count first; ties resolve
    /// alphabetically so the output is stable.
    pub async fn tally(&self, event_id: Uuid) -> Result<Vec<VoteTally>> {
        let tally = sqlx::query_as::<_, VoteTally>(
            r#"
            SELECT vote_choice AS choice, COUNT(*) AS count
            FROM submissions
            WHERE event_id = ?1 AND vote_choice IS NOT NULL
            GROUP BY vote_choice
            ORDER BY count DESC, choice ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tally)
    }

    pub async fn top_ranked(&self, event_id: Uuid) -> Result<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"SELECT * FROM submissions WHERE event_id = ?1 AND "rank" = 1"#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(submission)
    }

    pub async fn worst_ranked(&self, event_id: Uuid) -> Result<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            SELECT * FROM submissions
            WHERE event_id = ?1 AND "rank" IS NOT NULL
            ORDER BY "rank" DESC
            LIMIT 1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(submission)
    }

    /// Marks a submission as counted towards stats. Returns false when some
    /// earlier call already won the marker; the caller must then skip the
    /// point award.
    pub async fn mark_counted(&self, submission_id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE submissions SET counted_at = ?2 WHERE id = ?1 AND counted_at IS NULL",
        )
        .bind(submission_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
