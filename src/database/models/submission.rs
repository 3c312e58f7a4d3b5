use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Submission {
    pub id: Uuid,
    pub event_id: Uuid,
    pub member_id: String,
    pub score: Option<f64>,
    pub vote_choice: Option<String>,
    pub media_ref: Option<String>,
    pub rank: Option<i64>,
    pub counted_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
}

/// Type-specific submission body; the variant must match the event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SubmissionPayload {
    TimedScore { score: f64 },
    Vote { choice: String },
    Media { media_ref: String },
}

/// One row of an ordered vote tally, highest count first.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VoteTally {
    pub choice: String,
    pub count: i64,
}
