use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Challenge {
    pub id: Uuid,
    pub squad_id: Uuid,
    pub subject_kind: ChallengeSubject,
    pub subject_id: Uuid,
    pub challenger_member_id: String,
    pub target_member_id: String,
    pub votes_for: i64,
    pub votes_against: i64,
    pub threshold_pct: i64,
    pub deadline: DateTime<Utc>,
    pub status: ChallengeStatus,
    pub opened_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Challenge {
    /// Whether the "for" share of cast votes has reached the threshold.
    pub fn threshold_reached(&self) -> bool {
        let cast = self.votes_for + self.votes_against;
        cast > 0 && self.votes_for * 100 >= self.threshold_pct * cast
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum ChallengeSubject {
        JudgeDecision => "judge-decision",
        PowerUse => "power-use",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum ChallengeStatus {
        Active => "active",
        Passed => "passed",
        Failed => "failed",
        Expired => "expired",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum VoteChoice {
        For => "for",
        Against => "against",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChallengeVote {
    pub challenge_id: Uuid,
    pub member_id: String,
    pub choice: VoteChoice,
    pub cast_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenChallengeInput {
    pub squad_id: Uuid,
    pub subject_kind: ChallengeSubject,
    pub subject_id: Uuid,
    pub target_member_id: String,
    pub threshold_pct: i64,
    pub voting_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CastVoteInput {
    pub choice: VoteChoice,
}
