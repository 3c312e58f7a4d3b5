use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct MissPenaltyInput {
    pub squad_id: Uuid,
    pub member_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberStats {
    pub squad_id: Uuid,
    pub member_id: String,
    pub weekly_points: i64,
    pub lifetime_points: i64,
    pub streak_length: i64,
    pub strike_count: i64,
    pub last_participation_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}
