use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyEvent {
    pub id: Uuid,
    pub squad_id: Uuid,
    pub event_date: NaiveDate,
    pub event_type: EventType,
    pub status: EventStatus,
    pub open_at: DateTime<Utc>,
    pub close_at: DateTime<Utc>,
    pub judge_member_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum EventType {
        TimedScore => "timed-score",
        Vote => "vote",
        Media => "media",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum EventStatus {
        Scheduled => "scheduled",
        Open => "open",
        Closed => "closed",
        Finalized => "finalized",
    }
}

impl Default for EventStatus {
    fn default() -> Self {
        EventStatus::Scheduled
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventInput {
    pub squad_id: Uuid,
    pub event_date: NaiveDate,
    pub event_type: EventType,
    pub open_at: DateTime<Utc>,
    pub close_at: DateTime<Utc>,
}
