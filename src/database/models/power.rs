use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Power {
    pub id: Uuid,
    pub squad_id: Uuid,
    pub holder_member_id: String,
    pub power_type: PowerType,
    pub source_event_id: Uuid,
    pub granted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub metadata: Option<String>,
}

impl Power {
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum PowerType {
        TargetLock => "target-lock",
        DoublePoints => "double-points",
        Shield => "shield",
        Mulligan => "mulligan",
    }
}

impl PowerType {
    /// The full enumeration, in draw order.
    pub const ALL: [PowerType; 4] = [
        PowerType::TargetLock,
        PowerType::DoublePoints,
        PowerType::Shield,
        PowerType::Mulligan,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActiveTarget {
    pub id: Uuid,
    pub power_id: Uuid,
    pub squad_id: Uuid,
    pub targeter_member_id: String,
    pub target_member_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsePowerInput {
    pub metadata: Option<serde_json::Value>,
}

/// A used power together with the target it locked, when it was a target-lock.
#[derive(Debug, Clone, Serialize)]
pub struct PowerUseOutcome {
    pub power: Power,
    pub target: Option<ActiveTarget>,
}
