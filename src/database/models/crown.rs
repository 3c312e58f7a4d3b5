use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Crown {
    pub id: Uuid,
    pub squad_id: Uuid,
    pub event_id: Uuid,
    pub holder_member_id: String,
    pub granted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Crown {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Headline {
    pub id: Uuid,
    pub crown_id: Uuid,
    pub content: String,
    pub declared_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rivalry {
    pub id: Uuid,
    pub crown_id: Uuid,
    pub rival_a_member_id: String,
    pub rival_b_member_id: String,
    pub declared_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeadlineInput {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RivalryInput {
    pub rival_a: String,
    pub rival_b: String,
}

/// Everything currently reigning in a squad.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveReign {
    pub crown: Option<Crown>,
    pub headline: Option<Headline>,
    pub rivalry: Option<Rivalry>,
}
