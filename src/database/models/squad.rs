use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Squad {
    pub id: Uuid,
    pub name: String,
    pub invite_code: String,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SquadMember {
    pub squad_id: Uuid,
    pub member_id: String,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum MemberRole {
        Member => "member",
        Admin => "admin",
    }
}

impl Default for MemberRole {
    fn default() -> Self {
        MemberRole::Member
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSquadInput {
    pub name: String,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinSquadInput {
    pub invite_code: String,
}
