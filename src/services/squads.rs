use std::sync::Arc;

use rand::Rng;
use rand::distr::Alphanumeric;
use regex::Regex;
use uuid::Uuid;

use crate::database::models::{CreateSquadInput, MemberRole, Squad, SquadMember};
use crate::database::repositories::SquadRepository;
use crate::error::{AppError, is_unique_violation};

use super::clock::Clock;
use super::notifier::ChangeNotifier;

const INVITE_CODE_LEN: usize = 8;
const INVITE_CODE_ATTEMPTS: usize = 4;
const MAX_NAME_CHARS: usize = 60;

#[derive(Clone)]
pub struct SquadService {
    squads: SquadRepository,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl SquadService {
    pub fn new(
        squads: SquadRepository,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            squads,
            clock,
            notifier,
        }
    }

    pub async fn create_squad(
        &self,
        input: &CreateSquadInput,
        creator_member_id: &str,
    ) -> Result<Squad, AppError> {
        let name = input.name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
            return Err(AppError::validation(format!(
                "squad name must be 1-{} characters",
                MAX_NAME_CHARS
            )));
        }

        let timezone = input.timezone.as_deref().unwrap_or("UTC").trim();
        let tz_format = Regex::new(r"^[A-Za-z]+(/[A-Za-z0-9_+\-]+)*$").unwrap();
        if !tz_format.is_match(timezone) {
            return Err(AppError::validation(format!(
                "invalid timezone: {}",
                timezone
            )));
        }

        let now = self.clock.now();

        // Invite codes can collide; retry a few times before giving up
        let mut last_err = None;
        for _ in 0..INVITE_CODE_ATTEMPTS {
            let code = generate_invite_code();
            match self.squads.create_squad(name, &code, timezone, now).await {
                Ok(squad) => {
                    self.squads
                        .add_member(squad.id, creator_member_id, MemberRole::Admin, now)
                        .await?;
                    self.notifier.notify("squad", &squad.id.to_string());
                    return Ok(squad);
                }
                Err(e) if is_unique_violation(&e) => last_err = Some(e),
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_err
            .map(AppError::from)
            .unwrap_or_else(|| AppError::validation("could not allocate an invite code")))
    }

    pub async fn join_squad(
        &self,
        invite_code: &str,
        member_id: &str,
    ) -> Result<SquadMember, AppError> {
        let code = invite_code.trim().to_uppercase();
        let code_format = Regex::new(r"^[A-Z0-9]{8}$").unwrap();
        if !code_format.is_match(&code) {
            return Err(AppError::validation("malformed invite code"));
        }

        let squad = self
            .squads
            .get_squad_by_invite_code(&code)
            .await?
            .ok_or_else(|| AppError::not_found("no squad with that invite code"))?;

        let member = self
            .squads
            .add_member(squad.id, member_id, MemberRole::Member, self.clock.now())
            .await?;

        self.notifier.notify("squad_member", member_id);

        Ok(member)
    }

    pub async fn get_squad(&self, squad_id: Uuid) -> Result<Squad, AppError> {
        self.squads
            .get_squad_by_id(squad_id)
            .await?
            .ok_or_else(|| AppError::not_found("squad"))
    }

    /// Roster, visible to members only.
    pub async fn get_members(
        &self,
        squad_id: Uuid,
        acting_member_id: &str,
    ) -> Result<Vec<SquadMember>, AppError> {
        self.get_squad(squad_id).await?;

        if !self.squads.is_member(squad_id, acting_member_id).await? {
            return Err(AppError::Forbidden(
                "only squad members can view the roster".to_string(),
            ));
        }

        Ok(self.squads.get_members(squad_id).await?)
    }
}

fn generate_invite_code() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(INVITE_CODE_LEN)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_codes_are_well_formed() {
        for _ in 0..32 {
            let code = generate_invite_code();
            assert_eq!(code.len(), INVITE_CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }
}
