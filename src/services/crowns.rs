use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::database::models::{ActiveReign, Crown, Headline, Rivalry};
use crate::database::repositories::{
    CrownRepository, EventRepository, SquadRepository, SubmissionRepository,
};
use crate::error::AppError;

use super::clock::Clock;
use super::notifier::ChangeNotifier;

pub const CROWN_TTL_HOURS: i64 = 24;
pub const HEADLINE_MAX_CHARS: usize = 50;

#[derive(Clone)]
pub struct CrownService {
    crowns: CrownRepository,
    submissions: SubmissionRepository,
    events: EventRepository,
    squads: SquadRepository,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl CrownService {
    pub fn new(
        crowns: CrownRepository,
        submissions: SubmissionRepository,
        events: EventRepository,
        squads: SquadRepository,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            crowns,
            submissions,
            events,
            squads,
            clock,
            notifier,
        }
    }

    /// Crowns the rank-1 finisher of an event. No ranked winner (vote and
    /// media events never have one) is a successful no-op, and redelivery
    /// returns the crown granted the first time around.
    pub async fn award_crown(&self, event_id: Uuid) -> Result<Option<Crown>, AppError> {
        let event = self
            .events
            .get_event(event_id)
            .await?
            .ok_or_else(|| AppError::not_found("event"))?;

        let Some(winner) = self.submissions.top_ranked(event_id).await? else {
            return Ok(None);
        };

        let granted_at = self.clock.now();
        let expires_at = granted_at + Duration::hours(CROWN_TTL_HOURS);

        let created = self
            .crowns
            .create(
                event.squad_id,
                event_id,
                &winner.member_id,
                granted_at,
                expires_at,
            )
            .await?;

        match created {
            Some(crown) => {
                self.notifier.notify("crown", &crown.id.to_string());
                Ok(Some(crown))
            }
            None => Ok(self.crowns.get_by_event(event.squad_id, event_id).await?),
        }
    }

    /// One headline per crown; a later declaration supersedes the earlier.
    pub async fn create_headline(
        &self,
        crown_id: Uuid,
        acting_member_id: &str,
        content: &str,
    ) -> Result<Headline, AppError> {
        let crown = self.owned_unexpired_crown(crown_id, acting_member_id).await?;

        let content = content.trim();
        if content.is_empty() || content.chars().count() > HEADLINE_MAX_CHARS {
            return Err(AppError::validation(format!(
                "headline must be 1-{} characters",
                HEADLINE_MAX_CHARS
            )));
        }

        let headline = self
            .crowns
            .upsert_headline(crown.id, content, self.clock.now())
            .await?;

        self.notifier.notify("headline", &headline.id.to_string());

        Ok(headline)
    }

    /// One rivalry per crown, between two other members of the squad.
    pub async fn declare_rivalry(
        &self,
        crown_id: Uuid,
        acting_member_id: &str,
        rival_a: &str,
        rival_b: &str,
    ) -> Result<Rivalry, AppError> {
        let crown = self.owned_unexpired_crown(crown_id, acting_member_id).await?;

        if rival_a == rival_b {
            return Err(AppError::validation(
                "a rivalry needs two different members",
            ));
        }
        if rival_a == crown.holder_member_id || rival_b == crown.holder_member_id {
            return Err(AppError::validation(
                "the crown holder cannot be part of the rivalry",
            ));
        }
        for rival in [rival_a, rival_b] {
            if !self.squads.is_member(crown.squad_id, rival).await? {
                return Err(AppError::validation(format!(
                    "{} is not a member of this squad",
                    rival
                )));
            }
        }

        let rivalry = self
            .crowns
            .upsert_rivalry(crown.id, rival_a, rival_b, self.clock.now())
            .await?;

        self.notifier.notify("rivalry", &rivalry.id.to_string());

        Ok(rivalry)
    }

    /// The squad's current crown plus whatever it declared, newest first.
    pub async fn active_reign(&self, squad_id: Uuid) -> Result<ActiveReign, AppError> {
        let crown = self.crowns.active_crown(squad_id, self.clock.now()).await?;

        let (headline, rivalry) = match &crown {
            Some(crown) => (
                self.crowns.get_headline(crown.id).await?,
                self.crowns.get_rivalry(crown.id).await?,
            ),
            None => (None, None),
        };

        Ok(ActiveReign {
            crown,
            headline,
            rivalry,
        })
    }

    async fn owned_unexpired_crown(
        &self,
        crown_id: Uuid,
        acting_member_id: &str,
    ) -> Result<Crown, AppError> {
        let crown = self
            .crowns
            .get_by_id(crown_id)
            .await?
            .ok_or_else(|| AppError::not_found("crown"))?;

        if crown.holder_member_id != acting_member_id {
            return Err(AppError::Forbidden(
                "only the crown holder can declare".to_string(),
            ));
        }

        if crown.is_expired(self.clock.now()) {
            return Err(AppError::Expired(format!("crown {}", crown.id)));
        }

        Ok(crown)
    }
}
