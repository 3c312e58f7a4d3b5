use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::database::models::{
    Challenge, ChallengeStatus, OpenChallengeInput, VoteChoice,
};
use crate::database::repositories::{ChallengeRepository, SquadRepository};
use crate::error::{AppError, is_unique_violation};

use super::clock::Clock;
use super::draw::Draw;
use super::notifier::ChangeNotifier;

/// Members at or above this many strikes are passed over for judge duty.
pub const STRIKE_CEILING: i64 = 3;
/// Voting windows are bounded to a week.
pub const MAX_VOTING_MINUTES: i64 = 7 * 24 * 60;

#[derive(Clone)]
pub struct JudgeService {
    squads: SquadRepository,
    challenges: ChallengeRepository,
    clock: Arc<dyn Clock>,
    draw: Arc<dyn Draw>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl JudgeService {
    pub fn new(
        squads: SquadRepository,
        challenges: ChallengeRepository,
        clock: Arc<dyn Clock>,
        draw: Arc<dyn Draw>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            squads,
            challenges,
            clock,
            draw,
            notifier,
        }
    }

    /// Uniform draw over members below the strike ceiling, ordered by
    /// member id so the candidate list is deterministic; falls back to the
    /// whole roster when nobody qualifies. Guarding against re-selection is
    /// the caller's job.
    pub async fn select_judge(&self, squad_id: Uuid) -> Result<String, AppError> {
        let mut candidates = self.squads.eligible_judges(squad_id, STRIKE_CEILING).await?;

        if candidates.is_empty() {
            candidates = self
                .squads
                .get_members(squad_id)
                .await?
                .into_iter()
                .map(|m| m.member_id)
                .collect();
            candidates.sort();
        }

        if candidates.is_empty() {
            return Err(AppError::not_found("squad has no members to judge"));
        }

        let pick = self.draw.pick(candidates.len());
        Ok(candidates.swap_remove(pick))
    }

    pub async fn open_challenge(
        &self,
        challenger_member_id: &str,
        input: &OpenChallengeInput,
    ) -> Result<Challenge, AppError> {
        if self
            .squads
            .get_squad_by_id(input.squad_id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found("squad"));
        }

        if !self
            .squads
            .is_member(input.squad_id, challenger_member_id)
            .await?
        {
            return Err(AppError::Forbidden(
                "only squad members can open a challenge".to_string(),
            ));
        }

        if !(1..=100).contains(&input.threshold_pct) {
            return Err(AppError::validation("threshold must be 1-100 percent"));
        }
        if !(1..=MAX_VOTING_MINUTES).contains(&input.voting_minutes) {
            return Err(AppError::validation(format!(
                "voting window must be 1-{} minutes",
                MAX_VOTING_MINUTES
            )));
        }
        if !self
            .squads
            .is_member(input.squad_id, &input.target_member_id)
            .await?
        {
            return Err(AppError::validation(format!(
                "{} is not a member of this squad",
                input.target_member_id
            )));
        }

        let now = self.clock.now();
        let challenge = self
            .challenges
            .create(
                input.squad_id,
                input.subject_kind,
                input.subject_id,
                challenger_member_id,
                &input.target_member_id,
                input.threshold_pct,
                now + Duration::minutes(input.voting_minutes),
                now,
            )
            .await?;

        self.notifier.notify("challenge", &challenge.id.to_string());

        Ok(challenge)
    }

    /// One vote per eligible member while the challenge is active. The
    /// challenge flips to `passed` on the vote that lifts the "for" share
    /// of cast votes to the threshold. Deadline expiry is checked here, not
    /// by a background timer.
    pub async fn cast_vote(
        &self,
        challenge_id: Uuid,
        member_id: &str,
        choice: VoteChoice,
    ) -> Result<Challenge, AppError> {
        let challenge = self
            .challenges
            .get_by_id(challenge_id)
            .await?
            .ok_or_else(|| AppError::not_found("challenge"))?;

        if challenge.status != ChallengeStatus::Active {
            return Err(AppError::InvalidTransition(format!(
                "challenge {} is already {}",
                challenge.id, challenge.status
            )));
        }

        let now = self.clock.now();
        if now > challenge.deadline {
            self.resolve_past_deadline(&challenge).await?;
            return Err(AppError::Expired(format!(
                "voting on challenge {} closed",
                challenge.id
            )));
        }

        if member_id == challenge.challenger_member_id || member_id == challenge.target_member_id {
            return Err(AppError::Forbidden(
                "the challenger and the decision's target cannot vote".to_string(),
            ));
        }
        if !self.squads.is_member(challenge.squad_id, member_id).await? {
            return Err(AppError::validation(
                "only squad members can vote on a challenge",
            ));
        }

        let updated = self
            .challenges
            .record_vote(challenge_id, member_id, choice, now)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::DuplicateSubmission(format!(
                        "member {} already voted on challenge {}",
                        member_id, challenge_id
                    ))
                } else {
                    AppError::from(e)
                }
            })?;

        let updated = updated.ok_or_else(|| {
            AppError::InvalidTransition(format!("challenge {} is no longer active", challenge_id))
        })?;

        self.notifier.notify("challenge", &challenge_id.to_string());

        if updated.threshold_reached() {
            if let Some(passed) = self
                .challenges
                .resolve(challenge_id, ChallengeStatus::Passed, now)
                .await?
            {
                return Ok(passed);
            }
            // Another voter's resolution landed first; report that state
            return Ok(self
                .challenges
                .get_by_id(challenge_id)
                .await?
                .unwrap_or(updated));
        }

        Ok(updated)
    }

    pub async fn get_challenge(&self, challenge_id: Uuid) -> Result<Challenge, AppError> {
        self.challenges
            .get_by_id(challenge_id)
            .await?
            .ok_or_else(|| AppError::not_found("challenge"))
    }

    /// Caller-invoked sweep resolving every active challenge whose deadline
    /// has passed. Returns how many were resolved.
    pub async fn sweep_expired(&self) -> Result<u64, AppError> {
        let stale = self
            .challenges
            .active_past_deadline(self.clock.now())
            .await?;

        let mut resolved = 0;
        for challenge in stale {
            if self.resolve_past_deadline(&challenge).await?.is_some() {
                resolved += 1;
            }
        }

        if resolved > 0 {
            log::info!("expired-challenge sweep resolved {} challenge(s)", resolved);
        }

        Ok(resolved)
    }

    /// Deadline rule: a challenge nobody voted on ends `expired`; once any
    /// vote was cast without reaching the threshold the decision stands and
    /// the challenge ends `failed`.
    async fn resolve_past_deadline(
        &self,
        challenge: &Challenge,
    ) -> Result<Option<Challenge>, AppError> {
        let outcome = if challenge.votes_for + challenge.votes_against == 0 {
            ChallengeStatus::Expired
        } else {
            ChallengeStatus::Failed
        };

        let resolved = self
            .challenges
            .resolve(challenge.id, outcome, self.clock.now())
            .await?;

        if resolved.is_some() {
            self.notifier.notify("challenge", &challenge.id.to_string());
        }

        Ok(resolved)
    }
}
