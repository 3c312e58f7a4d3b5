use std::sync::Arc;

use uuid::Uuid;

use crate::database::models::{
    DailyEvent, EventType, Submission, SubmissionPayload, VoteTally,
};
use crate::database::repositories::{EventRepository, SquadRepository, SubmissionRepository};
use crate::error::{AppError, is_unique_violation};

use super::clock::Clock;
use super::notifier::ChangeNotifier;

const MAX_VOTE_CHOICE_CHARS: usize = 100;

#[derive(Clone)]
pub struct SubmissionService {
    events: EventRepository,
    submissions: SubmissionRepository,
    squads: SquadRepository,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl SubmissionService {
    pub fn new(
        events: EventRepository,
        submissions: SubmissionRepository,
        squads: SquadRepository,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            events,
            submissions,
            squads,
            clock,
            notifier,
        }
    }

    pub async fn submit(
        &self,
        event_id: Uuid,
        member_id: &str,
        payload: &SubmissionPayload,
    ) -> Result<Submission, AppError> {
        let event = self.get_event(event_id).await?;

        if !self.squads.is_member(event.squad_id, member_id).await? {
            return Err(AppError::Forbidden(
                "only squad members can submit".to_string(),
            ));
        }

        let (score, vote_choice, media_ref) = validate_payload(&event, payload)?;

        // The repository insert re-checks `open` atomically; this pre-check
        // only exists to give the caller a precise error.
        if event.status != crate::database::models::EventStatus::Open {
            return Err(AppError::EventNotOpen(format!(
                "event {} is {}",
                event.id, event.status
            )));
        }

        let created = self
            .submissions
            .create(
                event_id,
                member_id,
                score,
                vote_choice.as_deref(),
                media_ref.as_deref(),
                self.clock.now(),
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::DuplicateSubmission(format!(
                        "member {} already submitted to event {}",
                        member_id, event_id
                    ))
                } else {
                    AppError::from(e)
                }
            })?;

        let submission = created.ok_or_else(|| {
            AppError::EventNotOpen(format!("event {} closed before the submission landed", event_id))
        })?;

        self.notifier.notify("submission", &submission.id.to_string());

        Ok(submission)
    }

    pub async fn list(&self, event_id: Uuid) -> Result<Vec<Submission>, AppError> {
        self.get_event(event_id).await?;
        Ok(self.submissions.get_by_event(event_id).await?)
    }

    /// Ordered vote tally; only meaningful for vote events.
    pub async fn tally(&self, event_id: Uuid) -> Result<Vec<VoteTally>, AppError> {
        let event = self.get_event(event_id).await?;

        if event.event_type != EventType::Vote {
            return Err(AppError::validation(format!(
                "event {} is {}, not a vote event",
                event.id, event.event_type
            )));
        }

        Ok(self.submissions.tally(event_id).await?)
    }

    async fn get_event(&self, event_id: Uuid) -> Result<DailyEvent, AppError> {
        self.events
            .get_event(event_id)
            .await?
            .ok_or_else(|| AppError::not_found("event"))
    }
}

type PayloadColumns = (Option<f64>, Option<String>, Option<String>);

fn validate_payload(
    event: &DailyEvent,
    payload: &SubmissionPayload,
) -> Result<PayloadColumns, AppError> {
    match (event.event_type, payload) {
        (EventType::TimedScore, SubmissionPayload::TimedScore { score }) => {
            if !score.is_finite() || *score < 0.0 {
                return Err(AppError::validation("score must be a non-negative number"));
            }
            Ok((Some(*score), None, None))
        }
        (EventType::Vote, SubmissionPayload::Vote { choice }) => {
            let choice = choice.trim();
            if choice.is_empty() || choice.chars().count() > MAX_VOTE_CHOICE_CHARS {
                return Err(AppError::validation(format!(
                    "vote choice must be 1-{} characters",
                    MAX_VOTE_CHOICE_CHARS
                )));
            }
            Ok((None, Some(choice.to_string()), None))
        }
        (EventType::Media, SubmissionPayload::Media { media_ref }) => {
            let media_ref = media_ref.trim();
            if media_ref.is_empty() {
                return Err(AppError::validation("media reference must not be empty"));
            }
            Ok((None, None, Some(media_ref.to_string())))
        }
        _ => Err(AppError::validation(format!(
            "payload does not match a {} event",
            event.event_type
        ))),
    }
}
