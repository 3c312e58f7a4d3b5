use std::collections::HashSet;
use std::sync::Arc;

use futures::future::try_join_all;
use uuid::Uuid;

use crate::database::models::{CreateEventInput, DailyEvent, EventStatus};
use crate::database::repositories::{EventRepository, SquadRepository, SubmissionRepository};
use crate::error::{AppError, is_unique_violation};

use super::clock::Clock;
use super::crowns::CrownService;
use super::judges::JudgeService;
use super::notifier::ChangeNotifier;
use super::powers::PowerService;
use super::stats::{self, StatsService};

/// Owns the daily-event state machine. Status only ever advances through
/// this service; everything downstream reads it.
#[derive(Clone)]
pub struct LifecycleService {
    events: EventRepository,
    submissions: SubmissionRepository,
    squads: SquadRepository,
    stats: StatsService,
    powers: PowerService,
    crowns: CrownService,
    judges: JudgeService,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl LifecycleService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        events: EventRepository,
        submissions: SubmissionRepository,
        squads: SquadRepository,
        stats: StatsService,
        powers: PowerService,
        crowns: CrownService,
        judges: JudgeService,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            events,
            submissions,
            squads,
            stats,
            powers,
            crowns,
            judges,
            clock,
            notifier,
        }
    }

    /// Scheduler-facing: one event per squad per calendar date.
    pub async fn create_event(&self, input: &CreateEventInput) -> Result<DailyEvent, AppError> {
        if self
            .squads
            .get_squad_by_id(input.squad_id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found("squad"));
        }

        if input.open_at >= input.close_at {
            return Err(AppError::validation("open_at must precede close_at"));
        }

        let event = self
            .events
            .create_event(input, self.clock.now())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::validation(format!(
                        "squad {} already has an event on {}",
                        input.squad_id, input.event_date
                    ))
                } else {
                    AppError::from(e)
                }
            })?;

        self.notifier.notify("daily_event", &event.id.to_string());

        Ok(event)
    }

    pub async fn get_event(&self, event_id: Uuid) -> Result<DailyEvent, AppError> {
        self.events
            .get_event(event_id)
            .await?
            .ok_or_else(|| AppError::not_found("event"))
    }

    /// scheduled -> open, once the scheduled open time has arrived. Assigns
    /// a judge if none was set yet.
    pub async fn open(&self, event_id: Uuid) -> Result<DailyEvent, AppError> {
        let event = self.get_event(event_id).await?;

        if event.status != EventStatus::Scheduled {
            return Err(AppError::InvalidTransition(format!(
                "cannot open a {} event",
                event.status
            )));
        }

        let now = self.clock.now();
        if now < event.open_at {
            return Err(AppError::InvalidTransition(format!(
                "event {} does not open until {}",
                event.id, event.open_at
            )));
        }

        let judge = match &event.judge_member_id {
            Some(judge) => judge.clone(),
            None => self.judges.select_judge(event.squad_id).await?,
        };

        let opened = self
            .events
            .open_event(event_id, &judge, now)
            .await?
            .ok_or_else(|| {
                AppError::InvalidTransition(format!("event {} left scheduled concurrently", event_id))
            })?;

        self.notifier.notify("daily_event", &opened.id.to_string());

        Ok(opened)
    }

    /// open -> closed. Ranking runs inside the same transaction as the
    /// status flip, so nothing submitted after the close is ever ranked.
    pub async fn close(&self, event_id: Uuid) -> Result<DailyEvent, AppError> {
        self.get_event(event_id).await?;

        let now = self.clock.now();
        let closed = self
            .events
            .close_and_rank(event_id, now)
            .await?
            .ok_or_else(|| {
                AppError::InvalidTransition("only an open event can be closed".to_string())
            })?;

        self.notifier.notify("daily_event", &closed.id.to_string());

        Ok(closed)
    }

    /// closed -> finalized, idempotently. The guarded status flip decides a
    /// single winner; only that call applies the downstream awards, so
    /// retries can never double-count. Calls against an already-finalized
    /// event return it unchanged.
    pub async fn finalize(&self, event_id: Uuid) -> Result<DailyEvent, AppError> {
        let event = self.get_event(event_id).await?;

        let now = self.clock.now();
        match self.events.finalize_event(event_id, now).await? {
            Some(finalized) => {
                self.apply_finalization(&finalized).await?;
                self.notifier.notify("daily_event", &finalized.id.to_string());
                Ok(finalized)
            }
            None if event.status == EventStatus::Finalized => Ok(event),
            None => {
                // Lost the flip to a concurrent call, or the event never closed
                let current = self.get_event(event_id).await?;
                if current.status == EventStatus::Finalized {
                    Ok(current)
                } else {
                    Err(AppError::InvalidTransition(format!(
                        "cannot finalize a {} event",
                        current.status
                    )))
                }
            }
        }
    }

    /// Point awards, miss penalties, crown and underdog grants. Each leg is
    /// idempotent in its own right on top of the finalize gate.
    async fn apply_finalization(&self, event: &DailyEvent) -> Result<(), AppError> {
        let submissions = self.submissions.get_by_event(event.id).await?;

        for submission in &submissions {
            let points = stats::points_for(event.event_type, submission.rank);
            self.stats
                .on_submission(event.squad_id, &submission.member_id, points, submission.id)
                .await?;
        }

        let submitted: HashSet<&str> = submissions.iter().map(|s| s.member_id.as_str()).collect();
        let roster = self.squads.get_members(event.squad_id).await?;
        let missed: Vec<String> = roster
            .into_iter()
            .map(|m| m.member_id)
            .filter(|m| !submitted.contains(m.as_str()))
            .collect();

        // Stats rows are per (member, squad); different members can proceed
        // in parallel
        try_join_all(
            missed
                .iter()
                .map(|member_id| self.stats.on_missed_event(event.squad_id, member_id)),
        )
        .await?;

        self.crowns.award_crown(event.id).await?;
        self.powers.award_underdog_power(event.id).await?;

        Ok(())
    }
}
