use std::sync::Arc;

use chrono::Duration;
use serde_json::Value;
use uuid::Uuid;

use crate::database::models::{Power, PowerType, PowerUseOutcome};
use crate::database::repositories::{
    EventRepository, PowerRepository, SquadRepository, SubmissionRepository,
};
use crate::error::AppError;

use super::clock::Clock;
use super::draw::Draw;
use super::notifier::ChangeNotifier;

pub const POWER_TTL_HOURS: i64 = 24;

#[derive(Clone)]
pub struct PowerService {
    powers: PowerRepository,
    submissions: SubmissionRepository,
    events: EventRepository,
    squads: SquadRepository,
    clock: Arc<dyn Clock>,
    draw: Arc<dyn Draw>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl PowerService {
    pub fn new(
        powers: PowerRepository,
        submissions: SubmissionRepository,
        events: EventRepository,
        squads: SquadRepository,
        clock: Arc<dyn Clock>,
        draw: Arc<dyn Draw>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            powers,
            submissions,
            events,
            squads,
            clock,
            draw,
            notifier,
        }
    }

    /// Grants a random power to the worst-ranked finisher of an event.
    /// No eligible finisher (vote/media events, empty events) is a
    /// successful no-op. The unique source-event key makes redelivery
    /// return the already-granted power.
    pub async fn award_underdog_power(&self, event_id: Uuid) -> Result<Option<Power>, AppError> {
        let event = self
            .events
            .get_event(event_id)
            .await?
            .ok_or_else(|| AppError::not_found("event"))?;

        let Some(worst) = self.submissions.worst_ranked(event_id).await? else {
            return Ok(None);
        };

        let power_type = PowerType::ALL[self.draw.pick(PowerType::ALL.len())];
        let granted_at = self.clock.now();
        let expires_at = granted_at + Duration::hours(POWER_TTL_HOURS);

        let created = self
            .powers
            .create(
                event.squad_id,
                &worst.member_id,
                power_type,
                event_id,
                granted_at,
                expires_at,
            )
            .await?;

        match created {
            Some(power) => {
                self.notifier.notify("power", &power.id.to_string());
                Ok(Some(power))
            }
            // Lost the at-most-once race; the earlier grant stands
            None => Ok(self.powers.get_by_source_event(event_id).await?),
        }
    }

    /// Single-use consumption. The repository CAS on `used_at IS NULL` is
    /// what guarantees exactly one of any number of concurrent attempts
    /// succeeds; the checks before it only order the error kinds.
    pub async fn use_power(
        &self,
        power_id: Uuid,
        acting_member_id: &str,
        metadata: Option<Value>,
    ) -> Result<PowerUseOutcome, AppError> {
        let power = self
            .powers
            .get_by_id(power_id)
            .await?
            .ok_or_else(|| AppError::not_found("power"))?;

        if power.holder_member_id != acting_member_id {
            return Err(AppError::Forbidden(
                "only the holder can use a power".to_string(),
            ));
        }

        if power.is_used() {
            return Err(AppError::AlreadyUsed(format!("power {}", power.id)));
        }

        let now = self.clock.now();
        if power.is_expired(now) {
            return Err(AppError::Expired(format!("power {}", power.id)));
        }

        let merged = merge_metadata(power.metadata.as_deref(), metadata)?;

        let outcome = if power.power_type == PowerType::TargetLock {
            let target = target_from_metadata(merged.as_deref())?;

            if target == acting_member_id {
                return Err(AppError::InvalidTarget(
                    "cannot target-lock yourself".to_string(),
                ));
            }
            if !self.squads.is_member(power.squad_id, &target).await? {
                return Err(AppError::validation(format!(
                    "{} is not a member of this squad",
                    target
                )));
            }

            let used = self
                .powers
                .mark_used_with_target(
                    power_id,
                    now,
                    merged.as_deref(),
                    power.squad_id,
                    acting_member_id,
                    &target,
                )
                .await?;

            let (power, target) =
                used.ok_or_else(|| AppError::AlreadyUsed(format!("power {}", power_id)))?;

            PowerUseOutcome {
                power,
                target: Some(target),
            }
        } else {
            let used = self.powers.mark_used(power_id, now, merged.as_deref()).await?;

            let power =
                used.ok_or_else(|| AppError::AlreadyUsed(format!("power {}", power_id)))?;

            PowerUseOutcome {
                power,
                target: None,
            }
        };

        self.notifier.notify("power", &power_id.to_string());

        Ok(outcome)
    }

    pub async fn active_powers(&self, squad_id: Uuid) -> Result<Vec<Power>, AppError> {
        Ok(self.powers.active_powers(squad_id, self.clock.now()).await?)
    }

    pub async fn get_power(&self, power_id: Uuid) -> Result<Power, AppError> {
        self.powers
            .get_by_id(power_id)
            .await?
            .ok_or_else(|| AppError::not_found("power"))
    }
}

/// Merges the incoming metadata object over whatever the power already
/// carries. Incoming keys win.
fn merge_metadata(
    existing: Option<&str>,
    incoming: Option<Value>,
) -> Result<Option<String>, AppError> {
    let mut base = existing
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .and_then(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default();

    match incoming {
        None => {}
        Some(Value::Object(incoming)) => {
            for (key, value) in incoming {
                base.insert(key, value);
            }
        }
        Some(_) => {
            return Err(AppError::validation("metadata must be a JSON object"));
        }
    }

    if base.is_empty() {
        return Ok(None);
    }

    Ok(Some(Value::Object(base).to_string()))
}

fn target_from_metadata(metadata: Option<&str>) -> Result<String, AppError> {
    metadata
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .as_ref()
        .and_then(|v| v.get("target_member_id"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::validation("target-lock use requires metadata.target_member_id")
        })
}
