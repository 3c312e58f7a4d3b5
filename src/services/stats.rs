use std::sync::Arc;

use chrono::Days;
use uuid::Uuid;

use crate::database::models::{EventType, MemberStats};
use crate::database::repositories::{StatsRepository, SubmissionRepository};
use crate::error::AppError;

use super::clock::Clock;

/// Points docked for sitting out an event, floored at zero.
pub const MISS_PENALTY: i64 = 5;
/// Flat participation award for unranked finishes and non-ranked event types.
pub const BASE_POINTS: i64 = 10;
/// Podium bonuses for ranks 1-3 on timed-score events.
pub const PODIUM_POINTS: [i64; 3] = [25, 20, 15];

/// Points a finisher earns: podium bonus on ranked timed-score finishes,
/// the flat participation award everywhere else.
pub fn points_for(event_type: EventType, rank: Option<i64>) -> i64 {
    match (event_type, rank) {
        (EventType::TimedScore, Some(rank)) if rank >= 1 => PODIUM_POINTS
            .get(rank as usize - 1)
            .copied()
            .unwrap_or(BASE_POINTS),
        _ => BASE_POINTS,
    }
}

#[derive(Clone)]
pub struct StatsService {
    stats: StatsRepository,
    submissions: SubmissionRepository,
    clock: Arc<dyn Clock>,
}

impl StatsService {
    pub fn new(
        stats: StatsRepository,
        submissions: SubmissionRepository,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            stats,
            submissions,
            clock,
        }
    }

    /// Credits a submission. The `counted_at` marker on the submission row
    /// is the at-least-once guard: whoever wins it applies the points and
    /// streak delta, every retry after that is a successful no-op (None).
    pub async fn on_submission(
        &self,
        squad_id: Uuid,
        member_id: &str,
        points: i64,
        submission_id: Uuid,
    ) -> Result<Option<MemberStats>, AppError> {
        let now = self.clock.now();

        if !self.submissions.mark_counted(submission_id, now).await? {
            return Ok(None);
        }

        let today = self.clock.today();
        let yesterday = today - Days::new(1);

        let stats = self
            .stats
            .apply_participation(squad_id, member_id, points, today, yesterday, now)
            .await?;

        Ok(Some(stats))
    }

    /// Penalty for a member with no submission when an event finalized.
    /// Only invoked from the finalize gate, which already guarantees
    /// at-most-once per (event, member).
    pub async fn on_missed_event(
        &self,
        squad_id: Uuid,
        member_id: &str,
    ) -> Result<MemberStats, AppError> {
        let stats = self
            .stats
            .apply_miss_penalty(squad_id, member_id, MISS_PENALTY, self.clock.now())
            .await?;

        Ok(stats)
    }

    /// Period-boundary job: zero out everyone's weekly points.
    pub async fn reset_weekly(&self) -> Result<u64, AppError> {
        let affected = self.stats.reset_weekly(self.clock.now()).await?;
        log::info!("weekly reset touched {} member(s)", affected);
        Ok(affected)
    }

    /// Period-boundary job: every positive strike counter drops by one.
    pub async fn decay_strikes(&self) -> Result<u64, AppError> {
        let affected = self.stats.decay_strikes(self.clock.now()).await?;
        log::info!("strike decay touched {} member(s)", affected);
        Ok(affected)
    }

    pub async fn squad_stats(&self, squad_id: Uuid) -> Result<Vec<MemberStats>, AppError> {
        Ok(self.stats.get_for_squad(squad_id).await?)
    }

    pub async fn member_stats(
        &self,
        squad_id: Uuid,
        member_id: &str,
    ) -> Result<Option<MemberStats>, AppError> {
        Ok(self.stats.get(squad_id, member_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn podium_points_taper_to_base() {
        assert_eq!(points_for(EventType::TimedScore, Some(1)), 25);
        assert_eq!(points_for(EventType::TimedScore, Some(2)), 20);
        assert_eq!(points_for(EventType::TimedScore, Some(3)), 15);
        assert_eq!(points_for(EventType::TimedScore, Some(4)), BASE_POINTS);
    }

    #[test]
    fn unranked_types_earn_flat_points() {
        assert_eq!(points_for(EventType::Vote, None), BASE_POINTS);
        assert_eq!(points_for(EventType::Media, None), BASE_POINTS);
        assert_eq!(points_for(EventType::TimedScore, None), BASE_POINTS);
    }

    #[test]
    fn manual_clock_day_math() {
        let clock = super::super::clock::ManualClock::at("2025-03-01T12:00:00Z".parse().unwrap());
        assert_eq!(clock.today().to_string(), "2025-03-01");
        clock.advance(chrono::Duration::days(1));
        assert_eq!(clock.today().to_string(), "2025-03-02");
    }
}
