#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

use gauntlet_be::database::init_database;
use gauntlet_be::database::models::*;
use gauntlet_be::database::repositories::{
    ChallengeRepository, CrownRepository, EventRepository, PowerRepository, SquadRepository,
    StatsRepository, SubmissionRepository,
};
use gauntlet_be::services::{
    ChangeNotifier, Clock, CrownService, Draw, FixedDraw, JudgeService, LifecycleService,
    LogNotifier, ManualClock, PowerService, SquadService, StatsService, SubmissionService,
};

/// Every test gets its own throwaway database file.
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/test.db", temp_dir.path().display());
        let pool = init_database(&database_url).await?;

        Ok(TestDb {
            pool,
            _temp_dir: temp_dir,
        })
    }
}

/// Fixed point in time all tests start from.
pub fn t0() -> DateTime<Utc> {
    "2025-06-01T12:00:00Z".parse().unwrap()
}

/// Full service stack over one test database, driven by a manual clock and
/// a pinned draw.
pub struct TestCtx {
    pub db: TestDb,
    pub clock: Arc<ManualClock>,
    pub squads: SquadService,
    pub submissions: SubmissionService,
    pub stats: StatsService,
    pub powers: PowerService,
    pub crowns: CrownService,
    pub judges: JudgeService,
    pub lifecycle: LifecycleService,
    pub squad_repo: SquadRepository,
    pub event_repo: EventRepository,
    pub submission_repo: SubmissionRepository,
    pub stats_repo: StatsRepository,
    pub power_repo: PowerRepository,
    pub crown_repo: CrownRepository,
    pub challenge_repo: ChallengeRepository,
}

impl TestCtx {
    pub async fn new() -> Result<Self> {
        // Index 0 pins underdog awards to target-lock
        Self::with_draw(Arc::new(FixedDraw(0))).await
    }

    pub async fn with_draw(draw: Arc<dyn Draw>) -> Result<Self> {
        let db = TestDb::new().await?;
        let clock = Arc::new(ManualClock::at(t0()));
        let clock_dyn: Arc<dyn Clock> = clock.clone();
        let notifier: Arc<dyn ChangeNotifier> = Arc::new(LogNotifier);

        let squad_repo = SquadRepository::new(db.pool.clone());
        let event_repo = EventRepository::new(db.pool.clone());
        let submission_repo = SubmissionRepository::new(db.pool.clone());
        let stats_repo = StatsRepository::new(db.pool.clone());
        let power_repo = PowerRepository::new(db.pool.clone());
        let crown_repo = CrownRepository::new(db.pool.clone());
        let challenge_repo = ChallengeRepository::new(db.pool.clone());

        let squads = SquadService::new(squad_repo.clone(), clock_dyn.clone(), notifier.clone());
        let submissions = SubmissionService::new(
            event_repo.clone(),
            submission_repo.clone(),
            squad_repo.clone(),
            clock_dyn.clone(),
            notifier.clone(),
        );
        let stats = StatsService::new(
            stats_repo.clone(),
            submission_repo.clone(),
            clock_dyn.clone(),
        );
        let powers = PowerService::new(
            power_repo.clone(),
            submission_repo.clone(),
            event_repo.clone(),
            squad_repo.clone(),
            clock_dyn.clone(),
            draw.clone(),
            notifier.clone(),
        );
        let crowns = CrownService::new(
            crown_repo.clone(),
            submission_repo.clone(),
            event_repo.clone(),
            squad_repo.clone(),
            clock_dyn.clone(),
            notifier.clone(),
        );
        let judges = JudgeService::new(
            squad_repo.clone(),
            challenge_repo.clone(),
            clock_dyn.clone(),
            draw.clone(),
            notifier.clone(),
        );
        let lifecycle = LifecycleService::new(
            event_repo.clone(),
            submission_repo.clone(),
            squad_repo.clone(),
            stats.clone(),
            powers.clone(),
            crowns.clone(),
            judges.clone(),
            clock_dyn.clone(),
            notifier.clone(),
        );

        Ok(TestCtx {
            db,
            clock,
            squads,
            submissions,
            stats,
            powers,
            crowns,
            judges,
            lifecycle,
            squad_repo,
            event_repo,
            submission_repo,
            stats_repo,
            power_repo,
            crown_repo,
            challenge_repo,
        })
    }
}

/// Creates a squad with the given members; the first becomes its admin.
pub async fn seed_squad(ctx: &TestCtx, members: &[&str]) -> Squad {
    let squad = ctx
        .squads
        .create_squad(
            &CreateSquadInput {
                name: "Test Squad".to_string(),
                timezone: None,
            },
            members[0],
        )
        .await
        .unwrap();

    for member in &members[1..] {
        ctx.squads
            .join_squad(&squad.invite_code, member)
            .await
            .unwrap();
    }

    squad
}

/// Creates today's event, already open (open_at slightly in the past).
pub async fn seed_open_event(ctx: &TestCtx, squad_id: Uuid, event_type: EventType) -> DailyEvent {
    seed_open_event_on(ctx, squad_id, event_type, ctx.clock.today()).await
}

pub async fn seed_open_event_on(
    ctx: &TestCtx,
    squad_id: Uuid,
    event_type: EventType,
    event_date: NaiveDate,
) -> DailyEvent {
    let now = ctx.clock.now();
    let event = ctx
        .lifecycle
        .create_event(&CreateEventInput {
            squad_id,
            event_date,
            event_type,
            open_at: now - Duration::minutes(5),
            close_at: now + Duration::hours(2),
        })
        .await
        .unwrap();

    ctx.lifecycle.open(event.id).await.unwrap()
}

pub async fn submit_score(ctx: &TestCtx, event_id: Uuid, member: &str, score: f64) -> Submission {
    ctx.submissions
        .submit(event_id, member, &SubmissionPayload::TimedScore { score })
        .await
        .unwrap()
}

pub async fn submit_vote(ctx: &TestCtx, event_id: Uuid, member: &str, choice: &str) -> Submission {
    ctx.submissions
        .submit(
            event_id,
            member,
            &SubmissionPayload::Vote {
                choice: choice.to_string(),
            },
        )
        .await
        .unwrap()
}

/// Canonical three-finisher event: scores 120 / 95 / 310 for m1 / m2 / m3,
/// closed and ranked.
pub async fn seed_ranked_event(ctx: &TestCtx, squad_id: Uuid) -> DailyEvent {
    let event = seed_open_event(ctx, squad_id, EventType::TimedScore).await;
    submit_score(ctx, event.id, "m1", 120.0).await;
    submit_score(ctx, event.id, "m2", 95.0).await;
    submit_score(ctx, event.id, "m3", 310.0).await;
    ctx.lifecycle.close(event.id).await.unwrap()
}
