use chrono::Duration;
use pretty_assertions::assert_eq;

use gauntlet_be::AppError;
use gauntlet_be::database::models::{CreateEventInput, EventStatus, EventType, SubmissionPayload};
use gauntlet_be::services::Clock;

mod common;

use common::{TestCtx, seed_open_event, seed_ranked_event, seed_squad, submit_score};

#[tokio::test]
async fn open_before_scheduled_time_is_rejected() {
    let ctx = TestCtx::new().await.unwrap();
    let squad = seed_squad(&ctx, &["m1", "m2"]).await;

    let now = ctx.clock.now();
    let event = ctx
        .lifecycle
        .create_event(&CreateEventInput {
            squad_id: squad.id,
            event_date: ctx.clock.today(),
            event_type: EventType::TimedScore,
            open_at: now + Duration::hours(1),
            close_at: now + Duration::hours(3),
        })
        .await
        .unwrap();

    let err = ctx.lifecycle.open(event.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    // Once the clock catches up the same call succeeds
    ctx.clock.advance(Duration::hours(1));
    let opened = ctx.lifecycle.open(event.id).await.unwrap();
    assert_eq!(opened.status, EventStatus::Open);
}

#[tokio::test]
async fn open_assigns_a_judge_from_the_squad() {
    let ctx = TestCtx::new().await.unwrap();
    let squad = seed_squad(&ctx, &["m1", "m2", "m3"]).await;

    let event = seed_open_event(&ctx, squad.id, EventType::TimedScore).await;

    let judge = event.judge_member_id.expect("judge assigned on open");
    assert!(["m1", "m2", "m3"].contains(&judge.as_str()));
}

#[tokio::test]
async fn open_twice_is_an_invalid_transition() {
    let ctx = TestCtx::new().await.unwrap();
    let squad = seed_squad(&ctx, &["m1", "m2"]).await;
    let event = seed_open_event(&ctx, squad.id, EventType::TimedScore).await;

    let err = ctx.lifecycle.open(event.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
}

#[tokio::test]
async fn close_ranks_and_rejects_late_submissions() {
    let ctx = TestCtx::new().await.unwrap();
    let squad = seed_squad(&ctx, &["m1", "m2", "m3"]).await;
    let event = seed_ranked_event(&ctx, squad.id).await;

    assert_eq!(event.status, EventStatus::Closed);

    // A submission arriving after close is rejected, never silently ranked
    let err = ctx
        .submissions
        .submit(
            event.id,
            "m1",
            &SubmissionPayload::TimedScore { score: 1.0 },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EventNotOpen(_)));

    let ranked = ctx.submission_repo.get_by_event(event.id).await.unwrap();
    assert!(ranked.iter().all(|s| s.rank.is_some()));
}

#[tokio::test]
async fn close_requires_an_open_event() {
    let ctx = TestCtx::new().await.unwrap();
    let squad = seed_squad(&ctx, &["m1", "m2"]).await;

    let now = ctx.clock.now();
    let event = ctx
        .lifecycle
        .create_event(&CreateEventInput {
            squad_id: squad.id,
            event_date: ctx.clock.today(),
            event_type: EventType::TimedScore,
            open_at: now,
            close_at: now + Duration::hours(2),
        })
        .await
        .unwrap();

    // Still scheduled
    let err = ctx.lifecycle.close(event.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    // Closing twice is the same violation
    ctx.lifecycle.open(event.id).await.unwrap();
    ctx.lifecycle.close(event.id).await.unwrap();
    let err = ctx.lifecycle.close(event.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
}

#[tokio::test]
async fn duplicate_event_for_same_date_is_rejected() {
    let ctx = TestCtx::new().await.unwrap();
    let squad = seed_squad(&ctx, &["m1", "m2"]).await;
    seed_open_event(&ctx, squad.id, EventType::TimedScore).await;

    let now = ctx.clock.now();
    let err = ctx
        .lifecycle
        .create_event(&CreateEventInput {
            squad_id: squad.id,
            event_date: ctx.clock.today(),
            event_type: EventType::Vote,
            open_at: now,
            close_at: now + Duration::hours(2),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));
}

#[tokio::test]
async fn finalize_is_idempotent_and_awards_once() {
    let ctx = TestCtx::new().await.unwrap();
    let squad = seed_squad(&ctx, &["m1", "m2", "m3"]).await;
    let event = seed_ranked_event(&ctx, squad.id).await;

    let finalized = ctx.lifecycle.finalize(event.id).await.unwrap();
    assert_eq!(finalized.status, EventStatus::Finalized);

    let stats_first = ctx.stats.squad_stats(squad.id).await.unwrap();

    // Redelivery: same terminal state, no second round of awards
    let again = ctx.lifecycle.finalize(event.id).await.unwrap();
    assert_eq!(again.status, EventStatus::Finalized);

    let stats_second = ctx.stats.squad_stats(squad.id).await.unwrap();
    for (a, b) in stats_first.iter().zip(stats_second.iter()) {
        assert_eq!(a.weekly_points, b.weekly_points);
        assert_eq!(a.lifetime_points, b.lifetime_points);
        assert_eq!(a.streak_length, b.streak_length);
        assert_eq!(a.strike_count, b.strike_count);
    }
}

#[tokio::test]
async fn finalize_requires_a_closed_event() {
    let ctx = TestCtx::new().await.unwrap();
    let squad = seed_squad(&ctx, &["m1", "m2"]).await;
    let event = seed_open_event(&ctx, squad.id, EventType::TimedScore).await;

    let err = ctx.lifecycle.finalize(event.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
}

#[tokio::test]
async fn finalize_penalizes_members_without_a_submission() {
    let ctx = TestCtx::new().await.unwrap();
    let squad = seed_squad(&ctx, &["m1", "m2", "m3"]).await;
    let event = seed_open_event(&ctx, squad.id, EventType::TimedScore).await;

    submit_score(&ctx, event.id, "m1", 50.0).await;
    submit_score(&ctx, event.id, "m2", 60.0).await;

    ctx.lifecycle.close(event.id).await.unwrap();
    ctx.lifecycle.finalize(event.id).await.unwrap();

    let loafer = ctx
        .stats
        .member_stats(squad.id, "m3")
        .await
        .unwrap()
        .expect("stats row created by the penalty");

    // Fresh member: penalty floors at zero instead of going negative
    assert_eq!(loafer.weekly_points, 0);
    assert_eq!(loafer.lifetime_points, 0);
    assert_eq!(loafer.streak_length, 0);
    assert_eq!(loafer.strike_count, 1);

    let finisher = ctx
        .stats
        .member_stats(squad.id, "m1")
        .await
        .unwrap()
        .unwrap();
    assert!(finisher.lifetime_points > 0);
    assert_eq!(finisher.streak_length, 1);
}
