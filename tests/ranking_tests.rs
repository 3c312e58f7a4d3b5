use std::collections::HashMap;

use chrono::Duration;
use pretty_assertions::assert_eq;

use gauntlet_be::database::models::EventType;

mod common;

use common::{
    TestCtx, seed_open_event, seed_ranked_event, seed_squad, submit_score, submit_vote,
};

#[tokio::test]
async fn scores_rank_ascending_with_dense_one_based_ranks() {
    let ctx = TestCtx::new().await.unwrap();
    let squad = seed_squad(&ctx, &["m1", "m2", "m3"]).await;
    let event = seed_ranked_event(&ctx, squad.id).await;

    let by_member: HashMap<String, i64> = ctx
        .submission_repo
        .get_by_event(event.id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| (s.member_id, s.rank.unwrap()))
        .collect();

    // scores: m1 = 120, m2 = 95, m3 = 310; lower is better
    assert_eq!(by_member["m1"], 2);
    assert_eq!(by_member["m2"], 1);
    assert_eq!(by_member["m3"], 3);
}

#[tokio::test]
async fn reranking_a_ranked_event_changes_nothing() {
    let ctx = TestCtx::new().await.unwrap();
    let squad = seed_squad(&ctx, &["m1", "m2", "m3"]).await;
    let event = seed_ranked_event(&ctx, squad.id).await;

    let first = ctx.submission_repo.get_by_event(event.id).await.unwrap();

    ctx.submission_repo.rank_event(event.id).await.unwrap();

    let second = ctx.submission_repo.get_by_event(event.id).await.unwrap();
    let ranks = |subs: &[gauntlet_be::database::models::Submission]| {
        subs.iter()
            .map(|s| (s.member_id.clone(), s.rank))
            .collect::<Vec<_>>()
    };
    assert_eq!(ranks(&first), ranks(&second));
}

#[tokio::test]
async fn equal_scores_break_ties_by_submission_time() {
    let ctx = TestCtx::new().await.unwrap();
    let squad = seed_squad(&ctx, &["m1", "m2"]).await;
    let event = seed_open_event(&ctx, squad.id, EventType::TimedScore).await;

    submit_score(&ctx, event.id, "m2", 100.0).await;
    ctx.clock.advance(Duration::seconds(30));
    submit_score(&ctx, event.id, "m1", 100.0).await;

    ctx.lifecycle.close(event.id).await.unwrap();

    let by_member: HashMap<String, i64> = ctx
        .submission_repo
        .get_by_event(event.id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| (s.member_id, s.rank.unwrap()))
        .collect();

    // m2 submitted the same score first and takes the better rank
    assert_eq!(by_member["m2"], 1);
    assert_eq!(by_member["m1"], 2);
}

#[tokio::test]
async fn vote_events_expose_an_ordered_tally_and_no_ranks() {
    let ctx = TestCtx::new().await.unwrap();
    let squad = seed_squad(&ctx, &["m1", "m2", "m3", "m4"]).await;
    let event = seed_open_event(&ctx, squad.id, EventType::Vote).await;

    submit_vote(&ctx, event.id, "m1", "pizza").await;
    submit_vote(&ctx, event.id, "m2", "pizza").await;
    submit_vote(&ctx, event.id, "m3", "tacos").await;
    submit_vote(&ctx, event.id, "m4", "pizza").await;

    ctx.lifecycle.close(event.id).await.unwrap();

    let tally = ctx.submissions.tally(event.id).await.unwrap();
    assert_eq!(tally.len(), 2);
    assert_eq!((tally[0].choice.as_str(), tally[0].count), ("pizza", 3));
    assert_eq!((tally[1].choice.as_str(), tally[1].count), ("tacos", 1));

    // No individual rank is ever written for a vote event
    let submissions = ctx.submission_repo.get_by_event(event.id).await.unwrap();
    assert!(submissions.iter().all(|s| s.rank.is_none()));
}

#[tokio::test]
async fn media_events_are_never_ranked_and_award_nothing() {
    let ctx = TestCtx::new().await.unwrap();
    let squad = seed_squad(&ctx, &["m1", "m2"]).await;
    let event = seed_open_event(&ctx, squad.id, EventType::Media).await;

    ctx.submissions
        .submit(
            event.id,
            "m1",
            &gauntlet_be::database::models::SubmissionPayload::Media {
                media_ref: "media/abc123".to_string(),
            },
        )
        .await
        .unwrap();

    ctx.lifecycle.close(event.id).await.unwrap();
    ctx.lifecycle.finalize(event.id).await.unwrap();

    let submissions = ctx.submission_repo.get_by_event(event.id).await.unwrap();
    assert!(submissions.iter().all(|s| s.rank.is_none()));

    // First/last place are undefined: no crown, no underdog power
    assert!(
        ctx.crown_repo
            .get_by_event(squad.id, event.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        ctx.power_repo
            .get_by_source_event(event.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn duplicate_and_mismatched_submissions_are_rejected() {
    let ctx = TestCtx::new().await.unwrap();
    let squad = seed_squad(&ctx, &["m1", "m2"]).await;
    let event = seed_open_event(&ctx, squad.id, EventType::TimedScore).await;

    submit_score(&ctx, event.id, "m1", 42.0).await;

    let err = ctx
        .submissions
        .submit(
            event.id,
            "m1",
            &gauntlet_be::database::models::SubmissionPayload::TimedScore { score: 41.0 },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, gauntlet_be::AppError::DuplicateSubmission(_)));

    let err = ctx
        .submissions
        .submit(
            event.id,
            "m2",
            &gauntlet_be::database::models::SubmissionPayload::Vote {
                choice: "pizza".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, gauntlet_be::AppError::ValidationFailed(_)));

    let err = ctx
        .submissions
        .submit(
            event.id,
            "outsider",
            &gauntlet_be::database::models::SubmissionPayload::TimedScore { score: 1.0 },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, gauntlet_be::AppError::Forbidden(_)));
}
