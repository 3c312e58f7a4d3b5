use actix_web::{App, http::StatusCode, test, web};
use chrono::Duration;
use pretty_assertions::assert_eq;
use serial_test::serial;

use gauntlet_be::database::models::{DailyEvent, MemberStats, Squad, Submission};
use gauntlet_be::handlers::shared::ApiResponse;
use gauntlet_be::handlers::{events, squads, stats, submissions};
use gauntlet_be::services::Clock;

mod common;

use common::TestCtx;

// Builds the handler app over a test context's services
macro_rules! test_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.squads.clone()))
                .app_data(web::Data::new($ctx.submissions.clone()))
                .app_data(web::Data::new($ctx.stats.clone()))
                .app_data(web::Data::new($ctx.lifecycle.clone()))
                .service(
                    web::scope("/api/v1")
                        .service(
                            web::scope("/squads")
                                .route("", web::post().to(squads::create_squad))
                                .route("/join", web::post().to(squads::join_squad))
                                .route("/{id}/members", web::get().to(squads::get_members))
                                .route("/{id}/stats", web::get().to(stats::get_squad_stats)),
                        )
                        .service(
                            web::scope("/events")
                                .route("", web::post().to(events::create_event))
                                .route("/{id}/open", web::post().to(events::open_event))
                                .route("/{id}/close", web::post().to(events::close_event))
                                .route("/{id}/finalize", web::post().to(events::finalize_event))
                                .route("/{id}/submissions", web::post().to(submissions::submit))
                                .route(
                                    "/{id}/submissions",
                                    web::get().to(submissions::get_submissions),
                                ),
                        ),
                ),
        )
        .await
    };
}

#[actix_web::test]
#[serial]
async fn requests_without_identity_are_unauthorized() {
    let ctx = TestCtx::new().await.unwrap();
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/squads")
        .set_json(serde_json::json!({"name": "No Identity"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn full_event_day_over_http() {
    let ctx = TestCtx::new().await.unwrap();
    let app = test_app!(ctx);

    // m1 founds the squad
    let req = test::TestRequest::post()
        .uri("/api/v1/squads")
        .insert_header(("X-Member-Id", "m1"))
        .set_json(serde_json::json!({"name": "Road Runners"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: ApiResponse<Squad> = test::read_body_json(resp).await;
    let squad = body.data.unwrap();

    // m2 joins with the invite code
    let req = test::TestRequest::post()
        .uri("/api/v1/squads/join")
        .insert_header(("X-Member-Id", "m2"))
        .set_json(serde_json::json!({"invite_code": squad.invite_code}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The scheduler registers today's event
    let now = ctx.clock.now();
    let req = test::TestRequest::post()
        .uri("/api/v1/events")
        .set_json(serde_json::json!({
            "squad_id": squad.id,
            "event_date": ctx.clock.today(),
            "event_type": "timed-score",
            "open_at": now - Duration::minutes(5),
            "close_at": now + Duration::hours(2),
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: ApiResponse<DailyEvent> = test::read_body_json(resp).await;
    let event = body.data.unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/events/{}/open", event.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Both members race the course
    for (member, score) in [("m1", 88.5), ("m2", 72.0)] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/events/{}/submissions", event.id))
            .insert_header(("X-Member-Id", member))
            .set_json(serde_json::json!({"kind": "timed-score", "score": score}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // A second submission from the same member conflicts
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/events/{}/submissions", event.id))
        .insert_header(("X-Member-Id", "m1"))
        .set_json(serde_json::json!({"kind": "timed-score", "score": 10.0}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    for step in ["close", "finalize"] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/events/{}/{}", event.id, step))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/events/{}/submissions", event.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ApiResponse<Vec<Submission>> = test::read_body_json(resp).await;
    let submissions = body.data.unwrap();
    assert_eq!(submissions.len(), 2);
    assert!(submissions.iter().all(|s| s.rank.is_some()));

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/squads/{}/stats", squad.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ApiResponse<Vec<MemberStats>> = test::read_body_json(resp).await;
    let table = body.data.unwrap();
    assert_eq!(table.len(), 2);
    // m2 won the day and leads the table
    assert_eq!(table[0].member_id, "m2");
    assert!(table[0].lifetime_points > table[1].lifetime_points);
}
