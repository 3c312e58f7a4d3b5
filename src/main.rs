use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use gauntlet_be::Config;
use gauntlet_be::database::{
    init_database,
    repositories::{
        ChallengeRepository, CrownRepository, EventRepository, PowerRepository, SquadRepository,
        StatsRepository, SubmissionRepository,
    },
};
use gauntlet_be::handlers::{challenges, crowns, events, powers, squads, stats, submissions};
use gauntlet_be::services::{
    ChangeNotifier, Clock, CrownService, Draw, JudgeService, LifecycleService, LogNotifier,
    PowerService, RandomDraw, SquadService, StatsService, SubmissionService, SystemClock,
};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Gauntlet API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    println!("Starting Gauntlet API server...");

    // Load configuration
    let config = Config::from_env()?;
    println!(
        "Configuration loaded (environment: {})",
        config.environment
    );

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    println!("Database initialized");

    // Repositories
    let squad_repo = SquadRepository::new(pool.clone());
    let event_repo = EventRepository::new(pool.clone());
    let submission_repo = SubmissionRepository::new(pool.clone());
    let stats_repo = StatsRepository::new(pool.clone());
    let power_repo = PowerRepository::new(pool.clone());
    let crown_repo = CrownRepository::new(pool.clone());
    let challenge_repo = ChallengeRepository::new(pool.clone());

    // Shared seams: wall clock, randomness, change delivery
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let draw: Arc<dyn Draw> = Arc::new(RandomDraw);
    let notifier: Arc<dyn ChangeNotifier> = Arc::new(LogNotifier);

    // Services
    let squad_service = SquadService::new(squad_repo.clone(), clock.clone(), notifier.clone());
    let submission_service = SubmissionService::new(
        event_repo.clone(),
        submission_repo.clone(),
        squad_repo.clone(),
        clock.clone(),
        notifier.clone(),
    );
    let stats_service = StatsService::new(
        stats_repo.clone(),
        submission_repo.clone(),
        clock.clone(),
    );
    let power_service = PowerService::new(
        power_repo.clone(),
        submission_repo.clone(),
        event_repo.clone(),
        squad_repo.clone(),
        clock.clone(),
        draw.clone(),
        notifier.clone(),
    );
    let crown_service = CrownService::new(
        crown_repo.clone(),
        submission_repo.clone(),
        event_repo.clone(),
        squad_repo.clone(),
        clock.clone(),
        notifier.clone(),
    );
    let judge_service = JudgeService::new(
        squad_repo.clone(),
        challenge_repo.clone(),
        clock.clone(),
        draw.clone(),
        notifier.clone(),
    );
    let lifecycle_service = LifecycleService::new(
        event_repo.clone(),
        submission_repo.clone(),
        squad_repo.clone(),
        stats_service.clone(),
        power_service.clone(),
        crown_service.clone(),
        judge_service.clone(),
        clock.clone(),
        notifier.clone(),
    );

    let squad_svc_data = web::Data::new(squad_service);
    let submission_svc_data = web::Data::new(submission_service);
    let stats_svc_data = web::Data::new(stats_service);
    let power_svc_data = web::Data::new(power_service);
    let crown_svc_data = web::Data::new(crown_service);
    let judge_svc_data = web::Data::new(judge_service);
    let lifecycle_svc_data = web::Data::new(lifecycle_service);

    let server_address = config.server_address();
    println!("Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(squad_svc_data.clone())
            .app_data(submission_svc_data.clone())
            .app_data(stats_svc_data.clone())
            .app_data(power_svc_data.clone())
            .app_data(crown_svc_data.clone())
            .app_data(judge_svc_data.clone())
            .app_data(lifecycle_svc_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type", "Accept", "X-Member-Id"])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/squads")
                            .route("", web::post().to(squads::create_squad))
                            .route("/join", web::post().to(squads::join_squad))
                            .route("/{id}", web::get().to(squads::get_squad))
                            .route("/{id}/members", web::get().to(squads::get_members))
                            .route("/{id}/stats", web::get().to(stats::get_squad_stats))
                            .route("/{id}/stats/me", web::get().to(stats::get_member_stats))
                            .route("/{id}/crown", web::get().to(crowns::get_active_reign))
                            .route(
                                "/{id}/powers/active",
                                web::get().to(powers::get_active_powers),
                            )
                            .route("/{id}/judge", web::post().to(challenges::select_judge)),
                    )
                    .service(
                        web::scope("/events")
                            .route("", web::post().to(events::create_event))
                            .route("/{id}", web::get().to(events::get_event))
                            .route("/{id}/open", web::post().to(events::open_event))
                            .route("/{id}/close", web::post().to(events::close_event))
                            .route("/{id}/finalize", web::post().to(events::finalize_event))
                            .route("/{id}/submissions", web::post().to(submissions::submit))
                            .route(
                                "/{id}/submissions",
                                web::get().to(submissions::get_submissions),
                            )
                            .route("/{id}/tally", web::get().to(submissions::get_tally))
                            .route("/{id}/underdog", web::post().to(powers::award_underdog))
                            .route("/{id}/crown", web::post().to(crowns::award_crown)),
                    )
                    .service(
                        web::scope("/powers")
                            .route("/{id}", web::get().to(powers::get_power))
                            .route("/{id}/use", web::post().to(powers::use_power)),
                    )
                    .service(
                        web::scope("/crowns")
                            .route("/{id}/headline", web::post().to(crowns::create_headline))
                            .route("/{id}/rivalry", web::post().to(crowns::declare_rivalry)),
                    )
                    .service(
                        web::scope("/challenges")
                            .route("", web::post().to(challenges::open_challenge))
                            .route("/{id}", web::get().to(challenges::get_challenge))
                            .route("/{id}/votes", web::post().to(challenges::cast_vote)),
                    )
                    .service(
                        web::scope("/jobs")
                            .route("/reset-weekly", web::post().to(stats::reset_weekly))
                            .route("/decay-strikes", web::post().to(stats::decay_strikes))
                            .route(
                                "/sweep-challenges",
                                web::post().to(challenges::sweep_challenges),
                            )
                            .route(
                                "/missed-penalty",
                                web::post().to(stats::apply_missed_penalty),
                            ),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
