use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use crate::database::models::MissPenaltyInput;
use crate::handlers::shared::ApiResponse;
use crate::services::{MemberIdentity, StatsService};

pub async fn get_squad_stats(
    svc: web::Data<StatsService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let stats = svc.squad_stats(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}

pub async fn get_member_stats(
    identity: MemberIdentity,
    svc: web::Data<StatsService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let stats = svc
        .member_stats(path.into_inner(), &identity.member_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}

/// Period-boundary job endpoints; invoked by the external scheduler, safe
/// to re-run.
pub async fn reset_weekly(svc: web::Data<StatsService>) -> Result<HttpResponse> {
    let affected = svc.reset_weekly().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(affected)))
}

pub async fn decay_strikes(svc: web::Data<StatsService>) -> Result<HttpResponse> {
    let affected = svc.decay_strikes().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(affected)))
}

/// Scheduler escape hatch for redelivered finalize notifications that
/// never reached a member; the normal path is the finalize gate.
pub async fn apply_missed_penalty(
    svc: web::Data<StatsService>,
    input: web::Json<MissPenaltyInput>,
) -> Result<HttpResponse> {
    let stats = svc
        .on_missed_event(input.squad_id, &input.member_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}
