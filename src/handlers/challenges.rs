use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use crate::database::models::{CastVoteInput, OpenChallengeInput};
use crate::handlers::shared::ApiResponse;
use crate::services::{JudgeService, MemberIdentity};

pub async fn open_challenge(
    identity: MemberIdentity,
    svc: web::Data<JudgeService>,
    input: web::Json<OpenChallengeInput>,
) -> Result<HttpResponse> {
    let challenge = svc.open_challenge(&identity.member_id, &input).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(challenge)))
}

pub async fn cast_vote(
    identity: MemberIdentity,
    svc: web::Data<JudgeService>,
    path: web::Path<Uuid>,
    input: web::Json<CastVoteInput>,
) -> Result<HttpResponse> {
    let challenge = svc
        .cast_vote(path.into_inner(), &identity.member_id, input.choice)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(challenge)))
}

pub async fn get_challenge(
    svc: web::Data<JudgeService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let challenge = svc.get_challenge(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(challenge)))
}

/// Job endpoint: resolve active challenges whose deadline has passed.
pub async fn sweep_challenges(svc: web::Data<JudgeService>) -> Result<HttpResponse> {
    let resolved = svc.sweep_expired().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(resolved)))
}

/// Scheduler-facing draw; `open` uses the same selection when an event has
/// no judge yet.
pub async fn select_judge(
    svc: web::Data<JudgeService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let judge = svc.select_judge(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(judge)))
}
