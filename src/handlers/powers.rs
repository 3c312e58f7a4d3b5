use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use crate::database::models::{Power, UsePowerInput};
use crate::handlers::shared::ApiResponse;
use crate::services::{MemberIdentity, PowerService};

/// Invoked when an event finalizes (and on scheduler retries); the grant is
/// keyed by the event, so re-delivery returns the same power.
pub async fn award_underdog(
    svc: web::Data<PowerService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match svc.award_underdog_power(path.into_inner()).await? {
        Some(power) => Ok(HttpResponse::Ok().json(ApiResponse::success(power))),
        None => Ok(HttpResponse::Ok().json(ApiResponse::<Power>::success_with_message(
            None,
            "no eligible finisher",
        ))),
    }
}

pub async fn use_power(
    identity: MemberIdentity,
    svc: web::Data<PowerService>,
    path: web::Path<Uuid>,
    input: web::Json<UsePowerInput>,
) -> Result<HttpResponse> {
    let outcome = svc
        .use_power(
            path.into_inner(),
            &identity.member_id,
            input.into_inner().metadata,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

pub async fn get_power(
    svc: web::Data<PowerService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let power = svc.get_power(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(power)))
}

pub async fn get_active_powers(
    svc: web::Data<PowerService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let powers = svc.active_powers(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(powers)))
}
