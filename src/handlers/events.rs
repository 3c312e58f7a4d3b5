use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use crate::database::models::CreateEventInput;
use crate::handlers::shared::ApiResponse;
use crate::services::LifecycleService;

/// Scheduler-facing: register the day's event for a squad.
pub async fn create_event(
    svc: web::Data<LifecycleService>,
    input: web::Json<CreateEventInput>,
) -> Result<HttpResponse> {
    let event = svc.create_event(&input).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(event)))
}

pub async fn get_event(
    svc: web::Data<LifecycleService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let event = svc.get_event(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(event)))
}

pub async fn open_event(
    svc: web::Data<LifecycleService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let event = svc.open(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(event)))
}

pub async fn close_event(
    svc: web::Data<LifecycleService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let event = svc.close(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(event)))
}

pub async fn finalize_event(
    svc: web::Data<LifecycleService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let event = svc.finalize(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(event)))
}
