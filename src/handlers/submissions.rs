use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use crate::database::models::SubmissionPayload;
use crate::handlers::shared::ApiResponse;
use crate::services::{MemberIdentity, SubmissionService};

pub async fn submit(
    identity: MemberIdentity,
    svc: web::Data<SubmissionService>,
    path: web::Path<Uuid>,
    input: web::Json<SubmissionPayload>,
) -> Result<HttpResponse> {
    let submission = svc
        .submit(path.into_inner(), &identity.member_id, &input)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(submission)))
}

pub async fn get_submissions(
    svc: web::Data<SubmissionService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let submissions = svc.list(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(submissions)))
}

pub async fn get_tally(
    svc: web::Data<SubmissionService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let tally = svc.tally(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(tally)))
}
