use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use crate::database::models::{Crown, HeadlineInput, RivalryInput};
use crate::handlers::shared::ApiResponse;
use crate::services::{CrownService, MemberIdentity};

pub async fn award_crown(
    svc: web::Data<CrownService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match svc.award_crown(path.into_inner()).await? {
        Some(crown) => Ok(HttpResponse::Ok().json(ApiResponse::success(crown))),
        None => Ok(HttpResponse::Ok().json(ApiResponse::<Crown>::success_with_message(
            None,
            "no ranked winner",
        ))),
    }
}

pub async fn create_headline(
    identity: MemberIdentity,
    svc: web::Data<CrownService>,
    path: web::Path<Uuid>,
    input: web::Json<HeadlineInput>,
) -> Result<HttpResponse> {
    let headline = svc
        .create_headline(path.into_inner(), &identity.member_id, &input.content)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(headline)))
}

pub async fn declare_rivalry(
    identity: MemberIdentity,
    svc: web::Data<CrownService>,
    path: web::Path<Uuid>,
    input: web::Json<RivalryInput>,
) -> Result<HttpResponse> {
    let rivalry = svc
        .declare_rivalry(
            path.into_inner(),
            &identity.member_id,
            &input.rival_a,
            &input.rival_b,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(rivalry)))
}

pub async fn get_active_reign(
    svc: web::Data<CrownService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let reign = svc.active_reign(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(reign)))
}
