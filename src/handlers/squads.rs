use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use crate::database::models::{CreateSquadInput, JoinSquadInput};
use crate::handlers::shared::ApiResponse;
use crate::services::{MemberIdentity, SquadService};

pub async fn create_squad(
    identity: MemberIdentity,
    svc: web::Data<SquadService>,
    input: web::Json<CreateSquadInput>,
) -> Result<HttpResponse> {
    let squad = svc.create_squad(&input, &identity.member_id).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(squad)))
}

pub async fn join_squad(
    identity: MemberIdentity,
    svc: web::Data<SquadService>,
    input: web::Json<JoinSquadInput>,
) -> Result<HttpResponse> {
    let member = svc
        .join_squad(&input.invite_code, &identity.member_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(member)))
}

pub async fn get_squad(
    identity: MemberIdentity,
    svc: web::Data<SquadService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let squad_id = path.into_inner();
    // Membership check rides on the roster call
    svc.get_members(squad_id, &identity.member_id).await?;
    let squad = svc.get_squad(squad_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(squad)))
}

pub async fn get_members(
    identity: MemberIdentity,
    svc: web::Data<SquadService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let members = svc
        .get_members(path.into_inner(), &identity.member_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(members)))
}
