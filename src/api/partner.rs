use actix_web::{get, put, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::auth::access::check_project_member;
use crate::entity::project::Entity as ProjectEntity;
use crate::entity::user::Entity as UserEntity;
use crate::model::global_error::{AppError, ErrorCode};
use crate::model::partner::{PartnerAccessResponse, PartnerDetails, PartnerProjectsUpdateRequest, PartnerSummary};
use crate::partner::{Feature, PartnerService};

#[utoipa::path(
    get,
    path = "/api/partners",
    summary = "파트너 목록 조회",
    responses(
        (status = 200, description = "등록된 파트너 목록", body = Vec<PartnerDetails>),
        (status = 403, description = "관리자만 조회 가능"),
    ),
    tag = "partner",
)]
#[get("/partners")]
pub async fn list_partners(
    db: web::Data<DatabaseConnection>,
    partners: web::Data<PartnerService>,
    auth_user: web::ReqData<i32>,
) -> Result<HttpResponse, AppError> {
    check_admin(db.get_ref(), *auth_user).await?;

    let list = partners.list().await?;
    Ok(HttpResponse::Ok().json(list))
}

#[utoipa::path(
    get,
    path = "/api/partners/{code}",
    summary = "파트너 상세 조회",
    params(
        ("code", description = "파트너 코드", example = "example"),
    ),
    responses(
        (status = 200, description = "파트너 상세", body = PartnerDetails),
        (status = 404, description = "등록되지 않은 파트너"),
    ),
    tag = "partner",
)]
#[get("/partners/{code}")]
pub async fn get_partner(
    db: web::Data<DatabaseConnection>,
    partners: web::Data<PartnerService>,
    path: web::Path<String>,
    auth_user: web::ReqData<i32>,
) -> Result<HttpResponse, AppError> {
    let par_code = path.into_inner();
    check_admin(db.get_ref(), *auth_user).await?;
    check_registered(&partners, &par_code)?;

    let details = partners.details(&par_code).await?;
    Ok(HttpResponse::Ok().json(details))
}

#[utoipa::path(
    put,
    path = "/api/partners/{code}/projects",
    summary = "파트너가 활성화된 프로젝트 변경",
    request_body = PartnerProjectsUpdateRequest,
    params(
        ("code", description = "파트너 코드", example = "example"),
    ),
    responses(
        (status = 200, description = "변경된 파트너 상세", body = PartnerDetails),
        (status = 404, description = "등록되지 않은 파트너"),
    ),
    tag = "partner",
)]
#[put("/partners/{code}/projects")]
pub async fn update_partner_projects(
    db: web::Data<DatabaseConnection>,
    partners: web::Data<PartnerService>,
    path: web::Path<String>,
    body: web::Json<PartnerProjectsUpdateRequest>,
    auth_user: web::ReqData<i32>,
) -> Result<HttpResponse, AppError> {
    let par_code = path.into_inner();
    check_admin(db.get_ref(), *auth_user).await?;
    check_registered(&partners, &par_code)?;

    for project_id in &body.projects {
        ProjectEntity::find_by_id(*project_id)
            .one(db.get_ref())
            .await?
            .ok_or_else(|| AppError::with_detail(ErrorCode::ProjectNotFound, project_id.to_string()))?;
    }

    partners.update(&par_code, &body.projects).await?;

    let details = partners.details(&par_code).await?;
    Ok(HttpResponse::Ok().json(details))
}

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/partners",
    summary = "프로젝트에 활성화된 파트너 조회",
    params(
        ("project_id", description = "프로젝트 ID", example = 1),
    ),
    responses(
        (status = 200, description = "파트너 코드별 이름", body = std::collections::BTreeMap<String, PartnerSummary>),
    ),
    tag = "partner",
)]
#[get("/projects/{project_id}/partners")]
pub async fn list_project_partners(
    db: web::Data<DatabaseConnection>,
    partners: web::Data<PartnerService>,
    path: web::Path<i32>,
    auth_user: web::ReqData<i32>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();

    ProjectEntity::find_by_id(project_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::ProjectNotFound))?;

    check_project_member(db.get_ref(), project_id, *auth_user).await?;

    let list = partners.partners_by_project(project_id).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[utoipa::path(
    get,
    path = "/api/me/features/{feature}",
    summary = "로그인 사용자의 파트너 기능 권한 조회",
    params(
        ("feature", description = "기능 이름", example = "reports"),
    ),
    responses(
        (status = 200, description = "파트너 백엔드의 판단", body = PartnerAccessResponse),
    ),
    tag = "partner",
)]
#[get("/me/features/{feature}")]
pub async fn get_feature_access(
    db: web::Data<DatabaseConnection>,
    partners: web::Data<PartnerService>,
    path: web::Path<Feature>,
    auth_user: web::ReqData<i32>,
) -> Result<HttpResponse, AppError> {
    let user_id = *auth_user;

    let user = UserEntity::find_by_id(user_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::MemberNotFound))?;

    let access = partners.can_user_access_feature(user_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(PartnerAccessResponse {
        par_code: user.partner_code().map(str::to_string),
        access,
    }))
}

pub async fn check_admin(db: &DatabaseConnection, user_id: i32) -> Result<(), AppError> {
    let user = UserEntity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::MemberNotFound))?;

    if !user.is_admin() {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }

    Ok(())
}

/// 요청 경로로 들어온 코드는 등록되지 않았으면 404 로 응답한다.
pub fn check_registered(partners: &PartnerService, par_code: &str) -> Result<(), AppError> {
    if !partners.registry().contains(par_code) {
        return Err(AppError::with_detail(ErrorCode::PartnerNotFound, par_code.to_string()));
    }
    Ok(())
}
