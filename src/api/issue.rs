use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::json;
use tracing::info;

use crate::auth::access::{check_issue_access, require_issue_update, require_section};
use crate::entity::issue::ActiveModel as IssueActiveModel;
use crate::history;
use crate::model::global_error::{AppError, ErrorCode};
use crate::model::issue::{IssueResponse, IssueStatusUpdateRequest};
use crate::model::partner::{IssuePartner, IssuePartnersSelectRequest, PartnerSelection};
use crate::partner::{IssueSection, PartnerService};

use super::partner::check_registered;

const ISSUE_UPDATED_SUMMARY: &str = "Issue status changed from '{old}' to '{new}' by {user}";

#[utoipa::path(
    get,
    path = "/api/issues/{issue_id}/partners",
    summary = "이슈에 연결된 파트너 조회",
    params(
        ("issue_id", description = "이슈 ID", example = 42),
    ),
    responses(
        (status = 200, description = "파트너 코드별 이름과 메시지", body = std::collections::BTreeMap<String, IssuePartner>),
    ),
    tag = "issue",
)]
#[get("/issues/{issue_id}/partners")]
pub async fn list_issue_partners(
    db: web::Data<DatabaseConnection>,
    partners: web::Data<PartnerService>,
    path: web::Path<i32>,
    auth_user: web::ReqData<i32>,
) -> Result<HttpResponse, AppError> {
    let issue_id = path.into_inner();

    let access = check_issue_access(db.get_ref(), &partners, issue_id, *auth_user).await?;
    require_section(&partners, &access, IssueSection::Partners).await?;

    let list = partners.partners_by_issue(issue_id).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[utoipa::path(
    put,
    path = "/api/issues/{issue_id}/partners",
    summary = "이슈 파트너 재지정",
    request_body = IssuePartnersSelectRequest,
    params(
        ("issue_id", description = "이슈 ID", example = 42),
    ),
    responses(
        (status = 200, description = "추가/제거된 파트너", body = PartnerSelection),
        (status = 404, description = "등록되지 않은 파트너 코드 포함"),
    ),
    tag = "issue",
)]
#[put("/issues/{issue_id}/partners")]
pub async fn select_issue_partners(
    db: web::Data<DatabaseConnection>,
    partners: web::Data<PartnerService>,
    path: web::Path<i32>,
    body: web::Json<IssuePartnersSelectRequest>,
    auth_user: web::ReqData<i32>,
) -> Result<HttpResponse, AppError> {
    let issue_id = path.into_inner();
    let user_id = *auth_user;

    let access = check_issue_access(db.get_ref(), &partners, issue_id, user_id).await?;
    require_issue_update(&partners, &access).await?;
    for par_code in &body.partners {
        check_registered(&partners, par_code)?;
    }

    let selection = partners.select_partners_for_issue(issue_id, &body.partners, user_id).await?;
    Ok(HttpResponse::Ok().json(selection))
}

#[utoipa::path(
    post,
    path = "/api/issues/{issue_id}/partners/{code}",
    summary = "이슈에 파트너 추가",
    params(
        ("issue_id", description = "이슈 ID", example = 42),
        ("code", description = "파트너 코드", example = "example"),
    ),
    responses(
        (status = 204, description = "추가 완료 (이미 연결된 경우 포함)"),
        (status = 404, description = "등록되지 않은 파트너"),
    ),
    tag = "issue",
)]
#[post("/issues/{issue_id}/partners/{code}")]
pub async fn add_issue_partner(
    db: web::Data<DatabaseConnection>,
    partners: web::Data<PartnerService>,
    path: web::Path<(i32, String)>,
    auth_user: web::ReqData<i32>,
) -> Result<HttpResponse, AppError> {
    let (issue_id, par_code) = path.into_inner();
    let user_id = *auth_user;

    let access = check_issue_access(db.get_ref(), &partners, issue_id, user_id).await?;
    require_issue_update(&partners, &access).await?;
    check_registered(&partners, &par_code)?;

    partners.add_partner_to_issue(issue_id, &par_code, user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    delete,
    path = "/api/issues/{issue_id}/partners/{code}",
    summary = "이슈에서 파트너 제거",
    params(
        ("issue_id", description = "이슈 ID", example = 42),
        ("code", description = "파트너 코드", example = "example"),
    ),
    responses(
        (status = 204, description = "제거 완료"),
        (status = 404, description = "등록되지 않은 파트너"),
    ),
    tag = "issue",
)]
#[delete("/issues/{issue_id}/partners/{code}")]
pub async fn remove_issue_partner(
    db: web::Data<DatabaseConnection>,
    partners: web::Data<PartnerService>,
    path: web::Path<(i32, String)>,
    auth_user: web::ReqData<i32>,
) -> Result<HttpResponse, AppError> {
    let (issue_id, par_code) = path.into_inner();
    let user_id = *auth_user;

    let access = check_issue_access(db.get_ref(), &partners, issue_id, user_id).await?;
    require_issue_update(&partners, &access).await?;
    check_registered(&partners, &par_code)?;

    partners.remove_partner_from_issue(issue_id, &par_code, user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    put,
    path = "/api/issues/{issue_id}/status",
    summary = "이슈 상태 변경",
    request_body = IssueStatusUpdateRequest,
    params(
        ("issue_id", description = "이슈 ID", example = 42),
    ),
    responses(
        (status = 200, description = "변경된 이슈", body = IssueResponse),
    ),
    tag = "issue",
)]
#[put("/issues/{issue_id}/status")]
pub async fn update_issue_status(
    db: web::Data<DatabaseConnection>,
    partners: web::Data<PartnerService>,
    path: web::Path<i32>,
    body: web::Json<IssueStatusUpdateRequest>,
    auth_user: web::ReqData<i32>,
) -> Result<HttpResponse, AppError> {
    let issue_id = path.into_inner();
    let user_id = *auth_user;

    let access = check_issue_access(db.get_ref(), &partners, issue_id, user_id).await?;
    require_issue_update(&partners, &access).await?;

    let new_status = body.status.trim().to_string();
    if new_status == access.issue.status {
        return Ok(HttpResponse::Ok().json(IssueResponse::from(access.issue)));
    }

    let old_status = access.issue.status.clone();
    let old_details = serde_json::to_value(&access.issue)
        .map_err(|_| AppError::internal_error(ErrorCode::InternalError))?;

    let mut issue_model: IssueActiveModel = access.issue.into();
    issue_model.status = Set(new_status.clone());
    let updated = issue_model.update(db.get_ref()).await?;

    history::add(
        db.get_ref(),
        issue_id,
        user_id,
        history::ISSUE_UPDATED,
        ISSUE_UPDATED_SUMMARY,
        json!({ "old": old_status, "new": new_status, "user": access.user.full_name }),
    )
    .await?;

    let changes = json!({ "status": { "old": old_status, "new": new_status } });
    partners.handle_issue_change(issue_id, user_id, &old_details, &changes).await?;

    info!(issue_id, user_id, old = %old_status, new = %new_status, "이슈 상태 변경");
    Ok(HttpResponse::Ok().json(IssueResponse::from(updated)))
}
