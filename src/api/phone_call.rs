use actix_web::{get, post, web, HttpResponse};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::info;

use crate::auth::access::{check_issue_access, require_role, require_section, IssueAccess};
use crate::entity::phone_category::{self, Entity as PhoneCategoryEntity};
use crate::entity::phone_support::ActiveModel as PhoneSupportActiveModel;
use crate::entity::project_member::Role;
use crate::entity::user_preference::{Entity as UserPreferenceEntity, Model as UserPreferenceModel};
use crate::model::global_error::{AppError, ErrorCode};
use crate::model::phone_call::{PhoneCallCreateRequest, PhoneCallFormResponse, PhoneCallResponse};
use crate::partner::{IssueSection, PartnerService};

#[utoipa::path(
    get,
    path = "/api/issues/{issue_id}/phone-calls",
    summary = "통화 기록 화면 조회",
    params(
        ("issue_id", description = "이슈 ID", example = 42),
    ),
    responses(
        (status = 200, description = "통화 분류와 사용자 설정", body = PhoneCallFormResponse),
        (status = 403, description = "권한 부족"),
    ),
    tag = "phone call",
)]
#[get("/issues/{issue_id}/phone-calls")]
pub async fn get_phone_call_form(
    db: web::Data<DatabaseConnection>,
    partners: web::Data<PartnerService>,
    path: web::Path<i32>,
    auth_user: web::ReqData<i32>,
) -> Result<HttpResponse, AppError> {
    let access = check_phone_access(db.get_ref(), &partners, path.into_inner(), *auth_user).await?;

    let form = build_form(db.get_ref(), &access, None).await?;
    Ok(HttpResponse::Ok().json(form))
}

#[utoipa::path(
    post,
    path = "/api/issues/{issue_id}/phone-calls",
    summary = "통화 기록 등록",
    request_body = PhoneCallCreateRequest,
    params(
        ("issue_id", description = "이슈 ID", example = 42),
    ),
    responses(
        (status = 201, description = "등록 결과를 포함한 통화 기록 화면", body = PhoneCallFormResponse),
        (status = 400, description = "잘못된 입력"),
        (status = 403, description = "권한 부족"),
    ),
    tag = "phone call",
)]
#[post("/issues/{issue_id}/phone-calls")]
pub async fn add_phone_call(
    db: web::Data<DatabaseConnection>,
    partners: web::Data<PartnerService>,
    path: web::Path<i32>,
    body: web::Json<PhoneCallCreateRequest>,
    auth_user: web::ReqData<i32>,
) -> Result<HttpResponse, AppError> {
    let user_id = *auth_user;
    let access = check_phone_access(db.get_ref(), &partners, path.into_inner(), user_id).await?;

    body.validate()?;

    let category = PhoneCategoryEntity::find_by_id(body.category_id)
        .one(db.get_ref())
        .await?;
    if !matches!(category, Some(ref category) if category.project_id == access.issue.project_id) {
        return Err(AppError::bad_request(ErrorCode::InvalidPhoneCategory));
    }

    let inserted = PhoneSupportActiveModel::from_request(&body, access.issue.id, user_id)
        .insert(db.get_ref())
        .await?;
    info!(issue_id = access.issue.id, user_id, phone_support_id = inserted.id, "통화 기록 등록");

    let form = build_form(db.get_ref(), &access, Some(PhoneCallResponse::from(inserted))).await?;
    Ok(HttpResponse::Created().json(form))
}

/// Customer 이하 역할과 phone 영역이 막힌 파트너 사용자는 통화 기록을 볼 수 없다.
async fn check_phone_access(
    db: &DatabaseConnection,
    partners: &PartnerService,
    issue_id: i32,
    user_id: i32,
) -> Result<IssueAccess, AppError> {
    let access = check_issue_access(db, partners, issue_id, user_id).await?;
    require_role(&access, Role::Standard)?;
    require_section(partners, &access, IssueSection::Phone).await?;
    Ok(access)
}

async fn build_form(
    db: &DatabaseConnection,
    access: &IssueAccess,
    add_phone_result: Option<PhoneCallResponse>,
) -> Result<PhoneCallFormResponse, AppError> {
    let categories = PhoneCategoryEntity::find()
        .filter(phone_category::Column::ProjectId.eq(access.issue.project_id))
        .order_by_asc(phone_category::Column::Title)
        .all(db)
        .await?;

    let prefs = UserPreferenceEntity::find_by_id(access.user.id)
        .one(db)
        .await?
        .unwrap_or_else(|| UserPreferenceModel::defaults(access.user.id));

    Ok(PhoneCallFormResponse {
        issue_id: access.issue.id,
        phone_categories: categories.into_iter().map(Into::into).collect(),
        current_user_prefs: prefs.into(),
        add_phone_result,
    })
}
