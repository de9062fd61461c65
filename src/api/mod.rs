mod health;
mod issue;
mod partner;
mod phone_call;


use actix_web::web::{self, scope};
use utoipa::OpenApi;

use crate::auth::AuthMiddleware;

pub use crate::api::health::health_check;
pub use crate::api::issue::{add_issue_partner, list_issue_partners, remove_issue_partner, select_issue_partners, update_issue_status};
pub use crate::api::partner::{get_feature_access, get_partner, list_partners, list_project_partners, update_partner_projects};
pub use crate::api::phone_call::{add_phone_call, get_phone_call_form};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        partner::list_partners,
        partner::get_partner,
        partner::update_partner_projects,
        partner::list_project_partners,
        partner::get_feature_access,
        issue::list_issue_partners,
        issue::select_issue_partners,
        issue::add_issue_partner,
        issue::remove_issue_partner,
        issue::update_issue_status,
        phone_call::get_phone_call_form,
        phone_call::add_phone_call,
    ),
    components(schemas(
        crate::model::partner::PartnerSummary,
        crate::model::partner::PartnerDetails,
        crate::model::partner::IssuePartner,
        crate::model::partner::PartnerSelection,
        crate::model::partner::PartnerProjectsUpdateRequest,
        crate::model::partner::IssuePartnersSelectRequest,
        crate::model::partner::PartnerAccessResponse,
        crate::model::issue::IssueStatusUpdateRequest,
        crate::model::issue::IssueResponse,
        crate::model::phone_call::PhoneCallCreateRequest,
        crate::model::phone_call::PhoneCallFormResponse,
        crate::partner::Access,
        crate::partner::Feature,
        crate::partner::IssueSection,
    )),
    tags(
        (name = "partner", description = "파트너 백엔드 관리"),
        (name = "issue", description = "이슈 파트너 연결과 상태 변경"),
        (name = "phone call", description = "이슈 통화 기록"),
    ),
)]
pub struct ApiDoc;

/// 인증이 필요한 API 는 `/api` 아래에 둔다.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(
            scope("/api")
                .wrap(AuthMiddleware)
                .service(list_partners)
                .service(get_partner)
                .service(update_partner_projects)
                .service(list_project_partners)
                .service(get_feature_access)
                .service(list_issue_partners)
                .service(select_issue_partners)
                .service(add_issue_partner)
                .service(remove_issue_partner)
                .service(update_issue_status)
                .service(get_phone_call_form)
                .service(add_phone_call),
        );
}
