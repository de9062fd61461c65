use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tracing::error;

use crate::partner::PartnerService;

#[utoipa::path(
    get,
    path = "/health-check",
    responses(
        (status = 200, description = "서버와 데이터베이스가 정상 동작 중"),
        (status = 503, description = "데이터베이스 연결 불가"),
    ),
    tag = "health check",
)]
#[get("/health-check")]
pub async fn health_check(
    db: web::Data<DatabaseConnection>,
    partners: web::Data<PartnerService>,
) -> HttpResponse {
    let partners = partners.backend_list();

    match db.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "OK", "partners": partners })),
        Err(err) => {
            error!(error = %err, "데이터베이스 상태 확인 실패");
            HttpResponse::ServiceUnavailable().json(json!({ "status": "DOWN", "partners": partners }))
        }
    }
}
