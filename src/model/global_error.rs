use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use std::fmt;
use tracing::error;

use crate::partner::PartnerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // 400 BAD REQUEST
    ValidationError,
    InvalidPhoneCategory,

    // 401 UNAUTHORIZED
    AuthenticationFailed,
    ExpiredAuthToken,
    InvalidAuthToken,

    // 403 FORBIDDEN
    NotEnoughPermission,

    // 404 NOT FOUND
    MemberNotFound,
    ProjectNotFound,
    IssueNotFound,
    PartnerNotFound,

    // 500 SERVER ERRORS
    DatabaseError,
    InternalError,
    PartnerMisconfigured,
    PartnerBackendFailed,
}

impl ErrorCode {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "유효성 검증에 실패했습니다",
            ErrorCode::InvalidPhoneCategory => "이 프로젝트에서 사용할 수 없는 통화 분류입니다",

            ErrorCode::AuthenticationFailed => "인증에 실패했습니다",
            ErrorCode::ExpiredAuthToken => "로그인 토큰이 만료되었습니다",
            ErrorCode::InvalidAuthToken => "유효하지 않은 로그인 토큰입니다",

            ErrorCode::NotEnoughPermission => "권한이 부족합니다",

            ErrorCode::MemberNotFound => "사용자를 찾을 수 없습니다",
            ErrorCode::ProjectNotFound => "유효하지 않은 프로젝트 ID입니다",
            ErrorCode::IssueNotFound => "유효하지 않은 이슈 ID입니다",
            ErrorCode::PartnerNotFound => "등록되지 않은 파트너입니다",

            ErrorCode::DatabaseError => "데이터베이스 오류가 발생했습니다",
            ErrorCode::InternalError => "내부 서버 오류가 발생했습니다",
            ErrorCode::PartnerMisconfigured => "파트너 백엔드 설정이 올바르지 않습니다",
            ErrorCode::PartnerBackendFailed => "파트너 백엔드 처리 중 오류가 발생했습니다",
        }
    }

    pub fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            ErrorCode::ValidationError |
            ErrorCode::InvalidPhoneCategory => StatusCode::BAD_REQUEST,

            ErrorCode::AuthenticationFailed |
            ErrorCode::ExpiredAuthToken |
            ErrorCode::InvalidAuthToken => StatusCode::UNAUTHORIZED,

            ErrorCode::NotEnoughPermission => StatusCode::FORBIDDEN,

            ErrorCode::MemberNotFound |
            ErrorCode::ProjectNotFound |
            ErrorCode::IssueNotFound |
            ErrorCode::PartnerNotFound => StatusCode::NOT_FOUND,

            ErrorCode::DatabaseError |
            ErrorCode::InternalError |
            ErrorCode::PartnerMisconfigured |
            ErrorCode::PartnerBackendFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationFieldError {
    pub field: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    ApiError(ErrorCode, Option<String>),

    #[error("유효성 검증에 실패했습니다")]
    ValidationError(Vec<ValidationFieldError>),
}

impl AppError {
    pub fn new(code: ErrorCode) -> Self {
        AppError::ApiError(code, None)
    }

    pub fn with_detail(code: ErrorCode, detail: String) -> Self {
        AppError::ApiError(code, Some(detail))
    }

    pub fn bad_request(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn unauthorized(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn forbidden(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn not_found(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn internal_error(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::ApiError(code, _) => *code,
            AppError::ValidationError(_) => ErrorCode::ValidationError,
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        error!(error = %err, "데이터베이스 오류");
        AppError::internal_error(ErrorCode::DatabaseError)
    }
}

impl From<PartnerError> for AppError {
    fn from(err: PartnerError) -> Self {
        match err {
            PartnerError::Database(err) => err.into(),
            PartnerError::UnknownBackend(code) | PartnerError::InvalidCode(code) => {
                error!(par_code = %code, "파트너 백엔드 설정 오류");
                AppError::with_detail(ErrorCode::PartnerMisconfigured, code)
            }
            PartnerError::Backend { code, source } => {
                error!(par_code = %code, error = ?source, "파트너 백엔드 오류");
                AppError::with_detail(ErrorCode::PartnerBackendFailed, code)
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ValidationFieldError>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        self.code().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let code = self.code();
        let (detail, errors) = match self {
            AppError::ApiError(_, detail) => (detail.clone(), Vec::new()),
            AppError::ValidationError(errors) => (None, errors.clone()),
        };

        HttpResponse::build(code.status_code()).json(ErrorResponse {
            code: format!("{:?}", code),
            message: code.message().to_string(),
            detail,
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;
    use sea_orm::DbErr;

    use super::{AppError, ErrorCode, ValidationFieldError};
    use crate::partner::PartnerError;

    #[test]
    fn partner_errors_map_to_server_errors() {
        let unknown: AppError = PartnerError::UnknownBackend("ghost".to_string()).into();
        let backend: AppError = PartnerError::backend("acme", anyhow::anyhow!("boom")).into();
        let database: AppError = PartnerError::Database(DbErr::Custom("down".to_string())).into();

        assert_eq!(unknown.code(), ErrorCode::PartnerMisconfigured);
        assert_eq!(backend.code(), ErrorCode::PartnerBackendFailed);
        assert_eq!(database.code(), ErrorCode::DatabaseError);
        assert_eq!(backend.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_error_is_bad_request() {
        let err = AppError::ValidationError(vec![ValidationFieldError {
            field: "description".to_string(),
            message: "필수".to_string(),
        }]);

        assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::forbidden(ErrorCode::NotEnoughPermission).status_code(), StatusCode::FORBIDDEN);
    }
}
