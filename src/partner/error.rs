use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PartnerError {
    #[error("등록되지 않은 파트너 백엔드입니다: {0}")]
    UnknownBackend(String),

    #[error("사용할 수 없는 파트너 코드입니다: {0}")]
    InvalidCode(String),

    #[error("파트너 데이터베이스 작업 실패: {0}")]
    Database(#[from] DbErr),

    #[error("파트너 백엔드 '{code}' 처리 실패: {source}")]
    Backend {
        code: String,
        #[source]
        source: anyhow::Error,
    },
}

impl PartnerError {
    pub fn backend(code: &str, source: anyhow::Error) -> Self {
        PartnerError::Backend {
            code: code.to_string(),
            source,
        }
    }
}
