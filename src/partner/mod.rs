//! 파트너 백엔드 레지스트리와 파트너-프로젝트/이슈 연결 관리.

pub mod backend;
pub mod backends;
pub mod error;
pub mod registry;
pub mod service;

pub use backend::{Access, Feature, IssueSection, PartnerBackend};
pub use error::PartnerError;
pub use registry::PartnerRegistry;
pub use service::PartnerService;
