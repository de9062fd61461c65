//! 파트너 백엔드 플러그인 인터페이스.
//!
//! 파트너 코드마다 하나의 구현이 있으며, 이슈 생명주기 이벤트를 받고
//! 파트너 계정 사용자의 기능 접근 여부를 결정한다.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// 파트너 백엔드의 권한 판단 결과.
///
/// `NotApplicable` 은 "이 백엔드는 관여하지 않음" 이며, 호출자는 기본 권한 규칙으로 넘어간다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Allow,
    Deny,
    NotApplicable,
}

impl Access {
    pub fn is_denied(self) -> bool {
        self == Access::Deny
    }

    /// `NotApplicable` 이면 `default` 를 따른다.
    pub fn allowed_or(self, default: bool) -> bool {
        match self {
            Access::Allow => true,
            Access::Deny => false,
            Access::NotApplicable => default,
        }
    }
}

impl From<bool> for Access {
    fn from(allowed: bool) -> Self {
        if allowed { Access::Allow } else { Access::Deny }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    CreateIssue,
    AssociateEmails,
    Reports,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueSection {
    Partners,
    Drafts,
    Files,
    Time,
    Notes,
    Phone,
    History,
    NotificationList,
    AuthorizedRepliers,
}

#[async_trait]
pub trait PartnerBackend: Send + Sync {
    /// 화면에 표시할 파트너 이름.
    fn name(&self) -> &str;

    async fn issue_added(&self, _issue_id: i32) -> anyhow::Result<()> {
        Ok(())
    }

    async fn issue_removed(&self, _issue_id: i32) -> anyhow::Result<()> {
        Ok(())
    }

    async fn handle_new_email(&self, _issue_id: i32, _email_id: i32) -> anyhow::Result<()> {
        Ok(())
    }

    async fn handle_new_note(&self, _issue_id: i32, _note_id: i32) -> anyhow::Result<()> {
        Ok(())
    }

    async fn handle_issue_change(
        &self,
        _issue_id: i32,
        _user_id: i32,
        _old_details: &Value,
        _changes: &Value,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn can_user_access_feature(&self, _user_id: i32, _feature: Feature) -> Access {
        Access::NotApplicable
    }

    async fn can_user_access_issue_section(&self, _user_id: i32, _section: IssueSection) -> Access {
        Access::NotApplicable
    }

    async fn can_update_issue(&self, _issue_id: i32, _user_id: i32) -> Access {
        Access::NotApplicable
    }

    /// 이슈 화면에 표시할 파트너별 안내 문구.
    async fn issue_message(&self, _issue_id: i32) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{Access, Feature, IssueSection};

    #[test]
    fn not_applicable_falls_through_to_default() {
        assert!(Access::NotApplicable.allowed_or(true));
        assert!(!Access::NotApplicable.allowed_or(false));
        assert!(!Access::Deny.allowed_or(true));
        assert!(Access::Allow.allowed_or(false));
    }

    #[test]
    fn feature_and_section_names_are_snake_case() {
        assert_eq!(serde_json::to_string(&Feature::AssociateEmails).unwrap(), "\"associate_emails\"");
        assert_eq!(
            serde_json::from_str::<IssueSection>("\"notification_list\"").unwrap(),
            IssueSection::NotificationList
        );
        assert_eq!(serde_json::to_string(&Access::NotApplicable).unwrap(), "\"not_applicable\"");
    }
}
