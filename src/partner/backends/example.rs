use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::partner::backend::{Access, Feature, IssueSection, PartnerBackend};

pub const CODE: &str = "example";

/// 외부 연동 없이 로그만 남기는 기본 제공 파트너.
pub struct ExampleBackend;

#[async_trait]
impl PartnerBackend for ExampleBackend {
    fn name(&self) -> &str {
        "Example Partner"
    }

    async fn issue_added(&self, issue_id: i32) -> anyhow::Result<()> {
        info!(issue_id, par_code = CODE, "파트너가 이슈에 연결되었습니다");
        Ok(())
    }

    async fn issue_removed(&self, issue_id: i32) -> anyhow::Result<()> {
        info!(issue_id, par_code = CODE, "파트너가 이슈에서 제거되었습니다");
        Ok(())
    }

    async fn handle_new_email(&self, issue_id: i32, email_id: i32) -> anyhow::Result<()> {
        info!(issue_id, email_id, par_code = CODE, "새 이메일 수신");
        Ok(())
    }

    async fn handle_new_note(&self, issue_id: i32, note_id: i32) -> anyhow::Result<()> {
        info!(issue_id, note_id, par_code = CODE, "새 노트 등록");
        Ok(())
    }

    async fn handle_issue_change(
        &self,
        issue_id: i32,
        user_id: i32,
        _old_details: &Value,
        changes: &Value,
    ) -> anyhow::Result<()> {
        info!(issue_id, user_id, %changes, par_code = CODE, "이슈 변경");
        Ok(())
    }

    async fn can_user_access_feature(&self, _user_id: i32, feature: Feature) -> Access {
        match feature {
            Feature::Reports | Feature::Export => Access::Deny,
            Feature::CreateIssue | Feature::AssociateEmails => Access::Allow,
        }
    }

    async fn can_user_access_issue_section(&self, _user_id: i32, section: IssueSection) -> Access {
        match section {
            IssueSection::Drafts
            | IssueSection::Time
            | IssueSection::NotificationList
            | IssueSection::AuthorizedRepliers => Access::Deny,
            _ => Access::Allow,
        }
    }

    async fn can_update_issue(&self, _issue_id: i32, _user_id: i32) -> Access {
        Access::Allow
    }

    async fn issue_message(&self, issue_id: i32) -> Option<String> {
        Some(format!("Example Partner 에서 이슈 #{} 을(를) 추적하고 있습니다.", issue_id))
    }
}

#[cfg(test)]
mod tests {
    use super::ExampleBackend;
    use crate::partner::backend::{Access, Feature, IssueSection, PartnerBackend};

    #[tokio::test]
    async fn partner_users_cannot_export_or_see_internal_sections() {
        let backend = ExampleBackend;

        assert_eq!(backend.can_user_access_feature(1, Feature::Export).await, Access::Deny);
        assert_eq!(backend.can_user_access_feature(1, Feature::CreateIssue).await, Access::Allow);
        assert_eq!(backend.can_user_access_issue_section(1, IssueSection::Time).await, Access::Deny);
        assert_eq!(backend.can_user_access_issue_section(1, IssueSection::Phone).await, Access::Allow);
    }

    #[tokio::test]
    async fn issue_message_mentions_issue() {
        let message = ExampleBackend.issue_message(42).await.unwrap();

        assert!(message.contains("#42"));
    }
}
