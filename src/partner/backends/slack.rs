use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::partner::backend::PartnerBackend;
use crate::util::slack::send_slack_alert;

pub const CODE: &str = "slack";

/// 이슈 이벤트를 Slack 웹훅으로 전달하는 파트너.
pub struct SlackBackend {
    client: Client,
    webhook_url: String,
}

impl SlackBackend {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url: webhook_url.into(),
        }
    }

    async fn notify(&self, message: String) -> anyhow::Result<()> {
        send_slack_alert(&self.client, &self.webhook_url, &message)
            .await
            .context("Slack 알림 전송 실패")
    }
}

#[async_trait]
impl PartnerBackend for SlackBackend {
    fn name(&self) -> &str {
        "Slack"
    }

    async fn issue_added(&self, issue_id: i32) -> anyhow::Result<()> {
        self.notify(format!("🔗 이슈 #{} 이(가) Slack 연동에 추가되었습니다.", issue_id)).await
    }

    async fn issue_removed(&self, issue_id: i32) -> anyhow::Result<()> {
        self.notify(format!("✂️ 이슈 #{} 이(가) Slack 연동에서 제거되었습니다.", issue_id)).await
    }

    async fn handle_new_email(&self, issue_id: i32, email_id: i32) -> anyhow::Result<()> {
        self.notify(format!("📧 이슈 #{} 에 새 이메일(#{})이 도착했습니다.", issue_id, email_id)).await
    }

    async fn handle_new_note(&self, issue_id: i32, note_id: i32) -> anyhow::Result<()> {
        self.notify(format!("📝 이슈 #{} 에 새 노트(#{})가 등록되었습니다.", issue_id, note_id)).await
    }

    async fn handle_issue_change(
        &self,
        issue_id: i32,
        user_id: i32,
        _old_details: &Value,
        changes: &Value,
    ) -> anyhow::Result<()> {
        self.notify(format!("✏️ 사용자 #{} 가 이슈 #{} 를 변경했습니다: {}", user_id, issue_id, changes)).await
    }
}
