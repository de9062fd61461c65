//! 이슈 변경 이력.
//!
//! 요약은 `{name}` 자리표시자를 가진 템플릿으로 저장하고, 치환 값은 `context` 에 JSON 으로 둔다.

use std::sync::LazyLock;

use chrono::Utc;
use regex::{Captures, Regex};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::Value;

use crate::entity::issue_history::{self, ActiveModel as HistoryActiveModel, Entity as HistoryEntity};

pub const PARTNER_ADDED: &str = "partner_added";
pub const PARTNER_REMOVED: &str = "partner_removed";
pub const ISSUE_UPDATED: &str = "issue_updated";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("자리표시자 정규식"));

pub async fn add<C: ConnectionTrait>(
    conn: &C,
    issue_id: i32,
    user_id: i32,
    kind: &str,
    summary: &str,
    context: Value,
) -> Result<issue_history::Model, DbErr> {
    HistoryActiveModel {
        issue_id: Set(issue_id),
        user_id: Set(user_id),
        kind: Set(kind.to_string()),
        summary: Set(summary.to_string()),
        context: Set(context),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

pub async fn list_for_issue<C: ConnectionTrait>(conn: &C, issue_id: i32) -> Result<Vec<issue_history::Model>, DbErr> {
    HistoryEntity::find()
        .filter(issue_history::Column::IssueId.eq(issue_id))
        .order_by_asc(issue_history::Column::Id)
        .all(conn)
        .await
}

/// 템플릿의 `{name}` 을 `context["name"]` 으로 바꾼다. 값이 없으면 그대로 둔다.
pub fn render(template: &str, context: &Value) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match context.get(&caps[1]) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

impl issue_history::Model {
    pub fn rendered_summary(&self) -> String {
        render(&self.summary, &self.context)
    }
}
