use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::issue::Model as IssueModel;

#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueStatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub id: i32,
    pub project_id: i32,
    pub title: String,
    pub status: String,
    pub reported_by: Option<i32>,
    pub assigned_to: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<IssueModel> for IssueResponse {
    fn from(model: IssueModel) -> Self {
        Self {
            id: model.id,
            project_id: model.project_id,
            title: model.title,
            status: model.status,
            reported_by: model.reported_by,
            assigned_to: model.assigned_to,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
