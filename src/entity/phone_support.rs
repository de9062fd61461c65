use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use crate::model::phone_call::PhoneCallCreateRequest;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "phone_support")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub issue_id: i32,
    pub user_id: i32,
    pub category_id: i32,
    pub call_type: CallType,
    pub call_from: String,
    pub call_to: String,
    pub phone_number: String,
    pub phone_type: Option<String>,  // "office", "home", "mobile", ...
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub time_spent: Option<i32>,  // 분 단위
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CallType {
    #[sea_orm(string_value = "incoming")]
    Incoming,

    #[sea_orm(string_value = "outgoing")]
    Outgoing,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::issue::Entity",
        from = "Column::IssueId",
        to = "super::issue::Column::Id"
    )]
    Issue,

    #[sea_orm(
        belongs_to = "super::phone_category::Entity",
        from = "Column::CategoryId",
        to = "super::phone_category::Column::Id"
    )]
    Category,
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issue.def()
    }
}

impl Related<super::phone_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr> {
        if insert {
            self.created_at = Set(Utc::now());
        }
        Ok(self)
    }
}

impl ActiveModel {
    pub fn from_request(request: &PhoneCallCreateRequest, issue_id: i32, user_id: i32) -> Self {
        Self {
            issue_id: Set(issue_id),
            user_id: Set(user_id),
            category_id: Set(request.category_id),
            call_type: Set(request.call_type),
            call_from: Set(request.call_from.trim().to_string()),
            call_to: Set(request.call_to.trim().to_string()),
            phone_number: Set(request.phone_number.trim().to_string()),
            phone_type: Set(request.phone_type.clone()),
            description: Set(request.description.clone()),
            time_spent: Set(request.time_spent),
            ..Default::default()
        }
    }
}
