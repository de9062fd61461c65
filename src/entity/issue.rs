use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "issues")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub title: String,
    pub status: String,  // "open", "in_progress", "resolved", "closed"
    pub reported_by: Option<i32>,
    pub assigned_to: Option<i32>,  // 담당 사용자 ID
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,

    #[sea_orm(has_many = "super::issue_partner::Entity")]
    IssuePartner,

    #[sea_orm(has_many = "super::issue_history::Entity")]
    IssueHistory,

    #[sea_orm(has_many = "super::phone_support::Entity")]
    PhoneSupport,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::issue_partner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IssuePartner.def()
    }
}

impl Related<super::issue_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IssueHistory.def()
    }
}

impl Related<super::phone_support::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhoneSupport.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr> {
        let now = Utc::now();
        if insert {
            self.created_at = Set(now);
        } else {
            self.updated_at = Set(Some(now));
        }
        Ok(self)
    }
}
