use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::issue::Entity")]
    Issue,

    #[sea_orm(has_many = "super::partner_project::Entity")]
    PartnerProject,

    #[sea_orm(has_many = "super::phone_category::Entity")]
    PhoneCategory,
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issue.def()
    }
}

impl Related<super::partner_project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartnerProject.def()
    }
}

impl Related<super::phone_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhoneCategory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
