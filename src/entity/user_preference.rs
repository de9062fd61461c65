use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_WEEK_START: i32 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_preferences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    pub timezone: String,
    pub week_start: i32,  // 0 = 일요일, 1 = 월요일
    pub close_popup_windows: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 저장된 설정이 없는 사용자의 기본값.
    pub fn defaults(user_id: i32) -> Self {
        Self {
            user_id,
            timezone: DEFAULT_TIMEZONE.to_string(),
            week_start: DEFAULT_WEEK_START,
            close_popup_windows: true,
        }
    }
}
