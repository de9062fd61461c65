use sea_orm::Schema;
use sea_orm_migration::prelude::*;
use crate::entity::{phone_category, phone_support, user_preference};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());
        manager
            .create_table(schema.create_table_from_entity(phone_category::Entity).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(schema.create_table_from_entity(phone_support::Entity).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(schema.create_table_from_entity(user_preference::Entity).if_not_exists().to_owned())
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 참조하는 쪽부터 지운다
        manager
            .drop_table(Table::drop().table(user_preference::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(phone_support::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(phone_category::Entity).to_owned())
            .await
    }
}
