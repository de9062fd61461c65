use sea_orm::Schema;
use sea_orm_migration::prelude::*;
use crate::entity::{issue, issue_history};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());
        manager
            .create_table(schema.create_table_from_entity(issue::Entity).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(schema.create_table_from_entity(issue_history::Entity).if_not_exists().to_owned())
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(issue_history::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(issue::Entity).to_owned())
            .await
    }
}
