use sea_orm::Schema;
use sea_orm_migration::prelude::*;
use crate::entity::{issue_partner, partner_project};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());
        manager
            .create_table(schema.create_table_from_entity(partner_project::Entity).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(schema.create_table_from_entity(issue_partner::Entity).if_not_exists().to_owned())
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(issue_partner::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(partner_project::Entity).to_owned())
            .await
    }
}
