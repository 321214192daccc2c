//! Migration: Create accounts table with embedded permission columns.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Uuid).string_len(36).not_null().unique_key())
                    .col(ColumnDef::new(Accounts::Name).string_len(255).not_null().unique_key())
                    .col(ColumnDef::new(Accounts::PasswordHash).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Accounts::SitePortalAccess)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Accounts::FateBoardAccess)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Accounts::NotebookAccess)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Accounts::UpdatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Accounts::DeletedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        // Index for efficient filtering of active accounts
        manager
            .create_index(
                Index::create()
                    .name("idx_accounts_deleted_at")
                    .table(Accounts::Table)
                    .col(Accounts::DeletedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Uuid,
    Name,
    PasswordHash,
    SitePortalAccess,
    FateBoardAccess,
    NotebookAccess,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
