//! Migration: Create federations table.
//!
//! The whole descriptor is stored JSON-encoded in the `payload` text column;
//! `kind` selects the concrete shape.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Federations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Federations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Federations::Uuid).string_len(255).not_null().unique_key())
                    .col(ColumnDef::new(Federations::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(Federations::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Federations::Payload).text().not_null())
                    .col(
                        ColumnDef::new(Federations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Federations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Federations::DeletedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_federations_kind")
                    .table(Federations::Table)
                    .col(Federations::Kind)
                    .col(Federations::DeletedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Federations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Federations {
    Table,
    Id,
    Uuid,
    Kind,
    Name,
    Payload,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
