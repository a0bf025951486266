//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(User::Email)
                            .string_len(256)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(User::Name).string_len(128).not_null())
                    .col(ColumnDef::new(User::PasswordHash).string_len(256).not_null())
                    .col(ColumnDef::new(User::Token).string_len(64).unique_key())
                    .col(ColumnDef::new(User::Avatar).string_len(512))
                    .col(ColumnDef::new(User::CoverPhoto).string_len(512))
                    .col(ColumnDef::new(User::Bio).text())
                    .col(ColumnDef::new(User::Location).string_len(256))
                    .col(ColumnDef::new(User::Work).string_len(256))
                    .col(ColumnDef::new(User::Education).string_len(256))
                    .col(ColumnDef::new(User::RelationshipStatus).string_len(64))
                    .col(ColumnDef::new(User::Birthday).string_len(32))
                    .col(ColumnDef::new(User::Phone).string_len(64))
                    .col(ColumnDef::new(User::Website).string_len(512))
                    .col(ColumnDef::new(User::Interests).json_binary().not_null())
                    .col(
                        ColumnDef::new(User::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(User::PrivacySettings).json_binary().not_null())
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(User::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: name (for user search)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_name")
                    .table(User::Table)
                    .col(User::Name)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    Email,
    Name,
    PasswordHash,
    Token,
    Avatar,
    CoverPhoto,
    Bio,
    Location,
    Work,
    Education,
    RelationshipStatus,
    Birthday,
    Phone,
    Website,
    Interests,
    IsVerified,
    PrivacySettings,
    CreatedAt,
    UpdatedAt,
}
