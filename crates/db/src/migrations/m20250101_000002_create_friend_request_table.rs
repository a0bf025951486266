//! Create friend request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FriendRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FriendRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::RequesterId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::RecipientId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friend_request_requester")
                            .from(FriendRequest::Table, FriendRequest::RequesterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friend_request_recipient")
                            .from(FriendRequest::Table, FriendRequest::RecipientId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (requester_id, status) (for adjacency scans)
        manager
            .create_index(
                Index::create()
                    .name("idx_friend_request_requester_status")
                    .table(FriendRequest::Table)
                    .col(FriendRequest::RequesterId)
                    .col(FriendRequest::Status)
                    .to_owned(),
            )
            .await?;

        // Index: (recipient_id, status) (for adjacency scans and incoming requests)
        manager
            .create_index(
                Index::create()
                    .name("idx_friend_request_recipient_status")
                    .table(FriendRequest::Table)
                    .col(FriendRequest::RecipientId)
                    .col(FriendRequest::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FriendRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum FriendRequest {
    Table,
    Id,
    RequesterId,
    RecipientId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
