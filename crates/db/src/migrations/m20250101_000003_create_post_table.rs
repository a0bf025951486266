//! Create post table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Post::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Post::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Post::Content).text().not_null())
                    .col(ColumnDef::new(Post::MediaUrls).json_binary().not_null())
                    .col(
                        ColumnDef::new(Post::Privacy)
                            .string_len(16)
                            .not_null()
                            .default("friends"),
                    )
                    .col(ColumnDef::new(Post::Likes).json_binary().not_null())
                    .col(ColumnDef::new(Post::Comments).json_binary().not_null())
                    .col(
                        ColumnDef::new(Post::Shares)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Post::SharedPostId).string_len(32))
                    .col(
                        ColumnDef::new(Post::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Post::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_author")
                            .from(Post::Table, Post::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (author_id, privacy) (for profile timelines and the feed)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_author_privacy")
                    .table(Post::Table)
                    .col(Post::AuthorId)
                    .col(Post::Privacy)
                    .to_owned(),
            )
            .await?;

        // Index: privacy (for public posts in the feed)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_privacy")
                    .table(Post::Table)
                    .col(Post::Privacy)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
    AuthorId,
    Content,
    MediaUrls,
    Privacy,
    Likes,
    Comments,
    Shares,
    SharedPostId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
