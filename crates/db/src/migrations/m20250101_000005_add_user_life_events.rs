//! Add `life_events` and `achievements` columns to `user` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One column per statement: SQLite rejects multiple alter options.
        for column in [User::LifeEvents, User::Achievements] {
            manager
                .alter_table(
                    Table::alter()
                        .table(User::Table)
                        .add_column(
                            ColumnDef::new(column)
                                .json_binary()
                                .not_null()
                                .default(Expr::cust("'[]'")),
                        )
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for column in [User::LifeEvents, User::Achievements] {
            manager
                .alter_table(
                    Table::alter()
                        .table(User::Table)
                        .drop_column(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

#[derive(Iden, Clone, Copy)]
enum User {
    Table,
    LifeEvents,
    Achievements,
}
