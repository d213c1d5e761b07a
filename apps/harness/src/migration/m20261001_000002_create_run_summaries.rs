//! Create run_summaries table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RunSummaries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RunSummaries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RunSummaries::Run).big_integer().not_null())
                    .col(ColumnDef::new(RunSummaries::Platform).string().not_null())
                    .col(
                        ColumnDef::new(RunSummaries::Document)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RunSummaries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Not unique: concurrent report generations may assign the same run.
        manager
            .create_index(
                Index::create()
                    .name("idx_run_summaries_run")
                    .table(RunSummaries::Table)
                    .col(RunSummaries::Run)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RunSummaries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RunSummaries {
    Table,
    Id,
    Run,
    Platform,
    Document,
    CreatedAt,
}
