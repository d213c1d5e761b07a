//! Create compat_results table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CompatResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CompatResults::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CompatResults::Suite).string().not_null())
                    .col(ColumnDef::new(CompatResults::TestName).string().not_null())
                    .col(ColumnDef::new(CompatResults::Status).string().not_null())
                    .col(ColumnDef::new(CompatResults::Run).big_integer())
                    .col(
                        ColumnDef::new(CompatResults::Document)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CompatResults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_compat_results_suite")
                    .table(CompatResults::Table)
                    .col(CompatResults::Suite)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_compat_results_run")
                    .table(CompatResults::Table)
                    .col(CompatResults::Run)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CompatResults::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CompatResults {
    Table,
    Id,
    Suite,
    TestName,
    Status,
    Run,
    Document,
    CreatedAt,
}
