//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_compat_results;
mod m20261001_000002_create_run_summaries;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_compat_results::Migration),
            Box::new(m20261001_000002_create_run_summaries::Migration),
        ]
    }
}
