//! Results store: connection management, migrations, and record queries.

pub mod memory;
pub mod migrations;
pub mod results;

use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{PersistedRecord, RunSummary, Status};

pub use memory::MemoryStore;

/// Filter and page parameters for record listings.
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    pub suite: Option<String>,
    pub status: Option<Status>,
    pub limit: u64,
    pub offset: u64,
}

/// Durable home of result records and run summaries.
#[async_trait]
pub trait ResultsStore: Send + Sync {
    /// Verify the store is reachable.
    async fn ping(&self) -> AppResult<()>;

    /// Insert records whose id is not already present; returns how many were written.
    async fn insert_records(&self, records: &[PersistedRecord]) -> AppResult<u64>;

    /// Every stored record, oldest first.
    async fn all_records(&self) -> AppResult<Vec<PersistedRecord>>;

    /// A filtered page of records, oldest first, plus the unpaged total.
    async fn query_records(&self, query: &RecordQuery) -> AppResult<(Vec<PersistedRecord>, u64)>;

    /// Stamp `run` on every record that does not carry a run number yet.
    async fn assign_run(&self, run: i64) -> AppResult<u64>;

    async fn insert_summary(&self, summary: &RunSummary) -> AppResult<()>;

    /// Highest run number among stored summaries.
    async fn latest_run(&self) -> AppResult<Option<i64>>;

    /// Stored summaries, newest run first.
    async fn list_summaries(&self) -> AppResult<Vec<RunSummary>>;
}

/// PostgreSQL connection pool for the results store.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect to the results store named by `DATABASE_URL`.
    pub async fn new(config: &Config) -> AppResult<Self> {
        let mut options = ConnectOptions::new(config.database_url.clone());
        options
            .max_connections(5)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::ResultsStoreUnavailable(e.to_string()))?;

        Ok(DbPool { conn })
    }

    /// Get access to the connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}
