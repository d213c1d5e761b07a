//! Shared helpers: an in-process target and suite runners.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document, doc};
use tokio::sync::OnceCell;
use uuid::Uuid;

use docdb_compat_lib::catalog;
use docdb_compat_lib::config::{Config, SearchPolling};
use docdb_compat_lib::db::{DbPool, MemoryStore, migrations};
use docdb_compat_lib::suite::{SuiteController, SuiteDefinition, SuiteOutcome};
use docdb_compat_lib::target::{Target, TargetError};

pub const PLATFORM: &str = "atlas-test";
pub const DATABASE: &str = "compat_test";

#[derive(Default)]
struct State {
    collections: HashMap<String, Vec<Document>>,
    refusals: HashMap<String, String>,
    last_index: Option<String>,
}

/// Target that keeps collections in memory, answers every command with
/// `{ok: 1}` unless told to refuse it, and reports the most recently created
/// index in explain plans.
pub struct InProcessTarget {
    state: Mutex<State>,
}

impl InProcessTarget {
    pub fn new() -> Self {
        InProcessTarget {
            state: Mutex::new(State::default()),
        }
    }

    /// Target that refuses the commands a managed platform refuses.
    pub fn managed() -> Self {
        let target = Self::new();
        target.refuse(
            "reIndex",
            "reIndex is only allowed on a standalone mongod instance",
        );
        for name in ["compact", "logRotate", "setParameter", "fsync", "setUserWriteBlockMode"] {
            target.refuse(name, &format!("CMD_NOT_ALLOWED: {}", name));
        }
        target
    }

    /// Fail every command whose first key is `name` with `message`.
    pub fn refuse(&self, name: &str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .refusals
            .insert(name.to_string(), message.to_string());
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.state
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn answer(&self, command: &Document) -> Result<Document, TargetError> {
        let name = command.keys().next().cloned().unwrap_or_default();
        let mut state = self.state.lock().unwrap();

        if let Some(message) = state.refusals.get(&name) {
            return Err(TargetError::new(message.clone()).with_code(8000, "AtlasError"));
        }

        match name.as_str() {
            "createIndexes" => {
                let index = command
                    .get_array("indexes")
                    .ok()
                    .and_then(|indexes| indexes.first())
                    .and_then(Bson::as_document)
                    .and_then(|spec| spec.get_str("name").ok())
                    .map(str::to_string);
                state.last_index = index;
                Ok(doc! { "ok": 1.0, "numIndexesAfter": 2 })
            }
            "explain" => {
                let index_name = state.last_index.clone().unwrap_or_default();
                Ok(doc! {
                    "queryPlanner": {
                        "winningPlan": {
                            "stage": "FETCH",
                            "inputStage": { "stage": "IXSCAN", "indexName": index_name },
                        }
                    },
                    "ok": 1.0,
                })
            }
            _ => Ok(doc! { "ok": 1.0 }),
        }
    }
}

#[async_trait]
impl Target for InProcessTarget {
    async fn run_command(&self, command: Document) -> Result<Document, TargetError> {
        self.answer(&command)
    }

    async fn run_admin_command(&self, command: Document) -> Result<Document, TargetError> {
        self.answer(&command)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Document>, TargetError> {
        let listing = pipeline
            .first()
            .and_then(|stage| stage.get_document("$listSearchIndexes").ok());
        if let Some(listing) = listing {
            let name = listing.get_str("name").unwrap_or("default");
            return Ok(vec![doc! { "name": name, "status": "READY", "queryable": true }]);
        }
        Ok(self.documents(collection))
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Document, TargetError> {
        let count = documents.len() as i64;
        self.state
            .lock()
            .unwrap()
            .collections
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        Ok(doc! { "acknowledged": true, "inserted_count": count })
    }

    async fn find(
        &self,
        collection: &str,
        _filter: Document,
    ) -> Result<Vec<Document>, TargetError> {
        Ok(self.documents(collection))
    }

    async fn update_many(
        &self,
        _collection: &str,
        _filter: Document,
        _update: Document,
    ) -> Result<Document, TargetError> {
        Ok(doc! { "acknowledged": true, "matched_count": 1_i64, "modified_count": 1_i64 })
    }

    async fn delete_many(
        &self,
        _collection: &str,
        _filter: Document,
    ) -> Result<Document, TargetError> {
        Ok(doc! { "acknowledged": true, "deleted_count": 1_i64 })
    }

    async fn drop_collection(&self, collection: &str) -> Result<(), TargetError> {
        self.state.lock().unwrap().collections.remove(collection);
        Ok(())
    }

    async fn server_version(&self) -> Result<String, TargetError> {
        Ok("7.0.12".to_string())
    }
}

pub fn fast_polling() -> SearchPolling {
    SearchPolling {
        timeout: Duration::from_millis(200),
        interval: Duration::from_millis(10),
    }
}

pub fn suite(name: &str) -> SuiteDefinition {
    catalog::select(DATABASE, &[name.to_string()])
        .unwrap()
        .remove(0)
}

pub async fn run_suite(
    target: &InProcessTarget,
    store: &MemoryStore,
    suite: &SuiteDefinition,
) -> SuiteOutcome {
    SuiteController::new(target, store, PLATFORM, fast_polling())
        .run(suite)
        .await
}

static MIGRATIONS_RUN: OnceCell<()> = OnceCell::const_new();

/// Connect to the PostgreSQL results store named by
/// `COMPAT_TEST_DATABASE_URL`. Migrations run only once.
///
/// Returns `None` when the variable is unset so that the rest of the suite
/// still runs on machines without PostgreSQL.
pub async fn create_test_pool() -> Option<DbPool> {
    let Ok(url) = std::env::var("COMPAT_TEST_DATABASE_URL") else {
        eprintln!("COMPAT_TEST_DATABASE_URL not set; skipping PostgreSQL store test");
        return None;
    };

    let config = Config::from_lookup(|key| match key {
        "RUST_ENV" => Some("development".to_string()),
        "DATABASE_URL" => Some(url.clone()),
        _ => None,
    })
    .expect("Failed to build config for the test results store");

    let pool = DbPool::new(&config)
        .await
        .expect("Failed to connect to the test results store");

    MIGRATIONS_RUN
        .get_or_init(|| async {
            migrations::run_migrations(&pool)
                .await
                .expect("Failed to run migrations");
        })
        .await;

    Some(pool)
}

/// Suite name unique to one test invocation, so tests sharing a database
/// can filter down to their own rows.
pub fn unique_suite(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::now_v7().simple())
}
