//! Suite lifecycle: setup, ordered cases, teardown and flush.

use std::path::PathBuf;

use mongodb::bson::Document;
use tracing::{error, info, warn};

use crate::config::SearchPolling;
use crate::db::ResultsStore;
use crate::executor::{self, Case};
use crate::logcapture::LogSink;
use crate::models::{PersistedRecord, ResultRecord, Status};
use crate::target::Target;

/// A collection a suite owns: dropped at setup and teardown, seeded when
/// `documents` is non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub collection: String,
    pub documents: Vec<Document>,
}

impl Fixture {
    pub fn seeded(collection: &str, documents: Vec<Document>) -> Self {
        Fixture {
            collection: collection.to_string(),
            documents,
        }
    }

    /// A collection cases create themselves; only cleaned up.
    pub fn scratch(collection: &str) -> Self {
        Fixture {
            collection: collection.to_string(),
            documents: Vec::new(),
        }
    }
}

/// One capability area and its ordered cases.
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteDefinition {
    pub name: String,
    pub fixtures: Vec<Fixture>,
    pub cases: Vec<Case>,
}

/// Mutable state scoped to one running suite.
///
/// The log sink is cleared before each case; records accumulate in case
/// order and are not touched again once pushed.
#[derive(Debug)]
pub struct SuiteContext {
    pub suite: String,
    pub platform: String,
    pub polling: SearchPolling,
    pub logs: LogSink,
    pub records: Vec<ResultRecord>,
}

impl SuiteContext {
    pub fn new(suite: &str, platform: &str, polling: SearchPolling, logs: LogSink) -> Self {
        SuiteContext {
            suite: suite.to_string(),
            platform: platform.to_string(),
            polling,
            logs,
            records: Vec::new(),
        }
    }

    /// Open a record stamped with this suite and platform.
    pub fn begin_record(&self, test_name: &str) -> ResultRecord {
        ResultRecord::begin(test_name, &self.suite, &self.platform)
    }
}

/// Counts reported back to the caller once a suite finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteOutcome {
    pub suite: String,
    pub passed: usize,
    pub failed: usize,
    /// Records the results store accepted
    pub flushed: u64,
}

/// Runs suites against one target and flushes into one results store.
pub struct SuiteController<'a> {
    target: &'a dyn Target,
    store: &'a dyn ResultsStore,
    platform: String,
    polling: SearchPolling,
    log_dir: Option<PathBuf>,
}

impl<'a> SuiteController<'a> {
    pub fn new(
        target: &'a dyn Target,
        store: &'a dyn ResultsStore,
        platform: &str,
        polling: SearchPolling,
    ) -> Self {
        SuiteController {
            target,
            store,
            platform: platform.to_string(),
            polling,
            log_dir: None,
        }
    }

    /// Mirror each suite's log lines to `<dir>/<suite>.log`.
    pub fn with_log_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.log_dir = dir;
        self
    }

    /// Run every case of `suite` in order.
    pub async fn run(&self, suite: &SuiteDefinition) -> SuiteOutcome {
        let logs = match &self.log_dir {
            Some(dir) => LogSink::with_file(&suite.name, dir).unwrap_or_else(|e| {
                warn!(suite = %suite.name, "Suite log file unavailable: {}", e);
                LogSink::new(&suite.name)
            }),
            None => LogSink::new(&suite.name),
        };
        let mut ctx = SuiteContext::new(&suite.name, &self.platform, self.polling, logs);

        info!(suite = %suite.name, "Starting suite ({} cases)", suite.cases.len());
        self.setup(&mut ctx, suite).await;

        for case in &suite.cases {
            ctx.logs.clear();
            executor::run_case(&mut ctx, self.target, case).await;
        }

        self.teardown(ctx, suite).await
    }

    async fn setup(&self, ctx: &mut SuiteContext, suite: &SuiteDefinition) {
        for fixture in &suite.fixtures {
            if let Err(e) = self.target.drop_collection(&fixture.collection).await {
                ctx.logs.warn(format!(
                    "Could not drop stale collection '{}': {}",
                    fixture.collection, e
                ));
            }

            if fixture.documents.is_empty() {
                continue;
            }

            match self
                .target
                .insert_many(&fixture.collection, fixture.documents.clone())
                .await
            {
                Ok(_) => ctx.logs.info(format!(
                    "Seeded {} documents into '{}'",
                    fixture.documents.len(),
                    fixture.collection
                )),
                Err(e) => ctx.logs.error(format!(
                    "Failed to seed '{}': {}",
                    fixture.collection, e
                )),
            }
        }
    }

    async fn teardown(&self, mut ctx: SuiteContext, suite: &SuiteDefinition) -> SuiteOutcome {
        for fixture in &suite.fixtures {
            if let Err(e) = self.target.drop_collection(&fixture.collection).await {
                ctx.logs.warn(format!(
                    "Could not drop fixture '{}' during teardown: {}",
                    fixture.collection, e
                ));
            }
        }

        let passed = ctx
            .records
            .iter()
            .filter(|r| r.status == Status::Pass)
            .count();
        let failed = ctx.records.len() - passed;

        let persisted: Vec<PersistedRecord> =
            ctx.records.iter().map(ResultRecord::to_persisted).collect();

        let flushed = if persisted.is_empty() {
            info!(suite = %ctx.suite, "No records to flush");
            0
        } else {
            match self.store.insert_records(&persisted).await {
                Ok(count) => count,
                Err(e) => {
                    error!(
                        suite = %ctx.suite,
                        "Failed to flush {} records: {}",
                        persisted.len(),
                        e
                    );
                    0
                }
            }
        };

        info!(
            suite = %ctx.suite,
            "Suite finished: {} passed, {} failed, {} flushed",
            passed, failed, flushed
        );

        SuiteOutcome {
            suite: ctx.suite,
            passed,
            failed,
            flushed,
        }
    }
}
