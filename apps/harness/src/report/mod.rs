//! Report generation: compatibility table and run summary over every stored record.

pub mod render;

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::info;

use crate::db::ResultsStore;
use crate::error::{AppError, AppResult};
use crate::models::{
    CompatibilityReport, PersistedRecord, ReportRow, RunSummary, Status, SuiteCounts,
};
use crate::models::run_summary::{percentage, round2};

pub use render::{render_console, render_table, write_artifacts};

/// Everything one report generation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReport {
    pub report: CompatibilityReport,
    pub summary: RunSummary,
}

/// Read the whole store, compute the report and summary, store the summary,
/// then tag untagged records with the new run number.
///
/// The run number is read-then-incremented without a transaction, so two
/// concurrent generations can produce the same number.
pub async fn generate(store: &dyn ResultsStore, platform: &str) -> AppResult<GeneratedReport> {
    store.ping().await?;

    let records = store.all_records().await?;
    if records.is_empty() {
        return Err(AppError::NoResults);
    }

    let report = compatibility_report(&records);
    let run = next_run(store.latest_run().await?);
    let summary = summarize(&records, run, platform);

    store.insert_summary(&summary).await?;
    let tagged = store.assign_run(run).await?;

    info!(
        run,
        "Run summary stored: {}/{} passing, {} records tagged",
        summary.passing_tests,
        summary.total_tests,
        tagged
    );

    Ok(GeneratedReport { report, summary })
}

/// One row per record, in store order.
pub fn compatibility_report(records: &[PersistedRecord]) -> CompatibilityReport {
    let rows = records
        .iter()
        .map(|r| ReportRow {
            test_name: r.test_name.clone(),
            passed: r.status == Status::Pass,
            status: r.reason.clone(),
            errors: r.joined_description(),
        })
        .collect();

    let total = records.len() as u64;
    let passing = records.iter().filter(|r| r.status == Status::Pass).count() as u64;

    CompatibilityReport {
        rows,
        passing,
        total,
        passing_percentage: percentage(passing, total),
    }
}

/// Per-suite and overall counts for `run`.
pub fn summarize(records: &[PersistedRecord], run: i64, platform: &str) -> RunSummary {
    let mut suites: BTreeMap<String, SuiteCounts> = BTreeMap::new();

    for record in records {
        let counts = suites.entry(record.suite.clone()).or_default();
        match record.status {
            Status::Pass => counts.passing += 1,
            Status::Fail => counts.failing += 1,
        }
        counts.total += 1;
    }

    let passing_tests: u64 = suites.values().map(|c| c.passing).sum();
    let failing_tests: u64 = suites.values().map(|c| c.failing).sum();
    let total_tests = passing_tests + failing_tests;

    RunSummary {
        run,
        platform: platform.to_string(),
        timestamp: Utc::now(),
        suites,
        passing_tests,
        failing_tests,
        total_tests,
        passing_percentage: round2(percentage(passing_tests, total_tests)),
        failing_percentage: round2(percentage(failing_tests, total_tests)),
    }
}

/// The run number following `latest`; the first run is 1.
pub fn next_run(latest: Option<i64>) -> i64 {
    latest.map_or(1, |run| run + 1)
}
