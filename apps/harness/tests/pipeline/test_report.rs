//! Report generation over records written by suite runs.

use std::fs;

use docdb_compat_lib::db::{MemoryStore, ResultsStore};
use docdb_compat_lib::error::AppError;
use docdb_compat_lib::models::RunSummary;
use docdb_compat_lib::report;

use super::test_helpers::*;

#[tokio::test]
async fn test_empty_store_produces_no_report() {
    let store = MemoryStore::new();

    let result = report::generate(&store, PLATFORM).await;

    assert!(matches!(result, Err(AppError::NoResults)));
    assert!(store.list_summaries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_report_after_two_suites() {
    let target = InProcessTarget::new();
    target.refuse("hello", "no hello for you");
    let store = MemoryStore::new();

    let geo = suite("geospatial");
    let repl = suite("replication");
    run_suite(&target, &store, &geo).await;
    run_suite(&target, &store, &repl).await;

    let generated = report::generate(&store, PLATFORM).await.unwrap();
    let summary = &generated.summary;

    assert_eq!(summary.run, 1);
    assert_eq!(summary.platform, PLATFORM);
    assert_eq!(summary.total_tests as usize, geo.cases.len() + repl.cases.len());
    assert_eq!(summary.suites["replication"].failing, 1);
    assert_eq!(summary.suites["geospatial"].failing, 0);
    assert!(summary.failing_percentage > 0.0);
    assert_eq!(generated.report.total, summary.total_tests);

    let hello = generated
        .report
        .rows
        .iter()
        .find(|row| row.test_name == "hello")
        .unwrap();
    assert_eq!(hello.status, "FAILED");
    assert_eq!(hello.errors, "no hello for you");
}

#[tokio::test]
async fn test_repeated_generation_is_stable_except_run() {
    let target = InProcessTarget::new();
    let store = MemoryStore::new();
    run_suite(&target, &store, &suite("timeseries")).await;

    let first = report::generate(&store, PLATFORM).await.unwrap().summary;
    let second = report::generate(&store, PLATFORM).await.unwrap().summary;

    assert_eq!(second.run, first.run + 1);
    assert_eq!(first.passing_tests, second.passing_tests);
    assert_eq!(first.failing_tests, second.failing_tests);
    assert_eq!(first.total_tests, second.total_tests);
    assert_eq!(first.suites, second.suites);

    let summaries = store.list_summaries().await.unwrap();
    assert_eq!(
        summaries.iter().map(|s| s.run).collect::<Vec<_>>(),
        vec![2, 1]
    );
}

#[tokio::test]
async fn test_artifacts_are_written_per_run() {
    let target = InProcessTarget::managed();
    let store = MemoryStore::new();
    run_suite(&target, &store, &suite("admin_commands")).await;

    let generated = report::generate(&store, PLATFORM).await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let artifacts =
        report::write_artifacts(dir.path(), &generated.report, &generated.summary).unwrap();

    let table = fs::read_to_string(&artifacts.report).unwrap();
    assert!(table.starts_with("Test Name"));
    assert!(table.contains("reIndex"));
    assert!(table.trim_end().ends_with("(100.00%)"));

    let summary: RunSummary =
        serde_json::from_str(&fs::read_to_string(&artifacts.summary).unwrap()).unwrap();
    assert_eq!(summary, generated.summary);
}
