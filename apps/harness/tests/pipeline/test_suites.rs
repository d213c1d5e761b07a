//! Suites run end to end into the results store.

use docdb_compat_lib::catalog;
use docdb_compat_lib::db::{MemoryStore, ResultsStore};
use docdb_compat_lib::models::{REASON_FAILED, REASON_PASSED, Status};

use super::test_helpers::*;

#[tokio::test]
async fn test_every_case_produces_one_record() {
    let target = InProcessTarget::new();
    let store = MemoryStore::new();
    let suites = catalog::all_suites(DATABASE);
    let expected: usize = suites.iter().map(|s| s.cases.len()).sum();

    for suite in &suites {
        let outcome = run_suite(&target, &store, suite).await;
        assert_eq!(outcome.passed + outcome.failed, suite.cases.len());
        assert_eq!(outcome.flushed as usize, suite.cases.len());
    }

    let records = store.all_records().await.unwrap();
    assert_eq!(records.len(), expected);

    for record in &records {
        assert!(record.start <= record.end, "{} has end before start", record.test_name);
        assert_eq!(record.platform, PLATFORM);
        assert_eq!(record.version, "7.0.12");
        assert!(record.run.is_none());
        assert_eq!(record.exit_code == 0, record.status == Status::Pass);
    }
}

#[tokio::test]
async fn test_managed_platform_refusals_are_expected_unsupported() {
    let target = InProcessTarget::managed();
    let store = MemoryStore::new();

    let outcome = run_suite(&target, &store, &suite("admin_commands")).await;
    assert_eq!(outcome.failed, 0);

    let records = store.all_records().await.unwrap();
    let by_name = |name: &str| {
        records
            .iter()
            .find(|r| r.test_name == name)
            .unwrap_or_else(|| panic!("no record for {}", name))
    };

    let reindex = by_name("reIndex");
    assert_eq!(reindex.status, Status::Pass);
    assert_eq!(reindex.reason, REASON_PASSED);
    assert_eq!(
        reindex.payload["command_result"]["msg"],
        "reIndex command is not supported on Atlas"
    );

    let fsync = by_name("fsync");
    assert_eq!(fsync.status, Status::Pass);
    assert_eq!(
        fsync.payload["command_result"]["msg"],
        "fsync command is not supported on Atlas"
    );

    let write_block = by_name("setUserWriteBlockMode");
    assert_eq!(write_block.status, Status::Pass);
    assert_eq!(write_block.exit_code, 0);
    assert_eq!(write_block.reason, REASON_FAILED);
    assert_eq!(
        write_block.description,
        vec!["setUserWriteBlockMode is not supported on Atlas"]
    );
}

#[tokio::test]
async fn test_unlisted_refusal_is_a_genuine_failure() {
    let target = InProcessTarget::new();
    target.refuse("collMod", "CMD_NOT_ALLOWED: collMod");
    let store = MemoryStore::new();

    let outcome = run_suite(&target, &store, &suite("admin_commands")).await;
    assert_eq!(outcome.failed, 1);

    let records = store.all_records().await.unwrap();
    let coll_mod = records
        .iter()
        .find(|r| r.test_name == "collMod validator")
        .unwrap();
    assert_eq!(coll_mod.status, Status::Fail);
    assert_eq!(coll_mod.description, vec!["CMD_NOT_ALLOWED: collMod"]);

    // The next case still ran and passed
    let positions: Vec<&str> = records.iter().map(|r| r.test_name.as_str()).collect();
    let index = positions.iter().position(|n| *n == "collMod validator").unwrap();
    assert_eq!(records[index + 1].status, Status::Pass);
}

#[tokio::test]
async fn test_indexed_queries_find_their_index_in_the_plan() {
    let target = InProcessTarget::new();
    let store = MemoryStore::new();

    run_suite(&target, &store, &suite("index_types")).await;

    let records = store.all_records().await.unwrap();
    let text = records
        .iter()
        .find(|r| r.test_name == "text index used in plan")
        .unwrap();
    assert_eq!(text.status, Status::Pass);
    assert_eq!(
        text.payload["explain_plan"]["queryPlanner"]["winningPlan"]["inputStage"]["indexName"],
        "description_text"
    );
}

#[tokio::test]
async fn test_search_query_waits_for_queryable_index() {
    let target = InProcessTarget::new();
    let store = MemoryStore::new();

    run_suite(&target, &store, &suite("text_search")).await;

    let records = store.all_records().await.unwrap();
    let search = records
        .iter()
        .find(|r| r.test_name == "search index query")
        .unwrap();
    assert_eq!(search.status, Status::Pass);
    assert!(search.payload.contains_key("search_result"));
}

#[tokio::test]
async fn test_fixtures_are_removed_after_suite() {
    let target = InProcessTarget::new();
    let store = MemoryStore::new();

    run_suite(&target, &store, &suite("aggregation_stages")).await;

    assert!(target.documents("sales").is_empty());
    assert!(target.documents("inventory").is_empty());
}

#[tokio::test]
async fn test_retryable_writes_record_attempts() {
    let target = InProcessTarget::new();
    let store = MemoryStore::new();

    run_suite(&target, &store, &suite("sessions")).await;

    let records = store.all_records().await.unwrap();
    let insert = records
        .iter()
        .find(|r| r.test_name == "retryable insert")
        .unwrap();
    assert_eq!(insert.payload["attempts"], 1);
    assert!(
        records
            .iter()
            .find(|r| r.test_name == "startSession")
            .is_some_and(|r| !r.payload.contains_key("attempts"))
    );
}
