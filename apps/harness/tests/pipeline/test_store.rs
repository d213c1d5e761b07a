//! PostgreSQL results store behaviour, checked against a live database.

use chrono::{Duration, Utc};
use mongodb::bson::doc;

use docdb_compat_lib::db::{MemoryStore, RecordQuery, ResultsStore};
use docdb_compat_lib::models::{PersistedRecord, ResultRecord, RunSummary, Status};

use super::test_helpers::*;

fn record(name: &str, suite: &str, run: Option<i64>) -> PersistedRecord {
    let mut r = ResultRecord::begin(name, suite, PLATFORM);
    r.insert_payload("command_result", doc! { "ok": 1.0, "n": 3 });
    r.mark_passed();
    let end = r.start + Duration::milliseconds(250);
    r.finalize(end, Some("7.0.12".to_string()), vec!["INFO ok".to_string()]);
    r.run = run;
    r.to_persisted()
}

async fn suite_records(store: &dyn ResultsStore, suite: &str) -> Vec<PersistedRecord> {
    let (mut records, total) = store
        .query_records(&RecordQuery {
            suite: Some(suite.to_string()),
            status: None,
            limit: 1000,
            offset: 0,
        })
        .await
        .unwrap();
    assert_eq!(total as usize, records.len());
    records.sort_by_key(|r| r.id);
    records
}

#[tokio::test]
async fn test_insert_is_idempotent_by_id() {
    let Some(pool) = create_test_pool().await else {
        return;
    };
    let suite = unique_suite("idempotent");
    let batch = vec![record("a", &suite, None), record("b", &suite, None)];

    assert_eq!(pool.insert_records(&batch).await.unwrap(), 2);
    assert_eq!(pool.insert_records(&batch).await.unwrap(), 0);
    assert_eq!(pool.insert_records(&[]).await.unwrap(), 0);

    assert_eq!(suite_records(&pool, &suite).await.len(), 2);
}

#[tokio::test]
async fn test_records_round_trip_through_jsonb() {
    let Some(pool) = create_test_pool().await else {
        return;
    };

    // Real case output from two suites, moved under a suite name of our own.
    // A preset run keeps concurrent run assignment away from these rows.
    let target = InProcessTarget::managed();
    let memory = MemoryStore::new();
    run_suite(&target, &memory, &suite("admin_commands")).await;
    run_suite(&target, &memory, &suite("data_types")).await;

    let name = unique_suite("round-trip");
    let mut expected: Vec<PersistedRecord> = memory
        .all_records()
        .await
        .unwrap()
        .into_iter()
        .map(|mut r| {
            r.suite = name.clone();
            r.run = Some(1);
            r
        })
        .collect();
    expected.sort_by_key(|r| r.id);

    pool.insert_records(&expected).await.unwrap();
    let stored = suite_records(&pool, &name).await;

    assert_eq!(stored.len(), expected.len());
    for (stored, expected) in stored.iter().zip(&expected) {
        assert_eq!(
            stored, expected,
            "record '{}' changed in storage",
            expected.test_name
        );
    }
}

#[tokio::test]
async fn test_assign_run_only_touches_untagged_rows() {
    let Some(pool) = create_test_pool().await else {
        return;
    };
    let suite = unique_suite("assign");
    let untagged = record("untagged", &suite, None);
    let tagged = record("tagged", &suite, Some(5));
    pool.insert_records(&[untagged.clone(), tagged.clone()])
        .await
        .unwrap();

    let run = Utc::now().timestamp_micros();
    assert!(pool.assign_run(run).await.unwrap() >= 1);

    let stored = suite_records(&pool, &suite).await;
    let run_of = |id| stored.iter().find(|r| r.id == id).unwrap().run;
    assert_eq!(run_of(untagged.id), Some(run));
    assert_eq!(run_of(tagged.id), Some(5));
}

#[tokio::test]
async fn test_query_filters_by_status() {
    let Some(pool) = create_test_pool().await else {
        return;
    };
    let suite = unique_suite("status");
    let mut failed = record("failed", &suite, None);
    failed.status = Status::Fail;
    failed.exit_code = 1;
    pool.insert_records(&[record("passed", &suite, None), failed.clone()])
        .await
        .unwrap();

    let (page, total) = pool
        .query_records(&RecordQuery {
            suite: Some(suite.clone()),
            status: Some(Status::Fail),
            limit: 10,
            offset: 0,
        })
        .await
        .unwrap();

    assert_eq!(total, 1);
    assert_eq!(page[0].id, failed.id);
}

#[tokio::test]
async fn test_latest_run_is_highest_stored() {
    let Some(pool) = create_test_pool().await else {
        return;
    };
    let base = Utc::now().timestamp_micros();
    let summary = |run: i64| RunSummary {
        run,
        platform: PLATFORM.to_string(),
        timestamp: Utc::now(),
        suites: Default::default(),
        passing_tests: 1,
        failing_tests: 0,
        total_tests: 1,
        passing_percentage: 100.0,
        failing_percentage: 0.0,
    };

    let newest = summary(base + 2);

    // Inserted out of order
    pool.insert_summary(&newest).await.unwrap();
    pool.insert_summary(&summary(base + 1)).await.unwrap();

    assert_eq!(pool.latest_run().await.unwrap(), Some(base + 2));

    let summaries = pool.list_summaries().await.unwrap();
    assert_eq!(summaries[0].run, base + 2);
    assert_eq!(summaries[1].run, base + 1);
    assert_eq!(summaries[0], newest);
}

#[tokio::test]
async fn test_failed_batch_writes_nothing() {
    let Some(pool) = create_test_pool().await else {
        return;
    };
    let suite = unique_suite("rollback");
    // PostgreSQL rejects NUL in text columns, failing the second insert
    let batch = vec![
        record("first", &suite, None),
        record("bad\u{0}name", &suite, None),
    ];

    assert!(pool.insert_records(&batch).await.is_err());
    assert!(suite_records(&pool, &suite).await.is_empty());
}
