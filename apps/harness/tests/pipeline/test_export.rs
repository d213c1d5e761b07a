//! Export of stored records to newline-delimited JSON.

use std::fs::{self, File};

use docdb_compat_lib::db::{MemoryStore, ResultsStore};
use docdb_compat_lib::export::{ExportLimits, REASON_UNSUPPORTED, export_records};

use super::test_helpers::*;

#[tokio::test]
async fn test_export_reshapes_every_record() {
    let target = InProcessTarget::managed();
    let store = MemoryStore::new();
    run_suite(&target, &store, &suite("admin_commands")).await;
    let records = store.all_records().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.ndjson");
    let stats = export_records(
        &records,
        File::create(&path).unwrap(),
        &ExportLimits::default(),
    )
    .unwrap();

    assert_eq!(stats.written, records.len());
    assert_eq!(stats.skipped, 0);

    let lines: Vec<serde_json::Value> = fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), records.len());

    for line in &lines {
        assert!(line.get("test_name").is_none());
        assert!(line["test_file"].is_string());
        assert!(line["start"].is_f64());
        assert!(line["end"].as_f64().unwrap() >= line["start"].as_f64().unwrap());
    }

    let write_block = lines
        .iter()
        .find(|line| line["test_file"] == "setUserWriteBlockMode")
        .unwrap();
    assert_eq!(write_block["status"], "pass");
    assert_eq!(write_block["reason"], REASON_UNSUPPORTED);

    let reindex = lines
        .iter()
        .find(|line| line["test_file"] == "reIndex")
        .unwrap();
    assert_eq!(reindex["reason"], "PASSED");
}
