//! Export of stored records to newline-delimited JSON for external dashboards.

use std::io::Write;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::AppResult;
use crate::models::{PersistedRecord, REASON_FAILED, Status};

/// Reason text written for passing records that carried the `FAILED` reason.
pub const REASON_UNSUPPORTED: &str = "UNSUPPORTED";

/// Size bounds applied to each exported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportLimits {
    /// Most recent log lines kept
    pub max_log_lines: usize,
    /// Characters kept per string value
    pub max_string_chars: usize,
    /// Leading description entries kept
    pub max_description_entries: usize,
    /// Serialized size above which a document is skipped
    pub max_document_bytes: usize,
}

impl Default for ExportLimits {
    fn default() -> Self {
        ExportLimits {
            max_log_lines: 1000,
            max_string_chars: 10_000,
            max_description_entries: 100,
            max_document_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Counts from one export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub written: usize,
    pub skipped: usize,
}

fn epoch_seconds(ts: &chrono::DateTime<chrono::Utc>) -> f64 {
    ts.timestamp_micros() as f64 / 1_000_000.0
}

fn truncate_strings(value: &mut Value, max_chars: usize) {
    match value {
        Value::String(s) => {
            if let Some((cut, _)) = s.char_indices().nth(max_chars) {
                s.truncate(cut);
            }
        }
        Value::Array(items) => items
            .iter_mut()
            .for_each(|item| truncate_strings(item, max_chars)),
        Value::Object(map) => map
            .values_mut()
            .for_each(|item| truncate_strings(item, max_chars)),
        _ => {}
    }
}

/// Reshape one record for export.
pub fn transform_record(record: &PersistedRecord, limits: &ExportLimits) -> AppResult<Value> {
    let mut map: Map<String, Value> = match serde_json::to_value(record)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    if let Some(name) = map.remove("test_name") {
        map.insert("test_file".to_string(), name);
    }

    if record.status == Status::Pass && record.reason == REASON_FAILED {
        map.insert("reason".to_string(), REASON_UNSUPPORTED.into());
    }

    map.insert("start".to_string(), epoch_seconds(&record.start).into());
    map.insert("end".to_string(), epoch_seconds(&record.end).into());

    let skip = record.log_lines.len().saturating_sub(limits.max_log_lines);
    map.insert(
        "log_lines".to_string(),
        record.log_lines[skip..].to_vec().into(),
    );

    let kept = record.description.len().min(limits.max_description_entries);
    map.insert(
        "description".to_string(),
        record.description[..kept].to_vec().into(),
    );

    let mut value = Value::Object(map);
    truncate_strings(&mut value, limits.max_string_chars);
    Ok(value)
}

/// Write every record as one JSON object per line; oversized documents are
/// skipped with a warning.
pub fn export_records<W: Write>(
    records: &[PersistedRecord],
    mut writer: W,
    limits: &ExportLimits,
) -> AppResult<ExportStats> {
    let mut stats = ExportStats::default();

    for record in records {
        let line = serde_json::to_string(&transform_record(record, limits)?)?;
        if line.len() > limits.max_document_bytes {
            warn!(
                id = %record.id,
                "Skipping record '{}': {} bytes exceeds export limit",
                record.test_name,
                line.len()
            );
            stats.skipped += 1;
            continue;
        }

        writeln!(writer, "{}", line)?;
        stats.written += 1;
    }

    writer.flush()?;
    Ok(stats)
}
