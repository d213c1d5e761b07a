//! Result record model capturing one test case execution.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::normalize::normalize_bson;

/// Reason text paired with a passing outcome.
pub const REASON_PASSED: &str = "PASSED";

/// Reason text paired with a failing outcome.
pub const REASON_FAILED: &str = "FAILED";

/// Version string recorded when the target cannot report one.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Final outcome of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }

    /// Process-style exit code mirrored into the record.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Pass => 0,
            Self::Fail => 1,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// In-memory result record.
///
/// Created before the operation is attempted, resolved once at the outcome
/// boundary, finalized once, then handed to the suite accumulator. The payload
/// keeps the driver's BSON values until [`ResultRecord::to_persisted`].
#[derive(Debug, Clone)]
pub struct ResultRecord {
    pub id: Uuid,
    pub status: Status,
    pub test_name: String,
    pub platform: String,
    pub exit_code: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub elapsed: f64,
    pub suite: String,
    pub version: String,
    pub run: Option<i64>,
    pub log_lines: Vec<String>,
    pub reason: String,
    pub description: Vec<String>,
    pub payload: Document,
}

impl ResultRecord {
    /// Open a record for a case that is about to run.
    pub fn begin(test_name: &str, suite: &str, platform: &str) -> Self {
        let start = Utc::now();
        ResultRecord {
            id: Uuid::now_v7(),
            status: Status::Fail,
            test_name: test_name.to_string(),
            platform: platform.to_string(),
            exit_code: Status::Fail.exit_code(),
            start,
            end: start,
            elapsed: 0.0,
            suite: suite.to_string(),
            version: UNKNOWN_VERSION.to_string(),
            run: None,
            log_lines: Vec::new(),
            reason: REASON_FAILED.to_string(),
            description: Vec::new(),
            payload: Document::new(),
        }
    }

    /// Resolve the record as passed.
    pub fn mark_passed(&mut self) {
        self.status = Status::Pass;
        self.exit_code = Status::Pass.exit_code();
        self.reason = REASON_PASSED.to_string();
    }

    /// Resolve the record as failed with the given error text.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = Status::Fail;
        self.exit_code = Status::Fail.exit_code();
        self.reason = REASON_FAILED.to_string();
        self.description.push(message.into());
    }

    /// Store an operation-specific payload value.
    pub fn insert_payload(&mut self, key: &str, value: impl Into<Bson>) {
        self.payload.insert(key, value.into());
    }

    /// Stamp timing, version and captured log lines.
    ///
    /// `end` is clamped to `start` so that `start <= end` holds even if the
    /// wall clock stepped backwards during the case.
    pub fn finalize(
        &mut self,
        end: DateTime<Utc>,
        version: Option<String>,
        log_lines: Vec<String>,
    ) {
        self.end = end.max(self.start);
        self.elapsed = elapsed_seconds(self.start, self.end);
        self.version = version.unwrap_or_else(|| UNKNOWN_VERSION.to_string());
        self.log_lines = log_lines;
    }

    /// Normalize into the flat shape written to the results store.
    pub fn to_persisted(&self) -> PersistedRecord {
        let payload = self
            .payload
            .iter()
            .map(|(key, value)| (key.clone(), normalize_bson(value)))
            .collect();

        PersistedRecord {
            id: self.id,
            status: self.status,
            test_name: self.test_name.clone(),
            platform: self.platform.clone(),
            exit_code: self.exit_code,
            start: self.start,
            end: self.end,
            elapsed: self.elapsed,
            suite: self.suite.clone(),
            version: self.version.clone(),
            run: self.run,
            log_lines: self.log_lines.clone(),
            reason: self.reason.clone(),
            description: self.description.clone(),
            payload,
        }
    }
}

/// Seconds between two instants at microsecond resolution.
pub fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let delta = end - start;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

/// Result record as stored in and read back from the results store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub status: Status,
    pub test_name: String,
    pub platform: String,
    pub exit_code: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub elapsed: f64,
    pub suite: String,
    pub version: String,
    #[serde(default)]
    pub run: Option<i64>,
    #[serde(default)]
    pub log_lines: Vec<String>,
    pub reason: String,
    #[serde(default)]
    pub description: Vec<String>,
    /// Operation-specific fields (`command_result`, `query_result`, ...)
    #[serde(flatten)]
    pub payload: BTreeMap<String, serde_json::Value>,
}

impl PersistedRecord {
    /// Error text joined for tabular display.
    pub fn joined_description(&self) -> String {
        self.description.join("; ")
    }
}
