//! Run summary model aggregating one full harness run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pass/fail counts for one suite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SuiteCounts {
    pub passing: u64,
    pub failing: u64,
    pub total: u64,
}

/// Aggregate statistics persisted once per report generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RunSummary {
    /// Run identifier (previous maximum + 1)
    pub run: i64,
    /// Platform tag of the target under test
    pub platform: String,
    /// When the summary was computed
    pub timestamp: DateTime<Utc>,
    /// Counts keyed by suite name
    pub suites: BTreeMap<String, SuiteCounts>,
    pub passing_tests: u64,
    pub failing_tests: u64,
    pub total_tests: u64,
    /// Rounded to two decimal places
    pub passing_percentage: f64,
    /// Rounded to two decimal places
    pub failing_percentage: f64,
}

/// Round to two decimal places for display and storage.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / total * 100`, or zero when there is nothing to divide by.
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}
