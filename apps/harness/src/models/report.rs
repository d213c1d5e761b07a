//! Compatibility report model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row of the compatibility table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportRow {
    pub test_name: String,
    /// Whether the record's status is pass
    pub passed: bool,
    /// The record's reason text (`PASSED`, `FAILED`, or a raw detail)
    pub status: String,
    /// Description entries joined with `; `
    pub errors: String,
}

/// Tabular compatibility report over every stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompatibilityReport {
    pub rows: Vec<ReportRow>,
    pub passing: u64,
    pub total: u64,
    /// Unrounded; rendering rounds for display
    pub passing_percentage: f64,
}
