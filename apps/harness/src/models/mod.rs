//! Domain models for the compatibility harness.

pub mod normalize;
pub mod report;
pub mod result_record;
pub mod run_summary;

// Re-export commonly used types
pub use report::{CompatibilityReport, ReportRow};
pub use result_record::{
    PersistedRecord, REASON_FAILED, REASON_PASSED, ResultRecord, Status, UNKNOWN_VERSION,
};
pub use run_summary::{RunSummary, SuiteCounts};
