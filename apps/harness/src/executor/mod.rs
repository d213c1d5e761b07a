//! Turns one case's operation into a finished result record.

pub mod operation;
pub mod unsupported;

use chrono::Utc;
use mongodb::bson::Document;
use tracing::info;

use crate::suite::SuiteContext;
use crate::target::Target;

pub use operation::{CaseError, Operation};
pub use unsupported::{ReasonConvention, UNSUPPORTED_RULES, UnsupportedRule};

/// A named test case.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub name: String,
    pub operation: Operation,
    /// Transient failures are re-issued immediately up to this many attempts.
    pub max_attempts: u32,
}

impl Case {
    pub fn new(name: impl Into<String>, operation: Operation) -> Self {
        Case {
            name: name.into(),
            operation,
            max_attempts: 1,
        }
    }

    pub fn with_retries(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

/// Run `case` against `target` and append its record to `ctx`.
///
/// Failures never escape: every outcome becomes record data.
pub async fn run_case(ctx: &mut SuiteContext, target: &dyn Target, case: &Case) {
    let mut record = ctx.begin_record(&case.name);
    ctx.logs.info(format!(
        "Running '{}' ({})",
        case.name,
        case.operation.name()
    ));

    let mut payload = Document::new();
    let mut attempts = 0;
    let outcome = loop {
        attempts += 1;
        payload.clear();

        let result = operation::execute(
            target,
            &case.operation,
            ctx.polling,
            &mut ctx.logs,
            &mut payload,
        )
        .await;

        match result {
            Err(CaseError::Target { ref error, .. })
                if error.is_transient() && attempts < case.max_attempts =>
            {
                ctx.logs.warn(format!(
                    "Transient failure on attempt {}: {}; retrying",
                    attempts, error
                ));
            }
            other => break other,
        }
    };

    for (key, value) in payload {
        record.payload.insert(key, value);
    }
    if case.max_attempts > 1 {
        record.insert_payload("attempts", attempts as i32);
    }

    match outcome {
        Ok(()) => {
            record.mark_passed();
            ctx.logs.info(format!("'{}' passed", case.name));
        }
        Err(CaseError::Target { operation, error }) => {
            let text = error.to_string();
            match unsupported::classify(&operation, &text) {
                Some(rule) => {
                    rule.apply(&mut record);
                    ctx.logs.info(format!(
                        "'{}' reclassified as expected-unsupported: {}",
                        case.name, rule.message
                    ));
                }
                None => {
                    ctx.logs.error(format!("'{}' failed: {}", case.name, text));
                    record.mark_failed(text);
                }
            }
        }
        Err(other) => {
            let text = other.to_string();
            ctx.logs.error(format!("'{}' failed: {}", case.name, text));
            record.mark_failed(text);
        }
    }

    let end = Utc::now();
    let version = match target.server_version().await {
        Ok(v) => Some(v),
        Err(e) => {
            ctx.logs.warn(format!("Could not read target version: {}", e));
            None
        }
    };
    record.finalize(end, version, ctx.logs.lines().to_vec());

    if let Ok(json) = serde_json::to_string(&record.to_persisted()) {
        info!(target: "records", "{}", json);
    }

    ctx.records.push(record);
}
