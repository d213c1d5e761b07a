//! Failures that count as passes because the platform does not offer the feature.

use mongodb::bson::doc;

use crate::models::{REASON_FAILED, ResultRecord};

/// How a reclassified record reports its reason.
///
/// Both conventions exist in the recorded history of results and are kept
/// as-is: downstream dashboards key on either form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonConvention {
    /// `reason = "PASSED"`; the message goes to `command_result.msg`.
    Mirror,
    /// `reason = "FAILED"` while status stays pass; the message goes to `description`.
    Detail,
}

/// One entry of the expected-unsupported table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedRule {
    /// Operation name (first key of the command)
    pub operation: &'static str,
    /// Substring of the error text that identifies the platform refusal
    pub signature: &'static str,
    /// Explanation stored on the record
    pub message: &'static str,
    pub convention: ReasonConvention,
}

/// Commands managed platforms refuse, and how to recognise the refusal.
pub const UNSUPPORTED_RULES: &[UnsupportedRule] = &[
    UnsupportedRule {
        operation: "reIndex",
        signature: "reIndex is only allowed",
        message: "reIndex command is not supported on Atlas",
        convention: ReasonConvention::Mirror,
    },
    UnsupportedRule {
        operation: "compact",
        signature: "CMD_NOT_ALLOWED",
        message: "compact command is not supported on Atlas",
        convention: ReasonConvention::Mirror,
    },
    UnsupportedRule {
        operation: "setUserWriteBlockMode",
        signature: "CMD_NOT_ALLOWED",
        message: "setUserWriteBlockMode is not supported on Atlas",
        convention: ReasonConvention::Detail,
    },
    UnsupportedRule {
        operation: "logRotate",
        signature: "CMD_NOT_ALLOWED",
        message: "logRotate command is not supported on Atlas",
        convention: ReasonConvention::Mirror,
    },
    UnsupportedRule {
        operation: "setParameter",
        signature: "CMD_NOT_ALLOWED",
        message: "setParameter command is not supported on Atlas",
        convention: ReasonConvention::Mirror,
    },
    UnsupportedRule {
        operation: "fsync",
        signature: "CMD_NOT_ALLOWED",
        message: "fsync command is not supported on Atlas",
        convention: ReasonConvention::Mirror,
    },
];

/// Find the rule matching a failed operation, if any.
pub fn classify(operation: &str, error_text: &str) -> Option<&'static UnsupportedRule> {
    UNSUPPORTED_RULES
        .iter()
        .find(|rule| rule.operation == operation && error_text.contains(rule.signature))
}

impl UnsupportedRule {
    /// Resolve `record` as an expected-unsupported pass.
    pub fn apply(&self, record: &mut ResultRecord) {
        record.mark_passed();
        match self.convention {
            ReasonConvention::Mirror => {
                record.insert_payload("command_result", doc! { "msg": self.message });
            }
            ReasonConvention::Detail => {
                record.reason = REASON_FAILED.to_string();
                record.description.push(self.message.to_string());
            }
        }
    }
}
