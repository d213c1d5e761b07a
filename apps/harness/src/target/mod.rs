//! The document database under test.
//!
//! Suites talk to the target only through [`Target`]. Payloads are BSON
//! documents handed to the driver verbatim; the harness never interprets
//! command semantics beyond success or failure.

pub mod mongo;
#[cfg(test)]
pub(crate) mod scripted;

use async_trait::async_trait;
use mongodb::bson::Document;

pub use mongo::MongoTarget;

/// Error label the server attaches to retryable transaction failures.
pub const TRANSIENT_TRANSACTION_LABEL: &str = "TransientTransactionError";

/// Error label the server attaches to retryable write failures.
pub const RETRYABLE_WRITE_LABEL: &str = "RetryableWriteError";

/// Failure reported by the target for one operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TargetError {
    pub message: String,
    pub code: Option<i32>,
    pub code_name: Option<String>,
    pub labels: Vec<String>,
}

impl TargetError {
    pub fn new(message: impl Into<String>) -> Self {
        TargetError {
            message: message.into(),
            code: None,
            code_name: None,
            labels: Vec::new(),
        }
    }

    /// Attach the server's numeric code and code name.
    pub fn with_code(mut self, code: i32, code_name: impl Into<String>) -> Self {
        self.code = Some(code);
        self.code_name = Some(code_name.into());
        self
    }

    /// Attach an error label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Whether the same operation may succeed if re-issued immediately.
    pub fn is_transient(&self) -> bool {
        self.labels
            .iter()
            .any(|l| l == TRANSIENT_TRANSACTION_LABEL || l == RETRYABLE_WRITE_LABEL)
    }
}

impl From<mongodb::error::Error> for TargetError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        let (code, code_name) = match err.kind.as_ref() {
            ErrorKind::Command(command_error) => (
                Some(command_error.code),
                Some(command_error.code_name.clone()),
            ),
            _ => (None, None),
        };

        let mut labels: Vec<String> = err.labels().iter().cloned().collect();
        labels.sort();

        TargetError {
            message: err.to_string(),
            code,
            code_name,
            labels,
        }
    }
}

/// Operations the harness issues against the system under test.
#[async_trait]
pub trait Target: Send + Sync {
    /// Run a database command against the configured database.
    async fn run_command(&self, command: Document) -> Result<Document, TargetError>;

    /// Run a command against the `admin` database.
    async fn run_admin_command(&self, command: Document) -> Result<Document, TargetError>;

    /// Run an aggregation pipeline and drain the cursor.
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Document>, TargetError>;

    /// Insert documents; returns an acknowledgment document.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Document, TargetError>;

    /// Run a query and drain the cursor.
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, TargetError>;

    /// Update every matching document; returns an acknowledgment document.
    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<Document, TargetError>;

    /// Delete every matching document; returns an acknowledgment document.
    async fn delete_many(&self, collection: &str, filter: Document)
    -> Result<Document, TargetError>;

    /// Drop a collection. Dropping a missing collection is not an error.
    async fn drop_collection(&self, collection: &str) -> Result<(), TargetError>;

    /// Version string reported by the target.
    async fn server_version(&self) -> Result<String, TargetError>;
}
