//! Database work performed by one case.

use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use mongodb::bson::{Bson, Document, doc};
use tokio::time::Instant;

use crate::config::SearchPolling;
use crate::logcapture::LogSink;
use crate::target::{Target, TargetError};

/// One case's database work, passed to the target verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Command {
        command: Document,
    },
    /// A command that must run against the `admin` database.
    AdminCommand {
        command: Document,
    },
    Aggregate {
        collection: String,
        pipeline: Vec<Document>,
    },
    CreateIndex {
        collection: String,
        keys: Document,
        options: Document,
    },
    Insert {
        collection: String,
        documents: Vec<Document>,
    },
    Find {
        collection: String,
        filter: Document,
    },
    Update {
        collection: String,
        filter: Document,
        update: Document,
    },
    Delete {
        collection: String,
        filter: Document,
    },
    /// Create an index, query, and require the index in the winning plan.
    IndexedQuery {
        collection: String,
        keys: Document,
        options: Document,
        index_name: String,
        filter: Document,
    },
    /// Create a search index, wait until it is queryable, then run `pipeline`.
    SearchQuery {
        collection: String,
        index_name: String,
        definition: Document,
        pipeline: Vec<Document>,
    },
    /// Change server-wide state around `inner`, restoring it afterwards.
    /// `apply` and `revert` run against the `admin` database.
    WithGlobalState {
        apply: Document,
        revert: Document,
        inner: Box<Operation>,
    },
}

impl Operation {
    /// Name used for expected-unsupported matching and logging.
    pub fn name(&self) -> String {
        match self {
            Operation::Command { command } | Operation::AdminCommand { command } => {
                command_name(command)
            }
            Operation::Aggregate { .. } => "aggregate".to_string(),
            Operation::CreateIndex { .. } => "createIndexes".to_string(),
            Operation::Insert { .. } => "insert".to_string(),
            Operation::Find { .. } => "find".to_string(),
            Operation::Update { .. } => "update".to_string(),
            Operation::Delete { .. } => "delete".to_string(),
            Operation::IndexedQuery { .. } => "indexedQuery".to_string(),
            Operation::SearchQuery { .. } => "searchQuery".to_string(),
            Operation::WithGlobalState { inner, .. } => inner.name(),
        }
    }
}

/// Ways a case can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaseError {
    /// The target rejected a step; `operation` names that step.
    #[error("{error}")]
    Target {
        operation: String,
        error: TargetError,
    },
    /// The target answered but the answer did not satisfy the case.
    #[error("{0}")]
    Assertion(String),
    /// A bounded wait ran out.
    #[error("{0}")]
    Timeout(String),
}

impl CaseError {
    fn target(operation: impl Into<String>, error: TargetError) -> Self {
        CaseError::Target {
            operation: operation.into(),
            error,
        }
    }
}

/// First key of a command document.
pub fn command_name(command: &Document) -> String {
    command.keys().next().cloned().unwrap_or_default()
}

/// Server-style default index name: `field_direction` pairs joined by `_`.
pub fn default_index_name(keys: &Document) -> String {
    keys.iter()
        .map(|(field, direction)| {
            let direction = match direction {
                Bson::String(s) => s.clone(),
                Bson::Int32(i) => i.to_string(),
                Bson::Int64(i) => i.to_string(),
                Bson::Double(f) => (*f as i64).to_string(),
                other => other.to_string(),
            };
            format!("{}_{}", field, direction)
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// Whether `index_name` appears as an `indexName` in the winning plan.
///
/// Falls back to scanning the whole explain output when the target does not
/// report a `queryPlanner.winningPlan` section.
pub fn plan_uses_index(explain: &Document, index_name: &str) -> bool {
    let winning_plan = explain
        .get_document("queryPlanner")
        .ok()
        .and_then(|planner| planner.get_document("winningPlan").ok());

    match winning_plan {
        Some(plan) => document_names_index(plan, index_name),
        None => document_names_index(explain, index_name),
    }
}

fn document_names_index(doc: &Document, index_name: &str) -> bool {
    doc.iter().any(|(key, value)| match value {
        Bson::String(s) => key == "indexName" && s == index_name,
        other => bson_names_index(other, index_name),
    })
}

fn bson_names_index(value: &Bson, index_name: &str) -> bool {
    match value {
        Bson::Document(doc) => document_names_index(doc, index_name),
        Bson::Array(items) => items.iter().any(|item| bson_names_index(item, index_name)),
        _ => false,
    }
}

fn documents_to_bson(documents: Vec<Document>) -> Bson {
    Bson::Array(documents.into_iter().map(Bson::Document).collect())
}

/// Run `operation`, writing payload entries into `payload` as steps complete.
///
/// Partial payloads are kept when a later step fails.
pub fn execute<'a>(
    target: &'a dyn Target,
    operation: &'a Operation,
    polling: SearchPolling,
    logs: &'a mut LogSink,
    payload: &'a mut Document,
) -> BoxFuture<'a, Result<(), CaseError>> {
    async move {
        match operation {
            Operation::Command { command } => {
                let result = target
                    .run_command(command.clone())
                    .await
                    .map_err(|e| CaseError::target(command_name(command), e))?;
                payload.insert("command_result", result);
            }
            Operation::AdminCommand { command } => {
                let result = target
                    .run_admin_command(command.clone())
                    .await
                    .map_err(|e| CaseError::target(command_name(command), e))?;
                payload.insert("command_result", result);
            }
            Operation::Aggregate {
                collection,
                pipeline,
            } => {
                let documents = target
                    .aggregate(collection, pipeline.clone())
                    .await
                    .map_err(|e| CaseError::target("aggregate", e))?;
                payload.insert("query_result", documents_to_bson(documents));
            }
            Operation::CreateIndex {
                collection,
                keys,
                options,
            } => {
                let result = create_index(target, collection, keys, options).await?;
                payload.insert("index_result", result);
            }
            Operation::Insert {
                collection,
                documents,
            } => {
                let result = target
                    .insert_many(collection, documents.clone())
                    .await
                    .map_err(|e| CaseError::target("insert", e))?;
                payload.insert("insert_result", result);
            }
            Operation::Find { collection, filter } => {
                let documents = target
                    .find(collection, filter.clone())
                    .await
                    .map_err(|e| CaseError::target("find", e))?;
                payload.insert("query_result", documents_to_bson(documents));
            }
            Operation::Update {
                collection,
                filter,
                update,
            } => {
                let result = target
                    .update_many(collection, filter.clone(), update.clone())
                    .await
                    .map_err(|e| CaseError::target("update", e))?;
                payload.insert("update_result", result);
            }
            Operation::Delete { collection, filter } => {
                let result = target
                    .delete_many(collection, filter.clone())
                    .await
                    .map_err(|e| CaseError::target("delete", e))?;
                payload.insert("delete_result", result);
            }
            Operation::IndexedQuery {
                collection,
                keys,
                options,
                index_name,
                filter,
            } => {
                let mut options = options.clone();
                options.insert("name", index_name.as_str());
                let result = create_index(target, collection, keys, &options).await?;
                payload.insert("index_result", result);

                let documents = target
                    .find(collection, filter.clone())
                    .await
                    .map_err(|e| CaseError::target("find", e))?;
                payload.insert("query_result", documents_to_bson(documents));

                let explain = target
                    .run_command(doc! {
                        "explain": { "find": collection.as_str(), "filter": filter.clone() },
                        "verbosity": "queryPlanner",
                    })
                    .await
                    .map_err(|e| CaseError::target("explain", e))?;
                let used = plan_uses_index(&explain, index_name);
                payload.insert("explain_plan", explain);

                if !used {
                    return Err(CaseError::Assertion(format!(
                        "Index '{}' not used in query plan.",
                        index_name
                    )));
                }
                logs.info(format!("Index '{}' found in winning plan", index_name));
            }
            Operation::SearchQuery {
                collection,
                index_name,
                definition,
                pipeline,
            } => {
                let result = target
                    .run_command(doc! {
                        "createSearchIndexes": collection.as_str(),
                        "indexes": [{ "name": index_name.as_str(), "definition": definition.clone() }],
                    })
                    .await
                    .map_err(|e| CaseError::target("createSearchIndexes", e))?;
                payload.insert("index_result", result);

                wait_for_search_index(target, collection, index_name, polling, logs).await?;

                let documents = target
                    .aggregate(collection, pipeline.clone())
                    .await
                    .map_err(|e| CaseError::target("aggregate", e))?;
                payload.insert("search_result", documents_to_bson(documents));
            }
            Operation::WithGlobalState {
                apply,
                revert,
                inner,
            } => {
                let applied = target
                    .run_admin_command(apply.clone())
                    .await
                    .map_err(|e| CaseError::target(command_name(apply), e))?;
                payload.insert("apply_result", applied);

                let outcome = execute(target, inner, polling, logs, payload).await;

                if let Err(e) = target.run_admin_command(revert.clone()).await {
                    logs.warn(format!(
                        "Failed to restore global state with '{}': {}",
                        command_name(revert),
                        e
                    ));
                } else {
                    logs.info(format!(
                        "Restored global state with '{}'",
                        command_name(revert)
                    ));
                }

                outcome?;
            }
        }
        Ok(())
    }
    .boxed()
}

async fn create_index(
    target: &dyn Target,
    collection: &str,
    keys: &Document,
    options: &Document,
) -> Result<Document, CaseError> {
    let mut spec = options.clone();
    spec.insert("key", keys.clone());
    if !spec.contains_key("name") {
        spec.insert("name", default_index_name(keys));
    }

    target
        .run_command(doc! { "createIndexes": collection, "indexes": [spec] })
        .await
        .map_err(|e| CaseError::target("createIndexes", e))
}

async fn wait_for_search_index(
    target: &dyn Target,
    collection: &str,
    index_name: &str,
    polling: SearchPolling,
    logs: &mut LogSink,
) -> Result<(), CaseError> {
    let deadline = Instant::now() + polling.timeout;

    loop {
        let indexes = target
            .aggregate(
                collection,
                vec![doc! { "$listSearchIndexes": { "name": index_name } }],
            )
            .await
            .map_err(|e| CaseError::target("$listSearchIndexes", e))?;

        if indexes
            .iter()
            .any(|index| index.get_bool("queryable").unwrap_or(false))
        {
            logs.info(format!("Search index '{}' is queryable", index_name));
            return Ok(());
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(CaseError::Timeout(format!(
                "Search index '{}' not queryable after {}s",
                index_name,
                polling.timeout.as_secs()
            )));
        }

        let wait: Duration = polling.interval.min(deadline - now);
        tokio::time::sleep(wait).await;
    }
}
