//! Built-in suites, one module per capability area.

pub mod admin_commands;
pub mod aggregation_stages;
pub mod data_types;
pub mod encryption;
pub mod geospatial;
pub mod index_types;
pub mod replication;
pub mod sessions;
pub mod text_search;
pub mod timeseries;

use mongodb::bson::Document;

use crate::error::{AppError, AppResult};
use crate::executor::{Case, Operation};
use crate::suite::SuiteDefinition;

/// Suite names in run order.
pub const SUITE_NAMES: &[&str] = &[
    admin_commands::NAME,
    aggregation_stages::NAME,
    index_types::NAME,
    data_types::NAME,
    geospatial::NAME,
    sessions::NAME,
    replication::NAME,
    text_search::NAME,
    timeseries::NAME,
    encryption::NAME,
];

/// Every built-in suite for a target whose fixtures live in `database`.
pub fn all_suites(database: &str) -> Vec<SuiteDefinition> {
    vec![
        admin_commands::suite(database),
        aggregation_stages::suite(),
        index_types::suite(),
        data_types::suite(),
        geospatial::suite(),
        sessions::suite(),
        replication::suite(),
        text_search::suite(),
        timeseries::suite(),
        encryption::suite(),
    ]
}

/// The suites named in `names`, in catalog order; every suite when `names` is empty.
pub fn select(database: &str, names: &[String]) -> AppResult<Vec<SuiteDefinition>> {
    let unknown: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|name| !SUITE_NAMES.contains(name))
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Unknown suite(s): {}. Available: {}",
            unknown.join(", "),
            SUITE_NAMES.join(", ")
        )));
    }

    Ok(all_suites(database)
        .into_iter()
        .filter(|suite| names.is_empty() || names.iter().any(|n| n == &suite.name))
        .collect())
}

fn command(name: &str, command: Document) -> Case {
    Case::new(name, Operation::Command { command })
}

fn admin(name: &str, command: Document) -> Case {
    Case::new(name, Operation::AdminCommand { command })
}

fn aggregate(name: &str, collection: &str, pipeline: Vec<Document>) -> Case {
    Case::new(
        name,
        Operation::Aggregate {
            collection: collection.to_string(),
            pipeline,
        },
    )
}

fn find(name: &str, collection: &str, filter: Document) -> Case {
    Case::new(
        name,
        Operation::Find {
            collection: collection.to_string(),
            filter,
        },
    )
}

fn insert(name: &str, collection: &str, documents: Vec<Document>) -> Case {
    Case::new(
        name,
        Operation::Insert {
            collection: collection.to_string(),
            documents,
        },
    )
}

fn create_index(name: &str, collection: &str, keys: Document, options: Document) -> Case {
    Case::new(
        name,
        Operation::CreateIndex {
            collection: collection.to_string(),
            keys,
            options,
        },
    )
}
