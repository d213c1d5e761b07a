//! Document database compatibility harness library.
//!
//! Runs suites of database operations against a target, records one
//! result per case in a results store, and reports on the stored results.

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod executor;
pub mod export;
pub mod logcapture;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod report;
pub mod suite;
pub mod target;
