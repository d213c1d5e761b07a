//! SeaORM entity definitions for the PostgreSQL results store.

pub mod compat_result;
pub mod run_summary;
