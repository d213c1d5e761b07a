//! In-process results store used by dry runs and tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{PersistedRecord, RunSummary};

use super::{RecordQuery, ResultsStore};

#[derive(Default)]
struct State {
    ids: HashSet<Uuid>,
    records: Vec<PersistedRecord>,
    summaries: Vec<RunSummary>,
}

/// Results store held in memory; same insert-if-absent semantics as PostgreSQL.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    unreachable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that fails every call as if the backend were down.
    #[cfg(test)]
    pub(crate) fn unreachable() -> Self {
        MemoryStore {
            state: Mutex::new(State::default()),
            unreachable: true,
        }
    }

    fn state(&self) -> AppResult<std::sync::MutexGuard<'_, State>> {
        if self.unreachable {
            return Err(AppError::ResultsStoreUnavailable(
                "memory store marked unreachable".to_string(),
            ));
        }
        self.state
            .lock()
            .map_err(|_| AppError::Database("Memory store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl ResultsStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        self.state().map(|_| ())
    }

    async fn insert_records(&self, records: &[PersistedRecord]) -> AppResult<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut state = self.state()?;
        let mut inserted = 0;
        for record in records {
            if state.ids.insert(record.id) {
                state.records.push(record.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn all_records(&self) -> AppResult<Vec<PersistedRecord>> {
        Ok(self.state()?.records.clone())
    }

    async fn query_records(&self, query: &RecordQuery) -> AppResult<(Vec<PersistedRecord>, u64)> {
        let state = self.state()?;
        let matching: Vec<&PersistedRecord> = state
            .records
            .iter()
            .filter(|r| query.suite.as_ref().is_none_or(|s| &r.suite == s))
            .filter(|r| query.status.is_none_or(|s| r.status == s))
            .collect();

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn assign_run(&self, run: i64) -> AppResult<u64> {
        let mut state = self.state()?;
        let mut updated = 0;
        for record in state.records.iter_mut().filter(|r| r.run.is_none()) {
            record.run = Some(run);
            updated += 1;
        }
        Ok(updated)
    }

    async fn insert_summary(&self, summary: &RunSummary) -> AppResult<()> {
        self.state()?.summaries.push(summary.clone());
        Ok(())
    }

    async fn latest_run(&self) -> AppResult<Option<i64>> {
        Ok(self.state()?.summaries.iter().map(|s| s.run).max())
    }

    async fn list_summaries(&self) -> AppResult<Vec<RunSummary>> {
        let mut summaries = self.state()?.summaries.clone();
        summaries.sort_by(|a, b| b.run.cmp(&a.run));
        Ok(summaries)
    }
}
