//! Database queries for result records and run summaries.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::compat_result::{self, Entity as CompatResult};
use crate::entity::run_summary::{self, Entity as RunSummaryEntity};
use crate::error::{AppError, AppResult};
use crate::models::{PersistedRecord, RunSummary};

use super::{DbPool, RecordQuery, ResultsStore};

const INSERT_IF_ABSENT: &str = r#"
    INSERT INTO compat_results (id, suite, test_name, status, run, document, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (id) DO NOTHING
"#;

impl DbPool {
    fn decode_record(model: compat_result::Model) -> AppResult<PersistedRecord> {
        let mut record: PersistedRecord = serde_json::from_value(model.document).map_err(|e| {
            AppError::Database(format!("Corrupt record document {}: {}", model.id, e))
        })?;
        // The column is authoritative; the document predates run assignment.
        record.run = model.run;
        Ok(record)
    }

    fn filtered(query: &RecordQuery) -> Select<CompatResult> {
        let mut select = CompatResult::find();

        if let Some(ref suite) = query.suite {
            select = select.filter(compat_result::Column::Suite.eq(suite.as_str()));
        }

        if let Some(status) = query.status {
            select = select.filter(compat_result::Column::Status.eq(status.as_str()));
        }

        select
    }
}

#[async_trait]
impl ResultsStore for DbPool {
    async fn ping(&self) -> AppResult<()> {
        let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_owned());
        self.connection()
            .query_one_raw(stmt)
            .await
            .map_err(|e| AppError::ResultsStoreUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn insert_records(&self, records: &[PersistedRecord]) -> AppResult<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        // One transaction per batch: either every new record lands or none does
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start insert: {}", e)))?;

        let now = Utc::now();
        let mut inserted = 0;

        for record in records {
            let document = serde_json::to_value(record)?;
            let values: Vec<sea_orm::Value> = vec![
                record.id.into(),
                record.suite.clone().into(),
                record.test_name.clone().into(),
                record.status.as_str().into(),
                record.run.into(),
                document.into(),
                now.into(),
            ];
            let stmt =
                Statement::from_sql_and_values(DatabaseBackend::Postgres, INSERT_IF_ABSENT, values);

            let result = txn
                .execute_raw(stmt)
                .await
                .map_err(|e| AppError::Database(format!("Failed to insert record: {}", e)))?;
            inserted += result.rows_affected();
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit records: {}", e)))?;

        Ok(inserted)
    }

    async fn all_records(&self) -> AppResult<Vec<PersistedRecord>> {
        let models = CompatResult::find()
            .order_by_asc(compat_result::Column::CreatedAt)
            .order_by_asc(compat_result::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to read records: {}", e)))?;

        models.into_iter().map(Self::decode_record).collect()
    }

    async fn query_records(&self, query: &RecordQuery) -> AppResult<(Vec<PersistedRecord>, u64)> {
        let select = Self::filtered(query);

        // Count total before pagination
        let total = select
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count records: {}", e)))?;

        let models = select
            .order_by_asc(compat_result::Column::CreatedAt)
            .order_by_asc(compat_result::Column::Id)
            .offset(query.offset)
            .limit(query.limit)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query records: {}", e)))?;

        let records = models
            .into_iter()
            .map(Self::decode_record)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((records, total))
    }

    async fn assign_run(&self, run: i64) -> AppResult<u64> {
        let result = CompatResult::update_many()
            .col_expr(compat_result::Column::Run, Expr::value(run))
            .filter(compat_result::Column::Run.is_null())
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to assign run {}: {}", run, e)))?;

        Ok(result.rows_affected)
    }

    async fn insert_summary(&self, summary: &RunSummary) -> AppResult<()> {
        let model = run_summary::ActiveModel {
            id: Set(Uuid::now_v7()),
            run: Set(summary.run),
            platform: Set(summary.platform.clone()),
            document: Set(serde_json::to_value(summary)?),
            created_at: Set(Utc::now()),
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert run summary: {}", e)))?;

        Ok(())
    }

    async fn latest_run(&self) -> AppResult<Option<i64>> {
        let latest = RunSummaryEntity::find()
            .order_by_desc(run_summary::Column::Run)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to read latest run: {}", e)))?;

        Ok(latest.map(|m| m.run))
    }

    async fn list_summaries(&self) -> AppResult<Vec<RunSummary>> {
        let models = RunSummaryEntity::find()
            .order_by_desc(run_summary::Column::Run)
            .order_by_desc(run_summary::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list run summaries: {}", e)))?;

        models
            .into_iter()
            .map(|m| {
                serde_json::from_value(m.document).map_err(|e| {
                    AppError::Database(format!("Corrupt run summary {}: {}", m.id, e))
                })
            })
            .collect()
    }
}
