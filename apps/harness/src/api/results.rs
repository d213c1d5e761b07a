//! Read-only endpoints over stored result records and run summaries.

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::{RecordQuery, ResultsStore};
use crate::error::{AppError, AppResult};
use crate::models::{PersistedRecord, RunSummary, Status};
use crate::report;

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 500;

/// Query parameters for the results endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResultsQuery {
    /// Filter by suite name.
    pub suite: Option<String>,
    /// Filter by status (pass, fail).
    pub status: Option<String>,
    /// Results per page (default 50, max 500).
    pub limit: Option<u64>,
    /// Pagination offset.
    pub offset: Option<u64>,
}

impl ResultsQuery {
    fn to_record_query(&self) -> AppResult<RecordQuery> {
        let status = match self.status.as_deref() {
            None => None,
            Some("pass") => Some(Status::Pass),
            Some("fail") => Some(Status::Fail),
            Some(other) => {
                return Err(AppError::InvalidInput(format!(
                    "status must be 'pass' or 'fail', got '{}'",
                    other
                )));
            }
        };

        Ok(RecordQuery {
            suite: self.suite.clone(),
            status,
            limit: self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: self.offset.unwrap_or(0),
        })
    }
}

/// Paginated result records.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResultsListResponse {
    /// Records in their persisted shape.
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<PersistedRecord>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// Stored run summaries, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct SummariesResponse {
    pub summaries: Vec<RunSummary>,
}

/// Query result records with filtering and pagination.
#[utoipa::path(
    get,
    path = "/api/v1/results",
    tag = "Results",
    params(
        ("suite" = Option<String>, Query, description = "Filter by suite name"),
        ("status" = Option<String>, Query, description = "Filter by status (pass, fail)"),
        ("limit" = Option<u64>, Query, description = "Results per page (default 50, max 500)"),
        ("offset" = Option<u64>, Query, description = "Pagination offset")
    ),
    responses(
        (status = 200, description = "Page of result records", body = ResultsListResponse),
        (status = 400, description = "Invalid filter", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_results(
    store: web::Data<dyn ResultsStore>,
    query: web::Query<ResultsQuery>,
) -> AppResult<HttpResponse> {
    let params = query.to_record_query()?;
    let (records, total) = store.query_records(&params).await?;

    Ok(HttpResponse::Ok().json(ResultsListResponse {
        records,
        total,
        limit: params.limit,
        offset: params.offset,
    }))
}

/// List stored run summaries.
#[utoipa::path(
    get,
    path = "/api/v1/summaries",
    tag = "Results",
    responses(
        (status = 200, description = "Run summaries, newest first", body = SummariesResponse),
    )
)]
pub async fn list_summaries(store: web::Data<dyn ResultsStore>) -> AppResult<HttpResponse> {
    let summaries = store.list_summaries().await?;
    Ok(HttpResponse::Ok().json(SummariesResponse { summaries }))
}

/// Compatibility report computed from the current store contents.
///
/// Read-only: no summary is stored and no run number is assigned.
#[utoipa::path(
    get,
    path = "/api/v1/report",
    tag = "Results",
    responses(
        (status = 200, description = "Compatibility report", body = crate::models::CompatibilityReport),
        (status = 404, description = "No records stored", body = crate::error::ErrorResponse),
        (status = 503, description = "Results store unreachable", body = crate::error::ErrorResponse),
    )
)]
pub async fn live_report(store: web::Data<dyn ResultsStore>) -> AppResult<HttpResponse> {
    let records = store.all_records().await?;
    if records.is_empty() {
        return Err(AppError::NoResults);
    }
    Ok(HttpResponse::Ok().json(report::compatibility_report(&records)))
}

/// Configure result routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/results", web::get().to(list_results))
        .route("/summaries", web::get().to(list_summaries))
        .route("/report", web::get().to(live_report));
}
