//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Document Database Compatibility Results",
        version = "0.1.0",
        description = "Read-only access to compatibility test records, run summaries and the live compatibility report"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Results endpoints
        api::results::list_results,
        api::results::list_summaries,
        api::results::live_report,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Results
            models::Status,
            models::SuiteCounts,
            models::RunSummary,
            models::ReportRow,
            models::CompatibilityReport,
            api::results::ResultsQuery,
            api::results::ResultsListResponse,
            api::results::SummariesResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Results", description = "Query stored compatibility results")
    )
)]
pub struct ApiDoc;
