//! Results API over records written by a suite run.

use std::sync::Arc;

use actix_web::{App, test, web};

use docdb_compat_lib::api;
use docdb_compat_lib::db::{MemoryStore, ResultsStore};
use docdb_compat_lib::report;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_api_serves_results_summaries_and_report() {
    let target = InProcessTarget::new();
    target.refuse("dbStats", "dbStats disabled");
    let store = Arc::new(MemoryStore::new());
    run_suite(&target, store.as_ref(), &suite("admin_commands")).await;
    report::generate(store.as_ref(), PLATFORM).await.unwrap();

    let shared: Arc<dyn ResultsStore> = store.clone();
    let app = test::init_service(
        App::new().app_data(web::Data::from(shared)).service(
            web::scope("/api/v1")
                .configure(api::configure_health_routes)
                .configure(api::configure_results_routes),
        ),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/v1/results?status=fail")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["records"][0]["test_name"], "dbStats");
    assert_eq!(body["records"][0]["run"], 1);

    let req = test::TestRequest::get().uri("/api/v1/summaries").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["summaries"][0]["run"], 1);
    assert_eq!(body["summaries"][0]["failing_tests"], 1);

    let req = test::TestRequest::get().uri("/api/v1/report").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["passing"].as_u64(), body["total"].as_u64().map(|t| t - 1));
}
