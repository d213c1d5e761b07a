//! API endpoint modules.

pub mod health;
pub mod openapi;
pub mod results;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use results::configure_routes as configure_results_routes;
