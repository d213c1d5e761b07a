//! HTTP middleware for the results API.

mod request_logger;

pub use request_logger::RequestLogger;
