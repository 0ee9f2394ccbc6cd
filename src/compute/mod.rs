//! Compute Service
//!
//! Receives Submit calls, runs the analysis on a bounded worker pool and reports
//! every outcome back to the intake service.
//!
//! ## Request Flow
//! 1. **Fast path**: If the content-addressed cache already holds a verified result
//!    for the text, the handler answers `cached: true` and reports `Success`
//!    immediately. No job is enqueued.
//! 2. **Admission**: Otherwise the job is enqueued. A full queue that stays full for
//!    the admission window yields `429 Too Many Requests`.
//! 3. **Execution**: A worker analyzes the text, memoizes the result under
//!    `analyze:<fnv32a(text)>`, and reports it.
//!
//! ## Submodules
//! - **`service`**: `ComputeService` state and the job handler.
//! - **`handlers`**: Axum handlers for `/api/v1/analyze` and `/api/v1/health`.

pub mod handlers;
pub mod service;

pub use service::{CachedAnalysis, ComputeService};

use crate::dispatch::protocol::{ENDPOINT_ANALYZE, ENDPOINT_HEALTH};

use axum::Router;
use axum::extract::Extension;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// HTTP surface of the compute service.
pub fn router(service: Arc<ComputeService>) -> Router {
    Router::new()
        .route(ENDPOINT_ANALYZE, post(handlers::handle_analyze))
        .route(ENDPOINT_HEALTH, get(handlers::handle_health))
        .layer(Extension(service))
        .layer(TraceLayer::new_for_http())
}
