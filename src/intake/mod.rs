//! Intake Service
//!
//! The client-facing service. It accepts texts, owns the Request Store, dispatches
//! work to the compute service and applies the outcomes it reports back.
//!
//! ## Responsibilities
//! - **Submission**: `POST /api/v1/text` creates an `InProcess` request and submits
//!   it. If the compute service cannot be reached the request is finished as
//!   `Failed` before the 500 goes out.
//! - **Status**: `GET /api/v1/status/{id}` reads through the status cache. Only
//!   terminal snapshots are cached, since they can never change again.
//! - **Reports**: `POST /api/v1/result` applies the first terminal outcome for a
//!   request; later reports are acknowledged and ignored.
//! - **Reconciliation**: A background sweep re-submits requests stuck `InProcess`
//!   and eventually fails them.
//!
//! ## Submodules
//! - **`service`**: `IntakeService` operations.
//! - **`handlers`**: Axum handlers.
//! - **`reconcile`**: The stale request sweeper.

pub mod handlers;
pub mod reconcile;
pub mod service;

pub use reconcile::{Reconciler, SweepSummary};
pub use service::IntakeService;

use crate::dispatch::protocol::{ENDPOINT_HEALTH, ENDPOINT_RESULT, ENDPOINT_STATUS, ENDPOINT_TEXT};

use axum::Router;
use axum::extract::Extension;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// HTTP surface of the intake service.
///
/// Browsers are only allowed in from the service's own origin, `http://{public_addr}`.
pub fn router(service: Arc<IntakeService>, public_addr: &str) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match HeaderValue::from_str(&format!("http://{}", public_addr)) {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(e) => tracing::warn!("Invalid CORS origin for {}: {}", public_addr, e),
    }

    Router::new()
        .route(ENDPOINT_TEXT, post(handlers::handle_submit_text))
        .route(
            &format!("{}/:id", ENDPOINT_STATUS),
            get(handlers::handle_get_status),
        )
        .route(ENDPOINT_RESULT, post(handlers::handle_report))
        .route(ENDPOINT_HEALTH, get(handlers::handle_health))
        .layer(Extension(service))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
