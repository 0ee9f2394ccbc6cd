use super::service::{Admission, ComputeService};
use crate::dispatch::protocol::{AnalyzeRequest, AnalyzeResponse, HealthResponse};
use crate::error::ServiceError;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

pub async fn handle_analyze(
    Extension(service): Extension<Arc<ComputeService>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AnalyzeResponse>), ServiceError> {
    let Json(req) = payload.map_err(|e| {
        tracing::error!("Malformed analyze request: {}", e);
        ServiceError::Validation(e.body_text())
    })?;

    let cached = match service.accept(req.id, req.text).await? {
        Admission::Cached => true,
        Admission::Queued => false,
    };

    Ok((
        StatusCode::OK,
        Json(AnalyzeResponse {
            message: "Success".to_string(),
            cached,
        }),
    ))
}

pub async fn handle_health(
    Extension(service): Extension<Arc<ComputeService>>,
) -> (StatusCode, Json<HealthResponse>) {
    if service.is_healthy().await {
        (StatusCode::OK, Json(HealthResponse::ok()))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::failing("cache")),
        )
    }
}
