use super::service::IntakeService;
use crate::dispatch::protocol::{
    AckResponse, HealthResponse, ReportRequest, StatusResponse, SubmitTextRequest,
    SubmitTextResponse,
};
use crate::error::ServiceError;
use crate::store::RequestId;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

fn malformed(e: JsonRejection) -> ServiceError {
    tracing::error!("Malformed request body: {}", e);
    ServiceError::Validation(e.body_text())
}

pub async fn handle_submit_text(
    Extension(service): Extension<Arc<IntakeService>>,
    payload: Result<Json<SubmitTextRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitTextResponse>), ServiceError> {
    let Json(req) = payload.map_err(malformed)?;

    let request = service.submit_text(&req.text).await?;

    Ok((StatusCode::OK, Json(SubmitTextResponse { id: request.id })))
}

pub async fn handle_get_status(
    Extension(service): Extension<Arc<IntakeService>>,
    Path(id_str): Path<String>,
) -> Result<(StatusCode, Json<StatusResponse>), ServiceError> {
    let id: RequestId = id_str.parse().map_err(|e| {
        tracing::error!("Failed to parse request id {:?}: {}", id_str, e);
        ServiceError::Validation("Invalid UUID".to_string())
    })?;

    let request = service.status(&id).await?;

    Ok((StatusCode::OK, Json(StatusResponse::from(request))))
}

pub async fn handle_report(
    Extension(service): Extension<Arc<IntakeService>>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AckResponse>), ServiceError> {
    let Json(report) = payload.map_err(malformed)?;

    service.apply_report(report).await?;

    Ok((StatusCode::OK, Json(AckResponse::ok())))
}

pub async fn handle_health(
    Extension(service): Extension<Arc<IntakeService>>,
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
