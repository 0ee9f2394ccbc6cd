//! Service Error Taxonomy
//!
//! Every failure a client can observe is one of the `ServiceError` variants below.
//! Subsystem errors (`StoreError`, `QueueError`, `DispatchError`) convert into it,
//! and it renders itself as an HTTP status plus a JSON `{"error": ...}` body.
//!
//! Cache misses and cache failures never appear here: the caches degrade to
//! "absent" and log instead.

use crate::dispatch::protocol::ErrorBody;
use crate::executor::queue::QueueError;
use crate::store::StoreError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Rejected before any side effect (empty text, malformed body or id).
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The work queue did not accept the job within the admission window.
    #[error("Unable to send job within timeout")]
    Overloaded,

    /// The peer service was unreachable or answered with a non-success status.
    #[error("{0}")]
    UpstreamUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Overloaded => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamUnavailable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmptyInput => Self::Validation("Text cannot be empty".to_string()),
            StoreError::NotFound(_) => Self::NotFound("request not found".to_string()),
        }
    }
}

impl From<QueueError> for ServiceError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Overloaded(_) => Self::Overloaded,
            QueueError::Closed => Self::Internal("work queue is closed".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RequestId;
    use std::time::Duration;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServiceError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Overloaded.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ServiceError::UpstreamUnavailable("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_errors_convert() {
        let empty: ServiceError = StoreError::EmptyInput.into();
        assert!(matches!(empty, ServiceError::Validation(_)));

        let missing: ServiceError = StoreError::NotFound(RequestId::new()).into();
        assert!(matches!(missing, ServiceError::NotFound(_)));
    }

    #[test]
    fn test_overload_is_distinct_from_validation() {
        let err: ServiceError = QueueError::Overloaded(Duration::from_millis(10)).into();
        assert!(matches!(err, ServiceError::Overloaded));
        assert_eq!(err.to_string(), "Unable to send job within timeout");
    }
}
