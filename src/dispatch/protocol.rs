//! Network Protocol Definitions
//!
//! Routes and Data Transfer Objects shared by the intake and compute services.
//! Field names follow the established wire format (`analyze`, camelCase statistics,
//! `"in process"` status strings).

use crate::analysis::AnalysisResult;
use crate::store::{Request, RequestId, RequestStatus};

use serde::{Deserialize, Serialize};

// --- Intake endpoints ---

/// Client submission of a new text.
pub const ENDPOINT_TEXT: &str = "/api/v1/text";
/// Client status polling, followed by `/{id}`.
pub const ENDPOINT_STATUS: &str = "/api/v1/status";
/// Internal callback used by the compute service to report outcomes.
pub const ENDPOINT_RESULT: &str = "/api/v1/result";

// --- Compute endpoints ---

/// Internal submission of a job to the compute service.
pub const ENDPOINT_ANALYZE: &str = "/api/v1/analyze";

// --- Shared ---

pub const ENDPOINT_HEALTH: &str = "/api/v1/health";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTextRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTextResponse {
    pub id: RequestId,
}

/// Payload of the Submit exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub id: RequestId,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub message: String,
    /// `true` when the result came from the cache and was reported immediately.
    #[serde(default)]
    pub cached: bool,
}

/// Payload of the Report exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub id: RequestId,
    pub status: RequestStatus,
    #[serde(default)]
    pub analyze: AnalysisResult,
}

impl ReportRequest {
    pub fn success(id: RequestId, analyze: AnalysisResult) -> Self {
        Self {
            id,
            status: RequestStatus::Success,
            analyze,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub status: String,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Status query answer.
///
/// `analyze` is only present for successful requests.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: RequestId,
    pub text: String,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyze: Option<AnalysisResult>,
}

impl From<Request> for StatusResponse {
    fn from(request: Request) -> Self {
        let analyze = match request.status {
            RequestStatus::Success => request.result,
            _ => None,
        };

        Self {
            id: request.id,
            text: request.text,
            status: request.status,
            analyze,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            component: None,
        }
    }

    pub fn failing(component: &str) -> Self {
        Self {
            status: "error".to_string(),
            component: Some(component.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
