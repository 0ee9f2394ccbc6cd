use crate::analysis::AnalysisResult;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Correlation key for a request across both services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle state of a request.
///
/// Transitions only move forward: `InProcess -> Success | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    #[serde(rename = "in process")]
    InProcess,
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "failed")]
    Failed,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::InProcess)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InProcess => "in process",
            Self::Success => "success",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A single analysis request as owned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub text: String,
    pub status: RequestStatus,
    /// Present only when `status` is `Success`.
    pub result: Option<AnalysisResult>,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl Request {
    pub(crate) fn apply(&mut self, status: RequestStatus, result: Option<AnalysisResult>) {
        self.status = status;
        self.result = match status {
            RequestStatus::Success => Some(result.unwrap_or_default()),
            _ => None,
        };
    }
}

/// Outcome of `RequestStore::finish`.
#[derive(Debug, Clone, PartialEq)]
pub enum Finish {
    /// The request moved from `InProcess` to the requested terminal status.
    Applied(Request),
    /// The request had already reached a terminal status and was not changed.
    AlreadyTerminal(Request),
}

impl Finish {
    pub fn request(&self) -> &Request {
        match self {
            Self::Applied(request) | Self::AlreadyTerminal(request) => request,
        }
    }

    pub fn into_request(self) -> Request {
        match self {
            Self::Applied(request) | Self::AlreadyTerminal(request) => request,
        }
    }
}

/// Current system time in milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
