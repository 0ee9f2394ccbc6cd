//! Peer HTTP clients.
//!
//! `PeerClient` wraps a `reqwest::Client` bound to one peer's base URL. Submit uses
//! a single attempt; Report retries with jittered exponential backoff so that a
//! briefly unavailable intake service does not strand requests `InProcess`.

use super::protocol::{AnalyzeRequest, AnalyzeResponse, ENDPOINT_ANALYZE, ENDPOINT_RESULT, ReportRequest};
use crate::store::RequestId;

use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

const INITIAL_BACKOFF_MS: u64 = 150;
const MAX_BACKOFF_MS: u64 = 1200;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} service returned status {status}")]
    Rejected {
        service: &'static str,
        status: StatusCode,
    },
}

impl DispatchError {
    /// Transport failures and server errors may succeed on a later attempt;
    /// client errors (unknown id, bad payload) will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Rejected { status, .. } => status.is_server_error(),
        }
    }
}

/// HTTP client for one peer service.
#[derive(Debug, Clone)]
pub struct PeerClient {
    http_client: reqwest::Client,
    base_url: String,
    service: &'static str,
}

impl PeerClient {
    /// `addr` is `host:port` or a full URL.
    pub fn new(addr: &str, service: &'static str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = if addr.contains("://") {
            addr.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", addr)
        };

        Ok(Self {
            http_client,
            base_url,
            service,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One POST; any non-2xx status is an error.
    pub async fn post<T: Serialize>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<reqwest::Response, DispatchError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http_client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|source| DispatchError::Transport {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(DispatchError::Rejected {
                service: self.service,
                status: response.status(),
            });
        }

        Ok(response)
    }

    /// POST with up to `attempts` tries, backing off between retryable failures.
    pub async fn post_with_retry<T: Serialize>(
        &self,
        path: &str,
        payload: &T,
        attempts: usize,
    ) -> Result<reqwest::Response, DispatchError> {
        let attempts = attempts.max(1);
        let mut delay_ms = INITIAL_BACKOFF_MS;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.post(path, payload).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < attempts && e.is_retryable() => {
                    tracing::debug!(
                        "Attempt {}/{} to {}{} failed: {}",
                        attempt,
                        attempts,
                        self.base_url,
                        path,
                        e
                    );
                    // Jitter keeps workers that failed together from retrying together
                    let jitter = rand::random::<u64>() % 50;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(MAX_BACKOFF_MS);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Intake-side handle on the compute service.
#[derive(Debug, Clone)]
pub struct ComputeClient {
    peer: PeerClient,
}

impl ComputeClient {
    pub fn new(compute_addr: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            peer: PeerClient::new(compute_addr, "analyzer", timeout)?,
        })
    }

    /// Hands a request to the compute service. Not retried.
    ///
    /// Any 2xx counts as accepted; the body is informational only.
    pub async fn submit(&self, id: &RequestId, text: &str) -> Result<(), DispatchError> {
        let payload = AnalyzeRequest {
            id: *id,
            text: text.to_string(),
        };

        let response = self.peer.post(ENDPOINT_ANALYZE, &payload).await?;

        match response.json::<AnalyzeResponse>().await {
            Ok(body) if body.cached => tracing::debug!("Request {} answered from cache", id),
            Ok(_) => tracing::debug!("Request {} queued for analysis", id),
            Err(e) => tracing::debug!("Request {} accepted with unreadable body: {}", id, e),
        }

        Ok(())
    }
}

/// Compute-side handle on the intake service.
#[derive(Debug, Clone)]
pub struct IntakeClient {
    peer: PeerClient,
    attempts: usize,
}

impl IntakeClient {
    pub fn new(intake_addr: &str, timeout: Duration, attempts: usize) -> Result<Self, reqwest::Error> {
        Ok(Self {
            peer: PeerClient::new(intake_addr, "receiver", timeout)?,
            attempts,
        })
    }

    /// Delivers an outcome to the intake service.
    pub async fn report(&self, report: &ReportRequest) -> Result<(), DispatchError> {
        self.peer
            .post_with_retry(ENDPOINT_RESULT, report, self.attempts)
            .await?;
        Ok(())
    }
}
