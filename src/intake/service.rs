use crate::analysis::AnalysisResult;
use crate::cache::keys::{REQUEST_NAMESPACE, request_key};
use crate::cache::{CacheBackend, ResultCache};
use crate::config::Config;
use crate::dispatch::protocol::ReportRequest;
use crate::dispatch::{ComputeClient, DispatchError};
use crate::error::{ServiceError, ServiceResult};
use crate::store::types::now_ms;
use crate::store::{Finish, Request, RequestId, RequestStatus, RequestStore};

use std::sync::Arc;
use std::time::Duration;

pub struct IntakeService {
    store: Arc<dyn RequestStore>,
    cache: ResultCache<Request>,
    compute: ComputeClient,
}

impl IntakeService {
    pub fn new(
        store: Arc<dyn RequestStore>,
        cache: ResultCache<Request>,
        compute: ComputeClient,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            cache,
            compute,
        })
    }

    pub fn from_config(
        config: &Config,
        store: Arc<dyn RequestStore>,
        backend: Arc<dyn CacheBackend>,
    ) -> Result<Arc<Self>, reqwest::Error> {
        let cache = ResultCache::new(backend, REQUEST_NAMESPACE, config.status_cache_ttl);
        let compute = ComputeClient::new(&config.compute_addr, config.http_timeout)?;

        Ok(Self::new(store, cache, compute))
    }

    /// Creates a request and hands it to the compute service.
    ///
    /// On a dispatch failure the request is finished as `Failed` and the error is
    /// returned; the request stays queryable either way.
    pub async fn submit_text(&self, text: &str) -> ServiceResult<Request> {
        let request = self.store.create(text).await?;

        if let Err(e) = self.compute.submit(&request.id, &request.text).await {
            tracing::error!("Failed to submit request {}: {}", request.id, e);
            self.mark_failed(&request.id).await;
            return Err(ServiceError::UpstreamUnavailable(
                "Failed to send to analyzer".to_string(),
            ));
        }

        tracing::info!("Request {} submitted for analysis", request.id);
        Ok(request)
    }

    /// Current snapshot of a request, served from the cache when possible.
    pub async fn status(&self, id: &RequestId) -> ServiceResult<Request> {
        let key = request_key(id);

        if let Some(request) = self.cache.get(&key).await {
            return Ok(request);
        }

        let request = self.store.get(id).await?;
        // An InProcess snapshot could outlive the report that finishes it
        if request.status.is_terminal() {
            self.cache.set(&key, &request).await;
        }

        Ok(request)
    }

    /// Applies a reported outcome.
    pub async fn apply_report(&self, report: ReportRequest) -> ServiceResult<Finish> {
        if !report.status.is_terminal() {
            return Err(ServiceError::Validation(format!(
                "status must be {} or {}",
                RequestStatus::Success,
                RequestStatus::Failed
            )));
        }

        let result = match report.status {
            RequestStatus::Success => Some(report.analyze),
            _ => None,
        };

        let finish = self.finish(&report.id, report.status, result).await?;
        if let Finish::AlreadyTerminal(request) = &finish {
            tracing::warn!(
                "Ignoring {} report for request {}, already {}",
                report.status,
                request.id,
                request.status
            );
        }

        Ok(finish)
    }

    /// Requests created more than `age` ago that still have no outcome.
    pub async fn stale_requests(&self, age: Duration) -> Vec<Request> {
        let cutoff = now_ms().saturating_sub(age.as_millis() as u64);
        self.store.in_process_older_than(cutoff).await
    }

    /// Submits an existing request again.
    pub async fn resubmit(&self, request: &Request) -> Result<(), DispatchError> {
        self.compute.submit(&request.id, &request.text).await
    }

    /// Finishes a request as `Failed`, logging instead of failing.
    pub async fn mark_failed(&self, id: &RequestId) {
        if let Err(e) = self.finish(id, RequestStatus::Failed, None).await {
            tracing::error!("Failed to mark request {} as failed: {}", id, e);
        }
    }

    pub async fn is_healthy(&self) -> bool {
        self.cache.is_healthy().await
    }

    async fn finish(
        &self,
        id: &RequestId,
        status: RequestStatus,
        result: Option<AnalysisResult>,
    ) -> ServiceResult<Finish> {
        let finish = self.store.finish(id, status, result).await?;

        if let Finish::Applied(request) = &finish {
            tracing::info!("Request {} finished as {}", request.id, request.status);
            self.cache.set(&request_key(id), request).await;
        }

        Ok(finish)
    }
}
