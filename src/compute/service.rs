use crate::analysis::{AnalysisResult, analyze_text};
use crate::cache::keys::{ANALYSIS_NAMESPACE, text_key};
use crate::cache::{CacheBackend, ResultCache};
use crate::config::Config;
use crate::dispatch::IntakeClient;
use crate::dispatch::protocol::ReportRequest;
use crate::error::{ServiceError, ServiceResult};
use crate::executor::{Job, WorkQueue, WorkerPool};
use crate::store::RequestId;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cached analysis together with the text that produced it.
///
/// The key is a 32-bit hash, so two texts can share one. Keeping the text lets a
/// reader reject an entry that belongs to a colliding input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAnalysis {
    pub text: String,
    pub result: AnalysisResult,
}

/// Outcome of a Submit, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Served from the cache; the report is already on its way.
    Cached,
    /// Enqueued for a worker.
    Queued,
}

pub struct ComputeService {
    queue: Arc<WorkQueue>,
    cache: ResultCache<CachedAnalysis>,
    reporter: IntakeClient,
}

impl ComputeService {
    pub fn new(
        queue: Arc<WorkQueue>,
        cache: ResultCache<CachedAnalysis>,
        reporter: IntakeClient,
    ) -> Arc<Self> {
        Arc::new(Self {
            queue,
            cache,
            reporter,
        })
    }

    pub fn from_config(
        config: &Config,
        backend: Arc<dyn CacheBackend>,
    ) -> Result<Arc<Self>, reqwest::Error> {
        let queue = Arc::new(WorkQueue::new(
            config.queue_capacity,
            config.admission_timeout,
        ));
        let cache = ResultCache::new(backend, ANALYSIS_NAMESPACE, config.result_cache_ttl);
        let reporter = IntakeClient::new(
            &config.intake_addr,
            config.http_timeout,
            config.report_attempts,
        )?;

        Ok(Self::new(queue, cache, reporter))
    }

    pub fn queue(&self) -> &Arc<WorkQueue> {
        &self.queue
    }

    /// Builds and starts the worker pool draining this service's queue.
    pub async fn spawn_workers(self: &Arc<Self>, worker_count: usize) -> Arc<WorkerPool> {
        let service = self.clone();
        let pool = WorkerPool::new(self.queue.clone(), worker_count, move |job| {
            let service = service.clone();
            async move { service.process(job).await }
        });

        pool.start().await;
        pool
    }

    /// Handles one Submit: answers from the cache when possible, enqueues otherwise.
    pub async fn accept(self: &Arc<Self>, id: RequestId, text: String) -> ServiceResult<Admission> {
        if text.is_empty() {
            return Err(ServiceError::Validation("Text cannot be empty".to_string()));
        }

        if let Some(result) = self.cached_result(&text).await {
            tracing::info!("Cache hit for request {}, reporting immediately", id);

            let service = self.clone();
            tokio::spawn(async move {
                service.report(ReportRequest::success(id, result)).await;
            });

            return Ok(Admission::Cached);
        }

        self.queue.enqueue(Job::new(id, text)).await.map_err(|e| {
            tracing::warn!("Rejecting request {}: {}", id, e);
            ServiceError::from(e)
        })?;

        tracing::debug!(
            "Request {} queued ({}/{})",
            id,
            self.queue.depth(),
            self.queue.capacity()
        );
        Ok(Admission::Queued)
    }

    /// Job handler run by the workers: analyze, memoize, report.
    pub async fn process(&self, job: Job) {
        let result = analyze_text(&job.text);
        tracing::debug!(
            "Analyzed request {}: {} words, {} sentences",
            job.request_id,
            result.word_count,
            result.sentence_count
        );

        self.remember(&job.text, &result).await;
        self.report(ReportRequest::success(job.request_id, result))
            .await;
    }

    /// A cached result for `text`, if one exists and was computed from the same text.
    pub async fn cached_result(&self, text: &str) -> Option<AnalysisResult> {
        let entry = self.cache.get(&text_key(text)).await?;

        if entry.text != text {
            tracing::warn!("Cache key collision on {}, ignoring entry", text_key(text));
            return None;
        }

        Some(entry.result)
    }

    pub async fn remember(&self, text: &str, result: &AnalysisResult) {
        let entry = CachedAnalysis {
            text: text.to_string(),
            result: *result,
        };
        self.cache.set(&text_key(text), &entry).await;
    }

    async fn report(&self, report: ReportRequest) {
        let id = report.id;
        match self.reporter.report(&report).await {
            Ok(()) => tracing::debug!("Reported request {} as {}", id, report.status),
            // The intake reconciler re-submits requests that never get an outcome
            Err(e) => tracing::error!("Failed to report request {}: {}", id, e),
        }
    }

    pub async fn is_healthy(&self) -> bool {
        self.cache.is_healthy().await
    }
}
