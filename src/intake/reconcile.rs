//! Stale Request Reconciliation
//!
//! Submit and Report are one-way calls, so a request can stay `InProcess` forever
//! if the compute service loses its job (restart, failed report). The sweeper
//! finds requests older than `after` and re-submits them, up to `max_attempts`
//! times per request, after which they are finished as `Failed`.
//!
//! Re-submission is safe: the compute service answers repeated texts from its
//! cache, and `finish` only ever applies the first outcome.

use super::service::IntakeService;
use crate::store::RequestId;

use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub resubmitted: usize,
    pub failed: usize,
}

pub struct Reconciler {
    service: Arc<IntakeService>,
    after: Duration,
    interval: Duration,
    max_attempts: u32,
    attempts: DashMap<RequestId, u32>,
}

impl Reconciler {
    pub fn new(
        service: Arc<IntakeService>,
        after: Duration,
        interval: Duration,
        max_attempts: u32,
    ) -> Arc<Self> {
        Arc::new(Self {
            service,
            after,
            interval,
            max_attempts,
            attempts: DashMap::new(),
        })
    }

    /// Runs `sweep` every `interval` until the task is aborted.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let reconciler = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(reconciler.interval);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                let summary = reconciler.sweep().await;
                if summary != SweepSummary::default() {
                    tracing::info!(
                        "Reconciliation: {} resubmitted, {} failed",
                        summary.resubmitted,
                        summary.failed
                    );
                }
            }
        })
    }

    pub async fn sweep(&self) -> SweepSummary {
        let stale = self.service.stale_requests(self.after).await;
        let mut summary = SweepSummary::default();

        // Forget requests that finished since the last sweep
        let stale_ids: HashSet<RequestId> = stale.iter().map(|r| r.id).collect();
        self.attempts.retain(|id, _| stale_ids.contains(id));

        for request in stale {
            let attempts = self.attempts.get(&request.id).map(|a| *a).unwrap_or(0);

            if attempts >= self.max_attempts {
                tracing::warn!(
                    "Request {} still in process after {} resubmissions, failing it",
                    request.id,
                    attempts
                );
                self.service.mark_failed(&request.id).await;
                self.attempts.remove(&request.id);
                summary.failed += 1;
                continue;
            }

            self.attempts.insert(request.id, attempts + 1);

            match self.service.resubmit(&request).await {
                Ok(()) => {
                    tracing::debug!("Resubmitted stale request {}", request.id);
                    summary.resubmitted += 1;
                }
                Err(e) => tracing::warn!("Resubmitting request {} failed: {}", request.id, e),
            }
        }

        summary
    }

    /// Resubmissions made so far for a request that is still pending.
    pub fn attempts_for(&self, id: &RequestId) -> u32 {
        self.attempts.get(id).map(|a| *a).unwrap_or(0)
    }
}
