//! Worker Pool Implementation
//!
//! Spawns a fixed number of workers that drain the `WorkQueue`.
//!
//! ## Responsibilities
//! - **Polling**: each worker blocks on `dequeue` until a job is available.
//! - **Execution**: the job is passed to the pool's handler; the worker does not
//!   take another job until the handler returns.
//! - **Shutdown**: the queue is closed so idle workers exit, then busy workers are
//!   aborted, abandoning whatever they hold.

use super::queue::WorkQueue;
use super::types::Job;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Type-erased asynchronous job handler shared by all workers.
pub type JobHandlerFn = Arc<dyn Fn(Job) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct WorkerPool {
    queue: Arc<WorkQueue>,
    handler: JobHandlerFn,
    worker_count: usize,
    processed_total: AtomicU64,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Creates a pool; no worker runs until `start` is called.
    pub fn new<F, Fut>(queue: Arc<WorkQueue>, worker_count: usize, handler: F) -> Arc<Self>
    where
        F: Fn(Job) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        // Box the handler's future so one pool can hold any async fn
        let handler: JobHandlerFn =
            Arc::new(move |job: Job| Box::pin(handler(job)) as Pin<Box<dyn Future<Output = ()> + Send>>);

        Arc::new(Self {
            queue,
            handler,
            worker_count,
            processed_total: AtomicU64::new(0),
            workers: Mutex::new(Vec::new()),
        })
    }

    /// Spawns the workers and returns immediately.
    pub async fn start(self: &Arc<Self>) {
        let mut workers = self.workers.lock().await;

        for worker_id in 0..self.worker_count {
            let pool = self.clone();
            workers.push(tokio::spawn(async move {
                pool.worker_loop(worker_id).await;
            }));
        }

        tracing::info!("Worker pool started with {} workers", self.worker_count);
    }

    async fn worker_loop(&self, worker_id: usize) {
        tracing::debug!("Worker {} started", worker_id);

        while let Some(job) = self.queue.dequeue().await {
            tracing::debug!("Worker {} picked up request {}", worker_id, job.request_id);

            (self.handler)(job).await;
            self.processed_total.fetch_add(1, Ordering::Relaxed);
        }

        tracing::debug!("Worker {} stopped: queue closed", worker_id);
    }

    /// Closes the queue and aborts every worker. Queued and in-flight jobs are
    /// dropped; returns how many queued jobs were abandoned.
    pub async fn shutdown(&self) -> usize {
        let abandoned = self.queue.depth();
        self.queue.close().await;

        let mut workers = self.workers.lock().await;
        for handle in workers.drain(..) {
            handle.abort();
        }

        if abandoned > 0 {
            tracing::warn!("Worker pool stopped with {} queued jobs abandoned", abandoned);
        } else {
            tracing::info!("Worker pool stopped");
        }
        abandoned
    }

    /// Workers whose loop has not returned yet.
    pub async fn running_workers(&self) -> usize {
        let workers = self.workers.lock().await;
        workers.iter().filter(|handle| !handle.is_finished()).count()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Jobs whose handler has returned.
    pub fn processed_total(&self) -> u64 {
        self.processed_total.load(Ordering::Relaxed)
    }
}
