//! Bounded Work Queue
//!
//! A tokio `mpsc` channel whose receiver is shared behind a mutex, giving
//! multi-producer/multi-consumer semantics with a hard capacity.
//!
//! ## Responsibilities
//! - **Admission control**: `enqueue` waits at most `admission_timeout` for a free slot.
//! - **Distribution**: each job is handed to exactly one `dequeue` caller.
//! - **Closing**: `close` refuses new jobs; consumers drain what is left and then
//!   see `None`.
//! - **Observability**: depth and a running total of admitted jobs.

use super::types::Job;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::sync::mpsc::error::SendTimeoutError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("queue did not accept the job within {0:?}")]
    Overloaded(Duration),

    #[error("queue is closed")]
    Closed,
}

pub struct WorkQueue {
    /// `None` once closed. The channel closes when the last clone is dropped.
    sender: RwLock<Option<mpsc::Sender<Job>>>,
    /// Observes the channel without keeping it open.
    weak_sender: mpsc::WeakSender<Job>,
    receiver: Mutex<mpsc::Receiver<Job>>,
    capacity: usize,
    admission_timeout: Duration,
    enqueued_total: AtomicU64,
}

impl WorkQueue {
    /// Creates a queue holding at most `capacity` jobs.
    ///
    /// # Panics
    /// Panics if `capacity` is zero; configuration loading rejects that value.
    pub fn new(capacity: usize, admission_timeout: Duration) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            weak_sender: sender.downgrade(),
            sender: RwLock::new(Some(sender)),
            receiver: Mutex::new(receiver),
            capacity,
            admission_timeout,
            enqueued_total: AtomicU64::new(0),
        }
    }

    /// Admits a job, waiting up to the admission timeout for room.
    pub async fn enqueue(&self, job: Job) -> Result<(), QueueError> {
        let request_id = job.request_id;

        let Some(sender) = self.sender.read().await.clone() else {
            return Err(QueueError::Closed);
        };

        match sender.send_timeout(job, self.admission_timeout).await {
            Ok(()) => {
                self.enqueued_total.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    "Enqueued job for request {} (depth {}/{})",
                    request_id,
                    self.depth(),
                    self.capacity
                );
                Ok(())
            }
            Err(SendTimeoutError::Timeout(_)) => {
                tracing::warn!(
                    "Queue full, rejected job for request {} after {:?}",
                    request_id,
                    self.admission_timeout
                );
                Err(QueueError::Overloaded(self.admission_timeout))
            }
            Err(SendTimeoutError::Closed(_)) => Err(QueueError::Closed),
        }
    }

    /// Waits for the next job.
    ///
    /// Waiting consumers queue up on the receiver lock, so every job goes to
    /// exactly one of them. Returns `None` only once the channel is closed.
    pub async fn dequeue(&self) -> Option<Job> {
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await
    }

    /// Stops admitting jobs. Jobs already queued can still be dequeued.
    pub async fn close(&self) {
        if self.sender.write().await.take().is_some() {
            tracing::info!("Work queue closed");
        }
    }

    /// Jobs currently waiting. Reads 0 once the queue is closed.
    pub fn depth(&self) -> usize {
        match self.weak_sender.upgrade() {
            Some(sender) => self.capacity - sender.capacity(),
            None => 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn admission_timeout(&self) -> Duration {
        self.admission_timeout
    }

    /// Jobs admitted since the queue was created.
    pub fn enqueued_total(&self) -> u64 {
        self.enqueued_total.load(Ordering::Relaxed)
    }
}
