//! Bounded Work Queue and Worker Pool
//!
//! The compute service's admission-controlled concurrency unit.
//!
//! ## Architecture Overview
//! 1. **Admission**: HTTP handlers `enqueue` jobs into a fixed-capacity `WorkQueue`.
//!    A full queue makes the producer wait up to the admission timeout, after which
//!    the job is refused with `QueueError::Overloaded`. This is the only backpressure
//!    signal in the system.
//! 2. **Execution**: A fixed number of workers share the receiving end of the queue.
//!    Each worker loops forever: dequeue, run the job handler, repeat.
//! 3. **Loss on exit**: Nothing is persisted. Jobs still queued or running when the
//!    process stops are abandoned.
//!
//! ## Submodules
//! - **`types`**: The `Job` unit of work.
//! - **`queue`**: The bounded multi-producer/multi-consumer queue.
//! - **`executor`**: The worker pool and its job handler type.

pub mod executor;
pub mod queue;
pub mod types;

pub use executor::{JobHandlerFn, WorkerPool};
pub use queue::{QueueError, WorkQueue};
pub use types::Job;
