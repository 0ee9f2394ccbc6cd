//! Request Store Module
//!
//! Owns the canonical lifecycle state of every analysis request on the intake side.
//!
//! ## Core Concepts
//! - **Source of truth**: The store is authoritative. The intake status cache is a
//!   disposable copy layered on top of it.
//! - **Lifecycle**: `InProcess` is the only initial state; `Success` and `Failed`
//!   are terminal.
//! - **Capability**: Callers hold an `Arc<dyn RequestStore>`, so a durable backend
//!   can replace `MemoryRequestStore` without touching handlers.
//!
//! ## Submodules
//! - **`types`**: `Request`, `RequestId`, `RequestStatus`.
//! - **`memory`**: Concurrent in-memory implementation backed by `DashMap`.

pub mod memory;
pub mod types;

pub use memory::MemoryRequestStore;
pub use types::{Finish, Request, RequestId, RequestStatus};

use crate::analysis::AnalysisResult;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("empty text")]
    EmptyInput,

    #[error("request {0} not found")]
    NotFound(RequestId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage capability for analysis requests.
///
/// All methods must be safe to call concurrently; operations on the same id are
/// serialized by the implementation.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Allocates a fresh id and stores the text as an `InProcess` request.
    async fn create(&self, text: &str) -> StoreResult<Request>;

    /// Overwrites status and result unconditionally.
    ///
    /// A result is only kept when `status` is `Success`.
    async fn update(
        &self,
        id: &RequestId,
        status: RequestStatus,
        result: Option<AnalysisResult>,
    ) -> StoreResult<Request>;

    async fn get(&self, id: &RequestId) -> StoreResult<Request>;

    /// Moves an `InProcess` request to a terminal status.
    ///
    /// Requests that are already terminal are left untouched and returned as
    /// `Finish::AlreadyTerminal`.
    async fn finish(
        &self,
        id: &RequestId,
        status: RequestStatus,
        result: Option<AnalysisResult>,
    ) -> StoreResult<Finish>;

    /// Requests still `InProcess` that were created before `cutoff_ms`.
    async fn in_process_older_than(&self, cutoff_ms: u64) -> Vec<Request>;
}
