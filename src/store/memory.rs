//! In-memory Request Store
//!
//! Requests live in a `DashMap`, whose shard locks give per-id mutual exclusion:
//! an update holds the entry's write guard for the whole read-modify-write.

use super::types::{Finish, Request, RequestId, RequestStatus, now_ms};
use super::{RequestStore, StoreError, StoreResult};
use crate::analysis::AnalysisResult;

use async_trait::async_trait;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryRequestStore {
    requests: DashMap<RequestId, Request>,
}

impl MemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[async_trait]
impl RequestStore for MemoryRequestStore {
    async fn create(&self, text: &str) -> StoreResult<Request> {
        if text.is_empty() {
            return Err(StoreError::EmptyInput);
        }

        let request = Request {
            id: RequestId::new(),
            text: text.to_string(),
            status: RequestStatus::InProcess,
            result: None,
            created_at: now_ms(),
        };
        self.requests.insert(request.id, request.clone());

        tracing::debug!("Stored request {}", request.id);
        Ok(request)
    }

    async fn update(
        &self,
        id: &RequestId,
        status: RequestStatus,
        result: Option<AnalysisResult>,
    ) -> StoreResult<Request> {
        let mut entry = self
            .requests
            .get_mut(id)
            .ok_or(StoreError::NotFound(*id))?;

        entry.apply(status, result);
        Ok(entry.clone())
    }

    async fn get(&self, id: &RequestId) -> StoreResult<Request> {
        self.requests
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound(*id))
    }

    async fn finish(
        &self,
        id: &RequestId,
        status: RequestStatus,
        result: Option<AnalysisResult>,
    ) -> StoreResult<Finish> {
        let mut entry = self
            .requests
            .get_mut(id)
            .ok_or(StoreError::NotFound(*id))?;

        if entry.status.is_terminal() {
            return Ok(Finish::AlreadyTerminal(entry.clone()));
        }

        entry.apply(status, result);
        Ok(Finish::Applied(entry.clone()))
    }

    async fn in_process_older_than(&self, cutoff_ms: u64) -> Vec<Request> {
        self.requests
            .iter()
            .filter(|entry| {
                entry.status == RequestStatus::InProcess && entry.created_at < cutoff_ms
            })
            .map(|entry| entry.value().clone())
            .collect()
    }
}
