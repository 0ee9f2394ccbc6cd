use crate::store::RequestId;
use serde::{Deserialize, Serialize};

/// A unit of work waiting in, or taken from, the `WorkQueue`.
///
/// Jobs exist only between enqueue and the end of their handler run; ownership
/// moves to whichever worker dequeues them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// The intake request this job reports back to.
    pub request_id: RequestId,
    pub text: String,
}

impl Job {
    pub fn new(request_id: RequestId, text: impl Into<String>) -> Self {
        Self {
            request_id,
            text: text.into(),
        }
    }
}
