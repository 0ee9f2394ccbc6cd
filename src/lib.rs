//! Text Analysis Service Library
//!
//! Two cooperating HTTP services that compute word, character and sentence
//! statistics for submitted texts. The binary (`main.rs`) runs one of them per
//! process.
//!
//! ## Architecture Modules
//! - **`intake`**: The client-facing service. Owns request lifecycle state, answers
//!   status queries through a short-lived cache, and applies reported outcomes.
//! - **`compute`**: The analysis service. Admits jobs into a bounded queue, runs them
//!   on a fixed worker pool, and memoizes results by text content.
//! - **`dispatch`**: The Submit and Report HTTP exchanges between the two services.
//! - **`executor`**: The bounded work queue and worker pool.
//! - **`store`**: The Request Store capability and its in-memory implementation.
//! - **`cache`**: Best-effort TTL caching over Redis or process memory.
//! - **`analysis`**: The pure text statistics function.
//! - **`config`** / **`error`**: Environment configuration and the HTTP error taxonomy.

pub mod analysis;
pub mod cache;
pub mod compute;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod intake;
pub mod store;
