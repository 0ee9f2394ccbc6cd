//! Dispatch Protocol Module
//!
//! The two one-way HTTP exchanges that connect the services, correlated only by the
//! request id carried in each payload:
//!
//! 1. **Submit** (intake -> compute): `POST /api/v1/analyze {id, text}`. A single
//!    attempt; any failure marks the request `Failed` on the intake side.
//! 2. **Report** (compute -> intake): `POST /api/v1/result {id, status, analyze}`.
//!    Retried with exponential backoff on transport errors and 5xx responses.
//!
//! ## Submodules
//! - **`protocol`**: Endpoint constants and the JSON DTOs of both services.
//! - **`client`**: `ComputeClient` (submit) and `IntakeClient` (report).

pub mod client;
pub mod protocol;

pub use client::{ComputeClient, DispatchError, IntakeClient, PeerClient};
