//! Cache key derivation.
//!
//! Both keyspaces are prefixed with their namespace so they can share one backend.
//! The compute keyspace hashes text with 32-bit FNV-1a, which is stable across
//! processes and releases (unlike `DefaultHasher`), so entries written by one
//! compute process are readable by the next.

use crate::store::RequestId;

pub const ANALYSIS_NAMESPACE: &str = "analyze";
pub const REQUEST_NAMESPACE: &str = "receiver";

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Key suffix for a text in the compute keyspace.
pub fn text_key(text: &str) -> String {
    fnv1a_32(text.as_bytes()).to_string()
}

/// Key suffix for a request in the intake keyspace.
pub fn request_key(id: &RequestId) -> String {
    id.to_string()
}

pub fn namespaced(namespace: &str, key: &str) -> String {
    format!("{}:{}", namespace, key)
}
