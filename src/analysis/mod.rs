//! Text Analysis Module
//!
//! The pure computation at the heart of the compute service.
//!
//! ## Overview
//! `analyze_text` turns an input string into an `AnalysisResult`: word, character
//! and sentence counts plus the average word length. The function is total over
//! every string (the empty string yields all zeros) and deterministic, which is
//! what makes the content-addressed result cache safe.
//!
//! ## Submodules
//! - **`stats`**: The counting logic.
//! - **`types`**: The `AnalysisResult` wire type shared by both services.

pub mod stats;
pub mod types;

pub use stats::analyze_text;
pub use types::AnalysisResult;
