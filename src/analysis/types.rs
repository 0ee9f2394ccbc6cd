use serde::{Deserialize, Serialize};

/// Statistics computed for a single input text.
///
/// Zero-valued fields are omitted from the wire and default back to zero when
/// absent, so `{}` is the encoding of an empty analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "is_zero_count")]
    pub word_count: usize,
    #[serde(default, skip_serializing_if = "is_zero_count")]
    pub char_count: usize,
    #[serde(default, skip_serializing_if = "is_zero_count")]
    pub sentence_count: usize,
    #[serde(default, skip_serializing_if = "is_zero_length")]
    pub average_word_length: f64,
}

impl AnalysisResult {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn is_zero_count(value: &usize) -> bool {
    *value == 0
}

fn is_zero_length(value: &f64) -> bool {
    *value == 0.0
}
