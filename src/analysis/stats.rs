use super::types::AnalysisResult;

use regex::Regex;
use std::sync::LazyLock;

static SENTENCE_TERMINATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence terminator pattern is valid"));

/// Computes word, character and sentence statistics for `text`.
///
/// - `char_count` is the byte length of the raw input.
/// - `word_count` is the number of whitespace-delimited tokens.
/// - `sentence_count` is the number of non-blank segments left after splitting
///   on runs of `.`, `!` and `?`.
/// - `average_word_length` divides the summed length of every token, stripped of
///   leading/trailing non-alphanumeric characters, by `word_count`.
pub fn analyze_text(text: &str) -> AnalysisResult {
    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len();

    let sentence_count = SENTENCE_TERMINATORS
        .split(text)
        .filter(|segment| !segment.trim().is_empty())
        .count();

    let letters: usize = words
        .iter()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).len())
        .sum();

    let average_word_length = if word_count > 0 {
        letters as f64 / word_count as f64
    } else {
        0.0
    };

    AnalysisResult {
        word_count,
        char_count: text.len(),
        sentence_count,
        average_word_length,
    }
}
