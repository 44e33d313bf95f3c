//! Bag-of-words text similarity.
//!
//! The score is a containment overlap, not an edit distance or a cosine
//! measure: it tolerates word reordering and partial phrase overlap, and is
//! blind to token order and to synonyms.
//!
//! # Algorithm
//!
//! 1. Lower-case both texts and split on runs of whitespace.
//! 2. If either side has no tokens, the score is `0`.
//! 3. Count the tokens of the first text that appear anywhere in the
//!    second. Repeated tokens are counted once per occurrence.
//! 4. Divide by the larger token count and scale to a percentage.
//!
//! # Example
//!
//! ```rust
//! use lostfound_core::similarity::{similarity, similarity_percent};
//!
//! assert_eq!(similarity("red ball", "ball"), 50.0);
//! assert_eq!(similarity_percent("red ball", "red ball lost"), 67);
//! ```

/// Split text into lower-cased, whitespace-delimited tokens.
///
/// Never yields empty tokens; blank input produces an empty list.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(|w| w.to_lowercase()).collect()
}

/// Similarity of `text1` against `text2` as a percentage in `[0.0, 100.0]`.
///
/// Asymmetric in general: only tokens of `text1` are looked up in `text2`.
pub fn similarity(text1: &str, text2: &str) -> f64 {
    let a = tokenize(text1);
    let b = tokenize(text2);

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let matches = a.iter().filter(|word| b.contains(word)).count();
    matches as f64 / a.len().max(b.len()) as f64 * 100.0
}

/// [`similarity`] rounded to the nearest whole percentage.
pub fn similarity_percent(text1: &str, text2: &str) -> u8 {
    round_percent(similarity(text1, text2))
}

pub(crate) fn round_percent(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}
