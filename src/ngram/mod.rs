//! N-gram extraction and frequency counting.
//!
//! An n-gram is a contiguous run of exactly `n` tokens. Counting slides a
//! window of width `n` over the token stream with stride 1, so a stream of
//! `len` tokens yields `len - n + 1` n-grams (or none when `n > len`).
//!
//! ```text
//! tokens  = [open, read, read, write, close], n = 2
//! n-grams = (open,read) (read,read) (read,write) (write,close)
//! ```
//!
//! The frequency map is unordered; anything that needs a reproducible order
//! goes through [`top_k`], which sorts by count descending and then by the
//! n-gram's own ordering.

use std::collections::hash_map::{self, HashMap};
use std::fmt;

use smallvec::SmallVec;

use crate::config::validate_n;
use crate::error::Result;

pub mod topk;

pub use topk::top_k;

/// One discrete event, e.g. a syscall name.
pub type Token = String;

/// An ordered, fixed-length sequence of tokens.
///
/// Equality, hashing and ordering are element-wise and order-sensitive.
/// Ordering is lexicographic over the tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NGram(SmallVec<[Token; 4]>);

impl NGram {
    /// Build an n-gram from its tokens.
    pub fn new<S: AsRef<str>>(tokens: &[S]) -> Self {
        Self(tokens.iter().map(|t| t.as_ref().to_owned()).collect())
    }

    /// Tokens in order.
    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    /// Number of tokens (the `n` of the n-gram).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the zero-length n-gram.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> From<&[S]> for NGram {
    fn from(tokens: &[S]) -> Self {
        Self::new(tokens)
    }
}

impl fmt::Display for NGram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(token)?;
        }
        f.write_str(")")
    }
}

/// Occurrence count of every distinct n-gram in a token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NGramFrequency {
    counts: HashMap<NGram, usize>,
}

impl NGramFrequency {
    /// Number of distinct n-grams.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when the stream was shorter than `n`.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts (number of windows in the stream).
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Count for an n-gram given as a token slice; 0 when absent.
    pub fn count<S: AsRef<str>>(&self, tokens: &[S]) -> usize {
        self.get(&NGram::new(tokens))
    }

    /// Count for an n-gram; 0 when absent.
    pub fn get(&self, ngram: &NGram) -> usize {
        self.counts.get(ngram).copied().unwrap_or(0)
    }

    /// Iterate `(n-gram, count)` pairs in unspecified order.
    pub fn iter(&self) -> hash_map::Iter<'_, NGram, usize> {
        self.counts.iter()
    }

    /// Iterate the distinct n-grams in unspecified order.
    pub fn ngrams(&self) -> hash_map::Keys<'_, NGram, usize> {
        self.counts.keys()
    }
}

impl<'a> IntoIterator for &'a NGramFrequency {
    type Item = (&'a NGram, &'a usize);
    type IntoIter = hash_map::Iter<'a, NGram, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}

/// Count every n-gram of width `n` in `tokens`.
///
/// Returns an empty map when `n > tokens.len()`.
///
/// # Errors
///
/// [`FingerprintError::InvalidConfiguration`](crate::FingerprintError::InvalidConfiguration)
/// if `n == 0`.
pub fn build_ngrams<S: AsRef<str>>(tokens: &[S], n: usize) -> Result<NGramFrequency> {
    validate_n(n)?;

    // Count borrowed windows; owned n-grams are built once per distinct window.
    let mut borrowed: HashMap<SmallVec<[&str; 4]>, usize> = HashMap::new();
    for window in tokens.windows(n) {
        let key: SmallVec<[&str; 4]> = window.iter().map(|t| t.as_ref()).collect();
        *borrowed.entry(key).or_insert(0) += 1;
    }

    let counts: HashMap<NGram, usize> = borrowed
        .into_iter()
        .map(|(window, count)| (NGram::new(window.as_slice()), count))
        .collect();

    tracing::trace!(
        tokens = tokens.len(),
        n,
        distinct = counts.len(),
        total = tokens.len().saturating_sub(n - 1),
        "counted n-grams"
    );

    Ok(NGramFrequency { counts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FingerprintError;

    #[test]
    fn bigrams_of_syscall_stream() {
        let tokens = ["open", "read", "read", "write", "close"];
        let freq = build_ngrams(&tokens, 2).unwrap();

        assert_eq!(freq.len(), 4);
        assert_eq!(freq.count(&["open", "read"]), 1);
        assert_eq!(freq.count(&["read", "read"]), 1);
        assert_eq!(freq.count(&["read", "write"]), 1);
        assert_eq!(freq.count(&["write", "close"]), 1);
        assert_eq!(freq.count(&["read", "open"]), 0);
        assert_eq!(freq.total(), tokens.len() - 2 + 1);
    }

    #[test]
    fn repeated_windows_accumulate() {
        let tokens = ["a", "b", "a", "b", "a"];
        let freq = build_ngrams(&tokens, 2).unwrap();

        assert_eq!(freq.count(&["a", "b"]), 2);
        assert_eq!(freq.count(&["b", "a"]), 2);
        assert_eq!(freq.total(), 4);
    }

    #[test]
    fn n_longer_than_stream_is_empty() {
        let freq = build_ngrams(&["a", "b"], 3).unwrap();
        assert!(freq.is_empty());
        assert_eq!(freq.total(), 0);

        let empty: [&str; 0] = [];
        assert!(build_ngrams(&empty, 1).unwrap().is_empty());
    }

    #[test]
    fn n_equal_to_stream_is_one_window() {
        let freq = build_ngrams(&["a", "b", "c"], 3).unwrap();
        assert_eq!(freq.len(), 1);
        assert_eq!(freq.count(&["a", "b", "c"]), 1);
    }

    #[test]
    fn repeated_windows_share_one_entry() {
        let tokens: Vec<String> = std::iter::repeat(["read", "write"])
            .take(1_000)
            .flatten()
            .map(String::from)
            .collect();
        let freq = build_ngrams(&tokens, 2).unwrap();

        assert_eq!(freq.len(), 2);
        assert_eq!(freq.count(&["read", "write"]), 1_000);
        assert_eq!(freq.count(&["write", "read"]), 999);
        assert_eq!(freq.total(), tokens.len() - 1);
    }

    #[test]
    fn wide_ngrams_spill_past_inline_capacity() {
        let tokens = ["a", "b", "c", "d", "e", "f", "a", "b", "c", "d", "e", "f"];
        let freq = build_ngrams(&tokens, 6).unwrap();

        assert_eq!(freq.total(), 7);
        assert_eq!(freq.count(&["a", "b", "c", "d", "e", "f"]), 2);
        assert_eq!(freq.count(&["f", "a", "b", "c", "d", "e"]), 1);
    }

    #[test]
    fn zero_n_is_rejected() {
        assert!(matches!(
            build_ngrams(&["a"], 0),
            Err(FingerprintError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn ngram_order_is_lexicographic_and_order_sensitive() {
        let ab = NGram::new(&["a", "b"]);
        let ba = NGram::new(&["b", "a"]);
        let aa = NGram::new(&["a", "a"]);

        assert_ne!(ab, ba);
        assert!(aa < ab);
        assert!(ab < ba);
        assert_eq!(ab.to_string(), "(a, b)");
    }
}
