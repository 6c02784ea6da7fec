//! Top-K selection over n-gram frequencies.
//!
//! Order is total: count descending, then n-gram ascending. Ties never
//! depend on hash-map iteration order, so two runs over the same stream pick
//! the same K n-grams.

use std::cmp::Ordering;

use super::{NGram, NGramFrequency};

/// The `k` most frequent n-grams with their counts.
///
/// Returns `min(k, freq.len())` entries sorted by `(count desc, ngram asc)`.
/// `k == 0` returns an empty vector.
pub fn top_k(freq: &NGramFrequency, k: usize) -> Vec<(NGram, usize)> {
    if k == 0 || freq.is_empty() {
        return Vec::new();
    }

    let mut entries: Vec<(&NGram, usize)> = freq.iter().map(|(g, &c)| (g, c)).collect();

    // Partition the first k before sorting them; the rest is never ordered.
    if k < entries.len() {
        entries.select_nth_unstable_by(k - 1, rank);
        entries.truncate(k);
    }
    entries.sort_unstable_by(rank);

    tracing::trace!(requested = k, returned = entries.len(), "selected top-k n-grams");

    entries
        .into_iter()
        .map(|(ngram, count)| (ngram.clone(), count))
        .collect()
}

fn rank(a: &(&NGram, usize), b: &(&NGram, usize)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
}
