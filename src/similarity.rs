//! Similarity between fingerprints.
//!
//! Two complementary scores, both in `[0, 1]` with 1 meaning identical:
//!
//! | Metric | Formula | Sensitive to |
//! |--------|---------|--------------|
//! | Jaccard | `|A ∧ B| / |A ∨ B|` | overlap of set bits only |
//! | Hamming | `1 - popcount(A ⊕ B) / bits` | every position, including shared zeros |
//!
//! Jaccard ignores positions where both fingerprints are 0, so it stays
//! informative for sparse fingerprints (few n-grams in a wide vector), where
//! Hamming similarity is dominated by the shared zeros.
//!
//! Both operate word-at-a-time (AND/OR/XOR + popcount). Fingerprints keep
//! their unused tail bits at zero, so no masking is needed here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FingerprintError, Result};
use crate::fingerprint::Fingerprint;

fn check_shape(a: &Fingerprint, b: &Fingerprint) -> Result<()> {
    if a.bits() != b.bits() {
        return Err(FingerprintError::ShapeMismatch {
            left: a.bits(),
            right: b.bits(),
        });
    }
    Ok(())
}

fn popcount_with(a: &Fingerprint, b: &Fingerprint, op: impl Fn(u64, u64) -> u64) -> usize {
    a.words()
        .iter()
        .zip(b.words())
        .map(|(&x, &y)| op(x, y).count_ones() as usize)
        .sum()
}

fn jaccard_unchecked(a: &Fingerprint, b: &Fingerprint) -> f64 {
    let union = popcount_with(a, b, |x, y| x | y);
    if union == 0 {
        return 0.0;
    }
    let intersection = popcount_with(a, b, |x, y| x & y);
    intersection as f64 / union as f64
}

fn hamming_unchecked(a: &Fingerprint, b: &Fingerprint) -> f64 {
    // bits > 0 for every constructed fingerprint
    1.0 - popcount_with(a, b, |x, y| x ^ y) as f64 / a.bits() as f64
}

/// Jaccard similarity of the set bits.
///
/// Two all-zero fingerprints score `0.0`.
///
/// # Errors
///
/// `ShapeMismatch` if the widths differ.
pub fn jaccard_similarity(a: &Fingerprint, b: &Fingerprint) -> Result<f64> {
    check_shape(a, b)?;
    Ok(jaccard_unchecked(a, b))
}

/// Hamming similarity: fraction of positions where the fingerprints agree.
///
/// # Errors
///
/// `ShapeMismatch` if the widths differ.
pub fn hamming_similarity(a: &Fingerprint, b: &Fingerprint) -> Result<f64> {
    check_shape(a, b)?;
    Ok(hamming_unchecked(a, b))
}

/// Number of positions where the fingerprints differ.
///
/// # Errors
///
/// `ShapeMismatch` if the widths differ.
pub fn hamming_distance(a: &Fingerprint, b: &Fingerprint) -> Result<usize> {
    check_shape(a, b)?;
    Ok(popcount_with(a, b, |x, y| x ^ y))
}

/// Both scores for one pair of fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    /// Jaccard similarity of set bits.
    pub jaccard: f64,
    /// Hamming similarity over all bits.
    pub hamming: f64,
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "jaccard={:.4} hamming={:.4}", self.jaccard, self.hamming)
    }
}

/// Compute Jaccard and Hamming similarity after a single shape check.
pub fn compare(a: &Fingerprint, b: &Fingerprint) -> Result<Similarity> {
    check_shape(a, b)?;
    Ok(Similarity {
        jaccard: jaccard_unchecked(a, b),
        hamming: hamming_unchecked(a, b),
    })
}

/// Similarity metric selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    /// [`jaccard_similarity`].
    Jaccard,
    /// [`hamming_similarity`].
    Hamming,
}

impl SimilarityMetric {
    /// Score a pair of fingerprints with this metric.
    pub fn score(self, a: &Fingerprint, b: &Fingerprint) -> Result<f64> {
        match self {
            SimilarityMetric::Jaccard => jaccard_similarity(a, b),
            SimilarityMetric::Hamming => hamming_similarity(a, b),
        }
    }
}

impl FromStr for SimilarityMetric {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jaccard" => Ok(Self::Jaccard),
            "hamming" => Ok(Self::Hamming),
            other => Err(FingerprintError::invalid_config(format!(
                "unknown similarity metric {other:?}"
            ))),
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SimilarityMetric::Jaccard => "jaccard",
            SimilarityMetric::Hamming => "hamming",
        })
    }
}
