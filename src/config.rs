//! Fingerprint configuration.
//!
//! The three knobs of the pipeline travel together as a small value that is
//! passed explicitly to every stage:
//!
//! - `n`: n-gram width (tokens per n-gram), must be >= 1
//! - `bits`: fingerprint width, must be >= 1 (a power of two is recommended)
//! - `k`: top-K cutoff; `0` keeps every distinct n-gram

use serde::{Deserialize, Serialize};

use crate::error::{FingerprintError, Result};

/// Parameters for turning a token stream into a fingerprint.
///
/// Deserialization validates, so an out-of-range `n` or `bits` is rejected
/// where the configuration is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct FingerprintConfig {
    /// N-gram width.
    pub n: usize,
    /// Fingerprint width in bits.
    pub bits: usize,
    /// Number of most frequent n-grams to keep (0 = all).
    pub k: usize,
}

/// Unchecked wire form of [`FingerprintConfig`].
#[derive(Deserialize)]
struct RawConfig {
    n: usize,
    bits: usize,
    #[serde(default)]
    k: usize,
}

impl TryFrom<RawConfig> for FingerprintConfig {
    type Error = FingerprintError;

    fn try_from(raw: RawConfig) -> Result<Self> {
        Self::new(raw.n, raw.bits, raw.k)
    }
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            n: 3,
            bits: 256,
            k: 0,
        }
    }
}

impl FingerprintConfig {
    /// Create a validated configuration.
    pub fn new(n: usize, bits: usize, k: usize) -> Result<Self> {
        let config = Self { n, bits, k };
        config.validate()?;
        Ok(config)
    }

    /// Check that every parameter is in range.
    ///
    /// Useful for configurations built by hand or deserialized.
    pub fn validate(&self) -> Result<()> {
        validate_n(self.n)?;
        validate_bits(self.bits)?;
        if !self.bits.is_power_of_two() {
            tracing::debug!(bits = self.bits, "fingerprint width is not a power of two");
        }
        Ok(())
    }

    /// Replace the n-gram width.
    #[must_use]
    pub fn with_n(self, n: usize) -> Self {
        Self { n, ..self }
    }

    /// Replace the fingerprint width.
    #[must_use]
    pub fn with_bits(self, bits: usize) -> Self {
        Self { bits, ..self }
    }

    /// Replace the top-K cutoff.
    #[must_use]
    pub fn with_k(self, k: usize) -> Self {
        Self { k, ..self }
    }

    /// The top-K cutoff, or `None` when every n-gram is used.
    pub fn selection(&self) -> Option<usize> {
        (self.k > 0).then_some(self.k)
    }
}

pub(crate) fn validate_n(n: usize) -> Result<()> {
    if n == 0 {
        return Err(FingerprintError::invalid_config("n must be at least 1"));
    }
    Ok(())
}

pub(crate) fn validate_bits(bits: usize) -> Result<()> {
    if bits == 0 {
        return Err(FingerprintError::invalid_config("bits must be at least 1"));
    }
    Ok(())
}
