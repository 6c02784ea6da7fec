//! Stable hashing of n-grams to bit indices.
//!
//! Fingerprints are only comparable if every process maps the same n-gram to
//! the same bit. `std`'s `DefaultHasher` is explicitly unstable across
//! releases and `RandomState` is seeded per process, so neither can be used
//! here. Instead:
//!
//! 1. The n-gram is serialized to a canonical key: tokens joined with
//!    [`KEY_SEPARATOR`] (`","`). Syscall names never contain a comma, so
//!    the mapping is injective for real traces.
//! 2. The key's UTF-8 bytes are hashed with unkeyed BLAKE2b, 8-byte digest.
//! 3. The digest is read as a big-endian `u64` and reduced modulo `bits`.
//!
//! ```text
//! ("open", "read") -> "open,read" -> blake2b-64 0x39cc0ec94c40e8a0 -> % 64 = 32
//! ```
//!
//! Collisions in the reduced index space are expected; they are what makes
//! the fingerprint a lossy summary.

use std::fmt;

use blake2::digest::consts::U8;
use blake2::{Blake2b, Digest};

use crate::config::validate_bits;
use crate::error::Result;
use crate::ngram::NGram;

type Blake2b64 = Blake2b<U8>;

/// Separator placed between tokens when serializing an n-gram.
pub const KEY_SEPARATOR: char = ',';

/// Canonical string form of an n-gram, the input to [`stable_hash`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NGramKey(String);

impl NGramKey {
    /// Serialize an n-gram.
    pub fn new(ngram: &NGram) -> Self {
        let tokens = ngram.tokens();
        let mut key = String::with_capacity(
            tokens.iter().map(String::len).sum::<usize>() + tokens.len().saturating_sub(1),
        );
        for (i, token) in tokens.iter().enumerate() {
            if i > 0 {
                key.push(KEY_SEPARATOR);
            }
            key.push_str(token);
        }
        Self(key)
    }

    /// The serialized key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bit index of this key in a fingerprint of width `bits`.
    pub fn index(&self, bits: usize) -> Result<usize> {
        stable_hash(&self.0, bits)
    }
}

impl From<&NGram> for NGramKey {
    fn from(ngram: &NGram) -> Self {
        Self::new(ngram)
    }
}

impl fmt::Display for NGramKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl NGram {
    /// Canonical serialized form used for hashing.
    pub fn key(&self) -> NGramKey {
        NGramKey::new(self)
    }
}

/// 64-bit BLAKE2b digest of `key`, as a big-endian unsigned integer.
pub fn stable_hash64(key: &str) -> u64 {
    let digest = Blake2b64::digest(key.as_bytes());
    let mut word = [0u8; 8];
    word.copy_from_slice(&digest);
    u64::from_be_bytes(word)
}

/// Map `key` to an index in `[0, bits)`.
///
/// Pure: the same `(key, bits)` pair gives the same index in every process
/// on every platform.
///
/// # Errors
///
/// [`FingerprintError::InvalidConfiguration`](crate::FingerprintError::InvalidConfiguration)
/// if `bits == 0`.
pub fn stable_hash(key: &str, bits: usize) -> Result<usize> {
    validate_bits(bits)?;
    Ok(reduce(stable_hash64(key), bits))
}

#[inline]
pub(crate) fn reduce(hash: u64, bits: usize) -> usize {
    // bits <= usize::MAX, so the remainder always fits back into usize
    (hash % bits as u64) as usize
}
