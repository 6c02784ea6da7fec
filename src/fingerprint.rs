//! Fixed-width bitvector fingerprints.
//!
//! A [`Fingerprint`] is `bits` bits wide no matter how long the trace was.
//! [`build_bitvector`] sets one bit per input n-gram at the index chosen by
//! [`stable_hash`](crate::hash::stable_hash). Setting a bit twice is a no-op,
//! so input order and duplicates do not matter.
//!
//! ## Layout
//!
//! Bits are packed into `u64` words: bit `i` is bit `i % 64` of word
//! `i / 64`. Bits past `bits` in the last word are always zero, which lets
//! the similarity code popcount whole words.
//!
//! ## Encodings
//!
//! Both encodings keep bit order exactly:
//!
//! - [`Fingerprint::to_bytes`]: bit `i` in byte `i / 8`, most significant bit
//!   first (the same layout as NumPy's `packbits`).
//! - `Display` / `FromStr`: one `'0'`/`'1'` character per bit, bit 0 first.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use crate::config::validate_bits;
use crate::error::{FingerprintError, Result};
use crate::hash::{reduce, stable_hash64};
use crate::ngram::NGram;

const WORD_BITS: usize = u64::BITS as usize;

/// A fixed-width bit array summarizing a set of n-grams.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    words: Vec<u64>,
    bits: usize,
}

impl Fingerprint {
    /// All-zero fingerprint of width `bits`.
    pub fn zeros(bits: usize) -> Result<Self> {
        validate_bits(bits)?;
        Ok(Self {
            words: vec![0; bits.div_ceil(WORD_BITS)],
            bits,
        })
    }

    /// Fingerprint from explicit bit values, bit 0 first.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the iterator is empty.
    pub fn from_bits<I: IntoIterator<Item = bool>>(values: I) -> Result<Self> {
        let mut words = Vec::new();
        let mut bits = 0usize;
        for value in values {
            if bits % WORD_BITS == 0 {
                words.push(0);
            }
            if value {
                words[bits / WORD_BITS] |= 1u64 << (bits % WORD_BITS);
            }
            bits += 1;
        }
        validate_bits(bits)?;
        Ok(Self { words, bits })
    }

    /// Fingerprint of width `bits` with the given indices set.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `bits == 0`, `InvalidEncoding` if an index is
    /// out of range.
    pub fn from_indices<I: IntoIterator<Item = usize>>(bits: usize, indices: I) -> Result<Self> {
        let mut fp = Self::zeros(bits)?;
        for i in indices {
            if i >= bits {
                return Err(FingerprintError::InvalidEncoding(format!(
                    "bit index {i} out of range for a {bits}-bit fingerprint"
                )));
            }
            fp.set(i);
        }
        Ok(fp)
    }

    /// Width in bits.
    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Value of bit `i`, or `None` past the end.
    pub fn get(&self, i: usize) -> Option<bool> {
        (i < self.bits).then(|| (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// True if no bit is set.
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Bit values in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.bits).map(move |i| (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1)
    }

    /// Indices of set bits in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(w * WORD_BITS + bit)
            })
        })
    }

    /// Every bit flipped.
    #[must_use]
    pub fn complement(&self) -> Self {
        let mut words: Vec<u64> = self.words.iter().map(|w| !w).collect();
        if let Some(last) = words.last_mut() {
            *last &= tail_mask(self.bits);
        }
        Self {
            words,
            bits: self.bits,
        }
    }

    /// Pack into bytes, bit 0 in the most significant bit of byte 0.
    ///
    /// Trailing padding bits of the last byte are zero.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.bits.div_ceil(8)];
        for i in self.iter_ones() {
            out[i / 8] |= 0x80 >> (i % 8);
        }
        out
    }

    /// Unpack a fingerprint of width `bits` written by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// `InvalidEncoding` if the buffer length is not `ceil(bits / 8)` or a
    /// padding bit is set.
    pub fn from_bytes(bytes: &[u8], bits: usize) -> Result<Self> {
        let mut fp = Self::zeros(bits)?;
        let expected = bits.div_ceil(8);
        if bytes.len() != expected {
            return Err(FingerprintError::InvalidEncoding(format!(
                "expected {expected} bytes for a {bits}-bit fingerprint, got {}",
                bytes.len()
            )));
        }

        for (b, &byte) in bytes.iter().enumerate() {
            for offset in 0..8 {
                if byte & (0x80 >> offset) == 0 {
                    continue;
                }
                let i = b * 8 + offset;
                if i >= bits {
                    return Err(FingerprintError::InvalidEncoding(format!(
                        "padding bit {i} is set in a {bits}-bit fingerprint"
                    )));
                }
                fp.set(i);
            }
        }
        Ok(fp)
    }

    pub(crate) fn words(&self) -> &[u64] {
        &self.words
    }

    pub(crate) fn set(&mut self, i: usize) -> bool {
        let mask = 1u64 << (i % WORD_BITS);
        let word = &mut self.words[i / WORD_BITS];
        let was_set = *word & mask != 0;
        *word |= mask;
        was_set
    }
}

fn tail_mask(bits: usize) -> u64 {
    match bits % WORD_BITS {
        0 => u64::MAX,
        r => (1u64 << r) - 1,
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fingerprint")
            .field("bits", &self.bits)
            .field("ones", &self.count_ones())
            .field("value", &format_args!("{self}"))
            .finish()
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(FingerprintError::InvalidEncoding(format!(
                    "unexpected character {other:?} in bit string"
                ))),
            })
            .collect::<Result<Vec<bool>>>()?;
        Self::from_bits(values)
    }
}

/// Build a fingerprint of width `bits` from n-grams.
///
/// Accepts every n-gram of a trace or a pre-filtered top-K list; duplicates
/// are harmless and order is irrelevant. An empty input gives an all-zero
/// fingerprint.
///
/// # Errors
///
/// `InvalidConfiguration` if `bits == 0`, checked before any input is read.
pub fn build_bitvector<I>(ngrams: I, bits: usize) -> Result<Fingerprint>
where
    I: IntoIterator,
    I::Item: Borrow<NGram>,
{
    let mut fp = Fingerprint::zeros(bits)?;
    let mut inputs = 0usize;
    let mut collisions = 0usize;

    for ngram in ngrams {
        let key = ngram.borrow().key();
        let index = reduce(stable_hash64(key.as_str()), bits);
        if fp.set(index) {
            collisions += 1;
        }
        inputs += 1;
    }

    tracing::debug!(
        bits,
        inputs,
        set = fp.count_ones(),
        collisions,
        "built fingerprint"
    );

    Ok(fp)
}
