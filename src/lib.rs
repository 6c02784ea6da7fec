//! tracegram: behavioral fingerprints of execution traces.
//!
//! Turns an ordered stream of event tokens (typically syscall names from an
//! strace log) into a fixed-width bitvector, and compares bitvectors for
//! similarity. Two traces can be compared without keeping either token
//! stream around.
//!
//! ```text
//! tokens ──► build_ngrams(n) ──► top_k(k)? ──► build_bitvector(bits) ──► Fingerprint
//! (Fingerprint, Fingerprint) ──► jaccard_similarity / hamming_similarity ──► [0, 1]
//! ```
//!
//! - `ngram/`: sliding-window n-gram counts and deterministic top-K
//! - `hash/`: canonical n-gram keys and BLAKE2b-64 bit indices
//! - `fingerprint`: the packed bitvector and its builder
//! - `similarity`: Jaccard and Hamming similarity
//! - `pipeline`: all of the above driven by one [`FingerprintConfig`]
//! - `trace`: strace line tokenizer (feature `trace`)
//!
//! # Determinism
//!
//! The same tokens with the same `(n, bits, k)` give the same fingerprint,
//! bit for bit, on any machine. Nothing depends on hash-map iteration order:
//! bits are set idempotently, and top-K ties are broken by n-gram order.
//!
//! # Example
//!
//! ```rust
//! use tracegram::{FingerprintConfig, Fingerprinter};
//!
//! let fpr = Fingerprinter::new(FingerprintConfig::new(2, 64, 0)?)?;
//! let a = fpr.fingerprint(&["open", "read", "read", "write", "close"])?;
//! let b = fpr.fingerprint(&["open", "read", "write", "close"])?;
//!
//! let sim = tracegram::compare(&a, &b)?;
//! assert!(sim.jaccard > 0.5);
//! # Ok::<(), tracegram::FingerprintError>(())
//! ```
//!
//! # Choosing `bits` and `k`
//!
//! Each distinct n-gram sets at most one bit, so a trace with `d` distinct
//! n-grams sets roughly `bits * (1 - e^(-d/bits))` bits. Once most bits are
//! set every fingerprint looks alike; either widen the fingerprint or cap
//! the n-grams with `k`.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod hash;
pub mod ngram;
pub mod pipeline;
pub mod similarity;

#[cfg(feature = "trace")]
pub mod trace;

// Re-exports
pub use config::FingerprintConfig;
pub use error::{FingerprintError, Result};
pub use fingerprint::{build_bitvector, Fingerprint};
pub use hash::{stable_hash, stable_hash64, NGramKey, KEY_SEPARATOR};
pub use ngram::{build_ngrams, top_k, NGram, NGramFrequency, Token};
pub use pipeline::Fingerprinter;
pub use similarity::{
    compare, hamming_distance, hamming_similarity, jaccard_similarity, Similarity,
    SimilarityMetric,
};
