//! End-to-end fingerprinting: tokens to bitvector in one call.
//!
//! ```text
//! tokens -> build_ngrams(n) -> [top_k(k) if k > 0] -> build_bitvector(bits)
//! ```
//!
//! With `k == 0` every distinct n-gram contributes a bit; otherwise only the
//! `k` most frequent ones do (ties broken by n-gram order).

use crate::config::FingerprintConfig;
use crate::error::Result;
use crate::fingerprint::{build_bitvector, Fingerprint};
use crate::ngram::{build_ngrams, top_k};
use crate::similarity::{compare, Similarity};

/// Builds fingerprints with a fixed, validated configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprinter {
    config: FingerprintConfig,
}

impl Fingerprinter {
    /// Create a fingerprinter, validating `config`.
    pub fn new(config: FingerprintConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Fingerprint one token stream.
    pub fn fingerprint<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Fingerprint> {
        let FingerprintConfig { n, bits, .. } = self.config;
        let freq = build_ngrams(tokens, n)?;

        match self.config.selection() {
            Some(k) => {
                let top = top_k(&freq, k);
                build_bitvector(top.iter().map(|(ngram, _)| ngram), bits)
            }
            None => build_bitvector(freq.ngrams(), bits),
        }
    }

    /// Drain a token source and fingerprint its tokens.
    #[cfg(feature = "trace")]
    pub fn fingerprint_source<T>(&self, source: T) -> Result<Fingerprint>
    where
        T: crate::trace::TokenSource,
    {
        let tokens = source.tokens()?;
        self.fingerprint(tokens.as_slice())
    }

    /// Fingerprint many token streams; output order follows input order.
    ///
    /// With the `parallel` feature the streams are fingerprinted on the
    /// rayon pool, one stream per task.
    pub fn fingerprint_batch<T, S>(&self, traces: &[T]) -> Result<Vec<Fingerprint>>
    where
        T: AsRef<[S]> + Sync,
        S: AsRef<str> + Sync,
    {
        tracing::debug!(traces = traces.len(), config = ?self.config, "fingerprinting batch");

        #[cfg(feature = "parallel")]
        let fingerprints: Result<Vec<Fingerprint>> = {
            use rayon::prelude::*;
            traces
                .par_iter()
                .map(|tokens| self.fingerprint(tokens.as_ref()))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let fingerprints: Result<Vec<Fingerprint>> = traces
            .iter()
            .map(|tokens| self.fingerprint(tokens.as_ref()))
            .collect();

        fingerprints
    }

    /// Fingerprint two token streams and score them with both metrics.
    pub fn compare_tokens<A, B>(&self, a: &[A], b: &[B]) -> Result<Similarity>
    where
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let fa = self.fingerprint(a)?;
        let fb = self.fingerprint(b)?;
        compare(&fa, &fb)
    }
}
