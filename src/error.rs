//! Error types for tracegram.

use thiserror::Error;

/// Errors that can occur while building or comparing fingerprints.
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// A configuration parameter is out of range (`n == 0`, `bits == 0`).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Two fingerprints of different widths were compared.
    #[error("shape mismatch: left fingerprint has {left} bits, right has {right}")]
    ShapeMismatch { left: usize, right: usize },

    /// A packed byte buffer or bit string does not describe a fingerprint.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// I/O error while reading a trace.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FingerprintError {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// Result type for fingerprint operations.
pub type Result<T> = std::result::Result<T, FingerprintError>;
