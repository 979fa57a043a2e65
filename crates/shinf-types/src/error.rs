use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("digest hex must be lowercase")]
    UppercaseHex,

    #[error("invalid format version {input:?}: {reason}")]
    InvalidVersion { input: String, reason: &'static str },

    #[error("invalid versioned hash {input:?}: {reason}")]
    InvalidVersionedHash { input: String, reason: &'static str },
}
