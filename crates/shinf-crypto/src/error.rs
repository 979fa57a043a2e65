use std::io;
use std::path::PathBuf;

use shinf_types::TypeError;

/// Errors produced by the hashing engine.
///
/// Depth is never a source of errors: out-of-range depths are clamped.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// A proof was requested for a leaf that does not exist.
    #[error("leaf index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    /// The operating system could not supply secure random bytes.
    #[error("secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    /// The configuration violates one of its constraints.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::HashConfig`].
    #[error("failed to parse config: {0}")]
    ConfigParse(String),

    /// A value failed to parse (digest hex, versioned hash string).
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Convenience alias used throughout the crypto crate.
pub type Result<T> = std::result::Result<T, HashError>;
