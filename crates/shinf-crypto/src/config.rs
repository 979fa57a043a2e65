use std::path::Path;

use serde::{Deserialize, Serialize};
use shinf_types::FormatVersion;

use crate::error::{HashError, Result};
use crate::primitive::Algorithm;

/// Depth used when the caller does not ask for one.
pub const DEFAULT_DEPTH: u32 = 1;

/// Practical ceiling on iteration depth.
pub const MAX_DEPTH: u32 = 1_000_000;

/// Depth request meaning "as deep as allowed". Normalizes to the configured
/// `max_depth`; iteration is never unbounded.
pub const INFINITE_DEPTH: i64 = i64::MAX;

/// How a salt is joined to the input before iterated hashing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaltScheme {
    /// `salt ++ separator ++ input`. Compatible with existing salted hashes,
    /// but a salt ending in the separator can collide with a different
    /// salt/input split.
    #[default]
    Separator,
    /// `u64_be(len(salt)) ++ salt ++ input`. Unambiguous.
    LengthPrefixed,
}

/// Immutable configuration for a [`crate::DeepHasher`].
///
/// Loaded once (or taken from `Default`) and handed to the hasher by value.
/// Missing keys in a TOML file fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HashConfig {
    /// Single-round digest primitive.
    pub algorithm: Algorithm,
    /// Depth applied when a caller omits one.
    pub default_depth: u32,
    /// Requests deeper than this are clamped down to it.
    pub max_depth: u32,
    /// Field separator for salts, composites and timed hashes.
    pub separator: String,
    /// Format version written into versioned hashes.
    pub version: FormatVersion,
    /// Leading tag of versioned hashes.
    pub prefix: String,
    /// Salt joining scheme.
    pub salt_scheme: SaltScheme,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Sha256,
            default_depth: DEFAULT_DEPTH,
            max_depth: MAX_DEPTH,
            separator: ":".into(),
            version: FormatVersion::CURRENT,
            prefix: "sha-inf".into(),
            salt_scheme: SaltScheme::Separator,
        }
    }
}

impl HashConfig {
    /// Check the constraints every other component relies on.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(HashError::InvalidConfig("max_depth must be at least 1".into()));
        }
        if self.default_depth == 0 || self.default_depth > self.max_depth {
            return Err(HashError::InvalidConfig(format!(
                "default_depth {} must be within [1, {}]",
                self.default_depth, self.max_depth
            )));
        }
        if self.separator.is_empty() {
            return Err(HashError::InvalidConfig("separator must not be empty".into()));
        }
        if self.prefix.is_empty()
            || !self
                .prefix
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-')
        {
            return Err(HashError::InvalidConfig(format!(
                "prefix {:?} must be non-empty ASCII alphanumerics or '-'",
                self.prefix
            )));
        }
        Ok(())
    }

    /// Map a requested depth onto `[1, max_depth]`.
    ///
    /// Zero and negative requests become 1; anything above `max_depth`
    /// (including [`INFINITE_DEPTH`]) saturates. Never an error.
    pub fn normalize_depth(&self, requested: i64) -> u32 {
        if requested < 1 {
            1
        } else if requested >= i64::from(self.max_depth) {
            self.max_depth
        } else {
            requested as u32
        }
    }

    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| HashError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| HashError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
