//! The versioned hash string: `<prefix>-v<major>.<minor>.<patch>-d<depth>-<hex>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::digest::Digest;
use crate::error::TypeError;
use crate::version::{parse_decimal, FormatVersion};

/// A digest bound to the format version and iteration depth that produced it.
///
/// Serialized as its string form, so deserializing goes through the same
/// grammar checks as [`FromStr`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VersionedHash {
    /// Leading tag, e.g. `sha-inf`.
    pub prefix: String,
    /// Format version of the encoding.
    pub version: FormatVersion,
    /// Iteration depth used to compute `digest`. Always at least 1.
    pub depth: u32,
    /// The iterated digest.
    pub digest: Digest,
}

impl VersionedHash {
    pub fn new(prefix: impl Into<String>, version: FormatVersion, depth: u32, digest: Digest) -> Self {
        Self {
            prefix: prefix.into(),
            version,
            depth,
            digest,
        }
    }

    /// Parse a versioned hash string that must carry `prefix`.
    ///
    /// Anything that deviates from the grammar is rejected: a different
    /// prefix, a non `major.minor.patch` version, a zero, signed or
    /// zero-padded depth, and a digest segment that is not exactly 64
    /// lowercase hex characters.
    pub fn parse(s: &str, prefix: &str) -> Result<Self, TypeError> {
        let parsed: Self = s.parse()?;
        if parsed.prefix != prefix {
            return Err(TypeError::InvalidVersionedHash {
                input: s.to_string(),
                reason: "prefix does not match",
            });
        }
        Ok(parsed)
    }
}

/// Parses any well-formed prefix. Segments are split from the right since
/// the prefix may itself contain `-`.
impl FromStr for VersionedHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| TypeError::InvalidVersionedHash {
            input: s.to_string(),
            reason,
        };

        let mut parts = s.rsplitn(4, '-');
        let (digest, depth, version, prefix) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(d), Some(v), Some(p)) => (h, d, v, p),
                _ => return Err(invalid("expected prefix, version, depth and digest segments")),
            };

        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(invalid("prefix must be non-empty ASCII alphanumerics or '-'"));
        }

        let version: FormatVersion = version
            .strip_prefix('v')
            .ok_or_else(|| invalid("missing version marker"))?
            .parse()
            .map_err(|_| invalid("version must be major.minor.patch"))?;

        let depth = depth
            .strip_prefix('d')
            .and_then(parse_decimal)
            .filter(|d| *d >= 1)
            .ok_or_else(|| invalid("depth must be a positive integer"))?;

        let digest =
            Digest::from_hex(digest).map_err(|_| invalid("digest must be 64 lowercase hex characters"))?;

        Ok(Self {
            prefix: prefix.to_string(),
            version,
            depth,
            digest,
        })
    }
}

impl Serialize for VersionedHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionedHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for VersionedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-v{}-d{}-{}",
            self.prefix,
            self.version,
            self.depth,
            self.digest.to_hex()
        )
    }
}
