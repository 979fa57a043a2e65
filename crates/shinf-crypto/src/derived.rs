//! Hashes derived from other hashes or carrying metadata.

use serde::{Deserialize, Serialize};
use shinf_types::{Digest, FormatVersion, VersionedHash};

use crate::engine::DeepHasher;
use crate::error::Result;

/// A hash bound to the moment it was taken.
///
/// `hash` covers `timestamp ++ separator ++ input`. The timestamp is metadata:
/// re-verifying requires the caller to supply it again via
/// [`DeepHasher::timed_hash_at`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedHash {
    pub hash: Digest,
    /// Milliseconds since the UNIX epoch.
    pub timestamp: i64,
    /// Normalized depth.
    pub depth: u32,
    pub version: FormatVersion,
}

impl DeepHasher {
    /// Fold many digests into one: their hex strings joined with the
    /// separator, then iterated. Order-sensitive.
    pub fn composite_hash(&self, hashes: &[Digest], depth: i64) -> Digest {
        let joined = hashes
            .iter()
            .map(Digest::to_hex)
            .collect::<Vec<_>>()
            .join(self.config().separator.as_str());
        self.iterated_hash(joined.as_bytes(), depth)
    }

    /// Timed hash using the current wall-clock time.
    pub fn timed_hash(&self, input: &[u8], depth: i64) -> TimedHash {
        let timestamp = chrono::Utc::now().timestamp_millis();
        self.timed_hash_at(input, depth, timestamp)
    }

    /// Timed hash for an explicit timestamp (epoch milliseconds).
    pub fn timed_hash_at(&self, input: &[u8], depth: i64, timestamp: i64) -> TimedHash {
        let mut buf = timestamp.to_string().into_bytes();
        buf.extend_from_slice(self.config().separator.as_bytes());
        buf.extend_from_slice(input);
        TimedHash {
            hash: self.iterated_hash(&buf, depth),
            timestamp,
            depth: self.normalize_depth(depth),
            version: self.config().version,
        }
    }

    /// Iterated hash of `input` wrapped with this configuration's prefix,
    /// format version and the normalized depth.
    pub fn versioned(&self, input: &[u8], depth: i64) -> VersionedHash {
        let depth = self.normalize_depth(depth);
        VersionedHash::new(
            self.config().prefix.clone(),
            self.config().version,
            depth,
            self.iterated_hash(input, i64::from(depth)),
        )
    }

    /// The string form `<prefix>-v<version>-d<depth>-<hex>`.
    pub fn versioned_hash(&self, input: &[u8], depth: i64) -> String {
        self.versioned(input, depth).to_string()
    }

    /// Parse a versioned hash string carrying this configuration's prefix.
    pub fn parse_versioned_hash(&self, s: &str) -> Result<VersionedHash> {
        Ok(VersionedHash::parse(s, &self.config().prefix)?)
    }

    /// Check that `input` hashes to the digest recorded in `versioned`,
    /// using the depth recorded there.
    pub fn verify_versioned(&self, input: &[u8], versioned: &VersionedHash) -> bool {
        versioned.prefix == self.config().prefix
            && self
                .iterated_hash(input, i64::from(versioned.depth))
                .ct_eq(&versioned.digest)
    }
}
