use shinf_types::Digest;

use crate::config::HashConfig;
use crate::error::Result;
use crate::primitive::Algorithm;

/// Iterated hash engine.
///
/// A `DeepHasher` owns an immutable [`HashConfig`] and exposes every hashing
/// operation as a method. It holds no other state, so clones are cheap to
/// hand to worker threads and concurrent calls never interact.
///
/// Whenever a digest is hashed again (iteration rounds, Merkle nodes, chain
/// links) the primitive is fed its lowercase hex text, not its raw bytes.
#[derive(Clone, Debug, Default)]
pub struct DeepHasher {
    config: HashConfig,
}

impl DeepHasher {
    /// Create a hasher after validating `config`.
    pub fn new(config: HashConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this hasher was built with.
    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    /// The underlying digest primitive.
    pub fn algorithm(&self) -> Algorithm {
        self.config.algorithm
    }

    /// Clamp a requested depth onto `[1, max_depth]`.
    pub fn normalize_depth(&self, requested: i64) -> u32 {
        self.config.normalize_depth(requested)
    }

    /// One plain digest of `data`.
    pub fn digest(&self, data: &[u8]) -> Digest {
        self.config.algorithm.digest(data)
    }

    /// Content address of `data`: a single plain digest, for deduplication.
    pub fn content_address(&self, data: &[u8]) -> Digest {
        self.digest(data)
    }

    /// Apply the digest `depth` times: once to `input`, then `depth - 1`
    /// more times to the hex of the previous result.
    ///
    /// `depth` is normalized first, so `0` behaves like `1` and anything past
    /// `max_depth` behaves like `max_depth`. Cost is linear in the
    /// normalized depth and is not memoized.
    pub fn iterated_hash(&self, input: &[u8], depth: i64) -> Digest {
        let depth = self.normalize_depth(depth);
        self.rehash(self.digest(input), depth - 1)
    }

    /// Hash the hex of `start` `rounds` more times.
    pub(crate) fn rehash(&self, start: Digest, rounds: u32) -> Digest {
        let mut current = start;
        for _ in 0..rounds {
            current = self.digest(&current.to_hex_bytes());
        }
        current
    }

    /// Interior node hash: `digest(hex(left) ++ hex(right))`.
    pub fn combine(&self, left: &Digest, right: &Digest) -> Digest {
        self.config
            .algorithm
            .digest_parts(&[&left.to_hex_bytes(), &right.to_hex_bytes()])
    }
}
