//! Salted and keyed iterated hashing.

use rand::rngs::OsRng;
use rand::RngCore;
use shinf_types::Digest;

use crate::config::SaltScheme;
use crate::engine::DeepHasher;
use crate::error::{HashError, Result};

/// Generate `length` bytes from the operating system CSPRNG, hex-encoded.
///
/// Fails if the OS source is unavailable; there is no fallback to a
/// non-cryptographic generator.
pub fn generate_salt(length: usize) -> Result<String> {
    let mut buf = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| HashError::RandomnessUnavailable(e.to_string()))?;
    Ok(hex::encode(buf))
}

impl DeepHasher {
    /// Iterated hash of `input` joined with `salt` per the configured
    /// [`SaltScheme`].
    pub fn salted_hash(&self, input: &[u8], salt: &[u8], depth: i64) -> Digest {
        let config = self.config();
        let mut buf = Vec::with_capacity(salt.len() + config.separator.len() + 8 + input.len());
        match config.salt_scheme {
            SaltScheme::Separator => {
                buf.extend_from_slice(salt);
                buf.extend_from_slice(config.separator.as_bytes());
            }
            SaltScheme::LengthPrefixed => {
                buf.extend_from_slice(&(salt.len() as u64).to_be_bytes());
                buf.extend_from_slice(salt);
            }
        }
        buf.extend_from_slice(input);
        self.iterated_hash(&buf, depth)
    }

    /// Keyed MAC of `data`, followed by `depth - 1` plain digest rounds over
    /// the hex of the MAC.
    ///
    /// Keys are opaque; derivation and rotation belong to the caller.
    pub fn keyed_hash(&self, key: &[u8], data: &[u8], depth: i64) -> Digest {
        let depth = self.normalize_depth(depth);
        let mac = self.algorithm().mac(key, data);
        self.rehash(mac, depth - 1)
    }
}
