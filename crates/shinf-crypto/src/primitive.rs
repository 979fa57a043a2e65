use serde::{Deserialize, Serialize};
use sha2::Digest as _;
use shinf_types::Digest;

/// HMAC block size for SHA-256.
const HMAC_BLOCK: usize = 64;
const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// Context string for deriving a BLAKE3 key from a caller secret.
const BLAKE3_KEY_CONTEXT: &str = "shinf 2024-01-01 keyed-hash v1";

/// The single-round digest primitive.
///
/// Both algorithms produce 32-byte outputs. The engine treats them as black
/// boxes; only [`Algorithm::mac`] builds anything on top (HMAC for SHA-256,
/// native keyed mode for BLAKE3).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Sha256,
    Blake3,
}

impl Algorithm {
    /// Identifier used in configuration files.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }

    /// Digest of `data`.
    pub fn digest(&self, data: &[u8]) -> Digest {
        self.digest_parts(&[data])
    }

    /// Digest of the concatenation of `parts`.
    pub fn digest_parts(&self, parts: &[&[u8]]) -> Digest {
        match self {
            Self::Sha256 => {
                let mut hasher = sha2::Sha256::new();
                for part in parts {
                    hasher.update(part);
                }
                let out: [u8; 32] = hasher.finalize().into();
                Digest::from_hash(out)
            }
            Self::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                for part in parts {
                    hasher.update(part);
                }
                Digest::from_hash(*hasher.finalize().as_bytes())
            }
        }
    }

    /// Keyed MAC of `data` under `key`.
    pub fn mac(&self, key: &[u8], data: &[u8]) -> Digest {
        match self {
            Self::Sha256 => hmac_sha256(key, data),
            Self::Blake3 => {
                let derived = blake3::derive_key(BLAKE3_KEY_CONTEXT, key);
                Digest::from_hash(*blake3::keyed_hash(&derived, data).as_bytes())
            }
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(format!("unknown digest algorithm {other:?}")),
        }
    }
}

/// HMAC-SHA256 per RFC 2104.
fn hmac_sha256(key: &[u8], data: &[u8]) -> Digest {
    // Keys longer than the block are hashed first.
    let mut block = [0u8; HMAC_BLOCK];
    if key.len() > HMAC_BLOCK {
        let hashed = Algorithm::Sha256.digest(key);
        block[..hashed.as_bytes().len()].copy_from_slice(hashed.as_bytes());
    } else {
        block[..key.len()].copy_from_slice(key);
    }

    let mut ipad_key = [0u8; HMAC_BLOCK];
    let mut opad_key = [0u8; HMAC_BLOCK];
    for (i, b) in block.iter().enumerate() {
        ipad_key[i] = b ^ IPAD;
        opad_key[i] = b ^ OPAD;
    }

    let inner = Algorithm::Sha256.digest_parts(&[&ipad_key, data]);
    Algorithm::Sha256.digest_parts(&[&opad_key, inner.as_bytes()])
}
