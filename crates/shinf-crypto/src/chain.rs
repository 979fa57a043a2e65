use serde::{Deserialize, Serialize};
use shinf_types::Digest;

use crate::engine::DeepHasher;

/// Bytes whose digest starts a chain when no previous digest is supplied.
pub const GENESIS_SEED: &[u8] = b"genesis";

/// One entry of a hash chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    /// The item as supplied.
    pub item: Vec<u8>,
    /// `digest(item)`.
    pub item_digest: Digest,
    /// `digest(hex(previous chain digest) ++ hex(item_digest))`.
    pub chain_digest: Digest,
}

/// Append-only, tamper-evident sequence of hashes over ordered items.
///
/// A chain is a value: nothing here mutates or removes links. Extending a
/// chain produces a new one that starts from the old final digest. Chains
/// are not persisted; callers that need continuity across restarts store
/// `final_digest` and pass it back as `previous`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashChain {
    /// Caller-supplied starting digest, if any.
    pub previous: Option<Digest>,
    /// Starting digest actually used: `previous`, or `digest("genesis")`.
    pub genesis: Digest,
    /// Links in item order.
    pub links: Vec<ChainLink>,
    /// Chain digest of the last link, or `genesis` for an empty chain.
    pub final_digest: Digest,
    /// Number of links.
    pub length: usize,
}

impl HashChain {
    /// Chain `items` in order, starting from `previous` or the canonical
    /// genesis digest.
    pub fn append<I: AsRef<[u8]>>(hasher: &DeepHasher, items: &[I], previous: Option<Digest>) -> Self {
        let genesis = previous.unwrap_or_else(|| hasher.digest(GENESIS_SEED));
        let mut current = genesis;
        let mut links = Vec::with_capacity(items.len());

        for item in items {
            let item = item.as_ref();
            let item_digest = hasher.digest(item);
            current = hasher.combine(&current, &item_digest);
            links.push(ChainLink {
                item: item.to_vec(),
                item_digest,
                chain_digest: current,
            });
        }

        Self {
            previous,
            genesis,
            length: links.len(),
            links,
            final_digest: current,
        }
    }

    /// Continue this chain with more items.
    pub fn extend<I: AsRef<[u8]>>(&self, hasher: &DeepHasher, items: &[I]) -> Self {
        Self::append(hasher, items, Some(self.final_digest))
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl DeepHasher {
    /// Build a hash chain over `items`.
    pub fn append_chain<I: AsRef<[u8]>>(&self, items: &[I], previous: Option<Digest>) -> HashChain {
        HashChain::append(self, items, previous)
    }
}

/// Hash chain integrity verifier.
///
/// Recomputes every link of a [`HashChain`] and reports the first one that
/// does not match.
pub struct ChainVerifier;

impl ChainVerifier {
    /// Verify a chain.
    ///
    /// Checks:
    /// 1. The genesis is `previous` if one was given, else `digest("genesis")`
    /// 2. Each link's item digest matches its item
    /// 3. Each link's chain digest follows from the one before it
    /// 4. The final digest and length agree with the links
    pub fn verify(hasher: &DeepHasher, chain: &HashChain) -> Result<(), ChainError> {
        let expected_genesis = chain
            .previous
            .unwrap_or_else(|| hasher.digest(GENESIS_SEED));
        if chain.genesis != expected_genesis {
            return Err(ChainError::GenesisMismatch);
        }

        let mut current = chain.genesis;
        for (index, link) in chain.links.iter().enumerate() {
            if hasher.digest(&link.item) != link.item_digest {
                return Err(ChainError::ItemMismatch { index });
            }
            current = hasher.combine(&current, &link.item_digest);
            if current != link.chain_digest {
                return Err(ChainError::LinkMismatch { index });
            }
        }

        if current != chain.final_digest {
            return Err(ChainError::FinalMismatch);
        }
        if chain.length != chain.links.len() {
            return Err(ChainError::LengthMismatch {
                declared: chain.length,
                actual: chain.links.len(),
            });
        }
        Ok(())
    }
}

/// Errors from chain verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("genesis digest does not match the chain's starting point")]
    GenesisMismatch,

    #[error("item digest mismatch at index {index}: item was altered")]
    ItemMismatch { index: usize },

    #[error("chain digest mismatch at index {index}: link does not follow its predecessor")]
    LinkMismatch { index: usize },

    #[error("final digest does not match the last link")]
    FinalMismatch,

    #[error("declared length {declared} but chain has {actual} links")]
    LengthMismatch { declared: usize, actual: usize },
}
