//! SHA-Infinity hashing.
//!
//! Provides iterated ("deepened") hashing over a trusted digest primitive,
//! salted and keyed variants, binary Merkle trees with inclusion proofs,
//! append-only hash chains, and composite/timed/versioned derived hashes.
//!
//! Every operation is a pure function of its inputs and the immutable
//! [`HashConfig`] held by a [`DeepHasher`]. There is no shared mutable state,
//! so a `DeepHasher` can be cloned onto any worker thread. Deep iteration is
//! deliberately CPU-bound; callers that request large depths should run it
//! off latency-sensitive threads.
//!
//! The digest primitives themselves come from `sha2` and `blake3`; there is no custom
//! cryptography beyond the HMAC construction.

pub mod chain;
pub mod config;
pub mod derived;
pub mod engine;
pub mod error;
pub mod merkle;
pub mod primitive;
pub mod salt;

pub use chain::{ChainError, ChainLink, ChainVerifier, HashChain, GENESIS_SEED};
pub use config::{HashConfig, SaltScheme, DEFAULT_DEPTH, INFINITE_DEPTH, MAX_DEPTH};
pub use derived::TimedHash;
pub use engine::DeepHasher;
pub use error::{HashError, Result};
pub use merkle::{verify_proof, MerkleProof, MerkleTree, ProofStep, Side};
pub use primitive::Algorithm;
pub use salt::generate_salt;
