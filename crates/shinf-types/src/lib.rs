//! Value types for SHA-Infinity.
//!
//! Every other shinf crate depends on `shinf-types`. All types here are
//! immutable values: they are produced by the hashing crates and owned by
//! the caller.
//!
//! # Key Types
//!
//! - [`Digest`]: Fixed 32-byte digest, rendered as lowercase hex
//! - [`FormatVersion`]: `major.minor.patch` version of the hash string format
//! - [`VersionedHash`]: Parsed form of `<prefix>-v<version>-d<depth>-<hex>`

pub mod digest;
pub mod error;
pub mod version;
pub mod versioned;

pub use digest::{Digest, DIGEST_LEN, HEX_LEN};
pub use error::TypeError;
pub use version::FormatVersion;
pub use versioned::VersionedHash;
