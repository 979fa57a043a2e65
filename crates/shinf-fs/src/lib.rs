//! File and directory hashing for SHA-Infinity.
//!
//! A thin I/O layer over [`shinf_crypto::DeepHasher`]: file bytes are passed
//! unmodified to the iterated hash, and directories fold their children's
//! digests into a Merkle root in lexical name order so results are
//! reproducible across runs and platforms.

pub mod directory;
pub mod error;
pub mod file;

pub use directory::{hash_directory, DirectoryHash, EntryHash, EntryKind};
pub use error::{FsError, Result};
pub use file::hash_file;
