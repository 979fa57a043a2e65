use std::io;
use std::path::PathBuf;

/// Errors produced while hashing the filesystem.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// A file could not be read.
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Directory traversal failed (permissions, symlink loop, vanished entry).
    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// `hash_directory` was pointed at something other than a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Convenience alias used throughout the fs crate.
pub type Result<T> = std::result::Result<T, FsError>;
