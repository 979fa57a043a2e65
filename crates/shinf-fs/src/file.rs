use std::path::Path;

use shinf_crypto::DeepHasher;
use shinf_types::Digest;
use tracing::debug;

use crate::error::{FsError, Result};

/// Iterated hash of a file's raw bytes.
///
/// Identical to `hasher.iterated_hash(&contents, depth)`.
pub fn hash_file(hasher: &DeepHasher, path: &Path, depth: i64) -> Result<Digest> {
    let contents = std::fs::read(path).map_err(|source| FsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let digest = hasher.iterated_hash(&contents, depth);
    debug!(path = %path.display(), bytes = contents.len(), digest = %digest.short_hex(), "hashed file");
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_in_memory_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let contents = [0u8, 159, 146, 150, 255];
        std::fs::write(&path, contents).unwrap();

        let h = DeepHasher::default();
        assert_eq!(
            hash_file(&h, &path, 7).unwrap(),
            h.iterated_hash(&contents, 7)
        );
    }

    #[test]
    fn empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();

        let h = DeepHasher::default();
        assert_eq!(hash_file(&h, &path, 1).unwrap(), h.digest(b""));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing");
        let err = hash_file(&DeepHasher::default(), &path, 1).unwrap_err();
        match err {
            FsError::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
