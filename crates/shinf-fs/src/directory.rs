use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shinf_crypto::{DeepHasher, MerkleTree};
use shinf_types::Digest;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{FsError, Result};
use crate::file::hash_file;

/// Kind of a directory entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// Digest of one immediate child of a hashed directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryHash {
    pub name: String,
    pub kind: EntryKind,
    pub digest: Digest,
}

/// Result of hashing a directory tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryHash {
    /// Merkle root (depth 1) over the children's hex digests.
    pub root: Digest,
    /// Immediate children in lexical name order.
    pub entries: Vec<EntryHash>,
    /// Number of immediate children.
    pub item_count: usize,
}

impl DirectoryHash {
    fn fold(hasher: &DeepHasher, entries: Vec<EntryHash>) -> Self {
        let hexes: Vec<String> = entries.iter().map(|e| e.digest.to_hex()).collect();
        let root = MerkleTree::build(hasher, &hexes, 1).root();
        Self {
            root,
            item_count: entries.len(),
            entries,
        }
    }
}

/// Hash a directory tree.
///
/// Files are hashed with `iterated_hash(contents, depth)`. A directory's
/// digest is the Merkle root over its children's hex digests, children
/// sorted by name. Symlinks are followed; loops are reported as errors.
/// Entries that are neither files nor directories are skipped.
///
/// The walk is post-order with an owned accumulator keyed by parent path,
/// so stack usage does not grow with directory depth.
pub fn hash_directory(hasher: &DeepHasher, root: &Path, depth: i64) -> Result<DirectoryHash> {
    if !root.is_dir() {
        return Err(FsError::NotADirectory(root.to_path_buf()));
    }

    let mut pending: HashMap<PathBuf, Vec<EntryHash>> = HashMap::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .contents_first(true)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()));

    for entry in walker {
        let entry = entry.map_err(|source| FsError::Walk {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source,
        })?;
        let path = entry.path();

        if entry.depth() == 0 {
            // Contents-first order yields the root last.
            let children = pending.remove(path).unwrap_or_default();
            let hashed = DirectoryHash::fold(hasher, children);
            debug!(path = %path.display(), items = hashed.item_count, root = %hashed.root.short_hex(), "hashed directory");
            return Ok(hashed);
        }

        let file_type = entry.file_type();
        let (kind, digest) = if file_type.is_dir() {
            let children = pending.remove(path).unwrap_or_default();
            let hashed = DirectoryHash::fold(hasher, children);
            debug!(path = %path.display(), items = hashed.item_count, "hashed subdirectory");
            (EntryKind::Directory, hashed.root)
        } else if file_type.is_file() {
            (EntryKind::File, hash_file(hasher, path, depth)?)
        } else {
            warn!(path = %path.display(), "skipping entry that is neither file nor directory");
            continue;
        };

        let parent = path.parent().unwrap_or(root).to_path_buf();
        pending.entry(parent).or_default().push(EntryHash {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind,
            digest,
        });
    }

    Ok(DirectoryHash::fold(
        hasher,
        pending.remove(root).unwrap_or_default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        // Created out of name order on purpose.
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.txt"), b"C").unwrap();
        fs::write(dir.path().join("b.txt"), b"B").unwrap();
        fs::write(dir.path().join("a.txt"), b"A").unwrap();
        dir
    }

    #[test]
    fn matches_manual_fold() {
        let dir = sample_tree();
        let h = DeepHasher::default();
        let result = hash_directory(&h, dir.path(), 2).unwrap();

        let a = h.iterated_hash(b"A", 2);
        let b = h.iterated_hash(b"B", 2);
        let c = h.iterated_hash(b"C", 2);
        let sub = h.build_tree(&[c.to_hex()], 1).root();
        let expected = h.build_tree(&[a.to_hex(), b.to_hex(), sub.to_hex()], 1).root();

        assert_eq!(result.root, expected);
        assert_eq!(result.item_count, 3);
        let names: Vec<&str> = result.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.txt", "sub"]);
        assert_eq!(result.entries[2].kind, EntryKind::Directory);
        assert_eq!(result.entries[2].digest, sub);
        assert_eq!(result.entries[0].kind, EntryKind::File);
        assert_eq!(result.entries[0].digest, a);
    }

    #[test]
    fn empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let h = DeepHasher::default();
        let result = hash_directory(&h, dir.path(), 1).unwrap();
        assert_eq!(result.root, h.digest(b""));
        assert!(result.entries.is_empty());
        assert_eq!(result.item_count, 0);
    }

    #[test]
    fn reproducible_across_copies() {
        let h = DeepHasher::default();
        let first = hash_directory(&h, sample_tree().path(), 1).unwrap();
        let second = hash_directory(&h, sample_tree().path(), 1).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn content_change_changes_root() {
        let dir = sample_tree();
        let h = DeepHasher::default();
        let before = hash_directory(&h, dir.path(), 1).unwrap();
        fs::write(dir.path().join("sub").join("c.txt"), b"changed").unwrap();
        let after = hash_directory(&h, dir.path(), 1).unwrap();
        assert_ne!(before.root, after.root);
        assert_eq!(before.entries[0], after.entries[0]);
    }

    #[test]
    fn deep_nesting() {
        let dir = tempfile::tempdir().unwrap();
        let mut path = dir.path().to_path_buf();
        for i in 0..64 {
            path.push(format!("d{i}"));
        }
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("leaf"), b"x").unwrap();

        let result = hash_directory(&DeepHasher::default(), dir.path(), 1).unwrap();
        assert_eq!(result.item_count, 1);
        assert_eq!(result.entries[0].name, "d0");
    }

    #[test]
    fn file_is_not_a_directory() {
        let dir = sample_tree();
        let err = hash_directory(&DeepHasher::default(), &dir.path().join("a.txt"), 1).unwrap_err();
        assert!(matches!(err, FsError::NotADirectory(_)));
    }

    #[test]
    fn serializes_kind_lowercase() {
        let dir = sample_tree();
        let result = hash_directory(&DeepHasher::default(), dir.path(), 1).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"kind\":\"directory\""));
        assert!(json.contains("\"kind\":\"file\""));
    }
}
