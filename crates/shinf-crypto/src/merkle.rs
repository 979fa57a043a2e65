use serde::{Deserialize, Serialize};
use shinf_types::Digest;

use crate::engine::DeepHasher;
use crate::error::{HashError, Result};

/// Side of a sibling in a Merkle proof path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Sibling is hashed before the running hash.
    Left,
    /// Sibling is hashed after the running hash.
    Right,
}

/// Binary Merkle tree over iterated leaf hashes.
///
/// Level 0 holds the leaves; each later level holds
/// `ceil(len(previous) / 2)` nodes, where a node is
/// `digest(hex(left) ++ hex(right))` and an odd trailing node is paired with
/// itself. The last level is the single root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleTree {
    /// The root hash of the tree.
    root: Digest,
    /// All levels, leaves first. Empty for an empty tree.
    levels: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Build a tree from raw items, hashing each with
    /// `iterated_hash(item, depth)`.
    ///
    /// An empty item list yields the digest of the empty string as root and
    /// no levels.
    pub fn build<I: AsRef<[u8]>>(hasher: &DeepHasher, items: &[I], depth: i64) -> Self {
        let leaves = items
            .iter()
            .map(|item| hasher.iterated_hash(item.as_ref(), depth))
            .collect();
        Self::from_leaves(hasher, leaves)
    }

    /// Build a tree from pre-computed leaf digests.
    pub fn from_leaves(hasher: &DeepHasher, leaves: Vec<Digest>) -> Self {
        if leaves.is_empty() {
            return Self {
                root: hasher.digest(b""),
                levels: vec![],
            };
        }

        let mut levels: Vec<Vec<Digest>> = vec![leaves];
        while let Some(current) = levels.last().filter(|level| level.len() > 1) {
            let next: Vec<Digest> = current
                .chunks(2)
                .map(|pair| {
                    // Odd node: hash with itself
                    let left = &pair[0];
                    let right = pair.get(1).unwrap_or(left);
                    hasher.combine(left, right)
                })
                .collect();
            levels.push(next);
        }

        let root = levels[levels.len() - 1][0];
        Self { root, levels }
    }

    /// The root hash of the tree.
    pub fn root(&self) -> Digest {
        self.root
    }

    /// Leaf digests, in item order.
    pub fn leaves(&self) -> &[Digest] {
        self.levels.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// All levels from leaves to root.
    pub fn levels(&self) -> &[Vec<Digest>] {
        &self.levels
    }

    /// Number of leaves.
    pub fn item_count(&self) -> usize {
        self.leaves().len()
    }

    /// Check that `proof` places its leaf inside this tree.
    ///
    /// The root and leaf count come from the tree, never from the proof.
    pub fn verify(&self, hasher: &DeepHasher, proof: &MerkleProof) -> bool {
        verify_proof(hasher, &proof.leaf, proof, &self.root, self.item_count())
    }

    /// Generate an inclusion proof for the leaf at `index`.
    ///
    /// A self-paired odd tail has no sibling, so nothing is recorded for that
    /// level; the verifier replays the duplication from `index` and
    /// `leaf_count`.
    pub fn proof(&self, index: usize) -> Result<MerkleProof> {
        let leaf_count = self.item_count();
        if index >= leaf_count {
            return Err(HashError::IndexOutOfRange {
                index,
                len: leaf_count,
            });
        }

        let mut steps = Vec::new();
        let mut idx = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let is_right = idx % 2 == 1;
            let sibling_idx = if is_right { idx - 1 } else { idx + 1 };
            if let Some(sibling) = level.get(sibling_idx) {
                steps.push(ProofStep {
                    hash: *sibling,
                    side: if is_right { Side::Left } else { Side::Right },
                });
            }
            idx /= 2;
        }

        Ok(MerkleProof {
            index,
            leaf_count,
            leaf: self.levels[0][index],
            steps,
            root: self.root,
        })
    }
}

/// One sibling on the path from a leaf to the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    pub hash: Digest,
    pub side: Side,
}

/// Merkle inclusion proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Position of the proven leaf.
    pub index: usize,
    /// Number of leaves in the tree the proof was cut from.
    pub leaf_count: usize,
    /// The leaf being proven.
    pub leaf: Digest,
    /// Siblings from leaf to root.
    pub steps: Vec<ProofStep>,
    /// Root the proof was generated against. Verification never reads it.
    pub root: Digest,
}

/// Recompute the root from `leaf` and the proof path and compare it with
/// `expected_root`.
///
/// `leaf_count` is the size of the tree the caller trusts `expected_root`
/// to describe. The count carried by the proof must match it, otherwise a
/// forged count could reshape the fold and place the leaf at a position the
/// tree does not have.
///
/// The fold replays the tree shape given by `index` and `leaf_count`: where
/// the running node is an unpaired odd tail it is combined with itself,
/// otherwise the next step is consumed and its side must agree with the
/// running position. Missing, surplus or misplaced steps reject the proof.
/// The final comparison does not short-circuit.
pub fn verify_proof(
    hasher: &DeepHasher,
    leaf: &Digest,
    proof: &MerkleProof,
    expected_root: &Digest,
    leaf_count: usize,
) -> bool {
    if proof.leaf_count != leaf_count || proof.index >= leaf_count {
        return false;
    }

    let mut running = *leaf;
    let mut idx = proof.index;
    let mut width = leaf_count;
    let mut steps = proof.steps.iter();

    while width > 1 {
        if idx % 2 == 0 && idx + 1 == width {
            running = hasher.combine(&running, &running);
        } else {
            let Some(step) = steps.next() else {
                return false;
            };
            let expected_side = if idx % 2 == 0 { Side::Right } else { Side::Left };
            if step.side != expected_side {
                return false;
            }
            running = match step.side {
                Side::Left => hasher.combine(&step.hash, &running),
                Side::Right => hasher.combine(&running, &step.hash),
            };
        }
        idx /= 2;
        width = width.div_ceil(2);
    }

    steps.next().is_none() && running.ct_eq(expected_root)
}

impl DeepHasher {
    /// Build a Merkle tree over `items`.
    pub fn build_tree<I: AsRef<[u8]>>(&self, items: &[I], depth: i64) -> MerkleTree {
        MerkleTree::build(self, items, depth)
    }

    /// Rebuild the tree over `items` and cut a proof for `index`.
    pub fn generate_proof<I: AsRef<[u8]>>(
        &self,
        items: &[I],
        index: usize,
        depth: i64,
    ) -> Result<MerkleProof> {
        if index >= items.len() {
            return Err(HashError::IndexOutOfRange {
                index,
                len: items.len(),
            });
        }
        MerkleTree::build(self, items, depth).proof(index)
    }

    /// Check `proof` for `leaf` against `expected_root` of a tree with
    /// `leaf_count` leaves.
    pub fn verify_proof(
        &self,
        leaf: &Digest,
        proof: &MerkleProof,
        expected_root: &Digest,
        leaf_count: usize,
    ) -> bool {
        verify_proof(self, leaf, proof, expected_root, leaf_count)
    }
}
