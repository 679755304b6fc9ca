//! MiMC-based Merkle tree mirroring the withdrawal circuit
//!
//! Tree Structure:
//! - Depth: 29 levels (2^29 leaves)
//! - Level `i` hashes its children with `H(iv_i, [left, right])`
//! - Empty subtrees: zero[0] = 0, zero[i+1] = H(iv_i, [zero[i], zero[i]])
//!
//! Only the populated prefix of each level is stored; every other node is the
//! zero subtree of its level.

use ark_bn254::Fr;
use thiserror::Error;

use super::ivs::{IvTable, MAX_LEAVES, TREE_DEPTH};
use super::mimc::MiMC;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    #[error("Tree is full")]
    TreeFull,
    #[error("Invalid leaf index: {0}")]
    InvalidLeafIndex(u64),
    #[error("Invalid proof length: expected {expected}, got {got}")]
    InvalidProofLength { expected: usize, got: usize },
}

/// Zero-subtree roots for every level, `zeros[TREE_DEPTH]` being the empty root
pub fn zero_hashes(ivs: &IvTable) -> Vec<Fr> {
    let mimc = MiMC::new();
    let mut zeros = Vec::with_capacity(TREE_DEPTH + 1);
    zeros.push(Fr::from(0u64));

    for (level, iv) in ivs.levels().iter().enumerate() {
        let z = zeros[level];
        zeros.push(mimc.hash2(iv, &z, &z));
    }

    zeros
}

/// Direction bits of a leaf index, level 0 first (true = right child)
pub fn directions_from_index(index: u64) -> Vec<bool> {
    (0..TREE_DEPTH).map(|level| (index >> level) & 1 == 1).collect()
}

/// Leaf index addressed by a direction-bit sequence, level 0 first
pub fn index_from_directions(directions: &[bool]) -> u64 {
    directions
        .iter()
        .enumerate()
        .fold(0u64, |acc, (level, &is_right)| acc | ((is_right as u64) << level))
}

/// A Merkle path (proof) for a leaf
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerklePath {
    /// Sibling hashes from leaf to root
    pub siblings: Vec<Fr>,
    /// Path directions (false = left child, true = right child)
    pub directions: Vec<bool>,
    /// The leaf index
    pub leaf_index: u64,
}

impl MerklePath {
    /// Build a path from raw parts, checking both have one entry per level
    pub fn new(siblings: Vec<Fr>, directions: Vec<bool>) -> Result<Self, MerkleError> {
        for len in [siblings.len(), directions.len()] {
            if len != TREE_DEPTH {
                return Err(MerkleError::InvalidProofLength {
                    expected: TREE_DEPTH,
                    got: len,
                });
            }
        }

        let leaf_index = index_from_directions(&directions);
        Ok(Self {
            siblings,
            directions,
            leaf_index,
        })
    }

    /// Fold `leaf` up the path
    pub fn compute_root(&self, leaf: &Fr, ivs: &IvTable) -> Fr {
        let mimc = MiMC::new();

        self.siblings
            .iter()
            .zip(&self.directions)
            .zip(ivs.levels())
            .fold(*leaf, |current, ((sibling, &is_right), iv)| {
                if is_right {
                    mimc.hash2(iv, sibling, &current)
                } else {
                    mimc.hash2(iv, &current, sibling)
                }
            })
    }

    /// Verify the path leads to the expected root
    pub fn verify(&self, leaf: &Fr, expected_root: &Fr, ivs: &IvTable) -> bool {
        if self.siblings.len() != TREE_DEPTH || self.directions.len() != TREE_DEPTH {
            return false;
        }

        self.compute_root(leaf, ivs) == *expected_root
    }

    /// Direction string as the wallets send it: one '0'/'1' per level, level 0 first
    pub fn address_bits(&self) -> String {
        self.directions
            .iter()
            .map(|&is_right| if is_right { '1' } else { '0' })
            .collect()
    }
}

/// Append-only Merkle tree of deposit leaves
#[derive(Clone, Debug)]
pub struct MixerTree {
    /// Populated nodes per level; `nodes[0]` holds the leaves
    nodes: Vec<Vec<Fr>>,
    /// Zero-subtree root per level
    zeros: Vec<Fr>,
    ivs: IvTable,
    mimc: MiMC,
}

impl MixerTree {
    /// Create an empty tree
    pub fn new(ivs: &IvTable) -> Self {
        Self {
            nodes: vec![Vec::new(); TREE_DEPTH + 1],
            zeros: zero_hashes(ivs),
            ivs: ivs.clone(),
            mimc: MiMC::new(),
        }
    }

    /// Append a leaf
    ///
    /// Returns the index of the inserted leaf
    pub fn append(&mut self, leaf: Fr) -> Result<u64, MerkleError> {
        let leaf_index = self.len();
        if leaf_index >= MAX_LEAVES {
            return Err(MerkleError::TreeFull);
        }

        self.nodes[0].push(leaf);

        let mut index = leaf_index as usize;
        for level in 0..TREE_DEPTH {
            let base = index & !1;
            let left = self.node(level, base);
            let right = self.node(level, base + 1);
            let parent = self.mimc.hash2(&self.ivs.levels()[level], &left, &right);

            index /= 2;
            let row = &mut self.nodes[level + 1];
            if index < row.len() {
                row[index] = parent;
            } else {
                row.push(parent);
            }
        }

        tracing::trace!(leaf_index, "appended leaf");
        Ok(leaf_index)
    }

    fn node(&self, level: usize, index: usize) -> Fr {
        self.nodes[level]
            .get(index)
            .copied()
            .unwrap_or(self.zeros[level])
    }

    /// Get the current root
    pub fn root(&self) -> Fr {
        self.node(TREE_DEPTH, 0)
    }

    /// Generate a Merkle proof for a leaf at the given index
    pub fn proof(&self, leaf_index: u64) -> Result<MerklePath, MerkleError> {
        if leaf_index >= self.len() {
            return Err(MerkleError::InvalidLeafIndex(leaf_index));
        }

        let directions = directions_from_index(leaf_index);
        let mut index = leaf_index as usize;
        let siblings = (0..TREE_DEPTH)
            .map(|level| {
                let sibling = self.node(level, index ^ 1);
                index /= 2;
                sibling
            })
            .collect();

        Ok(MerklePath {
            siblings,
            directions,
            leaf_index,
        })
    }

    /// Get the leaf at a given index
    pub fn leaf(&self, index: u64) -> Option<Fr> {
        self.nodes[0].get(index as usize).copied()
    }

    /// Position of the first occurrence of `leaf`
    pub fn index_of(&self, leaf: &Fr) -> Option<u64> {
        self.nodes[0].iter().position(|l| l == leaf).map(|i| i as u64)
    }

    pub fn ivs(&self) -> &IvTable {
        &self.ivs
    }

    pub fn len(&self) -> u64 {
        self.nodes[0].len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].is_empty()
    }
}
