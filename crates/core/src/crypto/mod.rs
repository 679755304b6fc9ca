//! Native (off-circuit) primitives matching the withdrawal circuit

pub mod commitment;
pub mod encoding;
pub mod ivs;
pub mod merkle;
pub mod mimc;
pub mod mimc_constants;
pub mod nullifier;

pub use commitment::{leaf_commitment, LeafCommitment, LeafScheme, DIGEST_DROPPED_BITS};
pub use encoding::{field_to_be_bytes, field_to_decimal, field_to_hex, parse_field_decimal};
pub use ivs::{IvTable, MAX_LEAVES, TREE_DEPTH};
pub use merkle::{
    directions_from_index, index_from_directions, zero_hashes, MerkleError, MerklePath, MixerTree,
};
pub use mimc::{mimc_hash, mimc_hash2, MiMC};
pub use mimc_constants::{MIMC_EXPONENT, MIMC_ROUNDS};
pub use nullifier::{nullifier_hash, Note, Nullifier};
