//! Circuit gadgets for the withdrawal proof
//!
//! This module contains constraint system implementations for:
//! - Bit packing and unpacking
//! - SHA-256 leaf commitments
//! - MiMC round hashing
//! - Merkle tree path selection and authentication

pub mod bits;
pub mod merkle;
pub mod mimc;
pub mod sha256;

pub use bits::{pack, pack_cells, unpack, BitArray, BitOrder, Bitness};
pub use merkle::{MerklePathAuthenticator, MerklePathSelector};
pub use mimc::{round_hash_gadget, MiMCGadget};
pub use sha256::{sha256_commitment_gadget, Sha256CommitmentGadget};
