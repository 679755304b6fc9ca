//! MiMC round constants and Merkle tree IVs for the BN254 scalar field
//!
//! Round constants follow the keccak chain used by the off-chain wallets and
//! the on-chain contract:
//!
//! - c_0 = keccak256("mimc")
//! - c_{i+1} = keccak256(c_i)  (hashing the 32-byte big-endian encoding)
//!
//! Round `i` uses c_{i+1} reduced into the field. The chain state itself is
//! never reduced.
//!
//! Parameters:
//! - Field: BN254 scalar field (Fr)
//! - Exponent: e = 7
//! - Rounds: 91

use ark_bn254::Fr;
use ark_ff::PrimeField;
use once_cell::sync::Lazy;
use sha3::{Digest, Keccak256};

/// Number of MiMC rounds
pub const MIMC_ROUNDS: usize = 91;

/// S-box exponent (x^7)
pub const MIMC_EXPONENT: u64 = 7;

/// Seed of the round constant chain
pub const MIMC_SEED: &[u8] = b"mimc";

/// Seed of the Merkle level IV chain
pub const MERKLE_IV_SEED: &[u8] = b"mixer.merkle_tree.IV";

static ROUND_CONSTANTS: Lazy<Vec<Fr>> = Lazy::new(|| keccak_chain(MIMC_SEED, MIMC_ROUNDS));

/// Shared, precomputed round constants
pub fn round_constants() -> &'static [Fr] {
    &ROUND_CONSTANTS
}

/// Derive `count` field elements from a keccak256 chain rooted at `seed`
///
/// The first element is keccak256(keccak256(seed)), matching the way the
/// MiMC constants skip the seed itself.
pub fn keccak_chain(seed: &[u8], count: usize) -> Vec<Fr> {
    let mut state: [u8; 32] = Keccak256::digest(seed).into();
    let mut out = Vec::with_capacity(count);

    for _ in 0..count {
        state = Keccak256::digest(state).into();
        out.push(Fr::from_be_bytes_mod_order(&state));
    }

    out
}
