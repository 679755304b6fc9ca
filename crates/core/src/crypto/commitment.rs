//! Leaf commitment
//!
//! A deposit publishes the leaf
//!
//! ```text
//! L = sha256(be32(secret) || be32(wallet_address)) with the top 4 bits cleared
//! ```
//!
//! read back as a big-endian integer. Clearing four bits keeps the 252-bit
//! result below the BN254 scalar modulus, so no reduction happens.
//!
//! Deployments that never went through the SHA-256 path can select the
//! round-hash scheme instead: `L = H(leaf_iv, [secret, wallet_address])`.

use ark_bn254::Fr;
use ark_ff::PrimeField;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::encoding::{field_to_be_bytes, field_to_decimal, field_to_hex};
use super::ivs::IvTable;
use super::mimc::mimc_hash;

/// Number of most-significant digest bits discarded before packing
pub const DIGEST_DROPPED_BITS: usize = 4;

/// How a leaf is derived from `(secret, wallet_address)`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafScheme {
    /// Truncated SHA-256 over the two 32-byte big-endian words
    #[default]
    Sha256,
    /// Round hash keyed by the leaf IV
    RoundHash,
}

/// SHA-256 leaf commitment for `(secret, wallet_address)`
pub fn leaf_commitment(secret: &Fr, wallet_address: &Fr) -> Fr {
    let mut hasher = Sha256::new();
    hasher.update(field_to_be_bytes(secret));
    hasher.update(field_to_be_bytes(wallet_address));
    let mut digest: [u8; 32] = hasher.finalize().into();

    digest[0] &= 0xff >> DIGEST_DROPPED_BITS;
    Fr::from_be_bytes_mod_order(&digest)
}

/// A leaf value together with the scheme that produced it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeafCommitment {
    value: Fr,
    scheme: LeafScheme,
}

impl LeafCommitment {
    /// Commit with the default SHA-256 scheme
    pub fn new(secret: &Fr, wallet_address: &Fr) -> Self {
        Self {
            value: leaf_commitment(secret, wallet_address),
            scheme: LeafScheme::Sha256,
        }
    }

    /// Commit with an explicit scheme
    pub fn with_scheme(
        scheme: LeafScheme,
        secret: &Fr,
        wallet_address: &Fr,
        ivs: &IvTable,
    ) -> Self {
        let value = match scheme {
            LeafScheme::Sha256 => leaf_commitment(secret, wallet_address),
            LeafScheme::RoundHash => mimc_hash(&ivs.leaf(), &[*secret, *wallet_address]),
        };
        Self { value, scheme }
    }

    pub fn as_field(&self) -> &Fr {
        &self.value
    }

    pub fn scheme(&self) -> LeafScheme {
        self.scheme
    }

    /// Big-endian 32-byte encoding
    pub fn to_bytes(&self) -> [u8; 32] {
        field_to_be_bytes(&self.value)
    }

    pub fn to_hex(&self) -> String {
        field_to_hex(&self.value)
    }

    pub fn to_decimal(&self) -> String {
        field_to_decimal(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_known_answer() {
        // sha256(be32(3) || be32(5)), top nibble cleared
        let leaf = LeafCommitment::new(&Fr::from(3u64), &Fr::from(5u64));
        assert_eq!(
            leaf.to_decimal(),
            "5286323165670118556222033521368066716729879776220722779678460649585020047520"
        );
    }

    #[test]
    fn test_leaf_of_zeroes() {
        // sha256 of 64 zero bytes is f5a5fd42...; clearing the top nibble gives 05a5fd42...
        let leaf = LeafCommitment::new(&Fr::from(0u64), &Fr::from(0u64));
        assert_eq!(
            leaf.to_hex(),
            "05a5fd42d16a20302798ef6ed309979b43003d2320d9f0e8ea9831a92759fb4b"
        );
    }

    #[test]
    fn test_top_bits_always_clear() {
        for i in 0..32u64 {
            let leaf = LeafCommitment::new(&Fr::from(i), &Fr::from(i * 7 + 1));
            assert_eq!(leaf.to_bytes()[0] & 0xf0, 0);
        }
    }

    #[test]
    fn test_argument_order_matters() {
        let a = Fr::from(1u64);
        let b = Fr::from(2u64);
        assert_ne!(leaf_commitment(&a, &b), leaf_commitment(&b, &a));
    }

    #[test]
    fn test_round_hash_scheme() {
        let ivs = IvTable::new();
        let secret = Fr::from(3u64);
        let wallet = Fr::from(5u64);

        let leaf = LeafCommitment::with_scheme(LeafScheme::RoundHash, &secret, &wallet, &ivs);
        assert_eq!(leaf.scheme(), LeafScheme::RoundHash);
        assert_eq!(*leaf.as_field(), mimc_hash(&ivs.leaf(), &[secret, wallet]));
        assert_ne!(*leaf.as_field(), leaf_commitment(&secret, &wallet));
    }

    #[test]
    fn test_scheme_serde_names() {
        assert_eq!(serde_json::to_string(&LeafScheme::Sha256).unwrap(), "\"sha256\"");
        let parsed: LeafScheme = serde_json::from_str("\"round_hash\"").unwrap();
        assert_eq!(parsed, LeafScheme::RoundHash);
    }
}
