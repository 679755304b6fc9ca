//! Nullifier derivation for double-spend prevention
//!
//! nullifier = H(nullifier_iv, [secret, secret])
//!
//! The nullifier depends only on the secret, so a deposit can be withdrawn
//! once no matter which path or root the withdrawal proves against. The
//! contract records spent nullifiers.

use ark_bn254::Fr;
use ark_ff::UniformRand;
use rand::rngs::OsRng;

use super::commitment::{LeafCommitment, LeafScheme};
use super::encoding::{field_to_decimal, field_to_hex};
use super::ivs::IvTable;
use super::mimc::mimc_hash;

/// Nullifier hash of `secret`
pub fn nullifier_hash(secret: &Fr, ivs: &IvTable) -> Fr {
    mimc_hash(&ivs.nullifier(), &[*secret, *secret])
}

/// A published nullifier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nullifier {
    value: Fr,
}

impl Nullifier {
    /// Derive the nullifier of a deposit secret
    pub fn from_secret(secret: &Fr, ivs: &IvTable) -> Self {
        Self {
            value: nullifier_hash(secret, ivs),
        }
    }

    pub fn from_field(value: Fr) -> Self {
        Self { value }
    }

    pub fn as_field(&self) -> &Fr {
        &self.value
    }

    pub fn to_hex(&self) -> String {
        field_to_hex(&self.value)
    }

    pub fn to_decimal(&self) -> String {
        field_to_decimal(&self.value)
    }
}

/// Everything a depositor keeps to withdraw later
#[derive(Clone, Debug)]
pub struct Note {
    /// Deposit secret
    pub secret: Fr,
    /// Wallet the withdrawal pays out to
    pub wallet_address: Fr,
    /// Leaf position in the tree (set after insertion)
    pub leaf_index: Option<u64>,
}

impl Note {
    /// Create a note with a fresh random secret
    pub fn new_random(wallet_address: Fr) -> Self {
        Self::new(Fr::rand(&mut OsRng), wallet_address)
    }

    pub fn new(secret: Fr, wallet_address: Fr) -> Self {
        Self {
            secret,
            wallet_address,
            leaf_index: None,
        }
    }

    /// Set the leaf index after the note is inserted into the tree
    pub fn set_leaf_index(&mut self, index: u64) {
        self.leaf_index = Some(index);
    }

    /// Leaf value under the default SHA-256 scheme
    pub fn leaf(&self) -> LeafCommitment {
        LeafCommitment::new(&self.secret, &self.wallet_address)
    }

    /// Leaf value under an explicit scheme
    pub fn leaf_with_scheme(&self, scheme: LeafScheme, ivs: &IvTable) -> LeafCommitment {
        LeafCommitment::with_scheme(scheme, &self.secret, &self.wallet_address, ivs)
    }

    pub fn nullifier(&self, ivs: &IvTable) -> Nullifier {
        Nullifier::from_secret(&self.secret, ivs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::encoding::parse_field_decimal;

    #[test]
    fn test_nullifier_known_answer() {
        let ivs = IvTable::new();
        let n = Nullifier::from_secret(&Fr::from(3u64), &ivs);
        assert_eq!(
            n.to_decimal(),
            "19951281197568815973141224466689499954609597655336546694128457972404895686405"
        );
    }

    #[test]
    fn test_nullifier_deterministic() {
        let ivs = IvTable::new();
        let secret = Fr::from(42u64);

        assert_eq!(
            Nullifier::from_secret(&secret, &ivs),
            Nullifier::from_secret(&secret, &ivs)
        );
    }

    #[test]
    fn test_nullifier_unique_per_secret() {
        let ivs = IvTable::new();
        let n1 = Nullifier::from_secret(&Fr::from(1u64), &ivs);
        let n2 = Nullifier::from_secret(&Fr::from(2u64), &ivs);
        assert_ne!(n1, n2);
    }

    #[test]
    fn test_nullifier_text_encodings() {
        let ivs = IvTable::new();
        let nullifier = Nullifier::from_secret(&Fr::from(99u64), &ivs);

        assert_eq!(nullifier.to_hex().len(), 64);
        let parsed = parse_field_decimal(&nullifier.to_decimal()).unwrap();
        assert_eq!(Nullifier::from_field(parsed), nullifier);
    }

    #[test]
    fn test_note_independent_of_position() {
        let ivs = IvTable::new();
        let mut note = Note::new_random(Fr::from(1234u64));
        let before = note.nullifier(&ivs);

        note.set_leaf_index(17);
        assert_eq!(note.nullifier(&ivs), before);
        assert_eq!(note.leaf_index, Some(17));
    }

    #[test]
    fn test_note_leaf_matches_commitment() {
        let note = Note::new(Fr::from(3u64), Fr::from(5u64));
        assert_eq!(note.leaf(), LeafCommitment::new(&Fr::from(3u64), &Fr::from(5u64)));
        assert_ne!(*note.leaf().as_field(), *note.nullifier(&IvTable::new()).as_field());
    }
}
