//! SHA-256 leaf commitment gadget
//!
//! Proves `out = sha256(be32(left) || be32(right))` with the top four digest
//! bits dropped, the in-circuit twin of `crypto::commitment::leaf_commitment`.
//!
//! Constraint layout, in construction order:
//! 1. `left` unpacked to 256 bits, MSB-first
//! 2. `right` unpacked to 256 bits, MSB-first
//! 3. the 512-bit message hashed as 64 big-endian bytes (two compression blocks
//!    once padding is added)
//! 4. the digest read MSB-first and its low 252 bits packed into `out`

use ark_bn254::Fr;
use ark_crypto_primitives::crh::sha256::constraints::Sha256Gadget;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::{
    ns,
    r1cs::{ConstraintSystemRef, SynthesisError},
};

use super::bits::{pack, unpack, BitArray, BitOrder};
use crate::crypto::commitment::DIGEST_DROPPED_BITS;

/// Width of each hashed word
pub const WORD_BITS: usize = 256;

/// SHA-256 commitment over two field variables
pub struct Sha256CommitmentGadget {
    pub left_bits: BitArray,
    pub right_bits: BitArray,
    pub digest_bits: BitArray,
    output: FpVar<Fr>,
}

impl Sha256CommitmentGadget {
    pub fn new(
        cs: ConstraintSystemRef<Fr>,
        left: &FpVar<Fr>,
        right: &FpVar<Fr>,
    ) -> Result<Self, SynthesisError> {
        let ns = ns!(cs, "unpack_left");
        let left_bits = unpack(ns.cs(), left, WORD_BITS, BitOrder::MsbFirst)?;
        drop(ns);

        let ns = ns!(cs, "unpack_right");
        let right_bits = unpack(ns.cs(), right, WORD_BITS, BitOrder::MsbFirst)?;
        drop(ns);

        let ns = ns!(cs, "sha256");
        let message = left_bits.concat(&right_bits).to_bytes_be()?;
        let digest = Sha256Gadget::<Fr>::digest(&message)?;
        let digest_bits = BitArray::from_bytes_be(&digest.0)?;
        drop(ns);

        let ns = ns!(cs, "pack_digest");
        let output = pack(ns.cs(), &digest_bits, DIGEST_DROPPED_BITS)?;
        drop(ns);

        Ok(Self {
            left_bits,
            right_bits,
            digest_bits,
            output,
        })
    }

    /// The truncated digest as a field variable
    pub fn result(&self) -> &FpVar<Fr> {
        &self.output
    }
}

/// Commit to `(left, right)` and return the packed digest
pub fn sha256_commitment_gadget(
    cs: ConstraintSystemRef<Fr>,
    left: &FpVar<Fr>,
    right: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let ns = ns!(cs, "sha256_commitment");
    let gadget = Sha256CommitmentGadget::new(ns.cs(), left, right)?;
    Ok(gadget.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_r1cs_std::{alloc::AllocVar, R1CSVar};
    use ark_relations::r1cs::ConstraintSystem;

    use crate::crypto::commitment::leaf_commitment;

    fn commit_in_circuit(secret: Fr, wallet: Fr) -> (ConstraintSystemRef<Fr>, Fr) {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let s = FpVar::new_witness(cs.clone(), || Ok(secret)).unwrap();
        let w = FpVar::new_witness(cs.clone(), || Ok(wallet)).unwrap();

        let out = sha256_commitment_gadget(cs.clone(), &s, &w).unwrap();
        let value = out.value().unwrap();
        (cs, value)
    }

    #[test]
    fn test_gadget_matches_native() {
        let secret = Fr::from(3u64);
        let wallet = Fr::from(5u64);

        let (cs, value) = commit_in_circuit(secret, wallet);
        assert_eq!(value, leaf_commitment(&secret, &wallet));
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_gadget_matches_native_large_values() {
        let secret = -Fr::from(1u64);
        let wallet = Fr::from(u64::MAX);

        let (cs, value) = commit_in_circuit(secret, wallet);
        assert_eq!(value, leaf_commitment(&secret, &wallet));
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_digest_layout() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let s = FpVar::new_witness(cs.clone(), || Ok(Fr::from(1u64))).unwrap();
        let w = FpVar::new_witness(cs.clone(), || Ok(Fr::from(2u64))).unwrap();

        let gadget = Sha256CommitmentGadget::new(cs.clone(), &s, &w).unwrap();
        assert_eq!(gadget.left_bits.len(), WORD_BITS);
        assert_eq!(gadget.right_bits.len(), WORD_BITS);
        assert_eq!(gadget.digest_bits.len(), 256);

        // lowest bit of be32(1) is the last MSB-first bit
        let left = gadget.left_bits.value().unwrap();
        assert!(left[WORD_BITS - 1]);
        assert!(left[..WORD_BITS - 1].iter().all(|b| !b));

        println!("SHA-256 commitment constraints: {}", cs.num_constraints());
        assert!(cs.is_satisfied().unwrap());
    }
}
