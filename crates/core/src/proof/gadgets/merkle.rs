//! Merkle Path Verification Gadget for R1CS circuits
//!
//! Folds a leaf up a depth-29 path with the per-level round hash and forces
//! the result to equal the public root. Every level is always evaluated.

use ark_bn254::Fr;
use ark_r1cs_std::{alloc::AllocVar, boolean::Boolean, fields::fp::FpVar, prelude::*};
use ark_relations::{
    ns,
    r1cs::{ConstraintSystemRef, SynthesisError},
};

use super::mimc::round_hash_gadget;
use crate::crypto::ivs::{IvTable, TREE_DEPTH};

/// Orders `(input, sibling)` into `(left, right)` by a direction bit
///
/// direction = 0 gives `(input, sibling)`, direction = 1 gives
/// `(sibling, input)`. Four product rows and two sum rows.
pub struct MerklePathSelector {
    pub left: FpVar<Fr>,
    pub right: FpVar<Fr>,
}

impl MerklePathSelector {
    pub fn new(
        cs: ConstraintSystemRef<Fr>,
        input: &FpVar<Fr>,
        sibling: &FpVar<Fr>,
        is_right: &Boolean<Fr>,
    ) -> Result<Self, SynthesisError> {
        let d = FpVar::from(is_right.clone());
        let not_d = FpVar::one() - &d;

        let left_a = product_witness(cs.clone(), &not_d, input)?;
        let left_b = product_witness(cs.clone(), &d, sibling)?;
        let right_a = product_witness(cs.clone(), &d, input)?;
        let right_b = product_witness(cs.clone(), &not_d, sibling)?;

        let left = FpVar::new_witness(ns!(cs, "left"), || Ok(left_a.value()? + left_b.value()?))?;
        let right =
            FpVar::new_witness(ns!(cs, "right"), || Ok(right_a.value()? + right_b.value()?))?;

        (&left_a + &left_b).enforce_equal(&left)?;
        (&right_a + &right_b).enforce_equal(&right)?;

        Ok(Self { left, right })
    }
}

/// Allocate `a * b` as a witness and add its product row
fn product_witness(
    cs: ConstraintSystemRef<Fr>,
    a: &FpVar<Fr>,
    b: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let out = FpVar::new_witness(ns!(cs, "product"), || Ok(a.value()? * b.value()?))?;
    a.mul_equals(b, &out)?;
    Ok(out)
}

/// Merkle path authenticator for circuit-based verification
pub struct MerklePathAuthenticator {
    /// Path directions, level 0 first (false = left, true = right)
    pub directions: Vec<Boolean<Fr>>,
    /// Sibling hashes along the path
    pub siblings: Vec<FpVar<Fr>>,
}

impl MerklePathAuthenticator {
    /// Allocate a full-depth path as witnesses
    ///
    /// `None` allocates unassigned variables (key generation). Directions are
    /// allocated before siblings.
    pub fn new_witness(
        cs: ConstraintSystemRef<Fr>,
        directions: Option<&[bool]>,
        siblings: Option<&[Fr]>,
    ) -> Result<Self, SynthesisError> {
        for len in [directions.map(<[bool]>::len), siblings.map(<[Fr]>::len)]
            .into_iter()
            .flatten()
        {
            if len != TREE_DEPTH {
                return Err(SynthesisError::Unsatisfiable);
            }
        }

        let directions = (0..TREE_DEPTH)
            .map(|i| {
                Boolean::new_witness(ns!(cs, "direction"), || {
                    directions
                        .map(|d| d[i])
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let siblings = (0..TREE_DEPTH)
            .map(|i| {
                FpVar::new_witness(ns!(cs, "sibling"), || {
                    siblings
                        .map(|s| s[i])
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            directions,
            siblings,
        })
    }

    /// Compute the Merkle root from the leaf and path
    pub fn compute_root(
        &self,
        cs: ConstraintSystemRef<Fr>,
        leaf: &FpVar<Fr>,
        ivs: &IvTable,
    ) -> Result<FpVar<Fr>, SynthesisError> {
        let mut current = leaf.clone();

        for ((sibling, is_right), iv) in self
            .siblings
            .iter()
            .zip(&self.directions)
            .zip(ivs.levels())
        {
            let level = ns!(cs, "level");
            let selector = MerklePathSelector::new(level.cs(), &current, sibling, is_right)?;
            current = round_hash_gadget(level.cs(), *iv, &selector.left, &selector.right)?;
        }

        Ok(current)
    }

    /// Enforce that the path leads from `leaf` to `expected_root`
    pub fn verify(
        &self,
        cs: ConstraintSystemRef<Fr>,
        leaf: &FpVar<Fr>,
        expected_root: &FpVar<Fr>,
        ivs: &IvTable,
    ) -> Result<(), SynthesisError> {
        let computed_root = self.compute_root(cs, leaf, ivs)?;
        computed_root.enforce_equal(expected_root)?;
        Ok(())
    }
}

/// Verify a Merkle path in a circuit
///
/// Allocates the path, folds the leaf up and enforces the expected root.
pub fn verify_merkle_path_gadget(
    cs: ConstraintSystemRef<Fr>,
    leaf: &FpVar<Fr>,
    directions: &[bool],
    siblings: &[Fr],
    expected_root: &FpVar<Fr>,
    ivs: &IvTable,
) -> Result<(), SynthesisError> {
    let path = MerklePathAuthenticator::new_witness(cs.clone(), Some(directions), Some(siblings))?;
    path.verify(cs, leaf, expected_root, ivs)
}
