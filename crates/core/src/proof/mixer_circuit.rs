//! Mixer Withdrawal Circuit
//!
//! This circuit proves that a withdrawal is valid:
//! 1. The prover knows a secret whose leaf, committed together with the
//!    public wallet address, sits in the Merkle tree under `root`
//! 2. The public nullifier is the round hash of that secret
//!
//! Public Inputs:
//! - root: The Merkle tree root being proven against
//! - wallet_address: The address the withdrawal pays out to
//! - nullifier: Marks the deposit as spent
//!
//! Private Inputs (Witness):
//! - nullifier_secret: The deposit secret
//! - directions: One bit per level, level 0 first (true = right child)
//! - siblings: The sibling hashes in the Merkle path

use ark_bn254::Fr;
use ark_r1cs_std::{alloc::AllocVar, eq::EqGadget, fields::fp::FpVar};
use ark_relations::{
    ns,
    r1cs::{ConstraintSynthesizer, ConstraintSystem, ConstraintSystemRef, SynthesisError},
};

use super::gadgets::merkle::MerklePathAuthenticator;
use super::gadgets::mimc::round_hash_gadget;
use super::gadgets::sha256::sha256_commitment_gadget;
use super::witness::MixerWitness;
use crate::crypto::commitment::LeafScheme;
use crate::crypto::ivs::{IvTable, TREE_DEPTH};
use crate::error::{InputError, MixerError, MixerResult, ProofError};

/// Withdrawal circuit
#[derive(Clone)]
pub struct MixerCircuit<'a> {
    ivs: &'a IvTable,
    leaf_scheme: LeafScheme,

    // ===== Public Inputs =====
    pub root: Option<Fr>,
    pub wallet_address: Option<Fr>,
    pub nullifier: Option<Fr>,

    // ===== Private Inputs (Witness) =====
    pub nullifier_secret: Option<Fr>,
    pub directions: Option<Vec<bool>>,
    pub siblings: Option<Vec<Fr>>,
}

impl<'a> MixerCircuit<'a> {
    /// Number of public inputs
    pub const NUM_PUBLIC_INPUTS: usize = 3; // root, wallet_address, nullifier

    /// Unassigned circuit, used for key generation
    pub fn blank(ivs: &'a IvTable) -> Self {
        Self {
            ivs,
            leaf_scheme: LeafScheme::default(),
            root: None,
            wallet_address: None,
            nullifier: None,
            nullifier_secret: None,
            directions: None,
            siblings: None,
        }
    }

    /// Fully assigned circuit for one withdrawal
    pub fn new(ivs: &'a IvTable, witness: MixerWitness) -> Self {
        Self {
            ivs,
            leaf_scheme: LeafScheme::default(),
            root: Some(witness.public.root),
            wallet_address: Some(witness.public.wallet_address),
            nullifier: Some(witness.public.nullifier),
            nullifier_secret: Some(witness.nullifier_secret),
            directions: Some(witness.directions),
            siblings: Some(witness.siblings),
        }
    }

    /// Switch the leaf derivation
    ///
    /// Keys are shape-specific, so a prover and its keys must agree on this.
    pub fn with_leaf_scheme(mut self, leaf_scheme: LeafScheme) -> Self {
        self.leaf_scheme = leaf_scheme;
        self
    }

    pub fn leaf_scheme(&self) -> LeafScheme {
        self.leaf_scheme
    }

    /// Synthesize into a fresh constraint system and check every row
    ///
    /// Returns the constraint count when satisfied. A path of the wrong
    /// length is `MixerError::InvalidInput`; a false claim is
    /// `MixerError::Unsatisfied` naming the first failing row.
    pub fn check_satisfied(&self) -> MixerResult<usize> {
        self.check_path_shape()?;

        let cs = ConstraintSystem::<Fr>::new_ref();
        self.clone()
            .generate_constraints(cs.clone())
            .map_err(|e| match e {
                SynthesisError::Unsatisfiable => MixerError::Unsatisfied {
                    constraint: "witness assignment".to_string(),
                },
                other => ProofError::Synthesis(other.to_string()).into(),
            })?;

        let num_constraints = cs.num_constraints();
        tracing::info!(num_constraints, "mixer circuit synthesized");

        let satisfied = cs
            .is_satisfied()
            .map_err(|e| ProofError::Synthesis(e.to_string()))?;
        if satisfied {
            return Ok(num_constraints);
        }

        let constraint = cs
            .which_is_unsatisfied()
            .map_err(|e| ProofError::Synthesis(e.to_string()))?
            .unwrap_or_else(|| "unknown".to_string());
        tracing::warn!(%constraint, "mixer circuit not satisfied");
        Err(MixerError::Unsatisfied { constraint })
    }

    /// Reject an assigned path whose length differs from the tree depth
    fn check_path_shape(&self) -> Result<(), InputError> {
        if let Some(directions) = &self.directions {
            if directions.len() != TREE_DEPTH {
                return Err(InputError::DirectionLength {
                    expected: TREE_DEPTH,
                    got: directions.len(),
                });
            }
        }
        if let Some(siblings) = &self.siblings {
            if siblings.len() != TREE_DEPTH {
                return Err(InputError::PathLength {
                    expected: TREE_DEPTH,
                    got: siblings.len(),
                });
            }
        }
        Ok(())
    }
}

impl ConstraintSynthesizer<Fr> for MixerCircuit<'_> {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        // ===== Allocate Public Inputs =====
        let root_var = FpVar::new_input(ns!(cs, "root"), || {
            self.root.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let wallet_address_var = FpVar::new_input(ns!(cs, "wallet_address"), || {
            self.wallet_address.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let nullifier_var = FpVar::new_input(ns!(cs, "nullifier"), || {
            self.nullifier.ok_or(SynthesisError::AssignmentMissing)
        })?;

        // ===== Allocate Private Inputs (Witnesses) =====
        let nullifier_secret_var = FpVar::new_witness(ns!(cs, "nullifier_secret"), || {
            self.nullifier_secret.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let path = {
            let ns = ns!(cs, "path");
            MerklePathAuthenticator::new_witness(
                ns.cs(),
                self.directions.as_deref(),
                self.siblings.as_deref(),
            )?
        };

        // ===== Nullifier hash =====
        // nullifier = H(nullifier_iv, [secret, secret])
        let nullifier_hash = round_hash_gadget(
            cs.clone(),
            self.ivs.nullifier(),
            &nullifier_secret_var,
            &nullifier_secret_var,
        )?;

        // ===== Leaf commitment =====
        let leaf = match self.leaf_scheme {
            LeafScheme::Sha256 => {
                sha256_commitment_gadget(cs.clone(), &nullifier_secret_var, &wallet_address_var)?
            }
            LeafScheme::RoundHash => round_hash_gadget(
                cs.clone(),
                self.ivs.leaf(),
                &nullifier_secret_var,
                &wallet_address_var,
            )?,
        };

        // ===== Merkle membership =====
        {
            let ns = ns!(cs, "authenticator");
            path.verify(ns.cs(), &leaf, &root_var, self.ivs)?;
        }

        // ===== Nullifier binding =====
        nullifier_var.enforce_equal(&nullifier_hash)?;

        Ok(())
    }
}
