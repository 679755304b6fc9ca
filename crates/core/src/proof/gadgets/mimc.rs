//! MiMC Round Hash Gadget for R1CS circuits
//!
//! In-circuit version of `crypto::mimc`. Each round costs four
//! multiplications (x^2, x^4, x^6, x^7); round constants and the IV are
//! circuit constants.

use ark_bn254::Fr;
use ark_r1cs_std::{fields::fp::FpVar, prelude::*};
use ark_relations::{
    ns,
    r1cs::{ConstraintSystemRef, SynthesisError},
};

use crate::crypto::mimc_constants::round_constants;

/// MiMC hash gadget for circuits
pub struct MiMCGadget {
    round_constants: &'static [Fr],
}

impl Default for MiMCGadget {
    fn default() -> Self {
        Self::new()
    }
}

impl MiMCGadget {
    pub fn new() -> Self {
        Self {
            round_constants: round_constants(),
        }
    }

    /// Keyed permutation E_k(x)
    pub fn encrypt(&self, x: &FpVar<Fr>, key: &FpVar<Fr>) -> Result<FpVar<Fr>, SynthesisError> {
        let mut x = x.clone();
        for c in self.round_constants {
            let t = &x + key + *c;
            x = sbox(&t)?;
        }
        Ok(x + key)
    }

    /// Miyaguchi-Preneel compression of `inputs` under `iv`
    pub fn hash(&self, iv: Fr, inputs: &[FpVar<Fr>]) -> Result<FpVar<Fr>, SynthesisError> {
        let mut r = FpVar::constant(iv);
        for x in inputs {
            let e = self.encrypt(x, &r)?;
            r = &r + x + e;
        }
        Ok(r)
    }

    pub fn hash2(
        &self,
        iv: Fr,
        a: &FpVar<Fr>,
        b: &FpVar<Fr>,
    ) -> Result<FpVar<Fr>, SynthesisError> {
        self.hash(iv, &[a.clone(), b.clone()])
    }
}

/// S-box: x^7
fn sbox(x: &FpVar<Fr>) -> Result<FpVar<Fr>, SynthesisError> {
    let x2 = x.square()?;
    let x4 = x2.square()?;
    let x6 = &x4 * &x2;
    Ok(&x6 * x)
}

/// Standalone function to hash two field element variables under `iv`
pub fn round_hash_gadget(
    cs: ConstraintSystemRef<Fr>,
    iv: Fr,
    left: &FpVar<Fr>,
    right: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let _ns = ns!(cs, "round_hash");
    MiMCGadget::new().hash2(iv, left, right)
}
