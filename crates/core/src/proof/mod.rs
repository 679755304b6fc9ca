//! zkSNARK proof generation and verification
//!
//! Groth16 over BN254 for the withdrawal circuit.
//!
//! Components:
//! - `gadgets`: R1CS constraint gadgets (bits, SHA-256, MiMC, Merkle)
//! - `mixer_circuit`: The withdrawal circuit
//! - `witness`: Prove requests and their parsed form
//! - `MixerProofSystem`: key generation, proving and verification

pub mod gadgets;
pub mod mixer_circuit;
pub mod witness;

use std::time::Instant;

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::crypto::commitment::LeafScheme;
use crate::crypto::ivs::IvTable;
use crate::crypto::merkle::MixerTree;
use crate::crypto::nullifier::Note;
use crate::error::{MixerError, MixerResult, ProofError};

pub use mixer_circuit::MixerCircuit;
pub use witness::{AddressInput, MixerWitness, ProveRequest, PublicInputs};

/// Serialized Groth16 proof (128 bytes)
/// Format: A (32) || B (64) || C (32), compressed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MixerProof {
    bytes: Vec<u8>,
}

impl MixerProof {
    /// Size of a compressed BN254 Groth16 proof
    pub const SIZE: usize = 128;

    /// Create from raw bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ProofError> {
        if bytes.len() != Self::SIZE {
            return Err(ProofError::SerializationError(format!(
                "Expected {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            )));
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    fn decode(&self) -> Result<Proof<Bn254>, ProofError> {
        Proof::deserialize_compressed(&self.bytes[..]).map_err(|_| ProofError::InvalidProof)
    }
}

/// Groth16 proof system for the withdrawal circuit
pub struct MixerProofSystem {
    ivs: IvTable,
    leaf_scheme: LeafScheme,
    proving_key: ProvingKey<Bn254>,
    verifying_key: VerifyingKey<Bn254>,
    prepared_vk: PreparedVerifyingKey<Bn254>,
}

impl MixerProofSystem {
    /// Generate proving and verifying keys from the circuit shape
    ///
    /// WARNING: This uses a random toxic waste and is suitable only for testing.
    /// For production, use a trusted setup ceremony.
    pub fn setup(ivs: &IvTable) -> MixerResult<Self> {
        Self::setup_with_rng(ivs, LeafScheme::default(), &mut OsRng)
    }

    pub fn setup_with_rng<R: RngCore + CryptoRng>(
        ivs: &IvTable,
        leaf_scheme: LeafScheme,
        rng: &mut R,
    ) -> MixerResult<Self> {
        let started = Instant::now();
        let circuit = MixerCircuit::blank(ivs).with_leaf_scheme(leaf_scheme);

        let (proving_key, verifying_key) = Groth16::<Bn254>::circuit_specific_setup(circuit, rng)
            .map_err(|e| ProofError::SetupFailed(e.to_string()))?;

        let prepared_vk = Groth16::<Bn254>::process_vk(&verifying_key)
            .map_err(|e| ProofError::SetupFailed(e.to_string()))?;

        tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "groth16 setup");
        Ok(Self {
            ivs: ivs.clone(),
            leaf_scheme,
            proving_key,
            verifying_key,
            prepared_vk,
        })
    }

    /// Load from serialized keys
    pub fn from_keys(
        ivs: &IvTable,
        leaf_scheme: LeafScheme,
        pk_bytes: &[u8],
        vk_bytes: &[u8],
    ) -> MixerResult<Self> {
        let proving_key = ProvingKey::deserialize_compressed(pk_bytes)
            .map_err(|_| ProofError::InvalidProvingKey)?;

        let verifying_key = VerifyingKey::deserialize_compressed(vk_bytes)
            .map_err(|_| ProofError::InvalidVerifyingKey)?;

        if verifying_key.gamma_abc_g1.len() != MixerCircuit::NUM_PUBLIC_INPUTS + 1 {
            return Err(ProofError::InvalidVerifyingKey.into());
        }

        let prepared_vk = Groth16::<Bn254>::process_vk(&verifying_key)
            .map_err(|e| ProofError::SetupFailed(e.to_string()))?;

        Ok(Self {
            ivs: ivs.clone(),
            leaf_scheme,
            proving_key,
            verifying_key,
            prepared_vk,
        })
    }

    /// Serialize the proving key
    pub fn serialize_proving_key(&self) -> MixerResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.proving_key
            .serialize_compressed(&mut bytes)
            .map_err(|e| ProofError::SerializationError(e.to_string()))?;
        Ok(bytes)
    }

    /// Serialize the verifying key
    pub fn serialize_verifying_key(&self) -> MixerResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.verifying_key
            .serialize_compressed(&mut bytes)
            .map_err(|e| ProofError::SerializationError(e.to_string()))?;
        Ok(bytes)
    }

    /// Generate a proof for a parsed witness
    ///
    /// The assignment is checked first, so a false claim comes back as
    /// `MixerError::Unsatisfied` and never reaches the prover.
    pub fn prove(&self, witness: MixerWitness) -> MixerResult<MixerProof> {
        self.prove_with_rng(witness, &mut OsRng)
    }

    pub fn prove_with_rng<R: RngCore + CryptoRng>(
        &self,
        witness: MixerWitness,
        rng: &mut R,
    ) -> MixerResult<MixerProof> {
        let circuit = MixerCircuit::new(&self.ivs, witness).with_leaf_scheme(self.leaf_scheme);
        circuit.check_satisfied()?;

        let started = Instant::now();
        let proof = Groth16::<Bn254>::prove(&self.proving_key, circuit, rng)
            .map_err(|e| ProofError::GenerationFailed(e.to_string()))?;
        tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "groth16 prove");

        let mut bytes = Vec::with_capacity(MixerProof::SIZE);
        proof
            .serialize_compressed(&mut bytes)
            .map_err(|e| ProofError::SerializationError(e.to_string()))?;

        Ok(MixerProof::from_bytes(bytes)?)
    }

    /// Parse, validate and prove a JSON request
    pub fn prove_request(&self, request_json: &str) -> MixerResult<MixerProof> {
        let witness = ProveRequest::from_json(request_json)?.parse()?;
        self.prove(witness)
    }

    /// Verify a proof against `(root, wallet_address, nullifier)`
    pub fn verify(&self, proof: &MixerProof, public: &PublicInputs) -> MixerResult<bool> {
        let proof = proof.decode()?;
        let inputs: Vec<Fr> = public.to_vec();

        let started = Instant::now();
        let valid = Groth16::<Bn254>::verify_with_processed_vk(&self.prepared_vk, &inputs, &proof)
            .map_err(|e| ProofError::VerificationFailed(e.to_string()))?;
        tracing::debug!(
            valid,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "groth16 verify"
        );

        Ok(valid)
    }

    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.verifying_key
    }

    pub fn leaf_scheme(&self) -> LeafScheme {
        self.leaf_scheme
    }
}

/// Verify with nothing but a serialized verifying key
pub fn verify_with_key(
    vk_bytes: &[u8],
    proof: &MixerProof,
    public: &PublicInputs,
) -> MixerResult<bool> {
    let verifying_key = VerifyingKey::<Bn254>::deserialize_compressed(vk_bytes)
        .map_err(|_| ProofError::InvalidVerifyingKey)?;
    if verifying_key.gamma_abc_g1.len() != MixerCircuit::NUM_PUBLIC_INPUTS + 1 {
        return Err(ProofError::InvalidVerifyingKey.into());
    }

    let proof = proof.decode()?;
    let valid = Groth16::<Bn254>::verify(&verifying_key, &public.to_vec(), &proof)
        .map_err(|e| ProofError::VerificationFailed(e.to_string()))?;
    Ok(valid)
}

/// Setup, prove and verify one withdrawal entirely in memory
///
/// Proves a fresh deposit, verifies it, reloads both keys from their
/// serialized form and proves and verifies again.
pub fn self_test(ivs: &IvTable) -> MixerResult<()> {
    let system = MixerProofSystem::setup(ivs)?;

    let mut tree = MixerTree::new(ivs);
    let note = Note::new_random(Fr::from(0x5e1f_7e57u64));
    let index = tree.append(*note.leaf().as_field())?;
    let path = tree.proof(index)?;

    let public = PublicInputs {
        root: tree.root(),
        wallet_address: note.wallet_address,
        nullifier: *note.nullifier(ivs).as_field(),
    };
    let request = ProveRequest::from_parts(&public, &note.secret, &path);
    let request_json = request.to_json()?;

    let proof = system.prove_request(&request_json)?;
    if !system.verify(&proof, &public)? {
        return Err(rejected("in-memory proof"));
    }

    let reloaded = MixerProofSystem::from_keys(
        ivs,
        system.leaf_scheme(),
        &system.serialize_proving_key()?,
        &system.serialize_verifying_key()?,
    )?;
    if !reloaded.verify(&proof, &public)? {
        return Err(rejected("reloaded verifying key, in-memory proof"));
    }

    let second = reloaded.prove_request(&request_json)?;
    if !reloaded.verify(&second, &public)? {
        return Err(rejected("reloaded proving key"));
    }

    tracing::info!("self test passed");
    Ok(())
}

/// A satisfied claim whose proof the backend refused
fn rejected(stage: &str) -> MixerError {
    ProofError::VerificationFailed(format!("{} rejected", stage)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proof_size_checked() {
        assert!(MixerProof::from_bytes(vec![0u8; MixerProof::SIZE]).is_ok());
        assert!(MixerProof::from_bytes(vec![0u8; 256]).is_err());
    }

    #[test]
    fn test_garbage_proof_rejected() {
        let proof = MixerProof::from_bytes(vec![0xffu8; MixerProof::SIZE]).unwrap();
        assert!(matches!(proof.decode(), Err(ProofError::InvalidProof)));
    }

    #[test]
    fn test_backend_rejection_is_backend_error() {
        assert!(matches!(
            rejected("in-memory proof"),
            MixerError::Backend(ProofError::VerificationFailed(_))
        ));
    }

    #[test]
    fn test_garbage_keys_rejected() {
        let result = MixerProofSystem::from_keys(
            IvTable::shared(),
            LeafScheme::default(),
            &[1, 2, 3],
            &[4, 5, 6],
        );
        assert!(matches!(
            result,
            Err(MixerError::Backend(ProofError::InvalidProvingKey))
        ));
    }
}
