//! Mixer - Withdrawal Circuit
//!
//! Proves that a withdrawal spends a deposit sitting in a depth-29 Merkle
//! tree, without revealing which one.
//!
//! # Modules
//! - `crypto`: Native primitives (MiMC round hash, SHA-256 leaf commitments, nullifiers, Merkle tree)
//! - `proof`: R1CS gadgets, the withdrawal circuit and Groth16 proving/verification
//! - `error`: Error types and request validation
//!
//! Python bindings are built with the `python` feature.

pub mod crypto;
pub mod error;
pub mod proof;

// Re-export common types
pub use crypto::{IvTable, LeafScheme, MixerTree, Note, TREE_DEPTH};
pub use error::{InputError, MixerError, MixerResult, ProofError};
pub use proof::{
    self_test, verify_with_key, MixerCircuit, MixerProof, MixerProofSystem, MixerWitness,
    ProveRequest, PublicInputs,
};

#[cfg(feature = "python")]
mod python {
    use pyo3::create_exception;
    use pyo3::exceptions::{PyRuntimeError, PyValueError};
    use pyo3::prelude::*;
    use pyo3::types::PyBytes;

    use crate::crypto::{IvTable, LeafScheme, TREE_DEPTH};
    use crate::error::validation::parse_field;
    use crate::error::MixerError;
    use crate::proof::{verify_with_key, MixerProof, MixerProofSystem, PublicInputs};

    create_exception!(_mixer, UnsatisfiedError, PyValueError);

    fn to_py_err(err: MixerError) -> PyErr {
        match err {
            MixerError::InvalidInput(e) => PyValueError::new_err(format!("Invalid input: {}", e)),
            MixerError::Unsatisfied { constraint } => UnsatisfiedError::new_err(constraint),
            other => PyRuntimeError::new_err(other.to_string()),
        }
    }

    /// Depth of the deposit tree
    #[pyfunction]
    fn mixer_tree_depth() -> usize {
        TREE_DEPTH
    }

    /// Generate a fresh `(proving_key, verifying_key)` pair
    ///
    /// Keys come from random toxic waste. Testing only.
    #[pyfunction]
    fn genkeys(py: Python) -> PyResult<(Py<PyBytes>, Py<PyBytes>)> {
        let system = MixerProofSystem::setup(IvTable::shared()).map_err(to_py_err)?;
        let pk = system.serialize_proving_key().map_err(to_py_err)?;
        let vk = system.serialize_verifying_key().map_err(to_py_err)?;

        Ok((PyBytes::new(py, &pk).into(), PyBytes::new(py, &vk).into()))
    }

    /// Generate a withdrawal proof from a JSON request
    ///
    /// # Returns
    /// * Proof bytes (128 bytes)
    #[pyfunction]
    fn prove(
        py: Python,
        proving_key: &[u8],
        verifying_key: &[u8],
        request_json: &str,
    ) -> PyResult<Py<PyBytes>> {
        let system = MixerProofSystem::from_keys(
            IvTable::shared(),
            LeafScheme::default(),
            proving_key,
            verifying_key,
        )
        .map_err(to_py_err)?;

        // Proving releases the GIL; it takes seconds
        let proof = py
            .allow_threads(|| system.prove_request(request_json))
            .map_err(to_py_err)?;

        Ok(PyBytes::new(py, proof.as_bytes()).into())
    }

    /// Verify a withdrawal proof against decimal public inputs
    #[pyfunction]
    fn verify(
        verifying_key: &[u8],
        proof: &[u8],
        root: &str,
        wallet_address: &str,
        nullifier: &str,
    ) -> PyResult<bool> {
        let public = PublicInputs {
            root: parse_field("root", root).map_err(|e| to_py_err(e.into()))?,
            wallet_address: parse_field("wallet_address", wallet_address)
                .map_err(|e| to_py_err(e.into()))?,
            nullifier: parse_field("nullifier", nullifier).map_err(|e| to_py_err(e.into()))?,
        };
        let proof = MixerProof::from_bytes(proof.to_vec()).map_err(|e| to_py_err(e.into()))?;

        verify_with_key(verifying_key, &proof, &public).map_err(to_py_err)
    }

    /// Python module definition
    #[pymodule]
    fn _mixer(py: Python, m: &PyModule) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(mixer_tree_depth, m)?)?;
        m.add_function(wrap_pyfunction!(genkeys, m)?)?;
        m.add_function(wrap_pyfunction!(prove, m)?)?;
        m.add_function(wrap_pyfunction!(verify, m)?)?;
        m.add("UnsatisfiedError", py.get_type::<UnsatisfiedError>())?;

        // Add version
        m.add("__version__", env!("CARGO_PKG_VERSION"))?;

        Ok(())
    }
}
