//! Unified Error Types for the mixer
//!
//! Three failure classes reach callers:
//! - malformed requests, rejected before any circuit is built
//! - well-formed but false claims, reported with the failing constraint
//! - failures inside the Groth16 backend, passed through

use thiserror::Error;

use crate::crypto::merkle::MerkleError;

/// Top-level error type for the mixer
#[derive(Error, Debug)]
pub enum MixerError {
    /// Request has the wrong shape
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// Request is well-formed but the claim it makes is false
    #[error("Constraint not satisfied: {constraint}")]
    Unsatisfied { constraint: String },

    /// Setup, proving, verification or key (de)serialization failed
    #[error("Proof backend error: {0}")]
    Backend(#[from] ProofError),

    /// Native tree operation failed
    #[error("Merkle tree error: {0}")]
    Merkle(#[from] MerkleError),
}

/// Result type alias for mixer operations
pub type MixerResult<T> = Result<T, MixerError>;

/// Request shape errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Direction string must have {expected} characters, got {got}")]
    DirectionLength { expected: usize, got: usize },

    #[error("Invalid direction character {found:?} at position {position}")]
    InvalidDirectionBit { position: usize, found: char },

    #[error("Path must have {expected} siblings, got {got}")]
    PathLength { expected: usize, got: usize },

    #[error("Missing path element at level {0}")]
    MissingPathElement(usize),

    #[error("{name} is not a canonical field element: {value:?}")]
    InvalidScalar { name: String, value: String },

    #[error("Leaf index {0} is outside the tree")]
    IndexOutOfRange(u64),

    #[error("Malformed request JSON: {0}")]
    Json(String),
}

/// Errors from the proof backend
#[derive(Error, Debug)]
pub enum ProofError {
    #[error("Setup failed: {0}")]
    SetupFailed(String),

    #[error("Proof generation failed: {0}")]
    GenerationFailed(String),

    #[error("Proof verification failed: {0}")]
    VerificationFailed(String),

    #[error("Invalid proving key")]
    InvalidProvingKey,

    #[error("Invalid verifying key")]
    InvalidVerifyingKey,

    #[error("Invalid proof encoding")]
    InvalidProof,

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Circuit synthesis failed: {0}")]
    Synthesis(String),
}

/// Input validation utilities
///
/// Everything here runs before synthesis; a request that passes has exactly
/// one sibling and one direction bit per level and only canonical scalars.
pub mod validation {
    use ark_bn254::Fr;

    use super::InputError;
    use crate::crypto::encoding::parse_field_decimal;
    use crate::crypto::ivs::{MAX_LEAVES, TREE_DEPTH};
    use crate::crypto::merkle::directions_from_index;

    /// Parse a `'0'`/`'1'` string of exactly `TREE_DEPTH` characters, level 0 first
    pub fn parse_direction_bits(bits: &str) -> Result<Vec<bool>, InputError> {
        let got = bits.chars().count();
        if got != TREE_DEPTH {
            return Err(InputError::DirectionLength {
                expected: TREE_DEPTH,
                got,
            });
        }

        bits.chars()
            .enumerate()
            .map(|(position, c)| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                found => Err(InputError::InvalidDirectionBit { position, found }),
            })
            .collect()
    }

    /// Direction bits of a leaf index
    pub fn directions_for_index(index: u64) -> Result<Vec<bool>, InputError> {
        if index >= MAX_LEAVES {
            return Err(InputError::IndexOutOfRange(index));
        }
        Ok(directions_from_index(index))
    }

    /// Parse a decimal scalar, naming it in the error
    pub fn parse_field(name: &str, value: &str) -> Result<Fr, InputError> {
        parse_field_decimal(value).ok_or_else(|| InputError::InvalidScalar {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    /// Check the sibling list and parse every element
    pub fn validate_path(path: &[Option<String>]) -> Result<Vec<Fr>, InputError> {
        if path.len() != TREE_DEPTH {
            return Err(InputError::PathLength {
                expected: TREE_DEPTH,
                got: path.len(),
            });
        }

        path.iter()
            .enumerate()
            .map(|(level, element)| match element {
                Some(value) => parse_field(&format!("path[{}]", level), value),
                None => Err(InputError::MissingPathElement(level)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ivs::TREE_DEPTH;
    use ark_bn254::Fr;
    use validation::*;

    #[test]
    fn test_parse_direction_bits() {
        let bits = format!("1{}", "0".repeat(TREE_DEPTH - 1));
        let parsed = parse_direction_bits(&bits).unwrap();
        assert_eq!(parsed.len(), TREE_DEPTH);
        assert!(parsed[0]);
        assert!(parsed[1..].iter().all(|b| !b));
    }

    #[test]
    fn test_direction_length_rejected() {
        assert_eq!(
            parse_direction_bits(&"0".repeat(28)),
            Err(InputError::DirectionLength {
                expected: TREE_DEPTH,
                got: 28
            })
        );
        assert!(parse_direction_bits(&"0".repeat(30)).is_err());
        assert!(parse_direction_bits("").is_err());
    }

    #[test]
    fn test_direction_characters_rejected() {
        let bits = format!("01x{}", "0".repeat(TREE_DEPTH - 3));
        assert_eq!(
            parse_direction_bits(&bits),
            Err(InputError::InvalidDirectionBit {
                position: 2,
                found: 'x'
            })
        );

        let bits = format!("2{}", "0".repeat(TREE_DEPTH - 1));
        assert!(parse_direction_bits(&bits).is_err());
    }

    #[test]
    fn test_directions_for_index() {
        assert_eq!(directions_for_index(3).unwrap()[..3], [true, true, false]);
        assert_eq!(
            directions_for_index(1 << TREE_DEPTH),
            Err(InputError::IndexOutOfRange(1 << TREE_DEPTH))
        );
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field("root", "42").unwrap(), Fr::from(42u64));
        assert!(matches!(
            parse_field("root", "abc"),
            Err(InputError::InvalidScalar { .. })
        ));
    }

    #[test]
    fn test_validate_path() {
        let path: Vec<Option<String>> = (0..TREE_DEPTH).map(|i| Some(i.to_string())).collect();
        let parsed = validate_path(&path).unwrap();
        assert_eq!(parsed[5], Fr::from(5u64));

        assert_eq!(
            validate_path(&path[..TREE_DEPTH - 1]),
            Err(InputError::PathLength {
                expected: TREE_DEPTH,
                got: TREE_DEPTH - 1
            })
        );

        let mut missing = path.clone();
        missing[7] = None;
        assert_eq!(
            validate_path(&missing),
            Err(InputError::MissingPathElement(7))
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: MixerError = InputError::MissingPathElement(0).into();
        assert!(matches!(err, MixerError::InvalidInput(_)));
        assert!(err.to_string().contains("level 0"));
    }
}
