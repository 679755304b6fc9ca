//! Prove requests and parsed witnesses
//!
//! A request carries every scalar as a decimal string, exactly the way the
//! wallets and the relayer hand them over:
//!
//! ```json
//! {
//!   "root": "...",
//!   "wallet_address": "...",
//!   "nullifier": "...",
//!   "nullifier_secret": "...",
//!   "address": "1000...0",
//!   "path": ["...", "...", ...]
//! }
//! ```
//!
//! `address` is either the direction string (level 0 first) or the leaf
//! index as a JSON number. Parsing validates the whole request before any
//! constraint is built.

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

use crate::crypto::encoding::field_to_decimal;
use crate::crypto::merkle::MerklePath;
use crate::error::validation::{directions_for_index, parse_direction_bits, parse_field, validate_path};
use crate::error::InputError;

/// Leaf position in a request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressInput {
    Index(u64),
    Bits(String),
}

/// Raw withdrawal request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProveRequest {
    pub root: String,
    pub wallet_address: String,
    pub nullifier: String,
    pub nullifier_secret: String,
    pub address: AddressInput,
    pub path: Vec<Option<String>>,
}

impl ProveRequest {
    pub fn from_json(json: &str) -> Result<Self, InputError> {
        serde_json::from_str(json).map_err(|e| InputError::Json(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, InputError> {
        serde_json::to_string(self).map_err(|e| InputError::Json(e.to_string()))
    }

    /// Build a request from native values and a tree path
    pub fn from_parts(public: &PublicInputs, nullifier_secret: &Fr, path: &MerklePath) -> Self {
        Self {
            root: field_to_decimal(&public.root),
            wallet_address: field_to_decimal(&public.wallet_address),
            nullifier: field_to_decimal(&public.nullifier),
            nullifier_secret: field_to_decimal(nullifier_secret),
            address: AddressInput::Bits(path.address_bits()),
            path: path
                .siblings
                .iter()
                .map(|s| Some(field_to_decimal(s)))
                .collect(),
        }
    }

    /// Validate every field and convert to field elements
    pub fn parse(&self) -> Result<MixerWitness, InputError> {
        let directions = match &self.address {
            AddressInput::Bits(bits) => parse_direction_bits(bits)?,
            AddressInput::Index(index) => directions_for_index(*index)?,
        };
        let siblings = validate_path(&self.path)?;

        Ok(MixerWitness {
            public: PublicInputs {
                root: parse_field("root", &self.root)?,
                wallet_address: parse_field("wallet_address", &self.wallet_address)?,
                nullifier: parse_field("nullifier", &self.nullifier)?,
            },
            nullifier_secret: parse_field("nullifier_secret", &self.nullifier_secret)?,
            directions,
            siblings,
        })
    }
}

/// The three public inputs, in circuit order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicInputs {
    pub root: Fr,
    pub wallet_address: Fr,
    pub nullifier: Fr,
}

impl PublicInputs {
    /// `[root, wallet_address, nullifier]`, the order the verifier expects
    pub fn to_vec(&self) -> Vec<Fr> {
        vec![self.root, self.wallet_address, self.nullifier]
    }
}

/// Fully parsed assignment for one withdrawal
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MixerWitness {
    pub public: PublicInputs,
    pub nullifier_secret: Fr,
    /// Level 0 first, true = right child
    pub directions: Vec<bool>,
    pub siblings: Vec<Fr>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ivs::TREE_DEPTH;

    fn sample_json(address: &str) -> String {
        let path: Vec<String> = (0..TREE_DEPTH).map(|i| format!("\"{}\"", i + 10)).collect();
        format!(
            r#"{{"root":"1","wallet_address":"2","nullifier":"3","nullifier_secret":"4","address":{},"path":[{}]}}"#,
            address,
            path.join(",")
        )
    }

    #[test]
    fn test_parse_bits_address() {
        let bits = format!("\"1{}\"", "0".repeat(TREE_DEPTH - 1));
        let witness = ProveRequest::from_json(&sample_json(&bits))
            .unwrap()
            .parse()
            .unwrap();

        assert_eq!(witness.public.root, Fr::from(1u64));
        assert_eq!(witness.public.to_vec()[2], Fr::from(3u64));
        assert_eq!(witness.nullifier_secret, Fr::from(4u64));
        assert!(witness.directions[0]);
        assert_eq!(witness.siblings[TREE_DEPTH - 1], Fr::from(TREE_DEPTH as u64 + 9));
    }

    #[test]
    fn test_parse_index_address() {
        let witness = ProveRequest::from_json(&sample_json("5"))
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(&witness.directions[..3], &[true, false, true]);
    }

    #[test]
    fn test_short_direction_string_rejected() {
        let request = ProveRequest::from_json(&sample_json("\"0101\"")).unwrap();
        assert!(matches!(
            request.parse(),
            Err(InputError::DirectionLength { got: 4, .. })
        ));
    }

    #[test]
    fn test_missing_path_element_rejected() {
        let mut request = ProveRequest::from_json(&sample_json("0")).unwrap();
        request.path[3] = None;
        assert_eq!(request.parse(), Err(InputError::MissingPathElement(3)));

        let json = sample_json("0").replace("\"12\"", "null");
        let request = ProveRequest::from_json(&json).unwrap();
        assert_eq!(request.parse(), Err(InputError::MissingPathElement(2)));
    }

    #[test]
    fn test_bad_scalar_rejected() {
        let mut request = ProveRequest::from_json(&sample_json("0")).unwrap();
        request.wallet_address = "0x12".to_string();
        assert!(matches!(
            request.parse(),
            Err(InputError::InvalidScalar { ref name, .. }) if name == "wallet_address"
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ProveRequest::from_json("{\"root\": 1}"),
            Err(InputError::Json(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let request = ProveRequest::from_json(&sample_json("7")).unwrap();
        let again = ProveRequest::from_json(&request.to_json().unwrap()).unwrap();
        assert_eq!(request, again);
    }
}
