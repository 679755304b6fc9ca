//! Field element encodings shared by the native hashes and the witness parser
//!
//! Scalars cross the API boundary as decimal strings and enter SHA-256 as
//! 32-byte big-endian words.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use once_cell::sync::Lazy;

static MODULUS: Lazy<BigUint> = Lazy::new(|| BigUint::from_bytes_be(&Fr::MODULUS.to_bytes_be()));

/// Big-endian 32-byte encoding of a field element
pub fn field_to_be_bytes(value: &Fr) -> [u8; 32] {
    let bytes = value.into_bigint().to_bytes_be();
    let mut result = [0u8; 32];
    result[32 - bytes.len()..].copy_from_slice(&bytes);
    result
}

/// Canonical decimal representation
pub fn field_to_decimal(value: &Fr) -> String {
    BigUint::from_bytes_be(&field_to_be_bytes(value)).to_str_radix(10)
}

/// Big-endian hex, no prefix
pub fn field_to_hex(value: &Fr) -> String {
    hex::encode(field_to_be_bytes(value))
}

/// Parse a decimal string into a field element
///
/// Only ASCII digits are accepted and the value must be below the field
/// modulus; nothing is silently reduced.
pub fn parse_field_decimal(s: &str) -> Option<Fr> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let n = BigUint::parse_bytes(s.as_bytes(), 10)?;
    if n >= *MODULUS {
        return None;
    }

    Some(Fr::from_be_bytes_mod_order(&n.to_bytes_be()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODULUS_DEC: &str =
        "21888242871839275222246405745257275088548364400416034343698204186575808495617";

    #[test]
    fn test_decimal_roundtrip() {
        for s in ["0", "1", "742769056376932917098136869028921629509414507844"] {
            let f = parse_field_decimal(s).unwrap();
            assert_eq!(field_to_decimal(&f), s);
        }
    }

    #[test]
    fn test_reject_modulus_and_above() {
        assert!(parse_field_decimal(MODULUS_DEC).is_none());

        let below = "21888242871839275222246405745257275088548364400416034343698204186575808495616";
        assert_eq!(parse_field_decimal(below), Some(-Fr::from(1u64)));
    }

    #[test]
    fn test_reject_non_digits() {
        assert!(parse_field_decimal("").is_none());
        assert!(parse_field_decimal("-1").is_none());
        assert!(parse_field_decimal("0x10").is_none());
        assert!(parse_field_decimal("1_000").is_none());
        assert!(parse_field_decimal(" 5").is_none());
    }

    #[test]
    fn test_be_bytes() {
        let bytes = field_to_be_bytes(&Fr::from(0x0102u64));
        assert_eq!(bytes[30], 0x01);
        assert_eq!(bytes[31], 0x02);
        assert!(bytes[..30].iter().all(|&b| b == 0));
        assert_eq!(field_to_hex(&Fr::from(1u64)), format!("{}01", "0".repeat(62)));
    }
}
