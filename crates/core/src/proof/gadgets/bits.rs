//! Bit packing and unpacking gadgets
//!
//! Converts between a single field variable and a fixed-width array of
//! boolean variables. A `BitArray` carries its reading order so that the
//! SHA-256 gadget (which works on big-endian bytes) and the field packers
//! (which weight bits by powers of two) agree on what "bit 0" means.

use ark_bn254::Fr;
use ark_ff::{BigInteger, Field, PrimeField};
use ark_r1cs_std::{
    alloc::AllocVar,
    boolean::Boolean,
    fields::fp::FpVar,
    prelude::*,
    uint8::UInt8,
};
use ark_relations::{
    ns,
    r1cs::{ConstraintSystemRef, SynthesisError},
};

/// Reading order of a bit array
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitOrder {
    /// Element 0 has weight 2^0
    LsbFirst,
    /// Element 0 has weight 2^(n-1)
    MsbFirst,
}

/// Whether `pack_cells` constrains each cell to {0, 1}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bitness {
    Enforce,
    /// Cells are already boolean (e.g. produced by `Boolean` allocation)
    Assume,
}

/// Ordered boolean variables
#[derive(Clone, Debug)]
pub struct BitArray {
    bits: Vec<Boolean<Fr>>,
    order: BitOrder,
}

impl BitArray {
    pub fn new(bits: Vec<Boolean<Fr>>, order: BitOrder) -> Self {
        Self { bits, order }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn order(&self) -> BitOrder {
        self.order
    }

    pub fn bits(&self) -> &[Boolean<Fr>] {
        &self.bits
    }

    /// Same bits re-read in `order`
    pub fn to_order(&self, order: BitOrder) -> BitArray {
        let mut bits = self.bits.clone();
        if order != self.order {
            bits.reverse();
        }
        BitArray { bits, order }
    }

    /// Concatenate two MSB-first arrays, `self` being the more significant part
    pub fn concat(&self, other: &BitArray) -> BitArray {
        let mut bits = self.to_order(BitOrder::MsbFirst).bits;
        bits.extend(other.to_order(BitOrder::MsbFirst).bits);
        BitArray::new(bits, BitOrder::MsbFirst)
    }

    /// Group into big-endian bytes
    ///
    /// The length must be a multiple of 8.
    pub fn to_bytes_be(&self) -> Result<Vec<UInt8<Fr>>, SynthesisError> {
        if self.bits.len() % 8 != 0 {
            return Err(SynthesisError::Unsatisfiable);
        }

        let msb_first = self.to_order(BitOrder::MsbFirst);
        Ok(msb_first
            .bits
            .chunks(8)
            .map(|chunk| {
                let le: Vec<Boolean<Fr>> = chunk.iter().rev().cloned().collect();
                UInt8::from_bits_le(&le)
            })
            .collect())
    }

    /// Read big-endian bytes as an MSB-first array
    pub fn from_bytes_be(bytes: &[UInt8<Fr>]) -> Result<Self, SynthesisError> {
        let mut bits = Vec::with_capacity(bytes.len() * 8);
        for byte in bytes {
            let le = byte.to_bits_le()?;
            bits.extend(le.into_iter().rev());
        }
        Ok(BitArray::new(bits, BitOrder::MsbFirst))
    }

    /// Assigned values, in this array's order
    pub fn value(&self) -> Result<Vec<bool>, SynthesisError> {
        self.bits.iter().map(|b| b.value()).collect()
    }
}

/// Sum of `cells[i] * 2^i`
fn weighted_sum_lsb_first<'a>(cells: impl Iterator<Item = &'a FpVar<Fr>>) -> FpVar<Fr> {
    let mut acc = FpVar::<Fr>::zero();
    let mut coeff = Fr::from(1u64);
    for cell in cells {
        acc += cell * coeff;
        coeff.double_in_place();
    }
    acc
}

/// Decompose `x` into `width` boolean witnesses
///
/// Each bit is allocated as a `Boolean`, which carries its own bitness row,
/// and one more row ties the weighted sum back to `x`. A value wider than
/// `width` gets its low bits assigned and leaves that row unsatisfied.
pub fn unpack(
    cs: ConstraintSystemRef<Fr>,
    x: &FpVar<Fr>,
    width: usize,
    order: BitOrder,
) -> Result<BitArray, SynthesisError> {
    let lsb_values: Option<Vec<bool>> = x.value().ok().map(|v| {
        let mut bits = v.into_bigint().to_bits_le();
        bits.resize(width, false);
        bits
    });

    let mut bits = Vec::with_capacity(width);
    for position in 0..width {
        let lsb_index = match order {
            BitOrder::LsbFirst => position,
            BitOrder::MsbFirst => width - 1 - position,
        };
        let bit = Boolean::new_witness(ns!(cs, "bit"), || {
            lsb_values
                .as_ref()
                .map(|b| b[lsb_index])
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        bits.push(bit);
    }

    let array = BitArray::new(bits, order);
    let cells: Vec<FpVar<Fr>> = array
        .to_order(BitOrder::LsbFirst)
        .bits
        .into_iter()
        .map(FpVar::from)
        .collect();
    weighted_sum_lsb_first(cells.iter()).enforce_equal(x)?;

    Ok(array)
}

/// Pack `bits`, read MSB-first, skipping the `dropped` most significant ones
pub fn pack(
    cs: ConstraintSystemRef<Fr>,
    bits: &BitArray,
    dropped: usize,
) -> Result<FpVar<Fr>, SynthesisError> {
    let cells: Vec<FpVar<Fr>> = bits
        .to_order(BitOrder::MsbFirst)
        .bits
        .into_iter()
        .map(FpVar::from)
        .collect();
    pack_cells(cs, &cells, dropped, Bitness::Assume)
}

/// Pack MSB-first field cells into one new variable
///
/// The result is a fresh witness equal to the weighted sum of
/// `cells[dropped..]`. Its assignment fails with `Unsatisfiable` when a
/// cell does not hold exactly 0 or 1.
pub fn pack_cells(
    cs: ConstraintSystemRef<Fr>,
    cells: &[FpVar<Fr>],
    dropped: usize,
    bitness: Bitness,
) -> Result<FpVar<Fr>, SynthesisError> {
    let kept = cells.get(dropped..).unwrap_or(&[]);

    if bitness == Bitness::Enforce {
        for cell in kept {
            let complement = FpVar::one() - cell;
            cell.mul_equals(&complement, &FpVar::zero())?;
        }
    }

    let packed = FpVar::new_witness(ns!(cs, "packed"), || {
        let mut acc = Fr::from(0u64);
        for cell in kept {
            let v = cell.value()?;
            if v != Fr::from(0u64) && v != Fr::from(1u64) {
                return Err(SynthesisError::Unsatisfiable);
            }
            acc.double_in_place();
            acc += v;
        }
        Ok(acc)
    })?;

    weighted_sum_lsb_first(kept.iter().rev()).enforce_equal(&packed)?;
    Ok(packed)
}
