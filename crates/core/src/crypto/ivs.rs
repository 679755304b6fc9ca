//! Initialization vectors for the round hash
//!
//! One IV per Merkle level, so `H(a, b)` at level 3 is unrelated to `H(a, b)`
//! at level 4, plus the leaf IV (D+1 constants in total) and the nullifier IV.
//! The table is derived once and only ever read afterwards.
//!
//! Levels 0..15 are the fixed IVs deployed trees were built with. Deeper
//! levels continue from a keccak chain seeded with `MERKLE_IV_SEED`.

use ark_bn254::Fr;
use ark_ff::MontFp;
use once_cell::sync::Lazy;

use super::mimc_constants::{keccak_chain, MERKLE_IV_SEED};

/// Merkle tree depth (29 levels = 2^29 leaves)
pub const TREE_DEPTH: usize = 29;

/// Maximum number of leaves
pub const MAX_LEAVES: u64 = 1 << TREE_DEPTH;

/// Level IVs of deployed trees, level 0 first
pub const FIXED_LEVEL_IVS: [Fr; 15] = [
    MontFp!("149674538925118052205057075966660054952481571156186698930522557832224430770"),
    MontFp!("9670701465464311903249220692483401938888498641874948577387207195814981706974"),
    MontFp!("18318710344500308168304415114839554107298291987930233567781901093928276468271"),
    MontFp!("6597209388525824933845812104623007130464197923269180086306970975123437805179"),
    MontFp!("21720956803147356712695575768577036859892220417043839172295094119877855004262"),
    MontFp!("10330261616520855230513677034606076056972336573153777401182178891807369896722"),
    MontFp!("17466547730316258748333298168566143799241073466140136663575045164199607937939"),
    MontFp!("18881017304615283094648494495339883533502299318365959655029893746755475886610"),
    MontFp!("21580915712563378725413940003372103925756594604076607277692074507345076595494"),
    MontFp!("12316305934357579015754723412431647910012873427291630993042374701002287130550"),
    MontFp!("18905410889238873726515380969411495891004493295170115920825550288019118582494"),
    MontFp!("12819107342879320352602391015489840916114959026915005817918724958237245903353"),
    MontFp!("8245796392944118634696709403074300923517437202166861682117022548371601758802"),
    MontFp!("16953062784314687781686527153155644849196472783922227794465158787843281909585"),
    MontFp!("19346880451250915556764413197424554385509847473349107460608536657852472800734"),
];

static SHARED: Lazy<IvTable> = Lazy::new(IvTable::new);

/// Immutable IV configuration for one mixer instance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IvTable {
    levels: Vec<Fr>,
    leaf: Fr,
    nullifier: Fr,
}

impl Default for IvTable {
    fn default() -> Self {
        Self::new()
    }
}

impl IvTable {
    /// Derive the standard table
    ///
    /// The fixed IVs followed by `MERKLE_IV_SEED` chain values; the leaf
    /// and nullifier IVs are zero, as the wallets expect.
    pub fn new() -> Self {
        let mut levels = FIXED_LEVEL_IVS.to_vec();
        levels.extend(keccak_chain(
            MERKLE_IV_SEED,
            TREE_DEPTH - FIXED_LEVEL_IVS.len(),
        ));

        Self {
            levels,
            leaf: Fr::from(0u64),
            nullifier: Fr::from(0u64),
        }
    }

    /// Process-wide table, built on first use
    pub fn shared() -> &'static IvTable {
        &SHARED
    }

    /// IVs indexed by level, level 0 being the leaf's parent
    pub fn levels(&self) -> &[Fr] {
        &self.levels
    }

    /// IV for a single level
    pub fn level(&self, level: usize) -> Option<Fr> {
        self.levels.get(level).copied()
    }

    /// IV for round-hash leaf commitments
    pub fn leaf(&self) -> Fr {
        self.leaf
    }

    /// IV for the nullifier hash
    pub fn nullifier(&self) -> Fr {
        self.nullifier
    }
}
