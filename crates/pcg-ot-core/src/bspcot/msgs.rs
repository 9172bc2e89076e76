//! Messages for the batched single-point COT protocol.

use pcg_core::{hash::Hash, Block};
use serde::{Deserialize, Serialize};

/// The random-oracle key dealt by the receiver during setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RandomOracleKey {
    /// The key of the coefficient oracle.
    pub key: Block,
}

/// The sender's per-instance correlation blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlate {
    /// One block per instance: Δ masked with the XOR of all leaves.
    pub cs: Vec<Block>,
}

/// The receiver's masked coefficient sum for the consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckFromReceiver {
    /// The sum of the punctured-index coefficients, masked with the check
    /// choice bits.
    pub x_prime: Block,
}

/// The sender's aggregate digest for the consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckFromSender {
    /// The digest of the sender's check value.
    pub hashed_v: Hash,
}
