//! Messages for the puncturable PRF protocol.

use pcg_core::Block;
use serde::{Deserialize, Serialize};

/// The receiver's choice-correction bits for one tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskBits {
    /// One bit per level: the random COT choice bit masked with the
    /// complement of the corresponding puncture-path bit.
    pub bs: Vec<bool>,
}

/// The sender's masked level keys for one tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeCorrection {
    /// One `[left, right]` pair of masked level keys per level.
    pub ms: Vec<[Block; 2]>,
}
