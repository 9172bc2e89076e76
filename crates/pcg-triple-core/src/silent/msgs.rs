//! Messages for silent triple generation.

use serde::{Deserialize, Serialize};

/// One round of masked cross-term corrections.
///
/// Pair `j * l + i` carries the two candidate shares for bit `i` of triple
/// `j`, each encoded big-endian in `byte_len(i + 1)` bytes and masked with
/// the expansion of the matching COT block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    /// The masked share pairs.
    pub pairs: Vec<[Vec<u8>; 2]>,
}
