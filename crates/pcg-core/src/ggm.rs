//! GGM tree expansion for puncturable PRFs.
//!
//! The tree is never materialized level-by-level on the heap: each level is
//! expanded in place inside one caller-owned leaf buffer, so discarding the
//! tree after leaf extraction is a single drop.

use crate::{aes::AesEncryptor, Block};

// Two fixed-key PRPs expanding one seed into a left/right child pair.
struct TwoKeyPrp([AesEncryptor; 2]);

impl TwoKeyPrp {
    fn new() -> Self {
        Self([
            AesEncryptor::new(Block::ZERO),
            AesEncryptor::new(Block::ONE),
        ])
    }

    #[inline]
    fn expand(&self, seed: Block) -> (Block, Block) {
        (
            self.0[0].encrypt_block(seed) ^ seed,
            self.0[1].encrypt_block(seed) ^ seed,
        )
    }
}

/// A GGM tree of fixed depth, expanded inside a flat leaf arena.
pub struct GgmTree {
    prp: TwoKeyPrp,
    depth: usize,
}

impl GgmTree {
    /// Creates a new tree description of the given depth.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is zero.
    pub fn new(depth: usize) -> Self {
        assert!(depth > 0, "GGM tree depth must be positive");
        Self {
            prp: TwoKeyPrp::new(),
            depth,
        }
    }

    /// Returns the depth of the tree.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Expands `seed` into all `2^depth` leaves.
    ///
    /// `tree` must have length `2^depth` and receives the leaves. `k0[i]`
    /// and `k1[i]` receive the XOR of all left (resp. right) children at
    /// level `i + 1`; both must have length `depth`.
    pub fn gen(&self, seed: Block, tree: &mut [Block], k0: &mut [Block], k1: &mut [Block]) {
        assert_eq!(tree.len(), 1 << self.depth);
        assert_eq!(k0.len(), self.depth);
        assert_eq!(k1.len(), self.depth);

        let (left, right) = self.prp.expand(seed);
        tree[0] = left;
        tree[1] = right;
        k0[0] = left;
        k1[0] = right;

        for level in 1..self.depth {
            let width = 1 << level;
            let mut left_sum = Block::ZERO;
            let mut right_sum = Block::ZERO;
            // Expanding from the highest index down keeps unread parents
            // intact while their children land in the same buffer.
            for j in (0..width).rev() {
                let (left, right) = self.prp.expand(tree[j]);
                tree[2 * j] = left;
                tree[2 * j + 1] = right;
                left_sum ^= left;
                right_sum ^= right;
            }
            k0[level] = left_sum;
            k1[level] = right_sum;
        }
    }

    /// Rebuilds every leaf except the one on the punctured path.
    ///
    /// `betas[i]` is the complement of the i-th puncture-path bit, most
    /// significant first, and `k[i]` is the recovered sibling key for level
    /// `i + 1`: the XOR of all children on the `betas[i]` side at that
    /// level. On return `tree` holds every leaf, with the punctured leaf
    /// position zeroed.
    pub fn reconstruct(&self, tree: &mut [Block], k: &[Block], betas: &[bool]) {
        assert_eq!(tree.len(), 1 << self.depth);
        assert_eq!(k.len(), self.depth);
        assert_eq!(betas.len(), self.depth);

        let beta = betas[0] as usize;
        tree[beta] = k[0];
        // The punctured path descends through the complement of each beta.
        let mut hole = 1 - beta;
        tree[hole] = Block::ZERO;

        for level in 1..self.depth {
            let width = 1 << level;
            let beta = betas[level] as usize;
            for j in (0..width).rev() {
                if j == hole {
                    continue;
                }
                let (left, right) = self.prp.expand(tree[j]);
                tree[2 * j] = left;
                tree[2 * j + 1] = right;
            }
            // The sibling of the next hole is the level key minus every
            // known child on the beta side.
            let mut sibling = k[level];
            for j in 0..width {
                if j != hole {
                    sibling ^= tree[2 * j + beta];
                }
            }
            tree[2 * hole + beta] = sibling;
            hole = 2 * hole + (1 - beta);
            tree[hole] = Block::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prg::Prg;
    use rand_core::SeedableRng;

    fn punctured_leaves(depth: usize, alpha: usize) -> (Vec<Block>, Vec<Block>) {
        let ggm = GgmTree::new(depth);
        let mut prg = Prg::from_seed(Block::from(depth as u128));

        let mut tree = vec![Block::ZERO; 1 << depth];
        let mut k0 = vec![Block::ZERO; depth];
        let mut k1 = vec![Block::ZERO; depth];
        ggm.gen(prg.random_block(), &mut tree, &mut k0, &mut k1);

        // The receiver learns the complement-side key at every level.
        let betas: Vec<bool> = (0..depth)
            .map(|i| (alpha >> (depth - 1 - i)) & 1 == 0)
            .collect();
        let k: Vec<Block> = betas
            .iter()
            .enumerate()
            .map(|(i, &b)| if b { k0[i] } else { k1[i] })
            .collect();

        let mut reconstructed = vec![Block::ZERO; 1 << depth];
        ggm.reconstruct(&mut reconstructed, &k, &betas);

        (tree, reconstructed)
    }

    #[test]
    fn test_ggm_reconstruct() {
        for depth in 1..=6 {
            for alpha in 0..(1usize << depth) {
                let (tree, reconstructed) = punctured_leaves(depth, alpha);
                for (i, (expected, actual)) in tree.iter().zip(&reconstructed).enumerate() {
                    if i == alpha {
                        assert_eq!(*actual, Block::ZERO);
                    } else {
                        assert_eq!(actual, expected, "leaf {i} of depth {depth}");
                    }
                }
            }
        }
    }
}
