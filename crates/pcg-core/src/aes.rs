//! AES-128 primitives: block encryption and the fixed-key tweakable
//! circular-correlation-robust hash.

use aes::{
    cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit},
    Aes128,
};
use once_cell::sync::Lazy;

use crate::Block;

/// The fixed-key AES instance shared by all correlation-robust hashing.
pub static FIXED_KEY_AES: Lazy<FixedKeyAes> =
    Lazy::new(|| FixedKeyAes::new(Block::from(0x6162_6364_6566_6768_696a_6b6c_6d6e_6f70u128)));

/// An AES-128 block encryptor.
#[derive(Clone)]
pub struct AesEncryptor(Aes128);

opaque_debug::implement!(AesEncryptor);

impl AesEncryptor {
    /// Number of blocks processed per batched call.
    pub const AES_BLOCK_COUNT: usize = 8;

    /// Creates a new encryptor keyed by `key`.
    pub fn new(key: Block) -> Self {
        Self(Aes128::new(&GenericArray::from(key.to_bytes())))
    }

    /// Encrypts one block.
    #[inline]
    pub fn encrypt_block(&self, block: Block) -> Block {
        let mut buf = GenericArray::from(block.to_bytes());
        self.0.encrypt_block(&mut buf);
        Block::new(buf.into())
    }

    /// Encrypts a slice of blocks in place.
    pub fn encrypt_blocks(&self, blocks: &mut [Block]) {
        for block in blocks.iter_mut() {
            *block = self.encrypt_block(*block);
        }
    }

    /// Encrypts a fixed-size batch of blocks in place.
    #[inline]
    pub fn encrypt_many_blocks<const N: usize>(&self, blocks: &mut [Block; N]) {
        self.encrypt_blocks(blocks);
    }
}

/// AES with a publicly fixed key, modeling a random permutation π.
pub struct FixedKeyAes(AesEncryptor);

opaque_debug::implement!(FixedKeyAes);

impl FixedKeyAes {
    /// Creates a new instance keyed by `key`.
    pub fn new(key: Block) -> Self {
        Self(AesEncryptor::new(key))
    }

    /// Tweakable circular-correlation-robust hash `π(π(x) ⊕ t) ⊕ π(x)`.
    #[inline]
    pub fn tccr(&self, tweak: Block, block: Block) -> Block {
        let pi_x = self.0.encrypt_block(block);
        self.0.encrypt_block(pi_x ^ tweak) ^ pi_x
    }

    /// Applies [`FixedKeyAes::tccr`] element-wise to a batch.
    pub fn tccr_many<const N: usize>(&self, tweaks: &[Block; N], blocks: &mut [Block; N]) {
        for (block, tweak) in blocks.iter_mut().zip(tweaks) {
            *block = self.tccr(*tweak, *block);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aes_permutes() {
        let aes = AesEncryptor::new(Block::from(7u128));
        let a = aes.encrypt_block(Block::ZERO);
        let b = aes.encrypt_block(Block::ONE);
        assert_ne!(a, b);
        // Deterministic.
        assert_eq!(a, aes.encrypt_block(Block::ZERO));
    }

    #[test]
    fn test_tccr_tweak_separates() {
        let x = Block::from(42u128);
        let h0 = FIXED_KEY_AES.tccr(Block::from(0u128), x);
        let h1 = FIXED_KEY_AES.tccr(Block::from(1u128), x);
        assert_ne!(h0, h1);
    }
}
