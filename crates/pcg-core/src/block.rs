//! Fixed 128-bit blocks, the atomic unit of all correlations.

use std::ops::{BitAnd, BitAndAssign, BitXor, BitXorAssign};

use bytemuck::{Pod, Zeroable};
use rand::{
    distributions::{Distribution, Standard},
    Rng,
};
use serde::{Deserialize, Serialize};

/// A 128-bit value.
#[repr(transparent)]
#[derive(
    Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable, Serialize,
    Deserialize,
)]
pub struct Block([u8; 16]);

impl Block {
    /// The zero block.
    pub const ZERO: Self = Self([0; 16]);
    /// The block with only the least significant bit set.
    pub const ONE: Self = Self(1u128.to_le_bytes());
    /// The block with all bits set.
    pub const ONES: Self = Self([0xff; 16]);

    /// Creates a new block from bytes.
    #[inline]
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns the bytes of the block.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Iterates the bits of the block, least significant first.
    pub fn iter_lsb0(self) -> impl Iterator<Item = bool> {
        let value = u128::from_le_bytes(self.0);
        (0..128).map(move |i| (value >> i) & 1 == 1)
    }

    /// Carry-less multiplication, returning the full 256-bit product as
    /// `(low, high)`.
    pub fn clmul(self, rhs: Self) -> (Self, Self) {
        let x = u128::from_le_bytes(self.0);
        let y = u128::from_le_bytes(rhs.0);
        let (x0, x1) = (x as u64, (x >> 64) as u64);
        let (y0, y1) = (y as u64, (y >> 64) as u64);

        // Karatsuba over the 64-bit halves.
        let a = clmul64(x0, y0);
        let b = clmul64(x1, y1);
        let mid = clmul64(x0 ^ x1, y0 ^ y1) ^ a ^ b;

        (
            Self::from(a ^ (mid << 64)),
            Self::from(b ^ (mid >> 64)),
        )
    }

    /// Multiplication in GF(2^128) reduced by `x^128 + x^7 + x^2 + x + 1`,
    /// with bit i of the block holding the coefficient of `x^i`.
    pub fn gfmul(self, rhs: Self) -> Self {
        let (low, high) = self.clmul(rhs);
        Self::from(reduce(
            u128::from_le_bytes(low.0),
            u128::from_le_bytes(high.0),
        ))
    }

    /// Computes the inner product of two block slices in GF(2^128),
    /// deferring the modular reduction until after the final sum.
    pub fn inn_prdt_red(a: &[Block], b: &[Block]) -> Block {
        debug_assert_eq!(a.len(), b.len());
        let (mut low, mut high) = (0u128, 0u128);
        for (x, y) in a.iter().zip(b) {
            let (l, h) = x.clmul(*y);
            low ^= u128::from(l);
            high ^= u128::from(h);
        }
        Self::from(reduce(low, high))
    }
}

// 64x64 -> 128 carry-less multiply, portable.
fn clmul64(x: u64, y: u64) -> u128 {
    let mut r = 0u128;
    let x = x as u128;
    for i in 0..64 {
        if (y >> i) & 1 == 1 {
            r ^= x << i;
        }
    }
    r
}

// Folds a 256-bit carry-less product modulo x^128 + x^7 + x^2 + x + 1.
fn reduce(low: u128, high: u128) -> u128 {
    let mut low = low ^ (high << 7) ^ (high << 2) ^ (high << 1) ^ high;
    // Bits that overflowed past x^128 wrap around once more; the carry is
    // at most 7 bits wide so a second fold cannot overflow.
    let carry = (high >> 121) ^ (high >> 126) ^ (high >> 127);
    low ^= (carry << 7) ^ (carry << 2) ^ (carry << 1) ^ carry;
    low
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Block({:032x})", u128::from_le_bytes(self.0))
    }
}

impl From<u128> for Block {
    #[inline]
    fn from(value: u128) -> Self {
        Self(value.to_le_bytes())
    }
}

impl From<Block> for u128 {
    #[inline]
    fn from(block: Block) -> Self {
        u128::from_le_bytes(block.0)
    }
}

impl From<[u8; 16]> for Block {
    #[inline]
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Block {
    type Error = std::array::TryFromSliceError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; 16]>::try_from(bytes).map(Self)
    }
}

impl AsMut<[u8]> for Block {
    #[inline]
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl Distribution<Block> for Standard {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Block {
        Block::from(rng.gen::<u128>())
    }
}

impl BitXor for Block {
    type Output = Self;

    #[inline]
    fn bitxor(self, rhs: Self) -> Self {
        Self::from(u128::from(self) ^ u128::from(rhs))
    }
}

impl BitXorAssign for Block {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

impl BitAnd for Block {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self::from(u128::from(self) & u128::from(rhs))
    }
}

impl BitAndAssign for Block {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gfmul_identity() {
        let x = Block::from(0x0123_4567_89ab_cdef_0123_4567_89ab_cdefu128);
        assert_eq!(x.gfmul(Block::ONE), x);
        assert_eq!(Block::ONE.gfmul(x), x);
    }

    #[test]
    fn test_gfmul_reduction() {
        // x^127 * x = x^128 = x^7 + x^2 + x + 1.
        let a = Block::from(1u128 << 127);
        let b = Block::from(2u128);
        assert_eq!(a.gfmul(b), Block::from(0x87u128));
    }

    #[test]
    fn test_gfmul_commutes() {
        let a = Block::from(0xdead_beef_dead_beef_dead_beef_dead_beefu128);
        let b = Block::from(0x1234_5678_9abc_def0_0fed_cba9_8765_4321u128);
        assert_eq!(a.gfmul(b), b.gfmul(a));
    }

    #[test]
    fn test_inn_prdt_red() {
        let a = [
            Block::from(0x1111_2222_3333_4444_5555_6666_7777_8888u128),
            Block::from(0x9999_aaaa_bbbb_cccc_dddd_eeee_ffff_0000u128),
        ];
        let b = [
            Block::from(0x0f0f_0f0f_0f0f_0f0f_f0f0_f0f0_f0f0_f0f0u128),
            Block::from(0x00ff_00ff_00ff_00ff_ff00_ff00_ff00_ff00u128),
        ];
        // Reduction is linear, so the deferred-reduction inner product must
        // agree with the sum of individually reduced products.
        let expected = a[0].gfmul(b[0]) ^ a[1].gfmul(b[1]);
        assert_eq!(Block::inn_prdt_red(&a, &b), expected);
    }

    #[test]
    fn test_iter_lsb0() {
        let bits: Vec<bool> = Block::from(0b1011u128).iter_lsb0().collect();
        assert!(bits[0] && bits[1] && !bits[2] && bits[3]);
        assert!(bits[4..].iter().all(|&b| !b));
    }
}
