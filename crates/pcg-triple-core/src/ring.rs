//! Residue rings modulo a power of two.

use num_bigint::{BigUint, RandBigInt};
use pcg_core::prg::Prg;
use rand::Rng;

/// Returns the number of bytes needed to hold `bits` bits.
pub fn byte_len(bits: usize) -> usize {
    (bits + 7) / 8
}

/// A residue ring `Z_{2^l}` with a fixed bit width `l`.
///
/// All operations reduce modulo `2^l`. Encoding is big-endian over the
/// minimal number of bytes for the requested width.
pub trait Ring: Clone + PartialEq + Send + Sync + std::fmt::Debug {
    /// A ring element.
    type Element: Clone + PartialEq + Send + Sync + std::fmt::Debug;

    /// Returns the bit width `l`.
    fn bit_len(&self) -> usize;

    /// Returns the additive identity.
    fn zero(&self) -> Self::Element;

    /// Returns `a + b`.
    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;

    /// Returns `a - b`.
    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;

    /// Returns `a * b`.
    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;

    /// Returns `a * 2^k`.
    fn shift_left(&self, a: &Self::Element, k: usize) -> Self::Element;

    /// Returns the low `k` bits of `a`.
    fn truncate(&self, a: &Self::Element, k: usize) -> Self::Element;

    /// Embeds a bit as `0` or `1`.
    fn from_bit(&self, bit: bool) -> Self::Element;

    /// Samples a uniform element.
    fn random(&self, prg: &mut Prg) -> Self::Element;

    /// Samples a uniform value in `[0, 2^k)`.
    fn random_bits(&self, prg: &mut Prg, k: usize) -> Self::Element;

    /// Encodes the low `k` bits of `a` big-endian in `byte_len(k)` bytes.
    fn to_be_bytes(&self, a: &Self::Element, k: usize) -> Vec<u8>;

    /// Decodes a big-endian value, reduced to its low `k` bits.
    fn from_be_bytes(&self, bytes: &[u8], k: usize) -> Self::Element;
}

/// `Z_{2^l}` over arbitrary-precision integers, for any `l >= 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Zl {
    bit_len: usize,
    mask: BigUint,
    modulus: BigUint,
}

impl Zl {
    /// Creates the ring `Z_{2^l}`.
    ///
    /// # Panics
    ///
    /// Panics if `bit_len` is zero.
    pub fn new(bit_len: usize) -> Self {
        assert!(bit_len >= 1, "ring bit width must be positive");
        let modulus = BigUint::from(1u8) << bit_len;
        Self {
            bit_len,
            mask: &modulus - 1u8,
            modulus,
        }
    }
}

impl Ring for Zl {
    type Element = BigUint;

    fn bit_len(&self) -> usize {
        self.bit_len
    }

    fn zero(&self) -> BigUint {
        BigUint::from(0u8)
    }

    fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) & &self.mask
    }

    fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        ((&self.modulus + a) - b) & &self.mask
    }

    fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) & &self.mask
    }

    fn shift_left(&self, a: &BigUint, k: usize) -> BigUint {
        (a << k) & &self.mask
    }

    fn truncate(&self, a: &BigUint, k: usize) -> BigUint {
        if k >= self.bit_len {
            a & &self.mask
        } else {
            a & &((BigUint::from(1u8) << k) - 1u8)
        }
    }

    fn from_bit(&self, bit: bool) -> BigUint {
        BigUint::from(bit as u8)
    }

    fn random(&self, prg: &mut Prg) -> BigUint {
        prg.gen_biguint(self.bit_len as u64)
    }

    fn random_bits(&self, prg: &mut Prg, k: usize) -> BigUint {
        prg.gen_biguint(k as u64)
    }

    fn to_be_bytes(&self, a: &BigUint, k: usize) -> Vec<u8> {
        let len = byte_len(k);
        let bytes = self.truncate(a, k).to_bytes_be();
        let mut out = vec![0u8; len];
        out[len - bytes.len()..].copy_from_slice(&bytes);
        out
    }

    fn from_be_bytes(&self, bytes: &[u8], k: usize) -> BigUint {
        self.truncate(&BigUint::from_bytes_be(bytes), k)
    }
}

/// `Z_{2^l}` over native 64-bit words, for `1 <= l <= 64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zl64 {
    bit_len: usize,
    mask: u64,
}

impl Zl64 {
    /// Creates the ring `Z_{2^l}`.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= bit_len <= 64`.
    pub fn new(bit_len: usize) -> Self {
        assert!(
            (1..=64).contains(&bit_len),
            "native ring bit width must be in 1..=64"
        );
        Self {
            bit_len,
            mask: low_mask(bit_len),
        }
    }
}

fn low_mask(bits: usize) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

impl Ring for Zl64 {
    type Element = u64;

    fn bit_len(&self) -> usize {
        self.bit_len
    }

    fn zero(&self) -> u64 {
        0
    }

    fn add(&self, a: &u64, b: &u64) -> u64 {
        a.wrapping_add(*b) & self.mask
    }

    fn sub(&self, a: &u64, b: &u64) -> u64 {
        a.wrapping_sub(*b) & self.mask
    }

    fn mul(&self, a: &u64, b: &u64) -> u64 {
        a.wrapping_mul(*b) & self.mask
    }

    fn shift_left(&self, a: &u64, k: usize) -> u64 {
        if k >= 64 {
            0
        } else {
            (a << k) & self.mask
        }
    }

    fn truncate(&self, a: &u64, k: usize) -> u64 {
        a & low_mask(k) & self.mask
    }

    fn from_bit(&self, bit: bool) -> u64 {
        bit as u64
    }

    fn random(&self, prg: &mut Prg) -> u64 {
        prg.gen::<u64>() & self.mask
    }

    fn random_bits(&self, prg: &mut Prg, k: usize) -> u64 {
        self.truncate(&prg.gen::<u64>(), k)
    }

    fn to_be_bytes(&self, a: &u64, k: usize) -> Vec<u8> {
        let len = byte_len(k);
        self.truncate(a, k).to_be_bytes()[8 - len..].to_vec()
    }

    fn from_be_bytes(&self, bytes: &[u8], k: usize) -> u64 {
        let mut buf = [0u8; 8];
        buf[8 - bytes.len()..].copy_from_slice(bytes);
        self.truncate(&u64::from_be_bytes(buf), k)
    }
}
