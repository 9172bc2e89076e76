//! Core cryptographic primitives for correlated-randomness generation.
//!
//! Everything here operates on fixed 128-bit [`Block`]s: AES-based PRG
//! expansion, the fixed-key correlation-robust hash, GF(2^128) arithmetic,
//! and GGM tree expansion.

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

pub mod aes;
mod block;
pub mod ggm;
pub mod hash;
pub mod prg;

pub use block::Block;
