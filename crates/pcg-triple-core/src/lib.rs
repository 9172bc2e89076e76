//! Silent generation of additively shared multiplication triples.
//!
//! Triples live in a residue ring `Z_{2^l}`, either arbitrary-precision
//! ([`Zl`]) or native 64-bit ([`Zl64`]), and are produced from correlated
//! OT in bounded rounds by the [`silent`] generator.

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

pub mod ring;
pub mod silent;
pub mod triple;

pub use ring::{Ring, Zl, Zl64};
pub use triple::Triple;
