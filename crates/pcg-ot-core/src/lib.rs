//! Core protocol logic for correlated oblivious transfer extension.
//!
//! This crate implements the sans-io state machines for the GGM-tree
//! distributed puncturable PRF and the maliciously secure batched
//! single-point COT built on top of it. Every protocol is expressed as a
//! pair of typestate machines exchanging plain-data messages; moving the
//! messages between the parties is the caller's job.

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

pub mod bspcot;
pub mod ideal;
pub mod pprf;

use pcg_core::Block;

/// The sender's share of a batch of correlated OTs.
///
/// For every index `i` the sender holds the pair `(q_i, q_i ^ Δ)` of which
/// the receiver learned exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct CotSenderOutput {
    delta: Block,
    msgs: Vec<Block>,
}

impl CotSenderOutput {
    /// Creates a new sender share from the global correlation and the
    /// zero-choice messages.
    pub fn new(delta: Block, msgs: Vec<Block>) -> Self {
        Self { delta, msgs }
    }

    /// Returns the global correlation Δ.
    pub fn delta(&self) -> Block {
        self.delta
    }

    /// Returns the number of correlations.
    pub fn len(&self) -> usize {
        self.msgs.len()
    }

    /// Returns `true` if there are no correlations.
    pub fn is_empty(&self) -> bool {
        self.msgs.is_empty()
    }

    /// Returns the zero-choice message at `index`.
    pub fn r0(&self, index: usize) -> Block {
        self.msgs[index]
    }

    /// Returns the one-choice message at `index`.
    pub fn r1(&self, index: usize) -> Block {
        self.msgs[index] ^ self.delta
    }

    /// Returns the zero-choice messages.
    pub fn msgs(&self) -> &[Block] {
        &self.msgs
    }

    /// Consumes the share, returning the zero-choice messages.
    pub fn into_msgs(self) -> Vec<Block> {
        self.msgs
    }

    /// Splits off the first `count` correlations into a new share,
    /// keeping the remainder.
    ///
    /// # Panics
    ///
    /// Panics if `count` exceeds the number of correlations.
    pub fn split(&mut self, count: usize) -> Self {
        let rest = self.msgs.split_off(count);
        let front = std::mem::replace(&mut self.msgs, rest);
        Self {
            delta: self.delta,
            msgs: front,
        }
    }

    /// Discards all but the first `count` correlations.
    pub fn reduce(&mut self, count: usize) {
        self.msgs.truncate(count);
    }
}

/// The receiver's share of a batch of correlated OTs.
///
/// For every index `i` the receiver holds a choice bit `r_i` and the block
/// `t_i = q_i ^ r_i·Δ`.
#[derive(Debug, Clone, PartialEq)]
pub struct CotReceiverOutput {
    choices: Vec<bool>,
    msgs: Vec<Block>,
}

impl CotReceiverOutput {
    /// Creates a new receiver share from the choice bits and the chosen
    /// messages.
    ///
    /// # Panics
    ///
    /// Panics if `choices` and `msgs` have different lengths.
    pub fn new(choices: Vec<bool>, msgs: Vec<Block>) -> Self {
        assert_eq!(choices.len(), msgs.len());
        Self { choices, msgs }
    }

    /// Returns the number of correlations.
    pub fn len(&self) -> usize {
        self.msgs.len()
    }

    /// Returns `true` if there are no correlations.
    pub fn is_empty(&self) -> bool {
        self.msgs.is_empty()
    }

    /// Returns the choice bits.
    pub fn choices(&self) -> &[bool] {
        &self.choices
    }

    /// Returns the chosen messages.
    pub fn msgs(&self) -> &[Block] {
        &self.msgs
    }

    /// Consumes the share, returning the choice bits and the chosen
    /// messages.
    pub fn into_parts(self) -> (Vec<bool>, Vec<Block>) {
        (self.choices, self.msgs)
    }

    /// Splits off the first `count` correlations into a new share,
    /// keeping the remainder.
    ///
    /// # Panics
    ///
    /// Panics if `count` exceeds the number of correlations.
    pub fn split(&mut self, count: usize) -> Self {
        let rest_choices = self.choices.split_off(count);
        let rest_msgs = self.msgs.split_off(count);
        let front_choices = std::mem::replace(&mut self.choices, rest_choices);
        let front_msgs = std::mem::replace(&mut self.msgs, rest_msgs);
        Self {
            choices: front_choices,
            msgs: front_msgs,
        }
    }

    /// Discards all but the first `count` correlations.
    pub fn reduce(&mut self, count: usize) {
        self.choices.truncate(count);
        self.msgs.truncate(count);
    }
}
