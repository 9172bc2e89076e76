//! Silent triple generator.

use pcg_core::{aes::FIXED_KEY_AES, prg::Prg, Block};
use pcg_ot_core::{CotReceiverOutput, CotSenderOutput};
use rand::SeedableRng;

use crate::{
    ring::{byte_len, Ring},
    triple::Triple,
};

use super::{error::GeneratorError, msgs::Correlation};

/// The default number of triples produced per round.
pub const DEFAULT_ROUND_SIZE: usize = 4096;

/// A silent multiplication triple generator for one party.
///
/// Both parties run the same machine in lockstep. Every round consumes one
/// COT share in each direction: the sender-role share carries this party's
/// `a` cross terms to the peer, and the receiver-role share determines this
/// party's `b` share and unmasks the cross terms coming back.
#[derive(Debug)]
pub struct TripleGenerator<R: Ring> {
    ring: R,
    total: usize,
    round_size: usize,
    counter: u64,
    prg: Prg,
    acc: Triple<R>,
    pending: Option<Pending<R>>,
}

#[derive(Debug)]
struct Pending<R: Ring> {
    a: Vec<R::Element>,
    b: Vec<R::Element>,
    c: Vec<R::Element>,
    cot: CotReceiverOutput,
}

impl<R: Ring> TripleGenerator<R> {
    /// Creates a generator for `count` triples with the default round size.
    pub fn new(ring: R, count: usize) -> Result<Self, GeneratorError> {
        Self::with_round_size(ring, count, DEFAULT_ROUND_SIZE)
    }

    /// Creates a generator producing at most `round_size` triples per
    /// round.
    pub fn with_round_size(
        ring: R,
        count: usize,
        round_size: usize,
    ) -> Result<Self, GeneratorError> {
        if count == 0 {
            return Err(GeneratorError::InvalidConfig(
                "triple count must be positive".to_string(),
            ));
        }

        if round_size == 0 {
            return Err(GeneratorError::InvalidConfig(
                "round size must be positive".to_string(),
            ));
        }

        Ok(Self {
            acc: Triple::empty(ring.clone()),
            ring,
            total: count,
            round_size,
            counter: 0,
            prg: Prg::new(),
            pending: None,
        })
    }

    /// Returns the ring the triples live in.
    pub fn ring(&self) -> &R {
        &self.ring
    }

    /// Returns the number of triples not yet started.
    pub fn remaining(&self) -> usize {
        let in_flight = self.pending.as_ref().map(|p| p.a.len()).unwrap_or(0);
        self.total - self.acc.len() - in_flight
    }

    /// Returns the number of triples the next round produces.
    pub fn next_round_size(&self) -> usize {
        self.round_size.min(self.remaining())
    }

    /// Returns the number of COTs the next round consumes in each
    /// direction.
    pub fn required_cots(&self) -> usize {
        self.next_round_size() * self.ring.bit_len()
    }

    /// Returns `true` once every requested triple has been generated.
    pub fn is_complete(&self) -> bool {
        self.pending.is_none() && self.acc.len() == self.total
    }

    /// Runs the local half of one round, producing the correction message
    /// for the peer.
    ///
    /// # Arguments
    ///
    /// * `cot_sender` - This party's sender-role COT share for the round.
    /// * `cot_receiver` - This party's receiver-role COT share for the
    ///   round.
    pub fn round_extend(
        &mut self,
        cot_sender: CotSenderOutput,
        cot_receiver: CotReceiverOutput,
    ) -> Result<Correlation, GeneratorError> {
        if self.pending.is_some() {
            return Err(GeneratorError::InvalidState(
                "a pending round must be finished first".to_string(),
            ));
        }

        let each = self.next_round_size();
        if each == 0 {
            return Err(GeneratorError::InvalidState(
                "every requested triple has been generated".to_string(),
            ));
        }

        let l = self.ring.bit_len();

        if cot_sender.len() != each * l {
            return Err(GeneratorError::InvalidLength(format!(
                "expected {} sender-role COTs, got {}",
                each * l,
                cot_sender.len()
            )));
        }

        if cot_receiver.len() != each * l {
            return Err(GeneratorError::InvalidLength(format!(
                "expected {} receiver-role COTs, got {}",
                each * l,
                cot_receiver.len()
            )));
        }

        let ring = self.ring.clone();
        let mut pairs = Vec::with_capacity(each * l);
        let mut a_col = Vec::with_capacity(each);
        let mut b_col = Vec::with_capacity(each);
        let mut c_col = Vec::with_capacity(each);

        for j in 0..each {
            let a = ring.random(&mut self.prg);

            // b is packed from the receiver-role choice bits, first bit
            // most significant.
            let b = cot_receiver.choices()[j * l..(j + 1) * l]
                .iter()
                .fold(ring.zero(), |acc, &bit| {
                    ring.add(&ring.shift_left(&acc, 1), &ring.from_bit(bit))
                });

            let mut c = ring.mul(&a, &b);

            // The peer picks up (x + b_i * a) mod 2^(i+1) at weight
            // 2^(l-1-i); subtracting x at the same weight leaves the cross
            // term a * b_peer split additively.
            for i in 0..l {
                let index = j * l + i;
                let x = ring.random_bits(&mut self.prg, i + 1);
                let s0 = ring.to_be_bytes(&x, i + 1);
                let s1 = ring.to_be_bytes(&ring.add(&a, &x), i + 1);

                let tweak: Block = bytemuck::cast([self.counter, index as u64]);
                let m0 = mask(FIXED_KEY_AES.tccr(tweak, cot_sender.r0(index)), s0);
                let m1 = mask(FIXED_KEY_AES.tccr(tweak, cot_sender.r1(index)), s1);
                pairs.push([m0, m1]);

                c = ring.sub(&c, &ring.shift_left(&x, l - 1 - i));
            }

            a_col.push(a);
            b_col.push(b);
            c_col.push(c);
        }

        self.pending = Some(Pending {
            a: a_col,
            b: b_col,
            c: c_col,
            cot: cot_receiver,
        });

        Ok(Correlation { pairs })
    }

    /// Consumes the peer's correction message, completing the round.
    pub fn round_finish(&mut self, correlation: Correlation) -> Result<(), GeneratorError> {
        let Some(Pending { a, b, mut c, cot }) = self.pending.take() else {
            return Err(GeneratorError::InvalidState(
                "no pending round to finish".to_string(),
            ));
        };

        let each = a.len();
        let l = self.ring.bit_len();

        if correlation.pairs.len() != each * l {
            return Err(GeneratorError::InvalidMessage(format!(
                "expected {} correction pairs, got {}",
                each * l,
                correlation.pairs.len()
            )));
        }

        let ring = self.ring.clone();
        let (choices, msgs) = cot.into_parts();

        for j in 0..each {
            for i in 0..l {
                let index = j * l + i;
                let [m0, m1] = &correlation.pairs[index];

                let expected = byte_len(i + 1);
                if m0.len() != expected || m1.len() != expected {
                    return Err(GeneratorError::InvalidMessage(format!(
                        "correction pair {index} must carry {expected} bytes per side"
                    )));
                }

                let m = if choices[index] { m1 } else { m0 };
                let tweak: Block = bytemuck::cast([self.counter, index as u64]);
                let s = ring.from_be_bytes(
                    &mask(FIXED_KEY_AES.tccr(tweak, msgs[index]), m.clone()),
                    i + 1,
                );

                c[j] = ring.add(&c[j], &ring.shift_left(&s, l - 1 - i));
            }
        }

        self.counter += 1;
        self.acc.merge(Triple::new(ring, a, b, c));

        Ok(())
    }

    /// Consumes the generator, returning every generated triple.
    pub fn finish(self) -> Result<Triple<R>, GeneratorError> {
        if !self.is_complete() {
            return Err(GeneratorError::InvalidState(format!(
                "{} of {} triples generated",
                self.acc.len(),
                self.total
            )));
        }

        Ok(self.acc)
    }
}

// One-time pad derived from a COT block, bound to the round and index by
// the tweak applied beforehand.
fn mask(seed: Block, mut bytes: Vec<u8>) -> Vec<u8> {
    let mut pad = vec![0u8; bytes.len()];
    Prg::from_seed(seed).random_bytes(&mut pad);
    for (byte, pad) in bytes.iter_mut().zip(pad) {
        *byte ^= pad;
    }
    bytes
}
