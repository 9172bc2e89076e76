//! Ideal correlated oblivious transfer functionality.

use pcg_core::{prg::Prg, Block};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{CotReceiverOutput, CotSenderOutput};

/// The ideal COT functionality.
///
/// Deals correlated pairs locally, standing in for a base COT provider
/// when wiring up the extension protocols.
#[derive(Debug)]
pub struct IdealCOT {
    delta: Block,
    counter: usize,
    rng: ChaCha8Rng,
}

impl IdealCOT {
    /// Creates a new ideal COT functionality.
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed of the internal RNG.
    /// * `delta` - The global correlation.
    pub fn new(seed: [u8; 32], delta: Block) -> Self {
        Self {
            delta,
            counter: 0,
            rng: ChaCha8Rng::from_seed(seed),
        }
    }

    /// Returns the global correlation Δ.
    pub fn delta(&self) -> Block {
        self.delta
    }

    /// Sets the global correlation.
    pub fn set_delta(&mut self, delta: Block) {
        self.delta = delta;
    }

    /// Returns the number of correlations dealt so far.
    pub fn count(&self) -> usize {
        self.counter
    }

    /// Deals `count` correlated OTs with random choice bits.
    pub fn random_correlated(&mut self, count: usize) -> (CotSenderOutput, CotReceiverOutput) {
        let mut choices = vec![false; count];
        self.rng.fill(&mut choices[..]);
        self.correlated(choices)
    }

    /// Deals correlated OTs against the given choice bits.
    pub fn correlated(&mut self, choices: Vec<bool>) -> (CotSenderOutput, CotReceiverOutput) {
        let mut prg = Prg::from_seed(self.rng.gen());

        let mut msgs = vec![Block::ZERO; choices.len()];
        prg.random_blocks(&mut msgs);

        let chosen: Vec<Block> = choices
            .iter()
            .zip(&msgs)
            .map(|(&r, &q)| if r { q ^ self.delta } else { q })
            .collect();

        self.counter += choices.len();

        (
            CotSenderOutput::new(self.delta, msgs),
            CotReceiverOutput::new(choices, chosen),
        )
    }
}

impl Default for IdealCOT {
    fn default() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let delta = rng.gen();
        let mut seed = [0u8; 32];
        rng.fill(&mut seed);
        Self::new(seed, delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::assert_cot;

    #[test]
    fn test_ideal_cot_correlation() {
        let mut ideal = IdealCOT::default();
        let (sender, receiver) = ideal.random_correlated(64);

        assert_eq!(ideal.count(), 64);
        assert_cot(
            sender.delta(),
            receiver.choices(),
            sender.msgs(),
            receiver.msgs(),
        );
    }

    #[test]
    fn test_ideal_cot_chosen_bits() {
        let mut ideal = IdealCOT::default();
        let choices = vec![true, false, true, true];
        let (sender, receiver) = ideal.correlated(choices.clone());

        assert_eq!(receiver.choices(), &choices[..]);
        assert_cot(
            sender.delta(),
            receiver.choices(),
            sender.msgs(),
            receiver.msgs(),
        );
    }
}
