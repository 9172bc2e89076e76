//! Puncturable PRF sender.

use pcg_core::{aes::FIXED_KEY_AES, ggm::GgmTree, prg::Prg, Block};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::CotSenderOutput;

use super::{
    error::SenderError,
    msgs::{MaskBits, TreeCorrection},
    tree_depth, PprfSenderOutput,
};

/// Puncturable PRF sender.
#[derive(Debug, Default)]
pub struct Sender<T: state::State = state::Initialized> {
    state: T,
}

impl Sender {
    /// Creates a new sender.
    pub fn new() -> Self {
        Sender {
            state: state::Initialized::default(),
        }
    }

    /// Completes the setup phase of the protocol.
    ///
    /// # Arguments
    ///
    /// * `delta` - The sender's global secret.
    pub fn setup(self, delta: Block) -> Sender<state::Extension> {
        Sender {
            state: state::Extension {
                delta,
                exec_counter: 0,
            },
        }
    }
}

impl Sender<state::Extension> {
    /// Expands a batch of punctured trees.
    ///
    /// Consumes `batch * h` correlated OTs, one per tree level, where
    /// `h = log2(each_n)`. Returns the per-tree leaves together with the
    /// correction messages for the receiver.
    ///
    /// # Arguments
    ///
    /// * `batch` - The number of trees.
    /// * `each_n` - The number of leaves of each tree, a power of two.
    /// * `cot` - The sender's share of the correlated OTs.
    /// * `masks` - The choice-correction bits sent by the receiver.
    pub fn puncture(
        &mut self,
        batch: usize,
        each_n: usize,
        cot: CotSenderOutput,
        masks: &[MaskBits],
    ) -> Result<(Vec<PprfSenderOutput>, Vec<TreeCorrection>), SenderError> {
        if batch == 0 {
            return Err(SenderError::InvalidConfig(
                "batch size must be positive".to_string(),
            ));
        }

        let Some(h) = tree_depth(each_n) else {
            return Err(SenderError::InvalidConfig(format!(
                "tree width must be a power of two of at least 2, got {each_n}"
            )));
        };

        if cot.delta() != self.state.delta {
            return Err(SenderError::InvalidInput(
                "COT correlation does not match the configured delta".to_string(),
            ));
        }

        if cot.len() != batch * h {
            return Err(SenderError::InvalidLength(format!(
                "expected {} COTs, got {}",
                batch * h,
                cot.len()
            )));
        }

        if masks.len() != batch {
            return Err(SenderError::InvalidMessage(format!(
                "expected {batch} mask-bit messages, got {}",
                masks.len()
            )));
        }

        if masks.iter().any(|mask| mask.bs.len() != h) {
            return Err(SenderError::InvalidMessage(format!(
                "mask bits must carry {h} bits per tree"
            )));
        }

        let delta = self.state.delta;
        let exec_counter = self.state.exec_counter;
        let qs = cot.into_msgs();

        let mut outputs = vec![PprfSenderOutput { vs: Vec::new() }; batch];
        let mut corrections = vec![TreeCorrection { ms: Vec::new() }; batch];

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = outputs
                    .par_iter_mut()
                    .zip(corrections.par_iter_mut())
                    .zip(qs.par_chunks_exact(h))
                    .zip(masks.par_iter())
                    .map(|(((output, correction), qs), mask)| (output, correction, qs, mask));
            } else {
                let iter = outputs
                    .iter_mut()
                    .zip(corrections.iter_mut())
                    .zip(qs.chunks_exact(h))
                    .zip(masks.iter())
                    .map(|(((output, correction), qs), mask)| (output, correction, qs, mask));
            }
        }

        iter.for_each(|(output, correction, qs, mask)| {
            let seed = Prg::new().random_block();
            let ggm = GgmTree::new(h);
            let mut tree = vec![Block::ZERO; each_n];
            let mut k0 = vec![Block::ZERO; h];
            let mut k1 = vec![Block::ZERO; h];
            ggm.gen(seed, &mut tree, &mut k0, &mut k1);

            // The random COT choice is corrected to the receiver's masked
            // choice: on its complement-path side the receiver's block
            // equals q ^ b*delta.
            for (((i, &q), &b), (k0, k1)) in qs
                .iter()
                .enumerate()
                .zip(&mask.bs)
                .zip(k0.into_iter().zip(k1))
            {
                let mut m = if b { [q ^ delta, q] } else { [q, q ^ delta] };
                let tweak: Block = bytemuck::cast([i as u64, exec_counter]);
                FIXED_KEY_AES.tccr_many(&[tweak, tweak], &mut m);
                m[0] ^= k0;
                m[1] ^= k1;
                correction.ms.push(m);
            }

            output.vs = tree;
        });

        self.state.exec_counter += batch as u64;

        Ok((outputs, corrections))
    }

    /// Expands a single punctured tree.
    ///
    /// # Arguments
    ///
    /// * `each_n` - The number of leaves, a power of two.
    /// * `cot` - The sender's share of `log2(each_n)` correlated OTs.
    /// * `mask` - The choice-correction bits sent by the receiver.
    pub fn puncture_one(
        &mut self,
        each_n: usize,
        cot: CotSenderOutput,
        mask: &MaskBits,
    ) -> Result<(PprfSenderOutput, TreeCorrection), SenderError> {
        let (mut outputs, mut corrections) =
            self.puncture(1, each_n, cot, std::slice::from_ref(mask))?;
        Ok((outputs.remove(0), corrections.remove(0)))
    }
}

/// The sender's state.
pub mod state {
    use super::*;

    mod sealed {
        pub trait Sealed {}

        impl Sealed for super::Initialized {}
        impl Sealed for super::Extension {}
    }

    /// The sender's state.
    pub trait State: sealed::Sealed {}

    /// The sender's initial state.
    #[derive(Default)]
    pub struct Initialized {}

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);

    /// The sender's state after the setup phase.
    ///
    /// In this state the sender can expand punctured trees, potentially
    /// multiple times.
    pub struct Extension {
        /// The sender's global secret.
        pub(super) delta: Block,
        /// Current execution counter, fed into the correction tweaks.
        pub(super) exec_counter: u64,
    }

    impl State for Extension {}

    opaque_debug::implement!(Extension);
}
