//! Puncturable PRF receiver.

use itybity::ToBits;
use pcg_core::{aes::FIXED_KEY_AES, ggm::GgmTree, Block};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::CotReceiverOutput;

use super::{
    error::ReceiverError,
    msgs::{MaskBits, TreeCorrection},
    tree_depth, PprfReceiverOutput,
};

/// Puncturable PRF receiver.
#[derive(Debug, Default)]
pub struct Receiver<T: state::State = state::Initialized> {
    state: T,
}

impl Receiver {
    /// Creates a new receiver.
    pub fn new() -> Self {
        Receiver {
            state: state::Initialized::default(),
        }
    }

    /// Completes the setup phase of the protocol.
    pub fn setup(self) -> Receiver<state::Extension> {
        Receiver {
            state: state::Extension { exec_counter: 0 },
        }
    }
}

impl Receiver<state::Extension> {
    /// Computes the choice-correction bits for a batch of trees.
    ///
    /// Only the random choice bits of the COTs are read here; the blocks
    /// are consumed by [`puncture`](Self::puncture).
    ///
    /// # Arguments
    ///
    /// * `batch` - The number of trees.
    /// * `each_n` - The number of leaves of each tree, a power of two.
    /// * `alphas` - The punctured index of each tree.
    /// * `choices` - The `batch * log2(each_n)` random COT choice bits.
    pub fn mask_bits(
        &self,
        batch: usize,
        each_n: usize,
        alphas: &[u32],
        choices: &[bool],
    ) -> Result<Vec<MaskBits>, ReceiverError> {
        let h = self.check_config(batch, each_n, alphas)?;

        if choices.len() != batch * h {
            return Err(ReceiverError::InvalidLength(format!(
                "expected {} choice bits, got {}",
                batch * h,
                choices.len()
            )));
        }

        // b = r ^ !alpha_bit, so the sender can correct the random choice
        // to the complement of the puncture path.
        let masks = alphas
            .iter()
            .zip(choices.chunks_exact(h))
            .map(|(alpha, rs)| MaskBits {
                bs: alpha
                    .iter_msb0()
                    .skip(32 - h)
                    .zip(rs)
                    .map(|(alpha, &r)| alpha == r)
                    .collect(),
            })
            .collect();

        Ok(masks)
    }

    /// Reconstructs a batch of punctured trees from the sender's
    /// corrections.
    ///
    /// # Arguments
    ///
    /// * `batch` - The number of trees.
    /// * `each_n` - The number of leaves of each tree, a power of two.
    /// * `alphas` - The punctured index of each tree.
    /// * `cot` - The receiver's share of the correlated OTs, the same
    ///   share the mask bits were derived from.
    /// * `corrections` - The masked level keys sent by the sender.
    pub fn puncture(
        &mut self,
        batch: usize,
        each_n: usize,
        alphas: &[u32],
        cot: CotReceiverOutput,
        corrections: &[TreeCorrection],
    ) -> Result<Vec<PprfReceiverOutput>, ReceiverError> {
        let h = self.check_config(batch, each_n, alphas)?;

        if cot.len() != batch * h {
            return Err(ReceiverError::InvalidLength(format!(
                "expected {} COTs, got {}",
                batch * h,
                cot.len()
            )));
        }

        if corrections.len() != batch {
            return Err(ReceiverError::InvalidMessage(format!(
                "expected {batch} tree corrections, got {}",
                corrections.len()
            )));
        }

        if corrections.iter().any(|c| c.ms.len() != h) {
            return Err(ReceiverError::InvalidMessage(format!(
                "tree corrections must carry {h} key pairs per tree"
            )));
        }

        let exec_counter = self.state.exec_counter;
        let (_, ts) = cot.into_parts();

        let mut outputs = vec![
            PprfReceiverOutput {
                alpha: 0,
                ws: Vec::new(),
            };
            batch
        ];

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = outputs
                    .par_iter_mut()
                    .zip(alphas.par_iter())
                    .zip(ts.par_chunks_exact(h))
                    .zip(corrections.par_iter())
                    .map(|(((output, alpha), ts), correction)| (output, alpha, ts, correction));
            } else {
                let iter = outputs
                    .iter_mut()
                    .zip(alphas.iter())
                    .zip(ts.chunks_exact(h))
                    .zip(corrections.iter())
                    .map(|(((output, alpha), ts), correction)| (output, alpha, ts, correction));
            }
        }

        iter.for_each(|(output, alpha, ts, correction)| {
            let betas: Vec<bool> = alpha.iter_msb0().skip(32 - h).map(|bit| !bit).collect();

            // Unmasks the level key on the complement side of the path.
            let k: Vec<Block> = correction
                .ms
                .iter()
                .zip(ts)
                .zip(&betas)
                .enumerate()
                .map(|(i, (([m0, m1], &t), &beta))| {
                    let tweak: Block = bytemuck::cast([i as u64, exec_counter]);
                    FIXED_KEY_AES.tccr(tweak, t) ^ if beta { *m1 } else { *m0 }
                })
                .collect();

            let ggm = GgmTree::new(h);
            let mut tree = vec![Block::ZERO; each_n];
            ggm.reconstruct(&mut tree, &k, &betas);

            output.alpha = *alpha;
            output.ws = tree
                .into_iter()
                .enumerate()
                .map(|(i, leaf)| {
                    if i == *alpha as usize {
                        None
                    } else {
                        Some(leaf)
                    }
                })
                .collect();
        });

        self.state.exec_counter += batch as u64;

        Ok(outputs)
    }

    /// Computes the choice-correction bits for a single tree.
    pub fn mask_bits_one(
        &self,
        each_n: usize,
        alpha: u32,
        choices: &[bool],
    ) -> Result<MaskBits, ReceiverError> {
        let mut masks = self.mask_bits(1, each_n, &[alpha], choices)?;
        Ok(masks.remove(0))
    }

    /// Reconstructs a single punctured tree.
    pub fn puncture_one(
        &mut self,
        each_n: usize,
        alpha: u32,
        cot: CotReceiverOutput,
        correction: &TreeCorrection,
    ) -> Result<PprfReceiverOutput, ReceiverError> {
        let mut outputs =
            self.puncture(1, each_n, &[alpha], cot, std::slice::from_ref(correction))?;
        Ok(outputs.remove(0))
    }

    fn check_config(
        &self,
        batch: usize,
        each_n: usize,
        alphas: &[u32],
    ) -> Result<usize, ReceiverError> {
        if batch == 0 {
            return Err(ReceiverError::InvalidConfig(
                "batch size must be positive".to_string(),
            ));
        }

        let Some(h) = tree_depth(each_n) else {
            return Err(ReceiverError::InvalidConfig(format!(
                "tree width must be a power of two of at least 2, got {each_n}"
            )));
        };

        if alphas.len() != batch {
            return Err(ReceiverError::InvalidInput(format!(
                "expected {batch} punctured indices, got {}",
                alphas.len()
            )));
        }

        if alphas.iter().any(|&alpha| alpha as usize >= each_n) {
            return Err(ReceiverError::InvalidInput(format!(
                "punctured indices must be less than {each_n}"
            )));
        }

        Ok(h)
    }
}

/// The receiver's state.
pub mod state {
    mod sealed {
        pub trait Sealed {}

        impl Sealed for super::Initialized {}
        impl Sealed for super::Extension {}
    }

    /// The receiver's state.
    pub trait State: sealed::Sealed {}

    /// The receiver's initial state.
    #[derive(Default)]
    pub struct Initialized {}

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);

    /// The receiver's state after the setup phase.
    ///
    /// In this state the receiver can reconstruct punctured trees,
    /// potentially multiple times.
    pub struct Extension {
        /// Current execution counter, fed into the correction tweaks.
        pub(super) exec_counter: u64,
    }

    impl State for Extension {}

    opaque_debug::implement!(Extension);
}
