//! BSP-COT receiver.

use pcg_core::{
    aes::AesEncryptor,
    hash::{blake3, Hash},
    prg::Prg,
    Block,
};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{
    pprf::{self, msgs::MaskBits, msgs::TreeCorrection},
    CotReceiverOutput,
};

use super::{
    chi,
    error::ReceiverError,
    msgs::{CheckFromReceiver, CheckFromSender, Correlate, RandomOracleKey},
    tree_depth_checked, BspCotReceiverOutput, CSP,
};

/// BSP-COT receiver.
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

    /// Completes the setup phase of the protocol, dealing the
    /// random-oracle key to send to the sender.
    pub fn setup(self) -> (Receiver<state::Extension>, RandomOracleKey) {
        let key = Prg::new().random_block();

        (
            Receiver {
                state: state::Extension {
                    random_oracle: AesEncryptor::new(key),
                    pprf: pprf::receiver::Receiver::new().setup(),
                    exec_counter: 0,
                    pending: None,
                },
            },
            RandomOracleKey { key },
        )
    }
}

impl Receiver<state::Extension> {
    /// Computes the choice-correction bits for a batch of instances.
    ///
    /// # Arguments
    ///
    /// * `batch` - The number of instances.
    /// * `each_n` - The width of each instance, a power of two.
    /// * `alphas` - The punctured index of each instance.
    /// * `cot` - The receiver's full COT share for this extension,
    ///   including the check correlations.
    pub fn mask_bits(
        &self,
        batch: usize,
        each_n: usize,
        alphas: &[u32],
        cot: &CotReceiverOutput,
    ) -> Result<Vec<MaskBits>, ReceiverError> {
        let h = tree_depth_checked(batch, each_n).map_err(ReceiverError::InvalidConfig)?;

        if cot.len() != batch * h + CSP {
            return Err(ReceiverError::InvalidLength(format!(
                "expected {} COTs, got {}",
                batch * h + CSP,
                cot.len()
            )));
        }

        let masks = self
            .state
            .pprf
            .mask_bits(batch, each_n, alphas, &cot.choices()[..batch * h])?;

        Ok(masks)
    }

    /// Reconstructs a batch of single-point instances.
    ///
    /// The outputs are withheld until the consistency check completes.
    ///
    /// # Arguments
    ///
    /// * `batch` - The number of instances.
    /// * `each_n` - The width of each instance, a power of two.
    /// * `alphas` - The punctured index of each instance.
    /// * `cot` - The receiver's COT share, the same share the mask bits
    ///   were derived from.
    /// * `corrections` - The masked level keys sent by the sender.
    /// * `correlate` - The correlation blocks sent by the sender.
    pub fn extend(
        &mut self,
        batch: usize,
        each_n: usize,
        alphas: &[u32],
        cot: CotReceiverOutput,
        corrections: &[TreeCorrection],
        correlate: Correlate,
    ) -> Result<(), ReceiverError> {
        if self.state.pending.is_some() {
            return Err(ReceiverError::InvalidState(
                "a pending extension must be checked first".to_string(),
            ));
        }

        let h = tree_depth_checked(batch, each_n).map_err(ReceiverError::InvalidConfig)?;

        if cot.len() != batch * h + CSP {
            return Err(ReceiverError::InvalidLength(format!(
                "expected {} COTs, got {}",
                batch * h + CSP,
                cot.len()
            )));
        }

        if correlate.cs.len() != batch {
            return Err(ReceiverError::InvalidMessage(format!(
                "expected {batch} correlation blocks, got {}",
                correlate.cs.len()
            )));
        }

        let mut cot = cot;
        let tree_cot = cot.split(batch * h);
        let check_cot = cot;

        let outputs = self
            .state
            .pprf
            .puncture(batch, each_n, alphas, tree_cot, corrections)?;

        // The punctured leaf completes to w[alpha] = c ^ sum of the known
        // leaves, which equals v[alpha] ^ delta.
        let ws: Vec<Vec<Block>> = outputs
            .into_iter()
            .zip(&correlate.cs)
            .map(|(output, &c)| {
                let w_alpha = output.ws.iter().flatten().fold(c, |acc, &x| acc ^ x);
                output
                    .ws
                    .into_iter()
                    .map(|leaf| leaf.unwrap_or(w_alpha))
                    .collect()
            })
            .collect();

        self.state.pending = Some(Pending {
            each_n,
            alphas: alphas.to_vec(),
            ws,
            check_cot,
        });

        Ok(())
    }

    /// Computes the masked coefficient sum to send to the sender.
    pub fn check_share(&self) -> Result<CheckFromReceiver, ReceiverError> {
        let Some(pending) = &self.state.pending else {
            return Err(ReceiverError::InvalidState(
                "no pending extension to check".to_string(),
            ));
        };

        let random_oracle = &self.state.random_oracle;
        let exec_counter = self.state.exec_counter;

        // phi = sum of the coefficients at the punctured indices, masked
        // with the random check choices.
        let phi = pending
            .alphas
            .iter()
            .enumerate()
            .fold(Block::ZERO, |acc, (l, &alpha)| {
                acc ^ chi(random_oracle, exec_counter, l, alpha as usize)
            });

        let x_star = pending
            .check_cot
            .choices()
            .iter()
            .enumerate()
            .fold(0u128, |acc, (i, &x)| acc | ((x as u128) << i));

        Ok(CheckFromReceiver {
            x_prime: phi ^ Block::from(x_star),
        })
    }

    /// Verifies the sender's digest and releases the outputs.
    ///
    /// On mismatch the extension is discarded and the protocol must be
    /// aborted.
    ///
    /// # Arguments
    ///
    /// * `check` - The digest sent by the sender.
    pub fn check(&mut self, check: CheckFromSender) -> Result<BspCotReceiverOutput, ReceiverError> {
        let Some(Pending {
            each_n,
            alphas,
            ws,
            check_cot,
        }) = self.state.pending.take()
        else {
            return Err(ReceiverError::InvalidState(
                "no pending extension to check".to_string(),
            ));
        };

        // Z = sum of z*_i * X^i over the check correlations.
        let base: Vec<Block> = (0..CSP).map(|i| Block::from(1u128 << i)).collect();
        let mut w = Block::inn_prdt_red(check_cot.msgs(), &base);

        let random_oracle = &self.state.random_oracle;
        let exec_counter = self.state.exec_counter;

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = ws.par_iter().enumerate();
            } else {
                let iter = ws.iter().enumerate();
            }
        }

        let sums: Vec<Block> = iter
            .map(|(l, w)| {
                let chis: Vec<Block> = (0..each_n)
                    .map(|i| chi(random_oracle, exec_counter, l, i))
                    .collect();
                Block::inn_prdt_red(&chis, w)
            })
            .collect();

        for sum in sums {
            w ^= sum;
        }

        self.state.exec_counter += 1;

        let hashed_w = Hash::from(blake3(&w.to_bytes()));
        if hashed_w != check.hashed_v {
            return Err(ReceiverError::ConsistencyCheckFailed);
        }

        Ok(BspCotReceiverOutput { alphas, ws })
    }
}

// An extension whose outputs are withheld until the check completes.
struct Pending {
    each_n: usize,
    alphas: Vec<u32>,
    ws: Vec<Vec<Block>>,
    check_cot: CotReceiverOutput,
}

/// The receiver's state.
pub mod state {
    use super::*;

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
    /// In this state the receiver alternates extensions and checks,
    /// potentially multiple times.
    pub struct Extension {
        /// The coefficient oracle for the consistency check.
        pub(super) random_oracle: AesEncryptor,
        /// The underlying puncturable PRF receiver.
        pub(super) pprf: pprf::receiver::Receiver<pprf::receiver::state::Extension>,
        /// Current execution counter, fed into the coefficient oracle.
        pub(super) exec_counter: u64,
        /// The extension awaiting its consistency check.
        pub(super) pending: Option<Pending>,
    }

    impl State for Extension {}

    opaque_debug::implement!(Extension);
}
