//! BSP-COT sender.

use pcg_core::{
    aes::AesEncryptor,
    hash::{blake3, Hash},
    Block,
};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{
    pprf::{self, msgs::MaskBits, msgs::TreeCorrection},
    CotSenderOutput,
};

use super::{
    chi,
    error::SenderError,
    msgs::{CheckFromReceiver, CheckFromSender, Correlate, RandomOracleKey},
    tree_depth_checked, BspCotSenderOutput, CSP,
};

/// BSP-COT sender.
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
    /// * `ro_key` - The random-oracle key dealt by the receiver.
    pub fn setup(self, delta: Block, ro_key: RandomOracleKey) -> Sender<state::Extension> {
        Sender {
            state: state::Extension {
                delta,
                random_oracle: AesEncryptor::new(ro_key.key),
                pprf: pprf::sender::Sender::new().setup(delta),
                exec_counter: 0,
                unchecked: None,
            },
        }
    }
}

impl Sender<state::Extension> {
    /// Expands a batch of single-point instances and correlates them to Δ.
    ///
    /// Consumes `batch * log2(each_n) + 128` correlated OTs; the last 128
    /// are reserved for the consistency check. The outputs are withheld
    /// until [`check`](Self::check) completes.
    ///
    /// # Arguments
    ///
    /// * `batch` - The number of instances.
    /// * `each_n` - The width of each instance, a power of two.
    /// * `cot` - The sender's share of the correlated OTs.
    /// * `masks` - The choice-correction bits sent by the receiver.
    pub fn extend(
        &mut self,
        batch: usize,
        each_n: usize,
        cot: CotSenderOutput,
        masks: &[MaskBits],
    ) -> Result<(Vec<TreeCorrection>, Correlate), SenderError> {
        if self.state.unchecked.is_some() {
            return Err(SenderError::InvalidState(
                "a pending extension must be checked first".to_string(),
            ));
        }

        let h = tree_depth_checked(batch, each_n)
            .map_err(SenderError::InvalidConfig)?;

        if cot.delta() != self.state.delta {
            return Err(SenderError::InvalidInput(
                "COT correlation does not match the configured delta".to_string(),
            ));
        }

        if cot.len() != batch * h + CSP {
            return Err(SenderError::InvalidLength(format!(
                "expected {} COTs, got {}",
                batch * h + CSP,
                cot.len()
            )));
        }

        let mut cot = cot;
        let tree_cot = cot.split(batch * h);
        let check_cot = cot;

        let (outputs, corrections) = self.state.pprf.puncture(batch, each_n, tree_cot, masks)?;

        let delta = self.state.delta;
        let vs: Vec<Vec<Block>> = outputs.into_iter().map(|output| output.vs).collect();

        // c = delta ^ sum of the leaves, so the receiver can complete its
        // punctured leaf to v[alpha] ^ delta.
        let cs: Vec<Block> = vs
            .iter()
            .map(|v| v.iter().fold(delta, |acc, &x| acc ^ x))
            .collect();

        self.state.unchecked = Some(Unchecked {
            each_n,
            vs,
            check_cot,
        });

        Ok((corrections, Correlate { cs }))
    }

    /// Performs the consistency check and releases the outputs.
    ///
    /// # Arguments
    ///
    /// * `check` - The masked coefficient sum sent by the receiver.
    pub fn check(
        &mut self,
        check: CheckFromReceiver,
    ) -> Result<(BspCotSenderOutput, CheckFromSender), SenderError> {
        let Some(Unchecked {
            each_n,
            vs,
            check_cot,
        }) = self.state.unchecked.take()
        else {
            return Err(SenderError::InvalidState(
                "no pending extension to check".to_string(),
            ));
        };

        let CheckFromReceiver { x_prime } = check;
        let delta = self.state.delta;

        // y = y* ^ x' * delta, aggregated as Y = sum of y_i * X^i.
        let ys: Vec<Block> = check_cot
            .msgs()
            .iter()
            .zip(x_prime.iter_lsb0())
            .map(|(&q, x)| if x { q ^ delta } else { q })
            .collect();
        let base: Vec<Block> = (0..CSP).map(|i| Block::from(1u128 << i)).collect();
        let mut v = Block::inn_prdt_red(&ys, &base);

        let random_oracle = &self.state.random_oracle;
        let exec_counter = self.state.exec_counter;

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = vs.par_iter().enumerate();
            } else {
                let iter = vs.iter().enumerate();
            }
        }

        let sums: Vec<Block> = iter
            .map(|(l, v)| {
                let chis: Vec<Block> = (0..each_n)
                    .map(|i| chi(random_oracle, exec_counter, l, i))
                    .collect();
                Block::inn_prdt_red(&chis, v)
            })
            .collect();

        for sum in sums {
            v ^= sum;
        }

        let hashed_v = Hash::from(blake3(&v.to_bytes()));

        self.state.exec_counter += 1;

        Ok((
            BspCotSenderOutput { delta, vs },
            CheckFromSender { hashed_v },
        ))
    }
}

// An extension whose outputs are withheld until the check completes.
struct Unchecked {
    each_n: usize,
    vs: Vec<Vec<Block>>,
    check_cot: CotSenderOutput,
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
    /// In this state the sender alternates extensions and checks,
    /// potentially multiple times.
    pub struct Extension {
        /// The sender's global secret.
        pub(super) delta: Block,
        /// The coefficient oracle for the consistency check.
        pub(super) random_oracle: AesEncryptor,
        /// The underlying puncturable PRF sender.
        pub(super) pprf: pprf::sender::Sender<pprf::sender::state::Extension>,
        /// Current execution counter, fed into the coefficient oracle.
        pub(super) exec_counter: u64,
        /// The extension awaiting its consistency check.
        pub(super) unchecked: Option<Unchecked>,
    }

    impl State for Extension {}

    opaque_debug::implement!(Extension);
}
