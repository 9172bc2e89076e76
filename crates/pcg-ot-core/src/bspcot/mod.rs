//! Maliciously secure batched single-point correlated OT.
//!
//! Each instance in a batch gives the sender a vector `v` of `n` blocks and
//! the receiver a secret index `alpha` together with `w = v ^ e_alpha * Δ`.
//! The trees are expanded with the puncturable PRF and bound to Δ by a
//! correlation message; a GF(2^128) linear check over random-oracle
//! coefficients catches any deviation by either party before the outputs
//! are released.

pub mod error;
pub mod msgs;
pub mod receiver;
pub mod sender;

use pcg_core::{aes::AesEncryptor, Block};

/// Computational security parameter, in bits.
pub const CSP: usize = 128;

/// The sender's output of a batch of single-point COTs.
#[derive(Debug, Clone, PartialEq)]
pub struct BspCotSenderOutput {
    /// The global correlation Δ.
    pub delta: Block,
    /// The per-instance vectors.
    pub vs: Vec<Vec<Block>>,
}

/// The receiver's output of a batch of single-point COTs.
#[derive(Debug, Clone, PartialEq)]
pub struct BspCotReceiverOutput {
    /// The per-instance punctured indices.
    pub alphas: Vec<u32>,
    /// The per-instance vectors, offset by Δ at each punctured index.
    pub ws: Vec<Vec<Block>>,
}

/// Returns the number of correlated OTs one extension over `batch` trees of
/// `each_n` leaves consumes, including the check correlations.
pub fn cot_count(batch: usize, each_n: usize) -> usize {
    batch * each_n.trailing_zeros() as usize + CSP
}

// Validates the batch configuration, returning the tree depth.
pub(crate) fn tree_depth_checked(batch: usize, each_n: usize) -> Result<usize, String> {
    if batch == 0 {
        return Err("batch size must be positive".to_string());
    }
    crate::pprf::tree_depth(each_n)
        .ok_or_else(|| format!("tree width must be a power of two of at least 2, got {each_n}"))
}

// Random-oracle coefficient for leaf `i` of instance `l`, domain separated
// by the execution counter.
pub(crate) fn chi(random_oracle: &AesEncryptor, exec_counter: u64, l: usize, i: usize) -> Block {
    let tweak: Block = bytemuck::cast([exec_counter, ((l as u64) << 32) | i as u64]);
    random_oracle.encrypt_block(tweak)
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::{cot_count, error::ReceiverError, receiver::Receiver, sender::Sender};
    use crate::{ideal::cot::IdealCOT, test::assert_single_point_cot};

    #[test]
    fn test_bspcot() {
        let mut ideal = IdealCOT::default();
        let delta = ideal.delta();

        let (mut receiver, ro_key) = Receiver::new().setup();
        let mut sender = Sender::new().setup(delta, ro_key);

        let batch = 3;
        let each_n = 16;
        let alphas = [5u32, 0, 15];

        for _ in 0..2 {
            let (cot_sender, cot_receiver) = ideal.random_correlated(cot_count(batch, each_n));

            let masks = receiver
                .mask_bits(batch, each_n, &alphas, &cot_receiver)
                .unwrap();
            let (corrections, correlate) = sender
                .extend(batch, each_n, cot_sender, &masks)
                .unwrap();
            receiver
                .extend(batch, each_n, &alphas, cot_receiver, &corrections, correlate)
                .unwrap();

            let check_from_receiver = receiver.check_share().unwrap();
            let (sender_output, check_from_sender) = sender.check(check_from_receiver).unwrap();
            let receiver_output = receiver.check(check_from_sender).unwrap();

            assert_eq!(receiver_output.alphas, alphas);
            for ((vs, ws), &alpha) in sender_output
                .vs
                .iter()
                .zip(&receiver_output.ws)
                .zip(&alphas)
            {
                assert_single_point_cot(delta, alpha, vs, ws);
            }
        }
    }

    #[test]
    fn test_bspcot_single_instance() {
        let mut ideal = IdealCOT::default();
        let delta = ideal.delta();

        let (mut receiver, ro_key) = Receiver::new().setup();
        let mut sender = Sender::new().setup(delta, ro_key);

        let each_n = 8;
        let alpha = 5u32;
        let (cot_sender, cot_receiver) = ideal.random_correlated(cot_count(1, each_n));

        let masks = receiver.mask_bits(1, each_n, &[alpha], &cot_receiver).unwrap();
        let (corrections, correlate) = sender.extend(1, each_n, cot_sender, &masks).unwrap();
        receiver
            .extend(1, each_n, &[alpha], cot_receiver, &corrections, correlate)
            .unwrap();

        let check_from_receiver = receiver.check_share().unwrap();
        let (sender_output, check_from_sender) = sender.check(check_from_receiver).unwrap();
        let receiver_output = receiver.check(check_from_sender).unwrap();

        assert_single_point_cot(delta, alpha, &sender_output.vs[0], &receiver_output.ws[0]);
    }

    #[test]
    fn test_bspcot_check_rejects_tampered_correlation() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        for trial in 0..100 {
            let mut ideal = IdealCOT::default();
            let delta = ideal.delta();

            let (mut receiver, ro_key) = Receiver::new().setup();
            let mut sender = Sender::new().setup(delta, ro_key);

            let batch = 4;
            let each_n = 16;
            let alphas: [u32; 4] = std::array::from_fn(|_| rng.gen_range(0..each_n as u32));
            let (cot_sender, cot_receiver) = ideal.random_correlated(cot_count(batch, each_n));

            let masks = receiver
                .mask_bits(batch, each_n, &alphas, &cot_receiver)
                .unwrap();
            let (corrections, mut correlate) = sender
                .extend(batch, each_n, cot_sender, &masks)
                .unwrap();

            // A malicious sender shifts one correlation block, corrupting
            // the leaf the receiver fills in at its punctured index.
            let l = rng.gen_range(0..batch);
            let bit = rng.gen_range(0..128u32);
            correlate.cs[l] ^= pcg_core::Block::from(1u128 << bit);

            receiver
                .extend(batch, each_n, &alphas, cot_receiver, &corrections, correlate)
                .unwrap();

            let check_from_receiver = receiver.check_share().unwrap();
            let (_, check_from_sender) = sender.check(check_from_receiver).unwrap();
            let err = receiver.check(check_from_sender).unwrap_err();

            assert!(
                matches!(err, ReceiverError::ConsistencyCheckFailed),
                "trial {trial} did not abort"
            );
        }
    }

    #[test]
    fn test_bspcot_rejects_double_extend() {
        let mut ideal = IdealCOT::default();
        let delta = ideal.delta();

        let (mut receiver, ro_key) = Receiver::new().setup();
        let mut sender = Sender::new().setup(delta, ro_key);

        let each_n = 8;
        let alphas = [3u32];
        let (cot_sender, cot_receiver) = ideal.random_correlated(cot_count(1, each_n));

        let masks = receiver.mask_bits(1, each_n, &alphas, &cot_receiver).unwrap();
        let (corrections, correlate) = sender.extend(1, each_n, cot_sender, &masks).unwrap();
        receiver
            .extend(1, each_n, &alphas, cot_receiver, &corrections, correlate)
            .unwrap();

        let (cot_sender, cot_receiver) = ideal.random_correlated(cot_count(1, each_n));
        let masks = receiver.mask_bits(1, each_n, &alphas, &cot_receiver).unwrap();

        let err = sender.extend(1, each_n, cot_sender, &masks).unwrap_err();
        assert!(matches!(err, super::error::SenderError::InvalidState(_)));

        let correlate = super::msgs::Correlate { cs: vec![] };
        let err = receiver
            .extend(1, each_n, &alphas, cot_receiver, &corrections, correlate)
            .unwrap_err();
        assert!(matches!(err, ReceiverError::InvalidState(_)));
    }
}
