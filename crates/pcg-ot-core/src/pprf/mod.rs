//! Distributed puncturable PRF based on GGM trees.
//!
//! The sender expands random GGM trees and ends up with all `n` leaves of
//! each; the receiver obliviously learns every leaf except the one at its
//! secret index `alpha`. Each tree of depth `h = log2(n)` consumes `h`
//! correlated OTs, one per level, and costs the sender a single
//! [`TreeCorrection`](msgs::TreeCorrection) message of `2h` blocks.

pub mod error;
pub mod msgs;
pub mod receiver;
pub mod sender;

use pcg_core::Block;

/// The sender's output of one punctured PRF instance: all `n` leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct PprfSenderOutput {
    /// The leaf values.
    pub vs: Vec<Block>,
}

/// The receiver's output of one punctured PRF instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PprfReceiverOutput {
    /// The punctured index.
    pub alpha: u32,
    /// The leaf values, `None` exactly at `alpha`.
    pub ws: Vec<Option<Block>>,
}

/// Returns the tree depth for `n` leaves, or `None` if `n` is not a
/// supported width.
pub(crate) fn tree_depth(n: usize) -> Option<usize> {
    if n >= 2 && n.is_power_of_two() {
        Some(n.trailing_zeros() as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{receiver::Receiver, sender::Sender};
    use crate::ideal::cot::IdealCOT;

    #[test]
    fn test_pprf_puncture() {
        let mut ideal = IdealCOT::default();
        let delta = ideal.delta();

        let mut sender = Sender::new().setup(delta);
        let mut receiver = Receiver::new().setup();

        let batch = 3;
        let each_n = 16;
        let h = 4;
        let alphas = [5u32, 0, 15];

        for _ in 0..2 {
            let (cot_sender, cot_receiver) = ideal.random_correlated(batch * h);

            let masks = receiver
                .mask_bits(batch, each_n, &alphas, cot_receiver.choices())
                .unwrap();
            let (outputs, corrections) = sender
                .puncture(batch, each_n, cot_sender, &masks)
                .unwrap();
            let punctured = receiver
                .puncture(batch, each_n, &alphas, cot_receiver, &corrections)
                .unwrap();

            for ((output, punctured), &alpha) in outputs.iter().zip(&punctured).zip(&alphas) {
                assert_eq!(punctured.alpha, alpha);
                for (i, (v, w)) in output.vs.iter().zip(&punctured.ws).enumerate() {
                    if i == alpha as usize {
                        assert_eq!(*w, None);
                    } else {
                        assert_eq!(*w, Some(*v));
                    }
                }
            }
        }
    }

    #[test]
    fn test_pprf_puncture_one() {
        let mut ideal = IdealCOT::default();
        let delta = ideal.delta();

        let mut sender = Sender::new().setup(delta);
        let mut receiver = Receiver::new().setup();

        let each_n = 8;
        let alpha = 5u32;
        let (cot_sender, cot_receiver) = ideal.random_correlated(3);

        let mask = receiver
            .mask_bits_one(each_n, alpha, cot_receiver.choices())
            .unwrap();
        let (output, correction) = sender.puncture_one(each_n, cot_sender, &mask).unwrap();
        let punctured = receiver
            .puncture_one(each_n, alpha, cot_receiver, &correction)
            .unwrap();

        assert_eq!(punctured.ws[alpha as usize], None);
        for (i, w) in punctured.ws.iter().enumerate() {
            if i != alpha as usize {
                assert_eq!(*w, Some(output.vs[i]));
            }
        }
    }

    #[test]
    fn test_pprf_rejects_bad_width() {
        let mut ideal = IdealCOT::default();
        let mut sender = Sender::new().setup(ideal.delta());

        let (cot_sender, _) = ideal.random_correlated(3);
        let err = sender.puncture(1, 6, cot_sender, &[]).unwrap_err();
        assert!(matches!(
            err,
            super::error::SenderError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_pprf_rejects_short_correction() {
        let mut ideal = IdealCOT::default();
        let delta = ideal.delta();

        let mut sender = Sender::new().setup(delta);
        let mut receiver = Receiver::new().setup();

        let each_n = 8;
        let alphas = [2u32];
        let (cot_sender, cot_receiver) = ideal.random_correlated(3);

        let masks = receiver
            .mask_bits(1, each_n, &alphas, cot_receiver.choices())
            .unwrap();
        let (_, mut corrections) = sender.puncture(1, each_n, cot_sender, &masks).unwrap();
        corrections[0].ms.pop();

        let err = receiver
            .puncture(1, each_n, &alphas, cot_receiver, &corrections)
            .unwrap_err();
        assert!(matches!(
            err,
            super::error::ReceiverError::InvalidMessage(_)
        ));
    }
}
