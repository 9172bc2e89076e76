//! Silent generation of multiplication triples from correlated OT.
//!
//! The protocol is symmetric: each party contributes a random `a` share,
//! derives its `b` share from receiver-role COT choice bits, and the two
//! cross terms `a0 * b1` and `a1 * b0` are shared through one masked
//! correction message per direction. Large requests are produced in
//! bounded rounds and merged.

pub mod error;
pub mod generator;
pub mod msgs;

#[cfg(test)]
mod tests {
    use pcg_core::Block;
    use pcg_ot_core::ideal::cot::IdealCOT;
    use rstest::rstest;

    use super::{error::GeneratorError, generator::TripleGenerator};
    use crate::{
        ring::{Ring, Zl, Zl64},
        triple::Triple,
    };

    fn generate<R: Ring>(ring: R, count: usize, round_size: usize) -> (Triple<R>, Triple<R>) {
        let mut cot0 = IdealCOT::new([1u8; 32], Block::from(11u128));
        let mut cot1 = IdealCOT::new([2u8; 32], Block::from(22u128));

        let mut gen0 = TripleGenerator::with_round_size(ring.clone(), count, round_size).unwrap();
        let mut gen1 = TripleGenerator::with_round_size(ring, count, round_size).unwrap();

        while !gen0.is_complete() {
            let n = gen0.required_cots();
            let (sender0, receiver1) = cot0.random_correlated(n);
            let (sender1, receiver0) = cot1.random_correlated(n);

            let msg0 = gen0.round_extend(sender0, receiver0).unwrap();
            let msg1 = gen1.round_extend(sender1, receiver1).unwrap();

            gen0.round_finish(msg1).unwrap();
            gen1.round_finish(msg0).unwrap();
        }

        (gen0.finish().unwrap(), gen1.finish().unwrap())
    }

    fn assert_triples<R: Ring>(triple0: &Triple<R>, triple1: &Triple<R>) {
        let ring = triple0.ring();
        assert_eq!(triple0.len(), triple1.len());

        for i in 0..triple0.len() {
            let a = ring.add(&triple0.a()[i], &triple1.a()[i]);
            let b = ring.add(&triple0.b()[i], &triple1.b()[i]);
            let c = ring.add(&triple0.c()[i], &triple1.c()[i]);
            assert_eq!(ring.mul(&a, &b), c, "triple {i}");
        }
    }

    #[rstest]
    #[case(8)]
    #[case(32)]
    #[case(64)]
    #[case(128)]
    fn test_silent_triples_zl(#[case] bit_len: usize) {
        let (triple0, triple1) = generate(Zl::new(bit_len), 20, 64);

        assert_eq!(triple0.len(), 20);
        assert_triples(&triple0, &triple1);
    }

    #[rstest]
    #[case(8)]
    #[case(32)]
    #[case(64)]
    fn test_silent_triples_zl64(#[case] bit_len: usize) {
        let (triple0, triple1) = generate(Zl64::new(bit_len), 20, 64);

        assert_eq!(triple0.len(), 20);
        assert_triples(&triple0, &triple1);
    }

    #[test]
    fn test_silent_triples_multi_round() {
        let (triple0, triple1) = generate(Zl64::new(32), 1000, 300);

        assert_eq!(triple0.len(), 1000);
        assert_triples(&triple0, &triple1);
    }

    #[test]
    fn test_generator_rejects_short_cots() {
        let ring = Zl64::new(16);
        let mut cot = IdealCOT::default();

        let mut gen = TripleGenerator::with_round_size(ring, 10, 4).unwrap();
        assert_eq!(gen.required_cots(), 4 * 16);

        let (sender, receiver) = cot.random_correlated(10);
        let err = gen.round_extend(sender, receiver).unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidLength(_)));
    }

    #[test]
    fn test_generator_rejects_short_payload() {
        let ring = Zl64::new(8);
        let mut cot0 = IdealCOT::new([3u8; 32], Block::from(33u128));
        let mut cot1 = IdealCOT::new([4u8; 32], Block::from(44u128));

        let mut gen0 = TripleGenerator::new(ring, 5).unwrap();
        let mut gen1 = TripleGenerator::new(ring, 5).unwrap();

        let n = gen0.required_cots();
        let (sender0, receiver1) = cot0.random_correlated(n);
        let (sender1, receiver0) = cot1.random_correlated(n);

        gen0.round_extend(sender0, receiver0).unwrap();
        let mut msg1 = gen1.round_extend(sender1, receiver1).unwrap();
        msg1.pairs.pop();

        let err = gen0.round_finish(msg1).unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidMessage(_)));
    }

    #[test]
    fn test_generator_rejects_early_finish() {
        let gen = TripleGenerator::new(Zl64::new(16), 10).unwrap();
        let err = gen.finish().unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidState(_)));
    }
}
