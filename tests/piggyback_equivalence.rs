use proptest::prelude::*;
use wfa_core::utils::{deterministic_dna, mutate_dna};
use wfa_core::{Affine2pPenalties, AlignerBuilder, Cigar, LinearPenalties, Penalties};

fn script(s: &[u8], t: &[u8], penalties: Penalties, low_memory: bool) -> (i32, Cigar) {
    let mut aligner = AlignerBuilder::new()
        .penalties(penalties)
        .reduction_none()
        .low_memory(low_memory)
        .build(s.len(), t.len())
        .unwrap();
    assert_eq!(aligner.bt_piggyback(), low_memory);
    let alignment = aligner.align(s, t).unwrap();
    (alignment.score, alignment.cigar.clone().unwrap())
}

fn all_penalties() -> [Penalties; 4] {
    [
        Penalties::Edit,
        Penalties::Linear(LinearPenalties {
            mismatch: 4,
            indel: 3,
        }),
        Penalties::default(),
        Penalties::Affine2p(Affine2pPenalties {
            mismatch: 4,
            gap_opening1: 6,
            gap_extension1: 2,
            gap_opening2: 24,
            gap_extension2: 1,
        }),
    ]
}

proptest! {
    #[test]
    fn both_strategies_emit_the_same_script(a in "[ACGT]{0,40}", b in "[ACGT]{0,40}") {
        for penalties in all_penalties() {
            let classic = script(a.as_bytes(), b.as_bytes(), penalties, false);
            let packed = script(a.as_bytes(), b.as_bytes(), penalties, true);
            prop_assert_eq!(&classic, &packed, "{:?}", penalties);
        }
    }

    #[test]
    fn long_traces_survive_offloading(seed in 0u64..500, len in 100usize..600) {
        let s = deterministic_dna(len, seed);
        let t = mutate_dna(&s, 0.15, seed ^ 0xABCD);
        for penalties in all_penalties() {
            let classic = script(&s, &t, penalties, false);
            let packed = script(&s, &t, penalties, true);
            prop_assert!(packed.1.is_valid_for(&s, &t));
            prop_assert_eq!(classic, packed);
        }
    }
}

#[test]
fn long_gap_script_is_identical() {
    let s = deterministic_dna(120, 77);
    let mut t = s[..60].to_vec();
    t.extend(std::iter::repeat(b'G').take(45));
    t.extend_from_slice(&s[60..]);
    for penalties in all_penalties() {
        let classic = script(&s, &t, penalties, false);
        let packed = script(&s, &t, penalties, true);
        assert_eq!(classic, packed);
        assert_eq!(classic.1.text_len(), t.len());
    }
}
