use proptest::prelude::*;
use wfa_core::utils::{deterministic_dna, mutate_dna};
use wfa_core::{AlignerBuilder, LinearPenalties, Penalties, ReductionStrategy};

fn score_with(
    s: &[u8],
    t: &[u8],
    penalties: Penalties,
    reduction: ReductionStrategy,
    low_memory: bool,
) -> (i32, Option<String>) {
    let mut builder = AlignerBuilder::new()
        .penalties(penalties)
        .low_memory(low_memory);
    builder = match reduction {
        ReductionStrategy::None => builder.reduction_none(),
        ReductionStrategy::Adaptive {
            min_wavefront_length,
            max_distance_threshold,
        } => builder.reduction_adaptive(min_wavefront_length, max_distance_threshold),
    };
    let mut aligner = builder.build(s.len(), t.len()).unwrap();
    let alignment = aligner.align(s, t).unwrap();
    if let Some(cigar) = &alignment.cigar {
        assert!(cigar.is_valid_for(s, t));
        assert_eq!(cigar.score(&penalties), alignment.score, "{cigar}");
    }
    (
        alignment.score,
        alignment.cigar.as_ref().map(|c| c.to_string()),
    )
}

proptest! {
    #[test]
    fn adaptive_never_beats_exact(
        seed in 0u64..1000,
        len in 20usize..200,
        rate in 0.0f64..0.3,
        min_len in 1usize..12,
        threshold in 0usize..20,
    ) {
        let s = deterministic_dna(len, seed);
        let t = mutate_dna(&s, rate, seed + 1);
        let penalties = Penalties::default();
        let (exact, _) = score_with(&s, &t, penalties, ReductionStrategy::None, false);
        let (reduced, _) = score_with(
            &s,
            &t,
            penalties,
            ReductionStrategy::adaptive(min_len, threshold),
            false,
        );
        prop_assert!(reduced >= exact, "reduced {} < exact {}", reduced, exact);
    }

    #[test]
    fn narrow_bands_report_achievable_scores(
        seed in 0u64..1000,
        len in 1usize..150,
        rate in 0.0f64..0.3,
        min_len in 1usize..6,
        threshold in 0usize..6,
    ) {
        let s = deterministic_dna(len, seed);
        let t = mutate_dna(&s, rate, seed + 1);
        let metrics = [
            Penalties::Edit,
            Penalties::Linear(LinearPenalties { mismatch: 3, indel: 2 }),
            Penalties::default(),
        ];
        for penalties in metrics {
            for low_memory in [false, true] {
                // score_with checks the script against the reported score.
                let (reduced, cigar) = score_with(
                    &s,
                    &t,
                    penalties,
                    ReductionStrategy::adaptive(min_len, threshold),
                    low_memory,
                );
                prop_assert!(cigar.is_some());
                prop_assert!(reduced >= 0);
            }
        }
    }

    #[test]
    fn wide_threshold_is_exact(
        seed in 0u64..1000,
        len in 1usize..120,
        rate in 0.0f64..0.4,
    ) {
        let s = deterministic_dna(len, seed);
        let t = mutate_dna(&s, rate, seed + 1);
        let threshold = s.len() + t.len();
        for penalties in [Penalties::Edit, Penalties::default()] {
            for low_memory in [false, true] {
                let exact = score_with(&s, &t, penalties, ReductionStrategy::None, low_memory);
                let wide = score_with(
                    &s,
                    &t,
                    penalties,
                    ReductionStrategy::adaptive(1, threshold),
                    low_memory,
                );
                prop_assert_eq!(exact, wide);
            }
        }
    }
}

#[test]
fn default_reduction_bounds_long_alignments() {
    let s = deterministic_dna(4000, 11);
    let t = mutate_dna(&s, 0.02, 12);
    let (exact, _) = score_with(&s, &t, Penalties::default(), ReductionStrategy::None, true);
    let (reduced, _) = score_with(&s, &t, Penalties::default(), ReductionStrategy::default(), true);
    assert!(reduced >= exact);
}
