//! Benchmark: end-to-end wavefront alignment per metric and memory mode.
//!
//! Run with:
//! `cargo bench --bench wavefront_align`
//!
//! Sequences are random DNA with a fixed divergence, so run time tracks
//! the alignment score rather than the product of the lengths.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use wfa_core::{AlignerBuilder, Penalties};

fn random_dna(rng: &mut StdRng, len: usize) -> Vec<u8> {
    const ALPHABET: &[u8] = b"ACGT";
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..ALPHABET.len());
            ALPHABET[idx]
        })
        .collect()
}

fn diverge(rng: &mut StdRng, seq: &[u8], rate: f64) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len() + seq.len() / 16);
    for &c in seq {
        if !rng.gen_bool(rate) {
            out.push(c);
            continue;
        }
        match rng.gen_range(0..3) {
            0 => out.push(b"ACGT"[rng.gen_range(0..4)]),
            1 => {
                out.push(c);
                out.push(b"ACGT"[rng.gen_range(0..4)]);
            }
            _ => {}
        }
    }
    out
}

fn pair(len: usize, rate: f64) -> (Vec<u8>, Vec<u8>) {
    let mut rng = StdRng::seed_from_u64(42);
    let s = random_dna(&mut rng, len);
    let t = diverge(&mut rng, &s, rate);
    (s, t)
}

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("wfa_metrics_high_memory");
    let (s, t) = pair(2_000, 0.05);
    let metrics = [
        ("edit", Penalties::Edit),
        ("gap_affine", Penalties::default()),
        (
            "gap_affine_2p",
            Penalties::Affine2p(wfa_core::Affine2pPenalties {
                mismatch: 4,
                gap_opening1: 6,
                gap_extension1: 2,
                gap_opening2: 24,
                gap_extension2: 1,
            }),
        ),
    ];
    for (name, penalties) in metrics {
        let mut aligner = AlignerBuilder::new()
            .penalties(penalties)
            .reduction_none()
            .build(s.len(), t.len())
            .expect("valid configuration");
        group.bench_function(name, |b| {
            b.iter(|| {
                let alignment = aligner.align(black_box(&s), black_box(&t)).expect("aligns");
                black_box(alignment.score);
            })
        });
    }
    group.finish();
}

fn bench_memory_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("wfa_memory_modes");
    group.sample_size(20);

    for &len in &[5_000usize, 20_000] {
        let (s, t) = pair(len, 0.02);
        for (mode, low_memory, score_only) in [
            ("high", false, false),
            ("low", true, false),
            ("score_only", false, true),
        ] {
            let mut builder = AlignerBuilder::new().low_memory(low_memory);
            if score_only {
                builder = builder.score_only();
            }
            let mut aligner = builder.build(s.len(), t.len()).expect("valid configuration");
            group.bench_function(format!("{mode}_len_{len}"), |b| {
                b.iter(|| {
                    let alignment = aligner.align(&s, &t).expect("aligns");
                    black_box(alignment.score);
                })
            });
        }
    }
    group.finish();
}

fn bench_fresh_vs_reused(c: &mut Criterion) {
    let mut group = c.benchmark_group("wfa_aligner_reuse");
    let (s, t) = pair(3_000, 0.05);

    group.bench_function("fresh_aligner_per_pair", |b| {
        b.iter_batched(
            || AlignerBuilder::new().low_memory(true).into_attributes(),
            |attrs| {
                let mut aligner = wfa_core::WavefrontAligner::new(s.len(), t.len(), &attrs)
                    .expect("valid configuration");
                black_box(aligner.align(&s, &t).expect("aligns").score);
            },
            BatchSize::SmallInput,
        )
    });

    let mut reused = AlignerBuilder::new()
        .low_memory(true)
        .build(s.len(), t.len())
        .expect("valid configuration");
    group.bench_function("reused_aligner", |b| {
        b.iter(|| black_box(reused.align(&s, &t).expect("aligns").score))
    });
    group.finish();
}

criterion_group!(benches, bench_metrics, bench_memory_modes, bench_fresh_vs_reused);
criterion_main!(benches);
