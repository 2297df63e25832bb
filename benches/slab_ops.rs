use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use wfa_core::bt_buffer::{BacktraceBuffer, PiggybackOp, ROOT_BLOCK};
use wfa_core::slab::WavefrontSlab;

fn bench_slab_cycle(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x5155AA55);
    let bands: Vec<(i32, i32)> = (0..1024)
        .map(|_| {
            let half = rng.gen_range(0..400);
            (-half, half + rng.gen_range(0..8))
        })
        .collect();

    let mut group = c.benchmark_group("slab_ops");
    group.bench_function("acquire_release_warm", |b| {
        let mut slab = WavefrontSlab::new(false);
        b.iter(|| {
            for &(lo, hi) in &bands {
                let mut wf = slab.acquire(lo, hi).expect("acquire");
                wf.set(lo, 0);
                slab.release(black_box(wf));
            }
        });
    });
    group.bench_function("acquire_release_piggyback", |b| {
        let mut slab = WavefrontSlab::new(true);
        b.iter(|| {
            for &(lo, hi) in &bands {
                let mut wf = slab.acquire(lo, hi).expect("acquire");
                wf.set_trace(lo, 0, ROOT_BLOCK);
                slab.release(black_box(wf));
            }
        });
    });
    group.finish();
}

fn bench_trace_append(c: &mut Criterion) {
    let ops = [
        PiggybackOp::Mismatch,
        PiggybackOp::insertion_open(0),
        PiggybackOp::insertion_extend(0),
        PiggybackOp::deletion_open(1),
    ];
    let mut group = c.benchmark_group("bt_buffer");
    group.bench_function("append_4096_ops", |b| {
        let mut buffer = BacktraceBuffer::new();
        b.iter(|| {
            buffer.clear();
            let (mut word, mut prev) = (0, ROOT_BLOCK);
            for i in 0..4096 {
                (word, prev) = buffer.append(word, prev, ops[i % ops.len()]).expect("append");
            }
            black_box((word, prev));
        });
    });
    group.bench_function("unpack_4096_ops", |b| {
        let mut buffer = BacktraceBuffer::new();
        let (mut word, mut prev) = (0, ROOT_BLOCK);
        for i in 0..4096 {
            (word, prev) = buffer.append(word, prev, ops[i % ops.len()]).expect("append");
        }
        b.iter(|| black_box(buffer.unpack(word, prev).expect("unpack").len()));
    });
    group.finish();
}

criterion_group!(benches, bench_slab_cycle, bench_trace_append);
criterion_main!(benches);
