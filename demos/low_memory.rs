//! Example: footprint of the three memory modes on one long pair, with a
//! shared tracker and a reused aligner.
//!
//! Run with:
//! `cargo run --release --example low_memory`

use wfa_core::utils::{deterministic_dna, mutate_dna};
use wfa_core::{AlignerBuilder, MemoryTracker};

fn main() -> wfa_core::Result<()> {
    let pattern = deterministic_dna(20_000, 1);
    let text = mutate_dna(&pattern, 0.05, 2);
    let tracker = MemoryTracker::shared();

    for (mode, low_memory, score_only) in [
        ("high memory", false, false),
        ("low memory", true, false),
        ("score only", false, true),
    ] {
        let mut builder = AlignerBuilder::new()
            .low_memory(low_memory)
            .memory_tracker(tracker.clone());
        if score_only {
            builder = builder.score_only();
        }
        let mut aligner = builder.build(pattern.len(), text.len())?;
        let alignment = aligner.align(&pattern, &text)?;
        let score = alignment.score;
        let ops = alignment.cigar.as_ref().map_or(0, |c| c.len());
        println!(
            "{mode:>12}: score={score} ops={ops} footprint={} KiB tracker={} KiB",
            aligner.get_size() / 1024,
            tracker.allocated() / 1024
        );

        let released = aligner.reap();
        println!("{:>12}  reaped {} KiB, result still {:?}", "", released / 1024, aligner.score());
    }

    println!("peak across modes: {} KiB", tracker.peak() / 1024);
    println!("after drop: {} bytes tracked", tracker.allocated());
    Ok(())
}
