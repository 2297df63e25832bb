//! Example: global alignment of two short sequences under every metric.
//!
//! Run with:
//! `cargo run --example align`

use wfa_core::{AlignerBuilder, Cigar, CigarOp, Penalties};

fn main() -> wfa_core::Result<()> {
    let pattern = b"GATTACATTGCAGGT";
    let text = b"GCATTACAGCAGCGGT";

    let metrics = [
        ("edit", Penalties::Edit),
        (
            "gap-linear (x=4, e=2)",
            Penalties::Linear(wfa_core::LinearPenalties {
                mismatch: 4,
                indel: 2,
            }),
        ),
        ("gap-affine (x=4, o=6, e=2)", Penalties::default()),
        (
            "gap-affine 2p (x=4, o1=6, e1=2, o2=24, e2=1)",
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
            .build(pattern.len(), text.len())?;
        let alignment = aligner.align(pattern, text)?;
        println!("{name}");
        println!("  score: {}", alignment.score);
        if let Some(cigar) = &alignment.cigar {
            println!("  cigar: {cigar}");
            let (p, m, t) = materialize_alignment(pattern, text, cigar);
            println!("  P: {p}");
            println!("     {m}");
            println!("  T: {t}");
        }
        println!();
    }
    Ok(())
}

/// Render the script as three aligned rows: pattern, match marks, text.
fn materialize_alignment(pattern: &[u8], text: &[u8], cigar: &Cigar) -> (String, String, String) {
    let (mut p, mut m, mut t) = (String::new(), String::new(), String::new());
    let (mut v, mut h) = (0, 0);
    for &op in cigar.ops() {
        match op {
            CigarOp::Match | CigarOp::Mismatch => {
                p.push(pattern[v] as char);
                t.push(text[h] as char);
                m.push(if op == CigarOp::Match { '|' } else { '*' });
                v += 1;
                h += 1;
            }
            CigarOp::Insertion => {
                p.push('-');
                t.push(text[h] as char);
                m.push(' ');
                h += 1;
            }
            CigarOp::Deletion => {
                p.push(pattern[v] as char);
                t.push('-');
                m.push(' ');
                v += 1;
            }
        }
    }
    (p, m, t)
}
