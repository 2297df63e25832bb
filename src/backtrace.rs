//! Edit-script reconstruction.
//!
//! Two strategies produce the same script for the same run:
//! - [`replay`] walks a piggyback operation history forward from the
//!   origin, re-extending matches between operations;
//! - [`backtrace_wavefronts`] walks backwards from the end cell through
//!   every retained layer, re-evaluating each recurrence with the same
//!   tie order the kernels use.

use crate::bt_buffer::PiggybackOp;
use crate::cigar::{Cigar, CigarOp};
use crate::components::WavefrontComponents;
use crate::error::{AlignerError, Result};
use crate::penalties::WavefrontPenalties;
use crate::utils::common_prefix_len;
use crate::wavefront::{nullify, Component, OFFSET_NULL};

fn lost(score: i32, diagonal: i32) -> AlignerError {
    AlignerError::BacktraceFailed { score, diagonal }
}

/// Rebuild the script from a piggyback history, oldest operation first.
/// `score` only labels errors.
pub(crate) fn replay(
    ops: &[PiggybackOp],
    pattern: &[u8],
    text: &[u8],
    score: i32,
) -> Result<Cigar> {
    let (plen, tlen) = (pattern.len(), text.len());
    let mut cigar = Cigar::new();
    let (mut v, mut h) = (0usize, 0usize);
    let diagonal = |v: usize, h: usize| h as i32 - v as i32;

    let extend = |cigar: &mut Cigar, v: &mut usize, h: &mut usize| {
        let n = common_prefix_len(&pattern[*v..], &text[*h..]);
        cigar.push_n(CigarOp::Match, n);
        *v += n;
        *h += n;
    };

    extend(&mut cigar, &mut v, &mut h);
    for (i, &op) in ops.iter().enumerate() {
        if op == PiggybackOp::Mismatch {
            if v >= plen || h >= tlen {
                return Err(lost(score, diagonal(v, h)));
            }
            cigar.push(CigarOp::Mismatch);
            v += 1;
            h += 1;
        } else if op.is_insertion() {
            if h >= tlen {
                return Err(lost(score, diagonal(v, h)));
            }
            cigar.push(CigarOp::Insertion);
            h += 1;
        } else {
            if v >= plen {
                return Err(lost(score, diagonal(v, h)));
            }
            cigar.push(CigarOp::Deletion);
            v += 1;
        }
        let gap_continues = op
            .continuation()
            .is_some_and(|next| ops.get(i + 1) == Some(&next));
        if !gap_continues {
            extend(&mut cigar, &mut v, &mut h);
        }
    }

    if v != plen || h != tlen {
        return Err(lost(score, diagonal(v, h)));
    }
    Ok(cigar)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    M,
    Ins(usize),
    Del(usize),
}

#[derive(Clone, Copy)]
enum Source {
    Mismatch,
    LinearIns,
    LinearDel,
    Gap(State),
}

/// Rebuild the script from the stored layers of a non-modular run that
/// finished at `score` on the end diagonal.
pub(crate) fn backtrace_wavefronts(
    components: &WavefrontComponents,
    penalties: &WavefrontPenalties,
    pattern: &[u8],
    text: &[u8],
    score: i32,
) -> Result<Cigar> {
    let (plen, tlen) = (pattern.len() as i32, text.len() as i32);
    let fetch = |c: Component, s: i32, k: i32| {
        components
            .get(c, s)
            .map_or(OFFSET_NULL, |wf| wf.offset(k))
    };
    let affine = penalties.has_gap_components();
    let pieces = &penalties.pieces[..penalties.num_pieces];
    let x = penalties.mismatch;

    let mut s = score;
    let mut k = tlen - plen;
    let mut off = fetch(Component::M, s, k);
    if off != tlen {
        return Err(lost(s, k));
    }
    let mut state = State::M;
    let mut cigar = Cigar::new();

    loop {
        match state {
            State::M => {
                if s == 0 {
                    if k != 0 || off < 0 {
                        return Err(lost(s, k));
                    }
                    cigar.push_n(CigarOp::Match, off as usize);
                    break;
                }
                let mut best = fetch(Component::M, s - x, k) + 1;
                let mut source = Source::Mismatch;
                if affine {
                    for p in 0..pieces.len() {
                        let ins = fetch(Component::insertion(p), s, k);
                        if ins > best {
                            best = ins;
                            source = Source::Gap(State::Ins(p));
                        }
                    }
                    for p in 0..pieces.len() {
                        let del = fetch(Component::deletion(p), s, k);
                        if del > best {
                            best = del;
                            source = Source::Gap(State::Del(p));
                        }
                    }
                } else {
                    let e = pieces[0].extension;
                    let ins = fetch(Component::M, s - e, k - 1) + 1;
                    if ins > best {
                        best = ins;
                        source = Source::LinearIns;
                    }
                    let del = fetch(Component::M, s - e, k + 1);
                    if del > best {
                        best = del;
                        source = Source::LinearDel;
                    }
                }
                if nullify(best, k, plen, tlen) == OFFSET_NULL || best > off {
                    return Err(lost(s, k));
                }
                cigar.push_n(CigarOp::Match, (off - best) as usize);
                off = best;
                match source {
                    Source::Mismatch => {
                        cigar.push(CigarOp::Mismatch);
                        s -= x;
                        off -= 1;
                    }
                    Source::LinearIns => {
                        cigar.push(CigarOp::Insertion);
                        s -= pieces[0].extension;
                        k -= 1;
                        off -= 1;
                    }
                    Source::LinearDel => {
                        cigar.push(CigarOp::Deletion);
                        s -= pieces[0].extension;
                        k += 1;
                    }
                    Source::Gap(gap) => state = gap,
                }
            }
            State::Ins(p) => {
                let piece = pieces[p];
                let open = fetch(Component::M, s - piece.open_cost(), k - 1) + 1;
                let ext = fetch(Component::insertion(p), s - piece.extension, k - 1) + 1;
                cigar.push(CigarOp::Insertion);
                if ext > open {
                    if ext != off {
                        return Err(lost(s, k));
                    }
                    s -= piece.extension;
                } else {
                    if open != off {
                        return Err(lost(s, k));
                    }
                    s -= piece.open_cost();
                    state = State::M;
                }
                k -= 1;
                off -= 1;
            }
            State::Del(p) => {
                let piece = pieces[p];
                let open = fetch(Component::M, s - piece.open_cost(), k + 1);
                let ext = fetch(Component::deletion(p), s - piece.extension, k + 1);
                cigar.push(CigarOp::Deletion);
                if ext > open {
                    if ext != off {
                        return Err(lost(s, k));
                    }
                    s -= piece.extension;
                } else {
                    if open != off {
                        return Err(lost(s, k));
                    }
                    s -= piece.open_cost();
                    state = State::M;
                }
                k += 1;
            }
        }
        if s < 0 {
            return Err(lost(s, k));
        }
    }

    cigar.reverse();
    Ok(cigar)
}
