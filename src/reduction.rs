//! Wavefront reduction.
//!
//! The adaptive heuristic measures, for every diagonal of the M component,
//! how far its furthest-reaching cell still is from the end of both
//! sequences, and drops diagonals at the band edges that trail the closest
//! one by more than a threshold. Trimming a band below a minimum width is
//! skipped. Narrower bands mean less work per score at the price of
//! possibly missing the optimum.

use crate::error::{AlignerError, Result};
use crate::wavefront::{Wavefront, OFFSET_NULL};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReductionStrategy {
    /// Keep every diagonal; the result is optimal.
    None,
    Adaptive {
        min_wavefront_length: usize,
        max_distance_threshold: usize,
    },
}

impl Default for ReductionStrategy {
    fn default() -> Self {
        ReductionStrategy::Adaptive {
            min_wavefront_length: 10,
            max_distance_threshold: 50,
        }
    }
}

impl ReductionStrategy {
    pub fn adaptive(min_wavefront_length: usize, max_distance_threshold: usize) -> Self {
        ReductionStrategy::Adaptive {
            min_wavefront_length,
            max_distance_threshold,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ReductionStrategy::None)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            ReductionStrategy::Adaptive {
                max_distance_threshold,
                ..
            } if max_distance_threshold > i32::MAX as usize => Err(
                AlignerError::InvalidReduction("max distance threshold exceeds i32 range"),
            ),
            _ => Ok(()),
        }
    }
}

/// Remaining distance to the end from the cell on diagonal `k` reaching
/// text position `offset`.
#[inline]
fn distance_to_end(offset: i32, k: i32, plen: i32, tlen: i32) -> i64 {
    if offset == OFFSET_NULL {
        return i64::MAX;
    }
    let left_v = (plen - (offset - k)) as i64;
    let left_h = (tlen - offset) as i64;
    left_v.max(left_h)
}

/// Band `[lo, hi]` that survives adaptive reduction of `m`, or `None` when
/// nothing should be trimmed at this score.
pub(crate) fn reduced_band(
    m: &Wavefront,
    plen: i32,
    tlen: i32,
    min_wavefront_length: usize,
    max_distance_threshold: usize,
) -> Option<(i32, i32)> {
    if m.is_empty() || m.width() < min_wavefront_length {
        return None;
    }
    let (lo, hi) = (m.lo(), m.hi());
    let dist = |k: i32| distance_to_end(m.offset(k), k, plen, tlen);
    let min_distance = (lo..=hi).map(dist).min()?;
    if min_distance == i64::MAX {
        return None;
    }
    let trails = |k: i32| dist(k).saturating_sub(min_distance) > max_distance_threshold as i64;

    let mut new_lo = lo;
    while new_lo < hi && trails(new_lo) {
        new_lo += 1;
    }
    let mut new_hi = hi;
    while new_hi > new_lo && trails(new_hi) {
        new_hi -= 1;
    }
    if new_lo == lo && new_hi == hi {
        return None;
    }
    if ((new_hi - new_lo + 1) as usize) < min_wavefront_length {
        return None;
    }
    Some((new_lo, new_hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slab::WavefrontSlab;

    fn band(slab: &mut WavefrontSlab, lo: i32, offsets: &[i32]) -> Wavefront {
        let hi = lo + offsets.len() as i32 - 1;
        let mut wf = slab.acquire(lo, hi).unwrap();
        for (i, off) in offsets.iter().enumerate() {
            wf.set(lo + i as i32, *off);
        }
        wf
    }

    #[test]
    fn trailing_edges_are_trimmed() {
        let mut slab = WavefrontSlab::new(false);
        // plen = tlen = 100; the diagonal 0 cell at h=90 leads
        let wf = band(&mut slab, -3, &[2, 40, 85, 90, 60, 1, 0]);
        let got = reduced_band(&wf, 100, 100, 2, 20);
        assert_eq!(got, Some((-1, 0)));
    }

    #[test]
    fn minimum_width_skips_the_trim() {
        let mut slab = WavefrontSlab::new(false);
        let wf = band(&mut slab, -3, &[2, 40, 85, 90, 60, 1, 0]);
        assert_eq!(reduced_band(&wf, 100, 100, 3, 20), None);
        assert_eq!(reduced_band(&wf, 100, 100, 8, 0), None);
    }

    #[test]
    fn large_threshold_keeps_everything() {
        let mut slab = WavefrontSlab::new(false);
        let wf = band(&mut slab, -3, &[2, 40, 85, 90, 60, 1, 0]);
        assert_eq!(reduced_band(&wf, 100, 100, 1, 200), None);
    }

    #[test]
    fn null_edges_count_as_trailing() {
        let mut slab = WavefrontSlab::new(false);
        let wf = band(&mut slab, 0, &[OFFSET_NULL, 50, 50, OFFSET_NULL]);
        assert_eq!(reduced_band(&wf, 100, 100, 1, 1000), Some((1, 2)));
    }

    #[test]
    fn default_is_adaptive() {
        assert_eq!(ReductionStrategy::default(), ReductionStrategy::adaptive(10, 50));
        assert!(ReductionStrategy::None.is_none());
    }
}
