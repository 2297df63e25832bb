use crate::utils::common_prefix_len;
use crate::wavefront::{Wavefront, OFFSET_NULL};

/// Slide every cell of `wf` along its diagonal while pattern and text
/// agree. Returns the number of matches consumed across the band.
pub fn extend_matches(wf: &mut Wavefront, pattern: &[u8], text: &[u8]) -> usize {
    let mut total = 0;
    for k in wf.lo()..=wf.hi() {
        let offset = wf.offset(k);
        if offset == OFFSET_NULL {
            continue;
        }
        let (v, h) = ((offset - k) as usize, offset as usize);
        let (Some(p), Some(t)) = (pattern.get(v..), text.get(h..)) else {
            continue;
        };
        let n = common_prefix_len(p, t);
        if n > 0 {
            wf.set(k, offset + n as i32);
            total += n;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slab::WavefrontSlab;

    #[test]
    fn extends_each_diagonal_independently() {
        let mut slab = WavefrontSlab::new(false);
        let mut wf = slab.acquire(-1, 1).unwrap();
        wf.set(-1, 0);
        wf.set(0, 0);
        wf.set(1, OFFSET_NULL);
        let pattern = b"AACGT";
        let text = b"ACGTT";
        let n = extend_matches(&mut wf, pattern, text);
        // k=0: A==A then A!=C; k=-1 starts at v=1: ACGT vs ACGTT
        assert_eq!(wf.offset(0), 1);
        assert_eq!(wf.offset(-1), 4);
        assert_eq!(wf.offset(1), OFFSET_NULL);
        assert_eq!(n, 5);
    }

    #[test]
    fn stops_at_sequence_end() {
        let mut slab = WavefrontSlab::new(false);
        let mut wf = slab.acquire(0, 0).unwrap();
        wf.set(0, 0);
        extend_matches(&mut wf, b"ACGT", b"ACGT");
        assert_eq!(wf.offset(0), 4);
        extend_matches(&mut wf, b"ACGT", b"ACGT");
        assert_eq!(wf.offset(0), 4);
    }
}
