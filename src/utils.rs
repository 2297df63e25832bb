//! Assorted utilities and helpers.

/// Length of the longest common prefix of `a` and `b`.
///
/// Compares eight bytes at a time while both slices have a full word left,
/// then finishes byte by byte.
#[inline]
pub fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    let n = a.len().min(b.len());
    let mut i = 0;
    while i + 8 <= n {
        let x = u64::from_le_bytes(word(&a[i..i + 8]));
        let y = u64::from_le_bytes(word(&b[i..i + 8]));
        let diff = x ^ y;
        if diff != 0 {
            return i + (diff.trailing_zeros() / 8) as usize;
        }
        i += 8;
    }
    while i < n && a[i] == b[i] {
        i += 1;
    }
    i
}

#[inline]
fn word(bytes: &[u8]) -> [u8; 8] {
    let mut w = [0u8; 8];
    w.copy_from_slice(bytes);
    w
}

/// Deterministic pseudo-random DNA (xorshift), used by the probe binary,
/// benches and demos so every run aligns the same pairs.
pub fn deterministic_dna(len: usize, seed: u64) -> Vec<u8> {
    const ALPHABET: &[u8; 4] = b"ACGT";
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            ALPHABET[(state >> 62) as usize]
        })
        .collect()
}

/// Copy of `seq` with roughly `rate` of its positions edited (substitution,
/// insertion or deletion), deterministic in `seed`.
pub fn mutate_dna(seq: &[u8], rate: f64, seed: u64) -> Vec<u8> {
    const ALPHABET: &[u8; 4] = b"ACGT";
    let mut state = seed.wrapping_mul(0xD1B5_4A32_D192_ED03) | 1;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    let threshold = (rate.clamp(0.0, 1.0) * u32::MAX as f64) as u64;
    let mut out = Vec::with_capacity(seq.len() + seq.len() / 8);
    for &c in seq {
        if (next() >> 32) >= threshold {
            out.push(c);
            continue;
        }
        match next() % 3 {
            0 => out.push(ALPHABET[(next() >> 62) as usize]),
            1 => {
                out.push(c);
                out.push(ALPHABET[(next() >> 62) as usize]);
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_of_equal_slices_is_full_length() {
        let a = deterministic_dna(100, 3);
        assert_eq!(common_prefix_len(&a, &a), 100);
        assert_eq!(common_prefix_len(&a, &a[..37]), 37);
        assert_eq!(common_prefix_len(b"", b"ACGT"), 0);
    }

    #[test]
    fn prefix_stops_at_first_difference() {
        for at in 0..20 {
            let a = vec![b'A'; 20];
            let mut b = a.clone();
            b[at] = b'C';
            assert_eq!(common_prefix_len(&a, &b), at, "difference at {at}");
        }
    }

    #[test]
    fn dna_is_deterministic_and_in_alphabet() {
        let a = deterministic_dna(500, 42);
        assert_eq!(a, deterministic_dna(500, 42));
        assert_ne!(a, deterministic_dna(500, 43));
        assert!(a.iter().all(|c| b"ACGT".contains(c)));
    }

    #[test]
    fn zero_rate_mutation_is_identity() {
        let a = deterministic_dna(200, 7);
        assert_eq!(mutate_dna(&a, 0.0, 1), a);
        assert_ne!(mutate_dna(&a, 0.2, 1), a);
    }
}
