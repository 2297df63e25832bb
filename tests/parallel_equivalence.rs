#![cfg(feature = "parallel")]

use proptest::prelude::*;
use wfa_core::utils::{deterministic_dna, mutate_dna};
use wfa_core::{align_batch, align_batch_serial, AlignerBuilder};

fn full_edit(s: &[u8], t: &[u8]) -> i32 {
    let n = s.len();
    let m = t.len();
    let mut dp = vec![vec![0i32; m + 1]; n + 1];
    for i in 0..=n {
        dp[i][0] = i as i32;
    }
    for j in 0..=m {
        dp[0][j] = j as i32;
    }
    for i in 1..=n {
        for j in 1..=m {
            let sub = dp[i - 1][j - 1] + i32::from(s[i - 1] != t[j - 1]);
            let up = dp[i - 1][j] + 1;
            let left = dp[i][j - 1] + 1;
            dp[i][j] = sub.min(up).min(left);
        }
    }
    dp[n][m]
}

proptest! {
    #[test]
    fn edit_batch_matches_baseline(
        pairs in prop::collection::vec(("[ACGT]{0,12}", "[ACGT]{0,12}"), 0..24)
    ) {
        let attrs = AlignerBuilder::new().edit().reduction_none().into_attributes();
        let pairs: Vec<(Vec<u8>, Vec<u8>)> = pairs
            .into_iter()
            .map(|(a, b)| (a.into_bytes(), b.into_bytes()))
            .collect();
        let parallel = align_batch(&attrs, &pairs);
        let serial = align_batch_serial(&attrs, &pairs);
        prop_assert_eq!(parallel.len(), pairs.len());
        for ((p, s), (a, b)) in parallel.iter().zip(&serial).zip(&pairs) {
            let p = p.as_ref().unwrap();
            prop_assert_eq!(p.score, full_edit(a, b));
            prop_assert_eq!(p, s.as_ref().unwrap());
        }
    }
}

#[test]
fn low_memory_batch_matches_serial() {
    let attrs = AlignerBuilder::new()
        .low_memory(true)
        .reduction_none()
        .into_attributes();
    let pairs: Vec<(Vec<u8>, Vec<u8>)> = (0..64u64)
        .map(|seed| {
            let s = deterministic_dna(50 + (seed as usize * 7) % 300, seed);
            let t = mutate_dna(&s, 0.1, seed + 1000);
            (s, t)
        })
        .collect();
    let parallel = align_batch(&attrs, &pairs);
    let serial = align_batch_serial(&attrs, &pairs);
    for (p, s) in parallel.into_iter().zip(serial) {
        assert_eq!(p.unwrap(), s.unwrap());
    }
}
