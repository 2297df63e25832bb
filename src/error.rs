//! Error types shared by the aligner and its storage layers.

use thiserror::Error;

use crate::penalties::DistanceMetric;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AlignerError>;

/// Everything that can go wrong while configuring or running an aligner.
///
/// Configuration errors are reported by the offending constructor or
/// setter. Limit failures abort the current run only: the aligner ends up
/// in [`AlignerState::Aborted`](crate::aligner::AlignerState) and can be
/// cleared and reused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlignerError {
    #[error("sequence length {length} exceeds the supported maximum of {max}")]
    LengthTooLarge { length: usize, max: usize },

    #[error("invalid penalties for {metric:?}: {reason}")]
    InvalidPenalties {
        metric: DistanceMetric,
        reason: &'static str,
    },

    #[error("invalid reduction: {0}")]
    InvalidReduction(&'static str),

    #[error("invalid resource limits: {0}")]
    InvalidLimits(&'static str),

    #[error("{sequence} length {length} exceeds the declared length {declared}; call clear_resize first")]
    SequenceTooLong {
        sequence: &'static str,
        length: usize,
        declared: usize,
    },

    #[error("alignment score {score} exceeded the limit of {limit}")]
    MaxScoreReached { score: i32, limit: i32 },

    #[error("memory footprint of {used} bytes exceeded the limit of {limit} bytes")]
    MaxMemoryReached { used: u64, limit: u64 },

    #[error("failed to allocate {bytes} bytes of {what}")]
    AllocationFailed { what: &'static str, bytes: usize },

    #[error("backtrace lost its path at score {score}, diagonal {diagonal}")]
    BacktraceFailed { score: i32, diagonal: i32 },
}

impl AlignerError {
    /// True for the run-time limit failures that leave the aligner reusable.
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            AlignerError::MaxScoreReached { .. } | AlignerError::MaxMemoryReached { .. }
        )
    }
}

/// Grow `vec` to `len` elements filled with `fill`, reporting allocation
/// failure instead of aborting the process.
pub(crate) fn try_grow<T: Clone>(
    vec: &mut Vec<T>,
    len: usize,
    fill: T,
    what: &'static str,
) -> Result<()> {
    if vec.len() >= len {
        return Ok(());
    }
    let additional = len - vec.len();
    vec.try_reserve_exact(additional)
        .map_err(|_| AlignerError::AllocationFailed {
            what,
            bytes: additional.saturating_mul(std::mem::size_of::<T>()),
        })?;
    vec.resize(len, fill);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_errors_are_classified() {
        assert!(AlignerError::MaxScoreReached { score: 9, limit: 8 }.is_limit());
        assert!(AlignerError::MaxMemoryReached { used: 9, limit: 8 }.is_limit());
        assert!(!AlignerError::BacktraceFailed {
            score: 1,
            diagonal: 0
        }
        .is_limit());
    }

    #[test]
    fn try_grow_only_grows() {
        let mut v = vec![1u32, 2, 3];
        try_grow(&mut v, 2, 0, "test").unwrap();
        assert_eq!(v, vec![1, 2, 3]);
        try_grow(&mut v, 5, 7, "test").unwrap();
        assert_eq!(v, vec![1, 2, 3, 7, 7]);
    }

    #[test]
    fn messages_mention_the_limit() {
        let msg = AlignerError::MaxScoreReached { score: 12, limit: 10 }.to_string();
        assert!(msg.contains("12") && msg.contains("10"));
    }

    #[test]
    fn configuration_errors_name_their_area() {
        let limits = AlignerError::InvalidLimits("limit probe interval must be at least 1");
        assert!(!limits.is_limit());
        assert!(limits.to_string().starts_with("invalid resource limits"));
        let reduction = AlignerError::InvalidReduction("min_wavefront_length must be positive");
        assert!(reduction.to_string().starts_with("invalid reduction"));
    }
}
