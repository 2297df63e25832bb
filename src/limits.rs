//! Per-run resource limits.

use crate::error::{AlignerError, Result};

/// Footprint above which `clear` also reaps, in bytes.
pub const DEFAULT_MAX_RESIDENT_MEMORY: u64 = 256 * 1024 * 1024;

/// Scores between two limit probes.
pub const DEFAULT_LIMIT_PROBE_INTERVAL: u32 = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Highest score a run may reach before it is aborted.
    pub max_alignment_score: i32,
    /// Highest footprint (`get_size`) a run may reach before it is aborted.
    pub max_memory_used: u64,
    /// Footprint that makes `clear` return memory to the system.
    pub max_resident_memory: u64,
    pub limit_probe_interval: u32,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        ResourceLimits {
            max_alignment_score: i32::MAX,
            max_memory_used: u64::MAX,
            max_resident_memory: DEFAULT_MAX_RESIDENT_MEMORY,
            limit_probe_interval: DEFAULT_LIMIT_PROBE_INTERVAL,
        }
    }
}

impl ResourceLimits {
    pub fn validate(&self) -> Result<()> {
        if self.limit_probe_interval == 0 {
            return Err(AlignerError::InvalidLimits(
                "limit probe interval must be at least 1",
            ));
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn should_probe(&self, score: i32) -> bool {
        score >= 0 && (score as u32) % self.limit_probe_interval.max(1) == 0
    }

    pub(crate) fn check_score(&self, score: i32) -> Result<()> {
        if score > self.max_alignment_score {
            return Err(AlignerError::MaxScoreReached {
                score,
                limit: self.max_alignment_score,
            });
        }
        Ok(())
    }

    pub(crate) fn check_memory(&self, used: u64) -> Result<()> {
        if used > self.max_memory_used {
            return Err(AlignerError::MaxMemoryReached {
                used,
                limit: self.max_memory_used,
            });
        }
        Ok(())
    }

    /// Both limits, as probed during a run.
    pub(crate) fn check(&self, score: i32, used: u64) -> Result<()> {
        self.check_score(score)?;
        self.check_memory(used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_never_trigger() {
        let limits = ResourceLimits::default();
        assert!(limits.check(1_000_000, 1 << 40).is_ok());
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn probe_interval_gates_checks() {
        let limits = ResourceLimits {
            limit_probe_interval: 4,
            ..Default::default()
        };
        assert!(limits.should_probe(8));
        assert!(!limits.should_probe(9));
        let every = ResourceLimits {
            limit_probe_interval: 1,
            ..Default::default()
        };
        assert!((1..20).all(|s| every.should_probe(s)));
    }

    #[test]
    fn exceeding_limits_reports_values() {
        let limits = ResourceLimits {
            max_alignment_score: 10,
            max_memory_used: 100,
            ..Default::default()
        };
        assert_eq!(
            limits.check(11, 0),
            Err(AlignerError::MaxScoreReached { score: 11, limit: 10 })
        );
        assert_eq!(
            limits.check(10, 101),
            Err(AlignerError::MaxMemoryReached {
                used: 101,
                limit: 100
            })
        );
        assert!(limits.check(10, 100).is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let limits = ResourceLimits {
            limit_probe_interval: 0,
            ..Default::default()
        };
        assert_eq!(
            limits.validate(),
            Err(AlignerError::InvalidLimits(
                "limit probe interval must be at least 1"
            ))
        );
    }
}
