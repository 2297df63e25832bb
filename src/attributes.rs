//! Aligner configuration.

use std::sync::Arc;

use crate::error::Result;
use crate::limits::ResourceLimits;
use crate::memory::MemoryTracker;
use crate::penalties::Penalties;
use crate::reduction::ReductionStrategy;

/// What a run produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AlignmentScope {
    /// Score only; old layers are recycled as soon as they leave the
    /// score window.
    Score,
    /// Score and edit script.
    #[default]
    Alignment,
}

/// Everything needed to build a [`WavefrontAligner`](crate::WavefrontAligner).
///
/// The default is gap-affine (mismatch 4, opening 6, extension 2), full
/// alignment, adaptive reduction (10, 50), high-memory mode and default
/// limits.
#[derive(Clone, Debug, Default)]
pub struct AlignerAttributes {
    pub penalties: Penalties,
    pub alignment_scope: AlignmentScope,
    pub reduction: ReductionStrategy,
    /// Keep only the score window and recover the script from piggyback
    /// trace words.
    pub low_memory: bool,
    pub limits: ResourceLimits,
    /// Shared tracker to report into; a private one is created when unset.
    pub memory_tracker: Option<Arc<MemoryTracker>>,
}

impl AlignerAttributes {
    pub fn validate(&self) -> Result<()> {
        self.penalties.validate()?;
        self.reduction.validate()?;
        self.limits.validate()
    }

    /// Whether layers live in a ring of `max_score_scope` slots.
    pub fn memory_modular(&self) -> bool {
        self.low_memory || self.alignment_scope == AlignmentScope::Score
    }

    /// Whether cells carry packed trace words.
    pub fn bt_piggyback(&self) -> bool {
        self.low_memory && self.alignment_scope == AlignmentScope::Alignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::penalties::DistanceMetric;

    #[test]
    fn defaults_match_documented_values() {
        let attrs = AlignerAttributes::default();
        assert_eq!(attrs.penalties.metric(), DistanceMetric::GapAffine);
        assert_eq!(attrs.alignment_scope, AlignmentScope::Alignment);
        assert_eq!(attrs.reduction, ReductionStrategy::adaptive(10, 50));
        assert!(!attrs.low_memory);
        assert!(attrs.memory_tracker.is_none());
        assert!(attrs.validate().is_ok());
    }

    #[test]
    fn memory_mode_flags() {
        let mut attrs = AlignerAttributes::default();
        assert!(!attrs.memory_modular());
        assert!(!attrs.bt_piggyback());

        attrs.low_memory = true;
        assert!(attrs.memory_modular());
        assert!(attrs.bt_piggyback());

        attrs.alignment_scope = AlignmentScope::Score;
        assert!(attrs.memory_modular());
        assert!(!attrs.bt_piggyback());

        attrs.low_memory = false;
        assert!(attrs.memory_modular());
        assert!(!attrs.bt_piggyback());
    }
}
