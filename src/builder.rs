use std::sync::Arc;

use crate::aligner::WavefrontAligner;
use crate::attributes::{AlignerAttributes, AlignmentScope};
use crate::error::Result;
use crate::memory::MemoryTracker;
use crate::penalties::{AffinePenalties, Affine2pPenalties, LinearPenalties, Penalties};
use crate::reduction::ReductionStrategy;

#[derive(Clone, Debug, Default)]
pub struct AlignerBuilder {
    attributes: AlignerAttributes,
}

impl AlignerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attributes: AlignerAttributes) -> Self {
        Self { attributes }
    }

    pub fn edit(mut self) -> Self {
        self.attributes.penalties = Penalties::Edit;
        self
    }

    pub fn linear(mut self, mismatch: i32, indel: i32) -> Self {
        self.attributes.penalties = Penalties::Linear(LinearPenalties { mismatch, indel });
        self
    }

    pub fn affine(mut self, mismatch: i32, gap_opening: i32, gap_extension: i32) -> Self {
        self.attributes.penalties = Penalties::Affine(AffinePenalties {
            mismatch,
            gap_opening,
            gap_extension,
        });
        self
    }

    pub fn affine2p(
        mut self,
        mismatch: i32,
        gap_opening1: i32,
        gap_extension1: i32,
        gap_opening2: i32,
        gap_extension2: i32,
    ) -> Self {
        self.attributes.penalties = Penalties::Affine2p(Affine2pPenalties {
            mismatch,
            gap_opening1,
            gap_extension1,
            gap_opening2,
            gap_extension2,
        });
        self
    }

    pub fn penalties(mut self, penalties: Penalties) -> Self {
        self.attributes.penalties = penalties;
        self
    }

    pub fn score_only(mut self) -> Self {
        self.attributes.alignment_scope = AlignmentScope::Score;
        self
    }

    pub fn reduction_none(mut self) -> Self {
        self.attributes.reduction = ReductionStrategy::None;
        self
    }

    pub fn reduction_adaptive(
        mut self,
        min_wavefront_length: usize,
        max_distance_threshold: usize,
    ) -> Self {
        self.attributes.reduction =
            ReductionStrategy::adaptive(min_wavefront_length, max_distance_threshold);
        self
    }

    pub fn low_memory(mut self, low_memory: bool) -> Self {
        self.attributes.low_memory = low_memory;
        self
    }

    pub fn max_alignment_score(mut self, score: i32) -> Self {
        self.attributes.limits.max_alignment_score = score;
        self
    }

    pub fn max_memory_used(mut self, bytes: u64) -> Self {
        self.attributes.limits.max_memory_used = bytes;
        self
    }

    pub fn max_resident_memory(mut self, bytes: u64) -> Self {
        self.attributes.limits.max_resident_memory = bytes;
        self
    }

    pub fn limit_probe_interval(mut self, scores: u32) -> Self {
        self.attributes.limits.limit_probe_interval = scores;
        self
    }

    pub fn memory_tracker(mut self, tracker: Arc<MemoryTracker>) -> Self {
        self.attributes.memory_tracker = Some(tracker);
        self
    }

    pub fn attributes(&self) -> &AlignerAttributes {
        &self.attributes
    }

    pub fn into_attributes(self) -> AlignerAttributes {
        self.attributes
    }

    pub fn build(self, pattern_length: usize, text_length: usize) -> Result<WavefrontAligner> {
        WavefrontAligner::new(pattern_length, text_length, &self.attributes)
    }
}
