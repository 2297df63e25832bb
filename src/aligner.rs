//! The wavefront aligner.
//!
//! A [`WavefrontAligner`] owns all storage a run needs: the score-indexed
//! components, the slab they are recycled through, the backtrace buffer,
//! the null and victim sentinels and the link to a memory tracker. It is
//! built once for a maximum pattern/text length and reused across
//! alignments; storage grows to the largest run seen and stays there until
//! [`reap`](WavefrontAligner::reap) (or `clear` above the resident limit)
//! hands it back.
//!
//! Each run goes score by score: compute every component at the next score
//! from lower ones, extend M along matching characters, stop once the end
//! diagonal reaches the end of the text, otherwise reduce the band and
//! probe the resource limits.

use std::ops::Range;

use crate::attributes::{AlignerAttributes, AlignmentScope};
use crate::backtrace::{backtrace_wavefronts, replay};
use crate::bt_buffer::{BacktraceBuffer, ROOT_BLOCK};
use crate::cigar::Cigar;
use crate::components::WavefrontComponents;
use crate::error::{AlignerError, Result};
use crate::kernels::{extend_matches, kernel_for, ComputeContext};
use crate::limits::ResourceLimits;
use crate::memory::{AllocatorHandle, AllocatorOwnership};
use crate::penalties::{DistanceMetric, Penalties, WavefrontPenalties};
use crate::reduction::{reduced_band, ReductionStrategy};
use crate::slab::WavefrontSlab;
use crate::traits::DistanceKernel;
use crate::wavefront::{Component, Wavefront};

/// Longest pattern or text an aligner accepts.
pub const MAX_SEQUENCE_LENGTH: usize = (i32::MAX / 4) as usize;

/// Victim storage never grows past this many diagonals; writes beyond it
/// are discarded like any other victim write.
const VICTIM_MAX_CAPACITY: usize = 4096;

/// Why the last run stopped early.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    MaxScore,
    MaxMemory,
    Allocation,
    Backtrace,
}

impl From<&AlignerError> for AbortReason {
    fn from(err: &AlignerError) -> Self {
        match err {
            AlignerError::MaxScoreReached { .. } => AbortReason::MaxScore,
            AlignerError::MaxMemoryReached { .. } => AbortReason::MaxMemory,
            AlignerError::BacktraceFailed { .. } => AbortReason::Backtrace,
            _ => AbortReason::Allocation,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlignerState {
    Ready,
    Running,
    Completed,
    Aborted(AbortReason),
}

/// Result of a completed run. Global alignment always covers both
/// sequences in full.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alignment {
    pub score: i32,
    /// Present when the aligner was built for full alignment.
    pub cigar: Option<Cigar>,
    pub pattern_range: Range<usize>,
    pub text_range: Range<usize>,
}

pub struct WavefrontAligner {
    penalties: Penalties,
    wf_penalties: WavefrontPenalties,
    scope: AlignmentScope,
    reduction: ReductionStrategy,
    limits: ResourceLimits,
    kernel: Box<dyn DistanceKernel>,
    memory_modular: bool,
    bt_piggyback: bool,
    pattern_length: usize,
    text_length: usize,
    components: WavefrontComponents,
    slab: WavefrontSlab,
    bt_buffer: BacktraceBuffer,
    null: Wavefront,
    victim: Wavefront,
    allocator: AllocatorHandle,
    state: AlignerState,
    alignment: Option<Alignment>,
}

impl std::fmt::Debug for WavefrontAligner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavefrontAligner")
            .field("penalties", &self.penalties)
            .field("scope", &self.scope)
            .field("reduction", &self.reduction)
            .field("pattern_length", &self.pattern_length)
            .field("text_length", &self.text_length)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn check_length(length: usize) -> Result<()> {
    if length > MAX_SEQUENCE_LENGTH {
        return Err(AlignerError::LengthTooLarge {
            length,
            max: MAX_SEQUENCE_LENGTH,
        });
    }
    Ok(())
}

/// Victim covering the diagonals of a `pattern_length x text_length` grid,
/// up to [`VICTIM_MAX_CAPACITY`].
fn provision_victim(pattern_length: usize, text_length: usize) -> Result<Wavefront> {
    let width = (pattern_length + text_length + 1).min(VICTIM_MAX_CAPACITY);
    Wavefront::victim(-(pattern_length as i32), width)
}

impl WavefrontAligner {
    pub fn new(
        pattern_length: usize,
        text_length: usize,
        attributes: &AlignerAttributes,
    ) -> Result<Self> {
        check_length(pattern_length)?;
        check_length(text_length)?;
        attributes.validate()?;
        let wf_penalties = WavefrontPenalties::new(&attributes.penalties)?;
        let memory_modular = attributes.memory_modular();
        let bt_piggyback = attributes.bt_piggyback();
        let allocator = match &attributes.memory_tracker {
            Some(tracker) => AllocatorHandle::borrowed(tracker.clone()),
            None => AllocatorHandle::owned(),
        };

        let mut aligner = WavefrontAligner {
            penalties: attributes.penalties,
            wf_penalties,
            scope: attributes.alignment_scope,
            reduction: attributes.reduction,
            limits: attributes.limits,
            kernel: kernel_for(&wf_penalties),
            memory_modular,
            bt_piggyback,
            pattern_length,
            text_length,
            components: WavefrontComponents::new(memory_modular, wf_penalties.max_score_scope()),
            slab: WavefrontSlab::new(bt_piggyback),
            bt_buffer: BacktraceBuffer::new(),
            null: Wavefront::null(),
            victim: provision_victim(pattern_length, text_length)?,
            allocator,
            state: AlignerState::Ready,
            alignment: None,
        };
        aligner.sync_memory();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            metric = ?aligner.distance_metric(),
            memory_modular,
            bt_piggyback,
            max_score_scope = aligner.max_score_scope(),
            "aligner ready"
        );
        Ok(aligner)
    }

    pub fn state(&self) -> AlignerState {
        self.state
    }

    /// Result of the last completed run. Survives `reap`, dropped by `clear`.
    pub fn alignment(&self) -> Option<&Alignment> {
        self.alignment.as_ref()
    }

    pub fn score(&self) -> Option<i32> {
        self.alignment.as_ref().map(|a| a.score)
    }

    pub fn cigar(&self) -> Option<&Cigar> {
        self.alignment.as_ref().and_then(|a| a.cigar.as_ref())
    }

    pub fn pattern_length(&self) -> usize {
        self.pattern_length
    }

    pub fn text_length(&self) -> usize {
        self.text_length
    }

    pub fn penalties(&self) -> &Penalties {
        &self.penalties
    }

    pub fn distance_metric(&self) -> DistanceMetric {
        self.wf_penalties.metric
    }

    pub fn alignment_scope(&self) -> AlignmentScope {
        self.scope
    }

    pub fn reduction(&self) -> ReductionStrategy {
        self.reduction
    }

    pub fn memory_modular(&self) -> bool {
        self.memory_modular
    }

    pub fn bt_piggyback(&self) -> bool {
        self.bt_piggyback
    }

    pub fn max_score_scope(&self) -> usize {
        self.components.max_score_scope()
    }

    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    pub fn allocator_ownership(&self) -> AllocatorOwnership {
        self.allocator.ownership()
    }

    /// Bytes reported to the memory tracker so far.
    pub fn reported_memory(&self) -> u64 {
        self.allocator.reported()
    }

    pub fn set_reduction_none(&mut self) {
        self.reduction = ReductionStrategy::None;
    }

    pub fn set_reduction_adaptive(
        &mut self,
        min_wavefront_length: usize,
        max_distance_threshold: usize,
    ) -> Result<()> {
        let reduction = ReductionStrategy::adaptive(min_wavefront_length, max_distance_threshold);
        reduction.validate()?;
        self.reduction = reduction;
        Ok(())
    }

    pub fn set_max_alignment_score(&mut self, score: i32) {
        self.limits.max_alignment_score = score;
    }

    pub fn set_max_memory_used(&mut self, bytes: u64) {
        self.limits.max_memory_used = bytes;
    }

    pub fn set_max_resident_memory(&mut self, bytes: u64) {
        self.limits.max_resident_memory = bytes;
    }

    pub fn set_limit_probe_interval(&mut self, scores: u32) -> Result<()> {
        let limits = ResourceLimits {
            limit_probe_interval: scores,
            ..self.limits
        };
        limits.validate()?;
        self.limits = limits;
        Ok(())
    }

    /// Current footprint in bytes: every wavefront the slab created (live
    /// or free), the backtrace buffer, the score window and the sentinels.
    pub fn get_size(&self) -> u64 {
        (self.slab.size_in_bytes()
            + self.bt_buffer.size_in_bytes()
            + self.components.size_in_bytes()
            + self.null.size_in_bytes()
            + self.victim.size_in_bytes()) as u64
    }

    fn sync_memory(&mut self) {
        let size = self.get_size();
        self.allocator.sync(size);
    }

    /// Return every layer to the slab, reset the buffer to its root and
    /// drop the result. Storage is kept for the next run unless the
    /// footprint is above `max_resident_memory`, in which case it is
    /// reaped.
    pub fn clear(&mut self) {
        self.components.release_all(&mut self.slab);
        self.bt_buffer.clear();
        self.alignment = None;
        self.state = AlignerState::Ready;
        if self.get_size() > self.limits.max_resident_memory {
            #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
            let released = self.reap();
            #[cfg(feature = "tracing")]
            tracing::debug!(released, "footprint above resident limit, reaped on clear");
        }
        self.sync_memory();
    }

    /// Clear and accept sequences up to the new lengths. Victim storage
    /// only ever grows.
    pub fn clear_resize(&mut self, pattern_length: usize, text_length: usize) -> Result<()> {
        check_length(pattern_length)?;
        check_length(text_length)?;
        self.clear();
        let wanted = (pattern_length + text_length + 1).min(VICTIM_MAX_CAPACITY);
        if wanted > self.victim.capacity() {
            self.victim = provision_victim(pattern_length, text_length)?;
            #[cfg(feature = "tracing")]
            tracing::debug!(capacity = wanted, "victim grown");
        }
        self.pattern_length = pattern_length;
        self.text_length = text_length;
        self.sync_memory();
        Ok(())
    }

    /// Give back every byte not needed to keep the aligner usable. The last
    /// result stays readable. Returns the bytes released.
    pub fn reap(&mut self) -> u64 {
        let before = self.get_size();
        self.components.release_all(&mut self.slab);
        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
        let (slab, buffer, window) = (
            self.slab.reap(),
            self.bt_buffer.reap(),
            self.components.reap(),
        );
        let released = before.saturating_sub(self.get_size());
        if released > 0 {
            #[cfg(feature = "tracing")]
            tracing::debug!(slab, buffer, window, released, "reaped");
        }
        self.sync_memory();
        released
    }

    /// Align `pattern` against `text` globally. A previous result is
    /// cleared first.
    pub fn align(&mut self, pattern: &[u8], text: &[u8]) -> Result<&Alignment> {
        if pattern.len() > self.pattern_length {
            return Err(AlignerError::SequenceTooLong {
                sequence: "pattern",
                length: pattern.len(),
                declared: self.pattern_length,
            });
        }
        if text.len() > self.text_length {
            return Err(AlignerError::SequenceTooLong {
                sequence: "text",
                length: text.len(),
                declared: self.text_length,
            });
        }
        if self.state != AlignerState::Ready {
            self.clear();
        }

        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "wavefront_align",
            plen = pattern.len(),
            tlen = text.len(),
            metric = ?self.distance_metric()
        );
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        self.state = AlignerState::Running;
        let outcome = self.run(pattern, text);
        self.sync_memory();
        match outcome {
            Ok(alignment) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(score = alignment.score, size = self.get_size(), "alignment completed");
                self.state = AlignerState::Completed;
                Ok(self.alignment.insert(alignment))
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %err, "alignment aborted");
                self.state = AlignerState::Aborted(AbortReason::from(&err));
                Err(err)
            }
        }
    }

    fn run(&mut self, pattern: &[u8], text: &[u8]) -> Result<Alignment> {
        let plen = pattern.len() as i32;
        let tlen = text.len() as i32;
        let k_end = tlen - plen;
        let scope = self.components.max_score_scope() as i32;

        let mut origin = self.slab.acquire(0, 0)?;
        origin.set(0, 0);
        origin.set_trace(0, 0, ROOT_BLOCK);
        extend_matches(&mut origin, pattern, text);
        self.components.store(Component::M, 0, Some(origin), &mut self.slab)?;

        let mut score = 0;
        let mut last_live = 0;
        while !self.reached_end(score, k_end, tlen) {
            score += 1;
            {
                let mut ctx = ComputeContext {
                    components: &mut self.components,
                    slab: &mut self.slab,
                    bt_buffer: &mut self.bt_buffer,
                    null: &self.null,
                    victim: &mut self.victim,
                    piggyback: self.bt_piggyback,
                    pattern_length: plen,
                    text_length: tlen,
                };
                self.kernel.compute(&mut ctx, score)?;
            }
            if let Some(m) = self.components.get_mut(Component::M, score) {
                extend_matches(m, pattern, text);
            }
            if self.is_live(score) {
                last_live = score;
            } else if score - last_live > scope {
                // nothing left to grow from
                return Err(AlignerError::BacktraceFailed {
                    score,
                    diagonal: k_end,
                });
            }
            if self.reached_end(score, k_end, tlen) {
                break;
            }
            self.reduce(score, plen, tlen);
            if self.limits.should_probe(score) {
                self.limits.check(score, self.get_size())?;
            }
        }
        self.limits.check_score(score)?;

        let cigar = match self.scope {
            AlignmentScope::Score => None,
            AlignmentScope::Alignment => Some(self.backtrace(pattern, text, score, k_end)?),
        };
        Ok(Alignment {
            score,
            cigar,
            pattern_range: 0..pattern.len(),
            text_range: 0..text.len(),
        })
    }

    /// Whether any component holds cells at `score`.
    fn is_live(&self, score: i32) -> bool {
        self.kernel
            .components()
            .iter()
            .any(|&c| self.components.get(c, score).is_some())
    }

    fn reached_end(&self, score: i32, k_end: i32, tlen: i32) -> bool {
        self.components
            .get(Component::M, score)
            .is_some_and(|m| m.offset(k_end) == tlen)
    }

    fn reduce(&mut self, score: i32, plen: i32, tlen: i32) {
        let ReductionStrategy::Adaptive {
            min_wavefront_length,
            max_distance_threshold,
        } = self.reduction
        else {
            return;
        };
        let Some(m) = self.components.get(Component::M, score) else {
            return;
        };
        let Some((lo, hi)) =
            reduced_band(m, plen, tlen, min_wavefront_length, max_distance_threshold)
        else {
            return;
        };
        #[cfg(feature = "tracing")]
        tracing::trace!(score, from_lo = m.lo(), from_hi = m.hi(), lo, hi, "reduced");
        for &c in self.kernel.components() {
            let emptied = match self.components.get_mut(c, score) {
                Some(wf) => {
                    wf.narrow(lo, hi);
                    wf.is_empty()
                }
                None => false,
            };
            if emptied {
                self.components.remove(c, score, &mut self.slab);
            }
        }
    }

    fn backtrace(&self, pattern: &[u8], text: &[u8], score: i32, k_end: i32) -> Result<Cigar> {
        if self.bt_piggyback {
            let m = self
                .components
                .get(Component::M, score)
                .ok_or(AlignerError::BacktraceFailed {
                    score,
                    diagonal: k_end,
                })?;
            let ops = self.bt_buffer.unpack(m.pcigar(k_end), m.prev(k_end))?;
            #[cfg(feature = "tracing")]
            tracing::trace!(ops = ops.len(), blocks = self.bt_buffer.len(), "replaying trace");
            replay(&ops, pattern, text, score)
        } else {
            backtrace_wavefronts(&self.components, &self.wf_penalties, pattern, text, score)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::AlignerBuilder;

    #[test]
    fn edit_example_has_one_deletion() {
        let mut aligner = AlignerBuilder::new().edit().reduction_none().build(4, 4).unwrap();
        let alignment = aligner.align(b"ACGT", b"AGT").unwrap();
        assert_eq!(alignment.score, 1);
        assert_eq!(alignment.cigar.as_ref().map(|c| c.to_string()).as_deref(), Some("1M1D2M"));
        assert_eq!(aligner.state(), AlignerState::Completed);
    }

    #[test]
    fn empty_sequences_align_at_zero() {
        let mut aligner = AlignerBuilder::new().build(0, 0).unwrap();
        let alignment = aligner.align(b"", b"").unwrap();
        assert_eq!(alignment.score, 0);
        assert_eq!(alignment.cigar.as_ref().map(Cigar::len), Some(0));
    }

    #[test]
    fn one_side_empty_is_a_single_gap() {
        let mut aligner = AlignerBuilder::new().reduction_none().build(0, 5).unwrap();
        let alignment = aligner.align(b"", b"ACGTA").unwrap();
        assert_eq!(alignment.score, 6 + 2 * 5);
        assert_eq!(alignment.cigar.as_ref().map(|c| c.to_string()).as_deref(), Some("5I"));
    }

    #[test]
    fn rejects_oversized_inputs() {
        let mut aligner = AlignerBuilder::new().build(3, 3).unwrap();
        assert!(matches!(
            aligner.align(b"ACGT", b"ACG"),
            Err(AlignerError::SequenceTooLong {
                sequence: "pattern",
                ..
            })
        ));
        assert_eq!(aligner.state(), AlignerState::Ready);
        assert!(matches!(
            WavefrontAligner::new(MAX_SEQUENCE_LENGTH + 1, 1, &AlignerAttributes::default()),
            Err(AlignerError::LengthTooLarge { .. })
        ));
    }

    #[test]
    fn mode_flags_follow_attributes() {
        let full = AlignerBuilder::new().build(8, 8).unwrap();
        assert!(!full.memory_modular() && !full.bt_piggyback());
        let low = AlignerBuilder::new().low_memory(true).build(8, 8).unwrap();
        assert!(low.memory_modular() && low.bt_piggyback());
        let score = AlignerBuilder::new().score_only().build(8, 8).unwrap();
        assert!(score.memory_modular() && !score.bt_piggyback());
        assert_eq!(full.max_score_scope(), 9);
    }

    #[test]
    fn score_only_has_no_script() {
        let mut aligner = AlignerBuilder::new().score_only().build(8, 8).unwrap();
        let alignment = aligner.align(b"ACGTACGT", b"ACGAACGT").unwrap();
        assert_eq!(alignment.score, 4);
        assert!(alignment.cigar.is_none());
    }
}
