//! Wavefront alignment core.
//!
//! This crate computes optimal global alignments between a *pattern* and a
//! *text* with the wavefront algorithm: instead of filling a full DP
//! matrix, it tracks for every score only the furthest-reaching cell on
//! each diagonal, and grows those wavefronts one score at a time until the
//! end of both sequences is reached. Work and memory scale with the
//! alignment score rather than with the product of the lengths.
//!
//! ## Core pieces
//! - [`Penalties`]: edit, gap-linear, gap-affine and two-piece gap-affine
//!   cost models (scores are penalties; a match costs nothing).
//! - [`WavefrontAligner`]: owns the score-indexed wavefront components,
//!   the slab that recycles them and the backtrace buffer, and drives the
//!   score loop.
//! - [`ReductionStrategy`]: optional adaptive band trimming that trades
//!   optimality for speed on long, similar sequences.
//! - [`ResourceLimits`] and [`MemoryTracker`]: score/memory caps and
//!   shared byte accounting.
//!
//! ## Memory modes
//! | scope | `low_memory` | layers kept | script from |
//! |---|---|---|---|
//! | alignment | false | all | re-walking the stored layers |
//! | alignment | true | score window | piggyback trace words |
//! | score | any | score window | no script |
//!
//! ## Quick start
//! ```
//! use wfa_core::AlignerBuilder;
//!
//! let mut aligner = AlignerBuilder::new().edit().build(16, 16).unwrap();
//! let alignment = aligner.align(b"ACGT", b"AGT").unwrap();
//! assert_eq!(alignment.score, 1);
//! assert_eq!(alignment.cigar.as_ref().unwrap().to_string(), "1M1D2M");
//! ```
//!
//! Aligners are meant to be reused: `align` clears the previous run and
//! keeps its storage, so a loop over many pairs allocates only while the
//! largest pair so far is growing. See [`batch`] for the ready-made loop.

pub mod aligner;
pub mod attributes;
mod backtrace;
pub mod batch;
pub mod bt_buffer;
pub mod builder;
pub mod cigar;
pub mod components;
pub mod error;
mod kernels;
pub mod limits;
pub mod memory;
pub mod penalties;
pub mod reduction;
pub mod slab;
mod traits;
pub mod utils;
pub mod wavefront;

pub use crate::aligner::{
    AbortReason, AlignerState, Alignment, WavefrontAligner, MAX_SEQUENCE_LENGTH,
};
pub use crate::attributes::{AlignerAttributes, AlignmentScope};
pub use crate::batch::{align_batch, align_batch_serial};
pub use crate::builder::AlignerBuilder;
pub use crate::cigar::{Cigar, CigarOp};
pub use crate::error::{AlignerError, Result};
pub use crate::limits::ResourceLimits;
pub use crate::memory::{AllocatorOwnership, MemoryTracker};
pub use crate::penalties::{
    Affine2pPenalties, AffinePenalties, DistanceMetric, LinearPenalties, Penalties,
};
pub use crate::reduction::ReductionStrategy;
pub use crate::wavefront::{Component, Offset, OFFSET_NULL};
