//! Penalty models.
//!
//! Scores are penalties: a match costs nothing, every other operation adds
//! a positive cost, and the aligner searches for the smallest total.
//! Gap costs per model:
//! - linear: `indel * len`
//! - affine: `gap_opening + gap_extension * len`
//! - two-piece affine: the cheaper of the two affine pieces for that length

use crate::error::{AlignerError, Result};

/// Distance metric selected by a [`Penalties`] value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DistanceMetric {
    Edit,
    GapLinear,
    GapAffine,
    GapAffine2p,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinearPenalties {
    pub mismatch: i32,
    pub indel: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AffinePenalties {
    pub mismatch: i32,
    pub gap_opening: i32,
    pub gap_extension: i32,
}

/// Two-piece affine penalties. Both pieces are live at all times; the
/// aligner picks whichever gives the cheaper gap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Affine2pPenalties {
    pub mismatch: i32,
    pub gap_opening1: i32,
    pub gap_extension1: i32,
    pub gap_opening2: i32,
    pub gap_extension2: i32,
}

/// A complete cost model. The variant fixes the distance metric, so a
/// metric can never be paired with the wrong parameter set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Penalties {
    Edit,
    Linear(LinearPenalties),
    Affine(AffinePenalties),
    Affine2p(Affine2pPenalties),
}

impl Default for Penalties {
    fn default() -> Self {
        Penalties::Affine(AffinePenalties {
            mismatch: 4,
            gap_opening: 6,
            gap_extension: 2,
        })
    }
}

impl Penalties {
    pub fn metric(&self) -> DistanceMetric {
        match self {
            Penalties::Edit => DistanceMetric::Edit,
            Penalties::Linear(_) => DistanceMetric::GapLinear,
            Penalties::Affine(_) => DistanceMetric::GapAffine,
            Penalties::Affine2p(_) => DistanceMetric::GapAffine2p,
        }
    }

    /// Reject parameter sets the wavefront recurrences cannot handle: a
    /// zero-cost mismatch or extension would make a score step depend on
    /// itself.
    pub fn validate(&self) -> Result<()> {
        let metric = self.metric();
        let fail = |reason| Err(AlignerError::InvalidPenalties { metric, reason });
        match *self {
            Penalties::Edit => Ok(()),
            Penalties::Linear(p) => {
                if p.mismatch <= 0 {
                    return fail("mismatch must be positive");
                }
                if p.indel <= 0 {
                    return fail("indel must be positive");
                }
                Ok(())
            }
            Penalties::Affine(p) => {
                if p.mismatch <= 0 {
                    return fail("mismatch must be positive");
                }
                if p.gap_opening < 0 {
                    return fail("gap opening must not be negative");
                }
                if p.gap_extension <= 0 {
                    return fail("gap extension must be positive");
                }
                Ok(())
            }
            Penalties::Affine2p(p) => {
                if p.mismatch <= 0 {
                    return fail("mismatch must be positive");
                }
                if p.gap_opening1 < 0 || p.gap_opening2 < 0 {
                    return fail("gap openings must not be negative");
                }
                if p.gap_extension1 <= 0 || p.gap_extension2 <= 0 {
                    return fail("gap extensions must be positive");
                }
                Ok(())
            }
        }
    }

    pub fn mismatch(&self) -> i32 {
        match *self {
            Penalties::Edit => 1,
            Penalties::Linear(p) => p.mismatch,
            Penalties::Affine(p) => p.mismatch,
            Penalties::Affine2p(p) => p.mismatch,
        }
    }

    /// Cost of a single gap run of `len` operations.
    pub fn gap_cost(&self, len: usize) -> i32 {
        if len == 0 {
            return 0;
        }
        let len = len as i32;
        match *self {
            Penalties::Edit => len,
            Penalties::Linear(p) => p.indel * len,
            Penalties::Affine(p) => p.gap_opening + p.gap_extension * len,
            Penalties::Affine2p(p) => (p.gap_opening1 + p.gap_extension1 * len)
                .min(p.gap_opening2 + p.gap_extension2 * len),
        }
    }
}

/// One affine gap piece as seen by the kernels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct GapPiece {
    pub opening: i32,
    pub extension: i32,
}

impl GapPiece {
    /// Score distance from the M component that opens a gap of this piece.
    pub fn open_cost(&self) -> i32 {
        self.opening + self.extension
    }
}

/// Penalties flattened into the shape the kernels and backtrace consume.
///
/// Edit and linear models have a single piece with zero opening cost and
/// no gap components of their own; the gap moves straight back into M.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WavefrontPenalties {
    pub metric: DistanceMetric,
    pub mismatch: i32,
    pub pieces: [GapPiece; 2],
    pub num_pieces: usize,
}

impl WavefrontPenalties {
    pub fn new(penalties: &Penalties) -> Result<Self> {
        penalties.validate()?;
        let none = GapPiece {
            opening: 0,
            extension: 0,
        };
        let wf = match *penalties {
            Penalties::Edit => WavefrontPenalties {
                metric: DistanceMetric::Edit,
                mismatch: 1,
                pieces: [
                    GapPiece {
                        opening: 0,
                        extension: 1,
                    },
                    none,
                ],
                num_pieces: 1,
            },
            Penalties::Linear(p) => WavefrontPenalties {
                metric: DistanceMetric::GapLinear,
                mismatch: p.mismatch,
                pieces: [
                    GapPiece {
                        opening: 0,
                        extension: p.indel,
                    },
                    none,
                ],
                num_pieces: 1,
            },
            Penalties::Affine(p) => WavefrontPenalties {
                metric: DistanceMetric::GapAffine,
                mismatch: p.mismatch,
                pieces: [
                    GapPiece {
                        opening: p.gap_opening,
                        extension: p.gap_extension,
                    },
                    none,
                ],
                num_pieces: 1,
            },
            Penalties::Affine2p(p) => WavefrontPenalties {
                metric: DistanceMetric::GapAffine2p,
                mismatch: p.mismatch,
                pieces: [
                    GapPiece {
                        opening: p.gap_opening1,
                        extension: p.gap_extension1,
                    },
                    GapPiece {
                        opening: p.gap_opening2,
                        extension: p.gap_extension2,
                    },
                ],
                num_pieces: 2,
            },
        };
        Ok(wf)
    }

    /// Whether the model keeps separate insertion/deletion components.
    pub fn has_gap_components(&self) -> bool {
        matches!(
            self.metric,
            DistanceMetric::GapAffine | DistanceMetric::GapAffine2p
        )
    }

    /// Largest score distance between a component and any component it
    /// reads, plus one: the size of the modular score window.
    pub fn max_score_scope(&self) -> usize {
        let mut scope = self.mismatch;
        for piece in &self.pieces[..self.num_pieces] {
            scope = scope.max(piece.open_cost());
        }
        scope as usize + 1
    }
}
