//! Wavefront kernels and the context they run in.
//!
//! [`LinearKernel`] covers edit and gap-linear distances with a single M
//! component. [`AffineKernel`] covers gap-affine (M, I1, D1) and two-piece
//! gap-affine (M, I1, I2, D1, D2). Both follow the same pattern: work out
//! the union band of all live inputs, acquire outputs for it, fill every
//! diagonal, then store.

mod affine;
mod extend;
mod linear;

pub use affine::AffineKernel;
pub use extend::extend_matches;
pub use linear::LinearKernel;

use crate::bt_buffer::{BacktraceBuffer, BlockIdx, PCigar, PiggybackOp};
use crate::components::WavefrontComponents;
use crate::error::Result;
use crate::penalties::{DistanceMetric, WavefrontPenalties};
use crate::slab::WavefrontSlab;
use crate::traits::DistanceKernel;
use crate::wavefront::{Component, Wavefront};

/// Everything a kernel may touch while computing one score.
pub struct ComputeContext<'a> {
    pub(crate) components: &'a mut WavefrontComponents,
    pub(crate) slab: &'a mut WavefrontSlab,
    pub(crate) bt_buffer: &'a mut BacktraceBuffer,
    pub(crate) null: &'a Wavefront,
    pub(crate) victim: &'a mut Wavefront,
    pub(crate) piggyback: bool,
    pub(crate) pattern_length: i32,
    pub(crate) text_length: i32,
}

impl<'a> ComputeContext<'a> {
    pub fn pattern_length(&self) -> i32 {
        self.pattern_length
    }

    pub fn text_length(&self) -> i32 {
        self.text_length
    }

    /// Whether outputs must carry piggyback trace words.
    pub fn piggyback(&self) -> bool {
        self.piggyback
    }

    /// Split into a read side over stored components and a write side for
    /// fresh outputs, so both can be held at once.
    pub fn split(&mut self) -> (Inputs<'_>, Outputs<'_>) {
        (
            Inputs {
                components: &*self.components,
                null: self.null,
            },
            Outputs {
                slab: &mut *self.slab,
                victim: &mut *self.victim,
                bt_buffer: &mut *self.bt_buffer,
                piggyback: self.piggyback,
            },
        )
    }

    /// Store `wf` as component `c` at `score`. The victim is put back and
    /// the component recorded as absent; a live output is trimmed of null
    /// ends and recorded as absent if nothing is left.
    pub fn store(&mut self, c: Component, score: i32, mut wf: Wavefront) -> Result<()> {
        if wf.is_victim() {
            *self.victim = wf;
            return self.components.store(c, score, None, self.slab);
        }
        wf.trim_null_ends();
        if wf.is_empty() {
            self.slab.release(wf);
            return self.components.store(c, score, None, self.slab);
        }
        self.components.store(c, score, Some(wf), self.slab)
    }
}

/// Read side of a [`ComputeContext`].
pub struct Inputs<'c> {
    components: &'c WavefrontComponents,
    null: &'c Wavefront,
}

impl<'c> Inputs<'c> {
    /// Component `c` at `score`, or the null sentinel.
    #[inline]
    pub fn get(&self, c: Component, score: i32) -> &'c Wavefront {
        self.components.get_or(c, score, self.null)
    }
}

/// Write side of a [`ComputeContext`].
pub struct Outputs<'c> {
    slab: &'c mut WavefrontSlab,
    victim: &'c mut Wavefront,
    bt_buffer: &'c mut BacktraceBuffer,
    piggyback: bool,
}

impl<'c> Outputs<'c> {
    /// Slab storage for `band`, or the victim when there is no live input.
    /// If the victim is already handed out this score, the null sentinel
    /// stands in; it discards writes the same way.
    pub fn acquire(&mut self, band: Option<(i32, i32)>) -> Result<Wavefront> {
        match band {
            Some((lo, hi)) => self.slab.acquire(lo, hi),
            None => Ok(std::mem::take(self.victim)),
        }
    }

    #[inline]
    pub fn piggyback(&self) -> bool {
        self.piggyback
    }

    /// Extend a trace by `op`; see [`BacktraceBuffer::append`].
    #[inline]
    pub fn append(
        &mut self,
        pcigar: PCigar,
        prev: BlockIdx,
        op: PiggybackOp,
    ) -> Result<(PCigar, BlockIdx)> {
        self.bt_buffer.append(pcigar, prev, op)
    }
}

/// Grow `band` by the diagonals `wf` can reach after shifting its band by
/// `lo_shift` and `hi_shift`. Empty inputs contribute nothing.
#[inline]
pub(crate) fn include(band: &mut Option<(i32, i32)>, wf: &Wavefront, lo_shift: i32, hi_shift: i32) {
    if wf.is_empty() {
        return;
    }
    let (lo, hi) = (wf.lo() + lo_shift, wf.hi() + hi_shift);
    *band = Some(match *band {
        Some((a, b)) => (a.min(lo), b.max(hi)),
        None => (lo, hi),
    });
}

/// Kernel matching the penalty model.
pub(crate) fn kernel_for(penalties: &WavefrontPenalties) -> Box<dyn DistanceKernel> {
    match penalties.metric {
        DistanceMetric::Edit | DistanceMetric::GapLinear => Box::new(LinearKernel::new(
            penalties.mismatch,
            penalties.pieces[0].extension,
        )),
        DistanceMetric::GapAffine | DistanceMetric::GapAffine2p => {
            Box::new(AffineKernel::new(penalties))
        }
    }
}
