//! The kernel seam inside the aligner. Kernels are chosen from the
//! penalty model by `kernel_for`; the trait is not implemented outside
//! this crate.
//!
//! A [`DistanceKernel`] computes every wavefront component of one score
//! from components at lower scores. The aligner drives the score loop,
//! match extension, reduction and limits; the kernel only fills in the
//! next layer.
//!
//! Contract with the aligner, through [`ComputeContext`]:
//! - predecessors are read with
//!   [`Inputs::get`](crate::kernels::Inputs::get), which yields the null
//!   sentinel for anything absent or outside the score window;
//! - outputs come from
//!   [`Outputs::acquire`](crate::kernels::Outputs::acquire), which hands
//!   out slab storage for components with a live input and the victim
//!   otherwise;
//! - every component in [`DistanceKernel::components`] is passed to
//!   [`ComputeContext::store`] at every score, victim included, so stale
//!   ring slots never survive.

use crate::error::Result;
use crate::kernels::ComputeContext;
use crate::wavefront::Component;

pub(crate) trait DistanceKernel: Send + Sync + std::fmt::Debug {
    /// Components this kernel reads and writes, M first.
    fn components(&self) -> &[Component];

    /// Compute all components at `score`. Scores below `score` are final.
    fn compute(&self, ctx: &mut ComputeContext<'_>, score: i32) -> Result<()>;
}
