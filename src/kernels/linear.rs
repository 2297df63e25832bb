use crate::bt_buffer::PiggybackOp;
use crate::error::Result;
use crate::kernels::{include, ComputeContext};
use crate::traits::DistanceKernel;
use crate::wavefront::{nullify, Component, OFFSET_NULL};

/// Edit and gap-linear distance: a single M component.
///
/// `M(s, k) = max(M(s-x, k) + 1, M(s-e, k-1) + 1, M(s-e, k+1))`, ties
/// resolved in that order.
#[derive(Clone, Copy, Debug)]
pub struct LinearKernel {
    mismatch: i32,
    indel: i32,
}

impl LinearKernel {
    pub fn new(mismatch: i32, indel: i32) -> Self {
        LinearKernel { mismatch, indel }
    }
}

impl DistanceKernel for LinearKernel {
    fn components(&self) -> &[Component] {
        &[Component::M]
    }

    fn compute(&self, ctx: &mut ComputeContext<'_>, score: i32) -> Result<()> {
        let (plen, tlen) = (ctx.pattern_length(), ctx.text_length());
        let (inputs, mut outputs) = ctx.split();
        let m_x = inputs.get(Component::M, score - self.mismatch);
        let m_e = inputs.get(Component::M, score - self.indel);

        let mut band = None;
        include(&mut band, m_x, 0, 0);
        include(&mut band, m_e, -1, 1);
        let (lo, hi) = band.unwrap_or((0, -1));
        let mut out = outputs.acquire(band)?;
        let piggyback = outputs.piggyback();

        for k in lo..=hi {
            let mut best = m_x.offset(k) + 1;
            let mut from = (m_x, k, PiggybackOp::Mismatch);
            let ins = m_e.offset(k - 1) + 1;
            if ins > best {
                best = ins;
                from = (m_e, k - 1, PiggybackOp::InsertionOpen1);
            }
            let del = m_e.offset(k + 1);
            if del > best {
                best = del;
                from = (m_e, k + 1, PiggybackOp::DeletionOpen1);
            }
            let value = nullify(best, k, plen, tlen);
            out.set(k, value);
            if piggyback && value != OFFSET_NULL {
                let (src, sk, op) = from;
                let (pcigar, prev) = outputs.append(src.pcigar(sk), src.prev(sk), op)?;
                out.set_trace(k, pcigar, prev);
            }
        }

        ctx.store(Component::M, score, out)
    }
}
