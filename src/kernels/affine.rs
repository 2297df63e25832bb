use crate::bt_buffer::{BlockIdx, PCigar, PiggybackOp};
use crate::error::Result;
use crate::kernels::{include, ComputeContext};
use crate::penalties::{GapPiece, WavefrontPenalties};
use crate::traits::DistanceKernel;
use crate::wavefront::{nullify, Component, Wavefront, OFFSET_NULL};

/// Gap-affine distance with one or two gap pieces.
///
/// For each piece `p` with opening `o` and extension `e`:
///
/// ```text
/// I_p(s, k) = max(M(s-o-e, k-1), I_p(s-e, k-1)) + 1
/// D_p(s, k) = max(M(s-o-e, k+1), D_p(s-e, k+1))
/// M(s, k)   = max(M(s-x, k) + 1, I_1, I_2, D_1, D_2)
/// ```
///
/// Gap components prefer opening over extending on ties; M prefers the
/// mismatch, then I1, I2, D1, D2.
#[derive(Clone, Debug)]
pub struct AffineKernel {
    mismatch: i32,
    pieces: Vec<GapPiece>,
    components: Vec<Component>,
}

impl AffineKernel {
    pub(crate) fn new(penalties: &WavefrontPenalties) -> Self {
        let pieces = penalties.pieces[..penalties.num_pieces].to_vec();
        let mut components = vec![Component::M];
        components.extend((0..pieces.len()).map(Component::insertion));
        components.extend((0..pieces.len()).map(Component::deletion));
        AffineKernel {
            mismatch: penalties.mismatch,
            pieces,
            components,
        }
    }
}

/// Predecessors of one gap piece at the score being computed.
struct PieceInputs<'c> {
    m_open: &'c Wavefront,
    i_ext: &'c Wavefront,
    d_ext: &'c Wavefront,
}

/// A computed cell plus where its trace comes from.
#[derive(Clone, Copy)]
struct Cell {
    offset: i32,
    pcigar: PCigar,
    prev: BlockIdx,
}

const NULL_CELL: Cell = Cell {
    offset: OFFSET_NULL,
    pcigar: 0,
    prev: 0,
};

impl DistanceKernel for AffineKernel {
    fn components(&self) -> &[Component] {
        &self.components
    }

    fn compute(&self, ctx: &mut ComputeContext<'_>, score: i32) -> Result<()> {
        let (plen, tlen) = (ctx.pattern_length(), ctx.text_length());
        let n = self.pieces.len();
        let (inputs, mut outputs) = ctx.split();
        let piggyback = outputs.piggyback();

        let m_x = inputs.get(Component::M, score - self.mismatch);
        let gaps: Vec<PieceInputs<'_>> = self
            .pieces
            .iter()
            .enumerate()
            .map(|(p, piece)| PieceInputs {
                m_open: inputs.get(Component::M, score - piece.open_cost()),
                i_ext: inputs.get(Component::insertion(p), score - piece.extension),
                d_ext: inputs.get(Component::deletion(p), score - piece.extension),
            })
            .collect();

        let mut ins_band = vec![None; n];
        let mut del_band = vec![None; n];
        let mut m_band = None;
        include(&mut m_band, m_x, 0, 0);
        for (p, g) in gaps.iter().enumerate() {
            include(&mut ins_band[p], g.m_open, 1, 1);
            include(&mut ins_band[p], g.i_ext, 1, 1);
            include(&mut del_band[p], g.m_open, -1, -1);
            include(&mut del_band[p], g.d_ext, -1, -1);
            include(&mut m_band, g.m_open, -1, 1);
            include(&mut m_band, g.i_ext, 1, 1);
            include(&mut m_band, g.d_ext, -1, -1);
        }
        // every live output spans the union band
        let union = m_band;
        let (lo, hi) = union.unwrap_or((0, -1));

        let mut out_m = outputs.acquire(m_band)?;
        let mut out_i = Vec::with_capacity(n);
        let mut out_d = Vec::with_capacity(n);
        for p in 0..n {
            out_i.push(outputs.acquire(ins_band[p].and(union))?);
            out_d.push(outputs.acquire(del_band[p].and(union))?);
        }

        let mut ins = [NULL_CELL; 2];
        let mut del = [NULL_CELL; 2];
        for k in lo..=hi {
            for (p, g) in gaps.iter().enumerate() {
                let open = g.m_open.offset(k - 1) + 1;
                let ext = g.i_ext.offset(k - 1) + 1;
                let (raw, src, op) = if ext > open {
                    (ext, g.i_ext, PiggybackOp::insertion_extend(p))
                } else {
                    (open, g.m_open, PiggybackOp::insertion_open(p))
                };
                ins[p] = NULL_CELL;
                ins[p].offset = nullify(raw, k, plen, tlen);
                out_i[p].set(k, ins[p].offset);
                if piggyback && ins[p].offset != OFFSET_NULL {
                    let (w, b) = outputs.append(src.pcigar(k - 1), src.prev(k - 1), op)?;
                    ins[p].pcigar = w;
                    ins[p].prev = b;
                    out_i[p].set_trace(k, w, b);
                }

                let open = g.m_open.offset(k + 1);
                let ext = g.d_ext.offset(k + 1);
                let (raw, src, op) = if ext > open {
                    (ext, g.d_ext, PiggybackOp::deletion_extend(p))
                } else {
                    (open, g.m_open, PiggybackOp::deletion_open(p))
                };
                del[p] = NULL_CELL;
                del[p].offset = nullify(raw, k, plen, tlen);
                out_d[p].set(k, del[p].offset);
                if piggyback && del[p].offset != OFFSET_NULL {
                    let (w, b) = outputs.append(src.pcigar(k + 1), src.prev(k + 1), op)?;
                    del[p].pcigar = w;
                    del[p].prev = b;
                    out_d[p].set_trace(k, w, b);
                }
            }

            let mut best = m_x.offset(k) + 1;
            let mut gap_winner: Option<Cell> = None;
            for cell in ins[..n].iter().chain(del[..n].iter()) {
                if cell.offset > best {
                    best = cell.offset;
                    gap_winner = Some(*cell);
                }
            }
            let value = nullify(best, k, plen, tlen);
            out_m.set(k, value);
            if piggyback && value != OFFSET_NULL {
                let (w, b) = match gap_winner {
                    Some(cell) => (cell.pcigar, cell.prev),
                    None => outputs.append(m_x.pcigar(k), m_x.prev(k), PiggybackOp::Mismatch)?,
                };
                out_m.set_trace(k, w, b);
            }
        }

        ctx.store(Component::M, score, out_m)?;
        for (p, (i, d)) in out_i.into_iter().zip(out_d).enumerate() {
            ctx.store(Component::insertion(p), score, i)?;
            ctx.store(Component::deletion(p), score, d)?;
        }
        Ok(())
    }
}
