//! Backtrace buffer and the packed per-cell trace words.
//!
//! In low-memory alignment mode every written cell carries a [`PCigar`]
//! word holding its most recent operations plus the index of the block its
//! older history lives in. When a word fills up it is offloaded into the
//! append-only buffer and a fresh word starts pointing at it. Following the
//! `prev` links from any cell reaches the root block at index 0.

use crate::error::{AlignerError, Result};

/// Up to 16 operations, four bits each, newest in the low nibble.
pub type PCigar = u64;

/// Index into the backtrace buffer.
pub type BlockIdx = u32;

/// Synthetic block for score 0 at the start of both sequences.
pub const ROOT_BLOCK: BlockIdx = 0;

const OPS_PER_WORD: usize = 16;

/// Operations recorded in trace words. Zero is reserved for "empty".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PiggybackOp {
    Mismatch = 1,
    InsertionOpen1 = 2,
    InsertionExtend1 = 3,
    DeletionOpen1 = 4,
    DeletionExtend1 = 5,
    InsertionOpen2 = 6,
    InsertionExtend2 = 7,
    DeletionOpen2 = 8,
    DeletionExtend2 = 9,
}

impl PiggybackOp {
    pub fn from_code(code: u8) -> Option<Self> {
        use PiggybackOp::*;
        Some(match code {
            1 => Mismatch,
            2 => InsertionOpen1,
            3 => InsertionExtend1,
            4 => DeletionOpen1,
            5 => DeletionExtend1,
            6 => InsertionOpen2,
            7 => InsertionExtend2,
            8 => DeletionOpen2,
            9 => DeletionExtend2,
            _ => return None,
        })
    }

    pub fn insertion_open(piece: usize) -> Self {
        if piece == 0 {
            PiggybackOp::InsertionOpen1
        } else {
            PiggybackOp::InsertionOpen2
        }
    }

    pub fn insertion_extend(piece: usize) -> Self {
        if piece == 0 {
            PiggybackOp::InsertionExtend1
        } else {
            PiggybackOp::InsertionExtend2
        }
    }

    pub fn deletion_open(piece: usize) -> Self {
        if piece == 0 {
            PiggybackOp::DeletionOpen1
        } else {
            PiggybackOp::DeletionOpen2
        }
    }

    pub fn deletion_extend(piece: usize) -> Self {
        if piece == 0 {
            PiggybackOp::DeletionExtend1
        } else {
            PiggybackOp::DeletionExtend2
        }
    }

    pub fn is_insertion(self) -> bool {
        matches!(
            self,
            PiggybackOp::InsertionOpen1
                | PiggybackOp::InsertionExtend1
                | PiggybackOp::InsertionOpen2
                | PiggybackOp::InsertionExtend2
        )
    }

    pub fn is_deletion(self) -> bool {
        matches!(
            self,
            PiggybackOp::DeletionOpen1
                | PiggybackOp::DeletionExtend1
                | PiggybackOp::DeletionOpen2
                | PiggybackOp::DeletionExtend2
        )
    }

    /// The extension op that continues the same gap piece as `self`.
    pub fn continuation(self) -> Option<Self> {
        use PiggybackOp::*;
        match self {
            InsertionOpen1 | InsertionExtend1 => Some(InsertionExtend1),
            InsertionOpen2 | InsertionExtend2 => Some(InsertionExtend2),
            DeletionOpen1 | DeletionExtend1 => Some(DeletionExtend1),
            DeletionOpen2 | DeletionExtend2 => Some(DeletionExtend2),
            Mismatch => None,
        }
    }
}

#[inline]
pub fn pcigar_is_full(pcigar: PCigar) -> bool {
    pcigar >> 60 != 0
}

/// Operations of one word, oldest first.
pub fn pcigar_unpack(pcigar: PCigar, out: &mut Vec<PiggybackOp>) -> Result<()> {
    let mut started = false;
    for i in (0..OPS_PER_WORD).rev() {
        let code = ((pcigar >> (4 * i)) & 0xF) as u8;
        if code == 0 {
            if started {
                return Err(corrupt());
            }
            continue;
        }
        started = true;
        out.push(PiggybackOp::from_code(code).ok_or_else(corrupt)?);
    }
    Ok(())
}

fn corrupt() -> AlignerError {
    AlignerError::BacktraceFailed {
        score: -1,
        diagonal: 0,
    }
}

/// An offloaded trace word and the block that precedes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct BacktraceBlock {
    pub pcigar: PCigar,
    pub prev: BlockIdx,
}

#[derive(Debug)]
pub struct BacktraceBuffer {
    blocks: Vec<BacktraceBlock>,
}

impl Default for BacktraceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl BacktraceBuffer {
    pub fn new() -> Self {
        BacktraceBuffer {
            blocks: vec![BacktraceBlock::default()],
        }
    }

    /// Blocks stored, root included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when only the root is present.
    pub fn is_empty(&self) -> bool {
        self.blocks.len() <= 1
    }

    pub fn block(&self, idx: BlockIdx) -> Option<&BacktraceBlock> {
        self.blocks.get(idx as usize)
    }

    fn push(&mut self, block: BacktraceBlock) -> Result<BlockIdx> {
        let idx = BlockIdx::try_from(self.blocks.len()).map_err(|_| {
            AlignerError::AllocationFailed {
                what: "backtrace block index",
                bytes: std::mem::size_of::<BacktraceBlock>(),
            }
        })?;
        self.blocks
            .try_reserve(1)
            .map_err(|_| AlignerError::AllocationFailed {
                what: "backtrace buffer",
                bytes: std::mem::size_of::<BacktraceBlock>(),
            })?;
        self.blocks.push(block);
        #[cfg(feature = "tracing")]
        tracing::trace!(block = idx, "offloaded trace word");
        Ok(idx)
    }

    /// Append `op` to the trace `(pcigar, prev)`, offloading the word first
    /// when it is full. Returns the new trace.
    #[inline]
    pub fn append(
        &mut self,
        pcigar: PCigar,
        prev: BlockIdx,
        op: PiggybackOp,
    ) -> Result<(PCigar, BlockIdx)> {
        if pcigar_is_full(pcigar) {
            let idx = self.push(BacktraceBlock { pcigar, prev })?;
            Ok((op as PCigar, idx))
        } else {
            Ok(((pcigar << 4) | op as PCigar, prev))
        }
    }

    /// Full operation history of the trace `(pcigar, prev)`, oldest first.
    pub fn unpack(&self, pcigar: PCigar, prev: BlockIdx) -> Result<Vec<PiggybackOp>> {
        let mut words = vec![pcigar];
        let mut idx = prev;
        while idx != ROOT_BLOCK {
            let block = self.block(idx).ok_or_else(corrupt)?;
            // links always point backwards, so the walk terminates
            if block.prev >= idx {
                return Err(corrupt());
            }
            words.push(block.pcigar);
            idx = block.prev;
        }
        let mut ops = Vec::with_capacity(words.len() * OPS_PER_WORD);
        for word in words.iter().rev() {
            pcigar_unpack(*word, &mut ops)?;
        }
        Ok(ops)
    }

    /// Drop everything but the root; capacity is kept.
    pub fn clear(&mut self) {
        self.blocks.truncate(1);
    }

    /// Drop everything but the root and give the memory back. Returns the
    /// bytes released.
    pub fn reap(&mut self) -> usize {
        let before = self.size_in_bytes();
        self.blocks.truncate(1);
        self.blocks.shrink_to_fit();
        before.saturating_sub(self.size_in_bytes())
    }

    pub fn size_in_bytes(&self) -> usize {
        self.blocks.capacity() * std::mem::size_of::<BacktraceBlock>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_packs_newest_low() {
        let mut buf = BacktraceBuffer::new();
        let (w, p) = buf.append(0, ROOT_BLOCK, PiggybackOp::Mismatch).unwrap();
        let (w, p) = buf.append(w, p, PiggybackOp::DeletionOpen1).unwrap();
        assert_eq!(w, 0x14);
        assert_eq!(p, ROOT_BLOCK);
        assert!(buf.is_empty());
    }

    #[test]
    fn full_word_is_offloaded() {
        let mut buf = BacktraceBuffer::new();
        let (mut w, mut p) = (0, ROOT_BLOCK);
        for _ in 0..16 {
            (w, p) = buf.append(w, p, PiggybackOp::InsertionExtend1).unwrap();
        }
        assert!(pcigar_is_full(w));
        assert!(buf.is_empty());
        (w, p) = buf.append(w, p, PiggybackOp::Mismatch).unwrap();
        assert_eq!(buf.len(), 2);
        assert_eq!(p, 1);
        assert_eq!(w, PiggybackOp::Mismatch as u64);

        let ops = buf.unpack(w, p).unwrap();
        assert_eq!(ops.len(), 17);
        assert!(ops[..16]
            .iter()
            .all(|op| *op == PiggybackOp::InsertionExtend1));
        assert_eq!(ops[16], PiggybackOp::Mismatch);
    }

    #[test]
    fn unpack_preserves_order_across_blocks() {
        let mut buf = BacktraceBuffer::new();
        let seq: Vec<PiggybackOp> = (0..40)
            .map(|i| match i % 3 {
                0 => PiggybackOp::Mismatch,
                1 => PiggybackOp::InsertionOpen2,
                _ => PiggybackOp::DeletionExtend1,
            })
            .collect();
        let (mut w, mut p) = (0, ROOT_BLOCK);
        for op in &seq {
            (w, p) = buf.append(w, p, *op).unwrap();
        }
        assert_eq!(buf.unpack(w, p).unwrap(), seq);
    }

    #[test]
    fn clear_keeps_root_and_capacity() {
        let mut buf = BacktraceBuffer::new();
        let (mut w, mut p) = (0, ROOT_BLOCK);
        for _ in 0..100 {
            (w, p) = buf.append(w, p, PiggybackOp::Mismatch).unwrap();
        }
        let _ = (w, p);
        let size = buf.size_in_bytes();
        buf.clear();
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.size_in_bytes(), size);
        let released = buf.reap();
        assert!(released > 0);
        assert_eq!(buf.reap(), 0);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn dangling_link_fails() {
        let buf = BacktraceBuffer::new();
        assert!(buf.unpack(0x1, 5).is_err());
    }

    #[test]
    fn continuation_matches_piece() {
        assert_eq!(
            PiggybackOp::InsertionOpen2.continuation(),
            Some(PiggybackOp::InsertionExtend2)
        );
        assert_eq!(
            PiggybackOp::DeletionExtend1.continuation(),
            Some(PiggybackOp::DeletionExtend1)
        );
        assert_eq!(PiggybackOp::Mismatch.continuation(), None);
    }
}
