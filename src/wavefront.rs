//! A single wavefront component: the furthest-reaching offsets of one
//! component (M, I1, I2, D1 or D2) at one score.
//!
//! Diagonal `k = h - v`, where `h` indexes the text and `v` the pattern.
//! The value stored on a diagonal is `h`; `v` follows as `h - k`.
//!
//! Storage covers `[base, base + capacity)`. The active band `[lo, hi]` is
//! a sub-range of it; anything outside the band reads as [`OFFSET_NULL`].
//! Slots inside the storage but outside the band may hold stale values
//! from a previous use, so kernels write every diagonal of the band.

use crate::bt_buffer::{BlockIdx, PCigar, ROOT_BLOCK};
use crate::error::{try_grow, Result};

/// Text position reached on a diagonal.
pub type Offset = i32;

/// Marker for "no path reaches this diagonal at this score". Far enough
/// from `i32::MIN` that adding small increments never wraps.
pub const OFFSET_NULL: Offset = i32::MIN / 2;

/// True when `offset` lies on a real cell of the `plen x tlen` grid.
#[inline]
pub fn offset_in_bounds(offset: Offset, k: i32, plen: i32, tlen: i32) -> bool {
    let v = offset - k;
    offset >= 0 && offset <= tlen && v >= 0 && v <= plen
}

/// Replace out-of-grid offsets with [`OFFSET_NULL`].
#[inline]
pub fn nullify(offset: Offset, k: i32, plen: i32, tlen: i32) -> Offset {
    if offset_in_bounds(offset, k, plen, tlen) {
        offset
    } else {
        OFFSET_NULL
    }
}

/// The five logical wavefront components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    M,
    I1,
    I2,
    D1,
    D2,
}

impl Component {
    pub const ALL: [Component; 5] = [
        Component::M,
        Component::I1,
        Component::I2,
        Component::D1,
        Component::D2,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Insertion component of gap piece `piece` (0 or 1).
    pub fn insertion(piece: usize) -> Component {
        if piece == 0 {
            Component::I1
        } else {
            Component::I2
        }
    }

    /// Deletion component of gap piece `piece` (0 or 1).
    pub fn deletion(piece: usize) -> Component {
        if piece == 0 {
            Component::D1
        } else {
            Component::D2
        }
    }
}

/// Role tag; sentinels are recognised by tag rather than by address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavefrontKind {
    Live,
    /// Read-only stand-in for an absent component.
    Null,
    /// Write target for components with no live input. Never stored.
    Victim,
}

#[derive(Clone, Debug)]
pub struct Wavefront {
    kind: WavefrontKind,
    lo: i32,
    hi: i32,
    base: i32,
    offsets: Vec<Offset>,
    bt_pcigar: Vec<PCigar>,
    bt_prev: Vec<BlockIdx>,
}

impl Default for Wavefront {
    fn default() -> Self {
        Self::null()
    }
}

impl Wavefront {
    /// The null sentinel: empty band, reads [`OFFSET_NULL`] everywhere.
    pub fn null() -> Self {
        Wavefront {
            kind: WavefrontKind::Null,
            lo: 0,
            hi: -1,
            base: 0,
            offsets: Vec::new(),
            bt_pcigar: Vec::new(),
            bt_prev: Vec::new(),
        }
    }

    /// A victim whose storage covers `[base, base + capacity)`. Writes
    /// outside that range are dropped like any other out-of-range write.
    pub(crate) fn victim(base: i32, capacity: usize) -> Result<Self> {
        let mut offsets = Vec::new();
        try_grow(&mut offsets, capacity, OFFSET_NULL, "victim wavefront")?;
        Ok(Wavefront {
            kind: WavefrontKind::Victim,
            lo: 0,
            hi: -1,
            base,
            offsets,
            bt_pcigar: Vec::new(),
            bt_prev: Vec::new(),
        })
    }

    /// Fresh live storage for `capacity` diagonals, with trace arrays when
    /// `piggyback` is set.
    pub(crate) fn with_capacity(capacity: usize, piggyback: bool) -> Result<Self> {
        let mut wf = Wavefront {
            kind: WavefrontKind::Live,
            lo: 0,
            hi: -1,
            base: 0,
            offsets: Vec::new(),
            bt_pcigar: Vec::new(),
            bt_prev: Vec::new(),
        };
        try_grow(&mut wf.offsets, capacity, OFFSET_NULL, "wavefront offsets")?;
        if piggyback {
            wf.ensure_trace()?;
        }
        Ok(wf)
    }

    /// Make sure the trace arrays match the offset storage. Returns the
    /// number of bytes added.
    pub(crate) fn ensure_trace(&mut self) -> Result<usize> {
        let before = self.size_in_bytes();
        let cap = self.offsets.len();
        try_grow(&mut self.bt_pcigar, cap, 0, "wavefront backtrace words")?;
        try_grow(&mut self.bt_prev, cap, ROOT_BLOCK, "wavefront backtrace links")?;
        Ok(self.size_in_bytes().saturating_sub(before))
    }

    /// Re-target the storage at band `[lo, hi]`. The caller guarantees the
    /// band fits the capacity.
    pub(crate) fn reset(&mut self, lo: i32, hi: i32) {
        debug_assert!(hi < lo || ((hi - lo + 1) as usize) <= self.offsets.len());
        self.kind = WavefrontKind::Live;
        self.base = lo;
        self.lo = lo;
        self.hi = hi;
    }

    #[inline]
    pub fn kind(&self) -> WavefrontKind {
        self.kind
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.kind == WavefrontKind::Null
    }

    #[inline]
    pub fn is_victim(&self) -> bool {
        self.kind == WavefrontKind::Victim
    }

    #[inline]
    pub fn lo(&self) -> i32 {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> i32 {
        self.hi
    }

    /// Number of diagonals in the active band.
    #[inline]
    pub fn width(&self) -> usize {
        if self.hi < self.lo {
            0
        } else {
            (self.hi - self.lo + 1) as usize
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hi < self.lo
    }

    /// Diagonals the storage can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn has_trace(&self) -> bool {
        !self.bt_pcigar.is_empty()
    }

    #[inline]
    fn slot(&self, k: i32) -> Option<usize> {
        let idx = k.checked_sub(self.base)?;
        if idx >= 0 && (idx as usize) < self.offsets.len() {
            Some(idx as usize)
        } else {
            None
        }
    }

    /// Offset on diagonal `k`, or [`OFFSET_NULL`] outside the band.
    #[inline]
    pub fn offset(&self, k: i32) -> Offset {
        if k < self.lo || k > self.hi {
            return OFFSET_NULL;
        }
        match self.slot(k) {
            Some(i) => self.offsets[i],
            None => OFFSET_NULL,
        }
    }

    /// Write diagonal `k`. Writes outside the storage are discarded.
    #[inline]
    pub fn set(&mut self, k: i32, offset: Offset) {
        if let Some(i) = self.slot(k) {
            self.offsets[i] = offset;
        }
    }

    /// Packed trace word on diagonal `k` (zero when absent).
    #[inline]
    pub fn pcigar(&self, k: i32) -> PCigar {
        match self.slot(k) {
            Some(i) if k >= self.lo && k <= self.hi => {
                self.bt_pcigar.get(i).copied().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Backtrace block the trace word on diagonal `k` continues from.
    #[inline]
    pub fn prev(&self, k: i32) -> BlockIdx {
        match self.slot(k) {
            Some(i) if k >= self.lo && k <= self.hi => {
                self.bt_prev.get(i).copied().unwrap_or(ROOT_BLOCK)
            }
            _ => ROOT_BLOCK,
        }
    }

    /// Write the trace of diagonal `k`; dropped if there is no trace storage.
    #[inline]
    pub fn set_trace(&mut self, k: i32, pcigar: PCigar, prev: BlockIdx) {
        if let Some(i) = self.slot(k) {
            if let (Some(w), Some(p)) = (self.bt_pcigar.get_mut(i), self.bt_prev.get_mut(i)) {
                *w = pcigar;
                *p = prev;
            }
        }
    }

    /// Shrink the band past leading and trailing null diagonals.
    pub fn trim_null_ends(&mut self) {
        while self.lo <= self.hi && self.offset(self.lo) == OFFSET_NULL {
            self.lo += 1;
        }
        while self.hi >= self.lo && self.offset(self.hi) == OFFSET_NULL {
            self.hi -= 1;
        }
    }

    /// Intersect the band with `[lo, hi]`.
    pub fn narrow(&mut self, lo: i32, hi: i32) {
        self.lo = self.lo.max(lo);
        self.hi = self.hi.min(hi);
    }

    /// Heap bytes held, by allocated capacity rather than live width.
    pub fn size_in_bytes(&self) -> usize {
        self.offsets.capacity() * std::mem::size_of::<Offset>()
            + self.bt_pcigar.capacity() * std::mem::size_of::<PCigar>()
            + self.bt_prev.capacity() * std::mem::size_of::<BlockIdx>()
    }
}
