//! Recycling allocator for wavefront storage.
//!
//! Released wavefronts are filed under their capacity bucket. A request
//! takes the smallest free wavefront whose bucket covers it and allocates
//! only when none does. Buckets are powers of two with a floor of
//! [`MIN_BUCKET`] diagonals, so a run that repeats the same sequence of
//! requests never allocates twice.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::wavefront::{Wavefront, WavefrontKind};

/// Smallest capacity handed out, in diagonals.
pub const MIN_BUCKET: usize = 16;

/// Capacity bucket serving a band of `width` diagonals.
#[inline]
pub fn bucket_for(width: usize) -> usize {
    width.max(1).next_power_of_two().max(MIN_BUCKET)
}

#[derive(Debug)]
pub struct WavefrontSlab {
    free: BTreeMap<usize, Vec<Wavefront>>,
    piggyback: bool,
    allocated_bytes: usize,
    allocations: u64,
    reuses: u64,
}

impl WavefrontSlab {
    pub fn new(piggyback: bool) -> Self {
        WavefrontSlab {
            free: BTreeMap::new(),
            piggyback,
            allocated_bytes: 0,
            allocations: 0,
            reuses: 0,
        }
    }

    /// A live wavefront whose band is `[lo, hi]`. Storage outside the band
    /// may hold stale values.
    pub fn acquire(&mut self, lo: i32, hi: i32) -> Result<Wavefront> {
        let width = if hi < lo { 0 } else { (hi - lo + 1) as usize };
        let bucket = bucket_for(width);
        let reused = self.free.range_mut(bucket..).find_map(|(_, list)| list.pop());
        let mut wf = match reused {
            Some(mut wf) => {
                self.reuses += 1;
                if self.piggyback && !wf.has_trace() {
                    self.allocated_bytes += wf.ensure_trace()?;
                }
                wf
            }
            None => {
                let wf = Wavefront::with_capacity(bucket, self.piggyback)?;
                self.allocations += 1;
                self.allocated_bytes += wf.size_in_bytes();
                wf
            }
        };
        wf.reset(lo, hi);
        Ok(wf)
    }

    /// File `wf` for reuse. Contents are left as they are. Sentinels are
    /// never filed.
    pub fn release(&mut self, wf: Wavefront) {
        if wf.kind() != WavefrontKind::Live {
            return;
        }
        self.free.entry(wf.capacity()).or_default().push(wf);
    }

    /// Drop every free wavefront. Returns the bytes released.
    pub fn reap(&mut self) -> usize {
        let released: usize = self
            .free
            .values()
            .flat_map(|bucket| bucket.iter())
            .map(Wavefront::size_in_bytes)
            .sum();
        self.free.clear();
        self.allocated_bytes = self.allocated_bytes.saturating_sub(released);
        released
    }

    /// Bytes of every wavefront this slab created that is still alive,
    /// whether handed out or free.
    pub fn size_in_bytes(&self) -> usize {
        self.allocated_bytes
    }

    /// Wavefronts waiting for reuse.
    pub fn free_count(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }

    /// Wavefronts allocated since creation.
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /// Requests served from a free list since creation.
    pub fn reuses(&self) -> u64 {
        self.reuses
    }

    pub fn piggyback(&self) -> bool {
        self.piggyback
    }
}
