//! Memory accounting shared with the caller.
//!
//! Every aligner reports its footprint to a [`MemoryTracker`]. By default
//! the aligner owns a private tracker; callers that want one budget across
//! many aligners pass a shared tracker in, and each aligner takes its
//! bytes back out when it is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Byte counters updated by the aligners attached to it.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    allocated: AtomicU64,
    peak: AtomicU64,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracker ready to be handed to several aligners.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn allocated(&self) -> u64 {
        self.allocated.load(Ordering::Relaxed)
    }

    /// Highest value `allocated` has reached.
    pub fn peak(&self) -> u64 {
        self.peak.load(Ordering::Relaxed)
    }

    fn add(&self, bytes: u64) {
        let now = self.allocated.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.peak.fetch_max(now, Ordering::Relaxed);
    }

    fn sub(&self, bytes: u64) {
        let _ = self
            .allocated
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |cur| {
                Some(cur.saturating_sub(bytes))
            });
    }
}

/// Who owns the tracker an aligner reports to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocatorOwnership {
    /// Created with the aligner and dropped with it.
    Owned,
    /// Supplied by the caller; outlives the aligner.
    Borrowed,
}

/// An aligner's link to its tracker, remembering how many bytes this
/// aligner has reported so far.
#[derive(Debug)]
pub struct AllocatorHandle {
    tracker: Arc<MemoryTracker>,
    ownership: AllocatorOwnership,
    reported: u64,
}

impl AllocatorHandle {
    pub fn owned() -> Self {
        AllocatorHandle {
            tracker: MemoryTracker::shared(),
            ownership: AllocatorOwnership::Owned,
            reported: 0,
        }
    }

    pub fn borrowed(tracker: Arc<MemoryTracker>) -> Self {
        AllocatorHandle {
            tracker,
            ownership: AllocatorOwnership::Borrowed,
            reported: 0,
        }
    }

    pub fn ownership(&self) -> AllocatorOwnership {
        self.ownership
    }

    pub fn tracker(&self) -> &Arc<MemoryTracker> {
        &self.tracker
    }

    /// Bytes this handle has reported to the tracker.
    pub fn reported(&self) -> u64 {
        self.reported
    }

    /// Bring the tracker in line with a current footprint of `bytes`.
    pub fn sync(&mut self, bytes: u64) {
        if bytes > self.reported {
            self.tracker.add(bytes - self.reported);
        } else {
            self.tracker.sub(self.reported - bytes);
        }
        self.reported = bytes;
    }
}

impl Drop for AllocatorHandle {
    fn drop(&mut self) {
        if self.ownership == AllocatorOwnership::Borrowed {
            self.tracker.sub(self.reported);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_reports_deltas() {
        let tracker = MemoryTracker::shared();
        let mut handle = AllocatorHandle::borrowed(tracker.clone());
        handle.sync(1000);
        handle.sync(400);
        assert_eq!(tracker.allocated(), 400);
        assert_eq!(tracker.peak(), 1000);
        assert_eq!(handle.reported(), 400);
    }

    #[test]
    fn borrowed_handles_return_bytes_on_drop() {
        let tracker = MemoryTracker::shared();
        {
            let mut a = AllocatorHandle::borrowed(tracker.clone());
            let mut b = AllocatorHandle::borrowed(tracker.clone());
            a.sync(100);
            b.sync(50);
            assert_eq!(tracker.allocated(), 150);
            drop(a);
            assert_eq!(tracker.allocated(), 50);
        }
        assert_eq!(tracker.allocated(), 0);
        assert_eq!(tracker.peak(), 150);
    }

    #[test]
    fn owned_handle_has_private_tracker() {
        let mut handle = AllocatorHandle::owned();
        handle.sync(64);
        assert_eq!(handle.ownership(), AllocatorOwnership::Owned);
        assert_eq!(handle.tracker().allocated(), 64);
        assert_eq!(Arc::strong_count(handle.tracker()), 1);
    }
}
