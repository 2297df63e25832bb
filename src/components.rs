//! Score-indexed set of wavefront components.
//!
//! In modular mode each component keeps a ring of `max_score_scope` slots
//! addressed by `score % max_score_scope`, which is all the kernels ever
//! read back. Otherwise every score keeps its own slot so a full backtrace
//! can revisit any layer. Each slot remembers the score it holds, so a
//! stale ring entry reads as absent.

use crate::error::{AlignerError, Result};
use crate::slab::WavefrontSlab;
use crate::wavefront::{Component, Wavefront};

#[derive(Clone, Debug)]
struct Slot {
    score: i32,
    wavefront: Wavefront,
}

#[derive(Debug)]
pub struct WavefrontComponents {
    modular: bool,
    max_score_scope: usize,
    slots: [Vec<Option<Slot>>; 5],
}

impl WavefrontComponents {
    pub fn new(modular: bool, max_score_scope: usize) -> Self {
        WavefrontComponents {
            modular,
            max_score_scope: max_score_scope.max(1),
            slots: Default::default(),
        }
    }

    pub fn is_modular(&self) -> bool {
        self.modular
    }

    pub fn max_score_scope(&self) -> usize {
        self.max_score_scope
    }

    #[inline]
    fn index(&self, score: i32) -> Option<usize> {
        if score < 0 {
            return None;
        }
        let score = score as usize;
        Some(if self.modular {
            score % self.max_score_scope
        } else {
            score
        })
    }

    /// Component `c` at `score`, if one is stored.
    #[inline]
    pub fn get(&self, c: Component, score: i32) -> Option<&Wavefront> {
        let idx = self.index(score)?;
        match self.slots[c.index()].get(idx) {
            Some(Some(slot)) if slot.score == score => Some(&slot.wavefront),
            _ => None,
        }
    }

    /// Like [`get`](Self::get), falling back to `null`.
    #[inline]
    pub fn get_or<'a>(&'a self, c: Component, score: i32, null: &'a Wavefront) -> &'a Wavefront {
        self.get(c, score).unwrap_or(null)
    }

    #[inline]
    pub fn get_mut(&mut self, c: Component, score: i32) -> Option<&mut Wavefront> {
        let idx = self.index(score)?;
        match self.slots[c.index()].get_mut(idx) {
            Some(Some(slot)) if slot.score == score => Some(&mut slot.wavefront),
            _ => None,
        }
    }

    /// Store (or clear, with `None`) component `c` at `score`. Whatever the
    /// slot held before goes back to the slab.
    pub fn store(
        &mut self,
        c: Component,
        score: i32,
        wavefront: Option<Wavefront>,
        slab: &mut WavefrontSlab,
    ) -> Result<()> {
        let idx = self.index(score).ok_or(AlignerError::BacktraceFailed {
            score,
            diagonal: 0,
        })?;
        let len = if self.modular {
            self.max_score_scope
        } else {
            idx + 1
        };
        let slots = &mut self.slots[c.index()];
        if slots.len() < len {
            slots
                .try_reserve(len - slots.len())
                .map_err(|_| AlignerError::AllocationFailed {
                    what: "wavefront score window",
                    bytes: (len - slots.len()) * std::mem::size_of::<Option<Slot>>(),
                })?;
            slots.resize_with(len, || None);
        }
        let fresh = wavefront.map(|wavefront| Slot { score, wavefront });
        if let Some(old) = std::mem::replace(&mut slots[idx], fresh) {
            slab.release(old.wavefront);
        }
        Ok(())
    }

    /// Remove component `c` at `score`, returning its storage to the slab.
    pub fn remove(&mut self, c: Component, score: i32, slab: &mut WavefrontSlab) {
        let Some(idx) = self.index(score) else {
            return;
        };
        if let Some(entry) = self.slots[c.index()].get_mut(idx) {
            if entry.as_ref().is_some_and(|slot| slot.score == score) {
                if let Some(old) = entry.take() {
                    slab.release(old.wavefront);
                }
            }
        }
    }

    /// Return every stored wavefront to the slab in one pass. Slot
    /// capacity is kept.
    pub fn release_all(&mut self, slab: &mut WavefrontSlab) {
        for slots in self.slots.iter_mut() {
            for entry in slots.iter_mut() {
                if let Some(old) = entry.take() {
                    slab.release(old.wavefront);
                }
            }
        }
    }

    /// Number of stored wavefronts across all components.
    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .map(|slots| slots.iter().filter(|s| s.is_some()).count())
            .sum()
    }

    /// Give slot memory back. Call after [`release_all`](Self::release_all).
    /// Returns the bytes released.
    pub fn reap(&mut self) -> usize {
        let before = self.size_in_bytes();
        for slots in self.slots.iter_mut() {
            if slots.iter().all(Option::is_none) {
                *slots = Vec::new();
            }
        }
        before.saturating_sub(self.size_in_bytes())
    }

    /// Bytes of slot bookkeeping; wavefront storage is counted by the slab.
    pub fn size_in_bytes(&self) -> usize {
        self.slots
            .iter()
            .map(|slots| slots.capacity() * std::mem::size_of::<Option<Slot>>())
            .sum()
    }
}
