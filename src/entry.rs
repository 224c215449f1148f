//! Arena slot representation for cache entries.
//!
//! Entries do not own raw pointers to each other. Instead they live in a
//! flat `Vec<Slot>` (the arena, see [`crate::engine`]) and reference their
//! recency-list neighbors by `u32` index. This is the re-architecture the
//! source's intrusive pointer list (key/detail/size/allocated/data/prev/next
//! embedded directly in a heap-allocated node) is generalized into: the same
//! fields, but `prev`/`next` are indices rather than pointers, and no two
//! entries ever alias each other's memory.
//!
//! `prev`/`next` are stored as [`AtomicU32`] rather than plain `u32`. A
//! successful `load` must be able to splice its entry to the head of the
//! recency list while the engine's data lock is only held for *reading*
//! (the "inner writer lock" concurrency strategy, see [`crate::engine`]);
//! that splice needs to mutate `prev`/`next` through a shared reference,
//! which plain fields cannot do. The nested list lock still serializes
//! these mutations — the atomics exist for `Sync`, not for lock-free
//! splicing.

use core::sync::atomic::{AtomicU32, Ordering};

extern crate alloc;
use alloc::vec::Vec;

/// Sentinel meaning "no neighbor" for slot links, and "no entry" for the
/// head/tail of an empty list.
pub const NIL: u32 = u32::MAX;

/// Index of a [`Slot`] within the engine's arena.
pub type SlotIndex = u32;

/// Per-entry overhead charged against `used_bytes`, independent of payload
/// size. Accounts for the key/detail/size/capacity fields and the index
/// bucket the source's accounting (`sizeof (ObjectInfo)`) also charges for.
pub const ENTRY_OVERHEAD_BYTES: u64 = 64;

/// One arena slot. Holds a live entry's data, or is unused (tracked by the
/// engine's free list, not by any flag on the slot itself).
pub(crate) struct Slot {
    pub key: u64,
    pub detail: u64,
    pub size: usize,
    pub capacity: usize,
    pub payload: Vec<u8>,
    pub prev: AtomicU32,
    pub next: AtomicU32,
}

impl Slot {
    pub fn vacant() -> Self {
        Slot {
            key: 0,
            detail: 0,
            size: 0,
            capacity: 0,
            payload: Vec::new(),
            prev: AtomicU32::new(NIL),
            next: AtomicU32::new(NIL),
        }
    }

    #[inline]
    pub fn prev(&self) -> Option<SlotIndex> {
        match self.prev.load(Ordering::Relaxed) {
            NIL => None,
            idx => Some(idx),
        }
    }

    #[inline]
    pub fn next(&self) -> Option<SlotIndex> {
        match self.next.load(Ordering::Relaxed) {
            NIL => None,
            idx => Some(idx),
        }
    }

    #[inline]
    pub fn set_prev(&self, v: Option<SlotIndex>) {
        self.prev.store(v.unwrap_or(NIL), Ordering::Relaxed);
    }

    #[inline]
    pub fn set_next(&self, v: Option<SlotIndex>) {
        self.next.store(v.unwrap_or(NIL), Ordering::Relaxed);
    }

    /// Accounted bytes for this slot: per-entry overhead plus the allocated
    /// backing region (not just the live `size`).
    #[inline]
    pub fn accounted_bytes(&self) -> u64 {
        ENTRY_OVERHEAD_BYTES + self.capacity as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vacant_slot_has_no_neighbors() {
        let slot = Slot::vacant();
        assert_eq!(slot.prev(), None);
        assert_eq!(slot.next(), None);
    }

    #[test]
    fn set_and_read_links() {
        let slot = Slot::vacant();
        slot.set_next(Some(3));
        slot.set_prev(Some(7));
        assert_eq!(slot.next(), Some(3));
        assert_eq!(slot.prev(), Some(7));
        slot.set_next(None);
        assert_eq!(slot.next(), None);
    }

    #[test]
    fn accounted_bytes_includes_overhead() {
        let mut slot = Slot::vacant();
        slot.capacity = 100;
        assert_eq!(slot.accounted_bytes(), ENTRY_OVERHEAD_BYTES + 100);
    }
}
