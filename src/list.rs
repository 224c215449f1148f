//! Recency-list primitives over arena slot indices.
//!
//! The source's recency list embeds `prev`/`next` pointers in each entry and
//! a top/bottom pointer pair in the cache struct. Here the same shape is
//! expressed over [`crate::entry::SlotIndex`] rather than pointers: `head`
//! and `tail` are slot indices (or `None` when the list is empty), and each
//! slot's own `prev`/`next` point at neighboring slot indices.
//!
//! Both primitives the spec requires are here: [`unlink`] (safe to call on
//! an already-unlinked entry) and [`push_front`] (unlink, then splice at the
//! head). Callers are responsible for holding whichever lock protects list
//! mutation — these functions do no locking themselves, mirroring how the
//! source's `hyscan_cached_remove_object_from_used` /
//! `hyscan_cached_place_object_on_top_of_used` assume the caller already
//! holds `object_lock`.

extern crate alloc;
use alloc::vec::Vec;

use crate::entry::{Slot, SlotIndex};

/// Unlink `idx` from wherever it currently sits in the list described by
/// `head`/`tail`. No-op if the slot's links are already both absent and it
/// is not the sole element (i.e. it is already detached).
pub(crate) fn unlink(slots: &[Slot], head: &mut Option<SlotIndex>, tail: &mut Option<SlotIndex>, idx: SlotIndex) {
    let prev = slots[idx as usize].prev();
    let next = slots[idx as usize].next();

    if prev.is_none() && next.is_none() && *head != Some(idx) {
        // Already detached: singleton check above guards the one case
        // where prev == next == None legitimately means "sole element".
        return;
    }

    match prev {
        Some(p) => slots[p as usize].set_next(next),
        None => *head = next,
    }
    match next {
        Some(n) => slots[n as usize].set_prev(prev),
        None => *tail = prev,
    }

    slots[idx as usize].set_prev(None);
    slots[idx as usize].set_next(None);
}

/// Unlink `idx`, then splice it in as the new head (most-recently-used
/// position). If the list was empty, `idx` becomes both head and tail.
pub(crate) fn push_front(slots: &[Slot], head: &mut Option<SlotIndex>, tail: &mut Option<SlotIndex>, idx: SlotIndex) {
    unlink(slots, head, tail, idx);

    match *head {
        Some(old_head) => {
            slots[idx as usize].set_next(Some(old_head));
            slots[old_head as usize].set_prev(Some(idx));
        }
        None => {
            slots[idx as usize].set_next(None);
            *tail = Some(idx);
        }
    }
    slots[idx as usize].set_prev(None);
    *head = Some(idx);
}

/// Remove and return the tail (LRU) slot index, if any.
pub(crate) fn pop_back(slots: &[Slot], head: &mut Option<SlotIndex>, tail: &mut Option<SlotIndex>) -> Option<SlotIndex> {
    let victim = (*tail)?;
    unlink(slots, head, tail, victim);
    Some(victim)
}

/// Walk the list head-to-tail, for invariant checks and iteration. Does not
/// allocate in the common case... except it returns an owned `Vec` for test
/// convenience; production code should not call this on a hot path.
#[cfg(test)]
pub(crate) fn collect(slots: &[Slot], head: Option<SlotIndex>) -> Vec<SlotIndex> {
    let mut out = Vec::new();
    let mut cur = head;
    while let Some(idx) = cur {
        out.push(idx);
        cur = slots[idx as usize].next();
    }
    out
}
