//! The fixed-capacity LRU cache engine.
//!
//! This is the core of the crate: a hash index over an arena of slots, a
//! recency list threaded through the same arena by index, and a two-lock
//! concurrency protocol (§5 of the design: a top-level data lock plus a
//! nested list lock) that lets many readers and one writer make progress on
//! a shared store without corruption.
//!
//! # Concurrency strategy
//!
//! The engine holds a single [`parking_lot::RwLock`] (the **data lock**)
//! over everything: the index, the arena, the free list, and `used_bytes`.
//! `store` acquires it in write mode. `load` acquires it in *read* mode —
//! but a successful load still has to move its entry to the head of the
//! recency list, which is a mutation. This is the **inner writer lock**
//! strategy (the one the source uses): the per-slot `prev`/`next` links and
//! the list's `head`/`tail` are stored as atomics, so they can be written
//! through a shared `&Inner` reference; a nested [`parking_lot::Mutex`] (the
//! **list lock**) serializes those writes so that two concurrent "touch"
//! operations can't race each other. The list lock is always acquired
//! strictly inside the data lock.
//!
//! This also means eviction (which only ever runs under the data *write*
//! lock) can never race a list-only writer: holding the write lock excludes
//! every reader, so no list lock acquisition from a load can be in flight
//! while eviction runs.

extern crate alloc;

use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

#[cfg(feature = "hashbrown")]
use hashbrown::hash_map::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

// `#![no_std]` does not link `std` implicitly; when the `hashbrown` feature
// is off we fall back to the standard map, which means this crate needs
// `std` linked explicitly for that configuration (it's still available from
// the sysroot even under `no_std` — it just isn't brought in automatically).
#[cfg(not(feature = "hashbrown"))]
extern crate std;
#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

use core::hash::BuildHasher;

use crate::config::EngineConfig;
use crate::entry::{Slot, SlotIndex, ENTRY_OVERHEAD_BYTES, NIL};
use crate::list;
use crate::metrics::EngineMetrics;

/// The result of a successful split load: the prefix and the remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    /// The first `min(prefix_size, size)` bytes of the payload.
    pub prefix: Vec<u8>,
    /// The remaining bytes, if the caller asked for them (`want_remainder`).
    /// Empty (not absent) when not requested — callers that pass
    /// `want_remainder = false` should ignore this field rather than branch
    /// on it being empty vs. genuinely zero-length.
    pub remainder: Vec<u8>,
}

#[derive(Default)]
struct Counters {
    loads: AtomicU64,
    hits: AtomicU64,
    stores: AtomicU64,
    rejections: AtomicU64,
    evictions: AtomicU64,
}

struct Inner<S> {
    slots: Vec<Slot>,
    free: Vec<SlotIndex>,
    index: HashMap<u64, SlotIndex, S>,
    head: AtomicU32,
    tail: AtomicU32,
    used_bytes: u64,
}

impl<S> Inner<S> {
    fn head(&self) -> Option<SlotIndex> {
        match self.head.load(Ordering::Relaxed) {
            NIL => None,
            idx => Some(idx),
        }
    }

    fn tail(&self) -> Option<SlotIndex> {
        match self.tail.load(Ordering::Relaxed) {
            NIL => None,
            idx => Some(idx),
        }
    }

    fn set_head(&self, v: Option<SlotIndex>) {
        self.head.store(v.unwrap_or(NIL), Ordering::Relaxed);
    }

    fn set_tail(&self, v: Option<SlotIndex>) {
        self.tail.store(v.unwrap_or(NIL), Ordering::Relaxed);
    }
}

/// A fixed-capacity, LRU-evicting content cache keyed by a 64-bit `key` and
/// filtered on read by a 64-bit `detail`.
///
/// Construct with [`EngineConfig`]; there is no runtime reconfiguration.
///
/// # Examples
///
/// ```
/// use bytecache::{Engine, config::EngineConfig};
///
/// let cache = Engine::new(EngineConfig::new(64));
/// assert!(cache.store(0xAAAA, 0xBBBB, b"hello", b""));
/// assert_eq!(cache.load(0xAAAA, 0xBBBB), Some(b"hello".to_vec()));
/// assert_eq!(cache.load(0xAAAA, 0xCCCC), None);
/// ```
pub struct Engine<S = DefaultHashBuilder> {
    inner: RwLock<Inner<S>>,
    list_lock: Mutex<()>,
    capacity_bytes: u64,
    counters: Counters,
}

impl Engine<DefaultHashBuilder> {
    /// Constructs an engine with the default hasher.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_hasher(config, DefaultHashBuilder::default())
    }
}

impl<S: BuildHasher> core::fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("capacity_bytes", &self.capacity_bytes)
            .field("used_bytes", &self.used_bytes())
            .field("len", &self.len())
            .finish()
    }
}

impl<S: BuildHasher> Engine<S> {
    /// Constructs an engine with an explicit hasher, for callers that want
    /// to pin down hashing behavior (e.g. for reproducible benchmarks).
    pub fn with_hasher(config: EngineConfig, hasher: S) -> Self {
        Engine {
            inner: RwLock::new(Inner {
                slots: Vec::new(),
                free: Vec::new(),
                index: HashMap::with_hasher(hasher),
                head: AtomicU32::new(NIL),
                tail: AtomicU32::new(NIL),
                used_bytes: 0,
            }),
            list_lock: Mutex::new(()),
            capacity_bytes: config.capacity_bytes(),
            counters: Counters::default(),
        }
    }

    /// The configured byte budget (`capacity_mb << 20`).
    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    /// Current accounted bytes across all live entries.
    pub fn used_bytes(&self) -> u64 {
        self.inner.read().used_bytes
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner.read().index.len()
    }

    /// Whether the engine holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current allocated capacity (in bytes) of the backing region for
    /// `key`, or `None` if `key` is not indexed. Exposed mainly for tests
    /// exercising the reallocation-hysteresis law; does not touch LRU order.
    pub fn entry_capacity(&self, key: u64) -> Option<usize> {
        let inner = self.inner.read();
        let idx = *inner.index.get(&key)?;
        Some(inner.slots[idx as usize].capacity)
    }

    /// Records a rejection that never reached the data lock — currently
    /// only the façade's `load_split` ill-formed-request guard (`out_a`
    /// absent while `out_b` is supplied), which rejects before there is
    /// any key to look up. Keeps that rejection counted alongside
    /// oversize-store rejections in [`Engine::metrics`].
    pub fn record_ill_formed_rejection(&self) {
        self.counters.rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// A snapshot of the engine's metrics.
    pub fn metrics(&self) -> EngineMetrics {
        let inner = self.inner.read();
        EngineMetrics {
            loads: self.counters.loads.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            stores: self.counters.stores.load(Ordering::Relaxed),
            rejections: self.counters.rejections.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            used_bytes: inner.used_bytes,
            capacity_bytes: self.capacity_bytes,
        }
    }

    fn touch_front(&self, inner: &Inner<S>, idx: SlotIndex) {
        let _guard = self.list_lock.lock();
        let mut head = inner.head();
        let mut tail = inner.tail();
        list::push_front(&inner.slots, &mut head, &mut tail, idx);
        inner.set_head(head);
        inner.set_tail(tail);
    }

    fn detach(&self, inner: &Inner<S>, idx: SlotIndex) {
        let _guard = self.list_lock.lock();
        let mut head = inner.head();
        let mut tail = inner.tail();
        list::unlink(&inner.slots, &mut head, &mut tail, idx);
        inner.set_head(head);
        inner.set_tail(tail);
    }

    fn pop_lru(&self, inner: &Inner<S>) -> Option<SlotIndex> {
        let _guard = self.list_lock.lock();
        let mut head = inner.head();
        let mut tail = inner.tail();
        let victim = list::pop_back(&inner.slots, &mut head, &mut tail);
        inner.set_head(head);
        inner.set_tail(tail);
        victim
    }

    fn allocate(inner: &mut Inner<S>) -> SlotIndex {
        if let Some(idx) = inner.free.pop() {
            idx
        } else {
            inner.slots.push(Slot::vacant());
            (inner.slots.len() - 1) as u32
        }
    }

    fn recycle(inner: &mut Inner<S>, idx: SlotIndex) {
        let slot = &mut inner.slots[idx as usize];
        slot.key = 0;
        slot.detail = 0;
        slot.size = 0;
        slot.capacity = 0;
        slot.payload = Vec::new();
        slot.set_prev(None);
        slot.set_next(None);
        inner.free.push(idx);
    }

    /// Writes the concatenation of `a` and `b` as the payload for `key`,
    /// recording `detail` verbatim. Passing two empty slices deletes `key`.
    ///
    /// Returns `false` (a rejection, not an error) if `a.len() + b.len()`
    /// alone exceeds 10% of the configured budget; the engine is left
    /// unchanged.
    pub fn store(&self, key: u64, detail: u64, a: &[u8], b: &[u8]) -> bool {
        let n = a.len() + b.len();

        if n as u64 > self.capacity_bytes / 10 {
            self.counters.rejections.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let mut inner = self.inner.write();
        self.counters.stores.fetch_add(1, Ordering::Relaxed);

        let existing = inner.index.get(&key).copied();

        if n == 0 {
            if let Some(idx) = existing {
                self.detach(&inner, idx);
                let freed = inner.slots[idx as usize].accounted_bytes();
                inner.used_bytes -= freed;
                inner.index.remove(&key);
                Self::recycle(&mut inner, idx);
            }
            return true;
        }

        let needed = ENTRY_OVERHEAD_BYTES + n as u64;

        // Detach (but don't yet free) the entry being updated so eviction
        // below can't pick it as the LRU victim, and subtract its current
        // accounting so the eviction budget check is against "everyone
        // else".
        if let Some(idx) = existing {
            self.detach(&inner, idx);
            let old_accounted = inner.slots[idx as usize].accounted_bytes();
            inner.used_bytes -= old_accounted;
        }

        while inner.used_bytes + needed > self.capacity_bytes {
            match self.pop_lru(&inner) {
                Some(victim) => {
                    let freed = inner.slots[victim as usize].accounted_bytes();
                    inner.used_bytes -= freed;
                    let victim_key = inner.slots[victim as usize].key;
                    inner.index.remove(&victim_key);
                    Self::recycle(&mut inner, victim);
                    self.counters.evictions.fetch_add(1, Ordering::Relaxed);
                }
                None => break,
            }
        }

        let idx = match existing {
            Some(idx) => {
                let slot = &mut inner.slots[idx as usize];
                let realloc = n > slot.capacity || (n as f64) < 0.95 * slot.capacity as f64;
                if realloc {
                    slot.payload = alloc::vec![0u8; n];
                    slot.capacity = n;
                }
                slot.payload[..a.len()].copy_from_slice(a);
                slot.payload[a.len()..a.len() + b.len()].copy_from_slice(b);
                slot.size = n;
                slot.detail = detail;
                idx
            }
            None => {
                let idx = Self::allocate(&mut inner);
                let slot = &mut inner.slots[idx as usize];
                slot.key = key;
                slot.detail = detail;
                slot.size = n;
                slot.capacity = n;
                slot.payload = alloc::vec![0u8; n];
                slot.payload[..a.len()].copy_from_slice(a);
                slot.payload[a.len()..a.len() + b.len()].copy_from_slice(b);
                inner.index.insert(key, idx);
                idx
            }
        };

        inner.used_bytes += needed;
        self.touch_front(&inner, idx);
        true
    }

    /// Deletes `key`, if present. Idempotent: deleting an absent key still
    /// returns `true` (no state to change, but nothing was rejected).
    pub fn delete(&self, key: u64) -> bool {
        self.store(key, 0, &[], &[])
    }

    /// Loads the full payload for `key`, iff it exists and (when `detail !=
    /// 0`) its stored detail matches. A successful load moves `key` to the
    /// head of the recency list.
    pub fn load(&self, key: u64, detail: u64) -> Option<Vec<u8>> {
        self.load_split(key, detail, usize::MAX, false)
            .map(|r| r.prefix)
    }

    /// Loads the first `min(prefix_size, size)` bytes of the payload into
    /// the returned `prefix`, and (if `want_remainder`) the rest into
    /// `remainder`. Returns `None` on miss (absent key, or detail
    /// mismatch).
    pub fn load_split(
        &self,
        key: u64,
        detail: u64,
        prefix_size: usize,
        want_remainder: bool,
    ) -> Option<LoadResult> {
        let inner = self.inner.read();
        self.counters.loads.fetch_add(1, Ordering::Relaxed);

        let idx = *inner.index.get(&key)?;
        let slot = &inner.slots[idx as usize];
        if detail != 0 && slot.detail != detail {
            return None;
        }

        self.touch_front(&inner, idx);

        let m_a = prefix_size.min(slot.size);
        let prefix = slot.payload[..m_a].to_vec();
        let remainder = if want_remainder {
            slot.payload[m_a..slot.size].to_vec()
        } else {
            Vec::new()
        };

        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        Some(LoadResult { prefix, remainder })
    }
}
