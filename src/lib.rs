#![doc = include_str!("../README.md")]
#![no_std]

#[cfg(test)]
extern crate scoped_threadpool;

/// Arena slot representation for cache entries.
///
/// Entries live in a flat arena (`Vec<Slot>`) rather than behind individual
/// heap allocations linked by raw pointers; the recency list and the
/// free list both reference entries by `u32` index into that arena.
pub mod entry;

/// Recency-list primitives over arena slot indices.
///
/// Internal infrastructure used by [`engine`] to maintain LRU order. Not
/// part of the public API: a slot index is meaningless outside the arena
/// that allocated it.
pub(crate) mod list;

/// Engine configuration.
pub mod config;

/// The fixed-capacity LRU cache engine.
pub mod engine;

/// Engine metrics.
pub mod metrics;

/// String-to-key fingerprint.
pub mod fingerprint;

/// Typed, resizable byte container used to hand payload bytes in and out of
/// the facade.
pub mod buffer;

/// The capability-erased cache facade.
pub mod facade;

pub use buffer::{Blob, BlobTag};
pub use config::EngineConfig;
pub use engine::{Engine, LoadResult};
pub use facade::{AnyFacade, CacheFacade};
pub use fingerprint::fingerprint64;
pub use metrics::{CacheMetrics, EngineMetrics};
