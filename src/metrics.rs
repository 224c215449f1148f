//! Engine metrics.
//!
//! Trimmed from the teacher's per-algorithm `CoreCacheMetrics`: with a
//! single eviction policy there is no longer a reason to track frequency or
//! aging dimensions, but the reporting convention survives unchanged —
//! `BTreeMap<String, f64>` for deterministic, reproducible ordering across
//! test runs and bench comparisons.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Trait implemented by anything that can report metrics in a uniform,
/// deterministically-ordered shape.
pub trait CacheMetrics {
    /// All metrics as key-value pairs, keys sorted alphabetically.
    fn metrics(&self) -> BTreeMap<String, f64>;
}

/// Metrics tracked by the engine.
#[derive(Debug, Default, Clone)]
pub struct EngineMetrics {
    /// Total number of load calls.
    pub loads: u64,
    /// Loads that found a matching, live entry.
    pub hits: u64,
    /// Total number of store calls (including deletes).
    pub stores: u64,
    /// Stores rejected for being oversize, plus split-loads rejected as
    /// ill-formed (a mandatory prefix destination was absent).
    pub rejections: u64,
    /// Entries evicted to make room.
    pub evictions: u64,
    /// Current `used_bytes`.
    pub used_bytes: u64,
    /// Configured `capacity_bytes`.
    pub capacity_bytes: u64,
}

impl EngineMetrics {
    /// Cache hit rate in `[0.0, 1.0]`, or `0.0` with no loads yet.
    pub fn hit_rate(&self) -> f64 {
        if self.loads > 0 {
            self.hits as f64 / self.loads as f64
        } else {
            0.0
        }
    }

    /// Fraction of the configured budget currently in use.
    pub fn utilization(&self) -> f64 {
        if self.capacity_bytes > 0 {
            self.used_bytes as f64 / self.capacity_bytes as f64
        } else {
            0.0
        }
    }
}

impl CacheMetrics for EngineMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        let mut m = BTreeMap::new();
        m.insert("loads".to_string(), self.loads as f64);
        m.insert("hits".to_string(), self.hits as f64);
        m.insert(
            "misses".to_string(),
            (self.loads - self.hits) as f64,
        );
        m.insert("hit_rate".to_string(), self.hit_rate());
        m.insert("stores".to_string(), self.stores as f64);
        m.insert("rejections".to_string(), self.rejections as f64);
        m.insert("evictions".to_string(), self.evictions as f64);
        m.insert("used_bytes".to_string(), self.used_bytes as f64);
        m.insert("capacity_bytes".to_string(), self.capacity_bytes as f64);
        m.insert("utilization".to_string(), self.utilization());
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_with_no_loads_is_zero() {
        let m = EngineMetrics::default();
        assert_eq!(m.hit_rate(), 0.0);
    }

    #[test]
    fn hit_rate_computed_from_loads_and_hits() {
        let m = EngineMetrics {
            loads: 4,
            hits: 3,
            ..Default::default()
        };
        assert_eq!(m.hit_rate(), 0.75);
    }

    #[test]
    fn metrics_map_has_deterministic_keys() {
        let m = EngineMetrics::default();
        let map = m.metrics();
        assert!(map.contains_key("hit_rate"));
        assert!(map.contains_key("used_bytes"));
    }
}
