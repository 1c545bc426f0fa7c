//! Loader counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Thread-safe loader counters. Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct LoaderMetrics {
    /// Pipeline runs (one per byte retrieval of a registered unit)
    pub injections: Arc<AtomicU64>,
    /// Calls into the host define primitive
    pub definitions: Arc<AtomicU64>,
    /// Resolutions answered from the resolution cache
    pub cache_hits: Arc<AtomicU64>,
    /// Resolutions answered by the delegate chain
    pub fallback_resolutions: Arc<AtomicU64>,
    /// Resource lookups that exhausted every source
    pub resource_misses: Arc<AtomicU64>,
}

impl LoaderMetrics {
    pub fn record_injection(&self) {
        self.injections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_definition(&self) {
        self.definitions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback_resolution(&self) {
        self.fallback_resolutions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_resource_miss(&self) {
        self.resource_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            injections: self.injections.load(Ordering::Relaxed),
            definitions: self.definitions.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            fallback_resolutions: self.fallback_resolutions.load(Ordering::Relaxed),
            resource_misses: self.resource_misses.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub injections: u64,
    pub definitions: u64,
    pub cache_hits: u64,
    pub fallback_resolutions: u64,
    pub resource_misses: u64,
}
