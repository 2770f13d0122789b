//! In-memory request counters exposed through `/metrics`.
//!
//! [`MetricsRegistry`] holds lifetime counters for the process. Every counter
//! is an [`AtomicU64`]; per-path counters live in a [`DashMap`] so handlers on
//! different workers never serialise on a single lock. Counters only grow and
//! path entries are never removed.

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;

/// Concurrent-safe request counters.
///
/// Safe to share across threads via `Arc<MetricsRegistry>` (or inside
/// [`crate::state::AppState`]). No operation blocks for longer than a single
/// shard lookup.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    requests_total: AtomicU64,
    greet_visitors: AtomicU64,
    requests_by_path: DashMap<String, AtomicU64>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request against `path` and the total.
    pub fn record(&self, path: &str) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        // Fast path: known paths only take a shard read lock.
        if let Some(counter) = self.requests_by_path.get(path) {
            counter.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.requests_by_path
            .entry(path.to_owned())
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Count one `/greet` visitor and return its 1-based ordinal.
    pub fn next_visitor(&self) -> u64 {
        self.greet_visitors.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Point-in-time read of every counter.
    ///
    /// Each counter is read atomically, but the snapshot as a whole is not a
    /// transaction: requests completing while it is taken may be reflected in
    /// some counters and not yet in others.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests_by_path = self
            .requests_by_path
            .iter()
            .map(|e| (e.key().clone(), e.value().load(Ordering::Relaxed)))
            .collect();

        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            greet_visitors: self.greet_visitors.load(Ordering::Relaxed),
            requests_by_path,
        }
    }
}

/// Counter values captured by [`MetricsRegistry::snapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub greet_visitors: u64,
    /// Sorted by path so rendered output is stable.
    pub requests_by_path: BTreeMap<String, u64>,
}
