//! Process-local TTL cache used to take read load off list-style queries.
//!
//! Entries expire lazily on read; [`TtlCache::sweep`] removes stale entries
//! proactively and is driven by the scheduler. Instances are independent, one
//! per value type, and two processes may well disagree on what they hold.

pub mod keys;

use crate::clock::{Clock, SystemClock};
use dashmap::{mapref::entry::Entry, DashMap};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

struct CacheEntry<V> {
    value: V,
    stored_at: i64,
    ttl_ms: i64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: i64) -> bool {
        now - self.stored_at > self.ttl_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub in_flight: usize,
}

pub struct TtlCache<V> {
    name: String,
    entries: DashMap<String, CacheEntry<V>>,
    // One gate per key currently being computed, so concurrent misses share a single producer run.
    in_flight: DashMap<String, Arc<Mutex<()>>>,
    // Bumped by `invalidate` for one key, and by `invalidate_pattern`/`clear` for all of them.
    // A computed value is only stored when neither moved while it was produced.
    generations: DashMap<String, u64>,
    epoch: AtomicU64,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Generation {
    epoch: u64,
    key: u64,
}

/// Holds one caller's share of a key gate; the last holder removes the gate,
/// even when the caller is dropped halfway through.
struct InFlight<'c> {
    gates: &'c DashMap<String, Arc<Mutex<()>>>,
    key: &'c str,
    gate: Arc<Mutex<()>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        // Map and this handle are the last two owners: nobody else is waiting.
        self.gates.remove_if(self.key, |_, g| {
            Arc::ptr_eq(g, &self.gate) && Arc::strong_count(g) == 2
        });
    }
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync,
{
    pub fn new(name: &str, default_ttl: Duration) -> Self {
        Self::with_clock(name, default_ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(name: &str, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        TtlCache {
            name: name.to_string(),
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            generations: DashMap::new(),
            epoch: AtomicU64::new(0),
            default_ttl,
            clock,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Live value for `key`. An expired entry is purged on the spot and reported absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_millis();
        match self.entries.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => {}
        }
        // Only drop what is still stale: a writer may have refreshed the key in between.
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        None
    }

    pub fn set(&self, key: &str, value: V, ttl: Option<Duration>) {
        let entry = self.new_entry(value, ttl);
        self.entries.insert(key.to_string(), entry);
    }

    fn new_entry(&self, value: V, ttl: Option<Duration>) -> CacheEntry<V> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        CacheEntry {
            value,
            stored_at: self.clock.now_millis(),
            // saturate rather than wrap into a negative ttl
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
        }
    }

    fn generation(&self, key: &str) -> Generation {
        Generation {
            epoch: self.epoch.load(Ordering::SeqCst),
            key: self.generations.get(key).map(|g| *g).unwrap_or_default(),
        }
    }

    // Store `value` unless `key` was invalidated since `seen` was read.
    fn set_if_unchanged(
        &self,
        key: &str,
        value: V,
        ttl: Option<Duration>,
        seen: Generation,
    ) -> bool {
        // The entry guard serializes this check with `invalidate` on the same key.
        let slot = self.entries.entry(key.to_string());
        if self.generation(key) != seen {
            return false;
        }
        slot.insert(self.new_entry(value, ttl));
        true
    }

    /// Remove `key`. A value being computed for it at the same time is not stored.
    pub fn invalidate(&self, key: &str) {
        let slot = self.entries.entry(key.to_string());
        *self.generations.entry(key.to_string()).or_insert(0) += 1;
        if let Entry::Occupied(entry) = slot {
            entry.remove();
            debug!(cache = %self.name, key, "invalidated cache entry");
        }
    }

    /// Drop every entry whose key contains `pattern`. Returns how many were removed.
    pub fn invalidate_pattern(&self, pattern: &str) -> usize {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.contains(pattern));
        let removed = before.saturating_sub(self.entries.len());
        debug!(cache = %self.name, pattern, removed, "invalidated cache entries by pattern");
        removed
    }

    pub fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.entries.clear();
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_millis();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            in_flight: self.in_flight.len(),
        }
    }

    /// Cached value for `key`, or the result of `producer` which is then stored.
    ///
    /// Concurrent misses on the same key are coalesced: the first caller runs the
    /// producer, the others wait for it and read what it stored. Producer errors are
    /// returned unchanged and nothing is cached for them. A value whose key gets
    /// invalidated while the producer runs is returned but not stored, so it can not
    /// outlive the write that invalidated it. No timeout is applied here.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        producer: F,
        ttl: Option<Duration>,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            debug!(cache = %self.name, key, "cache hit");
            return Ok(value);
        }

        let in_flight = InFlight {
            gates: &self.in_flight,
            key,
            gate: self
                .in_flight
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone(),
        };

        let _computing = in_flight.gate.lock().await;
        if let Some(value) = self.get(key) {
            // filled while we were waiting on the gate
            return Ok(value);
        }

        debug!(cache = %self.name, key, "cache miss, computing value");
        let seen = self.generation(key);
        let result = producer().await;
        if let Ok(value) = &result {
            if !self.set_if_unchanged(key, value.clone(), ttl, seen) {
                debug!(cache = %self.name, key, "invalidated while computing, not stored");
            }
        }
        result
    }
}

/// Type-erased handle over caches of any value type, used by the sweep job and the console.
pub trait ManagedCache: Send + Sync {
    fn cache_name(&self) -> &str;
    fn sweep_expired(&self) -> usize;
    fn cache_stats(&self) -> CacheStats;
    fn clear_entries(&self);
}

impl<V> ManagedCache for TtlCache<V>
where
    V: Clone + Send + Sync,
{
    fn cache_name(&self) -> &str {
        self.name()
    }

    fn sweep_expired(&self) -> usize {
        let removed = self.sweep();
        if removed > 0 {
            info!(cache = %self.name, removed, "swept expired cache entries");
        }
        removed
    }

    fn cache_stats(&self) -> CacheStats {
        self.stats()
    }

    fn clear_entries(&self) {
        self.clear();
        info!(cache = %self.name, "cache cleared");
    }
}
