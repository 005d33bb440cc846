//! A TTL map with typed helpers for paths, routes and quotes, plus monotone
//! statistics.
//!
//! Backed by `dashmap` for lock-free concurrent access, with atomic
//! counters tracking hit/miss/set/eviction totals.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};

use crate::asset::AssetId;
use crate::types::PathConstraints;
use crate::units::BaseUnits;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub sets: AtomicU64,
    pub evictions: AtomicU64,
}

impl CacheStats {
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub evictions: u64,
}

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_valid(&self, now: Instant) -> bool {
        now <= self.expires_at
    }
}

/// A string-keyed cache holding opaque JSON-serialized values, each with its
/// own expiration. Serialization at the boundary keeps the cache itself
/// generic over value type.
pub struct RouteCache {
    entries: DashMap<String, Entry>,
    stats: CacheStats,
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let now = Instant::now();
        let Some(entry) = self.entries.get(key) else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        if !entry.is_valid(now) {
            drop(entry);
            self.entries.remove(key);
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let decoded = serde_json::from_slice(&entry.value).ok();
        if decoded.is_some() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
        }
        decoded
    }

    pub fn set<T: Serialize>(&self, key: impl Into<String>, value: &T, ttl: Option<Duration>) {
        let bytes = match serde_json::to_vec(value) {
            Ok(b) => b,
            Err(_) => return,
        };
        let expires_at = Instant::now() + ttl.unwrap_or(DEFAULT_TTL);
        self.entries.insert(key.into(), Entry { value: bytes, expires_at });
        self.stats.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn has(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries.get(key).map(|e| e.is_valid(now)).unwrap_or(false)
    }

    pub fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
        // Statistics are monotone counters; clear() does not reset them.
    }

    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|e| !e.is_valid(now))
            .map(|e| e.key().clone())
            .collect();
        for key in &stale {
            self.entries.remove(key);
        }
        self.stats.evictions.fetch_add(stale.len() as u64, Ordering::Relaxed);
        stale.len()
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }
}

/// Cache key builders.
pub mod keys {
    use super::*;

    pub fn route(sell: &AssetId, buy: &AssetId) -> String {
        format!("route:{sell}:{buy}")
    }

    pub fn quote(sell: &AssetId, buy: &AssetId, amount: &BaseUnits) -> String {
        format!("quote:{sell}:{buy}:{amount}")
    }

    pub fn path(sell: &AssetId, buy: &AssetId, constraints: &PathConstraints) -> String {
        format!("path:{sell}:{buy}:{}", constraints.cache_suffix())
    }
}
