use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use ahash::AHashMap;
use regex::Regex;
use serde::Serialize;

use super::Weighted;

struct Entry<V> {
    value: Arc<V>,
    inserted_at: Instant,
    ttl: Duration,
    size: usize,
    last_accessed: Instant,
}

impl<V> Entry<V> {
    #[inline]
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) < self.ttl
    }
}

struct Inner<V> {
    entries: AHashMap<String, Entry<V>>,
    hits: u64,
    misses: u64,
    current_size: usize,
}

impl<V> Inner<V> {
    fn evict(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.current_size -= entry.size;
                true
            }
            None => false,
        }
    }

    fn least_recently_used(&self) -> Option<String> {
        self.entries.iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| key.clone())
    }
}

/// Hit and size counters of one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub size_bytes: usize,
    pub hit_rate: f64,
}

/// String-keyed cache whose entries expire a fixed time after insertion and
/// whose total [`Weighted`] size stays under a byte budget.
///
/// Expired entries are dropped lazily on lookup or by [`cleanup`](Self::cleanup).
/// A poisoned lock makes the cache behave as empty: reads miss and writes
/// are dropped.
pub struct TtlCache<V> {
    name: &'static str,
    default_ttl: Duration,
    max_bytes: usize,
    inner: Mutex<Inner<V>>,
}

impl<V: Weighted> TtlCache<V> {
    pub fn new(name: &'static str, default_ttl: Duration, max_bytes: usize) -> Self {
        Self {
            name,
            default_ttl,
            max_bytes,
            inner: Mutex::new(Inner { entries: AHashMap::new(), hits: 0, misses: 0, current_size: 0 }),
        }
    }

    #[inline] pub fn name(&self) -> &'static str { self.name }

    #[inline] pub fn default_ttl(&self) -> Duration { self.default_ttl }

    fn lock(&self) -> Option<MutexGuard<'_, Inner<V>>> {
        match self.inner.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                tracing::warn!("{} cache unavailable (lock poisoned), bypassing", self.name);
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<V>> { self.get_at(key, Instant::now()) }

    /// Look up `key` as of `now`.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<Arc<V>> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        let Some(entry) = inner.entries.get_mut(key) else {
            inner.misses += 1;
            return None;
        };
        if entry.is_fresh(now) {
            entry.last_accessed = now;
            let value = entry.value.clone();
            inner.hits += 1;
            return Some(value);
        }

        inner.evict(key);
        inner.misses += 1;
        None
    }

    pub fn insert(&self, key: impl Into<String>, value: Arc<V>) {
        self.insert_at(key, value, self.default_ttl, Instant::now())
    }

    pub fn insert_with_ttl(&self, key: impl Into<String>, value: Arc<V>, ttl: Duration) {
        self.insert_at(key, value, ttl, Instant::now())
    }

    /// Insert or replace `key` as of `now`, evicting least-recently-used
    /// entries until the new entry fits.
    pub fn insert_at(&self, key: impl Into<String>, value: Arc<V>, ttl: Duration, now: Instant) {
        let key = key.into();
        let size = value.weight();
        let Some(mut inner) = self.lock() else { return };

        inner.evict(&key);
        if size > self.max_bytes {
            tracing::debug!("{} cache: {key} ({size} bytes) exceeds the {} byte budget, not cached",
                self.name, self.max_bytes);
            return;
        }

        while inner.current_size + size > self.max_bytes {
            let Some(victim) = inner.least_recently_used() else { break };
            tracing::trace!("{} cache: evicting {victim}", self.name);
            inner.evict(&victim);
        }

        inner.current_size += size;
        inner.entries.insert(key, Entry { value, inserted_at: now, ttl, size, last_accessed: now });
    }

    /// Drop `key`; returns whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.lock().is_some_and(|mut inner| inner.evict(key))
    }

    /// Drop every entry and reset the hit/miss counters.
    pub fn clear(&self) {
        if let Some(mut inner) = self.lock() {
            inner.entries.clear();
            inner.current_size = 0;
            inner.hits = 0;
            inner.misses = 0;
        }
    }

    pub fn cleanup(&self) -> usize { self.cleanup_at(Instant::now()) }

    /// Drop every entry expired as of `now`; returns how many were dropped.
    pub fn cleanup_at(&self, now: Instant) -> usize {
        let Some(mut inner) = self.lock() else { return 0 };
        let expired: Vec<String> = inner.entries.iter()
            .filter(|(_, entry)| !entry.is_fresh(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            inner.evict(key);
        }
        expired.len()
    }

    /// Sorted keys, optionally filtered by a `*` glob pattern.
    pub fn keys(&self, pattern: Option<&str>) -> Vec<String> {
        let Some(inner) = self.lock() else { return Vec::new() };
        let matcher = pattern.map(glob_regex);
        let mut keys: Vec<String> = inner.entries.keys()
            .filter(|key| match &matcher {
                None => true,
                Some(Ok(re)) => re.is_match(key),
                Some(Err(_)) => pattern == Some(key.as_str()),
            })
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    pub fn stats(&self) -> CacheStats {
        let Some(inner) = self.lock() else { return CacheStats::default() };
        let total = inner.hits + inner.misses;
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.entries.len(),
            size_bytes: inner.current_size,
            hit_rate: if total > 0 { inner.hits as f64 / total as f64 } else { 0.0 },
        }
    }

    pub fn len(&self) -> usize { self.lock().map_or(0, |inner| inner.entries.len()) }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Anchored regex for a glob where `*` matches any run of characters.
fn glob_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let body: Vec<String> = pattern.split('*').map(regex::escape).collect();
    Regex::new(&format!("^{}$", body.join(".*")))
}
