//! Insert-only highlight cache with single-flight population.
//!
//! [`HighlightCache`] maps a [`CacheKey`] (normalized language plus a 64-bit
//! hash of the snippet) to rendered [`Markup`]. Entries are written once and
//! never evicted; the documentation site renders a small, fixed set of
//! snippets, so the map's size is bounded by its inputs.
//!
//! Each key owns a flight slot with its own lock. The first caller for a cold
//! key computes while holding that slot; concurrent callers for the same key
//! block on it and then read the stored value instead of recomputing. The
//! map-wide lock only covers finding or creating the slot. A failed
//! computation leaves the slot empty, so the next caller (including any that
//! were waiting) computes again: errors are never cached. The last caller to
//! fail removes the empty slot so failing keys do not accumulate.

use crate::{Markup, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;
use twox_hash::XxHash64;

/// Cache key: normalized language name and content hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    language: String,
    hash: u64,
}

impl CacheKey {
    /// Build a key for `source` highlighted as `language`.
    ///
    /// `language` should already be normalized by the caller; it is stored
    /// as given.
    pub fn new(language: impl Into<String>, source: &str) -> Self {
        Self { language: language.into(), hash: content_hash(source) }
    }

    /// Language part of the key.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Content hash part of the key.
    pub const fn hash(&self) -> u64 {
        self.hash
    }
}

/// Stable 64-bit hash of snippet content (XXH64, seed 0).
pub fn content_hash(source: &str) -> u64 {
    XxHash64::oneshot(0, source.as_bytes())
}

/// Per-key slot; `None` until a computation succeeds.
#[derive(Default)]
struct Flight {
    value: Mutex<Option<Markup>>,
}

/// Thread-safe cache statistics
#[derive(Default)]
struct CacheStats {
    requests: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    errors: AtomicU64,
}

/// Insert-only, single-flight cache of rendered highlights.
#[derive(Default)]
pub struct HighlightCache {
    flights: Mutex<HashMap<CacheKey, Arc<Flight>>>,
    stats: CacheStats,
}

impl HighlightCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached markup for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs at most once per key at a time. On `Err` nothing is
    /// stored and the error is returned to this caller only.
    pub fn get_or_try_insert_with<F>(&self, key: &CacheKey, compute: F) -> Result<Markup>
    where
        F: FnOnce() -> Result<Markup>,
    {
        self.stats.requests.fetch_add(1, Ordering::Relaxed);

        let flight = {
            let mut flights = self.flights.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(flights.entry(key.clone()).or_default())
        };

        // Only a complete value or `None` is ever written, so a poisoned slot
        // is still consistent.
        let mut slot = flight.value.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(markup) = slot.as_ref() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            debug!(language = key.language(), hash = key.hash(), "highlight cache hit");
            return Ok(markup.clone());
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        debug!(language = key.language(), hash = key.hash(), "highlight cache miss");

        match compute() {
            Ok(markup) => {
                self.stats.inserts.fetch_add(1, Ordering::Relaxed);
                debug!(
                    language = key.language(),
                    hash = key.hash(),
                    bytes = markup.len(),
                    "highlight cached"
                );
                *slot = Some(markup.clone());
                Ok(markup)
            },
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                drop(slot);
                self.discard_empty(key, &flight);
                Err(e)
            },
        }
    }

    /// Drop the slot for `key` after a failure, unless another caller is
    /// already holding it. Clones are only taken under the map lock, so a
    /// count of two (map plus `flight`) means nobody is waiting on it.
    fn discard_empty(&self, key: &CacheKey, flight: &Arc<Flight>) {
        let mut flights = self.flights.lock().unwrap_or_else(PoisonError::into_inner);
        let unshared = flights
            .get(key)
            .is_some_and(|f| Arc::ptr_eq(f, flight) && Arc::strong_count(f) == 2);
        if unshared {
            flights.remove(key);
        }
    }

    /// Look up `key` without computing. Waits for an in-flight computation.
    pub fn get(&self, key: &CacheKey) -> Option<Markup> {
        let flight = {
            let flights = self.flights.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(flights.get(key)?)
        };
        let slot = flight.value.lock().unwrap_or_else(PoisonError::into_inner);
        slot.clone()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        // Insert-only: every successful insert is a distinct key.
        usize::try_from(self.stats.inserts.load(Ordering::Relaxed)).unwrap_or(usize::MAX)
    }

    /// True when nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStatsSummary {
        let requests = self.stats.requests.load(Ordering::Relaxed);
        let hits = self.stats.hits.load(Ordering::Relaxed);
        CacheStatsSummary {
            requests,
            hits,
            misses: self.stats.misses.load(Ordering::Relaxed),
            inserts: self.stats.inserts.load(Ordering::Relaxed),
            errors: self.stats.errors.load(Ordering::Relaxed),
            entries: self.len(),
            hit_rate: if requests > 0 {
                #[allow(clippy::cast_precision_loss)]
                let rate = hits as f64 / requests as f64;
                rate
            } else {
                0.0
            },
        }
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStatsSummary {
    /// Lookups made
    pub requests: u64,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that ran a computation
    pub misses: u64,
    /// Successful computations stored
    pub inserts: u64,
    /// Failed computations (not stored)
    pub errors: u64,
    /// Stored entries
    pub entries: usize,
    /// `hits / requests`
    pub hit_rate: f64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::Barrier;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    fn markup(s: &str) -> Markup {
        Markup::new(s.to_string())
    }

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(content_hash("package main"), content_hash("package main"));
        assert_ne!(content_hash("package main"), content_hash("package main "));
        assert_eq!(content_hash(""), XxHash64::oneshot(0, b""));
    }

    #[test]
    fn test_miss_then_hit() {
        let cache = HighlightCache::new();
        let key = CacheKey::new("go", "package main");
        let calls = AtomicUsize::new(0);

        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(markup("<b>x</b>"))
        };
        let first = cache.get_or_try_insert_with(&key, compute).unwrap();
        let second = cache
            .get_or_try_insert_with(&key, || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(markup("different"))
            })
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hit_rate, 0.5);
    }

    #[test]
    fn test_keys_are_independent() {
        let cache = HighlightCache::new();
        let a = CacheKey::new("go", "a");
        let b = CacheKey::new("go", "b");
        let a_html = CacheKey::new("html", "a");

        cache.get_or_try_insert_with(&a, || Ok(markup("A"))).unwrap();
        cache.get_or_try_insert_with(&b, || Ok(markup("B"))).unwrap();
        cache.get_or_try_insert_with(&a_html, || Ok(markup("A-html"))).unwrap();

        assert_eq!(cache.get(&a).unwrap().as_str(), "A");
        assert_eq!(cache.get(&b).unwrap().as_str(), "B");
        assert_eq!(cache.get(&a_html).unwrap().as_str(), "A-html");
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = HighlightCache::new();
        let key = CacheKey::new("zig", "const x = 1;");

        let err = cache
            .get_or_try_insert_with(&key, || Err(Error::UnknownLanguage("zig".into())))
            .unwrap_err();
        assert_eq!(err.category(), "unknown_language");
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());

        let ok = cache.get_or_try_insert_with(&key, || Ok(markup("ok"))).unwrap();
        assert_eq!(ok.as_str(), "ok");
        assert_eq!(cache.stats().errors, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_single_flight_under_contention() {
        let cache = Arc::new(HighlightCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));
        let key = CacheKey::new("go", "func main() {}");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                let key = key.clone();
                thread::spawn(move || {
                    barrier.wait();
                    cache
                        .get_or_try_insert_with(&key, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            Ok(markup("rendered"))
                        })
                        .unwrap()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.iter().all(|m| m.as_str() == "rendered"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_waiters_recompute_after_failure() {
        let cache = HighlightCache::new();
        let key = CacheKey::new("go", "x");
        let attempts = AtomicUsize::new(0);

        for _ in 0..3 {
            let _ = cache.get_or_try_insert_with(&key, || {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(Error::Tokenize("bad".into()))
            });
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_failed_keys_leave_no_slots() {
        // Given many distinct keys that all fail
        let cache = HighlightCache::new();
        for i in 0..1000 {
            let key = CacheKey::new("klingon", &format!("snippet {i}"));
            let _ = cache
                .get_or_try_insert_with(&key, || Err(Error::UnknownLanguage("klingon".into())));
        }

        // Then no empty slots are retained
        assert_eq!(cache.flights.lock().unwrap().len(), 0);
        assert_eq!(cache.stats().errors, 1000);

        // And a later success for one of them is stored normally
        let key = CacheKey::new("klingon", "snippet 7");
        cache.get_or_try_insert_with(&key, || Ok(markup("ok"))).unwrap();
        assert_eq!(cache.flights.lock().unwrap().len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failure_keeps_slot_while_others_wait() {
        // Given a slot that a second caller already holds
        let cache = HighlightCache::new();
        let key = CacheKey::new("go", "x");
        let waiter = {
            let mut flights = cache.flights.lock().unwrap();
            Arc::clone(flights.entry(key.clone()).or_default())
        };

        // When the computing caller fails
        let _ = cache.get_or_try_insert_with(&key, || Err(Error::Tokenize("bad".into())));

        // Then the shared slot stays in place for the waiter
        let flights = cache.flights.lock().unwrap();
        assert!(Arc::ptr_eq(&flights[&key], &waiter));
    }
}
