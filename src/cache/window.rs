//! Ephemeral key → entry store with age-based expiry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// A cached item and the moment it was written.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub item: T,
    pub cached_at_utc: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Wrap an item, stamping it with the current time.
    pub fn new(item: T) -> Self {
        Self::at(item, Utc::now())
    }

    pub fn at(item: T, cached_at_utc: DateTime<Utc>) -> Self {
        Self { item, cached_at_utc }
    }

    /// Elapsed time since the write. Clock steps backwards count as zero.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.cached_at_utc).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn age_ms(&self) -> u128 {
        self.age().as_millis()
    }

    pub fn age_secs(&self) -> u64 {
        self.age().as_secs()
    }
}

/// Process-wide cache of entries keyed by string (the request path).
///
/// Clones share the same storage. Entries are never deleted: an expired
/// entry is simply unreadable through [`WindowCache::try_get_entry`] until
/// it is overwritten. Concurrent writers to one key do not coordinate; the
/// last write wins.
#[derive(Debug)]
pub struct WindowCache<T> {
    inner: Arc<DashMap<String, CacheEntry<T>>>,
}

impl<T> Clone for WindowCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for WindowCache<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }
}

impl<T: Clone> WindowCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_entry(&self, key: impl Into<String>, entry: CacheEntry<T>) {
        self.inner.insert(key.into(), entry);
    }

    /// Entry for `key` regardless of age.
    pub fn get_entry(&self, key: &str) -> Option<CacheEntry<T>> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    /// Entry for `key` only if it is younger than `max_age`.
    pub fn try_get_entry(&self, key: &str, max_age: Duration) -> Option<CacheEntry<T>> {
        self.get_entry(key).filter(|entry| entry.age() < max_age)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
