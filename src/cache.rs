//! In-process memoization with expiry timestamps.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;

/// Default lifetime of a memoized remote load.
pub const DEFAULT_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct Stamped<V> {
    pub value: V,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl<V> Stamped<V> {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn age_minutes_at(&self, now: DateTime<Utc>) -> i64 {
        (now - self.cached_at).num_minutes().max(0)
    }
}

/// Key → value store whose entries expire `ttl` after insertion.
#[derive(Debug, Clone)]
pub struct MemoCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, Stamped<V>>,
}

impl<K: Eq + Hash, V> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_TTL_HOURS))
    }
}

impl<K: Eq + Hash, V> MemoCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<&Stamped<V>> {
        self.get_at(key, Utc::now())
    }

    pub fn get_at(&self, key: &K, now: DateTime<Utc>) -> Option<&Stamped<V>> {
        self.entries.get(key).filter(|e| e.is_fresh_at(now))
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Utc::now());
    }

    /// Store `value`, dropping any entries that have already expired.
    pub fn insert_at(&mut self, key: K, value: V, now: DateTime<Utc>) {
        self.entries.retain(|_, e| e.is_fresh_at(now));
        self.entries.insert(
            key,
            Stamped {
                value,
                cached_at: now,
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
