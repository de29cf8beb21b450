use crate::error::Result;
use crate::store::LocalStore;
use chrono::Utc;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A cached value together with the moment it was stored.
///
/// The value's fields are flattened next to `timestamp` (milliseconds since the epoch), so a
/// snapshot struct is persisted as `{ ...fields, "timestamp": 1700000000000 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamped<T> {
    /// The cached value
    #[serde(flatten)]
    pub value: T,
    /// When the value was stored, in epoch milliseconds
    pub timestamp: i64,
}

impl<T> Timestamped<T> {
    /// Wraps `value` with the current time
    pub fn now(value: T) -> Self {
        Self {
            value,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Age relative to `now_ms`; entries from the future count as brand new
    pub fn age_at(&self, now_ms: i64) -> Duration {
        Duration::from_millis(now_ms.saturating_sub(self.timestamp).max(0) as u64)
    }

    /// Whether the entry is strictly younger than `ttl`
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age_at(Utc::now().timestamp_millis()) < ttl
    }
}

/// Time-bounded cache layered over the persistent store
#[derive(Debug, Clone, Copy)]
pub struct TtlCache {
    ttl: Duration,
}

impl TtlCache {
    /// Creates a cache whose entries expire after `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Configured time to live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the entry under `key` if present, readable and not expired
    pub fn get<T: DeserializeOwned>(&self, store: &LocalStore, key: &str) -> Option<Timestamped<T>> {
        let entry: Timestamped<T> = store.get(key)?;
        if entry.is_fresh(self.ttl) {
            debug!("Cache hit for {}", key);
            Some(entry)
        } else {
            debug!("Cache entry for {} expired", key);
            None
        }
    }

    /// Stores `value` under `key` stamped with the current time
    pub fn put<T: Serialize>(
        &self,
        store: &mut LocalStore,
        key: &str,
        value: T,
    ) -> Result<Timestamped<T>> {
        let entry = Timestamped::now(value);
        store.set(key, &entry)?;
        Ok(entry)
    }

    /// Drops the entry under `key`
    pub fn invalidate(&self, store: &mut LocalStore, key: &str) -> Result<bool> {
        store.remove(key)
    }
}
