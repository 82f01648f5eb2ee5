//! In-memory TTL cache for remote API responses
//!
//! Entries are keyed by endpoint name plus serialized parameters and carry an
//! absolute expiry instant fixed at write time. A read past expiry counts as a
//! miss and drops the stale entry; nothing sweeps the map in the background.
//! There is no size bound: a live fetch simply overwrites its key.
//!
//! Time comes from `tokio::time::Instant`, so tests can drive expiry with
//! `tokio::time::pause()` / `advance()`.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Default freshness window (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A cached payload and the instant it stops being trusted
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub payload: V,
    /// `None` when the TTL reaches past the clock's range: never expires
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Thread-safe TTL cache
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh payload for `key`, or None
    ///
    /// An expired entry is removed here.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        match entries.get(key) {
            Some(entry) if entry.is_fresh(now) => Some(entry.payload.clone()),
            Some(_) => {
                debug!(key = %key, "Cache entry expired");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store `payload` under `key`, replacing any previous entry
    pub fn insert(&self, key: impl Into<String>, payload: V) {
        let entry = CacheEntry {
            payload,
            expires_at: Instant::now().checked_add(self.ttl),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), entry);
    }

    /// Expiry instant of the entry under `key`, fresh or not
    ///
    /// None if there is no entry or it never expires.
    pub fn expires_at(&self, key: &str) -> Option<Instant> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .and_then(|e| e.expires_at)
    }

    /// Number of stored entries, including expired ones not yet read
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Build a cache key from an endpoint name and its parameters
///
/// Parameters should serialize deterministically (structs or `BTreeMap`).
pub fn cache_key<P: Serialize + ?Sized>(endpoint: &str, params: &P) -> String {
    let params = serde_json::to_string(params).unwrap_or_default();
    format!("{}:{}", endpoint, params)
}
