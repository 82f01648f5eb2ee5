//! Cached service adapters over the remote API
//!
//! Each service owns one [`TtlCache`] and is handed to its consumers
//! explicitly; there are no process-wide singletons. Every failure (network,
//! status, malformed body) is logged and answered with fallback data. Fallback
//! answers are never cached, so the next call tries the network again.

mod ai;
mod books;

pub use ai::AiService;
pub use books::{BookQuery, BookService};

use crate::api::Transport;
use crate::cache::{cache_key, TtlCache};
use crate::error::ApiError;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Where a value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Fresh network response
    Live,
    /// Served from the TTL cache
    Cached,
    /// Static substitute after a failure
    Fallback,
}

/// A value plus its [`Origin`]
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Fetched<T> {
    pub fn new(value: T, origin: Origin) -> Self {
        Self { value, origin }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == Origin::Fallback
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            value: f(self.value),
            origin: self.origin,
        }
    }
}

impl<T: Serialize> Serialize for Fetched<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Fetched", 2)?;
        state.serialize_field("data", &self.value)?;
        state.serialize_field("origin", &self.origin)?;
        state.end()
    }
}

/// Transport plus response cache shared by one service
struct CachedApi {
    transport: Arc<dyn Transport>,
    cache: TtlCache<Value>,
}

impl CachedApi {
    fn new(transport: Arc<dyn Transport>, ttl: Duration) -> Self {
        Self {
            transport,
            cache: TtlCache::new(ttl),
        }
    }

    /// Cached GET; the body is stored only if `parse` accepts it
    async fn get<T>(
        &self,
        endpoint: &str,
        path: &str,
        query: Vec<(String, String)>,
        parse: impl Fn(Value) -> Result<T, ApiError>,
    ) -> Result<Fetched<T>, ApiError> {
        let key = cache_key(endpoint, &query);
        if let Some(hit) = self.cached(&key, &parse) {
            return Ok(hit);
        }

        let body = self.transport.get_json(path, &query).await?;
        self.store(key, body, parse)
    }

    /// Cached POST keyed by the request body
    async fn post<T>(
        &self,
        endpoint: &str,
        path: &str,
        body: Value,
        parse: impl Fn(Value) -> Result<T, ApiError>,
    ) -> Result<Fetched<T>, ApiError> {
        let key = cache_key(endpoint, &body);
        if let Some(hit) = self.cached(&key, &parse) {
            return Ok(hit);
        }

        let response = self.transport.post_json(path, &body).await?;
        self.store(key, response, parse)
    }

    fn cached<T>(&self, key: &str, parse: &impl Fn(Value) -> Result<T, ApiError>) -> Option<Fetched<T>> {
        let body = self.cache.get(key)?;
        match parse(body) {
            Ok(value) => {
                debug!(key = %key, "Cache hit");
                Some(Fetched::new(value, Origin::Cached))
            }
            Err(_) => None,
        }
    }

    fn store<T>(
        &self,
        key: String,
        body: Value,
        parse: impl Fn(Value) -> Result<T, ApiError>,
    ) -> Result<Fetched<T>, ApiError> {
        let value = parse(body.clone())?;
        self.cache.insert(key, body);
        Ok(Fetched::new(value, Origin::Live))
    }

    fn clear(&self) {
        self.cache.clear();
    }
}

/// Log a failed call and produce the fallback
fn fall_back<T>(endpoint: &str, error: &ApiError, fallback: impl FnOnce() -> T) -> Fetched<T> {
    warn!(endpoint = %endpoint, error = %error, "Remote API unavailable, using fallback data");
    Fetched::new(fallback(), Origin::Fallback)
}

/// Decode a body into `T`
fn parse_as<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(body)?)
}

/// Accept either a bare array or an object wrapping the array under `key`
fn unwrap_list(body: Value, key: &str) -> Result<Vec<Value>, ApiError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut fields) => match fields.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ApiError::Parse(format!("expected '{}' array", key))),
        },
        _ => Err(ApiError::Parse("expected a JSON array".to_string())),
    }
}
