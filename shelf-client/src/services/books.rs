//! Book list, recommendation, lookup and search endpoints

use super::{fall_back, parse_as, unwrap_list, CachedApi, Fetched};
use crate::api::Transport;
use crate::cache::DEFAULT_TTL;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shelf_common::fallback;
use shelf_common::models::{Book, Recommendation};
use std::sync::Arc;
use std::time::Duration;

/// Parameters for list endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookQuery {
    pub genre: Option<String>,
    pub limit: Option<usize>,
    pub user_id: Option<String>,
}

impl BookQuery {
    fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(genre) = &self.genre {
            pairs.push(("genre".to_string(), genre.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(user_id) = &self.user_id {
            pairs.push(("user_id".to_string(), user_id.clone()));
        }
        pairs
    }
}

/// Book data service
pub struct BookService {
    api: CachedApi,
}

impl BookService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_ttl(transport, DEFAULT_TTL)
    }

    pub fn with_ttl(transport: Arc<dyn Transport>, ttl: Duration) -> Self {
        Self {
            api: CachedApi::new(transport, ttl),
        }
    }

    /// Raw, loosely typed book records, ready for the worker to normalize
    pub async fn book_list(&self, query: &BookQuery) -> Fetched<Vec<Value>> {
        self.api
            .get("books", "books", query.to_pairs(), |body| unwrap_list(body, "books"))
            .await
            .unwrap_or_else(|e| {
                fall_back("books", &e, || {
                    fallback::fallback_books()
                        .into_iter()
                        .filter_map(|b| serde_json::to_value(b).ok())
                        .collect()
                })
            })
    }

    pub async fn recommendations(&self, query: &BookQuery) -> Fetched<Vec<Recommendation>> {
        self.api
            .get("recommendations", "recommendations", query.to_pairs(), |body| {
                unwrap_list(body, "recommendations")?
                    .into_iter()
                    .map(parse_as::<Recommendation>)
                    .collect::<Result<Vec<_>, _>>()
            })
            .await
            .unwrap_or_else(|e| fall_back("recommendations", &e, fallback::fallback_recommendations))
    }

    /// Look up one book; `None` when neither the API nor the fallback list knows it
    pub async fn book_by_id(&self, id: &str) -> Fetched<Option<Book>> {
        let path = format!("books/{}", path_segment(id));
        self.api
            .get("book", &path, vec![("id".to_string(), id.to_string())], |body| {
                parse_as::<Book>(body).map(Some)
            })
            .await
            .unwrap_or_else(|e| fall_back("book", &e, || fallback::fallback_book(id)))
    }

    /// Free-text search
    pub async fn search(&self, text: &str) -> Fetched<Vec<Book>> {
        let text = text.trim();
        self.api
            .get("search", "search", vec![("q".to_string(), text.to_string())], |body| {
                unwrap_list(body, "books")?
                    .into_iter()
                    .map(parse_as::<Book>)
                    .collect::<Result<Vec<_>, _>>()
            })
            .await
            .unwrap_or_else(|e| fall_back("search", &e, || search_fallback(text)))
    }

    /// Drop every cached response
    pub fn invalidate(&self) {
        self.api.clear();
    }
}

/// Percent-encode `raw` so it stays a single path segment
///
/// Everything outside the unreserved set is escaped, and a bare `.` or `..`
/// is escaped too so it cannot be resolved as a relative path.
fn path_segment(raw: &str) -> String {
    if raw == "." || raw == ".." {
        return raw.replace('.', "%2E");
    }
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn search_fallback(text: &str) -> Vec<Book> {
    let term = text.to_lowercase();
    fallback::fallback_books()
        .into_iter()
        .filter(|b| {
            term.is_empty()
                || b.title.to_lowercase().contains(&term)
                || b.author.to_lowercase().contains(&term)
        })
        .collect()
}
