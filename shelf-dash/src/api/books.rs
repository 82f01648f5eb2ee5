//! Single-book lookup and search

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shelf_client::{Fetched, Origin};
use shelf_common::Book;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/books/:id
///
/// Books already in the catalog are answered without a network call.
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Fetched<Book>>> {
    if let Some(book) = state.catalog.read().await.get(&id) {
        return Ok(Json(Fetched::new(book.clone(), Origin::Cached)));
    }

    let fetched = state.books.book_by_id(&id).await;
    let origin = fetched.origin;
    let book = fetched
        .value
        .ok_or_else(|| ApiError::NotFound(format!("book '{}'", id)))?;

    if origin == Origin::Live {
        state.catalog.write().await.upsert(book.clone());
    }
    Ok(Json(Fetched::new(book, origin)))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// GET /api/search?q=
pub async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Fetched<Vec<Book>>>> {
    let q = params.q.trim();
    if q.is_empty() {
        return Err(ApiError::BadRequest("search text must not be empty".to_string()));
    }
    Ok(Json(state.books.search(q).await))
}
