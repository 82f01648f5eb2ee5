//! Recommendation list endpoint
//!
//! Fetch raw records, normalize them on the list worker, remember live ones in
//! the catalog, then filter, sort and cut out the visible window.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shelf_client::services::BookQuery;
use shelf_client::window::DEFAULT_OVERSCAN;
use shelf_client::worker::{FilterCriteria, SortDirection, SortField, SortSpec};
use shelf_client::{visible_range, Origin, WindowParams};
use shelf_common::time::current_year;
use shelf_common::Book;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Row height assumed when the caller does not say
pub const DEFAULT_ITEM_SIZE: f64 = 100.0;
/// Viewport height assumed when the caller does not say
pub const DEFAULT_VIEWPORT: f64 = 600.0;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecommendationParams {
    /// Comma-separated genre list
    pub genres: Option<String>,
    pub min_rating: Option<f32>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    /// Free-text search
    pub q: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    /// Scroll offset in pixels
    pub offset: Option<f64>,
    pub viewport: Option<f64>,
    pub item_size: Option<f64>,
    pub overscan: Option<usize>,
    /// Passed through to the remote API
    pub limit: Option<usize>,
}

impl RecommendationParams {
    fn criteria(&self) -> ApiResult<FilterCriteria> {
        let genres = self
            .genres
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let criteria = FilterCriteria {
            genres,
            min_rating: self.min_rating,
            year_from: self.year_from,
            year_to: self.year_to,
            search: self.q.clone(),
        };
        criteria.validate().map_err(ApiError::BadRequest)?;
        Ok(criteria)
    }

    fn sort_spec(&self) -> ApiResult<SortSpec> {
        let field = match &self.sort {
            Some(s) => s.parse::<SortField>().map_err(ApiError::BadRequest)?,
            None => SortField::default(),
        };
        let direction = match &self.direction {
            Some(d) => d.parse::<SortDirection>().map_err(ApiError::BadRequest)?,
            None => SortDirection::default(),
        };
        Ok(SortSpec::new(field, direction))
    }

    fn window(&self, item_count: usize) -> WindowParams {
        WindowParams {
            scroll_offset: self.offset.unwrap_or(0.0),
            item_size: self.item_size.unwrap_or(DEFAULT_ITEM_SIZE),
            container_size: self.viewport.unwrap_or(DEFAULT_VIEWPORT),
            overscan: self.overscan.unwrap_or(DEFAULT_OVERSCAN),
            item_count,
        }
    }
}

/// What the dashboard should render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStatus {
    Ready,
    /// Nothing matched; not an error
    Empty,
    /// Showing the built-in classics because the API failed
    Fallback,
}

#[derive(Debug, Serialize)]
pub struct WindowBounds {
    pub start: usize,
    pub end: usize,
    /// Pixel offset of the first rendered row
    pub offset: f64,
    /// Pixel height of the whole list
    pub total_size: f64,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub status: ListStatus,
    pub origin: Origin,
    /// Matching books before windowing
    pub total: usize,
    /// `None` when nothing matched
    pub window: Option<WindowBounds>,
    pub books: Vec<Book>,
}

/// GET /api/recommendations
pub async fn get_recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendationParams>,
) -> ApiResult<Json<RecommendationsResponse>> {
    let criteria = params.criteria()?;
    let sort = params.sort_spec()?;

    let query = BookQuery {
        limit: params.limit,
        ..Default::default()
    };
    let fetched = state.books.book_list(&query).await;
    let origin = fetched.origin;

    let processed = state.worker.process(fetched.value, current_year()).await?;
    // Built-in classics never enter the catalog; later lookups must still say fallback
    if origin != Origin::Fallback {
        let added = state.catalog.write().await.upsert_many(processed.iter().cloned());
        debug!(count = processed.len(), new = added, "Catalog updated");
    }

    let filtered = state.worker.filter(processed, criteria).await?;
    let sorted = state.worker.sort(filtered, sort).await?;

    let total = sorted.len();
    let window_params = params.window(total);
    let range = visible_range(&window_params);

    let window = (!range.is_empty()).then(|| WindowBounds {
        start: range.start,
        end: range.end,
        offset: range.start as f64 * window_params.item_size.max(0.0),
        total_size: total as f64 * window_params.item_size.max(0.0),
    });

    let books = if range.is_empty() {
        Vec::new()
    } else {
        sorted
            .into_iter()
            .skip(range.start)
            .take(range.end - range.start + 1)
            .collect()
    };

    let status = if total == 0 {
        ListStatus::Empty
    } else if origin == Origin::Fallback {
        ListStatus::Fallback
    } else {
        ListStatus::Ready
    };

    Ok(Json(RecommendationsResponse {
        status,
        origin,
        total,
        window,
        books,
    }))
}
