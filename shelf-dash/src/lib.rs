//! shelf-dash library - dashboard backend
//!
//! Serves recommendation lists (fetched, normalized on the list worker,
//! filtered, sorted and windowed), book lookups, AI helpers and the dashboard
//! state over HTTP.

use axum::Router;
use shelf_client::{AiService, BookService, WorkerHandle};
use shelf_common::{BookCatalog, DashboardState};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod persist;

use persist::PrefsHandle;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<BookService>,
    pub ai: Arc<AiService>,
    /// List-processing worker
    pub worker: WorkerHandle,
    /// Every book seen so far, keyed by id
    pub catalog: Arc<RwLock<BookCatalog>>,
    pub dashboard: Arc<RwLock<DashboardState>>,
    /// Debounced preference writer
    pub prefs: PrefsHandle,
}

impl AppState {
    pub fn new(
        books: BookService,
        ai: AiService,
        worker: WorkerHandle,
        dashboard: DashboardState,
        prefs: PrefsHandle,
    ) -> Self {
        Self {
            books: Arc::new(books),
            ai: Arc::new(ai),
            worker,
            catalog: Arc::new(RwLock::new(BookCatalog::new())),
            dashboard: Arc::new(RwLock::new(dashboard)),
            prefs,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/recommendations", get(api::get_recommendations))
        .route("/api/books/:id", get(api::get_book))
        .route("/api/search", get(api::search_books))
        .route("/api/ai/score", post(api::optimize_score))
        .route("/api/ai/summarize", post(api::summarize))
        .route("/api/news/expand", post(api::expand_news))
        .route("/api/news/fact-check", post(api::fact_check))
        .route("/api/dashboard", get(api::get_dashboard))
        .route("/api/dashboard/actions", post(api::apply_action))
        .route("/api/buildinfo", get(api::get_build_info));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
