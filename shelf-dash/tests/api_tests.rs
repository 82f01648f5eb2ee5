//! Integration tests for shelf-dash API endpoints
//!
//! The remote recommendation API is replaced by an in-process stub
//! transport; everything else (services, list worker, catalog, reducer,
//! preference writer) is the real thing.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shelf_client::{AiService, ApiError as ClientError, BookService, Transport, WorkerHandle};
use shelf_common::dashboard::Theme;
use shelf_common::{DashboardState, PersistedPrefs};
use shelf_dash::persist::{prefs_path, PrefsHandle, PrefsPersister};
use shelf_dash::{build_router, AppState};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Answers GETs from a fixed path table; anything else is a network error
struct StubApi {
    routes: HashMap<String, Value>,
}

impl StubApi {
    fn with(routes: &[(&str, Value)]) -> Arc<Self> {
        Arc::new(Self {
            routes: routes.iter().map(|(p, v)| (p.to_string(), v.clone())).collect(),
        })
    }

    fn down() -> Arc<Self> {
        Self::with(&[])
    }
}

#[async_trait]
impl Transport for StubApi {
    async fn get_json(&self, path: &str, _query: &[(String, String)]) -> Result<Value, ClientError> {
        self.routes
            .get(path)
            .cloned()
            .ok_or_else(|| ClientError::Network("connection refused".to_string()))
    }

    async fn post_json(&self, path: &str, _body: &Value) -> Result<Value, ClientError> {
        self.get_json(path, &[]).await
    }
}

struct TestApp {
    router: Router,
    prefs: PrefsHandle,
    _persister: PrefsPersister,
    _dir: TempDir,
}

/// Test helper: app wired to `api`
fn setup_app(api: Arc<StubApi>) -> TestApp {
    let dir = TempDir::new().expect("Should create temp dir");
    let persister = PrefsPersister::spawn(
        prefs_path(dir.path()),
        PersistedPrefs::default(),
        Duration::from_millis(20),
    );
    let prefs = persister.handle();

    let transport: Arc<dyn Transport> = api;
    let worker = WorkerHandle::spawn()
        .expect("Should start worker")
        .with_default_timeout(Duration::from_secs(5));
    let state = AppState::new(
        BookService::new(Arc::clone(&transport)),
        AiService::new(transport),
        worker,
        DashboardState::default(),
        prefs.clone(),
    );

    TestApp {
        router: build_router(state),
        prefs,
        _persister: persister,
        _dir: dir,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: send a request and decode the JSON reply
async fn call(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn three_books() -> Value {
    json!([
        {"id": "b1", "title": "Dune", "author": "Frank Herbert", "rating": 4.3, "genres": ["Science Fiction"], "publishedYear": 1965},
        {"id": "b2", "title": "Emma", "author": "Jane Austen", "rating": 4.0, "genres": ["Romance"], "publishedYear": 1815},
        {"id": "b3", "title": "Beloved", "author": "Toni Morrison", "rating": 3.9, "genres": ["Fiction"], "publishedYear": 1987}
    ])
}

fn titles(body: &Value) -> Vec<String> {
    body["books"]
        .as_array()
        .expect("books array")
        .iter()
        .map(|b| b["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(StubApi::down());
    let (status, body) = call(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "shelf-dash");
    assert!(body["version"].is_string());
}

// =============================================================================
// Recommendations
// =============================================================================

#[tokio::test]
async fn test_recommendations_sorted_by_title() {
    let app = setup_app(StubApi::with(&[("books", three_books())]));
    let (status, body) = call(&app, get("/api/recommendations?sort=title&direction=asc")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["origin"], "live");
    assert_eq!(body["total"], 3);
    assert_eq!(titles(&body), vec!["Beloved", "Dune", "Emma"]);

    // Normalization fills score, cover and explanation
    let first = &body["books"][0];
    assert!(first["score"].as_f64().is_some());
    assert!(first["coverImage"].as_str().unwrap().starts_with("data:image/svg+xml;base64,"));
    assert!(first["explanation"].is_string());
}

#[tokio::test]
async fn test_recommendations_filtered() {
    let app = setup_app(StubApi::with(&[("books", three_books())]));
    let (_, body) = call(&app, get("/api/recommendations?genres=romance,fiction&year_from=1900")).await;

    assert_eq!(titles(&body), vec!["Beloved"]);
}

#[tokio::test]
async fn test_zero_books_is_empty_status_not_error() {
    let app = setup_app(StubApi::with(&[("books", json!([]))]));
    let (status, body) = call(&app, get("/api/recommendations")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "empty");
    assert_eq!(body["total"], 0);
    assert!(body["window"].is_null());
    assert_eq!(body["books"], json!([]));
}

#[tokio::test]
async fn test_unreachable_api_serves_five_classics() {
    let app = setup_app(StubApi::down());
    let (status, body) = call(&app, get("/api/recommendations?sort=title&direction=asc")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "fallback");
    assert_eq!(body["total"], 5);
    assert_eq!(
        titles(&body),
        vec![
            "1984",
            "Pride and Prejudice",
            "The Catcher in the Rye",
            "The Great Gatsby",
            "To Kill a Mockingbird",
        ]
    );
}

#[tokio::test]
async fn test_recommendations_windowed_by_scroll_offset() {
    let many: Vec<Value> = (0..50)
        .map(|i| json!({"id": format!("b{}", i), "title": format!("Book {:02}", i), "author": "A"}))
        .collect();
    let app = setup_app(StubApi::with(&[("books", Value::Array(many))]));

    let (_, body) = call(
        &app,
        get("/api/recommendations?sort=title&direction=asc&offset=1000&viewport=500&item_size=100&overscan=3"),
    )
    .await;

    assert_eq!(body["total"], 50);
    assert_eq!(body["window"]["start"], 7);
    assert_eq!(body["window"]["end"], 18);
    assert_eq!(body["books"].as_array().unwrap().len(), 12);
    assert_eq!(body["books"][0]["id"], "b7");
}

#[tokio::test]
async fn test_invalid_filter_is_bad_request() {
    let app = setup_app(StubApi::down());

    let (status, body) = call(&app, get("/api/recommendations?min_rating=9")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = call(&app, get("/api/recommendations?sort=pages")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Books and search
// =============================================================================

#[tokio::test]
async fn test_book_lookup_uses_catalog_after_listing() {
    let app = setup_app(StubApi::with(&[("books", three_books())]));
    call(&app, get("/api/recommendations")).await;

    let (status, body) = call(&app, get("/api/books/b2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["origin"], "cached");
    assert_eq!(body["data"]["title"], "Emma");
}

#[tokio::test]
async fn test_book_lookup_fallback_and_not_found() {
    let app = setup_app(StubApi::down());

    let (status, body) = call(&app, get("/api/books/fallback-2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["origin"], "fallback");
    assert_eq!(body["data"]["title"], "1984");

    let (status, body) = call(&app, get("/api/books/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_fallback_list_does_not_enter_catalog() {
    let app = setup_app(StubApi::down());
    let (_, body) = call(&app, get("/api/recommendations")).await;
    assert_eq!(body["origin"], "fallback");

    let (status, body) = call(&app, get("/api/books/fallback-3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["origin"], "fallback");
    assert_eq!(body["data"]["title"], "Pride and Prejudice");
}

#[tokio::test]
async fn test_search() {
    let app = setup_app(StubApi::down());

    let (status, body) = call(&app, get("/api/search?q=austen")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["title"], "Pride and Prejudice");

    let (status, _) = call(&app, get("/api/search?q=%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// AI helpers
// =============================================================================

#[tokio::test]
async fn test_summarize_falls_back_when_api_down() {
    let app = setup_app(StubApi::down());
    let (status, body) = call(
        &app,
        post_json("/api/ai/summarize", json!({"text": "One. Two. Three."})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["origin"], "fallback");
    assert_eq!(body["data"]["summary"], "One. Two.");
}

#[tokio::test]
async fn test_fact_check_live() {
    let app = setup_app(StubApi::with(&[(
        "news/fact-check",
        json!({"claim": "Water is wet", "verdict": "true", "confidence": 0.8, "sources": []}),
    )]));
    let (_, body) = call(
        &app,
        post_json("/api/news/fact-check", json!({"claim": "Water is wet"})),
    )
    .await;

    assert_eq!(body["origin"], "live");
    assert_eq!(body["data"]["verdict"], "true");
}

#[tokio::test]
async fn test_empty_ai_input_rejected() {
    let app = setup_app(StubApi::down());
    let (status, _) = call(&app, post_json("/api/news/expand", json!({"headline": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Dashboard state
// =============================================================================

#[tokio::test]
async fn test_dashboard_actions_update_state_and_prefs() {
    let app = setup_app(StubApi::down());

    let (status, body) = call(
        &app,
        post_json("/api/dashboard/actions", json!({"type": "SET_THEME", "payload": "dark"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme"], "dark");

    call(
        &app,
        post_json("/api/dashboard/actions", json!({"type": "SET_BRIGHTNESS", "payload": 250})),
    )
    .await;

    let (_, body) = call(&app, get("/api/dashboard")).await;
    assert_eq!(body["theme"], "dark");
    assert_eq!(body["brightness"], 100);

    assert_eq!(app.prefs.latest().theme, Theme::Dark);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_actions_leave_prefs_matching_state() {
    let app = setup_app(StubApi::down());

    let tasks: Vec<_> = (0..64u16)
        .map(|i| {
            let router = app.router.clone();
            tokio::spawn(async move {
                let request = post_json(
                    "/api/dashboard/actions",
                    json!({"type": "SET_BRIGHTNESS", "payload": i}),
                );
                router.oneshot(request).await.unwrap().status()
            })
        })
        .collect();
    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }

    let (_, body) = call(&app, get("/api/dashboard")).await;
    let brightness = body["brightness"].as_u64().expect("brightness");
    assert_eq!(u64::from(app.prefs.latest().brightness), brightness);
}

#[tokio::test]
async fn test_component_state_not_persisted() {
    let app = setup_app(StubApi::down());

    let (_, body) = call(
        &app,
        post_json(
            "/api/dashboard/actions",
            json!({"type": "SET_COMPONENT_STATE", "payload": {"componentId": "shelf", "state": {"open": true}}}),
        ),
    )
    .await;

    assert_eq!(body["componentState"]["shelf"]["open"], true);
    assert_eq!(app.prefs.latest(), PersistedPrefs::default());
}

#[tokio::test]
async fn test_unknown_action_rejected() {
    let app = setup_app(StubApi::down());
    let (status, _) = call(
        &app,
        post_json("/api/dashboard/actions", json!({"type": "LAUNCH_ROCKET"})),
    )
    .await;
    assert!(status.is_client_error());
}
