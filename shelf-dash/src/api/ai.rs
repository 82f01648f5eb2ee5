//! AI helper endpoints: score optimization, summaries, news expansion, fact checks
//!
//! Every endpoint answers; when the remote service fails the reply carries
//! `"origin": "fallback"`.

use axum::{extract::State, Json};
use serde::Deserialize;
use shelf_client::Fetched;
use shelf_common::models::{FactCheck, NewsExpansion, ScoreOptimization, ScoreRagSummary};
use shelf_common::Book;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub book: Book,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ExpandRequest {
    pub headline: String,
}

#[derive(Debug, Deserialize)]
pub struct FactCheckRequest {
    pub claim: String,
}

fn required<'a>(field: &str, value: &'a str) -> ApiResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(ApiError::BadRequest(format!("'{}' must not be empty", field)))
    } else {
        Ok(value)
    }
}

/// POST /api/ai/score
pub async fn optimize_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> ApiResult<Json<Fetched<ScoreOptimization>>> {
    Ok(Json(state.ai.optimize_score(&request.book).await))
}

/// POST /api/ai/summarize
pub async fn summarize(
    State(state): State<AppState>,
    Json(request): Json<SummarizeRequest>,
) -> ApiResult<Json<Fetched<ScoreRagSummary>>> {
    let text = required("text", &request.text)?;
    Ok(Json(state.ai.summarize(text).await))
}

/// POST /api/news/expand
pub async fn expand_news(
    State(state): State<AppState>,
    Json(request): Json<ExpandRequest>,
) -> ApiResult<Json<Fetched<NewsExpansion>>> {
    let headline = required("headline", &request.headline)?;
    Ok(Json(state.ai.expand_news(headline).await))
}

/// POST /api/news/fact-check
pub async fn fact_check(
    State(state): State<AppState>,
    Json(request): Json<FactCheckRequest>,
) -> ApiResult<Json<Fetched<FactCheck>>> {
    let claim = required("claim", &request.claim)?;
    Ok(Json(state.ai.fact_check(claim).await))
}
