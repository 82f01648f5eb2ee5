//! AI adapters: score optimization, summarization, news expansion, fact checks

use super::{fall_back, parse_as, CachedApi, Fetched};
use crate::api::Transport;
use crate::cache::DEFAULT_TTL;
use crate::worker::processing::{heuristic_score, POPULARITY_WEIGHT, RATING_WEIGHT, RECENCY_WEIGHT};
use serde_json::json;
use shelf_common::fallback;
use shelf_common::models::{
    Book, FactCheck, NewsExpansion, ScoreFactor, ScoreOptimization, ScoreRagSummary, MAX_RATING,
};
use shelf_common::time::current_year;
use std::sync::Arc;
use std::time::Duration;

/// Confidence reported for locally computed scores
const LOCAL_SCORE_CONFIDENCE: f32 = 0.5;

pub struct AiService {
    api: CachedApi,
}

impl AiService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_ttl(transport, DEFAULT_TTL)
    }

    pub fn with_ttl(transport: Arc<dyn Transport>, ttl: Duration) -> Self {
        Self {
            api: CachedApi::new(transport, ttl),
        }
    }

    /// Ask the remote optimizer to rescore `book`
    ///
    /// Falls back to the local heuristic score.
    pub async fn optimize_score(&self, book: &Book) -> Fetched<ScoreOptimization> {
        self.api
            .post("optimize-score", "ai/optimize-score", json!({ "book": book }), parse_as)
            .await
            .unwrap_or_else(|e| fall_back("optimize-score", &e, || local_optimization(book, current_year())))
    }

    pub async fn summarize(&self, text: &str) -> Fetched<ScoreRagSummary> {
        self.api
            .post("summarize", "ai/summarize", json!({ "text": text }), parse_as)
            .await
            .unwrap_or_else(|e| fall_back("summarize", &e, || fallback::fallback_summary(text)))
    }

    pub async fn expand_news(&self, headline: &str) -> Fetched<NewsExpansion> {
        self.api
            .post("news-expand", "news/expand", json!({ "headline": headline }), parse_as)
            .await
            .unwrap_or_else(|e| fall_back("news-expand", &e, || fallback::fallback_news_expansion(headline)))
    }

    pub async fn fact_check(&self, claim: &str) -> Fetched<FactCheck> {
        self.api
            .post("fact-check", "news/fact-check", json!({ "claim": claim }), parse_as)
            .await
            .unwrap_or_else(|e| fall_back("fact-check", &e, || fallback::fallback_fact_check(claim)))
    }

    pub fn invalidate(&self) {
        self.api.clear();
    }
}

/// Heuristic score broken into its weighted factors
fn local_optimization(book: &Book, reference_year: i32) -> ScoreOptimization {
    let optimized = heuristic_score(book.rating, book.ratings_count, book.published_year, reference_year);
    let rating_part = (book.rating / MAX_RATING).clamp(0.0, 1.0);
    let popularity_part = heuristic_score(0.0, book.ratings_count, None, reference_year) / POPULARITY_WEIGHT;
    let recency_part = heuristic_score(0.0, None, book.published_year, reference_year) / RECENCY_WEIGHT;

    ScoreOptimization {
        book_id: book.id.clone(),
        original_score: book.score.unwrap_or(optimized),
        optimized_score: optimized,
        factors: vec![
            ScoreFactor {
                name: "rating".to_string(),
                weight: RATING_WEIGHT,
                contribution: RATING_WEIGHT * rating_part,
            },
            ScoreFactor {
                name: "popularity".to_string(),
                weight: POPULARITY_WEIGHT,
                contribution: POPULARITY_WEIGHT * popularity_part,
            },
            ScoreFactor {
                name: "recency".to_string(),
                weight: RECENCY_WEIGHT,
                contribution: RECENCY_WEIGHT * recency_part,
            },
        ],
        confidence: LOCAL_SCORE_CONFIDENCE,
    }
}
