//! Book, recommendation and AI payload types
//!
//! Field names serialize in camelCase to match the JSON shapes the remote
//! recommendation API and dashboard clients exchange.

use serde::{Deserialize, Serialize};

/// Highest rating a book can carry
pub const MAX_RATING: f32 = 5.0;

/// A book as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Stable identifier (catalog key)
    pub id: String,
    pub title: String,
    /// Display author string (multiple authors joined with ", ")
    pub author: String,
    /// Cover image URL or inline data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    /// Average reader rating, 0.0-5.0
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub genres: Vec<String>,
    /// Recommendation score, 0.0-1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Free-text reason this book is recommended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    /// Number of ratings behind `rating` (popularity signal)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Book {
    /// Create a book with the required fields; everything optional left empty
    pub fn new(id: impl Into<String>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            cover_image: None,
            rating: 0.0,
            genres: Vec::new(),
            score: None,
            explanation: None,
            published_year: None,
            ratings_count: None,
            description: None,
        }
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = rating.clamp(0.0, MAX_RATING);
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.published_year = Some(year);
        self
    }

    pub fn with_ratings_count(mut self, count: u32) -> Self {
        self.ratings_count = Some(count);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// True if any of the book's genres matches `genre` (case-insensitive)
    pub fn has_genre(&self, genre: &str) -> bool {
        let wanted = genre.to_lowercase();
        self.genres.iter().any(|g| g.to_lowercase() == wanted)
    }
}

/// A recommended book with the reason it was picked
///
/// Produced by the API client or the fallback generator; consumed read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub book: Book,
    /// Recommendation strength, 0.0-1.0
    pub score: f32,
    pub reason: String,
    /// True when the reason came from the remote AI service
    #[serde(default)]
    pub ai_generated: bool,
}

/// A single weighted contribution to an optimized score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreFactor {
    pub name: String,
    pub weight: f32,
    pub contribution: f32,
}

/// Score optimization result for a single book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOptimization {
    pub book_id: String,
    pub original_score: f32,
    pub optimized_score: f32,
    #[serde(default)]
    pub factors: Vec<ScoreFactor>,
    pub confidence: f32,
}

/// Retrieval-augmented summary of a text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRagSummary {
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    pub confidence: f32,
}

/// Expanded background for a news headline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsExpansion {
    pub headline: String,
    pub expanded_text: String,
    #[serde(default)]
    pub context: Vec<String>,
    #[serde(default)]
    pub related_topics: Vec<String>,
}

/// Fact-check verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    True,
    False,
    Mixed,
    Unverified,
}

/// Fact-check result for a single claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactCheck {
    pub claim: String,
    pub verdict: Verdict,
    pub confidence: f32,
    #[serde(default)]
    pub sources: Vec<String>,
}
