//! Worker message protocol
//!
//! Requests and responses are typed envelopes carrying a correlation id.
//! On the wire a request looks like
//! `{"id": "...", "type": "FILTER_RECOMMENDATIONS", "data": {...}}` and a
//! response like `{"id": "...", "type": "RECOMMENDATIONS_FILTERED", "recommendations": [...]}`
//! or `{"id": "...", "type": "ERROR", "error": "..."}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shelf_common::models::{Book, MAX_RATING};
use std::cmp::Ordering;
use uuid::Uuid;

/// Commands the worker understands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerCommand {
    /// Normalize loosely typed records into books
    #[serde(rename_all = "camelCase")]
    ProcessRecommendations {
        books: Vec<Value>,
        /// Year treated as "now" by the recency heuristic
        reference_year: i32,
    },
    FilterRecommendations {
        books: Vec<Book>,
        criteria: FilterCriteria,
    },
    SortRecommendations {
        books: Vec<Book>,
        sort: SortSpec,
    },
}

impl WorkerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            WorkerCommand::ProcessRecommendations { .. } => "PROCESS_RECOMMENDATIONS",
            WorkerCommand::FilterRecommendations { .. } => "FILTER_RECOMMENDATIONS",
            WorkerCommand::SortRecommendations { .. } => "SORT_RECOMMENDATIONS",
        }
    }
}

/// Results, one per command plus a catch-all error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerResult {
    RecommendationsProcessed { recommendations: Vec<Book> },
    RecommendationsFiltered { recommendations: Vec<Book> },
    RecommendationsSorted { recommendations: Vec<Book> },
    Error { error: String },
}

impl WorkerResult {
    /// Books carried by a successful result
    pub fn into_books(self) -> Result<Vec<Book>, String> {
        match self {
            WorkerResult::RecommendationsProcessed { recommendations }
            | WorkerResult::RecommendationsFiltered { recommendations }
            | WorkerResult::RecommendationsSorted { recommendations } => Ok(recommendations),
            WorkerResult::Error { error } => Err(error),
        }
    }

    /// True if this result is the kind of reply the named command produces
    pub fn answers(&self, command_name: &str) -> bool {
        matches!(
            (command_name, self),
            ("PROCESS_RECOMMENDATIONS", WorkerResult::RecommendationsProcessed { .. })
                | ("FILTER_RECOMMENDATIONS", WorkerResult::RecommendationsFiltered { .. })
                | ("SORT_RECOMMENDATIONS", WorkerResult::RecommendationsSorted { .. })
                | (_, WorkerResult::Error { .. })
        )
    }
}

/// Request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub id: Uuid,
    #[serde(flatten)]
    pub command: WorkerCommand,
}

/// Response envelope; `id` always echoes the request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub result: WorkerResult,
}

/// Filter predicate
///
/// Every set field must match. An empty criteria keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    /// Keep books having any of these genres (case-insensitive)
    pub genres: Vec<String>,
    pub min_rating: Option<f32>,
    /// Inclusive lower bound on publication year
    pub year_from: Option<i32>,
    /// Inclusive upper bound on publication year
    pub year_to: Option<i32>,
    /// Case-insensitive text matched against title, author and description
    pub search: Option<String>,
}

impl FilterCriteria {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(min) = self.min_rating {
            if !(0.0..=MAX_RATING).contains(&min) {
                return Err(format!("minimum rating {} outside 0-{}", min, MAX_RATING));
            }
        }
        if let (Some(from), Some(to)) = (self.year_from, self.year_to) {
            if from > to {
                return Err(format!("year range {}-{} is inverted", from, to));
            }
        }
        Ok(())
    }

    pub fn matches(&self, book: &Book) -> bool {
        if !self.genres.is_empty() && !self.genres.iter().any(|g| book.has_genre(g)) {
            return false;
        }

        if let Some(min) = self.min_rating {
            if book.rating < min {
                return false;
            }
        }

        if self.year_from.is_some() || self.year_to.is_some() {
            let Some(year) = book.published_year else {
                return false;
            };
            if self.year_from.is_some_and(|from| year < from) || self.year_to.is_some_and(|to| year > to) {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                book.title.to_lowercase().contains(&term)
                    || book.author.to_lowercase().contains(&term)
                    || book
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

/// Sortable book fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Title,
    Author,
    #[default]
    Rating,
    Score,
    Year,
}

impl SortField {
    fn compare(self, a: &Book, b: &Book) -> Ordering {
        match self {
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Author => a.author.to_lowercase().cmp(&b.author.to_lowercase()),
            SortField::Rating => a.rating.total_cmp(&b.rating),
            SortField::Score => a.score.unwrap_or(0.0).total_cmp(&b.score.unwrap_or(0.0)),
            SortField::Year => a.published_year.cmp(&b.published_year),
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "author" => Ok(SortField::Author),
            "rating" => Ok(SortField::Rating),
            "score" => Ok(SortField::Score),
            "year" => Ok(SortField::Year),
            other => Err(format!("unknown sort field '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Ordering of `a` relative to `b`, honouring the direction
    pub fn compare(&self, a: &Book, b: &Book) -> Ordering {
        let ord = self.field.compare(a, b);
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}
