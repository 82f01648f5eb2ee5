//! Pure list processing: normalize, filter, sort
//!
//! Nothing here reads the clock, the network, or any shared state. The
//! recency reference year arrives with the command.

use super::protocol::{
    FilterCriteria, SortSpec, WorkerCommand, WorkerRequest, WorkerResponse, WorkerResult,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use shelf_common::models::{Book, MAX_RATING};
use std::panic::{self, AssertUnwindSafe};
use uuid::Uuid;

/// Weight of the rating component in the heuristic score
pub const RATING_WEIGHT: f32 = 0.6;
/// Weight of the popularity component
pub const POPULARITY_WEIGHT: f32 = 0.2;
/// Weight of the recency component
pub const RECENCY_WEIGHT: f32 = 0.2;

/// Rating count at which popularity saturates
const POPULARITY_SATURATION: f32 = 1000.0;
/// Publication year scored as least recent
const RECENCY_EPOCH: i32 = 1800;

const UNTITLED: &str = "Untitled";
const UNKNOWN_AUTHOR: &str = "Unknown Author";

const CANNED_EXPLANATIONS: &[&str] = &[
    "Readers with similar tastes rated this highly.",
    "A strong match for the genres you read most.",
    "Frequently finished by readers of your recent picks.",
    "A well-reviewed title with lasting appeal.",
    "Recommended for its standout storytelling.",
    "Popular with readers who enjoy thoughtful books.",
];

/// Run one command to completion
///
/// Errors and panics both come back as [`WorkerResult::Error`].
pub fn execute(command: WorkerCommand) -> WorkerResult {
    match panic::catch_unwind(AssertUnwindSafe(|| run(command))) {
        Ok(Ok(result)) => result,
        Ok(Err(error)) => WorkerResult::Error { error },
        Err(_) => WorkerResult::Error {
            error: "worker panicked while processing".to_string(),
        },
    }
}

fn run(command: WorkerCommand) -> Result<WorkerResult, String> {
    match command {
        WorkerCommand::ProcessRecommendations { books, reference_year } => {
            Ok(WorkerResult::RecommendationsProcessed {
                recommendations: process(&books, reference_year)?,
            })
        }
        WorkerCommand::FilterRecommendations { books, criteria } => {
            criteria.validate()?;
            Ok(WorkerResult::RecommendationsFiltered {
                recommendations: filter(books, &criteria),
            })
        }
        WorkerCommand::SortRecommendations { books, sort } => Ok(WorkerResult::RecommendationsSorted {
            recommendations: sort_books(books, &sort),
        }),
    }
}

/// Handle one JSON-encoded request and produce a JSON-encoded response
///
/// An unparseable request is answered with an `ERROR` carrying the nil id.
pub fn handle_json_message(message: &str) -> String {
    let response = match serde_json::from_str::<WorkerRequest>(message) {
        Ok(request) => WorkerResponse {
            id: request.id,
            result: execute(request.command),
        },
        Err(e) => WorkerResponse {
            id: Uuid::nil(),
            result: WorkerResult::Error {
                error: format!("invalid worker message: {}", e),
            },
        },
    };

    serde_json::to_string(&response).unwrap_or_else(|e| {
        format!(r#"{{"id":"{}","type":"ERROR","error":"{}"}}"#, Uuid::nil(), e)
    })
}

/// Normalize every raw record
pub fn process(raw: &[Value], reference_year: i32) -> Result<Vec<Book>, String> {
    raw.iter()
        .enumerate()
        .map(|(index, record)| match record {
            Value::Object(fields) => Ok(normalize_book(fields, index, reference_year)),
            other => Err(format!(
                "record {} is not an object (got {})",
                index,
                json_kind(other)
            )),
        })
        .collect()
}

/// Keep the books matching `criteria`
pub fn filter(books: Vec<Book>, criteria: &FilterCriteria) -> Vec<Book> {
    books.into_iter().filter(|b| criteria.matches(b)).collect()
}

/// Stable sort by `spec`
pub fn sort_books(mut books: Vec<Book>, spec: &SortSpec) -> Vec<Book> {
    books.sort_by(|a, b| spec.compare(a, b));
    books
}

/// Build a book from a loosely typed record, filling gaps with defaults
pub fn normalize_book(fields: &Map<String, Value>, index: usize, reference_year: i32) -> Book {
    let title = first_string(fields, &["title", "name"]).unwrap_or_else(|| UNTITLED.to_string());

    let id = first_present(fields, &["id", "bookId", "book_id"])
        .and_then(scalar_string)
        .unwrap_or_else(|| format!("book-{}-{}", index, &title_digest_hex(&title)[..8]));

    let author = first_present(fields, &["author", "authors"])
        .and_then(author_string)
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

    let rating = first_present(fields, &["rating", "averageRating", "average_rating"])
        .and_then(number)
        .map(|r| sanitize(r as f32).clamp(0.0, MAX_RATING))
        .unwrap_or(0.0);

    let genres = first_present(fields, &["genres", "categories", "genre"])
        .map(genre_list)
        .unwrap_or_default();

    let published_year = first_present(fields, &["publishedYear", "published_year", "year", "publishedDate"])
        .and_then(year);

    let ratings_count = first_present(fields, &["ratingsCount", "ratings_count", "votes", "popularity"])
        .and_then(number)
        .filter(|n| *n >= 0.0)
        .map(|n| n.min(u32::MAX as f64) as u32);

    let description = first_string(fields, &["description", "summary"]);

    let cover_image = first_string(fields, &["coverImage", "cover_image", "cover", "image"])
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| placeholder_cover(&title));

    let score = first_present(fields, &["score", "recommendationScore"])
        .and_then(number)
        .map(|s| sanitize(s as f32).clamp(0.0, 1.0))
        .unwrap_or_else(|| heuristic_score(rating, ratings_count, published_year, reference_year));

    let explanation = first_string(fields, &["explanation", "reason"])
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| canned_explanation(&id, &title).to_string());

    Book {
        id,
        title,
        author,
        cover_image: Some(cover_image),
        rating,
        genres,
        score: Some(score),
        explanation: Some(explanation),
        published_year,
        ratings_count,
        description,
    }
}

/// Heuristic recommendation score in [0, 1]
///
/// `0.6 * rating/5 + 0.2 * popularity + 0.2 * recency`, each component
/// clamped to [0, 1] first.
pub fn heuristic_score(
    rating: f32,
    ratings_count: Option<u32>,
    published_year: Option<i32>,
    reference_year: i32,
) -> f32 {
    let rating_part = (sanitize(rating) / MAX_RATING).clamp(0.0, 1.0);

    let popularity = ratings_count
        .map(|n| (n as f32 / POPULARITY_SATURATION).min(1.0))
        .unwrap_or(0.0);

    let recency = published_year
        .map(|year| {
            let span = reference_year.saturating_sub(RECENCY_EPOCH) as f32;
            if span <= 0.0 {
                1.0
            } else {
                (year.saturating_sub(RECENCY_EPOCH) as f32 / span).clamp(0.0, 1.0)
            }
        })
        .unwrap_or(0.0);

    (RATING_WEIGHT * rating_part + POPULARITY_WEIGHT * popularity + RECENCY_WEIGHT * recency).clamp(0.0, 1.0)
}

/// Inline SVG cover keyed by the title, as a base64 data URI
///
/// Same title, same image.
pub fn placeholder_cover(title: &str) -> String {
    let digest = Sha256::digest(title.as_bytes());
    let hue = u16::from_be_bytes([digest[0], digest[1]]) % 360;

    let svg = format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="300" viewBox="0 0 200 300">"#,
            r#"<rect width="200" height="300" fill="hsl({hue},45%,35%)"/>"#,
            r##"<text x="100" y="165" font-family="serif" font-size="56" fill="#ffffff" text-anchor="middle">{initials}</text>"##,
            "</svg>"
        ),
        hue = hue,
        initials = initials(title),
    );

    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

/// Canned explanation picked deterministically from id and title
pub fn canned_explanation(id: &str, title: &str) -> &'static str {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update([0u8]);
    hasher.update(title.as_bytes());
    let digest = hasher.finalize();

    let pick = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize;
    CANNED_EXPLANATIONS[pick % CANNED_EXPLANATIONS.len()]
}

fn initials(title: &str) -> String {
    let letters: String = title
        .split_whitespace()
        .filter_map(|word| word.chars().find(|c| c.is_alphanumeric()))
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();

    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

fn title_digest_hex(title: &str) -> String {
    Sha256::digest(title.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn first_present<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| fields.get(*k))
        .find(|v| !v.is_null())
}

fn first_string(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first_present(fields, keys).and_then(scalar_string)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn author_string(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let names: Vec<String> = items.iter().filter_map(scalar_string).collect();
            (!names.is_empty()).then(|| names.join(", "))
        }
        other => scalar_string(other),
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        // Dates such as "1965-08-01" keep their leading year
        Value::String(s) => s.trim().get(..4).and_then(|y| y.parse().ok()),
        _ => None,
    }
}

fn genre_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_string).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
