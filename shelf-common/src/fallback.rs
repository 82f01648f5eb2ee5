//! Static fallback data
//!
//! Returned whenever the remote recommendation API cannot be reached or
//! answers with something unusable. Everything here is deterministic.

use crate::models::{Book, FactCheck, NewsExpansion, Recommendation, ScoreRagSummary, Verdict};

/// Number of classic titles in the fallback list
pub const FALLBACK_BOOK_COUNT: usize = 5;

/// Sentences kept by the fallback summarizer
const SUMMARY_SENTENCES: usize = 2;

/// The hard-coded list of five classics
pub fn fallback_books() -> Vec<Book> {
    vec![
        Book::new("fallback-1", "To Kill a Mockingbird", "Harper Lee")
            .with_rating(4.3)
            .with_genres(["Fiction", "Classic"])
            .with_year(1960)
            .with_ratings_count(5_200)
            .with_description("A lawyer in the Depression-era South defends a Black man accused of a crime he did not commit."),
        Book::new("fallback-2", "1984", "George Orwell")
            .with_rating(4.2)
            .with_genres(["Fiction", "Dystopian", "Classic"])
            .with_year(1949)
            .with_ratings_count(4_800)
            .with_description("A totalitarian state watches every move of a man who dares to keep a diary."),
        Book::new("fallback-3", "Pride and Prejudice", "Jane Austen")
            .with_rating(4.3)
            .with_genres(["Fiction", "Romance", "Classic"])
            .with_year(1813)
            .with_ratings_count(3_900)
            .with_description("Elizabeth Bennet and Mr. Darcy misjudge each other across the English countryside."),
        Book::new("fallback-4", "The Great Gatsby", "F. Scott Fitzgerald")
            .with_rating(3.9)
            .with_genres(["Fiction", "Classic"])
            .with_year(1925)
            .with_ratings_count(4_400)
            .with_description("A mysterious millionaire chases a lost love through the Jazz Age."),
        Book::new("fallback-5", "The Catcher in the Rye", "J.D. Salinger")
            .with_rating(3.8)
            .with_genres(["Fiction", "Coming-of-age", "Classic"])
            .with_year(1951)
            .with_ratings_count(3_100)
            .with_description("Holden Caulfield wanders New York after being expelled from school."),
    ]
}

/// Fallback recommendations built from [`fallback_books`]
///
/// Scores follow the rating so the list stays ordered by quality.
pub fn fallback_recommendations() -> Vec<Recommendation> {
    fallback_books()
        .into_iter()
        .map(|book| {
            let score = (book.rating / crate::models::MAX_RATING).clamp(0.0, 1.0);
            let reason = format!("A widely loved classic by {}", book.author);
            Recommendation {
                book,
                score,
                reason,
                ai_generated: false,
            }
        })
        .collect()
}

/// Look up a fallback book by id
pub fn fallback_book(id: &str) -> Option<Book> {
    fallback_books().into_iter().find(|b| b.id == id)
}

/// Summary made of the leading sentences of `text`
pub fn fallback_summary(text: &str) -> ScoreRagSummary {
    let sentences: Vec<&str> = text
        .split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let summary = sentences
        .iter()
        .take(SUMMARY_SENTENCES)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    ScoreRagSummary {
        summary,
        key_points: sentences.iter().take(SUMMARY_SENTENCES).map(|s| s.to_string()).collect(),
        sources: Vec::new(),
        confidence: 0.0,
    }
}

/// News expansion that only restates the headline
pub fn fallback_news_expansion(headline: &str) -> NewsExpansion {
    NewsExpansion {
        headline: headline.to_string(),
        expanded_text: format!("{} More details are unavailable right now.", headline.trim()),
        context: Vec::new(),
        related_topics: Vec::new(),
    }
}

/// Fact check that admits nothing could be verified
pub fn fallback_fact_check(claim: &str) -> FactCheck {
    FactCheck {
        claim: claim.to_string(),
        verdict: Verdict::Unverified,
        confidence: 0.0,
        sources: Vec::new(),
    }
}
