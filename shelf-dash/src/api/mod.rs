//! HTTP API handlers for shelf-dash

pub mod ai;
pub mod books;
pub mod buildinfo;
pub mod dashboard;
pub mod health;
pub mod recommendations;

pub use ai::{expand_news, fact_check, optimize_score, summarize};
pub use books::{get_book, search_books};
pub use buildinfo::get_build_info;
pub use dashboard::{apply_action, get_dashboard};
pub use health::health_routes;
pub use recommendations::get_recommendations;
