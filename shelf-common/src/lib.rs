//! # Shelf Common Library
//!
//! Shared code for the Shelf crates including:
//! - Book and recommendation models
//! - AI payload types returned by the remote recommendation API
//! - Static fallback data
//! - Dashboard state reducer and book catalog
//! - Configuration loading
//! - Time helpers

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fallback;
pub mod models;
pub mod time;

pub use catalog::BookCatalog;
pub use dashboard::{DashboardAction, DashboardState, PersistedPrefs};
pub use error::{Error, Result};
pub use models::{Book, Recommendation};
