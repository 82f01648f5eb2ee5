//! shelf-client library
//!
//! Client-side data layer for the Shelf dashboard:
//! - Remote API transport and cached service adapters with fallback data
//! - In-memory TTL cache
//! - List-processing offload worker
//! - Fixed-size list virtualization

pub mod api;
pub mod cache;
pub mod error;
pub mod services;
pub mod window;
pub mod worker;

pub use api::{HttpTransport, Transport};
pub use cache::TtlCache;
pub use error::{ApiError, WorkerError};
pub use services::{AiService, BookService, Fetched, Origin};
pub use window::{visible_range, VirtualList, VisibleRange, WindowParams};
pub use worker::WorkerHandle;
