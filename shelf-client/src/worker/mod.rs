//! List-processing offload worker
//!
//! Normalizes, filters and sorts book lists on a dedicated thread, speaking a
//! typed request/response protocol with a correlation id per request.

mod handle;
pub mod processing;
pub mod protocol;

pub use handle::WorkerHandle;
pub use processing::handle_json_message;
pub use protocol::{
    FilterCriteria, SortDirection, SortField, SortSpec, WorkerCommand, WorkerRequest,
    WorkerResponse, WorkerResult,
};
