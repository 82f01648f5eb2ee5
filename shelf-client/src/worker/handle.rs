//! Background worker thread and its async handle
//!
//! One dedicated OS thread runs every list-processing request so the async
//! runtime is never blocked by it. Each request gets a fresh correlation id;
//! the worker thread routes every response back to the caller that registered
//! that id, so concurrent callers never receive each other's results.

use super::processing;
use super::protocol::{
    FilterCriteria, SortSpec, WorkerCommand, WorkerRequest, WorkerResponse, WorkerResult,
};
use crate::error::WorkerError;
use serde_json::Value;
use shelf_common::models::Book;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use uuid::Uuid;

/// Replies awaited by callers, keyed by correlation id
#[derive(Default)]
struct PendingReplies {
    slots: Mutex<HashMap<Uuid, oneshot::Sender<WorkerResult>>>,
}

impl PendingReplies {
    fn register(&self, id: Uuid, tx: oneshot::Sender<WorkerResult>) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);
    }

    fn cancel(&self, id: &Uuid) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }

    fn deliver(&self, response: WorkerResponse) {
        let slot = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&response.id);

        match slot {
            Some(tx) => {
                if tx.send(response.result).is_err() {
                    debug!(request_id = %response.id, "Caller gone before worker reply");
                }
            }
            None => debug!(request_id = %response.id, "Dropping reply for cancelled request"),
        }
    }

    fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Cloneable handle to the list-processing worker
///
/// The thread exits once every handle is dropped.
#[derive(Clone)]
pub struct WorkerHandle {
    requests: mpsc::UnboundedSender<WorkerRequest>,
    pending: Arc<PendingReplies>,
    default_timeout: Option<Duration>,
}

impl WorkerHandle {
    /// Start the worker thread with the standard processor
    pub fn spawn() -> std::io::Result<Self> {
        Self::spawn_with(processing::execute)
    }

    /// Start the worker thread with a custom processor
    pub fn spawn_with<F>(processor: F) -> std::io::Result<Self>
    where
        F: Fn(WorkerCommand) -> WorkerResult + Send + 'static,
    {
        let (requests, mut rx) = mpsc::unbounded_channel::<WorkerRequest>();
        let pending = Arc::new(PendingReplies::default());
        let replies = Arc::clone(&pending);

        std::thread::Builder::new()
            .name("shelf-worker".to_string())
            .spawn(move || {
                debug!("List worker started");
                while let Some(request) = rx.blocking_recv() {
                    let command_name = request.command.name();
                    let result = panic::catch_unwind(AssertUnwindSafe(|| processor(request.command)))
                        .unwrap_or_else(|_| WorkerResult::Error {
                            error: "worker panicked while processing".to_string(),
                        });
                    if let WorkerResult::Error { error } = &result {
                        warn!(request_id = %request.id, command = command_name, "Worker error: {}", error);
                    }
                    replies.deliver(WorkerResponse {
                        id: request.id,
                        result,
                    });
                }
                debug!("List worker stopped");
            })?;

        Ok(Self {
            requests,
            pending,
            default_timeout: None,
        })
    }

    /// Apply `timeout` to the typed helpers (`process`, `filter`, `sort`)
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Submit a command and wait for its result
    pub async fn execute(&self, command: WorkerCommand) -> Result<WorkerResult, WorkerError> {
        let (id, rx) = self.submit(command)?;
        rx.await.map_err(|_| {
            self.pending.cancel(&id);
            WorkerError::Disconnected
        })
    }

    /// Submit a command and wait at most `timeout` for its result
    ///
    /// A late reply for a timed-out request is discarded.
    pub async fn execute_with_timeout(
        &self,
        command: WorkerCommand,
        timeout: Duration,
    ) -> Result<WorkerResult, WorkerError> {
        let (id, rx) = self.submit(command)?;
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(_)) => Err(WorkerError::Disconnected),
            Err(_) => {
                self.pending.cancel(&id);
                warn!(request_id = %id, "Worker request timed out after {:?}", timeout);
                Err(WorkerError::Timeout)
            }
        }
    }

    /// Normalize raw records
    pub async fn process(&self, books: Vec<Value>, reference_year: i32) -> Result<Vec<Book>, WorkerError> {
        self.run_typed(WorkerCommand::ProcessRecommendations { books, reference_year })
            .await
    }

    pub async fn filter(&self, books: Vec<Book>, criteria: FilterCriteria) -> Result<Vec<Book>, WorkerError> {
        self.run_typed(WorkerCommand::FilterRecommendations { books, criteria })
            .await
    }

    pub async fn sort(&self, books: Vec<Book>, sort: SortSpec) -> Result<Vec<Book>, WorkerError> {
        self.run_typed(WorkerCommand::SortRecommendations { books, sort }).await
    }

    /// Requests waiting for a reply
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    async fn run_typed(&self, command: WorkerCommand) -> Result<Vec<Book>, WorkerError> {
        let command_name = command.name();
        let result = match self.default_timeout {
            Some(timeout) => self.execute_with_timeout(command, timeout).await?,
            None => self.execute(command).await?,
        };

        if !result.answers(command_name) {
            return Err(WorkerError::Processing(format!(
                "unexpected reply to {}",
                command_name
            )));
        }
        result.into_books().map_err(WorkerError::Processing)
    }

    fn submit(&self, command: WorkerCommand) -> Result<(Uuid, oneshot::Receiver<WorkerResult>), WorkerError> {
        let id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        self.pending.register(id, tx);

        debug!(request_id = %id, command = command.name(), "Submitting worker request");
        if self.requests.send(WorkerRequest { id, command }).is_err() {
            self.pending.cancel(&id);
            return Err(WorkerError::Disconnected);
        }
        Ok((id, rx))
    }
}
