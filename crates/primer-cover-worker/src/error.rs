//! Error types for the worker boundary.

use primer_cover_search::SearchError;
use thiserror::Error;

/// Errors that can occur while talking to a search worker.
#[derive(Error, Debug)]
pub enum TransportError {
    /// A message could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Reading or writing the message stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The worker thread could not be started.
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The worker thread is gone.
    #[error("Worker disconnected")]
    Disconnected,

    /// The search itself failed.
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl TransportError {
    /// Returns the search error, if this is one.
    pub fn as_search_error(&self) -> Option<&SearchError> {
        match self {
            Self::Search(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for worker operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;
