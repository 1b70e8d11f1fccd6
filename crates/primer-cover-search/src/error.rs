//! Error types for primer set search.

use std::time::Duration;

use primer_cover::CoverError;
use thiserror::Error;

/// Errors that can occur while searching for primer sets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// Parameters rejected before any enumeration started.
    #[error("Invalid search parameters: {0}")]
    InvalidParameters(String),

    /// The plan would evaluate more combinations than the configured limit.
    #[error("Too many combinations: {count} exceeds limit {limit}")]
    TooManyCombinations {
        /// Number of combinations the plan would evaluate.
        count: u64,
        /// Configured limit.
        limit: u64,
    },

    /// The search ran longer than the configured timeout.
    #[error("Search timeout after {0:?}")]
    Timeout(Duration),

    /// The search was cancelled through its cancellation token.
    #[error("Search cancelled")]
    Cancelled,

    /// Unexpected fault during enumeration or scoring.
    #[error("Computation error: {0}")]
    Computation(String),

    /// Error from the primer coverage model.
    #[error("Coverage model error: {0}")]
    Cover(#[from] CoverError),
}

impl SearchError {
    /// Creates an invalid parameters error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }

    /// Returns true if the caller should treat the error as a user abort.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type for search operations.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_parameters() {
        let err = SearchError::invalid("no target records");
        assert_eq!(err.to_string(), "Invalid search parameters: no target records");
    }

    #[test]
    fn test_error_display_too_many_combinations() {
        let err = SearchError::TooManyCombinations {
            count: 2_000_000,
            limit: 1_000_000,
        };
        assert_eq!(
            err.to_string(),
            "Too many combinations: 2000000 exceeds limit 1000000"
        );
    }

    #[test]
    fn test_error_display_timeout() {
        let err = SearchError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Search timeout after 30s");
    }

    #[test]
    fn test_error_from_cover_error() {
        let err: SearchError = CoverError::UnknownPrimer("X".to_string()).into();
        assert!(matches!(err, SearchError::Cover(_)));
        assert_eq!(err.to_string(), "Coverage model error: unknown primer: X");
    }

    #[test]
    fn test_is_cancellation() {
        assert!(SearchError::Cancelled.is_cancellation());
        assert!(!SearchError::Computation("x".to_string()).is_cancellation());
    }
}
