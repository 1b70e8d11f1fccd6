//! Error types for the primer coverage model.

use thiserror::Error;

/// Errors raised while building records or primer subsets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoverError {
    /// A primer name is not part of the primer universe.
    #[error("unknown primer: {0}")]
    UnknownPrimer(String),

    /// A taxon record was built without a final identifier.
    #[error("taxon record has an empty final identifier")]
    EmptyFinalId,

    /// A subset size outside `1..=n` was requested.
    #[error("invalid subset size {k} for a universe of {n} primers")]
    InvalidSubsetSize {
        /// Requested subset size.
        k: usize,
        /// Number of primers in the universe.
        n: usize,
    },
}

/// Result type for primer coverage operations.
pub type CoverResult<T> = std::result::Result<T, CoverError>;
