//! Configuration types for the primer set search.

use std::time::Duration;

/// Combinations evaluated between two progress notifications.
pub const DEFAULT_PROGRESS_EVERY: u64 = 500;

/// Combinations handed to the worker pool at once in parallel mode.
pub const DEFAULT_BATCH_SIZE: usize = 4096;

/// Configuration for [`PrimerSearch`](crate::PrimerSearch).
///
/// # Example
///
/// ```rust
/// use primer_cover_search::SearchConfig;
/// use std::time::Duration;
///
/// let config = SearchConfig::builder()
///     .with_progress_every(1_000)
///     .with_parallel(true)
///     .with_max_combinations(50_000_000)
///     .with_timeout(Duration::from_secs(120))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Progress cadence in evaluated combinations. Cancellation and the
    /// timeout are checked on the same cadence.
    pub progress_every: u64,
    /// Evaluate subsets of one size on a worker pool (requires `parallel` feature).
    pub parallel: bool,
    /// Combinations per parallel batch. Batches never exceed the progress
    /// cadence; see [`parallel_batch_size`](Self::parallel_batch_size).
    pub batch_size: usize,
    /// Refuse plans with more combinations than this (None = unlimited).
    pub max_combinations: Option<u64>,
    /// Search timeout (None = no timeout).
    pub timeout: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            progress_every: DEFAULT_PROGRESS_EVERY,
            parallel: false,
            batch_size: DEFAULT_BATCH_SIZE,
            max_combinations: None,
            timeout: None,
        }
    }
}

impl SearchConfig {
    /// Creates a new builder for SearchConfig.
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }

    /// Returns true if subsets will actually be evaluated in parallel.
    pub fn runs_parallel(&self) -> bool {
        cfg!(feature = "parallel") && self.parallel
    }

    /// Batch size used in parallel mode: `batch_size` capped at
    /// `progress_every`, so every batch crosses at most one progress mark.
    pub fn parallel_batch_size(&self) -> usize {
        let every = usize::try_from(self.progress_every).unwrap_or(usize::MAX);
        self.batch_size.min(every).max(1)
    }
}

/// Builder for SearchConfig.
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    progress_every: Option<u64>,
    parallel: bool,
    batch_size: Option<usize>,
    max_combinations: Option<u64>,
    timeout: Option<Duration>,
}

impl SearchConfigBuilder {
    /// Sets the progress cadence; zero is treated as one.
    pub fn with_progress_every(mut self, every: u64) -> Self {
        self.progress_every = Some(every.max(1));
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the parallel batch size; zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size.max(1));
        self
    }

    /// Sets the maximum number of combinations a plan may contain.
    pub fn with_max_combinations(mut self, limit: u64) -> Self {
        self.max_combinations = Some(limit);
        self
    }

    /// Sets the search timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the SearchConfig.
    pub fn build(self) -> SearchConfig {
        SearchConfig {
            progress_every: self.progress_every.unwrap_or(DEFAULT_PROGRESS_EVERY),
            parallel: self.parallel,
            batch_size: self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
            max_combinations: self.max_combinations,
            timeout: self.timeout,
        }
    }
}
