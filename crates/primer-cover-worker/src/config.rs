//! Worker configuration.

use primer_cover_search::SearchConfig;

/// Default name of the worker thread.
pub const DEFAULT_THREAD_NAME: &str = "primer-search";

/// Configuration for [`SearchWorker`](crate::SearchWorker) and
/// [`SearchSession`](crate::SearchSession).
///
/// # Example
///
/// ```rust
/// use primer_cover_search::SearchConfig;
/// use primer_cover_worker::WorkerConfig;
///
/// let config = WorkerConfig::builder()
///     .with_thread_name("panel-search")
///     .with_search_config(SearchConfig::builder().with_progress_every(1_000).build())
///     .build();
/// assert_eq!(config.thread_name, "panel-search");
/// ```
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Name given to the worker thread.
    pub thread_name: String,
    /// Configuration of every search the worker runs.
    pub search: SearchConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            search: SearchConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Creates a new builder for WorkerConfig.
    pub fn builder() -> WorkerConfigBuilder {
        WorkerConfigBuilder::default()
    }
}

/// Builder for WorkerConfig.
#[derive(Debug, Clone, Default)]
pub struct WorkerConfigBuilder {
    thread_name: Option<String>,
    search: Option<SearchConfig>,
}

impl WorkerConfigBuilder {
    /// Sets the worker thread name.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = Some(name.into());
        self
    }

    /// Sets the search configuration.
    pub fn with_search_config(mut self, search: SearchConfig) -> Self {
        self.search = Some(search);
        self
    }

    /// Builds the WorkerConfig.
    pub fn build(self) -> WorkerConfig {
        WorkerConfig {
            thread_name: self
                .thread_name
                .unwrap_or_else(|| DEFAULT_THREAD_NAME.to_string()),
            search: self.search.unwrap_or_default(),
        }
    }
}
