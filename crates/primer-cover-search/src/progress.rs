//! Progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{SearchError, SearchResult};

/// A progress notification.
///
/// `percent` is the share of all planned combinations evaluated so far,
/// across every size up to the requested maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Progress {
    /// Subset size being explored.
    pub n_primers: usize,
    /// Percentage in `0.0..=100.0`.
    pub percent: f64,
}

/// Receiver of progress notifications.
///
/// Implemented for every `FnMut(Progress)`, so a closure can be passed
/// wherever a sink is expected.
pub trait ProgressSink {
    /// Called with each progress notification, in order.
    fn on_progress(&mut self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: FnMut(Progress),
{
    fn on_progress(&mut self, progress: Progress) {
        self(progress)
    }
}

/// Sink that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _progress: Progress) {}
}

/// Shared flag used to stop a running search.
///
/// Clones observe the same flag. The search checks it on the progress
/// cadence and at every size boundary, then fails with
/// [`SearchError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns true once [`cancel`](Self::cancel) was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Counts evaluated combinations for one search and paces notifications.
pub(crate) struct ProgressGuard<'a> {
    total: u64,
    tried: u64,
    every: u64,
    last_percent: f64,
    cancel: &'a CancellationToken,
    started: Instant,
    timeout: Option<Duration>,
}

impl<'a> ProgressGuard<'a> {
    pub(crate) fn new(
        total: u64,
        every: u64,
        cancel: &'a CancellationToken,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            total,
            tried: 0,
            every: every.max(1),
            last_percent: 0.0,
            cancel,
            started: Instant::now(),
            timeout,
        }
    }

    /// Combinations evaluated so far.
    pub(crate) fn tried(&self) -> u64 {
        self.tried
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Records `n` more evaluated combinations of size `k`.
    ///
    /// Emits a notification and checks for cancellation and timeout each
    /// time the count crosses a multiple of the cadence.
    pub(crate) fn advance(
        &mut self,
        n: u64,
        k: usize,
        sink: &mut dyn ProgressSink,
    ) -> SearchResult<()> {
        let before = self.tried / self.every;
        self.tried = self.tried.saturating_add(n);
        if self.tried / self.every > before {
            self.emit(k, sink);
            self.check()?;
        }
        Ok(())
    }

    /// Emits the notification that closes size `k`.
    pub(crate) fn finish_size(&mut self, k: usize, sink: &mut dyn ProgressSink) {
        self.emit(k, sink);
    }

    /// Fails if the search was cancelled or ran out of time.
    pub(crate) fn check(&self) -> SearchResult<()> {
        if self.cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        if let Some(timeout) = self.timeout {
            if self.started.elapsed() > timeout {
                return Err(SearchError::Timeout(timeout));
            }
        }
        Ok(())
    }

    fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.tried as f64 * 100.0 / self.total as f64).min(100.0)
    }

    fn emit(&mut self, k: usize, sink: &mut dyn ProgressSink) {
        let percent = self.percent().max(self.last_percent);
        self.last_percent = percent;
        debug!(n_primers = k, percent, tried = self.tried, "search progress");
        sink.on_progress(Progress {
            n_primers: k,
            percent,
        });
    }
}
