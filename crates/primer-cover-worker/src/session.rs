//! Search session: one worker, one current request.
//!
//! The session gives each request a fresh [`RequestId`] and remembers only
//! the latest one. Submitting a new search cancels the previous job, and
//! any event still arriving for an older id is discarded, so callers never
//! see progress or results of a search they have abandoned.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use primer_cover_search::{CancellationToken, Progress, SearchError, SearchOutput, SearchParameters};
use tracing::{debug, info, warn};

use crate::config::WorkerConfig;
use crate::error::{TransportError, TransportResult};
use crate::message::RequestId;
use crate::worker::{SearchWorker, WorkerEvent};

/// An event of the session's current request.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// Progress of the current search.
    Progress {
        /// Request id.
        id: RequestId,
        /// Progress notification.
        progress: Progress,
    },
    /// The current search finished.
    Completed {
        /// Request id.
        id: RequestId,
        /// The request parameters.
        params: Arc<SearchParameters>,
        /// Search output.
        output: SearchOutput,
    },
    /// The current search failed.
    Failed {
        /// Request id.
        id: RequestId,
        /// Why it failed.
        error: SearchError,
    },
}

impl SearchEvent {
    /// Request id of the event.
    pub fn id(&self) -> RequestId {
        match self {
            Self::Progress { id, .. } | Self::Completed { id, .. } | Self::Failed { id, .. } => {
                *id
            }
        }
    }

    /// Returns true for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

impl From<WorkerEvent> for SearchEvent {
    fn from(event: WorkerEvent) -> Self {
        match event {
            WorkerEvent::Progress { id, progress } => Self::Progress { id, progress },
            WorkerEvent::Completed { id, params, output } => Self::Completed { id, params, output },
            WorkerEvent::Failed { id, error } => Self::Failed { id, error },
        }
    }
}

/// Counters kept by a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Searches submitted.
    pub submitted: u64,
    /// Searches that completed.
    pub completed: u64,
    /// Searches that failed, cancellations included.
    pub failed: u64,
    /// Events discarded because they belonged to an older request.
    pub stale_discarded: u64,
    /// Times the worker thread was respawned.
    pub respawns: u64,
}

struct ActiveRequest {
    id: RequestId,
    cancel: CancellationToken,
}

struct SessionState {
    last_id: RequestId,
    active: Option<ActiveRequest>,
}

/// Caller-side handle to a search worker.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use primer_cover::TaxonRecord;
/// use primer_cover_search::SearchParameters;
/// use primer_cover_worker::{SearchEvent, SearchSession, WorkerConfig};
///
/// let session = SearchSession::new(WorkerConfig::default()).unwrap();
/// let records = vec![TaxonRecord::builder("T1").primer("A").build().unwrap()];
/// let id = session
///     .submit(SearchParameters::new(records.clone(), records, 2))
///     .unwrap();
///
/// loop {
///     match session.next_event(Duration::from_secs(5)).unwrap() {
///         Some(SearchEvent::Completed { id: done, output, .. }) => {
///             assert_eq!(done, id);
///             assert_eq!(output.summaries[0].coverage, 1);
///             break;
///         }
///         Some(SearchEvent::Failed { error, .. }) => panic!("{}", error),
///         _ => {}
///     }
/// }
/// assert!(!session.is_searching());
/// ```
pub struct SearchSession {
    config: WorkerConfig,
    worker: Mutex<SearchWorker>,
    state: Mutex<SessionState>,
    stats: RwLock<SessionStats>,
}

impl SearchSession {
    /// Starts a session with its own worker thread.
    pub fn new(config: WorkerConfig) -> TransportResult<Self> {
        let worker = SearchWorker::spawn(&config)?;
        Ok(Self {
            config,
            worker: Mutex::new(worker),
            state: Mutex::new(SessionState {
                last_id: RequestId::default(),
                active: None,
            }),
            stats: RwLock::new(SessionStats::default()),
        })
    }

    /// Starts a search and makes it the current request.
    ///
    /// Parameters are validated here, before dispatch. The previous search,
    /// if any, is cancelled and its remaining events will be discarded. If
    /// the worker thread has died it is respawned once.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Search`] with
    ///   [`SearchError::InvalidParameters`] for rejected parameters
    /// - [`TransportError::Spawn`] or [`TransportError::Disconnected`] if
    ///   the worker cannot be reached even after a respawn
    pub fn submit(&self, params: SearchParameters) -> TransportResult<RequestId> {
        params.validate()?;
        let params = Arc::new(params);

        let cancel = CancellationToken::new();
        let id = {
            let mut state = self.state.lock();
            if let Some(previous) = state.active.take() {
                debug!(id = %previous.id, "cancelling superseded search");
                previous.cancel.cancel();
            }
            let id = state.last_id.next();
            state.last_id = id;
            state.active = Some(ActiveRequest {
                id,
                cancel: cancel.clone(),
            });
            id
        };

        if let Err(err) = self.dispatch(id, params, cancel) {
            let mut state = self.state.lock();
            if state.active.as_ref().map(|a| a.id) == Some(id) {
                state.active = None;
            }
            return Err(err);
        }

        self.stats.write().submitted += 1;
        info!(%id, "search submitted");
        Ok(id)
    }

    /// Hands a job to the worker, respawning it once if it is gone.
    fn dispatch(
        &self,
        id: RequestId,
        params: Arc<SearchParameters>,
        cancel: CancellationToken,
    ) -> TransportResult<()> {
        let mut worker = self.worker.lock();
        match worker.submit(id, Arc::clone(&params), cancel.clone()) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(%id, error = %err, "worker unreachable, respawning");
                *worker = SearchWorker::spawn(&self.config)?;
                self.stats.write().respawns += 1;
                worker.submit(id, params, cancel)
            }
        }
    }

    /// Waits up to `timeout` for the next event of the current request.
    ///
    /// Events of superseded requests are dropped while waiting. Returns
    /// `Ok(None)` on timeout. The worker lock is held while waiting, so
    /// keep `timeout` short when other threads submit searches.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Disconnected`] if the worker thread died;
    /// the current request is abandoned.
    pub fn next_event(&self, timeout: Duration) -> TransportResult<Option<SearchEvent>> {
        let deadline = Instant::now() + timeout;
        let worker = self.worker.lock();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let event = match worker.recv_timeout(remaining) {
                Ok(Some(event)) => event,
                Ok(None) => return Ok(None),
                Err(err) => {
                    self.state.lock().active = None;
                    return Err(err);
                }
            };

            let mut state = self.state.lock();
            let current = state.active.as_ref().map(|a| a.id);
            if current != Some(event.id()) {
                debug!(id = %event.id(), "discarding stale worker event");
                self.stats.write().stale_discarded += 1;
                continue;
            }

            if event.is_terminal() {
                state.active = None;
                let mut stats = self.stats.write();
                match &event {
                    WorkerEvent::Completed { .. } => stats.completed += 1,
                    _ => stats.failed += 1,
                }
            }
            return Ok(Some(event.into()));
        }
    }

    /// Runs a search to completion, forwarding progress to `on_progress`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Search`] if the search fails, including
    /// when another caller supersedes it.
    pub fn run<F>(&self, params: SearchParameters, mut on_progress: F) -> TransportResult<SearchOutput>
    where
        F: FnMut(Progress),
    {
        let id = self.submit(params)?;
        loop {
            if self.current_request() != Some(id) {
                return Err(SearchError::Cancelled.into());
            }
            match self.next_event(Duration::from_millis(100))? {
                Some(SearchEvent::Progress { progress, .. }) => on_progress(progress),
                Some(SearchEvent::Completed { output, .. }) => return Ok(output),
                Some(SearchEvent::Failed { error, .. }) => return Err(error.into()),
                None => {}
            }
        }
    }

    /// Cancels the current search; its `Failed` event still arrives.
    pub fn cancel(&self) {
        if let Some(active) = self.state.lock().active.as_ref() {
            debug!(id = %active.id, "cancelling search");
            active.cancel.cancel();
        }
    }

    /// Returns true while the current request has no terminal event yet.
    pub fn is_searching(&self) -> bool {
        self.state.lock().active.is_some()
    }

    /// Id of the current request, if one is in flight.
    pub fn current_request(&self) -> Option<RequestId> {
        self.state.lock().active.as_ref().map(|a| a.id)
    }

    /// Returns the session counters.
    pub fn stats(&self) -> SessionStats {
        *self.stats.read()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Cancels the current search and stops the worker thread.
    pub fn shutdown(&self) {
        self.cancel();
        self.state.lock().active = None;
        self.worker.lock().shutdown();
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        // Cancel first so the worker join does not wait for the search.
        self.cancel();
    }
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("current_request", &self.current_request())
            .field("stats", &self.stats())
            .finish()
    }
}
