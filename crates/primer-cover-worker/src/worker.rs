//! Dedicated search worker thread.
//!
//! The worker owns one thread that runs searches one at a time, so the
//! exponential enumeration never blocks the caller. Jobs go in over one
//! channel and [`WorkerEvent`]s come back over another. A panic inside a
//! search is caught and reported as a failed job; the thread keeps serving.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use primer_cover_search::{
    CancellationToken, PrimerSearch, Progress, SearchError, SearchOutput, SearchParameters,
};
use tracing::{debug, info, warn};

use crate::config::WorkerConfig;
use crate::error::{TransportError, TransportResult};
use crate::message::{Envelope, RequestId, SearchResults, WorkerResponse};

/// A job queued on the worker.
struct Job {
    id: RequestId,
    params: Arc<SearchParameters>,
    cancel: CancellationToken,
}

/// Something a worker reports about a job.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// Progress of a running job.
    Progress {
        /// Job id.
        id: RequestId,
        /// Progress notification.
        progress: Progress,
    },
    /// The job finished.
    Completed {
        /// Job id.
        id: RequestId,
        /// The job's parameters.
        params: Arc<SearchParameters>,
        /// Search output.
        output: SearchOutput,
    },
    /// The job failed; no partial output is kept.
    Failed {
        /// Job id.
        id: RequestId,
        /// Why the job failed.
        error: SearchError,
    },
}

impl WorkerEvent {
    /// Id of the job the event belongs to.
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

    /// Converts the event to its wire message.
    pub fn to_response(&self) -> Envelope<WorkerResponse> {
        let message = match self {
            Self::Progress { progress, .. } => WorkerResponse::Progress(*progress),
            Self::Completed { params, output, .. } => WorkerResponse::Result(SearchResults {
                params: params.as_ref().clone(),
                results: output.summaries.clone(),
            }),
            Self::Failed { .. } => WorkerResponse::Error,
        };
        Envelope::new(self.id(), message)
    }
}

/// Handle to a search worker thread.
///
/// Dropping the handle closes the job channel and joins the thread once
/// the current job is done.
pub struct SearchWorker {
    jobs: Option<Sender<Job>>,
    events: Receiver<WorkerEvent>,
    thread_handle: Option<JoinHandle<()>>,
}

impl SearchWorker {
    /// Starts a worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Spawn`] if the thread cannot be created.
    pub fn spawn(config: &WorkerConfig) -> TransportResult<Self> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (event_tx, event_rx) = mpsc::channel::<WorkerEvent>();
        let search = PrimerSearch::with_config(config.search.clone());

        let thread_handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || Self::run_loop(search, job_rx, event_tx))
            .map_err(TransportError::Spawn)?;

        info!(thread = %config.thread_name, "search worker started");

        Ok(Self {
            jobs: Some(job_tx),
            events: event_rx,
            thread_handle: Some(thread_handle),
        })
    }

    /// The worker loop: one job at a time until the job channel closes.
    fn run_loop(search: PrimerSearch, jobs: Receiver<Job>, events: Sender<WorkerEvent>) {
        for job in jobs {
            let id = job.id;
            if job.cancel.is_cancelled() {
                debug!(%id, "skipping job cancelled while queued");
                if events
                    .send(WorkerEvent::Failed {
                        id,
                        error: SearchError::Cancelled,
                    })
                    .is_err()
                {
                    break;
                }
                continue;
            }

            info!(%id, targets = job.params.selected_records.len(), "job started");
            let event = Self::run_job(&search, &job, &events);
            match &event {
                WorkerEvent::Completed { output, .. } => {
                    info!(%id, sizes = output.len(), "job finished")
                }
                WorkerEvent::Failed { error, .. } if error.is_cancellation() => {
                    info!(%id, "job cancelled")
                }
                WorkerEvent::Failed { error, .. } => warn!(%id, %error, "job failed"),
                WorkerEvent::Progress { .. } => {}
            }

            if events.send(event).is_err() {
                break;
            }
        }
        debug!("search worker stopped");
    }

    /// Runs one job, turning panics into failures.
    fn run_job(search: &PrimerSearch, job: &Job, events: &Sender<WorkerEvent>) -> WorkerEvent {
        let id = job.id;
        let mut sink = |progress: Progress| {
            // A closed channel means nobody listens; the job still ends normally.
            let _ = events.send(WorkerEvent::Progress { id, progress });
        };

        Self::guarded(id, &job.params, || {
            search.run_with_progress(&job.params, &mut sink, &job.cancel)
        })
    }

    /// Runs `search` for job `id`, mapping its outcome (or its panic) to
    /// the terminal event.
    fn guarded<F>(id: RequestId, params: &Arc<SearchParameters>, search: F) -> WorkerEvent
    where
        F: FnOnce() -> Result<SearchOutput, SearchError>,
    {
        match panic::catch_unwind(AssertUnwindSafe(search)) {
            Ok(Ok(output)) => WorkerEvent::Completed {
                id,
                params: Arc::clone(params),
                output,
            },
            Ok(Err(error)) => WorkerEvent::Failed { id, error },
            Err(payload) => WorkerEvent::Failed {
                id,
                error: SearchError::Computation(format!(
                    "search panicked: {}",
                    panic_message(payload.as_ref())
                )),
            },
        }
    }

    /// Queues a search.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Disconnected`] if the worker thread is gone.
    pub fn submit(
        &self,
        id: RequestId,
        params: Arc<SearchParameters>,
        cancel: CancellationToken,
    ) -> TransportResult<()> {
        let jobs = self.jobs.as_ref().ok_or(TransportError::Disconnected)?;
        jobs.send(Job { id, params, cancel })
            .map_err(|_| TransportError::Disconnected)
    }

    /// Waits for the next event.
    pub fn recv(&self) -> TransportResult<WorkerEvent> {
        self.events.recv().map_err(|_| TransportError::Disconnected)
    }

    /// Waits up to `timeout` for the next event; `Ok(None)` on timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> TransportResult<Option<WorkerEvent>> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Disconnected),
        }
    }

    /// Returns the next event if one is ready.
    pub fn try_recv(&self) -> TransportResult<Option<WorkerEvent>> {
        match self.events.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(TransportError::Disconnected),
        }
    }

    /// Check if the worker thread is still running.
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Closes the job channel and waits for the thread to finish.
    ///
    /// Blocks until the current job ends; cancel it first for a prompt stop.
    pub fn shutdown(&mut self) {
        self.jobs.take();
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                warn!("search worker thread panicked: {:?}", e);
            }
        }
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SearchWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchWorker")
            .field("running", &self.is_running())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primer_cover::TaxonRecord;

    const WAIT: Duration = Duration::from_secs(10);

    fn params() -> Arc<SearchParameters> {
        let records = vec![
            TaxonRecord::builder("T1").primer("A").build().unwrap(),
            TaxonRecord::builder("T2").primer("B").build().unwrap(),
            TaxonRecord::builder("T3").primers(["A", "B"]).build().unwrap(),
        ];
        Arc::new(SearchParameters::new(records.clone(), records, 3))
    }

    fn wait_terminal(worker: &SearchWorker) -> (Vec<WorkerEvent>, WorkerEvent) {
        let mut progress = Vec::new();
        loop {
            let event = worker.recv_timeout(WAIT).unwrap().expect("worker event");
            if event.is_terminal() {
                return (progress, event);
            }
            progress.push(event);
        }
    }

    #[test]
    fn test_worker_runs_job() {
        let worker = SearchWorker::spawn(&WorkerConfig::default()).unwrap();
        assert!(worker.is_running());

        worker
            .submit(RequestId(1), params(), CancellationToken::new())
            .unwrap();
        let (progress, terminal) = wait_terminal(&worker);

        assert_eq!(progress.len(), 2);
        assert!(progress.iter().all(|e| e.id() == RequestId(1)));
        match terminal {
            WorkerEvent::Completed { id, output, .. } => {
                assert_eq!(id, RequestId(1));
                assert_eq!(output.summaries[0].n_primers, 2);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_worker_reports_invalid_parameters() {
        let worker = SearchWorker::spawn(&WorkerConfig::default()).unwrap();
        let empty = Arc::new(SearchParameters::new(Vec::new(), Vec::new(), 2));

        worker
            .submit(RequestId(5), empty, CancellationToken::new())
            .unwrap();
        let (_, terminal) = wait_terminal(&worker);

        assert!(matches!(
            terminal,
            WorkerEvent::Failed {
                error: SearchError::InvalidParameters(_),
                ..
            }
        ));
        assert_eq!(
            terminal.to_response(),
            Envelope::new(RequestId(5), WorkerResponse::Error)
        );
    }

    #[test]
    fn test_worker_skips_job_cancelled_while_queued() {
        let worker = SearchWorker::spawn(&WorkerConfig::default()).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        worker.submit(RequestId(2), params(), token).unwrap();
        let (progress, terminal) = wait_terminal(&worker);

        assert!(progress.is_empty());
        assert!(matches!(
            terminal,
            WorkerEvent::Failed {
                error: SearchError::Cancelled,
                ..
            }
        ));
    }

    #[test]
    fn test_completed_to_response_echoes_params() {
        let worker = SearchWorker::spawn(&WorkerConfig::default()).unwrap();
        let params = params();
        worker
            .submit(RequestId(3), Arc::clone(&params), CancellationToken::new())
            .unwrap();
        let (_, terminal) = wait_terminal(&worker);

        match terminal.to_response().message {
            WorkerResponse::Result(results) => {
                assert_eq!(results.params, *params);
                assert_eq!(results.results.len(), 2);
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_shutdown_stops_thread() {
        let mut worker = SearchWorker::spawn(&WorkerConfig::default()).unwrap();
        worker.shutdown();
        assert!(!worker.is_running());
        assert!(matches!(
            worker.submit(RequestId(1), params(), CancellationToken::new()),
            Err(TransportError::Disconnected)
        ));
    }

    #[test]
    fn test_panicking_search_becomes_computation_failure() {
        let event = SearchWorker::guarded(RequestId(9), &params(), || panic!("index out of range"));

        match event {
            WorkerEvent::Failed { id, error } => {
                assert_eq!(id, RequestId(9));
                assert_eq!(
                    error,
                    SearchError::Computation("search panicked: index out of range".to_string())
                );
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_guarded_passes_search_errors_through() {
        let event = SearchWorker::guarded(RequestId(2), &params(), || Err(SearchError::Cancelled));
        assert!(matches!(
            event,
            WorkerEvent::Failed {
                error: SearchError::Cancelled,
                ..
            }
        ));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
