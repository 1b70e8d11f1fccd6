//! Line-delimited JSON transport.
//!
//! Reads one [`WorkerRequest`] envelope per line and writes the worker's
//! responses, one envelope per line, until the input ends. Requests are
//! served one at a time: all messages of a request are written before the
//! next line is read. A request whose `id` parses but whose body does not
//! is answered with an `error` message.

use std::io::{BufRead, Write};
use std::sync::Arc;

use primer_cover_search::CancellationToken;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::WorkerConfig;
use crate::error::TransportResult;
use crate::message::{decode, encode, Envelope, WorkerRequest, WorkerResponse};
use crate::worker::SearchWorker;

/// Serves requests from `input`, writing responses to `output`.
///
/// Returns the number of requests served.
///
/// # Errors
///
/// - [`TransportError::Codec`](crate::TransportError::Codec) for a line
///   that is not a JSON object with a request `id`
/// - [`TransportError::Io`](crate::TransportError::Io) if reading or
///   writing fails
/// - [`TransportError::Disconnected`](crate::TransportError::Disconnected)
///   if the worker thread dies
pub fn serve<R, W>(input: R, mut output: W, config: &WorkerConfig) -> TransportResult<usize>
where
    R: BufRead,
    W: Write,
{
    let worker = SearchWorker::spawn(config)?;
    let mut served = 0;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let envelope: Envelope<Value> = decode(&line)?;
        let id = envelope.id;
        let params = match serde_json::from_value::<WorkerRequest>(envelope.message) {
            Ok(WorkerRequest::Search(params)) => params,
            Err(e) => {
                warn!(%id, error = %e, "request rejected");
                writeln!(output, "{}", encode(&Envelope::new(id, WorkerResponse::Error))?)?;
                output.flush()?;
                served += 1;
                continue;
            }
        };
        debug!(%id, "request received");

        worker.submit(id, Arc::new(params), CancellationToken::new())?;
        loop {
            let event = worker.recv()?;
            if event.id() != id {
                continue;
            }
            writeln!(output, "{}", encode(&event.to_response())?)?;
            if event.is_terminal() {
                break;
            }
        }
        output.flush()?;
        served += 1;
    }

    info!(served, "transport input closed");
    Ok(served)
}
