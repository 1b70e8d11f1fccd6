//! Wire messages and their JSON codec.
//!
//! Every message is an object with a correlation `id` next to the
//! adjacently tagged `type`/`data` pair:
//!
//! ```text
//! -> { "id": 1, "type": "search",   "data": { "selectedRecords": [...], ... } }
//! <- { "id": 1, "type": "progress", "data": { "nPrimers": 2, "percent": 41.5 } }
//! <- { "id": 1, "type": "result",   "data": { "params": {...}, "results": [...] } }
//! <- { "id": 1, "type": "error" }
//! ```

use std::fmt;

use primer_cover_search::{Progress, SearchParameters, SizeSummary};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::TransportResult;

/// Correlation id of one search request.
///
/// Ids increase monotonically within a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Returns the id following this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A message tagged with the request it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<M> {
    /// Correlation id.
    pub id: RequestId,
    /// The message.
    #[serde(flatten)]
    pub message: M,
}

impl<M> Envelope<M> {
    /// Wraps `message` with `id`.
    pub fn new(id: RequestId, message: M) -> Self {
        Self { id, message }
    }
}

/// Messages sent to a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum WorkerRequest {
    /// Run a search.
    Search(SearchParameters),
}

/// Messages sent by a worker.
///
/// For one request: zero or more `Progress`, then exactly one of
/// `Result` or `Error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum WorkerResponse {
    /// Progress of the running search.
    Progress(Progress),
    /// Terminal success.
    Result(SearchResults),
    /// Terminal failure; carries no detail on the wire.
    Error,
}

impl WorkerResponse {
    /// Returns true for `Result` and `Error`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }
}

/// Payload of a terminal `result` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// The request parameters, echoed back.
    pub params: SearchParameters,
    /// Per-size summaries, largest size first.
    pub results: Vec<SizeSummary>,
}

/// Encodes a message as one line of JSON.
pub fn encode<T: Serialize>(message: &T) -> TransportResult<String> {
    Ok(serde_json::to_string(message)?)
}

/// Decodes a message from JSON.
pub fn decode<T: DeserializeOwned>(text: &str) -> TransportResult<T> {
    Ok(serde_json::from_str(text)?)
}
