//! # primer-cover-worker
//!
//! Runs primer set searches on a dedicated thread and talks to it through
//! a small request/response protocol.
//!
//! - **Worker**: [`SearchWorker`] owns a named thread that runs one search
//!   at a time and reports [`WorkerEvent`]s; panics become failed jobs
//! - **Session**: [`SearchSession`] tags each request with a [`RequestId`],
//!   cancels superseded searches and drops their late events
//! - **Wire format**: [`Envelope`]-wrapped [`WorkerRequest`] and
//!   [`WorkerResponse`] messages encoded as JSON, and [`serve`] for a
//!   line-delimited stream
//!
//! ## Usage
//!
//! ```rust
//! use primer_cover::TaxonRecord;
//! use primer_cover_search::SearchParameters;
//! use primer_cover_worker::{SearchSession, WorkerConfig};
//!
//! let records = vec![
//!     TaxonRecord::builder("T1").primer("A").build().unwrap(),
//!     TaxonRecord::builder("T2").primers(["A", "B"]).build().unwrap(),
//! ];
//! let session = SearchSession::new(WorkerConfig::default()).unwrap();
//! let output = session
//!     .run(SearchParameters::new(records.clone(), records, 2), |p| {
//!         println!("{} primers: {:.1}%", p.n_primers, p.percent);
//!     })
//!     .unwrap();
//!
//! assert_eq!(output.summaries[0].coverage, 2);
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` - Rank subsets on a rayon pool inside the worker

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod config;
mod error;
mod message;
mod session;
mod transport;
mod worker;

pub use config::{WorkerConfig, WorkerConfigBuilder, DEFAULT_THREAD_NAME};
pub use error::{TransportError, TransportResult};
pub use message::{
    decode, encode, Envelope, RequestId, SearchResults, WorkerRequest, WorkerResponse,
};
pub use session::{SearchEvent, SearchSession, SessionStats};
pub use transport::serve;
pub use worker::{SearchWorker, WorkerEvent};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_accessible() {
        let _config = WorkerConfig::default();
        let _id = RequestId::default().next();
        let _message = Envelope::new(RequestId(1), WorkerResponse::Error);
    }
}
