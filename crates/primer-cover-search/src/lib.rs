//! # primer-cover-search
//!
//! Exhaustive best-subset search for primer panels.
//!
//! Given target taxon records and a cap on panel size, the search explores
//! every primer subset of size 1, 2, ... up to the cap, keeps every subset
//! reaching the best on-target coverage at each size, and stops as soon as
//! one size covers every target taxon.
//!
//! ## Key Features
//!
//! - **Tie sets** - every equally-best subset is reported, not just one
//! - **Early termination** - sizes beyond full coverage are skipped
//! - **Progress** - notifications on a fixed combination cadence, as a
//!   percentage of every combination the plan could evaluate
//! - **Cancellation and timeouts** - cooperative, checked on the same cadence
//! - **Bitmap scoring** - subsets are ranked with roaring bitmap unions;
//!   full coverage results are built only for the survivors
//! - **Optional parallelism** - enable the `parallel` feature to rank
//!   batches of subsets on a rayon pool
//!
//! ## Quick Start
//!
//! ```rust
//! use primer_cover::TaxonRecord;
//! use primer_cover_search::{CancellationToken, PrimerSearch, Progress, SearchParameters};
//!
//! let records = vec![
//!     TaxonRecord::builder("T1").primer("A").build().unwrap(),
//!     TaxonRecord::builder("T2").primer("B").build().unwrap(),
//!     TaxonRecord::builder("T3").primers(["A", "B"]).build().unwrap(),
//! ];
//! let params = SearchParameters::new(records.clone(), records, 3);
//!
//! let mut last = 0.0;
//! let mut sink = |p: Progress| last = p.percent;
//! let output = PrimerSearch::new()
//!     .run_with_progress(&params, &mut sink, &CancellationToken::new())
//!     .unwrap();
//!
//! let smallest = output.summaries.last().unwrap();
//! assert_eq!(smallest.n_primers, 1);
//! assert_eq!(smallest.coverage, 2);
//! assert_eq!(smallest.results.len(), 2);
//! assert!(last > 0.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` - Ranks subsets on a rayon thread pool
//! - `serde` - Serialize/deserialize parameters, progress and summaries
//!
//! ## Architecture
//!
//! ```text
//! SearchParameters ──> SearchContext (universe, bitmap index, off-target records)
//!                           │
//!                      SearchPlan (sizes, combination counts)
//!                           │
//!           PrimerSearch ── for k in 1..=max ──> BestSubsetSelector
//!                           │                       │ rank (TieSet fold)
//!                           │                       │ materialize survivors
//!                           ▼                       ▼
//!                      SearchOutput  <──  SizeSummary per size
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod config;
mod context;
mod error;
mod index;
mod params;
mod plan;
mod progress;
mod result;
mod search;
mod selector;

pub use config::{SearchConfig, SearchConfigBuilder, DEFAULT_BATCH_SIZE, DEFAULT_PROGRESS_EVERY};
pub use context::SearchContext;
pub use error::{SearchError, SearchResult};
pub use index::{CoverageIndex, TaxonRegistry};
pub use params::SearchParameters;
pub use plan::{SearchPlan, SizeStep};
pub use progress::{CancellationToken, NoProgress, Progress, ProgressSink};
pub use result::{
    average_coverage_by_group, PrimerSetResult, SearchOutput, SearchStats, SizeSummary,
};
pub use search::PrimerSearch;
pub use selector::{SizeSelection, TieSet};

// Re-export the model so callers need only one import path.
pub use primer_cover;
