//! # primer-cover
//!
//! Data model and coverage scoring for choosing primer panels.
//!
//! A *primer* is a named detection probe; a *taxon* is detected by a
//! primer when the primer appears in the taxon's detecting-primer list.
//! This crate provides:
//!
//! - **Records**: [`TaxonRecord`] with fixed grouping levels (supergroup,
//!   taxa group, phylum, order, family, genus), a resolution category and
//!   the detecting primers
//! - **Universe and subsets**: [`PrimerUniverse`] derived from records,
//!   [`PrimerSubset`] for a fixed-size choice of primers
//! - **Enumeration**: [`Combinations`], an iterative k-subset generator
//! - **Scoring**: [`compute_coverage`], a pure function producing a
//!   [`CoverageResult`]
//!
//! ## Usage
//!
//! ```rust
//! use primer_cover::{compute_coverage, PrimerPalette, PrimerUniverse, TaxonRecord};
//!
//! let records = vec![
//!     TaxonRecord::builder("T1").primer("A").build().unwrap(),
//!     TaxonRecord::builder("T2").primer("B").build().unwrap(),
//!     TaxonRecord::builder("T3").primers(["A", "B"]).build().unwrap(),
//! ];
//!
//! let universe = PrimerUniverse::from_records(&records);
//! let subset = universe.subset(&["A"]).unwrap();
//! let result = compute_coverage(&records, &subset, &PrimerPalette::new());
//!
//! assert_eq!(result.coverage, 2);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Serialize/deserialize records, subsets and coverage results

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod combination;
mod coverage;
mod error;
mod primer;
mod record;

pub use combination::{binomial, Combinations};
pub use coverage::{compute_coverage, distinct_taxa, CoverageResult, PrimerTaxaSet};
pub use error::{CoverError, CoverResult};
pub use primer::{PrimerPalette, PrimerSubset, PrimerUniverse};
pub use record::{
    TaxonGrouping, TaxonRecord, TaxonRecordBuilder, RESOLUTION_LEVELS, RESOLUTION_SPECIES,
};
