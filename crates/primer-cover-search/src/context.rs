//! Per-search state derived once from the parameters.

use primer_cover::{
    compute_coverage, distinct_taxa, CoverageResult, PrimerSubset, PrimerUniverse, TaxonRecord,
};

use crate::index::CoverageIndex;
use crate::params::SearchParameters;

/// Everything a search derives from its parameters before enumerating.
#[derive(Debug)]
pub struct SearchContext<'p> {
    params: &'p SearchParameters,
    universe: PrimerUniverse,
    index: CoverageIndex,
    target_taxa: usize,
    off_target_records: Vec<TaxonRecord>,
}

impl<'p> SearchContext<'p> {
    /// Derives the primer universe, coverage index and off-target records.
    ///
    /// The universe is induced by the target records only.
    pub fn new(params: &'p SearchParameters) -> Self {
        let universe = PrimerUniverse::from_records(&params.selected_records);
        let index = CoverageIndex::build(&params.selected_records, &universe);
        let target_taxa = distinct_taxa(&params.selected_records);
        let off_target_records = if params.include_off_target_taxa {
            params.off_target_records()
        } else {
            Vec::new()
        };

        Self {
            params,
            universe,
            index,
            target_taxa,
            off_target_records,
        }
    }

    /// The parameters this context was derived from.
    pub fn params(&self) -> &SearchParameters {
        self.params
    }

    /// The primer universe of the target records.
    pub fn universe(&self) -> &PrimerUniverse {
        &self.universe
    }

    /// The on-target coverage index.
    pub fn index(&self) -> &CoverageIndex {
        &self.index
    }

    /// Number of distinct target taxa.
    pub fn target_taxa(&self) -> usize {
        self.target_taxa
    }

    /// Records whose taxon is not a target (empty unless off-target
    /// scoring was requested).
    pub fn off_target_records(&self) -> &[TaxonRecord] {
        &self.off_target_records
    }

    /// Full coverage of `subset` against the targets.
    pub fn on_target(&self, subset: &PrimerSubset) -> CoverageResult {
        compute_coverage(
            &self.params.selected_records,
            subset,
            &self.params.primer_palette,
        )
    }

    /// Off-target and total coverage of `subset`, when requested.
    ///
    /// When the targets span the whole dataset the total is the on-target
    /// result itself.
    pub fn off_target_and_total(
        &self,
        subset: &PrimerSubset,
        on_target: &CoverageResult,
    ) -> (Option<CoverageResult>, Option<CoverageResult>) {
        if !self.params.include_off_target_taxa {
            return (None, None);
        }

        let palette = &self.params.primer_palette;
        let off_target = compute_coverage(&self.off_target_records, subset, palette);
        let total = if self.params.targets_whole_dataset() {
            on_target.clone()
        } else {
            compute_coverage(&self.params.all_records, subset, palette)
        };
        (Some(off_target), Some(total))
    }
}
