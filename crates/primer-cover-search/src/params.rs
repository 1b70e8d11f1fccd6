//! Search parameters supplied by the ingestion side.

use hashbrown::HashSet;
use primer_cover::{PrimerPalette, TaxonRecord};

use crate::error::{SearchError, SearchResult};

/// Inputs of one primer set search.
///
/// Treated as an immutable snapshot for the duration of a search.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SearchParameters {
    /// Records of the chosen target taxa.
    pub selected_records: Vec<TaxonRecord>,
    /// Every record of the active dataset (superset of the targets).
    pub all_records: Vec<TaxonRecord>,
    /// Largest subset size to explore.
    pub max_primers: usize,
    /// Also score every subset against off-target and total records.
    pub include_off_target_taxa: bool,
    /// Primer display colors; presentational only.
    #[cfg_attr(feature = "serde", serde(default))]
    pub primer_palette: PrimerPalette,
}

impl SearchParameters {
    /// Creates parameters without off-target scoring and with an empty palette.
    pub fn new(
        selected_records: Vec<TaxonRecord>,
        all_records: Vec<TaxonRecord>,
        max_primers: usize,
    ) -> Self {
        Self {
            selected_records,
            all_records,
            max_primers,
            include_off_target_taxa: false,
            primer_palette: PrimerPalette::new(),
        }
    }

    /// Enables or disables off-target scoring.
    pub fn with_off_target(mut self, include: bool) -> Self {
        self.include_off_target_taxa = include;
        self
    }

    /// Sets the primer palette.
    pub fn with_palette(mut self, palette: PrimerPalette) -> Self {
        self.primer_palette = palette;
        self
    }

    /// Rejects parameters the engine cannot search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidParameters`] if there are no target
    /// records or `max_primers` is zero.
    pub fn validate(&self) -> SearchResult<()> {
        if self.selected_records.is_empty() {
            return Err(SearchError::invalid("no target records selected"));
        }
        if self.max_primers < 1 {
            return Err(SearchError::invalid("maxPrimers must be at least 1"));
        }
        Ok(())
    }

    /// Returns the final identifiers of the target taxa.
    pub fn target_ids(&self) -> HashSet<&str> {
        self.selected_records
            .iter()
            .map(|r| r.final_id.as_str())
            .collect()
    }

    /// Returns the records of `all_records` whose taxon is not a target.
    pub fn off_target_records(&self) -> Vec<TaxonRecord> {
        let targets = self.target_ids();
        self.all_records
            .iter()
            .filter(|r| !targets.contains(r.final_id.as_str()))
            .cloned()
            .collect()
    }

    /// Returns true if the targets span the whole dataset.
    ///
    /// Relies on `selected_records` being a subset of `all_records`.
    pub fn targets_whole_dataset(&self) -> bool {
        self.selected_records.len() == self.all_records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, primers: &[&str]) -> TaxonRecord {
        TaxonRecord::builder(id)
            .primers(primers.iter().copied())
            .build()
            .unwrap()
    }

    #[test]
    fn test_validate_ok() {
        let params = SearchParameters::new(vec![record("T1", &["A"])], vec![], 2);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_targets() {
        let params = SearchParameters::new(vec![], vec![record("T1", &["A"])], 2);
        assert!(matches!(
            params.validate(),
            Err(SearchError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_max_primers() {
        let params = SearchParameters::new(vec![record("T1", &["A"])], vec![], 0);
        assert!(matches!(
            params.validate(),
            Err(SearchError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_off_target_records() {
        let t1 = record("T1", &["A"]);
        let t2 = record("T2", &["B"]);
        let t3 = record("T3", &["C"]);
        let params = SearchParameters::new(
            vec![t1.clone()],
            vec![t1, t2.clone(), t3.clone()],
            1,
        )
        .with_off_target(true);

        assert_eq!(params.off_target_records(), vec![t2, t3]);
        assert!(!params.targets_whole_dataset());
    }

    #[test]
    fn test_targets_whole_dataset() {
        let t1 = record("T1", &["A"]);
        let params = SearchParameters::new(vec![t1.clone()], vec![t1], 1);
        assert!(params.targets_whole_dataset());
        assert!(params.off_target_records().is_empty());
    }

    #[test]
    fn test_with_palette() {
        let mut palette = PrimerPalette::new();
        palette.insert("A".to_string(), "#ff0000".to_string());
        let params = SearchParameters::new(vec![record("T1", &["A"])], vec![], 1)
            .with_palette(palette.clone());
        assert_eq!(params.primer_palette, palette);
    }
}
