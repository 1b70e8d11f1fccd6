//! Coverage scoring of a primer subset against a record collection.
//!
//! [`compute_coverage`] is a pure function: every record is visited once
//! and a taxon counts as covered when at least one of its detecting primers
//! is in the subset.

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::{HashMap, HashSet};

use crate::primer::{PrimerPalette, PrimerSubset};
use crate::record::TaxonRecord;

/// Taxa covered by one primer of a subset, with the primer's display color.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrimerTaxaSet {
    /// Primer name.
    pub primer: String,
    /// Final identifiers this primer covers, in record order.
    pub taxa: Vec<String>,
    /// Palette color, if the palette has one for this primer.
    pub color: Option<String>,
}

/// Coverage of one primer subset over one record collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CoverageResult {
    /// Number of distinct covered taxa.
    pub coverage: usize,
    /// Distinct covered final identifiers.
    pub covered_taxa: BTreeSet<String>,
    /// Primer name to the final identifiers it covers.
    pub covered_taxa_by_primer: BTreeMap<String, Vec<String>>,
    /// Per-primer covered sets for overlap visualization.
    pub overlap_sets: Vec<PrimerTaxaSet>,
    /// Covered records, including repeated final identifiers.
    pub covered_records: Vec<TaxonRecord>,
    /// Taxa group to the number of distinct covered taxa in it.
    pub coverage_by_group: BTreeMap<String, usize>,
    /// Resolution category to the number of covered records.
    pub resolution_summary: BTreeMap<String, usize>,
}

impl CoverageResult {
    /// Creates an empty result (nothing covered).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if the taxon with `final_id` is covered.
    pub fn is_covered(&self, final_id: &str) -> bool {
        self.covered_taxa.contains(final_id)
    }

    /// Returns coverage as a fraction of `total` taxa (0 when `total` is 0).
    pub fn fraction_of(&self, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            self.coverage as f64 / total as f64
        }
    }
}

/// Scores `subset` against `records`.
///
/// A record whose taxon was already covered by an earlier record is
/// appended to `covered_records` again but neither re-attributed to
/// primers nor counted twice. The palette only feeds
/// [`CoverageResult::overlap_sets`].
pub fn compute_coverage(
    records: &[TaxonRecord],
    subset: &PrimerSubset,
    palette: &PrimerPalette,
) -> CoverageResult {
    let in_subset: HashSet<&str> = subset.iter().collect();

    let mut covered: HashSet<&str> = HashSet::new();
    let mut by_primer: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut covered_records: Vec<&TaxonRecord> = Vec::new();

    for record in records {
        let final_id = record.final_id.as_str();

        if covered.contains(final_id) {
            covered_records.push(record);
            continue;
        }

        let mut matched: Vec<&str> = Vec::new();
        for primer in &record.primers {
            let primer = primer.as_str();
            if in_subset.contains(primer) && !matched.contains(&primer) {
                matched.push(primer);
                by_primer
                    .entry(primer.to_string())
                    .or_default()
                    .push(final_id.to_string());
            }
        }

        if !matched.is_empty() {
            covered.insert(final_id);
            covered_records.push(record);
        }
    }

    let mut leaves_by_group: HashMap<&str, HashSet<&str>> = HashMap::new();
    let mut resolution_summary: BTreeMap<String, usize> = BTreeMap::new();
    for record in &covered_records {
        leaves_by_group
            .entry(record.taxa_group())
            .or_default()
            .insert(record.final_id.as_str());
        *resolution_summary
            .entry(record.resolution.clone())
            .or_insert(0) += 1;
    }
    let coverage_by_group = leaves_by_group
        .into_iter()
        .map(|(group, leaves)| (group.to_string(), leaves.len()))
        .collect();

    let overlap_sets = by_primer
        .iter()
        .map(|(primer, taxa)| PrimerTaxaSet {
            primer: primer.clone(),
            taxa: taxa.clone(),
            color: palette.get(primer).cloned(),
        })
        .collect();

    CoverageResult {
        coverage: covered.len(),
        covered_taxa: covered.into_iter().map(str::to_string).collect(),
        covered_taxa_by_primer: by_primer,
        overlap_sets,
        covered_records: covered_records.into_iter().cloned().collect(),
        coverage_by_group,
        resolution_summary,
    }
}

/// Number of distinct final identifiers in `records`.
pub fn distinct_taxa(records: &[TaxonRecord]) -> usize {
    records
        .iter()
        .map(|r| r.final_id.as_str())
        .collect::<HashSet<&str>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, group: &str, primers: &[&str]) -> TaxonRecord {
        TaxonRecord::builder(id)
            .taxa_group(group)
            .phylum("P")
            .order("O")
            .family("F")
            .genus("G")
            .primers(primers.iter().copied())
            .build()
            .unwrap()
    }

    fn example_records() -> Vec<TaxonRecord> {
        vec![
            record("T1", "Fish", &["A"]),
            record("T2", "Fish", &["B"]),
            record("T3", "Birds", &["A", "B"]),
        ]
    }

    #[test]
    fn test_single_primer_coverage() {
        let records = example_records();
        let result = compute_coverage(&records, &PrimerSubset::new(["A"]), &PrimerPalette::new());

        assert_eq!(result.coverage, 2);
        assert!(result.is_covered("T1"));
        assert!(result.is_covered("T3"));
        assert!(!result.is_covered("T2"));
        assert_eq!(result.covered_taxa_by_primer["A"], vec!["T1", "T3"]);
        assert_eq!(result.coverage_by_group["Fish"], 1);
        assert_eq!(result.coverage_by_group["Birds"], 1);
        assert_eq!(result.resolution_summary["Species"], 2);
    }

    #[test]
    fn test_attribution_records_every_matching_primer() {
        let records = example_records();
        let result = compute_coverage(
            &records,
            &PrimerSubset::new(["A", "B"]),
            &PrimerPalette::new(),
        );

        assert_eq!(result.coverage, 3);
        assert_eq!(result.covered_taxa_by_primer["A"], vec!["T1", "T3"]);
        assert_eq!(result.covered_taxa_by_primer["B"], vec!["T2", "T3"]);
        assert_eq!(result.covered_records.len(), 3);
    }

    #[test]
    fn test_unused_primer_covers_nothing() {
        let records = example_records();
        let result = compute_coverage(&records, &PrimerSubset::new(["C"]), &PrimerPalette::new());

        assert_eq!(result, CoverageResult::empty());
        assert_eq!(result.fraction_of(3), 0.0);
    }

    #[test]
    fn test_duplicate_final_id_not_double_counted() {
        let mut records = example_records();
        records.push(record("T1", "Fish", &["Z"]));

        let result = compute_coverage(&records, &PrimerSubset::new(["A"]), &PrimerPalette::new());

        assert_eq!(result.coverage, 2);
        assert_eq!(result.covered_records.len(), 3);
        assert_eq!(result.covered_taxa_by_primer["A"], vec!["T1", "T3"]);
        assert_eq!(result.coverage_by_group["Fish"], 1);
        assert_eq!(result.resolution_summary["Species"], 3);
    }

    #[test]
    fn test_overlap_sets_carry_palette_colors() {
        let records = example_records();
        let mut palette = PrimerPalette::new();
        palette.insert("A".to_string(), "#1f77b4".to_string());

        let result = compute_coverage(&records, &PrimerSubset::new(["A", "B"]), &palette);

        assert_eq!(result.overlap_sets.len(), 2);
        assert_eq!(result.overlap_sets[0].primer, "A");
        assert_eq!(result.overlap_sets[0].color.as_deref(), Some("#1f77b4"));
        assert_eq!(result.overlap_sets[1].primer, "B");
        assert_eq!(result.overlap_sets[1].color, None);
    }

    #[test]
    fn test_resolution_summary_buckets() {
        let records = vec![
            record("T1", "Fish", &["A"]),
            TaxonRecord::builder("Salmonidae_sp")
                .taxa_group("Fish")
                .phylum("Chordata")
                .order("Salmoniformes")
                .family("Salmonidae")
                .primer("A")
                .build()
                .unwrap(),
        ];
        let result = compute_coverage(&records, &PrimerSubset::new(["A"]), &PrimerPalette::new());

        assert_eq!(result.resolution_summary["Species"], 1);
        assert_eq!(result.resolution_summary["Genus"], 1);
        assert_eq!(result.coverage_by_group["Fish"], 2);
    }

    #[test]
    fn test_fraction_of() {
        let records = example_records();
        let result = compute_coverage(&records, &PrimerSubset::new(["B"]), &PrimerPalette::new());
        assert!((result.fraction_of(3) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(result.fraction_of(0), 0.0);
    }

    #[test]
    fn test_distinct_taxa() {
        let mut records = example_records();
        records.push(record("T2", "Fish", &["C"]));
        assert_eq!(distinct_taxa(&records), 3);
        assert_eq!(distinct_taxa(&[]), 0);
    }
}
