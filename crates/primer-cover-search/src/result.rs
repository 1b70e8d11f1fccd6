//! Search output types.

use std::collections::BTreeMap;
use std::time::Duration;

use primer_cover::{CoverageResult, PrimerSubset, TaxonRecord};

/// One member of a size's tie set.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PrimerSetResult {
    /// Display identity `"{size}-{ordinal}"`, ordinal starting at 1.
    pub id: String,
    /// Subset size.
    pub n_primers: usize,
    /// The primers of the subset.
    pub primers: PrimerSubset,
    /// Coverage of the target records.
    pub on_target: CoverageResult,
    /// Coverage of the non-target records, when requested.
    #[cfg_attr(feature = "serde", serde(default))]
    pub off_target: Option<CoverageResult>,
    /// Coverage of all records, when requested.
    #[cfg_attr(feature = "serde", serde(default))]
    pub total: Option<CoverageResult>,
}

impl PrimerSetResult {
    /// Builds the display identity of the `ordinal`-th (0-based) tie of size `k`.
    pub fn display_id(k: usize, ordinal: usize) -> String {
        format!("{}-{}", k, ordinal + 1)
    }

    /// On-target coverage count.
    pub fn coverage(&self) -> usize {
        self.on_target.coverage
    }
}

/// Results for one subset size.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SizeSummary {
    /// Subset size.
    pub n_primers: usize,
    /// Best on-target coverage at this size.
    pub coverage: usize,
    /// `coverage` divided by the number of distinct target taxa.
    pub coverage_fraction: f64,
    /// Every subset reaching `coverage`, in generation order.
    pub results: Vec<PrimerSetResult>,
    /// Mean on-target coverage per taxa group over the tie set.
    pub avg_coverage_by_group: BTreeMap<String, f64>,
    /// Mean off-target coverage per taxa group, when requested.
    #[cfg_attr(feature = "serde", serde(default))]
    pub avg_coverage_by_group_off_target: Option<BTreeMap<String, f64>>,
    /// Mean total coverage per taxa group, when requested.
    #[cfg_attr(feature = "serde", serde(default))]
    pub avg_coverage_by_group_total: Option<BTreeMap<String, f64>>,
}

impl SizeSummary {
    /// Number of tied subsets.
    pub fn tie_count(&self) -> usize {
        self.results.len()
    }

    /// Returns true if every target taxon is covered.
    pub fn is_full_coverage(&self, target_taxa: usize) -> bool {
        self.coverage == target_taxa
    }
}

/// Averages per-group coverage over a tie set.
///
/// Every taxa group present in `seed` starts at zero, so groups no tied
/// subset touches still appear. Groups only seen in `maps` are added too.
pub fn average_coverage_by_group<'a, I>(seed: &[TaxonRecord], maps: I) -> BTreeMap<String, f64>
where
    I: IntoIterator<Item = &'a BTreeMap<String, usize>>,
{
    let mut sums: BTreeMap<String, f64> = seed
        .iter()
        .map(|r| (r.taxa_group().to_string(), 0.0))
        .collect();

    let mut count = 0usize;
    for map in maps {
        count += 1;
        for (group, covered) in map {
            *sums.entry(group.clone()).or_insert(0.0) += *covered as f64;
        }
    }

    if count > 0 {
        for value in sums.values_mut() {
            *value /= count as f64;
        }
    }
    sums
}

/// Timing and volume of a finished search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    /// Wall-clock duration.
    pub duration: Duration,
    /// Combinations actually evaluated.
    pub combinations_evaluated: u64,
    /// Combinations planned up to the requested maximum size.
    pub planned_combinations: u64,
    /// Number of sizes explored.
    pub sizes_explored: usize,
    /// True if full coverage stopped the search before the largest size.
    pub terminated_early: bool,
}

/// Output of a search: per-size summaries, largest size first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutput {
    /// Summaries ordered by descending subset size.
    pub summaries: Vec<SizeSummary>,
    /// Search statistics.
    pub stats: SearchStats,
}

impl SearchOutput {
    /// Number of sizes in the output.
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    /// Returns true if no size was explored.
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Iterates summaries, largest size first.
    pub fn iter(&self) -> impl Iterator<Item = &SizeSummary> {
        self.summaries.iter()
    }

    /// Returns the summary for subset size `k`.
    pub fn for_size(&self, k: usize) -> Option<&SizeSummary> {
        self.summaries.iter().find(|s| s.n_primers == k)
    }

    /// Consumes the output, returning the summaries.
    pub fn into_summaries(self) -> Vec<SizeSummary> {
        self.summaries
    }
}

impl<'a> IntoIterator for &'a SearchOutput {
    type Item = &'a SizeSummary;
    type IntoIter = std::slice::Iter<'a, SizeSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.summaries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouped(id: &str, group: &str) -> TaxonRecord {
        TaxonRecord::builder(id)
            .taxa_group(group)
            .primer("A")
            .build()
            .unwrap()
    }

    #[test]
    fn test_display_id() {
        assert_eq!(PrimerSetResult::display_id(2, 0), "2-1");
        assert_eq!(PrimerSetResult::display_id(3, 4), "3-5");
    }

    #[test]
    fn test_average_seeds_every_group() {
        let seed = vec![grouped("T1", "Fungi"), grouped("T2", "Metazoa")];
        let mut first = BTreeMap::new();
        first.insert("Fungi".to_string(), 2);
        let mut second = BTreeMap::new();
        second.insert("Fungi".to_string(), 1);

        let avg = average_coverage_by_group(&seed, [&first, &second]);
        assert_eq!(avg.get("Fungi"), Some(&1.5));
        assert_eq!(avg.get("Metazoa"), Some(&0.0));
    }

    #[test]
    fn test_average_includes_unseeded_groups() {
        let seed = vec![grouped("T1", "Fungi")];
        let mut map = BTreeMap::new();
        map.insert("Plantae".to_string(), 4);

        let avg = average_coverage_by_group(&seed, [&map]);
        assert_eq!(avg.get("Plantae"), Some(&4.0));
        assert_eq!(avg.get("Fungi"), Some(&0.0));
    }

    #[test]
    fn test_average_empty_tie_set() {
        let seed = vec![grouped("T1", "Fungi")];
        let avg = average_coverage_by_group(&seed, std::iter::empty::<&BTreeMap<String, usize>>());
        assert_eq!(avg.get("Fungi"), Some(&0.0));
    }

    #[test]
    fn test_output_lookup() {
        let summary = |k| SizeSummary {
            n_primers: k,
            coverage: k,
            coverage_fraction: 0.5,
            results: Vec::new(),
            avg_coverage_by_group: BTreeMap::new(),
            avg_coverage_by_group_off_target: None,
            avg_coverage_by_group_total: None,
        };
        let output = SearchOutput {
            summaries: vec![summary(2), summary(1)],
            stats: SearchStats::default(),
        };

        assert_eq!(output.len(), 2);
        assert_eq!(output.for_size(1).map(|s| s.coverage), Some(1));
        assert!(output.for_size(3).is_none());
        assert_eq!(output.iter().next().map(|s| s.n_primers), Some(2));
    }
}
