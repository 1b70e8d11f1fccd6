//! Roaring bitmap index for fast on-target coverage counts.
//!
//! Each primer of the universe gets a bitmap of the distinct taxa it
//! detects. The coverage of a subset is then the cardinality of the union
//! of its members' bitmaps, which is what the selector needs to rank
//! subsets. Full [`CoverageResult`](primer_cover::CoverageResult)s are only
//! computed for the subsets that survive.

use hashbrown::HashMap;
use primer_cover::{PrimerUniverse, TaxonRecord};
use roaring::RoaringBitmap;

/// Registry that maps final identifiers to compact `u32` indices.
///
/// Records sharing a final identifier share an index, so a taxon counts
/// once no matter how many records describe it.
#[derive(Debug, Clone, Default)]
pub struct TaxonRegistry {
    id_to_index: HashMap<String, u32>,
    index_to_id: Vec<String>,
}

impl TaxonRegistry {
    /// Creates a registry from the final identifiers of `records`.
    pub fn from_records(records: &[TaxonRecord]) -> Self {
        let mut registry = Self::default();
        for record in records {
            registry.register(&record.final_id);
        }
        registry
    }

    /// Registers a final identifier and returns its index.
    ///
    /// If the identifier is already registered, returns the existing index.
    pub fn register(&mut self, final_id: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(final_id) {
            return idx;
        }
        let idx = self.index_to_id.len() as u32;
        self.id_to_index.insert(final_id.to_string(), idx);
        self.index_to_id.push(final_id.to_string());
        idx
    }

    /// Gets the index of a final identifier.
    #[inline]
    pub fn get_index(&self, final_id: &str) -> Option<u32> {
        self.id_to_index.get(final_id).copied()
    }

    /// Gets the final identifier at an index.
    #[inline]
    pub fn get_final_id(&self, index: u32) -> Option<&str> {
        self.index_to_id.get(index as usize).map(String::as_str)
    }

    /// Returns the number of distinct taxa.
    #[inline]
    pub fn len(&self) -> usize {
        self.index_to_id.len()
    }

    /// Returns true if no taxon is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index_to_id.is_empty()
    }
}

/// Per-primer taxon bitmaps over one record collection.
#[derive(Debug, Clone)]
pub struct CoverageIndex {
    registry: TaxonRegistry,
    primer_taxa: Vec<RoaringBitmap>,
}

impl CoverageIndex {
    /// Builds the index of `records` for every primer of `universe`.
    ///
    /// Primers outside the universe are ignored.
    pub fn build(records: &[TaxonRecord], universe: &PrimerUniverse) -> Self {
        let registry = TaxonRegistry::from_records(records);
        let mut primer_taxa = vec![RoaringBitmap::new(); universe.len()];

        for record in records {
            let Some(taxon) = registry.get_index(&record.final_id) else {
                continue;
            };
            for primer in &record.primers {
                if let Some(p) = universe.index_of(primer) {
                    primer_taxa[p].insert(taxon);
                }
            }
        }

        Self {
            registry,
            primer_taxa,
        }
    }

    /// Returns the taxon registry.
    pub fn registry(&self) -> &TaxonRegistry {
        &self.registry
    }

    /// Returns the number of distinct taxa in the indexed collection.
    pub fn taxa_count(&self) -> usize {
        self.registry.len()
    }

    /// Returns the taxa detected by the primer at universe index `primer`.
    pub fn primer_taxa(&self, primer: usize) -> Option<&RoaringBitmap> {
        self.primer_taxa.get(primer)
    }

    /// Number of distinct taxa covered by the primers at `indices`.
    ///
    /// Out-of-range indices contribute nothing.
    pub fn coverage(&self, indices: &[usize]) -> usize {
        match indices {
            [] => 0,
            [only] => self.primer_taxa.get(*only).map_or(0, |b| b.len() as usize),
            [first, rest @ ..] => {
                let mut union = self.primer_taxa.get(*first).cloned().unwrap_or_default();
                for &i in rest {
                    if let Some(bitmap) = self.primer_taxa.get(i) {
                        union |= bitmap;
                    }
                }
                union.len() as usize
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primer_cover::{compute_coverage, Combinations, PrimerPalette};

    fn record(id: &str, primers: &[&str]) -> TaxonRecord {
        TaxonRecord::builder(id)
            .primers(primers.iter().copied())
            .build()
            .unwrap()
    }

    fn example() -> (Vec<TaxonRecord>, PrimerUniverse) {
        let records = vec![
            record("T1", &["A"]),
            record("T2", &["B"]),
            record("T3", &["A", "B"]),
            record("T4", &["C", "D"]),
        ];
        let universe = PrimerUniverse::from_records(&records);
        (records, universe)
    }

    #[test]
    fn test_registry_dedupes() {
        let mut registry = TaxonRegistry::default();
        assert_eq!(registry.register("T1"), 0);
        assert_eq!(registry.register("T2"), 1);
        assert_eq!(registry.register("T1"), 0);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_final_id(1), Some("T2"));
        assert_eq!(registry.get_index("T3"), None);
    }

    #[test]
    fn test_single_primer_coverage() {
        let (records, universe) = example();
        let index = CoverageIndex::build(&records, &universe);

        assert_eq!(index.taxa_count(), 4);
        assert_eq!(index.coverage(&[0]), 2);
        assert_eq!(index.coverage(&[1]), 2);
        assert_eq!(index.coverage(&[]), 0);
        assert_eq!(index.coverage(&[99]), 0);
    }

    #[test]
    fn test_union_coverage() {
        let (records, universe) = example();
        let index = CoverageIndex::build(&records, &universe);

        assert_eq!(index.coverage(&[0, 1]), 3);
        assert_eq!(index.coverage(&[2, 3]), 1);
        assert_eq!(index.coverage(&[0, 1, 2]), 4);
    }

    #[test]
    fn test_duplicate_records_count_once() {
        let records = vec![record("T1", &["A"]), record("T1", &["B"])];
        let universe = PrimerUniverse::from_records(&records);
        let index = CoverageIndex::build(&records, &universe);

        assert_eq!(index.coverage(&[0]), 1);
        assert_eq!(index.coverage(&[1]), 1);
        assert_eq!(index.coverage(&[0, 1]), 1);
    }

    #[test]
    fn test_agrees_with_evaluator() {
        let (records, universe) = example();
        let index = CoverageIndex::build(&records, &universe);
        let palette = PrimerPalette::new();

        for k in 1..=universe.len() {
            for indices in Combinations::new(universe.len(), k) {
                let subset = universe.subset_from_indices(&indices);
                let full = compute_coverage(&records, &subset, &palette);
                assert_eq!(index.coverage(&indices), full.coverage);
            }
        }
    }
}
