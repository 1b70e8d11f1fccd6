//! Primer universe, primer subsets and the display palette.

use std::collections::BTreeMap;
use std::fmt;

use hashbrown::HashMap;

use crate::combination::Combinations;
use crate::error::{CoverError, CoverResult};
use crate::record::TaxonRecord;

/// Primer name to display color. Presentational only, never used in scoring.
pub type PrimerPalette = BTreeMap<String, String>;

/// The distinct primers that appear across a record collection.
///
/// Primers keep the order of their first appearance, which fixes the
/// enumeration order of [`PrimerUniverse::combinations`].
#[derive(Debug, Clone, Default)]
pub struct PrimerUniverse {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl PrimerUniverse {
    /// Derives the universe from the detecting primers of `records`.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TaxonRecord>,
    {
        let mut universe = Self::default();
        for record in records {
            for primer in &record.primers {
                universe.register(primer);
            }
        }
        universe
    }

    /// Builds a universe from primer names; duplicates are ignored.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut universe = Self::default();
        for name in names {
            universe.register(name.as_ref());
        }
        universe
    }

    fn register(&mut self, name: &str) {
        if !self.index.contains_key(name) {
            self.index.insert(name.to_string(), self.names.len());
            self.names.push(name.to_string());
        }
    }

    /// Returns the number of distinct primers.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no primer is known.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns primer names in first-appearance order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the name at `index`.
    #[inline]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Returns the index of `name`.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Returns true if `name` is part of the universe.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Materializes the subset for sorted universe indices.
    ///
    /// Out-of-range indices are skipped.
    pub fn subset_from_indices(&self, indices: &[usize]) -> PrimerSubset {
        PrimerSubset {
            primers: indices
                .iter()
                .filter_map(|&i| self.names.get(i).cloned())
                .collect(),
        }
    }

    /// Builds a subset from primer names.
    ///
    /// # Errors
    ///
    /// Returns [`CoverError::UnknownPrimer`] for a name outside the universe.
    pub fn subset<S: AsRef<str>>(&self, names: &[S]) -> CoverResult<PrimerSubset> {
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let idx = self
                .index_of(name)
                .ok_or_else(|| CoverError::UnknownPrimer(name.to_string()))?;
            if !indices.contains(&idx) {
                indices.push(idx);
            }
        }
        indices.sort_unstable();
        Ok(self.subset_from_indices(&indices))
    }

    /// Enumerates every k-subset of the universe as index vectors.
    ///
    /// # Errors
    ///
    /// Returns [`CoverError::InvalidSubsetSize`] unless `1 <= k <= len()`.
    pub fn combinations(&self, k: usize) -> CoverResult<Combinations> {
        if k == 0 || k > self.len() {
            return Err(CoverError::InvalidSubsetSize { k, n: self.len() });
        }
        Ok(Combinations::new(self.len(), k))
    }
}

/// An unordered set of primer names of fixed size.
///
/// Subsets built through a [`PrimerUniverse`] store names in universe
/// order, so two such subsets with the same members compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PrimerSubset {
    primers: Vec<String>,
}

impl PrimerSubset {
    /// Creates a subset from names, dropping duplicates.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut primers: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !primers.contains(&name) {
                primers.push(name);
            }
        }
        Self { primers }
    }

    /// Returns the subset size.
    #[inline]
    pub fn len(&self) -> usize {
        self.primers.len()
    }

    /// Returns true if the subset is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.primers.is_empty()
    }

    /// Returns true if `name` is a member.
    pub fn contains(&self, name: &str) -> bool {
        self.primers.iter().any(|p| p == name)
    }

    /// Returns the member names.
    pub fn names(&self) -> &[String] {
        &self.primers
    }

    /// Iterates over member names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.primers.iter().map(String::as_str)
    }
}

impl fmt::Display for PrimerSubset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.primers.join(", "))
    }
}
