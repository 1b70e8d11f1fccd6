//! Search planning: which subset sizes to explore and how many combinations
//! each one costs.
//!
//! The plan's grand total is the denominator of every progress percentage,
//! so it counts all sizes up to the cap even though early termination may
//! skip the larger ones.

use std::fmt;

use primer_cover::binomial;

/// The sizes a search will explore, with combination counts.
///
/// # Example
///
/// ```rust
/// use primer_cover_search::SearchPlan;
///
/// let plan = SearchPlan::new(5, 3);
/// assert_eq!(plan.max_primers_needed, 3);
/// assert_eq!(plan.total_combinations, 5 + 10 + 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    /// Number of distinct primers detecting at least one target.
    pub universe_size: usize,
    /// Largest subset size the caller asked for.
    pub requested_max: usize,
    /// `min(requested_max, universe_size)`.
    pub max_primers_needed: usize,
    /// One step per size, ascending.
    pub steps: Vec<SizeStep>,
    /// Sum of all step combination counts, saturating.
    pub total_combinations: u64,
}

impl SearchPlan {
    /// Plans a search over `universe_size` primers capped at `requested_max`.
    pub fn new(universe_size: usize, requested_max: usize) -> Self {
        let max_primers_needed = requested_max.min(universe_size);
        let steps: Vec<SizeStep> = (1..=max_primers_needed)
            .map(|k| SizeStep::new(k, binomial(universe_size, k)))
            .collect();
        let total_combinations = steps
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(s.combinations));

        Self {
            universe_size,
            requested_max,
            max_primers_needed,
            steps,
            total_combinations,
        }
    }

    /// Returns true if there is nothing to explore.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Combinations evaluated once every size up to `k` has finished.
    pub fn combinations_through(&self, k: usize) -> u64 {
        self.steps
            .iter()
            .take_while(|s| s.n_primers <= k)
            .fold(0u64, |acc, s| acc.saturating_add(s.combinations))
    }

    /// Returns the step for subset size `k`.
    pub fn step(&self, k: usize) -> Option<&SizeStep> {
        self.steps.get(k.checked_sub(1)?)
    }
}

impl fmt::Display for SearchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Search plan: {} primers, sizes 1..={} (requested {})",
            self.universe_size, self.max_primers_needed, self.requested_max
        )?;
        writeln!(f, "Total combinations: {}", self.total_combinations)?;
        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }
        Ok(())
    }
}

/// One subset size in a [`SearchPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeStep {
    /// Subset size.
    pub n_primers: usize,
    /// Number of subsets of this size.
    pub combinations: u64,
}

impl SizeStep {
    /// Creates a new size step.
    pub fn new(n_primers: usize, combinations: u64) -> Self {
        Self {
            n_primers,
            combinations,
        }
    }
}

impl fmt::Display for SizeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} primers: {} combinations",
            self.n_primers, self.combinations
        )
    }
}
