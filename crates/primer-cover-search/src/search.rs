//! Search orchestrator.
//!
//! Explores subset sizes in ascending order, one [`SizeSummary`] per size,
//! and stops as soon as a size covers every distinct target taxon. The
//! summaries are returned largest size first.

use primer_cover::PrimerUniverse;
use tracing::{info, warn};

use crate::config::SearchConfig;
use crate::context::SearchContext;
use crate::error::{SearchError, SearchResult};
use crate::params::SearchParameters;
use crate::plan::SearchPlan;
use crate::progress::{CancellationToken, NoProgress, ProgressGuard, ProgressSink};
use crate::result::{average_coverage_by_group, SearchOutput, SearchStats, SizeSummary};
use crate::selector::{BestSubsetSelector, SizeSelection};

/// Exhaustive primer set search.
///
/// # Example
///
/// ```rust
/// use primer_cover::TaxonRecord;
/// use primer_cover_search::{PrimerSearch, SearchParameters};
///
/// let records = vec![
///     TaxonRecord::builder("T1").primer("A").build().unwrap(),
///     TaxonRecord::builder("T2").primer("B").build().unwrap(),
///     TaxonRecord::builder("T3").primers(["A", "B"]).build().unwrap(),
/// ];
/// let params = SearchParameters::new(records.clone(), records, 3);
///
/// let output = PrimerSearch::new().run(&params).unwrap();
///
/// // Size 2 already covers everything, so size 3 is never explored.
/// assert_eq!(output.len(), 2);
/// assert_eq!(output.summaries[0].n_primers, 2);
/// assert_eq!(output.summaries[0].coverage, 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrimerSearch {
    config: SearchConfig,
}

impl PrimerSearch {
    /// Creates a search with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a search with the given configuration.
    pub fn with_config(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Plans the search without running it.
    pub fn plan(&self, params: &SearchParameters) -> SearchResult<SearchPlan> {
        params.validate()?;
        let universe = PrimerUniverse::from_records(&params.selected_records);
        Ok(SearchPlan::new(universe.len(), params.max_primers))
    }

    /// Runs the search without progress reporting or cancellation.
    pub fn run(&self, params: &SearchParameters) -> SearchResult<SearchOutput> {
        self.run_with_progress(params, &mut NoProgress, &CancellationToken::new())
    }

    /// Runs the search, reporting progress to `sink` and honoring `cancel`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidParameters`] for parameters rejected by
    ///   [`SearchParameters::validate`]
    /// - [`SearchError::TooManyCombinations`] if the plan exceeds
    ///   [`SearchConfig::max_combinations`]
    /// - [`SearchError::Cancelled`] or [`SearchError::Timeout`] when
    ///   stopped; no partial output is returned
    /// - [`SearchError::Computation`] if a tied subset fails to reproduce
    ///   its ranked coverage
    pub fn run_with_progress(
        &self,
        params: &SearchParameters,
        sink: &mut dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> SearchResult<SearchOutput> {
        params.validate()?;

        let ctx = SearchContext::new(params);
        let plan = SearchPlan::new(ctx.universe().len(), params.max_primers);
        if let Some(limit) = self.config.max_combinations {
            if plan.total_combinations > limit {
                return Err(SearchError::TooManyCombinations {
                    count: plan.total_combinations,
                    limit,
                });
            }
        }

        info!(
            targets = params.selected_records.len(),
            target_taxa = ctx.target_taxa(),
            primers = plan.universe_size,
            max_primers_needed = plan.max_primers_needed,
            total_combinations = plan.total_combinations,
            parallel = self.config.runs_parallel(),
            "search started"
        );

        let mut guard = ProgressGuard::new(
            plan.total_combinations,
            self.config.progress_every,
            cancel,
            self.config.timeout,
        );
        let selector = BestSubsetSelector::new(&ctx, &self.config);

        let mut summaries = Vec::with_capacity(plan.steps.len());
        let mut previous_best: Option<usize> = None;
        let mut terminated_early = false;

        for step in &plan.steps {
            let k = step.n_primers;
            guard.check()?;
            info!(
                n_primers = k,
                max_primers_needed = plan.max_primers_needed,
                combinations = step.combinations,
                "size started"
            );

            let selection = selector.select(k, &mut guard, sink)?;
            if let Some(previous) = previous_best {
                if selection.best < previous {
                    warn!(
                        n_primers = k,
                        best = selection.best,
                        previous,
                        "coverage decreased with more primers; early termination is unsound"
                    );
                }
            }
            previous_best = Some(selection.best);

            let summary = summarize(&ctx, selection);
            info!(
                n_primers = k,
                coverage = summary.coverage,
                coverage_fraction = summary.coverage_fraction,
                ties = summary.tie_count(),
                "size finished"
            );
            guard.finish_size(k, sink);

            let full = summary.is_full_coverage(ctx.target_taxa());
            summaries.push(summary);
            if full {
                terminated_early = k < plan.max_primers_needed;
                if terminated_early {
                    info!(n_primers = k, "full coverage reached, skipping larger sizes");
                }
                break;
            }
        }

        summaries.reverse();
        let stats = SearchStats {
            duration: guard.elapsed(),
            combinations_evaluated: guard.tried(),
            planned_combinations: plan.total_combinations,
            sizes_explored: summaries.len(),
            terminated_early,
        };
        info!(
            sizes = stats.sizes_explored,
            combinations = stats.combinations_evaluated,
            duration_ms = stats.duration.as_millis() as u64,
            "search finished"
        );

        Ok(SearchOutput { summaries, stats })
    }
}

/// Builds the summary of one size from its selection.
fn summarize(ctx: &SearchContext<'_>, selection: SizeSelection) -> SizeSummary {
    let params = ctx.params();
    let target_taxa = ctx.target_taxa();
    let coverage_fraction = if target_taxa == 0 {
        0.0
    } else {
        selection.best as f64 / target_taxa as f64
    };

    let avg_coverage_by_group = average_coverage_by_group(
        &params.selected_records,
        selection.results.iter().map(|r| &r.on_target.coverage_by_group),
    );

    let (avg_off_target, avg_total) = if params.include_off_target_taxa {
        let off = average_coverage_by_group(
            ctx.off_target_records(),
            selection
                .results
                .iter()
                .filter_map(|r| r.off_target.as_ref())
                .map(|c| &c.coverage_by_group),
        );
        let total = average_coverage_by_group(
            &params.all_records,
            selection
                .results
                .iter()
                .filter_map(|r| r.total.as_ref())
                .map(|c| &c.coverage_by_group),
        );
        (Some(off), Some(total))
    } else {
        (None, None)
    };

    SizeSummary {
        n_primers: selection.n_primers,
        coverage: selection.best,
        coverage_fraction,
        results: selection.results,
        avg_coverage_by_group,
        avg_coverage_by_group_off_target: avg_off_target,
        avg_coverage_by_group_total: avg_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Progress;
    use primer_cover::TaxonRecord;

    fn record(id: &str, group: &str, primers: &[&str]) -> TaxonRecord {
        TaxonRecord::builder(id)
            .taxa_group(group)
            .primers(primers.iter().copied())
            .build()
            .unwrap()
    }

    fn example_a() -> SearchParameters {
        let records = vec![
            record("T1", "Fungi", &["A"]),
            record("T2", "Fungi", &["B"]),
            record("T3", "Metazoa", &["A", "B"]),
            record("T4", "Metazoa", &["C"]),
        ];
        SearchParameters::new(records.clone(), records, 3)
    }

    #[test]
    fn test_plan() {
        let plan = PrimerSearch::new().plan(&example_a()).unwrap();
        assert_eq!(plan.universe_size, 3);
        assert_eq!(plan.total_combinations, 7);
    }

    #[test]
    fn test_run_explores_until_full_coverage() {
        let output = PrimerSearch::new().run(&example_a()).unwrap();

        let sizes: Vec<usize> = output.iter().map(|s| s.n_primers).collect();
        assert_eq!(sizes, vec![3, 2, 1]);
        assert_eq!(output.for_size(1).map(|s| s.coverage), Some(2));
        assert_eq!(output.for_size(2).map(|s| s.coverage), Some(3));
        assert_eq!(output.for_size(3).map(|s| s.coverage), Some(4));
        assert!(!output.stats.terminated_early);
        assert_eq!(output.stats.combinations_evaluated, 7);
    }

    #[test]
    fn test_summary_averages() {
        let output = PrimerSearch::new().run(&example_a()).unwrap();
        let one = output.for_size(1).unwrap();

        // {A} covers T1, T3; {B} covers T2, T3.
        assert_eq!(one.tie_count(), 2);
        assert_eq!(one.avg_coverage_by_group.get("Fungi"), Some(&1.0));
        assert_eq!(one.avg_coverage_by_group.get("Metazoa"), Some(&1.0));
        assert!(one.avg_coverage_by_group_off_target.is_none());
    }

    #[test]
    fn test_monotone_best_coverage() {
        let output = PrimerSearch::new().run(&example_a()).unwrap();
        let coverages: Vec<usize> = output.iter().collect::<Vec<_>>().into_iter().rev().map(|s| s.coverage).collect();
        assert!(coverages.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_progress_reaches_100_at_end() {
        let mut seen: Vec<Progress> = Vec::new();
        let mut sink = |p: Progress| seen.push(p);
        PrimerSearch::new()
            .run_with_progress(&example_a(), &mut sink, &CancellationToken::new())
            .unwrap();

        assert_eq!(seen.len(), 3);
        assert_eq!(seen.last().map(|p| p.percent), Some(100.0));
        assert!(seen.windows(2).all(|w| w[0].percent <= w[1].percent));
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let result =
            PrimerSearch::new().run_with_progress(&example_a(), &mut NoProgress, &token);
        assert_eq!(result, Err(SearchError::Cancelled));
    }

    #[test]
    fn test_too_many_combinations() {
        let config = SearchConfig::builder().with_max_combinations(5).build();
        let search = PrimerSearch::with_config(config);
        let result = search.run(&example_a());
        assert_eq!(
            result,
            Err(SearchError::TooManyCombinations { count: 7, limit: 5 })
        );
    }

    #[test]
    fn test_invalid_parameters() {
        let params = SearchParameters::new(Vec::new(), Vec::new(), 3);
        assert!(matches!(
            PrimerSearch::new().run(&params),
            Err(SearchError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_no_primers_gives_empty_output() {
        let records = vec![record("T1", "Fungi", &[])];
        let params = SearchParameters::new(records.clone(), records, 2);
        let output = PrimerSearch::new().run(&params).unwrap();
        assert!(output.is_empty());
    }
}
