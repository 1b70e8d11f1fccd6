//! Best-subset selection for one subset size.
//!
//! Enumerates every k-subset of the primer universe, ranks each by its
//! on-target coverage and keeps all subsets at the running maximum. The
//! accumulator is a [`TieSet`], whose [`merge`](TieSet::merge) is
//! associative, so batches can be scored on a worker pool and folded back
//! together in generation order.

use tracing::info;

use crate::config::SearchConfig;
use crate::context::SearchContext;
use crate::error::{SearchError, SearchResult};
use crate::progress::{ProgressGuard, ProgressSink};
use crate::result::PrimerSetResult;

/// Running `(best, all-at-best)` accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TieSet<T> {
    best: usize,
    members: Vec<T>,
}

impl<T> Default for TieSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TieSet<T> {
    /// Creates an empty tie set.
    pub fn new() -> Self {
        Self {
            best: 0,
            members: Vec::new(),
        }
    }

    /// Offers an item: strictly greater resets, equal appends, lesser is
    /// dropped.
    pub fn offer(&mut self, coverage: usize, item: T) {
        self.offer_with(coverage, || item);
    }

    /// Like [`offer`](Self::offer), building the item only when kept.
    pub fn offer_with<F: FnOnce() -> T>(&mut self, coverage: usize, item: F) {
        if self.members.is_empty() || coverage > self.best {
            self.best = coverage;
            self.members.clear();
            self.members.push(item());
        } else if coverage == self.best {
            self.members.push(item());
        }
    }

    /// Combines two accumulators; `self` precedes `other` in generation order.
    pub fn merge(mut self, mut other: Self) -> Self {
        if other.members.is_empty() {
            return self;
        }
        if self.members.is_empty() || other.best > self.best {
            return other;
        }
        if other.best == self.best {
            self.members.append(&mut other.members);
        }
        self
    }

    /// Best coverage seen, zero when empty.
    pub fn best(&self) -> usize {
        self.best
    }

    /// Items at the best coverage, in offer order.
    pub fn members(&self) -> &[T] {
        &self.members
    }

    /// Number of items at the best coverage.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if nothing was offered.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Splits into best coverage and members.
    pub fn into_parts(self) -> (usize, Vec<T>) {
        (self.best, self.members)
    }
}

/// Outcome of one size.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeSelection {
    /// Subset size.
    pub n_primers: usize,
    /// Best on-target coverage.
    pub best: usize,
    /// Every subset at `best`, with display identities.
    pub results: Vec<PrimerSetResult>,
}

/// Drives enumeration and scoring for one subset size.
pub(crate) struct BestSubsetSelector<'c, 'p> {
    ctx: &'c SearchContext<'p>,
    config: &'c SearchConfig,
}

impl<'c, 'p> BestSubsetSelector<'c, 'p> {
    pub(crate) fn new(ctx: &'c SearchContext<'p>, config: &'c SearchConfig) -> Self {
        Self { ctx, config }
    }

    /// Selects every best subset of size `k`.
    pub(crate) fn select(
        &self,
        k: usize,
        guard: &mut ProgressGuard<'_>,
        sink: &mut dyn ProgressSink,
    ) -> SearchResult<SizeSelection> {
        let ties = if self.config.runs_parallel() {
            self.rank_parallel(k, guard, sink)?
        } else {
            self.rank_sequential(k, guard, sink)?
        };

        let (best, members) = ties.into_parts();
        info!(
            n_primers = k,
            best_coverage = best,
            ties = members.len(),
            "size ranked"
        );
        let results = self.materialize(k, best, &members)?;

        Ok(SizeSelection {
            n_primers: k,
            best,
            results,
        })
    }

    fn rank_sequential(
        &self,
        k: usize,
        guard: &mut ProgressGuard<'_>,
        sink: &mut dyn ProgressSink,
    ) -> SearchResult<TieSet<Vec<usize>>> {
        let index = self.ctx.index();
        let mut combos = self.ctx.universe().combinations(k)?;
        let mut ties = TieSet::new();

        while let Some(indices) = combos.next_indices() {
            let coverage = index.coverage(indices);
            ties.offer_with(coverage, || indices.to_vec());
            guard.advance(1, k, sink)?;
        }
        Ok(ties)
    }

    #[cfg(feature = "parallel")]
    fn rank_parallel(
        &self,
        k: usize,
        guard: &mut ProgressGuard<'_>,
        sink: &mut dyn ProgressSink,
    ) -> SearchResult<TieSet<Vec<usize>>> {
        use rayon::prelude::*;

        let index = self.ctx.index();
        let batch_size = self.config.parallel_batch_size();
        let mut combos = self.ctx.universe().combinations(k)?;
        let mut batch: Vec<Vec<usize>> = Vec::with_capacity(batch_size);
        let mut ties = TieSet::new();

        loop {
            batch.clear();
            let produced = combos.next_batch(&mut batch, batch_size);
            if produced == 0 {
                break;
            }

            let part = batch
                .par_iter()
                .fold(TieSet::new, |mut acc, indices| {
                    acc.offer_with(index.coverage(indices), || indices.clone());
                    acc
                })
                .reduce(TieSet::new, TieSet::merge);
            ties = ties.merge(part);

            guard.advance(produced as u64, k, sink)?;
        }
        Ok(ties)
    }

    #[cfg(not(feature = "parallel"))]
    fn rank_parallel(
        &self,
        k: usize,
        guard: &mut ProgressGuard<'_>,
        sink: &mut dyn ProgressSink,
    ) -> SearchResult<TieSet<Vec<usize>>> {
        self.rank_sequential(k, guard, sink)
    }

    /// Builds full results for the surviving index vectors.
    fn materialize(
        &self,
        k: usize,
        best: usize,
        members: &[Vec<usize>],
    ) -> SearchResult<Vec<PrimerSetResult>> {
        members
            .iter()
            .enumerate()
            .map(|(ordinal, indices)| {
                let primers = self.ctx.universe().subset_from_indices(indices);
                let on_target = self.ctx.on_target(&primers);
                if on_target.coverage != best {
                    return Err(SearchError::Computation(format!(
                        "subset {} scored {} but was ranked at {}",
                        primers, on_target.coverage, best
                    )));
                }
                let (off_target, total) = self.ctx.off_target_and_total(&primers, &on_target);

                Ok(PrimerSetResult {
                    id: PrimerSetResult::display_id(k, ordinal),
                    n_primers: k,
                    primers,
                    on_target,
                    off_target,
                    total,
                })
            })
            .collect()
    }
}
