//! k-subset enumeration over a primer universe.
//!
//! Subsets are produced as sorted index vectors by an iterative
//! "odometer" walk: the rightmost index that can still move is bumped and
//! every index to its right is reset to the smallest value that keeps the
//! vector strictly increasing. The walk needs `O(k)` memory regardless of
//! how many subsets exist, so universes of several dozen primers are fine.
//!
//! Enumeration order is lexicographic over indices, which matches
//! "subsets containing element `i` before subsets skipping it":
//!
//! ```text
//! n = 4, k = 2:  [0,1] [0,2] [0,3] [1,2] [1,3] [2,3]
//! ```

/// Iterator over every k-element subset of `0..n`, each exactly once.
///
/// `k == 0` yields a single empty subset; `k > n` yields nothing.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    k: usize,
    indices: Vec<usize>,
    started: bool,
    exhausted: bool,
}

impl Combinations {
    /// Creates a generator for the k-subsets of `0..n`.
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            k,
            indices: (0..k).collect(),
            started: false,
            exhausted: k > n,
        }
    }

    /// Returns the universe size.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Returns the subset size.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Advances to the next subset and borrows it without allocating.
    pub fn next_indices(&mut self) -> Option<&[usize]> {
        if self.exhausted {
            return None;
        }

        if !self.started {
            self.started = true;
            return Some(&self.indices);
        }

        // Rightmost position that has not reached its ceiling n - k + i.
        let k = self.k;
        let n = self.n;
        let pivot = (0..k).rev().find(|&i| self.indices[i] < n - k + i);

        match pivot {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                Some(&self.indices)
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }

    /// Fills `batch` with up to `max` subsets; returns how many were added.
    pub fn next_batch(&mut self, batch: &mut Vec<Vec<usize>>, max: usize) -> usize {
        let mut added = 0;
        while added < max {
            match self.next_indices() {
                Some(indices) => batch.push(indices.to_vec()),
                None => break,
            }
            added += 1;
        }
        added
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_indices().map(<[usize]>::to_vec)
    }
}

/// Number of k-subsets of an n-element set, saturating at `u64::MAX`.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        // acc * (n - i) / (i + 1) stays integral at every step.
        acc = acc * (n - i) as u128 / (i + 1) as u128;
        if acc > u64::MAX as u128 {
            return u64::MAX;
        }
    }
    acc as u64
}
