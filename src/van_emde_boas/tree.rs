//! The van Emde Boas tree.
//!
//! Follows the CLRS presentation: each node covers a universe `0..u`, keeps
//! its minimum and maximum directly, and for `u > 2` delegates everything
//! else to √u clusters of universe √u plus a summary tree over the cluster
//! indices. The minimum is *hoisted*: it is never stored in a cluster, which
//! is what makes inserting into an empty subtree O(1) and keeps every
//! operation at one real recursive call per level.

use serde::{Deserialize, Serialize};

/// Returns `true` for universes of the form 2^(2^k): a power of two whose
/// exponent is itself a power of two, so the √u split stays exact all the
/// way down.
fn valid_universe(universe: usize) -> bool {
    universe >= 2 && universe.is_power_of_two() && universe.trailing_zeros().is_power_of_two()
}

/// van Emde Boas tree over the integer universe `0..u`.
///
/// # Example
/// ```
/// use ordkit::VanEmdeBoasTree;
///
/// let mut set = VanEmdeBoasTree::new(16);
/// for x in [2, 3, 7, 10] {
///     set.insert(x);
/// }
/// assert!(set.member(7));
/// assert_eq!(set.successor(3), Some(7));
/// assert_eq!(set.predecessor(7), Some(3));
/// assert_eq!(set.minimum(), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VanEmdeBoasTree {
    universe: usize,
    min: Option<usize>,
    max: Option<usize>,
    summary: Option<Box<VanEmdeBoasTree>>,
    clusters: Vec<VanEmdeBoasTree>,
}

impl VanEmdeBoasTree {
    /// Creates an empty tree over `0..universe`, allocating the whole
    /// recursive decomposition up front.
    ///
    /// # Panics
    /// Panics unless `universe` is of the form 2^(2^k) (2, 4, 16, 256, …).
    pub fn new(universe: usize) -> Self {
        assert!(
            valid_universe(universe),
            "universe size must be of the form 2^(2^k), got {}",
            universe
        );
        if universe == 2 {
            Self {
                universe,
                min: None,
                max: None,
                summary: None,
                clusters: Vec::new(),
            }
        } else {
            let root = 1usize << (universe.trailing_zeros() / 2);
            Self {
                universe,
                min: None,
                max: None,
                summary: Some(Box::new(Self::new(root))),
                clusters: (0..root).map(|_| Self::new(root)).collect(),
            }
        }
    }

    /// The universe size this tree was built over.
    pub fn universe_size(&self) -> usize {
        self.universe
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    /// The smallest member, or `None` when empty. O(1).
    pub fn minimum(&self) -> Option<usize> {
        self.min
    }

    /// The largest member, or `None` when empty. O(1).
    pub fn maximum(&self) -> Option<usize> {
        self.max
    }

    /// Returns `true` if `x` is in the set.
    ///
    /// # Complexity
    /// - Time: O(log log u)
    pub fn member(&self, x: usize) -> bool {
        self.check_key(x);
        if Some(x) == self.min || Some(x) == self.max {
            true
        } else if self.universe == 2 {
            false
        } else {
            self.clusters[self.high(x)].member(self.low(x))
        }
    }

    /// Adds `x` to the set. Inserting a key that is already present is a
    /// no-op.
    ///
    /// # Complexity
    /// - Time: O(log log u)
    pub fn insert(&mut self, x: usize) {
        self.check_key(x);
        let mut x = x;
        match self.min {
            // Empty tree: this fast path is what keeps the empty-cluster
            // insert below O(1).
            None => {
                self.min = Some(x);
                self.max = Some(x);
                return;
            }
            Some(min) if x == min => return,
            // The incoming key displaces the hoisted minimum, and the old
            // minimum is the one pushed down into a cluster.
            Some(min) if x < min => {
                self.min = Some(x);
                x = min;
            }
            Some(_) => {}
        }

        if self.universe > 2 {
            let high = self.high(x);
            let low = self.low(x);
            if self.clusters[high].minimum().is_none() {
                if let Some(summary) = self.summary.as_mut() {
                    summary.insert(high);
                }
            }
            self.clusters[high].insert(low);
        }

        if x > self.max.expect("non-empty tree has a maximum") {
            self.max = Some(x);
        }
    }

    /// Removes `x` from the set. Deleting a key that is not present is a
    /// no-op.
    ///
    /// # Complexity
    /// - Time: O(log log u)
    pub fn delete(&mut self, x: usize) {
        self.check_key(x);
        if self.min.is_none() {
            return;
        }
        if self.min == self.max {
            if Some(x) == self.min {
                self.min = None;
                self.max = None;
            }
            return;
        }
        if self.universe == 2 {
            // Both 0 and 1 are present; keep the other one.
            self.min = Some(if x == 0 { 1 } else { 0 });
            self.max = self.min;
            return;
        }

        let mut x = x;
        if Some(x) == self.min {
            // The hoisted minimum has no copy in any cluster. Promote the
            // next element to min and fall through to delete its cluster
            // copy instead.
            let first_cluster = self
                .summary
                .as_ref()
                .and_then(|summary| summary.minimum())
                .expect("a tree with two or more elements has an occupied cluster");
            let offset = self.clusters[first_cluster]
                .minimum()
                .expect("summary reported an occupied cluster");
            x = self.index(first_cluster, offset);
            self.min = Some(x);
        }

        let high = self.high(x);
        let low = self.low(x);
        self.clusters[high].delete(low);

        if self.clusters[high].is_empty() {
            if let Some(summary) = self.summary.as_mut() {
                summary.delete(high);
            }
            if Some(x) == self.max {
                match self.summary.as_ref().and_then(|summary| summary.maximum()) {
                    Some(last_cluster) => {
                        let offset = self.clusters[last_cluster]
                            .maximum()
                            .expect("summary reported an occupied cluster");
                        self.max = Some(self.index(last_cluster, offset));
                    }
                    // Only the hoisted minimum is left.
                    None => self.max = self.min,
                }
            }
        } else if Some(x) == self.max {
            let offset = self.clusters[high]
                .maximum()
                .expect("cluster is non-empty");
            self.max = Some(self.index(high, offset));
        }
    }

    /// The smallest member strictly greater than `x`, or `None`.
    ///
    /// # Complexity
    /// - Time: O(log log u)
    pub fn successor(&self, x: usize) -> Option<usize> {
        self.check_key(x);
        if self.universe == 2 {
            return if x == 0 && self.max == Some(1) {
                Some(1)
            } else {
                None
            };
        }
        if let Some(min) = self.min {
            if x < min {
                return Some(min);
            }
        }

        let high = self.high(x);
        let low = self.low(x);
        let max_in_cluster = self.clusters[high].maximum();
        if max_in_cluster.map_or(false, |max| low < max) {
            let offset = self.clusters[high]
                .successor(low)
                .expect("cluster maximum lies above the probe");
            return Some(self.index(high, offset));
        }

        let next_cluster = self
            .summary
            .as_ref()
            .and_then(|summary| summary.successor(high))?;
        let offset = self.clusters[next_cluster]
            .minimum()
            .expect("summary reported an occupied cluster");
        Some(self.index(next_cluster, offset))
    }

    /// The largest member strictly less than `x`, or `None`.
    ///
    /// # Complexity
    /// - Time: O(log log u)
    pub fn predecessor(&self, x: usize) -> Option<usize> {
        self.check_key(x);
        if self.universe == 2 {
            return if x == 1 && self.min == Some(0) {
                Some(0)
            } else {
                None
            };
        }
        if let Some(max) = self.max {
            if x > max {
                return Some(max);
            }
        }

        let high = self.high(x);
        let low = self.low(x);
        let min_in_cluster = self.clusters[high].minimum();
        if min_in_cluster.map_or(false, |min| low > min) {
            let offset = self.clusters[high]
                .predecessor(low)
                .expect("cluster minimum lies below the probe");
            return Some(self.index(high, offset));
        }

        if let Some(prev_cluster) = self
            .summary
            .as_ref()
            .and_then(|summary| summary.predecessor(high))
        {
            let offset = self.clusters[prev_cluster]
                .maximum()
                .expect("summary reported an occupied cluster");
            return Some(self.index(prev_cluster, offset));
        }

        // The minimum is hoisted out of the clusters, so the recursion never
        // finds it.
        match self.min {
            Some(min) if x > min => Some(min),
            _ => None,
        }
    }

    /// √u; both the number of clusters and each cluster's universe.
    fn sqrt_universe(&self) -> usize {
        1usize << (self.universe.trailing_zeros() / 2)
    }

    fn high(&self, x: usize) -> usize {
        x / self.sqrt_universe()
    }

    fn low(&self, x: usize) -> usize {
        x % self.sqrt_universe()
    }

    fn index(&self, high: usize, low: usize) -> usize {
        high * self.sqrt_universe() + low
    }

    fn check_key(&self, x: usize) {
        assert!(
            x < self.universe,
            "key {} out of universe 0..{}",
            x,
            self.universe
        );
    }
}
