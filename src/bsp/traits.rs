//! Split edge selection

use crate::bsp::node::Edge;
use crate::plane::Side;

/// Trait for picking the edge whose plane splits a set of edges
pub trait SplitEdgeStrategy {
    /// Pick the splitting edge among `indices` (indices into `edges`), or `None` when the
    /// set should become a leaf.
    fn choose_split_edge(&self, edges: &[Edge], indices: &[usize]) -> Option<usize>;
}

/// Per-candidate classification counts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SplitCounts {
    pub front: usize,
    pub back: usize,
    pub split: usize,
    pub on_plane: usize,
}

impl SplitCounts {
    /// Classify every edge of `indices` against the plane of `candidate`.
    pub fn classify(edges: &[Edge], indices: &[usize], candidate: usize) -> Self {
        let plane = &edges[candidate].plane;
        indices
            .iter()
            .fold(SplitCounts::default(), |mut counts, &index| {
                match plane.test_segment(&edges[index].v) {
                    Side::Front => counts.front += 1,
                    Side::Back => counts.back += 1,
                    Side::Split => counts.split += 1,
                    Side::In => counts.on_plane += 1,
                }
                counts
            })
    }

    /// A plane with nothing behind it and nothing to cut only repeats the cell
    /// boundary, so it cannot partition the set.
    pub const fn partitions(&self) -> bool {
        self.back > 0 || self.split > 0
    }
}

/// Default strategy: fewest splits, then best front/back balance.
/// Ties go to the first candidate.
pub struct BalancedSplitStrategy {
    pub balance_weight: usize,
    pub split_weight: usize,
}

impl Default for BalancedSplitStrategy {
    fn default() -> Self {
        Self {
            balance_weight: 1,
            split_weight: 2,
        }
    }
}

impl SplitEdgeStrategy for BalancedSplitStrategy {
    fn choose_split_edge(&self, edges: &[Edge], indices: &[usize]) -> Option<usize> {
        let mut best = None;
        let mut best_score = usize::MAX;

        for &candidate in indices {
            let counts = SplitCounts::classify(edges, indices, candidate);
            if !counts.partitions() {
                continue;
            }
            let score = self.balance_weight * counts.front.abs_diff(counts.back)
                + self.split_weight * counts.split;
            if score < best_score {
                best_score = score;
                best = Some(candidate);
            }
        }
        best
    }
}

/// Takes the first candidate that partitions the set. Builds deeper trees but
/// runs in linear time per node.
pub struct FirstSplitStrategy;

impl SplitEdgeStrategy for FirstSplitStrategy {
    fn choose_split_edge(&self, edges: &[Edge], indices: &[usize]) -> Option<usize> {
        indices
            .iter()
            .copied()
            .find(|&candidate| SplitCounts::classify(edges, indices, candidate).partitions())
    }
}
