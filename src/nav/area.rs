//! Walkable areas: one per BSP leaf

use crate::errors::ChainError;
use crate::float_types::Real;
use crate::math::{Segment, is_equal};
use nalgebra::Point2;

/// A convex walkable polygon built from a leaf's boundary edges and portals.
///
/// The polygon winds with its interior on the right of every edge.
#[derive(Debug, Clone, PartialEq)]
pub struct NavArea {
    /// Indices into [`NavMesh::links`](crate::nav::NavMesh::links).
    pub links: Vec<usize>,
    pub polygon: Vec<Point2<Real>>,
    pub center: Point2<Real>,
    /// Invalid areas take no part in path finding.
    pub valid: bool,
    fragments: Vec<Segment>,
}

impl Default for NavArea {
    fn default() -> Self {
        NavArea {
            links: Vec::new(),
            polygon: Vec::new(),
            center: Point2::origin(),
            valid: true,
            fragments: Vec::new(),
        }
    }
}

impl NavArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directed boundary piece `v0 -> v1`.
    pub fn push_fragment(&mut self, v0: Point2<Real>, v1: Point2<Real>) {
        self.fragments.push([v0, v1]);
    }

    /// Fragments not yet chained by [`NavArea::sort_polygon`].
    pub fn fragments(&self) -> &[Segment] {
        &self.fragments
    }

    /// Chain the loose fragments into `polygon` by matching each fragment's end to
    /// the next one's start.
    ///
    /// Zero-length fragments are ignored. The chain must close on its first vertex.
    /// On error `polygon` is left empty.
    pub fn sort_polygon(&mut self) -> Result<(), ChainError> {
        self.polygon.clear();
        let mut pending: Vec<Segment> = std::mem::take(&mut self.fragments)
            .into_iter()
            .filter(|f| !is_equal(&f[0], &f[1]))
            .collect();
        if pending.is_empty() {
            return Err(ChainError::Empty);
        }

        let first = pending.swap_remove(0);
        let mut sorted = Vec::with_capacity(pending.len() + 1);
        sorted.push(first[0]);
        let mut cur = first[1];

        while !pending.is_empty() {
            let Some(next) = pending.iter().position(|f| is_equal(&cur, &f[0])) else {
                return Err(ChainError::Broken {
                    at: cur,
                    remaining: pending.len(),
                });
            };
            let fragment = pending.swap_remove(next);
            sorted.push(cur);
            cur = fragment[1];
        }

        if !is_equal(&cur, &sorted[0]) {
            return Err(ChainError::Open { end: cur });
        }

        self.polygon = sorted;
        Ok(())
    }

    /// Index of the polygon vertex equal to `pos`.
    pub fn find_vertex(&self, pos: &Point2<Real>) -> Option<usize> {
        self.polygon.iter().position(|v| is_equal(v, pos))
    }

    /// The polygon vertex after `index`, wrapping around.
    pub fn next_vertex(&self, index: usize) -> Point2<Real> {
        self.polygon[(index + 1) % self.polygon.len()]
    }
}
