//! Optional step-by-step hooks into the tree, portal and path algorithms.
//!
//! Observers are called synchronously at fixed checkpoints. They can record or draw
//! intermediate state but never influence the result.

use crate::float_types::Real;
use crate::math::Segment;
use nalgebra::Point2;

/// Why a navigation area was excluded from path finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaRejection {
    /// The leaf's edge and portal fragments do not chain into one closed loop.
    Unsortable,
    /// The chained loop has fewer than three vertices.
    Degenerate,
    /// The area's centroid lies inside an obstacle.
    InsideObstacle,
}

/// A checkpoint reached by one of the algorithms.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// An internal tree node was created on the plane of `edge`.
    NodeSplit {
        node: usize,
        edge: usize,
        front: usize,
        back: usize,
        split: usize,
    },
    /// A leaf cell was closed with `edges` boundary edges.
    LeafCreated { node: usize, leaf: usize, edges: usize },
    /// The split line of `node` was clipped to its cell.
    SuperPlaneCreated { node: usize, segment: Segment },
    /// A portal was cut in two by the plane of `node`.
    PortalSplit { node: usize, front: Segment, back: Segment },
    /// A portal was shortened by a boundary edge of `leaf`.
    PortalClipped { leaf: usize, edge: usize, segment: Segment },
    /// A portal was dropped.
    PortalRemoved { segment: Segment },
    /// A navigation area was excluded.
    AreaRejected { area: usize, reason: AreaRejection },
    /// The path search expanded a node.
    NodeExpanded { area: usize, pos: Point2<Real>, cost: Real },
}

pub trait StepObserver {
    fn visit(&mut self, step: &Step);
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    #[inline]
    fn visit(&mut self, _step: &Step) {}
}

impl<F: FnMut(&Step)> StepObserver for F {
    fn visit(&mut self, step: &Step) {
        self(step)
    }
}
