//! BSP tree node data structures

use crate::float_types::Real;
use crate::math::Segment;
use crate::plane::Plane;
use nalgebra::Point2;

/// A directed boundary edge. Solid space is behind its plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub v: Segment,
    /// Plane of the unsplit edge; fragments produced by splitting keep it.
    pub plane: Plane,
    /// Index of the source obstacle, `None` for the world rectangle.
    pub poly_index: Option<usize>,
}

impl Edge {
    pub fn new(v0: Point2<Real>, v1: Point2<Real>, poly_index: Option<usize>) -> Self {
        Edge {
            v: [v0, v1],
            plane: Plane::from_points(v0, v1),
            poly_index,
        }
    }

    pub fn length(&self) -> Real {
        (self.v[1] - self.v[0]).norm()
    }
}

/// Identifier shared by tree nodes and portal sides.
///
/// Internal nodes are numbered in construction order; leaves use the bitwise NOT of
/// their leaf index, so the top bit tells the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

impl Tag {
    const LEAF_BIT: u32 = 1 << 31;

    /// Tag of an absent child. Never a leaf and never a valid internal index.
    pub const NONE: Tag = Tag(Self::LEAF_BIT - 1);

    pub const fn leaf(leaf_index: usize) -> Self {
        Tag(!(leaf_index as u32))
    }

    pub const fn internal(order: usize) -> Self {
        Tag(order as u32)
    }

    #[inline]
    pub const fn is_leaf(self) -> bool {
        self.0 & Self::LEAF_BIT != 0
    }

    pub const fn leaf_index(self) -> Option<usize> {
        if self.is_leaf() {
            Some(!self.0 as usize)
        } else {
            None
        }
    }

    /// Position in [`Tree::internal_nodes`](crate::bsp::Tree::internal_nodes).
    pub const fn internal_index(self) -> Option<usize> {
        if self.is_leaf() || self.0 == Self::NONE.0 {
            None
        } else {
            Some(self.0 as usize)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Internal {
        /// Edge whose plane splits this node.
        edge: usize,
        plane: Plane,
        front: Option<usize>,
        back: Option<usize>,
    },
    Leaf {
        leaf: usize,
    },
}

/// A node in the tree arena. Children and parent are arena indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub parent: Option<usize>,
    pub tag: Tag,
    pub kind: NodeKind,
}

impl Node {
    pub const fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub const fn plane(&self) -> Option<&Plane> {
        match &self.kind {
            NodeKind::Internal { plane, .. } => Some(plane),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub const fn front(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Internal { front, .. } => front,
            NodeKind::Leaf { .. } => None,
        }
    }

    pub const fn back(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Internal { back, .. } => back,
            NodeKind::Leaf { .. } => None,
        }
    }
}

/// A convex empty cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    /// Arena index of the owning node.
    pub node: usize,
    /// Edges (or edge fragments) bounding this cell.
    pub edges: Vec<usize>,
    /// Representative point for drawing: the edges' bounding box centre, replaced by the
    /// area centroid once a navigation mesh is built.
    pub debug_pos: Point2<Real>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_encoding() {
        let leaf = Tag::leaf(5);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.leaf_index(), Some(5));
        assert_eq!(leaf.internal_index(), None);
        assert_eq!(Tag::leaf(0).0, u32::MAX);

        let internal = Tag::internal(7);
        assert!(!internal.is_leaf());
        assert_eq!(internal.internal_index(), Some(7));
        assert_eq!(internal.leaf_index(), None);

        assert!(!Tag::NONE.is_leaf());
        assert_eq!(Tag::NONE.internal_index(), None);
    }
}
