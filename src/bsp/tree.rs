//! Tree construction and queries

use crate::bsp::node::{Edge, Leaf, Node, NodeKind, Tag};
use crate::bsp::traits::{BalancedSplitStrategy, SplitCounts, SplitEdgeStrategy};
use crate::errors::ValidationError;
use crate::float_types::{Real, wall_thickness};
use crate::math::segment_segment_fractions;
use crate::observer::{NoopObserver, Step, StepObserver};
use crate::plane::Side;
use crate::polygon::PolyArea;
use nalgebra::Point2;
use tracing::debug;

/// First obstruction reported by [`Tree::segment_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Index of the blocking edge.
    pub edge: usize,
    /// Position of the hit along the query segment, in `[0, 1]`.
    pub fraction: Real,
}

/// A 2D BSP tree over the boundary edges of a set of solid obstacles inside a world
/// rectangle. Every leaf is a convex region of empty space.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    leaves: Vec<Leaf>,
    /// Arena ids of internal nodes in construction order (parents first).
    internal: Vec<usize>,
    root: Option<usize>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the tree with the default [`BalancedSplitStrategy`].
    pub fn build(
        &mut self,
        polygons: &[PolyArea],
        min: Point2<Real>,
        max: Point2<Real>,
    ) -> Result<(), ValidationError> {
        self.build_with_observer(
            polygons,
            min,
            max,
            &BalancedSplitStrategy::default(),
            &mut NoopObserver,
        )
    }

    pub fn build_with_strategy(
        &mut self,
        polygons: &[PolyArea],
        min: Point2<Real>,
        max: Point2<Real>,
        strategy: &dyn SplitEdgeStrategy,
    ) -> Result<(), ValidationError> {
        self.build_with_observer(polygons, min, max, strategy, &mut NoopObserver)
    }

    /// Build the tree, reporting every node to `observer`.
    ///
    /// The input is validated first; on error the current tree is left unchanged.
    pub fn build_with_observer(
        &mut self,
        polygons: &[PolyArea],
        min: Point2<Real>,
        max: Point2<Real>,
        strategy: &dyn SplitEdgeStrategy,
        observer: &mut dyn StepObserver,
    ) -> Result<(), ValidationError> {
        validate_bounds(&min, &max)?;
        for (index, polygon) in polygons.iter().enumerate() {
            polygon.validate(index, &min, &max)?;
        }

        self.clear();

        for (poly_index, polygon) in polygons.iter().enumerate() {
            let mut vertices = polygon.vertices().to_vec();
            // solid must be behind every edge
            if polygon.signed_area() < 0.0 {
                vertices.reverse();
            }
            let mut prev = vertices[vertices.len() - 1];
            for &cur in &vertices {
                self.edges.push(Edge::new(prev, cur, Some(poly_index)));
                prev = cur;
            }
        }

        // clockwise, so the world interior is in front
        let corners = [
            min,
            Point2::new(min.x, max.y),
            max,
            Point2::new(max.x, min.y),
        ];
        for i in 0..corners.len() {
            let next = corners[(i + 1) % corners.len()];
            self.edges.push(Edge::new(corners[i], next, None));
        }

        let indices: Vec<usize> = (0..self.edges.len()).collect();
        self.root = self.construct_r(indices, None, strategy, observer);

        debug!(
            edges = self.edges.len(),
            internal_nodes = self.internal.len(),
            leaves = self.leaves.len(),
            "built bsp tree"
        );
        Ok(())
    }

    fn construct_r(
        &mut self,
        indices: Vec<usize>,
        parent: Option<usize>,
        strategy: &dyn SplitEdgeStrategy,
        observer: &mut dyn StepObserver,
    ) -> Option<usize> {
        if indices.is_empty() {
            return None;
        }

        let node_id = self.nodes.len();
        let Some(split_edge) = strategy.choose_split_edge(&self.edges, &indices) else {
            let leaf = self.leaves.len();
            self.nodes.push(Node {
                parent,
                tag: Tag::leaf(leaf),
                kind: NodeKind::Leaf { leaf },
            });
            let debug_pos = self.edge_bounds_center(&indices);
            observer.visit(&Step::LeafCreated {
                node: node_id,
                leaf,
                edges: indices.len(),
            });
            self.leaves.push(Leaf {
                node: node_id,
                edges: indices,
                debug_pos,
            });
            return Some(node_id);
        };

        let plane = self.edges[split_edge].plane;
        self.nodes.push(Node {
            parent,
            tag: Tag::internal(self.internal.len()),
            kind: NodeKind::Internal {
                edge: split_edge,
                plane,
                front: None,
                back: None,
            },
        });
        self.internal.push(node_id);

        let mut fronts = Vec::new();
        let mut backs = Vec::new();
        let mut counts = SplitCounts::default();
        for index in indices {
            let mut v = self.edges[index].v;
            match plane.split(&mut v) {
                (Side::Front, _) => {
                    counts.front += 1;
                    fronts.push(index);
                },
                (Side::Back, _) => {
                    counts.back += 1;
                    backs.push(index);
                },
                (Side::Split, Some(back)) => {
                    counts.split += 1;
                    // the edge keeps its front part, the back part becomes a new edge
                    let edge = &mut self.edges[index];
                    edge.v = v;
                    let fragment = Edge {
                        v: back,
                        plane: edge.plane,
                        poly_index: edge.poly_index,
                    };
                    fronts.push(index);
                    backs.push(self.edges.len());
                    self.edges.push(fragment);
                },
                _ => {
                    counts.on_plane += 1;
                    if plane.normal().dot(&self.edges[index].plane.normal()) > 0.0 {
                        fronts.push(index);
                    } else {
                        backs.push(index);
                    }
                },
            }
        }

        observer.visit(&Step::NodeSplit {
            node: node_id,
            edge: split_edge,
            front: counts.front,
            back: counts.back,
            split: counts.split,
        });

        let front = self.construct_r(fronts, Some(node_id), strategy, observer);
        let back = self.construct_r(backs, Some(node_id), strategy, observer);
        if let NodeKind::Internal {
            front: front_child,
            back: back_child,
            ..
        } = &mut self.nodes[node_id].kind
        {
            *front_child = front;
            *back_child = back;
        }
        Some(node_id)
    }

    fn edge_bounds_center(&self, indices: &[usize]) -> Point2<Real> {
        let mut lo = Point2::new(Real::MAX, Real::MAX);
        let mut hi = Point2::new(Real::MIN, Real::MIN);
        for v in indices.iter().flat_map(|&i| self.edges[i].v) {
            lo = lo.inf(&v);
            hi = hi.sup(&v);
        }
        nalgebra::center(&lo, &hi)
    }

    /// Drop the tree and all edges.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.leaves.clear();
        self.internal.clear();
        self.root = None;
    }

    /// Line of sight query: the first boundary edge crossed by `start -> end`, if any.
    ///
    /// Crossings within the wall thickness of an edge's endpoints are ignored so that
    /// segments passing exactly through shared corners are not reported. When the query
    /// only touches corners, the pieces between the touches are checked for solid space
    /// so that a diagonal from one obstacle corner to the opposite one is still blocked.
    pub fn segment_test(&self, start: Point2<Real>, end: Point2<Real>) -> Option<SegmentHit> {
        let mut touches = Vec::new();
        self.segment_test_r(self.root, &start, &end, &mut touches)
            .or_else(|| self.corner_touch_test(&start, &end, touches))
    }

    fn segment_test_r(
        &self,
        node: Option<usize>,
        start: &Point2<Real>,
        end: &Point2<Real>,
        touches: &mut Vec<SegmentHit>,
    ) -> Option<SegmentHit> {
        let node = &self.nodes[node?];
        let (plane, front, back) = match &node.kind {
            NodeKind::Leaf { leaf } => return self.leaf_segment_test(*leaf, start, end, touches),
            NodeKind::Internal {
                plane, front, back, ..
            } => (plane, *front, *back),
        };

        let tolerance = wall_thickness();
        let s0 = plane.test_side(start, tolerance);
        let s1 = plane.test_side(end, tolerance);

        match (s0, s1) {
            (Side::In, _) => self.segment_test_r(front, start, end, touches).or_else(|| {
                if s1 == Side::Back {
                    self.segment_test_r(back, start, end, touches)
                } else {
                    None
                }
            }),
            (Side::Front, Side::Front) => self.segment_test_r(front, start, end, touches),
            (Side::Back, Side::Back) => self.segment_test_r(back, start, end, touches),
            (Side::Front, _) => self
                .segment_test_r(front, start, end, touches)
                .or_else(|| self.segment_test_r(back, start, end, touches)),
            _ => self
                .segment_test_r(back, start, end, touches)
                .or_else(|| self.segment_test_r(front, start, end, touches)),
        }
    }

    /// Test against the edges of one leaf. Crossings inside the endpoint band of an edge
    /// are collected in `touches` instead of being reported.
    fn leaf_segment_test(
        &self,
        leaf: usize,
        start: &Point2<Real>,
        end: &Point2<Real>,
        touches: &mut Vec<SegmentHit>,
    ) -> Option<SegmentHit> {
        let tolerance = wall_thickness();
        for &index in &self.leaves[leaf].edges {
            let edge = &self.edges[index];
            let Some([t_query, t_edge]) =
                segment_segment_fractions(start, end, &edge.v[0], &edge.v[1])
            else {
                continue;
            };
            if !(0.0..=1.0).contains(&t_query)
                || !(-tolerance..=1.0 + tolerance).contains(&t_edge)
            {
                continue;
            }
            let hit = SegmentHit {
                edge: index,
                fraction: t_query,
            };
            if tolerance <= t_edge && t_edge <= 1.0 - tolerance {
                return Some(hit);
            }
            touches.push(hit);
        }
        None
    }

    /// Check the middle of every piece of `start -> end` between two corner touches.
    /// A solid piece is reported at the touch where it begins.
    fn corner_touch_test(
        &self,
        start: &Point2<Real>,
        end: &Point2<Real>,
        mut touches: Vec<SegmentHit>,
    ) -> Option<SegmentHit> {
        if touches.is_empty() {
            return None;
        }
        touches.sort_by(|a, b| a.fraction.total_cmp(&b.fraction));

        let tolerance = wall_thickness();
        let dir = *end - *start;
        let length = dir.norm();
        let mut opening: Option<SegmentHit> = None;
        for closing in touches.iter().copied().map(Some).chain([None]) {
            let t0 = opening.map_or(0.0, |hit| hit.fraction);
            let t1 = closing.map_or(1.0, |hit| hit.fraction);
            if (t1 - t0) * length > tolerance {
                let mid = *start + dir * ((t0 + t1) * 0.5);
                if self.is_solid(mid) {
                    return opening.or(closing);
                }
            }
            opening = closing.or(opening);
        }
        None
    }

    /// True if `pos` lies behind a boundary edge of its leaf by more than the wall
    /// thickness, or outside every leaf. Obstacle borders count as free space.
    pub fn is_solid(&self, pos: Point2<Real>) -> bool {
        let tolerance = wall_thickness();
        match self.get_leaf(pos) {
            Some(leaf) => self.leaves[leaf]
                .edges
                .iter()
                .any(|&index| self.edges[index].plane.signed_distance(&pos) < -tolerance),
            None => true,
        }
    }

    /// Leaf containing `pos`. Points within the wall thickness of a plane go to the side
    /// their exact signed distance points at.
    pub fn get_leaf(&self, pos: Point2<Real>) -> Option<usize> {
        let node = self.get_leaf_node(pos)?;
        match self.nodes[node].kind {
            NodeKind::Leaf { leaf } => Some(leaf),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Arena id of the leaf node containing `pos`.
    pub fn get_leaf_node(&self, pos: Point2<Real>) -> Option<usize> {
        let tolerance = wall_thickness();
        let mut current = self.root?;
        loop {
            let node = &self.nodes[current];
            let NodeKind::Internal {
                plane, front, back, ..
            } = &node.kind
            else {
                return Some(current);
            };
            let (side, dist) = plane.test_side_dist(&pos, tolerance);
            let go_front = match side {
                Side::Front => true,
                Side::Back => false,
                _ => dist >= 0.0,
            };
            current = if go_front { (*front)? } else { (*back)? };
        }
    }

    pub fn root(&self) -> Option<usize> {
        self.root
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// Arena ids of the internal nodes, parents before children.
    pub fn internal_nodes(&self) -> &[usize] {
        &self.internal
    }

    pub fn leaf_by_tag(&self, tag: Tag) -> Option<&Leaf> {
        self.leaves.get(tag.leaf_index()?)
    }

    /// Arena id of the node carrying `tag`.
    pub fn node_by_tag(&self, tag: Tag) -> Option<usize> {
        match tag.leaf_index() {
            Some(leaf) => self.leaves.get(leaf).map(|l| l.node),
            None => self.internal.get(tag.internal_index()?).copied(),
        }
    }

    /// Tag of an optional child, [`Tag::NONE`] when absent.
    pub fn child_tag(&self, child: Option<usize>) -> Tag {
        child.map_or(Tag::NONE, |id| self.nodes[id].tag)
    }

    pub(crate) fn set_leaf_debug_pos(&mut self, leaf: usize, pos: Point2<Real>) {
        if let Some(leaf) = self.leaves.get_mut(leaf) {
            leaf.debug_pos = pos;
        }
    }
}

fn validate_bounds(min: &Point2<Real>, max: &Point2<Real>) -> Result<(), ValidationError> {
    let finite = min.iter().chain(max.iter()).all(|c| c.is_finite());
    if !finite || min.x >= max.x || min.y >= max.y {
        return Err(ValidationError::InvalidBounds {
            min: *min,
            max: *max,
        });
    }
    Ok(())
}
