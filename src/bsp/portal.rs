//! Portal extraction: the open boundaries between adjacent leaf cells.

use crate::bsp::node::{NodeKind, Tag};
use crate::bsp::tree::Tree;
use crate::float_types::{DIV_ZERO_EPSILON, PARALLEL_EPSILON, Real, wall_thickness};
use crate::math::{Segment, cross, line_aabb_test, segment_segment_test};
use crate::observer::{NoopObserver, Step, StepObserver};
use crate::plane::{ClipResult, Plane, Side};
use nalgebra::Point2;
use tracing::debug;

/// A walkable segment between the cells tagged `front` and `back`.
///
/// While portals are pushed down the tree their tags may still name internal nodes;
/// every portal left after [`PortalBuilder::build`] connects two leaves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portal {
    /// Runs along the plane direction of its super plane, so `front` is on the right.
    pub v: Segment,
    pub front: Tag,
    pub back: Tag,
}

impl Portal {
    pub fn length(&self) -> Real {
        (self.v[1] - self.v[0]).norm()
    }

    pub fn midpoint(&self) -> Point2<Real> {
        nalgebra::center(&self.v[0], &self.v[1])
    }

    pub const fn connects_leaves(&self) -> bool {
        self.front.is_leaf() && self.back.is_leaf()
    }
}

/// The split line of one internal node, clipped to the node's cell, and the portals
/// cut out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperPlane {
    /// Arena id of the internal node.
    pub node: usize,
    pub plane: Plane,
    /// Position in [`PortalBuilder::super_planes`].
    pub tag: usize,
    pub portals: Vec<Portal>,
    /// The clipped line before it was cut into portals.
    pub extent: Segment,
}

/// Builds the portal graph of a [`Tree`].
#[derive(Debug, Clone, Default)]
pub struct PortalBuilder {
    super_planes: Vec<SuperPlane>,
}

impl PortalBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&mut self, tree: &Tree, min: Point2<Real>, max: Point2<Real>) {
        self.build_with_observer(tree, min, max, &mut NoopObserver);
    }

    /// Replace all portals by those of `tree` inside the world rectangle `[min, max]`.
    pub fn build_with_observer(
        &mut self,
        tree: &Tree,
        min: Point2<Real>,
        max: Point2<Real>,
        observer: &mut dyn StepObserver,
    ) {
        self.cleanup();

        for &node_id in tree.internal_nodes() {
            let Some(mut splane) = self.create_super_plane(tree, node_id, &min, &max) else {
                continue;
            };
            observer.visit(&Step::SuperPlaneCreated {
                node: node_id,
                segment: splane.extent,
            });

            let node = &tree.nodes()[node_id];
            generate_portal_r(tree, node.front(), &mut splane, observer);
            generate_portal_r(tree, node.back(), &mut splane, observer);
            prune_portals(tree, &mut splane, observer);

            self.super_planes.push(splane);
        }

        debug!(
            super_planes = self.super_planes.len(),
            portals = self.portals().count(),
            "built portals"
        );
    }

    /// Extend the node's split line across the world rectangle and clip it by every
    /// ancestor, keeping the side the node lies on.
    fn create_super_plane(
        &self,
        tree: &Tree,
        node_id: usize,
        min: &Point2<Real>,
        max: &Point2<Real>,
    ) -> Option<SuperPlane> {
        let node = &tree.nodes()[node_id];
        let NodeKind::Internal {
            plane, front, back, ..
        } = &node.kind
        else {
            return None;
        };

        let dir = plane.direction();
        let pos = plane.any_point();
        let [t0, t1] = line_aabb_test(&pos, &dir, min, max)?;
        let mut v = [pos + dir * t0, pos + dir * t1];

        let mut cur = node_id;
        let mut parent = node.parent;
        while let Some(parent_id) = parent {
            let parent_node = &tree.nodes()[parent_id];
            let parent_plane = parent_node.plane()?;
            let keep_front = parent_node.front() == Some(cur);
            if parent_plane.clip(keep_front, &mut v) == ClipResult::Removed {
                return None;
            }
            cur = parent_id;
            parent = parent_node.parent;
        }

        Some(SuperPlane {
            node: node_id,
            plane: *plane,
            tag: self.super_planes.len(),
            portals: vec![Portal {
                v,
                front: tree.child_tag(*front),
                back: tree.child_tag(*back),
            }],
            extent: v,
        })
    }

    pub fn super_planes(&self) -> &[SuperPlane] {
        &self.super_planes
    }

    /// All portals of all super planes.
    pub fn portals(&self) -> impl Iterator<Item = &Portal> + '_ {
        self.super_planes.iter().flat_map(|s| s.portals.iter())
    }

    pub fn cleanup(&mut self) {
        self.super_planes.clear();
    }
}

/// Push the portals of `splane` through the subtree at `node`.
fn generate_portal_r(
    tree: &Tree,
    node: Option<usize>,
    splane: &mut SuperPlane,
    observer: &mut dyn StepObserver,
) {
    let Some(node_id) = node else {
        return;
    };
    let node = &tree.nodes()[node_id];
    let tag = node.tag;

    match &node.kind {
        NodeKind::Leaf { leaf } => clip_to_leaf(tree, *leaf, tag, splane, observer),
        NodeKind::Internal {
            plane, front, back, ..
        } => {
            let front_tag = tree.child_tag(*front);
            let back_tag = tree.child_tag(*back);
            let same_direction = splane.plane.normal().dot(&plane.normal()) > 0.0;

            // fragments appended below are already tagged with a child
            let count = splane.portals.len();
            for index in 0..count {
                let portal = &mut splane.portals[index];
                let matched_front = if portal.front == tag {
                    true
                } else if portal.back == tag {
                    false
                } else {
                    continue;
                };

                let retag = |portal: &mut Portal, child: Tag| {
                    if matched_front {
                        portal.front = child;
                    } else {
                        portal.back = child;
                    }
                };

                let mut v = portal.v;
                match plane.split(&mut v) {
                    (Side::Front, _) => retag(portal, front_tag),
                    (Side::Back, _) => retag(portal, back_tag),
                    (Side::Split, Some(back_part)) => {
                        portal.v = v;
                        let mut fragment = Portal {
                            v: back_part,
                            front: portal.front,
                            back: portal.back,
                        };
                        retag(portal, front_tag);
                        retag(&mut fragment, back_tag);
                        observer.visit(&Step::PortalSplit {
                            node: node_id,
                            front: v,
                            back: back_part,
                        });
                        splane.portals.push(fragment);
                    },
                    _ => retag(portal, if same_direction { front_tag } else { back_tag }),
                }
            }

            generate_portal_r(tree, *front, splane, observer);
            generate_portal_r(tree, *back, splane, observer);
        },
    }
}

/// Trim the portals entering `leaf` by its boundary edges; drop those that end up
/// entirely inside solid space.
fn clip_to_leaf(
    tree: &Tree,
    leaf: usize,
    tag: Tag,
    splane: &mut SuperPlane,
    observer: &mut dyn StepObserver,
) {
    let tolerance = wall_thickness();
    let splane_normal = splane.plane.normal();
    let edges = &tree.leaves()[leaf].edges;

    let mut index = 0;
    'portals: while index < splane.portals.len() {
        {
            let portal = &splane.portals[index];
            if portal.front != tag && portal.back != tag {
                index += 1;
                continue;
            }
        }

        for &edge_index in edges {
            let edge = &tree.edges()[edge_index];
            let v = splane.portals[index].v;
            if segment_segment_test(&v[0], &v[1], &edge.v[0], &edge.v[1], tolerance) {
                if (1.0 - edge.plane.normal().dot(&splane_normal)).abs() < PARALLEL_EPSILON {
                    continue;
                }
                let mut clipped = v;
                match edge.plane.clip(true, &mut clipped) {
                    ClipResult::Removed => {
                        let removed = splane.portals.swap_remove(index);
                        observer.visit(&Step::PortalRemoved { segment: removed.v });
                        continue 'portals;
                    },
                    ClipResult::Clipped => {
                        splane.portals[index].v = clipped;
                        observer.visit(&Step::PortalClipped {
                            leaf,
                            edge: edge_index,
                            segment: clipped,
                        });
                    },
                    ClipResult::Unchanged => {},
                }
            } else if edge.plane.test_segment(&v) == Side::Back {
                let removed = splane.portals.swap_remove(index);
                observer.visit(&Step::PortalRemoved { segment: removed.v });
                continue 'portals;
            }
        }
        index += 1;
    }
}

/// Remove portals that are unresolved, degenerate or lie along a wall of either cell.
fn prune_portals(tree: &Tree, splane: &mut SuperPlane, observer: &mut dyn StepObserver) {
    let tolerance = wall_thickness();
    let along_wall = |tag: Tag, portal: &Portal| {
        tree.leaf_by_tag(tag).is_some_and(|leaf| {
            leaf.edges
                .iter()
                .any(|&e| is_contained(&tree.edges()[e].v, &portal.v, tolerance))
        })
    };

    splane.portals.retain(|portal| {
        let keep = portal.connects_leaves()
            && portal.length() >= tolerance
            && !along_wall(portal.front, portal)
            && !along_wall(portal.back, portal);
        if !keep {
            observer.visit(&Step::PortalRemoved { segment: portal.v });
        }
        keep
    });
}

/// True if `inner` lies on the line of `outer` and within its extent (both up to
/// `tolerance`).
fn is_contained(outer: &Segment, inner: &Segment, tolerance: Real) -> bool {
    let dir = outer[1] - outer[0];
    let length = dir.norm();
    if length < DIV_ZERO_EPSILON {
        return false;
    }
    let dir = dir / length;
    inner.iter().all(|p| {
        let offset = p - outer[0];
        let along = dir.dot(&offset);
        cross(&dir, &offset).abs() <= tolerance
            && along >= -tolerance
            && along <= length + tolerance
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_requires_colinear_overlap() {
        let outer = [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)];
        let eps = 1e-3;
        assert!(is_contained(&outer, &[Point2::new(2.0, 0.0), Point2::new(10.0, 0.0)], eps));
        assert!(is_contained(&outer, &[Point2::new(10.0, 0.0), Point2::new(3.0, 0.0)], eps));
        assert!(!is_contained(&outer, &[Point2::new(2.0, 0.0), Point2::new(11.0, 0.0)], eps));
        assert!(!is_contained(&outer, &[Point2::new(2.0, 0.5), Point2::new(4.0, 0.5)], eps));
    }

    #[test]
    fn empty_world_has_no_portals() {
        let mut tree = Tree::new();
        tree.build(&[], Point2::new(0.0, 0.0), Point2::new(20.0, 20.0))
            .unwrap();
        let mut builder = PortalBuilder::new();
        builder.build(&tree, Point2::new(0.0, 0.0), Point2::new(20.0, 20.0));
        assert!(builder.super_planes().is_empty());
        assert_eq!(builder.portals().count(), 0);
    }
}
