//! Navigation mesh: walkable areas and the links between them.

use crate::bsp::{PortalBuilder, Tree};
use crate::float_types::Real;
use crate::math::{Segment, is_equal};
use crate::nav::area::NavArea;
use crate::observer::{AreaRejection, Step, StepObserver};
use crate::polygon::{PolyArea, polygon_centroid};
use nalgebra::Point2;
use tracing::{debug, warn};

/// A crossing between two areas through a shared portal.
#[derive(Debug, Clone, PartialEq)]
pub struct NavLink {
    /// Portal midpoint.
    pub pos: Point2<Real>,
    /// Front and back area.
    pub areas: [usize; 2],
    /// For each area, the polygon index `i` such that `polygon[i] -> polygon[i + 1]`
    /// is the portal edge of that area.
    pub polygon: [usize; 2],
    pub portal: Segment,
}

impl NavLink {
    /// Which slot of `areas` holds `area`.
    pub fn side_of(&self, area: usize) -> Option<usize> {
        self.areas.iter().position(|&a| a == area)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavMesh {
    /// One area per tree leaf, indexed like [`Tree::leaves`].
    pub areas: Vec<NavArea>,
    pub links: Vec<NavLink>,
}

impl NavMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.areas.clear();
        self.links.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn valid_area_count(&self) -> usize {
        self.areas.iter().filter(|a| a.valid).count()
    }

    /// Rebuild the mesh from a tree and its portals.
    ///
    /// Areas whose outline cannot be chained, is degenerate or has its centroid inside
    /// one of `obstacles` are kept but marked invalid. Portals touching an invalid area
    /// do not produce links.
    pub fn build(
        &mut self,
        tree: &Tree,
        builder: &PortalBuilder,
        obstacles: &[PolyArea],
        observer: &mut dyn StepObserver,
    ) {
        self.clear();
        self.areas = vec![NavArea::new(); tree.leaves().len()];

        for (area, leaf) in self.areas.iter_mut().zip(tree.leaves()) {
            for &index in &leaf.edges {
                let [v0, v1] = tree.edges()[index].v;
                area.push_fragment(v0, v1);
            }
        }

        for portal in builder.portals() {
            if let Some(front) = portal.front.leaf_index() {
                self.areas[front].push_fragment(portal.v[0], portal.v[1]);
            }
            if let Some(back) = portal.back.leaf_index() {
                self.areas[back].push_fragment(portal.v[1], portal.v[0]);
            }
        }

        for (index, area) in self.areas.iter_mut().enumerate() {
            if let Some(reason) = finish_area(index, area, obstacles) {
                match reason {
                    AreaRejection::InsideObstacle => {
                        warn!(area = index, "area centroid lies inside an obstacle")
                    },
                    _ => debug!(area = index, ?reason, "area rejected"),
                }
                area.valid = false;
                observer.visit(&Step::AreaRejected { area: index, reason });
            }
        }

        for portal in builder.portals() {
            let (Some(front), Some(back)) = (portal.front.leaf_index(), portal.back.leaf_index())
            else {
                continue;
            };
            if front == back || !self.areas[front].valid || !self.areas[back].valid {
                continue;
            }

            let [v0, v1] = portal.v;
            let (Some(front_index), Some(back_index)) = (
                find_edge(&self.areas[front], &v0, &v1),
                find_edge(&self.areas[back], &v1, &v0),
            ) else {
                warn!(front, back, "portal endpoints not found in area outlines");
                continue;
            };

            let link = self.links.len();
            self.links.push(NavLink {
                pos: nalgebra::center(&v0, &v1),
                areas: [front, back],
                polygon: [front_index, back_index],
                portal: portal.v,
            });
            self.areas[front].links.push(link);
            self.areas[back].links.push(link);
        }
    }
}

/// Chain the area outline and decide whether it is walkable.
fn finish_area(index: usize, area: &mut NavArea, obstacles: &[PolyArea]) -> Option<AreaRejection> {
    if let Err(err) = area.sort_polygon() {
        warn!(area = index, %err, "area outline does not form a closed loop");
        return Some(AreaRejection::Unsortable);
    }
    if area.polygon.len() < 3 {
        return Some(AreaRejection::Degenerate);
    }
    let Some(center) = polygon_centroid(&area.polygon) else {
        return Some(AreaRejection::Degenerate);
    };
    area.center = center;
    if obstacles.iter().any(|o| o.contains_point(&center)) {
        return Some(AreaRejection::InsideObstacle);
    }
    None
}

/// Polygon index `i` with `polygon[i] == v0` and `polygon[i + 1] == v1`.
fn find_edge(area: &NavArea, v0: &Point2<Real>, v1: &Point2<Real>) -> Option<usize> {
    let index = area.find_vertex(v0)?;
    is_equal(&area.next_vertex(index), v1).then_some(index)
}
