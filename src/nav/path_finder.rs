//! A* search over the area graph, followed by optional string pulling.

use crate::errors::PathError;
use crate::float_types::Real;
use crate::nav::funnel::string_pull;
use crate::nav::mesh::NavMesh;
use crate::observer::{NoopObserver, Step, StepObserver};
use hashbrown::HashMap;
use nalgebra::{Point2, distance};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::debug;

/// Which point of a crossed portal a search state stands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waypoint {
    /// The query start; only the initial state.
    Start,
    Midpoint,
    /// `polygon[i]` of the entered area.
    VertexA,
    /// `polygon[i + 1]` of the entered area.
    VertexB,
}

/// A search state: standing at `pos` in `area`, having entered it through `entrance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FindState {
    pub area: usize,
    /// Link index, `None` for the start area.
    pub entrance: Option<usize>,
    pub waypoint: Waypoint,
    pub pos: Point2<Real>,
}

impl FindState {
    fn key(&self) -> (usize, Option<usize>, Waypoint) {
        (self.area, self.entrance, self.waypoint)
    }
}

#[derive(Debug, Clone)]
struct SearchNode {
    state: FindState,
    parent: Option<usize>,
    g: Real,
    closed: bool,
}

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    node: usize,
    f: Real,
    g: Real,
    seq: u64,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for QueueEntry {}
impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is max-heap; invert ordering for min-heap behavior
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Reusable A* search over a [`NavMesh`].
///
/// Every portal crossing offers three positions (midpoint and both endpoints), so
/// paths can hug obstacle corners instead of running through portal centres.
#[derive(Debug, Default)]
pub struct PathFinder {
    nodes: Vec<SearchNode>,
    lookup: HashMap<(usize, Option<usize>, Waypoint), usize>,
    open: BinaryHeap<QueueEntry>,
    seq: u64,
}

impl PathFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a path from `from` in area `from_area` to `to` in area `to_area`.
    ///
    /// The result starts with `from` and ends with `to`.
    #[allow(clippy::too_many_arguments)]
    pub fn find_path(
        &mut self,
        mesh: &NavMesh,
        from_area: usize,
        from: Point2<Real>,
        to_area: usize,
        to: Point2<Real>,
        use_funnel: bool,
        max_expansions: usize,
    ) -> Result<Vec<Point2<Real>>, PathError> {
        self.find_path_with_observer(
            mesh,
            from_area,
            from,
            to_area,
            to,
            use_funnel,
            max_expansions,
            &mut NoopObserver,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn find_path_with_observer(
        &mut self,
        mesh: &NavMesh,
        from_area: usize,
        from: Point2<Real>,
        to_area: usize,
        to: Point2<Real>,
        use_funnel: bool,
        max_expansions: usize,
        observer: &mut dyn StepObserver,
    ) -> Result<Vec<Point2<Real>>, PathError> {
        for area in [from_area, to_area] {
            if !mesh.areas.get(area).is_some_and(|a| a.valid) {
                return Err(PathError::InvalidArea(area));
            }
        }

        let goal = self.search(mesh, from_area, from, to_area, to, max_expansions, observer)?;
        let chain = self.chain_to(goal);

        let path = if use_funnel {
            let portals: Vec<_> = chain[1..]
                .iter()
                .filter_map(|&node| portal_of(mesh, &self.nodes[node].state))
                .collect();
            string_pull(from, &portals, to)
        } else {
            self.build_path(&chain, from, to)
        };

        debug!(
            expanded = self.nodes.iter().filter(|n| n.closed).count(),
            areas = chain.len(),
            waypoints = path.len(),
            "path found"
        );
        Ok(path)
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.lookup.clear();
        self.open.clear();
        self.seq = 0;
    }

    fn push_open(&mut self, node: usize, g: Real, h: Real) {
        self.seq += 1;
        self.open.push(QueueEntry {
            node,
            f: g + h,
            g,
            seq: self.seq,
        });
    }

    /// Run A* and return the node that reached the goal area.
    #[allow(clippy::too_many_arguments)]
    fn search(
        &mut self,
        mesh: &NavMesh,
        from_area: usize,
        from: Point2<Real>,
        to_area: usize,
        to: Point2<Real>,
        max_expansions: usize,
        observer: &mut dyn StepObserver,
    ) -> Result<usize, PathError> {
        self.reset();

        let start = FindState {
            area: from_area,
            entrance: None,
            waypoint: Waypoint::Start,
            pos: from,
        };
        self.nodes.push(SearchNode {
            state: start,
            parent: None,
            g: 0.0,
            closed: false,
        });
        self.lookup.insert(start.key(), 0);
        self.push_open(0, 0.0, distance(&from, &to));

        let mut expanded = 0;
        while let Some(entry) = self.open.pop() {
            let current = &mut self.nodes[entry.node];
            if current.closed || entry.g > current.g {
                continue;
            }
            current.closed = true;
            let state = current.state;
            let g = current.g;

            expanded += 1;
            if expanded > max_expansions {
                return Err(PathError::SearchLimitExceeded { expanded });
            }
            observer.visit(&Step::NodeExpanded {
                area: state.area,
                pos: state.pos,
                cost: g,
            });

            if state.area == to_area {
                return Ok(entry.node);
            }

            for &link_index in &mesh.areas[state.area].links {
                if Some(link_index) == state.entrance {
                    continue;
                }
                let link = &mesh.links[link_index];
                let Some(side) = link.side_of(state.area) else {
                    continue;
                };
                let next_area = link.areas[1 - side];
                let area = &mesh.areas[next_area];
                let vertex = link.polygon[1 - side];

                let candidates = [
                    (Waypoint::Midpoint, link.pos),
                    (Waypoint::VertexA, area.polygon[vertex]),
                    (Waypoint::VertexB, area.next_vertex(vertex)),
                ];
                for (waypoint, pos) in candidates {
                    let next = FindState {
                        area: next_area,
                        entrance: Some(link_index),
                        waypoint,
                        pos,
                    };
                    self.add_search_node(next, entry.node, g + distance(&state.pos, &pos), &to);
                }
            }
        }

        Err(PathError::NoRoute)
    }

    fn add_search_node(&mut self, state: FindState, parent: usize, g: Real, goal: &Point2<Real>) {
        let index = match self.lookup.get(&state.key()) {
            Some(&index) => {
                let node = &mut self.nodes[index];
                if node.closed || g >= node.g {
                    return;
                }
                node.g = g;
                node.parent = Some(parent);
                node.state = state;
                index
            },
            None => {
                let index = self.nodes.len();
                self.nodes.push(SearchNode {
                    state,
                    parent: Some(parent),
                    g,
                    closed: false,
                });
                self.lookup.insert(state.key(), index);
                index
            },
        };
        self.push_open(index, g, distance(&state.pos, goal));
    }

    /// Node indices from the start to `goal`.
    fn chain_to(&self, goal: usize) -> Vec<usize> {
        let mut chain = vec![goal];
        let mut current = goal;
        while let Some(parent) = self.nodes[current].parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// The raw search positions between `from` and `to`.
    fn build_path(
        &self,
        chain: &[usize],
        from: Point2<Real>,
        to: Point2<Real>,
    ) -> Vec<Point2<Real>> {
        let mut path = Vec::with_capacity(chain.len() + 1);
        path.push(from);
        path.extend(chain[1..].iter().map(|&node| self.nodes[node].state.pos));
        path.push(to);
        path
    }
}

/// The entrance portal of `state` as `(left, right)` for someone walking into its area.
fn portal_of(mesh: &NavMesh, state: &FindState) -> Option<(Point2<Real>, Point2<Real>)> {
    let link = &mesh.links[state.entrance?];
    let side = link.side_of(state.area)?;
    let area = &mesh.areas[state.area];
    let index = link.polygon[side];
    Some((area.next_vertex(index), area.polygon[index]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::area::NavArea;
    use crate::nav::mesh::NavLink;

    fn p(x: Real, y: Real) -> Point2<Real> {
        Point2::new(x, y)
    }

    fn area(polygon: Vec<Point2<Real>>, links: Vec<usize>) -> NavArea {
        let mut area = NavArea::new();
        area.polygon = polygon;
        area.links = links;
        area
    }

    /// Two 2x2 cells side by side plus an unreachable third one.
    fn two_rooms() -> NavMesh {
        NavMesh {
            areas: vec![
                area(vec![p(0.0, 0.0), p(0.0, 2.0), p(2.0, 2.0), p(2.0, 0.0)], vec![0]),
                area(vec![p(2.0, 0.0), p(2.0, 2.0), p(4.0, 2.0), p(4.0, 0.0)], vec![0]),
                area(vec![p(6.0, 0.0), p(6.0, 2.0), p(8.0, 2.0), p(8.0, 0.0)], vec![]),
            ],
            links: vec![NavLink {
                pos: p(2.0, 1.0),
                areas: [0, 1],
                polygon: [2, 0],
                portal: [p(2.0, 2.0), p(2.0, 0.0)],
            }],
        }
    }

    #[test]
    fn entrance_portal_is_left_then_right() {
        let mesh = two_rooms();
        let state = FindState {
            area: 1,
            entrance: Some(0),
            waypoint: Waypoint::Midpoint,
            pos: p(2.0, 1.0),
        };
        assert_eq!(portal_of(&mesh, &state), Some((p(2.0, 2.0), p(2.0, 0.0))));
    }

    #[test]
    fn raw_and_funneled_paths() {
        let mesh = two_rooms();
        let mut finder = PathFinder::new();

        let raw = finder
            .find_path(&mesh, 0, p(1.0, 1.0), 1, p(3.0, 1.0), false, 100)
            .unwrap();
        assert_eq!(raw, vec![p(1.0, 1.0), p(2.0, 1.0), p(3.0, 1.0)]);

        let pulled = finder
            .find_path(&mesh, 0, p(1.0, 1.0), 1, p(3.0, 1.0), true, 100)
            .unwrap();
        assert_eq!(pulled, vec![p(1.0, 1.0), p(3.0, 1.0)]);
    }

    #[test]
    fn failures() {
        let mut mesh = two_rooms();
        let mut finder = PathFinder::new();
        assert_eq!(
            finder.find_path(&mesh, 0, p(1.0, 1.0), 2, p(7.0, 1.0), true, 100),
            Err(PathError::NoRoute)
        );
        assert_eq!(
            finder.find_path(&mesh, 0, p(1.0, 1.0), 1, p(3.0, 1.0), true, 1),
            Err(PathError::SearchLimitExceeded { expanded: 2 })
        );
        assert_eq!(
            finder.find_path(&mesh, 0, p(1.0, 1.0), 9, p(3.0, 1.0), true, 100),
            Err(PathError::InvalidArea(9))
        );
        mesh.areas[1].valid = false;
        assert_eq!(
            finder.find_path(&mesh, 0, p(1.0, 1.0), 1, p(3.0, 1.0), true, 100),
            Err(PathError::InvalidArea(1))
        );
    }
}
