//! Owner of the tree, portals and navigation mesh; the entry point for path queries.

use crate::bsp::{BalancedSplitStrategy, PortalBuilder, Tree};
use crate::config::NavConfig;
use crate::errors::{PathError, ValidationError};
use crate::float_types::Real;
use crate::nav::mesh::NavMesh;
use crate::nav::path_finder::PathFinder;
use crate::observer::{NoopObserver, StepObserver};
use crate::polygon::{PolyArea, polygon_intersects};
use nalgebra::Point2;
use tracing::{debug, info};

/// Builds a navigation mesh around a set of obstacles inside a fixed world rectangle
/// and answers point to point path queries on it.
///
/// Building and querying both take `&mut self`; share a manager between threads only
/// behind a lock.
#[derive(Debug, Default)]
pub struct NavManager {
    config: NavConfig,
    tree: Tree,
    builder: PortalBuilder,
    mesh: NavMesh,
    path_finder: PathFinder,
    obstacles: Vec<PolyArea>,
}

impl NavManager {
    pub fn new(config: NavConfig) -> Self {
        NavManager {
            config,
            ..Default::default()
        }
    }

    pub const fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut NavConfig {
        &mut self.config
    }

    /// Rebuild everything from `obstacles`.
    ///
    /// Invalid obstacles are reported and leave the previous mesh in place.
    pub fn build_mesh(&mut self, obstacles: &[PolyArea]) -> Result<(), ValidationError> {
        self.build_mesh_with_observer(obstacles, &mut NoopObserver)
    }

    pub fn build_mesh_with_observer(
        &mut self,
        obstacles: &[PolyArea],
        observer: &mut dyn StepObserver,
    ) -> Result<(), ValidationError> {
        let (min, max) = (self.config.bound_min, self.config.bound_max);
        self.tree.build_with_observer(
            obstacles,
            min,
            max,
            &BalancedSplitStrategy::default(),
            observer,
        )?;
        self.builder.build_with_observer(&self.tree, min, max, observer);
        self.obstacles = obstacles.to_vec();
        self.mesh
            .build(&self.tree, &self.builder, &self.obstacles, observer);

        for (leaf, area) in self.mesh.areas.iter().enumerate() {
            if !area.polygon.is_empty() {
                self.tree.set_leaf_debug_pos(leaf, area.center);
            }
        }

        info!(
            areas = self.mesh.areas.len(),
            valid = self.mesh.valid_area_count(),
            links = self.mesh.links.len(),
            "built navigation mesh"
        );
        Ok(())
    }

    /// The valid area containing `pos` (boundary included).
    pub fn get_area_index(&self, pos: Point2<Real>) -> Option<usize> {
        let leaf = self.tree.get_leaf(pos)?;
        let area = self.mesh.areas.get(leaf)?;
        (area.valid && polygon_intersects(&area.polygon, &pos)).then_some(leaf)
    }

    /// Path from `from` to `to`, both ends included exactly.
    pub fn find_path(
        &mut self,
        from: Point2<Real>,
        to: Point2<Real>,
    ) -> Result<Vec<Point2<Real>>, PathError> {
        if self.mesh.is_empty() {
            return Err(PathError::MeshNotBuilt);
        }
        let from_area = self
            .get_area_index(from)
            .ok_or(PathError::StartOutsideMesh)?;
        let to_area = self.get_area_index(to).ok_or(PathError::GoalOutsideMesh)?;
        self.find_path_between(from_area, from, to_area, to)
    }

    /// Like [`NavManager::find_path`] with the areas already resolved.
    pub fn find_path_between(
        &mut self,
        from_area: usize,
        from: Point2<Real>,
        to_area: usize,
        to: Point2<Real>,
    ) -> Result<Vec<Point2<Real>>, PathError> {
        if self.mesh.is_empty() {
            return Err(PathError::MeshNotBuilt);
        }
        for area in [from_area, to_area] {
            if !self.mesh.areas.get(area).is_some_and(|a| a.valid) {
                return Err(PathError::InvalidArea(area));
            }
        }
        if self.tree.segment_test(from, to).is_none() {
            return Ok(vec![from, to]);
        }

        let mut path = self.path_finder.find_path(
            &self.mesh,
            from_area,
            from,
            to_area,
            to,
            self.config.use_funnel,
            self.config.max_search_expansions,
        )?;

        if self.config.optimize_path {
            let before = path.len();
            optimize_path(&self.tree, &mut path);
            debug!(before, after = path.len(), "optimized path");
        }
        Ok(path)
    }

    /// Drop the tree, portals and mesh.
    pub fn cleanup(&mut self) {
        self.tree.clear();
        self.builder.cleanup();
        self.mesh.clear();
        self.obstacles.clear();
    }

    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    pub const fn portal_builder(&self) -> &PortalBuilder {
        &self.builder
    }

    pub const fn mesh(&self) -> &NavMesh {
        &self.mesh
    }

    pub fn obstacles(&self) -> &[PolyArea] {
        &self.obstacles
    }
}

/// Remove waypoints that can be skipped: from each point, jump to the furthest later
/// point still in line of sight.
pub fn optimize_path(tree: &Tree, path: &mut Vec<Point2<Real>>) {
    let mut start = 0;
    while start + 2 < path.len() {
        let mut test = start + 2;
        while test < path.len() && tree.segment_test(path[start], path[test]).is_none() {
            test += 1;
        }
        if test != start + 2 {
            path.drain(start + 1..test - 1);
        }
        start += 1;
    }
}
