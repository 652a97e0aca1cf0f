//! Validation and query errors

use crate::float_types::Real;
use nalgebra::Point2;

/// All the possible validation issues we might encounter while building a tree or a mesh
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// (InvalidBounds) The world bound is empty or not finite
    #[error("(InvalidBounds) The world bound is empty or not finite: min {min}, max {max}")]
    InvalidBounds { min: Point2<Real>, max: Point2<Real> },
    /// (TooFewPoints) An obstacle has fewer than 3 vertices
    #[error("(TooFewPoints) Polygon {polygon} has {count} vertices, at least 3 are required")]
    TooFewPoints { polygon: usize, count: usize },
    /// (InvalidCoordinate) A vertex has a NaN or infinite coordinate
    #[error("(InvalidCoordinate) Polygon {polygon} has a NaN or infinite coordinate at: {point}")]
    InvalidCoordinate { polygon: usize, point: Point2<Real> },
    /// (OutOfBounds) A vertex lies outside the world bound
    #[error("(OutOfBounds) Polygon {polygon} leaves the world bound at: {point}")]
    OutOfBounds { polygon: usize, point: Point2<Real> },
    /// (RepeatedPoint) Two consecutive vertices are identical
    #[error("(RepeatedPoint) Polygon {polygon} has two consecutive identical coords at: {point}")]
    RepeatedPoint { polygon: usize, point: Point2<Real> },
}

/// Reasons a path query can fail. None of them modify the navigation mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("no navigation mesh has been built")]
    MeshNotBuilt,
    #[error("start position is not inside a walkable area")]
    StartOutsideMesh,
    #[error("goal position is not inside a walkable area")]
    GoalOutsideMesh,
    #[error("area index {0} is not a valid walkable area")]
    InvalidArea(usize),
    #[error("no route connects the start and goal areas")]
    NoRoute,
    #[error("search gave up after expanding {expanded} nodes")]
    SearchLimitExceeded { expanded: usize },
}

/// Why the boundary fragments of a navigation area could not be chained into a loop.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChainError {
    #[error("(Empty) The area has no boundary fragments")]
    Empty,
    /// (Broken) No fragment starts where the chain ends
    #[error("(Broken) No fragment continues the chain at: {at}, {remaining} fragments left")]
    Broken { at: Point2<Real>, remaining: usize },
    /// (Open) All fragments were used but the chain does not return to its start
    #[error("(Open) The chain ends at: {end} instead of its start")]
    Open { end: Point2<Real> },
}
