//! Obstacle polygons and the small set of polygon predicates the navigation mesh needs.

use crate::errors::ValidationError;
use crate::float_types::Real;
use crate::math::{is_equal, is_in_rect};
use geo::{Area, Centroid, Contains, Coord, Intersects, LineString, Point, Polygon as GeoPolygon};
use nalgebra::{Isometry2, Point2};

/// A closed, solid obstacle outline.
///
/// The last vertex connects back to the first; the loop is not stored closed.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyArea {
    vertices: Vec<Point2<Real>>,
}

impl PolyArea {
    pub const fn new(vertices: Vec<Point2<Real>>) -> Self {
        PolyArea { vertices }
    }

    /// Counter-clockwise outline of the axis aligned rectangle `[min, max]`.
    pub fn from_rect(min: Point2<Real>, max: Point2<Real>) -> Self {
        PolyArea::new(vec![
            min,
            Point2::new(max.x, min.y),
            max,
            Point2::new(min.x, max.y),
        ])
    }

    /// Footprint of a placed object: the local rectangle `[min, max]` grown by `border`
    /// on every side, then moved by `transform`.
    ///
    /// ```
    /// use bspnav::float_types::FRAC_PI_2;
    /// use bspnav::polygon::PolyArea;
    /// use nalgebra::{Isometry2, Point2, Vector2};
    ///
    /// let shelf = PolyArea::from_transformed_rect(
    ///     Point2::new(-1.0, -0.5),
    ///     Point2::new(1.0, 0.5),
    ///     &Isometry2::new(Vector2::new(10.0, 5.0), FRAC_PI_2),
    ///     0.1,
    /// );
    /// assert_eq!(shelf.len(), 4);
    /// assert!(shelf.signed_area() > 0.0);
    /// ```
    pub fn from_transformed_rect(
        min: Point2<Real>,
        max: Point2<Real>,
        transform: &Isometry2<Real>,
        border: Real,
    ) -> Self {
        let lo = Point2::new(min.x - border, min.y - border);
        let hi = Point2::new(max.x + border, max.y + border);
        let mut area = PolyArea::from_rect(lo, hi);
        for v in &mut area.vertices {
            *v = transform.transform_point(v);
        }
        area
    }

    pub fn vertices(&self) -> &[Point2<Real>] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Shoelace area, positive for counter-clockwise loops (y up).
    pub fn signed_area(&self) -> Real {
        signed_area(&self.vertices)
    }

    /// Reverse the loop if it winds clockwise.
    pub fn make_counter_clockwise(&mut self) {
        if self.signed_area() < 0.0 {
            self.vertices.reverse();
        }
    }

    /// Check that the polygon can take part in a tree build inside `[min, max]`.
    /// `index` is only used to label the error.
    pub fn validate(
        &self,
        index: usize,
        min: &Point2<Real>,
        max: &Point2<Real>,
    ) -> Result<(), ValidationError> {
        if self.vertices.len() < 3 {
            return Err(ValidationError::TooFewPoints {
                polygon: index,
                count: self.vertices.len(),
            });
        }

        let mut prev = self.vertices[self.vertices.len() - 1];
        for &point in &self.vertices {
            if !(point.x.is_finite() && point.y.is_finite()) {
                return Err(ValidationError::InvalidCoordinate { polygon: index, point });
            }
            if !is_in_rect(&point, min, max) {
                return Err(ValidationError::OutOfBounds { polygon: index, point });
            }
            if is_equal(&prev, &point) {
                return Err(ValidationError::RepeatedPoint { polygon: index, point });
            }
            prev = point;
        }
        Ok(())
    }

    pub fn to_geo(&self) -> GeoPolygon<Real> {
        to_geo(&self.vertices)
    }

    /// True if `point` is strictly inside the obstacle.
    pub fn contains_point(&self, point: &Point2<Real>) -> bool {
        polygon_contains(&self.vertices, point)
    }
}

impl From<Vec<Point2<Real>>> for PolyArea {
    fn from(vertices: Vec<Point2<Real>>) -> Self {
        PolyArea::new(vertices)
    }
}

fn to_geo(vertices: &[Point2<Real>]) -> GeoPolygon<Real> {
    let coords: Vec<Coord<Real>> = vertices
        .iter()
        .map(|v| Coord { x: v.x, y: v.y })
        .collect();
    // LineString is closed by Polygon::new
    GeoPolygon::new(LineString::new(coords), Vec::new())
}

/// Shoelace area of an open vertex loop, positive for counter-clockwise winding.
pub fn signed_area(vertices: &[Point2<Real>]) -> Real {
    if vertices.len() < 3 {
        return 0.0;
    }
    to_geo(vertices).signed_area()
}

/// Area centroid of a simple polygon, `None` for degenerate (zero area) loops.
pub fn polygon_centroid(vertices: &[Point2<Real>]) -> Option<Point2<Real>> {
    if vertices.len() < 3 {
        return None;
    }
    let polygon = to_geo(vertices);
    if polygon.unsigned_area() <= Real::EPSILON {
        return None;
    }
    polygon.centroid().map(|c| Point2::new(c.x(), c.y()))
}

/// Strict interior test, points on the boundary are outside.
pub fn polygon_contains(vertices: &[Point2<Real>], point: &Point2<Real>) -> bool {
    vertices.len() >= 3 && to_geo(vertices).contains(&Point::new(point.x, point.y))
}

/// Interior-or-boundary test.
pub fn polygon_intersects(vertices: &[Point2<Real>], point: &Point2<Real>) -> bool {
    vertices.len() >= 3 && to_geo(vertices).intersects(&Point::new(point.x, point.y))
}
