//! Oriented 2D lines ("planes") with tolerance-aware side classification,
//! segment splitting and clipping.

use crate::float_types::{Real, wall_thickness};
use crate::math::{Segment, lerp};
use nalgebra::{Point2, Vector2};

/// Where a point or a segment lies relative to a [`Plane`].
///
/// Point classification never yields [`Side::Split`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
    /// Within the wall thickness of the plane.
    In,
    /// A segment with one endpoint strictly in front and the other strictly behind.
    Split,
}

impl Side {
    /// The opposite side; `In` and `Split` are their own inverse.
    pub const fn inverse(self) -> Self {
        match self {
            Side::Front => Side::Back,
            Side::Back => Side::Front,
            other => other,
        }
    }

    const fn sign(self) -> i8 {
        match self {
            Side::Front => 1,
            Side::Back => -1,
            _ => 0,
        }
    }
}

/// Outcome of [`Plane::clip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipResult {
    /// Nothing is left on the kept side (coplanar segments are removed as well).
    Removed,
    /// The segment already lies on the kept side.
    Unchanged,
    /// One endpoint was moved onto the plane.
    Clipped,
}

/// A 2D half-space boundary: `dot(normal, p) + offset == 0`, with `|normal| == 1`.
///
/// Points with a positive signed distance are in front.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector2<Real>,
    offset: Real,
}

impl Plane {
    /// Create a plane from a (not necessarily unit) normal and the offset of the unit plane.
    pub fn from_normal(normal: Vector2<Real>, offset: Real) -> Self {
        Plane {
            normal: normal.normalize(),
            offset,
        }
    }

    /// Plane through `v1 -> v2`.
    ///
    /// The normal is the edge direction turned clockwise by 90 degrees, so for a
    /// counter-clockwise polygon it points away from the interior.
    pub fn from_points(v1: Point2<Real>, v2: Point2<Real>) -> Self {
        let dir = v2 - v1;
        let len = dir.norm();
        if len < Real::EPSILON {
            // Degenerate edge, return a default plane through v1
            return Plane {
                normal: Vector2::x(),
                offset: -v1.x,
            };
        }
        let normal = Vector2::new(dir.y, -dir.x) / len;
        Plane {
            normal,
            offset: -normal.dot(&v1.coords),
        }
    }

    pub const fn normal(&self) -> Vector2<Real> {
        self.normal
    }

    pub const fn offset(&self) -> Real {
        self.offset
    }

    /// Unit direction along the plane, matching the `v1 -> v2` direction of
    /// [`Plane::from_points`].
    pub fn direction(&self) -> Vector2<Real> {
        Vector2::new(-self.normal.y, self.normal.x)
    }

    /// The point of the plane closest to the origin.
    pub fn any_point(&self) -> Point2<Real> {
        Point2::from(self.normal * -self.offset)
    }

    /// Flip the plane (reverse normal and offset).
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.offset = -self.offset;
    }

    /// Return a flipped copy of this plane.
    pub fn flipped(&self) -> Self {
        Plane {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    #[inline]
    pub fn signed_distance(&self, point: &Point2<Real>) -> Real {
        self.normal.dot(&point.coords) + self.offset
    }

    /// Classify a point: `Front` iff `d > tolerance`, `Back` iff `d < -tolerance`, else `In`.
    #[inline]
    pub fn test_side(&self, point: &Point2<Real>, tolerance: Real) -> Side {
        self.test_side_dist(point, tolerance).0
    }

    /// Like [`Plane::test_side`] but also returns the signed distance.
    #[inline]
    pub fn test_side_dist(&self, point: &Point2<Real>, tolerance: Real) -> (Side, Real) {
        let dist = self.signed_distance(point);
        let side = if dist > tolerance {
            Side::Front
        } else if dist < -tolerance {
            Side::Back
        } else {
            Side::In
        };
        (side, dist)
    }

    /// Joint classification of two endpoint sides.
    /// Returns `None` when the endpoints straddle the plane.
    fn combine(s0: Side, s1: Side) -> Option<Side> {
        if s0.sign() + s1.sign() != 0 {
            return Some(if s0 != Side::In { s0 } else { s1 });
        }
        if s0 == Side::In {
            return Some(Side::In);
        }
        None
    }

    /// Point where the segment `v[0] -> v[1]` crosses the plane, given the signed distance
    /// of `v[1]`.
    fn crossing(&self, v: &Segment, dist1: Real) -> Point2<Real> {
        // plane(v1 + t * (v0 - v1)) == 0
        let dir = v[0] - v[1];
        let t = -dist1 / self.normal.dot(&dir);
        lerp(&v[1], &v[0], t)
    }

    /// Classify a segment, splitting it when it straddles the plane.
    ///
    /// On [`Side::Split`] the input keeps the front fragment and the back fragment
    /// is returned. Both fragments keep the original direction.
    pub fn split(&self, v: &mut Segment) -> (Side, Option<Segment>) {
        let tolerance = wall_thickness();
        let s0 = self.test_side(&v[0], tolerance);
        let (s1, dist1) = self.test_side_dist(&v[1], tolerance);
        if let Some(side) = Self::combine(s0, s1) {
            return (side, None);
        }

        let p = self.crossing(v, dist1);
        let back = if s0 == Side::Front {
            let back = [p, v[1]];
            v[1] = p;
            back
        } else {
            let back = [v[0], p];
            v[0] = p;
            back
        };
        (Side::Split, Some(back))
    }

    /// Clip a segment against the plane, keeping the front (or back) part.
    pub fn clip(&self, keep_front: bool, v: &mut Segment) -> ClipResult {
        let clip_side = if keep_front { Side::Front } else { Side::Back };
        let tolerance = wall_thickness();
        let s0 = self.test_side(&v[0], tolerance);
        let (s1, dist1) = self.test_side_dist(&v[1], tolerance);
        match Self::combine(s0, s1) {
            Some(Side::In) => ClipResult::Removed,
            Some(side) if side == clip_side => ClipResult::Unchanged,
            Some(_) => ClipResult::Removed,
            None => {
                let p = self.crossing(v, dist1);
                // keep the endpoint that is on the kept side
                if s0 == clip_side {
                    v[1] = p;
                } else {
                    v[0] = p;
                }
                ClipResult::Clipped
            },
        }
    }

    /// Non-mutating segment classification.
    pub fn test_segment(&self, v: &Segment) -> Side {
        let tolerance = wall_thickness();
        let s0 = self.test_side(&v[0], tolerance);
        let s1 = self.test_side(&v[1], tolerance);
        Self::combine(s0, s1).unwrap_or(Side::Split)
    }
}
