//! Primitive 2D intersection tests shared by the tree, the portal builder and the path finder.

use crate::float_types::{DIV_ZERO_EPSILON, Real, wall_thickness};
use nalgebra::{Point2, Vector2};

/// A directed 2-point segment `v[0] -> v[1]`.
pub type Segment = [Point2<Real>; 2];

/// 2D cross product (z component of the 3D cross product).
#[inline]
pub fn cross(a: &Vector2<Real>, b: &Vector2<Real>) -> Real {
    a.x * b.y - a.y * b.x
}

/// Twice the signed area of triangle `a, b, c`; positive when `c` is left of `a -> b`.
#[inline]
pub fn area2(a: &Point2<Real>, b: &Point2<Real>, c: &Point2<Real>) -> Real {
    cross(&(b - a), &(c - a))
}

/// Component-wise equality within the wall thickness.
#[inline]
pub fn is_equal(a: &Point2<Real>, b: &Point2<Real>) -> bool {
    let tolerance = wall_thickness();
    (a.x - b.x).abs() < tolerance && (a.y - b.y).abs() < tolerance
}

/// Linear interpolation between two points.
#[inline]
pub fn lerp(a: &Point2<Real>, b: &Point2<Real>, t: Real) -> Point2<Real> {
    a + (b - a) * t
}

/// Inclusive point-in-rectangle test.
#[inline]
pub fn is_in_rect(p: &Point2<Real>, min: &Point2<Real>, max: &Point2<Real>) -> bool {
    min.x <= p.x && p.x <= max.x && min.y <= p.y && p.y <= max.y
}

/// Parametric intersection of the lines through `a1 -> a2` and `b1 -> b2`.
///
/// Returns `[tA, tB]` such that `a1 + tA * (a2 - a1) == b1 + tB * (b2 - b1)`,
/// or `None` for (nearly) parallel lines. The fractions are not range checked.
pub fn segment_segment_fractions(
    a1: &Point2<Real>,
    a2: &Point2<Real>,
    b1: &Point2<Real>,
    b2: &Point2<Real>,
) -> Option<[Real; 2]> {
    let dir_a = a2 - a1;
    let dir_b = b2 - b1;

    let det = dir_a.y * dir_b.x - dir_a.x * dir_b.y;
    if det.abs() < DIV_ZERO_EPSILON {
        return None;
    }

    let d = b1 - a1;
    let t_a = (d.y * dir_b.x - d.x * dir_b.y) / det;
    let t_b = (d.y * dir_a.x - d.x * dir_a.y) / det;
    Some([t_a, t_b])
}

/// Segment/segment overlap test where both fractions may exceed `[0, 1]` by `error`.
pub fn segment_segment_test(
    a1: &Point2<Real>,
    a2: &Point2<Real>,
    b1: &Point2<Real>,
    b2: &Point2<Real>,
    error: Real,
) -> bool {
    let in_range = |t: Real| (-error..=1.0 + error).contains(&t);
    match segment_segment_fractions(a1, a2, b1, b2) {
        Some([t_a, t_b]) => in_range(t_a) && in_range(t_b),
        None => false,
    }
}

/// Slab test of the infinite line `pos + t * dir` against the box `[min, max]`.
///
/// Returns the entry and exit parameters `[t0, t1]` with `t0 <= t1`, or `None` if the
/// line misses the box. A line running along a box side counts as a hit.
pub fn line_aabb_test(
    pos: &Point2<Real>,
    dir: &Vector2<Real>,
    min: &Point2<Real>,
    max: &Point2<Real>,
) -> Option<[Real; 2]> {
    let mut d_min = Real::MIN;
    let mut d_max = Real::MAX;
    for axis in 0..2 {
        if dir[axis].abs() < DIV_ZERO_EPSILON {
            if pos[axis] < min[axis] || pos[axis] > max[axis] {
                return None;
            }
        } else {
            let inv_d = 1.0 / dir[axis];
            let mut d1 = (min[axis] - pos[axis]) * inv_d;
            let mut d2 = (max[axis] - pos[axis]) * inv_d;
            if d1 > d2 {
                core::mem::swap(&mut d1, &mut d2);
            }
            d_min = d_min.max(d1);
            d_max = d_max.min(d2);
            if d_min > d_max {
                return None;
            }
        }
    }
    Some([d_min, d_max])
}
