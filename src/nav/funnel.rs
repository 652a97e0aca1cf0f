//! Funnel (string-pulling) over a corridor of portals.

use crate::float_types::Real;
use crate::math::{area2, is_equal};
use nalgebra::Point2;

/// Shortest path from `start` to `goal` through `portals`, each given as
/// `(left, right)` as seen when walking through it.
///
/// The result starts with `start` and ends with `goal` exactly; the points between
/// are portal endpoints where the path turns.
pub fn string_pull(
    start: Point2<Real>,
    portals: &[(Point2<Real>, Point2<Real>)],
    goal: Point2<Real>,
) -> Vec<Point2<Real>> {
    let mut path = Vec::with_capacity(portals.len() + 2);
    path.push(start);
    if portals.is_empty() {
        path.push(goal);
        return path;
    }

    // index k of the corridor is portals[k - 1]; 0 is the start, len + 1 the goal
    let corridor_len = portals.len() + 2;
    let portal_at = |k: usize| -> (Point2<Real>, Point2<Real>) {
        if k == 0 {
            (start, start)
        } else if k <= portals.len() {
            portals[k - 1]
        } else {
            (goal, goal)
        }
    };

    let mut apex = start;
    let mut left = start;
    let mut right = start;
    let mut left_index = 0;
    let mut right_index = 0;

    let mut k = 1;
    while k < corridor_len {
        let (new_left, new_right) = portal_at(k);

        // narrow the right side
        if area2(&apex, &right, &new_right) >= 0.0 {
            if is_equal(&apex, &right) || area2(&apex, &left, &new_right) < 0.0 {
                right = new_right;
                right_index = k;
            } else {
                // right crossed over left: left is a corner
                apex = left;
                push_corner(&mut path, apex);
                right = apex;
                right_index = left_index;
                k = left_index + 1;
                continue;
            }
        }

        // narrow the left side
        if area2(&apex, &left, &new_left) <= 0.0 {
            if is_equal(&apex, &left) || area2(&apex, &right, &new_left) > 0.0 {
                left = new_left;
                left_index = k;
            } else {
                apex = right;
                push_corner(&mut path, apex);
                left = apex;
                left_index = right_index;
                k = right_index + 1;
                continue;
            }
        }

        k += 1;
    }

    // the goal may already be there as a corner, possibly off by rounding
    if path.len() > 1 && path.last().is_some_and(|last| is_equal(last, &goal)) {
        path.pop();
    }
    path.push(goal);
    path
}

fn push_corner(path: &mut Vec<Point2<Real>>, p: Point2<Real>) {
    match path.last() {
        Some(last) if is_equal(last, &p) => {},
        _ => path.push(p),
    }
}
