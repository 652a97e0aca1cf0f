//! Test support library
//! Provides layouts and small helpers shared by the integration tests.
#![allow(dead_code)]

use bspnav::{NavConfig, NavManager, PolyArea, Tree, bsp::PortalBuilder, float_types::Real};
use nalgebra::Point2;

pub fn bounds() -> (Point2<Real>, Point2<Real>) {
    (Point2::new(0.0, 0.0), Point2::new(20.0, 20.0))
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

pub fn points_close(a: &Point2<Real>, b: &Point2<Real>, eps: Real) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps)
}

/// Axis aligned obstacle `[min, max]`.
pub fn rect_obstacle(min: [Real; 2], max: [Real; 2]) -> PolyArea {
    PolyArea::from_rect(Point2::new(min[0], min[1]), Point2::new(max[0], max[1]))
}

/// The square obstacle `[8, 12] x [8, 12]` in the middle of the world.
pub fn center_square() -> PolyArea {
    rect_obstacle([8.0, 8.0], [12.0, 12.0])
}

pub fn build_tree(obstacles: &[PolyArea]) -> Tree {
    let (min, max) = bounds();
    let mut tree = Tree::new();
    tree.build(obstacles, min, max).expect("valid layout");
    tree
}

pub fn build_portals(tree: &Tree) -> PortalBuilder {
    let (min, max) = bounds();
    let mut builder = PortalBuilder::new();
    builder.build(tree, min, max);
    builder
}

pub fn manager(obstacles: &[PolyArea]) -> NavManager {
    let mut nav = NavManager::new(NavConfig::default());
    nav.build_mesh(obstacles).expect("valid layout");
    nav
}

/// True if `b` is a rotation of `a`.
pub fn same_loop(a: &[Point2<Real>], b: &[Point2<Real>]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    (0..a.len()).any(|shift| {
        a.iter()
            .enumerate()
            .all(|(i, p)| points_close(p, &b[(i + shift) % b.len()], 1e-9))
    })
}

/// Deterministic xorshift generator for randomised layouts.
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        XorShift(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `[lo, hi)`.
    pub fn range(&mut self, lo: Real, hi: Real) -> Real {
        let unit = (self.next_u64() >> 11) as Real / (1u64 << 53) as Real;
        lo + (hi - lo) * unit
    }

    pub fn point(&mut self, lo: Real, hi: Real) -> Point2<Real> {
        Point2::new(self.range(lo, hi), self.range(lo, hi))
    }
}

/// Non-overlapping rectangles on a 4 x 4 grid of 5 x 5 cells, each cell holding at
/// most one obstacle with a margin to the cell border.
pub fn random_rects(rng: &mut XorShift, count: usize) -> Vec<PolyArea> {
    let mut cells: Vec<usize> = (0..16).collect();
    let mut obstacles = Vec::new();
    for _ in 0..count.min(16) {
        let pick = (rng.next_u64() % cells.len() as u64) as usize;
        let cell = cells.swap_remove(pick);
        let ox = (cell % 4) as Real * 5.0;
        let oy = (cell / 4) as Real * 5.0;
        let x0 = ox + rng.range(0.5, 1.5);
        let y0 = oy + rng.range(0.5, 1.5);
        let x1 = ox + rng.range(3.0, 4.5);
        let y1 = oy + rng.range(3.0, 4.5);
        obstacles.push(rect_obstacle([x0, y0], [x1, y1]));
    }
    obstacles
}

/// Layouts whose obstacles share an edge, overlap, meet at a corner, end on another
/// obstacle's edge, touch the world border or sit closer than the wall thickness.
pub fn adversarial_layouts() -> Vec<(&'static str, Vec<PolyArea>)> {
    vec![
        (
            "shared edge",
            vec![rect_obstacle([4.0, 8.0], [8.0, 12.0]), rect_obstacle([8.0, 8.0], [13.0, 12.0])],
        ),
        (
            "t-junction",
            vec![rect_obstacle([4.0, 8.0], [8.0, 12.0]), rect_obstacle([6.0, 12.0], [10.0, 15.0])],
        ),
        (
            "overlap",
            vec![rect_obstacle([4.0, 7.0], [10.0, 11.0]), rect_obstacle([8.0, 9.0], [14.0, 13.0])],
        ),
        (
            "corner touch",
            vec![rect_obstacle([4.0, 4.0], [8.0, 8.0]), rect_obstacle([8.0, 8.0], [12.0, 12.0])],
        ),
        (
            "world border",
            vec![rect_obstacle([0.0, 8.0], [6.0, 12.0]), rect_obstacle([14.0, 0.0], [17.0, 5.0])],
        ),
        (
            "nearly coincident",
            vec![
                rect_obstacle([4.0, 8.0], [8.0, 12.0]),
                rect_obstacle([8.0001, 8.0], [12.0, 12.0]),
            ],
        ),
    ]
}

/// Free points near the world corners and on the vertical line `x = 9`, clear of every
/// obstacle in [`adversarial_layouts`].
pub fn adversarial_queries() -> [(Point2<Real>, Point2<Real>); 3] {
    [
        (Point2::new(1.0, 1.0), Point2::new(19.0, 19.0)),
        (Point2::new(1.0, 19.0), Point2::new(19.0, 1.0)),
        (Point2::new(9.0, 1.0), Point2::new(9.0, 19.0)),
    ]
}
