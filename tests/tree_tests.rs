mod support;

use bspnav::bsp::{FirstSplitStrategy, NodeKind, Tag};
use bspnav::float_types::{Real, wall_thickness};
use bspnav::math::segment_segment_fractions;
use bspnav::observer::Step;
use bspnav::{PolyArea, Tree, ValidationError};
use nalgebra::Point2;
use support::{XorShift, bounds, build_tree, center_square, random_rects, rect_obstacle};

/// Brute force line of sight over every edge fragment of the tree, with the same
/// endpoint band the tree query uses.
fn brute_force_blocked(tree: &Tree, start: &Point2<Real>, end: &Point2<Real>) -> bool {
    let tolerance = wall_thickness();
    tree.edges().iter().any(|edge| {
        segment_segment_fractions(start, end, &edge.v[0], &edge.v[1]).is_some_and(
            |[t_query, t_edge]| {
                (0.0..=1.0).contains(&t_query) && tolerance <= t_edge && t_edge <= 1.0 - tolerance
            },
        )
    })
}

/// True if the query is too close to a split plane or an edge corner for the tree and
/// the brute force to be expected to agree.
fn ambiguous(tree: &Tree, start: &Point2<Real>, end: &Point2<Real>) -> bool {
    let margin = 0.05;
    let near_plane = tree.nodes().iter().filter_map(|n| n.plane()).any(|plane| {
        plane.signed_distance(start).abs() < margin || plane.signed_distance(end).abs() < margin
    });
    let near_corner = tree.edges().iter().any(|edge| {
        segment_segment_fractions(start, end, &edge.v[0], &edge.v[1]).is_some_and(
            |[t_query, t_edge]| {
                let band = 0.1 / edge.length().max(Real::EPSILON);
                let crosses =
                    (-0.01..=1.01).contains(&t_query) && (-band..=1.0 + band).contains(&t_edge);
                crosses
                    && (t_edge.abs() < band
                        || (t_edge - 1.0).abs() < band
                        || t_query.abs() < 0.01
                        || (t_query - 1.0).abs() < 0.01)
            },
        )
    });
    near_plane || near_corner
}

#[test]
fn tree_empty_world_is_single_leaf() {
    let tree = build_tree(&[]);
    assert_eq!(tree.internal_nodes().len(), 0);
    assert_eq!(tree.leaves().len(), 1);
    assert_eq!(tree.edges().len(), 4);
    assert!(tree.edges().iter().all(|e| e.poly_index.is_none()));
    assert_eq!(tree.get_leaf(Point2::new(3.0, 17.0)), Some(0));
    assert!(tree.segment_test(Point2::new(1.0, 1.0), Point2::new(19.0, 19.0)).is_none());
}

#[test]
fn tree_square_obstacle_shape() {
    let tree = build_tree(&[center_square()]);
    assert_eq!(tree.internal_nodes().len(), 3);
    assert_eq!(tree.leaves().len(), 4);
    // 4 obstacle edges, 4 box edges and 4 fragments cut off the box
    assert_eq!(tree.edges().len(), 12);

    // every edge fragment ends up in exactly one leaf
    let mut seen = vec![0usize; tree.edges().len()];
    for leaf in tree.leaves() {
        for &edge in &leaf.edges {
            seen[edge] += 1;
        }
    }
    assert!(seen.iter().all(|&count| count == 1), "{seen:?}");

    // internal nodes are listed parents first and carry their construction order
    for (order, &node_id) in tree.internal_nodes().iter().enumerate() {
        let node = &tree.nodes()[node_id];
        assert_eq!(node.tag, Tag::internal(order));
        if let Some(parent) = node.parent {
            let parent_order = tree.internal_nodes().iter().position(|&n| n == parent);
            assert!(parent_order.is_some_and(|p| p < order));
        }
        assert_eq!(tree.node_by_tag(node.tag), Some(node_id));
    }
    for (index, leaf) in tree.leaves().iter().enumerate() {
        let tag = tree.nodes()[leaf.node].tag;
        assert!(tag.is_leaf());
        assert_eq!(tag.leaf_index(), Some(index));
        assert_eq!(tree.leaf_by_tag(tag), Some(leaf));
    }
}

#[test]
fn tree_free_space_has_a_leaf() {
    let tree = build_tree(&[center_square()]);
    for p in [
        Point2::new(4.0, 10.0),
        Point2::new(16.0, 10.0),
        Point2::new(10.0, 4.0),
        Point2::new(10.0, 16.0),
        Point2::new(1.0, 1.0),
        Point2::new(19.0, 19.0),
    ] {
        assert!(tree.get_leaf(p).is_some(), "{p} should be in empty space");
    }
}

#[test]
fn tree_leaf_lookup_is_stable_inside_cells() {
    let tree = build_tree(&[center_square()]);
    let mut rng = XorShift::new(3);
    for _ in 0..500 {
        let p = rng.point(0.5, 19.5);
        if near_square(&p) {
            continue;
        }
        let leaf = tree.get_leaf(p).expect("free space belongs to a leaf");
        // the point lies in front of (or on) every boundary edge of its leaf
        for &edge in &tree.leaves()[leaf].edges {
            let plane = &tree.edges()[edge].plane;
            assert!(
                plane.signed_distance(&p) >= -wall_thickness(),
                "{p} is behind edge {edge} of leaf {leaf}"
            );
        }
    }
}

fn near_square(p: &Point2<Real>) -> bool {
    (7.99..=12.01).contains(&p.x) && (7.99..=12.01).contains(&p.y)
}

#[test]
fn tree_segment_test_blocks_through_obstacle() {
    let tree = build_tree(&[center_square()]);
    let hit = tree
        .segment_test(Point2::new(4.0, 10.0), Point2::new(16.0, 10.0))
        .expect("the square blocks the horizontal line");
    assert!((0.0..=1.0).contains(&hit.fraction));
    assert_eq!(tree.edges()[hit.edge].poly_index, Some(0));

    assert!(tree.segment_test(Point2::new(4.0, 4.0), Point2::new(16.0, 4.0)).is_none());
    assert!(tree.segment_test(Point2::new(1.0, 19.0), Point2::new(7.0, 1.0)).is_none());
    assert!(tree.segment_test(Point2::new(10.0, 1.0), Point2::new(10.0, 19.0)).is_some());
}

#[test]
fn tree_segment_test_blocks_corner_to_corner() {
    let tree = build_tree(&[rect_obstacle([5.0, 5.0], [10.0, 10.0])]);

    // enters at (5, 5) and leaves at (10, 10) without crossing an edge's interior
    let hit = tree
        .segment_test(Point2::new(2.0, 2.0), Point2::new(18.0, 18.0))
        .expect("the diagonal runs through the box");
    assert!((hit.fraction - 3.0 / 16.0).abs() < 1e-9, "{hit:?}");
    assert_eq!(tree.edges()[hit.edge].poly_index, Some(0));

    assert!(tree.segment_test(Point2::new(3.0, 12.0), Point2::new(12.0, 3.0)).is_some());
    assert!(tree.segment_test(Point2::new(5.0, 5.0), Point2::new(9.0, 9.0)).is_some());

    // grazing a single corner stays clear
    assert!(tree.segment_test(Point2::new(1.0, 9.0), Point2::new(9.0, 1.0)).is_none());
    assert!(tree.segment_test(Point2::new(2.0, 2.0), Point2::new(5.0, 5.0)).is_none());

    assert!(tree.is_solid(Point2::new(7.5, 7.5)));
    assert!(!tree.is_solid(Point2::new(3.0, 3.0)));
    assert!(!tree.is_solid(Point2::new(14.0, 14.0)));
}

#[test]
fn tree_zero_length_segment_never_hits() {
    let tree = build_tree(&[center_square()]);
    for p in [
        Point2::new(8.0, 10.0),
        Point2::new(8.0, 8.0),
        Point2::new(4.0, 4.0),
        Point2::new(10.0, 10.0),
    ] {
        assert!(tree.segment_test(p, p).is_none(), "{p}");
    }
}

#[test]
fn tree_segment_test_matches_brute_force() {
    let mut rng = XorShift::new(0x5eed);
    let mut checked = 0;
    for layout in 0..6 {
        let obstacles = random_rects(&mut rng, 3 + layout);
        let tree = build_tree(&obstacles);
        for _ in 0..300 {
            let start = rng.point(0.25, 19.75);
            let end = rng.point(0.25, 19.75);
            if ambiguous(&tree, &start, &end) {
                continue;
            }
            checked += 1;
            assert_eq!(
                tree.segment_test(start, end).is_some(),
                brute_force_blocked(&tree, &start, &end),
                "layout {layout}: {start} -> {end}"
            );
        }
    }
    assert!(checked > 500, "too few unambiguous queries: {checked}");
}

#[test]
fn tree_strategies_agree_on_visibility() {
    let obstacles = [
        rect_obstacle([2.0, 2.0], [5.0, 4.0]),
        rect_obstacle([12.0, 3.0], [17.0, 7.0]),
        center_square(),
    ];
    let (min, max) = bounds();
    let balanced = build_tree(&obstacles);
    let mut first = Tree::new();
    first
        .build_with_strategy(&obstacles, min, max, &FirstSplitStrategy)
        .expect("valid layout");

    // none of these pass through a corner or run along a split line
    let queries = [
        (Point2::new(1.0, 1.5), Point2::new(19.0, 18.5)),
        (Point2::new(1.0, 2.5), Point2::new(19.0, 2.5)),
        (Point2::new(1.0, 10.0), Point2::new(7.0, 19.0)),
        (Point2::new(1.0, 15.0), Point2::new(19.0, 15.0)),
        (Point2::new(6.0, 1.0), Point2::new(6.0, 19.0)),
        (Point2::new(10.0, 1.0), Point2::new(10.0, 19.0)),
    ];
    for (start, end) in queries {
        assert_eq!(
            balanced.segment_test(start, end).is_some(),
            first.segment_test(start, end).is_some(),
            "{start} -> {end}"
        );
    }
}

#[test]
fn tree_clockwise_obstacles_are_reoriented() {
    let ccw = center_square();
    let mut vertices = ccw.vertices().to_vec();
    vertices.reverse();
    let cw = PolyArea::new(vertices);
    assert!(cw.signed_area() < 0.0);

    let a = build_tree(&[ccw]);
    let b = build_tree(&[cw]);
    assert_eq!(a.leaves().len(), b.leaves().len());
    assert_eq!(a.edges().len(), b.edges().len());
    let (start, end) = (Point2::new(4.0, 10.0), Point2::new(16.0, 10.0));
    assert!(b.segment_test(start, end).is_some());
}

#[test]
fn tree_observer_sees_every_node() {
    let (min, max) = bounds();
    let mut tree = Tree::new();
    let mut splits = 0;
    let mut leaves = 0;
    let mut record = |step: &Step| match step {
        Step::NodeSplit { .. } => splits += 1,
        Step::LeafCreated { .. } => leaves += 1,
        _ => {},
    };
    tree.build_with_observer(
        &[center_square()],
        min,
        max,
        &bspnav::bsp::BalancedSplitStrategy::default(),
        &mut record,
    )
    .expect("valid layout");
    assert_eq!(splits, tree.internal_nodes().len());
    assert_eq!(leaves, tree.leaves().len());
    assert!(tree.nodes().iter().all(|n| match n.kind {
        NodeKind::Leaf { .. } => n.is_leaf(),
        NodeKind::Internal { .. } => !n.is_leaf() && n.plane().is_some(),
    }));
}

#[test]
fn tree_rejects_invalid_input() {
    let (min, max) = bounds();
    let mut tree = build_tree(&[center_square()]);
    let leaves_before = tree.leaves().len();

    let err = tree.build(&[], max, min).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidBounds { .. }));

    let two = PolyArea::new(vec![Point2::new(1.0, 1.0), Point2::new(2.0, 1.0)]);
    let err = tree.build(&[center_square(), two], min, max).unwrap_err();
    assert_eq!(err, ValidationError::TooFewPoints { polygon: 1, count: 2 });

    let nan = PolyArea::new(vec![
        Point2::new(1.0, 1.0),
        Point2::new(Real::NAN, 1.0),
        Point2::new(2.0, 2.0),
    ]);
    let err = tree.build(&[nan], min, max).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidCoordinate { polygon: 0, .. }));

    let outside = rect_obstacle([15.0, 15.0], [21.0, 18.0]);
    let err = tree.build(&[outside], min, max).unwrap_err();
    assert!(matches!(err, ValidationError::OutOfBounds { polygon: 0, .. }));

    let repeated = PolyArea::new(vec![
        Point2::new(1.0, 1.0),
        Point2::new(4.0, 1.0),
        Point2::new(4.0, 1.0),
        Point2::new(4.0, 4.0),
    ]);
    let err = tree.build(&[repeated], min, max).unwrap_err();
    assert_eq!(
        err,
        ValidationError::RepeatedPoint {
            polygon: 0,
            point: Point2::new(4.0, 1.0)
        }
    );

    // failed builds keep the previous tree
    assert_eq!(tree.leaves().len(), leaves_before);
    assert!(
        tree.segment_test(Point2::new(4.0, 10.0), Point2::new(16.0, 10.0))
            .is_some()
    );
}

#[test]
fn tree_obstacle_touching_world_edge_is_accepted() {
    let (min, max) = bounds();
    let mut tree = Tree::new();
    tree.build(&[rect_obstacle([0.0, 8.0], [6.0, 12.0])], min, max)
        .expect("obstacles may touch the world bound");
    assert!(tree.get_leaf(Point2::new(3.0, 3.0)).is_some());
    assert!(tree.get_leaf(Point2::new(3.0, 17.0)).is_some());
    assert!(tree.segment_test(Point2::new(3.0, 3.0), Point2::new(3.0, 17.0)).is_some());
}
