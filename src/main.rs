// main.rs
//
// Small store floor: a few rotated shelves inside the default 20 x 20 world.
// Builds the navigation mesh and logs the waypoints of some walks across the floor.
// RUST_LOG=debug shows the tree and portal statistics as well.

use bspnav::float_types::FRAC_PI_2;
use bspnav::{NavConfig, NavManager, PolyArea};
use nalgebra::{Isometry2, Point2, Vector2};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = NavConfig::from_env();
    let border = config.obstacle_border;

    // (position, rotation) of each 4 x 1 shelf
    let placements = [
        (Vector2::new(6.0, 5.0), 0.0),
        (Vector2::new(14.0, 5.0), 0.0),
        (Vector2::new(5.0, 14.0), FRAC_PI_2),
        (Vector2::new(10.0, 10.0), 0.4),
        (Vector2::new(15.0, 15.0), -0.3),
    ];
    let shelves: Vec<PolyArea> = placements
        .iter()
        .map(|&(pos, angle)| {
            PolyArea::from_transformed_rect(
                Point2::new(-2.0, -0.5),
                Point2::new(2.0, 0.5),
                &Isometry2::new(pos, angle),
                border,
            )
        })
        .collect();

    let mut nav = NavManager::new(config);
    if let Err(err) = nav.build_mesh(&shelves) {
        error!(%err, "could not build the navigation mesh");
        return;
    }
    info!(
        leaves = nav.tree().leaves().len(),
        portals = nav.portal_builder().portals().count(),
        areas = nav.mesh().valid_area_count(),
        links = nav.mesh().links.len(),
        "store floor ready"
    );

    let walks = [
        (Point2::new(1.0, 1.0), Point2::new(19.0, 19.0)),
        (Point2::new(1.0, 5.0), Point2::new(19.0, 5.0)),
        (Point2::new(10.0, 1.0), Point2::new(10.0, 19.0)),
        (Point2::new(2.0, 18.0), Point2::new(18.0, 2.0)),
        // inside a shelf
        (Point2::new(6.0, 5.0), Point2::new(19.0, 19.0)),
    ];
    for (from, to) in walks {
        match nav.find_path(from, to) {
            Ok(path) => {
                let waypoints: Vec<String> = path
                    .iter()
                    .map(|p| format!("({:.2}, {:.2})", p.x, p.y))
                    .collect();
                info!(%from, %to, waypoints = %waypoints.join(" -> "), "path");
            },
            Err(err) => warn!(%from, %to, %err, "no path"),
        }
    }
}
