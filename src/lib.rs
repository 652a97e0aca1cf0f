//! 2D **binary space partitioning**, portal extraction and navigation-mesh path finding.
//!
//! Solid obstacles are given as polygons inside a fixed world rectangle. A [BSP](bsp)
//! tree splits the free space into convex cells, the [`PortalBuilder`](bsp::PortalBuilder)
//! finds the open boundaries between neighbouring cells, and the [`nav`] module turns
//! cells and portals into walkable areas and links, searches them with A* and
//! string-pulls the result through the crossed portals.
//!
//! ```
//! use bspnav::{NavConfig, NavManager, PolyArea};
//! use nalgebra::Point2;
//!
//! let mut nav = NavManager::new(NavConfig::default());
//! let crate_box = PolyArea::from_rect(Point2::new(8.0, 8.0), Point2::new(12.0, 12.0));
//! nav.build_mesh(&[crate_box]).unwrap();
//!
//! let path = nav.find_path(Point2::new(4.0, 10.0), Point2::new(16.0, 10.0)).unwrap();
//! assert_eq!(path.first(), Some(&Point2::new(4.0, 10.0)));
//! assert_eq!(path.last(), Some(&Point2::new(16.0, 10.0)));
//! ```
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - **demo**: build the `bspnav` demo binary (pulls in `tracing-subscriber`)
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64

#![forbid(unsafe_code)]
#![warn(clippy::approx_constant, clippy::all)]

pub mod bsp;
pub mod config;
pub mod errors;
pub mod float_types;
pub mod math;
pub mod nav;
pub mod observer;
pub mod plane;
pub mod polygon;

#[cfg(any(
    all(feature = "f64", feature = "f32"),
    not(any(feature = "f64", feature = "f32"))
))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use bsp::{PortalBuilder, Tree};
pub use config::NavConfig;
pub use errors::{ChainError, PathError, ValidationError};
pub use float_types::Real;
pub use nav::{NavManager, NavMesh};
pub use observer::{Step, StepObserver};
pub use plane::{Plane, Side};
pub use polygon::PolyArea;
