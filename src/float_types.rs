// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Lazily-initialized wall thickness used by every side classification in the crate.
/// A point closer than this to a plane is `In` the plane. It can be overridden:
///  1) **Build-time**: set env var `BSPNAV_WALL_THICKNESS`
///     (e.g. `BSPNAV_WALL_THICKNESS=1e-4 cargo build`)
///  2) **Runtime**: call [`set_wall_thickness`] once before building any tree
static WALL_THICKNESS_CELL: OnceLock<Real> = OnceLock::new();

/// Default distance band treated as "on the plane".
pub const DEFAULT_WALL_THICKNESS: Real = 1e-3;

/// Determinants below this are treated as parallel lines.
#[cfg(feature = "f32")]
pub const DIV_ZERO_EPSILON: Real = 1e-6;
/// Determinants below this are treated as parallel lines.
#[cfg(feature = "f64")]
pub const DIV_ZERO_EPSILON: Real = 1e-9;

/// Two unit normals whose dot product is within this of `1` are parallel.
#[cfg(feature = "f32")]
pub const PARALLEL_EPSILON: Real = 1e-5;
/// Two unit normals whose dot product is within this of `1` are parallel.
#[cfg(feature = "f64")]
pub const PARALLEL_EPSILON: Real = 1e-7;

/// Returns the current wall thickness.
/// If not set yet, it tries `BSPNAV_WALL_THICKNESS` (parsed as the active `Real`) and
/// falls back to [`DEFAULT_WALL_THICKNESS`].
pub fn wall_thickness() -> Real {
    *WALL_THICKNESS_CELL.get_or_init(|| {
        // Compile-time env if provided
        if let Some(environment_variable) = option_env!("BSPNAV_WALL_THICKNESS") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        DEFAULT_WALL_THICKNESS
    })
}

/// Set the wall thickness programmatically once (subsequent calls are ignored).
/// Call near program start: `bspnav::float_types::set_wall_thickness(1e-4);`
pub fn set_wall_thickness(value: Real) {
    let _ = WALL_THICKNESS_CELL.set(value.max(Real::EPSILON));
}

// Pi
/// Archimedes' constant (π)
#[cfg(feature = "f32")]
pub const PI: Real = core::f32::consts::PI;
/// Archimedes' constant (π)
#[cfg(feature = "f64")]
pub const PI: Real = core::f64::consts::PI;

// Frac Pi 2
/// π/2
#[cfg(feature = "f32")]
pub const FRAC_PI_2: Real = core::f32::consts::FRAC_PI_2;
/// π/2
#[cfg(feature = "f64")]
pub const FRAC_PI_2: Real = core::f64::consts::FRAC_PI_2;
