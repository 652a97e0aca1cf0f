//! Navigation settings.

use crate::float_types::Real;
use nalgebra::Point2;
use std::env;

/// Settings of a [`NavManager`](crate::nav::NavManager).
#[derive(Clone, Debug, PartialEq)]
pub struct NavConfig {
    /// Lower corner of the fixed world rectangle.
    pub bound_min: Point2<Real>,
    /// Upper corner of the fixed world rectangle.
    pub bound_max: Point2<Real>,
    /// String-pull the corridor instead of returning the raw search waypoints.
    pub use_funnel: bool,
    /// Drop waypoints that can be skipped with a clear line of sight.
    pub optimize_path: bool,
    /// Node expansions after which a search gives up.
    pub max_search_expansions: usize,
    /// Margin added around placed footprints.
    pub obstacle_border: Real,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            bound_min: Point2::new(0.0, 0.0),
            bound_max: Point2::new(20.0, 20.0),
            use_funnel: true,
            optimize_path: true,
            max_search_expansions: 65_536,
            obstacle_border: 0.1,
        }
    }
}

impl NavConfig {
    /// Defaults overlaid with `BSPNAV_*` environment variables.
    /// Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let point = |key: &str| lookup(key).and_then(|s| parse_point(&s));
        let flag = |key: &str| lookup(key).and_then(|s| parse_flag(&s));

        Self {
            bound_min: point("BSPNAV_BOUND_MIN").unwrap_or(defaults.bound_min),
            bound_max: point("BSPNAV_BOUND_MAX").unwrap_or(defaults.bound_max),
            use_funnel: flag("BSPNAV_USE_FUNNEL").unwrap_or(defaults.use_funnel),
            optimize_path: flag("BSPNAV_OPTIMIZE_PATH").unwrap_or(defaults.optimize_path),
            max_search_expansions: lookup("BSPNAV_MAX_EXPANSIONS")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .unwrap_or(defaults.max_search_expansions),
            obstacle_border: defaults.obstacle_border,
        }
    }

    pub fn with_bounds(mut self, min: Point2<Real>, max: Point2<Real>) -> Self {
        self.bound_min = min;
        self.bound_max = max;
        self
    }

    pub fn with_funnel(mut self, use_funnel: bool) -> Self {
        self.use_funnel = use_funnel;
        self
    }

    pub fn with_optimize_path(mut self, optimize_path: bool) -> Self {
        self.optimize_path = optimize_path;
        self
    }

    pub fn with_max_search_expansions(mut self, max: usize) -> Self {
        self.max_search_expansions = max;
        self
    }

    pub fn with_obstacle_border(mut self, border: Real) -> Self {
        self.obstacle_border = border;
        self
    }
}

fn parse_point(s: &str) -> Option<Point2<Real>> {
    let (x, y) = s.split_once(',')?;
    Some(Point2::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
