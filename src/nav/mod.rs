//! Navigation mesh construction and path finding on top of the BSP tree.

pub mod area;
pub mod funnel;
pub mod manager;
pub mod mesh;
pub mod path_finder;

pub use area::NavArea;
pub use funnel::string_pull;
pub use manager::{NavManager, optimize_path};
pub use mesh::{NavLink, NavMesh};
pub use path_finder::{FindState, PathFinder, Waypoint};
