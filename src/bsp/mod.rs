//! 2D Binary Space Partitioning (BSP) tree and portal extraction
//!
//! The tree partitions the world rectangle by the boundary edges of the obstacles
//! until every leaf is a convex cell of empty space. The [`PortalBuilder`] then walks
//! the split lines to find the open boundaries between neighbouring cells.

pub mod node;
pub mod portal;
pub mod traits;
pub mod tree;

pub use node::{Edge, Leaf, Node, NodeKind, Tag};
pub use portal::{Portal, PortalBuilder, SuperPlane};
pub use traits::{BalancedSplitStrategy, FirstSplitStrategy, SplitCounts, SplitEdgeStrategy};
pub use tree::{SegmentHit, Tree};
