//! Spatial partitioning
//!
//! - [`aabb`] - Axis-aligned boxes for areas and swept elements
//! - [`octree`] - Arena-backed octree housing collision elements

pub mod aabb;
pub mod octree;

pub use aabb::AABB;
pub use octree::{AreaKey, Octree, OctreeArea, DEFAULT_MAX_DEPTH};
