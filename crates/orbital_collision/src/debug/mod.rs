//! Debug introspection
//!
//! Text dumps of octree areas and collision elements for logs and test
//! failure messages.

pub mod collision_debug;

pub use collision_debug::{AreaDump, ElementDump};
