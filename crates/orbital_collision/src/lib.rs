//! # Orbital Collision
//!
//! Octree spatial partitioning and swept-volume collision detection for a
//! planetary-defence shooter.
//!
//! ## Features
//!
//! - **Octree Broad Phase**: Lazily subdivided, self-pruning octree
//! - **Swept Volumes**: Fast projectiles are tested along the path they
//!   covered since the previous frame, so they cannot tunnel through targets
//! - **Factions**: Same-side exclusion masks skip friendly pairs
//! - **Area Queries**: First-hit checks for movement, all-hits for explosions
//!
//! ## Quick Start
//!
//! ```rust
//! use orbital_collision::prelude::*;
//!
//! fn main() -> Result<(), CollisionError> {
//!     let mut world = CollisionWorld::new(1000.0)?;
//!
//!     let city = world.spawn(5.0, CollisionKind::Stationary, Faction::CITY);
//!     world.init_collision_data(city, Vec3::new(0.0, 100.0, 0.0))?;
//!     world.update_areas(city)?;
//!
//!     let nuke = world.spawn(1.0, CollisionKind::Point, Faction::PLAYER_MISSILE);
//!     world.init_collision_data(nuke, Vec3::new(0.0, 150.0, 0.0))?;
//!     world.update_areas(nuke)?;
//!
//!     // One long step straight through the city.
//!     world.update_collision_data(nuke, Vec3::new(0.0, 90.0, 0.0))?;
//!     world.update_areas(nuke)?;
//!     assert_eq!(world.check_collisions(nuke)?, Some(city));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod debug;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{CollisionConfig, Config, ConfigError},
        foundation::math::Vec3,
        physics::{
            CollisionElement, CollisionError, CollisionKind, CollisionWorld, ElementKey, Faction,
            OnCollision,
        },
        spatial::{AreaKey, AABB},
    };
}
