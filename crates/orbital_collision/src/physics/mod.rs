//! Physics module for collision detection
//!
//! Elements are housed in an octree and tested against the swept volume
//! they covered since the previous frame.
//!
//! # Key Types
//!
//! - [`CollisionWorld`] - Owns the octree and every collision element
//! - [`CollisionElement`] - Per-entity collision state
//! - [`Faction`] - Same-side exclusion mask
//! - [`OnCollision`] - Callback implemented by game entities

pub mod collision;
pub mod collision_element;
pub mod collision_layers;
pub mod collision_system;

pub use collision_element::{CollisionElement, CollisionKind, ElementKey};
pub use collision_layers::Faction;
pub use collision_system::{CollisionError, CollisionWorld, OnCollision};
