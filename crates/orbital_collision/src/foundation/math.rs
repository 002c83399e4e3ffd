//! Math utilities and types
//!
//! Provides the vector type shared by the octree and the collision tests.

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Threshold below which squared lengths and solver denominators are
/// treated as zero.
pub const EPSILON: f32 = f32::EPSILON;

/// Math utility functions
pub mod utils {
    use super::Vec3;

    /// Squared distance between two points
    pub fn dist2_point_point(lhs: &Vec3, rhs: &Vec3) -> f32 {
        (lhs - rhs).magnitude_squared()
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }
}
