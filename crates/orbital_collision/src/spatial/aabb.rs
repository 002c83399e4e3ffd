//! Axis-aligned bounding boxes
//!
//! Used both for octree cells and for the per-frame swept box of every
//! collision element.

use std::fmt;

use crate::foundation::math::Vec3;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a degenerate AABB covering a single point
    pub fn from_point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Create the cube `[-r, -r, -r]..[r, r, r]`
    pub fn cube(half_size: f32) -> Self {
        let extents = Vec3::new(half_size, half_size, half_size);
        Self::from_center_extents(Vec3::zeros(), extents)
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Get the full size of the AABB on every axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Grow this box so that it covers `point`
    pub fn expand_point(&mut self, point: &Vec3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Grow this box by `radius` on every axis, in both directions
    pub fn expand_radius(&mut self, radius: f32) {
        let grow = Vec3::new(radius, radius, radius);
        self.min -= grow;
        self.max += grow;
    }

    /// Check if this AABB contains a point (closed interval)
    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check whether this box lies completely inside `other`
    ///
    /// Containment is closed: a box identical to `other` is inside it, a box
    /// sharing a face with `other` from the inside is inside it, but a box
    /// that crosses any face of `other` is not.
    pub fn is_inside(&self, other: &Self) -> bool {
        self.min.x >= other.min.x && self.max.x <= other.max.x &&
        self.min.y >= other.min.y && self.max.y <= other.max.y &&
        self.min.z >= other.min.z && self.max.z <= other.max.z
    }

    /// Check whether this box is completely outside `other`
    ///
    /// Boxes that only touch on a face are considered disjoint.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.max.x <= other.min.x || self.min.x >= other.max.x ||
        self.max.y <= other.min.y || self.min.y >= other.max.y ||
        self.max.z <= other.min.z || self.min.z >= other.max.z
    }

    /// Get one of the eight octants of this box
    ///
    /// Bit 0 of `index` selects the +X half, bit 1 the +Y half and bit 2 the
    /// +Z half, so octant 0 spans `min..center` and octant 7 spans
    /// `center..max`.
    pub fn octant(&self, index: usize) -> Self {
        debug_assert!(index < 8, "octant index out of range: {index}");
        let center = self.center();
        let pick = |bit: usize, lo: f32, mid: f32, hi: f32| {
            if index & bit != 0 { (mid, hi) } else { (lo, mid) }
        };
        let (x1, x2) = pick(1, self.min.x, center.x, self.max.x);
        let (y1, y2) = pick(2, self.min.y, center.y, self.max.y);
        let (z1, z2) = pick(4, self.min.z, center.z, self.max.z);
        Self::new(Vec3::new(x1, y1, z1), Vec3::new(x2, y2, z2))
    }
}

impl fmt::Display for AABB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}] - [{}, {}, {}]",
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
        )
    }
}
