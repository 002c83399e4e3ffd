//! Narrow-phase collision primitives
//!
//! # Module Organization
//!
//! - [`primitives`] - Closest-approach distances between segments, points
//!   and triangles

pub mod primitives;

pub use primitives::{dist2_segment_point, dist2_segment_segment, Triangle};
