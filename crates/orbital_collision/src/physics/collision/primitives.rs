//! Primitive closest-approach tests
//!
//! Every function here works on squared distances so that callers can compare
//! against a squared combined radius without taking a square root.

use crate::foundation::math::{utils, Vec3, EPSILON};

/// A triangle spanned by part of a swept segment
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    /// First vertex
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Split the quad swept by a moving segment into two triangles
    ///
    /// `current` and `previous` are the segment end points of this frame and
    /// the frame before.
    pub fn sweep_pair(current: &[Vec3; 2], previous: &[Vec3; 2]) -> [Self; 2] {
        [
            Self::new(current[0], current[1], previous[0]),
            Self::new(current[1], previous[0], previous[1]),
        ]
    }
}

/// Squared distance between the closest points of two segments
///
/// Segments are `l1..l2` and `m1..m2`. Both parameters are clamped to their
/// segment; nearly parallel segments pin the first parameter to `l1`.
/// Algorithm after softSurfer, "Distance between 3D Lines & Segments".
pub fn dist2_segment_segment(l1: &Vec3, l2: &Vec3, m1: &Vec3, m2: &Vec3) -> f32 {
    let u = l2 - l1;
    let v = m2 - m1;
    let w = l1 - m1;
    let a = u.dot(&u);
    let b = u.dot(&v);
    let c = v.dot(&v);
    let d = u.dot(&w);
    let e = v.dot(&w);
    let denominator = a * c - b * b;

    let (mut s_num, mut s_den) = (0.0, 1.0);
    let (mut t_num, mut t_den) = (e, c);

    if denominator > EPSILON {
        s_den = denominator;
        t_den = denominator;
        s_num = b * e - c * d;
        t_num = a * e - b * d;
        if s_num < 0.0 {
            // s = 0 edge
            s_num = 0.0;
            t_num = e;
            t_den = c;
        } else if s_num > s_den {
            // s = 1 edge
            s_num = s_den;
            t_num = e + b;
            t_den = c;
        }
    }

    if t_num < 0.0 {
        // t = 0 edge, recompute s
        t_num = 0.0;
        if -d < 0.0 {
            s_num = 0.0;
        } else if -d > a {
            s_num = s_den;
        } else {
            s_num = -d;
            s_den = a;
        }
    } else if t_num > t_den {
        // t = 1 edge, recompute s
        t_num = t_den;
        if -d + b < 0.0 {
            s_num = 0.0;
        } else if -d + b > a {
            s_num = s_den;
        } else {
            s_num = -d + b;
            s_den = a;
        }
    }

    let sc = if s_num.abs() <= EPSILON { 0.0 } else { s_num / s_den };
    let tc = if t_num.abs() <= EPSILON { 0.0 } else { t_num / t_den };

    (w + u * sc - v * tc).magnitude_squared()
}

/// Squared distance between segment `l1..l2` and point `p`
///
/// A segment shorter than [`EPSILON`] is treated as the point `l1`.
pub fn dist2_segment_point(l1: &Vec3, l2: &Vec3, p: &Vec3) -> f32 {
    let direction = l2 - l1;
    let length2 = direction.magnitude_squared();
    if length2 <= EPSILON {
        return utils::dist2_point_point(l1, p);
    }

    let t = utils::clamp((p - l1).dot(&direction) / length2, 0.0, 1.0);
    (l1 + direction * t - p).magnitude_squared()
}

/// Check whether two swept points pass within `sqrt(rr)` of each other
pub fn collides_segment_segment(l1: &Vec3, l2: &Vec3, m1: &Vec3, m2: &Vec3, rr: f32) -> bool {
    dist2_segment_segment(l1, l2, m1, m2) < rr
}

/// Check whether a swept point passes within `sqrt(rr)` of a fixed point
pub fn collides_segment_point(l1: &Vec3, l2: &Vec3, p: &Vec3, rr: f32) -> bool {
    dist2_segment_point(l1, l2, p) < rr
}

/// Check whether a segment passes within `sqrt(rr)` of a triangle
///
/// Not implemented: always reports no contact. Sweeps of line-type elements
/// are therefore never hit by other line-type or stationary elements.
// TODO: segment-triangle closest approach, so line elements can hit lines and stationary targets.
pub fn collides_triangle_segment(_triangle: &Triangle, _l1: &Vec3, _l2: &Vec3, _rr: f32) -> bool {
    false
}

/// Check whether a point lies within `sqrt(rr)` of a triangle
///
/// Not implemented: always reports no contact, see
/// [`collides_triangle_segment`].
pub fn collides_triangle_point(_triangle: &Triangle, _p: &Vec3, _rr: f32) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_segment_segment_crossing() {
        let d2 = dist2_segment_segment(
            &Vec3::new(-1.0, 0.0, 0.0),
            &Vec3::new(1.0, 0.0, 0.0),
            &Vec3::new(0.0, -1.0, 2.0),
            &Vec3::new(0.0, 1.0, 2.0),
        );
        assert_relative_eq!(d2, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_segment_segment_clamps_to_end_points() {
        // Closest points on the infinite lines lie outside both segments.
        let d2 = dist2_segment_segment(
            &Vec3::new(0.0, 0.0, 0.0),
            &Vec3::new(1.0, 0.0, 0.0),
            &Vec3::new(3.0, 1.0, 0.0),
            &Vec3::new(3.0, 2.0, 0.0),
        );
        assert_relative_eq!(d2, 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_segment_segment_parallel() {
        let d2 = dist2_segment_segment(
            &Vec3::new(0.0, 0.0, 0.0),
            &Vec3::new(4.0, 0.0, 0.0),
            &Vec3::new(1.0, 3.0, 0.0),
            &Vec3::new(2.0, 3.0, 0.0),
        );
        assert_relative_eq!(d2, 9.0, epsilon = 1e-5);
    }

    #[test]
    fn test_segment_segment_degenerate_segments() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        let q = Vec3::new(1.0, 2.0, 5.0);
        assert_relative_eq!(dist2_segment_segment(&p, &p, &q, &q), 4.0, epsilon = 1e-5);

        // Zero-length first segment against a real one.
        let d2 = dist2_segment_segment(
            &Vec3::zeros(),
            &Vec3::zeros(),
            &Vec3::new(1.0, 0.0, 0.0),
            &Vec3::new(3.0, 0.0, 0.0),
        );
        assert_relative_eq!(d2, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_segment_segment_is_symmetric() {
        let l1 = Vec3::new(0.3, -1.2, 4.0);
        let l2 = Vec3::new(2.5, 0.7, -1.0);
        let m1 = Vec3::new(-3.0, 2.0, 0.5);
        let m2 = Vec3::new(1.0, -2.0, 2.0);
        assert_relative_eq!(
            dist2_segment_segment(&l1, &l2, &m1, &m2),
            dist2_segment_segment(&m1, &m2, &l1, &l2),
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_segment_point() {
        let l1 = Vec3::new(0.0, 0.0, 0.0);
        let l2 = Vec3::new(4.0, 0.0, 0.0);

        assert_relative_eq!(dist2_segment_point(&l1, &l2, &Vec3::new(2.0, 3.0, 0.0)), 9.0, epsilon = 1e-5);
        assert_relative_eq!(dist2_segment_point(&l1, &l2, &Vec3::new(-1.0, 1.0, 0.0)), 2.0, epsilon = 1e-5);
        assert_relative_eq!(dist2_segment_point(&l1, &l2, &Vec3::new(6.0, 0.0, 0.0)), 4.0, epsilon = 1e-5);
        assert_relative_eq!(dist2_segment_point(&l1, &l1, &Vec3::new(0.0, 0.0, 2.0)), 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_threshold_is_strict() {
        let l1 = Vec3::zeros();
        let l2 = Vec3::new(2.0, 0.0, 0.0);
        let p = Vec3::new(1.0, 1.0, 0.0);

        assert!(collides_segment_point(&l1, &l2, &p, 1.01));
        assert!(!collides_segment_point(&l1, &l2, &p, 1.0));
    }

    #[test]
    fn test_triangle_tests_report_no_contact() {
        let [first, second] = Triangle::sweep_pair(
            &[Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0)],
            &[Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.0)],
        );
        assert!(!collides_triangle_point(&first, &Vec3::new(0.2, 0.2, 0.0), 1.0));
        assert!(!collides_triangle_segment(&second, &Vec3::zeros(), &Vec3::new(1.0, 1.0, 0.0), 1.0));
    }
}
