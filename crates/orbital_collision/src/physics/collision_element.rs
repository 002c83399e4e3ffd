//! Per-element collision state and the pairwise swept-volume test
//!
//! An element is sampled once per frame. It remembers the sample of the
//! previous frame so that fast movers are tested along the whole path they
//! travelled, not only at their current position.

use slotmap::new_key_type;

use crate::foundation::math::{utils, Vec3};
use crate::physics::collision::primitives::{
    collides_segment_point, collides_segment_segment, collides_triangle_point,
    collides_triangle_segment, Triangle,
};
use crate::physics::collision_layers::Faction;
use crate::spatial::aabb::AABB;
use crate::spatial::octree::AreaKey;

new_key_type! {
    /// Generation-checked handle of a collision element
    pub struct ElementKey;
}

/// Shape of the volume an element sweeps between two frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionKind {
    /// A single point that never moves
    Stationary,
    /// A ball swept from its previous to its current point
    Point,
    /// A segment between two points, swept from its previous to its current pair
    Line,
}

/// Collision state of a single game entity
#[derive(Debug, Clone)]
pub struct CollisionElement {
    /// Area currently housing this element, `None` when outside the tree
    area: Option<AreaKey>,

    /// Worst-case box covering every sample point, grown by the radius
    bounds: AABB,

    /// Sample points of this frame
    current: [Vec3; 2],

    /// Sample points of the previous frame
    previous: [Vec3; 2],

    /// Collision radius, summed with the other element's radius when tested
    radius: f32,

    /// Collision shape
    kind: CollisionKind,

    /// Same-side exclusion mask
    faction: Faction,
}

impl CollisionElement {
    /// Create an element that is not yet sampled nor housed in any tree
    pub fn new(radius: f32, kind: CollisionKind, faction: Faction) -> Self {
        Self {
            area: None,
            bounds: AABB::from_point(Vec3::zeros()),
            current: [Vec3::zeros(); 2],
            previous: [Vec3::zeros(); 2],
            radius,
            kind,
            faction,
        }
    }

    /// Area currently housing this element
    pub fn area(&self) -> Option<AreaKey> {
        self.area
    }

    pub(crate) fn set_area(&mut self, area: Option<AreaKey>) {
        self.area = area;
    }

    /// Worst-case swept box of the last sample
    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    /// Sample points of this frame
    pub fn current(&self) -> &[Vec3; 2] {
        &self.current
    }

    /// Sample points of the previous frame
    pub fn previous(&self) -> &[Vec3; 2] {
        &self.previous
    }

    /// Collision radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Collision shape
    pub fn kind(&self) -> CollisionKind {
        self.kind
    }

    /// Same-side exclusion mask
    pub fn faction(&self) -> Faction {
        self.faction
    }

    /// Change the radius, for example when a missile detonates
    ///
    /// The box is only rebuilt by the next `init_*` or `update_*` call.
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }

    /// Change the collision shape
    ///
    /// The box is only rebuilt by the next `init_*` or `update_*` call.
    pub fn set_kind(&mut self, kind: CollisionKind) {
        self.kind = kind;
    }

    /// Place a single-point element with no motion history
    pub fn init_collision_data(&mut self, point: Vec3) {
        self.current = [point; 2];
        self.previous = self.current;
        self.rebuild_bounds();
    }

    /// Place a line element with no motion history
    pub fn init_collision_data_line(&mut self, first: Vec3, second: Vec3) {
        self.current = [first, second];
        self.previous = self.current;
        self.rebuild_bounds();
    }

    /// Record this frame's sample of a single-point element
    pub fn update_collision_data(&mut self, point: Vec3) {
        self.previous = self.current;
        self.current = [point; 2];
        self.rebuild_bounds();
    }

    /// Record this frame's sample of a line element
    pub fn update_collision_data_line(&mut self, first: Vec3, second: Vec3) {
        self.previous = self.current;
        self.current = [first, second];
        self.rebuild_bounds();
    }

    fn rebuild_bounds(&mut self) {
        let mut bounds = AABB::from_point(self.current[0]);
        bounds.expand_point(&self.current[1]);
        bounds.expand_point(&self.previous[0]);
        bounds.expand_point(&self.previous[1]);
        bounds.expand_radius(self.radius);
        self.bounds = bounds;
    }

    /// Check for a collision with a single other element
    ///
    /// Factions are not consulted here; the queries skip same-side pairs
    /// before calling this.
    pub fn collides(&self, other: &Self) -> bool {
        if self.bounds.is_disjoint(&other.bounds) {
            return false;
        }

        let reach = self.radius + other.radius;
        let rr = reach * reach;

        match (self.kind, other.kind) {
            (CollisionKind::Stationary, CollisionKind::Stationary) => {
                utils::dist2_point_point(&self.current[0], &other.current[0]) < rr
            }
            (CollisionKind::Point, CollisionKind::Point) => collides_segment_segment(
                &self.current[0],
                &self.previous[0],
                &other.current[0],
                &other.previous[0],
                rr,
            ),
            (CollisionKind::Stationary, CollisionKind::Point) => collides_segment_point(
                &other.current[0],
                &other.previous[0],
                &self.current[0],
                rr,
            ),
            (CollisionKind::Point, CollisionKind::Stationary) => collides_segment_point(
                &self.current[0],
                &self.previous[0],
                &other.current[0],
                rr,
            ),
            (CollisionKind::Point, CollisionKind::Line) => point_versus_line(self, other, rr),
            (CollisionKind::Line, CollisionKind::Point) => point_versus_line(other, self, rr),
            (CollisionKind::Stationary, CollisionKind::Line) => {
                stationary_versus_line(self, other, rr)
            }
            (CollisionKind::Line, CollisionKind::Stationary) => {
                stationary_versus_line(other, self, rr)
            }
            (CollisionKind::Line, CollisionKind::Line) => {
                line_sweep_hits(self, other, rr) || line_sweep_hits(other, self, rr)
            }
        }
    }
}

/// Swept ball against the line's segment at both ends of its motion
fn point_versus_line(point: &CollisionElement, line: &CollisionElement, rr: f32) -> bool {
    let sweep = (&point.current[0], &point.previous[0]);
    collides_segment_segment(sweep.0, sweep.1, &line.current[0], &line.current[1], rr)
        || collides_segment_segment(sweep.0, sweep.1, &line.previous[0], &line.previous[1], rr)
}

fn stationary_versus_line(
    stationary: &CollisionElement,
    line: &CollisionElement,
    rr: f32,
) -> bool {
    Triangle::sweep_pair(&line.current, &line.previous)
        .iter()
        .any(|triangle| collides_triangle_point(triangle, &stationary.current[0], rr))
}

/// End-point paths of `other` against the area swept by `line`
fn line_sweep_hits(line: &CollisionElement, other: &CollisionElement, rr: f32) -> bool {
    let [first, second] = Triangle::sweep_pair(&line.current, &line.previous);
    collides_triangle_segment(&first, &other.current[0], &other.previous[0], rr)
        || collides_triangle_segment(&second, &other.current[1], &other.previous[1], rr)
}
