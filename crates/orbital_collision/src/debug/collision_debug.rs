//! Collision-specific debug dumps
//!
//! Both dumps borrow the world and format lazily, so they cost nothing unless
//! the log level that prints them is enabled:
//!
//! ```
//! use orbital_collision::prelude::*;
//!
//! let mut world = CollisionWorld::new(64.0).unwrap();
//! let key = world.spawn(1.0, CollisionKind::Stationary, Faction::CITY);
//! world.init_collision_data(key, Vec3::new(10.0, 10.0, 10.0)).unwrap();
//! world.update_areas(key).unwrap();
//!
//! let text = world.dump_element(key).unwrap().to_string();
//! assert!(text.contains("Trace:"));
//! ```

use std::fmt;

use crate::physics::collision_element::ElementKey;
use crate::physics::collision_system::{CollisionError, CollisionWorld};
use crate::spatial::octree::{AreaKey, Octree, OctreeArea};

/// Display adapter for a single octree area
pub struct AreaDump<'a> {
    area: &'a OctreeArea,
}

impl<'a> AreaDump<'a> {
    /// Dump an area of `octree`, `None` if the key was released
    pub fn new(octree: &'a Octree, key: AreaKey) -> Option<Self> {
        octree.area(key).map(|area| Self { area })
    }
}

impl fmt::Display for AreaDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OctreeArea:")?;
        writeln!(f, "  area: {}", self.area.bounds())?;
        write!(
            f,
            "  Contains: {} immediate, {} total",
            self.area.elements().len(),
            self.area.combined()
        )
    }
}

/// Display adapter for a collision element and the areas above it
pub struct ElementDump<'a> {
    world: &'a CollisionWorld,
    key: ElementKey,
}

impl fmt::Display for ElementDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(element) = self.world.element(self.key) else {
            return write!(f, "CollisionElement {:?}: despawned", self.key);
        };
        let [c0, c1] = element.current();
        let [p0, p1] = element.previous();

        writeln!(f, "CollisionElement {:?} ({:?}):", self.key, element.kind())?;
        writeln!(f, "  box: {}", element.bounds())?;
        writeln!(f, "  curr: [{}, {}, {}] [{}, {}, {}]", c0.x, c0.y, c0.z, c1.x, c1.y, c1.z)?;
        writeln!(f, "  prev: [{}, {}, {}] [{}, {}, {}]", p0.x, p0.y, p0.z, p1.x, p1.y, p1.z)?;
        write!(f, "  radius: {}", element.radius())?;

        let Some(area) = element.area() else {
            return write!(f, "\n  Trace: not housed");
        };
        let octree = self.world.octree();
        write!(f, "\n  Trace:")?;
        for key in std::iter::once(area).chain(octree.ancestors(area)) {
            if let Some(dump) = AreaDump::new(octree, key) {
                write!(f, "\n{dump}")?;
            }
        }
        Ok(())
    }
}

impl CollisionWorld {
    /// Dump an area: bounds plus direct and combined element counts
    pub fn dump_area(&self, key: AreaKey) -> Result<AreaDump<'_>, CollisionError> {
        self.area(key).map(|area| AreaDump { area })
    }

    /// Dump an element: swept box, both sample pairs, radius and the chain
    /// of areas from its own up to the root
    pub fn dump_element(&self, key: ElementKey) -> Result<ElementDump<'_>, CollisionError> {
        self.element(key)?;
        Ok(ElementDump { world: self, key })
    }
}
