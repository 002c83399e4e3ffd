//! Core collision detection system
//!
//! [`CollisionWorld`] owns the octree and every collision element. Game
//! entities keep an [`ElementKey`] and drive their element once per frame:
//!
//! 1. `update_collision_data` with the new sample point(s)
//! 2. `update_areas` to re-house the element in the tree
//! 3. `check_collisions` (first hit) or `get_all_collisions` (area effect)
//!
//! The world is owned by a single simulation thread; nothing here locks.

use slotmap::SlotMap;

use crate::config::CollisionConfig;
use crate::foundation::math::Vec3;
use crate::physics::collision_element::{CollisionElement, CollisionKind, ElementKey};
use crate::physics::collision_layers::Faction;
use crate::spatial::aabb::AABB;
use crate::spatial::octree::{AreaKey, Octree, OctreeArea};

/// Collision system errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CollisionError {
    /// The element was despawned or never belonged to this world
    #[error("stale or unknown collision element: {0:?}")]
    StaleElement(ElementKey),

    /// The area was released or never belonged to this world's octree
    #[error("stale or unknown octree area: {0:?}")]
    StaleArea(AreaKey),

    /// The octree must span a finite, positive radius
    #[error("invalid world radius: {0}")]
    InvalidWorldRadius(f32),

    /// A structural invariant of the tree does not hold
    #[error("octree invariant violated: {0}")]
    Inconsistent(String),
}

/// Reaction of a game entity to being hit
///
/// The engine never inspects what the implementation does; it only hands
/// over the handle of the other participant.
pub trait OnCollision<Ctx: ?Sized> {
    /// Called once for every collision this entity takes part in
    fn on_collision(&mut self, ctx: &mut Ctx, other: ElementKey);
}

/// Octree-backed collision world
#[derive(Debug, Clone)]
pub struct CollisionWorld {
    /// Spatial partitioning of every housed element
    octree: Octree,

    /// Element storage, addressed by generation-checked keys
    elements: SlotMap<ElementKey, CollisionElement>,
}

impl CollisionWorld {
    /// Create a world whose octree spans `[-r, -r, -r]..[r, r, r]`
    pub fn new(world_radius: f32) -> Result<Self, CollisionError> {
        Self::from_config(&CollisionConfig {
            world_radius,
            ..CollisionConfig::default()
        })
    }

    /// Create a world from configuration
    pub fn from_config(config: &CollisionConfig) -> Result<Self, CollisionError> {
        if !config.world_radius.is_finite() || config.world_radius <= 0.0 {
            return Err(CollisionError::InvalidWorldRadius(config.world_radius));
        }

        log::debug!(
            "Creating collision world: radius {}, max depth {}",
            config.world_radius,
            config.max_depth
        );

        Ok(Self {
            octree: Octree::with_bounds(AABB::cube(config.world_radius), config.max_depth),
            elements: SlotMap::with_key(),
        })
    }

    /// The underlying octree
    pub fn octree(&self) -> &Octree {
        &self.octree
    }

    /// Root area of the octree
    pub fn root(&self) -> AreaKey {
        self.octree.root()
    }

    /// Look up an area of the octree
    pub fn area(&self, key: AreaKey) -> Result<&OctreeArea, CollisionError> {
        self.octree.area(key).ok_or(CollisionError::StaleArea(key))
    }

    /// Number of registered elements, housed or not
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if no element is registered
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Check if a key still refers to a live element
    pub fn contains(&self, key: ElementKey) -> bool {
        self.elements.contains_key(key)
    }

    /// Look up an element
    pub fn element(&self, key: ElementKey) -> Result<&CollisionElement, CollisionError> {
        self.elements.get(key).ok_or(CollisionError::StaleElement(key))
    }

    fn element_mut(&mut self, key: ElementKey) -> Result<&mut CollisionElement, CollisionError> {
        self.elements.get_mut(key).ok_or(CollisionError::StaleElement(key))
    }

    /// Iterate over every registered element
    pub fn iter(&self) -> impl Iterator<Item = (ElementKey, &CollisionElement)> + '_ {
        self.elements.iter()
    }

    /// Register a new element; it joins the tree on its first `update_areas`
    pub fn spawn(&mut self, radius: f32, kind: CollisionKind, faction: Faction) -> ElementKey {
        let key = self.elements.insert(CollisionElement::new(radius, kind, faction));
        log::trace!("Spawned {:?} element {:?} (radius {})", kind, key, radius);
        key
    }

    /// Take an element out of the tree and forget it
    ///
    /// The key is stale afterwards; every further use reports
    /// [`CollisionError::StaleElement`].
    pub fn despawn(&mut self, key: ElementKey) -> Result<CollisionElement, CollisionError> {
        self.remove_from_areas(key)?;
        let element = self.elements.remove(key).ok_or(CollisionError::StaleElement(key))?;
        log::trace!("Despawned element {:?}", key);
        Ok(element)
    }

    /// Change an element's radius
    pub fn set_radius(&mut self, key: ElementKey, radius: f32) -> Result<(), CollisionError> {
        self.element_mut(key)?.set_radius(radius);
        Ok(())
    }

    /// Change an element's collision shape
    pub fn set_kind(&mut self, key: ElementKey, kind: CollisionKind) -> Result<(), CollisionError> {
        self.element_mut(key)?.set_kind(kind);
        Ok(())
    }

    /// Place a single-point element with no motion history
    pub fn init_collision_data(&mut self, key: ElementKey, point: Vec3) -> Result<(), CollisionError> {
        self.element_mut(key)?.init_collision_data(point);
        Ok(())
    }

    /// Place a line element with no motion history
    pub fn init_collision_data_line(
        &mut self,
        key: ElementKey,
        first: Vec3,
        second: Vec3,
    ) -> Result<(), CollisionError> {
        self.element_mut(key)?.init_collision_data_line(first, second);
        Ok(())
    }

    /// Record this frame's sample of a single-point element
    ///
    /// Only the swept box changes; call [`Self::update_areas`] afterwards.
    pub fn update_collision_data(&mut self, key: ElementKey, point: Vec3) -> Result<(), CollisionError> {
        self.element_mut(key)?.update_collision_data(point);
        Ok(())
    }

    /// Record this frame's sample of a line element
    ///
    /// Only the swept box changes; call [`Self::update_areas`] afterwards.
    pub fn update_collision_data_line(
        &mut self,
        key: ElementKey,
        first: Vec3,
        second: Vec3,
    ) -> Result<(), CollisionError> {
        self.element_mut(key)?.update_collision_data_line(first, second);
        Ok(())
    }

    /// House an element in the deepest area below the root that contains it
    pub fn insert(&mut self, key: ElementKey) -> Result<(), CollisionError> {
        self.insert_into(key, self.octree.root())
    }

    /// House an element in the deepest area below `area` that contains it
    ///
    /// An element already housed elsewhere is moved, never duplicated.
    pub fn insert_into(&mut self, key: ElementKey, area: AreaKey) -> Result<(), CollisionError> {
        self.element(key)?;
        if self.octree.area(area).is_none() {
            return Err(CollisionError::StaleArea(area));
        }
        self.move_into(key, area);
        Ok(())
    }

    /// Take an element out of the tree; does nothing if it is not housed
    pub fn remove_from_areas(&mut self, key: ElementKey) -> Result<(), CollisionError> {
        let element = self.element_mut(key)?;
        if let Some(area) = element.area() {
            element.set_area(None);
            self.octree.remove(area, key);
        }
        Ok(())
    }

    /// Re-house an element after its swept box changed
    ///
    /// Most elements move only a little between frames, so the search starts
    /// at the current area and widens step by step instead of descending from
    /// the root every time:
    ///
    /// 1. not housed yet: insert from the root
    /// 2. fits one of the current area's children: move down
    /// 3. housed at the root: stay
    /// 4. fits one of the parent's children: stay if that is the current
    ///    area, otherwise move there
    /// 5. fits a child of a further ancestor: move there
    /// 6. otherwise: park at the root
    pub fn update_areas(&mut self, key: ElementKey) -> Result<(), CollisionError> {
        let element = self.element(key)?;
        let bounds = *element.bounds();

        let Some(current) = element.area() else {
            self.move_into(key, self.octree.root());
            return Ok(());
        };

        if let Some(child) = self.octree.find_child_containing(current, &bounds) {
            self.move_into(key, child);
            return Ok(());
        }

        let Some(parent) = self.octree.area(current).and_then(OctreeArea::parent) else {
            return Ok(());
        };

        if let Some(sibling) = self.octree.find_child_containing(parent, &bounds) {
            if sibling != current {
                self.move_into(key, sibling);
            }
            return Ok(());
        }

        let wider = self
            .octree
            .ancestors(parent)
            .find_map(|ancestor| self.octree.find_child_containing(ancestor, &bounds));
        match wider {
            Some(area) => self.move_into(key, area),
            None => {
                let root = self.octree.root();
                self.house(key, root, Some(current));
            }
        }
        Ok(())
    }

    /// Descend from `from` and house the element there, leaving its old area
    fn move_into(&mut self, key: ElementKey, from: AreaKey) {
        let element = &self.elements[key];
        let bounds = *element.bounds();
        let old = element.area();
        let target = self.octree.descend(from, &bounds);
        self.house(key, target, old);
    }

    fn house(&mut self, key: ElementKey, target: AreaKey, old: Option<AreaKey>) {
        let element = &mut self.elements[key];
        element.set_area(Some(target));
        if target == self.octree.root() && !element.bounds().is_inside(self.octree.bounds()) {
            log::warn!(
                "Element {:?} with bounds {} left the world {}; parking it at the root",
                key,
                element.bounds(),
                self.octree.bounds()
            );
        }

        self.octree.add(target, key);
        if let Some(old) = old {
            self.octree.remove(old, key);
        }
    }

    /// Check whether two elements collide, ignoring their factions
    pub fn collides(&self, a: ElementKey, b: ElementKey) -> Result<bool, CollisionError> {
        Ok(self.element(a)?.collides(self.element(b)?))
    }

    /// Find the first element colliding with `key`
    ///
    /// Searches the element's own area and then every ancestor. Anything
    /// large enough to reach into this element's area is housed at or above
    /// it, so sibling subtrees never need to be visited. Elements sharing a
    /// faction bit are skipped without being tested.
    pub fn check_collisions(&self, key: ElementKey) -> Result<Option<ElementKey>, CollisionError> {
        let element = self.element(key)?;
        let Some(area) = element.area() else {
            return Ok(None);
        };

        let hit = std::iter::once(area)
            .chain(self.octree.ancestors(area))
            .find_map(|current| self.hits_in(key, element, current).next());

        if let Some(other) = hit {
            log::trace!("Element {:?} collides with {:?}", key, other);
        }
        Ok(hit)
    }

    /// Find every element colliding with `key`
    ///
    /// Covers the element's own area with its whole subtree, plus the
    /// elements housed directly in each ancestor. Meant for area effects such
    /// as explosions rather than per-frame movement.
    pub fn get_all_collisions(&self, key: ElementKey) -> Result<Vec<ElementKey>, CollisionError> {
        let element = self.element(key)?;
        let mut hits = Vec::new();
        let Some(area) = element.area() else {
            return Ok(hits);
        };

        let mut pending = vec![area];
        while let Some(current) = pending.pop() {
            hits.extend(self.hits_in(key, element, current));
            if let Some(children) = self.octree.area(current).and_then(OctreeArea::children) {
                pending.extend(children.iter().rev());
            }
        }

        for ancestor in self.octree.ancestors(area) {
            hits.extend(self.hits_in(key, element, ancestor));
        }

        log::trace!("Element {:?} touches {} elements", key, hits.len());
        Ok(hits)
    }

    /// Elements housed directly in `area` that collide with `element`
    fn hits_in<'a>(
        &'a self,
        key: ElementKey,
        element: &'a CollisionElement,
        area: AreaKey,
    ) -> impl Iterator<Item = ElementKey> + 'a {
        self.octree
            .area(area)
            .map(OctreeArea::elements)
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(move |other| *other != key)
            .filter(move |other| {
                let other = &self.elements[*other];
                Faction::can_collide(element.faction(), other.faction()) && element.collides(other)
            })
    }

    /// Invoke the collision callback on both participants of a hit
    ///
    /// Both handles must still be live; a participant despawned earlier in
    /// the same frame is reported instead of notified.
    pub fn dispatch_collision<A, B, Ctx>(
        &self,
        ctx: &mut Ctx,
        (a_key, a): (ElementKey, &mut A),
        (b_key, b): (ElementKey, &mut B),
    ) -> Result<(), CollisionError>
    where
        A: OnCollision<Ctx> + ?Sized,
        B: OnCollision<Ctx> + ?Sized,
        Ctx: ?Sized,
    {
        self.element(a_key)?;
        self.element(b_key)?;
        a.on_collision(ctx, b_key);
        b.on_collision(ctx, a_key);
        Ok(())
    }

    /// Check the structural invariants of the tree
    ///
    /// - every housed element sits in exactly the area it points to
    /// - its box lies inside that area (the root also parks escapees)
    /// - every combined count equals the direct elements plus the children's
    ///   counts
    pub fn verify(&self) -> Result<(), CollisionError> {
        let fail = |message: String| Err(CollisionError::Inconsistent(message));
        let root = self.octree.root();

        let mut housed = 0;
        for (key, element) in &self.elements {
            let Some(area_key) = element.area() else {
                continue;
            };
            housed += 1;
            let Some(area) = self.octree.area(area_key) else {
                return fail(format!("element {key:?} points at released area {area_key:?}"));
            };
            let copies = area.elements().iter().filter(|entry| **entry == key).count();
            if copies != 1 {
                return fail(format!("element {key:?} listed {copies} times in area {area_key:?}"));
            }
            if area_key != root && !element.bounds().is_inside(area.bounds()) {
                return fail(format!(
                    "element {key:?} with bounds {} escapes area {area_key:?} {}",
                    element.bounds(),
                    area.bounds()
                ));
            }
        }

        let mut listed = 0;
        for (area_key, area) in self.octree.iter() {
            listed += area.elements().len();
            for element in area.elements() {
                match self.elements.get(*element) {
                    Some(found) if found.area() == Some(area_key) => {}
                    _ => return fail(format!("area {area_key:?} lists foreign element {element:?}")),
                }
            }

            let below: usize = area
                .children()
                .map(|children| {
                    children
                        .iter()
                        .filter_map(|child| self.octree.area(*child))
                        .map(OctreeArea::combined)
                        .sum()
                })
                .unwrap_or(0);
            if area.combined() != area.elements().len() + below {
                return fail(format!(
                    "area {area_key:?} counts {} but holds {} directly and {below} below",
                    area.combined(),
                    area.elements().len()
                ));
            }
        }

        if listed != housed {
            return fail(format!("{listed} element entries for {housed} housed elements"));
        }
        Ok(())
    }
}
