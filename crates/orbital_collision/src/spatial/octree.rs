//! Octree spatial partitioning structure
//!
//! Divides 3D space into hierarchical cubic areas. Children are created
//! lazily when an insertion needs to descend and are released as a whole
//! subtree once no element is housed at or below their parent any more.
//!
//! Areas live in an arena and refer to each other through [`AreaKey`]s, so
//! the parent links are plain lookups and tearing a subtree down can never
//! leave a dangling reference behind.

use slotmap::{new_key_type, SlotMap};

use crate::physics::collision_element::ElementKey;
use crate::spatial::aabb::AABB;

new_key_type! {
    /// Handle of a single area inside an [`Octree`]
    pub struct AreaKey;
}

/// Default limit on how deep the tree may subdivide
pub const DEFAULT_MAX_DEPTH: u32 = 24;

/// Single area in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeArea {
    /// World-space bounds of this area
    bounds: AABB,

    /// Enclosing area, `None` for the root
    parent: Option<AreaKey>,

    /// Child areas: either all eight exist or none do
    children: Option<[AreaKey; 8]>,

    /// Elements housed directly in this area
    elements: Vec<ElementKey>,

    /// Elements housed in this area and all of its descendants
    combined: usize,

    /// Depth in the tree (0 = root)
    depth: u32,
}

impl OctreeArea {
    fn new(bounds: AABB, parent: Option<AreaKey>, depth: u32) -> Self {
        Self {
            bounds,
            parent,
            children: None,
            elements: Vec::new(),
            combined: 0,
            depth,
        }
    }

    /// World-space bounds of this area
    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    /// Enclosing area, `None` for the root
    pub fn parent(&self) -> Option<AreaKey> {
        self.parent
    }

    /// Child areas, if this area has been subdivided
    pub fn children(&self) -> Option<&[AreaKey; 8]> {
        self.children.as_ref()
    }

    /// Elements housed directly in this area
    pub fn elements(&self) -> &[ElementKey] {
        &self.elements
    }

    /// Number of elements housed in this area and all of its descendants
    pub fn combined(&self) -> usize {
        self.combined
    }

    /// Depth in the tree (0 = root)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Check if this area is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Octree spatial partitioning structure
#[derive(Debug, Clone)]
pub struct Octree {
    /// Arena holding every live area
    areas: SlotMap<AreaKey, OctreeArea>,

    /// Root area containing the entire world space
    root: AreaKey,

    /// Areas at this depth are never subdivided
    max_depth: u32,
}

impl Octree {
    /// Create an octree spanning `[-r, -r, -r]..[r, r, r]`
    pub fn new(world_radius: f32) -> Self {
        Self::with_bounds(AABB::cube(world_radius), DEFAULT_MAX_DEPTH)
    }

    /// Create an octree with explicit root bounds and depth limit
    pub fn with_bounds(bounds: AABB, max_depth: u32) -> Self {
        let mut areas = SlotMap::with_key();
        let root = areas.insert(OctreeArea::new(bounds, None, 0));
        Self { areas, root, max_depth }
    }

    /// Handle of the root area
    pub fn root(&self) -> AreaKey {
        self.root
    }

    /// Bounds of the root area
    pub fn bounds(&self) -> &AABB {
        &self.areas[self.root].bounds
    }

    /// Maximum subdivision depth
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Look up an area
    pub fn area(&self, key: AreaKey) -> Option<&OctreeArea> {
        self.areas.get(key)
    }

    /// Number of live areas, root included
    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    /// Total number of elements housed anywhere in the tree
    pub fn entity_count(&self) -> usize {
        self.areas[self.root].combined
    }

    /// Iterate over every live area in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (AreaKey, &OctreeArea)> + '_ {
        self.areas.iter()
    }

    /// Iterate over the ancestors of `key`, nearest first, root last
    pub fn ancestors(&self, key: AreaKey) -> impl Iterator<Item = AreaKey> + '_ {
        let first = self.areas.get(key).and_then(OctreeArea::parent);
        std::iter::successors(first, move |current| {
            self.areas.get(*current).and_then(OctreeArea::parent)
        })
    }

    /// Subdivide an area into 8 empty children
    ///
    /// Does nothing if the children already exist or the area sits at the
    /// depth limit.
    pub fn create_children(&mut self, key: AreaKey) {
        let area = &self.areas[key];
        if area.children.is_some() || area.depth >= self.max_depth {
            return;
        }

        let bounds = area.bounds;
        let depth = area.depth + 1;
        let children: [AreaKey; 8] = std::array::from_fn(|octant| {
            self.areas
                .insert(OctreeArea::new(bounds.octant(octant), Some(key), depth))
        });
        self.areas[key].children = Some(children);

        log::trace!("Octree: subdivided area {:?} at depth {}", key, depth - 1);
    }

    /// Find the first child of `key` that fully contains `bounds`
    pub fn find_child_containing(&self, key: AreaKey, bounds: &AABB) -> Option<AreaKey> {
        let children = self.areas.get(key)?.children?;
        children
            .into_iter()
            .find(|child| bounds.is_inside(&self.areas[*child].bounds))
    }

    /// Walk down from `from` to the deepest area that fully contains `bounds`
    ///
    /// Children are created along the way as needed.
    pub fn descend(&mut self, from: AreaKey, bounds: &AABB) -> AreaKey {
        let mut current = from;
        loop {
            self.create_children(current);
            match self.find_child_containing(current, bounds) {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// House an element directly in an area
    ///
    /// Increments the combined count of the area and all of its ancestors.
    pub fn add(&mut self, key: AreaKey, element: ElementKey) {
        self.areas[key].elements.push(element);

        let mut cursor = Some(key);
        while let Some(current) = cursor {
            let area = &mut self.areas[current];
            area.combined += 1;
            cursor = area.parent;
        }
    }

    /// Remove an element housed directly in an area
    ///
    /// Decrements the combined count of the area and all of its ancestors.
    /// Every area whose count drops to zero loses its whole child subtree.
    ///
    /// # Panics
    ///
    /// Panics if the element is not housed in `key`: the caller's
    /// bookkeeping is broken and continuing would corrupt the counts.
    pub fn remove(&mut self, key: AreaKey, element: ElementKey) {
        let area = &mut self.areas[key];
        let Some(index) = area.elements.iter().position(|housed| *housed == element) else {
            panic!("asked to remove element {element:?} from area {key:?}, but none existed");
        };
        area.elements.remove(index);

        let mut cursor = Some(key);
        while let Some(current) = cursor {
            let area = &mut self.areas[current];
            area.combined -= 1;
            cursor = area.parent;
            if area.combined == 0 {
                self.release_children(current);
            }
        }
    }

    /// Free the child subtree of an area
    fn release_children(&mut self, key: AreaKey) {
        let Some(children) = self.areas[key].children.take() else {
            return;
        };
        for child in children {
            self.release_children(child);
            if let Some(area) = self.areas.remove(child) {
                assert!(
                    area.combined == 0 && area.elements.is_empty(),
                    "elements at exit: combined ({}), elements ({})",
                    area.combined,
                    area.elements.len()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    fn element_keys(count: usize) -> Vec<ElementKey> {
        let mut keys = SlotMap::<ElementKey, ()>::with_key();
        (0..count).map(|_| keys.insert(())).collect()
    }

    fn small_box(center: Vec3) -> AABB {
        AABB::from_center_extents(center, Vec3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_create_children_is_idempotent() {
        let mut octree = Octree::new(8.0);
        let root = octree.root();

        octree.create_children(root);
        let first = *octree.area(root).unwrap().children().unwrap();
        octree.create_children(root);
        let second = *octree.area(root).unwrap().children().unwrap();

        assert_eq!(first, second);
        assert_eq!(octree.area_count(), 9);
        for child in first {
            let area = octree.area(child).unwrap();
            assert_eq!(area.parent(), Some(root));
            assert_eq!(area.depth(), 1);
            assert!(area.is_leaf());
        }
    }

    #[test]
    fn test_descend_stops_at_deepest_containing_area() {
        let mut octree = Octree::new(8.0);
        let root = octree.root();

        // Fits octant 7 ([0,8]) and then its octant 0 ([0,4]) but not deeper.
        let target = octree.descend(root, &small_box(Vec3::new(2.0, 2.0, 2.0)));
        let area = octree.area(target).unwrap();
        assert_eq!(area.depth(), 2);
        assert_eq!(*area.bounds(), AABB::new(Vec3::zeros(), Vec3::new(4.0, 4.0, 4.0)));

        // Straddling the center never leaves the root.
        assert_eq!(octree.descend(root, &small_box(Vec3::zeros())), root);
    }

    #[test]
    fn test_add_and_remove_propagate_counts() {
        let mut octree = Octree::new(8.0);
        let keys = element_keys(2);
        let root = octree.root();

        let deep = octree.descend(root, &small_box(Vec3::new(2.0, 2.0, 2.0)));
        octree.add(deep, keys[0]);
        octree.add(root, keys[1]);

        assert_eq!(octree.area(deep).unwrap().combined(), 1);
        assert_eq!(octree.area(root).unwrap().combined(), 2);
        assert_eq!(octree.entity_count(), 2);
        for ancestor in octree.ancestors(deep) {
            assert!(octree.area(ancestor).unwrap().combined() >= 1);
        }

        octree.remove(deep, keys[0]);
        assert_eq!(octree.area(root).unwrap().combined(), 1);
        // The root still houses an element, so its direct children survive
        // but the emptied branch below them is gone.
        assert!(octree.area(root).unwrap().children().is_some());
        assert!(octree.area(deep).is_none());

        octree.remove(root, keys[1]);
        assert_eq!(octree.entity_count(), 0);
        assert!(octree.area(root).unwrap().is_leaf());
        assert_eq!(octree.area_count(), 1);
    }

    #[test]
    fn test_ancestors_walk_to_root() {
        let mut octree = Octree::new(8.0);
        let root = octree.root();
        let deep = octree.descend(root, &AABB::from_center_extents(Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.1, 0.1, 0.1)));
        let depth = octree.area(deep).unwrap().depth();

        let chain: Vec<_> = octree.ancestors(deep).collect();
        assert_eq!(chain.len(), depth as usize);
        assert_eq!(chain.last(), Some(&root));
        assert_eq!(octree.ancestors(root).count(), 0);
    }

    #[test]
    fn test_depth_limit_stops_subdivision() {
        let mut octree = Octree::with_bounds(AABB::cube(8.0), 2);
        let root = octree.root();

        // A zero-sized box fits every octant it lands in.
        let target = octree.descend(root, &AABB::from_point(Vec3::new(1.0, 1.0, 1.0)));
        assert_eq!(octree.area(target).unwrap().depth(), 2);
        assert!(octree.area(target).unwrap().is_leaf());
    }

    #[test]
    #[should_panic(expected = "but none existed")]
    fn test_remove_missing_element_panics() {
        let mut octree = Octree::new(8.0);
        let keys = element_keys(1);
        let root = octree.root();
        octree.remove(root, keys[0]);
    }
}
