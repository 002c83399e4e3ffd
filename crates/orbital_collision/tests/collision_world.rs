//! End-to-end tests of the collision world through its public API

use std::collections::BTreeSet;

use orbital_collision::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn place(world: &mut CollisionWorld, radius: f32, kind: CollisionKind, faction: Faction, at: Vec3) -> ElementKey {
    let key = world.spawn(radius, kind, faction);
    world.init_collision_data(key, at).unwrap();
    world.update_areas(key).unwrap();
    key
}

/// Every live element that `key` collides with, found without the tree
fn brute_force(world: &CollisionWorld, key: ElementKey) -> BTreeSet<ElementKey> {
    let element = world.element(key).unwrap();
    if element.area().is_none() {
        return BTreeSet::new();
    }
    world
        .iter()
        .filter(|(other, candidate)| {
            *other != key
                && candidate.area().is_some()
                && Faction::can_collide(element.faction(), candidate.faction())
                && element.collides(candidate)
        })
        .map(|(other, _)| other)
        .collect()
}

#[test]
fn swept_point_cannot_tunnel() {
    let mut world = CollisionWorld::new(8192.0).unwrap();
    let a = place(&mut world, 1.0, CollisionKind::Point, Faction::empty(), Vec3::zeros());
    let b = place(&mut world, 1.0, CollisionKind::Point, Faction::empty(), Vec3::new(3.0, 0.0, 0.0));

    world.update_collision_data(b, Vec3::new(1.0, 0.0, 0.0)).unwrap();
    world.update_areas(b).unwrap();
    assert_eq!(world.check_collisions(b).unwrap(), Some(a));

    let mut world = CollisionWorld::new(8192.0).unwrap();
    place(&mut world, 1.0, CollisionKind::Point, Faction::empty(), Vec3::zeros());
    let b = place(&mut world, 1.0, CollisionKind::Point, Faction::empty(), Vec3::new(3.0, 0.0, 0.0));

    world.update_collision_data(b, Vec3::new(2.5, 0.0, 0.0)).unwrap();
    world.update_areas(b).unwrap();
    assert_eq!(world.check_collisions(b).unwrap(), None);
}

#[test]
fn nuke_detonation_reaches_surface_targets_only() {
    let mut world = CollisionWorld::new(8192.0).unwrap();
    let city = place(&mut world, 8.0, CollisionKind::Stationary, Faction::CITY, Vec3::new(1000.0, 0.0, 100.0));
    let silo = place(&mut world, 4.0, CollisionKind::Stationary, Faction::ENEMY, Vec3::new(1000.0, 150.0, 0.0));
    let far_city = place(&mut world, 8.0, CollisionKind::Stationary, Faction::CITY, Vec3::new(-1000.0, 0.0, 0.0));
    let cruiser = place(&mut world, 2.0, CollisionKind::Point, Faction::PLAYER, Vec3::new(1100.0, 0.0, 0.0));
    let nuke = place(&mut world, 1.0, CollisionKind::Point, Faction::PLAYER_MISSILE, Vec3::new(1040.0, 0.0, 0.0));

    world.update_collision_data(nuke, Vec3::new(1025.0, 0.0, 0.0)).unwrap();
    world.update_areas(nuke).unwrap();
    assert_eq!(world.check_collisions(nuke).unwrap(), None);

    world.set_radius(nuke, 300.0).unwrap();
    world.set_kind(nuke, CollisionKind::Stationary).unwrap();
    world.init_collision_data(nuke, Vec3::new(1025.0, 0.0, 0.0)).unwrap();
    world.update_areas(nuke).unwrap();

    let hits: BTreeSet<_> = world.get_all_collisions(nuke).unwrap().into_iter().collect();
    assert_eq!(hits, [city, silo].into_iter().collect());
    assert!(!hits.contains(&far_city));
    assert!(!hits.contains(&cruiser));
    world.verify().unwrap();
}

#[test]
fn zero_sized_elements_respect_depth_limit() {
    let config = CollisionConfig {
        world_radius: 64.0,
        max_depth: 5,
    };
    let mut world = CollisionWorld::from_config(&config).unwrap();
    let key = place(&mut world, 0.0, CollisionKind::Point, Faction::empty(), Vec3::new(1.0, 2.0, 3.0));

    let area = world.element(key).unwrap().area().unwrap();
    assert_eq!(world.octree().area(area).unwrap().depth(), 5);
    assert_eq!(world.octree().ancestors(area).count(), 5);
    world.verify().unwrap();
}

#[test]
fn randomized_traffic_keeps_tree_consistent() {
    const FACTIONS: [Faction; 6] = [
        Faction::PLAYER,
        Faction::PLAYER_BULLET,
        Faction::PLAYER_MISSILE,
        Faction::ENEMY,
        Faction::ENEMY_MISSILE,
        Faction::CITY,
    ];

    let mut rng = StdRng::seed_from_u64(0x0b0b);
    let mut world = CollisionWorld::new(100.0).unwrap();
    let mut live = Vec::new();

    let random_point = |rng: &mut StdRng| {
        Vec3::new(rng.gen_range(-90.0..90.0), rng.gen_range(-90.0..90.0), rng.gen_range(-90.0..90.0))
    };

    for _ in 0..150 {
        let kind = if rng.gen_bool(0.3) { CollisionKind::Stationary } else { CollisionKind::Point };
        let faction = FACTIONS[rng.gen_range(0..FACTIONS.len())];
        let at = random_point(&mut rng);
        live.push(place(&mut world, rng.gen_range(0.1..6.0), kind, faction, at));
    }
    world.verify().unwrap();

    for frame in 0..40 {
        for key in &live {
            if world.element(*key).unwrap().kind() != CollisionKind::Point {
                continue;
            }
            let [position, _] = *world.element(*key).unwrap().current();
            let step = Vec3::new(rng.gen_range(-12.0..12.0), rng.gen_range(-12.0..12.0), rng.gen_range(-12.0..12.0));
            // Some elements wander outside the world and must park at the root.
            let next = (position + step).map(|c| c.clamp(-115.0, 115.0));
            world.update_collision_data(*key, next).unwrap();
            world.update_areas(*key).unwrap();
        }

        if frame % 5 == 4 {
            for _ in 0..10 {
                let index = rng.gen_range(0..live.len());
                let key = live.swap_remove(index);
                world.despawn(key).unwrap();
            }
            for _ in 0..10 {
                let at = random_point(&mut rng);
                live.push(place(&mut world, rng.gen_range(0.1..6.0), CollisionKind::Point, Faction::empty(), at));
            }
        }

        world
            .verify()
            .unwrap_or_else(|e| panic!("frame {frame}: {e}"));
    }

    for key in &live {
        let expected = brute_force(&world, *key);
        let found: BTreeSet<_> = world.get_all_collisions(*key).unwrap().into_iter().collect();
        assert_eq!(found, expected, "\n{}", world.dump_element(*key).unwrap());

        // The first-hit query only looks upward; anything it skips must be
        // housed below this element.
        match world.check_collisions(*key).unwrap() {
            Some(other) => assert!(expected.contains(&other)),
            None => {
                let area = world.element(*key).unwrap().area().unwrap();
                for other in &expected {
                    let below = world.element(*other).unwrap().area().unwrap();
                    assert!(world.octree().ancestors(below).any(|ancestor| ancestor == area));
                }
            }
        }
    }

    for key in live.drain(..) {
        world.despawn(key).unwrap();
    }
    assert!(world.is_empty());
    assert_eq!(world.octree().entity_count(), 0);
    assert_eq!(world.octree().area_count(), 1);
}
