//! Frame loop of the bombardment demo
//!
//! Every frame the cruiser advances along its orbit, launches run on their
//! timers, and every projectile is moved, re-housed and checked against the
//! world. Hits are dispatched to both participants; destroyed entities leave
//! the tree immediately and are despawned once the frame is done.

use orbital_collision::config::ConfigError;
use orbital_collision::foundation::math::EPSILON;
use orbital_collision::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use slotmap::SecondaryMap;

use crate::config::SimulationConfig;
use crate::entities::{Entity, Role, Tally, NUKE_AIRBURST, NUKE_BLAST_RADIUS, SILO_RADIUS};

/// Frames between two progress reports at info level
const REPORT_INTERVAL: u32 = 100;

/// Simulation errors
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    /// Collision world rejected an operation
    #[error("collision error: {0}")]
    Collision(#[from] CollisionError),

    /// Configuration could not be used
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Headless round of planetary bombardment
pub struct BombardmentSim {
    config: SimulationConfig,
    world: CollisionWorld,
    entities: SecondaryMap<ElementKey, Entity>,
    cruiser: ElementKey,
    orbit_angle: f32,
    rng: StdRng,
    frame: u32,
    totals: Tally,
}

impl BombardmentSim {
    /// Build the world and place the planet's targets and the cruiser
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;

        let mut sim = Self {
            world: CollisionWorld::from_config(&config.collision)?,
            entities: SecondaryMap::new(),
            cruiser: ElementKey::default(),
            orbit_angle: 0.0,
            rng: StdRng::seed_from_u64(config.seed),
            frame: 0,
            totals: Tally::default(),
            config,
        };

        for _ in 0..sim.config.cities {
            let position = sim.random_direction() * sim.config.planet_radius;
            sim.spawn(Entity::new(Role::City, position, Vec3::zeros()))?;
        }
        for _ in 0..sim.config.silos {
            let position = sim.random_direction() * sim.config.planet_radius;
            let reload = sim.rng.gen_range(0..=sim.config.silo_reload);
            sim.spawn(Entity::new(Role::Silo { reload }, position, Vec3::zeros()))?;
        }
        let start = Vec3::new(sim.config.orbit_radius, 0.0, 0.0);
        sim.cruiser = sim.spawn(Entity::new(Role::Cruiser, start, Vec3::zeros()))?;

        log::info!(
            "Placed {} cities and {} silos on a planet of radius {}",
            sim.config.cities,
            sim.config.silos,
            sim.config.planet_radius
        );
        Ok(sim)
    }

    /// The collision world
    pub fn world(&self) -> &CollisionWorld {
        &self.world
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Run the configured number of frames
    pub fn run(&mut self) -> Result<Tally, SimError> {
        for _ in 0..self.config.frames {
            self.step()?;
            if self.frame % REPORT_INTERVAL == 0 {
                log::info!(
                    "Frame {}: {} entities in {} areas; {}",
                    self.frame,
                    self.world.len(),
                    self.world.octree().area_count(),
                    self.totals
                );
            }
        }

        self.world.verify()?;
        log::debug!("{}", self.world.dump_element(self.cruiser)?);
        log::info!("Simulation finished after {} frames: {}", self.frame, self.totals);
        Ok(self.totals)
    }

    /// Advance the simulation by one frame
    pub fn step(&mut self) -> Result<Tally, SimError> {
        let mut tally = Tally::default();
        self.frame += 1;

        self.move_cruiser(&mut tally)?;
        self.launch_nuke(&mut tally)?;
        self.reload_silos(&mut tally)?;
        self.fire_flak(&mut tally)?;
        self.advance_projectiles(&mut tally)?;
        self.reap()?;

        log::debug!(
            "Frame {}: {} entities, {} areas, {} housed",
            self.frame,
            self.world.len(),
            self.world.octree().area_count(),
            self.world.octree().entity_count()
        );
        self.totals += tally;
        Ok(tally)
    }

    fn spawn(&mut self, entity: Entity) -> Result<ElementKey, SimError> {
        let (kind, radius, faction) = entity.collision_setup();
        let key = self.world.spawn(radius, kind, faction);
        self.world.init_collision_data(key, entity.position)?;
        self.world.update_areas(key)?;
        self.entities.insert(key, entity);
        Ok(key)
    }

    fn random_direction(&mut self) -> Vec3 {
        loop {
            let candidate = Vec3::new(
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
            );
            let length = candidate.norm();
            if length > 0.1 && length <= 1.0 {
                return candidate / length;
            }
        }
    }

    fn cruiser_position(&self) -> Vec3 {
        self.entities
            .get(self.cruiser)
            .map_or_else(Vec3::zeros, |cruiser| cruiser.position)
    }

    fn move_cruiser(&mut self, tally: &mut Tally) -> Result<(), SimError> {
        let dt = self.config.timestep;
        self.orbit_angle += self.config.orbit_speed * dt / self.config.orbit_radius;
        let position = Vec3::new(self.orbit_angle.cos(), 0.0, self.orbit_angle.sin())
            * self.config.orbit_radius;

        if let Some(cruiser) = self.entities.get_mut(self.cruiser) {
            cruiser.velocity = (position - cruiser.position) / dt;
            cruiser.position = position;
        }
        self.track(self.cruiser, position, tally)
    }

    /// Fire a nuke at the surface target closest to the cruiser
    fn launch_nuke(&mut self, tally: &mut Tally) -> Result<(), SimError> {
        if self.frame % self.config.nuke_interval != 0 {
            return Ok(());
        }

        let origin = self.cruiser_position();
        let target = self
            .entities
            .values()
            .filter(|entity| entity.alive && !entity.is_moving())
            .map(|entity| entity.position)
            .min_by(|a, b| (a - origin).norm_squared().total_cmp(&(b - origin).norm_squared()));
        let Some(target) = target else {
            return Ok(());
        };
        let Some(direction) = (target - origin).try_normalize(EPSILON) else {
            return Ok(());
        };

        let velocity = direction * self.config.nuke_speed;
        self.spawn(Entity::new(Role::Nuke { target }, origin, velocity))?;
        tally.nukes_launched += 1;
        log::debug!("Nuke away from {:?} towards {:?}", origin, target);
        Ok(())
    }

    fn reload_silos(&mut self, tally: &mut Tally) -> Result<(), SimError> {
        let silos: Vec<ElementKey> = self
            .entities
            .iter()
            .filter(|(_, entity)| entity.alive && matches!(entity.role, Role::Silo { .. }))
            .map(|(key, _)| key)
            .collect();
        let cruiser = self.cruiser_position();

        for key in silos {
            let Some(silo) = self.entities.get_mut(key) else {
                continue;
            };
            let Role::Silo { reload } = &mut silo.role else {
                continue;
            };
            if *reload > 0 {
                *reload -= 1;
                continue;
            }
            *reload = self.config.silo_reload;

            let position = silo.position;
            let up = position.try_normalize(EPSILON).unwrap_or_else(Vec3::y);
            let start = position + up * (SILO_RADIUS * 2.0);
            let velocity = (cruiser - start)
                .try_normalize(EPSILON)
                .unwrap_or(up)
                * self.config.anti_missile_speed;
            self.spawn(Entity::new(Role::AntiMissile, start, velocity))?;
            tally.anti_missiles_launched += 1;
        }
        Ok(())
    }

    /// Fire flak at the anti-ship missile closest to the cruiser
    fn fire_flak(&mut self, tally: &mut Tally) -> Result<(), SimError> {
        if self.frame % self.config.flak_interval != 0 {
            return Ok(());
        }

        let origin = self.cruiser_position();
        let reach = self.config.flak_speed * self.config.timestep * self.config.flak_lifetime as f32;
        let threat = self
            .entities
            .values()
            .filter(|entity| entity.alive && entity.role == Role::AntiMissile)
            .map(|entity| (entity.position, entity.velocity, (entity.position - origin).norm()))
            .filter(|(_, _, distance)| *distance <= reach)
            .min_by(|a, b| a.2.total_cmp(&b.2));
        let Some((position, velocity, distance)) = threat else {
            return Ok(());
        };

        // Lead the target by the flight time of the round.
        let aim = position + velocity * (distance / self.config.flak_speed);
        let Some(direction) = (aim - origin).try_normalize(EPSILON) else {
            return Ok(());
        };
        self.spawn(Entity::new(Role::Flak, origin, direction * self.config.flak_speed))?;
        tally.flak_fired += 1;
        Ok(())
    }

    fn advance_projectiles(&mut self, tally: &mut Tally) -> Result<(), SimError> {
        let dt = self.config.timestep;
        let cruiser = self.cruiser_position();
        let moving: Vec<ElementKey> = self
            .entities
            .iter()
            .filter(|(key, entity)| *key != self.cruiser && entity.alive && entity.is_moving())
            .map(|(key, _)| key)
            .collect();

        for key in moving {
            let Some(entity) = self.entities.get_mut(key) else {
                continue;
            };
            // Hit earlier in this frame.
            if !entity.alive {
                continue;
            }
            entity.age += 1;

            match entity.role {
                Role::Nuke { target } => {
                    entity.position += entity.velocity * dt;
                    if (entity.position - target).norm() < NUKE_AIRBURST {
                        let position = entity.position;
                        self.detonate(key, position, tally)?;
                        continue;
                    }
                }
                Role::AntiMissile => {
                    if entity.age > self.config.anti_missile_lifetime {
                        entity.alive = false;
                        continue;
                    }
                    if let Some(direction) = (cruiser - entity.position).try_normalize(EPSILON) {
                        entity.velocity = direction * self.config.anti_missile_speed;
                    }
                    entity.position += entity.velocity * dt;
                }
                Role::Flak => {
                    if entity.age > self.config.flak_lifetime {
                        entity.alive = false;
                        continue;
                    }
                    entity.position += entity.velocity * dt;
                }
                Role::City | Role::Silo { .. } | Role::Cruiser => continue,
            }

            let position = entity.position;
            self.track(key, position, tally)?;
        }
        Ok(())
    }

    /// Sample a moving element, re-house it and resolve its first hit
    fn track(&mut self, key: ElementKey, position: Vec3, tally: &mut Tally) -> Result<(), SimError> {
        self.world.update_collision_data(key, position)?;
        self.world.update_areas(key)?;
        if let Some(other) = self.world.check_collisions(key)? {
            self.dispatch(key, other, tally)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, a: ElementKey, b: ElementKey, tally: &mut Tally) -> Result<(), SimError> {
        let Some(mut first) = self.entities.remove(a) else {
            return Ok(());
        };
        let result = match self.entities.get_mut(b) {
            Some(second) => self.world.dispatch_collision(tally, (a, &mut first), (b, second)),
            None => Ok(()),
        };
        self.entities.insert(a, first);
        result?;

        for key in [a, b] {
            self.leave_tree_if_dead(key)?;
        }
        Ok(())
    }

    /// Turn a nuke into a blast and hit everything inside it
    fn detonate(&mut self, key: ElementKey, position: Vec3, tally: &mut Tally) -> Result<(), SimError> {
        tally.detonations += 1;
        self.world.set_radius(key, NUKE_BLAST_RADIUS)?;
        self.world.set_kind(key, CollisionKind::Stationary)?;
        self.world.init_collision_data(key, position)?;
        self.world.update_areas(key)?;

        let hits = self.world.get_all_collisions(key)?;
        log::info!("Nuke burst at {:?}: {} elements in the blast", position, hits.len());
        for other in hits {
            if let Some(entity) = self.entities.get_mut(other) {
                entity.on_collision(tally, key);
            }
            self.leave_tree_if_dead(other)?;
        }

        if let Some(nuke) = self.entities.get_mut(key) {
            nuke.alive = false;
        }
        self.world.remove_from_areas(key)?;
        Ok(())
    }

    fn leave_tree_if_dead(&mut self, key: ElementKey) -> Result<(), SimError> {
        if self.entities.get(key).is_some_and(|entity| !entity.alive) {
            self.world.remove_from_areas(key)?;
        }
        Ok(())
    }

    fn reap(&mut self) -> Result<(), SimError> {
        let dead: Vec<ElementKey> = self
            .entities
            .iter()
            .filter(|(_, entity)| !entity.alive)
            .map(|(key, _)| key)
            .collect();

        for key in dead {
            self.world.despawn(key)?;
            self.entities.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimulationConfig {
        // Low orbit and fast nukes, so the first burst comes early.
        SimulationConfig {
            frames: 600,
            cities: 40,
            silos: 4,
            orbit_radius: 5100.0,
            nuke_interval: 20,
            nuke_speed: 1000.0,
            silo_reload: 60,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_setup_places_everything() {
        let sim = BombardmentSim::new(small_config()).unwrap();
        assert_eq!(sim.entity_count(), 45);
        assert_eq!(sim.world().len(), 45);
        assert_eq!(sim.world().octree().entity_count(), 45);
        sim.world().verify().unwrap();
    }

    #[test]
    fn test_run_bombards_the_surface() {
        let mut sim = BombardmentSim::new(small_config()).unwrap();
        let totals = sim.run().unwrap();

        assert!(totals.nukes_launched > 0);
        assert!(totals.detonations > 0);
        assert!(totals.cities_destroyed + totals.silos_destroyed > 0);
        assert!(totals.detonations + totals.nukes_intercepted <= totals.nukes_launched);
        assert_eq!(sim.entity_count(), sim.world().len());
        sim.world().verify().unwrap();
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let first = BombardmentSim::new(small_config()).unwrap().run().unwrap();
        let second = BombardmentSim::new(small_config()).unwrap().run().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SimulationConfig {
            timestep: 0.0,
            ..small_config()
        };
        assert!(matches!(BombardmentSim::new(config), Err(SimError::Config(_))));
    }
}
