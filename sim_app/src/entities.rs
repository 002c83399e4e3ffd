//! Game entities of the bombardment demo
//!
//! Each entity owns one collision element in the world; the simulation keeps
//! them side by side in a secondary map keyed by that element.

use std::fmt;

use orbital_collision::prelude::*;

/// Collision radius of a city
pub const CITY_RADIUS: f32 = 1.0;
/// Collision radius of a missile silo
pub const SILO_RADIUS: f32 = 9.0;
/// Collision radius of the player's cruiser
pub const CRUISER_RADIUS: f32 = 1.0;
/// Collision radius of a nuke in flight
pub const NUKE_RADIUS: f32 = 1.0;
/// Collision radius of an anti-ship missile
pub const ANTI_MISSILE_RADIUS: f32 = 1.0;
/// Collision radius of a flak round
pub const FLAK_RADIUS: f32 = 2.0;

/// Height above its target at which a nuke bursts
pub const NUKE_AIRBURST: f32 = 30.0;
/// Blast radius of a detonating nuke
pub const NUKE_BLAST_RADIUS: f32 = 300.0;

/// What an entity is and the state only that kind needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Role {
    /// Population centre on the surface
    City,
    /// Surface launcher of anti-ship missiles
    Silo {
        /// Frames until the next launch
        reload: u32,
    },
    /// The player's ship in orbit
    Cruiser,
    /// Player nuke heading for a surface target
    Nuke {
        /// Aim point on the surface
        target: Vec3,
    },
    /// Silo missile homing on the cruiser
    AntiMissile,
    /// Player flak round
    Flak,
}

/// A single simulated object
#[derive(Debug, Clone)]
pub struct Entity {
    /// Kind and kind-specific state
    pub role: Role,

    /// World-space position
    pub position: Vec3,

    /// Velocity in units per second
    pub velocity: Vec3,

    /// Frames this entity has existed
    pub age: u32,

    /// Cleared when destroyed; dead entities are reaped at the end of a frame
    pub alive: bool,
}

impl Entity {
    /// Create a living entity
    pub fn new(role: Role, position: Vec3, velocity: Vec3) -> Self {
        Self {
            role,
            position,
            velocity,
            age: 0,
            alive: true,
        }
    }

    /// Collision shape, radius and faction of a freshly spawned element
    pub fn collision_setup(&self) -> (CollisionKind, f32, Faction) {
        match self.role {
            Role::City => (CollisionKind::Stationary, CITY_RADIUS, Faction::CITY),
            Role::Silo { .. } => (CollisionKind::Stationary, SILO_RADIUS, Faction::ENEMY),
            Role::Cruiser => (CollisionKind::Point, CRUISER_RADIUS, Faction::PLAYER),
            Role::Nuke { .. } => (CollisionKind::Point, NUKE_RADIUS, Faction::PLAYER_MISSILE),
            Role::AntiMissile => (CollisionKind::Point, ANTI_MISSILE_RADIUS, Faction::ENEMY_MISSILE),
            Role::Flak => (CollisionKind::Point, FLAK_RADIUS, Faction::PLAYER_BULLET),
        }
    }

    /// Check if this entity moves and has to be re-housed every frame
    pub fn is_moving(&self) -> bool {
        !matches!(self.role, Role::City | Role::Silo { .. })
    }

    fn destroy(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }
}

/// What happened during one frame (or a whole run, when summed up)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Nukes launched
    pub nukes_launched: usize,
    /// Nukes that reached airburst height
    pub detonations: usize,
    /// Nukes destroyed before reaching their target
    pub nukes_intercepted: usize,
    /// Anti-ship missiles launched
    pub anti_missiles_launched: usize,
    /// Anti-ship missiles destroyed in flight
    pub anti_missiles_destroyed: usize,
    /// Flak rounds fired
    pub flak_fired: usize,
    /// Cities wiped out
    pub cities_destroyed: usize,
    /// Silos wiped out
    pub silos_destroyed: usize,
    /// Hits the cruiser took
    pub cruiser_hits: usize,
}

impl std::ops::AddAssign for Tally {
    fn add_assign(&mut self, other: Self) {
        self.nukes_launched += other.nukes_launched;
        self.detonations += other.detonations;
        self.nukes_intercepted += other.nukes_intercepted;
        self.anti_missiles_launched += other.anti_missiles_launched;
        self.anti_missiles_destroyed += other.anti_missiles_destroyed;
        self.flak_fired += other.flak_fired;
        self.cities_destroyed += other.cities_destroyed;
        self.silos_destroyed += other.silos_destroyed;
        self.cruiser_hits += other.cruiser_hits;
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nukes {}/{} burst ({} intercepted), cities lost {}, silos lost {}, \
             anti-ship {}/{} shot down, flak {}, cruiser hits {}",
            self.detonations,
            self.nukes_launched,
            self.nukes_intercepted,
            self.cities_destroyed,
            self.silos_destroyed,
            self.anti_missiles_destroyed,
            self.anti_missiles_launched,
            self.flak_fired,
            self.cruiser_hits
        )
    }
}

impl OnCollision<Tally> for Entity {
    fn on_collision(&mut self, tally: &mut Tally, other: ElementKey) {
        log::trace!("{:?} at {:?} hit by {:?}", self.role, self.position, other);
        match self.role {
            // Shielded; the hit is only counted.
            Role::Cruiser => tally.cruiser_hits += 1,
            Role::City => {
                if self.destroy() {
                    tally.cities_destroyed += 1;
                }
            }
            Role::Silo { .. } => {
                if self.destroy() {
                    tally.silos_destroyed += 1;
                }
            }
            Role::Nuke { .. } => {
                if self.destroy() {
                    tally.nukes_intercepted += 1;
                }
            }
            Role::AntiMissile => {
                if self.destroy() {
                    tally.anti_missiles_destroyed += 1;
                }
            }
            Role::Flak => {
                self.destroy();
            }
        }
    }
}
