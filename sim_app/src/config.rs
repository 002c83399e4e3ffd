//! Simulation settings

use orbital_collision::config::{CollisionConfig, Config, ConfigError};
use serde::{Deserialize, Serialize};

/// Everything the bombardment demo can be tuned with
///
/// Speeds are in world units per second; the simulation advances by
/// `timestep` seconds every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Frames to simulate
    pub frames: u32,

    /// Seconds per frame
    pub timestep: f32,

    /// Seed for target placement and launch jitter
    pub seed: u64,

    /// Cities placed on the planet surface
    pub cities: usize,

    /// Missile silos placed on the planet surface
    pub silos: usize,

    /// Radius of the planet
    pub planet_radius: f32,

    /// Orbit radius of the player's cruiser
    pub orbit_radius: f32,

    /// Cruiser speed along its orbit
    pub orbit_speed: f32,

    /// Frames between two nuke launches
    pub nuke_interval: u32,

    /// Nuke speed
    pub nuke_speed: f32,

    /// Frames a silo needs to reload
    pub silo_reload: u32,

    /// Anti-ship missile speed
    pub anti_missile_speed: f32,

    /// Frames an anti-ship missile flies before it burns out
    pub anti_missile_lifetime: u32,

    /// Frames between two flak rounds
    pub flak_interval: u32,

    /// Flak round speed
    pub flak_speed: f32,

    /// Frames a flak round flies before it burns out
    pub flak_lifetime: u32,

    /// Octree settings
    pub collision: CollisionConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frames: 1500,
            timestep: 0.02,
            seed: 0x0b0b,
            cities: 24,
            silos: 8,
            planet_radius: 5000.0,
            orbit_radius: 5600.0,
            orbit_speed: 50.0,
            nuke_interval: 40,
            nuke_speed: 300.0,
            silo_reload: 180,
            anti_missile_speed: 90.0,
            anti_missile_lifetime: 600,
            flak_interval: 5,
            flak_speed: 400.0,
            flak_lifetime: 150,
            collision: CollisionConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.collision.validate()?;
        if self.timestep <= 0.0 {
            return Err(ConfigError::Invalid(format!("timestep must be positive, got {}", self.timestep)));
        }
        if self.planet_radius <= 0.0 || self.orbit_radius <= self.planet_radius {
            return Err(ConfigError::Invalid(format!(
                "orbit radius {} must lie above planet radius {}",
                self.orbit_radius, self.planet_radius
            )));
        }
        if self.orbit_radius >= self.collision.world_radius {
            log::warn!(
                "Orbit radius {} leaves the collision world of radius {}",
                self.orbit_radius,
                self.collision.world_radius
            );
        }
        if self.nuke_interval == 0 || self.flak_interval == 0 {
            return Err(ConfigError::Invalid("launch intervals must be at least one frame".to_string()));
        }
        Ok(())
    }
}

impl Config for SimulationConfig {}
