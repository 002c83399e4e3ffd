//! Bombardment Demo
//!
//! Headless run of the collision traffic of a planetary bombardment:
//! - Stationary cities and missile silos on the planet surface
//! - A player cruiser in orbit launching nukes and firing flak
//! - Anti-ship missiles homing on the cruiser
//!
//! Pass a `.toml` or `.ron` file to override the default settings.

mod config;
mod entities;
mod simulation;

use orbital_collision::config::Config;
use orbital_collision::foundation::logging;

use crate::config::SimulationConfig;
use crate::simulation::BombardmentSim;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default_filter("info");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading simulation settings from {}", path);
            SimulationConfig::load_from_file(&path)?
        }
        None => SimulationConfig::default(),
    };

    log::info!(
        "Starting bombardment demo: {} frames, seed {:#x}",
        config.frames,
        config.seed
    );

    let mut sim = BombardmentSim::new(config)?;
    match sim.run() {
        Ok(totals) => {
            log::info!("Bombardment demo completed: {}", totals);
            log::info!(
                "{} entities left in {} octree areas",
                sim.entity_count(),
                sim.world().octree().area_count()
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Bombardment demo failed: {}", e);
            Err(e.into())
        }
    }
}
