//! Configuration system
//!
//! Settings are plain serde structs that load from and save to `.toml` or
//! `.ron` files, picked by extension.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

use crate::spatial::octree::DEFAULT_MAX_DEPTH;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match Format::of(path)? {
            Format::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Format::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Load configuration from file, falling back to defaults if it is missing
    fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::info!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match Format::of(path)? {
            Format::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

enum Format {
    Toml,
    Ron,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values that parse but cannot be used
    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// Collision world settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Half the edge length of the root cube
    pub world_radius: f32,

    /// Areas at this depth are never subdivided
    pub max_depth: u32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            world_radius: 8192.0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CollisionConfig {
    /// Reject settings no world can be built from
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.world_radius.is_finite() || self.world_radius <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "world_radius must be finite and positive, got {}",
                self.world_radius
            )));
        }
        Ok(())
    }
}

impl Config for CollisionConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("orbital_collision_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_defaults() {
        let config = CollisionConfig::default();
        assert_eq!(config.world_radius, 8192.0);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: CollisionConfig = toml::from_str("world_radius = 100.0").unwrap();
        assert_eq!(config.world_radius, 100.0);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_save_and_load_both_formats() {
        let config = CollisionConfig {
            world_radius: 512.0,
            max_depth: 10,
        };

        for name in ["collision.toml", "collision.ron"] {
            let path = scratch(name);
            config.save_to_file(&path).unwrap();
            let loaded = CollisionConfig::load_from_file(&path).unwrap();
            std::fs::remove_file(&path).unwrap();
            assert_eq!(loaded, config);
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let result = CollisionConfig::default().save_to_file(scratch("collision.json"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = CollisionConfig::load_or_default(scratch("missing.toml")).unwrap();
        assert_eq!(config, CollisionConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_radius() {
        let config = CollisionConfig {
            world_radius: -1.0,
            ..CollisionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
