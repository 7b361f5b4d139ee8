//! Configuration sections with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Largest accepted streaming radius; the loaded area grows with its square.
const MAX_RENDER_RADIUS: u32 = 64;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where the world is stored.
    pub world: WorldConfig,
    /// Chunk streaming around the focal point.
    pub streaming: StreamingConfig,
    /// Content for chunks that were never saved.
    pub terrain: TerrainConfig,
    pub debug: DebugConfig,
}

/// World storage location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Directory holding the region files, relative to the working directory
    /// unless absolute.
    pub directory: PathBuf,
    /// Extension of region file names (`r.<x>.<z>.<ext>`).
    pub region_extension: String,
}

/// Streaming radius and per-frame upload budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chunks kept loaded in every direction around the focal chunk.
    pub render_radius: u32,
    /// Finished chunks uploaded per frame.
    pub uploads_per_frame: usize,
}

/// Which terrain generator fills absent chunks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum TerrainKind {
    /// Layered stone, dirt and grass up to a fixed height.
    #[default]
    Flat,
    /// No generator: absent chunks load as air.
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    pub kind: TerrainKind,
    /// Height of the flat surface in blocks.
    pub surface_height: usize,
}

/// Debug/development settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter (e.g. "debug", "info,quarry_region=debug"). `RUST_LOG` wins.
    pub log_level: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("world"),
            region_extension: "mca".to_string(),
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            render_radius: 4,
            uploads_per_frame: 2,
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            kind: TerrainKind::Flat,
            surface_height: 64,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Platform config directory for Quarry, e.g. `~/.config/quarry` on Linux.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("quarry"))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE_NAME), serialized)
            .map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-reads the file; returns `Some(new_config)` only if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE_NAME))?;
        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Rejects values the streamer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.region_extension.is_empty() {
            return Err(ConfigError::Invalid {
                field: "world.region_extension",
                reason: "must not be empty",
            });
        }
        if self.streaming.uploads_per_frame == 0 {
            return Err(ConfigError::Invalid {
                field: "streaming.uploads_per_frame",
                reason: "must be at least 1 or no chunk is ever shown",
            });
        }
        if self.streaming.render_radius > MAX_RENDER_RADIUS {
            return Err(ConfigError::Invalid {
                field: "streaming.render_radius",
                reason: "must be at most 64",
            });
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}
