//! Command-line overrides.

use std::path::PathBuf;

use clap::Args;

use crate::{Config, TerrainKind};

/// Settings that can be overridden on the command line.
///
/// Flattened into each binary's own parser; values given here win over
/// `config.ron`.
#[derive(Args, Debug, Default, Clone, PartialEq)]
pub struct CliArgs {
    /// World directory holding the region files.
    #[arg(long)]
    pub world: Option<PathBuf>,

    /// Streaming radius in chunks.
    #[arg(long)]
    pub render_radius: Option<u32>,

    /// Finished chunks uploaded per frame.
    #[arg(long)]
    pub uploads_per_frame: Option<usize>,

    /// Terrain generator for chunks that were never saved.
    #[arg(long, value_enum)]
    pub terrain: Option<TerrainKind>,

    /// Surface height of the flat terrain.
    #[arg(long)]
    pub surface_height: Option<usize>,

    /// Log filter (error, warn, info, debug, trace, or a full directive).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides the platform default).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// The config directory to use: `--config`, else the platform default.
    pub fn config_dir(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Config::default_dir)
    }
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref world) = args.world {
            self.world.directory = world.clone();
        }
        if let Some(radius) = args.render_radius {
            self.streaming.render_radius = radius;
        }
        if let Some(uploads) = args.uploads_per_frame {
            self.streaming.uploads_per_frame = uploads;
        }
        if let Some(kind) = args.terrain {
            self.terrain.kind = kind;
        }
        if let Some(height) = args.surface_height {
            self.terrain.surface_height = height;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
