//! Configuration for Quarry.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line. Every section defaults field by field, so older or partial
//! files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, Config, DebugConfig, StreamingConfig, TerrainConfig, TerrainKind,
    WorldConfig,
};
pub use error::ConfigError;
