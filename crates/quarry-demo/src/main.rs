//! Headless Quarry demo: walks a focal point across the world, streaming
//! chunks in and out, then saves everything that is still loaded.
//!
//! Run with: `cargo run -p quarry-demo -- --frames 300 --render-radius 3`

mod headless;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use quarry_config::{CliArgs, Config, ConfigError, TerrainConfig, TerrainKind};
use quarry_stream::{ChunkStreamer, StreamError, StreamerConfig};
use quarry_terrain::{FlatTerrain, TerrainGenerator};
use quarry_voxel::ChunkCoord;
use tracing::{debug, error, info};

use crate::headless::HeadlessRenderer;

/// CLI arguments for the demo binary.
#[derive(Parser, Debug)]
#[command(name = "quarry-demo", about = "Stream a voxel world around a moving focal point")]
struct DemoArgs {
    #[command(flatten)]
    common: CliArgs,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Blocks the focal point moves along +X each frame.
    #[arg(long, default_value_t = 0.5)]
    speed: f32,

    /// Sleep between frames in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Directory for the JSON log file (debug builds only).
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = DemoArgs::parse();
    let debug_build = cfg!(debug_assertions);

    let config = match load_config(&args.common) {
        Ok(config) => config,
        Err(e) => {
            quarry_log::init_logging(args.log_dir.as_deref(), debug_build, None);
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    quarry_log::init_logging(args.log_dir.as_deref(), debug_build, Some(&config));

    info!("Quarry demo");
    info!(
        "World: {} | radius={} | uploads/frame={} | terrain={:?}",
        config.world.directory.display(),
        config.streaming.render_radius,
        config.streaming.uploads_per_frame,
        config.terrain.kind,
    );

    match run(&args, &config) {
        Ok(renderer) => {
            info!(
                uploads = renderer.uploads,
                releases = renderer.releases,
                draw_calls = renderer.draw_calls,
                peak_triangles = renderer.peak_triangles,
                "Demo finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Demo failed");
            ExitCode::FAILURE
        }
    }
}

/// Config file (if a config directory is known), then CLI overrides.
fn load_config(args: &CliArgs) -> Result<Config, ConfigError> {
    let mut config = match args.config_dir() {
        Some(dir) => Config::load_or_create(&dir)?,
        None => Config::default(),
    };
    config.apply_cli_overrides(args);
    config.validate()?;
    Ok(config)
}

fn terrain_for(config: &TerrainConfig) -> Option<Arc<dyn TerrainGenerator>> {
    match config.kind {
        TerrainKind::Flat => Some(Arc::new(FlatTerrain::new(config.surface_height))),
        TerrainKind::None => None,
    }
}

fn run(args: &DemoArgs, config: &Config) -> Result<HeadlessRenderer, StreamError> {
    let mut renderer = HeadlessRenderer::default();
    let mut streamer = ChunkStreamer::new(
        StreamerConfig {
            world_dir: config.world.directory.clone(),
            region_extension: config.world.region_extension.clone(),
        },
        terrain_for(&config.terrain),
    )?;

    let radius = config.streaming.render_radius;
    let budget = config.streaming.uploads_per_frame;
    let frame_time = Duration::from_millis(args.frame_ms);

    for frame in 0..args.frames {
        let center = ChunkCoord::containing(frame as f32 * args.speed, 0.0);
        let update = streamer.ensure_present(center, radius, &mut renderer)?;
        let drained = streamer.drain_ready(budget, &mut renderer);
        streamer.draw_active(&mut renderer);

        if update.evicted > 0 || drained.failed > 0 {
            debug!(
                frame,
                evicted = update.evicted,
                failed = drained.failed,
                "Streaming churn"
            );
        }
        if frame % 60 == 0 {
            info!(
                frame,
                center = ?center,
                active = streamer.active_count(),
                pending = streamer.pending_count(),
                meshes = renderer.resident_meshes(),
                triangles = renderer.resident_triangles,
                "Frame"
            );
        }
        std::thread::sleep(frame_time);
    }

    streamer.shutdown();
    let saved = streamer.evict_all(&mut renderer)?;
    info!(saved, regions = streamer.regions().open_count(), "World saved");
    Ok(renderer)
}
