//! Headless chunk streaming driver: walks a viewer across procedural terrain.
//!
//! Usage: cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>     Streaming config JSON (default: built-in defaults)
//!   --write-config <P>  Write the effective config to P and exit
//!   --frames <N>        Frames to simulate (default: 600)
//!   --speed <M>         Viewer speed in meters per frame (default: 2.0)
//!   --seed <SEED>       Terrain seed (default: 12345)
//!   --authoring         Tear down as an authoring host (destroy instead of retire)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use glam::Vec3;

use chunk_lod::core::{logging, Result};
use chunk_lod::physics::HeadlessPhysics;
use chunk_lod::render::HeadlessRenderer;
use chunk_lod::streaming::{ChunkPool, StreamingConfig, UpdateStats};
use chunk_lod::terrain::{HeightmapGenerator, TerrainParams};
use chunk_lod::voxel::LivenessContext;

fn main() {
    logging::init();

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let frames = parse_arg::<u32>(&args, "--frames").unwrap_or(600);
    let speed = parse_arg::<f32>(&args, "--speed").unwrap_or(2.0);
    let seed = parse_arg::<u32>(&args, "--seed").unwrap_or(12345);
    let context = if args.iter().any(|a| a == "--authoring") {
        LivenessContext::Authoring
    } else {
        LivenessContext::Simulating
    };

    let config = match parse_arg::<PathBuf>(&args, "--config") {
        Some(path) => StreamingConfig::load(&path)?,
        None => StreamingConfig::default(),
    };

    if let Some(path) = parse_arg::<PathBuf>(&args, "--write-config") {
        config.save(&path)?;
        log::info!("Wrote config to {}", path.display());
        return Ok(());
    }

    for tier in config.tiers.iter() {
        log::info!(
            "Tier '{}': step {} up to {}m",
            tier.name(),
            tier.step(),
            tier.distance()
        );
    }

    let generator = HeightmapGenerator::new(TerrainParams {
        seed,
        chunk_size: config.chunk_size,
        ..Default::default()
    });
    let mut pool = ChunkPool::new(config)?;
    let mut render = HeadlessRenderer::new();
    let mut physics = HeadlessPhysics::new();

    let start = Instant::now();
    let mut totals = UpdateStats::default();
    for frame in 0..frames {
        let x = frame as f32 * speed;
        let viewer = Vec3::new(x, generator.height_at(x, 0.0) + 2.0, 0.0);
        let stats = pool.update(viewer, &mut render, &mut physics, &generator)?;

        totals.activated += stats.activated;
        totals.reused += stats.reused;
        totals.created += stats.created;
        totals.retired += stats.retired;
        totals.repaired += stats.repaired;
        totals.rebuilt += stats.rebuilt;
    }
    let elapsed = start.elapsed();

    log::info!(
        "{} frames in {:.2?} ({:.2?}/frame): activated {} (reused {}, created {}), retired {}, repaired {}, rebuilt {}",
        frames,
        elapsed,
        elapsed / frames.max(1),
        totals.activated,
        totals.reused,
        totals.created,
        totals.retired,
        totals.repaired,
        totals.rebuilt
    );
    log::info!(
        "Backends: {} mesh buffers live ({} created), {} colliders live ({} created)",
        render.live_count(),
        render.created_count(),
        physics.live_count(),
        physics.created_count()
    );

    let destroyed = pool.shutdown(context, &mut render, &mut physics);
    log::info!(
        "Shutdown: {} chunks destroyed, {} mesh buffers and {} colliders still live",
        destroyed,
        render.live_count(),
        physics.live_count()
    );

    Ok(())
}

fn parse_arg<T: FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}
