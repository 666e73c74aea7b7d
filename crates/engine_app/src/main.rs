//! # engine_app
//!
//! Demo driver for the component runtime. Builds a small scene (a spinning
//! beacon with a trigger volume, an orbiting satellite, an emitter of short-lived
//! sparks) and runs it through the world frame loop.
//!
//! ## Configuration
//!
//! If `ENGINE_WORLD_CONFIG` names a JSON file it is loaded as the
//! [`WorldConfig`]; otherwise the demo runs 300 frames at 60 fps.

mod scene;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use engine_world::{World, WorldConfig};
use scene::{DrawQueue, Physics};

const CONFIG_ENV: &str = "ENGINE_WORLD_CONFIG";

fn load_config() -> Result<WorldConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            info!(%path, "loading world config");
            WorldConfig::load(&path).with_context(|| format!("loading {CONFIG_ENV}"))
        }
        Err(_) => Ok(WorldConfig::new()
            .with_frame_rate_limit(60)
            .with_max_frames(300)),
    }
}

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let config = load_config()?;
    info!(?config, "engine demo starting");

    let mut world = World::new(config)
        .with_physics(Physics::default())
        .with_draw_pass(DrawQueue::default());
    let scene = scene::build(&mut world)?;

    let frames = world.run();

    let physics = world.resource::<Physics>();
    let draws = world.resource::<DrawQueue>();
    info!(
        frames,
        simulated_seconds = physics.map_or(0.0, |p| p.elapsed),
        draws_submitted = draws.map_or(0, |d| d.submitted),
        collisions = scene.collisions.get(),
        beacon = %scene.beacon,
        satellite = %scene.satellite,
        "engine demo finished"
    );
    Ok(())
}
