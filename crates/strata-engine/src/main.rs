//! # Strata
//!
//! Headless demo driver: a host walks across a generated world while a
//! simulation thread shifts it and a render loop culls it concurrently.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use glam::{Mat4, Vec2};
use parking_lot::RwLock;
use strata_common::{ChunkCoord, EntityId};
use strata_engine::{
    CameraShare, CameraSnapshot, EngineConfig, FixedTimestep, FrameSink, FrameStats, Simulation,
};
use strata_world::{Chunk, Entity, WorldIndex};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sink that only counts what it is asked to draw.
#[derive(Debug, Default)]
struct CountingSink {
    frames: u64,
    chunks: u64,
    entities: u64,
    solid_tiles: u64,
}

impl FrameSink for CountingSink {
    fn begin_frame(&mut self, _camera: &CameraSnapshot) {
        self.frames += 1;
    }

    fn draw_host(&mut self, _host: EntityId, _transform: Mat4) {}

    fn draw_chunk(&mut self, _absolute: ChunkCoord, chunk: &Chunk, _transform: Mat4) {
        self.chunks += 1;
        self.solid_tiles += chunk.tiles().iter().filter(|t| t.solid()).count() as u64;
    }

    fn draw_entity(&mut self, _id: EntityId, _transform: Mat4) {
        self.entities += 1;
    }
}

/// Main entry point.
fn main() -> Result<()> {
    let mut config = EngineConfig::load();
    config.validate();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(config.log_filter.parse()?))
        .init();

    info!("Strata starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let world = build_world(&config)?;
    let host = world.read().entities().first().map(Entity::id);

    let camera = Arc::new(CameraShare::new(config.camera()));
    camera.set_host(host);

    let mut simulation = Simulation::new(Arc::clone(&world), Arc::clone(&camera));
    let running = AtomicBool::new(true);

    let ticks = std::thread::scope(|scope| -> Result<u64> {
        let sim_thread = scope.spawn(|| -> Result<u64> {
            let mut timing = FixedTimestep::new(config.tick_rate, config.max_ticks_per_frame);
            while running.load(Ordering::Acquire) {
                let dt = timing.delta_time();
                let steps = timing.accumulate(dt);
                for _ in 0..steps {
                    let report = simulation.tick(timing.fixed_dt());
                    if !report.shift.is_zero() {
                        info!(
                            "Tick {}: shifted by {}, {} chunks loaded",
                            report.tick, report.shift, report.chunk_count
                        );
                    }
                    if config.preload_radius > 0 {
                        simulation.ensure_loaded(config.preload_radius)?;
                    }
                }
                std::thread::sleep(Duration::from_millis(1));
            }
            Ok(simulation.ticks())
        });

        let view = config.render_view();
        let frame_budget = Duration::from_secs_f64(1.0 / 60.0);
        let mut sink = CountingSink::default();
        let mut last = FrameStats::default();
        for _ in 0..config.demo_frames {
            last = view.render(&world, &camera, &mut sink);
            std::thread::sleep(frame_budget);
        }
        running.store(false, Ordering::Release);

        debug!("Last frame: {last:?}");
        info!(
            "Rendered {} frames: {} chunk draws, {} entity draws, {} solid tiles",
            sink.frames, sink.chunks, sink.entities, sink.solid_tiles
        );

        sim_thread
            .join()
            .map_err(|_| anyhow::anyhow!("simulation thread panicked"))?
    })?;

    let world = world.read();
    if let Some(entity) = host.and_then(|id| world.entity(id)) {
        let absolute = world.absolute_position(entity.position);
        info!(
            "Host at ({:.1}, {:.1}) after {ticks} ticks, offset {}",
            absolute.x,
            absolute.y,
            world.offset()
        );
    }
    info!("{} chunks materialized", world.chunk_count());

    info!("Strata shutdown complete");
    Ok(())
}

/// Builds the world with the configured provider, a walking host and seeded
/// wanderers around it.
fn build_world(config: &EngineConfig) -> Result<Arc<RwLock<WorldIndex>>> {
    let world_config = config.world_config();
    let provider = config.provider.build(config.generator_config());
    info!("Using {} provider", provider.name());
    let mut world = WorldIndex::with_provider(world_config, provider)?;

    let extent = world_config.chunk_extent();
    let tile = world_config.tile_size;
    let start = Vec2::new(extent / 2.0, tile * 2.0);
    let host = Entity::new(start, Vec2::splat(tile)).with_velocity(Vec2::new(extent * 0.5, 0.0));
    world.insert_entity(host);

    let mut rng = fastrand::Rng::with_seed(u64::from(config.world_seed));
    for _ in 0..config.demo_wanderers {
        let offset = Vec2::new(rng.f32() * 2.0 - 1.0, rng.f32()) * extent * 2.0;
        let velocity = Vec2::new(rng.f32() * 2.0 - 1.0, 0.0) * extent * 0.25;
        let wanderer = Entity::new(start + offset, Vec2::splat(tile)).with_velocity(velocity);
        world.insert_entity(wanderer);
    }
    info!(
        "Spawned host and {} wanderers",
        world.entities().len().saturating_sub(1)
    );

    Ok(Arc::new(RwLock::new(world)))
}
