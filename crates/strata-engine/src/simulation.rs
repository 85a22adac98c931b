//! Simulation context: advances entities, shifts the world and publishes the
//! camera.

use std::sync::Arc;

use glam::Vec2;
use parking_lot::RwLock;
use strata_common::{ChunkCoord, WorldResult};
use strata_world::WorldIndex;
use tracing::{debug, info};

use crate::camera_share::CameraShare;

/// World index shared between the simulation and render contexts.
pub type SharedWorld = Arc<RwLock<WorldIndex>>;

/// Outcome of one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number, starting at 1
    pub tick: u64,
    /// Shift applied during the tick
    pub shift: ChunkCoord,
    /// Camera generation published by the tick
    pub generation: u64,
    /// Materialized chunks after the tick
    pub chunk_count: usize,
}

/// Drives the world forward in fixed steps.
#[derive(Debug)]
pub struct Simulation {
    world: SharedWorld,
    camera: Arc<CameraShare>,
    tick: u64,
}

impl Simulation {
    /// Creates a simulation over a shared world and camera.
    #[must_use]
    pub fn new(world: SharedWorld, camera: Arc<CameraShare>) -> Self {
        Self {
            world,
            camera,
            tick: 0,
        }
    }

    /// Shared world handle.
    #[must_use]
    pub fn world(&self) -> &SharedWorld {
        &self.world
    }

    /// Shared camera handle.
    #[must_use]
    pub fn camera(&self) -> &Arc<CameraShare> {
        &self.camera
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.tick
    }

    /// Advances one fixed step of `dt` seconds.
    ///
    /// Entities integrate in insertion order, then the host is checked
    /// against its home chunk and the world shifted by at most one chunk per
    /// axis. The camera is published before the world lock is released, so
    /// the render context sees either the whole tick or none of it.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        self.tick += 1;
        let mut world = self.world.write();

        for entity in world.entities_mut() {
            entity.integrate(dt);
        }

        let host = self.camera.host().and_then(|id| world.entity(id)).map(|e| e.position);
        let shift = host.map_or(ChunkCoord::ZERO, |pos| world.shift_engine().trigger(pos));
        if !shift.is_zero() {
            world.shift(shift);
            debug!(
                "Tick {}: host crossed chunk edge, offset now {}",
                self.tick,
                world.offset()
            );
        }

        let generation = self.publish(&world);
        TickReport {
            tick: self.tick,
            shift,
            generation,
            chunk_count: world.chunk_count(),
        }
    }

    /// Shifts the full distance between the host and its home chunk.
    ///
    /// Used after a teleport, where the per-tick trigger would take many
    /// ticks to catch up. Returns the applied shift.
    pub fn recenter(&mut self) -> ChunkCoord {
        let mut world = self.world.write();
        let Some(pos) = self.camera.host().and_then(|id| world.entity(id)).map(|e| e.position)
        else {
            return ChunkCoord::ZERO;
        };

        let delta = world.shift_engine().recenter_delta(pos);
        if !delta.is_zero() {
            world.shift(delta);
            info!("Re-centered world by {delta}, offset now {}", world.offset());
        }
        self.publish(&world);
        delta
    }

    /// Materializes every chunk within `radius` chunks of the host.
    ///
    /// Without a host the shifted origin is used. Returns how many chunks
    /// were generated.
    pub fn ensure_loaded(&mut self, radius: u32) -> WorldResult<usize> {
        let mut world = self.world.write();
        let center = self
            .camera
            .host()
            .and_then(|id| world.entity(id))
            .map_or(Vec2::ZERO, |e| e.position);

        let extent = world.config().chunk_extent();
        let home = (center / extent).floor();
        let Some(home) = world.absolute_coord(ChunkCoord::new(home.x as i32, home.y as i32)) else {
            return Ok(0);
        };

        let radius = radius as i32;
        let before = world.chunk_count();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                // Neighbours past the edge of the chunk range do not exist.
                if let Some(key) = home.checked_add(ChunkCoord::new(dx, dy)) {
                    world.load_chunk_absolute(key)?;
                }
            }
        }

        let generated = world.chunk_count() - before;
        if generated > 0 {
            debug!("Preloaded {generated} chunks around {home}");
        }
        Ok(generated)
    }

    fn publish(&self, world: &WorldIndex) -> u64 {
        let host = self.camera.host().and_then(|id| world.entity(id));
        self.camera.publish(
            host.map(|e| e.position),
            host.map(strata_world::Entity::transform),
            world.offset(),
        )
    }
}
