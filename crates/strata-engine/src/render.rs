//! Render context: culls the shared world against the camera and hands the
//! visible pieces to a [`FrameSink`].
//!
//! Culling runs under the world read lock and produces a draw list of shared
//! chunk handles and transforms. The lock is released before the sink sees
//! any of it, so a slow sink never stalls the simulation.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};
use parking_lot::RwLock;
use strata_common::{ChunkCoord, EntityId};
use strata_world::{Chunk, WorldIndex};
use tracing::trace;

use crate::camera_share::{CameraShare, CameraSnapshot};

/// Backend that turns culled world state into draw calls.
///
/// Implementations may be slow (GPU uploads, mesh building); they are only
/// ever called with both the world and camera locks released.
pub trait FrameSink {
    /// Called once per frame before any draw call.
    fn begin_frame(&mut self, _camera: &CameraSnapshot) {}

    /// Draws the tracked host with its published transform.
    fn draw_host(&mut self, host: EntityId, transform: Mat4);

    /// Draws a chunk. `absolute` is its map key, `transform` places its
    /// origin in the shifted frame.
    fn draw_chunk(&mut self, absolute: ChunkCoord, chunk: &Chunk, transform: Mat4);

    /// Draws a non-host entity.
    fn draw_entity(&mut self, id: EntityId, transform: Mat4);
}

/// Culling distances, in chunk extents from the camera position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Maximum distance from the camera to a chunk center
    pub chunk_cull_radius: f32,
    /// Maximum distance from the camera to an entity origin
    pub entity_cull_radius: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            chunk_cull_radius: 1.5,
            entity_cull_radius: 2.0,
        }
    }
}

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Camera generation the frame was drawn with
    pub generation: u64,
    /// Chunks handed to the sink
    pub chunks_drawn: usize,
    /// Chunks rejected by distance
    pub chunks_culled: usize,
    /// Non-host entities handed to the sink
    pub entities_drawn: usize,
    /// Non-host entities rejected by distance
    pub entities_culled: usize,
    /// Whether the host was drawn
    pub host_drawn: bool,
}

/// Culled frame contents, detached from the world lock.
struct DrawList {
    chunks: Vec<(ChunkCoord, Arc<Chunk>, Mat4)>,
    entities: Vec<(EntityId, Mat4)>,
}

impl RenderView {
    /// Draws one frame.
    ///
    /// The camera snapshot and the draw list are taken under one world read
    /// lock, so no shift can land between them. The camera mutex is held only
    /// while the snapshot is copied. Sink calls run after the world lock is
    /// dropped and see the frame as it was when culled.
    pub fn render(
        &self,
        world: &RwLock<WorldIndex>,
        camera: &CameraShare,
        sink: &mut dyn FrameSink,
    ) -> FrameStats {
        let guard = world.read();
        let snapshot = camera.snapshot_for_render();
        let mut stats = FrameStats {
            generation: snapshot.generation,
            ..FrameStats::default()
        };
        let list = self.cull(&guard, &snapshot, &mut stats);
        drop(guard);

        sink.begin_frame(&snapshot);

        if let (Some(host), Some(transform)) = (snapshot.host, snapshot.host_transform) {
            sink.draw_host(host, transform);
            stats.host_drawn = true;
        }
        for (absolute, chunk, transform) in &list.chunks {
            sink.draw_chunk(*absolute, chunk, *transform);
        }
        for &(id, transform) in &list.entities {
            sink.draw_entity(id, transform);
        }

        trace!(
            "Frame {}: {} chunks, {} entities",
            stats.generation,
            stats.chunks_drawn,
            stats.entities_drawn
        );
        stats
    }

    fn cull(
        &self,
        world: &WorldIndex,
        snapshot: &CameraSnapshot,
        stats: &mut FrameStats,
    ) -> DrawList {
        let extent = world.config().chunk_extent();
        let chunk_limit = extent * self.chunk_cull_radius;
        let entity_limit = extent * self.entity_cull_radius;

        let mut chunks = Vec::new();
        for (absolute, chunk) in world.shared_chunks() {
            // Chunks outside the shifted frame's range are never visible.
            let Some(shifted) = world.shifted_coord(absolute) else {
                stats.chunks_culled += 1;
                continue;
            };
            let origin = shifted.as_vec2() * extent;
            let center = origin + Vec2::splat(extent / 2.0);
            if center.distance(snapshot.camera_position) < chunk_limit {
                let transform = Mat4::from_translation(origin.extend(0.0));
                chunks.push((absolute, Arc::clone(chunk), transform));
                stats.chunks_drawn += 1;
            } else {
                stats.chunks_culled += 1;
            }
        }
        chunks.sort_unstable_by_key(|(coord, _, _)| (coord.y, coord.x));

        let mut entities = Vec::new();
        for entity in world.entities() {
            if Some(entity.id()) == snapshot.host {
                continue;
            }
            let transform = entity.transform();
            let origin = transform.transform_point3(Vec3::ZERO).truncate();
            if origin.distance(snapshot.camera_position) < entity_limit {
                entities.push((entity.id(), transform));
                stats.entities_drawn += 1;
            } else {
                stats.entities_culled += 1;
            }
        }

        DrawList { chunks, entities }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::simulation::Simulation;
    use std::time::Duration;
    use strata_common::TileCoord;
    use strata_world::{Entity, Tile, TileKind, WorldConfig};

    #[derive(Default)]
    struct RecordingSink {
        frames: usize,
        host: Option<EntityId>,
        chunks: Vec<(ChunkCoord, Vec3)>,
        entities: Vec<EntityId>,
    }

    impl FrameSink for RecordingSink {
        fn begin_frame(&mut self, _camera: &CameraSnapshot) {
            self.frames += 1;
        }

        fn draw_host(&mut self, host: EntityId, _transform: Mat4) {
            self.host = Some(host);
        }

        fn draw_chunk(&mut self, absolute: ChunkCoord, _chunk: &Chunk, transform: Mat4) {
            self.chunks.push((absolute, transform.w_axis.truncate()));
        }

        fn draw_entity(&mut self, id: EntityId, _transform: Mat4) {
            self.entities.push(id);
        }
    }

    fn world_with_chunks(coords: &[(i32, i32)]) -> WorldIndex {
        let mut world = WorldIndex::new(WorldConfig::default());
        for &(x, y) in coords {
            let coord = ChunkCoord::new(x, y);
            world.set_chunk_absolute(coord, Chunk::new(coord, world.chunk_size(), Vec2::ONE));
        }
        world
    }

    #[test]
    fn test_chunks_culled_by_distance() {
        let world = RwLock::new(world_with_chunks(&[(0, 0), (1, 0), (-1, -1), (3, 0)]));
        let camera = CameraShare::new(Camera::new(800, 600));
        camera.publish(Some(Vec2::new(512.0, 512.0)), None, ChunkCoord::ZERO);

        let mut sink = RecordingSink::default();
        let stats = RenderView::default().render(&world, &camera, &mut sink);

        let drawn: Vec<ChunkCoord> = sink.chunks.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            drawn,
            vec![ChunkCoord::new(-1, -1), ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)]
        );
        assert_eq!(stats.chunks_drawn, 3);
        assert_eq!(stats.chunks_culled, 1);
        assert_eq!(sink.frames, 1);
        assert!(!stats.host_drawn);
    }

    #[test]
    fn test_chunk_transform_uses_shifted_frame() {
        let mut index = world_with_chunks(&[(2, 0)]);
        index.shift(ChunkCoord::new(2, 0));
        let world = RwLock::new(index);
        let camera = CameraShare::default();
        camera.publish(Some(Vec2::new(512.0, 512.0)), None, ChunkCoord::new(-2, 0));

        let mut sink = RecordingSink::default();
        RenderView::default().render(&world, &camera, &mut sink);

        assert_eq!(sink.chunks, vec![(ChunkCoord::new(2, 0), Vec3::ZERO)]);
    }

    #[test]
    fn test_host_drawn_once_and_entities_culled() {
        let mut index = WorldIndex::new(WorldConfig::default());
        let host = index.spawn_entity(Vec2::new(100.0, 100.0), Vec2::ONE);
        let near = index.spawn_entity(Vec2::new(600.0, 100.0), Vec2::ONE);
        let far = index.spawn_entity(Vec2::new(100.0 + 1024.0 * 3.0, 100.0), Vec2::ONE);

        let camera = CameraShare::default();
        camera.set_host(Some(host));
        let transform = index.entity(host).expect("host").transform();
        camera.publish(Some(Vec2::new(100.0, 100.0)), Some(transform), ChunkCoord::ZERO);

        let world = RwLock::new(index);
        let mut sink = RecordingSink::default();
        let stats = RenderView::default().render(&world, &camera, &mut sink);

        assert_eq!(sink.host, Some(host));
        assert_eq!(sink.entities, vec![near]);
        assert!(!sink.entities.contains(&far));
        assert_eq!(stats.entities_culled, 1);
        assert!(stats.host_drawn);
    }

    #[test]
    fn test_sink_can_touch_camera_while_drawing() {
        struct ReentrantSink<'a> {
            camera: &'a CameraShare,
            seen: u64,
        }

        impl FrameSink for ReentrantSink<'_> {
            fn draw_host(&mut self, _host: EntityId, _transform: Mat4) {}

            fn draw_chunk(&mut self, _absolute: ChunkCoord, _chunk: &Chunk, _transform: Mat4) {
                // Would deadlock if the renderer still held the camera mutex.
                self.seen = self.camera.generation();
            }

            fn draw_entity(&mut self, _id: EntityId, _transform: Mat4) {}
        }

        let world = RwLock::new(world_with_chunks(&[(0, 0)]));
        let camera = CameraShare::default();
        camera.publish(Some(Vec2::splat(512.0)), None, ChunkCoord::ZERO);

        let mut sink = ReentrantSink {
            camera: &camera,
            seen: 0,
        };
        RenderView::default().render(&world, &camera, &mut sink);
        assert_eq!(sink.seen, 1);
    }

    #[test]
    fn test_slow_sink_does_not_block_simulation() {
        struct TickingSink {
            sim: Simulation,
            chunk_tiles: Vec<Tile>,
            transforms: Vec<Mat4>,
        }

        impl FrameSink for TickingSink {
            fn draw_host(&mut self, _host: EntityId, _transform: Mat4) {}

            fn draw_chunk(&mut self, _absolute: ChunkCoord, chunk: &Chunk, transform: Mat4) {
                let writable = self.sim.world().try_write_for(Duration::from_secs(1)).is_some();
                assert!(writable, "world lock still held while drawing");

                let report = self.sim.tick(1.0);
                assert_eq!(report.shift, ChunkCoord::new(1, 0));
                self.sim
                    .world()
                    .write()
                    .set_tile(TileCoord::new(-60, 0), Tile::of(TileKind::Rock))
                    .expect("chunk is materialized");

                self.chunk_tiles.push(chunk.tiles()[4]);
                self.transforms.push(transform);
            }

            fn draw_entity(&mut self, _id: EntityId, _transform: Mat4) {}
        }

        let mut index = world_with_chunks(&[(0, 0)]);
        let host = index.insert_entity(
            Entity::new(Vec2::new(512.0, 0.0), Vec2::ONE).with_velocity(Vec2::new(600.0, 0.0)),
        );
        let world = Arc::new(RwLock::new(index));
        let camera = Arc::new(CameraShare::default());
        camera.set_host(Some(host));
        camera.publish(Some(Vec2::splat(512.0)), None, ChunkCoord::ZERO);

        let mut sink = TickingSink {
            sim: Simulation::new(Arc::clone(&world), Arc::clone(&camera)),
            chunk_tiles: Vec::new(),
            transforms: Vec::new(),
        };
        let stats = RenderView::default().render(&world, &camera, &mut sink);

        assert_eq!(stats.generation, 1);
        assert_eq!(sink.chunk_tiles, vec![Tile::EMPTY]);
        assert_eq!(sink.transforms, vec![Mat4::IDENTITY]);
        assert_eq!(sink.sim.ticks(), 1);
        assert_eq!(world.read().offset(), ChunkCoord::new(-1, 0));
        assert_eq!(world.read().tile(TileCoord::new(-60, 0)), Tile::of(TileKind::Rock));
    }

    #[test]
    fn test_custom_radius() {
        let mut index = WorldIndex::new(WorldConfig::default());
        index.insert_entity(Entity::new(Vec2::new(1024.0 * 5.0, 0.0), Vec2::ONE));
        let world = RwLock::new(index);
        let camera = CameraShare::default();
        camera.publish(Some(Vec2::ZERO), None, ChunkCoord::ZERO);

        let wide = RenderView {
            chunk_cull_radius: 1.5,
            entity_cull_radius: 6.0,
        };
        let mut sink = RecordingSink::default();
        assert_eq!(wide.render(&world, &camera, &mut sink).entities_drawn, 1);
    }
}
