//! # Strata World
//!
//! Virtualized tile storage for Strata.
//!
//! This crate handles:
//! - Tiles and fixed-size chunks
//! - Sparse, lazily generated chunk storage with floored addressing
//! - Re-centering (shifting) of the addressable space around a host
//! - Procedural chunk providers
//! - Snapshots for persistence collaborators

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod chunk;
pub mod entity;
pub mod generation;
pub mod index;
pub mod shift;
pub mod snapshot;
pub mod tile;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::chunk::*;
    pub use crate::entity::*;
    pub use crate::generation::*;
    pub use crate::index::*;
    pub use crate::shift::*;
    pub use crate::snapshot::*;
    pub use crate::tile::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use strata_common::{ChunkCoord, TileCoord};

    #[test]
    fn test_chunk_creation() {
        let coord = ChunkCoord::new(0, 0);
        let chunk = Chunk::new(coord, DEFAULT_CHUNK_SIZE, Vec2::ONE);
        assert_eq!(chunk.coord(), coord);
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn test_walk_far_with_shifts_keeps_coordinates_small() {
        let mut world = WorldIndex::with_provider(
            WorldConfig::default(),
            ProviderKind::Terrain.build(GeneratorConfig::default()),
        )
        .expect("matching chunk size");
        let extent = world.config().chunk_extent();
        let host = world.spawn_entity(Vec2::new(10.0, 8.0), Vec2::ONE);

        for _ in 0..500 {
            let entity = world.entity_mut(host).expect("host present");
            entity.translate(Vec2::new(extent / 4.0, 0.0));
            let pos = entity.position;
            let delta = world.shift_engine().trigger(pos);
            world.shift(delta);

            let pos = world.entity(host).expect("host present").position;
            assert!(pos.x >= 0.0 && pos.x <= extent);
            let under = world.tile_index(pos - Vec2::new(0.0, 16.0));
            world.tile_mut(under).expect("provider installed");
        }

        // One shift every fourth step; the host touched absolute chunks 0..=125.
        assert_eq!(world.offset(), ChunkCoord::new(-125, 0));
        assert_eq!(world.chunk_count(), 126);
        let pos = world.entity(host).expect("host present").position;
        assert!(world.absolute_position(pos).x > f64::from(extent) * 124.0);
        assert_eq!(
            world.tile(TileCoord::new(0, 200)),
            Tile::NULL,
            "sky above the host was never touched"
        );
    }
}
