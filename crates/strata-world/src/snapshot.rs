//! Verbatim world state for persistence collaborators.
//!
//! The snapshot is plain serde data; whoever saves it picks the encoding.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use strata_common::{ChunkCoord, SchemaVersion, StrataError, StrataResult, WorldError};
use tracing::info;

use crate::chunk::Chunk;
use crate::index::WorldIndex;
use crate::tile::Tile;

/// One persisted chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Absolute chunk coordinate
    pub coord: ChunkCoord,
    /// Tile scale captured at creation
    pub tile_scale: Vec2,
    /// Row-major tiles
    pub tiles: Vec<Tile>,
}

/// Chunk map plus offset, enough to rebuild a world index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Layout version
    pub version: SchemaVersion,
    /// Chunk edge length in tiles
    pub chunk_size: u32,
    /// Re-centering offset at capture time
    pub offset: ChunkCoord,
    /// Materialized chunks
    pub chunks: Vec<ChunkRecord>,
}

impl WorldIndex {
    /// Captures all materialized chunks and the offset.
    ///
    /// Chunks are ordered by coordinate so equal worlds give equal snapshots.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        let mut chunks: Vec<ChunkRecord> = self
            .chunks()
            .map(|(coord, chunk)| ChunkRecord {
                coord,
                tile_scale: chunk.tile_scale(),
                tiles: chunk.tiles().to_vec(),
            })
            .collect();
        chunks.sort_by_key(|record| (record.coord.y, record.coord.x));

        WorldSnapshot {
            version: SchemaVersion::WORLD_SNAPSHOT,
            chunk_size: self.chunk_size(),
            offset: self.offset(),
            chunks,
        }
    }

    /// Replaces the chunk map and offset with a snapshot's contents.
    ///
    /// The offset change is applied as a shift, so live entities keep their
    /// absolute positions. The provider is left alone. On error the index is
    /// unchanged.
    pub fn restore(&mut self, snapshot: WorldSnapshot) -> StrataResult<()> {
        if !SchemaVersion::WORLD_SNAPSHOT.can_read(&snapshot.version) {
            return Err(StrataError::VersionMismatch {
                expected: SchemaVersion::WORLD_SNAPSHOT.to_string(),
                actual: snapshot.version.to_string(),
            });
        }
        if snapshot.chunk_size != self.chunk_size() {
            return Err(WorldError::InvalidData(format!(
                "snapshot chunk size {} does not match world chunk size {}",
                snapshot.chunk_size,
                self.chunk_size()
            ))
            .into());
        }
        let delta = self.offset().checked_sub(snapshot.offset).ok_or_else(|| {
            WorldError::InvalidData(format!(
                "snapshot offset {} is unreachable from offset {}",
                snapshot.offset,
                self.offset()
            ))
        })?;

        let chunks = snapshot
            .chunks
            .into_iter()
            .map(|record| {
                let ChunkRecord { coord, tile_scale, tiles } = record;
                Chunk::from_tiles(coord, snapshot.chunk_size, tile_scale, tiles)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let keys: Vec<ChunkCoord> = self.chunks().map(|(coord, _)| coord).collect();
        for key in keys {
            self.erase_chunk_absolute(key);
        }
        let count = chunks.len();
        for chunk in chunks {
            self.set_chunk_absolute(chunk.coord(), chunk);
        }
        self.shift(delta);

        info!("Restored {count} chunks at offset {}", snapshot.offset);
        Ok(())
    }
}
