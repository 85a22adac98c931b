//! Chunk data structure.

use glam::Vec2;
use strata_common::{ChunkCoord, LocalCoord, WorldError, WorldResult};

use crate::tile::{Tile, TileKind};

/// Default chunk edge length in tiles.
pub const DEFAULT_CHUNK_SIZE: u32 = 64;

/// A square block of tiles, the unit of storage, generation and culling.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Absolute chunk coordinate
    coord: ChunkCoord,
    /// Chunk size (width and height in tiles)
    size: u32,
    /// World units per tile, kept for render geometry only
    tile_scale: Vec2,
    /// Tile data (size × size, row-major)
    tiles: Vec<Tile>,
    /// Whether chunk has been modified since last mesh/save
    dirty: bool,
}

impl Chunk {
    /// Creates a new empty chunk.
    #[must_use]
    pub fn new(coord: ChunkCoord, size: u32, tile_scale: Vec2) -> Self {
        let tile_count = (size * size) as usize;
        Self {
            coord,
            size,
            tile_scale,
            tiles: vec![Tile::EMPTY; tile_count],
            dirty: false,
        }
    }

    /// Rebuilds a chunk from persisted tiles.
    pub fn from_tiles(
        coord: ChunkCoord,
        size: u32,
        tile_scale: Vec2,
        tiles: Vec<Tile>,
    ) -> WorldResult<Self> {
        let expected = (size * size) as usize;
        if tiles.len() != expected {
            return Err(WorldError::InvalidData(format!(
                "chunk {coord} has {} tiles, expected {expected}",
                tiles.len()
            )));
        }
        Ok(Self {
            coord,
            size,
            tile_scale,
            tiles,
            dirty: false,
        })
    }

    /// Returns the chunk coordinate.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Returns the chunk size.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Returns the tile scale captured at creation.
    #[must_use]
    pub const fn tile_scale(&self) -> Vec2 {
        self.tile_scale
    }

    /// Returns whether the chunk is dirty.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marks the chunk as clean.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Sets every tile to `(kind, 0)`.
    pub fn fill(&mut self, kind: TileKind) {
        self.tiles.fill(Tile::of(kind));
        self.dirty = true;
    }

    fn index_of(&self, local: LocalCoord) -> WorldResult<usize> {
        if !local.in_bounds(self.size) {
            return Err(WorldError::OutOfRange {
                local,
                size: self.size,
            });
        }
        Ok(local.to_index(self.size))
    }

    /// Gets a tile at local coordinates.
    pub fn get(&self, local: LocalCoord) -> WorldResult<Tile> {
        let index = self.index_of(local)?;
        Ok(self.tiles[index])
    }

    /// Gets a mutable tile at local coordinates.
    pub fn get_mut(&mut self, local: LocalCoord) -> WorldResult<&mut Tile> {
        let index = self.index_of(local)?;
        self.dirty = true;
        Ok(&mut self.tiles[index])
    }

    /// Sets a tile at local coordinates.
    pub fn set(&mut self, local: LocalCoord, tile: Tile) -> WorldResult<()> {
        *self.get_mut(local)? = tile;
        Ok(())
    }

    /// Returns a slice of all tiles.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Returns a mutable slice of all tiles.
    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        self.dirty = true;
        &mut self.tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk() -> Chunk {
        Chunk::new(ChunkCoord::new(2, -3), 16, Vec2::ONE)
    }

    #[test]
    fn test_new_chunk_is_empty_and_clean() {
        let chunk = chunk();
        assert_eq!(chunk.coord(), ChunkCoord::new(2, -3));
        assert_eq!(chunk.tiles().len(), 256);
        assert!(chunk.tiles().iter().all(|t| *t == Tile::EMPTY));
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn test_set_then_get() {
        let mut chunk = chunk();
        let tile = Tile::new(TileKind::Stone, 4);
        chunk.set(LocalCoord::new(15, 0), tile).expect("in range");
        assert_eq!(chunk.get(LocalCoord::new(15, 0)), Ok(tile));
        assert!(chunk.is_dirty());
    }

    #[test]
    fn test_out_of_range() {
        let mut chunk = chunk();
        assert_eq!(
            chunk.get(LocalCoord::new(16, 0)),
            Err(WorldError::OutOfRange {
                local: LocalCoord::new(16, 0),
                size: 16
            })
        );
        assert!(chunk.set(LocalCoord::new(0, 16), Tile::EMPTY).is_err());
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn test_fill() {
        let mut chunk = chunk();
        chunk.fill(TileKind::Rock);
        assert!(chunk.tiles().iter().all(|t| *t == Tile::of(TileKind::Rock)));
    }

    #[test]
    fn test_from_tiles_validates_length() {
        let result = Chunk::from_tiles(ChunkCoord::ZERO, 4, Vec2::ONE, vec![Tile::EMPTY; 15]);
        assert!(matches!(result, Err(WorldError::InvalidData(_))));

        let chunk = Chunk::from_tiles(ChunkCoord::ZERO, 4, Vec2::ONE, vec![Tile::EMPTY; 16])
            .expect("valid length");
        assert!(!chunk.is_dirty());
    }
}
