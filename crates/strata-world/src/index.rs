//! Sparse chunk index with re-centerable addressing.
//!
//! Chunks are keyed by absolute coordinate. Public lookups take *shifted*
//! coordinates (the frame entities and the renderer live in) and convert with
//! the current offset; the `*_absolute` variants skip the conversion.
//!
//! Tile lookups come in two flavors:
//! - [`WorldIndex::tile_mut`] materializes missing chunks through the
//!   installed [`ChunkProvider`] and always hands back a live tile.
//! - [`WorldIndex::tile`] never generates and returns [`Tile::NULL`] for
//!   unmapped space, so diagnostics and culling stay side-effect free.
//!
//! Chunks are stored behind [`Arc`] so a renderer can keep a frame's chunks
//! after releasing the world lock. Writes go through [`Arc::make_mut`]: a
//! chunk still held by a renderer is copied before it is modified.

use std::sync::Arc;

use ahash::AHashMap;
use glam::{DVec2, Vec2};
use serde::{Deserialize, Serialize};
use strata_common::{ChunkCoord, EntityId, LocalCoord, TileCoord, WorldError, WorldResult};
use tracing::{debug, info};

use crate::chunk::{Chunk, DEFAULT_CHUNK_SIZE};
use crate::entity::Entity;
use crate::generation::ChunkProvider;
use crate::shift::ShiftEngine;
use crate::tile::Tile;

/// Default world units per tile.
pub const DEFAULT_TILE_SIZE: f32 = 16.0;

/// World index configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Chunk edge length in tiles
    pub chunk_size: u32,
    /// World units per tile
    pub tile_size: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl WorldConfig {
    /// World units covered by one chunk.
    #[must_use]
    pub fn chunk_extent(&self) -> f32 {
        self.chunk_size as f32 * self.tile_size
    }
}

/// Byte image of tile properties around the shifted origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePropertyMap {
    /// Edge length in tiles
    pub size: usize,
    /// Row-major [`Tile::properties`] bytes; 0 where nothing is loaded
    pub data: Vec<u8>,
}

impl TilePropertyMap {
    /// Property byte at image position `(x, y)`.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.data.get(y * self.size + x).copied()
    }
}

/// Sparse chunk storage, entity arena and re-centering offset.
pub struct WorldIndex {
    /// Configuration
    config: WorldConfig,
    /// Materialized chunks by absolute coordinate
    chunks: AHashMap<ChunkCoord, Arc<Chunk>>,
    /// Added to an absolute coordinate to get the shifted one
    offset: ChunkCoord,
    /// Entities in update/render order
    entities: Vec<Entity>,
    /// Generation capability for the mutable path
    provider: Option<Box<dyn ChunkProvider>>,
    /// Re-centering
    shift_engine: ShiftEngine,
}

impl std::fmt::Debug for WorldIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldIndex")
            .field("config", &self.config)
            .field("chunks", &self.chunks.len())
            .field("offset", &self.offset)
            .field("entities", &self.entities.len())
            .field("provider", &self.provider.as_ref().map(|p| p.name()))
            .finish()
    }
}

impl Default for WorldIndex {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

fn unwrap_shared(chunk: Arc<Chunk>) -> Chunk {
    Arc::try_unwrap(chunk).unwrap_or_else(|shared| (*shared).clone())
}

impl WorldIndex {
    /// Creates an empty index with no provider.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            chunks: AHashMap::new(),
            offset: ChunkCoord::ZERO,
            entities: Vec::new(),
            provider: None,
            shift_engine: ShiftEngine::new(config.chunk_extent()),
        }
    }

    /// Creates an index that generates missing chunks with `provider`.
    pub fn with_provider(
        config: WorldConfig,
        provider: Box<dyn ChunkProvider>,
    ) -> WorldResult<Self> {
        let mut index = Self::new(config);
        index.set_provider(provider)?;
        Ok(index)
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Chunk edge length in tiles.
    #[must_use]
    pub const fn chunk_size(&self) -> u32 {
        self.config.chunk_size
    }

    /// Returns the shift engine for this world's geometry.
    #[must_use]
    pub const fn shift_engine(&self) -> &ShiftEngine {
        &self.shift_engine
    }

    // === Provider ===

    /// Installs the generation capability. The provider must produce chunks
    /// of this world's size.
    pub fn set_provider(&mut self, provider: Box<dyn ChunkProvider>) -> WorldResult<()> {
        if provider.chunk_size() != self.config.chunk_size {
            return Err(WorldError::InvalidData(format!(
                "provider '{}' generates {}-tile chunks, world uses {}",
                provider.name(),
                provider.chunk_size(),
                self.config.chunk_size
            )));
        }
        info!("Installed chunk provider '{}'", provider.name());
        self.provider = Some(provider);
        Ok(())
    }

    /// Removes the generation capability.
    pub fn clear_provider(&mut self) -> Option<Box<dyn ChunkProvider>> {
        self.provider.take()
    }

    /// Whether a provider is installed.
    #[must_use]
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    // === Coordinate frames ===

    /// Current re-centering offset.
    #[must_use]
    pub const fn offset(&self) -> ChunkCoord {
        self.offset
    }

    /// Absolute key for a shifted chunk coordinate, `None` when it falls
    /// outside the chunk range.
    #[must_use]
    pub fn absolute_coord(&self, shifted: ChunkCoord) -> Option<ChunkCoord> {
        shifted.checked_sub(self.offset)
    }

    /// Shifted coordinate for an absolute chunk key, `None` when it falls
    /// outside the chunk range.
    #[must_use]
    pub fn shifted_coord(&self, absolute: ChunkCoord) -> Option<ChunkCoord> {
        absolute.checked_add(self.offset)
    }

    /// Tile containing a world-space position in the shifted frame.
    #[must_use]
    pub fn tile_index(&self, pos: Vec2) -> TileCoord {
        TileCoord::containing(pos, self.config.tile_size)
    }

    /// Converts a shifted-frame position back to the unshifted frame.
    #[must_use]
    pub fn absolute_position(&self, local: Vec2) -> DVec2 {
        local.as_dvec2() - self.offset_vec() * f64::from(self.shift_engine.chunk_extent())
    }

    fn offset_vec(&self) -> DVec2 {
        DVec2::new(f64::from(self.offset.x), f64::from(self.offset.y))
    }

    /// Absolute chunk and local index for a shifted tile index.
    fn locate(&self, index: TileCoord) -> Option<(ChunkCoord, LocalCoord)> {
        let (chunk_pos, local) = index.split(self.config.chunk_size)?;
        Some((self.absolute_coord(chunk_pos)?, local))
    }

    // === Chunks (shifted) ===

    /// Chunk at a shifted coordinate, if materialized.
    #[must_use]
    pub fn chunk(&self, pos: ChunkCoord) -> Option<&Chunk> {
        self.chunk_absolute(self.absolute_coord(pos)?)
    }

    /// Mutable chunk at a shifted coordinate, if materialized.
    pub fn chunk_mut(&mut self, pos: ChunkCoord) -> Option<&mut Chunk> {
        let key = self.absolute_coord(pos)?;
        self.chunk_absolute_mut(key)
    }

    /// Inserts or replaces the chunk at a shifted coordinate.
    ///
    /// Fails with [`WorldError::AddressingFault`] when the coordinate has no
    /// absolute key.
    pub fn set_chunk(&mut self, pos: ChunkCoord, chunk: Chunk) -> WorldResult<Option<Chunk>> {
        let key = self.absolute_coord(pos).ok_or(WorldError::AddressingFault {
            tile: pos.to_tile_coord(self.config.chunk_size),
            chunk: None,
        })?;
        Ok(self.set_chunk_absolute(key, chunk))
    }

    /// Removes the chunk at a shifted coordinate.
    pub fn erase_chunk(&mut self, pos: ChunkCoord) -> Option<Chunk> {
        let key = self.absolute_coord(pos)?;
        self.erase_chunk_absolute(key)
    }

    // === Chunks (absolute) ===

    /// Chunk at an absolute coordinate, if materialized.
    #[must_use]
    pub fn chunk_absolute(&self, key: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&key).map(Arc::as_ref)
    }

    /// Mutable chunk at an absolute coordinate, if materialized.
    pub fn chunk_absolute_mut(&mut self, key: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&key).map(Arc::make_mut)
    }

    /// Inserts or replaces the chunk at an absolute coordinate, returning the
    /// previous one.
    pub fn set_chunk_absolute(&mut self, key: ChunkCoord, chunk: Chunk) -> Option<Chunk> {
        self.chunks.insert(key, Arc::new(chunk)).map(unwrap_shared)
    }

    /// Removes the chunk at an absolute coordinate.
    pub fn erase_chunk_absolute(&mut self, key: ChunkCoord) -> Option<Chunk> {
        self.chunks.remove(&key).map(unwrap_shared)
    }

    /// Whether a chunk is materialized at an absolute coordinate.
    #[must_use]
    pub fn contains_chunk(&self, key: ChunkCoord) -> bool {
        self.chunks.contains_key(&key)
    }

    /// Number of materialized chunks.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// All materialized chunks with their absolute coordinates.
    pub fn chunks(&self) -> impl Iterator<Item = (ChunkCoord, &Chunk)> + '_ {
        self.chunks.iter().map(|(key, chunk)| (*key, chunk.as_ref()))
    }

    /// Shared handles to every materialized chunk, for readers that outlive
    /// the world lock.
    pub fn shared_chunks(&self) -> impl Iterator<Item = (ChunkCoord, &Arc<Chunk>)> + '_ {
        self.chunks.iter().map(|(key, chunk)| (*key, chunk))
    }

    /// Mutable view over materialized chunks, for persistence and mesh upload
    /// bookkeeping.
    pub fn chunks_mut(&mut self) -> impl Iterator<Item = (ChunkCoord, &mut Chunk)> + '_ {
        self.chunks
            .iter_mut()
            .map(|(key, chunk)| (*key, Arc::make_mut(chunk)))
    }

    /// Materializes the chunk at an absolute coordinate.
    pub fn load_chunk_absolute(&mut self, key: ChunkCoord) -> WorldResult<&mut Chunk> {
        let origin = key.to_tile_coord(self.config.chunk_size);
        self.materialize(key, origin)
    }

    fn materialize(&mut self, key: ChunkCoord, tile: TileCoord) -> WorldResult<&mut Chunk> {
        use std::collections::hash_map::Entry;

        match self.chunks.entry(key) {
            Entry::Occupied(entry) => Ok(Arc::make_mut(entry.into_mut())),
            Entry::Vacant(entry) => {
                let Some(provider) = self.provider.as_ref() else {
                    return Err(WorldError::AddressingFault {
                        tile,
                        chunk: Some(key),
                    });
                };
                debug!("Generating chunk {key} with '{}'", provider.name());
                Ok(Arc::make_mut(entry.insert(Arc::new(provider.provide_chunk(key)))))
            },
        }
    }

    // === Tiles ===

    /// Live tile at a shifted tile index, generating its chunk if needed.
    ///
    /// Fails with [`WorldError::AddressingFault`] when the chunk is missing
    /// and no provider is installed, or when the index lies outside the
    /// addressable chunk range.
    pub fn tile_mut(&mut self, index: TileCoord) -> WorldResult<&mut Tile> {
        let (key, local) = self.locate(index).ok_or(WorldError::AddressingFault {
            tile: index,
            chunk: None,
        })?;
        self.materialize(key, index)?.get_mut(local)
    }

    /// Tile at a shifted tile index, or [`Tile::NULL`] if its chunk is not
    /// materialized or not addressable. Never generates.
    #[must_use]
    pub fn tile(&self, index: TileCoord) -> Tile {
        self.locate(index)
            .and_then(|(key, local)| self.chunk_absolute(key)?.get(local).ok())
            .unwrap_or(Tile::NULL)
    }

    /// Writes a tile through the generating path.
    pub fn set_tile(&mut self, index: TileCoord, tile: Tile) -> WorldResult<()> {
        *self.tile_mut(index)? = tile;
        Ok(())
    }

    /// Properties image of the `(2 * radius + 1)²` shifted chunks centered on
    /// the origin. Read-only; missing chunks stay zero.
    #[must_use]
    pub fn tile_property_map(&self, radius: u32) -> TilePropertyMap {
        let n = self.config.chunk_size as usize;
        let span = 2 * radius as usize + 1;
        let size = span * n;
        let mut data = vec![0u8; size * size];
        let r = radius as i32;

        for cy in -r..=r {
            for cx in -r..=r {
                let Some(chunk) = self.chunk(ChunkCoord::new(cx, cy)) else {
                    continue;
                };
                let base_x = (cx + r) as usize * n;
                let base_y = (cy + r) as usize * n;
                for (i, tile) in chunk.tiles().iter().enumerate() {
                    let (x, y) = (i % n, i / n);
                    data[(base_y + y) * size + base_x + x] = tile.properties();
                }
            }
        }

        TilePropertyMap { size, data }
    }

    // === Shift ===

    /// Re-centers the addressable space by `delta` chunks.
    pub fn shift(&mut self, delta: ChunkCoord) {
        self.shift_engine.apply(&mut self.offset, &mut self.entities, delta);
    }

    // === Entities ===

    /// Entities in insertion order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Mutable entities in insertion order.
    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// Adds an entity at a shifted-frame position.
    pub fn spawn_entity(&mut self, position: Vec2, size: Vec2) -> EntityId {
        self.insert_entity(Entity::new(position, size))
    }

    /// Adds an existing entity.
    pub fn insert_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        self.entities.push(entity);
        id
    }

    /// Removes an entity, keeping the order of the rest.
    pub fn remove_entity(&mut self, id: EntityId) -> WorldResult<Entity> {
        let index = self
            .entities
            .iter()
            .position(|e| e.id() == id)
            .ok_or(WorldError::UnknownEntity(id))?;
        Ok(self.entities.remove(index))
    }

    /// Looks up an entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Looks up an entity mutably.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }
}
