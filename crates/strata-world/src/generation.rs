//! Procedural chunk generation.
//!
//! A [`ChunkProvider`] synthesizes a chunk the first time a mutable lookup
//! touches unmapped space. Providers are pure functions of the coordinate
//! (plus fixed configuration), so generating the same coordinate twice yields
//! identical tiles. They never touch the world index; they hand back an owned
//! chunk and the index inserts it.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec2;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use strata_common::{ChunkCoord, LocalCoord};

use crate::chunk::{Chunk, DEFAULT_CHUNK_SIZE};
use crate::tile::{Tile, TileKind};

/// Capability to synthesize a chunk for an unmapped coordinate.
pub trait ChunkProvider: Send + Sync {
    /// Builds the chunk at an absolute coordinate.
    fn provide_chunk(&self, coord: ChunkCoord) -> Chunk;

    /// Edge length of the chunks this provider produces.
    fn chunk_size(&self) -> u32;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// World seed (only the noise provider uses it)
    pub seed: u32,
    /// Chunk size in tiles
    pub chunk_size: u32,
    /// World units per tile, stamped on every chunk for render geometry
    pub tile_scale: Vec2,
    /// Horizontal noise scale (larger = smoother)
    pub terrain_scale: f64,
    /// Maximum surface displacement in tiles
    pub height_scale: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            chunk_size: DEFAULT_CHUNK_SIZE,
            tile_scale: Vec2::ONE,
            terrain_scale: 48.0,
            height_scale: 12.0,
        }
    }
}

/// Which provider a world is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Sinusoidal reference terrain
    #[default]
    Terrain,
    /// Flat banded fixture terrain
    Flat,
    /// Empty chunks
    Void,
    /// Seeded Perlin terrain
    Noise,
}

impl ProviderKind {
    /// Builds the provider for this kind.
    #[must_use]
    pub fn build(self, config: GeneratorConfig) -> Box<dyn ChunkProvider> {
        match self {
            Self::Terrain => Box::new(TerrainProvider::new(config)),
            Self::Flat => Box::new(FlatProvider::new(config)),
            Self::Void => Box::new(VoidProvider::new(config)),
            Self::Noise => Box::new(NoiseTerrainProvider::new(config)),
        }
    }
}

/// Surface row of the world: chunks with this y hold the ground line.
pub const SURFACE_CHUNK_Y: i32 = -1;

/// Writes a tile by local position without bounds reporting.
/// Callers iterate strictly inside `[0, size)`.
fn put(chunk: &mut Chunk, x: u32, y: u32, tile: Tile) {
    let size = chunk.size();
    let index = LocalCoord::new(x as u16, y as u16).to_index(size);
    if let Some(slot) = chunk.tiles_mut().get_mut(index) {
        *slot = tile;
    }
}

/// Material for a tile `depth` rows below the surface.
#[must_use]
pub fn layer_at_depth(depth: u32) -> Tile {
    match depth {
        0..=1 => Tile::new(TileKind::Grass, depth as u8),
        2..=11 => Tile::new(TileKind::Dirt, (depth - 2) as u8),
        12..=21 => Tile::new(TileKind::Stone, (depth - 12) as u8),
        _ => Tile::of(TileKind::Rock),
    }
}

/// Lays grass/dirt/stone/rock from `ground_y` down to row 0.
fn layer_column(chunk: &mut Chunk, x: u32, ground_y: u32) {
    for (depth, y) in (0..=ground_y).rev().enumerate() {
        put(chunk, x, y, layer_at_depth(depth as u32));
    }
}

/// Reference terrain: a sinusoidal ground line in the surface chunk row,
/// solid rock below, open sky above.
#[derive(Debug, Clone)]
pub struct TerrainProvider {
    config: GeneratorConfig,
}

impl TerrainProvider {
    /// Creates a terrain provider.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Height of the ground above the chunk's top row for column `x`, in tiles.
    #[must_use]
    pub fn surface_height(x: u32, chunk_size: u32) -> u32 {
        let phase = x as f32 / chunk_size as f32 * TAU - FRAC_PI_2;
        (phase.sin() * 3.0 + 3.0).max(0.0) as u32
    }
}

impl ChunkProvider for TerrainProvider {
    fn provide_chunk(&self, coord: ChunkCoord) -> Chunk {
        let size = self.config.chunk_size;
        let mut chunk = Chunk::new(coord, size, self.config.tile_scale);

        if coord.y == SURFACE_CHUNK_Y {
            for x in 0..size {
                let ground_y = (size - 1).saturating_sub(Self::surface_height(x, size));
                layer_column(&mut chunk, x, ground_y);
            }
        } else if coord.y < SURFACE_CHUNK_Y {
            chunk.fill(TileKind::Rock);
        }

        chunk.mark_clean();
        chunk
    }

    fn chunk_size(&self) -> u32 {
        self.config.chunk_size
    }

    fn name(&self) -> &'static str {
        "terrain"
    }
}

/// Fixture terrain: every chunk is rock with grass, dirt and stone bands at
/// the top, regardless of coordinate.
#[derive(Debug, Clone)]
pub struct FlatProvider {
    config: GeneratorConfig,
}

impl FlatProvider {
    /// Creates a flat provider.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }
}

impl ChunkProvider for FlatProvider {
    fn provide_chunk(&self, coord: ChunkCoord) -> Chunk {
        let size = self.config.chunk_size;
        let mut chunk = Chunk::new(coord, size, self.config.tile_scale);
        chunk.fill(TileKind::Rock);

        let row = |from_top: u32| size.checked_sub(1 + from_top);
        for x in 0..size {
            for from_top in 0..2 {
                if let Some(y) = row(from_top) {
                    put(&mut chunk, x, y, Tile::of(TileKind::Grass));
                }
            }
            for depth in 0..10u32 {
                if let Some(y) = row(2 + depth) {
                    put(&mut chunk, x, y, Tile::new(TileKind::Dirt, depth as u8));
                }
                if let Some(y) = row(12 + depth) {
                    put(&mut chunk, x, y, Tile::new(TileKind::Stone, depth as u8));
                }
            }
        }

        chunk.mark_clean();
        chunk
    }

    fn chunk_size(&self) -> u32 {
        self.config.chunk_size
    }

    fn name(&self) -> &'static str {
        "flat"
    }
}

/// Produces empty chunks; the world simply grows on demand.
#[derive(Debug, Clone)]
pub struct VoidProvider {
    config: GeneratorConfig,
}

impl VoidProvider {
    /// Creates a void provider.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }
}

impl ChunkProvider for VoidProvider {
    fn provide_chunk(&self, coord: ChunkCoord) -> Chunk {
        Chunk::new(coord, self.config.chunk_size, self.config.tile_scale)
    }

    fn chunk_size(&self) -> u32 {
        self.config.chunk_size
    }

    fn name(&self) -> &'static str {
        "void"
    }
}

/// Seeded Perlin terrain with the same layering as [`TerrainProvider`].
pub struct NoiseTerrainProvider {
    config: GeneratorConfig,
    /// Terrain noise
    terrain_noise: Perlin,
    /// Detail noise
    detail_noise: Perlin,
}

impl NoiseTerrainProvider {
    /// Creates a noise provider from the config seed.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let terrain_noise = Perlin::new(config.seed);
        let detail_noise = Perlin::new(config.seed.wrapping_add(1));
        Self {
            config,
            terrain_noise,
            detail_noise,
        }
    }

    /// Creates a provider with default config and the given seed.
    #[must_use]
    pub fn with_seed(seed: u32) -> Self {
        Self::new(GeneratorConfig {
            seed,
            ..Default::default()
        })
    }

    /// Ground height in tiles for an absolute tile column.
    fn surface_height(&self, tile_x: i64) -> u32 {
        let wx = tile_x as f64 / self.config.terrain_scale;
        let height = self.terrain_noise.get([wx, 0.0]);
        let detail = self.detail_noise.get([wx * 4.0, 0.0]) * 0.1;
        let normalized = ((height + detail + 1.0) / 2.0).clamp(0.0, 1.0);
        let max = f64::from(self.config.chunk_size.saturating_sub(1));
        (normalized * self.config.height_scale).min(max) as u32
    }
}

impl ChunkProvider for NoiseTerrainProvider {
    fn provide_chunk(&self, coord: ChunkCoord) -> Chunk {
        let size = self.config.chunk_size;
        let mut chunk = Chunk::new(coord, size, self.config.tile_scale);

        if coord.y == SURFACE_CHUNK_Y {
            let origin_x = coord.to_tile_coord(size).x;
            for x in 0..size {
                let height = self.surface_height(origin_x + i64::from(x));
                layer_column(&mut chunk, x, (size - 1).saturating_sub(height));
            }
        } else if coord.y < SURFACE_CHUNK_Y {
            chunk.fill(TileKind::Rock);
        }

        chunk.mark_clean();
        chunk
    }

    fn chunk_size(&self) -> u32 {
        self.config.chunk_size
    }

    fn name(&self) -> &'static str {
        "noise"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(chunk: &Chunk, x: u16, y: u16) -> Tile {
        chunk.get(LocalCoord::new(x, y)).expect("in range")
    }

    #[test]
    fn test_terrain_deterministic() {
        let provider = TerrainProvider::new(GeneratorConfig::default());
        for coord in [
            ChunkCoord::new(0, -1),
            ChunkCoord::new(-5, -1),
            ChunkCoord::new(3, -4),
        ] {
            assert_eq!(
                provider.provide_chunk(coord).tiles(),
                provider.provide_chunk(coord).tiles()
            );
        }
    }

    #[test]
    fn test_terrain_bands() {
        let provider = TerrainProvider::new(GeneratorConfig::default());

        let sky = provider.provide_chunk(ChunkCoord::new(0, 0));
        assert!(sky.tiles().iter().all(|t| *t == Tile::EMPTY));

        let deep = provider.provide_chunk(ChunkCoord::new(7, -2));
        assert!(deep.tiles().iter().all(|t| *t == Tile::of(TileKind::Rock)));
        assert!(!deep.is_dirty());

        let surface = provider.provide_chunk(ChunkCoord::new(0, -1));
        // Column 0 sits at the trough of the sine: ground on the top row.
        assert_eq!(tile(&surface, 0, 63), Tile::new(TileKind::Grass, 0));
        assert_eq!(tile(&surface, 0, 62), Tile::new(TileKind::Grass, 1));
        assert_eq!(tile(&surface, 0, 61), Tile::new(TileKind::Dirt, 0));
        assert_eq!(tile(&surface, 0, 52), Tile::new(TileKind::Dirt, 9));
        assert_eq!(tile(&surface, 0, 51), Tile::new(TileKind::Stone, 0));
        assert_eq!(tile(&surface, 0, 42), Tile::new(TileKind::Stone, 9));
        assert_eq!(tile(&surface, 0, 41), Tile::of(TileKind::Rock));
        assert_eq!(tile(&surface, 0, 0), Tile::of(TileKind::Rock));

        // Mid-chunk is the crest: six rows of sky above the grass.
        let crest = 63 - TerrainProvider::surface_height(32, 64) as u16;
        assert_eq!(crest, 57);
        assert_eq!(tile(&surface, 32, crest + 1), Tile::EMPTY);
        assert_eq!(tile(&surface, 32, crest), Tile::new(TileKind::Grass, 0));
    }

    #[test]
    fn test_flat_bands() {
        let provider = FlatProvider::new(GeneratorConfig::default());
        let chunk = provider.provide_chunk(ChunkCoord::new(-9, 4));
        for x in [0u16, 31, 63] {
            assert_eq!(tile(&chunk, x, 63), Tile::of(TileKind::Grass));
            assert_eq!(tile(&chunk, x, 62), Tile::of(TileKind::Grass));
            assert_eq!(tile(&chunk, x, 61), Tile::new(TileKind::Dirt, 0));
            assert_eq!(tile(&chunk, x, 52), Tile::new(TileKind::Dirt, 9));
            assert_eq!(tile(&chunk, x, 51), Tile::new(TileKind::Stone, 0));
            assert_eq!(tile(&chunk, x, 42), Tile::new(TileKind::Stone, 9));
            assert_eq!(tile(&chunk, x, 41), Tile::of(TileKind::Rock));
        }
    }

    #[test]
    fn test_flat_small_chunk_does_not_underflow() {
        let provider = FlatProvider::new(GeneratorConfig {
            chunk_size: 8,
            ..Default::default()
        });
        let chunk = provider.provide_chunk(ChunkCoord::ZERO);
        assert_eq!(tile(&chunk, 0, 7), Tile::of(TileKind::Grass));
        assert_eq!(tile(&chunk, 0, 0), Tile::new(TileKind::Dirt, 5));
    }

    #[test]
    fn test_void_is_empty() {
        let chunk = VoidProvider::new(GeneratorConfig::default()).provide_chunk(ChunkCoord::ZERO);
        assert!(chunk.tiles().iter().all(|t| *t == Tile::EMPTY));
    }

    #[test]
    fn test_noise_deterministic_per_seed() {
        let a = NoiseTerrainProvider::with_seed(42);
        let b = NoiseTerrainProvider::with_seed(42);
        let coord = ChunkCoord::new(11, SURFACE_CHUNK_Y);
        assert_eq!(a.provide_chunk(coord).tiles(), b.provide_chunk(coord).tiles());
    }

    #[test]
    fn test_noise_surface_has_grass_in_every_column() {
        let provider = NoiseTerrainProvider::with_seed(7);
        let chunk = provider.provide_chunk(ChunkCoord::new(-3, SURFACE_CHUNK_Y));
        for x in 0..64u16 {
            let grass = (0..64u16).any(|y| tile(&chunk, x, y).kind == TileKind::Grass);
            assert!(grass, "column {x} has no grass");
        }
    }

    #[test]
    fn test_provider_kind_build() {
        for (kind, name) in [
            (ProviderKind::Terrain, "terrain"),
            (ProviderKind::Flat, "flat"),
            (ProviderKind::Void, "void"),
            (ProviderKind::Noise, "noise"),
        ] {
            let provider = kind.build(GeneratorConfig::default());
            assert_eq!(provider.name(), name);
            assert_eq!(provider.chunk_size(), DEFAULT_CHUNK_SIZE);
        }
    }
}
