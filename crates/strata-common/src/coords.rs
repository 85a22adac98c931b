//! Coordinate types for tile, chunk, and local positions.
//!
//! A global tile index splits into a chunk coordinate (floored division by the
//! chunk size) and a local index (euclidean remainder, always non-negative).
//! Every read/write path in the world goes through [`TileCoord::split`].

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Global tile index (one unit per tile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct TileCoord {
    /// X tile index
    pub x: i64,
    /// Y tile index
    pub y: i64,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Returns the tile containing a world-space position.
    ///
    /// Uses `floor`, so `-0.5` lands in tile `-1` and `-1.0` stays in tile `-1`.
    #[must_use]
    pub fn containing(pos: Vec2, tile_size: f32) -> Self {
        let scaled = (pos / tile_size).floor();
        Self {
            x: scaled.x as i64,
            y: scaled.y as i64,
        }
    }

    /// Converts to chunk coordinate given chunk size.
    ///
    /// Returns `None` when the floored quotient does not fit a chunk
    /// coordinate, so distinct tiles never alias into one chunk.
    #[must_use]
    pub fn to_chunk_coord(self, chunk_size: u32) -> Option<ChunkCoord> {
        let size = i64::from(chunk_size);
        Some(ChunkCoord {
            x: i32::try_from(self.x.div_euclid(size)).ok()?,
            y: i32::try_from(self.y.div_euclid(size)).ok()?,
        })
    }

    /// Converts to local coordinate within a chunk.
    #[must_use]
    pub const fn to_local_coord(self, chunk_size: u32) -> LocalCoord {
        let size = chunk_size as i64;
        LocalCoord {
            x: self.x.rem_euclid(size) as u16,
            y: self.y.rem_euclid(size) as u16,
        }
    }

    /// Splits into the containing chunk and the index inside it.
    ///
    /// `None` for tiles outside the addressable chunk range.
    #[must_use]
    pub fn split(self, chunk_size: u32) -> Option<(ChunkCoord, LocalCoord)> {
        Some((self.to_chunk_coord(chunk_size)?, self.to_local_coord(chunk_size)))
    }
}

/// Chunk coordinate (identifies a chunk in the world grid).
///
/// Also used as a chunk-granular delta for shifts and offsets.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable,
)]
#[repr(C)]
pub struct ChunkCoord {
    /// X coordinate in chunk space
    pub x: i32,
    /// Y coordinate in chunk space
    pub y: i32,
}

impl ChunkCoord {
    /// The origin / zero delta.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts to the tile coordinate of the chunk's first tile.
    #[must_use]
    pub const fn to_tile_coord(self, chunk_size: u32) -> TileCoord {
        TileCoord {
            x: (self.x as i64) * (chunk_size as i64),
            y: (self.y as i64) * (chunk_size as i64),
        }
    }

    /// Returns the coordinate as a float vector.
    #[must_use]
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    /// Component-wise sign (-1, 0 or 1).
    #[must_use]
    pub const fn signum(self) -> Self {
        Self {
            x: self.x.signum(),
            y: self.y.signum(),
        }
    }

    /// Component-wise addition, `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match (self.x.checked_add(rhs.x), self.y.checked_add(rhs.y)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }

    /// Component-wise subtraction, `None` on overflow.
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match (self.x.checked_sub(rhs.x), self.y.checked_sub(rhs.y)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }

    /// Returns true for the zero delta.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl Add for ChunkCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for ChunkCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for ChunkCoord {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl AddAssign for ChunkCoord {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for ChunkCoord {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Local coordinate within a chunk (0 to chunk_size-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct LocalCoord {
    /// X coordinate within chunk
    pub x: u16,
    /// Y coordinate within chunk
    pub y: u16,
}

impl LocalCoord {
    /// Creates a new local coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Returns true if both components are below `chunk_size`.
    #[must_use]
    pub const fn in_bounds(self, chunk_size: u32) -> bool {
        (self.x as u32) < chunk_size && (self.y as u32) < chunk_size
    }

    /// Converts to linear index for array access.
    #[must_use]
    pub const fn to_index(self, chunk_size: u32) -> usize {
        (self.y as usize) * (chunk_size as usize) + (self.x as usize)
    }

    /// Creates from linear index.
    #[must_use]
    pub const fn from_index(index: usize, chunk_size: u32) -> Self {
        let size = chunk_size as usize;
        Self {
            x: (index % size) as u16,
            y: (index / size) as u16,
        }
    }
}
