//! Error types for Strata.

use thiserror::Error;

use crate::coords::{ChunkCoord, LocalCoord, TileCoord};
use crate::ids::EntityId;

/// Top-level error type for Strata operations.
#[derive(Debug, Error)]
pub enum StrataError {
    /// World/chunk errors
    #[error("World error: {0}")]
    World(#[from] WorldError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Expected version
        expected: String,
        /// Actual version found
        actual: String,
    },
}

/// World and chunk errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// Local tile index outside the chunk. Only reachable through the
    /// low-level chunk API; world addressing always wraps first.
    #[error("Local index ({}, {}) out of range for chunk size {size}", local.x, local.y)]
    OutOfRange {
        /// Offending local index
        local: LocalCoord,
        /// Chunk edge length
        size: u32,
    },

    /// Mutable access into unmapped space that cannot be materialized:
    /// no provider is installed, or the tile lies beyond the addressable
    /// chunk range.
    #[error("Cannot materialize a chunk for tile ({}, {})", tile.x, tile.y)]
    AddressingFault {
        /// Requested tile
        tile: TileCoord,
        /// Absolute chunk that would contain it, if addressable
        chunk: Option<ChunkCoord>,
    },

    /// Entity is not part of the world
    #[error("Unknown entity {0:?}")]
    UnknownEntity(EntityId),

    /// Invalid chunk or snapshot data
    #[error("Invalid world data: {0}")]
    InvalidData(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// The config could not be encoded
    #[error("Failed to encode config: {0}")]
    Encode(String),
}

/// Result type alias for world operations.
pub type WorldResult<T> = Result<T, WorldError>;

/// Result type alias for Strata operations.
pub type StrataResult<T> = Result<T, StrataError>;
