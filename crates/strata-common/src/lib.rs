//! # Strata Common
//!
//! Common types and shared abstractions for Strata.
//!
//! This crate provides foundational types used across all Strata subsystems:
//! - Coordinate types (tile, chunk, local) and floored chunk addressing
//! - Entity IDs
//! - Version information for snapshot schemas
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::version::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coords_conversion() {
        let tile = TileCoord::new(100, 200);
        let chunk = tile.to_chunk_coord(32);
        let local = tile.to_local_coord(32);

        assert_eq!(chunk, Some(ChunkCoord::new(3, 6)));
        assert_eq!(local, LocalCoord::new(4, 8));
    }

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_version_compatibility() {
        let v1 = SchemaVersion::new(1, 0, 0);
        let v2 = SchemaVersion::new(1, 1, 0);
        let v3 = SchemaVersion::new(2, 0, 0);

        // v2 can read v1 data (newer version reading older data)
        assert!(v2.is_compatible_with(&v1));
        // Different major versions are incompatible
        assert!(!v1.is_compatible_with(&v3));
        assert!(!SchemaVersion::WORLD_SNAPSHOT.can_read(&v3));
    }

    #[test]
    fn test_error_messages_name_coordinates() {
        let err = WorldError::AddressingFault {
            tile: TileCoord::new(-1, -1),
            chunk: Some(ChunkCoord::new(-1, -1)),
        };
        assert!(err.to_string().contains("(-1, -1)"));

        let err = WorldError::OutOfRange {
            local: LocalCoord::new(64, 0),
            size: 64,
        };
        assert!(err.to_string().contains("64"));
    }
}
