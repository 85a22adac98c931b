//! Re-centering of the addressable space.
//!
//! Chunks stay keyed by absolute coordinate forever. A shift only moves the
//! offset between absolute and shifted coordinates and translates every
//! entity by the same amount, so a shift costs one vector subtraction plus
//! one pass over entities instead of rekeying the chunk map.
//!
//! Coordinate convention: `shifted = absolute + offset`. Applying a shift of
//! `delta` subtracts `delta` from the offset and moves entities by `-delta`
//! chunk extents, which keeps chunks and entities in agreement.

use glam::Vec2;
use strata_common::ChunkCoord;
use tracing::debug;

use crate::entity::Entity;

/// Applies shifts and decides when the host needs one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftEngine {
    /// World units covered by one chunk along an axis
    chunk_extent: f32,
}

impl ShiftEngine {
    /// Creates a shift engine for the given chunk extent.
    #[must_use]
    pub const fn new(chunk_extent: f32) -> Self {
        Self { chunk_extent }
    }

    /// World units covered by one chunk.
    #[must_use]
    pub const fn chunk_extent(&self) -> f32 {
        self.chunk_extent
    }

    /// Updates `offset` and every entity position as one step.
    ///
    /// Callers hold exclusive access to both for the whole call, so no reader
    /// can observe one without the other.
    pub fn apply(&self, offset: &mut ChunkCoord, entities: &mut [Entity], delta: ChunkCoord) {
        if delta.is_zero() {
            return;
        }
        *offset -= delta;
        let translation = -delta.as_vec2() * self.chunk_extent;
        for entity in entities.iter_mut() {
            entity.translate(translation);
        }
        debug!(
            "Shifted world by {delta}, offset now {offset}, {} entities moved",
            entities.len()
        );
    }

    /// Per-tick shift trigger for a host position.
    ///
    /// Each axis yields `1` past the far edge of the home chunk, `-1` before
    /// its near edge and `0` inside it. A host that moved several chunks in
    /// one tick is still shifted by one chunk; following ticks catch up.
    #[must_use]
    pub fn trigger(&self, host_position: Vec2) -> ChunkCoord {
        let axis = |value: f32| {
            if value < 0.0 {
                -1
            } else if value > self.chunk_extent {
                1
            } else {
                0
            }
        };
        ChunkCoord::new(axis(host_position.x), axis(host_position.y))
    }

    /// Full chunk displacement of a host, for explicit re-centering after a
    /// teleport.
    #[must_use]
    pub fn recenter_delta(&self, host_position: Vec2) -> ChunkCoord {
        let chunks = (host_position / self.chunk_extent).floor();
        ChunkCoord::new(chunks.x as i32, chunks.y as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EXTENT: f32 = 1024.0;

    #[test]
    fn test_trigger_clamps_to_one_chunk() {
        let engine = ShiftEngine::new(EXTENT);
        assert_eq!(engine.trigger(Vec2::new(512.0, 512.0)), ChunkCoord::ZERO);
        assert_eq!(engine.trigger(Vec2::new(1025.0, -1.0)), ChunkCoord::new(1, -1));
        assert_eq!(engine.trigger(Vec2::new(9000.0, 0.0)), ChunkCoord::new(1, 0));
        assert_eq!(engine.trigger(Vec2::new(EXTENT, 0.0)), ChunkCoord::ZERO);
    }

    #[test]
    fn test_recenter_delta() {
        let engine = ShiftEngine::new(EXTENT);
        assert_eq!(engine.recenter_delta(Vec2::new(5000.0, -10.0)), ChunkCoord::new(4, -1));
        assert_eq!(engine.recenter_delta(Vec2::new(1.0, 1.0)), ChunkCoord::ZERO);
    }

    #[test]
    fn test_apply_moves_offset_and_entities() {
        let engine = ShiftEngine::new(EXTENT);
        let mut offset = ChunkCoord::ZERO;
        let mut entities = vec![Entity::new(Vec2::new(1100.0, 10.0), Vec2::ONE)];

        engine.apply(&mut offset, &mut entities, ChunkCoord::new(1, 0));

        assert_eq!(offset, ChunkCoord::new(-1, 0));
        assert_eq!(entities[0].position, Vec2::new(76.0, 10.0));
    }

    proptest! {
        #[test]
        fn prop_shifts_preserve_absolute_position(
            start_x in -4096i32..4096,
            start_y in -4096i32..4096,
            deltas in prop::collection::vec((-3i32..=3, -3i32..=3), 0..12),
        ) {
            let engine = ShiftEngine::new(EXTENT);
            let start = Vec2::new(start_x as f32, start_y as f32);
            let mut offset = ChunkCoord::ZERO;
            let mut entities = vec![Entity::new(start, Vec2::ONE)];

            let mut total = ChunkCoord::ZERO;
            for (dx, dy) in deltas {
                let delta = ChunkCoord::new(dx, dy);
                engine.apply(&mut offset, &mut entities, delta);
                total += delta;
            }

            prop_assert_eq!(offset, -total);
            let local = entities[0].position;
            prop_assert_eq!(local, start - total.as_vec2() * EXTENT);
            prop_assert_eq!(local - offset.as_vec2() * EXTENT, start);
        }
    }
}
