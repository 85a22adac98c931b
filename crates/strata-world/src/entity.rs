//! Entities living in world space.
//!
//! Only the state the world core needs lives here: identity, position in the
//! current shifted frame, and a size for culling and draw transforms.
//! Behavior (physics, AI) belongs to gameplay code and stays outside.

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use strata_common::EntityId;

/// An entity owned by the world index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable handle
    id: EntityId,
    /// Center position in world units, current shifted frame
    pub position: Vec2,
    /// Velocity in world units per second
    pub velocity: Vec2,
    /// Extent in world units
    pub size: Vec2,
}

impl Entity {
    /// Creates an entity with a fresh id.
    #[must_use]
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            id: EntityId::new(),
            position,
            velocity: Vec2::ZERO,
            size,
        }
    }

    /// Sets the velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Returns the entity id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Moves the entity by `delta` world units.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Advances the position by one step of velocity.
    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    /// Model transform for the renderer (translation × scale).
    #[must_use]
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.size.extend(1.0),
            glam::Quat::IDENTITY,
            Vec3::new(self.position.x, self.position.y, 0.0),
        )
    }
}
