//! Camera state shared between the simulation and render contexts.
//!
//! One mutex guards a plain-data slot: the tracked host handle, the camera,
//! the matrices derived from it, the host transform and the world offset they
//! were computed against. Every accessor copies values in or out and releases
//! the lock before returning, so the render context never holds it while it
//! talks to the GPU.
//!
//! Lock order: the world lock is always taken before this one. The
//! simulation publishes while it still holds the world write lock and the
//! renderer snapshots while it holds the world read lock, so a snapshot is
//! always consistent with the world the renderer is looking at.

use glam::{Mat4, Vec2};
use parking_lot::Mutex;
use strata_common::{ChunkCoord, EntityId};

use crate::camera::Camera;

/// Values copied out for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSnapshot {
    /// Tracked host, if any
    pub host: Option<EntityId>,
    /// Projection matrix
    pub projection: Mat4,
    /// View matrix
    pub view: Mat4,
    /// Host model transform at publish time
    pub host_transform: Option<Mat4>,
    /// Camera center in the shifted frame
    pub camera_position: Vec2,
    /// World offset the values were computed against
    pub offset: ChunkCoord,
    /// Publish counter
    pub generation: u64,
}

impl CameraSnapshot {
    /// `projection * view`.
    #[must_use]
    pub fn combined(&self) -> Mat4 {
        self.projection * self.view
    }
}

#[derive(Debug)]
struct CameraSlot {
    host: Option<EntityId>,
    camera: Camera,
    projection: Mat4,
    view: Mat4,
    host_transform: Option<Mat4>,
    offset: ChunkCoord,
    generation: u64,
}

impl CameraSlot {
    fn refresh_matrices(&mut self) {
        self.projection = self.camera.projection();
        self.view = self.camera.view();
    }
}

/// Mutex-guarded camera and host state.
#[derive(Debug)]
pub struct CameraShare {
    slot: Mutex<CameraSlot>,
}

impl Default for CameraShare {
    fn default() -> Self {
        Self::new(Camera::default())
    }
}

impl CameraShare {
    /// Creates a share with no host.
    #[must_use]
    pub fn new(camera: Camera) -> Self {
        Self {
            slot: Mutex::new(CameraSlot {
                host: None,
                projection: camera.projection(),
                view: camera.view(),
                camera,
                host_transform: None,
                offset: ChunkCoord::ZERO,
                generation: 0,
            }),
        }
    }

    /// Replaces the tracked host.
    pub fn set_host(&self, host: Option<EntityId>) {
        self.slot.lock().host = host;
    }

    /// Currently tracked host.
    #[must_use]
    pub fn host(&self) -> Option<EntityId> {
        self.slot.lock().host
    }

    /// Copy of the camera.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.slot.lock().camera
    }

    /// Edits the camera (viewport, zoom) and recomputes its matrices.
    pub fn update_camera(&self, f: impl FnOnce(&mut Camera)) {
        let mut slot = self.slot.lock();
        f(&mut slot.camera);
        slot.refresh_matrices();
    }

    /// Publishes the state computed by a simulation tick.
    ///
    /// Centers the camera on the host, stores its transform and the world
    /// offset, and bumps the generation. Returns the new generation.
    pub fn publish(
        &self,
        host_position: Option<Vec2>,
        host_transform: Option<Mat4>,
        offset: ChunkCoord,
    ) -> u64 {
        let mut slot = self.slot.lock();
        if let Some(position) = host_position {
            slot.camera.center_on(position);
        }
        slot.refresh_matrices();
        slot.host_transform = host_transform;
        slot.offset = offset;
        slot.generation += 1;
        slot.generation
    }

    /// Copies the render-relevant values out under the lock.
    #[must_use]
    pub fn snapshot_for_render(&self) -> CameraSnapshot {
        let slot = self.slot.lock();
        CameraSnapshot {
            host: slot.host,
            projection: slot.projection,
            view: slot.view,
            host_transform: slot.host_transform,
            camera_position: slot.camera.position,
            offset: slot.offset,
            generation: slot.generation,
        }
    }

    /// `projection * view`, read under the lock.
    #[must_use]
    pub fn combined_transform(&self) -> Mat4 {
        let slot = self.slot.lock();
        slot.projection * slot.view
    }

    /// Number of publishes so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.slot.lock().generation
    }
}
