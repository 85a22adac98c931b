//! 2D camera following the host through the shifted frame.
//!
//! World Y points up (sky is at non-negative tile rows). The matrices map
//! the camera position to the center of normalized device space.

use glam::{Mat4, Vec2, Vec3};

/// Minimum zoom level (zoomed out).
pub const MIN_ZOOM: f32 = 0.25;

/// Maximum zoom level (zoomed in).
pub const MAX_ZOOM: f32 = 20.0;

/// Default zoom level.
pub const DEFAULT_ZOOM: f32 = 1.0;

/// 2D orthographic camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Center of view in world units (shifted frame).
    pub position: Vec2,
    /// Zoom level (1.0 = one world unit per pixel).
    pub zoom: f32,
    /// Viewport size in pixels (width, height).
    pub viewport_size: (u32, u32),
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: DEFAULT_ZOOM,
            viewport_size: (1280, 720),
        }
    }
}

impl Camera {
    /// Creates a new camera with the given viewport size.
    #[must_use]
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            viewport_size: (viewport_width, viewport_height),
            ..Self::default()
        }
    }

    /// Center camera on world position.
    pub fn center_on(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Set absolute zoom level (clamped).
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Visible world size (width, height) in world units.
    #[must_use]
    pub fn visible_size(&self) -> Vec2 {
        Vec2::new(self.viewport_size.0 as f32, self.viewport_size.1 as f32) / self.zoom
    }

    /// Orthographic projection centered on the view origin.
    #[must_use]
    pub fn projection(&self) -> Mat4 {
        let half = self.visible_size().max(Vec2::splat(f32::EPSILON)) / 2.0;
        Mat4::orthographic_rh(-half.x, half.x, -half.y, half.y, -1.0, 1.0)
    }

    /// View matrix moving the camera position to the origin.
    #[must_use]
    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(-self.position.x, -self.position.y, 0.0))
    }
}
