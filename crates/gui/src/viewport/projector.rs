//! Screen ↔ world mapping for the current camera.
//!
//! Screen coordinates are pixels with the origin at the top-left corner and
//! y growing downwards. Window depth is in `[0, 1]`, 0 on the near plane.

use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};
use shared::BuildVolume;

use super::camera::CameraState;
use crate::error::ViewportError;

/// Client area size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Zero (or negative/NaN) area: nothing can be projected
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn aspect(&self) -> f32 {
        if self.is_degenerate() {
            1.0
        } else {
            self.width / self.height
        }
    }

    /// Pixel → normalized device coordinates (`[-1, 1]`, y up)
    pub fn to_ndc(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            2.0 * screen.x / self.width - 1.0,
            1.0 - 2.0 * screen.y / self.height,
        )
    }

    pub fn to_screen(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        )
    }
}

/// Snapshot of the full scene transform for one viewport size.
///
/// Built per event; it never outlives a camera change.
#[derive(Debug, Clone)]
pub struct Projector {
    size: ViewportSize,
    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
    inverse: Mat4,
    reference_depth: f32,
}

impl Projector {
    pub fn new(
        camera: &CameraState,
        volume: &BuildVolume,
        size: ViewportSize,
    ) -> Result<Self, ViewportError> {
        if size.is_degenerate() {
            return Err(ViewportError::DegenerateViewport {
                width: size.width,
                height: size.height,
            });
        }
        let view = camera.scene_view_matrix(volume);
        let projection = camera.projection_matrix(size, volume);
        let view_projection = projection * view;
        // Pan only shifts sideways, so the target plane sits at eye depth -distance
        let target = projection * Vec4::new(0.0, 0.0, -camera.distance, 1.0);
        let reference_depth = (target.z / target.w + 1.0) * 0.5;
        Ok(Self {
            size,
            view,
            projection,
            view_projection,
            inverse: view_projection.inverse(),
            reference_depth,
        })
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// World point at window depth `depth` on the ray through pixel `(screen_x, screen_y)`
    pub fn unproject(&self, screen_x: f32, screen_y: f32, depth: f32) -> Vec3 {
        let ndc = self.size.to_ndc(Vec2::new(screen_x, screen_y));
        let clip = self.inverse * ndc.extend(2.0 * depth - 1.0).extend(1.0);
        clip.xyz() / clip.w
    }

    /// World point → `(screen_x, screen_y, depth)`
    pub fn project(&self, world: Vec3) -> Vec3 {
        let clip = self.view_projection * world.extend(1.0);
        let ndc = clip.xyz() / clip.w;
        self.size.to_screen(ndc.truncate()).extend((ndc.z + 1.0) * 0.5)
    }

    /// Window depth of the plane through the platform centre facing the camera
    pub fn reference_depth(&self) -> f32 {
        self.reference_depth
    }

    /// World-space delta between two pixels on the reference plane
    pub fn world_delta(&self, from: Vec2, to: Vec2) -> Vec3 {
        let depth = self.reference_depth();
        self.unproject(to.x, to.y, depth) - self.unproject(from.x, from.y, depth)
    }
}
