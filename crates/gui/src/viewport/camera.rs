//! Trackball camera: orientation, distance, pan and the matching matrices.

use glam::{Mat4, Quat, Vec2, Vec3};
use shared::BuildVolume;

use super::projector::ViewportSize;
use super::trackball::{compose, to_rotation_matrix};

/// Vertical field of view of the perspective projection
pub const FIELD_OF_VIEW_DEG: f32 = 60.0;
/// Perspective near clipping plane
pub const NEAR_PLANE: f32 = 1.0;
pub const MIN_DISTANCE: f32 = 1.0;
pub const MAX_DISTANCE: f32 = 100_000.0;

/// Trackball camera looking at the centre of the build platform.
///
/// With the identity orientation the camera looks straight down the world -Z
/// axis onto the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    /// Camera orientation (unit quaternion)
    pub orientation: Quat,
    /// Pull-back along the view axis
    pub distance: f32,
    pub orthographic: bool,
    /// Eye-space offset applied after the pull-back
    pub pan: Vec2,
    /// Vertical field of view (radians)
    pub fov: f32,
    /// Distance at which one orthographic unit covers one pixel
    pub reference_distance: f32,
}

impl CameraState {
    pub fn for_volume(volume: &BuildVolume) -> Self {
        let distance = volume.width.max(volume.depth) as f32;
        Self {
            orientation: Quat::IDENTITY,
            distance,
            orthographic: false,
            pan: Vec2::ZERO,
            fov: FIELD_OF_VIEW_DEG.to_radians(),
            reference_distance: distance,
        }
    }

    /// Back to the initial top-down view, keeping the projection mode
    pub fn reset(&mut self) {
        self.orientation = Quat::IDENTITY;
        self.distance = self.reference_distance;
        self.pan = Vec2::ZERO;
    }

    pub fn toggle_projection(&mut self) {
        self.orthographic = !self.orthographic;
    }

    /// Accumulate a trackball increment: `orientation = orientation * increment`
    pub fn rotate_by(&mut self, increment: Quat) {
        self.orientation = compose(self.orientation, increment);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Camera transform: `translate(pan, -distance)` then the trackball rotation
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.pan.x, self.pan.y, -self.distance))
            * to_rotation_matrix(self.orientation)
    }

    /// Camera transform followed by the shift that centres the platform on the origin
    pub fn scene_view_matrix(&self, volume: &BuildVolume) -> Mat4 {
        self.view_matrix() * platform_origin_offset(volume)
    }

    pub fn projection_matrix(&self, size: ViewportSize, volume: &BuildVolume) -> Mat4 {
        let far = (self.distance + 2.0 * volume.diagonal() as f32).max(NEAR_PLANE * 2.0);
        if self.orthographic {
            let half = self.focal_extent_per_distance(size) * self.distance;
            Mat4::orthographic_rh_gl(-half.x, half.x, -half.y, half.y, -far, far)
        } else {
            Mat4::perspective_rh_gl(self.fov, size.aspect(), NEAR_PLANE, far)
        }
    }

    /// Half-size of the visible area on the view-target plane, per unit of
    /// camera distance. Both projections scale linearly with distance there.
    pub fn focal_extent_per_distance(&self, size: ViewportSize) -> Vec2 {
        if self.orthographic {
            Vec2::new(size.width, size.height) * 0.5 / self.reference_distance
        } else {
            let half_h = (self.fov * 0.5).tan();
            Vec2::new(half_h * size.aspect(), half_h)
        }
    }

    /// Divide the distance by `factor` and shift the pan so the point of the
    /// view-target plane under `ndc` stays put.
    ///
    /// A step that would leave `[MIN_DISTANCE, MAX_DISTANCE]` is skipped
    /// whole, so the reciprocal factor always undoes an applied step.
    /// Returns whether the camera changed.
    pub fn zoom_about(&mut self, ndc: Vec2, factor: f32, size: ViewportSize) -> bool {
        if factor <= 0.0 || !factor.is_finite() {
            return false;
        }
        let old = self.distance;
        let new = old / factor;
        if !(MIN_DISTANCE..=MAX_DISTANCE).contains(&new) {
            return false;
        }
        let extent = self.focal_extent_per_distance(size);
        self.pan += ndc * extent * (new - old);
        self.distance = new;
        true
    }
}

/// `translate(-origin_offset - size / 2)` in the platform plane
pub fn platform_origin_offset(volume: &BuildVolume) -> Mat4 {
    let [cx, cy, _] = volume.platform_center();
    Mat4::from_translation(Vec3::new(-cx as f32, -cy as f32, 0.0))
}
