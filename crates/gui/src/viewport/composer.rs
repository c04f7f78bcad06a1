//! Per-frame scene composition.
//!
//! The composer walks the scene and emits draw commands into a
//! [`DrawTarget`]. It never touches the GPU itself: the GL renderer replays a
//! [`RecordedFrame`] inside the egui paint callback, and tests inspect the
//! same recording.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};
use shared::{BuildVolume, ObjectName};

use super::camera::{platform_origin_offset, CameraState};
use super::mesh::{self, LineMeshData, MeshData};
use super::projector::{Projector, ViewportSize};
use crate::error::ViewportError;
use crate::state::settings::rgb;
use crate::state::{ObjectRegistry, SelectionProvider, ViewportSettings};

/// Window depth of the cursor marker plane (close to the camera)
pub const CURSOR_MARKER_DEPTH: f32 = 0.9;

// ── Matrix stack ────────────────────────────────────────────

/// Push/pop transform stack, like the fixed-function GL one
#[derive(Debug, Clone)]
pub struct MatrixStack {
    current: Mat4,
    saved: Vec<Mat4>,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self {
            current: Mat4::IDENTITY,
            saved: Vec::new(),
        }
    }
}

impl MatrixStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Mat4 {
        self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restore the last pushed transform. An unmatched pop resets to identity.
    pub fn pop(&mut self) {
        match self.saved.pop() {
            Some(m) => self.current = m,
            None => {
                tracing::error!("Matrix stack underflow");
                self.current = Mat4::IDENTITY;
            }
        }
    }

    /// Post-multiply: `current = current * m`
    pub fn mul(&mut self, m: Mat4) {
        self.current *= m;
    }

    pub fn translate(&mut self, v: Vec3) {
        self.mul(Mat4::from_translation(v));
    }

    /// Run `f` between a push and its pop
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.push();
        let r = f(self);
        self.pop();
        r
    }
}

// ── Draw target ─────────────────────────────────────────────

/// What a draw call renders
#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    Platform,
    CursorMarker,
    Object { name: ObjectName, selected: bool },
}

#[derive(Debug, Clone)]
pub enum Geometry {
    Lines(Arc<LineMeshData>),
    Triangles(Arc<MeshData>),
}

#[derive(Debug, Clone)]
pub struct DrawCommand {
    pub item: DrawItem,
    pub model_view: Mat4,
    pub geometry: Geometry,
}

/// Sink for one frame of draw calls
pub trait DrawTarget {
    fn clear(&mut self, background: [f32; 3], projection: Mat4);
    fn submit(&mut self, command: DrawCommand);
}

/// A composed frame, ready to be replayed by a renderer
#[derive(Debug, Clone, Default)]
pub struct RecordedFrame {
    pub background: [f32; 3],
    pub projection: Mat4,
    /// Tint applied to the selected object
    pub highlight: [f32; 3],
    pub commands: Vec<DrawCommand>,
}

impl RecordedFrame {
    pub fn items(&self) -> Vec<&DrawItem> {
        self.commands.iter().map(|c| &c.item).collect()
    }

    pub fn object_command(&self, name: &str) -> Option<&DrawCommand> {
        self.commands
            .iter()
            .find(|c| matches!(&c.item, DrawItem::Object { name: n, .. } if n == name))
    }
}

/// [`DrawTarget`] that records into a [`RecordedFrame`]
#[derive(Debug, Default)]
pub struct FrameRecorder {
    frame: RecordedFrame,
    clears: usize,
}

impl FrameRecorder {
    pub fn new(highlight: [f32; 3]) -> Self {
        Self {
            frame: RecordedFrame {
                highlight,
                ..Default::default()
            },
            clears: 0,
        }
    }

    pub fn clears(&self) -> usize {
        self.clears
    }

    pub fn finish(self) -> RecordedFrame {
        self.frame
    }
}

impl DrawTarget for FrameRecorder {
    fn clear(&mut self, background: [f32; 3], projection: Mat4) {
        self.clears += 1;
        self.frame.background = background;
        self.frame.projection = projection;
        self.frame.commands.clear();
    }

    fn submit(&mut self, command: DrawCommand) {
        self.frame.commands.push(command);
    }
}

// ── Composer ────────────────────────────────────────────────

/// Meshes the composer owns for the whole viewport lifetime
#[derive(Debug, Clone)]
pub struct RenderResources {
    pub platform: Arc<LineMeshData>,
    pub marker: Arc<MeshData>,
}

/// Camera and viewport inputs of one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub camera: &'a CameraState,
    pub volume: &'a BuildVolume,
    pub size: ViewportSize,
    /// Cursor position in pixels, if the pointer is over the viewport
    pub cursor: Option<Vec2>,
}

pub struct SceneComposer {
    resources: Option<RenderResources>,
    initializations: usize,
    background: [f32; 3],
    platform_color: [f32; 4],
    marker_color: [f32; 3],
    stack: MatrixStack,
}

impl SceneComposer {
    pub fn new(settings: &ViewportSettings) -> Self {
        let [r, g, b] = rgb(settings.platform_color);
        Self {
            resources: None,
            initializations: 0,
            background: rgb(settings.background_color),
            platform_color: [r, g, b, 1.0],
            marker_color: rgb(settings.selection_color),
            stack: MatrixStack::new(),
        }
    }

    pub fn resources(&self) -> Result<&RenderResources, ViewportError> {
        self.resources
            .as_ref()
            .ok_or(ViewportError::UninitializedRenderResources)
    }

    pub fn initializations(&self) -> usize {
        self.initializations
    }

    fn ensure_resources(&mut self, volume: &BuildVolume) -> RenderResources {
        if let Ok(resources) = self.resources() {
            return resources.clone();
        }
        let resources = RenderResources {
            platform: Arc::new(mesh::platform(volume, self.platform_color)),
            marker: Arc::new(mesh::cursor_marker(self.marker_color)),
        };
        self.initializations += 1;
        tracing::debug!(
            "Render resources ready ({} platform segments)",
            resources.platform.segment_count()
        );
        self.resources = Some(resources.clone());
        resources
    }

    /// Compose one frame: platform, cursor marker, then every object
    pub fn compose(
        &mut self,
        frame: FrameInput<'_>,
        objects: &dyn ObjectRegistry,
        selection: &dyn SelectionProvider,
        target: &mut dyn DrawTarget,
    ) {
        let resources = self.ensure_resources(frame.volume);

        let projector = match Projector::new(frame.camera, frame.volume, frame.size) {
            Ok(projector) => projector,
            Err(e) => {
                tracing::trace!("Frame skipped: {e}");
                target.clear(self.background, Mat4::IDENTITY);
                return;
            }
        };
        target.clear(self.background, projector.projection());

        let stack = &mut self.stack;
        stack.push();
        stack.mul(frame.camera.view_matrix());
        stack.mul(platform_origin_offset(frame.volume));

        target.submit(DrawCommand {
            item: DrawItem::Platform,
            model_view: stack.current(),
            geometry: Geometry::Lines(resources.platform.clone()),
        });

        if let Some(cursor) = frame.cursor {
            let at = projector.unproject(cursor.x, cursor.y, CURSOR_MARKER_DEPTH);
            stack.scoped(|s| {
                s.translate(at);
                target.submit(DrawCommand {
                    item: DrawItem::CursorMarker,
                    model_view: s.current(),
                    geometry: Geometry::Triangles(resources.marker.clone()),
                });
            });
        }

        let selected = selection.selected_name();
        objects.for_each(&mut |object| {
            stack.scoped(|s| {
                s.mul(object.local_transform());
                target.submit(DrawCommand {
                    item: DrawItem::Object {
                        name: object.name.clone(),
                        selected: selected == Some(object.name.as_str()),
                    },
                    model_view: s.current(),
                    geometry: Geometry::Triangles(object.mesh.clone()),
                });
            });
        });

        stack.pop();
        if stack.depth() != 0 {
            tracing::error!("Unbalanced matrix stack after frame (depth {})", stack.depth());
            *stack = MatrixStack::new();
        }
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4Swizzles;

    use super::*;
    use crate::state::{SceneObject, SceneObjects, SelectionState};

    fn scene() -> SceneObjects {
        let mut objects = SceneObjects::new();
        let mesh = Arc::new(mesh::cursor_marker([1.0, 0.0, 0.0]));
        objects
            .insert(SceneObject::new("a", mesh.clone()).with_position(Vec3::new(10.0, 20.0, 0.0)))
            .unwrap();
        objects.insert(SceneObject::new("b", mesh)).unwrap();
        objects
    }

    fn compose(
        composer: &mut SceneComposer,
        size: ViewportSize,
        cursor: Option<Vec2>,
        selection: &SelectionState,
    ) -> RecordedFrame {
        let volume = BuildVolume::default();
        let camera = CameraState::for_volume(&volume);
        let mut recorder = FrameRecorder::new([0.0, 1.0, 1.0]);
        composer.compose(
            FrameInput {
                camera: &camera,
                volume: &volume,
                size,
                cursor,
            },
            &scene(),
            selection,
            &mut recorder,
        );
        recorder.finish()
    }

    #[test]
    fn test_draw_order() {
        let mut composer = SceneComposer::new(&ViewportSettings::default());
        let mut selection = SelectionState::default();
        selection.select("b");
        let frame = compose(
            &mut composer,
            ViewportSize::new(640.0, 480.0),
            Some(Vec2::new(320.0, 240.0)),
            &selection,
        );
        assert_eq!(
            frame.items(),
            vec![
                &DrawItem::Platform,
                &DrawItem::CursorMarker,
                &DrawItem::Object { name: "a".into(), selected: false },
                &DrawItem::Object { name: "b".into(), selected: true },
            ]
        );
        assert_eq!(composer.stack_depth(), 0);
    }

    #[test]
    fn test_resources_initialized_once() {
        let mut composer = SceneComposer::new(&ViewportSettings::default());
        assert_eq!(
            composer.resources().unwrap_err(),
            ViewportError::UninitializedRenderResources
        );
        let selection = SelectionState::default();
        compose(&mut composer, ViewportSize::new(640.0, 480.0), None, &selection);
        compose(&mut composer, ViewportSize::new(640.0, 480.0), None, &selection);
        assert!(composer.resources().is_ok());
        assert_eq!(composer.initializations(), 1);
    }

    #[test]
    fn test_object_transform_composes_camera_and_local() {
        let mut composer = SceneComposer::new(&ViewportSettings::default());
        let frame = compose(&mut composer, ViewportSize::new(640.0, 480.0), None, &SelectionState::default());
        let volume = BuildVolume::default();
        let camera = CameraState::for_volume(&volume);
        let expected = camera.scene_view_matrix(&volume) * Mat4::from_translation(Vec3::new(10.0, 20.0, 0.0));
        let command = frame.object_command("a").unwrap();
        assert!(command.model_view.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn test_marker_sits_under_cursor() {
        let mut composer = SceneComposer::new(&ViewportSettings::default());
        let size = ViewportSize::new(640.0, 480.0);
        let cursor = Vec2::new(100.0, 400.0);
        let frame = compose(&mut composer, size, Some(cursor), &SelectionState::default());
        let marker = &frame.commands[1];
        assert_eq!(marker.item, DrawItem::CursorMarker);

        let clip = frame.projection * marker.model_view * Vec3::ZERO.extend(1.0);
        let ndc = clip.xyz() / clip.w;
        let screen = size.to_screen(ndc.truncate());
        assert!(screen.abs_diff_eq(cursor, 0.05));
        assert!(((ndc.z + 1.0) * 0.5 - CURSOR_MARKER_DEPTH).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_viewport_only_clears() {
        let mut composer = SceneComposer::new(&ViewportSettings::default());
        let frame = compose(
            &mut composer,
            ViewportSize::new(0.0, 0.0),
            Some(Vec2::ZERO),
            &SelectionState::default(),
        );
        assert!(frame.commands.is_empty());
        assert_eq!(composer.initializations(), 1);
        assert_eq!(composer.stack_depth(), 0);
    }

    #[test]
    fn test_matrix_stack() {
        let mut stack = MatrixStack::new();
        stack.translate(Vec3::X);
        stack.scoped(|s| {
            s.translate(Vec3::Y);
            assert_eq!(s.depth(), 1);
            assert!(s.current().transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
        });
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.current().transform_point3(Vec3::ZERO), Vec3::X);

        stack.pop();
        assert_eq!(stack.current(), Mat4::IDENTITY);
    }
}
