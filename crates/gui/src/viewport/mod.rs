//! Viewport core: camera, input handling, drop animation and frame composition.
//!
//! Owned and driven by the UI thread. The host feeds it input events and the
//! frame clock, and replays the composed frames on its GPU backend.

pub mod animation;
pub mod camera;
pub mod composer;
pub mod interaction;
pub mod mesh;
pub mod projector;
pub mod trackball;

use std::time::Duration;

use shared::BuildVolume;

use crate::error::ViewportError;
use crate::redraw::RedrawSignal;
use crate::state::{AppSettings, InteractionSettings, ObjectRegistry, SelectionProvider};
use animation::DropAnimator;
use camera::CameraState;
use composer::{DrawTarget, FrameInput, SceneComposer};
use interaction::{EventContext, EventOutcome, Interaction, InteractionState, PointerEvent, PointerState};
use projector::{Projector, ViewportSize};

pub struct Viewport {
    camera: CameraState,
    volume: BuildVolume,
    size: ViewportSize,
    interaction: Interaction,
    animator: DropAnimator,
    composer: SceneComposer,
    redraw: RedrawSignal,
    settings: InteractionSettings,
    drop_animation: bool,
    /// Pointer is over the viewport; the cursor marker is drawn only then
    hovered: bool,
}

impl Viewport {
    pub fn new(volume: BuildVolume, settings: &AppSettings, redraw: RedrawSignal) -> Self {
        let mut camera = CameraState::for_volume(&volume);
        camera.orthographic = settings.viewport.orthographic;
        Self {
            camera,
            volume,
            size: ViewportSize::default(),
            interaction: Interaction::new(),
            animator: DropAnimator::new(),
            composer: SceneComposer::new(&settings.viewport),
            redraw,
            settings: settings.interaction.clone(),
            drop_animation: settings.viewport.drop_animation,
            hovered: false,
        }
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn volume(&self) -> &BuildVolume {
        &self.volume
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn state(&self) -> InteractionState {
        self.interaction.state()
    }

    pub fn pointer(&self) -> &PointerState {
        self.interaction.pointer()
    }

    pub fn redraw_signal(&self) -> &RedrawSignal {
        &self.redraw
    }

    pub fn composer(&self) -> &SceneComposer {
        &self.composer
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_active()
    }

    pub fn is_drop_animation_enabled(&self) -> bool {
        self.drop_animation
    }

    pub fn set_drop_animation(&mut self, enabled: bool) {
        self.drop_animation = enabled;
    }

    /// Projector for the current camera, if the viewport has an area
    pub fn projector(&self) -> Result<Projector, ViewportError> {
        Projector::new(&self.camera, &self.volume, self.size)
    }

    // ── Host hooks ──────────────────────────────────────────

    pub fn resize(&mut self, size: ViewportSize) {
        if size != self.size {
            if size.is_degenerate() {
                tracing::warn!("Viewport has no area ({}x{})", size.width, size.height);
            }
            self.size = size;
            self.redraw.request();
        }
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        if hovered != self.hovered {
            self.hovered = hovered;
            self.redraw.request();
        }
    }

    pub fn handle_event(
        &mut self,
        event: PointerEvent,
        objects: &mut dyn ObjectRegistry,
        selection: &dyn SelectionProvider,
    ) -> EventOutcome {
        let mut ctx = EventContext {
            camera: &mut self.camera,
            volume: &self.volume,
            size: self.size,
            objects,
            selection,
            redraw: &self.redraw,
            settings: &self.settings,
        };
        self.interaction.handle(event, &mut ctx)
    }

    /// Called by the host after it inserted `name` into the registry
    pub fn object_placed(&mut self, name: &str, objects: &mut dyn ObjectRegistry) -> Result<(), ViewportError> {
        if !objects.contains(name) {
            return Err(ViewportError::UnknownObject(name.to_string()));
        }
        if self.drop_animation {
            self.animator.start(name, objects)?;
        }
        self.redraw.request();
        Ok(())
    }

    /// Called by the host after it removed `name` from the registry
    pub fn object_removed(&mut self, name: &str) {
        self.animator.forget(name);
        self.redraw.request();
    }

    /// Advance time-driven state by one frame's elapsed time
    pub fn advance(&mut self, elapsed: Duration, objects: &mut dyn ObjectRegistry) -> bool {
        let changed = self.animator.advance(elapsed, objects);
        if changed {
            self.redraw.request();
        }
        changed
    }

    pub fn compose(
        &mut self,
        objects: &dyn ObjectRegistry,
        selection: &dyn SelectionProvider,
        target: &mut dyn DrawTarget,
    ) {
        let cursor = self.hovered.then_some(self.interaction.pointer().current_screen_pos);
        let frame = FrameInput {
            camera: &self.camera,
            volume: &self.volume,
            size: self.size,
            cursor,
        };
        self.composer.compose(frame, objects, selection, target);
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
        self.redraw.request();
    }

    pub fn toggle_projection(&mut self) {
        self.camera.toggle_projection();
        tracing::info!(
            "Projection: {}",
            if self.camera.orthographic { "orthographic" } else { "perspective" }
        );
        self.redraw.request();
    }

    /// Viewport is closing: settle animations and drop any drag
    pub fn close(&mut self, objects: &mut dyn ObjectRegistry) {
        self.animator.cancel_all(objects);
        self.interaction.cancel();
    }

    /// One-line summary for the status overlay
    pub fn status_line(&self) -> String {
        format!(
            "{} | distance {:.1} | {}",
            if self.camera.orthographic { "ortho" } else { "persp" },
            self.camera.distance,
            self.interaction.state().label()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::{Vec2, Vec3};

    use super::*;
    use crate::state::{SceneObject, SceneObjects, SelectionState};
    use composer::FrameRecorder;
    use interaction::{Modifiers, PointerButton};
    use mesh::MeshData;

    fn viewport() -> Viewport {
        let mut viewport = Viewport::new(BuildVolume::default(), &AppSettings::default(), RedrawSignal::new());
        viewport.resize(ViewportSize::new(800.0, 600.0));
        viewport.redraw_signal().take();
        viewport
    }

    fn objects() -> SceneObjects {
        let mut objects = SceneObjects::new();
        objects
            .insert(SceneObject::new("part", Arc::new(MeshData { vertices: vec![], indices: vec![] })))
            .unwrap();
        objects
    }

    #[test]
    fn test_placement_starts_drop() {
        let mut vp = viewport();
        let mut objects = objects();
        vp.object_placed("part", &mut objects).unwrap();
        assert!(vp.is_animating());
        assert_eq!(objects.get("part").unwrap().position.z, 300.0);
        assert!(vp.redraw_signal().take());

        while vp.advance(Duration::from_millis(16), &mut objects) || vp.is_animating() {}
        assert_eq!(objects.get("part").unwrap().position.z, 0.0);
    }

    #[test]
    fn test_placement_without_animation() {
        let mut vp = viewport();
        vp.set_drop_animation(false);
        let mut objects = objects();
        vp.object_placed("part", &mut objects).unwrap();
        assert!(!vp.is_animating());
        assert_eq!(objects.get("part").unwrap().position, Vec3::ZERO);
        assert!(vp.object_placed("nope", &mut objects).is_err());
    }

    #[test]
    fn test_close_settles_and_cancels_drag() {
        let mut vp = viewport();
        let mut objects = objects();
        vp.object_placed("part", &mut objects).unwrap();
        vp.handle_event(
            PointerEvent::Pressed {
                button: PointerButton::Left,
                pos: Vec2::ZERO,
                modifiers: Modifiers::NONE,
            },
            &mut objects,
            &SelectionState::default(),
        );
        vp.close(&mut objects);
        assert!(!vp.is_animating());
        assert_eq!(vp.state(), InteractionState::Idle);
        assert_eq!(objects.get("part").unwrap().position.z, 0.0);
    }

    #[test]
    fn test_cursor_marker_only_when_hovered() {
        let mut vp = viewport();
        let objects = objects();
        let selection = SelectionState::default();

        let mut recorder = FrameRecorder::default();
        vp.compose(&objects, &selection, &mut recorder);
        assert_eq!(recorder.finish().commands.len(), 2);

        vp.set_hovered(true);
        let mut recorder = FrameRecorder::default();
        vp.compose(&objects, &selection, &mut recorder);
        assert_eq!(recorder.finish().commands.len(), 3);
    }

    #[test]
    fn test_status_line() {
        let mut vp = viewport();
        assert_eq!(vp.status_line(), "persp | distance 200.0 | idle");
        vp.toggle_projection();
        assert!(vp.status_line().starts_with("ortho"));
    }
}
