//! Headless test harness for driving the viewport without a window.
//!
//! Owns the application state and a [`Viewport`] sized like a small window,
//! and exposes the gestures a user would perform.

use std::time::Duration;

use glam::Vec2;
use shared::{BuildVolume, ObjectName, ObjectSpec, SceneDescription};

use crate::error::ViewportError;
use crate::redraw::RedrawSignal;
use crate::state::{AppSettings, AppState, ObjectRegistry, SceneObject};
use crate::viewport::camera::CameraState;
use crate::viewport::composer::{FrameRecorder, RecordedFrame};
use crate::viewport::interaction::{EventOutcome, Modifiers, PointerButton, PointerEvent, ViewportKey};
use crate::viewport::projector::ViewportSize;
use crate::viewport::Viewport;

pub const DEFAULT_WIDTH: f32 = 800.0;
pub const DEFAULT_HEIGHT: f32 = 600.0;

/// Headless viewport plus the state the host would own
pub struct ViewportHarness {
    pub state: AppState,
    pub viewport: Viewport,
}

impl Default for ViewportHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportHarness {
    /// Default build volume and settings, 800x600 viewport.
    pub fn new() -> Self {
        Self::with_settings(AppSettings::default())
    }

    pub fn with_volume(volume: BuildVolume) -> Self {
        Self::with_settings(AppSettings {
            build_volume: volume,
            ..Default::default()
        })
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        let mut viewport = Viewport::new(settings.build_volume, &settings, RedrawSignal::new());
        viewport.resize(ViewportSize::new(DEFAULT_WIDTH, DEFAULT_HEIGHT));
        viewport.redraw_signal().take();
        Self {
            state: AppState::new(settings),
            viewport,
        }
    }

    /// Harness for a scene file; its build volume wins over the settings.
    pub fn from_scene(scene: &SceneDescription) -> Result<Self, ViewportError> {
        let mut h = match &scene.build_volume {
            Some(volume) => Self::with_volume(*volume),
            None => Self::new(),
        };
        for spec in &scene.objects {
            h.add(spec)?;
        }
        Ok(h)
    }

    // ── Scene manipulation ────────────────────────────────────

    /// Add an object the way the app does: unique name, selected, dropped
    pub fn add(&mut self, spec: &ObjectSpec) -> Result<ObjectName, ViewportError> {
        let name = self.state.add_object(spec)?;
        self.viewport.object_placed(&name, &mut self.state.objects)?;
        Ok(name)
    }

    pub fn select(&mut self, name: &str) {
        self.state.selection.select(name);
    }

    pub fn clear_selection(&mut self) {
        self.state.selection.clear();
    }

    pub fn remove_selected(&mut self) -> Option<ObjectName> {
        let removed = self.state.remove_selected()?;
        self.viewport.object_removed(&removed.name);
        Some(removed.name)
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.state.objects.get(name)
    }

    pub fn object_count(&self) -> usize {
        self.state.objects.len()
    }

    pub fn camera(&self) -> &CameraState {
        self.viewport.camera()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport.resize(ViewportSize::new(width, height));
    }

    // ── Input ─────────────────────────────────────────────────

    pub fn send(&mut self, event: PointerEvent) -> EventOutcome {
        self.viewport
            .handle_event(event, &mut self.state.objects, &self.state.selection)
    }

    pub fn press(&mut self, button: PointerButton, at: Vec2, modifiers: Modifiers) -> EventOutcome {
        self.send(PointerEvent::Pressed {
            button,
            pos: at,
            modifiers,
        })
    }

    pub fn move_to(&mut self, at: Vec2, modifiers: Modifiers) -> EventOutcome {
        self.send(PointerEvent::Moved { pos: at, modifiers })
    }

    pub fn release(&mut self, button: PointerButton, at: Vec2) -> EventOutcome {
        self.send(PointerEvent::Released { button, pos: at })
    }

    /// Press at `from`, move to `to`, release. Returns the outcome of the move.
    pub fn drag(&mut self, button: PointerButton, from: Vec2, to: Vec2, modifiers: Modifiers) -> EventOutcome {
        self.press(button, from, modifiers);
        let outcome = self.move_to(to, modifiers);
        self.release(button, to);
        outcome
    }

    pub fn wheel(&mut self, delta: f32, at: Vec2, modifiers: Modifiers) -> EventOutcome {
        self.send(PointerEvent::Wheel {
            delta,
            pos: at,
            modifiers,
        })
    }

    pub fn key(&mut self, key: ViewportKey, modifiers: Modifiers) -> EventOutcome {
        self.send(PointerEvent::Key { key, modifiers })
    }

    // ── Frames ────────────────────────────────────────────────

    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.viewport.advance(elapsed, &mut self.state.objects)
    }

    /// Step 16 ms frames until no animation is left. Returns the frame count.
    pub fn run_animations(&mut self) -> usize {
        let mut frames = 0;
        while self.viewport.is_animating() {
            self.advance(Duration::from_millis(16));
            frames += 1;
        }
        frames
    }

    /// Compose one frame into a recording
    pub fn frame(&mut self) -> RecordedFrame {
        let highlight = crate::state::settings::rgb(self.state.settings.viewport.selection_color);
        let mut recorder = FrameRecorder::new(highlight);
        self.viewport
            .compose(&self.state.objects, &self.state.selection, &mut recorder);
        recorder.finish()
    }

    pub fn take_redraw(&self) -> bool {
        self.viewport.redraw_signal().take()
    }

    pub fn close(&mut self) {
        self.viewport.close(&mut self.state.objects);
    }
}
