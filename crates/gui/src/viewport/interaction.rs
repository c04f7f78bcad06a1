//! Mouse / wheel / key handling for the viewport.
//!
//! Every event goes through [`Interaction::handle`], which decides between
//! camera rotation, object move, panning, zoom and keyboard steps. Modifiers
//! are taken from the event itself, never from a frame-level snapshot.

use glam::{Vec2, Vec3};
use shared::BuildVolume;

use super::camera::CameraState;
use super::projector::{Projector, ViewportSize};
use super::trackball;
use crate::error::ViewportError;
use crate::redraw::RedrawSignal;
use crate::state::{InteractionSettings, ObjectRegistry, SelectionProvider, TransformStore};

/// Perspective pan: eye-space units per pixel
pub const PERSPECTIVE_PAN_SCALE: f32 = 0.5;
/// Height reported for double-click plate coordinates
pub const DOUBLE_CLICK_PLATE_Z: f32 = 300.0;

// ── Events ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveButton {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
    };
}

/// Discrete keyboard commands on the selected object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportKey {
    MoveNegX,
    MovePosX,
    MoveNegY,
    MovePosY,
    RotateNeg,
    RotatePos,
}

/// Raw input, in viewport pixels (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed {
        button: PointerButton,
        pos: Vec2,
        modifiers: Modifiers,
    },
    Moved {
        pos: Vec2,
        modifiers: Modifiers,
    },
    Released {
        button: PointerButton,
        pos: Vec2,
    },
    /// `delta` > 0 is one notch away from the user
    Wheel {
        delta: f32,
        pos: Vec2,
        modifiers: Modifiers,
    },
    Key {
        key: ViewportKey,
        modifiers: Modifiers,
    },
    DoubleClick {
        pos: Vec2,
    },
}

// ── State ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    DraggingLeftMove,
    DraggingLeftRotateCamera,
    DraggingRightPan,
}

impl InteractionState {
    fn for_drag(button: ActiveButton, shift: bool) -> Self {
        match (button, shift) {
            (ActiveButton::None, _) => Self::Idle,
            (ActiveButton::Left, true) => Self::DraggingLeftRotateCamera,
            (ActiveButton::Left, false) => Self::DraggingLeftMove,
            (ActiveButton::Right, _) => Self::DraggingRightPan,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DraggingLeftMove => "move",
            Self::DraggingLeftRotateCamera => "rotate",
            Self::DraggingRightPan => "pan",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    /// Drag anchor; `None` means no drag in progress
    pub last_screen_pos: Option<Vec2>,
    /// Last known cursor position, used for the cursor marker
    pub current_screen_pos: Vec2,
    pub active_button: ActiveButton,
    pub modifier_shift: bool,
}

/// What handling an event did
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Unchanged,
    Redraw,
    /// The event matched a rule but could not be applied
    Skipped(ViewportError),
}

impl EventOutcome {
    pub fn needs_redraw(&self) -> bool {
        matches!(self, Self::Redraw)
    }
}

impl From<Result<(), ViewportError>> for EventOutcome {
    fn from(result: Result<(), ViewportError>) -> Self {
        match result {
            Ok(()) => Self::Redraw,
            Err(e) => Self::Skipped(e),
        }
    }
}

/// Everything an event may read or mutate
pub struct EventContext<'a> {
    pub camera: &'a mut CameraState,
    pub volume: &'a BuildVolume,
    pub size: ViewportSize,
    pub objects: &'a mut dyn ObjectRegistry,
    pub selection: &'a dyn SelectionProvider,
    pub redraw: &'a RedrawSignal,
    pub settings: &'a InteractionSettings,
}

impl EventContext<'_> {
    fn projector(&self) -> Result<Projector, ViewportError> {
        Projector::new(self.camera, self.volume, self.size)
    }

    fn store(&mut self) -> TransformStore<'_> {
        TransformStore::new(&mut *self.objects, self.selection, self.redraw)
    }
}

// ── State machine ───────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Interaction {
    state: InteractionState,
    pointer: PointerState,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Forget any drag in progress (e.g. focus lost)
    pub fn cancel(&mut self) {
        self.state = InteractionState::Idle;
        self.pointer.last_screen_pos = None;
        self.pointer.active_button = ActiveButton::None;
    }

    pub fn handle(&mut self, event: PointerEvent, ctx: &mut EventContext<'_>) -> EventOutcome {
        let before = self.state;
        let outcome = match event {
            PointerEvent::Pressed {
                button,
                pos,
                modifiers,
            } => self.on_press(button, pos, modifiers),
            PointerEvent::Moved { pos, modifiers } => self.on_move(pos, modifiers, ctx),
            PointerEvent::Released { pos, .. } => {
                self.pointer.current_screen_pos = pos;
                self.cancel();
                EventOutcome::Unchanged
            }
            PointerEvent::Wheel {
                delta,
                pos,
                modifiers,
            } => self.on_wheel(delta, pos, modifiers, ctx),
            PointerEvent::Key { key, modifiers } => on_key(key, modifiers, ctx),
            PointerEvent::DoubleClick { pos } => on_double_click(pos, ctx),
        };
        if self.state != before {
            tracing::trace!("Interaction {:?} -> {:?}", before, self.state);
        }
        if outcome.needs_redraw() {
            ctx.redraw.request();
        }
        outcome
    }

    fn on_press(&mut self, button: PointerButton, pos: Vec2, modifiers: Modifiers) -> EventOutcome {
        let button = match (self.pointer.active_button, button) {
            // A right press never interrupts a left drag
            (ActiveButton::Left, PointerButton::Right) => return EventOutcome::Unchanged,
            (_, PointerButton::Left) => ActiveButton::Left,
            (_, PointerButton::Right) => ActiveButton::Right,
        };
        self.pointer.active_button = button;
        self.pointer.modifier_shift = modifiers.shift;
        self.pointer.last_screen_pos = Some(pos);
        self.pointer.current_screen_pos = pos;
        self.state = InteractionState::for_drag(button, modifiers.shift);
        EventOutcome::Unchanged
    }

    fn on_move(&mut self, pos: Vec2, modifiers: Modifiers, ctx: &mut EventContext<'_>) -> EventOutcome {
        self.pointer.current_screen_pos = pos;
        self.pointer.modifier_shift = modifiers.shift;
        self.state = InteractionState::for_drag(self.pointer.active_button, modifiers.shift);

        if self.state == InteractionState::Idle {
            // Cursor marker follows the pointer
            return EventOutcome::Redraw;
        }
        let Some(last) = self.pointer.last_screen_pos.replace(pos) else {
            return EventOutcome::Redraw;
        };

        match self.state {
            InteractionState::Idle => EventOutcome::Unchanged,
            InteractionState::DraggingLeftRotateCamera => rotate_camera(last, pos, ctx).into(),
            InteractionState::DraggingLeftMove => move_object(last, pos, ctx).into(),
            InteractionState::DraggingRightPan => pan_camera(last, pos, ctx).into(),
        }
    }

    fn on_wheel(
        &mut self,
        delta: f32,
        pos: Vec2,
        modifiers: Modifiers,
        ctx: &mut EventContext<'_>,
    ) -> EventOutcome {
        self.pointer.current_screen_pos = pos;
        if delta == 0.0 || !delta.is_finite() {
            return EventOutcome::Unchanged;
        }
        if modifiers.shift {
            zoom(delta, pos, ctx).into()
        } else {
            let step = ctx.settings.wheel_rotate_step.copysign(delta);
            ctx.store().try_rotate_selected(step).into()
        }
    }
}

// ── Actions ─────────────────────────────────────────────────

fn rotate_camera(from: Vec2, to: Vec2, ctx: &mut EventContext<'_>) -> Result<(), ViewportError> {
    if ctx.size.is_degenerate() {
        return Err(degenerate(ctx.size));
    }
    let p1 = ctx.size.to_ndc(from);
    let p2 = ctx.size.to_ndc(to);
    let increment = trackball::compute_rotation(p1.x, p1.y, p2.x, p2.y, ctx.settings.trackball_radius);
    ctx.camera.rotate_by(increment);
    Ok(())
}

fn move_object(from: Vec2, to: Vec2, ctx: &mut EventContext<'_>) -> Result<(), ViewportError> {
    let delta = ctx.projector()?.world_delta(from, to);
    ctx.store().try_move_selected(delta.truncate())
}

fn pan_camera(from: Vec2, to: Vec2, ctx: &mut EventContext<'_>) -> Result<(), ViewportError> {
    let projector = ctx.projector()?;
    let delta = if ctx.camera.orthographic {
        let world = projector.world_delta(from, to);
        projector.view().transform_vector3(world).truncate()
    } else {
        let pixels = to - from;
        Vec2::new(pixels.x, -pixels.y) * PERSPECTIVE_PAN_SCALE
    };
    ctx.camera.pan_by(delta);
    Ok(())
}

fn zoom(delta: f32, pos: Vec2, ctx: &mut EventContext<'_>) -> Result<(), ViewportError> {
    if ctx.size.is_degenerate() {
        return Err(degenerate(ctx.size));
    }
    let factor = ctx.settings.zoom_factor;
    let factor = if delta > 0.0 { factor } else { 1.0 / factor };
    let ndc = ctx.size.to_ndc(pos);
    if ctx.camera.zoom_about(ndc, factor, ctx.size) {
        tracing::trace!("Zoom to distance {}", ctx.camera.distance);
    } else {
        tracing::trace!("Zoom step skipped at distance {}", ctx.camera.distance);
    }
    Ok(())
}

fn on_key(key: ViewportKey, modifiers: Modifiers, ctx: &mut EventContext<'_>) -> EventOutcome {
    let s = ctx.settings;
    let (step, turn) = if modifiers.ctrl {
        (s.fine_move_step, s.fine_rotate_step)
    } else {
        (s.move_step, s.rotate_step)
    };
    let mut store = ctx.store();
    let result = match key {
        ViewportKey::MoveNegX => store.try_move_selected(Vec2::new(-step, 0.0)),
        ViewportKey::MovePosX => store.try_move_selected(Vec2::new(step, 0.0)),
        ViewportKey::MoveNegY => store.try_move_selected(Vec2::new(0.0, -step)),
        ViewportKey::MovePosY => store.try_move_selected(Vec2::new(0.0, step)),
        ViewportKey::RotateNeg => store.try_rotate_selected(-turn),
        ViewportKey::RotatePos => store.try_rotate_selected(turn),
    };
    result.into()
}

fn on_double_click(pos: Vec2, ctx: &EventContext<'_>) -> EventOutcome {
    match plate_coordinate(pos, ctx.size, ctx.volume) {
        Some(plate) => {
            tracing::debug!("Plate coordinate {:.1} {:.1} {:.1}", plate.x, plate.y, plate.z);
            EventOutcome::Unchanged
        }
        None => EventOutcome::Skipped(degenerate(ctx.size)),
    }
}

/// Linear pixel → build plate mapping (y flipped), ignoring the camera
pub fn plate_coordinate(pos: Vec2, size: ViewportSize, volume: &BuildVolume) -> Option<Vec3> {
    if size.is_degenerate() {
        return None;
    }
    let [ox, oy, _] = volume.origin_offset;
    Some(Vec3::new(
        pos.x / size.width * volume.width as f32 + ox as f32,
        (1.0 - pos.y / size.height) * volume.depth as f32 + oy as f32,
        DOUBLE_CLICK_PLATE_Z,
    ))
}

fn degenerate(size: ViewportSize) -> ViewportError {
    ViewportError::DegenerateViewport {
        width: size.width,
        height: size.height,
    }
}
