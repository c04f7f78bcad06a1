//! Keyboard shortcut handling

use eframe::egui;

use crate::state::AppState;
use plater_view_lib::viewport::interaction::{Modifiers, PointerEvent, ViewportKey};
use plater_view_lib::viewport::Viewport;

/// Application-level shortcuts
enum Shortcut {
    Step(ViewportKey, Modifiers),
    ToggleProjection,
    ResetCamera,
    RemoveSelected,
}

fn viewport_key(key: egui::Key) -> Option<ViewportKey> {
    use egui::Key;
    match key {
        Key::H | Key::ArrowLeft => Some(ViewportKey::MoveNegX),
        Key::L | Key::ArrowRight => Some(ViewportKey::MovePosX),
        Key::J | Key::ArrowDown => Some(ViewportKey::MoveNegY),
        Key::K | Key::ArrowUp => Some(ViewportKey::MovePosY),
        Key::OpenBracket => Some(ViewportKey::RotateNeg),
        Key::CloseBracket => Some(ViewportKey::RotatePos),
        _ => None,
    }
}

/// Handle keyboard shortcuts for the application
pub fn handle_keyboard(ctx: &egui::Context, state: &mut AppState, viewport: &mut Viewport) {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    // Collected first: handlers may request a repaint, which needs the context unlocked
    let shortcuts: Vec<Shortcut> = ctx.input(|i| {
        i.events
            .iter()
            .filter_map(|event| match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => {
                    if let Some(step) = viewport_key(*key) {
                        let m = Modifiers {
                            shift: modifiers.shift,
                            ctrl: modifiers.ctrl || modifiers.command,
                        };
                        return Some(Shortcut::Step(step, m));
                    }
                    match key {
                        egui::Key::O if !modifiers.command => Some(Shortcut::ToggleProjection),
                        egui::Key::R if !modifiers.command => Some(Shortcut::ResetCamera),
                        egui::Key::Delete => Some(Shortcut::RemoveSelected),
                        _ => None,
                    }
                }
                _ => None,
            })
            .collect()
    });

    for shortcut in shortcuts {
        match shortcut {
            Shortcut::Step(key, modifiers) => {
                viewport.handle_event(
                    PointerEvent::Key { key, modifiers },
                    &mut state.objects,
                    &state.selection,
                );
            }
            Shortcut::ToggleProjection => viewport.toggle_projection(),
            Shortcut::ResetCamera => viewport.reset_camera(),
            Shortcut::RemoveSelected => remove_selected(state, viewport),
        }
    }
}

/// Delete the selected object from the scene
pub fn remove_selected(state: &mut AppState, viewport: &mut Viewport) {
    if let Some(removed) = state.remove_selected() {
        viewport.object_removed(&removed.name);
    }
}
