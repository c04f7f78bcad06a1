//! 3D viewport panel: egui input translation and OpenGL painting

mod gl_renderer;

use std::sync::{Arc, Mutex};

use egui::Ui;
use glam::Vec2;

use crate::state::AppState;
use gl_renderer::GlRenderer;
use plater_view_lib::viewport::composer::FrameRecorder;
use plater_view_lib::viewport::interaction::{ActiveButton, Modifiers, PointerButton, PointerEvent};
use plater_view_lib::viewport::projector::ViewportSize;
use plater_view_lib::state::ObjectRegistry;
use plater_view_lib::viewport::Viewport;
use plater_view_lib::ViewportError;

/// Hosts the [`Viewport`] inside an egui central panel
pub struct ViewportPanel {
    gl_renderer: Option<Arc<Mutex<GlRenderer>>>,
    /// Last error reported by the GPU backend
    backend_error: Option<ViewportError>,
}

impl ViewportPanel {
    pub fn new(gl: Option<&glow::Context>) -> Self {
        let mut panel = Self {
            gl_renderer: None,
            backend_error: None,
        };
        match gl.map(GlRenderer::new) {
            Some(Ok(renderer)) => panel.gl_renderer = Some(Arc::new(Mutex::new(renderer))),
            Some(Err(e)) => {
                tracing::error!("Cannot initialize GL renderer: {e}");
                panel.backend_error = Some(e);
            }
            None => {
                tracing::error!("No glow context; the viewport will stay empty");
                panel.backend_error = Some(ViewportError::Backend("no OpenGL context".into()));
            }
        }
        panel
    }

    pub fn backend_error(&self) -> Option<&ViewportError> {
        self.backend_error.as_ref()
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        if let Some(renderer) = self.gl_renderer.take() {
            if let Ok(mut r) = renderer.lock() {
                r.destroy(gl);
            }
        }
    }

    pub fn show(&mut self, ui: &mut Ui, viewport: &mut Viewport, state: &mut AppState) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        viewport.resize(ViewportSize::new(rect.width(), rect.height()));
        viewport.set_hovered(response.hovered());

        // ── Input ─────────────────────────────
        for event in translate_events(ui, rect, viewport, response.hovered()) {
            viewport.handle_event(event, &mut state.objects, &state.selection);
        }
        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let pos = Vec2::new(pos.x - rect.min.x, pos.y - rect.min.y);
                viewport.handle_event(PointerEvent::DoubleClick { pos }, &mut state.objects, &state.selection);
            }
        }

        if !ui.is_rect_visible(rect) {
            return;
        }

        // ── GL rendering ──────────────────────
        self.poll_backend_error();
        let highlight = plater_view_lib::state::settings::rgb(state.settings.viewport.selection_color);
        let mut recorder = FrameRecorder::new(highlight);
        viewport.compose(&state.objects, &state.selection, &mut recorder);
        self.render_gl(ui, rect, recorder);

        // ── Overlays ──────────────────────────
        self.draw_overlays(ui, rect, viewport, state);
    }

    fn poll_backend_error(&mut self) {
        let Some(renderer) = &self.gl_renderer else {
            return;
        };
        if let Ok(mut r) = renderer.lock() {
            if let Some(e) = r.take_error() {
                self.backend_error = Some(e);
            }
        }
    }

    fn render_gl(&self, ui: &mut Ui, rect: egui::Rect, recorder: FrameRecorder) {
        let Some(gl_renderer) = &self.gl_renderer else {
            return;
        };
        let renderer = gl_renderer.clone();
        let frame = recorder.finish();

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(eframe::egui_glow::CallbackFn::new(move |info, painter| {
                let gl = painter.gl();
                let clip = info.viewport_in_pixels();
                let viewport = [
                    clip.left_px as f32,
                    clip.from_bottom_px as f32,
                    clip.width_px as f32,
                    clip.height_px as f32,
                ];
                if let Ok(mut r) = renderer.lock() {
                    r.paint(gl, &frame, viewport);
                }
            })),
        };
        ui.painter().add(callback);
    }

    fn draw_overlays(&self, ui: &mut Ui, rect: egui::Rect, viewport: &Viewport, state: &AppState) {
        let painter = ui.painter_at(rect);
        let font = egui::FontId::monospace(11.0);

        painter.text(
            rect.left_top() + egui::vec2(8.0, 6.0),
            egui::Align2::LEFT_TOP,
            viewport.status_line(),
            font.clone(),
            egui::Color32::from_rgb(170, 170, 180),
        );

        if let Some(e) = &self.backend_error {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                format!("Rendering unavailable: {e}"),
                font,
                egui::Color32::from_rgb(230, 90, 80),
            );
        } else if state.objects.is_empty() {
            painter.text(
                egui::pos2(rect.center().x, rect.bottom() - 20.0),
                egui::Align2::CENTER_BOTTOM,
                "Drag: move selected · Shift+drag: orbit · Right drag: pan · Wheel: rotate · Shift+wheel: zoom",
                egui::FontId::proportional(11.0),
                egui::Color32::from_rgb(100, 100, 110),
            );
        }
    }
}

// ── egui → viewport events ───────────────────────────────────

fn modifiers(m: egui::Modifiers) -> Modifiers {
    Modifiers {
        shift: m.shift,
        ctrl: m.ctrl || m.command,
    }
}

/// Pull this frame's raw pointer events that concern the viewport.
/// Positions become viewport-local pixels.
fn translate_events(ui: &Ui, rect: egui::Rect, viewport: &Viewport, hovered: bool) -> Vec<PointerEvent> {
    let local = |p: egui::Pos2| Vec2::new(p.x - rect.min.x, p.y - rect.min.y);
    let dragging = viewport.pointer().active_button != ActiveButton::None;

    ui.input(|i| {
        let mut out = Vec::new();
        // Tracked locally so presses started here keep their drag
        let mut dragging = dragging;
        for event in &i.events {
            match event {
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    modifiers: m,
                } => {
                    let button = match button {
                        egui::PointerButton::Primary => PointerButton::Left,
                        egui::PointerButton::Secondary => PointerButton::Right,
                        _ => continue,
                    };
                    if *pressed {
                        if rect.contains(*pos) {
                            dragging = true;
                            out.push(PointerEvent::Pressed {
                                button,
                                pos: local(*pos),
                                modifiers: modifiers(*m),
                            });
                        }
                    } else {
                        dragging = false;
                        out.push(PointerEvent::Released {
                            button,
                            pos: local(*pos),
                        });
                    }
                }
                egui::Event::PointerMoved(pos) => {
                    if dragging || rect.contains(*pos) {
                        out.push(PointerEvent::Moved {
                            pos: local(*pos),
                            modifiers: modifiers(i.modifiers),
                        });
                    }
                }
                egui::Event::MouseWheel {
                    delta,
                    modifiers: m,
                    ..
                } if hovered => {
                    // Some platforms turn shift+wheel into a horizontal scroll
                    let notch = if delta.y != 0.0 { delta.y } else { delta.x };
                    if notch == 0.0 {
                        continue;
                    }
                    if let Some(pos) = i.pointer.hover_pos() {
                        out.push(PointerEvent::Wheel {
                            delta: notch.signum(),
                            pos: local(pos),
                            modifiers: modifiers(*m),
                        });
                    }
                }
                _ => {}
            }
        }
        out
    })
}
