use egui::Ui;

use crate::state::{AppState, ObjectRegistry, SelectionProvider};
use plater_view_lib::viewport::Viewport;
use plater_view_lib::ViewportError;

pub fn show(ui: &mut Ui, state: &AppState, viewport: &Viewport, backend_error: Option<&ViewportError>) {
    ui.horizontal(|ui| {
        ui.weak(format!("Objects: {}", state.objects.len()));

        ui.separator();

        match state.selection.selected_name().and_then(|name| state.objects.get(name)) {
            Some(object) => {
                let p = object.position;
                ui.label(format!(
                    "{}  X {:.1}  Y {:.1}  Z {:.1}  rot {:.0}°",
                    object.name, p.x, p.y, p.z, object.rotation_z
                ));
            }
            None => {
                ui.weak("Nothing selected");
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if let Some(e) = backend_error {
                ui.colored_label(egui::Color32::from_rgb(230, 90, 80), e.to_string());
            } else if viewport.is_animating() {
                ui.weak("dropping…");
            }
            let v = viewport.volume();
            ui.weak(format!("{}×{}×{}", v.width, v.depth, v.height));
        });
    });
}
