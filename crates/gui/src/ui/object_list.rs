//! Object list panel: one row per object, click to select

use egui::Ui;

use crate::state::{AppState, SelectionProvider};

pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.heading("Objects");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(format!("({})", state.objects.iter().count()));
        });
    });
    ui.separator();

    let names = state.objects.names();
    if names.is_empty() {
        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            ui.weak("No objects");
            ui.weak("Use Add to place one");
        });
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt("object_list_scroll")
        .show(ui, |ui| {
            for name in names {
                let selected = state.selection.selected_name() == Some(name.as_str());
                if ui.selectable_label(selected, &name).clicked() {
                    if selected {
                        state.selection.clear();
                    } else {
                        state.selection.select(name);
                    }
                }
            }
        });
}
