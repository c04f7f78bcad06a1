//! Application menu bar

use eframe::egui;
use shared::{ObjectSpec, Primitive};

use crate::state::{AppState, SelectionProvider};
use plater_view_lib::viewport::Viewport;

/// Show the file menu
pub fn file_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("File", |ui| {
        if ui.button("Save settings").clicked() {
            state.settings.save();
            ui.close_menu();
        }
        ui.separator();
        if ui.button("Quit").clicked() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            ui.close_menu();
        }
    });
}

/// Procedural stand-ins for loaded meshes
fn primitive_presets() -> [(&'static str, Primitive); 4] {
    [
        ("cube", Primitive::Cube { width: 20.0, depth: 20.0, height: 20.0 }),
        ("cylinder", Primitive::Cylinder { radius: 10.0, height: 25.0 }),
        ("sphere", Primitive::Sphere { radius: 12.0 }),
        ("cone", Primitive::Cone { radius: 10.0, height: 20.0 }),
    ]
}

/// Show the add menu; new objects land in the middle of the platform
pub fn add_menu(ui: &mut egui::Ui, state: &mut AppState, viewport: &mut Viewport) {
    ui.menu_button("Add", |ui| {
        for (name, primitive) in primitive_presets() {
            if ui.button(primitive.label()).clicked() {
                let spec = ObjectSpec::new(name, primitive).at(viewport.volume().platform_center());
                place(state, viewport, &spec);
                ui.close_menu();
            }
        }
    });
}

/// Insert, select and drop a new object
pub fn place(state: &mut AppState, viewport: &mut Viewport, spec: &ObjectSpec) {
    let placed = state
        .add_object(spec)
        .and_then(|name| viewport.object_placed(&name, &mut state.objects));
    if let Err(e) = placed {
        tracing::error!("Cannot place {}: {e}", spec.name);
    }
}

/// Show the edit menu
pub fn edit_menu(ui: &mut egui::Ui, state: &mut AppState, viewport: &mut Viewport) {
    ui.menu_button("Edit", |ui| {
        let has_selection = state.selection.selected_name().is_some();
        if ui
            .add_enabled(has_selection, egui::Button::new("Remove selected"))
            .clicked()
        {
            super::keyboard::remove_selected(state, viewport);
            ui.close_menu();
        }
        if ui
            .add_enabled(has_selection, egui::Button::new("Deselect"))
            .clicked()
        {
            state.selection.clear();
            ui.close_menu();
        }
    });
}

/// Show the view menu
pub fn view_menu(ui: &mut egui::Ui, state: &mut AppState, viewport: &mut Viewport) {
    ui.menu_button("View", |ui| {
        let mut ortho = viewport.camera().orthographic;
        if ui.checkbox(&mut ortho, "Orthographic").changed() {
            viewport.toggle_projection();
        }
        let mut drop = viewport.is_drop_animation_enabled();
        if ui.checkbox(&mut drop, "Drop animation").changed() {
            viewport.set_drop_animation(drop);
            state.settings.viewport.drop_animation = drop;
        }
        ui.separator();
        if ui.button("Reset camera").clicked() {
            viewport.reset_camera();
            ui.close_menu();
        }
    });
}
