pub mod objects;
pub mod selection;
pub mod settings;
mod transform_ops;

pub use objects::{ObjectRegistry, SceneObject, SceneObjects};
pub use selection::{SelectionProvider, SelectionState};
pub use settings::{AppSettings, InteractionSettings, ViewportSettings};
pub use transform_ops::TransformStore;

use shared::{ObjectName, ObjectSpec};

use crate::error::ViewportError;

/// Everything the host keeps outside the viewport: objects, selection, settings
#[derive(Default)]
pub struct AppState {
    pub objects: SceneObjects,
    pub selection: SelectionState,
    pub settings: AppSettings,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            objects: SceneObjects::new(),
            selection: SelectionState::default(),
            settings,
        }
    }

    /// Insert an object built from `spec` under a free name and select it
    pub fn add_object(&mut self, spec: &ObjectSpec) -> Result<ObjectName, ViewportError> {
        let mut object = SceneObject::from_spec(spec, settings::rgb(self.settings.viewport.object_color));
        object.name = self.objects.unique_name(&spec.name);
        let name = object.name.clone();
        self.objects.insert(object)?;
        self.selection.select(name.clone());
        tracing::info!("Added {} `{name}`", spec.primitive.label());
        Ok(name)
    }

    /// Remove the selected object, returning it
    pub fn remove_selected(&mut self) -> Option<SceneObject> {
        let name = self.selection.selected_name()?.to_string();
        self.selection.forget(&name);
        let removed = self.objects.remove(&name);
        if removed.is_some() {
            tracing::info!("Removed object {name}");
        }
        removed
    }
}
