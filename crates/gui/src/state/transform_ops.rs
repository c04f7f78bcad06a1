//! Move/rotate operations on the selected object

use glam::Vec2;

use super::objects::{ObjectRegistry, SceneObject};
use super::selection::SelectionProvider;
use crate::error::ViewportError;
use crate::redraw::RedrawSignal;

/// Manipulates whichever object the selection provider names.
pub struct TransformStore<'a> {
    objects: &'a mut dyn ObjectRegistry,
    selection: &'a dyn SelectionProvider,
    redraw: &'a RedrawSignal,
}

impl<'a> TransformStore<'a> {
    pub fn new(
        objects: &'a mut dyn ObjectRegistry,
        selection: &'a dyn SelectionProvider,
        redraw: &'a RedrawSignal,
    ) -> Self {
        Self {
            objects,
            selection,
            redraw,
        }
    }

    fn selected_mut(&mut self) -> Result<&mut SceneObject, ViewportError> {
        let selection = self.selection;
        let name = selection.selected_name().ok_or(ViewportError::NoSelection)?;
        self.objects
            .get_mut(name)
            .ok_or_else(|| ViewportError::UnknownObject(name.to_string()))
    }

    /// Add `(dx, dy, 0)` to the selected object's position. Z is left alone.
    pub fn try_move_selected(&mut self, delta: Vec2) -> Result<(), ViewportError> {
        let object = self.selected_mut()?;
        object.position.x += delta.x;
        object.position.y += delta.y;
        tracing::trace!("Moved {} to {:?}", object.name, object.position);
        self.redraw.request();
        Ok(())
    }

    /// Add `degrees` to the selected object's Z rotation, without wrapping.
    pub fn try_rotate_selected(&mut self, degrees: f32) -> Result<(), ViewportError> {
        let object = self.selected_mut()?;
        object.rotation_z += degrees;
        tracing::trace!("Rotated {} to {}°", object.name, object.rotation_z);
        self.redraw.request();
        Ok(())
    }

    pub fn move_selected(&mut self, delta: Vec2) -> bool {
        report(self.try_move_selected(delta))
    }

    pub fn rotate_selected(&mut self, degrees: f32) -> bool {
        report(self.try_rotate_selected(degrees))
    }
}

fn report(result: Result<(), ViewportError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!("Manipulation ignored: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;

    use super::*;
    use crate::state::objects::SceneObjects;
    use crate::state::selection::SelectionState;
    use crate::viewport::mesh::MeshData;

    fn scene() -> SceneObjects {
        let mesh = Arc::new(MeshData { vertices: vec![], indices: vec![] });
        let mut objects = SceneObjects::new();
        objects
            .insert(SceneObject::new("a", mesh.clone()).with_position(Vec3::new(1.0, 2.0, 3.0)))
            .unwrap();
        objects.insert(SceneObject::new("b", mesh)).unwrap();
        objects
    }

    #[test]
    fn test_move_without_selection_fails_and_changes_nothing() {
        let mut objects = scene();
        let before: Vec<Vec3> = objects.iter().map(|o| o.position).collect();
        let selection = SelectionState::default();
        let redraw = RedrawSignal::new();

        let mut store = TransformStore::new(&mut objects, &selection, &redraw);
        assert!(!store.move_selected(Vec2::new(5.0, 5.0)));
        assert_eq!(
            store.try_move_selected(Vec2::ONE),
            Err(ViewportError::NoSelection)
        );

        let after: Vec<Vec3> = objects.iter().map(|o| o.position).collect();
        assert_eq!(before, after);
        assert!(!redraw.is_pending());
    }

    #[test]
    fn test_move_keeps_z() {
        let mut objects = scene();
        let mut selection = SelectionState::default();
        selection.select("a");
        let redraw = RedrawSignal::new();

        assert!(TransformStore::new(&mut objects, &selection, &redraw).move_selected(Vec2::new(4.0, -2.0)));
        assert_eq!(objects.get("a").unwrap().position, Vec3::new(5.0, 0.0, 3.0));
        assert_eq!(objects.get("b").unwrap().position, Vec3::ZERO);
        assert!(redraw.take());
    }

    #[test]
    fn test_rotation_is_not_wrapped() {
        let mut objects = scene();
        let mut selection = SelectionState::default();
        selection.select("b");
        let redraw = RedrawSignal::new();

        let mut store = TransformStore::new(&mut objects, &selection, &redraw);
        for _ in 0..4 {
            assert!(store.rotate_selected(18.0));
        }
        for _ in 0..20 {
            store.rotate_selected(18.0);
        }
        assert_eq!(objects.get("b").unwrap().rotation_z, 432.0);
    }

    #[test]
    fn test_four_rotations_of_eighteen() {
        let mut objects = scene();
        let mut selection = SelectionState::default();
        selection.select("b");
        let redraw = RedrawSignal::new();

        let mut store = TransformStore::new(&mut objects, &selection, &redraw);
        for _ in 0..4 {
            store.rotate_selected(18.0);
        }
        assert_eq!(objects.get("b").unwrap().rotation_z, 72.0);
    }

    #[test]
    fn test_stale_selection_is_unknown_object() {
        let mut objects = scene();
        let mut selection = SelectionState::default();
        selection.select("gone");
        let redraw = RedrawSignal::new();

        let mut store = TransformStore::new(&mut objects, &selection, &redraw);
        assert_eq!(
            store.try_rotate_selected(5.0),
            Err(ViewportError::UnknownObject("gone".into()))
        );
    }
}
