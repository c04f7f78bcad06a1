//! Objects placed on the platform, keyed by unique name.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use shared::{ObjectName, ObjectSpec, DEFAULT_DROP_OFFSET};

use crate::error::ViewportError;
use crate::viewport::mesh::{MeshData, MeshSupplier};

/// A mesh placed in the scene with its own transform
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: ObjectName,
    pub position: Vec3,
    /// Rotation about local Z in degrees. Never wrapped.
    pub rotation_z: f32,
    /// Per-axis scale, every component > 0
    pub scale: Vec3,
    /// Draw payload; shared with the renderer, never inspected here
    pub mesh: Arc<MeshData>,
    /// Height above the resting position where the drop animation starts
    pub drop_offset: f32,
}

impl SceneObject {
    pub fn new(name: impl Into<ObjectName>, mesh: Arc<MeshData>) -> Self {
        Self {
            name: name.into(),
            position: Vec3::ZERO,
            rotation_z: 0.0,
            scale: Vec3::ONE,
            mesh,
            drop_offset: DEFAULT_DROP_OFFSET as f32,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Build from a scene-file entry, generating the mesh from its primitive
    pub fn from_spec(spec: &ObjectSpec, color: [f32; 3]) -> Self {
        let mesh = MeshData::from_supplier(&spec.primitive as &dyn MeshSupplier, color);
        let scale = Vec3::from_array(spec.scale.map(|v| v as f32));
        Self {
            name: spec.name.clone(),
            position: Vec3::from_array(spec.position.map(|v| v as f32)),
            rotation_z: spec.rotation_z as f32,
            // Non-positive scale would flip or collapse the mesh
            scale: scale.max(Vec3::splat(f32::EPSILON)),
            mesh: Arc::new(mesh),
            drop_offset: spec.drop_offset as f32,
        }
    }

    /// `translate(position) * rotateZ(rotation_z) * scale(scale)`
    pub fn local_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_rotation_z(self.rotation_z.to_radians()),
            self.position,
        )
    }
}

/// Owner of the scene's objects. The viewport core only looks up and mutates
/// existing entries; the host application decides what gets inserted or removed.
pub trait ObjectRegistry {
    fn get(&self, name: &str) -> Option<&SceneObject>;
    fn get_mut(&mut self, name: &str) -> Option<&mut SceneObject>;
    fn for_each(&self, f: &mut dyn FnMut(&SceneObject));
    fn insert(&mut self, object: SceneObject) -> Result<(), ViewportError>;
    fn remove(&mut self, name: &str) -> Option<SceneObject>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Insertion-ordered object store
#[derive(Debug, Default, Clone)]
pub struct SceneObjects {
    objects: Vec<SceneObject>,
}

impl SceneObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn names(&self) -> Vec<ObjectName> {
        self.objects.iter().map(|o| o.name.clone()).collect()
    }

    /// `base` if free, otherwise `base-2`, `base-3`, ...
    pub fn unique_name(&self, base: &str) -> ObjectName {
        if !self.contains(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

impl ObjectRegistry for SceneObjects {
    fn get(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    fn for_each(&self, f: &mut dyn FnMut(&SceneObject)) {
        self.objects.iter().for_each(f);
    }

    fn insert(&mut self, object: SceneObject) -> Result<(), ViewportError> {
        if self.contains(&object.name) {
            return Err(ViewportError::DuplicateName(object.name));
        }
        self.objects.push(object);
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| o.name == name)?;
        Some(self.objects.remove(index))
    }

    fn len(&self) -> usize {
        self.objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Primitive;

    fn object(name: &str) -> SceneObject {
        SceneObject::new(name, Arc::new(MeshData { vertices: vec![], indices: vec![] }))
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let mut objects = SceneObjects::new();
        objects.insert(object("a")).unwrap();
        let err = objects.insert(object("a")).unwrap_err();
        assert_eq!(err, ViewportError::DuplicateName("a".into()));
        assert_eq!(objects.len(), 1);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut objects = SceneObjects::new();
        for name in ["a", "b", "c"] {
            objects.insert(object(name)).unwrap();
        }
        assert!(objects.remove("b").is_some());
        assert!(objects.remove("b").is_none());
        assert_eq!(objects.names(), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_for_each_visits_all() {
        let mut objects = SceneObjects::new();
        objects.insert(object("a")).unwrap();
        objects.insert(object("b")).unwrap();
        let mut seen = Vec::new();
        objects.for_each(&mut |o| seen.push(o.name.clone()));
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn test_unique_name() {
        let mut objects = SceneObjects::new();
        assert_eq!(objects.unique_name("cube"), "cube");
        objects.insert(object("cube")).unwrap();
        objects.insert(object("cube-2")).unwrap();
        assert_eq!(objects.unique_name("cube"), "cube-3");
    }

    #[test]
    fn test_local_transform_order() {
        let mut o = object("a").with_position(Vec3::new(10.0, 0.0, 0.0));
        o.rotation_z = 90.0;
        o.scale = Vec3::new(2.0, 1.0, 1.0);
        // Scale first, then rotate, then translate
        let p = o.local_transform().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(10.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn test_from_spec() {
        let spec = ObjectSpec::new("peg", Primitive::Cylinder { radius: 2.0, height: 4.0 })
            .at([5.0, 6.0, 0.0]);
        let o = SceneObject::from_spec(&spec, [1.0, 1.0, 1.0]);
        assert_eq!(o.name, "peg");
        assert_eq!(o.position, Vec3::new(5.0, 6.0, 0.0));
        assert_eq!(o.scale, Vec3::ONE);
        assert!(o.mesh.triangle_count() > 0);
        assert_eq!(o.drop_offset, 300.0);
    }
}
