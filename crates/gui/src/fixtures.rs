//! Factory functions for creating test data.
//!
//! Convenient builders for `ObjectSpec`, `SceneDescription` and
//! `SceneObject`, used by the unit tests, the integration tests and the
//! harness.

use std::sync::Arc;

use glam::Vec3;
use shared::*;

use crate::state::SceneObject;
use crate::viewport::mesh::MeshData;

// ── Object specs ────────────────────────────────────────────────

/// Cube resting on the platform at the origin.
pub fn cube_spec(name: &str, w: f64, d: f64, h: f64) -> ObjectSpec {
    ObjectSpec::new(name, Primitive::Cube { width: w, depth: d, height: h })
}

/// Cube resting on the platform at `pos`.
pub fn cube_spec_at(name: &str, w: f64, d: f64, h: f64, pos: [f64; 3]) -> ObjectSpec {
    cube_spec(name, w, d, h).at(pos)
}

pub fn cylinder_spec(name: &str, radius: f64, height: f64) -> ObjectSpec {
    ObjectSpec::new(name, Primitive::Cylinder { radius, height })
}

pub fn sphere_spec(name: &str, radius: f64) -> ObjectSpec {
    ObjectSpec::new(name, Primitive::Sphere { radius })
}

/// Spec that skips the drop animation.
pub fn resting_spec(spec: ObjectSpec) -> ObjectSpec {
    ObjectSpec { drop_offset: 0.0, ..spec }
}

// ── Scenes ──────────────────────────────────────────────────────

/// Default build volume with no objects.
pub fn empty_scene() -> SceneDescription {
    SceneDescription {
        build_volume: Some(BuildVolume::default()),
        objects: Vec::new(),
    }
}

/// A cube and a cylinder side by side on the default platform.
pub fn two_object_scene() -> SceneDescription {
    SceneDescription {
        build_volume: Some(BuildVolume::default()),
        objects: vec![
            cube_spec_at("block", 20.0, 20.0, 10.0, [60.0, 100.0, 0.0]),
            cylinder_spec("peg", 5.0, 30.0).at([140.0, 100.0, 0.0]),
        ],
    }
}

// ── Scene objects ───────────────────────────────────────────────

/// Object with an empty mesh, for tests that never render.
pub fn bare_object(name: &str, position: Vec3) -> SceneObject {
    SceneObject::new(name, empty_mesh()).with_position(position)
}

pub fn empty_mesh() -> Arc<MeshData> {
    Arc::new(MeshData {
        vertices: Vec::new(),
        indices: Vec::new(),
    })
}
