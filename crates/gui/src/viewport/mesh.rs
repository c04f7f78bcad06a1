use glam::Vec3;
use shared::{BuildVolume, Primitive};

/// One triangle as delivered by a mesh source: a face normal and three corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub normal: Vec3,
    pub vertices: [Vec3; 3],
}

impl Facet {
    /// Facet with the normal taken from the winding of `a, b, c`
    pub fn from_corners(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            normal: (b - a).cross(c - a).normalize_or_zero(),
            vertices: [a, b, c],
        }
    }
}

/// Source of triangle soup for an object. Parsing mesh files lives outside
/// this crate; anything that can hand out facets can feed the viewport.
pub trait MeshSupplier {
    fn facets(&self) -> Vec<Facet>;
}

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    /// 9 floats per vertex: position(3) + normal(3) + color(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Flat-shaded mesh: every facet corner carries the facet normal
    pub fn from_facets(facets: &[Facet], color: [f32; 3]) -> Self {
        let mut vertices = Vec::with_capacity(facets.len() * 27);
        for facet in facets {
            for v in &facet.vertices {
                push_vert(&mut vertices, v.x, v.y, v.z, facet.normal, color);
            }
        }
        let indices = (0..(facets.len() * 3) as u32).collect();
        Self { vertices, indices }
    }

    pub fn from_supplier(supplier: &dyn MeshSupplier, color: [f32; 3]) -> Self {
        Self::from_facets(&supplier.facets(), color)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 9
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Lines mesh: interleaved [pos.x, pos.y, pos.z, r, g, b, a]
#[derive(Clone, Debug, PartialEq)]
pub struct LineMeshData {
    /// 7 floats per vertex: position(3) + color(4)
    pub vertices: Vec<f32>,
}

impl LineMeshData {
    pub fn segment_count(&self) -> usize {
        self.vertices.len() / 14
    }
}

// ── Procedural shapes (Z-up, resting on z = 0) ───────────────

impl MeshSupplier for Primitive {
    fn facets(&self) -> Vec<Facet> {
        match *self {
            Primitive::Cube { width, depth, height } => {
                cube(width as f32, depth as f32, height as f32)
            }
            Primitive::Cylinder { radius, height } => cylinder(radius as f32, height as f32, 32),
            Primitive::Sphere { radius } => sphere(radius as f32, 12, 24),
            Primitive::Cone { radius, height } => cone(radius as f32, height as f32, 32),
        }
    }
}

fn quad(out: &mut Vec<Facet>, corners: [Vec3; 4], normal: Vec3) {
    out.push(Facet { normal, vertices: [corners[0], corners[1], corners[2]] });
    out.push(Facet { normal, vertices: [corners[0], corners[2], corners[3]] });
}

pub fn cube(w: f32, d: f32, h: f32) -> Vec<Facet> {
    let hw = w * 0.5;
    let hd = d * 0.5;

    let faces: [([Vec3; 4], Vec3); 6] = [
        // Top (+Z)
        ([Vec3::new(-hw, -hd, h), Vec3::new(hw, -hd, h), Vec3::new(hw, hd, h), Vec3::new(-hw, hd, h)], Vec3::Z),
        // Bottom (-Z)
        ([Vec3::new(-hw, hd, 0.0), Vec3::new(hw, hd, 0.0), Vec3::new(hw, -hd, 0.0), Vec3::new(-hw, -hd, 0.0)], Vec3::NEG_Z),
        // Right (+X)
        ([Vec3::new(hw, -hd, 0.0), Vec3::new(hw, hd, 0.0), Vec3::new(hw, hd, h), Vec3::new(hw, -hd, h)], Vec3::X),
        // Left (-X)
        ([Vec3::new(-hw, hd, 0.0), Vec3::new(-hw, -hd, 0.0), Vec3::new(-hw, -hd, h), Vec3::new(-hw, hd, h)], Vec3::NEG_X),
        // Back (+Y)
        ([Vec3::new(hw, hd, 0.0), Vec3::new(-hw, hd, 0.0), Vec3::new(-hw, hd, h), Vec3::new(hw, hd, h)], Vec3::Y),
        // Front (-Y)
        ([Vec3::new(-hw, -hd, 0.0), Vec3::new(hw, -hd, 0.0), Vec3::new(hw, -hd, h), Vec3::new(-hw, -hd, h)], Vec3::NEG_Y),
    ];

    let mut facets = Vec::with_capacity(12);
    for (corners, normal) in faces {
        quad(&mut facets, corners, normal);
    }
    facets
}

pub fn cylinder(radius: f32, height: f32, segments: u32) -> Vec<Facet> {
    let mut facets = Vec::new();

    for i in 0..segments {
        let (c0, s0, c1, s1) = segment_angles(i, segments);
        let b0 = Vec3::new(radius * c0, radius * s0, 0.0);
        let b1 = Vec3::new(radius * c1, radius * s1, 0.0);
        let t0 = b0 + Vec3::Z * height;
        let t1 = b1 + Vec3::Z * height;

        // Side
        let side_normal = Vec3::new(c0 + c1, s0 + s1, 0.0).normalize_or_zero();
        quad(&mut facets, [b0, b1, t1, t0], side_normal);

        // Caps
        facets.push(Facet { normal: Vec3::Z, vertices: [Vec3::Z * height, t0, t1] });
        facets.push(Facet { normal: Vec3::NEG_Z, vertices: [Vec3::ZERO, b1, b0] });
    }

    facets
}

pub fn sphere(radius: f32, rings: u32, sectors: u32) -> Vec<Facet> {
    let point = |r: u32, s: u32| {
        let phi = std::f32::consts::PI * r as f32 / rings as f32;
        let theta = std::f32::consts::TAU * s as f32 / sectors as f32;
        // Sit the sphere on the platform
        Vec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.sin() * theta.sin(),
            radius * (1.0 + phi.cos()),
        )
    };

    let mut facets = Vec::new();
    for r in 0..rings {
        for s in 0..sectors {
            let p00 = point(r, s);
            let p01 = point(r, s + 1);
            let p10 = point(r + 1, s);
            let p11 = point(r + 1, s + 1);
            // Degenerate triangles at the poles are skipped
            if r != 0 {
                facets.push(Facet::from_corners(p00, p10, p01));
            }
            if r != rings - 1 {
                facets.push(Facet::from_corners(p01, p10, p11));
            }
        }
    }
    facets
}

pub fn cone(radius: f32, height: f32, segments: u32) -> Vec<Facet> {
    let apex = Vec3::Z * height;
    let mut facets = Vec::new();

    for i in 0..segments {
        let (c0, s0, c1, s1) = segment_angles(i, segments);
        let b0 = Vec3::new(radius * c0, radius * s0, 0.0);
        let b1 = Vec3::new(radius * c1, radius * s1, 0.0);

        facets.push(Facet::from_corners(b0, b1, apex));
        facets.push(Facet { normal: Vec3::NEG_Z, vertices: [Vec3::ZERO, b1, b0] });
    }

    facets
}

fn segment_angles(i: u32, segments: u32) -> (f32, f32, f32, f32) {
    let a0 = i as f32 * std::f32::consts::TAU / segments as f32;
    let a1 = (i + 1) as f32 * std::f32::consts::TAU / segments as f32;
    (a0.cos(), a0.sin(), a1.cos(), a1.sin())
}

// ── Platform and cursor marker ───────────────────────────────

/// Spacing of the platform grid, in build-volume units
pub const PLATFORM_GRID_STEP: f32 = 10.0;

/// Wireframe of the build volume: a grid on the platform plus the outline of
/// the printable box.
pub fn platform(volume: &BuildVolume, color: [f32; 4]) -> LineMeshData {
    let mut vertices = Vec::new();
    let [ox, oy, oz] = volume.origin_offset.map(|v| v as f32);
    let w = volume.width as f32;
    let d = volume.depth as f32;
    let h = volume.height as f32;

    let minor = [color[0], color[1], color[2], color[3] * 0.4];

    // Grid lines parallel to Y
    let mut x = 0.0;
    while x <= w + f32::EPSILON {
        let c = if x == 0.0 || (w - x).abs() < f32::EPSILON { color } else { minor };
        push_line(&mut vertices, Vec3::new(ox + x, oy, oz), Vec3::new(ox + x, oy + d, oz), c);
        x += PLATFORM_GRID_STEP;
    }
    // Grid lines parallel to X
    let mut y = 0.0;
    while y <= d + f32::EPSILON {
        let c = if y == 0.0 || (d - y).abs() < f32::EPSILON { color } else { minor };
        push_line(&mut vertices, Vec3::new(ox, oy + y, oz), Vec3::new(ox + w, oy + y, oz), c);
        y += PLATFORM_GRID_STEP;
    }

    // Vertical edges and top outline of the printable box
    let top = oz + h;
    let corners = [
        Vec3::new(ox, oy, 0.0),
        Vec3::new(ox + w, oy, 0.0),
        Vec3::new(ox + w, oy + d, 0.0),
        Vec3::new(ox, oy + d, 0.0),
    ];
    for (i, c) in corners.iter().enumerate() {
        let next = corners[(i + 1) % corners.len()];
        push_line(&mut vertices, Vec3::new(c.x, c.y, oz), Vec3::new(c.x, c.y, top), minor);
        push_line(&mut vertices, Vec3::new(c.x, c.y, top), Vec3::new(next.x, next.y, top), minor);
    }

    LineMeshData { vertices }
}

/// Half-size of the cursor marker quad
pub const CURSOR_MARKER_HALF_SIZE: f32 = 2.0;

/// Small flat square centred on the origin, facing +Z
pub fn cursor_marker(color: [f32; 3]) -> MeshData {
    let s = CURSOR_MARKER_HALF_SIZE;
    let mut facets = Vec::with_capacity(2);
    quad(
        &mut facets,
        [Vec3::new(s, s, 0.0), Vec3::new(-s, s, 0.0), Vec3::new(-s, -s, 0.0), Vec3::new(s, -s, 0.0)],
        Vec3::Z,
    );
    MeshData::from_facets(&facets, color)
}

// ── Helpers ──────────────────────────────────────────────────

fn push_vert(v: &mut Vec<f32>, px: f32, py: f32, pz: f32, n: Vec3, c: [f32; 3]) {
    v.extend_from_slice(&[px, py, pz, n.x, n.y, n.z, c[0], c[1], c[2]]);
}

fn push_line(v: &mut Vec<f32>, a: Vec3, b: Vec3, c: [f32; 4]) {
    v.extend_from_slice(&[a.x, a.y, a.z, c[0], c[1], c[2], c[3]]);
    v.extend_from_slice(&[b.x, b.y, b.z, c[0], c[1], c[2], c[3]]);
}
