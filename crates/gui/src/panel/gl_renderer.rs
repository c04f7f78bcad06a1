use std::collections::HashMap;
use std::sync::{Arc, Weak};

use glow::HasContext;

use plater_view_lib::viewport::composer::{DrawCommand, DrawItem, Geometry, RecordedFrame};
use plater_view_lib::viewport::mesh::{LineMeshData, MeshData};
use plater_view_lib::ViewportError;

/// Share of the highlight colour mixed into the selected object
const HIGHLIGHT_MIX: f32 = 0.35;

// ── GPU mesh handles ─────────────────────────────────────────

struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: glow::Buffer,
    index_count: i32,
}

struct GpuLines {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    vertex_count: i32,
}

/// GPU copy of a CPU mesh, valid while the source `Arc` is alive
struct Cached<T, G> {
    source: Weak<T>,
    gpu: G,
}

impl<T, G> Cached<T, G> {
    fn matches(&self, mesh: &Arc<T>) -> bool {
        self.source
            .upgrade()
            .is_some_and(|live| Arc::ptr_eq(&live, mesh))
    }
}

// ── Main GL renderer ─────────────────────────────────────────

/// Replays composed frames with glow. Created once per GL context.
pub struct GlRenderer {
    mesh_program: glow::Program,
    line_program: glow::Program,
    platform: Option<Cached<LineMeshData, GpuLines>>,
    marker: Option<Cached<MeshData, GpuMesh>>,
    /// Object meshes keyed by object name
    objects: HashMap<String, Cached<MeshData, GpuMesh>>,
    last_error: Option<ViewportError>,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Result<Self, ViewportError> {
        let mesh_program = compile_program(gl, MESH_VERT, MESH_FRAG)?;
        let line_program = match compile_program(gl, LINE_VERT, LINE_FRAG) {
            Ok(p) => p,
            Err(e) => {
                unsafe { gl.delete_program(mesh_program) };
                return Err(e);
            }
        };
        Ok(Self {
            mesh_program,
            line_program,
            platform: None,
            marker: None,
            objects: HashMap::new(),
            last_error: None,
        })
    }

    /// Error from the most recent paint, if any
    pub fn take_error(&mut self) -> Option<ViewportError> {
        self.last_error.take()
    }

    /// Upload whatever the frame references and is not on the GPU yet;
    /// drop GPU meshes of objects that are gone.
    fn sync(&mut self, gl: &glow::Context, frame: &RecordedFrame) -> Result<(), ViewportError> {
        let mut seen = Vec::new();
        for command in &frame.commands {
            match (&command.item, &command.geometry) {
                (DrawItem::Platform, Geometry::Lines(lines)) => {
                    if !self.platform.as_ref().is_some_and(|c| c.matches(lines)) {
                        let gpu = upload_lines(gl, lines)?;
                        if let Some(old) = self.platform.replace(Cached { source: Arc::downgrade(lines), gpu }) {
                            delete_lines(gl, &old.gpu);
                        }
                    }
                }
                (DrawItem::CursorMarker, Geometry::Triangles(mesh)) => {
                    if !self.marker.as_ref().is_some_and(|c| c.matches(mesh)) {
                        let gpu = upload_mesh(gl, mesh)?;
                        if let Some(old) = self.marker.replace(Cached { source: Arc::downgrade(mesh), gpu }) {
                            delete_mesh(gl, &old.gpu);
                        }
                    }
                }
                (DrawItem::Object { name, .. }, Geometry::Triangles(mesh)) => {
                    seen.push(name.as_str());
                    if !self.objects.get(name).is_some_and(|c| c.matches(mesh)) {
                        let gpu = upload_mesh(gl, mesh)?;
                        let cached = Cached { source: Arc::downgrade(mesh), gpu };
                        if let Some(old) = self.objects.insert(name.clone(), cached) {
                            delete_mesh(gl, &old.gpu);
                        }
                    }
                }
                (item, _) => tracing::warn!("Unexpected geometry for {item:?}"),
            }
        }

        let stale: Vec<String> = self
            .objects
            .keys()
            .filter(|name| !seen.contains(&name.as_str()))
            .cloned()
            .collect();
        for name in stale {
            if let Some(old) = self.objects.remove(&name) {
                delete_mesh(gl, &old.gpu);
            }
        }
        Ok(())
    }

    /// Render `frame` into the viewport rectangle `[x, y, width, height]` (pixels, GL origin)
    pub fn paint(&mut self, gl: &glow::Context, frame: &RecordedFrame, viewport: [f32; 4]) {
        if let Err(e) = self.sync(gl, frame) {
            tracing::error!("GPU upload failed: {e}");
            self.last_error = Some(e);
            return;
        }

        unsafe {
            gl.viewport(
                viewport[0] as i32,
                viewport[1] as i32,
                viewport[2] as i32,
                viewport[3] as i32,
            );
            gl.scissor(
                viewport[0] as i32,
                viewport[1] as i32,
                viewport[2] as i32,
                viewport[3] as i32,
            );
            gl.enable(glow::SCISSOR_TEST);

            let [r, g, b] = frame.background;
            gl.clear_color(r, g, b, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);

            for command in &frame.commands {
                self.draw(gl, frame, command);
            }

            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }

    unsafe fn draw(&self, gl: &glow::Context, frame: &RecordedFrame, command: &DrawCommand) {
        let mvp = frame.projection * command.model_view;
        match &command.item {
            DrawItem::Platform => {
                if let Some(platform) = &self.platform {
                    gl.use_program(Some(self.line_program));
                    set_uniform_mat4(gl, self.line_program, "u_mvp", &mvp);
                    draw_lines(gl, &platform.gpu);
                }
            }
            DrawItem::CursorMarker => {
                if let Some(marker) = &self.marker {
                    self.use_mesh_program(gl, &mvp, &command.model_view, frame.highlight, 0.0);
                    draw_mesh(gl, &marker.gpu);
                }
            }
            DrawItem::Object { name, selected } => {
                if let Some(object) = self.objects.get(name) {
                    let mix = if *selected { HIGHLIGHT_MIX } else { 0.0 };
                    self.use_mesh_program(gl, &mvp, &command.model_view, frame.highlight, mix);
                    draw_mesh(gl, &object.gpu);
                }
            }
        }
    }

    fn use_mesh_program(&self, gl: &glow::Context, mvp: &glam::Mat4, model_view: &glam::Mat4, tint: [f32; 3], mix: f32) {
        unsafe {
            gl.use_program(Some(self.mesh_program));
        }
        set_uniform_mat4(gl, self.mesh_program, "u_mvp", mvp);
        set_uniform_mat4(gl, self.mesh_program, "u_model_view", model_view);
        // Light direction in eye space
        let light_dir = glam::Vec3::new(0.3, 0.5, 0.8).normalize();
        set_uniform_vec3(gl, self.mesh_program, "u_light_dir", &light_dir);
        set_uniform_vec3(gl, self.mesh_program, "u_tint", &glam::Vec3::from_array(tint));
        set_uniform_f32(gl, self.mesh_program, "u_tint_mix", mix);
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.mesh_program);
            gl.delete_program(self.line_program);
        }
        if let Some(platform) = self.platform.take() {
            delete_lines(gl, &platform.gpu);
        }
        if let Some(marker) = self.marker.take() {
            delete_mesh(gl, &marker.gpu);
        }
        for (_, object) in self.objects.drain() {
            delete_mesh(gl, &object.gpu);
        }
    }
}

// ── GPU upload ───────────────────────────────────────────────

fn upload_mesh(gl: &glow::Context, data: &MeshData) -> Result<GpuMesh, ViewportError> {
    unsafe {
        let vao = gl.create_vertex_array().map_err(ViewportError::Backend)?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().map_err(ViewportError::Backend)?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck_cast_slice(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = 9 * 4; // 9 floats * 4 bytes
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // normal: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);
        // color: location 2
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_f32(2, 3, glow::FLOAT, false, stride, 6 * 4);

        let ibo = gl.create_buffer().map_err(ViewportError::Backend)?;
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            bytemuck_cast_slice(&data.indices),
            glow::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);

        Ok(GpuMesh {
            vao,
            vbo,
            ibo,
            index_count: data.indices.len() as i32,
        })
    }
}

fn upload_lines(gl: &glow::Context, data: &LineMeshData) -> Result<GpuLines, ViewportError> {
    unsafe {
        let vao = gl.create_vertex_array().map_err(ViewportError::Backend)?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().map_err(ViewportError::Backend)?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck_cast_slice(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = 7 * 4; // 7 floats * 4 bytes
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // color: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 4, glow::FLOAT, false, stride, 3 * 4);

        gl.bind_vertex_array(None);

        Ok(GpuLines {
            vao,
            vbo,
            vertex_count: (data.vertices.len() / 7) as i32,
        })
    }
}

fn delete_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    unsafe {
        gl.delete_vertex_array(mesh.vao);
        gl.delete_buffer(mesh.vbo);
        gl.delete_buffer(mesh.ibo);
    }
}

fn delete_lines(gl: &glow::Context, lines: &GpuLines) {
    unsafe {
        gl.delete_vertex_array(lines.vao);
        gl.delete_buffer(lines.vbo);
    }
}

// ── Draw calls ───────────────────────────────────────────────

unsafe fn draw_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    gl.bind_vertex_array(Some(mesh.vao));
    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.ibo));
    gl.draw_elements(glow::TRIANGLES, mesh.index_count, glow::UNSIGNED_INT, 0);
    gl.bind_vertex_array(None);
}

unsafe fn draw_lines(gl: &glow::Context, lines: &GpuLines) {
    gl.bind_vertex_array(Some(lines.vao));
    gl.draw_arrays(glow::LINES, 0, lines.vertex_count);
    gl.bind_vertex_array(None);
}

// ── Shader compilation ───────────────────────────────────────

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> Result<glow::Program, ViewportError> {
    unsafe {
        let program = gl.create_program().map_err(ViewportError::Backend)?;
        let vert = compile_shader(gl, glow::VERTEX_SHADER, vert_src)?;
        let frag = compile_shader(gl, glow::FRAGMENT_SHADER, frag_src)?;

        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        gl.delete_shader(vert);
        gl.delete_shader(frag);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            tracing::error!("Program link error: {log}");
            gl.delete_program(program);
            return Err(ViewportError::Backend(format!("program link: {log}")));
        }
        Ok(program)
    }
}

unsafe fn compile_shader(gl: &glow::Context, kind: u32, src: &str) -> Result<glow::Shader, ViewportError> {
    let shader = gl.create_shader(kind).map_err(ViewportError::Backend)?;
    gl.shader_source(shader, src);
    gl.compile_shader(shader);
    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        tracing::error!("Shader compile error: {log}");
        gl.delete_shader(shader);
        return Err(ViewportError::Backend(format!("shader compile: {log}")));
    }
    Ok(shader)
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &glam::Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: &glam::Vec3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v.x, v.y, v.z);
    }
}

fn set_uniform_f32(gl: &glow::Context, program: glow::Program, name: &str, v: f32) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_1_f32(loc.as_ref(), v);
    }
}

// ── Byte cast helper ─────────────────────────────────────────

fn bytemuck_cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            slice.as_ptr() as *const u8,
            std::mem::size_of_val(slice),
        )
    }
}

// ── Shaders ──────────────────────────────────────────────────

const MESH_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;
uniform mat4 u_model_view;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec3 a_color;

out vec3 v_normal;
out vec3 v_color;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_normal = mat3(u_model_view) * a_normal;
    v_color = a_color;
}
"#;

const MESH_FRAG: &str = r#"#version 330 core
uniform vec3 u_light_dir;
uniform vec3 u_tint;
uniform float u_tint_mix;

in vec3 v_normal;
in vec3 v_color;

out vec4 frag_color;

void main() {
    vec3 n = normalize(v_normal);
    float diffuse = abs(dot(n, u_light_dir));
    float ambient = 0.25;
    float light = ambient + diffuse * 0.75;
    vec3 base = mix(v_color, u_tint, u_tint_mix);
    frag_color = vec4(base * light, 1.0);
}
"#;

const LINE_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec4 a_color;

out vec4 v_color;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_color = a_color;
}
"#;

const LINE_FRAG: &str = r#"#version 330 core
in vec4 v_color;
out vec4 frag_color;

void main() {
    frag_color = v_color;
}
"#;
