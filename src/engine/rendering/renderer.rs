//! The one shader program every scene draws with.

use std::rc::Rc;

use log::debug;

use crate::engine::error::{ Error, Result };
use crate::engine::gpu::{ Gpu, ProgramId, ShaderStage, UniformLocation };
use crate::engine::utils::math::{ Mat3x3, Mat4x4 };

use super::camera::Camera;
use super::mesh::COLOR_LOCATION;
use super::shader::{ compile_shader, link_program };

pub const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 vx_pos;
layout(location = 1) in vec4 vx_col;
layout(location = 2) in vec2 vx_uv;

uniform mat4 proj_m4;
uniform mat4 view_m4;
uniform mat4 model_m4;

out vec4 fg_col;
out vec2 fg_uv;

void main() {
    fg_col = vx_col;
    fg_uv = vx_uv;
    gl_Position = proj_m4 * view_m4 * model_m4 * vec4(vx_pos, 1.0);
    gl_PointSize = 5.0;
}
"#;

pub const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;

in vec4 fg_col;
in vec2 fg_uv;

uniform bool has_tex;
uniform sampler2D tex;
uniform mat3 tex_m3;

out vec4 out_col;

void main() {
    if (has_tex) {
        vec2 uv = (tex_m3 * vec3(fg_uv, 1.0)).xy;
        out_col = texture(tex, uv);
    } else {
        out_col = fg_col;
    }
}
"#;

#[derive(Debug, Clone, Copy)]
struct Uniforms {
    projection: UniformLocation,
    view: UniformLocation,
    model: UniformLocation,
    has_texture: UniformLocation,
    texture: UniformLocation,
    texture_transform: UniformLocation,
}

impl Uniforms {
    fn resolve(gpu: &dyn Gpu, program: ProgramId) -> Result<Self> {
        let find = |name: &str| {
            let location = gpu
                .uniform_location(program, name)
                .ok_or_else(|| Error::UniformNotFound(name.to_string()))?;
            debug!("uniform {} -> {:?}", name, location);
            Ok::<_, Error>(location)
        };

        Ok(Self {
            projection: find("proj_m4")?,
            view: find("view_m4")?,
            model: find("model_m4")?,
            has_texture: find("has_tex")?,
            texture: find("tex")?,
            texture_transform: find("tex_m3")?,
        })
    }
}

/// Linked program plus its uniform locations.
///
/// The setters assume the program is current; call [`Renderer::use_program`] first.
pub struct Renderer {
    gpu: Rc<dyn Gpu>,
    program: ProgramId,
    uniforms: Uniforms,
}

impl Renderer {
    pub fn new(gpu: &Rc<dyn Gpu>) -> Result<Self> {
        Self::from_sources(gpu, VERTEX_SHADER, FRAGMENT_SHADER)
    }

    pub fn from_sources(gpu: &Rc<dyn Gpu>, vertex_src: &str, fragment_src: &str) -> Result<Self> {
        let g = gpu.as_ref();
        let vs = compile_shader(g, ShaderStage::Vertex, vertex_src)?;
        let fs = match compile_shader(g, ShaderStage::Fragment, fragment_src) {
            Ok(fs) => fs,
            Err(e) => {
                g.delete_shader(vs);
                return Err(e);
            }
        };

        let linked = link_program(g, &[vs, fs]);
        g.delete_shader(vs);
        g.delete_shader(fs);
        let program = linked?;

        let uniforms = match Uniforms::resolve(g, program) {
            Ok(uniforms) => uniforms,
            Err(e) => {
                g.delete_program(program);
                return Err(e);
            }
        };

        debug!("renderer ready with program {:?}", program);
        Ok(Self { gpu: Rc::clone(gpu), program, uniforms })
    }

    /// Makes the program current and points the sampler at texture unit 0.
    pub fn use_program(&self) {
        self.gpu.use_program(Some(self.program));
        self.gpu.uniform_1_i32(self.uniforms.texture, 0);
    }

    pub fn set_projection(&self, projection: &Mat4x4) {
        self.gpu.uniform_matrix_4(self.uniforms.projection, projection);
    }

    pub fn set_view(&self, view: &Mat4x4) {
        self.gpu.uniform_matrix_4(self.uniforms.view, view);
    }

    pub fn set_model(&self, model: &Mat4x4) {
        self.gpu.uniform_matrix_4(self.uniforms.model, model);
    }

    pub fn set_camera(&self, camera: &dyn Camera) {
        self.set_projection(camera.projection());
        self.set_view(camera.view());
    }

    pub fn set_has_texture(&self, has_texture: bool) {
        self.gpu.uniform_1_i32(self.uniforms.has_texture, has_texture as i32);
    }

    pub fn set_texture_transform(&self, transform: &Mat3x3) {
        self.gpu.uniform_matrix_3(self.uniforms.texture_transform, transform);
    }

    /// Colour for untextured geometry drawn without a colour buffer.
    pub fn set_tint(&self, rgba: [f32; 4]) {
        self.gpu.vertex_attrib_4f(COLOR_LOCATION, rgba);
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.gpu.delete_program(self.program);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::gpu::mock::{ Call, RecordingGpu };

    fn gpu() -> (Rc<RecordingGpu>, Rc<dyn Gpu>) {
        let recording = Rc::new(RecordingGpu::new());
        let gpu: Rc<dyn Gpu> = recording.clone();
        (recording, gpu)
    }

    #[test]
    fn builds_from_embedded_sources_without_leaking_shaders() {
        let (recording, gpu) = gpu();
        let renderer = Renderer::new(&gpu).unwrap();
        assert_eq!(recording.live_shaders(), 0);
        assert_eq!(recording.live_programs(), 1);

        drop(renderer);
        assert_eq!(recording.live_handles(), 0);
    }

    #[test]
    fn mistyped_uniform_fails_construction() {
        let (recording, gpu) = gpu();
        let fragment = FRAGMENT_SHADER.replace("uniform mat3 tex_m3;", "uniform mat3 tex_mat3;");

        match Renderer::from_sources(&gpu, VERTEX_SHADER, &fragment) {
            Err(Error::UniformNotFound(name)) => assert_eq!(name, "tex_m3"),
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("renderer built with a missing uniform"),
        }
        assert_eq!(recording.live_handles(), 0);
    }

    #[test]
    fn compile_and_link_failures_are_distinguished() {
        let (recording, gpu) = gpu();
        let broken = format!("{FRAGMENT_SHADER}\n#error broken");
        assert!(matches!(
            Renderer::from_sources(&gpu, VERTEX_SHADER, &broken),
            Err(Error::ShaderCompile { stage: ShaderStage::Fragment, .. })
        ));

        recording.fail_link.set(true);
        assert!(matches!(Renderer::new(&gpu), Err(Error::ShaderLink(_))));
        assert_eq!(recording.live_handles(), 0);
    }

    #[test]
    fn use_program_binds_sampler_to_unit_zero() {
        let (recording, gpu) = gpu();
        let renderer = Renderer::new(&gpu).unwrap();
        recording.clear_calls();

        renderer.use_program();
        let calls = recording.calls();
        assert!(matches!(calls[0], Call::UseProgram(Some(_))));
        assert!(matches!(calls[1], Call::Uniform1i { value: 0, .. }));
    }

    #[test]
    fn tint_sets_the_constant_colour_attribute() {
        let (recording, gpu) = gpu();
        let renderer = Renderer::new(&gpu).unwrap();
        recording.clear_calls();

        renderer.set_tint([1.0, 0.5, 0.0, 1.0]);
        assert_eq!(recording.calls(), vec![Call::VertexAttrib4f { location: COLOR_LOCATION, value: [1.0, 0.5, 0.0, 1.0] }]);
    }
}
