use std::ffi::{ c_void, CStr, CString };
use std::sync::Arc;

use glow::HasContext;

use super::*;

// Unsized formats of GLES 3.0 that are not part of the core profile headers.
const GL_LUMINANCE: u32 = 0x1909;
const GL_LUMINANCE_ALPHA: u32 = 0x190a;

/// [`Gpu`] backed by a current `glow` context.
///
/// The `glow::Context` is shared through an `Arc` so the UI overlay painter can
/// draw with the same context.
pub struct GlowGpu {
    gl: Arc<glow::Context>,
}

impl GlowGpu {
    /// Loads the GL entry points from the platform loader.
    ///
    /// # Safety
    /// The context the loader belongs to must be current on this thread and
    /// stay current for as long as the returned value is used.
    pub unsafe fn from_loader(get_proc_address: &dyn Fn(&CStr) -> *const c_void) -> Self {
        // glow has no entry point for glValidateProgram; the raw bindings cover it.
        gl::load_with(|symbol| {
            match CString::new(symbol) {
                Ok(symbol) => get_proc_address(&symbol),
                Err(_) => std::ptr::null(),
            }
        });

        let gl = glow::Context::from_loader_function(|symbol| {
            match CString::new(symbol) {
                Ok(symbol) => get_proc_address(&symbol),
                Err(_) => std::ptr::null(),
            }
        });

        log::info!(
            "GL context: {} ({})",
            gl.get_parameter_string(glow::VERSION),
            gl.get_parameter_string(glow::RENDERER)
        );

        Self { gl: Arc::new(gl) }
    }

    pub fn gl(&self) -> Arc<glow::Context> {
        self.gl.clone()
    }
}

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn buffer_usage(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::Static => glow::STATIC_DRAW,
        BufferUsage::Stream => glow::STREAM_DRAW,
    }
}

fn topology(topology: Topology) -> u32 {
    match topology {
        Topology::Points => glow::POINTS,
        Topology::Lines => glow::LINES,
        Topology::LineStrip => glow::LINE_STRIP,
        Topology::LineLoop => glow::LINE_LOOP,
        Topology::Triangles => glow::TRIANGLES,
        Topology::TriangleStrip => glow::TRIANGLE_STRIP,
        Topology::TriangleFan => glow::TRIANGLE_FAN,
    }
}

fn pixel_format(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Luminance => GL_LUMINANCE,
        PixelFormat::LuminanceAlpha => GL_LUMINANCE_ALPHA,
        PixelFormat::Rgb => glow::RGB,
        PixelFormat::Rgba => glow::RGBA,
    }
}

fn uniform(location: UniformLocation) -> glow::NativeUniformLocation {
    glow::NativeUniformLocation(location.0)
}

impl Gpu for GlowGpu {
    fn create_buffer(&self) -> Result<BufferId, String> {
        unsafe { self.gl.create_buffer().map(|b| BufferId(b.0)) }
    }

    fn delete_buffer(&self, buffer: BufferId) {
        unsafe { self.gl.delete_buffer(glow::NativeBuffer(buffer.0)) }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        unsafe {
            self.gl.bind_buffer(
                buffer_target(target),
                buffer.map(|b| glow::NativeBuffer(b.0))
            )
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe {
            self.gl.buffer_data_u8_slice(buffer_target(target), data, buffer_usage(usage))
        }
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        unsafe { self.gl.create_vertex_array().map(|v| VertexArrayId(v.0)) }
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        unsafe { self.gl.delete_vertex_array(glow::NativeVertexArray(vertex_array.0)) }
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        unsafe { self.gl.bind_vertex_array(vertex_array.map(|v| glow::NativeVertexArray(v.0))) }
    }

    fn enable_vertex_attrib(&self, location: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(location) }
    }

    fn disable_vertex_attrib(&self, location: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(location) }
    }

    fn vertex_attrib_pointer(&self, location: u32, components: i32, normalized: bool) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(location, components, glow::FLOAT, normalized, 0, 0)
        }
    }

    fn vertex_attrib_4f(&self, location: u32, value: [f32; 4]) {
        unsafe { self.gl.vertex_attrib_4_f32(location, value[0], value[1], value[2], value[3]) }
    }

    fn draw_elements(&self, mode: Topology, count: i32) {
        unsafe { self.gl.draw_elements(topology(mode), count, glow::UNSIGNED_INT, 0) }
    }

    fn draw_arrays(&self, mode: Topology, count: i32) {
        unsafe { self.gl.draw_arrays(topology(mode), 0, count) }
    }

    fn create_texture(&self) -> Result<TextureId, String> {
        unsafe { self.gl.create_texture().map(|t| TextureId(t.0)) }
    }

    fn delete_texture(&self, texture: TextureId) {
        unsafe { self.gl.delete_texture(glow::NativeTexture(texture.0)) }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) }
    }

    fn bind_texture(&self, texture: Option<TextureId>) {
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, texture.map(|t| glow::NativeTexture(t.0)))
        }
    }

    fn tex_image_2d(&self, upload: &TextureUpload<'_>) {
        let format = pixel_format(upload.format);
        unsafe {
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, upload.row_align as i32);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                format as i32,
                upload.width as i32,
                upload.height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(upload.pixels))
            );
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
        }
    }

    fn tex_parameters(&self, filter: Filter, wrap: Wrap) {
        let filter = match filter {
            Filter::Nearest => glow::NEAREST,
            Filter::Linear => glow::LINEAR,
        } as i32;
        let wrap = match wrap {
            Wrap::Repeat => glow::REPEAT,
            Wrap::ClampToEdge => glow::CLAMP_TO_EDGE,
            Wrap::MirroredRepeat => glow::MIRRORED_REPEAT,
        } as i32;
        unsafe {
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap);
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { self.gl.create_shader(kind).map(|s| ShaderId(s.0)) }
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        unsafe { self.gl.shader_source(glow::NativeShader(shader.0), source) }
    }

    fn compile_shader(&self, shader: ShaderId) -> bool {
        let shader = glow::NativeShader(shader.0);
        unsafe {
            self.gl.compile_shader(shader);
            self.gl.get_shader_compile_status(shader)
        }
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        unsafe { self.gl.get_shader_info_log(glow::NativeShader(shader.0)) }
    }

    fn delete_shader(&self, shader: ShaderId) {
        unsafe { self.gl.delete_shader(glow::NativeShader(shader.0)) }
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        unsafe { self.gl.create_program().map(|p| ProgramId(p.0)) }
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe {
            self.gl.attach_shader(glow::NativeProgram(program.0), glow::NativeShader(shader.0))
        }
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe {
            self.gl.detach_shader(glow::NativeProgram(program.0), glow::NativeShader(shader.0))
        }
    }

    fn link_program(&self, program: ProgramId) -> bool {
        let program = glow::NativeProgram(program.0);
        unsafe {
            self.gl.link_program(program);
            self.gl.get_program_link_status(program)
        }
    }

    fn validate_program(&self, program: ProgramId) -> bool {
        if !gl::ValidateProgram::is_loaded() || !gl::GetProgramiv::is_loaded() {
            log::warn!("glValidateProgram unavailable, skipping program validation");
            return true;
        }
        let mut status = gl::FALSE as gl::types::GLint;
        unsafe {
            gl::ValidateProgram(program.0.get());
            gl::GetProgramiv(program.0.get(), gl::VALIDATE_STATUS, &mut status);
        }
        status == gl::TRUE as gl::types::GLint
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        unsafe { self.gl.get_program_info_log(glow::NativeProgram(program.0)) }
    }

    fn delete_program(&self, program: ProgramId) {
        unsafe { self.gl.delete_program(glow::NativeProgram(program.0)) }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        unsafe { self.gl.use_program(program.map(|p| glow::NativeProgram(p.0))) }
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        unsafe {
            self.gl
                .get_uniform_location(glow::NativeProgram(program.0), name)
                .map(|loc| UniformLocation(loc.0))
        }
    }

    fn uniform_1_i32(&self, location: UniformLocation, value: i32) {
        unsafe { self.gl.uniform_1_i32(Some(&uniform(location)), value) }
    }

    fn uniform_matrix_3(&self, location: UniformLocation, value: &Mat3x3) {
        unsafe { self.gl.uniform_matrix_3_f32_slice(Some(&uniform(location)), true, value) }
    }

    fn uniform_matrix_4(&self, location: UniformLocation, value: &Mat4x4) {
        unsafe { self.gl.uniform_matrix_4_f32_slice(Some(&uniform(location)), true, value) }
    }

    fn viewport(&self, width: u32, height: u32) {
        unsafe { self.gl.viewport(0, 0, width as i32, height as i32) }
    }

    fn clear(&self, color: [f32; 4], depth: bool) {
        let mut mask = glow::COLOR_BUFFER_BIT;
        unsafe {
            self.gl.clear_color(color[0], color[1], color[2], color[3]);
            if depth {
                self.gl.clear_depth_f32(1.0);
                mask |= glow::DEPTH_BUFFER_BIT;
            }
            self.gl.clear(mask);
        }
    }

    fn set_blending(&self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::BLEND);
                self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            } else {
                self.gl.disable(glow::BLEND);
            }
        }
    }

    fn set_blend_tint(&self, tint: Option<[f32; 4]>) {
        unsafe {
            match tint {
                Some([r, g, b, a]) => {
                    self.gl.blend_color(r, g, b, a);
                    self.gl.blend_func_separate(
                        glow::CONSTANT_COLOR,
                        glow::ONE_MINUS_SRC_ALPHA,
                        glow::CONSTANT_ALPHA,
                        glow::ONE_MINUS_SRC_ALPHA
                    );
                }
                None => self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA),
            }
        }
    }

    fn set_depth_test(&self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::DEPTH_TEST);
                self.gl.depth_func(glow::LESS);
            } else {
                self.gl.disable(glow::DEPTH_TEST);
            }
        }
    }

    fn get_error(&self) -> u32 {
        unsafe { self.gl.get_error() }
    }
}
