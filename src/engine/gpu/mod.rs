//! The GPU command surface used by the rendering core.
//!
//! Everything the core asks of the driver goes through [`Gpu`]. The real
//! implementation forwards to `glow`; tests use the recording mock, which
//! tracks live handles so leaks and double frees show up as assertion failures.

use std::fmt;
use std::num::NonZeroU32;

use crate::engine::utils::math::{ Mat3x3, Mat4x4 };

pub mod glow_backend;

#[cfg(test)]
pub mod mock;

pub use glow_backend::GlowGpu;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub NonZeroU32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub NonZeroU32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub NonZeroU32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub NonZeroU32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub NonZeroU32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

/// Upload usage hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Static,
    Stream,
}

/// Primitive topology of a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Texture transfer/internal format. Always unsigned bytes per component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Luminance,
    LuminanceAlpha,
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// 1 -> single channel, 2 -> dual channel, 3 -> RGB, anything else -> RGBA.
    pub fn from_channels(channels: u8) -> Self {
        match channels {
            1 => PixelFormat::Luminance,
            2 => PixelFormat::LuminanceAlpha,
            3 => PixelFormat::Rgb,
            _ => PixelFormat::Rgba,
        }
    }

    pub fn components(self) -> usize {
        match self {
            PixelFormat::Luminance => 1,
            PixelFormat::LuminanceAlpha => 2,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrap {
    #[default]
    Repeat,
    ClampToEdge,
    MirroredRepeat,
}

/// Pixel data handed to [`Gpu::tex_image_2d`] for the currently bound texture.
#[derive(Debug, Clone, Copy)]
pub struct TextureUpload<'a> {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub row_align: u8,
    pub pixels: &'a [u8],
}

/// GL error codes as returned by `glGetError`.
pub const NO_ERROR: u32 = 0;
pub const INVALID_ENUM: u32 = 0x0500;
pub const INVALID_VALUE: u32 = 0x0501;
pub const INVALID_OPERATION: u32 = 0x0502;
pub const OUT_OF_MEMORY: u32 = 0x0505;
pub const INVALID_FRAMEBUFFER_OPERATION: u32 = 0x0506;

pub fn describe_error(code: u32) -> &'static str {
    match code {
        INVALID_ENUM => "invalid enum value",
        INVALID_VALUE => "invalid argument",
        INVALID_OPERATION => "operation not allowed",
        INVALID_FRAMEBUFFER_OPERATION => "framebuffer operation not allowed",
        OUT_OF_MEMORY => "OUT OF MEMORY",
        _ => "unknown error",
    }
}

/// Thin GL surface. Every call runs on the thread that owns the context.
///
/// Texture calls act on the `TEXTURE_2D` target of the active unit. Vertex
/// attributes are tightly packed `f32` components. Matrices are row-major and
/// transposed on upload.
pub trait Gpu {
    fn create_buffer(&self) -> Result<BufferId, String>;
    fn delete_buffer(&self, buffer: BufferId);
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>);
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);

    fn create_vertex_array(&self) -> Result<VertexArrayId, String>;
    fn delete_vertex_array(&self, vertex_array: VertexArrayId);
    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>);
    fn enable_vertex_attrib(&self, location: u32);
    fn disable_vertex_attrib(&self, location: u32);
    fn vertex_attrib_pointer(&self, location: u32, components: i32, normalized: bool);
    /// Constant value read by a shader input whose attribute array is disabled.
    fn vertex_attrib_4f(&self, location: u32, value: [f32; 4]);

    /// Indexed draw over `u32` indices of the bound vertex array.
    fn draw_elements(&self, topology: Topology, count: i32);
    fn draw_arrays(&self, topology: Topology, count: i32);

    fn create_texture(&self) -> Result<TextureId, String>;
    fn delete_texture(&self, texture: TextureId);
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, texture: Option<TextureId>);
    fn tex_image_2d(&self, upload: &TextureUpload<'_>);
    fn tex_parameters(&self, filter: Filter, wrap: Wrap);

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String>;
    fn shader_source(&self, shader: ShaderId, source: &str);
    /// Compiles and returns the compile status.
    fn compile_shader(&self, shader: ShaderId) -> bool;
    fn shader_info_log(&self, shader: ShaderId) -> String;
    fn delete_shader(&self, shader: ShaderId);

    fn create_program(&self) -> Result<ProgramId, String>;
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);
    fn detach_shader(&self, program: ProgramId, shader: ShaderId);
    /// Links and returns the link status.
    fn link_program(&self, program: ProgramId) -> bool;
    /// Validates and returns the validate status.
    fn validate_program(&self, program: ProgramId) -> bool;
    fn program_info_log(&self, program: ProgramId) -> String;
    fn delete_program(&self, program: ProgramId);
    fn use_program(&self, program: Option<ProgramId>);

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn uniform_1_i32(&self, location: UniformLocation, value: i32);
    fn uniform_matrix_3(&self, location: UniformLocation, value: &Mat3x3);
    fn uniform_matrix_4(&self, location: UniformLocation, value: &Mat4x4);

    fn viewport(&self, width: u32, height: u32);
    fn clear(&self, color: [f32; 4], depth: bool);
    /// Standard non-premultiplied alpha blending.
    fn set_blending(&self, enabled: bool);
    /// Multiplies incoming fragments by `tint` in the blend stage; `None`
    /// restores plain alpha blending. Only meaningful while blending is on.
    fn set_blend_tint(&self, tint: Option<[f32; 4]>);
    fn set_depth_test(&self, enabled: bool);

    fn get_error(&self) -> u32;
}
