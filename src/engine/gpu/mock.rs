//! Recording [`Gpu`] for tests: hands out handles, tracks which are alive,
//! and keeps a log of the state-changing calls.

use std::cell::{ Cell, RefCell };
use std::collections::{ HashMap, HashSet };

use super::*;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    BufferData { target: BufferTarget, bytes: usize, usage: BufferUsage },
    DrawElements { topology: Topology, count: i32 },
    DrawArrays { topology: Topology, count: i32 },
    TexImage { format: PixelFormat, width: u32, height: u32, row_align: u8 },
    TexParameters { filter: Filter, wrap: Wrap },
    VertexAttrib4f { location: u32, value: [f32; 4] },
    Uniform1i { location: UniformLocation, value: i32 },
    UniformMatrix3 { location: UniformLocation, value: Mat3x3 },
    UniformMatrix4 { location: UniformLocation, value: Mat4x4 },
    UseProgram(Option<ProgramId>),
    BlendTint(Option<[f32; 4]>),
}

#[derive(Default)]
struct State {
    next_id: u32,
    buffers: HashSet<BufferId>,
    vertex_arrays: HashSet<VertexArrayId>,
    textures: HashSet<TextureId>,
    shaders: HashMap<ShaderId, String>,
    programs: HashMap<ProgramId, Vec<String>>,
    attached: HashMap<ProgramId, Vec<ShaderId>>,
    bound_texture: Option<TextureId>,
    bound_vertex_array: Option<VertexArrayId>,
    calls: Vec<Call>,
}

impl State {
    fn next(&mut self) -> NonZeroU32 {
        self.next_id += 1;
        NonZeroU32::new(self.next_id).unwrap()
    }
}

/// Shader sources containing `#error` fail to compile, like a real driver.
#[derive(Default)]
pub struct RecordingGpu {
    state: RefCell<State>,
    pub fail_link: Cell<bool>,
    /// Buffers that may still be created before `create_buffer` starts failing.
    pub buffer_budget: Cell<Option<usize>>,
    pub fail_texture_creation: Cell<bool>,
    pub pending_error: Cell<u32>,
}

impl RecordingGpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_handles(&self) -> usize {
        self.live_buffers() +
            self.live_vertex_arrays() +
            self.live_textures() +
            self.live_shaders() +
            self.live_programs()
    }

    pub fn bound_texture(&self) -> Option<TextureId> {
        self.state.borrow().bound_texture
    }

    pub fn bound_vertex_array(&self) -> Option<VertexArrayId> {
        self.state.borrow().bound_vertex_array
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn draw_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::DrawElements { .. } | Call::DrawArrays { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

/// `uniform <type> <name>;` declarations, precision qualifiers allowed.
fn declares_uniform(source: &str, name: &str) -> bool {
    source
        .split(';')
        .filter(|decl| decl.split_whitespace().any(|token| token == "uniform"))
        .any(|decl| decl.split_whitespace().last() == Some(name))
}

impl Gpu for RecordingGpu {
    fn create_buffer(&self) -> Result<BufferId, String> {
        match self.buffer_budget.get() {
            Some(0) => return Err("out of buffer names".to_string()),
            Some(left) => self.buffer_budget.set(Some(left - 1)),
            None => {}
        }
        let mut state = self.state.borrow_mut();
        let id = BufferId(state.next());
        state.buffers.insert(id);
        Ok(id)
    }

    fn delete_buffer(&self, buffer: BufferId) {
        assert!(self.state.borrow_mut().buffers.remove(&buffer), "double free of {buffer:?}");
    }

    fn bind_buffer(&self, _target: BufferTarget, _buffer: Option<BufferId>) {}

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        self.record(Call::BufferData { target, bytes: data.len(), usage });
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        let mut state = self.state.borrow_mut();
        let id = VertexArrayId(state.next());
        state.vertex_arrays.insert(id);
        Ok(id)
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        assert!(
            self.state.borrow_mut().vertex_arrays.remove(&vertex_array),
            "double free of {vertex_array:?}"
        );
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        self.state.borrow_mut().bound_vertex_array = vertex_array;
    }

    fn enable_vertex_attrib(&self, _location: u32) {}

    fn disable_vertex_attrib(&self, _location: u32) {}

    fn vertex_attrib_pointer(&self, _location: u32, _components: i32, _normalized: bool) {}

    fn vertex_attrib_4f(&self, location: u32, value: [f32; 4]) {
        self.record(Call::VertexAttrib4f { location, value });
    }

    fn draw_elements(&self, topology: Topology, count: i32) {
        assert!(self.bound_vertex_array().is_some(), "indexed draw without a vertex array");
        self.record(Call::DrawElements { topology, count });
    }

    fn draw_arrays(&self, topology: Topology, count: i32) {
        self.record(Call::DrawArrays { topology, count });
    }

    fn create_texture(&self) -> Result<TextureId, String> {
        if self.fail_texture_creation.get() {
            return Err("out of texture names".to_string());
        }
        let mut state = self.state.borrow_mut();
        let id = TextureId(state.next());
        state.textures.insert(id);
        Ok(id)
    }

    fn delete_texture(&self, texture: TextureId) {
        assert!(self.state.borrow_mut().textures.remove(&texture), "double free of {texture:?}");
    }

    fn active_texture(&self, _unit: u32) {}

    fn bind_texture(&self, texture: Option<TextureId>) {
        self.state.borrow_mut().bound_texture = texture;
    }

    fn tex_image_2d(&self, upload: &TextureUpload<'_>) {
        assert!(self.bound_texture().is_some(), "upload without a bound texture");
        self.record(Call::TexImage {
            format: upload.format,
            width: upload.width,
            height: upload.height,
            row_align: upload.row_align,
        });
    }

    fn tex_parameters(&self, filter: Filter, wrap: Wrap) {
        self.record(Call::TexParameters { filter, wrap });
    }

    fn create_shader(&self, _stage: ShaderStage) -> Result<ShaderId, String> {
        let mut state = self.state.borrow_mut();
        let id = ShaderId(state.next());
        state.shaders.insert(id, String::new());
        Ok(id)
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        if let Some(slot) = self.state.borrow_mut().shaders.get_mut(&shader) {
            *slot = source.to_string();
        }
    }

    fn compile_shader(&self, shader: ShaderId) -> bool {
        !self.state
            .borrow()
            .shaders.get(&shader)
            .is_some_and(|src| src.contains("#error"))
    }

    fn shader_info_log(&self, _shader: ShaderId) -> String {
        "0:1: '#error' : compilation terminated".to_string()
    }

    fn delete_shader(&self, shader: ShaderId) {
        assert!(
            self.state.borrow_mut().shaders.remove(&shader).is_some(),
            "double free of {shader:?}"
        );
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        let mut state = self.state.borrow_mut();
        let id = ProgramId(state.next());
        state.programs.insert(id, Vec::new());
        Ok(id)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        self.state.borrow_mut().attached.entry(program).or_default().push(shader);
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        if let Some(list) = self.state.borrow_mut().attached.get_mut(&program) {
            list.retain(|s| *s != shader);
        }
    }

    fn link_program(&self, program: ProgramId) -> bool {
        if self.fail_link.get() {
            return false;
        }
        let mut state = self.state.borrow_mut();
        let sources: Vec<String> = state.attached
            .get(&program)
            .map(|list| {
                list.iter()
                    .filter_map(|s| state.shaders.get(s).cloned())
                    .collect()
            })
            .unwrap_or_default();
        state.programs.insert(program, sources);
        true
    }

    fn validate_program(&self, _program: ProgramId) -> bool {
        true
    }

    fn program_info_log(&self, _program: ProgramId) -> String {
        "error: vertex shader output not read by fragment shader".to_string()
    }

    fn delete_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        assert!(state.programs.remove(&program).is_some(), "double free of {program:?}");
        state.attached.remove(&program);
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.record(Call::UseProgram(program));
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let state = self.state.borrow();
        let sources = state.programs.get(&program)?;
        sources
            .iter()
            .any(|src| declares_uniform(src, name))
            .then(|| {
                // Stable per-name location, good enough to tell uniforms apart.
                let location = name.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
                UniformLocation(location)
            })
    }

    fn uniform_1_i32(&self, location: UniformLocation, value: i32) {
        self.record(Call::Uniform1i { location, value });
    }

    fn uniform_matrix_3(&self, location: UniformLocation, value: &Mat3x3) {
        self.record(Call::UniformMatrix3 { location, value: *value });
    }

    fn uniform_matrix_4(&self, location: UniformLocation, value: &Mat4x4) {
        self.record(Call::UniformMatrix4 { location, value: *value });
    }

    fn viewport(&self, _width: u32, _height: u32) {}

    fn clear(&self, _color: [f32; 4], _depth: bool) {}

    fn set_blending(&self, _enabled: bool) {}

    fn set_blend_tint(&self, tint: Option<[f32; 4]>) {
        self.record(Call::BlendTint(tint));
    }

    fn set_depth_test(&self, _enabled: bool) {}

    fn get_error(&self) -> u32 {
        self.pending_error.replace(NO_ERROR)
    }
}
