//! Geometry stores: an immutable indexed mesh and a per-draw streamed one.

use std::rc::Rc;

use bytemuck::Pod;
use log::debug;

use crate::engine::error::{ Error, Result };
use crate::engine::gpu::{ BufferId, BufferTarget, BufferUsage, Gpu, Topology, VertexArrayId };

pub const POSITION_LOCATION: u32 = 0;
pub const COLOR_LOCATION: u32 = 1;
pub const UV_LOCATION: u32 = 2;

/// Borrowed vertex data for [`StaticIndexedMesh::new`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshData<'a> {
    pub indices: &'a [u32],
    pub positions: &'a [[f32; 3]],
    pub colors: Option<&'a [[f32; 3]]>,
    pub uvs: Option<&'a [[f32; 2]]>,
}

/// How a typed slice lands in a buffer object.
#[derive(Debug, Clone, Copy)]
pub struct BufferLayout {
    pub target: BufferTarget,
    pub usage: BufferUsage,
    pub components: i32,
    pub normalized: bool,
}

impl BufferLayout {
    pub const fn indices() -> Self {
        Self { target: BufferTarget::ElementArray, usage: BufferUsage::Static, components: 1, normalized: false }
    }

    pub const fn attribute(components: i32, usage: BufferUsage) -> Self {
        Self { target: BufferTarget::Array, usage, components, normalized: false }
    }
}

/// Uploads `data` into `buffer`. Array buffers are also wired to `location`
/// of the currently bound vertex array.
pub fn transfer<T: Pod>(gpu: &dyn Gpu, buffer: BufferId, layout: &BufferLayout, location: u32, data: &[T]) {
    gpu.bind_buffer(layout.target, Some(buffer));
    gpu.buffer_data(layout.target, bytemuck::cast_slice(data), layout.usage);
    if layout.target == BufferTarget::Array {
        gpu.enable_vertex_attrib(location);
        gpu.vertex_attrib_pointer(location, layout.components, layout.normalized);
    }
}

/// Handles created so far during construction. Unless released, they are
/// deleted on drop so a failed constructor leaks nothing.
struct Allocation<'a> {
    gpu: &'a dyn Gpu,
    vertex_array: VertexArrayId,
    buffers: Vec<BufferId>,
    armed: bool,
}

impl<'a> Allocation<'a> {
    fn new(gpu: &'a dyn Gpu) -> Result<Self> {
        let vertex_array = gpu.create_vertex_array().map_err(Error::resource("vertex array"))?;
        Ok(Self { gpu, vertex_array, buffers: Vec::new(), armed: true })
    }

    fn buffer(&mut self) -> Result<BufferId> {
        let buffer = self.gpu.create_buffer().map_err(Error::resource("buffer"))?;
        self.buffers.push(buffer);
        Ok(buffer)
    }

    fn release(mut self) -> VertexArrayId {
        self.armed = false;
        self.vertex_array
    }
}

impl Drop for Allocation<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.gpu.bind_vertex_array(None);
        for buffer in self.buffers.drain(..) {
            self.gpu.delete_buffer(buffer);
        }
        self.gpu.delete_vertex_array(self.vertex_array);
    }
}

fn check_len(what: &str, len: usize, expected: usize) -> Result<()> {
    if len != expected {
        return Err(Error::InvalidArgument(format!("{what} has {len} entries, expected {expected}")));
    }
    Ok(())
}

/// Indexed geometry uploaded once and drawn many times.
pub struct StaticIndexedMesh {
    gpu: Rc<dyn Gpu>,
    vertex_array: VertexArrayId,
    indices: BufferId,
    positions: BufferId,
    colors: Option<BufferId>,
    uvs: Option<BufferId>,
    index_count: i32,
}

impl StaticIndexedMesh {
    pub fn new(gpu: &Rc<dyn Gpu>, data: &MeshData<'_>) -> Result<Self> {
        let vertex_count = data.positions.len();
        if let Some(colors) = data.colors {
            check_len("colors", colors.len(), vertex_count)?;
        }
        if let Some(uvs) = data.uvs {
            check_len("uvs", uvs.len(), vertex_count)?;
        }
        if let Some(&bad) = data.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(Error::InvalidArgument(format!("index {bad} out of range for {vertex_count} vertices")));
        }
        let index_count = i32::try_from(data.indices.len())
            .map_err(|_| Error::InvalidArgument("too many indices".to_string()))?;

        let mut alloc = Allocation::new(gpu.as_ref())?;
        gpu.bind_vertex_array(Some(alloc.vertex_array));

        let positions = alloc.buffer()?;
        transfer(gpu.as_ref(), positions, &BufferLayout::attribute(3, BufferUsage::Static), POSITION_LOCATION, data.positions);

        let colors = match data.colors {
            Some(colors) => {
                let buffer = alloc.buffer()?;
                transfer(gpu.as_ref(), buffer, &BufferLayout::attribute(3, BufferUsage::Static), COLOR_LOCATION, colors);
                Some(buffer)
            }
            None => None,
        };

        let uvs = match data.uvs {
            Some(uvs) => {
                let buffer = alloc.buffer()?;
                transfer(gpu.as_ref(), buffer, &BufferLayout::attribute(2, BufferUsage::Static), UV_LOCATION, uvs);
                Some(buffer)
            }
            None => None,
        };

        // The element binding is recorded in the vertex array.
        let indices = alloc.buffer()?;
        transfer(gpu.as_ref(), indices, &BufferLayout::indices(), 0, data.indices);

        gpu.bind_vertex_array(None);
        gpu.bind_buffer(BufferTarget::Array, None);

        let vertex_array = alloc.release();

        debug!("static mesh {:?}: {} vertices, {} indices", vertex_array, vertex_count, index_count);
        Ok(Self {
            gpu: Rc::clone(gpu),
            vertex_array,
            indices,
            positions,
            colors,
            uvs,
            index_count,
        })
    }

    /// Unit square (0,0)..(1,1) on z = 0, with texture coordinates flipped so
    /// images show upright.
    pub fn unit_quad(gpu: &Rc<dyn Gpu>) -> Result<Self> {
        const POSITIONS: [[f32; 3]; 4] = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        const UVS: [[f32; 2]; 4] = [
            [0.0, 1.0],
            [1.0, 1.0],
            [1.0, 0.0],
            [0.0, 0.0],
        ];
        const INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

        Self::new(gpu, &MeshData {
            indices: &INDICES,
            positions: &POSITIONS,
            colors: None,
            uvs: Some(&UVS),
        })
    }

    pub fn index_count(&self) -> usize {
        self.index_count as usize
    }

    pub fn draw(&self, topology: Topology) {
        if self.index_count == 0 {
            return;
        }
        self.gpu.bind_vertex_array(Some(self.vertex_array));
        self.gpu.draw_elements(topology, self.index_count);
        self.gpu.bind_vertex_array(None);
    }
}

impl Drop for StaticIndexedMesh {
    fn drop(&mut self) {
        debug!("dropping static mesh {:?}", self.vertex_array);
        self.gpu.delete_buffer(self.indices);
        self.gpu.delete_buffer(self.positions);
        if let Some(colors) = self.colors {
            self.gpu.delete_buffer(colors);
        }
        if let Some(uvs) = self.uvs {
            self.gpu.delete_buffer(uvs);
        }
        self.gpu.delete_vertex_array(self.vertex_array);
    }
}

/// Non-indexed geometry re-uploaded on every draw.
pub struct StreamMesh {
    gpu: Rc<dyn Gpu>,
    vertex_array: VertexArrayId,
    positions: BufferId,
    colors: BufferId,
}

impl StreamMesh {
    pub fn new(gpu: &Rc<dyn Gpu>) -> Result<Self> {
        let mut alloc = Allocation::new(gpu.as_ref())?;
        let positions = alloc.buffer()?;
        let colors = alloc.buffer()?;
        let vertex_array = alloc.release();

        Ok(Self { gpu: Rc::clone(gpu), vertex_array, positions, colors })
    }

    /// Uploads `positions` (and per-vertex `colors` when given) and draws them.
    ///
    /// Without colors the shader reads the constant colour attribute instead.
    pub fn draw(&self, topology: Topology, positions: &[[f32; 3]], colors: Option<&[[f32; 3]]>) -> Result<()> {
        if positions.is_empty() {
            return Ok(());
        }
        if let Some(colors) = colors {
            check_len("colors", colors.len(), positions.len())?;
        }
        let count = i32::try_from(positions.len())
            .map_err(|_| Error::InvalidArgument("too many vertices".to_string()))?;

        let gpu = self.gpu.as_ref();
        let layout = BufferLayout::attribute(3, BufferUsage::Stream);
        gpu.bind_vertex_array(Some(self.vertex_array));
        transfer(gpu, self.positions, &layout, POSITION_LOCATION, positions);
        match colors {
            Some(colors) => transfer(gpu, self.colors, &layout, COLOR_LOCATION, colors),
            None => gpu.disable_vertex_attrib(COLOR_LOCATION),
        }
        gpu.draw_arrays(topology, count);
        gpu.bind_vertex_array(None);
        gpu.bind_buffer(BufferTarget::Array, None);
        Ok(())
    }
}

impl Drop for StreamMesh {
    fn drop(&mut self) {
        self.gpu.delete_buffer(self.positions);
        self.gpu.delete_buffer(self.colors);
        self.gpu.delete_vertex_array(self.vertex_array);
    }
}
