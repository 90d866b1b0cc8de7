use std::rc::Rc;

use once_cell::unsync::OnceCell;

use crate::engine::config::AssetsConfig;
use crate::engine::error::Result;
use crate::engine::gpu::Gpu;
use crate::engine::rendering::{ Blitter, Renderer, StaticIndexedMesh };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl DisplaySize {
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Per-frame inputs handed to the active context.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    /// Seconds since the previous frame.
    pub delta_t: f32,
    pub display: DisplaySize,
}

/// GPU objects shared by every scene. Owned by the frame driver and passed down.
pub struct SharedResources {
    gpu: Rc<dyn Gpu>,
    renderer: Rc<Renderer>,
    quad: OnceCell<Rc<StaticIndexedMesh>>,
    assets: AssetsConfig,
}

impl SharedResources {
    pub fn new(gpu: Rc<dyn Gpu>, assets: AssetsConfig) -> Result<Self> {
        let renderer = Rc::new(Renderer::new(&gpu)?);
        Ok(Self { gpu, renderer, quad: OnceCell::new(), assets })
    }

    pub fn gpu(&self) -> &Rc<dyn Gpu> {
        &self.gpu
    }

    pub fn renderer(&self) -> Rc<Renderer> {
        Rc::clone(&self.renderer)
    }

    pub fn assets(&self) -> &AssetsConfig {
        &self.assets
    }

    /// The unit quad, created on first use.
    pub fn unit_quad(&self) -> Result<Rc<StaticIndexedMesh>> {
        self.quad
            .get_or_try_init(|| StaticIndexedMesh::unit_quad(&self.gpu).map(Rc::new))
            .cloned()
    }

    pub fn blitter(&self) -> Result<Blitter> {
        Blitter::new(&self.gpu, self.renderer(), self.unit_quad()?)
    }
}
