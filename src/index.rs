//! Frame driver: owns the shared GPU resources and the context holder, and
//! brackets every frame between clearing and UI painting.

use std::rc::Rc;
use std::time::Instant;

use log::{ debug, info };
use winit::window::Window;

use crate::engine::config::AppConfig;
use crate::engine::error::Result;
use crate::engine::gpu::Gpu;
use crate::engine::gui::UiOverlay;
use crate::engine::resources::{ DisplaySize, Frame, SharedResources };
use crate::game::{ ActiveContext, ContextHolder, Switch };

pub struct DemoHost {
    resources: SharedResources,
    holder: ContextHolder,
    display: DisplaySize,
    clear_color: [f32; 4],
    last_frame: Instant,
}

impl DemoHost {
    pub fn new(gpu: Rc<dyn Gpu>, config: &AppConfig, display: DisplaySize) -> Result<Self> {
        gpu.viewport(display.width, display.height);
        let resources = SharedResources::new(gpu, config.assets.clone())?;
        info!("demo host ready at {}x{}", display.width, display.height);

        Ok(Self {
            resources,
            holder: ContextHolder::new(),
            display,
            clear_color: config.clear_color,
            last_frame: Instant::now(),
        })
    }

    pub fn display(&self) -> DisplaySize {
        self.display
    }

    pub fn active(&self) -> ActiveContext {
        self.holder.active()
    }

    pub fn exit_requested(&self) -> bool {
        self.holder.exit_requested()
    }

    pub fn request(&mut self, switch: Switch) {
        self.holder.switch(switch, &self.resources);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        debug!("resize to {}x{}", width, height);
        self.display = DisplaySize { width, height };
        self.resources.gpu().viewport(width, height);
    }

    /// Measures the frame time and clears the framebuffer.
    pub fn begin_frame(&mut self) -> Frame {
        let now = Instant::now();
        let delta_t = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.resources.gpu().clear(self.clear_color, true);
        Frame { delta_t, display: self.display }
    }

    /// Runs the active context for one frame inside an egui pass.
    pub fn step(&mut self, ctx: &egui::Context, frame: &Frame) -> Result<()> {
        self.holder.loop_run(ctx, frame, &self.resources)
    }

    pub fn render(&mut self, ui: &mut UiOverlay, window: &Window) -> Result<()> {
        let frame = self.begin_frame();
        let mut result = Ok(());
        ui.run(window, frame.delta_t, |ctx| {
            if result.is_ok() {
                result = self.step(ctx, &frame);
            }
        });
        ui.paint(window);
        result
    }
}
