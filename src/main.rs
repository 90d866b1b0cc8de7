use std::ffi::CStr;
use std::num::NonZeroU32;
use std::rc::Rc;

use anyhow::{ anyhow, Context as _ };
use glutin::config::{ Config, ConfigTemplateBuilder };
use glutin::context::{ ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version };
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{ Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface };
use glutin_winit::{ DisplayBuilder, GlWindow };
use log::{ error, info, warn };
use raw_window_handle::HasWindowHandle;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ ActiveEventLoop, ControlFlow, EventLoop };
use winit::window::{ Window, WindowId };

use gles_demo_host::engine::config::{ AppConfig, WindowConfig };
use gles_demo_host::engine::gpu::{ Gpu, GlowGpu };
use gles_demo_host::engine::gui::UiOverlay;
use gles_demo_host::engine::logging::{ init_logging, LoggingConfig };
use gles_demo_host::engine::resources::DisplaySize;
use gles_demo_host::DemoHost;

/// Everything tied to the GL context. Fields drop top to bottom, so GPU
/// objects go before the surface and context they live in.
struct Graphics {
    ui: UiOverlay,
    host: DemoHost,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
}

impl Drop for Graphics {
    fn drop(&mut self) {
        self.ui.destroy();
    }
}

struct App {
    config: AppConfig,
    graphics: Option<Graphics>,
    error: Option<anyhow::Error>,
}

/// Prefers the config with the most samples not above `wanted`.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>, wanted: u8) -> Option<Config> {
    configs.fold(None, |best: Option<Config>, candidate| {
        let Some(current) = best else {
            return Some(candidate);
        };
        let samples = candidate.num_samples();
        let current_samples = current.num_samples();
        let better = if current_samples > wanted {
            samples < current_samples
        } else {
            samples <= wanted && samples > current_samples
        };
        Some(if better { candidate } else { current })
    })
}

fn create_graphics(event_loop: &ActiveEventLoop, config: &AppConfig) -> anyhow::Result<Graphics> {
    let WindowConfig { title, width, height, msaa_samples, resizable, debug_context, gles_major, gles_minor } =
        &config.window;

    let window_attributes = Window::default_attributes()
        .with_title(title.as_str())
        .with_inner_size(PhysicalSize::new(*width, *height))
        .with_resizable(*resizable);

    let mut template = ConfigTemplateBuilder::new().with_depth_size(24);
    if *msaa_samples > 0 {
        template = template.with_multisampling(*msaa_samples);
    }

    let (window, gl_config) = DisplayBuilder::new()
        .with_window_attributes(Some(window_attributes))
        .build(event_loop, template, |configs| {
            // glutin reports an empty config list as an error before calling us
            pick_config(configs, *msaa_samples).expect("display offered at least one GL config")
        })
        .map_err(|e| anyhow!("creating window and GL display: {e}"))?;
    let window = window.ok_or_else(|| anyhow!("no window was created"))?;
    info!("GL config with {} samples", gl_config.num_samples());

    let display = gl_config.display();
    let raw_handle = window.window_handle().context("window handle")?.as_raw();
    let context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::Gles(Some(Version::new(*gles_major, *gles_minor))))
        .with_debug(*debug_context)
        .build(Some(raw_handle));
    let not_current = unsafe { display.create_context(&gl_config, &context_attributes) }
        .context("creating GLES context")?;

    let surface_attributes = window
        .build_surface_attributes(SurfaceAttributesBuilder::default())
        .context("surface attributes")?;
    let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes) }
        .context("creating window surface")?;
    let context = not_current.make_current(&surface).context("making context current")?;

    if let Err(e) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
        warn!("vsync unavailable: {e}");
    }

    let gpu = unsafe { GlowGpu::from_loader(&|symbol: &CStr| display.get_proc_address(symbol)) };
    let ui = UiOverlay::new(event_loop, gpu.gl());

    let size = window.inner_size();
    let gpu: Rc<dyn Gpu> = Rc::new(gpu);
    let host = DemoHost::new(gpu, config, DisplaySize { width: size.width, height: size.height })
        .context("initializing renderer")?;

    window.request_redraw();
    Ok(Graphics { ui, host, surface, context, window })
}

impl App {
    fn new(config: AppConfig) -> Self {
        Self { config, graphics: None, error: None }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: anyhow::Error) {
        error!("{e:#}");
        self.error = Some(e);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        match create_graphics(event_loop, &self.config) {
            Ok(graphics) => {
                self.graphics = Some(graphics);
            }
            Err(e) => self.fail(event_loop, e.context("startup failed")),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(gfx) = self.graphics.as_mut() else {
            return;
        };

        let repaint = gfx.ui.on_window_event(&gfx.window, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
                    gfx.surface.resize(&gfx.context, w, h);
                    gfx.host.resize(size.width, size.height);
                }
                gfx.window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = gfx.host.render(&mut gfx.ui, &gfx.window) {
                    self.fail(event_loop, anyhow::Error::new(e).context("frame failed"));
                    return;
                }
                if let Err(e) = gfx.surface.swap_buffers(&gfx.context) {
                    self.fail(event_loop, anyhow::Error::new(e).context("swapping buffers"));
                    return;
                }
                if gfx.host.exit_requested() {
                    event_loop.exit();
                } else {
                    gfx.window.request_redraw();
                }
            }

            _ => {
                if repaint {
                    gfx.window.request_redraw();
                }
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        info!("shutting down");
        self.graphics = None;
    }
}

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    init_logging(LoggingConfig { filter: config.log_filter.clone(), ..Default::default() });

    let event_loop = EventLoop::new().context("creating event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
