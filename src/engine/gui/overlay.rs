use std::collections::VecDeque;
use std::sync::Arc;

use egui_glow::EguiGlow;
use log::debug;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

const FPS_WINDOW: usize = 60;

/// Rolling frame-time average over the last 60 frames.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    frame_times: VecDeque<f32>,
    fps: f32,
}

impl FrameStats {
    pub fn new() -> Self {
        Self { frame_times: VecDeque::with_capacity(FPS_WINDOW), fps: 0.0 }
    }

    pub fn record(&mut self, delta_t: f32) {
        self.frame_times.push_back(delta_t);
        if self.frame_times.len() > FPS_WINDOW {
            self.frame_times.pop_front();
        }

        let avg_frame_time = self.frame_times.iter().sum::<f32>() / (self.frame_times.len() as f32);
        self.fps = if avg_frame_time > 0.0 { 1.0 / avg_frame_time } else { 0.0 };
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn show(&self, ctx: &egui::Context) {
        egui::Window::new("Debug Info")
            .default_pos(egui::pos2(10.0, 10.0))
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.1}", self.fps));
                if let Some(last) = self.frame_times.back() {
                    ui.label(format!("Frame: {:.2} ms", last * 1000.0));
                }
            });
    }
}

/// Immediate-mode UI drawn over the scene. `run` collects the widgets for a
/// frame and `paint` draws them, so scene drawing happens in between.
pub struct UiOverlay {
    egui: EguiGlow,
    stats: FrameStats,
}

impl UiOverlay {
    pub fn new(event_loop: &ActiveEventLoop, gl: Arc<glow::Context>) -> Self {
        debug!("creating UI overlay");
        Self {
            egui: EguiGlow::new(event_loop, gl, None, None, true),
            stats: FrameStats::new(),
        }
    }

    /// Returns true when the UI wants a repaint.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.egui.on_window_event(window, event).repaint
    }

    pub fn run(&mut self, window: &Window, delta_t: f32, mut run_ui: impl FnMut(&egui::Context)) {
        self.stats.record(delta_t);
        let stats = &self.stats;
        self.egui.run(window, |ctx| {
            stats.show(ctx);
            run_ui(ctx);
        });
    }

    pub fn paint(&mut self, window: &Window) {
        self.egui.paint(window);
    }

    /// Frees the painter's GL objects. Must run while the context is current.
    pub fn destroy(&mut self) {
        self.egui.destroy();
    }
}
