use std::f32::consts::PI;

use log::{ info, warn };

use crate::engine::error::Result;
use crate::engine::gpu::{ Filter, Wrap };
use crate::engine::rendering::{
    checkpoint,
    BlitParams,
    Blitter,
    Camera2D,
    Image,
    Rect,
    RectParams,
    Texture,
    TextureOptions,
};
use crate::engine::resources::{ Frame, SharedResources };

use super::Switch;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const ORANGE: [f32; 4] = [1.0, 0.55, 0.1, 1.0];
const TEAL: [f32; 4] = [0.1, 0.75, 0.7, 1.0];
const YELLOW: [f32; 4] = [0.95, 0.85, 0.2, 1.0];

/// Sprite and primitive showcase in pixel coordinates.
pub struct Scene2D {
    camera: Camera2D,
    blitter: Blitter,
    texture: Texture,
    angle: f32,
    spin_speed: f32,
    starts: u32,
    frames: u64,
}

impl Scene2D {
    pub fn new(res: &SharedResources) -> Result<Self> {
        let path = &res.assets().debug_texture;
        let image = Image::from_file(path).unwrap_or_else(|e| {
            warn!("{e}; using the placeholder texture");
            Image::checker()
        });
        let options = TextureOptions { filter: Filter::Nearest, wrap: Wrap::ClampToEdge };
        let texture = Texture::with_options(res.gpu(), &image, options)?;

        Ok(Self {
            camera: Camera2D::new(1, 1),
            blitter: res.blitter()?,
            texture,
            angle: 0.0,
            spin_speed: PI / 4.0,
            starts: 0,
            frames: 0,
        })
    }

    pub fn start(&mut self) {
        self.starts += 1;
        info!("2D scene active (activation {})", self.starts);
    }

    pub fn starts(&self) -> u32 {
        self.starts
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn update(&mut self, ctx: &egui::Context, frame: &Frame, res: &SharedResources) -> Result<Option<Switch>> {
        self.frames += 1;
        self.angle = (self.angle + self.spin_speed * frame.delta_t) % (2.0 * PI);
        self.camera.update(frame.display.height, frame.display.width);

        self.draw(frame)?;
        checkpoint(res.gpu().as_ref(), "2D scene")?;

        let mut switch = None;
        egui::Window::new("2D scene")
            .default_pos(egui::pos2(10.0, 120.0))
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Activations: {}", self.starts));
                let (w, h) = self.texture.size();
                ui.label(format!("Texture: {w}x{h}"));
                ui.add(egui::Slider::new(&mut self.spin_speed, -2.0 * PI..=2.0 * PI).text("rad/s"));
                if ui.button("Menu").clicked() {
                    switch = Some(Switch::Menu);
                }
            });
        Ok(switch)
    }

    fn draw(&self, frame: &Frame) -> Result<()> {
        let w = frame.display.width as f32;
        let h = frame.display.height as f32;
        let [tw, th] = self.texture.dimensions();
        let b = &self.blitter;

        b.begin(&self.camera);

        b.blit(&self.texture, [20.0, 20.0]);
        b.blit_ex(&self.texture, &BlitParams {
            pos: [w * 0.5 - 64.0, h * 0.5 - 64.0],
            dim: Some([128.0, 128.0]),
            angle: self.angle,
            ..Default::default()
        });
        b.blit_ex(&self.texture, &BlitParams {
            src: Some(Rect::new(0.0, 0.0, tw * 0.5, th * 0.5)),
            pos: [w - 148.0, 20.0],
            dim: Some([128.0, 128.0]),
            tint: Some(TEAL),
            ..Default::default()
        });

        b.fill_rect(Rect::new(w * 0.25 - 40.0, h * 0.75 - 20.0, 80.0, 40.0), -self.angle, ORANGE);
        b.stroke_rect(Rect::new(w * 0.5 - 80.0, h * 0.5 - 80.0, 160.0, 160.0), WHITE)?;
        b.stroke_rect_ex(&RectParams {
            rect: Rect::new(w * 0.25 - 30.0, h * 0.25 - 30.0, 60.0, 60.0),
            angle: self.angle,
            pivot: Some([0.0, 0.0]),
        }, ORANGE)?;
        b.polyline(&[[20.0, h - 20.0], [120.0, h - 80.0], [220.0, h - 20.0], [320.0, h - 80.0]], false, YELLOW)?;
        b.polygon(&[[w - 200.0, h - 40.0], [w - 120.0, h - 40.0], [w - 100.0, h - 120.0], [w - 220.0, h - 120.0]], TEAL)?;
        b.points(&[[w * 0.5, 30.0], [w * 0.5 + 10.0, 30.0], [w * 0.5 + 20.0, 30.0]], WHITE)?;
        b.circle([w * 0.75, h * 0.75], 60.0, YELLOW)?;
        b.disc([w * 0.75, h * 0.25], 40.0 + 10.0 * self.angle.sin(), TEAL)?;
        Ok(())
    }
}
