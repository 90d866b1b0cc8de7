use std::rc::Rc;

use log::info;

use crate::engine::error::Result;
use crate::engine::gpu::Topology;
use crate::engine::rendering::{
    checkpoint,
    Camera3D,
    MeshData,
    Perspective,
    Renderer,
    StaticIndexedMesh,
};
use crate::engine::resources::{ Frame, SharedResources };
use crate::engine::utils::math::{ mat4x4_mul, mat4x4_rot_x, mat4x4_rot_y };

use super::Switch;

#[rustfmt::skip]
const CUBE_POSITIONS: [[f32; 3]; 8] = [
    [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
    [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
];

#[rustfmt::skip]
const CUBE_COLORS: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0],
];

#[rustfmt::skip]
const CUBE_INDICES: [u32; 36] = [
    4, 5, 6, 4, 6, 7, // front
    1, 0, 3, 1, 3, 2, // back
    0, 4, 7, 0, 7, 3, // left
    5, 1, 2, 5, 2, 6, // right
    7, 6, 2, 7, 2, 3, // top
    0, 1, 5, 0, 5, 4, // bottom
];

/// Colour cube under an orbiting perspective camera.
pub struct Scene3D {
    camera: Camera3D,
    renderer: Rc<Renderer>,
    cube: StaticIndexedMesh,
    distance: f32,
    fov_degrees: f32,
    orbit: f32,
    spin: bool,
    tumble: f32,
    starts: u32,
}

impl Scene3D {
    pub fn new(res: &SharedResources) -> Result<Self> {
        let cube = StaticIndexedMesh::new(res.gpu(), &MeshData {
            indices: &CUBE_INDICES,
            positions: &CUBE_POSITIONS,
            colors: Some(&CUBE_COLORS),
            uvs: None,
        })?;

        Ok(Self {
            camera: Camera3D::new(),
            renderer: res.renderer(),
            cube,
            distance: 4.0,
            fov_degrees: Perspective::default().fov_y.to_degrees(),
            orbit: 0.0,
            spin: true,
            tumble: 0.0,
            starts: 0,
        })
    }

    pub fn start(&mut self) {
        self.starts += 1;
        info!("3D scene active (activation {})", self.starts);
    }

    pub fn starts(&self) -> u32 {
        self.starts
    }

    pub fn camera(&self) -> &Camera3D {
        &self.camera
    }

    pub fn update(&mut self, ctx: &egui::Context, frame: &Frame, res: &SharedResources) -> Result<Option<Switch>> {
        if self.spin {
            self.orbit += 0.5 * frame.delta_t;
            self.tumble += 0.8 * frame.delta_t;
        }

        self.camera.set_perspective(Perspective {
            fov_y: self.fov_degrees.to_radians(),
            aspect: frame.display.aspect(),
            ..Perspective::default()
        });
        self.camera.set_position([
            self.distance * self.orbit.sin(),
            self.distance * 0.5,
            self.distance * self.orbit.cos(),
        ]);
        self.camera.set_sight([0.0, 0.0, 0.0]);
        self.camera.update();

        let gpu = res.gpu();
        gpu.set_blending(false);
        gpu.set_depth_test(true);
        self.renderer.use_program();
        self.renderer.set_camera(&self.camera);
        self.renderer.set_has_texture(false);
        self.renderer.set_model(&mat4x4_mul(mat4x4_rot_y(self.tumble), mat4x4_rot_x(self.tumble * 0.5)));
        self.cube.draw(Topology::Triangles);
        gpu.set_depth_test(false);
        checkpoint(gpu.as_ref(), "3D scene")?;

        let mut switch = None;
        egui::Window::new("3D scene")
            .default_pos(egui::pos2(10.0, 120.0))
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Activations: {}", self.starts));
                ui.add(egui::Slider::new(&mut self.distance, 1.5..=20.0).text("distance"));
                ui.add(egui::Slider::new(&mut self.fov_degrees, 20.0..=120.0).text("fov"));
                ui.checkbox(&mut self.spin, "Spin");
                if ui.button("Menu").clicked() {
                    switch = Some(Switch::Menu);
                }
            });
        Ok(switch)
    }
}
