use crate::engine::utils::math::{
    mat4x4_identity,
    mat4x4_look_at,
    mat4x4_mul,
    mat4x4_perspective,
    mat4x4_scale,
    mat4x4_translate,
    vec3_add,
    Mat4x4,
    Vec3,
};

pub trait Camera {
    fn projection(&self) -> &Mat4x4;
    fn view(&self) -> &Mat4x4;
}

/// Pixel-space camera: origin at the bottom-left corner, Y up.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera2D {
    projection: Mat4x4,
    view: Mat4x4,
}

impl Camera2D {
    pub fn new(display_height: u32, display_width: u32) -> Self {
        let mut camera = Self { projection: mat4x4_identity(), view: mat4x4_identity() };
        camera.update(display_height, display_width);
        camera
    }

    /// Rebuilds both matrices for the given display size. A zero dimension
    /// (minimised window) is treated as one pixel.
    pub fn update(&mut self, display_height: u32, display_width: u32) {
        // [0, 1] -> [-1, 1], depth flattened
        self.projection = mat4x4_mul(mat4x4_translate(-1.0, -1.0, 0.0), mat4x4_scale(2.0, 2.0, 0.0));
        self.view = mat4x4_scale(
            1.0 / display_width.max(1) as f32,
            1.0 / display_height.max(1) as f32,
            1.0
        );
    }
}

impl Camera for Camera2D {
    fn projection(&self) -> &Mat4x4 {
        &self.projection
    }

    fn view(&self) -> &Mat4x4 {
        &self.view
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Perspective {
    fn default() -> Self {
        Self {
            fov_y: 60f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Perspective camera looking from `position` at the point `sight`.
///
/// Setters only store the new values; [`Camera3D::update`] rebuilds the view.
#[derive(Debug, Clone)]
pub struct Camera3D {
    position: Vec3,
    sight: Vec3,
    up: Vec3,
    perspective: Perspective,
    projection: Mat4x4,
    view: Mat4x4,
}

impl Default for Camera3D {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera3D {
    pub fn new() -> Self {
        let mut camera = Self {
            position: [0.0, 0.0, 1.0],
            sight: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            perspective: Perspective::default(),
            projection: mat4x4_identity(),
            view: mat4x4_identity(),
        };
        camera.set_perspective(Perspective::default());
        camera.update();
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn sight(&self) -> Vec3 {
        self.sight
    }

    pub fn perspective(&self) -> Perspective {
        self.perspective
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_sight(&mut self, target: Vec3) {
        self.sight = target;
    }

    /// Aims along `direction` from the current position.
    pub fn look_towards(&mut self, direction: Vec3) {
        self.sight = vec3_add(self.position, direction);
    }

    pub fn set_perspective(&mut self, perspective: Perspective) {
        self.perspective = perspective;
        self.projection = mat4x4_perspective(
            perspective.fov_y,
            perspective.aspect,
            perspective.near,
            perspective.far
        );
    }

    pub fn update(&mut self) {
        self.view = mat4x4_look_at(self.position, self.sight, self.up);
    }
}

impl Camera for Camera3D {
    fn projection(&self) -> &Mat4x4 {
        &self.projection
    }

    fn view(&self) -> &Mat4x4 {
        &self.view
    }
}
