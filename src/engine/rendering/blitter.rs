//! 2D drawing on top of the shared renderer, in pixel coordinates.

use std::f32::consts::TAU;
use std::rc::Rc;

use crate::engine::error::Result;
use crate::engine::gpu::{ Gpu, Topology };
use crate::engine::utils::math::{
    mat3x3_identity,
    mat3x3_scale_translate,
    mat4x4_identity,
    mat4x4_mul,
    mat4x4_rot_z,
    mat4x4_scale,
    mat4x4_transform_point,
    mat4x4_translate,
    Mat3x3,
    Mat4x4,
};

use super::camera::Camera2D;
use super::mesh::{ StaticIndexedMesh, StreamMesh };
use super::renderer::Renderer;
use super::texture::Texture;

pub const MIN_CIRCLE_SEGMENTS: usize = 5;
const MAX_CIRCLE_SEGMENTS: usize = 1024;
const CIRCLE_DETAIL: f32 = 10.0;

pub type Color = [f32; 4];

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Options for [`Blitter::blit_ex`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlitParams {
    /// Sub-rectangle of the texture in pixels, top-left origin. Whole texture when `None`.
    pub src: Option<Rect>,
    pub pos: [f32; 2],
    /// On-screen size. Defaults to the size of `src`, or of the texture.
    pub dim: Option<[f32; 2]>,
    /// Counter-clockwise, in radians.
    pub angle: f32,
    /// Rotation centre relative to `pos`. Defaults to the middle of the quad.
    pub pivot: Option<[f32; 2]>,
    /// Multiplies the sampled colour in the blend stage. Texels are not
    /// weighted by their own alpha while tinted.
    pub tint: Option<Color>,
}

/// Options for [`Blitter::fill_rect_ex`] and [`Blitter::stroke_rect_ex`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectParams {
    pub rect: Rect,
    /// Counter-clockwise, in radians.
    pub angle: f32,
    /// Rotation centre relative to the rect's origin corner. Defaults to its middle.
    pub pivot: Option<[f32; 2]>,
}

impl RectParams {
    pub fn model(&self) -> Mat4x4 {
        let Rect { x, y, w, h } = self.rect;
        let pivot = self.pivot.unwrap_or([w * 0.5, h * 0.5]);
        quad_model([x, y], [w, h], self.angle, pivot)
    }
}

/// Model matrix placing the unit quad at `pos` with size `dim`, rotated by
/// `angle` around `pos + pivot`.
pub fn quad_model(pos: [f32; 2], dim: [f32; 2], angle: f32, pivot: [f32; 2]) -> Mat4x4 {
    let mut model = mat4x4_translate(pos[0], pos[1], 0.0);
    if angle != 0.0 {
        model = mat4x4_mul(model, mat4x4_translate(pivot[0], pivot[1], 0.0));
        model = mat4x4_mul(model, mat4x4_rot_z(angle));
        model = mat4x4_mul(model, mat4x4_translate(-pivot[0], -pivot[1], 0.0));
    }
    mat4x4_mul(model, mat4x4_scale(dim[0], dim[1], 1.0))
}

/// Maps quad texture coordinates onto `src` inside a `width` x `height` texture.
pub fn texture_transform(src: Rect, width: f32, height: f32) -> Mat3x3 {
    mat3x3_scale_translate(src.w / width, src.h / height, src.x / width, src.y / height)
}

/// Corners of the rect after rotation, counter-clockwise from the origin corner.
pub fn rect_outline(params: &RectParams) -> [[f32; 3]; 4] {
    let model = params.model();
    [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]].map(|[u, v]| mat4x4_transform_point(&model, [u, v, 0.0]))
}

/// Segments used to tessellate a circle: `ceil(ln(r - 3) * 10 + 5)`, never
/// below [`MIN_CIRCLE_SEGMENTS`].
pub fn circle_segments(radius: f32) -> usize {
    if radius.is_nan() || radius <= 4.0 {
        return MIN_CIRCLE_SEGMENTS;
    }
    let segments = ((radius - 3.0).ln() * CIRCLE_DETAIL + 5.0).ceil();
    (segments as usize).clamp(MIN_CIRCLE_SEGMENTS, MAX_CIRCLE_SEGMENTS)
}

/// Rim of a circle, counter-clockwise from angle 0.
pub fn circle_vertices(center: [f32; 2], radius: f32) -> Vec<[f32; 3]> {
    let segments = circle_segments(radius);
    (0..segments)
        .map(|i| {
            let theta = (i as f32 / segments as f32) * TAU;
            [center[0] + radius * theta.cos(), center[1] + radius * theta.sin(), 0.0]
        })
        .collect()
}

/// Triangle fan for a filled circle: centre, rim, then the first rim vertex again.
pub fn disc_vertices(center: [f32; 2], radius: f32) -> Vec<[f32; 3]> {
    let rim = circle_vertices(center, radius);
    let mut fan = Vec::with_capacity(rim.len() + 2);
    fan.push([center[0], center[1], 0.0]);
    fan.extend_from_slice(&rim);
    fan.push(rim[0]);
    fan
}

fn lift(points: &[[f32; 2]]) -> Vec<[f32; 3]> {
    points.iter().map(|p| [p[0], p[1], 0.0]).collect()
}

pub struct Blitter {
    gpu: Rc<dyn Gpu>,
    renderer: Rc<Renderer>,
    quad: Rc<StaticIndexedMesh>,
    stream: StreamMesh,
}

impl Blitter {
    pub fn new(gpu: &Rc<dyn Gpu>, renderer: Rc<Renderer>, quad: Rc<StaticIndexedMesh>) -> Result<Self> {
        Ok(Self {
            gpu: Rc::clone(gpu),
            renderer,
            quad,
            stream: StreamMesh::new(gpu)?,
        })
    }

    /// Activates the program with `camera` and sets 2D draw state.
    pub fn begin(&self, camera: &Camera2D) {
        self.gpu.set_depth_test(false);
        self.gpu.set_blending(true);
        self.renderer.use_program();
        self.renderer.set_camera(camera);
    }

    pub fn blit(&self, texture: &Texture, pos: [f32; 2]) {
        self.blit_ex(texture, &BlitParams { pos, ..Default::default() });
    }

    pub fn blit_ex(&self, texture: &Texture, params: &BlitParams) {
        let [tex_w, tex_h] = texture.dimensions();
        let dim = params.dim
            .or(params.src.map(|src| [src.w, src.h]))
            .unwrap_or([tex_w, tex_h]);
        let pivot = params.pivot.unwrap_or([dim[0] * 0.5, dim[1] * 0.5]);
        let tex_m3 = params.src
            .map(|src| texture_transform(src, tex_w, tex_h))
            .unwrap_or_else(mat3x3_identity);

        self.renderer.set_model(&quad_model(params.pos, dim, params.angle, pivot));
        self.renderer.set_has_texture(true);
        self.renderer.set_texture_transform(&tex_m3);
        texture.bind(0);
        if params.tint.is_some() {
            self.gpu.set_blend_tint(params.tint);
        }
        self.quad.draw(Topology::Triangles);
        if params.tint.is_some() {
            self.gpu.set_blend_tint(None);
        }
        texture.unbind();
    }

    /// Filled rect rotated around its centre.
    pub fn fill_rect(&self, rect: Rect, angle: f32, color: Color) {
        self.fill_rect_ex(&RectParams { rect, angle, pivot: None }, color);
    }

    pub fn fill_rect_ex(&self, params: &RectParams, color: Color) {
        self.renderer.set_model(&params.model());
        self.renderer.set_has_texture(false);
        self.renderer.set_tint(color);
        self.quad.draw(Topology::Triangles);
    }

    pub fn stroke_rect(&self, rect: Rect, color: Color) -> Result<()> {
        self.stroke_rect_ex(&RectParams { rect, ..Default::default() }, color)
    }

    pub fn stroke_rect_ex(&self, params: &RectParams, color: Color) -> Result<()> {
        self.stream(&rect_outline(params), Topology::LineLoop, color)
    }

    pub fn polyline(&self, points: &[[f32; 2]], closed: bool, color: Color) -> Result<()> {
        let topology = if closed { Topology::LineLoop } else { Topology::LineStrip };
        self.stream(&lift(points), topology, color)
    }

    /// Filled convex polygon.
    pub fn polygon(&self, points: &[[f32; 2]], color: Color) -> Result<()> {
        self.stream(&lift(points), Topology::TriangleFan, color)
    }

    pub fn points(&self, points: &[[f32; 2]], color: Color) -> Result<()> {
        self.stream(&lift(points), Topology::Points, color)
    }

    pub fn circle(&self, center: [f32; 2], radius: f32, color: Color) -> Result<()> {
        self.stream(&circle_vertices(center, radius), Topology::LineLoop, color)
    }

    pub fn disc(&self, center: [f32; 2], radius: f32, color: Color) -> Result<()> {
        self.stream(&disc_vertices(center, radius), Topology::TriangleFan, color)
    }

    /// Draws arbitrary pixel-space vertices with one colour.
    pub fn stream(&self, vertices: &[[f32; 3]], topology: Topology, color: Color) -> Result<()> {
        let identity: Mat4x4 = mat4x4_identity();
        self.renderer.set_model(&identity);
        self.renderer.set_has_texture(false);
        self.renderer.set_tint(color);
        self.stream.draw(topology, vertices, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    use crate::engine::gpu::mock::{ Call, RecordingGpu };
    use crate::engine::rendering::renderer::VERTEX_SHADER;
    use crate::engine::rendering::texture::Image;
    use crate::engine::utils::math::mat3x3_transform_point;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    fn blitter() -> (Rc<RecordingGpu>, Rc<dyn Gpu>, Blitter) {
        let recording = Rc::new(RecordingGpu::new());
        let gpu: Rc<dyn Gpu> = recording.clone();
        let renderer = Rc::new(Renderer::new(&gpu).unwrap());
        let quad = Rc::new(StaticIndexedMesh::unit_quad(&gpu).unwrap());
        let blitter = Blitter::new(&gpu, renderer, quad).unwrap();
        (recording, gpu, blitter)
    }

    #[test]
    fn unrotated_quad_spans_pos_to_pos_plus_dim() {
        let model = quad_model([10.0, 20.0], [64.0, 32.0], 0.0, [32.0, 16.0]);
        assert!(close(mat4x4_transform_point(&model, [0.0, 0.0, 0.0]), [10.0, 20.0, 0.0]));
        assert!(close(mat4x4_transform_point(&model, [1.0, 1.0, 0.0]), [74.0, 52.0, 0.0]));
    }

    #[test]
    fn rotation_keeps_the_pivot_fixed() {
        let model = quad_model([100.0, 100.0], [40.0, 20.0], 1.2, [20.0, 10.0]);
        assert!(close(mat4x4_transform_point(&model, [0.5, 0.5, 0.0]), [120.0, 110.0, 0.0]));

        let half_turn = quad_model([0.0, 0.0], [10.0, 10.0], std::f32::consts::PI, [5.0, 5.0]);
        assert!(close(mat4x4_transform_point(&half_turn, [0.0, 0.0, 0.0]), [10.0, 10.0, 0.0]));
    }

    #[test]
    fn texture_transform_selects_the_source_rect() {
        let m = texture_transform(Rect::new(16.0, 0.0, 16.0, 8.0), 64.0, 32.0);
        assert_eq!(mat3x3_transform_point(&m, [0.0, 0.0]), [0.25, 0.0]);
        assert_eq!(mat3x3_transform_point(&m, [1.0, 1.0]), [0.5, 0.25]);
    }

    #[test]
    fn circle_segments_grow_with_radius() {
        for r in [-1.0, 0.0, 1.0, 3.0, 3.5, 4.0, f32::NAN] {
            assert_eq!(circle_segments(r), MIN_CIRCLE_SEGMENTS, "radius {r}");
        }
        let mut previous = MIN_CIRCLE_SEGMENTS;
        for step in 0..2000 {
            let r = 3.0 + step as f32 * 0.5;
            let segments = circle_segments(r);
            assert!(segments >= previous, "radius {r}");
            assert!(segments >= MIN_CIRCLE_SEGMENTS);
            previous = segments;
        }
        assert_eq!(circle_segments(13.0), 29);
        assert_eq!(circle_segments(f32::INFINITY), MAX_CIRCLE_SEGMENTS);
    }

    #[test]
    fn disc_fan_is_closed() {
        let fan = disc_vertices([5.0, 5.0], 50.0);
        assert_eq!(fan.len(), circle_segments(50.0) + 2);
        assert_eq!(fan[0], [5.0, 5.0, 0.0]);
        assert_eq!(fan[1], fan[fan.len() - 1]);
    }

    #[test]
    fn blit_draws_the_quad_and_unbinds() {
        let (recording, gpu, blitter) = blitter();
        let texture = Texture::new(&gpu, &Image::checker()).unwrap();
        recording.clear_calls();

        blitter.blit(&texture, [10.0, 20.0]);

        assert_eq!(recording.draw_calls(), vec![Call::DrawElements { topology: Topology::Triangles, count: 6 }]);
        assert_eq!(recording.bound_texture(), None);
        let model = recording.calls().into_iter().find_map(|c| match c {
            Call::UniformMatrix4 { value, .. } => Some(value),
            _ => None,
        });
        let model = model.expect("model matrix uploaded");
        assert!(close(mat4x4_transform_point(&model, [0.0, 0.0, 0.0]), [10.0, 20.0, 0.0]));
        assert!(close(mat4x4_transform_point(&model, [1.0, 1.0, 0.0]), [14.0, 24.0, 0.0]));
    }

    #[test]
    fn shapes_stream_with_a_constant_tint() {
        let (recording, _gpu, blitter) = blitter();
        recording.clear_calls();
        let red = [1.0, 0.0, 0.0, 1.0];

        blitter.disc([50.0, 50.0], 20.0, red).unwrap();
        blitter.stroke_rect(Rect::new(0.0, 0.0, 10.0, 10.0), red).unwrap();
        blitter.polyline(&[[0.0, 0.0], [5.0, 5.0]], false, red).unwrap();
        blitter.points(&[], red).unwrap();

        assert_eq!(recording.draw_calls(), vec![
            Call::DrawArrays { topology: Topology::TriangleFan, count: circle_segments(20.0) as i32 + 2 },
            Call::DrawArrays { topology: Topology::LineLoop, count: 4 },
            Call::DrawArrays { topology: Topology::LineStrip, count: 2 },
        ]);
        assert!(recording.calls().contains(&Call::VertexAttrib4f { location: 1, value: red }));
    }

    #[test]
    fn tinted_blit_restores_plain_blending() {
        let (recording, gpu, blitter) = blitter();
        let texture = Texture::new(&gpu, &Image::checker()).unwrap();
        let tint = [1.0, 0.5, 0.25, 1.0];
        recording.clear_calls();

        blitter.blit_ex(&texture, &BlitParams { pos: [5.0, 5.0], tint: Some(tint), ..Default::default() });

        let calls: Vec<Call> = recording
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::BlendTint(_) | Call::DrawElements { .. }))
            .collect();
        assert_eq!(calls, vec![
            Call::BlendTint(Some(tint)),
            Call::DrawElements { topology: Topology::Triangles, count: 6 },
            Call::BlendTint(None),
        ]);

        recording.clear_calls();
        blitter.blit(&texture, [5.0, 5.0]);
        assert!(!recording.calls().iter().any(|c| matches!(c, Call::BlendTint(_))));
    }

    #[test]
    fn rect_rotates_around_an_explicit_pivot() {
        let params = RectParams {
            rect: Rect::new(10.0, 10.0, 20.0, 10.0),
            angle: FRAC_PI_2,
            pivot: Some([0.0, 0.0]),
        };
        let outline = rect_outline(&params);
        assert!(close(outline[0], [10.0, 10.0, 0.0]));
        assert!(close(outline[1], [10.0, 30.0, 0.0]));
        assert!(close(outline[2], [0.0, 30.0, 0.0]));
        assert!(close(outline[3], [0.0, 10.0, 0.0]));

        let centred = rect_outline(&RectParams { pivot: None, ..params });
        assert!(close(centred[0], [25.0, 5.0, 0.0]));

        let (recording, _gpu, blitter) = blitter();
        recording.clear_calls();
        blitter.fill_rect_ex(&params, [1.0; 4]);
        let model = recording.calls().into_iter().find_map(|c| match c {
            Call::UniformMatrix4 { value, .. } => Some(value),
            _ => None,
        });
        let model = model.expect("model matrix uploaded");
        assert!(close(mat4x4_transform_point(&model, [1.0, 0.0, 0.0]), [10.0, 30.0, 0.0]));
    }

    #[test]
    fn points_are_drawn_at_a_fixed_size() {
        let (recording, _gpu, blitter) = blitter();
        recording.clear_calls();

        blitter.points(&[[1.0, 1.0]], [1.0; 4]).unwrap();

        assert_eq!(recording.draw_calls(), vec![Call::DrawArrays { topology: Topology::Points, count: 1 }]);
        assert!(VERTEX_SHADER.contains("gl_PointSize = 5.0;"));
    }
}
