//! Row-major matrix helpers. Matrices are transposed when uploaded as uniforms.

pub type Mat4x4 = [f32; 16];
pub type Mat3x3 = [f32; 9];
pub type Vec3 = [f32; 3];

pub fn mat4x4_identity() -> Mat4x4 {
    [
      1.0, 0.0, 0.0, 0.0,
      0.0, 1.0, 0.0, 0.0,
      0.0, 0.0, 1.0, 0.0,
      0.0, 0.0, 0.0, 1.0
    ]
}

pub fn mat4x4_translate(x: f32, y: f32, z: f32) -> Mat4x4 {
    [
      1.0, 0.0, 0.0,  x,
      0.0, 1.0, 0.0,  y,
      0.0, 0.0, 1.0,  z,
      0.0, 0.0, 0.0, 1.0
    ]
}

pub fn mat4x4_rot_x(angle: f32) -> Mat4x4 {
    let c = angle.cos();
    let s = angle.sin();

    [
      1.0, 0.0, 0.0, 0.0,
      0.0,  c,  -s,  0.0,
      0.0,  s,   c,  0.0,
      0.0, 0.0, 0.0, 1.0
    ]
}

pub fn mat4x4_rot_y(angle: f32) -> Mat4x4 {
    let c = angle.cos();
    let s = angle.sin();

    [
       c,  0.0,  s,  0.0,
      0.0, 1.0, 0.0, 0.0,
      -s,  0.0,  c,  0.0,
      0.0, 0.0, 0.0, 1.0
    ]
}

/// Counter-clockwise rotation in the XY plane (Y up).
pub fn mat4x4_rot_z(angle: f32) -> Mat4x4 {
    let c = angle.cos();
    let s = angle.sin();

    [
       c,  -s,  0.0, 0.0,
       s,   c,  0.0, 0.0,
      0.0, 0.0, 1.0, 0.0,
      0.0, 0.0, 0.0, 1.0
    ]
}

pub fn mat4x4_scale(x: f32, y: f32, z: f32) -> Mat4x4 {
    [
       x,  0.0, 0.0, 0.0,
      0.0,  y,  0.0, 0.0,
      0.0, 0.0,  z,  0.0,
      0.0, 0.0, 0.0, 1.0
    ]
}

pub fn vec4_dot(a: [f32; 4], b: [f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

pub fn mat4x4_row(mat: &Mat4x4, row: usize) -> [f32; 4] {
    let start_idx = row * 4;
    [mat[start_idx], mat[start_idx + 1], mat[start_idx + 2], mat[start_idx + 3]]
}

pub fn mat4x4_col(mat: &Mat4x4, col: usize) -> [f32; 4] {
    [mat[col], mat[4 + col], mat[8 + col], mat[12 + col]]
}

pub fn mat4x4_mul(a: Mat4x4, b: Mat4x4) -> Mat4x4 {
    let mut ret = [0.0; 16];
    for (i, cell) in ret.iter_mut().enumerate() {
        let row = i / 4;
        let col = i % 4;
        *cell = vec4_dot(mat4x4_row(&a, row), mat4x4_col(&b, col));
    }
    ret
}

/// Applies `mat` to the point `p` (w = 1), with perspective divide.
pub fn mat4x4_transform_point(mat: &Mat4x4, p: Vec3) -> Vec3 {
    let v = [p[0], p[1], p[2], 1.0];
    let x = vec4_dot(mat4x4_row(mat, 0), v);
    let y = vec4_dot(mat4x4_row(mat, 1), v);
    let z = vec4_dot(mat4x4_row(mat, 2), v);
    let w = vec4_dot(mat4x4_row(mat, 3), v);
    if w != 0.0 && w != 1.0 {
        [x / w, y / w, z / w]
    } else {
        [x, y, z]
    }
}

pub fn mat4x4_perspective(fov_y_radians: f32, aspect_ratio: f32, near: f32, far: f32) -> Mat4x4 {
    let f = 1.0 / (fov_y_radians * 0.5).tan();
    let range_inv = 1.0 / (near - far);

    [
        f / aspect_ratio, 0.0, 0.0,                          0.0,
        0.0,              f,   0.0,                          0.0,
        0.0,              0.0, (near + far) * range_inv,     (2.0 * near * far) * range_inv,
        0.0,              0.0, -1.0,                         0.0,
    ]
}

/// Right-handed view matrix looking from `eye` at the point `target`.
pub fn mat4x4_look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4x4 {
    let forward = vec3_normalize(vec3_sub(target, eye));
    let right = vec3_normalize(vec3_cross(forward, up));
    let up = vec3_cross(right, forward);

    [
        right[0],    right[1],    right[2],    -vec3_dot(right, eye),
        up[0],       up[1],       up[2],       -vec3_dot(up, eye),
        -forward[0], -forward[1], -forward[2], vec3_dot(forward, eye),
        0.0,         0.0,         0.0,         1.0,
    ]
}

pub fn mat3x3_identity() -> Mat3x3 {
    [
      1.0, 0.0, 0.0,
      0.0, 1.0, 0.0,
      0.0, 0.0, 1.0
    ]
}

/// Scale then translate, on homogeneous 2D coordinates.
pub fn mat3x3_scale_translate(sx: f32, sy: f32, tx: f32, ty: f32) -> Mat3x3 {
    [
       sx, 0.0,  tx,
      0.0,  sy,  ty,
      0.0, 0.0, 1.0
    ]
}

pub fn mat3x3_transform_point(mat: &Mat3x3, p: [f32; 2]) -> [f32; 2] {
    [
        mat[0] * p[0] + mat[1] * p[1] + mat[2],
        mat[3] * p[0] + mat[4] * p[1] + mat[5],
    ]
}

pub fn vec3_add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn vec3_sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn vec3_dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn vec3_cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn vec3_normalize(v: Vec3) -> Vec3 {
    let len = vec3_dot(v, v).sqrt();
    if len > f32::EPSILON {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn identity_is_neutral_for_mul() {
        let m = mat4x4_translate(1.0, 2.0, 3.0);
        assert_eq!(mat4x4_mul(mat4x4_identity(), m), m);
        assert_eq!(mat4x4_mul(m, mat4x4_identity()), m);
    }

    #[test]
    fn mul_applies_right_operand_first() {
        let m = mat4x4_mul(mat4x4_translate(10.0, 0.0, 0.0), mat4x4_scale(2.0, 2.0, 2.0));
        assert!(close(mat4x4_transform_point(&m, [1.0, 1.0, 0.0]), [12.0, 2.0, 0.0]));
    }

    #[test]
    fn rot_z_is_counter_clockwise() {
        let m = mat4x4_rot_z(std::f32::consts::FRAC_PI_2);
        assert!(close(mat4x4_transform_point(&m, [1.0, 0.0, 0.0]), [0.0, 1.0, 0.0]));
    }

    #[test]
    fn look_at_puts_target_on_negative_z() {
        let view = mat4x4_look_at([0.0, 0.0, 5.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert!(close(mat4x4_transform_point(&view, [0.0, 0.0, 0.0]), [0.0, 0.0, -5.0]));

        let view = mat4x4_look_at([3.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert!(close(mat4x4_transform_point(&view, [0.0, 0.0, 0.0]), [0.0, 0.0, -3.0]));
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let proj = mat4x4_perspective(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
        let near = mat4x4_transform_point(&proj, [0.0, 0.0, -0.1]);
        let far = mat4x4_transform_point(&proj, [0.0, 0.0, -100.0]);
        assert!((near[2] + 1.0).abs() < 1e-4);
        assert!((far[2] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn mat3_scale_translate_maps_unit_square() {
        let m = mat3x3_scale_translate(0.5, 0.25, 0.5, 0.0);
        assert_eq!(mat3x3_transform_point(&m, [0.0, 0.0]), [0.5, 0.0]);
        assert_eq!(mat3x3_transform_point(&m, [1.0, 1.0]), [1.0, 0.25]);
    }
}
