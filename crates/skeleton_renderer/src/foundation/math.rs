//! Math utilities and types
//!
//! Provides the fundamental math types used for 2D skeleton rendering.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix2, Matrix4,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 2x2 matrix type (bone rotation/scale/shear)
pub type Mat2 = Matrix2<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create an off-center orthographic projection
    ///
    /// Maps `left..right` to `-1..1` on X, `bottom..top` to `-1..1` on Y and
    /// uses the `z_near / (z_near - z_far)` depth mapping. Passing
    /// `top = 0, bottom = height` produces a y-down screen space.
    fn orthographic_off_center(left: f32, right: f32, bottom: f32, top: f32, z_near: f32, z_far: f32) -> Mat4;

    /// Create the default 2D view: camera at `z = 1` looking at the origin, Y up
    fn view_2d() -> Mat4;

    /// Column-major array layout for uniform upload
    fn to_cols_array_2d(&self) -> [[f32; 4]; 4];
}

impl Mat4Ext for Mat4 {
    fn orthographic_off_center(left: f32, right: f32, bottom: f32, top: f32, z_near: f32, z_far: f32) -> Mat4 {
        let mut result = Mat4::identity();

        result[(0, 0)] = 2.0 / (right - left);
        result[(1, 1)] = 2.0 / (top - bottom);
        result[(2, 2)] = 1.0 / (z_near - z_far);
        result[(0, 3)] = (left + right) / (left - right);
        result[(1, 3)] = (top + bottom) / (bottom - top);
        result[(2, 3)] = z_near / (z_near - z_far);

        result
    }

    fn view_2d() -> Mat4 {
        Mat4::look_at_rh(
            &Point3::new(0.0, 0.0, 1.0),
            &Point3::origin(),
            &Vec3::y(),
        )
    }

    fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        let mut out = [[0.0; 4]; 4];
        for (col, column) in out.iter_mut().enumerate() {
            for (row, value) in column.iter_mut().enumerate() {
                *value = self[(row, col)];
            }
        }
        out
    }
}
