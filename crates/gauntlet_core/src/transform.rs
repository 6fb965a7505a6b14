//! 3D Transform (position, rotation, scale)
//!
//! A Transform represents the local position, rotation, and scale of a scene
//! node. Matrices are derived on demand and never cached.

use gauntlet_math::{Mat4, Quat, Vec3};
use serde::{Serialize, Deserialize};

/// A 3D transform with position, rotation, and per-axis scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position relative to the parent node
    pub position: Vec3,
    /// Rotation as a unit quaternion
    pub rotation: Quat,
    /// Scale factor per axis
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Create an identity transform (no translation, rotation, or scale change)
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Local matrix: `T * R * S`
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::compose(self.position, self.rotation, self.scale)
    }

    /// Inverse of [`Transform::matrix`]
    ///
    /// Exact for uniform scale. Zero scale components are a caller error.
    pub fn matrix_inverse(&self) -> Mat4 {
        let inv = self.inverse();
        inv.matrix()
    }

    /// Transform a point from local space to parent space
    ///
    /// Applies scale, then rotation, then translation.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation.rotate(p.component_mul(self.scale)) + self.position
    }

    /// Transform a direction (scale and rotation, no translation)
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.rotation.rotate(d.component_mul(self.scale))
    }

    /// Compute the inverse transform
    ///
    /// `transform.inverse().transform_point(transform.transform_point(p)) == p`
    /// holds whenever the scale is uniform.
    pub fn inverse(&self) -> Self {
        let inv_scale = Vec3::ONE.component_div(self.scale);
        let inv_rotation = self.rotation.inverse();
        let inv_position = inv_rotation.rotate(-self.position).component_mul(inv_scale);

        Self {
            position: inv_position,
            rotation: inv_rotation,
            scale: inv_scale,
        }
    }

    /// Translate the transform by an offset
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Apply an additional rotation on top of the current one
    pub fn rotate(&mut self, rotation: Quat) {
        self.rotation = (rotation * self.rotation).normalized();
    }

    /// Replace the rotation with `angle` radians about `axis`
    pub fn set_axis_angle(&mut self, axis: Vec3, angle: f32) {
        self.rotation = Quat::from_axis_angle(axis, angle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
    }

    fn mat_approx_eq(a: &Mat4, b: &Mat4) -> bool {
        a.0.iter().zip(b.0.iter()).all(|(x, y)| approx_eq(*x, *y))
    }

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(vec_approx_eq(p, t.transform_point(p)));
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_translation() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(vec_approx_eq(t.transform_point(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_transform_order() {
        // scale, then rotate, then translate
        let mut t = Transform::from_position_rotation(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_axis_angle(Vec3::Z, PI / 2.0),
        );
        t.scale = Vec3::splat(2.0);

        let transformed = t.transform_point(Vec3::X);
        assert!(vec_approx_eq(transformed, Vec3::new(10.0, 2.0, 0.0)),
            "Expected (10, 2, 0), got {:?}", transformed);
        assert!(vec_approx_eq(t.matrix().transform_point(Vec3::X), transformed));
    }

    #[test]
    fn test_inverse() {
        let mut t = Transform::from_position_rotation(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_axis_angle(Vec3::new(0.0, 0.6, 0.8), 0.5),
        );
        t.scale = Vec3::splat(2.0);

        let p = Vec3::new(4.0, -1.0, 0.5);
        let back = t.inverse().transform_point(t.transform_point(p));
        assert!(vec_approx_eq(back, p), "Expected {:?}, got {:?}", p, back);
    }

    #[test]
    fn test_matrix_inverse_round_trip() {
        let t = Transform::from_position_rotation(
            Vec3::new(-3.0, 7.0, 0.25),
            Quat::from_axis_angle(Vec3::Y, 1.3) * Quat::from_axis_angle(Vec3::X, -0.4),
        );
        assert!(mat_approx_eq(&(t.matrix() * t.matrix_inverse()), &Mat4::IDENTITY));
        assert!(mat_approx_eq(&(t.matrix_inverse() * t.matrix()), &Mat4::IDENTITY));
    }

    #[test]
    fn test_rotate_accumulates() {
        let mut t = Transform::identity();
        t.rotate(Quat::from_axis_angle(Vec3::Y, PI / 4.0));
        t.rotate(Quat::from_axis_angle(Vec3::Y, PI / 4.0));
        assert!(vec_approx_eq(t.transform_direction(Vec3::X), -Vec3::Z));
    }
}
