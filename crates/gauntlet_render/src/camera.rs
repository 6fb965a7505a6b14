//! Projection cameras
//!
//! A camera is a scene node plus a projection matrix. The view matrix comes
//! from the node's world-to-local matrix at render time.

use gauntlet_core::NodeKey;
use gauntlet_math::Mat4;

/// Half a degree in radians
const HALF_DEGREE: f32 = 0.00872664626;

/// Camera attached to a scene node
#[derive(Clone, Debug)]
pub struct Camera {
    pub node: NodeKey,
    pub projection: Mat4,
}

impl Camera {
    /// Camera with an identity projection
    pub fn new(node: NodeKey) -> Self {
        Self {
            node,
            projection: Mat4::IDENTITY,
        }
    }

    /// Symmetric perspective projection with a vertical field of view in degrees
    pub fn set_perspective(&mut self, fov_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.projection = perspective(fov_degrees, aspect, near, far);
    }

    /// Orthographic projection of a `width` x `height` box centered on the view axis
    pub fn set_orthographic(&mut self, width: f32, height: f32, near: f32, far: f32) {
        self.projection = orthographic(width, height, near, far);
    }
}

/// Symmetric perspective projection, vertical field of view in degrees
pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let top = near * (HALF_DEGREE * fov_degrees).tan();
    let height = 2.0 * top;
    let width = aspect * height;
    let left = -width / 2.0;
    Mat4::perspective(left, left + width, top, top - height, near, far)
}

/// Centered orthographic projection
pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Mat4 {
    let dx = width / 2.0;
    let dy = height / 2.0;
    Mat4::orthographic(-dx, dx, dy, -dy, near, far)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_math::Vec3;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_perspective_maps_near_and_far() {
        let proj = perspective(80.0, 1.5, 0.1, 200.0);
        let near = proj.transform_point(Vec3::new(0.0, 0.0, -0.1));
        let far = proj.transform_point(Vec3::new(0.0, 0.0, -200.0));
        assert!(approx_eq(near.z, -1.0));
        assert!((far.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_perspective_fov_edge() {
        // a point on the top edge of a 90 degree frustum lands on y = 1
        let proj = perspective(90.0, 1.0, 1.0, 100.0);
        let p = proj.transform_point(Vec3::new(0.0, 10.0, -10.0));
        assert!(approx_eq(p.y, 1.0));
    }

    #[test]
    fn test_orthographic_bounds() {
        let proj = orthographic(70.0, 70.0, -150.0, 150.0);
        let p = proj.transform_point(Vec3::new(35.0, -35.0, 0.0));
        assert!(approx_eq(p.x, 1.0));
        assert!(approx_eq(p.y, -1.0));
        assert!(approx_eq(p.z, 0.0));
    }

    #[test]
    fn test_camera_setters() {
        let mut camera = Camera::new(NodeKey::default());
        assert_eq!(camera.projection, Mat4::IDENTITY);
        camera.set_orthographic(4.0, 4.0, 0.01, 100.0);
        assert!(approx_eq(camera.projection.0[0], 0.5));
    }
}
