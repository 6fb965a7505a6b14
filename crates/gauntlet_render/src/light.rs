//! Directional light with an orthographic shadow camera
//!
//! The shadow frustum follows the player: every frame it is centered on a
//! point a fixed distance in front of the camera and looks along the light
//! direction.

use gauntlet_core::Transform;
use gauntlet_math::{Mat4, Vec3};

use crate::camera::orthographic;

/// Near plane of the shadow frustum
pub const SHADOW_NEAR: f32 = -150.0;
/// Far plane of the shadow frustum
pub const SHADOW_FAR: f32 = 150.0;
/// Largest shadow map edge
pub const MAX_SHADOW_RESOLUTION: u32 = 2048;

/// Sun light
#[derive(Clone, Debug)]
pub struct DirectionalLight {
    /// Position; the light shines from here towards `target`
    pub transform: Transform,
    pub target: Vec3,
    pub projection: Mat4,
    /// Light projection times light view, refreshed by [`DirectionalLight::prepare`]
    pub depth_mvp: Mat4,
    /// Shadow map edge length in texels
    pub resolution: u32,
}

impl DirectionalLight {
    /// Light with a `size` x `size` shadow area and the default position (0, 1, 1)
    pub fn new(size: f32, max_texture_size: u32) -> Self {
        Self::with_range(size, SHADOW_NEAR, SHADOW_FAR, max_texture_size.min(MAX_SHADOW_RESOLUTION))
    }

    /// Light with explicit depth range and shadow map resolution
    pub fn with_range(size: f32, near: f32, far: f32, resolution: u32) -> Self {
        Self {
            transform: Transform::from_position(Vec3::new(0.0, 1.0, 1.0)),
            target: Vec3::ZERO,
            projection: orthographic(size, size, near, far),
            depth_mvp: Mat4::IDENTITY,
            resolution,
        }
    }

    /// Direction from the target towards the light
    pub fn direction(&self) -> Vec3 {
        (self.transform.position - self.target).normalized()
    }

    /// Fit the shadow frustum around a point `distance` in front of the camera
    pub fn prepare(&mut self, camera_world: &Mat4, distance: f32) {
        let direction = self.direction();
        let center = camera_world.transform_point(Vec3::new(0.0, 0.0, -distance));
        let view = Mat4::look_at(center + direction, center, Vec3::Y);
        self.depth_mvp = self.projection * view;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_resolution_is_capped() {
        assert_eq!(DirectionalLight::new(70.0, 16384).resolution, 2048);
        assert_eq!(DirectionalLight::new(70.0, 1024).resolution, 1024);
    }

    #[test]
    fn test_default_direction() {
        let light = DirectionalLight::new(70.0, 4096);
        let d = light.direction();
        assert!(vec_approx_eq(d, Vec3::new(0.0, 1.0, 1.0).normalized()));
    }

    #[test]
    fn test_prepare_centers_frustum_ahead_of_camera() {
        let mut light = DirectionalLight::new(70.0, 4096);
        let camera_world = Mat4::from_translation(Vec3::new(5.0, 2.0, 0.0));
        light.prepare(&camera_world, 35.0);

        // the point 35 units ahead of the camera projects to the shadow map center
        let center = light.depth_mvp.transform_point(Vec3::new(5.0, 2.0, -35.0));
        assert!(center.x.abs() < EPSILON);
        assert!(center.y.abs() < EPSILON);
    }
}
