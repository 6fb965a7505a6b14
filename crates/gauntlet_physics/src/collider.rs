//! Box and sphere colliders
//!
//! A collider is attached to a scene node whose local transform equals its
//! world transform (colliders are never parented under a moving node). The
//! world-to-local matrix is cached and refreshed by [`Collider::update_matrix`]
//! after level behaviors have moved the node.

use gauntlet_core::{NodeKey, SceneGraph, Transform};
use gauntlet_math::{Mat4, Quat, Vec3};

/// Collision shape in the collider's local space
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColliderShape {
    /// Oriented box centered on the node
    Box { half_extents: Vec3 },
    /// Sphere centered on the node
    Sphere { radius: f32 },
}

impl ColliderShape {
    /// Box shape from its full size
    pub fn cuboid(size: Vec3) -> Self {
        ColliderShape::Box { half_extents: size / 2.0 }
    }

    pub fn sphere(radius: f32) -> Self {
        ColliderShape::Sphere { radius }
    }
}

/// A collider bound to a scene node
#[derive(Clone, Debug)]
pub struct Collider {
    /// Node providing the collider's transform
    pub node: NodeKey,
    pub shape: ColliderShape,
    /// World to local, as of the last refresh
    matrix_inverse: Mat4,
    rotation: Quat,
    position: Vec3,
}

impl Collider {
    /// Create a collider for `node`, caching the given transform
    pub fn new(node: NodeKey, shape: ColliderShape, transform: &Transform) -> Self {
        let mut collider = Self {
            node,
            shape,
            matrix_inverse: Mat4::IDENTITY,
            rotation: Quat::IDENTITY,
            position: Vec3::ZERO,
        };
        collider.set_transform(transform);
        collider
    }

    /// Refresh the cached matrices from the scene graph
    ///
    /// Returns false when the node no longer exists.
    pub fn update_matrix(&mut self, graph: &SceneGraph) -> bool {
        let (Some(node), Some(inverse)) = (graph.get(self.node), graph.world_to_local(self.node)) else {
            return false;
        };
        self.matrix_inverse = inverse;
        self.rotation = node.transform.rotation;
        self.position = node.transform.position;
        true
    }

    /// Refresh the cached matrices from a transform directly
    pub fn set_transform(&mut self, transform: &Transform) {
        self.matrix_inverse = transform.matrix_inverse();
        self.rotation = transform.rotation;
        self.position = transform.position;
    }

    /// Cached world-to-local matrix
    #[inline]
    pub fn matrix_inverse(&self) -> &Mat4 {
        &self.matrix_inverse
    }

    /// Cached world position
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Minimum translation pushing a sphere at `point` out of this collider
    ///
    /// `None` means the sphere does not penetrate.
    pub fn resolve_collision(&self, point: Vec3, radius: f32) -> Option<Vec3> {
        match self.shape {
            ColliderShape::Box { half_extents } => {
                let local = self.matrix_inverse.transform_point(point);
                resolve_box(half_extents, local, radius).map(|push| self.rotation.rotate(push))
            }
            ColliderShape::Sphere { radius: r } => resolve_sphere(self.position, r, point, radius),
        }
    }
}

/// Box resolution in the box's local space
///
/// Faces are tested in the order -x, +x, -y, +y, -z, +z; the first face with
/// the strictly smallest depth wins.
pub fn resolve_box(half_extents: Vec3, local: Vec3, radius: f32) -> Option<Vec3> {
    let mut min_depth = f32::INFINITY;
    let mut push = Vec3::ZERO;

    for i in 0..6 {
        let axis = i / 2;
        let sign = ((i & 1) * 2) as f32 - 1.0;
        let depth = half_extents.axis(axis) - local.axis(axis) * sign + radius;
        if depth <= 0.0 {
            return None;
        }

        if depth < min_depth {
            min_depth = depth;
            push = Vec3::ZERO;
            push.set_axis(axis, depth * sign);
        }
    }

    Some(push)
}

/// Sphere-sphere resolution in world space
///
/// Coincident centers yield a zero push.
pub fn resolve_sphere(center: Vec3, collider_radius: f32, point: Vec3, radius: f32) -> Option<Vec3> {
    let direction = point - center;
    let distance = direction.length();
    let reach = collider_radius + radius;
    if distance < reach {
        Some(direction.safe_normalized() * (reach - distance))
    } else {
        None
    }
}
