//! Core types for Gauntlet
//!
//! This crate provides the foundational types for building levels:
//!
//! - [`Transform`] - Position, rotation, and scale of a node
//! - [`SceneGraph`] - Arena of [`SceneNode`]s addressed by [`NodeKey`]
//! - [`Geometry`] - Indexed triangle data with builders in [`geometry`]
//! - [`Material`] - Surface properties of a mesh
//! - [`Drawable`] - Render capability of a node (mesh, sprite, sky, lava)

mod transform;
mod scene_graph;
pub mod geometry;
mod material;
pub mod drawable;

pub use transform::Transform;
pub use scene_graph::{NodeKey, SceneGraph, SceneGraphError, SceneNode};
pub use geometry::{Geometry, GeometryId};
pub use material::{Material, TextureHandle, TextureSet, TextureSlot};
pub use drawable::{Drawable, Lava, Mesh, Skybox, Sprite};

// Re-export commonly used types from gauntlet_math for convenience
pub use gauntlet_math::{Mat3, Mat4, Quat, Vec3};
