//! 3D Mathematics Library
//!
//! This crate provides the vector, rotation and matrix types shared by the
//! Gauntlet crates.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components
//! - [`Quat`] - unit quaternion rotation
//! - [`Mat3`] - column-major 3x3 matrix (normal transforms)
//! - [`Mat4`] - column-major 4x4 matrix for transformations and projections
//!
//! ## Helpers
//!
//! - [`lerp`], [`clamp`], [`smoothstep`] - scalar interpolation
//! - [`Mulberry32`] - seeded pseudo-random generator

mod vec3;
mod quat;
pub mod mat3;
pub mod mat4;
pub mod scalar;
pub mod rng;

pub use vec3::Vec3;
pub use quat::Quat;
pub use mat3::Mat3;
pub use mat4::Mat4;
pub use scalar::{clamp, lerp, smoothstep};
pub use rng::Mulberry32;
