//! Rendering for Gauntlet
//!
//! The [`Renderer`] walks the scene graph twice per frame, once from the sun
//! to fill the shadow map and once from the player camera, and hands the
//! resulting [`DrawCall`]s to a [`RenderBackend`].
//!
//! ## Key Components
//!
//! - [`renderer::Renderer`] - Two-pass scene traversal
//! - [`renderable::Renderable`] - Per-drawable uniforms and pass membership
//! - [`backend::RenderBackend`] - Device abstraction, with a recording backend for tests
//! - [`gpu_backend::WgpuBackend`] - WGPU implementation drawing to a window
//! - [`context::RenderContext`] - WGPU device, queue, and surface management

pub mod backend;
pub mod camera;
pub mod context;
pub mod gpu_backend;
pub mod light;
pub mod pipelines;
pub mod renderable;
pub mod renderer;

pub use backend::{DrawCall, Program, RecordingBackend, RenderBackend, RenderPass, UniformSet};
pub use camera::Camera;
pub use context::{RenderContext, RenderError};
pub use gpu_backend::WgpuBackend;
pub use light::DirectionalLight;
pub use renderable::{Renderable, ViewMatrices};
pub use renderer::{release_nodes, Renderer, RendererSettings};
