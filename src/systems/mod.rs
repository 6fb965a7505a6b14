//! Application systems
//!
//! Window and rendering plumbing used by the native front end.

mod render;
mod window;

pub use render::RenderSystem;
pub use window::{format_title, WindowError, WindowSystem};
