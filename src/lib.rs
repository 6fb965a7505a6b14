//! Gauntlet - a first-person obstacle course
//!
//! The game crate ties the workspace together: [`level`] builds the courses,
//! [`game`] runs the simulation and level lifecycle, [`config`] loads the
//! settings and [`systems`] holds the window and rendering plumbing used by
//! the binary.

pub mod config;
pub mod game;
pub mod input;
pub mod level;
pub mod systems;
