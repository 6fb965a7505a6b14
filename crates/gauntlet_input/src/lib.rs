//! Input handling for Gauntlet
//!
//! Turns keyboard and raw mouse events into per-step [`MoveInput`] flags and
//! mouse-look rotation.
//!
//! [`MoveInput`]: gauntlet_physics::MoveInput

mod player_controller;

pub use player_controller::{LookAngles, LookControl, PlayerController, DEFAULT_MOUSE_SENSITIVITY};
