//! Physics tuning constants

use serde::{Serialize, Deserialize};

/// Configuration for the player simulation
///
/// Velocities are in units per step, accelerations in units per step per
/// second.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fixed steps per second
    pub tick_rate: f64,
    /// Cap on steps run in one rendered frame
    pub max_steps_per_frame: u32,
    /// Vertical acceleration (negative = down)
    pub gravity: f32,
    /// Lowest vertical velocity
    pub terminal_velocity: f32,
    pub jump_velocity: f32,
    pub high_jump_velocity: f32,
    pub player_radius: f32,
    pub walk_speed: f32,
    pub boosted_speed: f32,
    /// Airborne acceleration is the ground acceleration divided by this
    pub air_control_divisor: f32,
    pub max_speed: f32,
    pub boosted_max_speed: f32,
    /// Lerp factor easing the speed cap towards its target each step
    pub max_speed_smoothing: f32,
    pub ground_deceleration: f32,
    pub air_deceleration: f32,
    /// Pushes whose direction has a larger Y component count as ground
    pub ground_cosine: f32,
    /// Seconds a powerup lasts
    pub powerup_duration: f32,
    /// Vertical velocity set by trampolines
    pub trampoline_velocity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.001,
            max_steps_per_frame: 5,
            gravity: -0.3,
            terminal_velocity: -0.5,
            jump_velocity: 0.1,
            high_jump_velocity: 0.3,
            player_radius: 0.4,
            walk_speed: 1.0,
            boosted_speed: 3.0,
            air_control_divisor: 8.0,
            max_speed: 0.08,
            boosted_max_speed: 0.2,
            max_speed_smoothing: 0.1,
            ground_deceleration: 10.0,
            air_deceleration: 1.0,
            ground_cosine: 0.1,
            powerup_duration: 5.0,
            trampoline_velocity: 0.3,
        }
    }
}

impl PhysicsConfig {
    /// Length of one fixed step in seconds
    #[inline]
    pub fn step(&self) -> f64 {
        1.0 / self.tick_rate
    }
}
