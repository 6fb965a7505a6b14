//! Physics for Gauntlet
//!
//! This crate provides the collision and movement side of the game:
//! - Box and sphere colliders attached to scene nodes
//! - Trigger volumes with caller-defined actions
//! - Player sphere movement with ground detection
//! - A fixed-timestep clock

pub mod collider;
pub mod collider_set;
pub mod config;
pub mod player;
pub mod timestep;
pub mod trigger;

// Re-export commonly used types
pub use collider::{Collider, ColliderShape};
pub use collider_set::ColliderSet;
pub use config::PhysicsConfig;
pub use player::{Boosts, MoveInput, PlayerPhysics};
pub use timestep::FixedTimestep;
pub use trigger::{Trigger, TriggerHit, TriggerSet};
