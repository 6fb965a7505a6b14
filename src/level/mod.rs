//! Level content
//!
//! A level is a set of [`LevelObject`]s hanging off the scene root, a spawn
//! point and a light position. Objects are assembled by the [`LevelBuilder`]
//! either from the built-in level functions in [`levels`] or from RON
//! [`LevelTemplate`] files.

pub mod assets;
pub mod behavior;
pub mod builder;
pub mod hazards;
pub mod levels;
pub mod template;

use std::fmt;

use gauntlet_core::{NodeKey, SceneGraph};
use gauntlet_math::Vec3;

pub use assets::LevelAssets;
pub use behavior::{Axis, TransformDelta, UpdateBehavior};
pub use builder::{LevelBuilder, LevelMaterial, ObjectId};
pub use template::{LevelTemplate, ObjectTemplate};

/// Obstacles that kill the player on contact
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hazard {
    SawBlade,
    Spikes,
}

/// Temporary player upgrades
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PowerupKind {
    SpeedBoost,
    HighJump,
}

impl PowerupKind {
    /// Name shown on the powerup bar
    pub fn label(self) -> &'static str {
        match self {
            PowerupKind::SpeedBoost => "Speed boost",
            PowerupKind::HighJump => "High jump",
        }
    }
}

/// Effect of a trigger volume touching the player
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerAction {
    Hazard(Hazard),
    Trampoline,
    Powerup(PowerupKind),
    Finish,
}

/// A behavior driving one node of an object
#[derive(Clone, Debug)]
pub struct BoundBehavior {
    pub node: NodeKey,
    pub behavior: UpdateBehavior,
}

/// Root node of one level object plus the behaviors animating it
#[derive(Clone, Debug)]
pub struct LevelObject {
    pub root: NodeKey,
    pub behaviors: Vec<BoundBehavior>,
}

impl LevelObject {
    pub fn new(root: NodeKey) -> Self {
        Self {
            root,
            behaviors: Vec::new(),
        }
    }

    /// Objects with behaviors need their colliders refreshed every tick
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        !self.behaviors.is_empty()
    }

    /// Evaluate every behavior at physics time `time` and write the results
    /// into the scene graph
    pub fn update(&self, graph: &mut SceneGraph, time: f32) {
        for bound in &self.behaviors {
            if let Some(transform) = graph.transform_mut(bound.node) {
                bound.behavior.evaluate(time).apply(transform);
            }
        }
    }
}

/// A constructed level
#[derive(Clone, Debug)]
pub struct Level {
    pub name: String,
    pub objects: Vec<LevelObject>,
    pub spawn_position: Vec3,
    /// Player yaw at spawn, radians about +Y
    pub spawn_yaw: f32,
    /// Sun position; the light looks from here at the origin
    pub light_position: Vec3,
}

impl Level {
    /// Number of scene nodes owned by the level
    pub fn node_count(&self, graph: &SceneGraph) -> usize {
        self.objects.iter().map(|o| graph.subtree(o.root).len()).sum()
    }
}

/// Errors from loading or building levels
#[derive(Debug)]
pub enum LevelError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Serialize(ron::Error),
    /// No level with this index
    UnknownLevel(usize),
    /// A level directory without any level files
    Empty,
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io(e) => write!(f, "failed to read level: {}", e),
            LevelError::Parse(e) => write!(f, "failed to parse level: {}", e),
            LevelError::Serialize(e) => write!(f, "failed to serialize level: {}", e),
            LevelError::UnknownLevel(index) => write!(f, "no level with index {}", index),
            LevelError::Empty => write!(f, "no levels found"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Io(e) => Some(e),
            LevelError::Parse(e) => Some(e),
            LevelError::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::Io(e)
    }
}

impl From<ron::error::SpannedError> for LevelError {
    fn from(e: ron::error::SpannedError) -> Self {
        LevelError::Parse(e)
    }
}

impl From<ron::Error> for LevelError {
    fn from(e: ron::Error) -> Self {
        LevelError::Serialize(e)
    }
}
