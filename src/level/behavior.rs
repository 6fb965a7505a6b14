//! Per-tick update behaviors of level objects
//!
//! A behavior is a pure function of physics time: evaluating it yields the
//! transform components it overrides, and applying that delta writes them
//! into the target node. Nothing accumulates between ticks, so a restart
//! that rewinds the clock also rewinds every moving platform.

use gauntlet_core::Transform;
use gauntlet_math::{lerp, smoothstep, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Coordinate axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit vector along the axis
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

fn default_axis() -> Axis {
    Axis::Y
}

fn default_smoothness() -> f32 {
    0.8
}

/// Transform components overridden by a behavior
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransformDelta {
    /// Replacement position coordinate per axis
    pub position: [Option<f32>; 3],
    /// Replacement rotation
    pub rotation: Option<Quat>,
}

impl TransformDelta {
    /// Override one position coordinate
    pub fn position_axis(axis: Axis, value: f32) -> Self {
        Self::default().with_position_axis(axis, value)
    }

    /// Override the rotation
    pub fn rotation(rotation: Quat) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    pub fn with_position_axis(mut self, axis: Axis, value: f32) -> Self {
        self.position[axis.index()] = Some(value);
        self
    }

    /// Write the overridden components into `transform`
    pub fn apply(&self, transform: &mut Transform) {
        for (index, value) in self.position.iter().enumerate() {
            if let Some(value) = value {
                transform.position.set_axis(index, *value);
            }
        }
        if let Some(rotation) = self.rotation {
            transform.rotation = rotation;
        }
    }

    /// True when the delta changes nothing
    pub fn is_empty(&self) -> bool {
        self.rotation.is_none() && self.position.iter().all(Option::is_none)
    }
}

/// Behavior computed by plain code
pub type CustomBehavior = fn(f32) -> TransformDelta;

/// How a level object's node moves over time
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum UpdateBehavior {
    /// Eases back and forth between `min` and `max` along one axis
    Elevator {
        min: f32,
        max: f32,
        speed: f32,
        #[serde(default)]
        time_offset: f32,
        #[serde(default = "default_axis")]
        axis: Axis,
    },
    /// Rocks between `-max_angle` and `max_angle` about one axis
    TiltingBlock {
        max_angle: f32,
        speed: f32,
        axis: Axis,
        /// Lower values hold the extremes longer
        #[serde(default = "default_smoothness")]
        smoothness: f32,
        #[serde(default)]
        time_offset: f32,
    },
    /// Constant rotation: angle is `speed * t + phase`
    Rotating {
        axis: Vec3,
        speed: f32,
        #[serde(default)]
        phase: f32,
    },
    /// Sinusoidal motion along one axis around `center`
    Sliding {
        axis: Axis,
        center: f32,
        amplitude: f32,
        speed: f32,
    },
    /// Rotation with a periodic surge: `speed * t + sin(t) * wobble + phase`
    Tumbling {
        axis: Vec3,
        speed: f32,
        wobble: f32,
        #[serde(default)]
        phase: f32,
    },
    /// Saw blade spin about the local Z axis
    SawSpin { speed: f32 },
    /// Trampoline pulse: rests at `base` and kicks up by `height`
    Bounce { base: f32, height: f32, frequency: f32 },
    /// Powerup icon spinning about Y and bobbing
    Hover {
        spin_speed: f32,
        bob_speed: f32,
        bob_height: f32,
    },
    #[serde(skip)]
    Custom(CustomBehavior),
}

impl UpdateBehavior {
    /// Elevator along Y with no phase offset
    pub fn elevator(min: f32, max: f32, speed: f32) -> Self {
        UpdateBehavior::Elevator {
            min,
            max,
            speed,
            time_offset: 0.0,
            axis: Axis::Y,
        }
    }

    /// Transform components at physics time `time`
    pub fn evaluate(&self, time: f32) -> TransformDelta {
        match *self {
            UpdateBehavior::Elevator { min, max, speed, time_offset, axis } => {
                let t = smoothstep(-0.8, 0.8, (time_offset + time * speed).cos());
                TransformDelta::position_axis(axis, lerp(min, max, t))
            }
            UpdateBehavior::TiltingBlock { max_angle, speed, axis, smoothness, time_offset } => {
                let t = smoothstep(-smoothness, smoothness, (time_offset + time * speed).cos());
                let angle = lerp(-max_angle, max_angle, t);
                TransformDelta::rotation(Quat::from_axis_angle(axis.unit(), angle))
            }
            UpdateBehavior::Rotating { axis, speed, phase } => {
                TransformDelta::rotation(Quat::from_axis_angle(axis, speed * time + phase))
            }
            UpdateBehavior::Sliding { axis, center, amplitude, speed } => {
                TransformDelta::position_axis(axis, center + (time * speed).sin() * amplitude)
            }
            UpdateBehavior::Tumbling { axis, speed, wobble, phase } => {
                let angle = speed * time + time.sin() * wobble + phase;
                TransformDelta::rotation(Quat::from_axis_angle(axis, angle))
            }
            UpdateBehavior::SawSpin { speed } => TransformDelta::rotation(Quat::from_axis_angle(Vec3::Z, time * speed)),
            UpdateBehavior::Bounce { base, height, frequency } => {
                let pulse = (1.0 - ((time * frequency).sin() * 0.5 + 0.5)).powi(10);
                TransformDelta::position_axis(Axis::Y, base + pulse * height)
            }
            UpdateBehavior::Hover { spin_speed, bob_speed, bob_height } => {
                TransformDelta::rotation(Quat::from_axis_angle(Vec3::Y, time * spin_speed))
                    .with_position_axis(Axis::Y, (time * bob_speed).sin() * bob_height)
            }
            UpdateBehavior::Custom(f) => f(time),
        }
    }
}
