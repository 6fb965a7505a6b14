//! First-person controller
//!
//! Controls:
//! - W/S: Forward/backward
//! - A/D: Strafe left/right
//! - Space: Jump (held)
//! - Mouse: Turn the player (yaw) and tilt the camera (pitch) while the
//!   pointer is locked

use std::f32::consts::FRAC_PI_2;

use gauntlet_math::{clamp, Quat, Vec3};
use gauntlet_physics::MoveInput;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Default radians per mouse count
pub const DEFAULT_MOUSE_SENSITIVITY: f32 = 0.002;

/// Held movement keys and pending mouse motion
#[derive(Clone, Debug)]
pub struct PlayerController {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    jump: bool,

    pointer_locked: bool,
    pending_x: f32,
    pending_y: f32,

    pub mouse_sensitivity: f32,
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerController {
    pub fn new() -> Self {
        Self {
            forward: false,
            backward: false,
            left: false,
            right: false,
            jump: false,
            pointer_locked: false,
            pending_x: 0.0,
            pending_y: 0.0,
            mouse_sensitivity: DEFAULT_MOUSE_SENSITIVITY,
        }
    }

    /// Builder: set mouse sensitivity
    pub fn with_mouse_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }

    /// Process keyboard input, returns true if the key is a movement key
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;

        match key {
            KeyCode::KeyW => { self.forward = pressed; true }
            KeyCode::KeyS => { self.backward = pressed; true }
            KeyCode::KeyA => { self.left = pressed; true }
            KeyCode::KeyD => { self.right = pressed; true }
            KeyCode::Space => { self.jump = pressed; true }
            _ => false,
        }
    }

    /// Process raw mouse movement; ignored unless the pointer is locked
    pub fn process_mouse_motion(&mut self, delta_x: f64, delta_y: f64) {
        if self.pointer_locked {
            self.pending_x += delta_x as f32;
            self.pending_y += delta_y as f32;
        }
    }

    pub fn set_pointer_locked(&mut self, locked: bool) {
        self.pointer_locked = locked;
        if !locked {
            self.pending_x = 0.0;
            self.pending_y = 0.0;
        }
    }

    #[inline]
    pub fn is_pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    /// Release every held key, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.forward = false;
        self.backward = false;
        self.left = false;
        self.right = false;
        self.jump = false;
    }

    /// Current movement flags for the physics step
    pub fn move_input(&self) -> MoveInput {
        MoveInput {
            forward: self.forward,
            backward: self.backward,
            left: self.left,
            right: self.right,
            jump: self.jump,
        }
    }

    /// Check if any movement keys are pressed
    pub fn is_moving(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    /// Apply pending mouse motion to `look` and clear it
    ///
    /// Moving the mouse right turns right (negative yaw about +Y), moving it
    /// down looks down (negative pitch about +X).
    pub fn update<L: LookControl>(&mut self, look: &mut L) {
        if self.pending_x != 0.0 || self.pending_y != 0.0 {
            look.rotate(-self.pending_x * self.mouse_sensitivity, -self.pending_y * self.mouse_sensitivity);
        }
        self.pending_x = 0.0;
        self.pending_y = 0.0;
    }
}

/// Something that can be turned by mouse look
pub trait LookControl {
    fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32);
}

/// Yaw of the player body and pitch of its camera
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LookAngles {
    pub yaw: f32,
    pub pitch: f32,
}

impl LookAngles {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw,
            pitch: clamp(pitch, -FRAC_PI_2, FRAC_PI_2),
        }
    }

    /// Rotation of the player node about +Y
    pub fn body_rotation(&self) -> Quat {
        Quat::from_axis_angle(Vec3::Y, self.yaw)
    }

    /// Rotation of the camera node about +X
    pub fn camera_rotation(&self) -> Quat {
        Quat::from_axis_angle(Vec3::X, self.pitch)
    }
}

impl LookControl for LookAngles {
    fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = clamp(self.pitch + delta_pitch, -FRAC_PI_2, FRAC_PI_2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_keys_map_to_move_input() {
        let mut controller = PlayerController::new();
        assert!(controller.process_keyboard(KeyCode::KeyW, ElementState::Pressed));
        assert!(controller.process_keyboard(KeyCode::Space, ElementState::Pressed));
        assert!(!controller.process_keyboard(KeyCode::KeyQ, ElementState::Pressed));

        let input = controller.move_input();
        assert!(input.forward && input.jump);
        assert!(!input.left && !input.right && !input.backward);
        assert!(controller.is_moving());

        controller.process_keyboard(KeyCode::KeyW, ElementState::Released);
        assert!(!controller.is_moving());
        // jump stays held until released
        assert!(controller.move_input().jump);
    }

    #[test]
    fn test_mouse_ignored_without_pointer_lock() {
        let mut controller = PlayerController::new();
        let mut look = LookAngles::default();
        controller.process_mouse_motion(100.0, 50.0);
        controller.update(&mut look);
        assert_eq!(look, LookAngles::default());
    }

    #[test]
    fn test_mouse_turns_when_locked() {
        let mut controller = PlayerController::new();
        controller.set_pointer_locked(true);
        let mut look = LookAngles::default();

        controller.process_mouse_motion(100.0, 50.0);
        controller.update(&mut look);
        assert!(approx_eq(look.yaw, -0.2));
        assert!(approx_eq(look.pitch, -0.1));

        // pending motion is consumed
        controller.update(&mut look);
        assert!(approx_eq(look.yaw, -0.2));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut look = LookAngles::default();
        look.rotate(0.0, 10.0);
        assert!(approx_eq(look.pitch, FRAC_PI_2));
        look.rotate(0.0, -20.0);
        assert!(approx_eq(look.pitch, -FRAC_PI_2));
        assert!(approx_eq(LookAngles::new(0.0, 4.0).pitch, FRAC_PI_2));
    }

    #[test]
    fn test_body_rotation_turns_forward() {
        let look = LookAngles::new(FRAC_PI_2, 0.0);
        let forward = look.body_rotation().rotate(Vec3::new(0.0, 0.0, -1.0));
        assert!(approx_eq(forward.x, -1.0));
        assert!(approx_eq(forward.z, 0.0));
    }

    #[test]
    fn test_release_all() {
        let mut controller = PlayerController::new();
        controller.process_keyboard(KeyCode::KeyD, ElementState::Pressed);
        controller.process_keyboard(KeyCode::Space, ElementState::Pressed);
        controller.release_all();
        assert_eq!(controller.move_input(), MoveInput::default());
    }
}
