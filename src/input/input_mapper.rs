//! Input mapping from raw events to semantic actions
//!
//! Movement keys (WASD, Space) are not mapped here; they go straight to the
//! `PlayerController`.

use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

/// Actions triggered by special input (not movement)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Toggle pointer lock (Escape when captured, click when released)
    ToggleCursor,
    /// Exit application (Escape when not captured)
    Exit,
    /// Toggle fullscreen mode (F key)
    ToggleFullscreen,
    /// Left click while captured; dismisses click-to-continue messages
    Click,
    /// Rebuild the previous level (Left arrow, debug)
    PreviousLevel,
    /// Skip to the next level (Right arrow, debug)
    NextLevel,
    /// Restart the current level (Enter, debug)
    ManualRestart,
}

/// Maps raw input events to semantic actions
pub struct InputMapper {
    /// Level switching keys are active
    pub level_skip_keys: bool,
}

impl InputMapper {
    pub fn new(level_skip_keys: bool) -> Self {
        Self { level_skip_keys }
    }

    /// Map keyboard input to an action
    ///
    /// Returns `Some(action)` for special keys, `None` for movement keys
    pub fn map_keyboard(&self, key: KeyCode, state: ElementState, pointer_locked: bool) -> Option<InputAction> {
        if state != ElementState::Pressed {
            return None;
        }

        match key {
            KeyCode::Escape => {
                if pointer_locked {
                    Some(InputAction::ToggleCursor)
                } else {
                    Some(InputAction::Exit)
                }
            }
            KeyCode::KeyF => Some(InputAction::ToggleFullscreen),
            KeyCode::ArrowLeft if self.level_skip_keys => Some(InputAction::PreviousLevel),
            KeyCode::ArrowRight if self.level_skip_keys => Some(InputAction::NextLevel),
            KeyCode::Enter if self.level_skip_keys => Some(InputAction::ManualRestart),
            _ => None,
        }
    }

    /// Map a mouse button press
    ///
    /// A left click captures the cursor when released and counts as a click
    /// otherwise.
    pub fn map_mouse_button(&self, button: MouseButton, state: ElementState, pointer_locked: bool) -> Option<InputAction> {
        if button != MouseButton::Left || state != ElementState::Pressed {
            return None;
        }
        if pointer_locked {
            Some(InputAction::Click)
        } else {
            Some(InputAction::ToggleCursor)
        }
    }
}
