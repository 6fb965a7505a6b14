//! Window management system
//!
//! Handles window creation, pointer lock, fullscreen toggle, and mirroring
//! the overlay text into the title.

use std::sync::Arc;
use winit::{
    event_loop::ActiveEventLoop,
    window::{CursorGrabMode, Fullscreen, Window},
};
use crate::config::WindowConfig;

/// Manages the application window and cursor state
pub struct WindowSystem {
    window: Arc<Window>,
    pointer_locked: bool,
    base_title: String,
}

impl WindowSystem {
    /// Create window from config
    pub fn create(
        event_loop: &ActiveEventLoop,
        config: &WindowConfig,
    ) -> Result<Self, WindowError> {
        let mut attrs = Window::default_attributes()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.width,
                config.height,
            ));

        if config.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| WindowError::CreationFailed(e.to_string()))?,
        );

        Ok(Self {
            window,
            pointer_locked: false,
            base_title: config.title.clone(),
        })
    }

    /// Window handle shared with the GPU surface
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn is_pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    /// Lock or unlock the pointer, returning whether it ends up locked
    ///
    /// Platforms without a true lock fall back to confining the cursor.
    pub fn set_pointer_lock(&mut self, locked: bool) -> bool {
        if locked == self.pointer_locked {
            return locked;
        }
        if locked {
            let grabbed = [CursorGrabMode::Locked, CursorGrabMode::Confined]
                .into_iter()
                .any(|mode| self.window.set_cursor_grab(mode).is_ok());
            if !grabbed {
                log::warn!("pointer lock unavailable");
                return false;
            }
        } else if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
            log::debug!("cursor ungrab: {}", e);
        }
        self.window.set_cursor_visible(!locked);
        self.pointer_locked = locked;
        log::debug!("pointer {}", if locked { "locked" } else { "unlocked" });
        locked
    }

    /// Switch between borderless fullscreen and windowed
    pub fn toggle_fullscreen(&self) {
        let fullscreen = match self.window.fullscreen() {
            Some(_) => None,
            None => Some(Fullscreen::Borderless(None)),
        };
        self.window.set_fullscreen(fullscreen);
    }

    /// Mirror the overlay text into the window title
    pub fn update_title(&self, overlay_summary: &str) {
        let title = format_title(&self.base_title, overlay_summary, self.pointer_locked);
        if self.window.title() != title {
            self.window.set_title(&title);
        }
    }

    /// Request a redraw
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

#[derive(Debug)]
pub enum WindowError {
    CreationFailed(String),
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::CreationFailed(msg) => write!(f, "Window creation failed: {}", msg),
        }
    }
}

impl std::error::Error for WindowError {}

/// Window title for the current overlay text and cursor state
pub fn format_title(base: &str, overlay_summary: &str, pointer_locked: bool) -> String {
    let hint = if pointer_locked { "[Esc to release]" } else { "[Click to capture]" };
    if overlay_summary.is_empty() {
        format!("{} {}", base, hint)
    } else {
        format!("{} - {} {}", base, overlay_summary, hint)
    }
}
