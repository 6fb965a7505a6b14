//! HUD state
//!
//! The overlay is a plain sink: the game writes texts, visibility and
//! classes into it and the front end presents whatever it holds.

use bitflags::bitflags;

use crate::level::PowerupKind;

bitflags! {
    /// Screen-wide effects
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct OverlayClass: u8 {
        /// Dark tint while a death message is up
        const DEAD = 1 << 0;
        /// Red tint after burning in lava
        const LAVA = 1 << 1;
        /// Fade back in while respawning
        const RESPAWN = 1 << 2;
    }
}

/// One line of overlay text
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub text: String,
    /// Faded in
    pub visible: bool,
    /// Takes part in the layout at all
    pub displayed: bool,
}

impl Default for TextLine {
    fn default() -> Self {
        Self {
            text: String::new(),
            visible: false,
            displayed: true,
        }
    }
}

impl TextLine {
    /// Shown only when both faded in and laid out
    pub fn is_shown(&self) -> bool {
        self.visible && self.displayed && !self.text.is_empty()
    }
}

/// Remaining-time bar of the active powerup
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PowerupBar {
    pub opacity: f32,
    /// Remaining fraction in `[0, 1]`
    pub fill: f32,
    pub label: String,
}

/// Everything drawn on top of the 3D view
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overlay {
    pub classes: OverlayClass,
    pub headline: TextLine,
    pub subtext: TextLine,
    pub powerup: PowerupBar,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: OverlayClass) {
        self.classes.insert(class);
    }

    pub fn remove_class(&mut self, class: OverlayClass) {
        self.classes.remove(class);
    }

    pub fn has_class(&self, class: OverlayClass) -> bool {
        self.classes.contains(class)
    }

    /// Set both texts, hidden, with the subtext laid out
    pub fn set_texts(&mut self, headline: impl Into<String>, subtext: impl Into<String>) {
        self.headline.text = headline.into();
        self.subtext.text = subtext.into();
        self.subtext.displayed = true;
    }

    pub fn hide_texts(&mut self) {
        self.headline.visible = false;
        self.subtext.visible = false;
    }

    /// Show the powerup bar with `remaining` of `duration` seconds left
    pub fn show_powerup(&mut self, kind: PowerupKind, remaining: f32, duration: f32) {
        self.powerup.opacity = 1.0;
        self.powerup.fill = if duration > 0.0 {
            (remaining / duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.powerup.label = format!("{} - {:.1}", kind.label(), remaining);
    }

    pub fn hide_powerup(&mut self) {
        self.powerup.opacity = 0.0;
    }

    /// One-line description of what is currently shown
    pub fn summary(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if self.headline.is_shown() {
            parts.push(&self.headline.text);
        }
        if self.subtext.is_shown() {
            parts.push(&self.subtext.text);
        }
        if self.powerup.opacity > 0.0 {
            parts.push(&self.powerup.label);
        }
        parts
            .iter()
            .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes() {
        let mut overlay = Overlay::new();
        overlay.add_class(OverlayClass::DEAD | OverlayClass::LAVA);
        assert!(overlay.has_class(OverlayClass::LAVA));
        overlay.remove_class(OverlayClass::DEAD | OverlayClass::LAVA);
        assert!(overlay.classes.is_empty());
    }

    #[test]
    fn test_powerup_bar_label() {
        let mut overlay = Overlay::new();
        overlay.show_powerup(PowerupKind::SpeedBoost, 2.54, 5.0);
        assert_eq!(overlay.powerup.label, "Speed boost - 2.5");
        assert!((overlay.powerup.fill - 0.508).abs() < 0.0001);
        overlay.hide_powerup();
        assert_eq!(overlay.powerup.opacity, 0.0);
    }

    #[test]
    fn test_summary_only_lists_shown_text() {
        let mut overlay = Overlay::new();
        overlay.set_texts("You burned in lava", "Sigh...");
        assert_eq!(overlay.summary(), "");

        overlay.headline.visible = true;
        assert_eq!(overlay.summary(), "You burned in lava");

        overlay.subtext.visible = true;
        overlay.subtext.displayed = false;
        assert_eq!(overlay.summary(), "You burned in lava");

        overlay.subtext.displayed = true;
        assert_eq!(overlay.summary(), "You burned in lava | Sigh...");
    }

    #[test]
    fn test_summary_flattens_newlines() {
        let mut overlay = Overlay::new();
        overlay.set_texts("Welcome!\n\nReady?", "");
        overlay.headline.visible = true;
        assert_eq!(overlay.summary(), "Welcome! Ready?");
    }
}
