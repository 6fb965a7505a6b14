//! Death and level-change sequence
//!
//! A restart freezes the simulation, puts a message on the overlay, waits
//! (for a timer, a click or pointer lock) and fades back in. The sequence is
//! advanced by real time every rendered frame; the game respawns the player
//! once it reports [`RestartPhase::Respawned`].

use gauntlet_math::Mulberry32;

use super::overlay::{Overlay, OverlayClass};
use crate::level::Hazard;

/// Delay before the second line of a death message appears
pub const MESSAGE_DELAY: f32 = 1.3;
/// How long the full death message stays up
pub const MESSAGE_HOLD: f32 = 1.3;
/// Delay before the intermission asks for a click
pub const INTERMISSION_DELAY: f32 = 1.5;
/// Delay before the final thanks appear
pub const FINALE_DELAY: f32 = 2.5;
/// Fade back into the level
pub const RESPAWN_FADE: f32 = 0.7;

pub const WELCOME_TEXT: &str = "Welcome to the Deadly™ Obstacle Course!\n\nAre you ready to die?\n\n\n(Click to begin)";
pub const INTERMISSION_TEXT: &str = "Congratulations! You've completed...";
pub const INTERMISSION_SUBTEXT: &str =
    "...the easy levels! Let's increase the difficulty a bit, shall we?\n\n\n(Click to continue)";
pub const FINALE_TEXT: &str = "Congratulations! You've completed all the levels!\n\nIt wasn't so hard, was it?";
pub const FINALE_SUBTEXT: &str = "Thanks for playing!";

/// Second line of a death message, before the trailing "..."
pub const TAUNTS: [&str; 9] = [
    "Anyways",
    "Try again",
    "Sigh",
    "Don't let this happen again",
    "Pathetic",
    "You can do better than this",
    "I expected more from you",
    "Again",
    "Try harder",
];

/// Pick a taunt
pub fn pick_taunt(rng: &mut Mulberry32) -> &'static str {
    let index = (rng.next_f64() * TAUNTS.len() as f64) as usize;
    TAUNTS[index.min(TAUNTS.len() - 1)]
}

/// Why the level is being restarted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartReason {
    ManualRestart,
    LevelChange,
    SawBlade,
    Spikes,
    Lava,
}

impl RestartReason {
    /// First line of the message
    pub fn headline(self) -> &'static str {
        match self {
            RestartReason::ManualRestart => "",
            RestartReason::LevelChange => "You survive... for now",
            RestartReason::SawBlade => "You were sliced by saw blades",
            RestartReason::Spikes => "You were impaled by spikes",
            RestartReason::Lava => "You burned in lava",
        }
    }

    pub fn is_death(self) -> bool {
        matches!(self, RestartReason::SawBlade | RestartReason::Spikes | RestartReason::Lava)
    }
}

impl From<Hazard> for RestartReason {
    fn from(hazard: Hazard) -> Self {
        match hazard {
            Hazard::SawBlade => RestartReason::SawBlade,
            Hazard::Spikes => RestartReason::Spikes,
        }
    }
}

/// What a waiting sequence is waiting for
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WaitFor {
    PointerLock,
    Click,
    Timer { remaining: f32 },
}

/// Progress of a restart
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RestartPhase {
    /// Headline up, second line pending
    ShowingMessage { remaining: f32 },
    WaitingForClickOrTimer(WaitFor),
    /// Texts gone, fading back in
    FadingOut { remaining: f32 },
    /// Ready to put the player back at the spawn point
    Respawned,
    /// The game is over; the sequence never resumes
    Finished,
}

/// Which message the sequence shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Message {
    Welcome,
    Intermission,
    Finale,
    Standard,
}

/// Where the game stands when a restart begins
#[derive(Clone, Copy, Debug)]
pub struct RestartContext {
    /// The welcome message has not been dismissed yet
    pub just_started: bool,
    pub current_level: usize,
    pub level_count: usize,
    /// Level index greeted with the intermission message
    pub intermission_level: Option<usize>,
}

/// Input observed by a running sequence this frame
#[derive(Clone, Copy, Debug, Default)]
pub struct SequenceInput {
    pub pointer_locked: bool,
    pub clicked: bool,
}

/// A running restart
#[derive(Clone, Debug)]
pub struct RestartSequence {
    reason: RestartReason,
    message: Message,
    phase: RestartPhase,
}

impl RestartSequence {
    /// Begin a restart and put its message on the overlay
    pub fn start(reason: RestartReason, context: RestartContext, taunt: &str, overlay: &mut Overlay) -> Self {
        overlay.hide_powerup();
        overlay.add_class(if reason == RestartReason::Lava {
            OverlayClass::LAVA
        } else {
            OverlayClass::DEAD
        });
        overlay.set_texts(reason.headline(), "");
        overlay.headline.visible = true;

        let message = if reason == RestartReason::LevelChange {
            overlay.subtext.displayed = false;
            if context.just_started {
                overlay.headline.text = WELCOME_TEXT.to_string();
                Message::Welcome
            } else if context.intermission_level == Some(context.current_level) {
                overlay.set_texts(INTERMISSION_TEXT, INTERMISSION_SUBTEXT);
                Message::Intermission
            } else if context.current_level >= context.level_count {
                overlay.set_texts(FINALE_TEXT, FINALE_SUBTEXT);
                Message::Finale
            } else {
                Message::Standard
            }
        } else {
            overlay.subtext.text = format!("{}...", taunt);
            Message::Standard
        };

        let mut sequence = Self {
            reason,
            message,
            phase: RestartPhase::Respawned,
        };
        sequence.phase = match message {
            Message::Welcome => RestartPhase::WaitingForClickOrTimer(WaitFor::PointerLock),
            Message::Intermission => RestartPhase::ShowingMessage {
                remaining: INTERMISSION_DELAY,
            },
            Message::Finale => RestartPhase::ShowingMessage { remaining: FINALE_DELAY },
            Message::Standard if context.just_started => Self::fade(overlay),
            Message::Standard => RestartPhase::ShowingMessage { remaining: MESSAGE_DELAY },
        };
        log::info!("restart: {:?} ({:?})", reason, message);
        sequence
    }

    pub fn reason(&self) -> RestartReason {
        self.reason
    }

    pub fn phase(&self) -> RestartPhase {
        self.phase
    }

    /// The simulation stays frozen until the player is back at the spawn
    pub fn is_frozen(&self) -> bool {
        self.phase != RestartPhase::Respawned
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RestartPhase::Finished
    }

    fn fade(overlay: &mut Overlay) -> RestartPhase {
        overlay.hide_texts();
        overlay.remove_class(OverlayClass::DEAD | OverlayClass::LAVA);
        overlay.add_class(OverlayClass::RESPAWN);
        RestartPhase::FadingOut { remaining: RESPAWN_FADE }
    }

    /// Advance by `dt` seconds of real time
    pub fn advance(&mut self, dt: f32, input: SequenceInput, overlay: &mut Overlay) -> RestartPhase {
        self.phase = match self.phase {
            RestartPhase::ShowingMessage { remaining } if remaining - dt > 0.0 => {
                RestartPhase::ShowingMessage { remaining: remaining - dt }
            }
            RestartPhase::ShowingMessage { .. } => {
                overlay.subtext.visible = true;
                match self.message {
                    Message::Intermission => RestartPhase::WaitingForClickOrTimer(WaitFor::Click),
                    Message::Finale => {
                        log::info!("all levels completed");
                        RestartPhase::Finished
                    }
                    Message::Welcome | Message::Standard => {
                        RestartPhase::WaitingForClickOrTimer(WaitFor::Timer { remaining: MESSAGE_HOLD })
                    }
                }
            }
            RestartPhase::WaitingForClickOrTimer(WaitFor::PointerLock) if input.pointer_locked => Self::fade(overlay),
            RestartPhase::WaitingForClickOrTimer(WaitFor::Click) if input.clicked => Self::fade(overlay),
            RestartPhase::WaitingForClickOrTimer(WaitFor::Timer { remaining }) => {
                if remaining - dt > 0.0 {
                    RestartPhase::WaitingForClickOrTimer(WaitFor::Timer { remaining: remaining - dt })
                } else {
                    Self::fade(overlay)
                }
            }
            RestartPhase::FadingOut { remaining } if remaining - dt > 0.0 => {
                RestartPhase::FadingOut { remaining: remaining - dt }
            }
            RestartPhase::FadingOut { .. } => {
                overlay.remove_class(OverlayClass::DEAD | OverlayClass::RESPAWN);
                overlay.subtext.visible = false;
                overlay.subtext.displayed = true;
                RestartPhase::Respawned
            }
            phase => phase,
        };
        self.phase
    }
}
