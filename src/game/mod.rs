//! Game lifecycle
//!
//! [`Game`] ties the simulation to level progression: it loads levels, turns
//! step events into restart sequences and level changes, and respawns the
//! player when a sequence completes.

pub mod overlay;
pub mod restart;
pub mod simulation;

use std::path::PathBuf;

use gauntlet_core::{NodeKey, SceneNode, Vec3};
use gauntlet_input::LookAngles;
use gauntlet_math::Mulberry32;
use gauntlet_physics::{MoveInput, PhysicsConfig};

pub use overlay::{Overlay, OverlayClass};
pub use restart::{RestartPhase, RestartReason, RestartSequence};
pub use simulation::{Simulation, SimulationState, StepEvent};

use crate::level::levels::{self, LevelFn, INTERMISSION_LEVEL, LEVELS};
use crate::level::{LevelAssets, LevelBuilder, LevelError, LevelTemplate};
use restart::{RestartContext, SequenceInput};

/// Seed used for taunts when none is configured
const DEFAULT_TAUNT_SEED: u32 = 0x5EED;

/// Game settings independent of physics tuning
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    /// Index of the first level
    pub start_level: usize,
    /// Directory of RON levels replacing the built-in ones
    pub level_dir: Option<PathBuf>,
    /// Physics time a respawn starts at
    pub restart_clock: f64,
    pub lava_rise_rate: f32,
    pub lava_base: f32,
    pub taunt_seed: Option<u32>,
    /// Camera height above the player center
    pub eye_height: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Arrow keys switch levels, Enter restarts
    pub level_skip_keys: bool,
    /// Play only the sandbox level
    pub sandbox: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_level: 0,
            level_dir: None,
            restart_clock: -1.99,
            lava_rise_rate: 0.1,
            lava_base: -3.0,
            taunt_seed: None,
            eye_height: 1.5,
            fov: 80.0,
            near: 0.1,
            far: 200.0,
            level_skip_keys: false,
            sandbox: false,
        }
    }
}

/// Ordered levels the game plays through
#[derive(Clone, Debug)]
pub enum LevelList {
    Builtin(Vec<(&'static str, LevelFn)>),
    Templates(Vec<LevelTemplate>),
}

impl LevelList {
    /// Levels selected by the configuration
    pub fn from_config(config: &GameConfig) -> Result<Self, LevelError> {
        if config.sandbox {
            return Ok(LevelList::Builtin(vec![("Sandbox", levels::sandbox as LevelFn)]));
        }
        match &config.level_dir {
            Some(dir) => {
                let templates = LevelTemplate::load_dir(dir)?;
                log::info!("loaded {} levels from {}", templates.len(), dir.display());
                Ok(LevelList::Templates(templates))
            }
            None => Ok(LevelList::Builtin(LEVELS.to_vec())),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LevelList::Builtin(levels) => levels.len(),
            LevelList::Templates(levels) => levels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        match self {
            LevelList::Builtin(levels) => levels.get(index).map(|(name, _)| *name),
            LevelList::Templates(levels) => levels.get(index).map(|t| t.name.as_str()),
        }
    }

    /// Level index greeted with the intermission message
    pub fn intermission(&self) -> Option<usize> {
        match self {
            LevelList::Builtin(levels) if levels.len() > INTERMISSION_LEVEL => Some(INTERMISSION_LEVEL),
            _ => None,
        }
    }

    fn build(&self, index: usize, builder: &mut LevelBuilder<'_>) {
        match self {
            LevelList::Builtin(levels) => {
                if let Some((_, build)) = levels.get(index) {
                    build(builder);
                }
            }
            LevelList::Templates(levels) => {
                if let Some(template) = levels.get(index) {
                    template.build(builder);
                }
            }
        }
    }
}

/// Input gathered by the front end for one rendered frame
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub movement: MoveInput,
    pub pointer_locked: bool,
    /// A mouse click happened since the last frame
    pub clicked: bool,
}

/// The running game
pub struct Game {
    config: GameConfig,
    pub simulation: Simulation,
    pub overlay: Overlay,
    pub look: LookAngles,
    levels: LevelList,
    assets: LevelAssets,
    restart: Option<RestartSequence>,
    taunts: Mulberry32,
    current_level: usize,
    just_started: bool,
    released: Vec<SceneNode>,
}

impl Game {
    /// Create the game and load the configured start level
    pub fn new(config: GameConfig, physics: PhysicsConfig, assets: LevelAssets) -> Result<Self, LevelError> {
        let levels = LevelList::from_config(&config)?;
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        let mut game = Self {
            simulation: Simulation::new(physics, &config),
            overlay: Overlay::new(),
            look: LookAngles::default(),
            levels,
            assets,
            restart: None,
            taunts: Mulberry32::new(config.taunt_seed.unwrap_or(DEFAULT_TAUNT_SEED)),
            current_level: 0,
            just_started: true,
            released: Vec::new(),
            config,
        };
        game.load_level(game.config.start_level)?;
        Ok(game)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn current_level(&self) -> usize {
        self.current_level
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &LevelList {
        &self.levels
    }

    pub fn restart_sequence(&self) -> Option<&RestartSequence> {
        self.restart.as_ref()
    }

    /// Physics is paused while a restart sequence runs
    pub fn is_frozen(&self) -> bool {
        self.restart.as_ref().is_some_and(|r| r.is_frozen())
    }

    /// All levels are done and the game will not resume
    pub fn is_finished(&self) -> bool {
        self.restart.as_ref().is_some_and(|r| r.is_finished())
    }

    pub fn camera_node(&self) -> NodeKey {
        self.simulation.camera_node()
    }

    /// Sun position of the current level
    pub fn light_position(&self) -> Vec3 {
        self.simulation
            .level()
            .map(|l| l.light_position)
            .unwrap_or(crate::level::builder::DEFAULT_LIGHT)
    }

    /// Nodes disposed since the last call, for releasing GPU resources
    pub fn take_released(&mut self) -> Vec<SceneNode> {
        std::mem::take(&mut self.released)
    }

    /// Tear down the current level and build level `index`
    ///
    /// Any running restart sequence is replaced by a level change.
    pub fn load_level(&mut self, index: usize) -> Result<(), LevelError> {
        let name = self.levels.name(index).ok_or(LevelError::UnknownLevel(index))?;
        let levels = &self.levels;
        let released = self
            .simulation
            .install_level(name, &self.assets, |builder| levels.build(index, builder));
        self.released.extend(released);
        self.current_level = index;
        self.restart = None;
        self.start_restart(RestartReason::LevelChange);
        Ok(())
    }

    /// Advance by `dt` seconds of real time
    pub fn frame(&mut self, dt: f64, input: &FrameInput) {
        self.simulation
            .set_orientation(self.look.body_rotation(), self.look.camera_rotation());

        if let Some(sequence) = &mut self.restart {
            let sequence_input = SequenceInput {
                pointer_locked: input.pointer_locked,
                clicked: input.clicked,
            };
            if sequence.advance(dt as f32, sequence_input, &mut self.overlay) == RestartPhase::Respawned {
                self.restart = None;
                self.respawn();
            }
            return;
        }

        let facing = self.look.body_rotation();
        match self.simulation.frame(dt, &input.movement, facing, &mut self.overlay) {
            Some(StepEvent::Restart(reason)) => self.start_restart(reason),
            Some(StepEvent::FinishLevel) => self.finish_level(),
            None => {}
        }
    }

    /// Begin a restart unless one is already running
    pub fn start_restart(&mut self, reason: RestartReason) {
        if let Some(running) = &self.restart {
            log::warn!("ignoring {:?} restart while {:?} is running", reason, running.reason());
            return;
        }
        let context = RestartContext {
            just_started: self.just_started,
            current_level: self.current_level,
            level_count: self.levels.len(),
            intermission_level: self.levels.intermission(),
        };
        let taunt = restart::pick_taunt(&mut self.taunts);
        self.restart = Some(RestartSequence::start(reason, context, taunt, &mut self.overlay));
    }

    /// Move on to the next level, or to the finale after the last one
    pub fn finish_level(&mut self) {
        log::info!(
            "completed level {} '{}'",
            self.current_level,
            self.levels.name(self.current_level).unwrap_or("?")
        );
        self.current_level += 1;
        if self.current_level < self.levels.len() {
            if let Err(e) = self.load_level(self.current_level) {
                log::error!("{}", e);
            }
        } else {
            self.start_restart(RestartReason::LevelChange);
        }
    }

    /// Put the player back at the spawn point of the current level
    fn respawn(&mut self) {
        let (spawn, yaw) = self
            .simulation
            .level()
            .map(|l| (l.spawn_position, l.spawn_yaw))
            .unwrap_or((crate::level::builder::DEFAULT_SPAWN, 0.0));
        self.simulation.respawn(spawn, self.config.restart_clock);
        self.look = LookAngles::new(yaw, 0.0);
        self.simulation
            .set_orientation(self.look.body_rotation(), self.look.camera_rotation());
        self.overlay.remove_class(OverlayClass::DEAD | OverlayClass::RESPAWN);
        self.overlay.subtext.visible = false;
        self.just_started = false;
        log::info!("respawned in level {}", self.current_level);
    }

    /// Rebuild the previous level
    pub fn previous_level(&mut self) -> Result<(), LevelError> {
        self.load_level(self.current_level.saturating_sub(1))
    }

    /// Skip to the next level
    pub fn next_level(&mut self) -> Result<(), LevelError> {
        let last = self.levels.len().saturating_sub(1);
        self.load_level((self.current_level + 1).min(last))
    }

    pub fn manual_restart(&mut self) {
        self.start_restart(RestartReason::ManualRestart);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(config: GameConfig) -> Game {
        Game::new(config, PhysicsConfig::default(), LevelAssets::default()).unwrap()
    }

    fn run(game: &mut Game, seconds: f64, input: &FrameInput) {
        let mut elapsed = 0.0;
        while elapsed < seconds {
            game.frame(1.0 / 60.0, input);
            elapsed += 1.0 / 60.0;
        }
    }

    const LOCKED: FrameInput = FrameInput {
        movement: MoveInput {
            forward: false,
            backward: false,
            left: false,
            right: false,
            jump: false,
        },
        pointer_locked: true,
        clicked: false,
    };

    #[test]
    fn test_starts_with_welcome() {
        let mut game = game(GameConfig::default());
        assert!(game.is_frozen());
        assert_eq!(game.level_count(), 8);
        assert_eq!(game.overlay.headline.text, restart::WELCOME_TEXT);

        run(&mut game, 5.0, &FrameInput::default());
        assert!(game.is_frozen());

        run(&mut game, 1.0, &LOCKED);
        assert!(!game.is_frozen());
        let spawn = game.simulation.level().unwrap().spawn_position;
        let position = game.simulation.state.player.position;
        assert!((position.x - spawn.x).abs() < 0.0001);
        assert!((position.z - spawn.z).abs() < 0.0001);
        assert!(position.y < spawn.y);
    }

    #[test]
    fn test_finish_moves_to_next_level() {
        let mut game = game(GameConfig::default());
        run(&mut game, 1.0, &LOCKED);
        game.finish_level();
        assert_eq!(game.current_level(), 1);
        assert!(!game.take_released().is_empty());
        assert_eq!(game.overlay.headline.text, "You survive... for now");
        run(&mut game, 3.5, &LOCKED);
        assert!(!game.is_frozen());
    }

    #[test]
    fn test_finishing_last_level_ends_game() {
        let mut game = game(GameConfig {
            start_level: 7,
            ..GameConfig::default()
        });
        run(&mut game, 1.0, &LOCKED);
        game.finish_level();
        assert_eq!(game.current_level(), 8);
        assert_eq!(game.overlay.headline.text, restart::FINALE_TEXT);
        run(&mut game, 10.0, &LOCKED);
        assert!(game.is_finished());
    }

    #[test]
    fn test_unknown_start_level() {
        let result = Game::new(
            GameConfig {
                start_level: 42,
                ..GameConfig::default()
            },
            PhysicsConfig::default(),
            LevelAssets::default(),
        );
        assert!(matches!(result, Err(LevelError::UnknownLevel(42))));
    }

    #[test]
    fn test_reentrant_restart_is_ignored() {
        let mut game = game(GameConfig::default());
        run(&mut game, 1.0, &LOCKED);
        game.start_restart(RestartReason::Spikes);
        game.start_restart(RestartReason::Lava);
        assert_eq!(game.restart_sequence().map(|r| r.reason()), Some(RestartReason::Spikes));
    }

    #[test]
    fn test_sandbox_config() {
        let game = game(GameConfig {
            sandbox: true,
            ..GameConfig::default()
        });
        assert_eq!(game.level_count(), 1);
        assert_eq!(game.levels().name(0), Some("Sandbox"));
        assert_eq!(game.levels().intermission(), None);
    }

    #[test]
    fn test_debug_level_switching_clamps() {
        let mut game = game(GameConfig::default());
        game.previous_level().unwrap();
        assert_eq!(game.current_level(), 0);
        game.next_level().unwrap();
        assert_eq!(game.current_level(), 1);
    }
}
