//! End-to-end scenarios for the simulation and the level lifecycle

use gauntlet::game::restart::{RestartPhase, MESSAGE_DELAY, MESSAGE_HOLD, RESPAWN_FADE};
use gauntlet::game::{FrameInput, Game, GameConfig, Overlay, RestartReason, Simulation, StepEvent};
use gauntlet::level::{LevelAssets, LevelMaterial, PowerupKind};
use gauntlet_core::{Quat, Transform, Vec3};
use gauntlet_physics::{Collider, ColliderShape, MoveInput, PhysicsConfig};

const EPSILON: f32 = 0.0001;
const FRAME: f64 = 1.0 / 60.0;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn new_game(config: GameConfig) -> Game {
    Game::new(config, PhysicsConfig::default(), LevelAssets::default()).unwrap()
}

fn run(game: &mut Game, seconds: f64, input: &FrameInput) {
    let frames = (seconds / FRAME).ceil() as usize;
    for _ in 0..frames {
        game.frame(FRAME, input);
    }
}

fn locked() -> FrameInput {
    FrameInput {
        movement: MoveInput::default(),
        pointer_locked: true,
        clicked: false,
    }
}

/// Dismiss the welcome message and wait for the respawn fade
fn enter_level(game: &mut Game) {
    run(game, RESPAWN_FADE as f64 + 0.1, &locked());
    assert!(!game.is_frozen());
}

#[test]
fn test_spawn_velocity_survives_first_step() {
    let mut sim = Simulation::new(PhysicsConfig::default(), &GameConfig::default());
    let mut overlay = Overlay::new();
    sim.respawn(Vec3::new(0.0, 40.0, 0.0), 0.0);
    sim.step(&MoveInput::default(), Quat::IDENTITY, &mut overlay);
    assert!(approx_eq(sim.state.player.velocity.y, -0.5));
}

#[test]
fn test_unit_box_pushes_out_along_z() {
    let collider = Collider::new(
        Default::default(),
        ColliderShape::Box { half_extents: Vec3::ONE },
        &Transform::from_position(Vec3::ZERO),
    );
    let push = collider.resolve_collision(Vec3::new(0.0, 0.0, 1.3), 0.4).unwrap();
    assert!(approx_eq(push.x, 0.0));
    assert!(approx_eq(push.y, 0.0));
    assert!(approx_eq(push.z, 0.1));
}

#[test]
fn test_finishing_last_level_never_rebuilds() {
    let mut game = new_game(GameConfig {
        start_level: 7,
        ..GameConfig::default()
    });
    enter_level(&mut game);
    let name = game.simulation.level().unwrap().name.clone();
    game.take_released();

    game.finish_level();
    run(&mut game, 30.0, &FrameInput { clicked: true, ..locked() });

    assert!(game.is_finished());
    assert_eq!(game.restart_sequence().map(|r| r.phase()), Some(RestartPhase::Finished));
    assert_eq!(game.current_level(), 8);
    assert_eq!(game.simulation.level().unwrap().name, name);
    assert!(game.take_released().is_empty());
}

#[test]
fn test_powerup_fires_once_until_respawn() {
    let mut sim = Simulation::new(PhysicsConfig::default(), &GameConfig::default());
    let mut overlay = Overlay::new();
    sim.install_level("powerup", &LevelAssets::default(), |b| {
        b.collidable_box(Vec3::new(10.0, 1.0, 10.0), Vec3::ZERO, LevelMaterial::Solid);
        b.powerup(PowerupKind::HighJump, Vec3::new(0.0, 1.0, 0.0));
    });
    sim.respawn(Vec3::new(0.0, 1.0, 0.0), 0.0);

    let mut collected = 0;
    for _ in 0..30 {
        let before = sim.state.powerup_remaining;
        sim.step(&MoveInput::default(), Quat::IDENTITY, &mut overlay);
        if sim.state.powerup_remaining > before {
            collected += 1;
        }
    }
    assert_eq!(collected, 1);
    assert!(sim.state.boosts().high_jump);

    sim.respawn(Vec3::new(0.0, 1.0, 0.0), 0.0);
    sim.step(&MoveInput::default(), Quat::IDENTITY, &mut overlay);
    assert_eq!(sim.state.powerup, Some(PowerupKind::HighJump));
    assert!(approx_eq(sim.state.powerup_remaining, 5.0));
}

#[test]
fn test_death_restart_timing() {
    let mut game = new_game(GameConfig {
        taunt_seed: Some(3),
        ..GameConfig::default()
    });
    enter_level(&mut game);

    game.start_restart(RestartReason::SawBlade);
    assert!(game.is_frozen());
    assert_eq!(game.overlay.headline.text, "You were sliced by saw blades");
    assert!(game.overlay.subtext.text.ends_with("..."));
    let time = game.simulation.time();

    run(&mut game, MESSAGE_DELAY as f64 - 0.1, &locked());
    assert!(!game.overlay.subtext.visible);
    run(&mut game, 0.2, &locked());
    assert!(game.overlay.subtext.visible);

    run(&mut game, MESSAGE_HOLD as f64 + RESPAWN_FADE as f64 - 0.2, &locked());
    assert!(game.is_frozen());
    assert_eq!(game.simulation.time(), time);

    run(&mut game, 0.3, &locked());
    assert!(!game.is_frozen());
    assert!(game.overlay.classes.is_empty());
}

#[test]
fn test_respawn_restores_spawn_state() {
    let mut game = new_game(GameConfig::default());
    enter_level(&mut game);
    let spawn = game.simulation.level().unwrap().spawn_position;
    let yaw = game.simulation.level().unwrap().spawn_yaw;

    game.look.pitch = 1.0;
    game.look.yaw += 2.0;
    game.simulation.state.powerup = Some(PowerupKind::SpeedBoost);
    game.simulation.state.powerup_remaining = 3.0;
    game.manual_restart();
    run(&mut game, 5.0, &locked());

    assert!(!game.is_frozen());
    assert!(approx_eq(game.look.pitch, 0.0));
    assert!(approx_eq(game.look.yaw, yaw));
    assert_eq!(game.simulation.state.powerup, None);
    let position = game.simulation.state.player.position;
    assert!(approx_eq(position.x, spawn.x));
    assert!(approx_eq(position.z, spawn.z));
}

#[test]
fn test_lava_death_from_simulation() {
    let mut sim = Simulation::new(PhysicsConfig::default(), &GameConfig::default());
    let mut overlay = Overlay::new();
    sim.respawn(Vec3::new(0.0, 10.0, 0.0), 0.0);
    let mut event = None;
    for _ in 0..120 {
        event = sim.frame(FRAME, &MoveInput::default(), Quat::IDENTITY, &mut overlay);
        if event.is_some() {
            break;
        }
    }
    assert_eq!(event, Some(StepEvent::Restart(RestartReason::Lava)));
}
