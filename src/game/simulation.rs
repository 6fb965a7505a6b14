//! Fixed-step simulation
//!
//! [`Simulation`] owns the scene graph and everything the physics step
//! touches. Rendered frames feed it real time; it drains that time in fixed
//! steps and reports the first event that needs the game's attention.

use std::sync::Arc;

use gauntlet_core::geometry::box_geometry;
use gauntlet_core::{Drawable, Lava, NodeKey, Quat, SceneGraph, SceneNode, Skybox, Transform, Vec3};
use gauntlet_physics::{Boosts, ColliderSet, FixedTimestep, MoveInput, PhysicsConfig, PlayerPhysics, TriggerSet};

use super::overlay::Overlay;
use super::restart::RestartReason;
use super::GameConfig;
use crate::level::{Level, LevelAssets, LevelBuilder, PowerupKind, TriggerAction};

/// Lava surface edge length
const LAVA_SIZE: f32 = 1000.0;
/// Extra margin above the lava surface that already burns
const LAVA_MARGIN: f32 = 0.5;
/// Downward velocity given at spawn
const SPAWN_VELOCITY: Vec3 = Vec3::new(0.0, -0.5, 0.0);
/// Extra time pending after a respawn so the first frame steps at once
const RESPAWN_SLACK: f64 = 0.001;

/// Something a physics step asks the game to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepEvent {
    Restart(RestartReason),
    FinishLevel,
}

/// Mutable state advanced by the physics step
#[derive(Debug)]
pub struct SimulationState {
    pub colliders: ColliderSet,
    pub triggers: TriggerSet<TriggerAction>,
    pub level: Option<Level>,
    pub player: PlayerPhysics,
    pub powerup: Option<PowerupKind>,
    /// Seconds left on the active powerup
    pub powerup_remaining: f32,
    pub lava_height: f32,
    /// Nodes hidden by collected powerups
    hidden: Vec<NodeKey>,
}

impl SimulationState {
    fn new(player: PlayerPhysics) -> Self {
        Self {
            colliders: ColliderSet::new(),
            triggers: TriggerSet::new(),
            level: None,
            player,
            powerup: None,
            powerup_remaining: 0.0,
            lava_height: 0.0,
            hidden: Vec::new(),
        }
    }

    /// Boosts granted by the powerup still running
    pub fn boosts(&self) -> Boosts {
        let active = if self.powerup_remaining > 0.0 { self.powerup } else { None };
        Boosts {
            speed: active == Some(PowerupKind::SpeedBoost),
            high_jump: active == Some(PowerupKind::HighJump),
        }
    }
}

/// Scene graph plus physics, driven by a fixed-step clock
pub struct Simulation {
    pub graph: SceneGraph,
    pub state: SimulationState,
    physics: PhysicsConfig,
    clock: FixedTimestep,
    lava_rise_rate: f32,
    lava_base: f32,
    player_node: NodeKey,
    camera_node: NodeKey,
    lava_node: NodeKey,
}

impl Simulation {
    /// Empty world with the player, its camera, the lava and the sky
    pub fn new(physics: PhysicsConfig, config: &GameConfig) -> Self {
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let player_node = graph.insert(SceneNode::new().with_name("player"));
        let camera_node = graph.insert(SceneNode::new().at(Vec3::new(0.0, config.eye_height, 0.0)).with_name("camera"));
        let lava = Lava::new(Arc::new(box_geometry(LAVA_SIZE, 1.0, LAVA_SIZE)));
        let lava_node = graph.insert(
            SceneNode::with_drawable(Drawable::Lava(lava))
                .at(Vec3::new(0.0, config.lava_base, 0.0))
                .with_name("lava"),
        );
        let skybox_node = graph.insert(SceneNode::with_drawable(Drawable::Skybox(Skybox::new())).with_name("skybox"));

        for (parent, child) in [
            (root, player_node),
            (player_node, camera_node),
            (root, lava_node),
            (root, skybox_node),
        ] {
            if let Err(e) = graph.add(parent, child) {
                log::warn!("failed to link scene node: {}", e);
            }
        }

        let player = PlayerPhysics::new(Vec3::ZERO, physics.player_radius);
        let clock = FixedTimestep::new(physics.tick_rate, physics.max_steps_per_frame);
        Self {
            graph,
            state: SimulationState::new(player),
            physics,
            clock,
            lava_rise_rate: config.lava_rise_rate,
            lava_base: config.lava_base,
            player_node,
            camera_node,
            lava_node,
        }
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    pub fn clock(&self) -> &FixedTimestep {
        &self.clock
    }

    /// Current physics time in seconds
    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    pub fn player_node(&self) -> NodeKey {
        self.player_node
    }

    pub fn camera_node(&self) -> NodeKey {
        self.camera_node
    }

    pub fn level(&self) -> Option<&Level> {
        self.state.level.as_ref()
    }

    /// Turn the player body and tilt the camera
    pub fn set_orientation(&mut self, body: Quat, camera: Quat) {
        if let Some(transform) = self.graph.transform_mut(self.player_node) {
            transform.rotation = body;
        }
        if let Some(transform) = self.graph.transform_mut(self.camera_node) {
            transform.rotation = camera;
        }
    }

    /// Remove the current level, returning its disposed nodes
    pub fn clear_level(&mut self) -> Vec<SceneNode> {
        let mut released = Vec::new();
        if let Some(level) = self.state.level.take() {
            for object in &level.objects {
                released.extend(self.graph.dispose(object.root));
            }
            log::debug!("cleared level '{}': {} nodes", level.name, released.len());
        }
        self.state.colliders.clear();
        self.state.triggers.clear();
        self.state.hidden.clear();
        released
    }

    /// Replace the current level with one assembled by `build`
    ///
    /// Returns the nodes of the previous level so their GPU resources can be
    /// released.
    pub fn install_level<F>(&mut self, name: &str, assets: &LevelAssets, build: F) -> Vec<SceneNode>
    where
        F: FnOnce(&mut LevelBuilder<'_>),
    {
        let released = self.clear_level();
        let mut builder = LevelBuilder::new(
            name,
            &mut self.graph,
            &mut self.state.colliders,
            &mut self.state.triggers,
            assets,
        );
        build(&mut builder);
        self.state.level = Some(builder.build());
        released
    }

    /// Put the player at `spawn` and restart the clock at `time`
    ///
    /// Every trigger is re-enabled and collected powerups reappear.
    pub fn respawn(&mut self, spawn: Vec3, time: f64) {
        self.clock.reset(time, self.clock.step() + RESPAWN_SLACK);
        self.state.triggers.enable_all();
        for node in self.state.hidden.drain(..) {
            if let Some(node) = self.graph.get_mut(node) {
                node.visible = true;
            }
        }
        self.state.player.respawn(spawn, SPAWN_VELOCITY);
        self.state.powerup = None;
        self.state.powerup_remaining = 0.0;
        self.sync_player_node();
    }

    /// Drain `delta` seconds of real time in fixed steps
    ///
    /// Stepping stops at the first event; the remaining time stays pending.
    pub fn frame(&mut self, delta: f64, input: &MoveInput, facing: Quat, overlay: &mut Overlay) -> Option<StepEvent> {
        self.clock.accumulate(delta);
        let mut steps = 0;
        while self.clock.try_step() {
            steps += 1;
            if let Some(event) = self.step(input, facing, overlay) {
                log::trace!("frame: {} steps, stopped by {:?}", steps, event);
                return Some(event);
            }
        }
        log::trace!("frame: {} steps", steps);
        None
    }

    /// One physics step at the current clock time
    pub fn step(&mut self, input: &MoveInput, facing: Quat, overlay: &mut Overlay) -> Option<StepEvent> {
        let time = self.clock.time() as f32;
        let dt = self.clock.step_f32();

        if let Some(level) = &self.state.level {
            for object in level.objects.iter().filter(|o| o.is_dynamic()) {
                object.update(&mut self.graph, time);
                self.state.colliders.update_subtree(&self.graph, object.root);
            }
        }

        self.state.lava_height = time * self.lava_rise_rate + self.lava_base;
        if let Some(transform) = self.graph.transform_mut(self.lava_node) {
            transform.position.y = self.state.lava_height;
        }

        self.state.powerup_remaining = (self.state.powerup_remaining - dt).max(0.0);
        self.update_powerup_bar(overlay);

        let boosts = self.state.boosts();
        self.state
            .player
            .step(&self.physics, input, facing, boosts, &self.state.colliders, dt);
        self.sync_player_node();

        let position = self.state.player.position;
        let radius = self.state.player.radius;
        for hit in self.state.triggers.evaluate(&self.state.colliders, position, radius) {
            match hit.action {
                TriggerAction::Hazard(hazard) => return Some(StepEvent::Restart(hazard.into())),
                TriggerAction::Trampoline => self.state.player.velocity.y = self.physics.trampoline_velocity,
                TriggerAction::Powerup(kind) => {
                    if let Some(node) = self.graph.get_mut(hit.collider) {
                        node.visible = false;
                        self.state.hidden.push(hit.collider);
                    }
                    self.state.powerup = Some(kind);
                    self.state.powerup_remaining = self.physics.powerup_duration;
                    self.update_powerup_bar(overlay);
                    log::debug!("collected {:?}", kind);
                }
                TriggerAction::Finish => return Some(StepEvent::FinishLevel),
            }
        }

        if position.y - radius < self.state.lava_height + LAVA_MARGIN {
            return Some(StepEvent::Restart(RestartReason::Lava));
        }
        None
    }

    fn update_powerup_bar(&self, overlay: &mut Overlay) {
        match self.state.powerup {
            Some(kind) if self.state.powerup_remaining > 0.0 => {
                overlay.show_powerup(kind, self.state.powerup_remaining, self.physics.powerup_duration)
            }
            _ => overlay.hide_powerup(),
        }
    }

    fn sync_player_node(&mut self) {
        let position = self.state.player.position;
        if let Some(transform) = self.graph.transform_mut(self.player_node) {
            transform.position = position;
        }
    }

    /// Player transform as currently placed in the scene
    pub fn player_transform(&self) -> Transform {
        self.graph.transform(self.player_node).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{Hazard, LevelMaterial};

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn simulation() -> Simulation {
        Simulation::new(PhysicsConfig::default(), &GameConfig::default())
    }

    fn floor_level(b: &mut LevelBuilder<'_>) {
        b.set_spawn(Vec3::new(0.0, 1.0, 0.0), 0.0);
        b.collidable_box(Vec3::new(20.0, 1.0, 20.0), Vec3::new(0.0, 0.0, 0.0), LevelMaterial::Solid);
    }

    fn step_n(sim: &mut Simulation, n: usize, input: &MoveInput, overlay: &mut Overlay) -> Option<StepEvent> {
        let step = sim.clock().step();
        for _ in 0..n {
            if let Some(event) = sim.frame(step, input, Quat::IDENTITY, overlay) {
                return Some(event);
            }
        }
        None
    }

    #[test]
    fn test_first_step_keeps_spawn_velocity() {
        let mut sim = simulation();
        let mut overlay = Overlay::new();
        sim.respawn(Vec3::new(0.0, 30.0, 0.0), 0.0);
        let event = sim.step(&MoveInput::default(), Quat::IDENTITY, &mut overlay);
        assert_eq!(event, None);
        assert!(approx_eq(sim.state.player.velocity.y, -0.5));
    }

    #[test]
    fn test_respawn_leaves_one_step_pending() {
        let mut sim = simulation();
        let mut overlay = Overlay::new();
        sim.install_level("floor", &LevelAssets::default(), floor_level);
        sim.respawn(Vec3::new(0.0, 1.0, 0.0), -1.99);
        assert!(approx_eq(sim.time() as f32, -1.99));

        sim.frame(0.0, &MoveInput::default(), Quat::IDENTITY, &mut overlay);
        assert_eq!(sim.clock().steps(), 1);
    }

    #[test]
    fn test_lava_rises_with_time() {
        let mut sim = simulation();
        let mut overlay = Overlay::new();
        sim.install_level("floor", &LevelAssets::default(), floor_level);
        sim.respawn(Vec3::new(0.0, 1.0, 0.0), 10.0);
        sim.step(&MoveInput::default(), Quat::IDENTITY, &mut overlay);
        assert!(approx_eq(sim.state.lava_height, sim.time() as f32 * 0.1 - 3.0));
    }

    #[test]
    fn test_falling_into_lava_restarts() {
        let mut sim = simulation();
        let mut overlay = Overlay::new();
        sim.respawn(Vec3::new(0.0, 0.0, 0.0), 0.0);
        let event = step_n(&mut sim, 60, &MoveInput::default(), &mut overlay);
        assert_eq!(event, Some(StepEvent::Restart(RestartReason::Lava)));
        assert!(sim.state.player.position.y - 0.4 < sim.state.lava_height + 0.5);
    }

    #[test]
    fn test_player_lands_on_floor() {
        let mut sim = simulation();
        let mut overlay = Overlay::new();
        sim.install_level("floor", &LevelAssets::default(), floor_level);
        sim.respawn(Vec3::new(0.0, 1.0, 0.0), 0.0);
        assert_eq!(step_n(&mut sim, 30, &MoveInput::default(), &mut overlay), None);
        assert!(sim.state.player.grounded);
        assert!(approx_eq(sim.state.player.position.y, 0.9));
        assert!(approx_eq(sim.player_transform().position.y, 0.9));
    }

    #[test]
    fn test_saw_blade_kills() {
        let mut sim = simulation();
        let mut overlay = Overlay::new();
        sim.install_level("saw", &LevelAssets::default(), |b| {
            floor_level(b);
            b.saw_blade(3.0, Vec3::new(0.0, 1.0, 0.0), 0.0);
        });
        sim.respawn(Vec3::new(0.0, 1.0, 0.0), 0.0);
        let event = step_n(&mut sim, 5, &MoveInput::default(), &mut overlay);
        assert_eq!(event, Some(StepEvent::Restart(RestartReason::from(Hazard::SawBlade))));
    }

    #[test]
    fn test_powerup_fires_once_until_respawn() {
        let mut sim = simulation();
        let mut overlay = Overlay::new();
        sim.install_level("powerup", &LevelAssets::default(), |b| {
            floor_level(b);
            b.powerup(PowerupKind::SpeedBoost, Vec3::new(0.0, 1.0, 0.0));
        });
        let root = sim.level().map(|l| l.objects[1].root).unwrap();
        sim.respawn(Vec3::new(0.0, 1.0, 0.0), 0.0);

        step_n(&mut sim, 1, &MoveInput::default(), &mut overlay);
        assert_eq!(sim.state.powerup, Some(PowerupKind::SpeedBoost));
        assert!(sim.state.boosts().speed);
        assert!(!sim.graph.get(root).unwrap().visible);
        assert!(overlay.powerup.label.starts_with("Speed boost - "));

        step_n(&mut sim, 10, &MoveInput::default(), &mut overlay);
        assert!(sim.state.powerup_remaining < 5.0 - 9.0 / 60.0);

        sim.respawn(Vec3::new(0.0, 1.0, 0.0), 0.0);
        assert!(sim.graph.get(root).unwrap().visible);
        assert_eq!(sim.state.powerup, None);
        sim.step(&MoveInput::default(), Quat::IDENTITY, &mut overlay);
        assert!(approx_eq(sim.state.powerup_remaining, 5.0));
    }

    #[test]
    fn test_powerup_expires() {
        let mut sim = simulation();
        let mut overlay = Overlay::new();
        sim.respawn(Vec3::new(0.0, 50.0, 0.0), 0.0);
        sim.state.powerup = Some(PowerupKind::HighJump);
        sim.state.powerup_remaining = 0.01;
        sim.step(&MoveInput::default(), Quat::IDENTITY, &mut overlay);
        assert!(!sim.state.boosts().high_jump);
        assert_eq!(overlay.powerup.opacity, 0.0);
    }

    #[test]
    fn test_trampoline_launches() {
        let mut sim = simulation();
        let mut overlay = Overlay::new();
        sim.install_level("trampoline", &LevelAssets::default(), |b| {
            floor_level(b);
            b.trampoline(Vec3::new(4.0, 0.2, 4.0), Vec3::new(0.0, 0.6, 0.0), None);
        });
        sim.respawn(Vec3::new(0.0, 1.0, 0.0), 0.0);
        sim.step(&MoveInput::default(), Quat::IDENTITY, &mut overlay);
        assert!(approx_eq(sim.state.player.velocity.y, 0.3));
    }

    #[test]
    fn test_finish_ends_level() {
        let mut sim = simulation();
        let mut overlay = Overlay::new();
        sim.install_level("finish", &LevelAssets::default(), |b| {
            floor_level(b);
            b.finish_object(Vec3::new(0.0, 0.5, 0.0), 0.0);
        });
        sim.respawn(Vec3::new(0.0, 2.0, 0.0), 0.0);
        assert_eq!(step_n(&mut sim, 3, &MoveInput::default(), &mut overlay), Some(StepEvent::FinishLevel));
    }

    #[test]
    fn test_clear_level_releases_nodes() {
        let mut sim = simulation();
        let before = sim.graph.len();
        sim.install_level("floor", &LevelAssets::default(), floor_level);
        assert!(sim.graph.len() > before);
        let released = sim.clear_level();
        assert!(!released.is_empty());
        assert_eq!(sim.graph.len(), before);
        assert!(sim.state.colliders.is_empty());
        assert!(sim.state.triggers.is_empty());
        assert!(sim.level().is_none());
    }

    #[test]
    fn test_camera_follows_player() {
        let mut sim = simulation();
        sim.respawn(Vec3::new(2.0, 5.0, -3.0), 0.0);
        let camera = sim.graph.local_to_world(sim.camera_node()).unwrap().translation();
        assert!(approx_eq(camera.x, 2.0));
        assert!(approx_eq(camera.y, 6.5));
        assert!(approx_eq(camera.z, -3.0));
    }
}
