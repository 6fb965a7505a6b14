//! Player physics for first-person platforming
//!
//! The player is a sphere moved once per fixed step: input acceleration,
//! speed cap and deceleration, gravity and jumping, then collision pushes
//! against every obstacle. Velocity is stored per step (units moved in one
//! step), and after collisions it is replaced by the actual displacement so
//! the player keeps the momentum of moving platforms.

use gauntlet_math::{lerp, Quat, Vec3};

use crate::collider_set::ColliderSet;
use crate::config::PhysicsConfig;

/// Per-step player input
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl MoveInput {
    /// Movement direction in the player's local frame (-Z is forward)
    pub fn local_direction(&self) -> Vec3 {
        let axis = |pos: bool, neg: bool| pos as i32 as f32 - neg as i32 as f32;
        Vec3::new(axis(self.right, self.left), 0.0, -axis(self.forward, self.backward))
    }
}

/// Active powerup effects for one step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Boosts {
    pub speed: bool,
    pub high_jump: bool,
}

/// Player physics state
#[derive(Clone, Debug)]
pub struct PlayerPhysics {
    /// Center of the player sphere
    pub position: Vec3,
    /// Displacement per step
    pub velocity: Vec3,
    /// Collision radius
    pub radius: f32,
    /// Whether the last step ended touching ground
    pub grounded: bool,
    /// Smoothed horizontal speed cap
    pub current_max_speed: f32,
}

impl PlayerPhysics {
    /// Create a new player at the given position
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            radius,
            grounded: false,
            current_max_speed: 0.0,
        }
    }

    /// Put the player back at a spawn point
    pub fn respawn(&mut self, position: Vec3, velocity: Vec3) {
        self.position = position;
        self.velocity = velocity;
        self.current_max_speed = 0.0;
    }

    /// Add input acceleration for one step
    pub fn apply_input(&mut self, config: &PhysicsConfig, input: &MoveInput, facing: Quat, boosts: Boosts, dt: f32) {
        let speed = if boosts.speed { config.boosted_speed } else { config.walk_speed };
        let accel = if self.grounded { speed } else { speed / config.air_control_divisor };
        let force = facing.rotate(input.local_direction().safe_normalized() * accel) * dt;
        self.velocity += force;
    }

    /// Ease the speed cap and decelerate the horizontal velocity
    pub fn limit_horizontal_speed(&mut self, config: &PhysicsConfig, boosts: Boosts, dt: f32) {
        let max_speed = if boosts.speed { config.boosted_max_speed } else { config.max_speed };
        self.current_max_speed = lerp(self.current_max_speed, max_speed, config.max_speed_smoothing);

        let decel = if self.grounded { config.ground_deceleration } else { config.air_deceleration };
        let horizontal = Vec3::new(self.velocity.x, 0.0, self.velocity.z);
        let speed = horizontal.length();
        let limited = horizontal.safe_normalized() * (speed * (1.0 - dt * decel)).min(self.current_max_speed);
        self.velocity.x = limited.x;
        self.velocity.z = limited.z;
    }

    /// Apply gravity, clamp to terminal velocity, and jump if grounded
    pub fn apply_gravity_and_jump(&mut self, config: &PhysicsConfig, jump: bool, boosts: Boosts, dt: f32) {
        self.velocity.y = (self.velocity.y + config.gravity * dt).max(config.terminal_velocity);

        if jump && self.grounded {
            self.grounded = false;
            let jump_velocity = if boosts.high_jump { config.high_jump_velocity } else { config.jump_velocity };
            self.velocity.y = self.velocity.y.max(jump_velocity);
        }
    }

    /// Move by the velocity and resolve against every obstacle
    ///
    /// A push pointing upwards floors the vertical velocity at zero and
    /// counts as ground contact. The velocity becomes the net displacement.
    pub fn integrate(&mut self, config: &PhysicsConfig, colliders: &ColliderSet) {
        let previous = self.position;
        self.position += self.velocity;

        let pushes = colliders.resolve_sphere(&mut self.position, self.radius);
        self.grounded = pushes
            .iter()
            .any(|push| push.safe_normalized().dot(Vec3::Y) > config.ground_cosine);
        if self.grounded {
            self.velocity.y = self.velocity.y.max(0.0);
        }
        self.velocity = self.position - previous;
    }

    /// Run one full movement step
    pub fn step(
        &mut self,
        config: &PhysicsConfig,
        input: &MoveInput,
        facing: Quat,
        boosts: Boosts,
        colliders: &ColliderSet,
        dt: f32,
    ) {
        self.apply_input(config, input, facing, boosts, dt);
        self.limit_horizontal_speed(config, boosts, dt);
        self.apply_gravity_and_jump(config, input.jump, boosts, dt);
        self.integrate(config, colliders);
    }

    /// Check if the player is currently in the air (not grounded)
    pub fn is_airborne(&self) -> bool {
        !self.grounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::{Collider, ColliderShape};
    use gauntlet_core::{SceneGraph, SceneNode, Transform};
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 0.0001;
    const DT: f32 = 1.0 / 60.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn floor_set() -> ColliderSet {
        let mut graph = SceneGraph::new();
        let mut set = ColliderSet::new();
        let transform = Transform::from_position(Vec3::new(0.0, -0.5, 0.0));
        let node = graph.insert(SceneNode::new().with_transform(transform));
        set.insert_obstacle(Collider::new(node, ColliderShape::cuboid(Vec3::new(100.0, 1.0, 100.0)), &transform));
        set
    }

    #[test]
    fn test_new_player() {
        let player = PlayerPhysics::new(Vec3::new(0.0, 5.0, 0.0), 0.4);
        assert_eq!(player.velocity, Vec3::ZERO);
        assert!(player.is_airborne());
        assert_eq!(player.current_max_speed, 0.0);
    }

    #[test]
    fn test_local_direction() {
        let input = MoveInput { forward: true, right: true, ..Default::default() };
        assert_eq!(input.local_direction(), Vec3::new(1.0, 0.0, -1.0));
        let none = MoveInput { forward: true, backward: true, ..Default::default() };
        assert_eq!(none.local_direction(), Vec3::ZERO);
    }

    #[test]
    fn test_terminal_velocity_holds_while_falling() {
        let config = PhysicsConfig::default();
        let mut player = PlayerPhysics::new(Vec3::new(0.0, 30.0, 0.0), 0.4);
        player.velocity = Vec3::new(0.0, -0.5, 0.0);

        player.step(&config, &MoveInput::default(), Quat::IDENTITY, Boosts::default(), &ColliderSet::new(), DT);
        assert!(approx_eq(player.velocity.y, -0.5));
        assert!(approx_eq(player.position.y, 29.5));
    }

    #[test]
    fn test_lands_on_floor() {
        let config = PhysicsConfig::default();
        let colliders = floor_set();
        let mut player = PlayerPhysics::new(Vec3::new(0.0, 3.0, 0.0), 0.4);

        for _ in 0..200 {
            player.step(&config, &MoveInput::default(), Quat::IDENTITY, Boosts::default(), &colliders, DT);
        }

        assert!(player.grounded);
        assert!(approx_eq(player.position.y, 0.4));
        assert!(player.velocity.y.abs() < 0.01);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let config = PhysicsConfig::default();
        let mut player = PlayerPhysics::new(Vec3::new(0.0, 5.0, 0.0), 0.4);

        player.apply_gravity_and_jump(&config, true, Boosts::default(), DT);
        assert!(player.velocity.y < 0.0);

        player.grounded = true;
        player.velocity.y = 0.0;
        player.apply_gravity_and_jump(&config, true, Boosts::default(), DT);
        assert!(approx_eq(player.velocity.y, 0.1));
        assert!(!player.grounded);

        player.grounded = true;
        player.apply_gravity_and_jump(&config, true, Boosts { high_jump: true, speed: false }, DT);
        assert!(approx_eq(player.velocity.y, 0.3));
    }

    #[test]
    fn test_speed_cap_eases_towards_max() {
        let config = PhysicsConfig::default();
        let mut player = PlayerPhysics::new(Vec3::ZERO, 0.4);
        player.grounded = true;
        let forward = MoveInput { forward: true, ..Default::default() };

        for _ in 0..600 {
            player.apply_input(&config, &forward, Quat::IDENTITY, Boosts::default(), DT);
            player.limit_horizontal_speed(&config, Boosts::default(), DT);
        }
        let h = Vec3::new(player.velocity.x, 0.0, player.velocity.z).length();
        assert!(h <= config.max_speed + EPSILON);
        assert!(approx_eq(player.current_max_speed, config.max_speed));
        // moving towards -Z
        assert!(player.velocity.z < 0.0);
    }

    #[test]
    fn test_facing_rotates_input() {
        let config = PhysicsConfig::default();
        let mut player = PlayerPhysics::new(Vec3::ZERO, 0.4);
        player.grounded = true;
        let forward = MoveInput { forward: true, ..Default::default() };
        // quarter turn left: forward becomes -X
        player.apply_input(&config, &forward, Quat::from_axis_angle(Vec3::Y, FRAC_PI_2), Boosts::default(), DT);
        assert!(player.velocity.x < 0.0);
        assert!(player.velocity.z.abs() < EPSILON);
    }

    #[test]
    fn test_velocity_is_net_displacement() {
        let config = PhysicsConfig::default();
        let colliders = floor_set();
        let mut player = PlayerPhysics::new(Vec3::new(0.0, 0.35, 0.0), 0.4);
        player.velocity = Vec3::new(0.0, -0.1, 0.0);

        let before = player.position;
        player.integrate(&config, &colliders);
        assert!(player.grounded);
        assert_eq!(player.velocity, player.position - before);
        assert!(approx_eq(player.position.y, 0.4));
    }

    #[test]
    fn test_wall_push_is_not_ground() {
        let config = PhysicsConfig::default();
        let mut graph = SceneGraph::new();
        let mut walls = ColliderSet::new();
        let transform = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
        let node = graph.insert(SceneNode::new().with_transform(transform));
        walls.insert_obstacle(Collider::new(node, ColliderShape::cuboid(Vec3::new(1.0, 10.0, 1.0)), &transform));

        let mut player = PlayerPhysics::new(Vec3::new(0.3, 0.0, 0.0), 0.4);
        player.integrate(&config, &walls);
        assert!(!player.grounded);
        assert!(approx_eq(player.position.x, 0.1));
        assert!(approx_eq(player.velocity.x, -0.2));
    }
}
