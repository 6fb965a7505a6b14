//! Collision resolution properties over many sampled configurations
//!
//! Samples are drawn from a seeded generator so failures are reproducible.

use gauntlet_core::{SceneGraph, SceneNode, Transform};
use gauntlet_math::{Mulberry32, Quat, Vec3};
use gauntlet_physics::{Collider, ColliderSet, ColliderShape, PhysicsConfig, PlayerPhysics};

const EPSILON: f32 = 0.0001;
const SAMPLES: usize = 2000;

fn random_vec(rng: &mut Mulberry32, extent: f32) -> Vec3 {
    Vec3::new(
        (rng.next_f32() * 2.0 - 1.0) * extent,
        (rng.next_f32() * 2.0 - 1.0) * extent,
        (rng.next_f32() * 2.0 - 1.0) * extent,
    )
}

fn random_box(rng: &mut Mulberry32) -> Collider {
    let size = Vec3::new(
        0.2 + rng.next_f32() * 4.0,
        0.2 + rng.next_f32() * 4.0,
        0.2 + rng.next_f32() * 4.0,
    );
    let axis = random_vec(rng, 1.0).safe_normalized();
    let axis = if axis == Vec3::ZERO { Vec3::Y } else { axis };
    let transform = Transform::from_position_rotation(
        random_vec(rng, 3.0),
        Quat::from_axis_angle(axis, rng.next_f32() * std::f32::consts::TAU),
    );
    Collider::new(Default::default(), ColliderShape::cuboid(size), &transform)
}

#[test]
fn test_box_push_separates_sphere() {
    let mut rng = Mulberry32::new(17);
    let mut hits = 0;
    for _ in 0..SAMPLES {
        let collider = random_box(&mut rng);
        let point = collider.position() + random_vec(&mut rng, 2.5);
        let radius = 0.1 + rng.next_f32() * 0.5;

        if let Some(push) = collider.resolve_collision(point, radius) {
            hits += 1;
            let residual = collider.resolve_collision(point + push, radius);
            assert!(
                residual.map_or(true, |r| r.length() < EPSILON * 10.0),
                "sphere still inside after push {:?}: {:?}",
                push,
                residual
            );
        }
    }
    // the sampling volume must actually exercise the hit path
    assert!(hits > SAMPLES / 10, "only {} hits", hits);
}

#[test]
fn test_box_push_is_axis_aligned_in_local_space() {
    let mut rng = Mulberry32::new(5);
    for _ in 0..SAMPLES {
        let collider = random_box(&mut rng);
        let point = collider.position() + random_vec(&mut rng, 2.0);
        if let Some(push) = collider.resolve_collision(point, 0.4) {
            let local = collider.matrix_inverse().transform_vector(push);
            let nonzero = [local.x, local.y, local.z]
                .iter()
                .filter(|c| c.abs() > EPSILON)
                .count();
            assert!(nonzero <= 1, "push {:?} is not along one box axis", local);
        }
    }
}

#[test]
fn test_sphere_push_reaches_combined_radius() {
    let mut rng = Mulberry32::new(99);
    for _ in 0..SAMPLES {
        let center = random_vec(&mut rng, 3.0);
        let collider_radius = 0.2 + rng.next_f32() * 3.0;
        let collider = Collider::new(
            Default::default(),
            ColliderShape::sphere(collider_radius),
            &Transform::from_position(center),
        );
        let point = center + random_vec(&mut rng, 3.0);
        let radius = 0.1 + rng.next_f32() * 0.5;

        match collider.resolve_collision(point, radius) {
            Some(push) if (point - center).length() > EPSILON => {
                let distance = (point + push - center).length();
                assert!((distance - (collider_radius + radius)).abs() < EPSILON * 10.0);
            }
            Some(_) => {}
            None => assert!((point - center).length() >= collider_radius + radius),
        }
    }
}

#[test]
fn test_player_never_falls_through_floor() {
    let config = PhysicsConfig::default();
    let mut graph = SceneGraph::new();
    let mut colliders = ColliderSet::new();
    let transform = Transform::from_position(Vec3::new(0.0, -0.5, 0.0));
    let floor = graph
        .insert_child(graph.root(), SceneNode::new().with_transform(transform))
        .unwrap();
    colliders.insert_obstacle(Collider::new(
        floor,
        ColliderShape::cuboid(Vec3::new(50.0, 1.0, 50.0)),
        &transform,
    ));

    let mut player = PlayerPhysics::new(Vec3::new(0.0, 30.0, 0.0), config.player_radius);
    player.velocity = Vec3::new(0.0, config.terminal_velocity, 0.0);
    let dt = config.step() as f32;
    for _ in 0..600 {
        player.step(
            &config,
            &Default::default(),
            Quat::IDENTITY,
            Default::default(),
            &colliders,
            dt,
        );
        assert!(player.position.y > 0.0);
    }
    assert!(player.grounded);
}
