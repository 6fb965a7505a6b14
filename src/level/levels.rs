//! Built-in levels
//!
//! Each level is a plain function feeding a [`LevelBuilder`]. The sandbox
//! level is a small playground with one of every object and is not part of
//! the regular progression.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use gauntlet_core::Material;
use gauntlet_math::{lerp, Mulberry32, Vec3};

use super::behavior::{Axis, UpdateBehavior};
use super::builder::{LevelBuilder, LevelMaterial as M};
use super::PowerupKind;

/// Function placing the objects of one level
pub type LevelFn = fn(&mut LevelBuilder<'_>);

/// The regular level progression
pub const LEVELS: [(&str, LevelFn); 8] = [
    ("Level 1", level1),
    ("Level 2", level2),
    ("Level 3", level3),
    ("Level 4", level4),
    ("Level 5", level5),
    ("Level 6", level6),
    ("Level 7", level7),
    ("Level 8", level8),
];

/// Level index after which the game pauses to congratulate the player
pub const INTERMISSION_LEVEL: usize = 4;

fn v(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z)
}

fn tinted(r: f32, g: f32, b: f32) -> M {
    M::Custom(Material::from_rgb(r, g, b).with_texture_scale(0.2))
}

/// Playground with one of everything
pub fn sandbox(b: &mut LevelBuilder<'_>) {
    b.set_spawn(v(0.0, 1.0, 0.0), 0.0);

    b.collidable_box(v(20.0, 1.0, 20.0), v(0.0, -0.6, 0.0), M::Solid);
    b.collidable_sphere(2.0, v(4.0, 0.5, 4.0), M::Stone);

    let sliding = b.collidable_box(v(2.0, 1.0, 2.0), v(3.0, 1.0, 0.0), tinted(0.0, 0.0, 1.0));
    b.add_behavior(
        sliding,
        UpdateBehavior::Sliding {
            axis: Axis::X,
            center: 1.0,
            amplitude: 2.0,
            speed: 2.0,
        },
    );

    let lift = b.collidable_box(v(2.0, 1.0, 2.0), v(2.0, 0.0, 1.0), tinted(0.0, 1.0, 1.0));
    b.add_behavior(
        lift,
        UpdateBehavior::Sliding {
            axis: Axis::Y,
            center: 1.0,
            amplitude: 3.0,
            speed: 2.0,
        },
    );

    let tumbler = b.collidable_box(v(10.0, 10.0, 1.0), v(10.0, 4.0, 1.0), tinted(1.0, 0.0, 1.0));
    b.add_behavior(
        tumbler,
        UpdateBehavior::Tumbling {
            axis: Vec3::X,
            speed: 4.0,
            wobble: 4.0,
            phase: FRAC_PI_2,
        },
    );

    b.trampoline(v(2.0, 1.0, 2.0), v(-2.0, 0.0, -2.0), Some(tinted(1.0, 1.0, 1.0)));
    b.saw_blade(3.0, v(0.0, 2.0, -2.0), 0.0);
    b.powerup(PowerupKind::SpeedBoost, v(-5.0, 1.0, -5.0));
    b.powerup(PowerupKind::HighJump, v(-5.0, 1.0, -3.0));
    b.spikes(10, 10, v(-5.0, 0.9, 5.0), 2.0, 0.0);
    b.finish_object(v(0.0, -0.1, -8.0), 0.0);
}

pub fn level1(b: &mut LevelBuilder<'_>) {
    b.set_spawn(v(0.0, 30.0, 0.0), 0.0);
    b.set_light(v(1.0, 3.0, -3.0));

    b.collidable_box(v(10.0, 10.0, 10.0), v(0.0, 0.0, -2.0), M::Solid);
    b.collidable_box(v(3.0, 10.0, 3.0), v(0.0, 0.0, -10.0), M::Solid);
    b.rotated_box(v(3.0, 10.0, 3.0), v(4.0, 0.0, -14.0), Vec3::Y, FRAC_PI_4, M::Solid);

    let elevator = b.collidable_box(v(3.0, 20.0, 3.0), v(8.0, 0.0, -16.0), M::Elevator);
    b.elevator(elevator, -5.0, 0.0, 1.0, 0.0, Axis::Y);

    b.rotated_box(v(11.0, 1.0, 3.0), v(17.0, 11.0, -16.0), Vec3::Z, 0.2, M::Solid);
    b.collidable_box(v(2.0, 20.0, 1.0), v(17.0, 1.0, -16.0), M::Solid);

    b.collidable_sphere(5.0, v(28.0, 2.0, -16.0), M::Solid);
    b.collidable_sphere(5.0, v(28.0, 9.0, -16.0), M::Sphere);

    b.collidable_box(v(10.0, 10.0, 10.0), v(41.0, 2.0, -15.0), M::Solid);
    b.collidable_box(v(2.0, 10.0, 2.0), v(44.0, 0.0, -6.0), M::Solid);
    b.rotated_box(v(2.0, 10.0, 2.0), v(44.0, 0.0, -1.0), Vec3::Y, FRAC_PI_4, M::Solid);
    b.rotated_box(v(2.0, 10.0, 2.0), v(47.0, 0.0, 3.0), Vec3::Y, FRAC_PI_4, M::Solid);
    b.rotated_box(v(2.0, 10.0, 2.0), v(41.0, 0.0, 3.0), Vec3::Y, FRAC_PI_4, M::Solid);
    b.collidable_box(v(12.0, 10.0, 10.0), v(44.0, 1.0, 9.0), M::Solid);

    b.finish_object(v(44.0, 6.0, 10.0), 0.0);
}

pub fn level2(b: &mut LevelBuilder<'_>) {
    b.set_spawn(v(0.0, 30.0, 0.0), 0.0);
    b.set_light(v(1.0, 3.0, -3.0));

    b.collidable_box(v(10.0, 10.0, 10.0), v(0.0, 0.0, -2.0), M::Solid);

    for position in [v(0.0, 5.0, -14.0), v(0.0, 15.0, -14.0), v(0.0, 10.0, -24.0)] {
        let block = b.collidable_box(v(10.0, 1.0, 10.0), position, M::Tilting);
        b.tilting_block(block, 0.5, 1.0, Axis::X, 0.8, -1.0);
    }
    for x in [-5.25, 5.25] {
        b.collidable_box(v(0.5, 32.0, 0.5), v(x, 0.0, -14.0), M::Solid);
        b.collidable_box(v(0.5, 22.0, 0.5), v(x, 0.0, -24.0), M::Solid);
    }

    b.collidable_box(v(5.0, 35.0, 5.0), v(10.0, 0.0, -8.0), M::Solid);
    b.rotated_box(v(2.0, 20.0, 5.0), v(23.0, 0.0, -8.0), Vec3::Z, 0.6, M::Solid);
    b.rotated_box(v(2.0, 20.0, 5.0), v(26.0, 0.0, -8.0), Vec3::Z, 0.9, M::Solid);
    b.rotated_box(v(2.0, 20.0, 5.0), v(30.0, 0.0, -8.0), Vec3::Z, 1.2, M::Solid);
    b.collidable_box(v(20.0, 3.0, 5.0), v(35.0, 0.0, -8.0), M::Solid);
    b.trampoline(v(3.0, 1.0, 3.0), v(43.0, 1.2, -8.0), None);

    let seesaw = b.collidable_box(v(8.0, 1.0, 4.0), v(53.0, 5.0, -8.0), M::Tilting);
    for z in [-2.01 + 0.15, 2.01 - 0.15] {
        let side = gauntlet_core::Mesh::new(
            std::sync::Arc::new(gauntlet_core::geometry::box_geometry(8.01, 1.01, 0.3)),
            Material::from_rgb(0.0, 1.0, 0.0),
        );
        b.add_mesh_child(seesaw, side, v(0.0, 0.0, z));
    }
    b.tilting_block(seesaw, 0.5, 2.0, Axis::X, 0.2, 0.0);

    b.collidable_box(v(10.0, 20.0, 30.0), v(60.0, 0.0, -28.0), M::Solid);
    b.collidable_box(v(0.5, 0.5, 10.0), v(57.25, 5.0, -13.0), M::Solid);
    b.collidable_box(v(6.0, 5.0, 10.1), v(58.0, 12.5, -28.0), M::Solid);

    for i in 0..5 {
        let pusher = b.collidable_box(v(4.5, 4.0, 2.0), v(0.0, 12.0, i as f32 * 2.0 - 32.0), M::Moving);
        b.elevator(pusher, 59.0, 63.0, 2.0, i as f32 * 0.5, Axis::X);
    }

    b.finish_object(v(60.0, 10.0, -40.0), 0.0);
}

pub fn level3(b: &mut LevelBuilder<'_>) {
    b.set_spawn(v(0.0, 30.0, 0.0), 0.0);
    b.set_light(v(1.0, 3.0, -3.0));

    b.collidable_box(v(10.0, 10.0, 10.0), v(0.0, 0.0, -2.0), M::Solid);
    let lift = b.collidable_box(v(5.0, 10.0, 2.0), v(0.0, 0.0, -5.9), M::Elevator);
    b.elevator(lift, 0.01, 5.0, 3.0, 0.0, Axis::Y);

    b.collidable_box(v(4.0, 20.0, 11.0), v(0.0, 0.0, -18.0), M::Solid);
    b.spikes(10, 5, v(0.0, 11.0, -18.0), 2.0, 0.0);
    b.spikes(10, 5, v(0.0, 11.0, -20.0), 2.0, -1.0);
    b.spikes(10, 5, v(0.0, 11.0, -22.0), 2.0, -2.0);

    for z in [-27.0, -31.0, -35.0] {
        b.collidable_sphere(1.2, v(0.0, 8.0, z), M::Sphere);
    }
    for z in [-27.0, -31.0, -35.0] {
        b.collidable_box(v(1.0, 15.0, 1.0), v(0.0, 0.0, z), M::Solid);
    }

    b.collidable_box(v(12.0, 10.0, 20.0), v(0.0, 0.0, -50.0), M::Solid);
    for i in 0..10 {
        let saw = b.saw_blade(3.0, v(0.0, 5.0, -50.0 - i as f32), 0.0);
        b.elevator(saw, -5.0, 5.0, 3.0, -(i as f32) / 2.0, Axis::X);
    }

    b.rotated_box(v(10.0, 1.0, 10.0), v(-5.0, 3.0, -68.0), Vec3::Z, -0.4, M::Solid);
    b.rotated_box(v(10.0, 5.0, 20.0), v(0.0, -1.5, -80.0), Vec3::X, 0.2, M::Solid);
    b.collidable_box(v(11.0, 5.0, 20.0), v(0.0, 1.0, -102.0), M::Solid);

    for i in 0..27 {
        b.spikes(1, 10, v(i as f32 * 0.4 - 5.2, 4.5, -97.0), 2.0, i as f32 / 3.0);
    }

    b.finish_object(v(0.0, 3.5, -108.0), 0.0);
}

pub fn level4(b: &mut LevelBuilder<'_>) {
    b.set_spawn(v(0.0, 30.0, 0.0), 0.0);
    b.set_light(v(-3.0, 3.0, -1.0));

    b.collidable_box(v(10.0, 10.0, 20.0), v(0.0, 0.0, -5.0), M::Solid);
    b.powerup(PowerupKind::HighJump, v(0.0, 6.0, -10.0));
    b.collidable_box(v(10.0, 15.0, 10.0), v(0.0, 5.0, -25.0), M::Solid);

    // quarter circle of rising stepping stones
    for i in 0..=7 {
        let angle = FRAC_PI_2 * i as f32 / 7.0;
        let x = -(FRAC_PI_2 - angle).sin() * 20.0;
        let z = -(FRAC_PI_2 - angle).cos() * 20.0;
        let i = i as f32;
        b.collidable_sphere(1.5, v(20.0 + x, 8.0 + i, -35.0 + z), M::Sphere);
        b.collidable_box(v(1.0, 15.0 + i, 1.0), v(20.0 + x, i * 0.5, -35.0 + z), M::Solid);
    }

    let pole = b.collidable_box(v(1.0, 30.0, 1.0), v(25.0, 0.0, -55.0), M::Elevator);
    b.elevator(pole, 0.0, 10.0, 1.0, 0.0, Axis::Y);

    b.collidable_box(v(10.0, 50.0, 10.0), v(32.0, 0.0, -50.0), M::Solid);
    b.collidable_box(v(30.0, 40.0, 5.0), v(55.0, 0.0, -50.0), M::Solid);
    b.powerup(PowerupKind::SpeedBoost, v(45.0, 21.0, -50.0));
    b.powerup(PowerupKind::SpeedBoost, v(65.0, 21.0, -50.0));

    b.collidable_box(v(10.0, 35.0, 5.0), v(85.0, 0.0, -50.0), M::Solid);
    b.powerup(PowerupKind::SpeedBoost, v(85.0, 18.5, -50.0));

    b.rotated_box(v(10.0, 30.0, 10.0), v(100.0, 0.0, -40.0), Vec3::Y, FRAC_PI_4, M::Solid);
    b.collidable_box(v(5.0, 25.0, 10.0), v(100.0, 0.0, -20.0), M::Solid);
    b.powerup(PowerupKind::SpeedBoost, v(100.0, 13.5, -20.0));

    b.rotated_box(v(5.0, 30.0, 1.0), v(100.0, 15.0, -14.0), Vec3::X, 0.6, M::Solid);
    b.collidable_box(v(10.0, 25.0, 30.0), v(100.0, 0.0, 35.0), M::Solid);

    b.finish_object(v(100.0, 12.5, 48.0), 0.0);
}

pub fn level5(b: &mut LevelBuilder<'_>) {
    b.set_spawn(v(0.0, 30.0, 0.0), 0.0);
    b.set_light(v(1.0, 3.0, -3.0));

    b.collidable_box(v(10.0, 10.0, 20.0), v(0.0, 0.0, -5.0), M::Solid);
    b.collidable_box(v(40.0, 10.0, 10.0), v(0.0, 0.0, -60.0), M::Solid);
    b.collidable_box(v(20.0, 10.0, 11.0), v(0.0, 0.0, -102.0), M::Solid);

    let mut rng = Mulberry32::new(4);
    for _ in 0..40 {
        let x = lerp(-20.0, 20.0, rng.next_f32());
        let y = lerp(2.0, 5.0, rng.next_f32());
        let z = lerp(-55.0, -18.0, rng.next_f32());
        let radius = lerp(1.2, 1.8, rng.next_f32());
        b.collidable_sphere(radius, v(x, y, z), M::Sphere);
        b.collidable_box(v(1.0, 15.0, 1.0), v(x, y - 7.5, z), M::Solid);
    }

    // bare pillars, turned at random
    let mut rng = Mulberry32::new(6);
    for _ in 0..40 {
        let x = lerp(-10.0, 10.0, rng.next_f32());
        let y = lerp(3.0, 5.0, rng.next_f32());
        let z = lerp(-95.0, -65.0, rng.next_f32());
        let angle = rng.next_f32() * PI;
        b.rotated_box(v(1.0, 15.0, 1.0), v(x, y - 7.5, z), Vec3::Y, angle, M::Solid);
    }

    b.finish_object(v(0.0, 5.0, -105.0), 0.0);
}

pub fn level6(b: &mut LevelBuilder<'_>) {
    b.set_spawn(v(0.0, 30.0, 0.0), 0.0);
    b.set_light(v(1.0, 3.0, 3.0));

    b.collidable_box(v(10.0, 5.0, 30.0), v(0.0, 0.0, -10.0), M::Solid);

    let wheels = [(v(0.0, 7.0, -20.0), 1.0, 0.0), (v(8.0, 14.0, -20.0), -1.0, FRAC_PI_2), (v(0.0, 21.0, -20.0), 1.0, 0.0)];
    for (position, speed, phase) in wheels {
        let wheel = b.collidable_box(v(10.0, 1.0, 10.0), position, M::Tilting);
        b.add_behavior(wheel, UpdateBehavior::Rotating { axis: Vec3::Z, speed, phase });
    }
    for z in [-25.25, -14.75] {
        b.collidable_box(v(0.5, 50.0, 0.5), v(0.0, 0.0, z), M::Solid);
        b.collidable_box(v(0.5, 30.0, 0.5), v(8.0, 0.0, z), M::Solid);
    }

    b.collidable_box(v(10.0, 1.0, 10.0), v(-10.0, 25.0, -20.0), M::Solid);
    b.collidable_box(v(1.0, 50.0, 1.0), v(-10.0, 0.0, -20.0), M::Solid);
    b.collidable_box(v(40.0, 50.0, 10.0), v(-36.0, 0.0, -20.0), M::Solid);

    let crusher = b.collidable_box(v(10.0, 10.0, 10.0), v(-26.0, 30.0, 0.0), M::Moving);
    b.elevator(crusher, -24.0, -16.0, 1.2, 0.0, Axis::Z);

    let lift = b.collidable_box(v(2.0, 10.0, 5.0), v(-50.0, 0.0, -20.0), M::Elevator);
    b.elevator(lift, 20.01, 30.0, 3.0, 0.0, Axis::Y);

    b.collidable_box(v(1.0, 90.0, 10.0), v(-60.0, 0.0, -20.0), M::Solid);
    b.collidable_box(v(1.0, 70.0, 10.0), v(-70.0, 0.0, -20.0), M::Solid);
    for i in 0..10 {
        let z = -24.5 + i as f32;
        b.saw_blade(3.0, v(-60.0, 45.0, z), 0.0);
        b.saw_blade(3.0, v(-70.0, 35.0, z), 0.0);
    }

    b.collidable_box(v(2.0, 60.0, 10.0), v(-65.0, 0.0, -20.0), M::Solid);
    b.trampoline(v(1.99, 0.5, 9.99), v(-65.0, 30.0, -20.0), None);
    b.collidable_box(v(20.0, 50.0, 10.0), v(-85.0, 0.0, -20.0), M::Solid);

    b.finish_object(v(-94.0, 25.0, -20.0), FRAC_PI_2);
}

pub fn level7(b: &mut LevelBuilder<'_>) {
    b.set_spawn(v(0.0, 30.0, 0.0), 0.0);
    b.set_light(v(-3.0, 3.0, -1.0));

    b.collidable_box(v(10.0, 5.0, 35.0), v(0.0, 0.0, -15.0), M::Solid);
    for i in 0..10 {
        let saw = b.saw_blade(1.5, v(i as f32 - 4.5, 2.5, 0.0), -FRAC_PI_2);
        b.elevator(saw, -25.0, -15.0, 3.0, i as f32, Axis::Z);
    }

    b.rotated_box(v(10.0, 2.0, 20.0), v(0.0, -1.0, -45.0), Vec3::X, 0.2, M::Solid);
    b.powerup(PowerupKind::HighJump, v(0.0, 2.0, -52.0));

    b.collidable_box(v(5.0, 20.0, 5.0), v(0.0, 0.0, -60.0), M::Solid);
    b.collidable_box(v(5.0, 35.0, 5.0), v(0.0, 0.0, -72.0), M::Solid);
    b.collidable_box(v(5.0, 50.0, 5.0), v(10.0, 0.0, -72.0), M::Solid);
    b.collidable_box(v(10.0, 40.0, 5.0), v(20.0, 0.0, -72.0), M::Solid);
    b.powerup(PowerupKind::SpeedBoost, v(20.0, 21.0, -72.0));

    b.rotated_box(v(5.0, 35.0, 5.0), v(37.0, 0.0, -65.0), Vec3::Y, -0.3, M::Solid);
    b.rotated_box(v(5.0, 30.0, 5.0), v(45.0, 0.0, -50.0), Vec3::Y, 1.0, M::Solid);

    b.collidable_box(v(5.0, 25.0, 5.0), v(55.0, 0.0, -40.0), M::Solid);
    b.collidable_box(v(5.0, 20.0, 5.0), v(55.0, 0.0, -25.0), M::Solid);
    b.trampoline(v(4.99, 0.5, 4.99), v(55.0, 10.0, -25.0), None);
    b.collidable_box(v(10.0, 20.0, 5.0), v(55.0, 0.0, -12.0), M::Solid);

    b.finish_object(v(55.0, 10.0, -10.0), 0.0);
}

pub fn level8(b: &mut LevelBuilder<'_>) {
    b.set_spawn(v(0.0, 30.0, -2.0), PI);
    b.set_light(v(3.0, 3.0, -1.0));

    b.collidable_box(v(10.0, 5.0, 20.0), v(0.0, 0.0, 5.0), M::Solid);
    let lift = b.collidable_box(v(5.0, 10.0, 2.0), v(0.0, 0.0, 10.0), M::Elevator);
    b.elevator(lift, -2.49, 7.0, 4.0, 0.0, Axis::Y);

    // first shaft
    for x in [-5.5, 5.5] {
        b.collidable_box(v(1.0, 50.0, 10.0), v(x, 0.0, 10.0), M::Solid);
    }
    b.collidable_box(v(12.0, 50.0, 1.0), v(0.0, 0.0, 15.5), M::Solid);
    b.collidable_box(v(12.0, 15.0, 1.0), v(0.0, 17.5, 4.5), M::Solid);

    for i in 0..10 {
        let saw = b.saw_blade(3.0, v(4.5 - i as f32, 20.0, 0.0), FRAC_PI_2);
        b.elevator(saw, 6.0, 14.0, 3.23, 0.0, Axis::Z);
    }
    let axle = b.collidable_box(v(10.0, 0.3, 0.3), v(0.0, 20.0, 0.0), M::Elevator);
    b.elevator(axle, 6.0, 14.0, 3.23, 0.0, Axis::Z);

    // second shaft
    b.collidable_box(v(10.0, 40.0, 10.0), v(0.0, 0.0, 20.0), M::Solid);
    for x in [-5.5, 5.5] {
        b.collidable_box(v(1.0, 80.0, 10.0), v(x, 0.0, 35.0), M::Solid);
    }
    b.collidable_box(v(12.0, 55.0, 1.0), v(0.0, 0.0, 29.5), M::Solid);
    b.collidable_box(v(12.0, 31.0, 1.0), v(0.0, 24.5, 40.5), M::Solid);
    b.collidable_box(v(10.0, 5.0, 80.0), v(0.0, 0.0, 70.0), M::Solid);
    b.powerup(PowerupKind::HighJump, v(0.0, 21.0, 24.0));

    // alternating saw rows sweeping the shaft: (height, along x, min, max, offset)
    let rows = [
        (25.0, true, 31.0, 39.0, 0.0),
        (20.0, false, -4.0, 4.0, 1.0),
        (15.0, true, 31.0, 39.0, 2.0),
        (10.0, false, -4.0, 4.0, 3.0),
    ];
    for (y, along_x, min, max, offset) in rows {
        let (size, axis) = if along_x {
            (v(10.0, 0.3, 0.3), Axis::Z)
        } else {
            (v(0.3, 0.3, 10.0), Axis::X)
        };
        let position = if along_x { v(0.0, y, 0.0) } else { v(0.0, y, 35.0) };
        let axle = b.collidable_box(size, position, M::Elevator);
        b.elevator(axle, min, max, 3.23, offset, axis);
    }
    for (y, along_x, min, max, offset) in rows {
        for i in 0..10 {
            let i = i as f32;
            let (position, angle, axis) = if along_x {
                (v(4.5 - i, y, 0.0), FRAC_PI_2, Axis::Z)
            } else {
                (v(0.0, y, 39.5 - i), 0.0, Axis::X)
            };
            let saw = b.saw_blade(3.0, position, angle);
            b.elevator(saw, min, max, 3.23, offset, axis);
        }
    }

    b.powerup(PowerupKind::SpeedBoost, v(0.0, 3.5, 45.0));
    for i in 0..100 {
        b.spikes(25, 1, v(0.0, 3.5, 50.0 + i as f32 * 0.4), 10.0, -(i as f32) / 3.0);
    }

    b.finish_object(v(0.0, 2.5, 108.0), 0.0);
}
