//! Saw blade and spike meshes

use std::f32::consts::TAU;

use gauntlet_core::geometry::{extruded_convex, join};
use gauntlet_core::{Geometry, Material};
use gauntlet_math::{Quat, Vec3};

const BLADE_RADIUS: f32 = 0.4;
const BLADE_SEGMENTS: usize = 24;
const BLADE_TEETH: usize = 8;
const TOOTH_INSET: f32 = 0.1;
const TOOTH_OUTLINE: [f32; 10] = [-0.2, 0.0, 0.1, 0.4, 0.3, 0.4, 0.2, 0.2, 0.2, 0.0];

const SPIKE_RADIUS: f32 = 0.2;
const SPIKE_HEIGHT: f32 = 2.0;
const SPIKE_SEGMENTS: u32 = 8;

/// Brushed metal shared by the hazards
fn metal(texture_scale: f32) -> Material {
    Material::WHITE
        .with_metallic(0.8)
        .with_roughness(0.3)
        .with_texture_scale(texture_scale)
}

pub fn saw_material() -> Material {
    metal(0.5)
}

pub fn spike_material() -> Material {
    metal(1.0)
}

/// Toothed disc of diameter `0.8 * size` in the XY plane
///
/// The disc is 0.2 thick and the teeth 0.04 regardless of `size`.
pub fn saw_blade_geometry(size: f32) -> Geometry {
    let outline: Vec<f32> = (0..BLADE_SEGMENTS)
        .flat_map(|i| {
            let angle = TAU * i as f32 / BLADE_SEGMENTS as f32;
            [angle.sin() * BLADE_RADIUS, angle.cos() * BLADE_RADIUS]
        })
        .collect();

    let disc = extruded_convex(&outline, 0.2 / size).scaled(size);
    let tooth = extruded_convex(&TOOTH_OUTLINE, 0.04 / size).scaled(size);

    let mut parts = vec![disc];
    for i in 0..BLADE_TEETH {
        let angle = TAU * i as f32 / BLADE_TEETH as f32;
        let rotation = Quat::from_axis_angle(-Vec3::Z, angle);
        let offset = Vec3::new(angle.sin(), angle.cos(), 0.0) * ((BLADE_RADIUS - TOOTH_INSET) * size);
        parts.push(tooth.transformed(rotation, offset));
    }
    join(&parts)
}

/// Grid of `count_x` by `count_z` cones, 0.4 apart, centered on the origin
///
/// Each cone is an open 8-sided fan with its own apex vertex per side so
/// the side normals stay horizontal.
pub fn spike_geometry(count_x: u32, count_z: u32) -> Geometry {
    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    for i in 0..=SPIKE_SEGMENTS {
        let angle = TAU * i as f32 / SPIKE_SEGMENTS as f32;
        let (x, z) = (angle.sin(), angle.cos());
        vertices.extend_from_slice(&[x * SPIKE_RADIUS, -SPIKE_HEIGHT / 2.0, z * SPIKE_RADIUS, 0.0, SPIKE_HEIGHT / 2.0, 0.0]);
        normals.extend_from_slice(&[x, 0.0, z, x, 0.0, z]);
    }
    let triangles: Vec<u32> = (0..SPIKE_SEGMENTS).flat_map(|i| [i * 2 + 2, i * 2 + 1, i * 2]).collect();
    let cone = Geometry::new(vertices, normals, triangles);

    let spacing = |index: u32, count: u32| (index as f32 * 2.0 + 1.0 - count as f32) * SPIKE_RADIUS;
    let cones: Vec<Geometry> = (0..count_x)
        .flat_map(|i| (0..count_z).map(move |j| (i, j)))
        .map(|(i, j)| cone.clone().translated(Vec3::new(spacing(i, count_x), 0.0, spacing(j, count_z))))
        .collect();
    join(&cones)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn extent(geometry: &Geometry, axis: usize) -> (f32, f32) {
        geometry
            .vertices()
            .chunks_exact(3)
            .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v[axis]), hi.max(v[axis])))
    }

    #[test]
    fn test_saw_blade_thickness_ignores_size() {
        for size in [1.0, 2.04] {
            let blade = saw_blade_geometry(size);
            let (lo, hi) = extent(&blade, 2);
            assert!(approx_eq(hi - lo, 0.2), "size {} gave thickness {}", size, hi - lo);
            assert!(blade.indices_in_range());
        }
    }

    #[test]
    fn test_saw_blade_teeth_reach_past_disc() {
        let blade = saw_blade_geometry(1.0);
        let (_, top) = extent(&blade, 1);
        assert!(top > BLADE_RADIUS + 0.25);

        // the first tooth points up: inset 0.3 plus tooth height 0.4
        let upright_tip = blade
            .vertices()
            .chunks(3)
            .any(|v| approx_eq(v[0], 0.3) && approx_eq(v[1], 0.7));
        assert!(upright_tip);
    }

    #[test]
    fn test_spike_grid_layout() {
        let spikes = spike_geometry(10, 5);
        // 9 ring/apex pairs per cone
        assert_eq!(spikes.vertex_count(), 10 * 5 * 18);
        assert_eq!(spikes.index_count(), 10 * 5 * 8 * 3);

        let (min_x, max_x) = extent(&spikes, 0);
        assert!(approx_eq(min_x, -2.0));
        assert!(approx_eq(max_x, 2.0));
        let (min_y, max_y) = extent(&spikes, 1);
        assert!(approx_eq(min_y, -1.0));
        assert!(approx_eq(max_y, 1.0));
    }

    #[test]
    fn test_single_spike_centered() {
        let spikes = spike_geometry(1, 1);
        let (min_z, max_z) = extent(&spikes, 2);
        assert!(approx_eq(min_z + max_z, 0.0));
    }

    #[test]
    fn test_hazard_materials() {
        assert_eq!(saw_material().texture_scale, Vec3::splat(0.5));
        assert_eq!(spike_material().metallic, 0.8);
    }
}
