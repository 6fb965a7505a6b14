//! Triangle geometry and builders
//!
//! A [`Geometry`] holds flat position and normal arrays (three floats per
//! vertex) plus `u32` triangle indices. Every geometry carries a unique
//! [`GeometryId`] so render backends can cache and release uploaded buffers.

use std::f32::consts::PI;
use std::sync::atomic::{AtomicU64, Ordering};

use gauntlet_math::{Quat, Vec3};

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a geometry instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

impl GeometryId {
    fn next() -> Self {
        Self(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value
    #[inline]
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Indexed triangle geometry
#[derive(Debug)]
pub struct Geometry {
    id: GeometryId,
    vertices: Vec<f32>,
    normals: Vec<f32>,
    triangles: Vec<u32>,
}

impl Clone for Geometry {
    /// Clones get a fresh id
    fn clone(&self) -> Self {
        Self::new(self.vertices.clone(), self.normals.clone(), self.triangles.clone())
    }
}

impl Geometry {
    /// Create a geometry from flat arrays
    pub fn new(vertices: Vec<f32>, normals: Vec<f32>, triangles: Vec<u32>) -> Self {
        debug_assert_eq!(vertices.len(), normals.len());
        debug_assert_eq!(vertices.len() % 3, 0);
        Self {
            id: GeometryId::next(),
            vertices,
            normals,
            triangles,
        }
    }

    #[inline]
    pub fn id(&self) -> GeometryId {
        self.id
    }

    #[inline]
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    #[inline]
    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    #[inline]
    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.triangles.len()
    }

    /// Whether every index refers to an existing vertex
    pub fn indices_in_range(&self) -> bool {
        let n = self.vertex_count() as u32;
        self.triangles.iter().all(|&i| i < n)
    }

    /// Uniformly scale the positions (normals are unchanged)
    pub fn scaled(mut self, factor: f32) -> Self {
        self.vertices.iter_mut().for_each(|v| *v *= factor);
        self.id = GeometryId::next();
        self
    }

    /// Translate the positions
    pub fn translated(mut self, offset: Vec3) -> Self {
        for v in self.vertices.chunks_exact_mut(3) {
            v[0] += offset.x;
            v[1] += offset.y;
            v[2] += offset.z;
        }
        self.id = GeometryId::next();
        self
    }

    /// Rotate positions and normals, then translate the positions
    pub fn transformed(&self, rotation: Quat, offset: Vec3) -> Self {
        let vertices = self
            .vertices
            .chunks_exact(3)
            .flat_map(|v| (rotation.rotate(Vec3::new(v[0], v[1], v[2])) + offset).to_array())
            .collect();
        let normals = self
            .normals
            .chunks_exact(3)
            .flat_map(|n| rotation.rotate(Vec3::new(n[0], n[1], n[2])).to_array())
            .collect();
        Self::new(vertices, normals, self.triangles.clone())
    }
}

/// Concatenate geometries, offsetting each one's indices
pub fn join(geometries: &[Geometry]) -> Geometry {
    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    let mut triangles = Vec::new();

    for g in geometries {
        let start = (vertices.len() / 3) as u32;
        vertices.extend_from_slice(&g.vertices);
        normals.extend_from_slice(&g.normals);
        triangles.extend(g.triangles.iter().map(|t| t + start));
    }

    Geometry::new(vertices, normals, triangles)
}

/// Two triangles per quad starting at `base`
fn quad(base: u32) -> [u32; 6] {
    [base, base + 3, base + 1, base, base + 2, base + 3]
}

/// Axis-aligned box centered on the origin: 24 vertices, 12 triangles
pub fn box_geometry(width: f32, height: f32, depth: f32) -> Geometry {
    let (w, h, d) = (width / 2.0, height / 2.0, depth / 2.0);

    #[rustfmt::skip]
    let vertices = vec![
        // back
        -w, -h, -d,   w, -h, -d,  -w,  h, -d,   w,  h, -d,
        // front
         w, -h,  d,  -w, -h,  d,   w,  h,  d,  -w,  h,  d,
        // bottom
         w, -h, -d,  -w, -h, -d,   w, -h,  d,  -w, -h,  d,
        // top
        -w,  h, -d,   w,  h, -d,  -w,  h,  d,   w,  h,  d,
        // left
        -w, -h, -d,  -w,  h, -d,  -w, -h,  d,  -w,  h,  d,
        // right
         w,  h, -d,   w, -h, -d,   w,  h,  d,   w, -h,  d,
    ];

    let face_normals = [
        [0.0, 0.0, -1.0],
        [0.0, 0.0, 1.0],
        [0.0, -1.0, 0.0],
        [0.0, 1.0, 0.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
    ];
    let normals = face_normals
        .iter()
        .flat_map(|n| std::iter::repeat(*n).take(4).flatten())
        .collect();

    let triangles = (0..6).flat_map(|face| quad(face * 4)).collect();

    Geometry::new(vertices, normals, triangles)
}

/// Unit cube
pub fn unit_box() -> Geometry {
    box_geometry(1.0, 1.0, 1.0)
}

/// Latitude/longitude sphere
///
/// The mesh is open along one seam and has degenerate triangles at the
/// poles. `rings` is the number of latitude rows, `segments` the number of
/// vertices per row.
pub fn sphere_geometry(radius: f32, rings: u32, segments: u32) -> Geometry {
    let mut normals = Vec::with_capacity((rings * segments * 3) as usize);

    for i in 0..rings {
        let angle_y = -PI / 2.0 + PI * i as f32 / (rings.max(2) - 1) as f32;
        let y = (-angle_y).sin();
        let ym = (-angle_y).cos();
        for j in 0..segments {
            let angle = 2.0 * PI * j as f32 / (segments.max(2) - 1) as f32;
            normals.extend_from_slice(&[angle.cos() * ym, y, angle.sin() * ym]);
        }
    }

    let triangles = row_triangles(rings, segments);
    let vertices = normals.iter().map(|n| n * radius).collect();
    Geometry::new(vertices, normals, triangles)
}

/// Capsule along the Y axis: two hemispheres separated by `height`
pub fn capsule_geometry(radius: f32, height: f32, rings: u32, segments: u32) -> Geometry {
    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    let half = rings / 2;

    let mut push_row = |i: u32, y_offset: f32| {
        let angle_y = -PI / 2.0 + PI * i as f32 / (rings.max(2) - 1) as f32;
        let y = (-angle_y).sin();
        let ym = (-angle_y).cos();
        for j in 0..segments {
            let angle = 2.0 * PI * j as f32 / (segments.max(2) - 1) as f32;
            let n = [angle.cos() * ym, y, angle.sin() * ym];
            normals.extend_from_slice(&n);
            vertices.extend_from_slice(&[n[0] * radius, n[1] * radius + y_offset, n[2] * radius]);
        }
    };

    for i in 0..=half {
        push_row(i, height / 2.0);
    }
    for i in half..rings {
        push_row(i, -height / 2.0);
    }

    let row_count = (vertices.len() / 3) as u32 / segments.max(1);
    let triangles = row_triangles(row_count, segments);
    Geometry::new(vertices, normals, triangles)
}

/// Quads between consecutive rows of a `rows x segments` vertex grid
fn row_triangles(rows: u32, segments: u32) -> Vec<u32> {
    let mut triangles = Vec::new();
    for i in 0..rows.saturating_sub(1) {
        let start = i * segments;
        let next = start + segments;
        for j in 0..segments.saturating_sub(1) {
            triangles.extend_from_slice(&[
                start + j,
                start + j + 1,
                next + j + 1,
                start + j,
                next + j + 1,
                next + j,
            ]);
        }
    }
    triangles
}

/// Horizontal double-sided plane at y = 0
pub fn plane_geometry(width: f32, depth: f32) -> Geometry {
    let (w, d) = (width / 2.0, depth / 2.0);

    #[rustfmt::skip]
    let vertices = vec![
        // bottom
         w, 0.0, -d,  -w, 0.0, -d,   w, 0.0,  d,  -w, 0.0,  d,
        // top
        -w, 0.0, -d,   w, 0.0, -d,  -w, 0.0,  d,   w, 0.0,  d,
    ];
    let normals = [[0.0, -1.0, 0.0], [0.0, 1.0, 0.0]]
        .iter()
        .flat_map(|n| std::iter::repeat(*n).take(4).flatten())
        .collect();
    let triangles = quad(0).into_iter().chain(quad(4)).collect();

    Geometry::new(vertices, normals, triangles)
}

/// Extrude a convex polygon along Z
///
/// `polyline` is a flat list of `x, y` pairs. Caps are fan-triangulated
/// from the first point, so only convex outlines come out right.
pub fn extruded_convex(polyline: &[f32], thickness: f32) -> Geometry {
    let points: Vec<(f32, f32)> = polyline.chunks_exact(2).map(|p| (p[0], p[1])).collect();
    let half = thickness / 2.0;

    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    let mut triangles = Vec::new();

    // caps
    for &(x, y) in &points {
        vertices.extend_from_slice(&[x, y, -half, x, y, half]);
        normals.extend_from_slice(&[0.0, 0.0, -1.0, 0.0, 0.0, 1.0]);
    }
    for i in 2..points.len() as u32 {
        let i1 = i - 1;
        triangles.extend_from_slice(&[0, i1 * 2, i * 2, 1, i * 2 + 1, i1 * 2 + 1]);
    }

    // sides
    let Some(&last) = points.last() else {
        return Geometry::new(vertices, normals, triangles);
    };
    let mut prev = last;
    for &point in &points {
        let idx = (vertices.len() / 3) as u32;
        vertices.extend_from_slice(&[
            prev.0, prev.1, half,
            prev.0, prev.1, -half,
            point.0, point.1, half,
            point.0, point.1, -half,
        ]);

        let dir = Vec3::new(point.0 - prev.0, point.1 - prev.1, 0.0).safe_normalized();
        let n = [-dir.y, dir.x, 0.0];
        for _ in 0..4 {
            normals.extend_from_slice(&n);
        }
        triangles.extend_from_slice(&quad(idx));
        prev = point;
    }

    Geometry::new(vertices, normals, triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_box_counts() {
        let g = box_geometry(2.0, 4.0, 6.0);
        assert_eq!(g.vertex_count(), 24);
        assert_eq!(g.index_count(), 36);
        assert!(g.indices_in_range());
    }

    #[test]
    fn test_box_extents() {
        let g = box_geometry(2.0, 4.0, 6.0);
        let max_x = g.vertices().chunks(3).map(|v| v[0]).fold(f32::MIN, f32::max);
        let max_y = g.vertices().chunks(3).map(|v| v[1]).fold(f32::MIN, f32::max);
        let min_z = g.vertices().chunks(3).map(|v| v[2]).fold(f32::MAX, f32::min);
        assert_eq!(max_x, 1.0);
        assert_eq!(max_y, 2.0);
        assert_eq!(min_z, -3.0);
    }

    #[test]
    fn test_box_normals_point_out_of_their_face() {
        let g = box_geometry(1.0, 1.0, 1.0);
        for (v, n) in g.vertices().chunks(3).zip(g.normals().chunks(3)) {
            let dot = v[0] * n[0] + v[1] * n[1] + v[2] * n[2];
            assert!(approx_eq(dot, 0.5));
        }
    }

    #[test]
    fn test_sphere_vertices_on_radius() {
        let g = sphere_geometry(2.5, 16, 24);
        assert_eq!(g.vertex_count(), 16 * 24);
        assert!(g.indices_in_range());
        for v in g.vertices().chunks(3) {
            let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!(approx_eq(len, 2.5));
        }
    }

    #[test]
    fn test_capsule_indices_in_range() {
        let g = capsule_geometry(0.4, 1.0, 16, 24);
        assert!(g.indices_in_range());
        assert!(g.index_count() > 0);
        let max_y = g.vertices().chunks(3).map(|v| v[1]).fold(f32::MIN, f32::max);
        assert!(approx_eq(max_y, 0.9));
    }

    #[test]
    fn test_plane_is_double_sided() {
        let g = plane_geometry(2.0, 2.0);
        assert_eq!(g.vertex_count(), 8);
        assert_eq!(g.index_count(), 12);
        let ups = g.normals().chunks(3).filter(|n| n[1] > 0.0).count();
        assert_eq!(ups, 4);
    }

    #[test]
    fn test_extruded_triangle() {
        let g = extruded_convex(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0], 0.5);
        // 2 per point for caps + 4 per edge for sides
        assert_eq!(g.vertex_count(), 3 * 2 + 3 * 4);
        // one fan triangle per cap + two per side
        assert_eq!(g.index_count(), 2 * 3 + 3 * 6);
        assert!(g.indices_in_range());
    }

    #[test]
    fn test_join_offsets_indices() {
        let a = box_geometry(1.0, 1.0, 1.0);
        let b = box_geometry(1.0, 1.0, 1.0);
        let joined = join(&[a, b]);
        assert_eq!(joined.vertex_count(), 48);
        assert_eq!(joined.triangles()[36], 24);
        assert!(joined.indices_in_range());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = unit_box();
        let b = a.clone();
        assert_ne!(a.id(), b.id());
        let c = b.scaled(2.0);
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_transformed_rotates_normals() {
        let g = plane_geometry(1.0, 1.0)
            .transformed(Quat::from_axis_angle(Vec3::X, std::f32::consts::FRAC_PI_2), Vec3::ZERO);
        // the upward normals now face +Z
        let n = &g.normals()[12..15];
        assert!(approx_eq(n[2], 1.0));
    }
}
