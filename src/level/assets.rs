//! Procedural textures shared by every level
//!
//! The plastic surface is voronoise driven: the same height field feeds the
//! albedo tint, a finite-difference normal map and the roughness map. The
//! powerup icons are rasterized from a 24x24 vector layout.

use gauntlet_core::{TextureHandle, TextureSet};
use gauntlet_math::{lerp, smoothstep};
use gauntlet_render::RenderBackend;

use super::PowerupKind;

/// Edge length of the plastic textures
pub const PLASTIC_SIZE: u32 = 512;
/// Edge length of the powerup icons
pub const ICON_SIZE: u32 = 128;

const PLASTIC_SCALE: f32 = 15.0;
const PLASTIC_ROUGHNESS: (f32, f32) = (0.5, 1.0);
const NORMAL_STRENGTH: f32 = 2.0;

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

/// Texture handles level builders bind to materials
#[derive(Clone, Copy, Debug, Default)]
pub struct LevelAssets {
    pub plastic: TextureSet,
    pub speed_icon: Option<TextureHandle>,
    pub jump_icon: Option<TextureHandle>,
}

impl LevelAssets {
    /// Generate and upload every texture
    pub fn create<B: RenderBackend>(backend: &mut B) -> Self {
        let size = PLASTIC_SIZE.min(backend.max_texture_size());
        let plastic = PlasticMaps::generate(size);
        let albedo = backend.create_texture(size, size, &plastic.albedo);
        let normal = backend.create_texture(size, size, &plastic.normal);
        let roughness = backend.create_texture(size, size, &plastic.roughness);

        let speed_icon = backend.create_texture(ICON_SIZE, ICON_SIZE, &icon_pixels(PowerupKind::SpeedBoost, ICON_SIZE));
        let jump_icon = backend.create_texture(ICON_SIZE, ICON_SIZE, &icon_pixels(PowerupKind::HighJump, ICON_SIZE));
        log::debug!("generated level textures ({}px plastic, {}px icons)", size, ICON_SIZE);

        Self {
            plastic: TextureSet::new(Some(albedo), Some(normal), Some(roughness)),
            speed_icon: Some(speed_icon),
            jump_icon: Some(jump_icon),
        }
    }

    /// Sprite texture of a powerup
    pub fn icon(&self, kind: PowerupKind) -> Option<TextureHandle> {
        match kind {
            PowerupKind::SpeedBoost => self.speed_icon,
            PowerupKind::HighJump => self.jump_icon,
        }
    }
}

fn fract(x: f32) -> f32 {
    x - x.floor()
}

fn hash3(x: f32, y: f32) -> [f32; 3] {
    [
        fract((x * 127.1 + y * 311.7).sin() * 43758.547),
        fract((x * 269.5 + y * 183.3).sin() * 43758.547),
        fract((x * 419.2 + y * 371.9).sin() * 43758.547),
    ]
}

/// Blend of jittered grid values
///
/// `u` moves the cell points from a regular grid (0) to random (1), `v`
/// blends from sharp cells (0) to a smooth field (1).
pub fn voronoise(x: f32, y: f32, u: f32, v: f32) -> f32 {
    let k = 1.0 + 63.0 * (1.0 - v).powi(6);
    let (ix, iy) = (x.floor(), y.floor());
    let (fx, fy) = (x - ix, y - iy);

    let mut value = 0.0;
    let mut weight = 0.0;
    for gy in -2..=1 {
        for gx in -2..=1 {
            let (gx, gy) = (gx as f32, gy as f32);
            let o = hash3(ix + gx, iy + gy);
            let dx = gx - fx + o[0] * u + 0.5;
            let dy = gy - fy + o[1] * u + 0.5;
            let w = (1.0 - smoothstep(0.0, 1.414, (dx * dx + dy * dy).sqrt())).powf(k);
            value += o[2] * w;
            weight += w;
        }
    }
    if weight > 0.0 {
        value / weight
    } else {
        0.0
    }
}

/// RGBA8 maps of the plastic surface
pub struct PlasticMaps {
    pub albedo: Vec<u8>,
    pub normal: Vec<u8>,
    pub roughness: Vec<u8>,
}

impl PlasticMaps {
    pub fn generate(size: u32) -> Self {
        let n = size as usize;
        let height: Vec<f32> = (0..n * n)
            .map(|i| {
                let x = (i % n) as f32 / n as f32 * PLASTIC_SCALE;
                let y = (i / n) as f32 / n as f32 * PLASTIC_SCALE;
                voronoise(x, y, 1.0, 1.0)
            })
            .collect();
        let at = |x: usize, y: usize| height[(y % n) * n + (x % n)];

        let mut albedo = Vec::with_capacity(n * n * 4);
        let mut normal = Vec::with_capacity(n * n * 4);
        let mut roughness = Vec::with_capacity(n * n * 4);
        for y in 0..n {
            for x in 0..n {
                let h = at(x, y);
                let shade = to_byte(0.9 + 0.1 * h);
                albedo.extend_from_slice(&[shade, shade, shade, 255]);

                let dx = (at(x + 1, y) - at(x + n - 1, y)) * NORMAL_STRENGTH;
                let dy = (at(x, y + 1) - at(x, y + n - 1)) * NORMAL_STRENGTH;
                let len = (dx * dx + dy * dy + 1.0).sqrt();
                normal.extend_from_slice(&[
                    to_byte(-dx / len * 0.5 + 0.5),
                    to_byte(-dy / len * 0.5 + 0.5),
                    to_byte(1.0 / len * 0.5 + 0.5),
                    255,
                ]);

                let r = to_byte(lerp(PLASTIC_ROUGHNESS.0, PLASTIC_ROUGHNESS.1, h));
                roughness.extend_from_slice(&[r, r, r, 255]);
            }
        }
        Self { albedo, normal, roughness }
    }
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn segment_distance(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let (apx, apy) = (p.0 - a.0, p.1 - a.1);
    let t = ((apx * abx + apy * aby) / (abx * abx + aby * aby)).clamp(0.0, 1.0);
    let (dx, dy) = (apx - abx * t, apy - aby * t);
    (dx * dx + dy * dy).sqrt()
}

fn inside_polygon(p: (f32, f32), polygon: &[(f32, f32)]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.1 > p.1) != (b.1 > p.1) && p.0 < (b.0 - a.0) * (p.1 - a.1) / (b.1 - a.1) + a.0 {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Double chevron pointing up
const CHEVRONS: [((f32, f32), (f32, f32)); 4] = [
    ((8.0, 13.0), (12.0, 17.0)),
    ((16.0, 13.0), (12.0, 17.0)),
    ((8.0, 8.0), (12.0, 12.0)),
    ((16.0, 8.0), (12.0, 12.0)),
];

const BOLT: [(f32, f32); 7] = [(16.0, 18.0), (11.0, 18.0), (9.0, 12.0), (11.0, 12.0), (9.0, 6.0), (15.0, 13.0), (13.0, 13.0)];

/// RGBA8 icon: red ring around a green glyph, rows bottom to top
pub fn icon_pixels(kind: PowerupKind, size: u32) -> Vec<u8> {
    let scale = 24.0 / size as f32;
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for row in 0..size {
        for col in 0..size {
            let p = ((col as f32 + 0.5) * scale, (row as f32 + 0.5) * scale);
            let glyph = match kind {
                PowerupKind::SpeedBoost => inside_polygon(p, &BOLT),
                PowerupKind::HighJump => CHEVRONS.iter().any(|&(a, b)| segment_distance(p, a, b) <= 0.5),
            };
            let ring = ((p.0 - 12.0).hypot(p.1 - 12.0) - 9.0).abs() <= 0.5;
            let color = if glyph {
                GREEN
            } else if ring {
                RED
            } else {
                CLEAR
            };
            pixels.extend_from_slice(&color);
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_render::RecordingBackend;

    fn pixel(pixels: &[u8], size: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * size + x) * 4) as usize;
        [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
    }

    #[test]
    fn test_voronoise_range() {
        for i in 0..50 {
            let v = voronoise(i as f32 * 0.37, i as f32 * 0.11, 1.0, 1.0);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_plastic_maps_sizes() {
        let maps = PlasticMaps::generate(16);
        assert_eq!(maps.albedo.len(), 16 * 16 * 4);
        assert_eq!(maps.normal.len(), 16 * 16 * 4);
        // normals mostly face out of the surface
        assert!(maps.normal.chunks_exact(4).all(|p| p[2] >= 128));
        assert!(maps.roughness.chunks_exact(4).all(|p| p[0] >= 127));
    }

    #[test]
    fn test_icons() {
        let jump = icon_pixels(PowerupKind::HighJump, 24);
        // ring at the left edge, empty corner
        assert_eq!(pixel(&jump, 24, 3, 12), RED);
        assert_eq!(pixel(&jump, 24, 0, 0), CLEAR);
        // chevron tip
        assert_eq!(pixel(&jump, 24, 11, 16), GREEN);

        let speed = icon_pixels(PowerupKind::SpeedBoost, 24);
        assert_eq!(pixel(&speed, 24, 11, 14), GREEN);
    }

    #[test]
    fn test_create_uploads_textures() {
        let mut backend = RecordingBackend::new();
        let assets = LevelAssets::create(&mut backend);
        assert!(assets.plastic.has(gauntlet_core::TextureSlot::RoughnessMap));
        assert!(assets.icon(PowerupKind::SpeedBoost).is_some());
        assert_ne!(assets.speed_icon, assets.jump_icon);
    }
}
