//! Surface materials and texture bindings

use gauntlet_math::Vec3;
use serde::{Serialize, Deserialize};

/// Surface properties of a mesh
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Base color as RGBA (each component 0.0-1.0)
    pub base_color: [f32; 4],
    pub metallic: f32,
    /// Perceptual roughness in 0..1
    pub roughness: f32,
    /// Triplanar texture coordinate scale
    pub texture_scale: Vec3,
    pub texture_offset: Vec3,
    /// Triplanar blend sharpness
    pub texture_blend_sharpness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Material {
    /// White material
    pub const WHITE: Self = Self {
        base_color: [1.0, 1.0, 1.0, 1.0],
        metallic: 0.0,
        roughness: 0.5,
        texture_scale: Vec3::ONE,
        texture_offset: Vec3::ZERO,
        texture_blend_sharpness: 1.0,
    };

    /// Create a new material with the given RGBA color
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            base_color: [r, g, b, a],
            ..Self::WHITE
        }
    }

    /// Create a new opaque material with the given RGB color
    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Opaque material from a `0xRRGGBB` color
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
        Self::from_rgb(channel(16), channel(8), channel(0))
    }

    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    /// Uniform texture scale on all three axes
    pub fn with_texture_scale(mut self, scale: f32) -> Self {
        self.texture_scale = Vec3::splat(scale);
        self
    }

    pub fn with_texture_offset(mut self, offset: Vec3) -> Self {
        self.texture_offset = offset;
        self
    }
}

/// Opaque handle to a texture owned by the texture provider
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Texture slot indices used by meshes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureSlot {
    Albedo = 0,
    NormalMap = 1,
    RoughnessMap = 2,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 3] = [TextureSlot::Albedo, TextureSlot::NormalMap, TextureSlot::RoughnessMap];
}

/// Textures bound to a mesh; any slot may be empty
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureSet {
    slots: [Option<TextureHandle>; 3],
}

impl TextureSet {
    /// Same texture set for albedo, normal and roughness maps
    pub fn new(albedo: Option<TextureHandle>, normal: Option<TextureHandle>, roughness: Option<TextureHandle>) -> Self {
        Self { slots: [albedo, normal, roughness] }
    }

    #[inline]
    pub fn get(&self, slot: TextureSlot) -> Option<TextureHandle> {
        self.slots[slot as usize]
    }

    /// Bind or clear a slot
    pub fn set(&mut self, slot: TextureSlot, texture: Option<TextureHandle>) {
        self.slots[slot as usize] = texture;
    }

    #[inline]
    pub fn has(&self, slot: TextureSlot) -> bool {
        self.get(slot).is_some()
    }
}
