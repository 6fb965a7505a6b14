//! Render capabilities attached to scene nodes
//!
//! The set is closed: lit meshes, billboard sprites, the sky and the lava
//! surface. Rendering itself lives in the render crate.

use std::sync::Arc;

use crate::geometry::{box_geometry, unit_box, Geometry, GeometryId};
use crate::{Material, TextureHandle, TextureSet};

/// Default draw order of sprites
pub const SPRITE_RENDER_ORDER: i32 = 2000;
/// Default draw order of the sky
pub const SKYBOX_RENDER_ORDER: i32 = 1000;
/// Default draw order of lava surfaces
pub const LAVA_RENDER_ORDER: i32 = 500;

/// A lit, shadowed mesh
#[derive(Clone, Debug)]
pub struct Mesh {
    pub geometry: Arc<Geometry>,
    pub material: Material,
    pub textures: TextureSet,
    /// Whether the mesh is drawn into the shadow map
    pub cast_shadows: bool,
}

impl Mesh {
    pub fn new(geometry: Arc<Geometry>, material: Material) -> Self {
        Self {
            geometry,
            material,
            textures: TextureSet::default(),
            cast_shadows: true,
        }
    }

    pub fn with_textures(mut self, textures: TextureSet) -> Self {
        self.textures = textures;
        self
    }
}

/// A thin textured quad
#[derive(Clone, Debug)]
pub struct Sprite {
    pub geometry: Arc<Geometry>,
    pub texture: Option<TextureHandle>,
}

impl Sprite {
    /// Sprite on a 1 x 1 x 0.01 box
    pub fn new(texture: Option<TextureHandle>) -> Self {
        Self {
            geometry: Arc::new(box_geometry(1.0, 1.0, 0.01)),
            texture,
        }
    }
}

/// Procedural sky drawn on a unit box
#[derive(Clone, Debug)]
pub struct Skybox {
    pub geometry: Arc<Geometry>,
}

impl Default for Skybox {
    fn default() -> Self {
        Self::new()
    }
}

impl Skybox {
    pub fn new() -> Self {
        Self {
            geometry: Arc::new(unit_box()),
        }
    }
}

/// Animated lava surface
#[derive(Clone, Debug)]
pub struct Lava {
    pub geometry: Arc<Geometry>,
    /// Swap color channels and alpha blend (finish portal look)
    pub hue_shift: bool,
}

impl Lava {
    pub fn new(geometry: Arc<Geometry>) -> Self {
        Self { geometry, hue_shift: false }
    }
}

/// Render capability of a scene node
#[derive(Clone, Debug)]
pub enum Drawable {
    Mesh(Mesh),
    Sprite(Sprite),
    Skybox(Skybox),
    Lava(Lava),
}

impl Drawable {
    /// Render order a node gets when created with this drawable
    pub fn default_render_order(&self) -> i32 {
        match self {
            Drawable::Mesh(_) => 0,
            Drawable::Sprite(_) => SPRITE_RENDER_ORDER,
            Drawable::Skybox(_) => SKYBOX_RENDER_ORDER,
            Drawable::Lava(_) => LAVA_RENDER_ORDER,
        }
    }

    /// Geometry drawn by this drawable
    pub fn geometry(&self) -> &Arc<Geometry> {
        match self {
            Drawable::Mesh(m) => &m.geometry,
            Drawable::Sprite(s) => &s.geometry,
            Drawable::Skybox(s) => &s.geometry,
            Drawable::Lava(l) => &l.geometry,
        }
    }

    #[inline]
    pub fn geometry_id(&self) -> GeometryId {
        self.geometry().id()
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match self {
            Drawable::Mesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match self {
            Drawable::Mesh(m) => Some(m),
            _ => None,
        }
    }
}

impl From<Mesh> for Drawable {
    fn from(m: Mesh) -> Self {
        Drawable::Mesh(m)
    }
}

impl From<Sprite> for Drawable {
    fn from(s: Sprite) -> Self {
        Drawable::Sprite(s)
    }
}

impl From<Skybox> for Drawable {
    fn from(s: Skybox) -> Self {
        Drawable::Skybox(s)
    }
}

impl From<Lava> for Drawable {
    fn from(l: Lava) -> Self {
        Drawable::Lava(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_render_orders() {
        assert_eq!(Drawable::from(Sprite::new(None)).default_render_order(), 2000);
        assert_eq!(Drawable::from(Skybox::new()).default_render_order(), 1000);
        assert_eq!(Drawable::from(Lava::new(Arc::new(unit_box()))).default_render_order(), 500);
        let mesh = Mesh::new(Arc::new(unit_box()), Material::WHITE);
        assert_eq!(Drawable::from(mesh).default_render_order(), 0);
    }

    #[test]
    fn test_sprite_geometry_is_thin_box() {
        let s = Sprite::new(None);
        let max_z = s.geometry.vertices().chunks(3).map(|v| v[2]).fold(f32::MIN, f32::max);
        assert!((max_z - 0.005).abs() < 1e-6);
    }

    #[test]
    fn test_mesh_casts_shadows_by_default() {
        let mesh = Mesh::new(Arc::new(unit_box()), Material::WHITE);
        assert!(mesh.cast_shadows);
    }
}
