//! Render backend interface
//!
//! The renderer walks the scene graph and produces [`DrawCall`]s; a backend
//! turns them into GPU work. Uniform blocks are plain `#[repr(C)]` structs so
//! a GPU backend can copy them straight into uniform buffers.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use gauntlet_core::{Geometry, GeometryId, TextureHandle, TextureSet};

/// Which of the two passes a draw belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderPass {
    /// Depth-only pass from the light
    Shadow,
    /// Lit forward pass from the player camera
    Color,
}

/// Shader program used by a draw
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Program {
    Mesh,
    Shadow,
    Sprite,
    Skybox,
    Lava,
}

/// Uniforms of the lit mesh program (480 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshUniforms {
    pub world_view: [[f32; 4]; 4],
    pub world_view_proj: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
    pub shadow_mvp: [[f32; 4]; 4],
    pub world_view_normal: [[f32; 4]; 3],
    pub world_normal: [[f32; 4]; 3],
    /// View-space light direction
    pub light_pos: [f32; 4],
    /// World-space light direction
    pub light_pos_world: [f32; 4],
    pub base_color: [f32; 4],
    /// xyz: texture scale, w: triplanar blend sharpness
    pub scale_sharpness: [f32; 4],
    /// xyz: texture offset, w: light intensity
    pub offset_intensity: [f32; 4],
    pub player_position: [f32; 4],
    pub metallic: f32,
    /// Remapped roughness
    pub roughness: f32,
    pub has_albedo: u32,
    pub has_normal_map: u32,
    pub has_roughness_map: u32,
    pub _padding: [u32; 3],
}

/// Uniforms of the depth-only program (128 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ShadowUniforms {
    pub depth_mvp: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
}

/// Uniforms of the sprite program (128 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
}

/// Uniforms of the sky program (80 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SkyboxUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Normalized sun direction
    pub sun_pos: [f32; 4],
}

/// Uniforms of the lava program (208 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LavaUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
    pub shadow_mvp: [[f32; 4]; 4],
    pub time: f32,
    pub hue_shift: u32,
    pub _padding: [f32; 2],
}

/// Uniform block of one draw; the variant selects the program
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformSet {
    Mesh(MeshUniforms),
    Shadow(ShadowUniforms),
    Sprite(SpriteUniforms),
    Skybox(SkyboxUniforms),
    Lava(LavaUniforms),
}

impl UniformSet {
    pub fn program(&self) -> Program {
        match self {
            UniformSet::Mesh(_) => Program::Mesh,
            UniformSet::Shadow(_) => Program::Shadow,
            UniformSet::Sprite(_) => Program::Sprite,
            UniformSet::Skybox(_) => Program::Skybox,
            UniformSet::Lava(_) => Program::Lava,
        }
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            UniformSet::Mesh(u) => bytemuck::bytes_of(u),
            UniformSet::Shadow(u) => bytemuck::bytes_of(u),
            UniformSet::Sprite(u) => bytemuck::bytes_of(u),
            UniformSet::Skybox(u) => bytemuck::bytes_of(u),
            UniformSet::Lava(u) => bytemuck::bytes_of(u),
        }
    }
}

/// An indexed draw of one geometry
#[derive(Clone, Debug)]
pub struct DrawCall {
    pub geometry: Arc<Geometry>,
    pub uniforms: UniformSet,
    pub textures: TextureSet,
    /// Alpha blending enabled
    pub blend: bool,
}

impl DrawCall {
    pub fn new(geometry: Arc<Geometry>, uniforms: UniformSet) -> Self {
        Self {
            geometry,
            uniforms,
            textures: TextureSet::default(),
            blend: false,
        }
    }

    pub fn with_textures(mut self, textures: TextureSet) -> Self {
        self.textures = textures;
        self
    }

    pub fn with_blend(mut self, blend: bool) -> Self {
        self.blend = blend;
        self
    }

    #[inline]
    pub fn program(&self) -> Program {
        self.uniforms.program()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.geometry.index_count()
    }
}

/// A device able to execute the renderer's draws
///
/// Calls arrive in this order each frame: `begin_pass(Shadow)`, shadow
/// draws, `begin_pass(Color)`, color draws, `finish`.
pub trait RenderBackend {
    type Error: std::error::Error;

    /// Largest supported square texture
    fn max_texture_size(&self) -> u32;

    /// Color target aspect ratio (width / height)
    fn aspect_ratio(&self) -> f32;

    /// Create an RGBA8 texture
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureHandle;

    /// Drop cached GPU buffers of a geometry
    fn release_geometry(&mut self, id: GeometryId);

    /// Bind the target of a pass; the shadow target is `resolution` square
    fn begin_pass(&mut self, pass: RenderPass, resolution: u32, clear_color: [f32; 4]);

    /// Queue an indexed draw into the current pass, uploading its geometry if needed
    fn draw(&mut self, call: DrawCall);

    /// Execute the frame
    fn finish(&mut self) -> Result<(), Self::Error>;
}

/// Backend that records every call, for tests and headless runs
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub max_texture_size: u32,
    pub aspect: f32,
    pub passes: Vec<(RenderPass, Vec<DrawCall>)>,
    pub released: Vec<GeometryId>,
    pub textures: u32,
    pub frames: usize,
    pub shadow_resolution: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            max_texture_size: 8192,
            aspect: 16.0 / 9.0,
            ..Default::default()
        }
    }

    /// Draws recorded for a pass in the most recent frame
    pub fn draws(&self, pass: RenderPass) -> &[DrawCall] {
        self.passes
            .iter()
            .rev()
            .find(|(p, _)| *p == pass)
            .map(|(_, d)| d.as_slice())
            .unwrap_or(&[])
    }
}

impl RenderBackend for RecordingBackend {
    type Error = std::convert::Infallible;

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    fn create_texture(&mut self, _width: u32, _height: u32, _rgba: &[u8]) -> TextureHandle {
        self.textures += 1;
        TextureHandle(self.textures - 1)
    }

    fn release_geometry(&mut self, id: GeometryId) {
        self.released.push(id);
    }

    fn begin_pass(&mut self, pass: RenderPass, resolution: u32, _clear_color: [f32; 4]) {
        if pass == RenderPass::Shadow {
            self.passes.clear();
            self.shadow_resolution = resolution;
        }
        self.passes.push((pass, Vec::new()));
    }

    fn draw(&mut self, call: DrawCall) {
        if let Some((_, draws)) = self.passes.last_mut() {
            draws.push(call);
        }
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        self.frames += 1;
        Ok(())
    }
}
