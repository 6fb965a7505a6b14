//! Renderables - turn node drawables into draw calls
//!
//! Every drawable kind decides for itself whether it takes part in a pass
//! and which uniforms it needs. The renderer only supplies the per-pass
//! matrices and the node's world matrix.

use gauntlet_core::{Drawable, Lava, Mesh, Skybox, Sprite, TextureSet, TextureSlot};
use gauntlet_math::{clamp, Mat4, Vec3};

use crate::backend::{
    DrawCall, LavaUniforms, MeshUniforms, RenderPass, ShadowUniforms, SkyboxUniforms, SpriteUniforms, UniformSet,
};
use crate::light::DirectionalLight;

/// Intensity of the direct light in the mesh shader
pub const LIGHT_INTENSITY: f32 = 0.5;

/// Per-pass matrices shared by every draw
#[derive(Clone, Copy, Debug)]
pub struct ViewMatrices {
    pub view: Mat4,
    pub view_projection: Mat4,
    pub camera_position: Vec3,
    pub player_position: Vec3,
    /// Seconds, for animated shaders
    pub time: f32,
    pub light_intensity: f32,
}

/// Something the renderer can draw
pub trait Renderable {
    /// Draw call for `pass`, or `None` when this renderable skips the pass
    fn render(&self, pass: RenderPass, view: &ViewMatrices, world: &Mat4, light: &DirectionalLight) -> Option<DrawCall>;
}

fn shadow_draw(geometry: &std::sync::Arc<gauntlet_core::Geometry>, world: &Mat4, light: &DirectionalLight) -> DrawCall {
    DrawCall::new(
        geometry.clone(),
        UniformSet::Shadow(ShadowUniforms {
            depth_mvp: light.depth_mvp.to_cols_array_2d(),
            world: world.to_cols_array_2d(),
        }),
    )
}

/// Roughness as the mesh shader expects it
pub fn remap_roughness(roughness: f32) -> f32 {
    const COEFF: f32 = 0.2;
    const EPS: f32 = 1e-5;
    1.0 + COEFF - COEFF / clamp(roughness, EPS, 1.0 - EPS)
}

fn vec4(v: Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

impl Renderable for Mesh {
    fn render(&self, pass: RenderPass, view: &ViewMatrices, world: &Mat4, light: &DirectionalLight) -> Option<DrawCall> {
        match pass {
            RenderPass::Shadow => self.cast_shadows.then(|| shadow_draw(&self.geometry, world, light)),
            RenderPass::Color => {
                let world_view = view.view * *world;
                let world_view_proj = view.view_projection * *world;
                let world_view_normal = world_view.top_left_3x3().inverse().transpose();
                let world_normal = world.top_left_3x3().inverse().transpose();

                let light_matrix = view.view * light.transform.matrix();
                let light_pos = light_matrix
                    .transform_point(light.transform.position + view.camera_position)
                    .safe_normalized();
                let light_pos_world = light.transform.position.safe_normalized();

                let m = &self.material;
                let uniforms = MeshUniforms {
                    world_view: world_view.to_cols_array_2d(),
                    world_view_proj: world_view_proj.to_cols_array_2d(),
                    world: world.to_cols_array_2d(),
                    shadow_mvp: light.depth_mvp.to_cols_array_2d(),
                    world_view_normal: world_view_normal.to_padded_cols(),
                    world_normal: world_normal.to_padded_cols(),
                    light_pos: vec4(light_pos, 0.0),
                    light_pos_world: vec4(light_pos_world, 0.0),
                    base_color: m.base_color,
                    scale_sharpness: vec4(m.texture_scale, m.texture_blend_sharpness),
                    offset_intensity: vec4(m.texture_offset, view.light_intensity),
                    player_position: vec4(view.player_position, 1.0),
                    metallic: m.metallic,
                    roughness: remap_roughness(m.roughness),
                    has_albedo: self.textures.has(TextureSlot::Albedo) as u32,
                    has_normal_map: self.textures.has(TextureSlot::NormalMap) as u32,
                    has_roughness_map: self.textures.has(TextureSlot::RoughnessMap) as u32,
                    _padding: [0; 3],
                };
                Some(DrawCall::new(self.geometry.clone(), UniformSet::Mesh(uniforms)).with_textures(self.textures))
            }
        }
    }
}

impl Renderable for Sprite {
    fn render(&self, pass: RenderPass, view: &ViewMatrices, world: &Mat4, light: &DirectionalLight) -> Option<DrawCall> {
        let call = match pass {
            RenderPass::Shadow => shadow_draw(&self.geometry, world, light),
            RenderPass::Color => DrawCall::new(
                self.geometry.clone(),
                UniformSet::Sprite(SpriteUniforms {
                    view_proj: view.view_projection.to_cols_array_2d(),
                    world: world.to_cols_array_2d(),
                }),
            ),
        };
        let textures = TextureSet::new(self.texture, None, None);
        Some(call.with_textures(textures).with_blend(true))
    }
}

impl Renderable for Skybox {
    fn render(&self, pass: RenderPass, view: &ViewMatrices, _world: &Mat4, light: &DirectionalLight) -> Option<DrawCall> {
        if pass != RenderPass::Color {
            return None;
        }
        Some(DrawCall::new(
            self.geometry.clone(),
            UniformSet::Skybox(SkyboxUniforms {
                view_proj: view.view_projection.to_cols_array_2d(),
                sun_pos: vec4(light.transform.position.safe_normalized(), 0.0),
            }),
        ))
    }
}

impl Renderable for Lava {
    fn render(&self, pass: RenderPass, view: &ViewMatrices, world: &Mat4, light: &DirectionalLight) -> Option<DrawCall> {
        if pass != RenderPass::Color {
            return None;
        }
        let uniforms = LavaUniforms {
            view_proj: view.view_projection.to_cols_array_2d(),
            world: world.to_cols_array_2d(),
            shadow_mvp: light.depth_mvp.to_cols_array_2d(),
            time: view.time,
            hue_shift: self.hue_shift as u32,
            _padding: [0.0; 2],
        };
        Some(DrawCall::new(self.geometry.clone(), UniformSet::Lava(uniforms)).with_blend(self.hue_shift))
    }
}

impl Renderable for Drawable {
    fn render(&self, pass: RenderPass, view: &ViewMatrices, world: &Mat4, light: &DirectionalLight) -> Option<DrawCall> {
        match self {
            Drawable::Mesh(m) => m.render(pass, view, world, light),
            Drawable::Sprite(s) => s.render(pass, view, world, light),
            Drawable::Skybox(s) => s.render(pass, view, world, light),
            Drawable::Lava(l) => l.render(pass, view, world, light),
        }
    }
}
