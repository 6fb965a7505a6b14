//! GPU rendering system
//!
//! Owns the render backend, the two-pass renderer and the player camera, and
//! draws the game's scene graph once per frame.

use gauntlet_core::NodeKey;
use gauntlet_render::{release_nodes, Camera, DirectionalLight, RenderBackend, Renderer, WgpuBackend};
use winit::dpi::PhysicalSize;

use crate::config::AppConfig;
use crate::game::Game;

/// Renders the game through a backend
pub struct RenderSystem<B: RenderBackend> {
    backend: B,
    renderer: Renderer,
    camera: Camera,
    fov: f32,
    near: f32,
    far: f32,
}

impl<B: RenderBackend> RenderSystem<B> {
    /// Renderer and camera configured from the rendering and camera sections
    pub fn new(backend: B, camera_node: NodeKey, config: &AppConfig) -> Self {
        let settings = config.to_renderer_settings();
        let resolution = backend.max_texture_size().min(config.rendering.shadow_map_size).max(1);
        let depth = config.rendering.shadow_depth_range;

        let mut renderer = Renderer::new(settings.clone(), backend.max_texture_size());
        renderer.light = DirectionalLight::with_range(settings.shadow_area, -depth, depth, resolution);
        log::info!("shadow map {}x{}", resolution, resolution);

        Self {
            backend,
            renderer,
            camera: Camera::new(camera_node),
            fov: config.camera.fov,
            near: config.camera.near,
            far: config.camera.far,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Backend access for uploading textures
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Render a single frame
    ///
    /// GPU buffers of nodes the game disposed since the last frame are
    /// released first.
    pub fn render_frame(&mut self, game: &mut Game) -> Result<(), B::Error> {
        release_nodes(&mut self.backend, &game.take_released());

        self.camera.node = game.camera_node();
        self.camera
            .set_perspective(self.fov, self.backend.aspect_ratio(), self.near, self.far);
        self.renderer.light.transform.position = game.light_position();
        self.renderer.player_position = game.simulation.state.player.position;

        let time = game.simulation.time() as f32;
        self.renderer
            .render(&game.simulation.graph, &self.camera, time, &mut self.backend)
    }
}

impl RenderSystem<WgpuBackend> {
    /// Handle window resize
    pub fn resize(&mut self, width: u32, height: u32) {
        self.backend.resize(PhysicalSize::new(width, height));
    }
}
