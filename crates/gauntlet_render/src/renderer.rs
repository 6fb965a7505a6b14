//! Two-pass scene renderer
//!
//! Each frame the light's shadow frustum is fitted in front of the camera,
//! the scene graph is drawn depth-only from the light, then lit from the
//! camera. Traversal is depth-first from the root; children are visited in
//! ascending render order (ties keep insertion order) and an invisible node
//! hides its whole subtree.

use gauntlet_core::{NodeKey, SceneGraph, SceneNode};
use gauntlet_math::{Mat4, Vec3};

use crate::backend::{DrawCall, RenderBackend, RenderPass};
use crate::camera::Camera;
use crate::light::DirectionalLight;
use crate::renderable::{Renderable, ViewMatrices, LIGHT_INTENSITY};

/// Renderer settings
#[derive(Clone, Debug, PartialEq)]
pub struct RendererSettings {
    /// Edge length of the square area covered by the shadow map
    pub shadow_area: f32,
    /// Distance in front of the camera the shadow frustum is centered on
    pub shadow_focus_distance: f32,
    pub clear_color: [f32; 4],
    pub light_intensity: f32,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            shadow_area: 70.0,
            shadow_focus_distance: 35.0,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            light_intensity: LIGHT_INTENSITY,
        }
    }
}

/// Scene renderer owning the sun light
pub struct Renderer {
    pub light: DirectionalLight,
    pub settings: RendererSettings,
    /// Player position forwarded to the mesh shader
    pub player_position: Vec3,
}

impl Renderer {
    /// Create a renderer for a backend supporting `max_texture_size` textures
    pub fn new(settings: RendererSettings, max_texture_size: u32) -> Self {
        Self {
            light: DirectionalLight::new(settings.shadow_area, max_texture_size),
            settings,
            player_position: Vec3::ZERO,
        }
    }

    /// Render one frame: shadow pass, color pass, submit
    pub fn render<B: RenderBackend>(
        &mut self,
        graph: &SceneGraph,
        camera: &Camera,
        time: f32,
        backend: &mut B,
    ) -> Result<(), B::Error> {
        let camera_world = graph.local_to_world(camera.node).unwrap_or(Mat4::IDENTITY);
        self.light.prepare(&camera_world, self.settings.shadow_focus_distance);

        backend.begin_pass(RenderPass::Shadow, self.light.resolution, self.settings.clear_color);
        let light_view = ViewMatrices {
            view: Mat4::IDENTITY,
            view_projection: self.light.depth_mvp,
            camera_position: self.light.transform.position,
            player_position: self.player_position,
            time,
            light_intensity: self.settings.light_intensity,
        };
        for call in self.collect(graph, RenderPass::Shadow, &light_view) {
            backend.draw(call);
        }

        backend.begin_pass(RenderPass::Color, self.light.resolution, self.settings.clear_color);
        let view = graph.world_to_local(camera.node).unwrap_or(Mat4::IDENTITY);
        let camera_view = ViewMatrices {
            view,
            view_projection: camera.projection * view,
            camera_position: graph.world_position(camera.node).unwrap_or(Vec3::ZERO),
            player_position: self.player_position,
            time,
            light_intensity: self.settings.light_intensity,
        };
        let calls = self.collect(graph, RenderPass::Color, &camera_view);
        log::trace!("color pass: {} draws", calls.len());
        for call in calls {
            backend.draw(call);
        }

        backend.finish()
    }

    /// Draw calls of one pass in traversal order
    pub fn collect(&self, graph: &SceneGraph, pass: RenderPass, view: &ViewMatrices) -> Vec<DrawCall> {
        let mut calls = Vec::new();
        self.render_node(graph, graph.root(), &Mat4::IDENTITY, pass, view, &mut calls);
        calls
    }

    fn render_node(
        &self,
        graph: &SceneGraph,
        key: NodeKey,
        parent_world: &Mat4,
        pass: RenderPass,
        view: &ViewMatrices,
        calls: &mut Vec<DrawCall>,
    ) {
        let Some(node) = graph.get(key) else {
            return;
        };
        if !node.visible {
            return;
        }

        let world = *parent_world * node.transform.matrix();
        if let Some(call) = node.drawable.as_ref().and_then(|d| d.render(pass, view, &world, &self.light)) {
            calls.push(call);
        }

        for child in sorted_children(graph, node) {
            self.render_node(graph, child, &world, pass, view, calls);
        }
    }
}

/// Children in ascending render order, stable for equal orders
fn sorted_children(graph: &SceneGraph, node: &SceneNode) -> Vec<NodeKey> {
    let mut children: Vec<(i32, NodeKey)> = node
        .children()
        .iter()
        .filter_map(|&k| graph.get(k).map(|c| (c.render_order, k)))
        .collect();
    children.sort_by_key(|&(order, _)| order);
    children.into_iter().map(|(_, k)| k).collect()
}

/// Release the GPU buffers of disposed nodes
pub fn release_nodes<B: RenderBackend>(backend: &mut B, nodes: &[SceneNode]) {
    for drawable in nodes.iter().filter_map(|n| n.drawable.as_ref()) {
        backend.release_geometry(drawable.geometry_id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Program, RecordingBackend, UniformSet};
    use gauntlet_core::geometry::box_geometry;
    use gauntlet_core::{Drawable, Material, Mesh, Skybox, Sprite, Transform};
    use std::sync::Arc;

    fn mesh_node(color: f32) -> SceneNode {
        let mesh = Mesh::new(Arc::new(box_geometry(1.0, 1.0, 1.0)), Material::from_rgb(color, 0.0, 0.0));
        SceneNode::with_drawable(Drawable::Mesh(mesh))
    }

    fn red(call: &DrawCall) -> f32 {
        match call.uniforms {
            UniformSet::Mesh(u) => u.base_color[0],
            _ => -1.0,
        }
    }

    fn setup() -> (SceneGraph, Camera) {
        let mut graph = SceneGraph::new();
        let cam = graph.insert_child(graph.root(), SceneNode::new()).unwrap();
        let mut camera = Camera::new(cam);
        camera.set_perspective(80.0, 1.0, 0.1, 200.0);
        (graph, camera)
    }

    #[test]
    fn test_children_sorted_by_render_order() {
        let (mut graph, camera) = setup();
        let root = graph.root();
        graph.insert_child(root, mesh_node(0.3).with_render_order(5)).unwrap();
        graph.insert_child(root, mesh_node(0.1).with_render_order(-1)).unwrap();
        graph.insert_child(root, mesh_node(0.2).with_render_order(5)).unwrap();

        let mut renderer = Renderer::new(RendererSettings::default(), 4096);
        let mut backend = RecordingBackend::new();
        renderer.render(&graph, &camera, 0.0, &mut backend).unwrap();

        let reds: Vec<f32> = backend.draws(RenderPass::Color).iter().map(red).collect();
        // stable: the two order-5 nodes keep insertion order
        assert_eq!(reds, vec![0.1, 0.3, 0.2]);
    }

    #[test]
    fn test_invisible_subtree_is_skipped() {
        let (mut graph, camera) = setup();
        let root = graph.root();
        let hidden = graph.insert_child(root, mesh_node(0.5).with_visible(false)).unwrap();
        graph.insert_child(hidden, mesh_node(0.6)).unwrap();
        graph.insert_child(root, mesh_node(0.7)).unwrap();

        let mut renderer = Renderer::new(RendererSettings::default(), 4096);
        let mut backend = RecordingBackend::new();
        renderer.render(&graph, &camera, 0.0, &mut backend).unwrap();

        let reds: Vec<f32> = backend.draws(RenderPass::Color).iter().map(red).collect();
        assert_eq!(reds, vec![0.7]);
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let (mut graph, camera) = setup();
        let root = graph.root();
        let parent = graph
            .insert_child(root, SceneNode::new().with_transform(Transform::from_position(Vec3::new(1.0, 0.0, 0.0))))
            .unwrap();
        graph
            .insert_child(parent, mesh_node(0.5).with_transform(Transform::from_position(Vec3::new(0.0, 2.0, 0.0))))
            .unwrap();

        let mut renderer = Renderer::new(RendererSettings::default(), 4096);
        let mut backend = RecordingBackend::new();
        renderer.render(&graph, &camera, 0.0, &mut backend).unwrap();

        let UniformSet::Mesh(u) = backend.draws(RenderPass::Color)[0].uniforms else {
            panic!("expected mesh uniforms");
        };
        assert_eq!(&u.world[3][..3], &[1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_pass_membership() {
        let (mut graph, camera) = setup();
        let root = graph.root();
        graph.insert_child(root, mesh_node(0.5)).unwrap();
        graph.insert_child(root, SceneNode::with_drawable(Drawable::Skybox(Skybox::new()))).unwrap();
        graph.insert_child(root, SceneNode::with_drawable(Drawable::Sprite(Sprite::new(None)))).unwrap();

        let mut renderer = Renderer::new(RendererSettings::default(), 1024);
        let mut backend = RecordingBackend::new();
        renderer.render(&graph, &camera, 0.0, &mut backend).unwrap();

        let shadow: Vec<Program> = backend.draws(RenderPass::Shadow).iter().map(|c| c.program()).collect();
        let color: Vec<Program> = backend.draws(RenderPass::Color).iter().map(|c| c.program()).collect();
        assert_eq!(shadow, vec![Program::Shadow, Program::Shadow]);
        // sky sorts before the sprite by render order
        assert_eq!(color, vec![Program::Mesh, Program::Skybox, Program::Sprite]);
        assert_eq!(backend.shadow_resolution, 1024);
        assert_eq!(backend.frames, 1);
    }

    #[test]
    fn test_release_nodes() {
        let (mut graph, _) = setup();
        let root = graph.root();
        let parent = graph.insert_child(root, mesh_node(0.5)).unwrap();
        graph.insert_child(parent, mesh_node(0.6)).unwrap();

        let mut backend = RecordingBackend::new();
        let removed = graph.dispose(parent);
        release_nodes(&mut backend, &removed);
        assert_eq!(backend.released.len(), 2);
    }
}
