//! Level construction
//!
//! The builder attaches level objects under a parent node (the scene root by
//! default), registers their colliders and triggers, and collects the
//! objects and spawn settings into a [`Level`].
//!
//! Collider nodes must keep `local == world`, so the parent passed to the
//! builder is expected to carry an identity transform.

use std::sync::Arc;

use gauntlet_core::geometry::{box_geometry, sphere_geometry};
use gauntlet_core::{Drawable, Lava, Material, Mesh, NodeKey, SceneGraph, SceneNode, Sprite, Transform};
use gauntlet_math::{Quat, Vec3};
use gauntlet_physics::{Collider, ColliderSet, ColliderShape, Trigger, TriggerSet};
use serde::{Deserialize, Serialize};

use super::assets::LevelAssets;
use super::behavior::{Axis, UpdateBehavior};
use super::hazards::{saw_blade_geometry, saw_material, spike_geometry, spike_material};
use super::{BoundBehavior, Hazard, Level, LevelObject, PowerupKind, TriggerAction};

/// Spawn point used when a level sets none
pub const DEFAULT_SPAWN: Vec3 = Vec3::new(0.0, 30.0, 0.0);
/// Sun position used when a level sets none
pub const DEFAULT_LIGHT: Vec3 = Vec3::new(1.0, 3.0, -3.0);

const POWERUP_RADIUS: f32 = 0.8;
const SPRITE_ORDER: i32 = gauntlet_core::drawable::SPRITE_RENDER_ORDER;
const SPHERE_RINGS: u32 = 72;
const SPHERE_SEGMENTS: u32 = 48;
const FINISH_WIDTH: f32 = 8.0;
const FINISH_HEIGHT: f32 = 6.0;
const FINISH_BAR: f32 = 0.3;

/// Surface presets of level geometry
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum LevelMaterial {
    /// Static platforms
    Solid,
    Sphere,
    Elevator,
    Tilting,
    Moving,
    Trampoline,
    Stone,
    Custom(Material),
}

impl LevelMaterial {
    pub fn material(&self) -> Material {
        match self {
            LevelMaterial::Solid => Material::from_hex(0xD65647).with_texture_scale(0.2),
            LevelMaterial::Sphere => Material::from_hex(0x388DCC).with_texture_scale(0.2),
            LevelMaterial::Elevator => Material::from_hex(0xADE617).with_texture_scale(0.2),
            LevelMaterial::Tilting => Material::from_hex(0x2C5599).with_texture_scale(0.2),
            LevelMaterial::Moving => Material::from_hex(0xE62000).with_texture_scale(0.2),
            LevelMaterial::Trampoline => Material::from_hex(0x1764E6)
                .with_roughness(0.18)
                .with_texture_scale(0.2),
            LevelMaterial::Stone => Material::WHITE.with_texture_scale(0.4),
            LevelMaterial::Custom(material) => *material,
        }
    }
}

impl From<LevelMaterial> for Material {
    fn from(kind: LevelMaterial) -> Self {
        kind.material()
    }
}

/// Index of an object created by a [`LevelBuilder`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

/// Assembles one level into a scene graph
pub struct LevelBuilder<'a> {
    graph: &'a mut SceneGraph,
    colliders: &'a mut ColliderSet,
    triggers: &'a mut TriggerSet<TriggerAction>,
    assets: &'a LevelAssets,
    parent: NodeKey,
    name: String,
    objects: Vec<LevelObject>,
    spawn_position: Vec3,
    spawn_yaw: f32,
    light_position: Vec3,
}

impl<'a> LevelBuilder<'a> {
    /// Start a level attached to the scene root
    pub fn new(
        name: impl Into<String>,
        graph: &'a mut SceneGraph,
        colliders: &'a mut ColliderSet,
        triggers: &'a mut TriggerSet<TriggerAction>,
        assets: &'a LevelAssets,
    ) -> Self {
        let parent = graph.root();
        Self {
            graph,
            colliders,
            triggers,
            assets,
            parent,
            name: name.into(),
            objects: Vec::new(),
            spawn_position: DEFAULT_SPAWN,
            spawn_yaw: 0.0,
            light_position: DEFAULT_LIGHT,
        }
    }

    /// Attach objects under `parent` instead of the scene root
    pub fn with_parent(mut self, parent: NodeKey) -> Self {
        self.parent = parent;
        self
    }

    pub fn set_spawn(&mut self, position: Vec3, yaw: f32) {
        self.spawn_position = position;
        self.spawn_yaw = yaw;
    }

    pub fn set_light(&mut self, position: Vec3) {
        self.light_position = position;
    }

    /// Root node of an object
    pub fn root(&self, id: ObjectId) -> Option<NodeKey> {
        self.objects.get(id.0).map(|o| o.root)
    }

    /// Number of objects created so far
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn link(&mut self, parent: NodeKey, node: SceneNode) -> NodeKey {
        let key = self.graph.insert(node);
        if let Err(e) = self.graph.add(parent, key) {
            log::warn!("level '{}': detached node: {}", self.name, e);
        }
        key
    }

    fn push_object(&mut self, root: NodeKey) -> ObjectId {
        self.objects.push(LevelObject::new(root));
        ObjectId(self.objects.len() - 1)
    }

    fn attach_root(&mut self, node: SceneNode) -> NodeKey {
        let parent = self.parent;
        self.link(parent, node)
    }

    fn textured_mesh(&self, geometry: gauntlet_core::Geometry, material: LevelMaterial) -> Mesh {
        Mesh::new(Arc::new(geometry), material.material()).with_textures(self.assets.plastic)
    }

    /// Static box obstacle
    pub fn collidable_box(&mut self, size: Vec3, position: Vec3, material: LevelMaterial) -> ObjectId {
        self.rotated_box(size, position, Vec3::Y, 0.0, material)
    }

    /// Box obstacle rotated by `angle` about `axis`
    pub fn rotated_box(&mut self, size: Vec3, position: Vec3, axis: Vec3, angle: f32, material: LevelMaterial) -> ObjectId {
        let transform = Transform::from_position_rotation(position, Quat::from_axis_angle(axis, angle));
        let mesh = self.textured_mesh(box_geometry(size.x, size.y, size.z), material);
        let node = self.attach_root(SceneNode::with_drawable(Drawable::Mesh(mesh)).with_transform(transform));
        self.colliders
            .insert_obstacle(Collider::new(node, ColliderShape::cuboid(size), &transform));
        self.push_object(node)
    }

    /// Sphere obstacle
    pub fn collidable_sphere(&mut self, radius: f32, position: Vec3, material: LevelMaterial) -> ObjectId {
        let transform = Transform::from_position(position);
        let mesh = self.textured_mesh(sphere_geometry(radius, SPHERE_RINGS, SPHERE_SEGMENTS), material);
        let node = self.attach_root(SceneNode::with_drawable(Drawable::Mesh(mesh)).with_transform(transform));
        self.colliders
            .insert_obstacle(Collider::new(node, ColliderShape::sphere(radius), &transform));
        self.push_object(node)
    }

    /// Spinning saw blade of diameter `0.8 * size`, facing along Z before
    /// the `angle` turn about Y
    pub fn saw_blade(&mut self, size: f32, position: Vec3, angle: f32) -> ObjectId {
        let transform = Transform::from_position_rotation(position, Quat::from_axis_angle(Vec3::Y, angle));
        let root = self.attach_root(SceneNode::new().with_transform(transform).with_name("saw"));
        self.colliders
            .insert(Collider::new(root, ColliderShape::cuboid(Vec3::new(size, size, 0.2)), &transform));

        let blade = Mesh::new(Arc::new(saw_blade_geometry(size)), saw_material());
        let blade = self.link(root, SceneNode::with_drawable(Drawable::Mesh(blade)));

        let id = self.push_object(root);
        self.add_node_behavior(id, blade, UpdateBehavior::SawSpin { speed: -10.0 });
        self.triggers.push(Trigger::new(root, TriggerAction::Hazard(Hazard::SawBlade)));
        id
    }

    /// Grid of `count_x` by `count_z` spikes popping out of the floor at
    /// height `position.y`
    pub fn spikes(&mut self, count_x: u32, count_z: u32, position: Vec3, speed: f32, time_offset: f32) -> ObjectId {
        let transform = Transform::from_position(position);
        let size = Vec3::new(0.4 * count_x as f32, 1.2, 0.4 * count_z as f32);
        let root = self.attach_root(SceneNode::new().with_transform(transform).with_name("spikes"));
        self.colliders
            .insert(Collider::new(root, ColliderShape::cuboid(size), &transform));

        let mesh = Mesh::new(Arc::new(spike_geometry(count_x, count_z)), spike_material());
        self.link(root, SceneNode::with_drawable(Drawable::Mesh(mesh)));

        let id = self.push_object(root);
        self.elevator(id, position.y - 1.9, position.y - 0.1, speed, time_offset, Axis::Y);
        self.triggers.push(Trigger::new(root, TriggerAction::Hazard(Hazard::Spikes)));
        id
    }

    /// Bouncing pad launching the player upwards
    pub fn trampoline(&mut self, size: Vec3, position: Vec3, material: Option<LevelMaterial>) -> ObjectId {
        let transform = Transform::from_position(position);
        let material = material.unwrap_or(LevelMaterial::Trampoline).material();
        let mesh = Mesh::new(Arc::new(box_geometry(size.x, size.y, size.z)), material);
        let root = self.attach_root(SceneNode::with_drawable(Drawable::Mesh(mesh)).with_transform(transform));
        self.colliders
            .insert(Collider::new(root, ColliderShape::cuboid(size), &transform));

        let id = self.push_object(root);
        self.add_behavior(
            id,
            UpdateBehavior::Bounce {
                base: position.y,
                height: 0.3,
                frequency: 10.0,
            },
        );
        self.triggers.push(Trigger::new(root, TriggerAction::Trampoline));
        id
    }

    /// Floating icon granting a powerup once until the next respawn
    pub fn powerup(&mut self, kind: PowerupKind, position: Vec3) -> ObjectId {
        let transform = Transform::from_position(position);
        let root = self.attach_root(
            SceneNode::new()
                .with_transform(transform)
                .with_render_order(SPRITE_ORDER)
                .with_name("powerup"),
        );
        self.colliders
            .insert(Collider::new(root, ColliderShape::sphere(POWERUP_RADIUS), &transform));

        let sprite = Sprite::new(self.assets.icon(kind));
        let icon = self.link(root, SceneNode::with_drawable(Drawable::Sprite(sprite)));

        let id = self.push_object(root);
        self.add_node_behavior(
            id,
            icon,
            UpdateBehavior::Hover {
                spin_speed: 2.0,
                bob_speed: 3.0,
                bob_height: 0.1,
            },
        );
        self.triggers.push(Trigger::one_shot(root, TriggerAction::Powerup(kind)));
        id
    }

    /// Portal frame standing on `position`, turned `angle` about Y
    pub fn finish_object(&mut self, position: Vec3, angle: f32) -> ObjectId {
        let center = position + Vec3::new(0.0, FINISH_HEIGHT / 2.0, 0.0);
        let transform = Transform::from_position_rotation(center, Quat::from_axis_angle(Vec3::Y, angle));
        let root = self.attach_root(
            SceneNode::new()
                .with_transform(transform)
                .with_render_order(SPRITE_ORDER)
                .with_name("finish"),
        );
        let trigger_size = Vec3::new(FINISH_WIDTH, FINISH_HEIGHT, 0.01);
        self.colliders
            .insert(Collider::new(root, ColliderShape::cuboid(trigger_size), &transform));

        let mut portal = Lava::new(Arc::new(box_geometry(FINISH_WIDTH, FINISH_HEIGHT - 0.15, 0.01)));
        portal.hue_shift = true;
        self.link(root, SceneNode::with_drawable(Drawable::Lava(portal)).at(Vec3::new(0.0, -0.15, 0.0)));

        let frame = Material::from_rgb(0.5, 0.3, 0.3);
        let half_width = FINISH_WIDTH / 2.0;
        let bars = [
            (Vec3::new(FINISH_BAR, FINISH_HEIGHT, FINISH_BAR), Vec3::new(-half_width, 0.0, 0.0)),
            (Vec3::new(FINISH_BAR, FINISH_HEIGHT, FINISH_BAR), Vec3::new(half_width, 0.0, 0.0)),
            (
                Vec3::new(FINISH_WIDTH - FINISH_BAR, FINISH_BAR, FINISH_BAR),
                Vec3::new(0.0, (FINISH_HEIGHT - FINISH_BAR) / 2.0, 0.0),
            ),
        ];
        for (size, offset) in bars {
            let bar = Mesh::new(Arc::new(box_geometry(size.x, size.y, size.z)), frame);
            self.link(root, SceneNode::with_drawable(Drawable::Mesh(bar)).at(offset));
        }

        self.triggers.push(Trigger::new(root, TriggerAction::Finish));
        self.push_object(root)
    }

    /// Attach a behavior to an object's root node
    pub fn add_behavior(&mut self, id: ObjectId, behavior: UpdateBehavior) {
        if let Some(root) = self.root(id) {
            self.add_node_behavior(id, root, behavior);
        }
    }

    /// Attach a behavior driving `node`, which belongs to the object
    pub fn add_node_behavior(&mut self, id: ObjectId, node: NodeKey, behavior: UpdateBehavior) {
        match self.objects.get_mut(id.0) {
            Some(object) => object.behaviors.push(BoundBehavior { node, behavior }),
            None => log::warn!("level '{}': behavior for unknown object {:?}", self.name, id),
        }
    }

    /// Move the object back and forth between `min` and `max` along `axis`
    pub fn elevator(&mut self, id: ObjectId, min: f32, max: f32, speed: f32, time_offset: f32, axis: Axis) {
        self.add_behavior(
            id,
            UpdateBehavior::Elevator {
                min,
                max,
                speed,
                time_offset,
                axis,
            },
        );
    }

    /// Rock the object about `axis`
    pub fn tilting_block(&mut self, id: ObjectId, max_angle: f32, speed: f32, axis: Axis, smoothness: f32, time_offset: f32) {
        self.add_behavior(
            id,
            UpdateBehavior::TiltingBlock {
                max_angle,
                speed,
                axis,
                smoothness,
                time_offset,
            },
        );
    }

    /// Add a decorative mesh under the object's root
    pub fn add_mesh_child(&mut self, id: ObjectId, mesh: Mesh, position: Vec3) -> Option<NodeKey> {
        let root = self.root(id)?;
        Some(self.link(root, SceneNode::with_drawable(Drawable::Mesh(mesh)).at(position)))
    }

    /// Refresh the collider matrices and hand out the level
    pub fn build(self) -> Level {
        let time = 0.0;
        for object in &self.objects {
            object.update(self.graph, time);
            self.colliders.update_subtree(self.graph, object.root);
        }
        log::info!(
            "built level '{}': {} objects, {} colliders, {} triggers",
            self.name,
            self.objects.len(),
            self.colliders.len(),
            self.triggers.len()
        );
        Level {
            name: self.name,
            objects: self.objects,
            spawn_position: self.spawn_position,
            spawn_yaw: self.spawn_yaw,
            light_position: self.light_position,
        }
    }
}
