//! Registry of the colliders in the current level
//!
//! Colliders are keyed by the scene node they are attached to. Only the ones
//! registered as obstacles block the player; the rest serve as trigger
//! volumes. Obstacles are resolved in registration order.

use gauntlet_core::{NodeKey, SceneGraph};
use gauntlet_math::Vec3;
use slotmap::SecondaryMap;

use crate::collider::Collider;

/// All colliders of a level
#[derive(Debug, Default)]
pub struct ColliderSet {
    colliders: SecondaryMap<NodeKey, Collider>,
    obstacles: Vec<NodeKey>,
}

impl ColliderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collider that only serves as a trigger volume
    pub fn insert(&mut self, collider: Collider) -> NodeKey {
        let key = collider.node;
        self.colliders.insert(key, collider);
        key
    }

    /// Register a collider that blocks the player
    pub fn insert_obstacle(&mut self, collider: Collider) -> NodeKey {
        let key = self.insert(collider);
        if !self.obstacles.contains(&key) {
            self.obstacles.push(key);
        }
        key
    }

    pub fn get(&self, node: NodeKey) -> Option<&Collider> {
        self.colliders.get(node)
    }

    pub fn get_mut(&mut self, node: NodeKey) -> Option<&mut Collider> {
        self.colliders.get_mut(node)
    }

    pub fn contains(&self, node: NodeKey) -> bool {
        self.colliders.contains_key(node)
    }

    /// Unregister a collider
    pub fn remove(&mut self, node: NodeKey) -> Option<Collider> {
        self.obstacles.retain(|&k| k != node);
        self.colliders.remove(node)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Number of obstacle colliders
    #[inline]
    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Obstacles in registration order
    pub fn obstacles(&self) -> impl Iterator<Item = &Collider> {
        self.obstacles.iter().filter_map(|&k| self.colliders.get(k))
    }

    /// Refresh every collider attached to a node of the subtree under `root`
    pub fn update_subtree(&mut self, graph: &SceneGraph, root: NodeKey) {
        for key in graph.subtree(root) {
            if let Some(collider) = self.colliders.get_mut(key) {
                collider.update_matrix(graph);
            }
        }
    }

    /// Refresh every collider
    pub fn update_all(&mut self, graph: &SceneGraph) {
        for (_, collider) in self.colliders.iter_mut() {
            collider.update_matrix(graph);
        }
    }

    /// Push a sphere out of every obstacle in order, applying each push
    /// before testing the next obstacle
    ///
    /// Returns the pushes that were applied, in order.
    pub fn resolve_sphere(&self, position: &mut Vec3, radius: f32) -> Vec<Vec3> {
        let mut pushes = Vec::new();
        for collider in self.obstacles() {
            if let Some(push) = collider.resolve_collision(*position, radius) {
                *position += push;
                pushes.push(push);
            }
        }
        pushes
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.colliders.clear();
        self.obstacles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::ColliderShape;
    use gauntlet_core::{SceneNode, Transform};

    const EPSILON: f32 = 0.0001;

    fn add_box(graph: &mut SceneGraph, set: &mut ColliderSet, position: Vec3, obstacle: bool) -> NodeKey {
        let transform = Transform::from_position(position);
        let node = graph
            .insert_child(graph.root(), SceneNode::new().with_transform(transform))
            .unwrap();
        let collider = Collider::new(node, ColliderShape::cuboid(Vec3::splat(2.0)), &transform);
        if obstacle {
            set.insert_obstacle(collider)
        } else {
            set.insert(collider)
        }
    }

    #[test]
    fn test_only_obstacles_block() {
        let mut graph = SceneGraph::new();
        let mut set = ColliderSet::new();
        add_box(&mut graph, &mut set, Vec3::ZERO, false);

        let mut p = Vec3::new(0.0, 1.2, 0.0);
        assert!(set.resolve_sphere(&mut p, 0.4).is_empty());
        assert_eq!(set.len(), 1);
        assert_eq!(set.obstacle_count(), 0);
    }

    #[test]
    fn test_pushes_apply_in_order() {
        let mut graph = SceneGraph::new();
        let mut set = ColliderSet::new();
        add_box(&mut graph, &mut set, Vec3::ZERO, true);
        add_box(&mut graph, &mut set, Vec3::new(0.0, -0.1, 0.0), true);

        let mut p = Vec3::new(0.0, 1.2, 0.0);
        let pushes = set.resolve_sphere(&mut p, 0.4);
        // the lower box would catch y = 1.2 but not the corrected y = 1.4
        assert_eq!(pushes.len(), 1);
        assert!((p.y - 1.4).abs() < EPSILON);
    }

    #[test]
    fn test_update_subtree_refreshes_moved_nodes() {
        let mut graph = SceneGraph::new();
        let mut set = ColliderSet::new();
        let node = add_box(&mut graph, &mut set, Vec3::ZERO, true);

        graph.transform_mut(node).unwrap().position.y = 10.0;
        set.update_subtree(&graph, node);

        let mut p = Vec3::new(0.0, 11.2, 0.0);
        assert_eq!(set.resolve_sphere(&mut p, 0.4).len(), 1);
    }

    #[test]
    fn test_remove_drops_obstacle() {
        let mut graph = SceneGraph::new();
        let mut set = ColliderSet::new();
        let node = add_box(&mut graph, &mut set, Vec3::ZERO, true);
        assert!(set.remove(node).is_some());
        assert_eq!(set.obstacle_count(), 0);
        assert!(set.is_empty());
    }
}
