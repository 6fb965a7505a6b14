//! Trigger volumes
//!
//! A trigger pairs a collider with an action and an enabled flag. Each
//! physics step the enabled triggers are tested against the player sphere;
//! overlapping ones fire their action together with the penetration vector.

use gauntlet_core::NodeKey;
use gauntlet_math::Vec3;

use crate::collider_set::ColliderSet;

/// A trigger volume
#[derive(Clone, Debug)]
pub struct Trigger<A> {
    /// Node whose collider defines the volume
    pub collider: NodeKey,
    pub enabled: bool,
    /// Disable the trigger before firing (pickups)
    pub disable_on_fire: bool,
    pub action: A,
}

impl<A> Trigger<A> {
    /// A repeatable trigger
    pub fn new(collider: NodeKey, action: A) -> Self {
        Self {
            collider,
            enabled: true,
            disable_on_fire: false,
            action,
        }
    }

    /// A trigger that fires once until re-enabled
    pub fn one_shot(collider: NodeKey, action: A) -> Self {
        Self {
            disable_on_fire: true,
            ..Self::new(collider, action)
        }
    }
}

/// A fired trigger
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerHit<A> {
    /// Index of the trigger in its set
    pub index: usize,
    pub collider: NodeKey,
    pub action: A,
    /// Penetration vector reported by the collider
    pub push: Vec3,
}

/// Ordered list of triggers
#[derive(Clone, Debug)]
pub struct TriggerSet<A> {
    triggers: Vec<Trigger<A>>,
}

impl<A> Default for TriggerSet<A> {
    fn default() -> Self {
        Self { triggers: Vec::new() }
    }
}

impl<A: Clone> TriggerSet<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, trigger: Trigger<A>) -> usize {
        self.triggers.push(trigger);
        self.triggers.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Trigger<A>> {
        self.triggers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trigger<A>> {
        self.triggers.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Enable or disable one trigger, returning its collider node
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> Option<NodeKey> {
        let trigger = self.triggers.get_mut(index)?;
        trigger.enabled = enabled;
        Some(trigger.collider)
    }

    /// Re-enable every trigger, returning their collider nodes
    pub fn enable_all(&mut self) -> Vec<NodeKey> {
        self.triggers
            .iter_mut()
            .map(|t| {
                t.enabled = true;
                t.collider
            })
            .collect()
    }

    /// Test every enabled trigger against a sphere, in order
    ///
    /// One-shot triggers are disabled as they fire.
    pub fn evaluate(&mut self, colliders: &ColliderSet, point: Vec3, radius: f32) -> Vec<TriggerHit<A>> {
        let mut hits = Vec::new();
        for (index, trigger) in self.triggers.iter_mut().enumerate() {
            if !trigger.enabled {
                continue;
            }
            let Some(collider) = colliders.get(trigger.collider) else {
                continue;
            };
            if let Some(push) = collider.resolve_collision(point, radius) {
                if trigger.disable_on_fire {
                    trigger.enabled = false;
                }
                log::debug!("trigger {} fired", index);
                hits.push(TriggerHit {
                    index,
                    collider: trigger.collider,
                    action: trigger.action.clone(),
                    push,
                });
            }
        }
        hits
    }

    pub fn clear(&mut self) {
        self.triggers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::{Collider, ColliderShape};
    use gauntlet_core::{SceneGraph, SceneNode, Transform};

    #[derive(Clone, Debug, PartialEq)]
    enum Action {
        Pickup,
        Hazard,
    }

    fn setup() -> (SceneGraph, ColliderSet, NodeKey) {
        let mut graph = SceneGraph::new();
        let mut colliders = ColliderSet::new();
        let transform = Transform::from_position(Vec3::new(0.0, 1.0, 0.0));
        let node = graph
            .insert_child(graph.root(), SceneNode::new().with_transform(transform))
            .unwrap();
        colliders.insert(Collider::new(node, ColliderShape::sphere(0.8), &transform));
        (graph, colliders, node)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let (_graph, colliders, node) = setup();
        let mut triggers = TriggerSet::new();
        triggers.push(Trigger::one_shot(node, Action::Pickup));

        let p = Vec3::new(0.0, 1.5, 0.0);
        assert_eq!(triggers.evaluate(&colliders, p, 0.4).len(), 1);
        assert!(triggers.evaluate(&colliders, p, 0.4).is_empty());
        assert!(!triggers.get(0).unwrap().enabled);

        triggers.enable_all();
        assert_eq!(triggers.evaluate(&colliders, p, 0.4).len(), 1);
    }

    #[test]
    fn test_repeatable_fires_every_step() {
        let (_graph, colliders, node) = setup();
        let mut triggers = TriggerSet::new();
        triggers.push(Trigger::new(node, Action::Hazard));

        let p = Vec3::new(0.0, 1.5, 0.0);
        for _ in 0..3 {
            let hits = triggers.evaluate(&colliders, p, 0.4);
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].action, Action::Hazard);
        }
    }

    #[test]
    fn test_disabled_and_distant_do_not_fire() {
        let (_graph, colliders, node) = setup();
        let mut triggers = TriggerSet::new();
        let idx = triggers.push(Trigger::new(node, Action::Hazard));

        assert!(triggers.evaluate(&colliders, Vec3::new(0.0, 5.0, 0.0), 0.4).is_empty());

        assert_eq!(triggers.set_enabled(idx, false), Some(node));
        assert!(triggers.evaluate(&colliders, Vec3::new(0.0, 1.0, 0.0), 0.4).is_empty());
    }

    #[test]
    fn test_hit_reports_push() {
        let (_graph, colliders, node) = setup();
        let mut triggers = TriggerSet::new();
        triggers.push(Trigger::new(node, Action::Hazard));

        let hits = triggers.evaluate(&colliders, Vec3::new(0.0, 2.0, 0.0), 0.4);
        assert!((hits[0].push.y - 0.2).abs() < 0.0001);
        assert_eq!(hits[0].collider, node);
    }
}
