//! Scene graph arena
//!
//! Nodes live in a [`SlotMap`] and refer to each other through [`NodeKey`]s.
//! Each node keeps its ordered child list plus a non-owning parent key, so
//! world matrices can be derived by walking upwards and subtrees can be
//! removed by walking downwards without any reference cycles.

use std::fmt;

use gauntlet_math::{Mat4, Vec3};
use slotmap::{new_key_type, SlotMap};

use crate::{Drawable, Transform};

new_key_type! {
    /// Key to a node in the scene graph
    ///
    /// Keys are generational: a key to a disposed node never resolves to a
    /// node created later in the same slot.
    pub struct NodeKey;
}

/// Errors from linking scene graph nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneGraphError {
    /// The key does not refer to a live node
    MissingNode,
    /// Linking would make a node its own ancestor
    Cycle,
}

impl fmt::Display for SceneGraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneGraphError::MissingNode => write!(f, "scene node does not exist"),
            SceneGraphError::Cycle => write!(f, "a node cannot become its own ancestor"),
        }
    }
}

impl std::error::Error for SceneGraphError {}

/// A node in the scene graph
#[derive(Debug)]
pub struct SceneNode {
    /// Optional name for debugging and lookup
    pub name: Option<String>,
    /// Local transform relative to the parent
    pub transform: Transform,
    /// Invisible nodes hide their whole subtree
    pub visible: bool,
    /// Ascending draw key among siblings; ties keep insertion order
    pub render_order: i32,
    /// Optional render capability
    pub drawable: Option<Drawable>,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl Default for SceneNode {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneNode {
    /// Create an empty, visible node with an identity transform
    pub fn new() -> Self {
        Self {
            name: None,
            transform: Transform::identity(),
            visible: true,
            render_order: 0,
            drawable: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create a node carrying a drawable
    ///
    /// The render order starts at the drawable's default.
    pub fn with_drawable(drawable: Drawable) -> Self {
        Self {
            render_order: drawable.default_render_order(),
            drawable: Some(drawable),
            ..Self::new()
        }
    }

    /// Set the transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the local position
    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Set the render order
    pub fn with_render_order(mut self, order: i32) -> Self {
        self.render_order = order;
        self
    }

    /// Set the visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parent key, if linked
    #[inline]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Children in insertion order
    #[inline]
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }
}

/// Arena holding every node of a scene
pub struct SceneGraph {
    nodes: SlotMap<NodeKey, SceneNode>,
    root: NodeKey,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only the root node
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new().with_name("root"));
        Self { nodes, root }
    }

    /// The root node
    #[inline]
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Number of live nodes, root included
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root remains
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Whether `key` refers to a live node
    #[inline]
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Insert an unlinked node
    pub fn insert(&mut self, node: SceneNode) -> NodeKey {
        let mut node = node;
        node.parent = None;
        node.children.clear();
        self.nodes.insert(node)
    }

    /// Insert a node and link it as the last child of `parent`
    pub fn insert_child(&mut self, parent: NodeKey, node: SceneNode) -> Result<NodeKey, SceneGraphError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneGraphError::MissingNode);
        }
        let key = self.insert(node);
        self.add(parent, key)?;
        Ok(key)
    }

    /// Get a node
    #[inline]
    pub fn get(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Get a node mutably
    #[inline]
    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    /// Local transform of a node
    #[inline]
    pub fn transform(&self, key: NodeKey) -> Option<&Transform> {
        self.nodes.get(key).map(|n| &n.transform)
    }

    /// Mutable local transform of a node
    #[inline]
    pub fn transform_mut(&mut self, key: NodeKey) -> Option<&mut Transform> {
        self.nodes.get_mut(key).map(|n| &mut n.transform)
    }

    /// Parent of a node
    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|n| n.parent)
    }

    /// Children of a node (empty for unknown keys)
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes.get(key).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Link `child` as the last child of `parent`
    ///
    /// A child that already has a parent is detached from it first.
    pub fn add(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), SceneGraphError> {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return Err(SceneGraphError::MissingNode);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneGraphError::Cycle);
        }

        if let Some(old) = self.parent(child) {
            self.unlink(old, child);
        }
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
        Ok(())
    }

    /// Unlink `child` from `parent`
    ///
    /// Does nothing when `child` is not a child of `parent`.
    pub fn remove(&mut self, parent: NodeKey, child: NodeKey) {
        if self.parent(child) == Some(parent) {
            self.unlink(parent, child);
        }
    }

    /// Detach from the current parent and optionally attach to a new one
    pub fn set_parent(&mut self, child: NodeKey, parent: Option<NodeKey>) -> Result<(), SceneGraphError> {
        match parent {
            Some(p) => self.add(p, child),
            None => {
                if let Some(old) = self.parent(child) {
                    self.unlink(old, child);
                }
                Ok(())
            }
        }
    }

    fn unlink(&mut self, parent: NodeKey, child: NodeKey) {
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&c| c != child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = None;
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeKey, mut key: NodeKey) -> bool {
        loop {
            if key == ancestor {
                return true;
            }
            match self.parent(key) {
                Some(p) => key = p,
                None => return false,
            }
        }
    }

    /// Visit the node itself, then each direct child (not recursive)
    pub fn traverse<F: FnMut(NodeKey, &SceneNode)>(&self, key: NodeKey, mut f: F) {
        let Some(node) = self.nodes.get(key) else { return };
        f(key, node);
        for &child in &node.children {
            if let Some(c) = self.nodes.get(child) {
                f(child, c);
            }
        }
    }

    /// Keys of the whole subtree rooted at `key`, depth-first pre-order
    pub fn subtree(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        if !self.nodes.contains_key(key) {
            return out;
        }
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            out.push(k);
            if let Some(node) = self.nodes.get(k) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Local-to-world matrix: `parent_world * local`
    pub fn local_to_world(&self, key: NodeKey) -> Option<Mat4> {
        let node = self.nodes.get(key)?;
        let local = node.transform.matrix();
        match node.parent {
            Some(p) => self.local_to_world(p).map(|pw| pw * local),
            None => Some(local),
        }
    }

    /// World-to-local matrix: `local_inverse * parent_world_to_local`
    pub fn world_to_local(&self, key: NodeKey) -> Option<Mat4> {
        let node = self.nodes.get(key)?;
        let inv = node.transform.matrix_inverse();
        match node.parent {
            Some(p) => self.world_to_local(p).map(|pw| pw.pre_multiply(&inv)),
            None => Some(inv),
        }
    }

    /// The node's local position pushed through its local-to-world matrix
    pub fn world_position(&self, key: NodeKey) -> Option<Vec3> {
        let position = self.nodes.get(key)?.transform.position;
        self.local_to_world(key).map(|m| m.transform_point(position))
    }

    /// Remove a node and its whole subtree, returning the removed nodes
    ///
    /// Disposing the root removes its descendants and keeps the root itself.
    /// Callers release GPU resources held by the returned drawables.
    pub fn dispose(&mut self, key: NodeKey) -> Vec<SceneNode> {
        if !self.nodes.contains_key(key) {
            return Vec::new();
        }

        if key == self.root {
            let children: Vec<NodeKey> = self.children(key).to_vec();
            return children.into_iter().flat_map(|c| self.dispose(c)).collect();
        }

        if let Some(p) = self.parent(key) {
            self.unlink(p, key);
        }
        let removed: Vec<SceneNode> = self
            .subtree(key)
            .into_iter()
            .filter_map(|k| self.nodes.remove(k))
            .collect();
        log::trace!("disposed {} scene nodes", removed.len());
        removed
    }

    /// Iterate over every live node
    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> {
        self.nodes.iter()
    }
}
