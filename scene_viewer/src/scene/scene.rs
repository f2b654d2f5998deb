/// Scene: the root of the scene graph.
///
/// Direct children are stored in a SlotMap for O(1) insert/remove with
/// stable keys, plus a key list preserving insertion order for drawing and
/// teardown. Mutation goes through `SceneManager`; backends and plugins read.

use slotmap::{new_key_type, SlotMap};
use glam::Mat4;
use super::node::SceneNode;
use super::resource::{AABB, Texture};

new_key_type! {
    /// Stable key of a direct child of the scene root
    pub struct NodeKey;
}

/// Scene root: ordered direct children plus an optional background texture.
#[derive(Default)]
pub struct Scene {
    nodes: SlotMap<NodeKey, SceneNode>,
    order: Vec<NodeKey>,
    background: Option<Texture>,
}

impl Scene {
    /// Create an empty scene (internal: only via SceneManager)
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, node: SceneNode) -> NodeKey {
        let key = self.nodes.insert(node);
        self.order.push(key);
        key
    }

    /// Detach a child. The key is always dropped from the order list so
    /// teardown loops make progress.
    pub(crate) fn remove(&mut self, key: NodeKey) -> Option<SceneNode> {
        self.order.retain(|k| *k != key);
        self.nodes.remove(key)
    }

    pub(crate) fn set_background(&mut self, background: Option<Texture>) -> Option<Texture> {
        std::mem::replace(&mut self.background, background)
    }

    pub(crate) fn take_background(&mut self) -> Option<Texture> {
        self.background.take()
    }

    /// First child in insertion order
    pub fn first_child(&self) -> Option<NodeKey> {
        self.order.first().copied()
    }

    /// Get a direct child by key
    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// True if the key refers to a live direct child
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Iterate direct children in insertion order
    pub fn children(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> + '_ {
        self.order
            .iter()
            .filter_map(move |key| self.nodes.get(*key).map(|node| (*key, node)))
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes in the whole graph (root excluded)
    pub fn node_count(&self) -> usize {
        self.nodes.values().map(SceneNode::subtree_len).sum()
    }

    /// Background / environment texture
    pub fn background(&self) -> Option<&Texture> {
        self.background.as_ref()
    }

    /// World-space bounds of everything in the scene
    pub fn bounding_box(&self) -> AABB {
        self.children()
            .map(|(_, node)| node.bounding_box())
            .fold(AABB::empty(), |acc, b| acc.union(&b))
    }

    /// World transform of a direct child (the root has identity transform)
    pub fn world_transform(&self, key: NodeKey) -> Option<Mat4> {
        self.nodes.get(key).map(SceneNode::transform)
    }
}
