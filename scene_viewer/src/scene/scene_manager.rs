//! Central scene manager for the viewer.
//!
//! Owns the scene root and is the only component allowed to change its
//! direct children. Disposal walks every removed subtree and releases its
//! geometry, materials and textures; a node left with live GPU handles after
//! `clear()`/`dispose()` is a leak.

use crate::error::Result;
use crate::lifecycle::Lifecycle;
use crate::utils::Shared;
use super::node::SceneNode;
use super::resource::Texture;
use super::scene::{NodeKey, Scene};

const SOURCE: &str = "viewer::SceneManager";

/// Shared handle to the scene manager
pub type SharedScene = Shared<SceneManager>;

pub struct SceneManager {
    scene: Scene,
    lifecycle: Lifecycle,
}

impl SceneManager {
    /// Create a manager owning an empty scene
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            lifecycle: Lifecycle::Ready,
        }
    }

    /// Read access to the scene root
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.scene.child_count()
    }

    /// Get a direct child by key
    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.scene.node(key)
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }

    /// Add a node as a direct child of the root
    ///
    /// # Errors
    ///
    /// Returns `Error::Disposed` after `dispose()`. The rejected node's
    /// resources are released so they do not leak.
    pub fn add(&mut self, node: SceneNode) -> Result<NodeKey> {
        if let Err(err) = self.lifecycle.ensure_not_disposed(SOURCE, "add") {
            node.dispose();
            return Err(err);
        }
        crate::viewer_trace!(SOURCE, "Adding node '{}'", node.name());
        Ok(self.scene.insert(node))
    }

    /// Detach a direct child without releasing its resources
    ///
    /// Returns the node, or `None` if the key is unknown.
    pub fn remove(&mut self, key: NodeKey) -> Result<Option<SceneNode>> {
        self.lifecycle.ensure_not_disposed(SOURCE, "remove")?;
        Ok(self.scene.remove(key))
    }

    /// Remove and dispose every child
    ///
    /// Returns the number of GPU handles released.
    pub fn clear(&mut self) -> Result<usize> {
        self.lifecycle.ensure_not_disposed(SOURCE, "clear")?;
        Ok(self.dispose_children())
    }

    /// Replace the background texture, releasing the previous one
    pub fn set_background(&mut self, background: Option<Texture>) -> Result<()> {
        self.lifecycle.ensure_not_disposed(SOURCE, "set_background")?;
        let incoming = background.as_ref().map(|t| t.resource().clone());
        if let Some(previous) = self.scene.set_background(background) {
            let replaced_by_same = incoming
                .map(|r| r.same_resource(previous.resource()))
                .unwrap_or(false);
            if !replaced_by_same {
                previous.dispose();
            }
        }
        Ok(())
    }

    /// Dispose every child and the background, then mark disposed
    ///
    /// Idempotent: a second call is a no-op.
    pub fn dispose(&mut self) {
        if self.lifecycle.is_disposed() {
            return;
        }
        let mut released = self.dispose_children();
        if let Some(background) = self.scene.take_background() {
            released += background.dispose();
        }
        self.lifecycle.dispose();
        crate::viewer_debug!(SOURCE, "Disposed scene ({} GPU handles released)", released);
    }

    // Always re-read the current first child so the loop ends even if the
    // list changes underneath it.
    fn dispose_children(&mut self) -> usize {
        let mut released = 0;
        while let Some(key) = self.scene.first_child() {
            if let Some(node) = self.scene.remove(key) {
                released += node.dispose();
            }
        }
        released
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "scene_manager_tests.rs"]
mod tests;
