//! Scene management module
//!
//! Provides the scene graph (closed node variants, GPU resource handles),
//! traversal visitors and the scene manager that owns the root.

mod node;
mod resource;
mod scene;
mod scene_manager;

pub use node::{
    SceneNode, Renderable, Group, MaterialSlot,
    NodeVisitor, ResourceDisposer, BoundsCollector,
};
pub use resource::{AABB, GpuResource, Geometry, Material, Texture};
pub use scene::{Scene, NodeKey};
pub use scene_manager::{SceneManager, SharedScene};

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
