/// Scene nodes: a closed set of renderable variants plus groups.
///
/// Traversal goes through `NodeVisitor`; disposal and bounds collection are
/// visitors with one rule per variant.

use glam::Mat4;
use super::resource::{AABB, Geometry, Material};

/// Material slot of a renderable: one material or one per geometry group
#[derive(Debug, Clone)]
pub enum MaterialSlot {
    Single(Material),
    Multi(Vec<Material>),
}

impl MaterialSlot {
    /// Iterate materials in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        let slice: &[Material] = match self {
            MaterialSlot::Single(material) => std::slice::from_ref(material),
            MaterialSlot::Multi(materials) => materials,
        };
        slice.iter()
    }

    /// Release every material element-wise; returns handles released
    pub fn dispose(&self) -> usize {
        self.iter().map(Material::dispose).sum()
    }
}

impl From<Material> for MaterialSlot {
    fn from(material: Material) -> Self {
        MaterialSlot::Single(material)
    }
}

impl From<Vec<Material>> for MaterialSlot {
    fn from(materials: Vec<Material>) -> Self {
        MaterialSlot::Multi(materials)
    }
}

/// Geometry drawn with a material slot
#[derive(Debug, Clone)]
pub struct Renderable {
    pub name: String,
    pub geometry: Geometry,
    pub material: MaterialSlot,
    pub transform: Mat4,
}

impl Renderable {
    pub fn new(name: impl Into<String>, geometry: Geometry, material: impl Into<MaterialSlot>) -> Self {
        Self {
            name: name.into(),
            geometry,
            material: material.into(),
            transform: Mat4::IDENTITY,
        }
    }

    /// Builder: local transform
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }
}

/// Transform-only container of child nodes
#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
    pub transform: Mat4,
    pub children: Vec<SceneNode>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), transform: Mat4::IDENTITY, children: Vec::new() }
    }

    /// Builder: append a child
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder: local transform
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }
}

/// A node of the scene graph
#[derive(Debug, Clone)]
pub enum SceneNode {
    /// Triangle mesh
    Mesh(Renderable),
    /// Line segments
    Line(Renderable),
    /// Point cloud
    Points(Renderable),
    /// Container
    Group(Group),
}

impl SceneNode {
    pub fn name(&self) -> &str {
        match self {
            SceneNode::Mesh(r) | SceneNode::Line(r) | SceneNode::Points(r) => &r.name,
            SceneNode::Group(g) => &g.name,
        }
    }

    pub fn transform(&self) -> Mat4 {
        match self {
            SceneNode::Mesh(r) | SceneNode::Line(r) | SceneNode::Points(r) => r.transform,
            SceneNode::Group(g) => g.transform,
        }
    }

    /// Walk this subtree depth-first, accumulating world transforms from `parent`.
    pub fn accept(&self, visitor: &mut dyn NodeVisitor, parent: &Mat4) {
        let world = *parent * self.transform();
        match self {
            SceneNode::Mesh(r) => visitor.visit_mesh(r, &world),
            SceneNode::Line(r) => visitor.visit_line(r, &world),
            SceneNode::Points(r) => visitor.visit_points(r, &world),
            SceneNode::Group(g) => {
                visitor.visit_group(g, &world);
                for child in &g.children {
                    child.accept(visitor, &world);
                }
            }
        }
    }

    /// Number of nodes in this subtree, itself included
    pub fn subtree_len(&self) -> usize {
        match self {
            SceneNode::Group(g) => 1 + g.children.iter().map(SceneNode::subtree_len).sum::<usize>(),
            _ => 1,
        }
    }

    /// World-space bounds of this subtree (this node's transform applied)
    pub fn bounding_box(&self) -> AABB {
        let mut collector = BoundsCollector::default();
        self.accept(&mut collector, &Mat4::IDENTITY);
        collector.bounds
    }

    /// Release every GPU resource in this subtree; returns handles released
    pub fn dispose(&self) -> usize {
        let mut disposer = ResourceDisposer::default();
        self.accept(&mut disposer, &Mat4::IDENTITY);
        disposer.released
    }
}

// ===== VISITORS =====

/// Per-variant traversal callbacks
pub trait NodeVisitor {
    fn visit_mesh(&mut self, mesh: &Renderable, world: &Mat4);
    fn visit_line(&mut self, line: &Renderable, world: &Mat4);
    fn visit_points(&mut self, points: &Renderable, world: &Mat4);
    /// Called before the group's children are visited
    fn visit_group(&mut self, group: &Group, world: &Mat4) {
        let _ = (group, world);
    }
}

/// Releases geometry, materials and their textures
#[derive(Debug, Default)]
pub struct ResourceDisposer {
    /// Handles released so far
    pub released: usize,
}

impl NodeVisitor for ResourceDisposer {
    fn visit_mesh(&mut self, mesh: &Renderable, _world: &Mat4) {
        self.released += mesh.geometry.dispose() + mesh.material.dispose();
    }

    fn visit_line(&mut self, line: &Renderable, _world: &Mat4) {
        self.released += line.geometry.dispose() + line.material.dispose();
    }

    fn visit_points(&mut self, points: &Renderable, _world: &Mat4) {
        self.released += points.geometry.dispose() + points.material.dispose();
    }
}

/// Collects world-space bounds of every renderable
#[derive(Debug)]
pub struct BoundsCollector {
    pub bounds: AABB,
}

impl Default for BoundsCollector {
    fn default() -> Self {
        Self { bounds: AABB::empty() }
    }
}

impl BoundsCollector {
    fn include(&mut self, renderable: &Renderable, world: &Mat4) {
        let local = renderable.geometry.bounding_box();
        self.bounds = self.bounds.union(&local.transformed(world));
    }
}

impl NodeVisitor for BoundsCollector {
    fn visit_mesh(&mut self, mesh: &Renderable, world: &Mat4) {
        self.include(mesh, world);
    }

    fn visit_line(&mut self, line: &Renderable, world: &Mat4) {
        self.include(line, world);
    }

    fn visit_points(&mut self, points: &Renderable, world: &Mat4) {
        self.include(points, world);
    }
}
