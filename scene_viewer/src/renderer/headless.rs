/// Headless backend: no GPU required.
///
/// Implements every backend trait with counters shared through
/// `HeadlessStats`, so the viewer can run in CI, in tools and in tests.
/// Rendering walks the scene and fails if it meets a released resource,
/// which is how a real backend would hit a use-after-free.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use glam::{Mat4, Vec3};
use winit::dpi::PhysicalSize;
use crate::camera::PerspectiveCamera;
use crate::error::Result;
use crate::scene::{
    AABB, Geometry, GpuResource, Material, NodeVisitor, Renderable, Scene, Texture,
};
use crate::utils::lock_shared;
use crate::viewer_bail;
use super::backend::{
    Container, ElementId, GpuHandle, GraphicsBackend, RenderSurface, SurfaceDesc,
};

const SOURCE: &str = "viewer::headless";

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRecord {
    /// Direct children of the scene root
    pub child_count: usize,
    /// Camera position at draw time
    pub camera_position: Vec3,
    /// Camera aspect at draw time
    pub camera_aspect: f32,
    /// Surface size at draw time
    pub size: PhysicalSize<u32>,
}

/// Counters shared by a backend and everything it created
#[derive(Debug, Clone, Default)]
pub struct HeadlessStats {
    pub surfaces_created: u32,
    pub surfaces_released: u32,
    pub render_calls: u64,
    pub resize_calls: u32,
    pub resources_created: u32,
    pub resources_released: u32,
    /// Releases of an already released handle (must stay 0)
    pub double_releases: u32,
    pub last_render: Option<RenderRecord>,
}

// ============================================================================
// Resources
// ============================================================================

/// Backend handle counting its releases
pub struct HeadlessHandle {
    stats: Arc<Mutex<HeadlessStats>>,
    releases: AtomicU32,
}

impl HeadlessHandle {
    /// Number of times `release` was called on this handle
    pub fn release_count(&self) -> u32 {
        self.releases.load(Ordering::Acquire)
    }
}

impl GpuHandle for HeadlessHandle {
    fn release(&self) {
        let previous = self.releases.fetch_add(1, Ordering::AcqRel);
        let mut stats = lock_shared(&self.stats, SOURCE);
        if previous == 0 {
            stats.resources_released += 1;
        } else {
            stats.double_releases += 1;
        }
    }
}

// ============================================================================
// Surface
// ============================================================================

/// Surface recording draw calls
pub struct HeadlessSurface {
    element: ElementId,
    size: PhysicalSize<u32>,
    antialias: bool,
    alpha: bool,
    released: bool,
    stats: Arc<Mutex<HeadlessStats>>,
}

impl HeadlessSurface {
    pub fn antialias(&self) -> bool {
        self.antialias
    }

    pub fn alpha(&self) -> bool {
        self.alpha
    }
}

/// Finds the first released resource reachable from the scene
#[derive(Default)]
struct ReleasedResourceFinder {
    found: Option<String>,
}

impl ReleasedResourceFinder {
    fn check(&mut self, renderable: &Renderable) {
        if self.found.is_some() {
            return;
        }
        let geometry = renderable.geometry.resource();
        if geometry.is_released() {
            self.found = Some(geometry.label().to_string());
            return;
        }
        for material in renderable.material.iter() {
            let textures = material.textures().iter().map(Texture::resource);
            for resource in std::iter::once(material.resource()).chain(textures) {
                if resource.is_released() {
                    self.found = Some(resource.label().to_string());
                    return;
                }
            }
        }
    }
}

impl NodeVisitor for ReleasedResourceFinder {
    fn visit_mesh(&mut self, mesh: &Renderable, _world: &Mat4) {
        self.check(mesh);
    }

    fn visit_line(&mut self, line: &Renderable, _world: &Mat4) {
        self.check(line);
    }

    fn visit_points(&mut self, points: &Renderable, _world: &Mat4) {
        self.check(points);
    }
}

impl RenderSurface for HeadlessSurface {
    fn element(&self) -> ElementId {
        self.element
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    fn set_size(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
        lock_shared(&self.stats, SOURCE).resize_calls += 1;
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()> {
        if self.released {
            viewer_bail!(SOURCE, BackendError, "render on released surface {:?}", self.element);
        }

        let mut finder = ReleasedResourceFinder::default();
        for (_, node) in scene.children() {
            node.accept(&mut finder, &Mat4::IDENTITY);
        }
        if let Some(label) = finder.found.or_else(|| {
            scene
                .background()
                .filter(|t| t.resource().is_released())
                .map(|t| t.resource().label().to_string())
        }) {
            viewer_bail!(SOURCE, BackendError, "use after release of '{}'", label);
        }

        let mut stats = lock_shared(&self.stats, SOURCE);
        stats.render_calls += 1;
        stats.last_render = Some(RenderRecord {
            child_count: scene.child_count(),
            camera_position: camera.position(),
            camera_aspect: camera.aspect(),
            size: self.size,
        });
        Ok(())
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            lock_shared(&self.stats, SOURCE).surfaces_released += 1;
        }
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Backend creating headless surfaces and resources
#[derive(Clone, Default)]
pub struct HeadlessBackend {
    stats: Arc<Mutex<HeadlessStats>>,
    next_element: Arc<AtomicU64>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the shared counters
    pub fn stats(&self) -> HeadlessStats {
        lock_shared(&self.stats, SOURCE).clone()
    }

    /// Create a tracked backend handle
    pub fn resource(&self, label: &str) -> GpuResource {
        lock_shared(&self.stats, SOURCE).resources_created += 1;
        let handle = HeadlessHandle {
            stats: self.stats.clone(),
            releases: AtomicU32::new(0),
        };
        GpuResource::new(label, Arc::new(handle))
    }

    /// Geometry with the given local bounds
    pub fn geometry(&self, label: &str, bounding_box: AABB) -> Geometry {
        Geometry::new(self.resource(label), bounding_box)
    }

    /// Unit cube geometry centred at the origin
    pub fn cube(&self, label: &str) -> Geometry {
        self.geometry(label, AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5)))
    }

    pub fn material(&self, label: &str) -> Material {
        Material::new(self.resource(label))
    }

    pub fn texture(&self, label: &str) -> Texture {
        Texture::new(self.resource(label))
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn create_surface(&self, desc: &SurfaceDesc) -> Result<Box<dyn RenderSurface>> {
        let element = ElementId(self.next_element.fetch_add(1, Ordering::Relaxed) + 1);
        lock_shared(&self.stats, SOURCE).surfaces_created += 1;
        Ok(Box::new(HeadlessSurface {
            element,
            size: desc.size,
            antialias: desc.antialias,
            alpha: desc.alpha,
            released: false,
            stats: self.stats.clone(),
        }))
    }
}

// ============================================================================
// Container
// ============================================================================

/// In-memory container with a settable content box
pub struct HeadlessContainer {
    size: Mutex<PhysicalSize<u32>>,
    children: Mutex<Vec<ElementId>>,
}

impl HeadlessContainer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Mutex::new(PhysicalSize::new(width, height)),
            children: Mutex::new(Vec::new()),
        }
    }

    /// Change the reported content box
    pub fn set_content_size(&self, width: u32, height: u32) {
        *lock_shared(&self.size, SOURCE) = PhysicalSize::new(width, height);
    }

    /// Mounted elements in order
    pub fn children(&self) -> Vec<ElementId> {
        lock_shared(&self.children, SOURCE).clone()
    }
}

impl Container for HeadlessContainer {
    fn content_size(&self) -> PhysicalSize<u32> {
        *lock_shared(&self.size, SOURCE)
    }

    fn append_child(&self, element: ElementId) {
        lock_shared(&self.children, SOURCE).push(element);
    }

    fn remove_child(&self, element: ElementId) {
        lock_shared(&self.children, SOURCE).retain(|e| *e != element);
    }

    fn contains_child(&self, element: ElementId) -> bool {
        lock_shared(&self.children, SOURCE).contains(&element)
    }
}
