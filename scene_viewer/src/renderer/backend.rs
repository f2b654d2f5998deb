/// Graphics backend capability traits.
///
/// The viewer never talks to a GPU API directly. A backend provides:
/// - surface creation (`GraphicsBackend`)
/// - one draw call per frame and sizing (`RenderSurface`)
/// - resource release (`GpuHandle`)
///
/// The host application provides the `Container` a surface is mounted into.

use std::sync::Arc;
use winit::dpi::PhysicalSize;
use crate::camera::PerspectiveCamera;
use crate::error::Result;
use crate::scene::Scene;

/// Identifier of a surface's visual element inside a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// Host surface a render surface is mounted into
///
/// Implementations use interior mutability; the container is shared between
/// the render manager and plugins.
pub trait Container: Send + Sync {
    /// Current content box in physical pixels (may be zero while hidden)
    fn content_size(&self) -> PhysicalSize<u32>;

    /// Attach a visual element as the last child
    fn append_child(&self, element: ElementId);

    /// Detach a visual element
    fn remove_child(&self, element: ElementId);

    /// True if the element is currently a child
    fn contains_child(&self, element: ElementId) -> bool;
}

/// Shared handle to the host container
pub type SharedContainer = Arc<dyn Container>;

/// Surface creation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceDesc {
    /// Initial size, each dimension at least 1
    pub size: PhysicalSize<u32>,
    /// Multisample the output
    pub antialias: bool,
    /// Transparent clear color
    pub alpha: bool,
}

/// GPU output surface bound to one container element
pub trait RenderSurface: Send {
    /// Visual element to mount into the container
    fn element(&self) -> ElementId;

    /// Current drawable size
    fn size(&self) -> PhysicalSize<u32>;

    /// Resize the drawable
    fn set_size(&mut self, size: PhysicalSize<u32>);

    /// Draw one frame
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()>;

    /// Release GPU objects owned by the surface
    fn release(&mut self);
}

/// Factory for render surfaces
pub trait GraphicsBackend: Send + Sync {
    /// Create a surface
    fn create_surface(&self, desc: &SurfaceDesc) -> Result<Box<dyn RenderSurface>>;
}

/// Backend object that must be released explicitly (buffer, texture, program)
pub trait GpuHandle: Send + Sync {
    /// Free the backend object. Called at most once per `GpuResource`.
    fn release(&self);
}

/// Floor a dimension and clamp it to at least 1.
///
/// NaN and negative values map to 1; values beyond `u32::MAX` saturate.
pub fn clamp_dimension(value: f64) -> u32 {
    let floored = value.floor();
    if floored >= 1.0 {
        floored as u32
    } else {
        1
    }
}

/// Clamp both dimensions of a size to at least 1
pub fn clamp_size(size: PhysicalSize<u32>) -> PhysicalSize<u32> {
    PhysicalSize::new(size.width.max(1), size.height.max(1))
}
