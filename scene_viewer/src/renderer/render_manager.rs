//! Render manager: owns the GPU output surface.
//!
//! `Uninitialized → Ready → Disposed`, linear. A disposed manager is never
//! re-initialized; the viewer replaces the whole manager instead.

use std::sync::Arc;
use winit::dpi::PhysicalSize;
use crate::camera::PerspectiveCamera;
use crate::error::Result;
use crate::lifecycle::Lifecycle;
use crate::scene::Scene;
use crate::utils::Shared;
use super::backend::{
    clamp_dimension, clamp_size, GraphicsBackend, RenderSurface, SharedContainer, SurfaceDesc,
};

const SOURCE: &str = "viewer::RenderManager";

/// Shared handle to the render manager
pub type SharedRenderer = Shared<RenderManager>;

/// Surface options applied at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Multisample the output (default: true)
    pub antialias: bool,
    /// Transparent background (default: false)
    pub alpha: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { antialias: true, alpha: false }
    }
}

pub struct RenderManager {
    backend: Arc<dyn GraphicsBackend>,
    surface: Option<Box<dyn RenderSurface>>,
    container: Option<SharedContainer>,
    lifecycle: Lifecycle,
}

impl RenderManager {
    /// Create an uninitialized manager on top of a backend
    pub fn new(backend: Arc<dyn GraphicsBackend>) -> Self {
        Self {
            backend,
            surface: None,
            container: None,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    /// Create the surface and mount it into the container
    ///
    /// The surface is sized to the container's content box; a zero
    /// dimension falls back to 1.
    ///
    /// # Errors
    ///
    /// - `AlreadyInitialized` on a second call
    /// - `Disposed` after `dispose()`
    /// - any backend error from surface creation (state unchanged)
    pub fn initialize(&mut self, container: SharedContainer, options: &RenderOptions) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Uninitialized => {}
            Lifecycle::Ready => crate::viewer_bail!(SOURCE, AlreadyInitialized, "initialize called twice"),
            Lifecycle::Disposed => crate::viewer_bail!(SOURCE, Disposed, "initialize called after dispose"),
        }

        let size = clamp_size(container.content_size());
        let surface = self.backend.create_surface(&SurfaceDesc {
            size,
            antialias: options.antialias,
            alpha: options.alpha,
        })?;
        container.append_child(surface.element());

        self.surface = Some(surface);
        self.container = Some(container);
        self.lifecycle.initialize(SOURCE)?;

        crate::viewer_info!(SOURCE, "Surface created at {}x{}", size.width, size.height);
        Ok(())
    }

    /// Resize the surface; each dimension is floored and clamped to at least 1
    ///
    /// Returns the size actually applied.
    pub fn set_size(&mut self, width: f64, height: f64) -> Result<PhysicalSize<u32>> {
        self.lifecycle.ensure_ready(SOURCE, "set_size")?;
        let size = PhysicalSize::new(clamp_dimension(width), clamp_dimension(height));
        if let Some(surface) = self.surface.as_mut() {
            surface.set_size(size);
        }
        Ok(size)
    }

    /// Draw one frame; a straight pass-through to the surface
    pub fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()> {
        self.lifecycle.ensure_ready(SOURCE, "render")?;
        match self.surface.as_mut() {
            Some(surface) => surface.render(scene, camera),
            None => crate::viewer_bail!(SOURCE, NotInitialized, "no surface"),
        }
    }

    /// Current surface size, if initialized
    pub fn size(&self) -> Option<PhysicalSize<u32>> {
        self.surface.as_ref().map(|s| s.size())
    }

    /// Container the surface is mounted into, if initialized
    pub fn container(&self) -> Option<&SharedContainer> {
        self.container.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle.is_ready()
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }

    /// Unmount and release the surface
    ///
    /// The element is only detached if it is still the container's child;
    /// the host may have removed it already. Idempotent.
    pub fn dispose(&mut self) {
        if !self.lifecycle.dispose() {
            return;
        }
        if let Some(mut surface) = self.surface.take() {
            let element = surface.element();
            if let Some(container) = self.container.as_ref() {
                if container.contains_child(element) {
                    container.remove_child(element);
                }
            }
            surface.release();
        }
        self.container = None;
        crate::viewer_debug!(SOURCE, "Disposed");
    }
}

#[cfg(test)]
#[path = "render_manager_tests.rs"]
mod tests;
