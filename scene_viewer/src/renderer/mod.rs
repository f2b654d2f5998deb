//! Renderer module: backend capability traits, the render manager and a
//! headless backend

mod backend;
mod render_manager;
pub mod headless;

pub use backend::{
    Container, SharedContainer, ElementId,
    GraphicsBackend, RenderSurface, SurfaceDesc, GpuHandle,
    clamp_dimension, clamp_size,
};
pub use render_manager::{RenderManager, RenderOptions, SharedRenderer};
