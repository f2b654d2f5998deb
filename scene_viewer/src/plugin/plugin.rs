/// Plugin contract and the context handed to plugins at registration.

use std::any::Any;
use bitflags::bitflags;
use crate::camera::SharedCamera;
use crate::error::Result;
use crate::renderer::{SharedContainer, SharedRenderer};
use crate::scene::SharedScene;

bitflags! {
    /// Optional hooks a plugin implements.
    ///
    /// Read once at registration; the registry never probes a plugin again.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PluginCapabilities: u32 {
        /// `update(dt)` is called every frame
        const UPDATE = 1 << 0;
    }
}

/// Handles to the live viewer state
///
/// Cloned into each plugin at registration. None of the fields is owned by
/// the plugin; after the viewer is disposed every manager behind them
/// rejects use with `Error::Disposed`.
#[derive(Clone)]
pub struct PluginContext {
    pub scene: SharedScene,
    pub camera: SharedCamera,
    pub renderer: SharedRenderer,
    pub container: SharedContainer,
}

/// Extension loaded into the viewer
///
/// Failures in `update` and `dispose` (errors and panics) are contained by
/// the registry and never reach the frame loop.
pub trait Plugin: Any + Send {
    /// Unique, stable registry key
    fn name(&self) -> &str;

    /// Hooks this plugin implements beyond initialize/dispose
    fn capabilities(&self) -> PluginCapabilities {
        PluginCapabilities::empty()
    }

    /// Called once, synchronously, from `register`
    fn initialize(&mut self, context: PluginContext) -> Result<()>;

    /// Per-frame hook, only called with `PluginCapabilities::UPDATE`
    fn update(&mut self, _delta_seconds: f32) -> Result<()> {
        Ok(())
    }

    /// Release everything the plugin created
    fn dispose(&mut self) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
