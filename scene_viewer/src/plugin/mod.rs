//! Plugin module: the plugin contract and the registry.

mod plugin;
mod plugin_system;

pub use plugin::{Plugin, PluginCapabilities, PluginContext};
pub use plugin_system::{PluginSystem, PluginHealth, FAILING_THRESHOLD};
