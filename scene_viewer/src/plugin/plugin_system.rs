//! Plugin registry.
//!
//! Name-keyed, iterated in registration order. The registry's job is fault
//! isolation: one plugin failing in `update` or `dispose` never stops the
//! others from receiving frames or being torn down.

use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::lifecycle::Lifecycle;
use crate::utils::catch_panic;
use crate::{viewer_bail, viewer_err};
use super::plugin::{Plugin, PluginCapabilities, PluginContext};

const SOURCE: &str = "viewer::PluginSystem";

/// Failure counters for one plugin's `update` hook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginHealth {
    /// Failures since the last successful update
    pub consecutive_failures: u32,
    /// Failures since registration
    pub total_failures: u32,
    /// Message of the most recent failure
    pub last_error: Option<String>,
}

impl PluginHealth {
    /// True while the most recent update failed
    pub fn is_failing(&self) -> bool {
        self.consecutive_failures > 0
    }

    fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    fn record_failure(&mut self, message: String) {
        self.consecutive_failures += 1;
        self.total_failures += 1;
        self.last_error = Some(message);
    }
}

struct PluginEntry {
    plugin: Box<dyn Plugin>,
    capabilities: PluginCapabilities,
    health: PluginHealth,
}

pub struct PluginSystem {
    entries: FxHashMap<String, PluginEntry>,
    /// Registration order
    order: Vec<String>,
    context: Option<PluginContext>,
    lifecycle: Lifecycle,
}

impl PluginSystem {
    /// Create an empty registry without a context
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            order: Vec::new(),
            context: None,
            lifecycle: Lifecycle::Ready,
        }
    }

    /// Set the context handed to plugins on registration
    pub fn set_context(&mut self, context: PluginContext) -> Result<()> {
        self.lifecycle.ensure_not_disposed(SOURCE, "set_context")?;
        self.context = Some(context);
        Ok(())
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// Initialize a plugin and add it to the registry
    ///
    /// # Errors
    ///
    /// - `Disposed` after `dispose_all()`
    /// - `ContextNotSet` before `set_context()`
    /// - `DuplicatePlugin` if the name is taken
    /// - the plugin's own initialization error, or `PluginFailed` if it
    ///   panicked
    ///
    /// On any error the registry is unchanged.
    pub fn register(&mut self, mut plugin: Box<dyn Plugin>) -> Result<()> {
        self.lifecycle.ensure_not_disposed(SOURCE, "register")?;
        let name = plugin.name().to_string();

        let context = match self.context.as_ref() {
            Some(context) => context.clone(),
            None => viewer_bail!(SOURCE, ContextNotSet, "cannot register '{}'", name),
        };
        if self.entries.contains_key(&name) {
            viewer_bail!(SOURCE, DuplicatePlugin, "{}", name);
        }

        match catch_panic(|| plugin.initialize(context)) {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                crate::viewer_error!(SOURCE, "Plugin '{}' failed to initialize: {}", name, error);
                return Err(error);
            }
            Err(panic) => {
                return Err(viewer_err!(SOURCE, PluginFailed,
                    "'{}' panicked during initialize: {}", name, panic));
            }
        }

        let capabilities = plugin.capabilities();
        self.entries.insert(name.clone(), PluginEntry {
            plugin,
            capabilities,
            health: PluginHealth::default(),
        });
        self.order.push(name.clone());

        crate::viewer_info!(SOURCE, "Registered plugin '{}' ({:?})", name, capabilities);
        Ok(())
    }

    /// Dispose and remove a plugin; no-op if absent
    ///
    /// Returns `true` if a plugin was removed. Dispose failures are logged.
    pub fn unregister(&mut self, name: &str) -> bool {
        let Some(mut entry) = self.entries.remove(name) else {
            return false;
        };
        self.order.retain(|n| n != name);
        dispose_plugin(name, entry.plugin.as_mut());
        crate::viewer_info!(SOURCE, "Unregistered plugin '{}'", name);
        true
    }

    /// Run one frame's update on every plugin flagged `UPDATE`
    ///
    /// Errors and panics are logged, recorded in the plugin's health, and
    /// never interrupt the sweep.
    ///
    /// # Errors
    ///
    /// `Disposed` after `dispose_all()`
    pub fn update_all(&mut self, delta_seconds: f32) -> Result<()> {
        self.lifecycle.ensure_not_disposed(SOURCE, "update_all")?;

        for name in &self.order {
            let Some(entry) = self.entries.get_mut(name) else {
                continue;
            };
            if !entry.capabilities.contains(PluginCapabilities::UPDATE) {
                continue;
            }

            let plugin = entry.plugin.as_mut();
            let failure = match catch_panic(|| plugin.update(delta_seconds)) {
                Ok(Ok(())) => None,
                Ok(Err(error)) => Some(error.to_string()),
                Err(panic) => Some(format!("panicked: {}", panic)),
            };

            match failure {
                None => entry.health.record_success(),
                Some(message) => {
                    crate::viewer_error!(SOURCE, "Plugin '{}' update failed: {}", name, message);
                    entry.health.record_failure(message);
                    if entry.health.consecutive_failures == FAILING_THRESHOLD {
                        crate::viewer_warn!(SOURCE,
                            "Plugin '{}' has failed {} consecutive updates", name, FAILING_THRESHOLD);
                    }
                }
            }
        }
        Ok(())
    }

    /// Dispose every plugin, clear the registry and the context. Idempotent.
    pub fn dispose_all(&mut self) {
        if !self.lifecycle.dispose() {
            return;
        }
        for name in std::mem::take(&mut self.order) {
            if let Some(mut entry) = self.entries.remove(&name) {
                dispose_plugin(&name, entry.plugin.as_mut());
            }
        }
        self.entries.clear();
        self.context = None;
        crate::viewer_debug!(SOURCE, "Disposed");
    }

    // ===== QUERIES =====

    pub fn plugin_count(&self) -> usize {
        self.entries.len()
    }

    /// Plugin names in registration order
    pub fn plugin_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Typed access to a registered plugin
    pub fn plugin<P: Plugin>(&self, name: &str) -> Option<&P> {
        self.entries.get(name)?.plugin.as_any().downcast_ref::<P>()
    }

    /// Typed mutable access to a registered plugin
    pub fn plugin_mut<P: Plugin>(&mut self, name: &str) -> Option<&mut P> {
        self.entries.get_mut(name)?.plugin.as_any_mut().downcast_mut::<P>()
    }

    /// Update-failure counters for a registered plugin
    pub fn health(&self, name: &str) -> Option<PluginHealth> {
        self.entries.get(name).map(|entry| entry.health.clone())
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }
}

impl Default for PluginSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Consecutive update failures after which a plugin is reported as failing
pub const FAILING_THRESHOLD: u32 = 10;

fn dispose_plugin(name: &str, plugin: &mut dyn Plugin) {
    match catch_panic(|| plugin.dispose()) {
        Ok(Ok(())) => {}
        Ok(Err(error)) => {
            crate::viewer_error!(SOURCE, "Plugin '{}' dispose failed: {}", name, error);
        }
        Err(panic) => {
            crate::viewer_error!(SOURCE, "Plugin '{}' panicked during dispose: {}", name, panic);
        }
    }
}

impl std::fmt::Debug for PluginSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginSystem")
            .field("plugins", &self.order)
            .field("has_context", &self.context.is_some())
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}

#[cfg(test)]
#[path = "plugin_system_tests.rs"]
mod tests;
