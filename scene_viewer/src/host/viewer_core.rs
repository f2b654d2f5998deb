//! Viewer core: composes scene, camera, renderer and plugins.
//!
//! `Created → Initialized (running ⇄ stopped) → Disposed`. The core is the
//! only integration point for a host: it is mounted into a container,
//! driven by a `FrameScheduler`, notified of resizes, and disposed once.
//!
//! Teardown order is fixed: stop the loop, dispose plugins, the renderer,
//! the scene, then the camera. Plugins go first because they may still
//! reference scene objects while tearing down.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use crate::camera::{CameraConfig, CameraManager, SharedCamera};
use crate::error::{Error, Result};
use crate::lifecycle::Lifecycle;
use crate::plugin::{Plugin, PluginContext, PluginSystem};
use crate::renderer::{
    clamp_dimension, clamp_size, GraphicsBackend, RenderManager, RenderOptions, SharedContainer,
    SharedRenderer,
};
use crate::scene::{SceneManager, SharedScene};
use crate::utils::lock_shared;
use crate::viewer_bail;
use super::frame_scheduler::{FrameRequest, FrameScheduler};

const SOURCE: &str = "viewer::ViewerCore";

/// Options applied by `initialize`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerOptions {
    pub antialias: bool,
    pub alpha: bool,
    pub camera: CameraConfig,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            antialias: true,
            alpha: false,
            camera: CameraConfig::default(),
        }
    }
}

impl ViewerOptions {
    fn render_options(&self) -> RenderOptions {
        RenderOptions { antialias: self.antialias, alpha: self.alpha }
    }
}

/// Lifecycle notifications pushed to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEvent {
    Initialized,
    Started,
    Stopped,
    Disposed,
}

/// Result of one scheduled tick
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Plugins updated and the frame was drawn
    Rendered { delta_seconds: f32 },
    /// Plugins updated, the draw call failed; the loop keeps going
    RenderFailed { delta_seconds: f32, error: Error },
    /// Not running or disposed; no further frame was requested
    Halted,
}

pub struct ViewerCore {
    backend: Arc<dyn GraphicsBackend>,
    scheduler: Box<dyn FrameScheduler>,
    scene: SharedScene,
    camera: SharedCamera,
    renderer: SharedRenderer,
    plugins: PluginSystem,
    container: Option<SharedContainer>,
    options: ViewerOptions,
    lifecycle: Lifecycle,
    running: bool,
    last_time: Option<Instant>,
    pending_frame: Option<FrameRequest>,
    frame_count: u64,
    last_delta: f32,
    subscribers: Vec<Sender<ViewerEvent>>,
}

impl ViewerCore {
    /// Create a viewer; nothing touches the backend until `initialize`
    pub fn new(backend: Arc<dyn GraphicsBackend>, scheduler: impl FrameScheduler + 'static) -> Self {
        let renderer = RenderManager::new(backend.clone());
        Self {
            backend,
            scheduler: Box::new(scheduler),
            scene: Arc::new(Mutex::new(SceneManager::new())),
            camera: Arc::new(Mutex::new(CameraManager::new())),
            renderer: Arc::new(Mutex::new(renderer)),
            plugins: PluginSystem::new(),
            container: None,
            options: ViewerOptions::default(),
            lifecycle: Lifecycle::Uninitialized,
            running: false,
            last_time: None,
            pending_frame: None,
            frame_count: 0,
            last_delta: 0.0,
            subscribers: Vec::new(),
        }
    }

    // ===== LIFECYCLE =====

    /// Mount into a container and wire the plugin context
    ///
    /// Validates the camera configuration, initializes the renderer, then
    /// applies the camera configuration, derives the camera aspect from the
    /// container and hands the context to the plugin registry.
    ///
    /// # Errors
    ///
    /// - `Disposed` / `AlreadyInitialized` for lifecycle misuse
    /// - `InvalidArgument` from the camera configuration
    /// - backend errors from surface creation
    pub fn initialize(&mut self, container: SharedContainer, options: ViewerOptions) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Uninitialized => {}
            Lifecycle::Ready => viewer_bail!(SOURCE, AlreadyInitialized, "initialize called twice"),
            Lifecycle::Disposed => viewer_bail!(SOURCE, Disposed, "initialize called after dispose"),
        }

        // Camera settings are checked before the surface exists, applied after
        lock_shared(&self.camera, SOURCE).validate(&options.camera)?;
        lock_shared(&self.renderer, SOURCE).initialize(container.clone(), &options.render_options())?;
        lock_shared(&self.camera, SOURCE).configure(&options.camera)?;
        self.apply_container_aspect(&container)?;

        self.plugins.set_context(PluginContext {
            scene: self.scene.clone(),
            camera: self.camera.clone(),
            renderer: self.renderer.clone(),
            container: container.clone(),
        })?;

        self.lifecycle.initialize(SOURCE)?;
        self.container = Some(container);
        self.options = options;

        crate::viewer_info!(SOURCE, "Initialized");
        self.emit(ViewerEvent::Initialized);
        Ok(())
    }

    /// Start the frame loop using the current time as baseline
    pub fn start(&mut self) -> Result<()> {
        self.start_at(Instant::now())
    }

    /// Start the frame loop with an explicit time baseline
    ///
    /// No-op if already running.
    pub fn start_at(&mut self, now: Instant) -> Result<()> {
        self.lifecycle.ensure_ready(SOURCE, "start")?;
        if self.running {
            return Ok(());
        }
        self.running = true;
        self.last_time = Some(now);
        self.pending_frame = Some(self.scheduler.request_frame());
        crate::viewer_debug!(SOURCE, "Frame loop started");
        self.emit(ViewerEvent::Started);
        Ok(())
    }

    /// Stop the frame loop and cancel the pending frame
    ///
    /// Safe whether or not the loop is running.
    pub fn stop(&mut self) -> Result<()> {
        self.lifecycle.ensure_not_disposed(SOURCE, "stop")?;
        if self.halt_loop() {
            crate::viewer_debug!(SOURCE, "Frame loop stopped");
            self.emit(ViewerEvent::Stopped);
        }
        Ok(())
    }

    /// Resize the output; each dimension is floored and clamped to at least 1
    ///
    /// Returns the applied size.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<PhysicalSize<u32>> {
        self.lifecycle.ensure_ready(SOURCE, "resize")?;
        let size = PhysicalSize::new(clamp_dimension(width), clamp_dimension(height));
        lock_shared(&self.camera, SOURCE).set_aspect(size.width as f32 / size.height as f32)?;
        lock_shared(&self.renderer, SOURCE).set_size(size.width as f64, size.height as f64)?;
        crate::viewer_trace!(SOURCE, "Resized to {}x{}", size.width, size.height);
        Ok(size)
    }

    /// Forward window events the viewer cares about
    ///
    /// Returns `true` if the event was consumed.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Result<bool> {
        match event {
            WindowEvent::Resized(size) => {
                self.resize(size.width as f64, size.height as f64)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// One scheduled tick: update plugins, render, request the next frame
    ///
    /// Plugin updates for a frame always complete before its render call.
    pub fn frame(&mut self, now: Instant) -> FrameOutcome {
        self.pending_frame = None;
        if !self.running || self.lifecycle.is_disposed() {
            return FrameOutcome::Halted;
        }

        let delta_seconds = self
            .last_time
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_time = Some(now);

        if let Err(error) = self.plugins.update_all(delta_seconds) {
            crate::viewer_error!(SOURCE, "Plugin update sweep failed: {}", error);
        }

        let result = {
            let scene = lock_shared(&self.scene, SOURCE);
            let camera = lock_shared(&self.camera, SOURCE);
            let mut renderer = lock_shared(&self.renderer, SOURCE);
            renderer.render(scene.scene(), camera.camera())
        };

        self.frame_count += 1;
        self.last_delta = delta_seconds;
        self.pending_frame = Some(self.scheduler.request_frame());

        match result {
            Ok(()) => FrameOutcome::Rendered { delta_seconds },
            Err(error) => {
                crate::viewer_error!(SOURCE, "Render failed: {}", error);
                FrameOutcome::RenderFailed { delta_seconds, error }
            }
        }
    }

    /// Tear everything down in order. Idempotent.
    pub fn dispose(&mut self) {
        if !self.lifecycle.dispose() {
            return;
        }
        let was_running = self.halt_loop();
        self.plugins.dispose_all();
        lock_shared(&self.renderer, SOURCE).dispose();
        lock_shared(&self.scene, SOURCE).dispose();
        lock_shared(&self.camera, SOURCE).dispose();
        self.container = None;

        crate::viewer_info!(SOURCE, "Disposed");
        if was_running {
            self.emit(ViewerEvent::Stopped);
        }
        self.emit(ViewerEvent::Disposed);
        self.subscribers.clear();
    }

    /// Replace the render manager with a fresh one on the same container
    ///
    /// The shared handle held by plugins stays valid; only the manager
    /// behind it changes.
    pub fn reinitialize_renderer(&mut self) -> Result<()> {
        self.lifecycle.ensure_ready(SOURCE, "reinitialize_renderer")?;
        let Some(container) = self.container.clone() else {
            viewer_bail!(SOURCE, NotInitialized, "no container");
        };

        let mut replacement = RenderManager::new(self.backend.clone());
        {
            let mut renderer = lock_shared(&self.renderer, SOURCE);
            renderer.dispose();
            replacement.initialize(container.clone(), &self.options.render_options())?;
            *renderer = replacement;
        }
        self.apply_container_aspect(&container)?;

        crate::viewer_info!(SOURCE, "Renderer reinitialized");
        Ok(())
    }

    // ===== EVENTS =====

    /// Receive lifecycle events from now on
    pub fn subscribe(&mut self) -> Receiver<ViewerEvent> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push(sender);
        receiver
    }

    // ===== PLUGINS =====

    /// Register a plugin against the viewer's context
    pub fn register_plugin(&mut self, plugin: Box<dyn Plugin>) -> Result<()> {
        self.plugins.register(plugin)
    }

    /// Dispose and remove a plugin; `false` if absent
    pub fn unregister_plugin(&mut self, name: &str) -> bool {
        self.plugins.unregister(name)
    }

    /// Typed access to a registered plugin
    pub fn plugin<P: Plugin>(&self, name: &str) -> Option<&P> {
        self.plugins.plugin::<P>(name)
    }

    /// Typed mutable access to a registered plugin
    pub fn plugin_mut<P: Plugin>(&mut self, name: &str) -> Option<&mut P> {
        self.plugins.plugin_mut::<P>(name)
    }

    pub fn plugins(&self) -> &PluginSystem {
        &self.plugins
    }

    // ===== ACCESSORS =====

    pub fn scene(&self) -> SharedScene {
        self.scene.clone()
    }

    pub fn camera(&self) -> SharedCamera {
        self.camera.clone()
    }

    pub fn renderer(&self) -> SharedRenderer {
        self.renderer.clone()
    }

    pub fn container(&self) -> Option<SharedContainer> {
        self.container.clone()
    }

    /// Context handed to plugins, while initialized
    pub fn context(&self) -> Option<PluginContext> {
        let container = self.container.clone()?;
        if !self.lifecycle.is_ready() {
            return None;
        }
        Some(PluginContext {
            scene: self.scene.clone(),
            camera: self.camera.clone(),
            renderer: self.renderer.clone(),
            container,
        })
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle.is_ready()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }

    /// Frames processed since creation
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Delta time of the most recent frame, in seconds
    pub fn last_delta(&self) -> f32 {
        self.last_delta
    }

    // ===== INTERNAL =====

    // Returns whether the loop was running.
    fn halt_loop(&mut self) -> bool {
        if let Some(request) = self.pending_frame.take() {
            self.scheduler.cancel_frame(request);
        }
        let was_running = self.running;
        self.running = false;
        self.last_time = None;
        was_running
    }

    fn apply_container_aspect(&self, container: &SharedContainer) -> Result<()> {
        let size = clamp_size(container.content_size());
        lock_shared(&self.camera, SOURCE).set_aspect(size.width as f32 / size.height as f32)?;
        Ok(())
    }

    fn emit(&mut self, event: ViewerEvent) {
        self.subscribers.retain(|subscriber| subscriber.send(event).is_ok());
    }
}

impl Drop for ViewerCore {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "viewer_core_tests.rs"]
mod tests;
