//! Model loader plugin.
//!
//! Fetches a model through a `ModelSource`, adds it to the scene and records
//! its bounds. One model at a time: loading replaces the current model.

use std::any::Any;
use glam::Vec3;
use crate::error::{Error, Result};
use crate::lifecycle::Lifecycle;
use crate::plugin::{Plugin, PluginContext};
use crate::scene::{NodeKey, SceneNode, AABB};
use crate::utils::lock_shared;
use crate::viewer_bail;

const SOURCE: &str = "viewer::ModelLoader";

/// Bytes received so far; `total` is known only when the transfer announces it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl TransferProgress {
    /// Completion in percent, if the total is known
    pub fn percent(&self) -> Option<f32> {
        match self.total {
            Some(total) if total > 0 => {
                Some((self.loaded as f64 / total as f64 * 100.0).clamp(0.0, 100.0) as f32)
            }
            _ => None,
        }
    }
}

/// Fetches and decodes a model into a scene node
pub trait ModelSource: Send {
    fn fetch(&mut self, url: &str, progress: &mut dyn FnMut(TransferProgress)) -> Result<SceneNode>;
}

impl<F> ModelSource for F
where
    F: FnMut(&str, &mut dyn FnMut(TransferProgress)) -> Result<SceneNode> + Send,
{
    fn fetch(&mut self, url: &str, progress: &mut dyn FnMut(TransferProgress)) -> Result<SceneNode> {
        self(url, progress)
    }
}

/// Called with every change of the loading state
pub type ProgressListener = Box<dyn FnMut(&LoadingState) + Send>;

/// Snapshot of the loader's progress
///
/// `ModelLoader::loading_state` returns the state after the last `load`
/// call; a listener registered with `on_progress` also sees the
/// intermediate states while `load` runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadingState {
    pub is_loading: bool,
    /// 0–100
    pub progress: f32,
    pub error: Option<String>,
}

/// Model currently in the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadedModel {
    pub key: NodeKey,
    pub bounding_box: AABB,
    pub center: Vec3,
}

pub struct ModelLoader {
    source: Box<dyn ModelSource>,
    context: Option<PluginContext>,
    model: Option<LoadedModel>,
    state: LoadingState,
    listener: Option<ProgressListener>,
    lifecycle: Lifecycle,
}

impl ModelLoader {
    /// Registry key
    pub const NAME: &'static str = "model-loader";

    pub fn new(source: impl ModelSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            context: None,
            model: None,
            state: LoadingState::default(),
            listener: None,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    /// Observe loading state changes, including those made during `load`
    ///
    /// Replaces any previous listener.
    pub fn on_progress(&mut self, listener: impl FnMut(&LoadingState) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Fetch a model and add it to the scene
    ///
    /// The current model, if any, is unloaded first. No retry on failure.
    ///
    /// # Errors
    ///
    /// - `NotInitialized` / `Disposed` for lifecycle misuse
    /// - `AssetLoadFailed` if the fetch fails; the loading state carries
    ///   the message
    /// - `Disposed` if the scene was disposed
    pub fn load(&mut self, url: &str) -> Result<LoadedModel> {
        self.lifecycle.ensure_ready(SOURCE, "load")?;
        self.unload()?;

        self.set_state(LoadingState { is_loading: true, progress: 0.0, error: None });
        crate::viewer_info!(SOURCE, "Loading '{}'", url);

        let state = &mut self.state;
        let listener = &mut self.listener;
        let fetched = self.source.fetch(url, &mut |progress| {
            if let Some(percent) = progress.percent() {
                state.progress = percent;
                if let Some(listener) = listener.as_deref_mut() {
                    listener(&*state);
                }
            }
        });

        let node = match fetched {
            Ok(node) => node,
            Err(error) => {
                let error = match error {
                    Error::AssetLoadFailed(_) => error,
                    other => Error::AssetLoadFailed(format!("{}: {}", url, other)),
                };
                crate::viewer_error!(SOURCE, "{}", error);
                self.set_state(LoadingState {
                    is_loading: false,
                    progress: self.state.progress,
                    error: Some(error.to_string()),
                });
                return Err(error);
            }
        };

        let bounding_box = node.bounding_box();
        let key = match self.context.as_ref() {
            Some(context) => lock_shared(&context.scene, SOURCE).add(node),
            None => {
                node.dispose();
                viewer_bail!(SOURCE, NotInitialized, "no context");
            }
        };
        let key = match key {
            Ok(key) => key,
            Err(error) => {
                self.set_state(LoadingState {
                    is_loading: false,
                    progress: self.state.progress,
                    error: Some(error.to_string()),
                });
                return Err(error);
            }
        };

        let model = LoadedModel { key, bounding_box, center: bounding_box.center() };
        self.model = Some(model);
        self.set_state(LoadingState { is_loading: false, progress: 100.0, error: None });
        Ok(model)
    }

    /// Remove the current model from the scene and release it
    ///
    /// Returns `true` if a model was unloaded.
    pub fn unload(&mut self) -> Result<bool> {
        self.lifecycle.ensure_not_disposed(SOURCE, "unload")?;
        Ok(self.release_model())
    }

    /// Bounds center of the current model
    pub fn center(&self) -> Option<Vec3> {
        self.model.map(|m| m.center)
    }

    /// World-space bounds of the current model
    pub fn bounding_box(&self) -> Option<AABB> {
        self.model.map(|m| m.bounding_box)
    }

    pub fn model(&self) -> Option<LoadedModel> {
        self.model
    }

    pub fn loading_state(&self) -> LoadingState {
        self.state.clone()
    }

    fn set_state(&mut self, state: LoadingState) {
        self.state = state;
        if let Some(listener) = self.listener.as_deref_mut() {
            listener(&self.state);
        }
    }

    // A scene that is already disposed has released the node itself.
    fn release_model(&mut self) -> bool {
        let Some(model) = self.model.take() else {
            return false;
        };
        if let Some(context) = self.context.as_ref() {
            let mut scene = lock_shared(&context.scene, SOURCE);
            if let Ok(Some(node)) = scene.remove(model.key) {
                node.dispose();
            }
        }
        true
    }
}

impl Plugin for ModelLoader {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn initialize(&mut self, context: PluginContext) -> Result<()> {
        self.lifecycle.initialize(SOURCE)?;
        self.context = Some(context);
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        if self.lifecycle.is_disposed() {
            return Ok(());
        }
        self.release_model();
        self.context = None;
        self.lifecycle.dispose();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "model_loader_tests.rs"]
mod tests;
