//! Built-in plugins.

mod camera_controls;
mod model_loader;

pub use camera_controls::{CameraControls, ControlsFeatures, ControlsOptions};
pub use model_loader::{
    ModelLoader, ModelSource, LoadedModel, LoadingState, ProgressListener, TransferProgress,
};
