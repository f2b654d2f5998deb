//! Camera module: the perspective camera and its manager.

mod camera;
mod camera_manager;

pub use camera::{
    PerspectiveCamera,
    DEFAULT_FOV_DEGREES, DEFAULT_NEAR, DEFAULT_FAR, DEFAULT_POSITION,
};
pub use camera_manager::{CameraManager, CameraConfig, SharedCamera};

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
