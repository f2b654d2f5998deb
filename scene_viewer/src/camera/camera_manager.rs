//! Camera manager: owns the viewer's single perspective camera.
//!
//! Aspect ratio is derived from the container and never allowed to corrupt
//! the projection: invalid ratios are coerced to 1.0 with a warning.

use glam::Vec3;
use crate::error::Result;
use crate::lifecycle::Lifecycle;
use crate::utils::Shared;
use crate::viewer_bail;
use super::camera::PerspectiveCamera;

const SOURCE: &str = "viewer::CameraManager";

/// Shared handle to the camera manager
pub type SharedCamera = Shared<CameraManager>;

/// Partial camera settings; only `Some` fields are applied
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraConfig {
    pub fov_degrees: Option<f32>,
    pub near: Option<f32>,
    pub far: Option<f32>,
    pub position: Option<Vec3>,
}

impl CameraConfig {
    /// Builder: field of view in degrees
    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov_degrees = Some(fov_degrees);
        self
    }

    /// Builder: clip planes
    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = Some(near);
        self.far = Some(far);
        self
    }

    /// Builder: position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }
}

pub struct CameraManager {
    camera: PerspectiveCamera,
    lifecycle: Lifecycle,
}

impl CameraManager {
    /// Create a manager with the default camera
    pub fn new() -> Self {
        Self {
            camera: PerspectiveCamera::default(),
            lifecycle: Lifecycle::Ready,
        }
    }

    /// Read access to the camera
    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }

    /// Check that `config` merged into the current camera is valid
    ///
    /// Nothing changes; `configure` runs the same checks.
    ///
    /// # Errors
    ///
    /// - `Disposed` after `dispose()`
    /// - `InvalidArgument` for a field of view outside (0, 180), a
    ///   non-positive near plane, or a far plane not beyond the near plane
    pub fn validate(&self, config: &CameraConfig) -> Result<()> {
        self.merged(config).map(|_| ())
    }

    /// Merge partial settings into the camera
    ///
    /// The merged result is validated before anything changes.
    ///
    /// # Errors
    ///
    /// Same as `validate`.
    pub fn configure(&mut self, config: &CameraConfig) -> Result<()> {
        let (fov, near, far) = self.merged(config)?;

        if config.fov_degrees.is_some() {
            self.camera.set_fov_degrees(fov);
        }
        if config.near.is_some() || config.far.is_some() {
            self.camera.set_clip_planes(near, far);
        }
        if let Some(position) = config.position {
            self.camera.set_position(position);
        }
        Ok(())
    }

    // Merged (fov, near, far), validated
    fn merged(&self, config: &CameraConfig) -> Result<(f32, f32, f32)> {
        self.lifecycle.ensure_not_disposed(SOURCE, "configure")?;

        let fov = config.fov_degrees.unwrap_or(self.camera.fov_degrees());
        let near = config.near.unwrap_or(self.camera.near());
        let far = config.far.unwrap_or(self.camera.far());

        if !(fov > 0.0 && fov < 180.0) {
            viewer_bail!(SOURCE, InvalidArgument, "field of view {} outside (0, 180)", fov);
        }
        if !(near > 0.0 && far > near && far.is_finite()) {
            viewer_bail!(SOURCE, InvalidArgument, "invalid clip planes near={} far={}", near, far);
        }
        if let Some(position) = config.position {
            if !position.is_finite() {
                viewer_bail!(SOURCE, InvalidArgument, "non-finite position {:?}", position);
            }
        }
        Ok((fov, near, far))
    }

    /// Set the aspect ratio; non-finite or non-positive ratios become 1.0
    ///
    /// Returns the ratio actually applied.
    pub fn set_aspect(&mut self, ratio: f32) -> Result<f32> {
        self.lifecycle.ensure_not_disposed(SOURCE, "set_aspect")?;
        let applied = if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            crate::viewer_warn!(SOURCE, "Invalid aspect ratio {}, using 1.0", ratio);
            1.0
        };
        self.camera.set_aspect(applied);
        Ok(applied)
    }

    /// Point the camera at a world-space point
    pub fn look_at(&mut self, point: Vec3) -> Result<()> {
        self.lifecycle.ensure_not_disposed(SOURCE, "look_at")?;
        self.camera.look_at(point);
        Ok(())
    }

    /// Move the camera, keeping its target
    pub fn set_position(&mut self, position: Vec3) -> Result<()> {
        self.lifecycle.ensure_not_disposed(SOURCE, "set_position")?;
        self.camera.set_position(position);
        Ok(())
    }

    /// Mark disposed. The camera holds no GPU handles. Idempotent.
    pub fn dispose(&mut self) {
        if self.lifecycle.dispose() {
            crate::viewer_debug!(SOURCE, "Disposed");
        }
    }
}

impl Default for CameraManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "camera_manager_tests.rs"]
mod tests;
