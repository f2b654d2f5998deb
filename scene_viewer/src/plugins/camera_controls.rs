//! Orbit camera controls plugin.
//!
//! Input (`rotate`, `zoom`, `pan`) accumulates deltas; `update` applies them
//! to the camera once per frame. With damping, each frame applies
//! `damping_factor` of what is still pending, so the motion eases out and
//! adds up to the requested delta. Auto-rotation is not damped.
//! The camera orbits `target` on a sphere (Y up).

use std::any::Any;
use std::f32::consts::PI;
use bitflags::bitflags;
use glam::{Vec2, Vec3};
use crate::error::Result;
use crate::lifecycle::Lifecycle;
use crate::plugin::{Plugin, PluginCapabilities, PluginContext};
use crate::utils::lock_shared;
use crate::viewer_bail;

const SOURCE: &str = "viewer::CameraControls";

/// Keeps the polar angle off the poles, where the orbit basis degenerates
const POLAR_EPSILON: f32 = 1e-4;

bitflags! {
    /// Input channels and behaviours of the controls
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ControlsFeatures: u32 {
        const ROTATE      = 1 << 0;
        const ZOOM        = 1 << 1;
        const PAN         = 1 << 2;
        const DAMPING     = 1 << 3;
        const AUTO_ROTATE = 1 << 4;
    }
}

impl Default for ControlsFeatures {
    fn default() -> Self {
        Self::ROTATE | Self::ZOOM | Self::PAN | Self::DAMPING
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlsOptions {
    pub features: ControlsFeatures,
    /// Fraction of the pending motion removed each frame, in (0, 1]
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Radians per second around the target
    pub auto_rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsOptions {
    fn default() -> Self {
        Self {
            features: ControlsFeatures::default(),
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            auto_rotate_speed: PI / 15.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }
}

/// Zoom limits and target captured at initialization, restored by `reset`
#[derive(Debug, Clone, Copy, PartialEq)]
struct InitialState {
    target: Vec3,
    position: Vec3,
    min_distance: f32,
    max_distance: f32,
}

/// Position relative to the target in spherical coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Azimuth around Y, from +Z
    theta: f32,
    /// Polar angle from +Y
    phi: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return Self { radius: 0.0, theta: 0.0, phi: PI / 2.0 };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

pub struct CameraControls {
    options: ControlsOptions,
    context: Option<PluginContext>,
    target: Vec3,
    /// Pending (azimuth, polar) rotation in radians
    rotate_delta: Vec2,
    /// Pending distance multiplier
    zoom_scale: f32,
    /// Pending screen-space pan
    pan_delta: Vec2,
    initial: Option<InitialState>,
    lifecycle: Lifecycle,
}

impl CameraControls {
    /// Registry key
    pub const NAME: &'static str = "camera-controls";

    pub fn new(options: ControlsOptions) -> Self {
        Self {
            options,
            context: None,
            target: Vec3::ZERO,
            rotate_delta: Vec2::ZERO,
            zoom_scale: 1.0,
            pan_delta: Vec2::ZERO,
            initial: None,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    pub fn options(&self) -> &ControlsOptions {
        &self.options
    }

    /// Orbit pivot
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Current (min, max) camera distance
    pub fn zoom_limits(&self) -> (f32, f32) {
        (self.options.min_distance, self.options.max_distance)
    }

    /// Replace the options
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a damping factor outside (0, 1] or invalid
    /// zoom limits; the current options are kept.
    pub fn configure(&mut self, options: ControlsOptions) -> Result<()> {
        self.lifecycle.ensure_not_disposed(SOURCE, "configure")?;
        if !(options.damping_factor > 0.0 && options.damping_factor <= 1.0) {
            viewer_bail!(SOURCE, InvalidArgument,
                "damping factor {} outside (0, 1]", options.damping_factor);
        }
        validate_limits(options.min_distance, options.max_distance)?;
        self.options = options;
        Ok(())
    }

    /// Orbit by the given azimuth/polar angles (radians)
    ///
    /// Returns `false` if rotation is disabled or the controls are disposed.
    pub fn rotate(&mut self, azimuth: f32, polar: f32) -> bool {
        if self.lifecycle.is_disposed() || !self.options.features.contains(ControlsFeatures::ROTATE) {
            return false;
        }
        self.rotate_delta += Vec2::new(azimuth, polar) * self.options.rotate_speed;
        true
    }

    /// Scale the camera distance; `factor < 1` moves closer
    ///
    /// Returns `false` if zoom is disabled, the controls are disposed, or the
    /// factor is not a positive finite number.
    pub fn zoom(&mut self, factor: f32) -> bool {
        if self.lifecycle.is_disposed()
            || !self.options.features.contains(ControlsFeatures::ZOOM)
            || !(factor.is_finite() && factor > 0.0)
        {
            return false;
        }
        self.zoom_scale *= factor.powf(self.options.zoom_speed);
        true
    }

    /// Move the target along the camera's right/up axes
    ///
    /// Returns `false` if panning is disabled or the controls are disposed.
    pub fn pan(&mut self, right: f32, up: f32) -> bool {
        if self.lifecycle.is_disposed() || !self.options.features.contains(ControlsFeatures::PAN) {
            return false;
        }
        self.pan_delta += Vec2::new(right, up) * self.options.pan_speed;
        true
    }

    /// Move the orbit pivot and point the camera at it
    pub fn set_target(&mut self, point: Vec3) -> Result<()> {
        self.lifecycle.ensure_ready(SOURCE, "set_target")?;
        self.target = point;
        if let Some(context) = self.context.as_ref() {
            lock_shared(&context.camera, SOURCE).look_at(point)?;
        }
        Ok(())
    }

    /// Set the camera distance range
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `min > max`, `min < 0` or either is NaN; the
    /// previous limits are kept.
    pub fn set_zoom_limits(&mut self, min: f32, max: f32) -> Result<()> {
        self.lifecycle.ensure_not_disposed(SOURCE, "set_zoom_limits")?;
        validate_limits(min, max)?;
        self.options.min_distance = min;
        self.options.max_distance = max;
        Ok(())
    }

    /// Restore the target, camera position and zoom limits from initialization
    pub fn reset(&mut self) -> Result<()> {
        self.lifecycle.ensure_ready(SOURCE, "reset")?;
        let (Some(initial), Some(context)) = (self.initial, self.context.as_ref()) else {
            viewer_bail!(SOURCE, NotInitialized, "reset called before initialize");
        };

        self.target = initial.target;
        self.options.min_distance = initial.min_distance;
        self.options.max_distance = initial.max_distance;
        self.rotate_delta = Vec2::ZERO;
        self.pan_delta = Vec2::ZERO;
        self.zoom_scale = 1.0;

        let mut camera = lock_shared(&context.camera, SOURCE);
        camera.set_position(initial.position)?;
        camera.look_at(initial.target)?;
        Ok(())
    }

    fn apply(&mut self, delta_seconds: f32) -> Result<()> {
        let Some(context) = self.context.as_ref() else {
            viewer_bail!(SOURCE, NotInitialized, "update called before initialize");
        };
        let options = self.options;

        // Share of the pending motion applied this frame; the rest carries over
        let share = if options.features.contains(ControlsFeatures::DAMPING) {
            options.damping_factor
        } else {
            1.0
        };
        let rotate_step = self.rotate_delta * share;
        let pan_step = self.pan_delta * share;

        let mut camera = lock_shared(&context.camera, SOURCE);
        let offset = camera.camera().position() - self.target;

        // Pan in the camera's own basis before moving the orbit
        if pan_step != Vec2::ZERO {
            let forward = (-offset).normalize_or_zero();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward);
            self.target += right * pan_step.x + up * pan_step.y;
        }

        let mut spherical = Spherical::from_offset(offset);
        spherical.theta += rotate_step.x;
        if options.features.contains(ControlsFeatures::AUTO_ROTATE) {
            spherical.theta += options.auto_rotate_speed * delta_seconds;
        }
        spherical.phi = (spherical.phi + rotate_step.y).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        spherical.radius = (spherical.radius * self.zoom_scale)
            .clamp(options.min_distance, options.max_distance);

        camera.set_position(self.target + spherical.to_offset())?;
        camera.look_at(self.target)?;
        drop(camera);

        self.rotate_delta -= rotate_step;
        self.pan_delta -= pan_step;
        self.zoom_scale = 1.0;
        Ok(())
    }
}

impl Default for CameraControls {
    fn default() -> Self {
        Self::new(ControlsOptions::default())
    }
}

fn validate_limits(min: f32, max: f32) -> Result<()> {
    if min.is_nan() || max.is_nan() || min < 0.0 || min > max {
        viewer_bail!(SOURCE, InvalidArgument, "invalid zoom limits min={} max={}", min, max);
    }
    Ok(())
}

impl Plugin for CameraControls {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capabilities(&self) -> PluginCapabilities {
        PluginCapabilities::UPDATE
    }

    fn initialize(&mut self, context: PluginContext) -> Result<()> {
        self.lifecycle.initialize(SOURCE)?;
        let (position, target) = {
            let camera = lock_shared(&context.camera, SOURCE);
            (camera.camera().position(), camera.camera().target())
        };
        self.target = target;
        self.initial = Some(InitialState {
            target,
            position,
            min_distance: self.options.min_distance,
            max_distance: self.options.max_distance,
        });
        self.context = Some(context);
        Ok(())
    }

    fn update(&mut self, delta_seconds: f32) -> Result<()> {
        self.lifecycle.ensure_ready(SOURCE, "update")?;
        self.apply(delta_seconds)
    }

    fn dispose(&mut self) -> Result<()> {
        if self.lifecycle.dispose() {
            self.context = None;
        }
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
#[path = "camera_controls_tests.rs"]
mod tests;
