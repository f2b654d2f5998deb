/// Tests for CameraControls
///
/// These tests validate orbit math, damping, zoom limits and reset using a
/// context built on the headless backend.

use super::*;
use std::sync::{Arc, Mutex};
use crate::camera::CameraManager;
use crate::error::Error;
use crate::renderer::headless::{HeadlessBackend, HeadlessContainer};
use crate::renderer::RenderManager;
use crate::scene::SceneManager;

const EPS: f32 = 1e-4;

fn create_context() -> PluginContext {
    PluginContext {
        scene: Arc::new(Mutex::new(SceneManager::new())),
        camera: Arc::new(Mutex::new(CameraManager::new())),
        renderer: Arc::new(Mutex::new(RenderManager::new(Arc::new(HeadlessBackend::new())))),
        container: Arc::new(HeadlessContainer::new(64, 64)),
    }
}

fn setup(options: ControlsOptions) -> (PluginContext, CameraControls) {
    let context = create_context();
    let mut controls = CameraControls::new(options);
    controls.initialize(context.clone()).unwrap();
    (context, controls)
}

fn undamped() -> ControlsOptions {
    ControlsOptions {
        features: ControlsFeatures::ROTATE | ControlsFeatures::ZOOM | ControlsFeatures::PAN,
        ..Default::default()
    }
}

fn camera_position(context: &PluginContext) -> Vec3 {
    context.camera.lock().unwrap().camera().position()
}

/// Angle around +Y from +Z, matching the orbit's azimuth
fn azimuth(context: &PluginContext) -> f32 {
    let position = camera_position(context);
    position.x.atan2(position.z)
}

// ============================================================================
// Tests: Zoom limits
// ============================================================================

#[test]
fn test_set_zoom_limits_rejects_inverted_range() {
    let (_ctx, mut controls) = setup(ControlsOptions::default());
    controls.set_zoom_limits(1.0, 50.0).unwrap();

    let result = controls.set_zoom_limits(5.0, 1.0);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(controls.zoom_limits(), (1.0, 50.0));
}

#[test]
fn test_set_zoom_limits_rejects_negative_and_nan() {
    let (_ctx, mut controls) = setup(ControlsOptions::default());
    assert!(controls.set_zoom_limits(-1.0, 10.0).is_err());
    assert!(controls.set_zoom_limits(f32::NAN, 10.0).is_err());
    assert_eq!(controls.zoom_limits(), (0.0, f32::INFINITY));
}

#[test]
fn test_zoom_respects_limits() {
    let (ctx, mut controls) = setup(undamped());
    controls.set_zoom_limits(2.0, 8.0).unwrap();

    controls.zoom(0.1);
    controls.update(0.016).unwrap();
    assert!((camera_position(&ctx).length() - 2.0).abs() < EPS);

    controls.zoom(100.0);
    controls.update(0.016).unwrap();
    assert!((camera_position(&ctx).length() - 8.0).abs() < EPS);
}

// ============================================================================
// Tests: Orbit
// ============================================================================

#[test]
fn test_rotate_orbits_around_target() {
    let (ctx, mut controls) = setup(undamped());
    assert!(controls.rotate(std::f32::consts::FRAC_PI_2, 0.0));
    controls.update(0.016).unwrap();

    let position = camera_position(&ctx);
    assert!((position - Vec3::new(5.0, 0.0, 0.0)).length() < EPS);
    assert_eq!(ctx.camera.lock().unwrap().camera().target(), Vec3::ZERO);
}

#[test]
fn test_polar_angle_is_clamped() {
    let (ctx, mut controls) = setup(undamped());
    controls.rotate(0.0, -10.0);
    controls.update(0.016).unwrap();

    let position = camera_position(&ctx);
    assert!(position.y > 4.99 && position.y <= 5.0);
    assert!(position.is_finite());
}

#[test]
fn test_damped_rotation_adds_up_to_requested_angle() {
    let (ctx, mut controls) = setup(ControlsOptions::default());
    controls.rotate(0.1, 0.0);

    controls.update(0.016).unwrap();
    let first = azimuth(&ctx);
    assert!((first - 0.1 * 0.05).abs() < 1e-5);

    controls.update(0.016).unwrap();
    let second = azimuth(&ctx);
    assert!(second - first < first);

    for _ in 0..498 {
        controls.update(0.016).unwrap();
    }
    assert!((azimuth(&ctx) - 0.1).abs() < 1e-3);
}

#[test]
fn test_undamped_rotation_applies_once() {
    let (ctx, mut controls) = setup(undamped());
    controls.rotate(0.1, 0.0);

    controls.update(0.016).unwrap();
    assert!((azimuth(&ctx) - 0.1).abs() < EPS);
    controls.update(0.016).unwrap();
    assert!((azimuth(&ctx) - 0.1).abs() < EPS);
}

#[test]
fn test_damped_pan_adds_up_to_requested_offset() {
    let (_ctx, mut controls) = setup(ControlsOptions::default());
    controls.pan(1.0, 0.0);
    for _ in 0..500 {
        controls.update(0.016).unwrap();
    }
    assert!((controls.target() - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-3);
}

#[test]
fn test_disabled_features_ignore_input() {
    let options = ControlsOptions { features: ControlsFeatures::empty(), ..Default::default() };
    let (ctx, mut controls) = setup(options);

    assert!(!controls.rotate(1.0, 1.0));
    assert!(!controls.zoom(0.5));
    assert!(!controls.pan(1.0, 1.0));
    controls.update(0.016).unwrap();
    assert!((camera_position(&ctx) - Vec3::new(0.0, 0.0, 5.0)).length() < EPS);
}

#[test]
fn test_auto_rotate_advances_with_time() {
    let options = ControlsOptions {
        features: ControlsFeatures::AUTO_ROTATE,
        auto_rotate_speed: std::f32::consts::FRAC_PI_2,
        ..Default::default()
    };
    let (ctx, mut controls) = setup(options);
    controls.update(1.0).unwrap();
    assert!((camera_position(&ctx) - Vec3::new(5.0, 0.0, 0.0)).length() < EPS);
}

#[test]
fn test_auto_rotate_speed_is_not_damped() {
    let options = ControlsOptions {
        features: ControlsFeatures::AUTO_ROTATE | ControlsFeatures::DAMPING,
        auto_rotate_speed: 0.1,
        ..Default::default()
    };
    let (ctx, mut controls) = setup(options);
    for _ in 0..10 {
        controls.update(0.1).unwrap();
    }
    assert!((azimuth(&ctx) - 0.1).abs() < EPS);
}

#[test]
fn test_pan_moves_target() {
    let (ctx, mut controls) = setup(undamped());
    controls.pan(1.0, 0.0);
    controls.update(0.016).unwrap();

    assert!((controls.target() - Vec3::new(1.0, 0.0, 0.0)).length() < EPS);
    assert!((camera_position(&ctx) - Vec3::new(1.0, 0.0, 5.0)).length() < EPS);
}

// ============================================================================
// Tests: Target / Reset
// ============================================================================

#[test]
fn test_set_target_points_camera() {
    let (ctx, mut controls) = setup(ControlsOptions::default());
    controls.set_target(Vec3::new(1.0, 2.0, 0.0)).unwrap();

    assert_eq!(controls.target(), Vec3::new(1.0, 2.0, 0.0));
    assert_eq!(ctx.camera.lock().unwrap().camera().target(), Vec3::new(1.0, 2.0, 0.0));
}

#[test]
fn test_reset_restores_initial_state() {
    let (ctx, mut controls) = setup(undamped());
    controls.set_zoom_limits(1.0, 3.0).unwrap();
    controls.set_target(Vec3::ONE).unwrap();
    controls.rotate(1.0, 0.3);
    controls.update(0.016).unwrap();

    controls.reset().unwrap();

    assert_eq!(controls.target(), Vec3::ZERO);
    assert_eq!(controls.zoom_limits(), (0.0, f32::INFINITY));
    assert_eq!(camera_position(&ctx), Vec3::new(0.0, 0.0, 5.0));
    assert_eq!(ctx.camera.lock().unwrap().camera().target(), Vec3::ZERO);
}

#[test]
fn test_operations_before_initialize_fail() {
    let mut controls = CameraControls::default();
    assert!(matches!(controls.set_target(Vec3::ONE), Err(Error::NotInitialized(_))));
    assert!(matches!(controls.reset(), Err(Error::NotInitialized(_))));
    assert!(matches!(controls.update(0.016), Err(Error::NotInitialized(_))));
}

#[test]
fn test_configure_validates() {
    let (_ctx, mut controls) = setup(ControlsOptions::default());
    let bad = ControlsOptions { damping_factor: 0.0, ..Default::default() };
    assert!(matches!(controls.configure(bad), Err(Error::InvalidArgument(_))));
    assert_eq!(controls.options().damping_factor, 0.05);

    let good = ControlsOptions { rotate_speed: 2.0, ..Default::default() };
    controls.configure(good).unwrap();
    assert_eq!(controls.options().rotate_speed, 2.0);
}

#[test]
fn test_update_after_camera_disposed_reports_error() {
    let (ctx, mut controls) = setup(undamped());
    ctx.camera.lock().unwrap().dispose();
    controls.rotate(0.1, 0.0);
    assert!(matches!(controls.update(0.016), Err(Error::Disposed(_))));
}

#[test]
fn test_input_after_dispose_is_rejected() {
    let (_ctx, mut controls) = setup(ControlsOptions::default());
    controls.dispose().unwrap();

    assert!(!controls.rotate(0.1, 0.0));
    assert!(!controls.zoom(0.5));
    assert!(!controls.pan(1.0, 0.0));
    assert!(matches!(controls.update(0.016), Err(Error::Disposed(_))));
}
