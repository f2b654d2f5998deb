//! Integration tests for the viewer lifecycle
//!
//! These tests drive a full ViewerCore on the headless backend through
//! initialize, the frame loop, resize and teardown.
//!
//! Run with: cargo test --test viewer_integration_tests


use scene_viewer::viewer3d::camera::CameraConfig;
use scene_viewer::viewer3d::host::{ReadinessPoller, ReadinessState, ReadinessTracker, PollStatus};
use scene_viewer::viewer3d::{Error, FrameOutcome, ViewerEvent, ViewerOptions};
use scene_viewer::glam::Vec3;
use viewer_test_utils::{Harness, ProbeBehavior, ProbePlugin};
use winit::dpi::PhysicalSize;

// ============================================================================
// END-TO-END
// ============================================================================

#[test]
fn test_integration_start_stop_dispose_scenario() {
    let mut h = Harness::new(640, 480);
    let options = ViewerOptions {
        camera: CameraConfig::default().with_fov(60.0),
        ..Default::default()
    };
    h.core.initialize(h.container.clone(), options).unwrap();
    assert_eq!(h.core.camera().lock().unwrap().camera().fov_degrees(), 60.0);

    h.add_cube("cube");
    h.core.start().unwrap();
    assert_eq!(h.run_frames(3), 3);

    let stats = h.backend.stats();
    assert!(stats.render_calls >= 1);
    let record = stats.last_render.unwrap();
    assert_eq!(record.child_count, 1);
    assert_eq!(record.size, PhysicalSize::new(640, 480));

    h.core.stop().unwrap();
    let renders_after_stop = h.backend.stats().render_calls;
    assert_eq!(h.run_frames(10), 0);
    // A stale tick fired by the host is a no-op
    assert_eq!(h.core.frame(h.clock), FrameOutcome::Halted);
    assert_eq!(h.backend.stats().render_calls, renders_after_stop);

    h.core.dispose();
    assert!(matches!(h.core.start(), Err(Error::Disposed(_))));
}

#[test]
fn test_integration_restart_after_stop() {
    let mut h = Harness::initialized(100, 100);
    h.core.start().unwrap();
    h.run_frames(2);
    h.core.stop().unwrap();

    h.core.start().unwrap();
    assert_eq!(h.run_frames(2), 2);
    assert_eq!(h.backend.stats().render_calls, 4);
    assert_eq!(h.core.frame_count(), 4);
}

#[test]
fn test_integration_dispose_releases_everything() {
    let mut h = Harness::initialized(100, 100);
    for name in ["a", "b", "c"] {
        h.add_cube(name);
    }
    let env = h.backend.texture("env");
    h.core.scene().lock().unwrap().set_background(Some(env)).unwrap();
    h.core.start().unwrap();
    h.run_frames(5);

    h.core.dispose();
    h.core.dispose();

    let stats = h.backend.stats();
    assert_eq!(stats.resources_created, stats.resources_released);
    assert_eq!(stats.double_releases, 0);
    assert_eq!(stats.surfaces_created, stats.surfaces_released);
    assert!(h.container.children().is_empty());
}

// ============================================================================
// RESIZE
// ============================================================================

#[test]
fn test_integration_resize_sequence() {
    let mut h = Harness::initialized(100, 100);
    let inputs = [(1920.0, 1080.0), (0.0, 0.0), (33.9, 0.99), (-4.0, 250.5)];
    let expected = [(1920, 1080), (1, 1), (33, 1), (1, 250)];

    for ((w, h_in), (ew, eh)) in inputs.into_iter().zip(expected) {
        let size = h.core.resize(w, h_in).unwrap();
        assert_eq!(size, PhysicalSize::new(ew, eh));
        assert_eq!(h.core.renderer().lock().unwrap().size(), Some(size));
        let aspect = h.core.camera().lock().unwrap().camera().aspect();
        assert_eq!(aspect, ew as f32 / eh as f32);
    }
}

// ============================================================================
// PLUGIN ISOLATION
// ============================================================================

#[test]
fn test_integration_broken_plugins_do_not_stop_rendering() {
    let mut h = Harness::initialized(100, 100);
    let (failing, _) = ProbePlugin::new("failing", ProbeBehavior::Fail);
    let (panicking, _) = ProbePlugin::new("panicking", ProbeBehavior::Panic);
    let (working, working_counters) = ProbePlugin::new("working", ProbeBehavior::Work);
    h.core.register_plugin(Box::new(failing)).unwrap();
    h.core.register_plugin(Box::new(panicking)).unwrap();
    h.core.register_plugin(Box::new(working)).unwrap();

    h.core.start().unwrap();
    assert_eq!(h.run_frames(4), 4);

    assert_eq!(working_counters.updates(), 4);
    assert_eq!(h.backend.stats().render_calls, 4);

    let health = h.core.plugins().health("panicking").unwrap();
    assert_eq!(health.consecutive_failures, 4);
    assert!(health.last_error.unwrap().contains("exploded"));
    assert!(!h.core.plugins().health("working").unwrap().is_failing());
}

#[test]
fn test_integration_duplicate_plugin_rejected() {
    let mut h = Harness::initialized(10, 10);
    let (first, _) = ProbePlugin::new("probe", ProbeBehavior::Work);
    let (second, _) = ProbePlugin::new("probe", ProbeBehavior::Work);

    h.core.register_plugin(Box::new(first)).unwrap();
    let result = h.core.register_plugin(Box::new(second));
    assert!(matches!(result, Err(Error::DuplicatePlugin(_))));
    assert_eq!(h.core.plugins().plugin_count(), 1);
}

#[test]
fn test_integration_plugins_disposed_before_scene() {
    let mut h = Harness::initialized(10, 10);
    h.add_cube("cube");
    let (probe, counters) = ProbePlugin::new("probe", ProbeBehavior::Work);
    let access = probe.dispose_scene_access.clone();
    h.core.register_plugin(Box::new(probe)).unwrap();

    h.core.dispose();

    assert_eq!(counters.disposes(), 1);
    // The plugin could still use the scene during its own teardown
    assert_eq!(*access.lock().unwrap(), Some(Ok(3)));
    assert_eq!(h.backend.stats().double_releases, 0);
}

#[test]
fn test_integration_unregister_disposes_plugin() {
    let mut h = Harness::initialized(10, 10);
    let (probe, counters) = ProbePlugin::new("probe", ProbeBehavior::Work);
    h.core.register_plugin(Box::new(probe)).unwrap();
    h.core.start().unwrap();
    h.run_frames(1);

    assert!(h.core.unregister_plugin("probe"));
    h.run_frames(3);

    assert_eq!(counters.disposes(), 1);
    assert_eq!(counters.updates(), 1);
}

// ============================================================================
// READINESS
// ============================================================================

#[test]
fn test_integration_readiness_follows_lifecycle() {
    let mut h = Harness::new(10, 10);
    let mut tracker = ReadinessTracker::new();
    tracker.mount(&mut h.core);
    let events = h.core.subscribe();

    let mut poller = ReadinessPoller::default();
    assert!(!poller.poll(&mut tracker, &h.core).is_finished());

    h.core.initialize(h.container.clone(), Default::default()).unwrap();
    assert_eq!(poller.poll(&mut tracker, &h.core), PollStatus::Converged);

    let snapshot = tracker.snapshot(&h.core);
    assert!(snapshot.is_ready);
    let scene = snapshot.scene.unwrap();
    assert_eq!(scene.lock().unwrap().child_count(), 0);

    h.core.dispose();
    tracker.pump();
    assert_eq!(tracker.state(), ReadinessState::Disposed);
    assert!(tracker.snapshot(&h.core).is_disposed);

    let received: Vec<_> = events.try_iter().collect();
    assert_eq!(received, vec![ViewerEvent::Initialized, ViewerEvent::Disposed]);
}

#[test]
fn test_integration_camera_defaults() {
    let h = Harness::initialized(300, 150);
    let camera = h.core.camera();
    let camera = camera.lock().unwrap();
    assert_eq!(camera.camera().fov_degrees(), 75.0);
    assert_eq!(camera.camera().near(), 0.1);
    assert_eq!(camera.camera().far(), 1000.0);
    assert_eq!(camera.camera().position(), Vec3::new(0.0, 0.0, 5.0));
    assert_eq!(camera.camera().aspect(), 2.0);
}
