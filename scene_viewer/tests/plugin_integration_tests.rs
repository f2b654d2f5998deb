//! Integration tests for the built-in plugins
//!
//! These tests register ModelLoader and CameraControls on a live viewer and
//! verify their behaviour across frames and teardown.
//!
//! Run with: cargo test --test plugin_integration_tests


use scene_viewer::glam::{Mat4, Vec3};
use scene_viewer::viewer3d::plugins::{
    CameraControls, ControlsOptions, ModelLoader, ModelSource, TransferProgress,
};
use scene_viewer::viewer3d::render::headless::HeadlessBackend;
use scene_viewer::viewer3d::scene::{Group, Renderable, SceneNode, AABB};
use scene_viewer::viewer3d::{Error, Result};
use viewer_test_utils::Harness;

// ============================================================================
// TEST MODEL SOURCE
// ============================================================================

/// Builds a two-mesh model offset along X; urls starting with "missing"
/// fail
struct TestSource {
    backend: HeadlessBackend,
}

impl ModelSource for TestSource {
    fn fetch(&mut self, url: &str, progress: &mut dyn FnMut(TransferProgress)) -> Result<SceneNode> {
        if url.starts_with("missing") {
            return Err(Error::AssetLoadFailed(format!("{} not found", url)));
        }
        progress(TransferProgress { loaded: 1024, total: Some(1024) });

        let part = |name: &str, offset: f32| {
            SceneNode::Mesh(
                Renderable::new(name, self.backend.cube(name), self.backend.material(name))
                    .with_transform(Mat4::from_translation(Vec3::new(offset, 0.0, 0.0))),
            )
        };
        Ok(SceneNode::Group(
            Group::new(url)
                .with_child(part("left", 1.0))
                .with_child(part("right", 3.0)),
        ))
    }
}

fn with_loader(h: &mut Harness) {
    let loader = ModelLoader::new(TestSource { backend: h.backend.clone() });
    h.core.register_plugin(Box::new(loader)).unwrap();
}

// ============================================================================
// MODEL LOADER
// ============================================================================

#[test]
fn test_integration_load_frame_and_render() {
    let mut h = Harness::initialized(200, 100);
    with_loader(&mut h);

    let model = h.core
        .plugin_mut::<ModelLoader>(ModelLoader::NAME)
        .unwrap()
        .load("models/pair.glb")
        .unwrap();
    assert_eq!(model.bounding_box, AABB::new(Vec3::new(0.5, -0.5, -0.5), Vec3::new(3.5, 0.5, 0.5)));
    assert_eq!(model.center, Vec3::new(2.0, 0.0, 0.0));

    h.core.start().unwrap();
    h.run_frames(2);
    assert_eq!(h.backend.stats().last_render.unwrap().child_count, 1);
}

#[test]
fn test_integration_failed_load_keeps_rendering() {
    let mut h = Harness::initialized(10, 10);
    with_loader(&mut h);
    h.core.start().unwrap();

    let loader = h.core.plugin_mut::<ModelLoader>(ModelLoader::NAME).unwrap();
    let result = loader.load("missing.glb");
    assert!(matches!(result, Err(Error::AssetLoadFailed(_))));
    assert!(loader.loading_state().error.is_some());

    assert_eq!(h.run_frames(3), 3);
    assert_eq!(h.backend.stats().render_calls, 3);
}

#[test]
fn test_integration_loader_teardown_has_no_leaks() {
    let mut h = Harness::initialized(10, 10);
    with_loader(&mut h);
    {
        let loader = h.core.plugin_mut::<ModelLoader>(ModelLoader::NAME).unwrap();
        loader.load("first").unwrap();
        loader.load("second").unwrap();
    }
    h.core.dispose();

    let stats = h.backend.stats();
    assert_eq!(stats.resources_created, stats.resources_released);
    assert_eq!(stats.double_releases, 0);
}

// ============================================================================
// CAMERA CONTROLS
// ============================================================================

#[test]
fn test_integration_controls_orbit_across_frames() {
    let mut h = Harness::initialized(10, 10);
    h.core.register_plugin(Box::new(CameraControls::new(ControlsOptions::default()))).unwrap();
    h.core.start().unwrap();

    h.core.plugin_mut::<CameraControls>(CameraControls::NAME).unwrap().rotate(0.05, 0.0);
    h.run_frames(30);

    let camera = h.core.camera();
    let position = camera.lock().unwrap().camera().position();
    assert!(position.x > 0.0);
    assert!((position.length() - 5.0).abs() < 1e-3);

    let record = h.backend.stats().last_render.unwrap();
    assert_eq!(record.camera_position, position);
}

#[test]
fn test_integration_zoom_limits_validation() {
    let mut h = Harness::initialized(10, 10);
    h.core.register_plugin(Box::new(CameraControls::default())).unwrap();
    let controls = h.core.plugin_mut::<CameraControls>(CameraControls::NAME).unwrap();

    controls.set_zoom_limits(2.0, 20.0).unwrap();
    let result = controls.set_zoom_limits(5.0, 1.0);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(controls.zoom_limits(), (2.0, 20.0));
}

#[test]
fn test_integration_controls_focus_loaded_model() {
    let mut h = Harness::initialized(10, 10);
    with_loader(&mut h);
    h.core.register_plugin(Box::new(CameraControls::default())).unwrap();

    let center = h.core
        .plugin_mut::<ModelLoader>(ModelLoader::NAME)
        .unwrap()
        .load("pair")
        .unwrap()
        .center;
    h.core.plugin_mut::<CameraControls>(CameraControls::NAME).unwrap().set_target(center).unwrap();

    assert_eq!(h.core.camera().lock().unwrap().camera().target(), center);
}

// ============================================================================
// DISPOSAL ORDERING
// ============================================================================

#[test]
fn test_integration_stale_context_fails_with_disposed() {
    let mut h = Harness::initialized(10, 10);
    with_loader(&mut h);
    h.core.register_plugin(Box::new(CameraControls::default())).unwrap();
    h.core.plugin_mut::<ModelLoader>(ModelLoader::NAME).unwrap().load("pair").unwrap();
    let context = h.core.context().unwrap();

    h.core.dispose();

    let node = SceneNode::Mesh(Renderable::new("late", h.backend.cube("late"), h.backend.material("late")));
    assert!(matches!(context.scene.lock().unwrap().add(node), Err(Error::Disposed(_))));
    assert!(matches!(context.camera.lock().unwrap().set_aspect(2.0), Err(Error::Disposed(_))));

    let scene = context.scene.lock().unwrap();
    let camera = context.camera.lock().unwrap();
    let result = context.renderer.lock().unwrap().render(scene.scene(), camera.camera());
    assert!(matches!(result, Err(Error::Disposed(_))));

    let stats = h.backend.stats();
    assert_eq!(stats.resources_created, stats.resources_released);
    assert_eq!(stats.double_releases, 0);
}
