//! Perspective camera with cached view and projection matrices.
//!
//! Every setter that changes a projection parameter recomputes the
//! projection matrix before returning; position/target changes recompute
//! the view matrix.

use glam::{Mat4, Vec3};

/// Default vertical field of view in degrees
pub const DEFAULT_FOV_DEGREES: f32 = 75.0;
/// Default near clip distance
pub const DEFAULT_NEAR: f32 = 0.1;
/// Default far clip distance
pub const DEFAULT_FAR: f32 = 1000.0;
/// Default camera position
pub const DEFAULT_POSITION: Vec3 = Vec3::new(0.0, 0.0, 5.0);

#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    fov_degrees: f32,
    near: f32,
    far: f32,
    aspect: f32,
    position: Vec3,
    target: Vec3,
    up: Vec3,
    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        let mut camera = Self {
            fov_degrees: DEFAULT_FOV_DEGREES,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            aspect: 1.0,
            position: DEFAULT_POSITION,
            target: Vec3::ZERO,
            up: Vec3::Y,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera.update_view_matrix();
        camera
    }
}

impl PerspectiveCamera {
    // ===== GETTERS =====

    /// Vertical field of view in degrees
    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// Width / height of the drawable
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Point the camera looks at
    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    // ===== SETTERS =====

    pub(crate) fn set_fov_degrees(&mut self, fov_degrees: f32) {
        self.fov_degrees = fov_degrees;
        self.update_projection_matrix();
    }

    pub(crate) fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
        self.update_projection_matrix();
    }

    pub(crate) fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_view_matrix();
    }

    pub(crate) fn look_at(&mut self, target: Vec3) {
        self.target = target;
        self.update_view_matrix();
    }

    fn update_projection_matrix(&mut self) {
        self.projection_matrix = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
    }

    // A zero-length or up-parallel view direction has no basis; the previous
    // view matrix is kept.
    fn update_view_matrix(&mut self) {
        let direction = self.target - self.position;
        if direction.length_squared() <= f32::EPSILON
            || direction.normalize().cross(self.up).length_squared() <= f32::EPSILON
        {
            return;
        }
        self.view_matrix = Mat4::look_at_rh(self.position, self.target, self.up);
    }
}
