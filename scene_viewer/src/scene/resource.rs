/// GPU-backed resources referenced by scene nodes.
///
/// Geometry, materials and textures wrap a `GpuResource`: a label, the
/// backend handle and a release flag shared by every clone. Nodes may share
/// a resource; whichever disposal reaches it first releases it and later
/// releases are no-ops.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use glam::{Mat4, Vec3};
use crate::renderer::GpuHandle;

// ===== AABB =====

/// Axis-Aligned Bounding Box
///
/// Stored in local space on geometry and transformed by node transforms
/// when a model's bounds are collected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// Box from two corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Inverted box that any union overrides
    pub fn empty() -> Self {
        Self { min: Vec3::splat(f32::INFINITY), max: Vec3::splat(f32::NEG_INFINITY) }
    }

    /// True when no point has been added
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Smallest box enclosing both
    pub fn union(&self, other: &AABB) -> AABB {
        AABB { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    /// Center point; the origin for an empty box
    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        (self.min + self.max) * 0.5
    }

    /// Extent along each axis; zero for an empty box
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        self.max - self.min
    }

    /// Transform this AABB by a matrix, returning a new AABB.
    ///
    /// Uses the Arvo method: projects each matrix axis onto the AABB extents
    /// for an exact (tight) result without transforming all 8 corners.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        if self.is_empty() {
            return *self;
        }
        let translation = matrix.col(3).truncate();
        let mut new_min = translation;
        let mut new_max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            new_min += a.min(b);
            new_max += a.max(b);
        }

        AABB { min: new_min, max: new_max }
    }
}

// ===== GPU RESOURCE =====

/// Backend handle plus a release flag shared by all clones
#[derive(Clone)]
pub struct GpuResource {
    label: Arc<str>,
    handle: Arc<dyn GpuHandle>,
    released: Arc<AtomicBool>,
}

impl GpuResource {
    /// Wrap a backend handle
    pub fn new(label: impl Into<String>, handle: Arc<dyn GpuHandle>) -> Self {
        Self {
            label: Arc::from(label.into()),
            handle,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Debug label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// True once the backend handle has been released
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Release the backend handle.
    ///
    /// Returns `false` if this resource (or a clone of it) was already released.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.handle.release();
        true
    }

    /// True if both values refer to the same underlying resource
    pub fn same_resource(&self, other: &GpuResource) -> bool {
        Arc::ptr_eq(&self.released, &other.released)
    }
}

impl fmt::Debug for GpuResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuResource")
            .field("label", &self.label)
            .field("released", &self.is_released())
            .finish()
    }
}

// ===== TEXTURE =====

/// Sampled image
#[derive(Debug, Clone)]
pub struct Texture {
    resource: GpuResource,
}

impl Texture {
    pub fn new(resource: GpuResource) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &GpuResource {
        &self.resource
    }

    /// Release the texture; returns the number of handles released (0 or 1)
    pub fn dispose(&self) -> usize {
        self.resource.release() as usize
    }
}

// ===== GEOMETRY =====

/// Vertex/index data with its local-space bounds
#[derive(Debug, Clone)]
pub struct Geometry {
    resource: GpuResource,
    bounding_box: AABB,
}

impl Geometry {
    pub fn new(resource: GpuResource, bounding_box: AABB) -> Self {
        Self { resource, bounding_box }
    }

    pub fn resource(&self) -> &GpuResource {
        &self.resource
    }

    /// Local-space bounds
    pub fn bounding_box(&self) -> AABB {
        self.bounding_box
    }

    /// Release the geometry; returns the number of handles released (0 or 1)
    pub fn dispose(&self) -> usize {
        self.resource.release() as usize
    }
}

// ===== MATERIAL =====

/// Shading parameters plus the textures they sample
#[derive(Debug, Clone)]
pub struct Material {
    resource: GpuResource,
    textures: Vec<Texture>,
}

impl Material {
    pub fn new(resource: GpuResource) -> Self {
        Self { resource, textures: Vec::new() }
    }

    /// Builder: attach a texture map
    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.textures.push(texture);
        self
    }

    pub fn resource(&self) -> &GpuResource {
        &self.resource
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    /// Release every texture map, then the material itself.
    ///
    /// Returns the number of handles released.
    pub fn dispose(&self) -> usize {
        let textures: usize = self.textures.iter().map(Texture::dispose).sum();
        textures + self.resource.release() as usize
    }
}
