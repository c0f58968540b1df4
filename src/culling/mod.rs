//! Culling Collaborator Contract
//!
//! The shadow stage does not cull geometry itself. During the reserve phase
//! it asks the culling collaborator whether a light has any shadow casters in
//! range, and during the render phase it asks for per-cascade / per-face
//! view-projection pairs and culling primitives. [`ShadowCulling`] is that
//! seam; [`FrustumShadowCulling`] is a self-contained implementation.

use glam::{Mat4, Vec3, Vec4};

mod frustum;

pub use frustum::FrustumShadowCulling;

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// An AABB that contains nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y || self.min.z >= self.max.z
    }

    /// Sphere-box overlap test against the closest point on the box.
    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }
}

/// One face of a point-light shadow cubemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// All faces in atlas tile order.
    pub const ALL: [Self; 6] = [
        Self::PositiveX,
        Self::NegativeX,
        Self::PositiveY,
        Self::NegativeY,
        Self::PositiveZ,
        Self::NegativeZ,
    ];

    /// World-space forward direction of this face.
    #[must_use]
    pub fn forward(self) -> Vec3 {
        match self {
            Self::PositiveX => Vec3::X,
            Self::NegativeX => Vec3::NEG_X,
            Self::PositiveY => Vec3::Y,
            Self::NegativeY => Vec3::NEG_Y,
            Self::PositiveZ => Vec3::Z,
            Self::NegativeZ => Vec3::NEG_Z,
        }
    }

    /// Up vector pairing with [`forward`](Self::forward) per the cubemap
    /// convention.
    #[must_use]
    pub fn up(self) -> Vec3 {
        match self {
            Self::PositiveY => Vec3::Z,
            Self::NegativeY => Vec3::NEG_Z,
            _ => Vec3::NEG_Y,
        }
    }
}

/// One shadow render slice produced by the culling collaborator.
#[derive(Debug, Clone, Copy)]
pub struct ShadowSlice {
    pub view: Mat4,
    pub projection: Mat4,
    /// World-space culling sphere: center in `xyz`, radius in `w`.
    pub culling_sphere: Vec4,
}

/// Per-frame culling queries the shadow stage depends on.
///
/// `visible_light_index` always refers to the orchestration layer's
/// visible-light list for the current frame.
pub trait ShadowCulling {
    /// Bounding volume of the light's visible shadow casters, or `None` when
    /// no caster geometry is in range.
    fn shadow_caster_bounds(&self, visible_light_index: usize) -> Option<Aabb>;

    /// View/projection and culling sphere for one cascade of a directional
    /// light, partitioned by `cascade_ratios`.
    fn directional_slice(
        &self,
        visible_light_index: usize,
        cascade_index: u32,
        cascade_count: u32,
        cascade_ratios: Vec3,
        tile_size: u32,
        near_plane_offset: f32,
    ) -> ShadowSlice;

    /// View/projection for a spot light's shadow cone.
    ///
    /// # Panics
    ///
    /// Implementations may panic when the light is not a spot light.
    fn spot_slice(&self, visible_light_index: usize) -> ShadowSlice;

    /// View/projection for one cube face of a point light. `fov_bias_deg`
    /// widens the face's 90° field of view to hide seams at face edges.
    ///
    /// # Panics
    ///
    /// Implementations may panic when the light is not a point light.
    fn point_slice(
        &self,
        visible_light_index: usize,
        face: CubeFace,
        fov_bias_deg: f32,
    ) -> ShadowSlice;
}
