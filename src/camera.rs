use glam::{Mat4, Vec3};

/// Immutable camera snapshot consumed by the default shadow culler.
///
/// The orchestration layer produces one of these per frame from its active
/// camera; only the view transform and the perspective parameters matter for
/// cascade partitioning.
#[derive(Debug, Clone)]
pub struct RenderCamera {
    pub position: Vec3,
    pub view_matrix: Mat4,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl RenderCamera {
    /// Builds a perspective camera snapshot looking from `position` at `target`.
    #[must_use]
    pub fn new_perspective(
        position: Vec3,
        target: Vec3,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let up = if (target - position).normalize_or_zero().y.abs() > 0.99 {
            Vec3::X
        } else {
            Vec3::Y
        };
        Self {
            position,
            view_matrix: Mat4::look_at_rh(position, target, up),
            fov_y,
            aspect,
            near,
            far,
        }
    }
}
