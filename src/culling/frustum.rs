//! Default Shadow Culler
//!
//! A self-contained [`ShadowCulling`] implementation working from a camera
//! snapshot and the visible-light list.
//!
//! Directional cascades are fit as bounding spheres of view-frustum slices:
//! the sphere keeps its radius stable while the camera rotates, and its
//! center is snapped to the shadow-map texel grid so the ortho projection
//! does not shimmer when the camera translates.

use glam::{Mat4, Vec3};

use super::{Aabb, CubeFace, ShadowCulling, ShadowSlice};
use crate::camera::RenderCamera;
use crate::light::{Light, LightKind};

/// Default culling collaborator over the frame's camera and lights.
pub struct FrustumShadowCulling<'a> {
    camera: &'a RenderCamera,
    lights: &'a [Light],
    max_shadow_distance: f32,
    caster_bounds: Option<Aabb>,
}

impl<'a> FrustumShadowCulling<'a> {
    #[must_use]
    pub fn new(camera: &'a RenderCamera, lights: &'a [Light], max_shadow_distance: f32) -> Self {
        Self {
            camera,
            lights,
            max_shadow_distance,
            caster_bounds: None,
        }
    }

    /// Supplies the world-space bounds of all shadow-casting geometry.
    /// Without bounds every light reports empty caster volumes.
    #[must_use]
    pub fn with_caster_bounds(mut self, bounds: Aabb) -> Self {
        self.caster_bounds = Some(bounds);
        self
    }

    fn shadow_far(&self) -> f32 {
        self.max_shadow_distance.min(self.camera.far)
    }

    /// View-space near/far distances of one cascade slice.
    fn cascade_slice_range(
        &self,
        cascade_index: u32,
        cascade_count: u32,
        ratios: Vec3,
    ) -> (f32, f32) {
        let far = self.shadow_far();
        let boundary = |i: u32| -> f32 {
            if i == 0 {
                self.camera.near
            } else if i >= cascade_count {
                far
            } else {
                ratios.to_array()[(i - 1) as usize] * far
            }
        };
        (boundary(cascade_index), boundary(cascade_index + 1))
    }

    /// The 8 world-space corners of the view-frustum slice `[near, far]`.
    fn frustum_corners_world(&self, slice_near: f32, slice_far: f32) -> [Vec3; 8] {
        let tan_half_fov = (self.camera.fov_y * 0.5).tan();

        let h_near = tan_half_fov * slice_near;
        let w_near = h_near * self.camera.aspect;
        let h_far = tan_half_fov * slice_far;
        let w_far = h_far * self.camera.aspect;

        // Corners in view space (RH: -Z is forward)
        let corners_view = [
            Vec3::new(-w_near, -h_near, -slice_near),
            Vec3::new(w_near, -h_near, -slice_near),
            Vec3::new(w_near, h_near, -slice_near),
            Vec3::new(-w_near, h_near, -slice_near),
            Vec3::new(-w_far, -h_far, -slice_far),
            Vec3::new(w_far, -h_far, -slice_far),
            Vec3::new(w_far, h_far, -slice_far),
            Vec3::new(-w_far, h_far, -slice_far),
        ];

        let inv_view = self.camera.view_matrix.inverse();
        let mut corners_world = [Vec3::ZERO; 8];
        for (i, c) in corners_view.iter().enumerate() {
            corners_world[i] = inv_view.transform_point3(*c);
        }
        corners_world
    }
}

impl ShadowCulling for FrustumShadowCulling<'_> {
    fn shadow_caster_bounds(&self, visible_light_index: usize) -> Option<Aabb> {
        let bounds = self.caster_bounds?;
        if bounds.is_empty() {
            return None;
        }
        let light = &self.lights[visible_light_index];
        match &light.kind {
            LightKind::Directional => Some(bounds),
            LightKind::Point(point) => bounds
                .intersects_sphere(light.position, point.range)
                .then_some(bounds),
            LightKind::Spot(spot) => bounds
                .intersects_sphere(light.position, spot.range)
                .then_some(bounds),
        }
    }

    fn directional_slice(
        &self,
        visible_light_index: usize,
        cascade_index: u32,
        cascade_count: u32,
        cascade_ratios: Vec3,
        tile_size: u32,
        near_plane_offset: f32,
    ) -> ShadowSlice {
        let light = &self.lights[visible_light_index];
        let dir = safe_direction(light.direction);
        let up = up_for(dir);

        let (slice_near, slice_far) =
            self.cascade_slice_range(cascade_index, cascade_count, cascade_ratios);
        let corners = self.frustum_corners_world(slice_near, slice_far);

        let mut center = Vec3::ZERO;
        for c in &corners {
            center += *c;
        }
        center /= 8.0;

        let mut radius: f32 = 0.0;
        for c in &corners {
            radius = radius.max(center.distance(*c));
        }

        // Texel alignment: snap the sphere center to the texel grid in light
        // space to prevent shimmer when the camera moves. The grid origin
        // must not depend on the center itself, so the orientation transform
        // is anchored at the world origin.
        let orient = Mat4::look_to_rh(Vec3::ZERO, dir, up);
        let texel = 2.0 * radius / tile_size as f32;
        if texel > 0.0 {
            let ls = orient.transform_point3(center);
            let snapped = Vec3::new(
                (ls.x / texel).floor() * texel,
                (ls.y / texel).floor() * texel,
                ls.z,
            );
            center = orient.inverse().transform_point3(snapped);
        }

        let eye = center - dir * (radius + near_plane_offset);
        let view = Mat4::look_at_rh(eye, center, up);
        let projection = Mat4::orthographic_rh(
            -radius,
            radius,
            -radius,
            radius,
            0.0,
            2.0 * radius + near_plane_offset,
        );

        ShadowSlice {
            view,
            projection,
            culling_sphere: center.extend(radius),
        }
    }

    fn spot_slice(&self, visible_light_index: usize) -> ShadowSlice {
        let light = &self.lights[visible_light_index];
        let LightKind::Spot(spot) = &light.kind else {
            panic!("spot_slice called for a non-spot light");
        };

        let dir = safe_direction(light.direction);
        let up = up_for(dir);
        let view = Mat4::look_at_rh(light.position, light.position + dir, up);
        let fov = (spot.outer_cone * 2.0).clamp(0.1, std::f32::consts::PI - 0.01);
        let far = spot.range.max(1.0);
        let projection = Mat4::perspective_rh(fov, 1.0, 0.1, far);

        ShadowSlice {
            view,
            projection,
            culling_sphere: light.position.extend(spot.range),
        }
    }

    fn point_slice(
        &self,
        visible_light_index: usize,
        face: CubeFace,
        fov_bias_deg: f32,
    ) -> ShadowSlice {
        let light = &self.lights[visible_light_index];
        let LightKind::Point(point) = &light.kind else {
            panic!("point_slice called for a non-point light");
        };

        let view = Mat4::look_to_rh(light.position, face.forward(), face.up());
        let fov = (90.0 + fov_bias_deg).to_radians();
        let far = point.range.max(1.0);
        let projection = Mat4::perspective_rh(fov, 1.0, 0.1, far);

        ShadowSlice {
            view,
            projection,
            culling_sphere: light.position.extend(point.range),
        }
    }
}

fn safe_direction(direction: Vec3) -> Vec3 {
    if direction.length_squared() > 1e-6 {
        direction.normalize()
    } else {
        -Vec3::Z
    }
}

fn up_for(direction: Vec3) -> Vec3 {
    if direction.y.abs() > 0.99 {
        Vec3::X
    } else {
        Vec3::Y
    }
}
