//! Shared helpers for the shadow stage test suites.

#![allow(dead_code)]

use glam::{Mat4, Vec3, Vec4};

use umbra::{
    Aabb, AtlasKind, CubeFace, Light, RenderCamera, ShadowCulling, ShadowDrawCall, ShadowSlice,
    ShadowTarget,
};

/// Records the target protocol instead of touching a GPU.
#[derive(Default)]
pub struct RecordingTarget {
    pub prepared: Option<(Option<u32>, Option<u32>)>,
    pub calls: Vec<ShadowDrawCall>,
    pub finished: bool,
    pub released: bool,
}

impl RecordingTarget {
    pub fn calls_for(&self, atlas: AtlasKind) -> Vec<&ShadowDrawCall> {
        self.calls.iter().filter(|c| c.atlas == atlas).collect()
    }
}

impl ShadowTarget for RecordingTarget {
    fn prepare_atlases(&mut self, directional: Option<u32>, other: Option<u32>) {
        self.prepared = Some((directional, other));
        self.calls.clear();
    }

    fn draw(&mut self, call: &ShadowDrawCall) {
        self.calls.push(call.clone());
    }

    fn finish(&mut self) {
        self.finished = true;
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Culling stub with a fixed caster-bounds answer and synthetic projections.
pub struct StaticCulling {
    pub bounds: Option<Aabb>,
}

impl StaticCulling {
    pub fn with_casters() -> Self {
        Self {
            bounds: Some(Aabb::new(Vec3::splat(-50.0), Vec3::splat(50.0))),
        }
    }

    pub fn without_casters() -> Self {
        Self { bounds: None }
    }
}

impl ShadowCulling for StaticCulling {
    fn shadow_caster_bounds(&self, _visible_light_index: usize) -> Option<Aabb> {
        self.bounds
    }

    fn directional_slice(
        &self,
        _visible_light_index: usize,
        cascade_index: u32,
        _cascade_count: u32,
        _cascade_ratios: Vec3,
        _tile_size: u32,
        _near_plane_offset: f32,
    ) -> ShadowSlice {
        let radius = 10.0 + cascade_index as f32 * 5.0;
        ShadowSlice {
            view: Mat4::look_at_rh(Vec3::new(0.0, 30.0, 0.0), Vec3::ZERO, Vec3::X),
            projection: Mat4::orthographic_rh(-radius, radius, -radius, radius, 0.0, 60.0),
            culling_sphere: Vec4::new(0.0, 0.0, 0.0, radius),
        }
    }

    fn spot_slice(&self, _visible_light_index: usize) -> ShadowSlice {
        ShadowSlice {
            view: Mat4::look_at_rh(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::X),
            projection: Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 20.0),
            culling_sphere: Vec4::new(0.0, 5.0, 0.0, 20.0),
        }
    }

    fn point_slice(
        &self,
        _visible_light_index: usize,
        face: CubeFace,
        fov_bias_deg: f32,
    ) -> ShadowSlice {
        let fov = (90.0 + fov_bias_deg).to_radians();
        ShadowSlice {
            view: Mat4::look_to_rh(Vec3::ZERO, face.forward(), face.up()),
            projection: Mat4::perspective_rh(fov, 1.0, 0.1, 15.0),
            culling_sphere: Vec4::new(0.0, 0.0, 0.0, 15.0),
        }
    }
}

pub fn make_camera() -> RenderCamera {
    RenderCamera::new_perspective(
        Vec3::new(0.0, 2.0, 8.0),
        Vec3::ZERO,
        60.0_f32.to_radians(),
        16.0 / 9.0,
        0.1,
        100.0,
    )
}

pub fn directional_light() -> Light {
    Light::new_directional(Vec3::new(-0.4, -1.0, -0.3))
}

pub fn spot_light() -> Light {
    Light::new_spot(Vec3::new(2.0, 4.0, 0.0), Vec3::NEG_Y, 20.0, 0.4, 0.6)
}

pub fn point_light() -> Light {
    Light::new_point(Vec3::new(-3.0, 2.0, 1.0), 15.0)
}
