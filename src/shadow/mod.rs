//! Shadow-Map Production Stage
//!
//! [`ShadowMapper`] decides which lights cast shadows this frame, packs
//! their depth renders into two fixed-size atlases, computes per-light and
//! per-cascade projection data, and publishes the compact parameter set the
//! shading stage samples shadows with.
//!
//! One frame is a strict four-step protocol on the render thread:
//!
//! 1. [`setup`](ShadowMapper::setup) resets the registry and published data;
//! 2. [`reserve_directional`](ShadowMapper::reserve_directional) /
//!    [`reserve_other`](ShadowMapper::reserve_other) once per visible
//!    shadow-casting light, in visibility-list order;
//! 3. [`render`](ShadowMapper::render) runs the directional pass then the
//!    other-lights pass, emitting one draw call per atlas tile;
//! 4. [`cleanup`](ShadowMapper::cleanup) releases the atlas textures.
//!
//! The mapper is not reentrant and holds no synchronization; it is never
//! called concurrently with itself. Phase order is checked with debug
//! assertions only — violating it in release builds yields undefined atlas
//! contents, not a runtime error.

pub mod atlas;
pub mod cascade;
pub mod pass;
pub mod quality;
pub mod reserve;
pub mod target;

use glam::{Mat4, Vec4};
use log::debug;

use crate::culling::ShadowCulling;
use crate::errors::Result;
use crate::light::Light;
use crate::settings::ShadowSettings;

use self::cascade::{cascade_data, distance_fade_vector};
use self::quality::ShadowPermutations;
use self::reserve::ReservationRegistry;
use self::target::{AtlasKind, DepthConvention, ShadowDrawCall, ShadowTarget};

pub use self::reserve::{
    DirectionalReservation, OtherReservation, MAX_DIRECTIONAL_LIGHTS, MAX_OTHER_SLOTS,
    POINT_SLOT_COUNT,
};

/// Maximum cascade count per directional light.
pub const MAX_CASCADES: u32 = 4;

/// Flat directional matrix array length: lights × cascades.
pub const MAX_DIRECTIONAL_TILES: usize = MAX_DIRECTIONAL_LIGHTS * MAX_CASCADES as usize;

/// Where the mapper stands in the per-frame protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    /// Between frames; only `setup` is valid.
    Idle,
    /// Accepting reservations; `render` is valid.
    Reserving,
    /// Atlases rendered; published data is valid, `cleanup` is next.
    Rendered,
}

/// Frame-scoped data published to the shading stage.
///
/// All arrays are fixed-size and `Pod`-castable for direct GPU upload; the
/// entries of slots that were not reserved this frame stay at their reset
/// values.
#[derive(Debug, Clone)]
pub struct ShadowRenderData {
    /// World → atlas-tile matrices, indexed `light · cascadeCount + cascade`.
    pub directional_matrices: [Mat4; MAX_DIRECTIONAL_TILES],
    /// World → atlas-tile matrices for other lights, indexed by slot.
    pub other_matrices: [Mat4; MAX_OTHER_SLOTS],
    /// Per-slot tile data `{u_min, v_min, span, bias}` for other lights.
    pub other_tiles: [Vec4; MAX_OTHER_SLOTS],
    /// Post-shrinkage culling spheres, shared by all directional lights.
    pub cascade_culling_spheres: [Vec4; MAX_CASCADES as usize],
    /// Per-cascade `{1/radius², diagonal filter size, 0, 0}`.
    pub cascade_data: [Vec4; MAX_CASCADES as usize],
    /// Cascades in use, zero when no directional light was admitted.
    pub cascade_count: u32,
    /// `{1/maxDistance, 1/distanceFade, 1/(1-f²), 0}`.
    pub distance_fade: Vec4,
    /// `{dirSize, 1/dirSize, otherSize, 1/otherSize}`; components of an
    /// atlas that was not rendered stay zero.
    pub atlas_size: Vec4,
    /// Selected shader permutations.
    pub permutations: ShadowPermutations,
}

impl ShadowRenderData {
    fn new() -> Self {
        Self {
            directional_matrices: [Mat4::IDENTITY; MAX_DIRECTIONAL_TILES],
            other_matrices: [Mat4::IDENTITY; MAX_OTHER_SLOTS],
            other_tiles: [Vec4::ZERO; MAX_OTHER_SLOTS],
            cascade_culling_spheres: [Vec4::ZERO; MAX_CASCADES as usize],
            cascade_data: [Vec4::ZERO; MAX_CASCADES as usize],
            cascade_count: 0,
            distance_fade: Vec4::ZERO,
            atlas_size: Vec4::ZERO,
            permutations: ShadowPermutations::default(),
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ShadowRenderData {
    fn default() -> Self {
        Self::new()
    }
}

/// The shadow-map production stage. One instance per render pipeline.
pub struct ShadowMapper {
    settings: ShadowSettings,
    depth_convention: DepthConvention,
    phase: FramePhase,
    registry: ReservationRegistry,
    data: ShadowRenderData,
}

impl ShadowMapper {
    /// Validates `settings` and builds an idle mapper.
    pub fn new(settings: ShadowSettings, depth_convention: DepthConvention) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            depth_convention,
            phase: FramePhase::Idle,
            registry: ReservationRegistry::new(),
            data: ShadowRenderData::new(),
        })
    }

    #[must_use]
    pub fn settings(&self) -> &ShadowSettings {
        &self.settings
    }

    #[must_use]
    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Published frame data. Valid after [`render`](Self::render); reset
    /// values before.
    #[must_use]
    pub fn data(&self) -> &ShadowRenderData {
        &self.data
    }

    /// Begins a frame: clears the registry and the published data.
    pub fn setup(&mut self) {
        debug_assert_eq!(
            self.phase,
            FramePhase::Idle,
            "setup requires the previous frame to have been cleaned up"
        );
        self.registry.reset();
        self.data.reset();
        self.phase = FramePhase::Reserving;
    }

    /// Requests a directional shadow slot; see [`reserve`](self::reserve)
    /// for the returned encoding.
    pub fn reserve_directional<C: ShadowCulling + ?Sized>(
        &mut self,
        culling: &C,
        light: &Light,
        visible_light_index: usize,
    ) -> Vec4 {
        debug_assert_eq!(self.phase, FramePhase::Reserving, "reserve outside reserve phase");
        self.registry.reserve_directional(
            culling,
            light,
            visible_light_index,
            self.settings.directional.cascade_count,
        )
    }

    /// Requests a spot/point shadow slot; see [`reserve`](self::reserve)
    /// for the returned encoding.
    pub fn reserve_other<C: ShadowCulling + ?Sized>(
        &mut self,
        culling: &C,
        light: &Light,
        visible_light_index: usize,
    ) -> Vec4 {
        debug_assert_eq!(self.phase, FramePhase::Reserving, "reserve outside reserve phase");
        self.registry.reserve_other(culling, light, visible_light_index)
    }

    /// Renders every reserved shadow tile and publishes the frame data.
    ///
    /// Reservations must be complete: this reads the full slot arrays and
    /// assumes no further mutation.
    pub fn render<C: ShadowCulling + ?Sized, T: ShadowTarget + ?Sized>(
        &mut self,
        culling: &C,
        target: &mut T,
    ) {
        debug_assert_eq!(self.phase, FramePhase::Reserving, "render outside reserve phase");
        self.phase = FramePhase::Rendered;

        let directional_count = self.registry.directional_count;
        let other_count = self.registry.other_count;
        debug!(
            "shadow render: {directional_count} directional light(s), {other_count} other slot(s)"
        );

        target.prepare_atlases(
            (directional_count > 0).then_some(self.settings.directional.atlas_size),
            (other_count > 0).then_some(self.settings.other.atlas_size),
        );

        if directional_count > 0 {
            self.render_directional(culling, target);
        }
        if other_count > 0 {
            self.render_other(culling, target);
        }

        self.data.cascade_count = if directional_count > 0 {
            self.settings.directional.cascade_count
        } else {
            0
        };
        self.data.distance_fade = distance_fade_vector(&self.settings);
        self.data.permutations = ShadowPermutations::select(
            &self.settings,
            directional_count > 0,
            other_count > 0,
            self.registry.use_shadow_mask,
        );

        target.finish();
    }

    /// Ends the frame and releases the atlas textures.
    pub fn cleanup<T: ShadowTarget + ?Sized>(&mut self, target: &mut T) {
        debug_assert_eq!(self.phase, FramePhase::Rendered, "cleanup before render");
        target.release();
        self.phase = FramePhase::Idle;
    }

    // ------------------------------------------------------------------
    // Directional pass
    // ------------------------------------------------------------------

    fn render_directional<C: ShadowCulling + ?Sized, T: ShadowTarget + ?Sized>(
        &mut self,
        culling: &C,
        target: &mut T,
    ) {
        let atlas_size = self.settings.directional.atlas_size;
        self.data.atlas_size.x = atlas_size as f32;
        self.data.atlas_size.y = 1.0 / atlas_size as f32;

        let tiles = self.registry.directional_count as u32 * self.settings.directional.cascade_count;
        let split = atlas::split_factor(tiles);
        let tile_size = atlas_size / split;

        for index in 0..self.registry.directional_count {
            self.render_directional_light(culling, target, index, split, tile_size);
        }
    }

    fn render_directional_light<C: ShadowCulling + ?Sized, T: ShadowTarget + ?Sized>(
        &mut self,
        culling: &C,
        target: &mut T,
        index: usize,
        split: u32,
        tile_size: u32,
    ) {
        let light = self.registry.directional[index];
        let cascade_count = self.settings.directional.cascade_count;
        let ratios = self.settings.directional.cascade_ratios;
        // Relax caster culling near cascade boundaries so blended fragments
        // find casters in both cascades.
        let culling_factor = (0.8 - self.settings.directional.cascade_fade).max(0.0);
        let tile_scale = 1.0 / split as f32;
        let tile_base = index * cascade_count as usize;

        for c in 0..cascade_count {
            let slice = culling.directional_slice(
                light.visible_light_index,
                c,
                cascade_count,
                ratios,
                tile_size,
                light.near_plane_offset,
            );

            // Cascade geometry is camera-relative, so it is computed once for
            // slot 0 and shared by every directional light in atlas space.
            if index == 0 {
                let data = cascade_data(
                    slice.culling_sphere,
                    tile_size,
                    self.settings.directional.filter,
                );
                self.data.cascade_culling_spheres[c as usize] = data.culling_sphere;
                self.data.cascade_data[c as usize] = data.data;
            }

            let tile_index = tile_base + c as usize;
            let offset = atlas::tile_offset(tile_index as u32, split);
            self.data.directional_matrices[tile_index] = atlas::to_atlas_matrix(
                slice.projection * slice.view,
                offset,
                tile_scale,
                self.depth_convention,
            );

            target.draw(&ShadowDrawCall {
                atlas: AtlasKind::Directional,
                visible_light_index: light.visible_light_index,
                viewport: atlas::tile_viewport(tile_index as u32, split, tile_size),
                view: slice.view,
                projection: slice.projection,
                slope_scale_bias: light.slope_scale_bias,
                culling_sphere: slice.culling_sphere,
                blend_culling_factor: culling_factor,
                pancaking: true,
            });
        }
    }

    // ------------------------------------------------------------------
    // Other-lights pass
    // ------------------------------------------------------------------

    fn render_other<C: ShadowCulling + ?Sized, T: ShadowTarget + ?Sized>(
        &mut self,
        culling: &C,
        target: &mut T,
    ) {
        let atlas_size = self.settings.other.atlas_size;
        self.data.atlas_size.z = atlas_size as f32;
        self.data.atlas_size.w = 1.0 / atlas_size as f32;

        let tiles = self.registry.other_count as u32;
        let split = atlas::split_factor(tiles);
        let tile_size = atlas_size / split;

        let mut slot = 0;
        while slot < self.registry.other_count {
            if self.registry.other[slot].is_point {
                self.render_point_light(culling, target, slot, split, tile_size);
                slot += POINT_SLOT_COUNT;
            } else {
                self.render_spot_light(culling, target, slot, split, tile_size);
                slot += 1;
            }
        }
    }

    fn render_spot_light<C: ShadowCulling + ?Sized, T: ShadowTarget + ?Sized>(
        &mut self,
        culling: &C,
        target: &mut T,
        slot: usize,
        split: u32,
        tile_size: u32,
    ) {
        let light = self.registry.other[slot];
        let slice = culling.spot_slice(light.visible_light_index);

        // World-space texel footprint at unit depth, from the projection's
        // FOV scale term.
        let texel_size = 2.0 / (tile_size as f32 * slice.projection.x_axis.x);
        let filter_size = texel_size * self.settings.other.filter.kernel_scale();
        let bias = light.normal_bias * filter_size * std::f32::consts::SQRT_2;

        let offset = atlas::tile_offset(slot as u32, split);
        let tile_scale = 1.0 / split as f32;
        let border = self.data.atlas_size.w * 0.5;
        self.data.other_tiles[slot] = atlas::other_tile_data(offset, tile_scale, border, bias);
        self.data.other_matrices[slot] = atlas::to_atlas_matrix(
            slice.projection * slice.view,
            offset,
            tile_scale,
            self.depth_convention,
        );

        target.draw(&ShadowDrawCall {
            atlas: AtlasKind::Other,
            visible_light_index: light.visible_light_index,
            viewport: atlas::tile_viewport(slot as u32, split, tile_size),
            view: slice.view,
            projection: slice.projection,
            slope_scale_bias: light.slope_scale_bias,
            culling_sphere: slice.culling_sphere,
            blend_culling_factor: 0.0,
            pancaking: false,
        });
    }

    fn render_point_light<C: ShadowCulling + ?Sized, T: ShadowTarget + ?Sized>(
        &mut self,
        culling: &C,
        target: &mut T,
        slot: usize,
        split: u32,
        tile_size: u32,
    ) {
        let light = self.registry.other[slot];

        // Point faces render with a 90° FOV, so the texel footprint does not
        // depend on the projection.
        let texel_size = 2.0 / tile_size as f32;
        let filter_size = texel_size * self.settings.other.filter.kernel_scale();
        let bias = light.normal_bias * filter_size * std::f32::consts::SQRT_2;
        let tile_scale = 1.0 / split as f32;

        // Widen each face beyond 90° so the filter never samples across a
        // cube seam.
        let fov_bias = (1.0 + bias + filter_size).atan().to_degrees() * 2.0 - 90.0;

        for (face_index, face) in crate::culling::CubeFace::ALL.into_iter().enumerate() {
            let mut slice = culling.point_slice(light.visible_light_index, face, fov_bias);
            // Match the target cubemap's handedness.
            slice.view = atlas::negate_y_row(slice.view);

            let tile_index = slot + face_index;
            let offset = atlas::tile_offset(tile_index as u32, split);
            let border = self.data.atlas_size.w * 0.5;
            self.data.other_tiles[tile_index] =
                atlas::other_tile_data(offset, tile_scale, border, bias);
            self.data.other_matrices[tile_index] = atlas::to_atlas_matrix(
                slice.projection * slice.view,
                offset,
                tile_scale,
                self.depth_convention,
            );

            target.draw(&ShadowDrawCall {
                atlas: AtlasKind::Other,
                visible_light_index: light.visible_light_index,
                viewport: atlas::tile_viewport(tile_index as u32, split, tile_size),
                view: slice.view,
                projection: slice.projection,
                slope_scale_bias: light.slope_scale_bias,
                culling_sphere: slice.culling_sphere,
                blend_culling_factor: 0.0,
                pancaking: false,
            });
        }
    }
}
