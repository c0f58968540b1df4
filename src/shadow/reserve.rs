//! Reservation Registry
//!
//! Admits lights into the fixed-capacity shadow slot arrays during the
//! reserve phase and hands the caller a 4-component shadow parameter vector.
//! That vector is everything the lighting stage needs before the atlas is
//! actually rendered, which decouples admission-time decisions from
//! render-time work.
//!
//! # Encodings
//!
//! Directional: `{strength, cascadeCount · slot, normalBias, maskChannel}` —
//! the second component is a cascade *base index* into the flat matrix
//! array; the shading stage looks up `base + cascadeLevel`.
//!
//! Other lights: `{strength, slot, isPoint, maskChannel}`.
//!
//! Rejections never surface as errors. Disabled shadows or zero strength
//! return `{0, 0, 0, -1}`. A light that passes those gates but has no caster
//! geometry in range — or, for spot/point lights, no remaining capacity —
//! returns a *negated* strength so the shading stage renders it unshadowed
//! instead of sampling a missing texture.

use glam::Vec4;

use crate::culling::ShadowCulling;
use crate::light::{Light, LightKind, ShadowConfig};

/// Maximum shadowed directional lights per frame.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
/// Maximum shadow slots on the other-light atlas per frame.
pub const MAX_OTHER_SLOTS: usize = 16;
/// Slots one point light consumes (one per cube face).
pub const POINT_SLOT_COUNT: usize = 6;

const NO_SHADOWS: Vec4 = Vec4::new(0.0, 0.0, 0.0, -1.0);

/// A directional light admitted for shadow rendering this frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionalReservation {
    pub visible_light_index: usize,
    pub slope_scale_bias: f32,
    pub near_plane_offset: f32,
}

/// A spot or point light admitted for shadow rendering this frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct OtherReservation {
    pub visible_light_index: usize,
    pub slope_scale_bias: f32,
    pub normal_bias: f32,
    pub is_point: bool,
}

/// Fixed-capacity slot arrays, reset every frame.
///
/// Point lights occupy [`POINT_SLOT_COUNT`] consecutive slots with the
/// reservation entry at the base slot; spot lights occupy one.
#[derive(Debug)]
pub(crate) struct ReservationRegistry {
    pub directional: [DirectionalReservation; MAX_DIRECTIONAL_LIGHTS],
    pub directional_count: usize,
    pub other: [OtherReservation; MAX_OTHER_SLOTS],
    pub other_count: usize,
    /// Whether any admitted light uses baked shadow-mask mixed lighting.
    pub use_shadow_mask: bool,
}

impl ReservationRegistry {
    pub fn new() -> Self {
        Self {
            directional: [DirectionalReservation::default(); MAX_DIRECTIONAL_LIGHTS],
            directional_count: 0,
            other: [OtherReservation::default(); MAX_OTHER_SLOTS],
            other_count: 0,
            use_shadow_mask: false,
        }
    }

    pub fn reset(&mut self) {
        self.directional_count = 0;
        self.other_count = 0;
        self.use_shadow_mask = false;
    }

    pub fn reserve_directional<C: ShadowCulling + ?Sized>(
        &mut self,
        culling: &C,
        light: &Light,
        visible_light_index: usize,
        cascade_count: u32,
    ) -> Vec4 {
        let shadow = &light.shadow;
        if self.directional_count >= MAX_DIRECTIONAL_LIGHTS
            || !shadow.cast_shadows
            || shadow.strength <= 0.0
        {
            return NO_SHADOWS;
        }

        let mask_channel = self.resolve_mask_channel(shadow);

        if culling.shadow_caster_bounds(visible_light_index).is_none() {
            // Requested but nothing to render: negative strength, no slot.
            return Vec4::new(-shadow.strength, 0.0, 0.0, mask_channel);
        }

        let slot = self.directional_count;
        self.directional[slot] = DirectionalReservation {
            visible_light_index,
            slope_scale_bias: shadow.slope_scale_bias,
            near_plane_offset: shadow.near_plane_offset,
        };
        self.directional_count += 1;

        Vec4::new(
            shadow.strength,
            (cascade_count as usize * slot) as f32,
            shadow.normal_bias,
            mask_channel,
        )
    }

    pub fn reserve_other<C: ShadowCulling + ?Sized>(
        &mut self,
        culling: &C,
        light: &Light,
        visible_light_index: usize,
    ) -> Vec4 {
        let shadow = &light.shadow;
        if !shadow.cast_shadows || shadow.strength <= 0.0 {
            return NO_SHADOWS;
        }

        let mask_channel = self.resolve_mask_channel(shadow);

        let is_point = matches!(light.kind, LightKind::Point(_));
        let required = if is_point { POINT_SLOT_COUNT } else { 1 };

        if self.other_count + required > MAX_OTHER_SLOTS
            || culling.shadow_caster_bounds(visible_light_index).is_none()
        {
            return Vec4::new(-shadow.strength, 0.0, 0.0, mask_channel);
        }

        let slot = self.other_count;
        self.other[slot] = OtherReservation {
            visible_light_index,
            slope_scale_bias: shadow.slope_scale_bias,
            normal_bias: shadow.normal_bias,
            is_point,
        };
        self.other_count += required;

        Vec4::new(
            shadow.strength,
            slot as f32,
            if is_point { 1.0 } else { 0.0 },
            mask_channel,
        )
    }

    fn resolve_mask_channel(&mut self, shadow: &ShadowConfig) -> f32 {
        match shadow.mask_channel {
            Some(channel) => {
                self.use_shadow_mask = true;
                channel as f32
            }
            None => -1.0,
        }
    }
}
