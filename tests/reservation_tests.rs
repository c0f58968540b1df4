//! Reservation Registry Tests
//!
//! Tests for:
//! - Parameter-vector strength sign per admission outcome
//! - Directional capacity (4 lights) and the zero-vector overflow encoding
//! - Atomic 6-slot point-light reservation
//! - Empty-caster rejection consuming no slot
//! - Shadow-mask side effect and permutation selection

mod common;

use glam::Vec4;

use common::{directional_light, point_light, spot_light, RecordingTarget, StaticCulling};
use umbra::{DepthConvention, ShadowMaskMode, ShadowMapper, ShadowSettings};

fn mapper() -> ShadowMapper {
    ShadowMapper::new(ShadowSettings::new(), DepthConvention::Standard).unwrap()
}

// ============================================================================
// Directional reservations
// ============================================================================

#[test]
fn directional_admission_encodes_cascade_base_index() {
    let mut mapper = mapper();
    let culling = StaticCulling::with_casters();
    mapper.setup();

    for slot in 0..4 {
        let mut light = directional_light();
        light.shadow.strength = 0.75;
        light.shadow.normal_bias = 0.25;
        let params = mapper.reserve_directional(&culling, &light, slot);

        assert_eq!(params.x, 0.75);
        // Second component is a base index into the flat cascade array.
        assert_eq!(params.y, (4 * slot) as f32);
        assert_eq!(params.z, 0.25);
        assert_eq!(params.w, -1.0);
    }
}

#[test]
fn fifth_directional_light_returns_zero_vector() {
    let mut mapper = mapper();
    let culling = StaticCulling::with_casters();
    mapper.setup();

    for i in 0..4 {
        let params = mapper.reserve_directional(&culling, &directional_light(), i);
        assert!(params.x > 0.0, "light {i} should be admitted");
    }
    let params = mapper.reserve_directional(&culling, &directional_light(), 4);
    assert_eq!(params, Vec4::new(0.0, 0.0, 0.0, -1.0));
}

#[test]
fn disabled_shadows_return_zero_vector() {
    let mut mapper = mapper();
    let culling = StaticCulling::with_casters();
    mapper.setup();

    let mut light = directional_light();
    light.shadow.cast_shadows = false;
    assert_eq!(
        mapper.reserve_directional(&culling, &light, 0),
        Vec4::new(0.0, 0.0, 0.0, -1.0)
    );

    let mut light = spot_light();
    light.shadow.strength = 0.0;
    assert_eq!(
        mapper.reserve_other(&culling, &light, 0),
        Vec4::new(0.0, 0.0, 0.0, -1.0)
    );
}

#[test]
fn empty_caster_bounds_negate_strength_without_consuming_a_slot() {
    let mut mapper = mapper();
    let empty = StaticCulling::without_casters();
    let full = StaticCulling::with_casters();
    mapper.setup();

    let mut light = directional_light();
    light.shadow.strength = 0.6;
    let params = mapper.reserve_directional(&empty, &light, 0);
    assert_eq!(params.x, -0.6);

    // The rejected light consumed nothing: the next one still gets slot 0.
    let params = mapper.reserve_directional(&full, &directional_light(), 1);
    assert_eq!(params.y, 0.0);
}

// ============================================================================
// Other-light reservations
// ============================================================================

#[test]
fn spot_and_point_encodings() {
    let mut mapper = mapper();
    let culling = StaticCulling::with_casters();
    mapper.setup();

    let spot = mapper.reserve_other(&culling, &spot_light(), 0);
    assert_eq!(spot, Vec4::new(1.0, 0.0, 0.0, -1.0));

    let point = mapper.reserve_other(&culling, &point_light(), 1);
    // Point light starts at slot 1 and flags itself in the third component.
    assert_eq!(point, Vec4::new(1.0, 1.0, 1.0, -1.0));

    // The point light consumed 6 slots; the next spot lands on slot 7.
    let spot = mapper.reserve_other(&culling, &spot_light(), 2);
    assert_eq!(spot.y, 7.0);
}

#[test]
fn point_reservation_is_atomic_even_with_free_slots() {
    let mut mapper = mapper();
    let culling = StaticCulling::with_casters();
    mapper.setup();

    // Fill 11 of 16 slots with spot lights; 5 remain.
    for i in 0..11 {
        assert!(mapper.reserve_other(&culling, &spot_light(), i).x > 0.0);
    }

    let mut light = point_light();
    light.shadow.strength = 0.9;
    let params = mapper.reserve_other(&culling, &light, 11);
    assert_eq!(params.x, -0.9, "point light must not take a partial run");

    // The 5 remaining single-slot reservations still succeed.
    for i in 0..5 {
        let params = mapper.reserve_other(&culling, &spot_light(), 12 + i);
        assert_eq!(params.y, (11 + i) as f32);
    }
}

#[test]
fn five_point_lights_admit_exactly_two() {
    let mut mapper = mapper();
    let culling = StaticCulling::with_casters();
    mapper.setup();

    let results: Vec<Vec4> = (0..5)
        .map(|i| mapper.reserve_other(&culling, &point_light(), i))
        .collect();

    assert_eq!(results[0].y, 0.0);
    assert_eq!(results[1].y, 6.0);
    // Light 3 would need slots 12..18, exceeding 16, despite 4 free slots.
    for rejected in &results[2..] {
        assert!(rejected.x < 0.0);
    }
}

#[test]
fn strength_sign_matches_admission_outcome() {
    let mut mapper = mapper();
    let culling = StaticCulling::with_casters();
    let no_casters = StaticCulling::without_casters();
    mapper.setup();

    let admitted = mapper.reserve_other(&culling, &spot_light(), 0);
    assert!(admitted.x > 0.0);

    let empty = mapper.reserve_other(&no_casters, &spot_light(), 1);
    assert!(empty.x < 0.0);

    let mut disabled = spot_light();
    disabled.shadow.cast_shadows = false;
    assert_eq!(mapper.reserve_other(&culling, &disabled, 2).x, 0.0);
}

// ============================================================================
// Shadow-mask side effect
// ============================================================================

#[test]
fn mask_channel_rides_the_parameter_vector() {
    let mut mapper = mapper();
    let culling = StaticCulling::with_casters();
    mapper.setup();

    let mut light = spot_light();
    light.shadow.mask_channel = Some(2);
    let params = mapper.reserve_other(&culling, &light, 0);
    assert_eq!(params.w, 2.0);
}

#[test]
fn capacity_rejected_mask_light_still_selects_mask_permutation() {
    let mut settings = ShadowSettings::new();
    settings.mask_mode = ShadowMaskMode::Distance;
    let mut mapper = ShadowMapper::new(settings, DepthConvention::Standard).unwrap();
    let culling = StaticCulling::with_casters();

    mapper.setup();
    for i in 0..16 {
        assert!(mapper.reserve_other(&culling, &spot_light(), i).x > 0.0);
    }
    let mut masked = spot_light();
    masked.shadow.mask_channel = Some(0);
    let params = mapper.reserve_other(&culling, &masked, 16);
    assert!(params.x < 0.0);
    assert_eq!(params.w, 0.0);

    let mut target = RecordingTarget::default();
    mapper.render(&culling, &mut target);
    assert_eq!(
        mapper.data().permutations.shadow_mask,
        Some(ShadowMaskMode::Distance)
    );
    mapper.cleanup(&mut target);
}

#[test]
fn disabled_mask_light_does_not_select_mask_permutation() {
    let mut mapper = mapper();
    let culling = StaticCulling::with_casters();
    mapper.setup();

    let mut light = spot_light();
    light.shadow.cast_shadows = false;
    light.shadow.mask_channel = Some(1);
    mapper.reserve_other(&culling, &light, 0);

    let mut target = RecordingTarget::default();
    mapper.render(&culling, &mut target);
    assert_eq!(mapper.data().permutations.shadow_mask, None);
    mapper.cleanup(&mut target);
}
