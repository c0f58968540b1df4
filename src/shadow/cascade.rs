//! Cascade Partitioning Data
//!
//! Pure functions producing the per-cascade vectors the shading stage uses
//! to pick a cascade and to compensate for the PCF filter footprint.

use glam::Vec4;

use crate::settings::{FilterQuality, ShadowSettings};

/// Shading-stage data derived from one cascade's culling sphere.
#[derive(Debug, Clone, Copy)]
pub struct CascadeData {
    /// Culling sphere with the radius shrunk by the filter footprint and
    /// then squared, for square-root-free containment tests.
    pub culling_sphere: Vec4,
    /// `{1 / radius², filter_size · √2, 0, 0}` — the second component is the
    /// diagonal bias compensation for rotated filter kernels.
    pub data: Vec4,
}

/// Shrinks a cascade culling sphere for the filter footprint.
///
/// A `filter_size`-wide kernel samples up to `filter_size` texels outside the
/// fragment, so the usable sphere is smaller than the rendered one. The
/// shrunk radius is squared so the shading stage compares squared distances.
#[must_use]
pub fn cascade_data(culling_sphere: Vec4, tile_size: u32, filter: FilterQuality) -> CascadeData {
    let texel_size = 2.0 * culling_sphere.w / tile_size as f32;
    let filter_size = texel_size * filter.kernel_scale();

    let mut sphere = culling_sphere;
    sphere.w -= filter_size;
    sphere.w *= sphere.w;

    CascadeData {
        culling_sphere: sphere,
        data: Vec4::new(
            1.0 / sphere.w,
            filter_size * std::f32::consts::SQRT_2,
            0.0,
            0.0,
        ),
    }
}

/// Global distance-fade vector `{1/maxDistance, 1/fade, 1/(1-f²)}` with
/// `f = 1 - cascadeFade`: a smooth cross-fade near the maximum shadow
/// distance and between the last two cascades.
#[must_use]
pub fn distance_fade_vector(settings: &ShadowSettings) -> Vec4 {
    let f = 1.0 - settings.directional.cascade_fade;
    Vec4::new(
        1.0 / settings.max_distance,
        1.0 / settings.distance_fade,
        1.0 / (1.0 - f * f),
        0.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shrunk_radius_never_exceeds_original() {
        for filter in [
            FilterQuality::Pcf2x2,
            FilterQuality::Pcf3x3,
            FilterQuality::Pcf5x5,
            FilterQuality::Pcf7x7,
        ] {
            let sphere = Vec4::new(0.0, 0.0, 0.0, 25.0);
            let out = cascade_data(sphere, 512, filter);
            assert!(out.culling_sphere.w.sqrt() <= sphere.w);
        }
    }

    #[test]
    fn test_cascade_data_x_is_inverse_squared_radius() {
        let sphere = Vec4::new(1.0, 2.0, 3.0, 40.0);
        let tile_size = 256;
        let filter = FilterQuality::Pcf5x5;

        let out = cascade_data(sphere, tile_size, filter);

        let texel = 2.0 * 40.0 / 256.0;
        let shrunk = 40.0 - texel * 3.0;
        assert_eq!(out.culling_sphere.w, shrunk * shrunk);
        assert_eq!(out.data.x, 1.0 / (shrunk * shrunk));
    }

    #[test]
    fn test_cascade_data_y_is_diagonal_filter_size() {
        let sphere = Vec4::new(0.0, 0.0, 0.0, 32.0);
        let out = cascade_data(sphere, 512, FilterQuality::Pcf3x3);
        let filter_size = (2.0 * 32.0 / 512.0) * 2.0;
        assert_eq!(out.data.y, filter_size * std::f32::consts::SQRT_2);
    }

    #[test]
    fn test_distance_fade_vector() {
        let mut settings = ShadowSettings::new();
        settings.max_distance = 50.0;
        settings.distance_fade = 0.2;
        settings.directional.cascade_fade = 0.25;

        let fade = distance_fade_vector(&settings);
        assert_eq!(fade.x, 1.0 / 50.0);
        assert_eq!(fade.y, 5.0);
        let f: f32 = 0.75;
        assert_eq!(fade.z, 1.0 / (1.0 - f * f));
    }
}
