//! Shadow Settings
//!
//! Static configuration for the shadow-map production stage. These values are
//! read-only during a frame: the mapper validates them once at construction
//! and consults them while reserving and rendering.
//!
//! # Quick Start
//!
//! ```rust
//! use umbra::{FilterQuality, ShadowSettings};
//!
//! let mut settings = ShadowSettings::default();
//! settings.directional.filter = FilterQuality::Pcf5x5;
//! settings.max_distance = 60.0;
//! assert!(settings.validate().is_ok());
//! ```

use glam::Vec3;

use crate::errors::{Result, UmbraError};

// ---------------------------------------------------------------------------
// Quality enums
// ---------------------------------------------------------------------------

/// PCF filter quality tier for one atlas.
///
/// The numeric tier also drives the filter footprint used for culling-sphere
/// shrinkage and normal-bias scaling: the kernel spans `tier + 1` texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum FilterQuality {
    /// Hardware bilinear comparison only (no PCF permutation selected).
    #[default]
    Pcf2x2 = 0,
    /// 3-tap PCF.
    Pcf3x3 = 1,
    /// 5-tap PCF.
    Pcf5x5 = 2,
    /// 7-tap PCF.
    Pcf7x7 = 3,
}

impl FilterQuality {
    /// Filter footprint in texels relative to a single texel.
    #[inline]
    #[must_use]
    pub fn kernel_scale(self) -> f32 {
        (self as u32 + 1) as f32
    }
}

/// How neighbouring cascades are blended at their boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CascadeBlendMode {
    /// Hard cascade switch (no blend permutation selected).
    #[default]
    Hard,
    /// Smooth cross-fade between the two cascades.
    Soft,
    /// Dithered selection between the two cascades.
    Dither,
}

/// When baked shadow-mask occlusion replaces real-time shadows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowMaskMode {
    /// The mask is applied everywhere.
    Always,
    /// The mask takes over beyond the real-time shadow distance.
    #[default]
    Distance,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Settings for the directional-light shadow atlas.
#[derive(Debug, Clone)]
pub struct DirectionalShadowSettings {
    /// Atlas resolution in texels (power of two, `256..=8192`).
    pub atlas_size: u32,
    /// PCF quality for directional shadows.
    pub filter: FilterQuality,
    /// Number of cascades per directional light (`1..=4`).
    pub cascade_count: u32,
    /// Split positions of the inner three cascade boundaries, as fractions
    /// of the maximum shadow distance.
    pub cascade_ratios: Vec3,
    /// Fraction of the last cascade over which shadows fade out.
    pub cascade_fade: f32,
    /// Blend mode at cascade boundaries.
    pub cascade_blend: CascadeBlendMode,
}

impl Default for DirectionalShadowSettings {
    fn default() -> Self {
        Self {
            atlas_size: 1024,
            filter: FilterQuality::default(),
            cascade_count: 4,
            cascade_ratios: Vec3::new(0.1, 0.25, 0.5),
            cascade_fade: 0.1,
            cascade_blend: CascadeBlendMode::default(),
        }
    }
}

/// Settings for the spot/point-light shadow atlas.
#[derive(Debug, Clone)]
pub struct OtherShadowSettings {
    /// Atlas resolution in texels (power of two, `256..=8192`).
    pub atlas_size: u32,
    /// PCF quality for spot and point shadows.
    pub filter: FilterQuality,
}

impl Default for OtherShadowSettings {
    fn default() -> Self {
        Self {
            atlas_size: 1024,
            filter: FilterQuality::default(),
        }
    }
}

/// Global configuration for the shadow stage.
///
/// | Field           | Description                                | Default    |
/// |-----------------|--------------------------------------------|------------|
/// | `max_distance`  | Maximum view distance with shadows         | `100.0`    |
/// | `distance_fade` | Fraction of `max_distance` used to fade out| `0.1`      |
/// | `directional`   | Directional atlas settings                 | see struct |
/// | `other`         | Spot/point atlas settings                  | see struct |
/// | `mask_mode`     | Baked shadow-mask application mode         | `Distance` |
#[derive(Debug, Clone)]
pub struct ShadowSettings {
    /// Maximum view-space distance at which shadows are rendered.
    pub max_distance: f32,
    /// Fraction of `max_distance` over which shadows fade out.
    pub distance_fade: f32,
    /// Directional atlas settings.
    pub directional: DirectionalShadowSettings,
    /// Spot/point atlas settings.
    pub other: OtherShadowSettings,
    /// Shadow-mask mode applied when any admitted light uses a baked mask.
    pub mask_mode: ShadowMaskMode,
}

impl ShadowSettings {
    /// Checks every setting against its documented range.
    pub fn validate(&self) -> Result<()> {
        validate_atlas_size(self.directional.atlas_size)?;
        validate_atlas_size(self.other.atlas_size)?;

        if self.max_distance <= 0.0 {
            return Err(UmbraError::InvalidShadowDistance {
                distance: self.max_distance,
            });
        }
        validate_fade("distance", self.distance_fade)?;
        validate_fade("cascade", self.directional.cascade_fade)?;

        let count = self.directional.cascade_count;
        if !(1..=4).contains(&count) {
            return Err(UmbraError::InvalidCascadeCount { count });
        }

        let r = self.directional.cascade_ratios;
        let in_range = |v: f32| v > 0.0 && v < 1.0;
        if !(in_range(r.x) && in_range(r.y) && in_range(r.z) && r.x <= r.y && r.y <= r.z) {
            return Err(UmbraError::InvalidCascadeRatios {
                ratios: r.to_array(),
            });
        }

        Ok(())
    }
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self::new()
    }
}

// Defaults mirror the shadow settings asset of the reference pipeline.
impl ShadowSettings {
    /// Settings with everything at its documented default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_distance: 100.0,
            distance_fade: 0.1,
            directional: DirectionalShadowSettings::default(),
            other: OtherShadowSettings::default(),
            mask_mode: ShadowMaskMode::default(),
        }
    }
}

fn validate_atlas_size(size: u32) -> Result<()> {
    if (256..=8192).contains(&size) && size.is_power_of_two() {
        Ok(())
    } else {
        Err(UmbraError::InvalidAtlasSize { size })
    }
}

fn validate_fade(name: &'static str, value: f32) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(UmbraError::InvalidFade { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(ShadowSettings::new().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_power_of_two_atlas() {
        let mut settings = ShadowSettings::new();
        settings.directional.atlas_size = 1000;
        assert!(matches!(
            settings.validate(),
            Err(UmbraError::InvalidAtlasSize { size: 1000 })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_cascade_count() {
        let mut settings = ShadowSettings::new();
        settings.directional.cascade_count = 5;
        assert!(matches!(
            settings.validate(),
            Err(UmbraError::InvalidCascadeCount { count: 5 })
        ));
    }

    #[test]
    fn test_rejects_descending_cascade_ratios() {
        let mut settings = ShadowSettings::new();
        settings.directional.cascade_ratios = Vec3::new(0.5, 0.25, 0.1);
        assert!(matches!(
            settings.validate(),
            Err(UmbraError::InvalidCascadeRatios { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_cascade_fade() {
        // f = 1 - cascade_fade feeds 1 / (1 - f²); zero fade would divide by zero.
        let mut settings = ShadowSettings::new();
        settings.directional.cascade_fade = 0.0;
        assert!(matches!(
            settings.validate(),
            Err(UmbraError::InvalidFade { name: "cascade", .. })
        ));
    }

    #[test]
    fn test_kernel_scale_per_tier() {
        assert_eq!(FilterQuality::Pcf2x2.kernel_scale(), 1.0);
        assert_eq!(FilterQuality::Pcf3x3.kernel_scale(), 2.0);
        assert_eq!(FilterQuality::Pcf5x5.kernel_scale(), 3.0);
        assert_eq!(FilterQuality::Pcf7x7.kernel_scale(), 4.0);
    }
}
