//! Quality Permutation Selection
//!
//! The shading stage compiles mutually-exclusive shader permutations per
//! quality category. This module publishes the frame's selection as closed
//! enums: at most one option per category, `None` meaning the category's
//! feature is disabled.

use crate::settings::{CascadeBlendMode, FilterQuality, ShadowSettings, ShadowMaskMode};

/// Selected PCF kernel permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcfKernel {
    Tap3,
    Tap5,
    Tap7,
}

impl PcfKernel {
    /// Permutation for a configured filter tier; `Pcf2x2` selects none.
    #[must_use]
    pub fn from_filter(filter: FilterQuality) -> Option<Self> {
        match filter {
            FilterQuality::Pcf2x2 => None,
            FilterQuality::Pcf3x3 => Some(Self::Tap3),
            FilterQuality::Pcf5x5 => Some(Self::Tap5),
            FilterQuality::Pcf7x7 => Some(Self::Tap7),
        }
    }
}

/// Selected cascade-blend permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeBlend {
    Soft,
    Dither,
}

impl CascadeBlend {
    /// Permutation for a configured blend mode; `Hard` selects none.
    #[must_use]
    pub fn from_mode(mode: CascadeBlendMode) -> Option<Self> {
        match mode {
            CascadeBlendMode::Hard => None,
            CascadeBlendMode::Soft => Some(Self::Soft),
            CascadeBlendMode::Dither => Some(Self::Dither),
        }
    }
}

/// The frame's shader permutation selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShadowPermutations {
    pub directional_filter: Option<PcfKernel>,
    pub other_filter: Option<PcfKernel>,
    pub cascade_blend: Option<CascadeBlend>,
    /// Selected only when an admitted light used baked shadow-mask lighting.
    pub shadow_mask: Option<ShadowMaskMode>,
}

impl ShadowPermutations {
    /// Selection for a rendered frame. A category stays `None` when its
    /// atlas was not rendered this frame.
    #[must_use]
    pub fn select(
        settings: &ShadowSettings,
        rendered_directional: bool,
        rendered_other: bool,
        use_shadow_mask: bool,
    ) -> Self {
        Self {
            directional_filter: rendered_directional
                .then(|| PcfKernel::from_filter(settings.directional.filter))
                .flatten(),
            other_filter: rendered_other
                .then(|| PcfKernel::from_filter(settings.other.filter))
                .flatten(),
            cascade_blend: rendered_directional
                .then(|| CascadeBlend::from_mode(settings.directional.cascade_blend))
                .flatten(),
            shadow_mask: use_shadow_mask.then_some(settings.mask_mode),
        }
    }
}
