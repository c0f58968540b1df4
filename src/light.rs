use glam::Vec3;

/// Per-light shadow parameters read during the reserve phase.
#[derive(Debug, Clone)]
pub struct ShadowConfig {
    /// Whether this light casts real-time shadows at all.
    pub cast_shadows: bool,
    /// Shadow strength in `[0, 1]`; zero or less never reserves a slot.
    pub strength: f32,
    /// Slope-scale depth bias applied while rasterizing this light's casters.
    pub slope_scale_bias: f32,
    /// Normal bias in world units per filter texel.
    pub normal_bias: f32,
    /// Near-plane pull-back for directional shadow projections.
    pub near_plane_offset: f32,
    /// Baked shadow-mask channel for mixed lighting, if any.
    pub mask_channel: Option<u32>,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            cast_shadows: true,
            strength: 1.0,
            slope_scale_bias: 0.05,
            normal_bias: 0.4,
            near_plane_offset: 0.2,
            mask_channel: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PointLight {
    pub range: f32,
}

#[derive(Debug, Clone)]
pub struct SpotLight {
    pub range: f32,
    pub inner_cone: f32,
    pub outer_cone: f32,
}

/// Light-type specific data of a visible light.
#[derive(Debug, Clone)]
pub enum LightKind {
    Directional,
    Point(PointLight),
    Spot(SpotLight),
}

/// One entry of the per-frame visible-light list.
///
/// The orchestration layer builds these from its culling results; the shadow
/// stage only reads the transform and the [`ShadowConfig`].
#[derive(Debug, Clone)]
pub struct Light {
    pub kind: LightKind,
    pub position: Vec3,
    pub direction: Vec3,
    pub shadow: ShadowConfig,
}

impl Light {
    #[must_use]
    pub fn new_directional(direction: Vec3) -> Self {
        Self {
            kind: LightKind::Directional,
            position: Vec3::ZERO,
            direction,
            shadow: ShadowConfig::default(),
        }
    }

    #[must_use]
    pub fn new_point(position: Vec3, range: f32) -> Self {
        Self {
            kind: LightKind::Point(PointLight { range }),
            position,
            direction: Vec3::NEG_Z,
            shadow: ShadowConfig::default(),
        }
    }

    #[must_use]
    pub fn new_spot(
        position: Vec3,
        direction: Vec3,
        range: f32,
        inner_cone: f32,
        outer_cone: f32,
    ) -> Self {
        Self {
            kind: LightKind::Spot(SpotLight {
                range,
                inner_cone,
                outer_cone,
            }),
            position,
            direction,
            shadow: ShadowConfig::default(),
        }
    }
}
