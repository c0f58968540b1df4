pub mod camera;
pub mod culling;
pub mod errors;
pub mod light;
pub mod settings;
pub mod shadow;

pub use camera::RenderCamera;
pub use culling::{Aabb, CubeFace, FrustumShadowCulling, ShadowCulling, ShadowSlice};
pub use errors::{Result, UmbraError};
pub use light::{Light, LightKind, PointLight, ShadowConfig, SpotLight};
pub use settings::{
    CascadeBlendMode, DirectionalShadowSettings, FilterQuality, OtherShadowSettings,
    ShadowMaskMode, ShadowSettings,
};
pub use shadow::pass::{CasterRenderer, WgpuShadowTarget, SHADOW_MAP_FORMAT};
pub use shadow::quality::{CascadeBlend, PcfKernel, ShadowPermutations};
pub use shadow::target::{
    AtlasKind, DepthConvention, ShadowDrawCall, ShadowTarget, TileViewport,
};
pub use shadow::{FramePhase, ShadowMapper, ShadowRenderData, MAX_CASCADES};
