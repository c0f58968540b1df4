//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! Steady-state shadow operations never fail: admission rejections and
//! empty-caster outcomes travel inside the returned shadow parameter vector,
//! and phase-protocol violations are debug assertions. The only fallible
//! surface is configuration validation.

use thiserror::Error;

/// The main error type for the umbra shadow stage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UmbraError {
    /// Atlas resolution is not a power of two in the supported range.
    #[error("invalid shadow atlas size {size}: must be a power of two in 256..=8192")]
    InvalidAtlasSize {
        /// The rejected resolution.
        size: u32,
    },

    /// Cascade count outside the supported range.
    #[error("invalid cascade count {count}: must be in 1..=4")]
    InvalidCascadeCount {
        /// The rejected count.
        count: u32,
    },

    /// Cascade split ratios are not ordered fractions of the shadow distance.
    #[error("invalid cascade ratios {ratios:?}: each must lie in (0, 1), in non-decreasing order")]
    InvalidCascadeRatios {
        /// The rejected ratio vector.
        ratios: [f32; 3],
    },

    /// Maximum shadow distance must be positive.
    #[error("invalid max shadow distance {distance}: must be positive")]
    InvalidShadowDistance {
        /// The rejected distance.
        distance: f32,
    },

    /// A fade fraction lies outside `(0, 1]`.
    #[error("invalid {name} fade {value}: must lie in (0, 1]")]
    InvalidFade {
        /// Which fade setting was rejected.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
}

/// Alias for `Result<T, UmbraError>`.
pub type Result<T> = std::result::Result<T, UmbraError>;
