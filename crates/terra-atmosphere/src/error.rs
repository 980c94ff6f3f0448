//! Atmosphere parameter errors.

/// Invalid planet or atmosphere parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AtmosphereError {
    /// Radii must satisfy `outer > inner > 0`.
    #[error("invalid radii: inner {inner}, outer {outer}")]
    InvalidRadii {
        /// Surface radius.
        inner: f32,
        /// Top of the atmosphere.
        outer: f32,
    },

    /// Every wavelength must be strictly positive.
    #[error("wavelength {channel} must be positive, got {value}")]
    NonPositiveWavelength {
        /// Colour channel index (0 = red).
        channel: usize,
        /// Offending value.
        value: f32,
    },

    /// The sun direction cannot be normalized.
    #[error("sun direction has zero length")]
    ZeroSunDirection,

    /// Average density altitude must be strictly positive.
    #[error("average density altitude must be positive, got {0}")]
    NonPositiveDensityAltitude(f32),
}
