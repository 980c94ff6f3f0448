//! Planet assembly errors.

use terra_atmosphere::AtmosphereError;

/// Errors raised while building a [`Planet`](crate::Planet).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanetError {
    /// Scattering parameters failed validation.
    #[error("invalid atmosphere: {0}")]
    Atmosphere(#[from] AtmosphereError),

    /// A UV sphere needs at least 3 segments around and 2 from pole to pole.
    #[error("sphere needs at least 3x2 segments, got {width}x{height}")]
    InvalidSegments {
        /// Segments around the equator.
        width: u32,
        /// Segments from pole to pole.
        height: u32,
    },
}
