//! Atmospheric scattering for a planet seen from space.
//!
//! A small-sample Rayleigh + Mie approximation evaluated per vertex for two
//! shells: the ground (attenuation of surface colour plus in-scattered light)
//! and the atmosphere (its own Rayleigh and Mie colour). Both shells share
//! [`compute_scattering`]; an [`EvaluationContext`] selects the shell.
//!
//! [`GroundUniform`] and [`SkyUniform`] carry the same inputs to GPU shaders.

mod error;
mod params;
mod phase;
mod scatter;
mod uniform;

pub use error::AtmosphereError;
pub use params::{
    DEFAULT_AVERAGE_DENSITY_ALTITUDE, DEFAULT_G, DEFAULT_KM, DEFAULT_KR, DEFAULT_WAVELENGTHS,
    OUTER_RADIUS_RATIO, PlanetParameters,
};
pub use phase::{DEFAULT_DISCARD_THRESHOLD, mie_phase, rayleigh_phase, shade_sky_fragment};
pub use scatter::{
    DEFAULT_SAMPLE_COUNT, EvaluationContext, GROUND_AVERAGE_DENSITY_ALTITUDE, GroundVertex,
    Scattering, ScatteringSample, Shell, SkyVertex, atmosphere_entry_distance, compute_scattering,
    ground_vertex, scale, scattering_samples, sky_vertex,
};
pub use uniform::{GroundUniform, SkyUniform};
