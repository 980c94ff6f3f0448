//! GPU uniform blocks for the ground and sky shaders.
//!
//! WGSL alignment rules: `vec3<f32>` has 16-byte alignment, so each vec3 is
//! followed by a scalar that fills its last four bytes.

use bytemuck::{Pod, Zeroable};

use crate::params::PlanetParameters;
use crate::scatter::EvaluationContext;

/// Scattering inputs of the ground (surface) shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GroundUniform {
    /// Unit direction towards the sun. (offset 0)
    pub sun_direction: [f32; 3],
    /// Sun intensity. (offset 12)
    pub sun_intensity: f32,
    /// Per-channel `1 / wavelength^4`. (offset 16)
    pub inv_wavelengths: [f32; 3],
    /// Camera distance from the planet centre. (offset 28)
    pub eye_height: f32,
    /// Surface radius. (offset 32)
    pub inner_radius: f32,
    /// Atmosphere radius. (offset 36)
    pub outer_radius: f32,
    /// Rayleigh constant. (offset 40)
    pub kr: f32,
    /// Mie constant. (offset 44)
    pub km: f32,
    /// Average density altitude of the ground shell. (offset 48)
    pub average_density_altitude: f32,
    /// Integration steps. (offset 52)
    pub sample_count: u32,
    /// Padding to 64 bytes. (offset 56)
    pub _padding: [f32; 2],
}

impl GroundUniform {
    /// Build from planet parameters and the current eye height.
    pub fn new(params: &PlanetParameters, eye_height: f32, ctx: &EvaluationContext) -> Self {
        Self {
            sun_direction: params.sun_direction.to_array(),
            sun_intensity: params.sun_intensity,
            inv_wavelengths: params.inv_wavelengths().to_array(),
            eye_height,
            inner_radius: params.inner_radius,
            outer_radius: params.outer_radius,
            kr: params.kr,
            km: params.km,
            average_density_altitude: ctx.average_density_altitude,
            sample_count: ctx.samples,
            _padding: [0.0; 2],
        }
    }
}

/// Scattering inputs of the atmosphere shell shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SkyUniform {
    /// Unit direction towards the sun. (offset 0)
    pub sun_direction: [f32; 3],
    /// Sun intensity. (offset 12)
    pub sun_intensity: f32,
    /// Per-channel `1 / wavelength^4`. (offset 16)
    pub inv_wavelengths: [f32; 3],
    /// Camera distance from the planet centre. (offset 28)
    pub eye_height: f32,
    /// Surface radius. (offset 32)
    pub inner_radius: f32,
    /// Atmosphere radius. (offset 36)
    pub outer_radius: f32,
    /// Rayleigh constant. (offset 40)
    pub kr: f32,
    /// Mie constant. (offset 44)
    pub km: f32,
    /// Average density altitude. (offset 48)
    pub average_density_altitude: f32,
    /// Mie asymmetry factor. (offset 52)
    pub g: f32,
    /// Integration steps. (offset 56)
    pub sample_count: u32,
    /// Fragment discard threshold on the view-angle term. (offset 60)
    pub discard_threshold: f32,
}

impl SkyUniform {
    /// Build from planet parameters and the current eye height.
    pub fn new(
        params: &PlanetParameters,
        eye_height: f32,
        ctx: &EvaluationContext,
        discard_threshold: f32,
    ) -> Self {
        Self {
            sun_direction: params.sun_direction.to_array(),
            sun_intensity: params.sun_intensity,
            inv_wavelengths: params.inv_wavelengths().to_array(),
            eye_height,
            inner_radius: params.inner_radius,
            outer_radius: params.outer_radius,
            kr: params.kr,
            km: params.km,
            average_density_altitude: ctx.average_density_altitude,
            g: params.g,
            sample_count: ctx.samples,
            discard_threshold,
        }
    }
}
