//! Planet and atmosphere parameters shared by both scattering shells.

use glam::Vec3;

use crate::error::AtmosphereError;

/// Outer (atmosphere) radius as a multiple of the surface radius.
pub const OUTER_RADIUS_RATIO: f32 = 1.015;

/// Default Rayleigh scattering constant.
pub const DEFAULT_KR: f32 = 0.0025;

/// Default Mie scattering constant.
pub const DEFAULT_KM: f32 = 0.001;

/// Default Mie asymmetry factor. Negative values favour back-scattering.
pub const DEFAULT_G: f32 = -0.84;

/// Default altitude of average density, as a fraction of the shell thickness.
pub const DEFAULT_AVERAGE_DENSITY_ALTITUDE: f32 = 0.45;

/// Default red, green and blue wavelengths in micrometers.
pub const DEFAULT_WAVELENGTHS: [f32; 3] = [0.65, 0.57, 0.475];

/// Physical parameters of a planet and its atmosphere shell.
///
/// The planet is centred at the origin of the space in which camera and vertex
/// positions are expressed.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetParameters {
    /// Surface radius.
    pub inner_radius: f32,
    /// Top of the atmosphere.
    pub outer_radius: f32,
    /// Altitude of average density, as a fraction of the shell thickness.
    pub average_density_altitude: f32,
    /// Rayleigh scattering constant.
    pub kr: f32,
    /// Mie scattering constant.
    pub km: f32,
    /// Mie asymmetry factor.
    pub g: f32,
    /// Red, green and blue wavelengths in micrometers.
    pub wavelengths: [f32; 3],
    /// Sun intensity multiplier.
    pub sun_intensity: f32,
    /// Unit vector pointing from the planet towards the sun.
    pub sun_direction: Vec3,
}

impl PlanetParameters {
    /// Earth-like parameters for a planet of the given surface radius.
    pub fn earth_like(inner_radius: f32) -> Result<Self, AtmosphereError> {
        let params = Self {
            inner_radius,
            outer_radius: inner_radius * OUTER_RADIUS_RATIO,
            average_density_altitude: DEFAULT_AVERAGE_DENSITY_ALTITUDE,
            kr: DEFAULT_KR,
            km: DEFAULT_KM,
            g: DEFAULT_G,
            wavelengths: DEFAULT_WAVELENGTHS,
            sun_intensity: 1.0,
            sun_direction: Vec3::X,
        };
        params.validate()?;
        Ok(params)
    }

    /// Replace the sun direction, normalizing it.
    pub fn with_sun_direction(mut self, direction: Vec3) -> Result<Self, AtmosphereError> {
        self.sun_direction = direction
            .try_normalize()
            .ok_or(AtmosphereError::ZeroSunDirection)?;
        Ok(self)
    }

    /// Replace the sun intensity.
    pub fn with_sun_intensity(mut self, intensity: f32) -> Self {
        self.sun_intensity = intensity;
        self
    }

    /// Check the radius, wavelength and density invariants.
    pub fn validate(&self) -> Result<(), AtmosphereError> {
        if !(self.inner_radius > 0.0 && self.outer_radius > self.inner_radius) {
            return Err(AtmosphereError::InvalidRadii {
                inner: self.inner_radius,
                outer: self.outer_radius,
            });
        }
        for (channel, &value) in self.wavelengths.iter().enumerate() {
            if !(value > 0.0) {
                return Err(AtmosphereError::NonPositiveWavelength { channel, value });
            }
        }
        if !(self.average_density_altitude > 0.0) {
            return Err(AtmosphereError::NonPositiveDensityAltitude(
                self.average_density_altitude,
            ));
        }
        if self.sun_direction.length_squared() == 0.0 {
            return Err(AtmosphereError::ZeroSunDirection);
        }
        Ok(())
    }

    /// Atmosphere shell thickness, `outer - inner`.
    pub fn thickness(&self) -> f32 {
        self.outer_radius - self.inner_radius
    }

    /// Per-channel `1 / wavelength^4` Rayleigh weights.
    pub fn inv_wavelengths(&self) -> Vec3 {
        let [r, g, b] = self.wavelengths;
        Vec3::new(1.0 / r.powi(4), 1.0 / g.powi(4), 1.0 / b.powi(4))
    }

    /// Combined extinction weight `invW * Kr + Km` per channel.
    pub fn extinction(&self) -> Vec3 {
        self.inv_wavelengths() * self.kr + Vec3::splat(self.km)
    }
}
