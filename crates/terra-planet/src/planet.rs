//! The planet: surface and atmosphere meshes, their materials, and the
//! per-frame uniform refresh.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use tracing::debug;

use terra_atmosphere::{
    EvaluationContext, GroundUniform, OUTER_RADIUS_RATIO, PlanetParameters, SkyUniform,
};
use terra_config::{PlanetConfig, SunConfig};

use crate::error::PlanetError;
use crate::geometry::{Mesh, uv_sphere};
use crate::material::{AtmosphereMaterial, SurfaceMaterial, SurfaceTextures};
use crate::shading::SurfaceStyle;

/// Default cloud shell radius as a multiple of the surface radius.
pub const DEFAULT_CLOUD_RADIUS_RATIO: f32 = 1.0005;

/// A point light standing in for the sun.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunLight {
    /// World position.
    pub position: Vec3,
    /// Intensity.
    pub intensity: f32,
}

impl From<&SunConfig> for SunLight {
    fn from(config: &SunConfig) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            intensity: config.intensity,
        }
    }
}

/// Look and scattering settings read every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetSettings {
    pub atmosphere_altitude_of_average_density: f32,
    pub atmosphere_g: f32,
    pub atmosphere_kr: f32,
    pub atmosphere_km: f32,
    pub wavelengths: [f32; 3],
    pub scattering_samples: u32,
    pub atmosphere_discard_threshold: f32,
    /// Cloud shell height above the surface.
    pub cloud_altitude: f32,
    pub clouds_cast_shadows: bool,
    pub shininess: f32,
    pub max_ground_altitude: f32,
    pub city_scale: f32,
    pub suburbs_scale: f32,
    pub night_contrast: f32,
    pub emissive_map_intensity: f32,
    pub cities_color: Vec3,
    pub color: Vec3,
    pub emissive: Vec3,
}

impl PlanetSettings {
    /// Settings from config. `cloud_altitude` there is a shell radius; here
    /// it becomes a height above the surface.
    pub fn from_config(config: &PlanetConfig) -> Self {
        let cloud_radius = config
            .cloud_altitude
            .unwrap_or(DEFAULT_CLOUD_RADIUS_RATIO * config.radius);
        Self {
            atmosphere_altitude_of_average_density: config.atmosphere_altitude_of_average_density,
            atmosphere_g: config.atmosphere_g,
            atmosphere_kr: config.atmosphere_kr,
            atmosphere_km: config.atmosphere_km,
            wavelengths: config.wavelengths,
            scattering_samples: config.scattering_samples,
            atmosphere_discard_threshold: config.atmosphere_discard_threshold,
            cloud_altitude: cloud_radius - config.radius,
            clouds_cast_shadows: config.clouds_cast_shadows,
            shininess: config.shininess,
            max_ground_altitude: config.max_ground_altitude,
            city_scale: config.city_scale,
            suburbs_scale: config.suburbs_scale,
            night_contrast: config.night_contrast,
            emissive_map_intensity: config.emissive_map_intensity,
            cities_color: Vec3::from_array(config.cities_color),
            color: Vec3::from_array(config.color),
            emissive: Vec3::from_array(config.emissive),
        }
    }
}

/// Surface shader inputs that are not part of the scattering model.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SurfaceUniform {
    /// Inverse of the planet's model matrix, for texture lookups. (offset 0)
    pub model_matrix_inverse: [[f32; 4]; 4],
    /// Albedo tint. (offset 64)
    pub color: [f32; 3],
    /// Specular power. (offset 76)
    pub shininess: f32,
    /// City light tint. (offset 80)
    pub cities_color: [f32; 3],
    /// City texture tiling. (offset 92)
    pub city_scale: f32,
    /// Emissive tint. (offset 96)
    pub emissive: [f32; 3],
    /// Suburbs mask tiling. (offset 108)
    pub suburbs_scale: f32,
    /// Cloud shell height above the surface. (offset 112)
    pub cloud_altitude: f32,
    /// Night emission exponent. (offset 116)
    pub night_contrast: f32,
    /// Night emission multiplier. (offset 120)
    pub emissive_map_intensity: f32,
    /// Bump map scale. (offset 124)
    pub max_ground_altitude: f32,
}

/// Everything the host uploads before drawing the planet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    /// Ground shell scattering inputs.
    pub ground: GroundUniform,
    /// Atmosphere shell scattering inputs.
    pub sky: SkyUniform,
    /// Remaining surface shader inputs.
    pub surface: SurfaceUniform,
}

/// A planet with its atmosphere shell.
///
/// `T` is the host's texture handle type.
#[derive(Clone, Debug)]
pub struct Planet<T> {
    /// World position of the planet centre.
    pub position: Vec3,
    /// Orientation of the surface textures.
    pub rotation: Quat,
    /// Light source.
    pub sun: SunLight,
    /// Tunables, read on every [`frame`](Self::frame).
    pub settings: PlanetSettings,
    radius: f32,
    surface_material: SurfaceMaterial<T>,
    atmosphere_material: AtmosphereMaterial,
    surface_mesh: Mesh,
    atmosphere_mesh: Mesh,
}

impl<T: Clone> Planet<T> {
    /// Build a planet at the origin.
    pub fn new(
        config: &PlanetConfig,
        textures: SurfaceTextures<T>,
        sun: SunLight,
    ) -> Result<Self, PlanetError> {
        let radius = config.radius;
        let surface_mesh = uv_sphere(radius, config.width_segments, config.height_segments)?;
        let atmosphere_mesh = uv_sphere(
            radius * OUTER_RADIUS_RATIO,
            config.width_segments,
            config.height_segments,
        )?;

        let mut surface_material =
            SurfaceMaterial::new(&textures, radius, config.clouds_cast_shadows);
        surface_material.bind_textures(&textures);

        let planet = Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            sun,
            settings: PlanetSettings::from_config(config),
            radius,
            surface_material,
            atmosphere_material: AtmosphereMaterial::new(radius),
            surface_mesh,
            atmosphere_mesh,
        };
        planet.scattering_parameters()?;

        debug!(
            radius,
            surface_vertices = planet.surface_mesh.vertex_count(),
            atmosphere_vertices = planet.atmosphere_mesh.vertex_count(),
            bump_map = planet.surface_material.use_bump_map,
            "Planet created"
        );
        Ok(planet)
    }

    /// Surface radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Ground shell material.
    pub fn surface_material(&self) -> &SurfaceMaterial<T> {
        &self.surface_material
    }

    /// Atmosphere shell material.
    pub fn atmosphere_material(&self) -> &AtmosphereMaterial {
        &self.atmosphere_material
    }

    /// Ground shell mesh.
    pub fn surface_mesh(&self) -> &Mesh {
        &self.surface_mesh
    }

    /// Atmosphere shell mesh.
    pub fn atmosphere_mesh(&self) -> &Mesh {
        &self.atmosphere_mesh
    }

    /// World transform of both shells.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Unit direction from the planet centre towards the sun.
    pub fn sun_direction(&self) -> Result<Vec3, PlanetError> {
        let parameters = self.scattering_parameters()?;
        Ok(parameters.sun_direction)
    }

    /// A world position relative to the planet centre.
    pub fn to_planet_space(&self, world: Vec3) -> Vec3 {
        world - self.position
    }

    /// Validated scattering parameters for the current settings and sun.
    pub fn scattering_parameters(&self) -> Result<PlanetParameters, PlanetError> {
        let mut parameters = PlanetParameters::earth_like(self.radius)?;
        parameters.average_density_altitude = self.settings.atmosphere_altitude_of_average_density;
        parameters.kr = self.settings.atmosphere_kr;
        parameters.km = self.settings.atmosphere_km;
        parameters.g = self.settings.atmosphere_g;
        parameters.wavelengths = self.settings.wavelengths;
        let parameters = parameters
            .with_sun_direction(self.sun.position - self.position)?
            .with_sun_intensity(self.sun.intensity);
        parameters.validate()?;
        Ok(parameters)
    }

    /// Surface style for CPU-side shading with [`shade_surface`](crate::shade_surface).
    pub fn surface_style(&self) -> SurfaceStyle {
        SurfaceStyle {
            color: self.settings.color,
            cities_color: self.settings.cities_color,
            shininess: self.settings.shininess,
            sun_intensity: self.sun.intensity,
            night_contrast: self.settings.night_contrast,
            emissive_map_intensity: self.settings.emissive_map_intensity,
            clouds_cast_shadows: self.surface_material.clouds_cast_shadows,
        }
    }

    /// Refresh every uniform for a camera at `camera_position` (world space).
    pub fn frame(&self, camera_position: Vec3) -> Result<FrameUniforms, PlanetError> {
        let parameters = self.scattering_parameters()?;
        let eye_height = (self.position - camera_position).length();
        let samples = self.settings.scattering_samples;

        let ground_ctx = EvaluationContext::ground().with_samples(samples);
        let sky_ctx = EvaluationContext::sky(&parameters).with_samples(samples);

        let settings = &self.settings;
        Ok(FrameUniforms {
            ground: GroundUniform::new(&parameters, eye_height, &ground_ctx),
            sky: SkyUniform::new(
                &parameters,
                eye_height,
                &sky_ctx,
                settings.atmosphere_discard_threshold,
            ),
            surface: SurfaceUniform {
                model_matrix_inverse: self.model_matrix().inverse().to_cols_array_2d(),
                color: settings.color.to_array(),
                shininess: settings.shininess,
                cities_color: settings.cities_color.to_array(),
                city_scale: settings.city_scale,
                emissive: settings.emissive.to_array(),
                suburbs_scale: settings.suburbs_scale,
                cloud_altitude: settings.cloud_altitude,
                night_contrast: settings.night_contrast,
                emissive_map_intensity: settings.emissive_map_intensity,
                max_ground_altitude: settings.max_ground_altitude,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_atmosphere::{AtmosphereError, GROUND_AVERAGE_DENSITY_ALTITUDE};

    fn textures() -> SurfaceTextures<u32> {
        SurfaceTextures {
            albedo_map: 1,
            bump_map: None,
            city_map: 2,
            city_mask: 3,
            cloud_map: 4,
            emissive_map: 5,
            specular_map: 6,
            suburbs_mask: 7,
        }
    }

    fn small_config() -> PlanetConfig {
        PlanetConfig {
            width_segments: 16,
            height_segments: 12,
            ..PlanetConfig::default()
        }
    }

    fn planet() -> Planet<u32> {
        let sun = SunLight {
            position: Vec3::new(25.0, 0.0, 0.0),
            intensity: 15.0,
        };
        Planet::new(&small_config(), textures(), sun).unwrap()
    }

    #[test]
    fn test_uniform_alignment() {
        assert_eq!(std::mem::size_of::<SurfaceUniform>() % 16, 0);
    }

    #[test]
    fn test_constructor_binds_suburbs_mask() {
        let planet = planet();
        assert_eq!(planet.surface_material().bindings.suburbs_mask, 7);
        assert!(!planet.surface_material().use_bump_map);
    }

    #[test]
    fn test_meshes_use_configured_segments() {
        let planet = planet();
        assert_eq!(planet.surface_mesh().vertex_count(), 17 * 13);
        let outer = planet.atmosphere_mesh().positions[0].length();
        assert!((outer - 5.0 * OUTER_RADIUS_RATIO).abs() < 1e-4);
    }

    #[test]
    fn test_frame_sun_and_eye() {
        let mut planet = planet();
        planet.position = Vec3::new(1.0, 0.0, 0.0);
        let frame = planet.frame(Vec3::new(1.0, 0.0, 12.0)).unwrap();
        assert_eq!(frame.ground.sun_direction, [1.0, 0.0, 0.0]);
        assert_eq!(frame.sky.sun_direction, frame.ground.sun_direction);
        assert!((frame.ground.eye_height - 12.0).abs() < 1e-5);
        assert_eq!(frame.ground.sun_intensity, 15.0);
    }

    #[test]
    fn test_frame_density_altitudes_differ_per_shell() {
        let frame = planet().frame(Vec3::new(0.0, 0.0, 10.0)).unwrap();
        assert_eq!(frame.ground.average_density_altitude, GROUND_AVERAGE_DENSITY_ALTITUDE);
        assert_eq!(frame.sky.average_density_altitude, 0.45);
        assert_eq!(frame.sky.g, -0.84);
        assert_eq!(frame.sky.discard_threshold, 0.8);
    }

    #[test]
    fn test_frame_reads_settings_each_time() {
        let mut planet = planet();
        planet.settings.atmosphere_kr = 0.005;
        planet.sun.intensity = 3.0;
        let frame = planet.frame(Vec3::new(0.0, 0.0, 10.0)).unwrap();
        assert_eq!(frame.ground.kr, 0.005);
        assert_eq!(frame.sky.sun_intensity, 3.0);
    }

    #[test]
    fn test_frame_model_inverse() {
        let mut planet = planet();
        planet.position = Vec3::new(0.0, 2.0, 0.0);
        planet.rotation = Quat::from_rotation_y(0.7);
        let frame = planet.frame(Vec3::new(0.0, 0.0, 10.0)).unwrap();
        let inverse = Mat4::from_cols_array_2d(&frame.surface.model_matrix_inverse);
        let roundtrip = inverse * planet.model_matrix();
        assert!(roundtrip.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn test_default_cloud_altitude() {
        let settings = PlanetSettings::from_config(&small_config());
        assert!((settings.cloud_altitude - 5.0 * 0.0005).abs() < 1e-6);
        let config = PlanetConfig {
            cloud_altitude: Some(5.1),
            ..small_config()
        };
        assert!((PlanetSettings::from_config(&config).cloud_altitude - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_sun_at_planet_centre_is_an_error() {
        let mut planet = planet();
        planet.sun.position = planet.position;
        assert_eq!(
            planet.frame(Vec3::new(0.0, 0.0, 10.0)),
            Err(PlanetError::Atmosphere(AtmosphereError::ZeroSunDirection))
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let sun = SunLight::from(&SunConfig::default());
        let config = PlanetConfig {
            width_segments: 2,
            ..small_config()
        };
        assert!(matches!(
            Planet::new(&config, textures(), sun),
            Err(PlanetError::InvalidSegments { .. })
        ));
        let config = PlanetConfig {
            radius: 0.0,
            ..small_config()
        };
        assert!(matches!(
            Planet::new(&config, textures(), sun),
            Err(PlanetError::Atmosphere(_))
        ));
    }

    #[test]
    fn test_surface_style_tracks_sun() {
        let mut planet = planet();
        planet.sun.intensity = 0.5;
        let style = planet.surface_style();
        assert_eq!(style.sun_intensity, 0.5);
        assert!(style.clouds_cast_shadows);
        assert_eq!(style.shininess, 125.0);
    }
}
