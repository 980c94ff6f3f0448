//! Per-vertex scattering integral shared by the ground and sky shells.
//!
//! Positions are relative to the planet centre. The integral is a fixed-step
//! Riemann sum between the point where the view ray enters the atmosphere and
//! the shaded vertex, using an empirical curve for the optical depth towards
//! the sun and the camera.

use glam::Vec3;
use std::f32::consts::PI;

use crate::params::PlanetParameters;

/// Integration steps per shaded vertex.
///
/// Raising this changes the look of the planet; it is a tunable, not a quality knob.
pub const DEFAULT_SAMPLE_COUNT: u32 = 3;

/// Average density altitude baked into the ground shell.
///
/// The ground shell does not follow the configurable altitude used by the sky.
pub const GROUND_AVERAGE_DENSITY_ALTITUDE: f32 = 1.0;

/// Which shell a scattering evaluation shades.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shell {
    /// The planet surface: light reflected by the ground, dimmed and tinted.
    Ground,
    /// The atmosphere shell's own glow.
    Sky,
}

/// Inputs that differ between the two shells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvaluationContext {
    /// Shell being shaded.
    pub shell: Shell,
    /// Number of integration steps (at least 1).
    pub samples: u32,
    /// Average density altitude used by [`scale`] and the density falloff.
    pub average_density_altitude: f32,
}

impl EvaluationContext {
    /// Ground shell with the default sample count.
    pub fn ground() -> Self {
        Self {
            shell: Shell::Ground,
            samples: DEFAULT_SAMPLE_COUNT,
            average_density_altitude: GROUND_AVERAGE_DENSITY_ALTITUDE,
        }
    }

    /// Sky shell using the planet's configured average density altitude.
    pub fn sky(params: &PlanetParameters) -> Self {
        Self {
            shell: Shell::Sky,
            samples: DEFAULT_SAMPLE_COUNT,
            average_density_altitude: params.average_density_altitude,
        }
    }

    /// Override the number of integration steps.
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples.max(1);
        self
    }
}

/// One integration step along the view ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatteringSample {
    /// Distance of the sample point from the planet centre.
    pub height: f32,
    /// Relative air density at the sample, `exp((inner - height) / (thickness * altitude))`.
    pub depth: f32,
    /// Scatter exponent (optical depth towards sun and camera) at the sample.
    pub optical_depth: f32,
    /// Per-channel transmittance at the sample.
    pub attenuation: Vec3,
}

/// Result of one scattering evaluation.
///
/// The ground shell consumes `attenuation` and [`Scattering::inscatter`];
/// the sky shell consumes `rayleigh` and `mie`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scattering {
    /// Transmittance of the last integration step, how much surface colour survives.
    pub attenuation: Vec3,
    /// Rayleigh-weighted in-scattered light, `sum * invW * Kr * sunIntensity`.
    pub rayleigh: Vec3,
    /// Mie in-scattered light, `sum * Km * sunIntensity`.
    pub mie: Vec3,
}

impl Scattering {
    /// Total additive in-scattering, `sum * sunIntensity * (invW * Kr + Km)`.
    pub fn inscatter(&self) -> Vec3 {
        self.rayleigh + self.mie
    }
}

/// Ground-shell vertex outputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundVertex {
    /// Transmittance applied to the lit surface colour.
    pub attenuation: Vec3,
    /// Light added on top of the surface colour.
    pub inscatter: Vec3,
    /// Unit surface normal (direction from the planet centre).
    pub normal: Vec3,
    /// Unit direction from the vertex to the camera.
    pub world_eye: Vec3,
}

/// Sky-shell vertex outputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyVertex {
    /// Rayleigh colour of the shell.
    pub rayleigh: Vec3,
    /// Mie colour of the shell.
    pub mie: Vec3,
    /// `1 - dot(normal, eye)`; small values face straight away from the camera.
    pub view_angle: f32,
    /// Vector from the vertex to the camera (not normalized).
    pub ray: Vec3,
}

/// Empirical optical-depth curve as a function of the angle cosine.
pub fn scale(cosine: f32, average_density_altitude: f32) -> f32 {
    let x = 1.0 - cosine;
    average_density_altitude * (-0.00287 + x * (0.459 + x * (3.83 + x * (-6.80 + x * 5.25)))).exp()
}

/// Distance along `ray` from `camera` to where it enters the outer sphere.
///
/// Solves `|camera + t ray| = outer_radius` for the nearer root. A negative
/// discriminant (the ray misses the shell) is clamped to zero, which yields
/// the point of closest approach.
pub fn atmosphere_entry_distance(
    camera: Vec3,
    ray: Vec3,
    eye_height: f32,
    outer_radius: f32,
) -> f32 {
    let b = 2.0 * camera.dot(ray);
    let c = eye_height * eye_height - outer_radius * outer_radius;
    let det = (b * b - 4.0 * c).max(0.0);
    0.5 * (-b - det.sqrt())
}

/// Shell-specific terms of the scatter exponent.
enum Exponent {
    Ground { temp: f32, camera_offset: f32 },
    Sky { start_offset: f32, sun: Vec3, ray: Vec3, altitude: f32 },
}

impl Exponent {
    fn at(&self, point: Vec3, height: f32, depth: f32) -> f32 {
        match *self {
            Exponent::Ground {
                temp,
                camera_offset,
            } => depth * temp - camera_offset,
            Exponent::Sky {
                start_offset,
                sun,
                ray,
                altitude,
            } => {
                let light_angle = sun.dot(point) / height;
                let camera_angle = ray.dot(point) / height;
                start_offset + depth * (scale(light_angle, altitude) - scale(camera_angle, altitude))
            }
        }
    }
}

/// Walk the view ray and hand every step to `visit`. Returns the weighted sum.
fn march(
    camera: Vec3,
    sun_dir: Vec3,
    vertex: Vec3,
    params: &PlanetParameters,
    ctx: &EvaluationContext,
    mut visit: impl FnMut(ScatteringSample),
) -> Vec3 {
    let to_vertex = vertex - camera;
    let mut far = to_vertex.length();
    let ray = if far > 0.0 {
        to_vertex / far
    } else {
        Vec3::ZERO
    };

    let near = atmosphere_entry_distance(camera, ray, camera.length(), params.outer_radius);
    let start = camera + ray * near;
    far -= near;

    let thickness = params.thickness();
    let altitude = ctx.average_density_altitude;

    let exponent = match ctx.shell {
        Shell::Ground => {
            let normal = vertex.normalize_or_zero();
            let camera_scale = scale((-ray).dot(normal), altitude);
            let light_scale = scale(sun_dir.dot(normal), altitude);
            Exponent::Ground {
                temp: light_scale + camera_scale,
                camera_offset: (-thickness / altitude).exp() * camera_scale,
            }
        }
        Shell::Sky => {
            let start_angle = ray.dot(start) / params.outer_radius;
            Exponent::Sky {
                start_offset: (-1.0 / altitude).exp() * scale(start_angle, altitude),
                sun: sun_dir,
                ray,
                altitude,
            }
        }
    };

    let extinction = params.extinction() * 4.0 * PI;
    let samples = ctx.samples.max(1);
    let sample_length = far / samples as f32;
    let scaled_length = sample_length / thickness;
    let sample_ray = ray * sample_length;
    let mut sample_point = start + sample_ray * 0.5;

    let mut sum = Vec3::ZERO;
    for _ in 0..samples {
        let height = sample_point.length();
        let depth = ((params.inner_radius - height) / (thickness * altitude)).exp();
        let optical_depth = exponent.at(sample_point, height, depth);
        let attenuation = exp3(-optical_depth * extinction);

        sum += attenuation * depth * scaled_length;
        visit(ScatteringSample {
            height,
            depth,
            optical_depth,
            attenuation,
        });
        sample_point += sample_ray;
    }
    sum
}

fn exp3(v: Vec3) -> Vec3 {
    Vec3::new(v.x.exp(), v.y.exp(), v.z.exp())
}

/// Evaluate the scattering integral for one vertex.
///
/// `camera` and `vertex` are relative to the planet centre; `sun_dir` is a
/// unit vector towards the sun.
pub fn compute_scattering(
    camera: Vec3,
    sun_dir: Vec3,
    vertex: Vec3,
    params: &PlanetParameters,
    ctx: &EvaluationContext,
) -> Scattering {
    let mut attenuation = Vec3::ZERO;
    let sum = march(camera, sun_dir, vertex, params, ctx, |sample| {
        attenuation = sample.attenuation;
    });

    let light = sum * params.sun_intensity;
    Scattering {
        attenuation,
        rayleigh: light * params.inv_wavelengths() * params.kr,
        mie: light * params.km,
    }
}

/// The individual integration steps of [`compute_scattering`], in ray order.
pub fn scattering_samples(
    camera: Vec3,
    sun_dir: Vec3,
    vertex: Vec3,
    params: &PlanetParameters,
    ctx: &EvaluationContext,
) -> Vec<ScatteringSample> {
    let mut samples = Vec::with_capacity(ctx.samples.max(1) as usize);
    march(camera, sun_dir, vertex, params, ctx, |sample| samples.push(sample));
    samples
}

/// Ground-shell evaluation for a surface vertex, lit by `params.sun_direction`.
pub fn ground_vertex(
    camera: Vec3,
    vertex: Vec3,
    params: &PlanetParameters,
    samples: u32,
) -> GroundVertex {
    let ctx = EvaluationContext::ground().with_samples(samples);
    let scattering = compute_scattering(camera, params.sun_direction, vertex, params, &ctx);
    GroundVertex {
        attenuation: scattering.attenuation,
        inscatter: scattering.inscatter(),
        normal: vertex.normalize_or_zero(),
        world_eye: (camera - vertex).normalize_or_zero(),
    }
}

/// Sky-shell evaluation for a vertex of the atmosphere sphere.
pub fn sky_vertex(
    camera: Vec3,
    vertex: Vec3,
    params: &PlanetParameters,
    samples: u32,
) -> SkyVertex {
    let ctx = EvaluationContext::sky(params).with_samples(samples);
    let scattering = compute_scattering(camera, params.sun_direction, vertex, params, &ctx);
    let eye = (vertex - camera).normalize_or_zero();
    SkyVertex {
        rayleigh: scattering.rayleigh,
        mie: scattering.mie,
        view_angle: 1.0 - vertex.normalize_or_zero().dot(eye),
        ray: camera - vertex,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(sun: Vec3) -> PlanetParameters {
        PlanetParameters::earth_like(5.0)
            .unwrap()
            .with_sun_direction(sun)
            .unwrap()
            .with_sun_intensity(15.0)
    }

    fn is_finite_non_negative(v: Vec3) -> bool {
        v.is_finite() && v.min_element() >= 0.0
    }

    #[test]
    fn test_scale_at_zenith_is_near_altitude() {
        let s = scale(1.0, 1.0);
        assert!((s - (-0.00287_f32).exp()).abs() < 1e-6);
        assert!((scale(1.0, 0.5) - 0.5 * s).abs() < 1e-6);
    }

    #[test]
    fn test_scale_grows_towards_horizon() {
        assert!(scale(0.0, 1.0) > scale(0.5, 1.0));
        assert!(scale(0.5, 1.0) > scale(1.0, 1.0));
    }

    #[test]
    fn test_entry_distance_straight_down() {
        let camera = Vec3::new(0.0, 0.0, 15.0);
        let near = atmosphere_entry_distance(camera, Vec3::NEG_Z, 15.0, 5.075);
        assert!((near - (15.0 - 5.075)).abs() < 1e-4);
    }

    #[test]
    fn test_entry_distance_miss_falls_back_to_closest_approach() {
        let camera = Vec3::new(0.0, 0.0, 15.0);
        let ray = Vec3::new(1.0, 0.0, -1.0).normalize();
        // Closest approach to the origin is 15 / sqrt(2) > outer radius.
        let near = atmosphere_entry_distance(camera, ray, 15.0, 5.075);
        let closest = camera.dot(-ray);
        assert!((near - closest).abs() < 1e-4);
        assert!(near.is_finite());
    }

    #[test]
    fn test_ground_outputs_finite_non_negative_from_outside() {
        let suns = [Vec3::X, Vec3::Z, Vec3::new(-1.0, 1.0, 0.5), Vec3::NEG_Z];
        let cameras = [
            Vec3::new(0.0, 0.0, 5.075),
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(3.0, 4.0, 12.0),
        ];
        for sun in suns {
            let p = params(sun);
            let ctx = EvaluationContext::ground();
            for camera in cameras {
                // Points on the visible cap of the planet.
                for (dx, dy) in [(0.0, 0.0), (0.3, 0.0), (0.0, -0.4), (0.2, 0.2)] {
                    let dir = (camera.normalize() + Vec3::new(dx, dy, 0.0)).normalize();
                    let vertex = dir * p.inner_radius;
                    let s = compute_scattering(camera, p.sun_direction, vertex, &p, &ctx);
                    assert!(is_finite_non_negative(s.attenuation), "{s:?}");
                    assert!(is_finite_non_negative(s.inscatter()), "{s:?}");
                }
            }
        }
    }

    #[test]
    fn test_ground_uses_fixed_sample_count() {
        let p = params(Vec3::Z);
        let camera = Vec3::new(0.0, 0.0, 15.0);
        let vertex = Vec3::new(0.0, 0.0, 5.0);
        let steps = scattering_samples(camera, Vec3::Z, vertex, &p, &EvaluationContext::ground());
        assert_eq!(steps.len(), DEFAULT_SAMPLE_COUNT as usize);
        for step in &steps {
            assert!(step.height >= p.inner_radius - 1e-4);
            assert!(step.height <= p.outer_radius + 1e-4);
        }
        // Marching towards the ground, air gets denser.
        assert!(steps[0].depth < steps[2].depth);
    }

    #[test]
    fn test_attenuation_is_last_sample() {
        let p = params(Vec3::Z);
        let camera = Vec3::new(0.0, 2.0, 15.0);
        let vertex = Vec3::new(0.0, 1.0, 4.9).normalize() * 5.0;
        let ctx = EvaluationContext::ground();
        let steps = scattering_samples(camera, Vec3::Z, vertex, &p, &ctx);
        let s = compute_scattering(camera, Vec3::Z, vertex, &p, &ctx);
        assert_eq!(s.attenuation, steps[2].attenuation);
    }

    #[test]
    fn test_blue_is_attenuated_more_than_red() {
        let p = params(Vec3::Z);
        let g = ground_vertex(Vec3::new(0.0, 0.0, 15.0), Vec3::new(0.0, 0.0, 5.0), &p, 3);
        assert!(g.attenuation.z < g.attenuation.x);
        assert!(g.inscatter.z > g.inscatter.x);
    }

    #[test]
    fn test_low_sun_dims_surface() {
        let camera = Vec3::new(0.0, 0.0, 15.0);
        let vertex = Vec3::new(0.0, 0.0, 5.0);
        let noon = ground_vertex(camera, vertex, &params(Vec3::Z), 3);
        let dusk = ground_vertex(camera, vertex, &params(Vec3::X), 3);
        assert!(dusk.attenuation.x < noon.attenuation.x);
        assert!(dusk.attenuation.z < noon.attenuation.z);
    }

    #[test]
    fn test_ground_vertex_directions() {
        let p = params(Vec3::Z);
        let g = ground_vertex(Vec3::new(0.0, 0.0, 15.0), Vec3::new(0.0, 5.0, 0.0), &p, 3);
        assert!((g.normal - Vec3::Y).length() < 1e-6);
        assert!((g.world_eye.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_inscatter_splits_into_rayleigh_and_mie() {
        let p = params(Vec3::Z);
        let camera = Vec3::new(0.0, 0.0, 15.0);
        let vertex = Vec3::new(0.0, 0.0, 5.0);
        let s = compute_scattering(camera, Vec3::Z, vertex, &p, &EvaluationContext::ground());
        let expected_ratio = p.inv_wavelengths().x * p.kr / p.km;
        assert!((s.rayleigh.x / s.mie.x - expected_ratio).abs() / expected_ratio < 1e-4);
    }

    #[test]
    fn test_sky_vertex_outputs_finite_non_negative() {
        let p = params(Vec3::X);
        let camera = Vec3::new(0.0, 0.0, 15.0);
        // Back side of the shell, just past the limb.
        let angle = 80.0_f32.to_radians();
        let vertex = Vec3::new(angle.sin(), 0.0, angle.cos()) * p.outer_radius;
        let sky = sky_vertex(camera, vertex, &p, DEFAULT_SAMPLE_COUNT);
        assert!(is_finite_non_negative(sky.rayleigh));
        assert!(is_finite_non_negative(sky.mie));
        assert!(sky.rayleigh.z > sky.rayleigh.x);
        assert!(sky.view_angle > 0.8 && sky.view_angle < 1.0);
        assert_eq!(sky.ray, camera - vertex);
    }

    #[test]
    fn test_sky_view_angle_behind_planet() {
        let p = params(Vec3::X);
        let camera = Vec3::new(0.0, 0.0, 15.0);
        let vertex = Vec3::new(0.0, 0.0, -p.outer_radius);
        let sky = sky_vertex(camera, vertex, &p, DEFAULT_SAMPLE_COUNT);
        assert!(sky.view_angle.abs() < 1e-6);
    }

    #[test]
    fn test_sky_context_uses_configured_altitude() {
        let mut p = params(Vec3::X);
        p.average_density_altitude = 0.25;
        assert_eq!(EvaluationContext::sky(&p).average_density_altitude, 0.25);
        assert_eq!(
            EvaluationContext::ground().average_density_altitude,
            GROUND_AVERAGE_DENSITY_ALTITUDE
        );
    }

    #[test]
    fn test_more_samples_change_result() {
        let p = params(Vec3::Z);
        let camera = Vec3::new(0.0, 0.0, 15.0);
        let vertex = Vec3::new(0.0, 3.0, 4.0);
        let three = compute_scattering(camera, Vec3::Z, vertex, &p, &EvaluationContext::ground());
        let ten = compute_scattering(
            camera,
            Vec3::Z,
            vertex,
            &p,
            &EvaluationContext::ground().with_samples(10),
        );
        assert_ne!(three, ten);
        assert_eq!(EvaluationContext::ground().with_samples(0).samples, 1);
    }

    #[test]
    fn test_zero_length_ray_stays_finite() {
        let p = params(Vec3::Z);
        let point = Vec3::new(0.0, 0.0, 5.0);
        let s = compute_scattering(point, Vec3::Z, point, &p, &EvaluationContext::ground());
        assert!(s.attenuation.is_finite());
        assert!(s.inscatter().is_finite());
    }
}
