//! Per-fragment surface composite: day albedo, ocean glint, clouds and their
//! shadows, night-side emission, blended through the ground scattering terms.
//!
//! Texture sampling stays with the host. [`SurfaceUvs`], [`cloud_projection`]
//! and [`equirect_uv`] say where to sample; [`SurfaceTexels`] carries what was
//! read back.

use glam::{Mat4, Vec2, Vec3, Vec4};
use std::f32::consts::PI;

use terra_atmosphere::GroundVertex;

/// Offset applied to the specular lookup; the ocean mask is slightly
/// misaligned with the albedo map.
pub const SPECULAR_UV_OFFSET: Vec2 = Vec2::new(0.0, 0.0002);

/// Where each surface texture is sampled for a fragment with mesh UV `uv`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceUvs {
    /// Albedo, emissive, city mask and bump map.
    pub base: Vec2,
    /// Ocean mask.
    pub specular: Vec2,
    /// Tiled city lights.
    pub city: Vec2,
    /// Tiled suburbs mask, on a 2:1 grid.
    pub suburbs: Vec2,
}

impl SurfaceUvs {
    /// Texture coordinates for the given mesh UV and tiling factors.
    pub fn new(uv: Vec2, city_scale: f32, suburbs_scale: f32) -> Self {
        Self {
            base: uv,
            specular: uv + SPECULAR_UV_OFFSET,
            city: uv * city_scale,
            suburbs: Vec2::new(2.0, 1.0) * uv * suburbs_scale,
        }
    }
}

/// Texture values read for one fragment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceTexels {
    /// Albedo map colour.
    pub albedo: Vec4,
    /// Cloud map red channel above the fragment.
    pub clouds: f32,
    /// Cloud map red channel between the fragment and the sun.
    pub cloud_shadow: f32,
    /// Specular (ocean) mask.
    pub specular_mask: f32,
    /// Night-side ground emission.
    pub emissive: Vec4,
    /// City light detail.
    pub city: Vec4,
    /// Suburbs mask red channel.
    pub suburbs_mask: f32,
    /// City mask red channel.
    pub city_mask: f32,
}

/// Style values shared by every fragment of a planet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceStyle {
    /// Albedo tint.
    pub color: Vec3,
    /// City light tint.
    pub cities_color: Vec3,
    /// Specular power.
    pub shininess: f32,
    /// Sun intensity; day colour is scaled by `min(1, intensity)`.
    pub sun_intensity: f32,
    /// Exponent applied to night emission.
    pub night_contrast: f32,
    /// Multiplier on night emission.
    pub emissive_map_intensity: f32,
    /// Darken the ground under clouds.
    pub clouds_cast_shadows: bool,
}

/// GLSL `smoothstep`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Point where a ray leaving `point` along `direction` meets the cloud shell.
///
/// `point` sits `height` above a surface of radius `inner_radius`; the cloud
/// shell is `cloud_altitude` above the surface. Directions pointing below
/// the horizon are treated as horizontal.
pub fn cloud_projection(
    direction: Vec3,
    point: Vec3,
    inner_radius: f32,
    cloud_altitude: f32,
    height: f32,
) -> Vec3 {
    let cosine = point.normalize_or_zero().dot(direction).max(0.0);
    let r = inner_radius + height;
    let big_r = inner_radius + cloud_altitude;
    let under_root = (1.0 - (1.0 - cosine * cosine) * r * r / (big_r * big_r)).max(0.0);
    let length = under_root.sqrt() * big_r - cosine * r;
    point + direction * length
}

/// Equirectangular texture coordinates of a world-space point.
///
/// The point is taken into model space with `model_inverse` first, so the
/// lookup follows the planet's rotation. Points on the `z = 0` half-plane
/// take the `z > 0` branch; the poles map to `u = 0.5`.
pub fn equirect_uv(position: Vec3, model_inverse: &Mat4) -> Vec2 {
    let local = model_inverse.transform_point3(position).normalize_or_zero();
    if local == Vec3::ZERO {
        return Vec2::splat(0.5);
    }
    let y = local.y.clamp(-1.0, 1.0);
    let v = y.asin() / PI + 0.5;
    let ring = (1.0 - y * y).sqrt();
    if ring <= f32::EPSILON {
        return Vec2::new(0.5, v);
    }
    let sign = if local.z < 0.0 { -1.0 } else { 1.0 };
    let u = -(local.x / ring).clamp(-1.0, 1.0).acos() / PI / 2.0 * sign + 0.5;
    Vec2::new(u, v)
}

/// Final fragment colour of the ground shell.
pub fn shade_surface(
    texels: &SurfaceTexels,
    ground: &GroundVertex,
    sun_direction: Vec3,
    style: &SurfaceStyle,
) -> Vec4 {
    let normal = ground.normal;
    let clouds = texels.clouds;

    let half_vector = (sun_direction + ground.world_eye).normalize_or_zero();
    let specular = 0.6
        * normal.dot(half_vector).max(0.0).powf(style.shininess)
        * texels.specular_mask
        * (1.0 - clouds);

    let mut albedo = texels.albedo * style.color.extend(1.0);
    albedo += Vec4::splat(specular);
    if style.clouds_cast_shadows {
        let lit = smoothstep(0.0, 1.0, (normal.dot(sun_direction) * 20.0).max(0.0));
        albedo *= 1.0 - lit * texels.cloud_shadow;
    }
    albedo += Vec4::splat(clouds);
    albedo *= style.sun_intensity.min(1.0);

    let cities = style.cities_color.extend(1.0)
        * (1.0 - texels.specular_mask)
        * texels.city
        * (texels.suburbs_mask + 0.3)
        * (texels.city_mask * 4.0);

    let mut emission = (texels.emissive + cities) * (1.0 - clouds);
    emission += 0.3 * clouds * Vec4::new(0.7, 0.7, 1.0, 1.0);
    let contrast = style.night_contrast;
    let emission = Vec4::new(
        emission.x.powf(contrast),
        emission.y.powf(contrast),
        emission.z.powf(contrast),
        emission.w,
    ) * style.emissive_map_intensity
        * normal.dot(ground.world_eye);

    let weight = ground.attenuation.extend(1.0);
    let outgoing = emission + (albedo - emission) * weight;
    ground.inscatter.extend(1.0) + outgoing
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn style() -> SurfaceStyle {
        SurfaceStyle {
            color: Vec3::ONE,
            cities_color: Vec3::new(1.0, 0.647, 0.298),
            shininess: 125.0,
            sun_intensity: 15.0,
            night_contrast: 1.0,
            emissive_map_intensity: 1.0,
            clouds_cast_shadows: true,
        }
    }

    fn dark_texels() -> SurfaceTexels {
        SurfaceTexels {
            albedo: Vec4::new(0.2, 0.4, 0.1, 1.0),
            clouds: 0.0,
            cloud_shadow: 0.0,
            specular_mask: 0.0,
            emissive: Vec4::ZERO,
            city: Vec4::ZERO,
            suburbs_mask: 0.0,
            city_mask: 0.0,
        }
    }

    fn ground(attenuation: Vec3) -> GroundVertex {
        GroundVertex {
            attenuation,
            inscatter: Vec3::ZERO,
            normal: Vec3::Z,
            world_eye: Vec3::Z,
        }
    }

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_full_attenuation_shows_day_side() {
        let color = shade_surface(&dark_texels(), &ground(Vec3::ONE), Vec3::X, &style());
        // Intensity above 1 is clamped, no specular on land.
        assert!((color.x - 0.2).abs() < 1e-6);
        assert!((color.y - 0.4).abs() < 1e-6);
        assert!((color.w - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_attenuation_shows_emission() {
        let mut texels = dark_texels();
        texels.emissive = Vec4::new(0.1, 0.1, 0.05, 1.0);
        let color = shade_surface(&texels, &ground(Vec3::ZERO), Vec3::NEG_Z, &style());
        // Alpha is always fully weighted towards the day side.
        assert!((color.x - 0.1).abs() < 1e-6);
        assert!((color.z - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_city_lights_need_both_masks() {
        let mut texels = dark_texels();
        texels.city = Vec4::ONE;
        texels.suburbs_mask = 1.0;
        let unlit = shade_surface(&texels, &ground(Vec3::ZERO), Vec3::NEG_Z, &style());
        assert!(unlit.x.abs() < 1e-6);

        texels.city_mask = 0.5;
        let lit = shade_surface(&texels, &ground(Vec3::ZERO), Vec3::NEG_Z, &style());
        // 1.3 suburbs weight, 2.0 from the city mask.
        assert!((lit.x - 1.3 * 2.0).abs() < 1e-5);
        assert!((lit.y - 0.647 * 1.3 * 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_oceans_have_no_city_lights() {
        let mut texels = dark_texels();
        texels.city = Vec4::ONE;
        texels.city_mask = 1.0;
        texels.specular_mask = 1.0;
        let color = shade_surface(&texels, &ground(Vec3::ZERO), Vec3::NEG_Z, &style());
        assert!(color.x.abs() < 1e-6);
    }

    #[test]
    fn test_specular_highlight_on_oceans() {
        let mut texels = dark_texels();
        texels.specular_mask = 1.0;
        let land = shade_surface(&dark_texels(), &ground(Vec3::ONE), Vec3::Z, &style());
        let ocean = shade_surface(&texels, &ground(Vec3::ONE), Vec3::Z, &style());
        assert!((ocean.x - land.x - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_cloud_shadow_darkens_lit_ground() {
        let mut texels = dark_texels();
        texels.cloud_shadow = 1.0;
        let shadowed = shade_surface(&texels, &ground(Vec3::ONE), Vec3::Z, &style());
        let mut no_shadows = style();
        no_shadows.clouds_cast_shadows = false;
        let plain = shade_surface(&texels, &ground(Vec3::ONE), Vec3::Z, &no_shadows);
        assert!(shadowed.y < plain.y);
        assert!(shadowed.y.abs() < 1e-6);
    }

    #[test]
    fn test_night_clouds_glow() {
        let mut texels = dark_texels();
        texels.clouds = 1.0;
        let color = shade_surface(&texels, &ground(Vec3::ZERO), Vec3::NEG_Z, &style());
        assert!((color.x - 0.21).abs() < 1e-6);
        assert!((color.z - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_cloud_projection_straight_up() {
        let point = Vec3::new(0.0, 0.0, 5.0);
        let hit = cloud_projection(Vec3::Z, point, 5.0, 0.0025, 0.0);
        assert!((hit - Vec3::new(0.0, 0.0, 5.0025)).length() < 1e-5);
    }

    #[test]
    fn test_cloud_projection_lands_on_cloud_shell() {
        let point = Vec3::new(0.0, 0.0, 5.0);
        let direction = Vec3::new(1.0, 0.0, 1.0).normalize();
        let hit = cloud_projection(direction, point, 5.0, 0.1, 0.0);
        assert!((hit.length() - 5.1).abs() < 1e-4);
    }

    #[test]
    fn test_equirect_uv_reference_points() {
        let identity = Mat4::IDENTITY;
        let front = equirect_uv(Vec3::new(0.0, 0.0, 5.0), &identity);
        assert!((front - Vec2::new(0.25, 0.5)).length() < 1e-6);
        let back = equirect_uv(Vec3::new(0.0, 0.0, -5.0), &identity);
        assert!((back - Vec2::new(0.75, 0.5)).length() < 1e-6);
        let north = equirect_uv(Vec3::new(0.0, 5.0, 0.0), &identity);
        assert!((north - Vec2::new(0.5, 1.0)).length() < 1e-6);
        let seam = equirect_uv(Vec3::new(-5.0, 0.0, 0.0), &identity);
        assert!((seam.x - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_equirect_uv_follows_model_rotation() {
        let model = Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let inverse = model.inverse();
        let local = Vec3::new(0.0, 0.0, 5.0);
        let world = model.transform_point3(local);
        let uv = equirect_uv(world, &inverse);
        assert!((uv - equirect_uv(local, &Mat4::IDENTITY)).length() < 1e-5);
    }

    #[test]
    fn test_surface_uvs_tiling() {
        let uvs = SurfaceUvs::new(Vec2::new(0.5, 0.25), 200.0, 80.0);
        assert_eq!(uvs.city, Vec2::new(100.0, 50.0));
        assert_eq!(uvs.suburbs, Vec2::new(80.0, 20.0));
        assert!((uvs.specular - Vec2::new(0.5, 0.2502)).length() < 1e-6);
    }
}
