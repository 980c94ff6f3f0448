//! Phase functions and the atmosphere shell's fragment colour.

use glam::{Vec3, Vec4};

use crate::scatter::SkyVertex;

/// Sky fragments whose view-angle term falls below this are dropped.
///
/// Keeps the shell from redrawing the disc that faces straight away from the
/// camera, which the planet covers anyway.
pub const DEFAULT_DISCARD_THRESHOLD: f32 = 0.8;

/// Rayleigh phase, `0.75 (1 + c^2)`.
pub fn rayleigh_phase(cosine: f32) -> f32 {
    0.75 * (1.0 + cosine * cosine)
}

/// Cornette-Shanks form of the Henyey-Greenstein Mie phase.
pub fn mie_phase(cosine: f32, g: f32) -> f32 {
    let g2 = g * g;
    1.5 * ((1.0 - g2) / (2.0 + g2)) * (1.0 + cosine * cosine)
        / (1.0 + g2 - 2.0 * g * cosine).powf(1.5)
}

/// Colour of an atmosphere fragment, or `None` when it is discarded.
///
/// Alpha follows the blue channel so that thin haze stays translucent.
pub fn shade_sky_fragment(
    vertex: &SkyVertex,
    sun_direction: Vec3,
    g: f32,
    discard_threshold: f32,
) -> Option<Vec4> {
    if vertex.view_angle < discard_threshold {
        return None;
    }
    let length = vertex.ray.length();
    let cosine = if length > 0.0 {
        sun_direction.dot(vertex.ray) / length
    } else {
        0.0
    };
    let color = rayleigh_phase(cosine) * vertex.rayleigh + mie_phase(cosine, g) * vertex.mie;
    Some(color.extend(color.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rayleigh_phase_is_even() {
        for c in [0.0_f32, 0.25, 0.5, 0.9, 1.0] {
            assert_eq!(rayleigh_phase(c), rayleigh_phase(-c));
        }
        assert!((rayleigh_phase(1.0) - 1.5).abs() < 1e-6);
        assert!((rayleigh_phase(0.0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_rayleigh_contribution_ignores_g() {
        let mut v = vertex(0.95);
        v.mie = Vec3::ZERO;
        let back = shade_sky_fragment(&v, Vec3::NEG_Z, -0.99, DEFAULT_DISCARD_THRESHOLD).unwrap();
        for g in [-0.5_f32, 0.0, 0.5, 0.99] {
            let other = shade_sky_fragment(&v, Vec3::NEG_Z, g, DEFAULT_DISCARD_THRESHOLD).unwrap();
            assert_eq!(back, other);
        }
    }

    #[test]
    fn test_mie_back_scatter_peaks_as_g_approaches_minus_one() {
        let gs = [0.9_f32, 0.5, 0.0, -0.5, -0.84, -0.95];
        let values: Vec<f32> = gs.iter().map(|&g| mie_phase(-1.0, g)).collect();
        for pair in values.windows(2) {
            assert!(pair[1] > pair[0], "{values:?}");
        }
    }

    #[test]
    fn test_mie_isotropic_when_g_zero() {
        // g = 0 reduces to 0.75 (1 + c^2), the Rayleigh shape.
        for c in [-1.0_f32, -0.3, 0.0, 0.6, 1.0] {
            assert!((mie_phase(c, 0.0) - rayleigh_phase(c)).abs() < 1e-6);
        }
    }

    fn vertex(view_angle: f32) -> SkyVertex {
        SkyVertex {
            rayleigh: Vec3::new(0.1, 0.2, 0.4),
            mie: Vec3::splat(0.05),
            view_angle,
            ray: Vec3::new(0.0, 0.0, 3.0),
        }
    }

    #[test]
    fn test_fragment_discarded_below_threshold() {
        assert!(shade_sky_fragment(&vertex(0.5), Vec3::X, -0.84, DEFAULT_DISCARD_THRESHOLD).is_none());
        assert!(shade_sky_fragment(&vertex(0.8), Vec3::X, -0.84, DEFAULT_DISCARD_THRESHOLD).is_some());
    }

    #[test]
    fn test_fragment_alpha_is_blue() {
        let color = shade_sky_fragment(&vertex(0.95), Vec3::Z, -0.84, DEFAULT_DISCARD_THRESHOLD)
            .unwrap();
        assert_eq!(color.w, color.z);
        let expected = rayleigh_phase(1.0) * 0.4 + mie_phase(1.0, -0.84) * 0.05;
        assert!((color.z - expected).abs() < 1e-6);
    }
}
