//! Spherical coordinates in a Y-up frame.

use glam::Vec3;
use std::f32::consts::PI;

/// Margin kept between the polar angle and the poles.
pub const POLE_EPSILON: f32 = 1e-6;

/// Radius, polar angle from +Y and azimuth around +Y measured from +Z.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    /// Polar angle in `[0, PI]`.
    pub phi: f32,
    /// Azimuthal angle, `atan2(x, z)`.
    pub theta: f32,
}

impl Spherical {
    pub fn new(radius: f32, phi: f32, theta: f32) -> Self {
        Self { radius, phi, theta }
    }

    /// Coordinates of `v`. The zero vector maps to all zeros.
    pub fn from_vec3(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_vec3(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keep phi off the poles so the look-at frame stays defined.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(POLE_EPSILON, PI - POLE_EPSILON);
    }
}
