//! Camera with view and projection matrix generation.

use glam::{Mat3, Mat4, Quat, Vec3};

use terra_config::CameraConfig;

/// A camera that the orbit controller moves around its target.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// World position.
    pub position: Vec3,
    /// Rotation as a unit quaternion. The camera looks down its local -Z.
    pub rotation: Quat,
    /// World-space up hint used by [`look_at`](Self::look_at).
    pub up: Vec3,
    /// Orthographic magnification. Perspective projections ignore it.
    pub zoom: f32,
    /// Projection parameters.
    pub projection: Projection,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

/// Projection type for the camera.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Perspective projection.
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
        /// Width / height.
        aspect_ratio: f32,
    },
    /// Orthographic projection over an explicit view volume, before zoom.
    Orthographic {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
    },
    /// Host-supplied matrix. The orbit controller cannot pan or dolly it.
    Custom(Mat4),
}

impl Camera {
    /// Perspective camera from config, placed on +Z at the start distance.
    pub fn from_config(config: &CameraConfig, aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, config.start_distance),
            projection: Projection::Perspective {
                fov_y: config.fov_degrees.to_radians(),
                aspect_ratio,
            },
            near: config.near,
            far: config.far,
            ..Self::default()
        }
    }

    /// Compute the view matrix (inverse of camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Compute the projection matrix with reverse-Z.
    pub fn projection_matrix(&self) -> Mat4 {
        match &self.projection {
            Projection::Perspective {
                fov_y,
                aspect_ratio,
            } => {
                // Reverse-Z: near plane maps to z=1, far plane maps to z=0.
                Mat4::perspective_rh(*fov_y, *aspect_ratio, self.far, self.near)
            }
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
            } => {
                // Zoom scales the volume about its centre.
                let zoom = if self.zoom > 0.0 { self.zoom } else { 1.0 };
                let cx = (left + right) * 0.5;
                let cy = (top + bottom) * 0.5;
                let dx = (right - left) * 0.5 / zoom;
                let dy = (top - bottom) * 0.5 / zoom;
                Mat4::orthographic_rh(cx - dx, cx + dx, cy - dy, cy + dy, self.far, self.near)
            }
            Projection::Custom(matrix) => *matrix,
        }
    }

    /// Compute the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// The up direction vector (+Y in camera space).
    pub fn local_up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// The right direction vector (+X in camera space).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Turn the camera so that it faces `target`, keeping `up` on top.
    ///
    /// Leaves the rotation untouched when `target` is the camera position.
    pub fn look_at(&mut self, target: Vec3) {
        let Some(back) = (self.position - target).try_normalize() else {
            return;
        };
        let right = self
            .up
            .cross(back)
            .try_normalize()
            .unwrap_or_else(|| back.any_orthonormal_vector());
        let up = back.cross(right);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, back)).normalize();
    }

    /// Update the aspect ratio for perspective projection.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if let Projection::Perspective { aspect_ratio, .. } = &mut self.projection
            && height > 0.0
        {
            *aspect_ratio = width / height;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            up: Vec3::Y,
            zoom: 1.0,
            projection: Projection::Perspective {
                fov_y: std::f32::consts::FRAC_PI_4, // 45 degrees
                aspect_ratio: 16.0 / 9.0,
            },
            near: 0.1,
            far: 10000.0,
        }
    }
}
