//! UV sphere and ring mesh generation.

use glam::Vec3;
use std::f32::consts::{PI, TAU};

use crate::error::PlanetError;

/// Indexed triangle mesh ready for upload by the host renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Unit vertex normals.
    pub normals: Vec<Vec3>,
    /// Texture coordinates per vertex.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle indices, counter-clockwise when seen from outside.
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Generate a latitude/longitude sphere centred at the origin.
///
/// Rows run from the north pole (+Y) to the south pole; each row repeats its
/// first vertex at the seam so the texture wraps cleanly. Pole rows emit a
/// single triangle per segment, with their U shifted half a segment.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Result<Mesh, PlanetError> {
    if width_segments < 3 || height_segments < 2 {
        return Err(PlanetError::InvalidSegments {
            width: width_segments,
            height: height_segments,
        });
    }

    let row = width_segments as usize + 1;
    let vertex_count = row * (height_segments as usize + 1);
    let mut mesh = Mesh {
        positions: Vec::with_capacity(vertex_count),
        normals: Vec::with_capacity(vertex_count),
        uvs: Vec::with_capacity(vertex_count),
        indices: Vec::with_capacity(6 * width_segments as usize * (height_segments as usize - 1)),
    };

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let u_offset = if iy == 0 {
            0.5 / width_segments as f32
        } else if iy == height_segments {
            -0.5 / width_segments as f32
        } else {
            0.0
        };
        let theta = v * PI;

        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * TAU;
            let position = Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            );
            mesh.normals.push(position.normalize_or_zero());
            mesh.positions.push(position);
            mesh.uvs.push([u + u_offset, 1.0 - v]);
        }
    }

    let at = |ix: u32, iy: u32| iy * row as u32 + ix;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = at(ix + 1, iy);
            let b = at(ix, iy);
            let c = at(ix, iy + 1);
            let d = at(ix + 1, iy + 1);
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Ok(mesh)
}

/// Generate a flat ring in the XY plane facing +Z.
///
/// Vertices come in outer/inner pairs, one pair per step plus a closing pair.
/// U runs from the inner (0) to the outer (1) edge and V around the ring,
/// which suits radial ring textures. Fewer than 3 segments are raised to 3.
pub fn ring(inner_radius: f32, outer_radius: f32, theta_segments: u32) -> Mesh {
    let segments = theta_segments.max(3);
    let step = TAU / segments as f32;
    let pairs = segments as usize + 1;

    let mut mesh = Mesh {
        positions: Vec::with_capacity(2 * pairs),
        normals: vec![Vec3::Z; 2 * pairs],
        uvs: Vec::with_capacity(2 * pairs),
        indices: Vec::with_capacity(6 * segments as usize),
    };

    for i in 0..=segments {
        let (sin, cos) = (step * i as f32).sin_cos();
        let v = i as f32 / segments as f32;
        mesh.positions.push(Vec3::new(cos * outer_radius, sin * outer_radius, 0.0));
        mesh.positions.push(Vec3::new(cos * inner_radius, sin * inner_radius, 0.0));
        mesh.uvs.push([1.0, v]);
        mesh.uvs.push([0.0, v]);
    }

    // The last quad wraps back onto the first pair.
    let wrap = 2 * segments;
    for i in 1..=segments {
        let outer_prev = (i - 1) * 2;
        let inner_prev = outer_prev + 1;
        let outer_next = (i * 2) % wrap;
        let inner_next = outer_next + 1;
        mesh.indices
            .extend_from_slice(&[outer_prev, outer_next, inner_prev, inner_prev, outer_next, inner_next]);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_sphere_counts() {
        let mesh = uv_sphere(5.0, 8, 6).unwrap();
        assert_eq!(mesh.vertex_count(), 9 * 7);
        // Two triangles per quad, one per pole segment.
        assert_eq!(mesh.triangle_count(), 8 * (2 * 6 - 2));
        assert_eq!(mesh.normals.len(), mesh.vertex_count());
        assert_eq!(mesh.uvs.len(), mesh.vertex_count());
    }

    #[test]
    fn test_uv_sphere_vertices_on_radius() {
        let mesh = uv_sphere(5.0, 16, 12).unwrap();
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            assert!((p.length() - 5.0).abs() < 1e-4, "{p}");
            assert!((*p / 5.0 - *n).length() < 1e-5);
        }
        assert!((mesh.positions[0] - Vec3::new(0.0, 5.0, 0.0)).length() < 1e-5);
        let last = *mesh.positions.last().unwrap();
        assert!((last - Vec3::new(0.0, -5.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_uv_sphere_indices_valid() {
        let mesh = uv_sphere(1.0, 12, 9).unwrap();
        let n = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn test_uv_sphere_winding_faces_outward() {
        let mesh = uv_sphere(1.0, 12, 9).unwrap();
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.positions[i as usize]);
            let normal = (b - a).cross(c - a);
            let centre = (a + b + c) / 3.0;
            assert!(normal.dot(centre) > 0.0);
        }
    }

    #[test]
    fn test_uv_sphere_uvs() {
        let mesh = uv_sphere(1.0, 4, 2).unwrap();
        // North pole row is shifted half a segment.
        assert_eq!(mesh.uvs[0], [0.125, 1.0]);
        // Equator row starts at the seam.
        assert_eq!(mesh.uvs[5], [0.0, 0.5]);
        assert_eq!(mesh.uvs[9], [1.0, 0.5]);
    }

    #[test]
    fn test_uv_sphere_rejects_degenerate_segments() {
        assert_eq!(
            uv_sphere(1.0, 2, 8),
            Err(PlanetError::InvalidSegments {
                width: 2,
                height: 8
            })
        );
        assert!(uv_sphere(1.0, 3, 1).is_err());
        assert!(uv_sphere(1.0, 3, 2).is_ok());
    }

    #[test]
    fn test_ring_layout() {
        let mesh = ring(1.0, 2.0, 4);
        assert_eq!(mesh.vertex_count(), 10);
        assert_eq!(mesh.triangle_count(), 8);
        assert!((mesh.positions[0] - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
        assert!((mesh.positions[1] - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
        assert!(mesh.normals.iter().all(|&n| n == Vec3::Z));
        assert_eq!(mesh.uvs[2], [1.0, 0.25]);
        assert_eq!(mesh.uvs[3], [0.0, 0.25]);
    }

    #[test]
    fn test_ring_last_quad_wraps() {
        let mesh = ring(1.0, 2.0, 4);
        let last = &mesh.indices[mesh.indices.len() - 6..];
        assert_eq!(last, &[6, 0, 7, 7, 0, 1]);
        let n = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn test_ring_clamps_segments() {
        let mesh = ring(1.0, 2.0, 1);
        assert_eq!(mesh.triangle_count(), 6);
    }

    #[test]
    fn test_ring_faces_plus_z() {
        let mesh = ring(0.5, 1.5, 16);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.positions[i as usize]);
            assert!((b - a).cross(c - a).z > 0.0);
        }
    }
}
