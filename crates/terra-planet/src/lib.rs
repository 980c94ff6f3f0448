//! Planet assembly: meshes, materials and per-frame uniforms for a planet
//! with an atmosphere, plus the CPU form of its surface composite.

mod error;
mod geometry;
mod material;
mod planet;
mod shading;

pub use error::PlanetError;
pub use geometry::{Mesh, ring, uv_sphere};
pub use material::{AtmosphereMaterial, Side, SurfaceMaterial, SurfaceTextures};
pub use planet::{
    DEFAULT_CLOUD_RADIUS_RATIO, FrameUniforms, Planet, PlanetSettings, SunLight, SurfaceUniform,
};
pub use shading::{
    SPECULAR_UV_OFFSET, SurfaceStyle, SurfaceTexels, SurfaceUvs, cloud_projection, equirect_uv,
    shade_surface, smoothstep,
};
