//! Surface and atmosphere material descriptions.
//!
//! Materials hold opaque texture handles owned by the host renderer; nothing
//! here loads or samples textures.

use terra_atmosphere::OUTER_RADIUS_RATIO;

/// Texture handles for the planet surface.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceTextures<T> {
    /// Daytime colour.
    pub albedo_map: T,
    /// Optional height map used for bump shading.
    pub bump_map: Option<T>,
    /// Tiled city light detail.
    pub city_map: T,
    /// Where cities are.
    pub city_mask: T,
    /// Cloud coverage in the red channel.
    pub cloud_map: T,
    /// Night-side ground emission.
    pub emissive_map: T,
    /// Ocean mask driving specular highlights.
    pub specular_map: T,
    /// Tiled mask breaking up city lights into suburbs.
    pub suburbs_mask: T,
}

/// Which faces of a mesh a material draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Faces pointing towards the camera.
    Front,
    /// Faces pointing away from the camera.
    Back,
}

/// Shader configuration for the ground shell.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceMaterial<T> {
    /// Bound texture slots.
    pub bindings: SurfaceTextures<T>,
    /// Surface radius baked into the shader.
    pub inner_radius: f32,
    /// Atmosphere radius baked into the shader.
    pub outer_radius: f32,
    /// Compile the cloud-shadow path.
    pub clouds_cast_shadows: bool,
    /// Compile the bump-mapping path. Set iff a bump map is bound.
    pub use_bump_map: bool,
    /// Alpha-blended.
    pub transparent: bool,
    /// Drawn faces.
    pub side: Side,
}

impl<T: Clone> SurfaceMaterial<T> {
    /// Create the material for a planet of the given radius.
    ///
    /// The suburbs slot starts out bound to the city mask; call
    /// [`bind_textures`](Self::bind_textures) to bind the real suburbs mask.
    pub fn new(textures: &SurfaceTextures<T>, planet_radius: f32, clouds_cast_shadows: bool) -> Self {
        let mut bindings = textures.clone();
        bindings.suburbs_mask = textures.city_mask.clone();
        Self {
            use_bump_map: bindings.bump_map.is_some(),
            bindings,
            inner_radius: planet_radius,
            outer_radius: planet_radius * OUTER_RADIUS_RATIO,
            clouds_cast_shadows,
            transparent: true,
            side: Side::Front,
        }
    }

    /// Bind every texture slot from `textures`.
    ///
    /// `use_bump_map` is a compile-time switch and keeps the value chosen at
    /// construction.
    pub fn bind_textures(&mut self, textures: &SurfaceTextures<T>) {
        self.bindings = textures.clone();
    }
}

/// Shader configuration for the atmosphere shell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtmosphereMaterial {
    /// Surface radius baked into the shader.
    pub inner_radius: f32,
    /// Atmosphere radius baked into the shader.
    pub outer_radius: f32,
    /// Alpha-blended.
    pub transparent: bool,
    /// Drawn faces. The shell is seen from inside its far half.
    pub side: Side,
}

impl AtmosphereMaterial {
    /// Create the material for a planet of the given radius.
    pub fn new(planet_radius: f32) -> Self {
        Self {
            inner_radius: planet_radius,
            outer_radius: planet_radius * OUTER_RADIUS_RATIO,
            transparent: true,
            side: Side::Back,
        }
    }
}
