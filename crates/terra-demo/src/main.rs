//! Headless Terra viewer.
//!
//! Builds the planet and an orbit camera from `config.ron`, plays a scripted
//! input sequence through the winit adapter and refreshes the planet's
//! uniforms only on frames where the camera changed.
//! Run with `cargo run -p terra-demo -- --frames 120 --log-level debug`.

mod script;

use std::process::ExitCode;

use clap::Parser;
use glam::{Vec2, Vec4};
use tracing::{debug, error, info};

use terra_atmosphere::{ground_vertex, shade_sky_fragment, sky_vertex};
use terra_config::{CliArgs, Config, default_config_dir};
use terra_controls::{Camera, OrbitControls, Viewport, WinitInputAdapter};
use terra_planet::{
    Planet, PlanetError, SunLight, SurfaceTextures, SurfaceTexels, SurfaceUvs, equirect_uv,
    shade_surface,
};

use crate::script::{SCRIPT_LENGTH, scripted_input};

/// Texture handles as the host would name them.
fn surface_textures() -> SurfaceTextures<&'static str> {
    SurfaceTextures {
        albedo_map: "earth_albedo",
        bump_map: Some("earth_bump"),
        city_map: "city_lights",
        city_mask: "city_mask",
        cloud_map: "clouds",
        emissive_map: "earth_night",
        specular_map: "earth_specular",
        suburbs_mask: "suburbs_mask",
    }
}

/// Stand-in texel values for a sunlit ocean under thin cloud.
fn sample_texels() -> SurfaceTexels {
    SurfaceTexels {
        albedo: Vec4::new(0.05, 0.12, 0.35, 1.0),
        clouds: 0.2,
        cloud_shadow: 0.1,
        specular_mask: 1.0,
        emissive: Vec4::new(0.02, 0.02, 0.03, 1.0),
        city: Vec4::ZERO,
        suburbs_mask: 0.0,
        city_mask: 0.0,
    }
}

/// Refresh the planet for the camera and log what a renderer would draw.
fn render(planet: &Planet<&'static str>, camera: &Camera, frame: u32) -> Result<(), PlanetError> {
    let uniforms = planet.frame(camera.position)?;
    let parameters = planet.scattering_parameters()?;
    let samples = planet.settings.scattering_samples;

    let eye = planet.to_planet_space(camera.position);
    let Some(toward_eye) = eye.try_normalize() else {
        debug!(frame, "Camera at planet centre, nothing to draw");
        return Ok(());
    };

    // Surface point straight below the camera.
    let surface_point = toward_eye * planet.radius();
    let ground = ground_vertex(eye, surface_point, &parameters, samples);
    let uv = equirect_uv(camera.position, &planet.model_matrix().inverse());
    let uvs = SurfaceUvs::new(uv, planet.settings.city_scale, planet.settings.suburbs_scale);
    let surface = shade_surface(
        &sample_texels(),
        &ground,
        parameters.sun_direction,
        &planet.surface_style(),
    );

    // Atmosphere point on the limb as seen from the camera.
    let limb = toward_eye.any_orthonormal_vector() * parameters.outer_radius;
    let sky = sky_vertex(eye, limb, &parameters, samples);
    let halo = shade_sky_fragment(
        &sky,
        parameters.sun_direction,
        parameters.g,
        planet.settings.atmosphere_discard_threshold,
    );

    info!(
        frame,
        eye_height = uniforms.ground.eye_height,
        surface = ?surface.truncate(),
        halo = ?halo.map(|c| c.truncate()),
        "Frame rendered"
    );
    debug!(
        frame,
        uv = ?uvs.base,
        attenuation = ?ground.attenuation,
        inscatter = ?ground.inscatter,
        "Sub-camera sample"
    );
    Ok(())
}

fn run(config: &Config) -> Result<(), PlanetError> {
    let sun = SunLight::from(&config.sun);
    let planet = Planet::new(&config.planet, surface_textures(), sun)?;

    let viewport = Viewport::new(config.window.width as f32, config.window.height as f32);
    let camera = Camera::from_config(&config.camera, viewport.aspect_ratio());
    let mut controls = OrbitControls::new(camera, viewport).with_config(&config.controls);
    let mut adapter = WinitInputAdapter::new();
    let center = Vec2::new(viewport.width(), viewport.height()) * 0.5;

    info!(
        radius = planet.radius(),
        frames = config.debug.demo_frames,
        damping = controls.enable_damping,
        "Starting viewer"
    );

    render(&planet, &controls.camera, 0)?;
    let mut rendered = 1u32;
    for frame in 0..config.debug.demo_frames {
        for input in scripted_input(frame, center, &mut adapter) {
            controls.handle_input(&input);
        }
        if controls.update() {
            render(&planet, &controls.camera, frame)?;
            rendered += 1;
        }
        for event in controls.drain_events() {
            debug!(frame, ?event, state = ?controls.state(), "Controls event");
        }
    }

    let distance = (controls.camera.position - controls.target).length();
    info!(
        rendered,
        frames = config.debug.demo_frames,
        script_frames = SCRIPT_LENGTH,
        distance,
        polar = controls.polar_angle(),
        azimuth = controls.azimuthal_angle(),
        target = ?controls.target,
        "Viewer finished"
    );
    controls.dispose();
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    terra_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Viewer failed: {e}");
            ExitCode::FAILURE
        }
    }
}
