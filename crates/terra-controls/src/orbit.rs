//! Orbit camera controller: rotate around a target, dolly towards it, pan it.
//!
//! Input handlers only accumulate deltas. [`OrbitControls::update`] applies
//! them once per frame, moves the camera, and decays the deltas (damping).

use glam::{Quat, Vec2, Vec3, Vec4};
use std::f32::consts::{PI, TAU};
use tracing::{debug, warn};

use terra_config::ControlsConfig;

use crate::camera::{Camera, Projection};
use crate::input::{ArrowKey, ControlInput, MouseButtons, PointerButton, Viewport};
use crate::spherical::Spherical;

/// Threshold below which motion is not reported as a change.
const CHANGE_EPSILON: f32 = 1e-9;

/// Zoom step base: one wheel notch scales by `0.95^zoom_speed`.
const ZOOM_BASE: f32 = 0.95;

/// Gesture in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlState {
    Idle,
    Rotate,
    Dolly,
    Pan,
    TouchRotate,
    TouchDolly,
    TouchPan,
}

/// Notification for the host, drained with [`OrbitControls::drain_events`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlsEvent {
    /// A gesture began.
    Start,
    /// The camera moved; redraw.
    Change,
    /// A gesture ended.
    End,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct SavedState {
    target: Vec3,
    position: Vec3,
    zoom: f32,
}

/// Orbit-style camera controller with optional damping.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// The controlled camera.
    pub camera: Camera,
    /// Point the camera orbits and looks at.
    pub target: Vec3,
    /// Size of the input surface.
    pub viewport: Viewport,

    /// Master switch for input handling.
    pub enabled: bool,
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub enable_keys: bool,
    /// Decay deltas gradually instead of clearing them after each update.
    pub enable_damping: bool,

    pub rotate_speed: f32,
    pub rotate_damping_factor: f32,
    pub zoom_speed: f32,
    pub zoom_damping_factor: f32,
    pub pan_speed: f32,
    pub pan_damping_factor: f32,
    /// Pixels panned per arrow key press.
    pub key_pan_speed: f32,

    /// Spin around the target while no gesture is active.
    pub auto_rotate: bool,
    /// 2.0 is one turn per 30 seconds at 60 updates per second.
    pub auto_rotate_speed: f32,

    pub min_distance: f32,
    pub max_distance: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_azimuth_angle: f32,
    pub max_azimuth_angle: f32,

    pub mouse_buttons: MouseButtons,

    state: ControlState,
    spherical: Spherical,
    theta_delta: f32,
    phi_delta: f32,
    distance_delta: f32,
    orthographic_zoom_delta: f32,
    pan_offset: Vec3,
    zoom_changed: bool,

    rotate_start: Vec2,
    pan_start: Vec2,
    zoom_start: Vec2,

    // Rotation taking the camera's up vector to +Y, and back.
    up_to_y: Quat,
    y_to_up: Quat,

    last_position: Vec3,
    last_rotation: Quat,

    saved: SavedState,
    events: Vec<ControlsEvent>,
    disposed: bool,
}

impl OrbitControls {
    /// Create a controller orbiting the origin and place the camera.
    pub fn new(camera: Camera, viewport: Viewport) -> Self {
        let up = camera.up.try_normalize().unwrap_or(Vec3::Y);
        let up_to_y = Quat::from_rotation_arc(up, Vec3::Y);
        let saved = SavedState {
            target: Vec3::ZERO,
            position: camera.position,
            zoom: camera.zoom,
        };
        let mut controls = Self {
            camera,
            target: Vec3::ZERO,
            viewport,
            enabled: true,
            enable_rotate: true,
            enable_zoom: true,
            enable_pan: true,
            enable_keys: true,
            enable_damping: false,
            rotate_speed: 1.0,
            rotate_damping_factor: 0.1,
            zoom_speed: 1.0,
            zoom_damping_factor: 0.1,
            pan_speed: 1.0,
            pan_damping_factor: 0.1,
            key_pan_speed: 7.0,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_zoom: 0.0,
            max_zoom: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            min_azimuth_angle: f32::NEG_INFINITY,
            max_azimuth_angle: f32::INFINITY,
            mouse_buttons: MouseButtons::default(),
            state: ControlState::Idle,
            spherical: Spherical::default(),
            theta_delta: 0.0,
            phi_delta: 0.0,
            distance_delta: 0.0,
            orthographic_zoom_delta: 0.0,
            pan_offset: Vec3::ZERO,
            zoom_changed: false,
            rotate_start: Vec2::ZERO,
            pan_start: Vec2::ZERO,
            zoom_start: Vec2::ZERO,
            up_to_y,
            y_to_up: up_to_y.inverse(),
            last_position: Vec3::ZERO,
            last_rotation: Quat::IDENTITY,
            saved,
            events: Vec::new(),
            disposed: false,
        };
        controls.update();
        controls.events.clear();
        controls
    }

    /// Apply speeds, damping and bounds from config.
    pub fn with_config(mut self, config: &ControlsConfig) -> Self {
        self.enable_damping = config.enable_damping;
        self.enable_rotate = config.enable_rotate;
        self.enable_zoom = config.enable_zoom;
        self.enable_pan = config.enable_pan;
        self.enable_keys = config.enable_keys;
        self.rotate_speed = config.rotate_speed;
        self.rotate_damping_factor = config.rotate_damping_factor;
        self.pan_speed = config.pan_speed;
        self.pan_damping_factor = config.pan_damping_factor;
        self.key_pan_speed = config.key_pan_speed;
        self.zoom_speed = config.zoom_speed;
        self.zoom_damping_factor = config.zoom_damping_factor;
        self.auto_rotate = config.auto_rotate;
        self.auto_rotate_speed = config.auto_rotate_speed;
        self.min_distance = config.min_distance;
        self.max_distance = config.max_distance.unwrap_or(f32::INFINITY);
        self.min_zoom = config.min_zoom;
        self.max_zoom = config.max_zoom.unwrap_or(f32::INFINITY);
        self.min_polar_angle = config.min_polar_angle;
        self.max_polar_angle = config.max_polar_angle;
        (self.min_azimuth_angle, self.max_azimuth_angle) = config
            .azimuth_bounds
            .unwrap_or((f32::NEG_INFINITY, f32::INFINITY));
        self
    }

    /// Orbit `target` instead of the origin, turning the camera towards it.
    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self.saved.target = target;
        self.update();
        self.events.clear();
        self
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Polar angle of the camera around the target, in radians.
    pub fn polar_angle(&self) -> f32 {
        self.spherical.phi
    }

    /// Azimuthal angle of the camera around the target, in radians.
    pub fn azimuthal_angle(&self) -> f32 {
        self.spherical.theta
    }

    /// Pending `(theta, phi)` rotation not yet applied or damped away.
    pub fn pending_rotation(&self) -> (f32, f32) {
        (self.theta_delta, self.phi_delta)
    }

    /// Pending target translation.
    pub fn pending_pan(&self) -> Vec3 {
        self.pan_offset
    }

    /// Pending relative distance change (perspective) or zoom change (orthographic).
    pub fn pending_zoom(&self) -> f32 {
        match self.camera.projection {
            Projection::Orthographic { .. } => self.orthographic_zoom_delta,
            _ => self.distance_delta,
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Take the events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<ControlsEvent> {
        std::mem::take(&mut self.events)
    }

    /// Remember the current target, position and zoom for [`reset`](Self::reset).
    pub fn save_state(&mut self) {
        self.saved = SavedState {
            target: self.target,
            position: self.camera.position,
            zoom: self.camera.zoom,
        };
    }

    /// Return to the last saved state.
    pub fn reset(&mut self) {
        self.target = self.saved.target;
        self.camera.position = self.saved.position;
        self.camera.zoom = self.saved.zoom;
        self.events.push(ControlsEvent::Change);
        self.update();
        self.set_state(ControlState::Idle);
    }

    /// Stop reacting to input. Explicit calls to [`update`](Self::update)
    /// still work.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.set_state(ControlState::Idle);
    }

    /// Queue a rotation around the up axis. Positive angles decrease theta.
    pub fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    /// Queue a rotation towards the upper pole. Positive angles decrease phi.
    pub fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    /// Queue a pan by a pixel delta.
    ///
    /// Pixel deltas become world distances at the target's depth, so the
    /// point under the cursor follows it. Custom projections disable panning.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        match self.camera.projection {
            Projection::Perspective { fov_y, .. } => {
                let offset = self.camera.position - self.target;
                // Half of the fov is centre to top of screen.
                let target_distance = offset.length() * (fov_y / 2.0).tan();
                let height = self.viewport.height();
                self.pan_left(2.0 * delta_x * target_distance / height);
                self.pan_up(2.0 * delta_y * target_distance / height);
            }
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
            } => {
                let zoom = self.camera.zoom;
                self.pan_left(delta_x * (right - left) / zoom / self.viewport.width());
                self.pan_up(delta_y * (top - bottom) / zoom / self.viewport.height());
            }
            Projection::Custom(_) => {
                warn!("Orbit controls cannot pan a custom projection, pan disabled");
                self.enable_pan = false;
            }
        }
    }

    fn pan_left(&mut self, distance: f32) {
        self.pan_offset -= self.camera.right() * distance;
    }

    fn pan_up(&mut self, distance: f32) {
        self.pan_offset += self.camera.local_up() * distance;
    }

    /// Queue a relative dolly (perspective) or zoom (orthographic) step.
    ///
    /// Negative values move closer. Custom projections disable zooming.
    pub fn assign_zoom(&mut self, value: f32) {
        match self.camera.projection {
            Projection::Perspective { .. } => self.distance_delta = value,
            Projection::Orthographic { .. } => self.orthographic_zoom_delta = value,
            Projection::Custom(_) => {
                warn!("Orbit controls cannot zoom a custom projection, dolly/zoom disabled");
                self.enable_zoom = false;
            }
        }
    }

    fn zoom_step(&self, sign: f32) -> f32 {
        (1.0 - ZOOM_BASE.powf(self.zoom_speed)) * sign
    }

    fn auto_rotation_angle(&self) -> f32 {
        TAU / 60.0 / 60.0 * self.auto_rotate_speed
    }

    fn set_state(&mut self, state: ControlState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "Orbit controls state");
            self.state = state;
        }
    }

    fn begin(&mut self, state: ControlState) {
        self.set_state(state);
        self.events.push(ControlsEvent::Start);
    }

    fn end(&mut self) {
        if self.state != ControlState::Idle {
            self.set_state(ControlState::Idle);
            self.events.push(ControlsEvent::End);
        }
    }

    /// Feed one input event. Deltas are applied on the next [`update`](Self::update).
    pub fn handle_input(&mut self, input: &ControlInput) {
        if self.disposed || !self.enabled {
            return;
        }
        match input {
            ControlInput::PointerDown { button, position } => {
                self.on_pointer_down(*button, *position)
            }
            ControlInput::PointerMove { position } => self.on_pointer_move(*position),
            ControlInput::PointerUp => {
                if matches!(
                    self.state,
                    ControlState::Rotate | ControlState::Dolly | ControlState::Pan
                ) {
                    self.end();
                }
            }
            ControlInput::Wheel { delta_y } => self.on_wheel(*delta_y),
            ControlInput::TouchStart { touches } => self.on_touch_start(touches),
            ControlInput::TouchMove { touches } => self.on_touch_move(touches),
            ControlInput::TouchEnd => self.end(),
            ControlInput::KeyDown(key) => self.on_key_down(*key),
        }
    }

    fn on_pointer_down(&mut self, button: PointerButton, position: Vec2) {
        let buttons = self.mouse_buttons;
        if button == buttons.orbit {
            if self.enable_rotate {
                self.rotate_start = position;
                self.begin(ControlState::Rotate);
            }
        } else if button == buttons.zoom {
            if self.enable_zoom {
                self.zoom_start = position;
                self.begin(ControlState::Dolly);
            }
        } else if button == buttons.pan && self.enable_pan {
            self.pan_start = position;
            self.begin(ControlState::Pan);
        }
    }

    fn on_pointer_move(&mut self, position: Vec2) {
        match self.state {
            ControlState::Rotate if self.enable_rotate => self.drag_rotate(position),
            ControlState::Dolly if self.enable_zoom => {
                let delta = position - self.zoom_start;
                self.assign_zoom(self.zoom_step(sign(delta.y)));
                self.zoom_start = position;
            }
            ControlState::Pan if self.enable_pan => self.drag_pan(position),
            _ => {}
        }
    }

    fn on_wheel(&mut self, delta_y: f32) {
        if !self.enable_zoom || !matches!(self.state, ControlState::Idle | ControlState::Rotate) {
            return;
        }
        self.assign_zoom(self.zoom_step(sign(delta_y)));
        self.events.push(ControlsEvent::Start);
        self.events.push(ControlsEvent::End);
    }

    fn on_key_down(&mut self, key: ArrowKey) {
        if !self.enable_keys || !self.enable_pan {
            return;
        }
        let speed = self.key_pan_speed;
        match key {
            ArrowKey::Up => self.pan(0.0, speed),
            ArrowKey::Down => self.pan(0.0, -speed),
            ArrowKey::Left => self.pan(speed, 0.0),
            ArrowKey::Right => self.pan(-speed, 0.0),
        }
    }

    fn on_touch_start(&mut self, touches: &[Vec2]) {
        match touches {
            [first] if self.enable_rotate => {
                self.rotate_start = *first;
                self.begin(ControlState::TouchRotate);
            }
            [first, second] if self.enable_zoom => {
                self.zoom_start = Vec2::new(0.0, first.distance(*second));
                self.begin(ControlState::TouchDolly);
            }
            [first, _, _] if self.enable_pan => {
                self.pan_start = *first;
                self.begin(ControlState::TouchPan);
            }
            [_] | [_, _] | [_, _, _] => {}
            _ => self.set_state(ControlState::Idle),
        }
    }

    fn on_touch_move(&mut self, touches: &[Vec2]) {
        match (touches, self.state) {
            ([first], ControlState::TouchRotate) if self.enable_rotate => {
                self.drag_rotate(*first)
            }
            ([first, second], ControlState::TouchDolly) if self.enable_zoom => {
                let zoom_end = Vec2::new(0.0, first.distance(*second));
                let delta = zoom_end - self.zoom_start;
                // Fingers moving apart zoom in.
                self.assign_zoom(self.zoom_step(-sign(delta.y)));
                self.zoom_start = zoom_end;
            }
            ([first, _, _], ControlState::TouchPan) if self.enable_pan => self.drag_pan(*first),
            ([_] | [_, _] | [_, _, _], _) => {}
            _ => self.set_state(ControlState::Idle),
        }
    }

    fn drag_rotate(&mut self, position: Vec2) {
        let delta = position - self.rotate_start;
        // Dragging across the whole width turns a full circle.
        self.rotate_left(TAU * delta.x / self.viewport.width() * self.rotate_speed);
        self.rotate_up(TAU * delta.y / self.viewport.height() * self.rotate_speed);
        self.rotate_start = position;
    }

    fn drag_pan(&mut self, position: Vec2) {
        let delta = (position - self.pan_start) * self.pan_speed;
        self.pan(delta.x, delta.y);
        self.pan_start = position;
    }

    /// Apply pending deltas to the camera. Returns `true` and emits
    /// [`ControlsEvent::Change`] when the camera moved, turned or zoomed.
    pub fn update(&mut self) -> bool {
        let offset = self.up_to_y * (self.camera.position - self.target);
        self.spherical = Spherical::from_vec3(offset);

        if self.auto_rotate && self.state == ControlState::Idle {
            self.rotate_left(self.auto_rotation_angle());
        }

        self.spherical.theta += self.theta_delta;
        self.spherical.phi += self.phi_delta;
        self.spherical.theta = self
            .spherical
            .theta
            .min(self.max_azimuth_angle)
            .max(self.min_azimuth_angle);
        self.spherical.phi = self
            .spherical
            .phi
            .min(self.max_polar_angle)
            .max(self.min_polar_angle);
        self.spherical.make_safe();

        self.spherical.radius *= 1.0 + self.distance_delta;
        self.spherical.radius = self
            .spherical
            .radius
            .min(self.max_distance)
            .max(self.min_distance);

        self.target += self.pan_offset;

        let offset = self.y_to_up * self.spherical.to_vec3();
        self.camera.position = self.target + offset;
        self.camera.look_at(self.target);

        if self.orthographic_zoom_delta.abs() > CHANGE_EPSILON {
            let zoom = (self.camera.zoom * (1.0 - self.orthographic_zoom_delta))
                .max(self.min_zoom)
                .min(self.max_zoom);
            if zoom != self.camera.zoom {
                self.camera.zoom = zoom;
                self.zoom_changed = true;
            }
        }

        if self.enable_damping {
            self.theta_delta *= 1.0 - self.rotate_damping_factor;
            self.phi_delta *= 1.0 - self.rotate_damping_factor;
            self.pan_offset *= 1.0 - self.pan_damping_factor;
            self.distance_delta *= 1.0 - self.zoom_damping_factor;
            self.orthographic_zoom_delta *= 1.0 - self.zoom_damping_factor;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.pan_offset = Vec3::ZERO;
            self.distance_delta = 0.0;
            self.orthographic_zoom_delta = 0.0;
        }

        // Small-angle approximation: cos(x/2) = 1 - x^2/8.
        let moved = self.last_position.distance_squared(self.camera.position) > CHANGE_EPSILON;
        let turned = 8.0 * rotation_gap(self.last_rotation, self.camera.rotation) > CHANGE_EPSILON;
        if self.zoom_changed || moved || turned {
            self.events.push(ControlsEvent::Change);
            self.last_position = self.camera.position;
            self.last_rotation = self.camera.rotation;
            self.zoom_changed = false;
            return true;
        }
        false
    }
}

/// `1 - |dot(a, b)|` for unit quaternions, computed as `|a -+ b|^2 / 2`
/// so that it does not cancel to noise in f32.
fn rotation_gap(a: Quat, b: Quat) -> f32 {
    let (a, b) = (Vec4::from(a), Vec4::from(b));
    0.5 * (a - b).length_squared().min((a + b).length_squared())
}

fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
