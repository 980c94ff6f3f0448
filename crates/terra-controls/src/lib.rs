//! Orbit camera controls.
//!
//! [`OrbitControls`] keeps a [`Camera`] on a sphere around a target point.
//! Pointer, wheel, touch and arrow-key input accumulate pending rotation, pan
//! and zoom; [`OrbitControls::update`] applies them once per frame, honouring
//! distance, zoom, polar and azimuth limits and optional damping.
//!
//! Input arrives as host-agnostic [`ControlInput`] values. With winit,
//! [`WinitInputAdapter`] produces them from window events.

mod camera;
mod input;
mod orbit;
mod spherical;
mod winit_adapter;

pub use camera::{Camera, Projection};
pub use input::{ArrowKey, ControlInput, MouseButtons, PointerButton, Viewport};
pub use orbit::{ControlState, ControlsEvent, OrbitControls};
pub use spherical::{POLE_EPSILON, Spherical};
pub use winit_adapter::{TouchTracker, WinitInputAdapter, on_key};
