//! Scripted user input for the headless viewer.
//!
//! Each frame the script feeds synthetic window input through the winit
//! adapter: an orbit drag, a wheel zoom, a pan drag, two arrow-key presses
//! and a two-finger pinch.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase};
use winit::keyboard::{KeyCode, PhysicalKey};

use terra_controls::{ControlInput, WinitInputAdapter, on_key};

/// Frame after which the script stops producing input.
pub const SCRIPT_LENGTH: u32 = 92;

/// Input produced for `frame`, with drags centred on `center`.
pub fn scripted_input(
    frame: u32,
    center: Vec2,
    adapter: &mut WinitInputAdapter,
) -> Vec<ControlInput> {
    let (cx, cy) = (f64::from(center.x), f64::from(center.y));
    let mut inputs = Vec::new();
    match frame {
        // Orbit drag.
        0 => {
            inputs.push(adapter.on_cursor_moved(cx, cy));
            inputs.extend(adapter.on_mouse_button(MouseButton::Left, ElementState::Pressed));
        }
        1..=20 => {
            let step = f64::from(frame) * 6.0;
            inputs.push(adapter.on_cursor_moved(cx + step, cy + step * 0.25));
        }
        21 => inputs.extend(adapter.on_mouse_button(MouseButton::Left, ElementState::Released)),
        // Wheel zoom in.
        30..=39 => inputs.extend(adapter.on_wheel(MouseScrollDelta::LineDelta(0.0, 1.0))),
        // Pan drag.
        50 => {
            inputs.push(adapter.on_cursor_moved(cx, cy));
            inputs.extend(adapter.on_mouse_button(MouseButton::Right, ElementState::Pressed));
        }
        51..=60 => {
            let step = f64::from(frame - 50) * 4.0;
            inputs.push(adapter.on_cursor_moved(cx - step, cy));
        }
        61 => inputs.extend(adapter.on_mouse_button(MouseButton::Right, ElementState::Released)),
        70 | 71 => inputs.extend(on_key(
            PhysicalKey::Code(KeyCode::ArrowUp),
            ElementState::Pressed,
        )),
        // Pinch out.
        80 => {
            inputs.extend(adapter.on_touch(1, TouchPhase::Started, center - Vec2::new(40.0, 0.0)));
            inputs.extend(adapter.on_touch(2, TouchPhase::Started, center + Vec2::new(40.0, 0.0)));
        }
        81..=90 => {
            let spread = 40.0 + (frame - 80) as f32 * 5.0;
            inputs.extend(adapter.on_touch(1, TouchPhase::Moved, center - Vec2::new(spread, 0.0)));
            inputs.extend(adapter.on_touch(2, TouchPhase::Moved, center + Vec2::new(spread, 0.0)));
        }
        91 => {
            inputs.extend(adapter.on_touch(1, TouchPhase::Ended, Vec2::ZERO));
            inputs.extend(adapter.on_touch(2, TouchPhase::Ended, Vec2::ZERO));
        }
        _ => {}
    }
    inputs
}
