//! Translation of winit window events into [`ControlInput`].
//!
//! Forward every [`WindowEvent`] to [`WinitInputAdapter::translate`] and feed
//! the result to [`OrbitControls::handle_input`](crate::OrbitControls::handle_input).
//! The `on_*` methods take the event payloads directly and are what tests use.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::{ArrowKey, ControlInput, PointerButton};

/// Pixels of a pixel-precise scroll that count as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

/// Active touch points in the order they went down.
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    touches: Vec<(u64, Vec2)>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fingers down.
    pub fn len(&self) -> usize {
        self.touches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.touches.is_empty()
    }

    /// Positions of every active touch.
    pub fn positions(&self) -> Vec<Vec2> {
        self.touches.iter().map(|&(_, p)| p).collect()
    }

    /// Record one touch event and produce the matching control input.
    pub fn on_touch(&mut self, id: u64, phase: TouchPhase, position: Vec2) -> Option<ControlInput> {
        match phase {
            TouchPhase::Started => {
                match self.touches.iter_mut().find(|(touch, _)| *touch == id) {
                    Some(entry) => entry.1 = position,
                    None => self.touches.push((id, position)),
                }
                Some(ControlInput::TouchStart {
                    touches: self.positions(),
                })
            }
            TouchPhase::Moved => {
                let entry = self.touches.iter_mut().find(|(touch, _)| *touch == id)?;
                entry.1 = position;
                Some(ControlInput::TouchMove {
                    touches: self.positions(),
                })
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                let before = self.touches.len();
                self.touches.retain(|(touch, _)| *touch != id);
                (self.touches.len() != before).then_some(ControlInput::TouchEnd)
            }
        }
    }
}

/// Stateful winit-to-[`ControlInput`] translator.
#[derive(Debug, Clone, Default)]
pub struct WinitInputAdapter {
    cursor: Vec2,
    touches: TouchTracker,
}

impl WinitInputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known cursor position.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn touches(&self) -> &TouchTracker {
        &self.touches
    }

    /// Translate one window event. Events the controller does not use map to `None`.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<ControlInput> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.on_cursor_moved(position.x, position.y))
            }
            WindowEvent::MouseInput { state, button, .. } => self.on_mouse_button(*button, *state),
            WindowEvent::MouseWheel { delta, .. } => self.on_wheel(*delta),
            WindowEvent::KeyboardInput { event, .. } => on_key(event.physical_key, event.state),
            WindowEvent::Touch(touch) => self.touches.on_touch(
                touch.id,
                touch.phase,
                Vec2::new(touch.location.x as f32, touch.location.y as f32),
            ),
            _ => None,
        }
    }

    pub fn on_cursor_moved(&mut self, x: f64, y: f64) -> ControlInput {
        self.cursor = Vec2::new(x as f32, y as f32);
        ControlInput::PointerMove {
            position: self.cursor,
        }
    }

    /// Press of a mapped button starts a gesture at the cursor; any release ends it.
    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) -> Option<ControlInput> {
        match state {
            ElementState::Pressed => pointer_button(button).map(|button| ControlInput::PointerDown {
                button,
                position: self.cursor,
            }),
            ElementState::Released => Some(ControlInput::PointerUp),
        }
    }

    /// winit reports scrolling away from the user as positive; the controller
    /// wants it negative (zoom in).
    pub fn on_wheel(&mut self, delta: MouseScrollDelta) -> Option<ControlInput> {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => f64::from(y),
            MouseScrollDelta::PixelDelta(position) => position.y / PIXELS_PER_LINE,
        };
        (lines != 0.0).then(|| ControlInput::Wheel {
            delta_y: -lines as f32,
        })
    }

    pub fn on_touch(&mut self, id: u64, phase: TouchPhase, position: Vec2) -> Option<ControlInput> {
        self.touches.on_touch(id, phase, position)
    }
}

/// Pressed arrow keys become pan steps; held keys repeat.
pub fn on_key(key: PhysicalKey, state: ElementState) -> Option<ControlInput> {
    if state != ElementState::Pressed {
        return None;
    }
    let arrow = match key {
        PhysicalKey::Code(KeyCode::ArrowUp) => ArrowKey::Up,
        PhysicalKey::Code(KeyCode::ArrowDown) => ArrowKey::Down,
        PhysicalKey::Code(KeyCode::ArrowLeft) => ArrowKey::Left,
        PhysicalKey::Code(KeyCode::ArrowRight) => ArrowKey::Right,
        _ => return None,
    };
    Some(ControlInput::KeyDown(arrow))
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Middle => Some(PointerButton::Middle),
        MouseButton::Right => Some(PointerButton::Secondary),
        _ => None,
    }
}
