//! Host-agnostic input events consumed by the orbit controller.

use glam::Vec2;

/// Pointer button, independent of the windowing library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Usually the left mouse button.
    Primary,
    /// Wheel click.
    Middle,
    /// Usually the right mouse button.
    Secondary,
}

/// Which button drives which gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseButtons {
    pub orbit: PointerButton,
    pub zoom: PointerButton,
    pub pan: PointerButton,
}

impl Default for MouseButtons {
    fn default() -> Self {
        Self {
            orbit: PointerButton::Primary,
            zoom: PointerButton::Middle,
            pan: PointerButton::Secondary,
        }
    }
}

/// Arrow keys used for keyboard panning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrowKey {
    Up,
    Down,
    Left,
    Right,
}

/// One input event, with positions in viewport pixels (origin top-left).
#[derive(Clone, Debug, PartialEq)]
pub enum ControlInput {
    PointerDown { button: PointerButton, position: Vec2 },
    PointerMove { position: Vec2 },
    PointerUp,
    /// Positive values scroll towards the user and zoom out.
    Wheel { delta_y: f32 },
    /// Every active touch point, in the order the fingers went down.
    TouchStart { touches: Vec<Vec2> },
    TouchMove { touches: Vec<Vec2> },
    TouchEnd,
    KeyDown(ArrowKey),
}

/// Size of the element receiving input, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
}

impl Viewport {
    /// Dimensions below one pixel are raised to one.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}
