use image::{ImageBuffer, Rgb};

/// Universal frame type shared by sources, the snapper and the renderer.
pub type Frame = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// An integer pixel coordinate on the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point. Kept in integer
    /// space so nearest-point comparisons are exact.
    pub fn dist_sq(&self, other: PixelPoint) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }
}

/// A physical coordinate pair in millimeters, relative to the frame origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MmPoint {
    pub x: f64,
    pub y: f64,
}

/// Session mode. Exactly one is active; `Normal` is the initial state
/// and the only state reachable from the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Calibration,
    Targeting,
}

/// Whether increasing pixel row means increasing physical depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    TopDown,
    BottomUp,
}

impl Orientation {
    /// Sign applied to the vertical mm coordinate. The horizontal axis
    /// is never flipped; the robot side expects that asymmetry.
    pub fn sign(&self) -> f64 {
        match self {
            Orientation::TopDown => 1.0,
            Orientation::BottomUp => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// A discrete pointer event. Ctrl+Left is treated as Middle by the
/// session; the flag is carried here so the session owns that rule.
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub button: PointerButton,
    pub pos: PixelPoint,
    pub ctrl: bool,
}

impl PointerEvent {
    pub fn new(button: PointerButton, pos: PixelPoint, ctrl: bool) -> Self {
        Self { button, pos, ctrl }
    }

    /// The effective button after folding Ctrl+Left into Middle.
    pub fn effective_button(&self) -> PointerButton {
        if self.button == PointerButton::Left && self.ctrl {
            PointerButton::Middle
        } else {
            self.button
        }
    }
}

/// Named key commands delivered by the window loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    ToggleRecording,
    ToggleCalibration,
    ToggleTargeting,
    ToggleAnnotations,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_left_acts_as_middle() {
        let ev = PointerEvent::new(PointerButton::Left, PixelPoint::new(1, 2), true);
        assert_eq!(ev.effective_button(), PointerButton::Middle);
        let ev = PointerEvent::new(PointerButton::Left, PixelPoint::new(1, 2), false);
        assert_eq!(ev.effective_button(), PointerButton::Left);
        let ev = PointerEvent::new(PointerButton::Right, PixelPoint::new(1, 2), true);
        assert_eq!(ev.effective_button(), PointerButton::Right);
    }

    #[test]
    fn dist_sq_is_exact() {
        let a = PixelPoint::new(10, 12);
        assert_eq!(a.dist_sq(PixelPoint::new(10, 10)), 4);
        assert_eq!(a.dist_sq(PixelPoint::new(10, 20)), 64);
    }
}
