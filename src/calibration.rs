//! Two-point depth calibration.
//!
//! The operator marks two tick marks that are 10 mm apart on the
//! on-screen depth scale. The vertical pixel distance between them
//! yields the mm-per-pixel ratio, and their placement relative to the
//! frame origin tells whether the image is rendered top-down or
//! bottom-up. Calibration holds until the origin moves or a new pair
//! is started.

use crate::types::{MmPoint, Orientation, PixelPoint};

/// Physical distance the operator is asked to mark, in millimeters.
pub const REFERENCE_SPAN_MM: f64 = 10.0;

/// A finished calibration: the marked pair plus the derived mapping.
#[derive(Debug, Clone, Copy)]
struct Completed {
    points: [PixelPoint; 2],
    ratio: f64,
    orientation: Orientation,
}

/// Outcome of committing one calibration point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointOutcome {
    /// First point of a pair accepted; waiting for the second.
    Accepted,
    /// Second point accepted and the mapping derived.
    Completed { ratio: f64, orientation: Orientation },
    /// The two points share a y coordinate; no ratio can be derived.
    /// The pair is dropped and the operator must mark a new one.
    RejectedDegenerate,
}

pub struct Calibration {
    origin: PixelPoint,
    buffer: Vec<PixelPoint>,
    completed: Option<Completed>,
}

impl Calibration {
    pub fn new(origin: PixelPoint) -> Self {
        Self {
            origin,
            buffer: Vec::new(),
            completed: None,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.completed.is_some()
    }

    pub fn origin(&self) -> PixelPoint {
        self.origin
    }

    pub fn ratio(&self) -> Option<f64> {
        self.completed.as_ref().map(|c| c.ratio)
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.completed.as_ref().map(|c| c.orientation)
    }

    /// Points to draw: the committed pair once calibrated, otherwise
    /// whatever is buffered so far.
    pub fn points(&self) -> &[PixelPoint] {
        match &self.completed {
            Some(c) => &c.points,
            None => &self.buffer,
        }
    }

    /// Vertical pixel distance covered by the committed reference pair.
    pub fn ruler_span_px(&self) -> Option<i32> {
        self.completed
            .as_ref()
            .map(|c| (c.points[1].y - c.points[0].y).abs())
    }

    /// Called on entering calibration mode: any half-finished pair is
    /// discarded, but a previously committed calibration stays valid
    /// until two new points commit.
    pub fn discard_pending_pair(&mut self) {
        self.buffer.clear();
    }

    /// Commit one (already snapped) calibration point.
    ///
    /// Starting a new point while calibrated drops the old calibration
    /// and begins a fresh pair. When the pair completes, the ratio is
    /// `10 mm / |Δy|` and the orientation is bottom-up exactly when the
    /// pair's midpoint lies strictly above the origin.
    pub fn add_point(&mut self, point: PixelPoint) -> PointOutcome {
        if self.completed.take().is_some() {
            self.buffer.clear();
        }
        self.buffer.push(point);
        if self.buffer.len() < 2 {
            return PointOutcome::Accepted;
        }

        let (p1, p2) = (self.buffer[0], self.buffer[1]);
        let dy = (p2.y - p1.y).abs();
        if dy == 0 {
            self.buffer.clear();
            return PointOutcome::RejectedDegenerate;
        }

        let ratio = REFERENCE_SPAN_MM / dy as f64;
        let midpoint_y = 0.5 * (p1.y + p2.y) as f64;
        let orientation = if midpoint_y < self.origin.y as f64 {
            Orientation::BottomUp
        } else {
            Orientation::TopDown
        };
        self.completed = Some(Completed {
            points: [p1, p2],
            ratio,
            orientation,
        });
        self.buffer.clear();
        PointOutcome::Completed { ratio, orientation }
    }

    /// Move the frame origin. The mm mapping is defined relative to the
    /// origin, so any existing calibration is invalidated.
    pub fn set_origin(&mut self, origin: PixelPoint) {
        self.origin = origin;
        self.completed = None;
        self.buffer.clear();
    }

    /// Pixel→mm mapper, available only while calibrated.
    pub fn mapper(&self) -> Option<Mapper> {
        self.completed.as_ref().map(|c| Mapper {
            origin: self.origin,
            ratio: c.ratio,
            orientation: c.orientation,
        })
    }
}

/// Converts pixel coordinates to millimeters. Only obtainable from a
/// completed calibration, so the ratio is always finite and positive.
#[derive(Debug, Clone, Copy)]
pub struct Mapper {
    origin: PixelPoint,
    ratio: f64,
    orientation: Orientation,
}

impl Mapper {
    /// Orientation flips the vertical axis only. The horizontal axis is
    /// left untouched on purpose; the robot-side calibration expects it.
    pub fn pixel_to_mm(&self, p: PixelPoint) -> MmPoint {
        MmPoint {
            x: (p.x - self.origin.x) as f64 * self.ratio,
            y: (p.y - self.origin.y) as f64 * self.ratio * self.orientation.sign(),
        }
    }
}
