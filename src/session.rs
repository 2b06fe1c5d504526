//! Session state machine.
//!
//! Owns all mutable session state (mode, calibration, targets, mouse
//! position, annotation visibility) and routes every pointer and key
//! event. All mutation happens on the single capture thread; handlers
//! run to completion before the next frame is drawn.

use crate::calibration::{Calibration, PointOutcome};
use crate::dispatch::TargetSink;
use crate::logger;
use crate::snap;
use crate::targets::TargetRegistry;
use crate::types::{Frame, Mode, Orientation, PixelPoint, PointerButton, PointerEvent};

/// Result of a mode toggle, observable by callers and tests without
/// scraping log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Entered,
    Exited,
    Rejected(&'static str),
}

pub struct Session {
    mode: Mode,
    calibration: Calibration,
    targets: TargetRegistry,
    snap_radius: i32,
    mouse_position: Option<PixelPoint>,
    hide_annotations: bool,
}

impl Session {
    pub fn new(origin: PixelPoint, snap_radius: i32) -> Self {
        Self {
            mode: Mode::Normal,
            calibration: Calibration::new(origin),
            targets: TargetRegistry::new(),
            snap_radius,
            mouse_position: None,
            hide_annotations: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    pub fn mouse_position(&self) -> Option<PixelPoint> {
        self.mouse_position
    }

    pub fn annotations_hidden(&self) -> bool {
        self.hide_annotations
    }

    pub fn set_mouse_position(&mut self, pos: Option<PixelPoint>) {
        self.mouse_position = pos;
    }

    /// Toggle calibration mode. Only reachable from Normal; entering
    /// discards any half-finished point pair.
    pub fn toggle_calibration(&mut self) -> ToggleOutcome {
        match self.mode {
            Mode::Normal => {
                self.calibration.discard_pending_pair();
                self.mode = Mode::Calibration;
                logger::info("Entering calibration mode...");
                ToggleOutcome::Entered
            }
            Mode::Calibration => {
                self.mode = Mode::Normal;
                logger::info("Exiting calibration mode...");
                ToggleOutcome::Exited
            }
            Mode::Targeting => {
                let msg = "Cannot enter calibration mode in targeting mode";
                logger::warn(msg);
                ToggleOutcome::Rejected(msg)
            }
        }
    }

    /// Toggle targeting mode. Requires a completed calibration; leaving
    /// clears both pending and sent targets.
    pub fn toggle_targeting(&mut self) -> ToggleOutcome {
        if !self.calibration.is_calibrated() {
            let msg = "Cannot enter targeting mode without calibration";
            logger::warn(msg);
            return ToggleOutcome::Rejected(msg);
        }
        match self.mode {
            Mode::Normal => {
                self.mode = Mode::Targeting;
                logger::info("Entering targeting mode...");
                ToggleOutcome::Entered
            }
            Mode::Targeting => {
                self.mode = Mode::Normal;
                self.targets.clear();
                logger::info("Exiting targeting mode...");
                ToggleOutcome::Exited
            }
            Mode::Calibration => {
                let msg = "Cannot enter targeting mode in calibration mode";
                logger::warn(msg);
                ToggleOutcome::Rejected(msg)
            }
        }
    }

    /// Hide or show the calibration annotations. Normal mode only, and
    /// pointless before calibration.
    pub fn toggle_annotations(&mut self) -> ToggleOutcome {
        if self.mode != Mode::Normal {
            let msg = "Cannot hide/show annotations in calibration and targeting modes";
            logger::warn(msg);
            return ToggleOutcome::Rejected(msg);
        }
        if !self.calibration.is_calibrated() {
            let msg = "No annotations to hide/show";
            logger::warn(msg);
            return ToggleOutcome::Rejected(msg);
        }
        self.hide_annotations = !self.hide_annotations;
        if self.hide_annotations {
            logger::info("Hiding annotations...");
            ToggleOutcome::Entered
        } else {
            logger::info("Showing annotations...");
            ToggleOutcome::Exited
        }
    }

    /// Route one pointer event against the current frame. `sink`
    /// receives any dispatched target.
    pub fn handle_pointer(&mut self, event: PointerEvent, frame: &Frame, sink: &mut dyn TargetSink) {
        self.mouse_position = Some(event.pos);
        match self.mode {
            Mode::Calibration => self.handle_calibration_click(event, frame),
            Mode::Targeting => self.handle_targeting_click(event, sink),
            Mode::Normal => {}
        }
    }

    fn handle_calibration_click(&mut self, event: PointerEvent, frame: &Frame) {
        let snapped = snap::nearest_white_pixel(frame, event.pos, self.snap_radius);
        match event.effective_button() {
            // Mark one end of the 10 mm reference span.
            PointerButton::Left => match self.calibration.add_point(snapped) {
                PointOutcome::Accepted => {
                    logger::log(&format!(
                        "Calibration point 1 selected at ({}, {})",
                        snapped.x, snapped.y
                    ));
                }
                PointOutcome::Completed { ratio, orientation } => {
                    logger::log(&format!(
                        "Calibration point 2 selected at ({}, {})",
                        snapped.x, snapped.y
                    ));
                    logger::log(&format!("Calculated pixel to mm ratio: {}", ratio));
                    let dir = match orientation {
                        Orientation::TopDown => "top-down",
                        Orientation::BottomUp => "bottom-up",
                    };
                    logger::log(&format!("Determined frame direction: {}", dir));
                }
                PointOutcome::RejectedDegenerate => {
                    logger::warn(
                        "Calibration points share the same row; please mark two vertically separated points",
                    );
                }
            },
            // Move the origin to the snapped click.
            PointerButton::Right => {
                self.calibration.set_origin(snapped);
                logger::log(&format!(
                    "Frame origin selected at ({}, {})",
                    snapped.x, snapped.y
                ));
                logger::log("Needs recalibration due to frame origin change.");
            }
            // Lazy origin: assume it sits on the vertical center line.
            PointerButton::Middle => {
                let origin = PixelPoint::new(frame.width() as i32 / 2, snapped.y);
                self.calibration.set_origin(origin);
                logger::log(&format!(
                    "Frame origin selected at ({}, {})",
                    origin.x, origin.y
                ));
                logger::log("Needs recalibration due to frame origin change.");
            }
        }
    }

    fn handle_targeting_click(&mut self, event: PointerEvent, sink: &mut dyn TargetSink) {
        // Targeting is only reachable calibrated, so the mapper exists.
        let Some(mapper) = self.calibration.mapper() else {
            logger::error("Targeting mode active without calibration; ignoring click");
            return;
        };
        match event.effective_button() {
            PointerButton::Left => {
                self.targets.select(event.pos);
                let mm = mapper.pixel_to_mm(event.pos);
                logger::log(&format!("Target selected at ({} mm, {} mm)", mm.x, mm.y));
            }
            PointerButton::Right => match self.targets.remove_nearest(event.pos) {
                Some(removed) => {
                    let mm = mapper.pixel_to_mm(removed);
                    logger::log(&format!("Target removed at ({} mm, {} mm)", mm.x, mm.y));
                }
                None => logger::warn("No targets to remove."),
            },
            PointerButton::Middle => match self.targets.dispatch_nearest(event.pos) {
                Some(target) => {
                    let mm = mapper.pixel_to_mm(target);
                    // The target stays in the sent list even if the send
                    // fails; dispatch is fire-and-forget.
                    match sink.send(mm) {
                        Ok(()) => logger::info(&format!(
                            "Target (x = {} mm, y = {} mm) sent",
                            mm.x, mm.y
                        )),
                        Err(e) => logger::error(&format!("Failed to send target: {:#}", e)),
                    }
                }
                None => logger::warn("No targets to send."),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MmPoint;
    use anyhow::anyhow;
    use image::Rgb;

    struct RecordingSink {
        sent: Vec<MmPoint>,
        fail: bool,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                sent: Vec::new(),
                fail: false,
            }
        }
    }

    impl TargetSink for RecordingSink {
        fn send(&mut self, target: MmPoint) -> anyhow::Result<()> {
            if self.fail {
                return Err(anyhow!("network unreachable"));
            }
            self.sent.push(target);
            Ok(())
        }
    }

    fn pt(x: i32, y: i32) -> PixelPoint {
        PixelPoint::new(x, y)
    }

    fn black_frame() -> Frame {
        Frame::from_pixel(1024, 768, Rgb([0, 0, 0]))
    }

    fn left(x: i32, y: i32) -> PointerEvent {
        PointerEvent::new(PointerButton::Left, pt(x, y), false)
    }

    fn right(x: i32, y: i32) -> PointerEvent {
        PointerEvent::new(PointerButton::Right, pt(x, y), false)
    }

    fn middle(x: i32, y: i32) -> PointerEvent {
        PointerEvent::new(PointerButton::Middle, pt(x, y), false)
    }

    /// Calibrate on a black frame (snapper falls through) so clicks
    /// land exactly where the test puts them.
    fn calibrated_session(origin: PixelPoint, y1: i32, y2: i32) -> (Session, Frame) {
        let frame = black_frame();
        let mut session = Session::new(origin, 50);
        let mut sink = RecordingSink::new();
        assert_eq!(session.toggle_calibration(), ToggleOutcome::Entered);
        session.handle_pointer(left(origin.x, y1), &frame, &mut sink);
        session.handle_pointer(left(origin.x, y2), &frame, &mut sink);
        assert!(session.calibration().is_calibrated());
        assert_eq!(session.toggle_calibration(), ToggleOutcome::Exited);
        (session, frame)
    }

    #[test]
    fn targeting_rejected_without_calibration() {
        let mut session = Session::new(pt(512, 384), 50);
        assert!(matches!(
            session.toggle_targeting(),
            ToggleOutcome::Rejected(_)
        ));
        assert_eq!(session.mode(), Mode::Normal);
    }

    #[test]
    fn calibration_and_targeting_never_cross() {
        let (mut session, _) = calibrated_session(pt(512, 384), 100, 200);
        session.toggle_calibration();
        assert_eq!(session.mode(), Mode::Calibration);
        assert!(matches!(
            session.toggle_targeting(),
            ToggleOutcome::Rejected(_)
        ));
        assert_eq!(session.mode(), Mode::Calibration);
        session.toggle_calibration();

        session.toggle_targeting();
        assert_eq!(session.mode(), Mode::Targeting);
        assert!(matches!(
            session.toggle_calibration(),
            ToggleOutcome::Rejected(_)
        ));
        assert_eq!(session.mode(), Mode::Targeting);
    }

    #[test]
    fn exiting_targeting_clears_targets() {
        let (mut session, frame) = calibrated_session(pt(512, 384), 100, 200);
        let mut sink = RecordingSink::new();
        session.toggle_targeting();
        session.handle_pointer(left(600, 400), &frame, &mut sink);
        session.handle_pointer(left(700, 500), &frame, &mut sink);
        session.handle_pointer(middle(601, 401), &frame, &mut sink);
        assert_eq!(session.targets().pending().len(), 1);
        assert_eq!(session.targets().sent().len(), 1);

        session.toggle_targeting();
        assert_eq!(session.mode(), Mode::Normal);
        assert!(session.targets().pending().is_empty());
        assert!(session.targets().sent().is_empty());
    }

    #[test]
    fn lazy_origin_uses_frame_center_line() {
        let frame = black_frame();
        let mut session = Session::new(pt(100, 100), 50);
        let mut sink = RecordingSink::new();
        session.toggle_calibration();
        session.handle_pointer(middle(300, 250), &frame, &mut sink);
        assert_eq!(session.calibration().origin(), pt(512, 250));
        assert!(!session.calibration().is_calibrated());
    }

    #[test]
    fn ctrl_left_dispatches_like_middle() {
        let (mut session, frame) = calibrated_session(pt(512, 145), 95, 195);
        let mut sink = RecordingSink::new();
        session.toggle_targeting();
        session.handle_pointer(left(612, 245), &frame, &mut sink);
        session.handle_pointer(
            PointerEvent::new(PointerButton::Left, pt(612, 245), true),
            &frame,
            &mut sink,
        );
        assert_eq!(sink.sent, vec![MmPoint { x: 10.0, y: 10.0 }]);
        assert_eq!(session.targets().sent(), &[pt(612, 245)]);
    }

    #[test]
    fn failed_send_keeps_target_in_sent() {
        let (mut session, frame) = calibrated_session(pt(512, 384), 100, 200);
        let mut sink = RecordingSink::new();
        sink.fail = true;
        session.toggle_targeting();
        session.handle_pointer(left(600, 400), &frame, &mut sink);
        session.handle_pointer(middle(600, 400), &frame, &mut sink);
        assert!(sink.sent.is_empty());
        assert!(session.targets().pending().is_empty());
        assert_eq!(session.targets().sent(), &[pt(600, 400)]);
    }

    #[test]
    fn empty_registry_clicks_warn_and_noop() {
        let (mut session, frame) = calibrated_session(pt(512, 384), 100, 200);
        let mut sink = RecordingSink::new();
        session.toggle_targeting();
        session.handle_pointer(right(10, 10), &frame, &mut sink);
        session.handle_pointer(middle(10, 10), &frame, &mut sink);
        assert!(sink.sent.is_empty());
        assert_eq!(session.mode(), Mode::Targeting);
    }

    #[test]
    fn origin_change_forces_recalibration_before_targeting() {
        let (mut session, frame) = calibrated_session(pt(512, 384), 100, 200);
        let mut sink = RecordingSink::new();
        session.toggle_calibration();
        session.handle_pointer(right(400, 300), &frame, &mut sink);
        assert!(!session.calibration().is_calibrated());
        session.toggle_calibration();
        assert!(matches!(
            session.toggle_targeting(),
            ToggleOutcome::Rejected(_)
        ));
    }

    #[test]
    fn annotations_toggle_guards() {
        let mut session = Session::new(pt(512, 384), 50);
        // Uncalibrated: nothing to hide.
        assert!(matches!(
            session.toggle_annotations(),
            ToggleOutcome::Rejected(_)
        ));

        let (mut session, _) = calibrated_session(pt(512, 384), 100, 200);
        assert_eq!(session.toggle_annotations(), ToggleOutcome::Entered);
        assert!(session.annotations_hidden());
        assert_eq!(session.toggle_annotations(), ToggleOutcome::Exited);
        assert!(!session.annotations_hidden());

        session.toggle_calibration();
        assert!(matches!(
            session.toggle_annotations(),
            ToggleOutcome::Rejected(_)
        ));
    }

    #[test]
    fn end_to_end_dispatch_scenario() {
        let (mut session, frame) = calibrated_session(pt(512, 145), 95, 195);
        assert_eq!(session.calibration().ratio(), Some(0.1));
        assert_eq!(
            session.calibration().orientation(),
            Some(Orientation::TopDown)
        );

        let mut sink = RecordingSink::new();
        session.toggle_targeting();
        session.handle_pointer(left(612, 245), &frame, &mut sink);
        session.handle_pointer(middle(612, 245), &frame, &mut sink);
        assert_eq!(sink.sent, vec![MmPoint { x: 10.0, y: 10.0 }]);
    }
}
