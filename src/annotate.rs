//! Overlay rendering.
//!
//! Draws mode banners, the calibration ruler, the origin marker,
//! target dots and the mouse crosshair straight into the RGB display
//! buffer. Pure presentation: reads session state, mutates pixels,
//! decides nothing.

use crate::font;
use crate::session::Session;
use crate::types::{Mode, PixelPoint};

const YELLOW: (u8, u8, u8) = (255, 255, 0);
const RED: (u8, u8, u8) = (255, 0, 0);
const GREEN: (u8, u8, u8) = (0, 255, 0);
const CYAN: (u8, u8, u8) = (0, 255, 255);
const BLACK: (u8, u8, u8) = (0, 0, 0);

const TEXT_SCALE: usize = 2;
const DOT_RADIUS: i32 = 5;

pub struct Canvas<'a> {
    buffer: &'a mut [u8],
    width: i32,
    height: i32,
}

impl<'a> Canvas<'a> {
    pub fn new(buffer: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            buffer,
            width: width as i32,
            height: height as i32,
        }
    }

    fn put_px(&mut self, x: i32, y: i32, color: (u8, u8, u8)) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        if idx + 2 < self.buffer.len() {
            self.buffer[idx] = color.0;
            self.buffer[idx + 1] = color.1;
            self.buffer[idx + 2] = color.2;
        }
    }

    fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: (u8, u8, u8)) {
        for y in y0..y1 {
            for x in x0..x1 {
                self.put_px(x, y, color);
            }
        }
    }

    fn fill_circle(&mut self, center: PixelPoint, radius: i32, color: (u8, u8, u8)) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.put_px(center.x + dx, center.y + dy, color);
                }
            }
        }
    }

    fn vline(&mut self, x: i32, y0: i32, y1: i32, color: (u8, u8, u8), thickness: i32) {
        let (lo, hi) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        for y in lo..=hi {
            for t in 0..thickness {
                self.put_px(x + t, y, color);
            }
        }
    }

    fn hline(&mut self, y: i32, x0: i32, x1: i32, color: (u8, u8, u8), thickness: i32) {
        let (lo, hi) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        for x in lo..=hi {
            for t in 0..thickness {
                self.put_px(x, y + t, color);
            }
        }
    }

    fn text(&mut self, x: i32, y: i32, s: &str, color: (u8, u8, u8)) {
        if x < 0 || y < 0 {
            return;
        }
        font::draw_text_line(
            self.buffer,
            self.width as usize,
            self.height as usize,
            x as usize,
            y as usize,
            s,
            color,
            TEXT_SCALE,
        );
    }

    fn label(&mut self, anchor: PixelPoint, s: &str, color: (u8, u8, u8)) {
        self.text(anchor.x + 10, anchor.y - 10, s, color);
    }
}

/// Red dot telling the operator the session is being recorded. Drawn
/// on the display copy only, never on the recorded frames.
pub fn draw_recording_indicator(canvas: &mut Canvas) {
    let center = PixelPoint::new(canvas.width - 30, 30);
    canvas.fill_circle(center, 10, RED);
}

pub fn render(canvas: &mut Canvas, session: &Session) {
    let calibration = session.calibration();

    if calibration.is_calibrated() && !session.annotations_hidden() {
        let points = calibration.points();
        let (p1, p2) = (points[0], points[1]);
        // Ruler along the marked 10 mm span.
        canvas.vline(p1.x, p1.y, p2.y, YELLOW, 2);
        canvas.fill_circle(p1, DOT_RADIUS, YELLOW);
        canvas.fill_circle(PixelPoint::new(p1.x, p2.y), DOT_RADIUS, YELLOW);
        if let Some(span) = calibration.ruler_span_px() {
            let text = format!("10MM = {} PX", span);
            let w = font::text_width(&text, TEXT_SCALE) as i32;
            canvas.fill_rect(
                canvas.width - w - 40,
                26,
                canvas.width - 20,
                30 + font::text_height(TEXT_SCALE) as i32 + 4,
                BLACK,
            );
            canvas.text(canvas.width - w - 30, 30, &text, YELLOW);
        }
        canvas.fill_circle(calibration.origin(), DOT_RADIUS, YELLOW);
        canvas.label(calibration.origin(), "ORIGIN", YELLOW);
    }

    match session.mode() {
        Mode::Calibration => render_calibration_overlay(canvas, session),
        Mode::Targeting => render_targeting_overlay(canvas, session),
        Mode::Normal => {}
    }
}

fn render_calibration_overlay(canvas: &mut Canvas, session: &Session) {
    let calibration = session.calibration();

    canvas.fill_rect(5, 10, 700, 100, BLACK);
    canvas.text(10, 20, "CALIBRATION MODE", GREEN);
    canvas.text(10, 40, "RIGHT CLICK: SELECT FRAME ORIGIN", GREEN);
    canvas.text(10, 60, "LEFT CLICK: MARK 10MM DEPTH WITH TWO POINTS", GREEN);

    if !calibration.is_calibrated() {
        canvas.fill_circle(calibration.origin(), DOT_RADIUS, YELLOW);
        canvas.label(calibration.origin(), "ORIGIN", YELLOW);
        canvas.text(10, 80, "CALIBRATION NOT COMPLETED", YELLOW);
        for point in calibration.points() {
            canvas.fill_circle(*point, DOT_RADIUS, RED);
        }
    }

    if let Some(pos) = session.mouse_position() {
        canvas.vline(pos.x, 0, canvas.height - 1, GREEN, 1);
        canvas.hline(pos.y, 0, canvas.width - 1, GREEN, 1);
        canvas.label(pos, &format!("({}, {})", pos.x, pos.y), GREEN);
    }
}

fn render_targeting_overlay(canvas: &mut Canvas, session: &Session) {
    canvas.fill_rect(5, 10, 630, 80, BLACK);
    canvas.text(10, 20, "TARGETING MODE: SELECT TARGETS", CYAN);
    canvas.text(10, 40, "LEFT CLICK: SELECT, RIGHT CLICK: REMOVE", CYAN);
    canvas.text(10, 60, "MIDDLE CLICK: SEND NEAREST TARGET", CYAN);

    if let Some(pos) = session.mouse_position() {
        canvas.vline(pos.x, 0, canvas.height - 1, CYAN, 1);
        canvas.hline(pos.y, 0, canvas.width - 1, CYAN, 1);
        // Targeting mode implies a live mapper.
        if let Some(mapper) = session.calibration().mapper() {
            let mm = mapper.pixel_to_mm(pos);
            canvas.label(pos, &format!("({:.3} MM, {:.3} MM)", mm.x, mm.y), CYAN);
        }
    }

    for target in session.targets().pending() {
        canvas.fill_circle(*target, DOT_RADIUS, RED);
    }
    for (idx, target) in session.targets().sent().iter().enumerate() {
        canvas.fill_circle(*target, DOT_RADIUS, GREEN);
        canvas.label(*target, &format!("{}", idx + 1), GREEN);
    }
}
