//! Bright-pixel snapping.
//!
//! Depth-scale tick marks on an ultrasound frame render as small white
//! dots, so a click near the scale is adjusted to the closest white
//! pixel in a bounded window. A click with no white pixel nearby is
//! used as-is.

use crate::types::{Frame, PixelPoint};

/// All three channels must reach this value for a pixel to count as white.
pub const WHITE_THRESHOLD: u8 = 225;

/// Half-width of the axis-aligned search box, in pixels.
pub const DEFAULT_SEARCH_RADIUS: i32 = 50;

/// Return the white pixel nearest to `point` within `radius`, or
/// `point` itself if the window contains none. The scan is row-major,
/// so among equally distant candidates the smallest row, then smallest
/// column, wins.
pub fn nearest_white_pixel(frame: &Frame, point: PixelPoint, radius: i32) -> PixelPoint {
    let width = frame.width() as i32;
    let height = frame.height() as i32;

    let y_min = (point.y - radius).max(0);
    let y_max = (point.y + radius).min(height);
    let x_min = (point.x - radius).max(0);
    let x_max = (point.x + radius).min(width);

    let mut best = point;
    let mut best_dist = i64::MAX;
    for y in y_min..y_max {
        for x in x_min..x_max {
            let px = frame.get_pixel(x as u32, y as u32);
            if px.0.iter().all(|&c| c >= WHITE_THRESHOLD) {
                let candidate = PixelPoint::new(x, y);
                let dist = candidate.dist_sq(point);
                if dist < best_dist {
                    best_dist = dist;
                    best = candidate;
                }
            }
        }
    }
    best
}
