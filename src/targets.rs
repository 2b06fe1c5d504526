//! Pending and sent target collections.
//!
//! Targets are raw click positions; their mm values are derived at
//! display or dispatch time so a recalibration is always reflected.
//! Sent targets are kept only so the renderer can acknowledge them on
//! screen.

use crate::types::PixelPoint;

#[derive(Debug, Default)]
pub struct TargetRegistry {
    pending: Vec<PixelPoint>,
    sent: Vec<PixelPoint>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[PixelPoint] {
        &self.pending
    }

    pub fn sent(&self) -> &[PixelPoint] {
        &self.sent
    }

    pub fn select(&mut self, point: PixelPoint) {
        self.pending.push(point);
    }

    /// Index of the pending target closest to `click`. Ties go to the
    /// earliest-selected target. `None` when nothing is pending.
    fn nearest_pending(&self, click: PixelPoint) -> Option<usize> {
        let mut best: Option<(usize, i64)> = None;
        for (i, target) in self.pending.iter().enumerate() {
            let dist = target.dist_sq(click);
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((i, dist));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Remove the pending target nearest to `click`, returning it.
    pub fn remove_nearest(&mut self, click: PixelPoint) -> Option<PixelPoint> {
        let idx = self.nearest_pending(click)?;
        Some(self.pending.remove(idx))
    }

    /// Take the pending target nearest to `click` and move it to the
    /// sent collection, returning it for dispatch.
    pub fn dispatch_nearest(&mut self, click: PixelPoint) -> Option<PixelPoint> {
        let idx = self.nearest_pending(click)?;
        let target = self.pending.remove(idx);
        self.sent.push(target);
        Some(target)
    }

    /// Drop everything; leaving targeting mode ends the engagement.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.sent.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: i32, y: i32) -> PixelPoint {
        PixelPoint::new(x, y)
    }

    #[test]
    fn select_then_remove_restores_state() {
        let mut reg = TargetRegistry::new();
        reg.select(pt(10, 10));
        reg.select(pt(30, 30));
        let before: Vec<_> = reg.pending().to_vec();

        reg.select(pt(200, 200));
        assert_eq!(reg.remove_nearest(pt(201, 199)), Some(pt(200, 200)));
        assert_eq!(reg.pending(), before.as_slice());
        assert!(reg.sent().is_empty());
    }

    #[test]
    fn nearest_selection_is_deterministic() {
        let mut reg = TargetRegistry::new();
        reg.select(pt(10, 10));
        reg.select(pt(10, 20));
        reg.select(pt(100, 100));
        // Click (10,12): distance² 4 to (10,10) beats 64 to (10,20).
        assert_eq!(reg.remove_nearest(pt(10, 12)), Some(pt(10, 10)));
    }

    #[test]
    fn ties_go_to_insertion_order() {
        let mut reg = TargetRegistry::new();
        reg.select(pt(10, 20));
        reg.select(pt(10, 10));
        // Click equidistant from both; the first-selected wins.
        assert_eq!(reg.remove_nearest(pt(10, 15)), Some(pt(10, 20)));
    }

    #[test]
    fn empty_registry_operations_are_noops() {
        let mut reg = TargetRegistry::new();
        assert_eq!(reg.remove_nearest(pt(0, 0)), None);
        assert_eq!(reg.dispatch_nearest(pt(0, 0)), None);
    }

    #[test]
    fn dispatch_moves_pending_to_sent() {
        let mut reg = TargetRegistry::new();
        reg.select(pt(10, 10));
        reg.select(pt(50, 50));
        assert_eq!(reg.dispatch_nearest(pt(11, 11)), Some(pt(10, 10)));
        assert_eq!(reg.pending(), &[pt(50, 50)]);
        assert_eq!(reg.sent(), &[pt(10, 10)]);
    }

    #[test]
    fn clear_drops_both_collections() {
        let mut reg = TargetRegistry::new();
        reg.select(pt(10, 10));
        reg.dispatch_nearest(pt(10, 10));
        reg.select(pt(20, 20));
        reg.clear();
        assert!(reg.pending().is_empty());
        assert!(reg.sent().is_empty());
    }
}
