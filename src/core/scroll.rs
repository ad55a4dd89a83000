// ChiloDisco - core/scroll.rs
//
// Scroll retention across re-renders.
//
// Before a panel's content is replaced, its viewport state is captured
// (offset, full height, whether it sat at the bottom). Once the new content
// is laid out, the viewport either jumps to the bottom (stick preference on,
// or it was at the bottom already) or goes back to its previous offset.
// User scrolling in between flips the panel's stick preference.
//
// The `Viewport` trait keeps this independent of the GUI toolkit; the egui
// adapter feeds `ViewportMetrics` read back from each frame's scroll area.

use crate::util::constants::AT_BOTTOM_TOLERANCE_PX;

/// A vertically scrollable region.
pub trait Viewport {
    /// Current offset from the top of the content.
    fn scroll_top(&self) -> f32;
    /// Full height of the content.
    fn scroll_height(&self) -> f32;
    /// Visible height.
    fn client_height(&self) -> f32;
    /// Move to `top`. Implementations clamp to the scrollable range.
    fn set_scroll_top(&mut self, top: f32);
}

/// Largest valid offset.
pub fn max_scroll_top(v: &dyn Viewport) -> f32 {
    (v.scroll_height() - v.client_height()).max(0.0)
}

/// True when the viewport shows (nearly) the end of its content.
pub fn is_at_bottom(v: &dyn Viewport) -> bool {
    v.scroll_height() - v.scroll_top() - v.client_height() <= AT_BOTTOM_TOLERANCE_PX
}

pub fn scroll_to_bottom(v: &mut dyn Viewport) {
    let bottom = max_scroll_top(v);
    v.set_scroll_top(bottom);
}

/// Plain viewport measurements.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportMetrics {
    pub scroll_top: f32,
    pub scroll_height: f32,
    pub client_height: f32,
}

impl Viewport for ViewportMetrics {
    fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    fn scroll_height(&self) -> f32 {
        self.scroll_height
    }

    fn client_height(&self) -> f32 {
        self.client_height
    }

    fn set_scroll_top(&mut self, top: f32) {
        let max = max_scroll_top(self);
        self.scroll_top = top.clamp(0.0, max);
    }
}

/// Viewport state captured just before a re-render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSnapshot {
    pub top: f32,
    pub height: f32,
    pub was_at_bottom: bool,
    pub stick: bool,
}

impl ScrollSnapshot {
    /// Capture `viewport` (absent viewports count as at the bottom).
    pub fn capture(viewport: Option<&dyn Viewport>, stick: bool) -> Self {
        match viewport {
            Some(v) => Self {
                top: v.scroll_top(),
                height: v.scroll_height(),
                was_at_bottom: is_at_bottom(v),
                stick,
            },
            None => Self {
                top: 0.0,
                height: 0.0,
                was_at_bottom: true,
                stick,
            },
        }
    }

    /// Whether the re-rendered viewport should end up at the bottom.
    pub fn follows_bottom(&self) -> bool {
        self.stick || self.was_at_bottom
    }

    /// Apply to the re-rendered viewport.
    pub fn restore(&self, viewport: &mut dyn Viewport) {
        if self.follows_bottom() {
            scroll_to_bottom(viewport);
        } else {
            viewport.set_scroll_top(self.top);
        }
    }
}

/// What a panel's viewport must do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameOutcome {
    /// Offset the viewport should be moved to on the next frame.
    pub move_to: Option<f32>,
    /// Set when the user scrolled: the new stick preference.
    pub stick_changed: Option<bool>,
}

/// Per-panel scroll bookkeeping. Lives inside the panel so it survives
/// reconciliation together with the panel.
#[derive(Debug, Clone, Default)]
pub struct ScrollTracker {
    /// Metrics as of the end of the last frame.
    last: Option<ViewportMetrics>,
    /// Captured before a content update, consumed by the next frame.
    pending: Option<ScrollSnapshot>,
    /// Offset we asked the viewport to take and have not yet seen applied.
    requested: Option<f32>,
}

impl ScrollTracker {
    /// Record the viewport state before the panel's content is replaced.
    pub fn before_update(&mut self, stick: bool) {
        let viewport = self.last.as_ref().map(|m| m as &dyn Viewport);
        self.pending = Some(ScrollSnapshot::capture(viewport, stick));
    }

    /// True while a captured snapshot waits for the next frame.
    pub fn has_pending_update(&self) -> bool {
        self.pending.is_some()
    }

    /// Offset to force on the viewport this frame, if any.
    pub fn requested_offset(&self) -> Option<f32> {
        self.requested
    }

    /// Feed back the viewport as laid out this frame.
    pub fn after_frame(&mut self, metrics: ViewportMetrics) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();

        if let Some(snapshot) = self.pending.take() {
            let mut target = metrics;
            snapshot.restore(&mut target);
            if (target.scroll_top - metrics.scroll_top).abs() > f32::EPSILON {
                outcome.move_to = Some(target.scroll_top);
            }
            self.requested = outcome.move_to;
            self.last = Some(target);
            return outcome;
        }

        if self.requested.take().is_some() {
            // The forced offset was applied this frame; not a user scroll.
            self.last = Some(metrics);
            return outcome;
        }

        if let Some(prev) = self.last {
            if (prev.scroll_top - metrics.scroll_top).abs() > 0.5 {
                outcome.stick_changed = Some(is_at_bottom(&metrics));
            }
        }
        self.last = Some(metrics);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(top: f32, height: f32, client: f32) -> ViewportMetrics {
        ViewportMetrics {
            scroll_top: top,
            scroll_height: height,
            client_height: client,
        }
    }

    #[test]
    fn test_at_bottom_tolerance_is_eight_px() {
        assert!(is_at_bottom(&viewport(692.0, 1000.0, 300.0)));
        assert!(!is_at_bottom(&viewport(691.0, 1000.0, 300.0)));
        // Content shorter than the viewport is always "at the bottom".
        assert!(is_at_bottom(&viewport(0.0, 100.0, 300.0)));
    }

    #[test]
    fn test_restore_sticks_to_bottom() {
        let before = viewport(100.0, 1000.0, 300.0);
        let snap = ScrollSnapshot::capture(Some(&before), true);
        let mut after = viewport(100.0, 1400.0, 300.0);
        snap.restore(&mut after);
        assert_eq!(after.scroll_top, after.scroll_height - after.client_height);
    }

    #[test]
    fn test_restore_follows_when_previously_at_bottom() {
        let before = viewport(700.0, 1000.0, 300.0);
        let snap = ScrollSnapshot::capture(Some(&before), false);
        assert!(snap.was_at_bottom);
        let mut after = viewport(700.0, 1400.0, 300.0);
        snap.restore(&mut after);
        assert_eq!(after.scroll_top, 1100.0);
    }

    #[test]
    fn test_restore_keeps_offset_when_scrolled_up() {
        let before = viewport(250.0, 1000.0, 300.0);
        let snap = ScrollSnapshot::capture(Some(&before), false);
        let mut after = viewport(0.0, 1400.0, 300.0);
        snap.restore(&mut after);
        assert_eq!(after.scroll_top, 250.0);
    }

    #[test]
    fn test_missing_viewport_counts_as_bottom() {
        let snap = ScrollSnapshot::capture(None, false);
        assert!(snap.follows_bottom());
    }

    #[test]
    fn test_tracker_moves_to_bottom_after_update() {
        let mut t = ScrollTracker::default();
        // First frame: nothing captured yet, viewport shows the top.
        assert_eq!(t.after_frame(viewport(0.0, 1000.0, 300.0)), FrameOutcome::default());

        t.before_update(true);
        let out = t.after_frame(viewport(0.0, 1200.0, 300.0));
        assert_eq!(out.move_to, Some(900.0));
        assert_eq!(t.requested_offset(), Some(900.0));

        // The forced move lands next frame and is not mistaken for the user.
        let out = t.after_frame(viewport(900.0, 1200.0, 300.0));
        assert_eq!(out, FrameOutcome::default());
        assert_eq!(t.requested_offset(), None);
    }

    #[test]
    fn test_tracker_reports_user_scroll() {
        let mut t = ScrollTracker::default();
        t.after_frame(viewport(700.0, 1000.0, 300.0));

        let up = t.after_frame(viewport(200.0, 1000.0, 300.0));
        assert_eq!(up.stick_changed, Some(false));

        let back_down = t.after_frame(viewport(698.0, 1000.0, 300.0));
        assert_eq!(back_down.stick_changed, Some(true));

        let idle = t.after_frame(viewport(698.0, 1000.0, 300.0));
        assert_eq!(idle.stick_changed, None);
    }

    #[test]
    fn test_tracker_keeps_offset_when_not_following() {
        let mut t = ScrollTracker::default();
        t.after_frame(viewport(100.0, 1000.0, 300.0));
        t.before_update(false);
        assert!(t.has_pending_update());
        // Offset unchanged by the re-render: nothing to do.
        let out = t.after_frame(viewport(100.0, 1300.0, 300.0));
        assert_eq!(out.move_to, None);
        assert!(!t.has_pending_update());
    }
}
