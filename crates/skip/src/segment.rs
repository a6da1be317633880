//! Per-segment skip button state.
//!
//! Pure logic, no player or timer access.

use anistream_events::Segment;

use crate::interval::SkipInterval;

/// The intro button shows on first entry.
pub(crate) const INTRO_INITIALLY_SKIPPED: bool = false;

/// The outro button stays hidden on first entry until the position has
/// been outside the outro once. See DESIGN.md before changing this.
pub(crate) const OUTRO_INITIALLY_SKIPPED: bool = true;

/// Logical state of one skip affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    /// Button will show once the position enters the interval.
    Armed,
    /// Position is inside the interval and the button is visible.
    Shown,
    /// User skipped; stays hidden until the position leaves the interval.
    Skipped,
}

#[derive(Debug)]
pub(crate) struct SegmentTracker {
    interval: Option<SkipInterval>,
    initially_skipped: bool,
    skipped: bool,
    visible: bool,
}

impl SegmentTracker {
    pub(crate) fn new(segment: Segment, interval: Option<SkipInterval>) -> Self {
        let initially_skipped = match segment {
            Segment::Intro => INTRO_INITIALLY_SKIPPED,
            Segment::Outro => OUTRO_INITIALLY_SKIPPED,
        };
        Self {
            interval,
            initially_skipped,
            skipped: initially_skipped,
            visible: false,
        }
    }

    /// Recompute visibility for a new position sample.
    ///
    /// Leaving the interval re-arms a skipped button.
    pub(crate) fn observe(&mut self, position_secs: i64) -> bool {
        let Some(interval) = self.interval else {
            self.visible = false;
            return false;
        };

        let inside = interval.contains(position_secs);
        self.visible = inside && !self.skipped;
        if !inside {
            self.skipped = false;
        }
        self.visible
    }

    pub(crate) fn mark_skipped(&mut self) {
        self.skipped = true;
        self.visible = false;
    }

    pub(crate) fn reset(&mut self) {
        self.skipped = self.initially_skipped;
        self.visible = false;
    }

    /// None when the episode has no such interval.
    pub(crate) fn state(&self) -> Option<SegmentState> {
        self.interval?;
        Some(if self.visible {
            SegmentState::Shown
        } else if self.skipped {
            SegmentState::Skipped
        } else {
            SegmentState::Armed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intro(start: i64, end: i64) -> SegmentTracker {
        SegmentTracker::new(Segment::Intro, Some(SkipInterval::new(start, end).unwrap()))
    }

    #[test]
    fn test_armed_shown_skipped_armed() {
        let mut tracker = intro(10, 20);
        assert!(!tracker.observe(9));
        assert_eq!(tracker.state(), Some(SegmentState::Armed));

        assert!(tracker.observe(12));
        assert_eq!(tracker.state(), Some(SegmentState::Shown));

        tracker.mark_skipped();
        assert_eq!(tracker.state(), Some(SegmentState::Skipped));
        assert!(!tracker.observe(15));
        assert_eq!(tracker.state(), Some(SegmentState::Skipped));

        assert!(!tracker.observe(21));
        assert_eq!(tracker.state(), Some(SegmentState::Armed));
        assert!(tracker.observe(12));
    }

    #[test]
    fn test_leaving_while_shown_rearms() {
        let mut tracker = intro(10, 20);
        assert!(tracker.observe(15));
        assert!(!tracker.observe(25));
        assert_eq!(tracker.state(), Some(SegmentState::Armed));
    }

    #[test]
    fn test_outro_hidden_until_first_exit() {
        let mut tracker =
            SegmentTracker::new(Segment::Outro, Some(SkipInterval::new(1000, 1010).unwrap()));
        assert_eq!(tracker.state(), Some(SegmentState::Skipped));

        assert!(!tracker.observe(1005));
        assert!(!tracker.observe(1011));
        assert!(tracker.observe(1005));
    }

    #[test]
    fn test_missing_interval_never_shows() {
        let mut tracker = SegmentTracker::new(Segment::Intro, None);
        assert!(!tracker.observe(0));
        assert!(!tracker.observe(15));
        assert_eq!(tracker.state(), None);
    }

    #[test]
    fn test_reset_restores_initial_flags() {
        let mut tracker = intro(10, 20);
        tracker.observe(12);
        tracker.mark_skipped();

        tracker.reset();
        assert_eq!(tracker.state(), Some(SegmentState::Armed));
        assert!(tracker.observe(12));
    }
}
