//! Incremental scroll sweep.
//!
//! Full-page captures only look right once lazy-loaded content has rendered,
//! so before capturing we walk the page top to bottom in fixed steps. The
//! sweep is modeled as a plain state machine: the caller reads the page's
//! current scroll height, feeds it to [`ScrollSweep::advance`], and performs
//! the returned step. Re-reading the height on every step means content that
//! grows while scrolling (infinite lists, late images) is chased until either
//! the accumulated offset covers it or the step cap is hit. The cap makes the
//! sweep terminate on any height sequence, including one that grows forever.

/// What the caller should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStep {
    /// Scroll down by this many pixels, pause, then advance again.
    Scroll { by: u32 },
    /// The accumulated offset covers the page height; the sweep is complete.
    Done,
    /// The step cap was reached before the height was covered.
    Exhausted,
}

/// Driver state for one page's scroll sweep.
#[derive(Debug)]
pub struct ScrollSweep {
    step_px: u32,
    max_steps: u32,
    offset: u64,
    steps: u32,
}

impl ScrollSweep {
    #[must_use]
    pub fn new(step_px: u32, max_steps: u32) -> Self {
        Self {
            step_px,
            max_steps,
            offset: 0,
            steps: 0,
        }
    }

    /// Decide the next step given the page's current scroll height.
    ///
    /// Terminal outcomes are stable: once `Done` or `Exhausted` is returned
    /// for a given height, calling again with the same height returns the
    /// same answer without mutating state.
    pub fn advance(&mut self, scroll_height: u64) -> SweepStep {
        if self.offset >= scroll_height {
            return SweepStep::Done;
        }
        if self.steps >= self.max_steps {
            return SweepStep::Exhausted;
        }
        self.steps += 1;
        self.offset += u64::from(self.step_px);
        SweepStep::Scroll { by: self.step_px }
    }

    /// Number of scroll steps performed so far.
    #[must_use]
    pub fn steps_taken(&self) -> u32 {
        self.steps
    }

    /// Total pixels scrolled so far.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    /// Run a sweep against a height schedule, returning (steps, final step).
    /// Heights past the end of the schedule repeat the last entry.
    fn run(sweep: &mut ScrollSweep, heights: &[u64]) -> (u32, SweepStep) {
        let mut i = 0;
        loop {
            let height = heights[i.min(heights.len() - 1)];
            match sweep.advance(height) {
                SweepStep::Scroll { .. } => i += 1,
                terminal => return (sweep.steps_taken(), terminal),
            }
        }
    }

    #[test]
    fn fixed_height_completes_in_expected_steps() {
        let mut sweep = ScrollSweep::new(100, 600);
        let (steps, end) = run(&mut sweep, &[1000]);
        assert_eq!(steps, 10);
        assert_eq!(end, SweepStep::Done);
        assert_eq!(sweep.offset(), 1000);
    }

    #[test]
    fn zero_height_completes_without_scrolling() {
        let mut sweep = ScrollSweep::new(100, 600);
        assert_eq!(sweep.advance(0), SweepStep::Done);
        assert_eq!(sweep.steps_taken(), 0);
    }

    #[test]
    fn height_smaller_than_one_step_takes_a_single_step() {
        let mut sweep = ScrollSweep::new(100, 600);
        assert_eq!(sweep.advance(50), SweepStep::Scroll { by: 100 });
        assert_eq!(sweep.advance(50), SweepStep::Done);
        assert_eq!(sweep.steps_taken(), 1);
    }

    #[test]
    fn growing_height_is_chased_until_covered() {
        // Content grows 50px per step while we scroll 100px per step, so the
        // sweep gains ground and finishes.
        let heights: Vec<u64> = (0..20).map(|n| 500 + 50 * n).collect();
        let mut sweep = ScrollSweep::new(100, 600);
        let (steps, end) = run(&mut sweep, &heights);
        assert_eq!(end, SweepStep::Done);
        assert_eq!(steps, 10);
    }

    #[test]
    fn runaway_height_exhausts_at_the_cap() {
        // Content grows faster than we scroll; only the cap ends the sweep.
        let heights: Vec<u64> = (0..100).map(|n| 1000 + 500 * n).collect();
        let mut sweep = ScrollSweep::new(100, 8);
        let (steps, end) = run(&mut sweep, &heights);
        assert_eq!(end, SweepStep::Exhausted);
        assert_eq!(steps, 8);
    }

    #[test]
    fn sweep_terminates_for_any_height_schedule() {
        // Adversarial schedule: height always one step ahead of the offset.
        let mut sweep = ScrollSweep::new(137, 50);
        let mut calls = 0u32;
        loop {
            calls += 1;
            assert!(calls <= 51, "sweep must terminate within max_steps + 1 calls");
            match sweep.advance(sweep.offset() + 1) {
                SweepStep::Scroll { .. } => {},
                SweepStep::Exhausted => break,
                SweepStep::Done => panic!("height stays ahead, Done is unreachable"),
            }
        }
        assert_eq!(sweep.steps_taken(), 50);
    }

    #[test]
    fn terminal_outcomes_are_stable() {
        let mut sweep = ScrollSweep::new(100, 600);
        assert_eq!(sweep.advance(0), SweepStep::Done);
        assert_eq!(sweep.advance(0), SweepStep::Done);
        assert_eq!(sweep.offset(), 0);

        let mut capped = ScrollSweep::new(100, 1);
        assert_eq!(capped.advance(1000), SweepStep::Scroll { by: 100 });
        assert_eq!(capped.advance(1000), SweepStep::Exhausted);
        assert_eq!(capped.advance(1000), SweepStep::Exhausted);
        assert_eq!(capped.steps_taken(), 1);
    }
}
