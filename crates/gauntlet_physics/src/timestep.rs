//! Fixed-timestep clock
//!
//! Real frame time is accumulated (capped at a few steps' worth) and drained
//! in fixed steps. Physics time is derived from an integer step count so it
//! does not drift no matter how many steps have run.

/// Slack for rounding left over after draining whole steps
const STEP_TOLERANCE: f64 = 1e-9;

/// Fixed-step accumulator and physics clock
#[derive(Clone, Debug)]
pub struct FixedTimestep {
    step: f64,
    max_accumulated: f64,
    accumulated: f64,
    origin: f64,
    steps: u64,
}

impl FixedTimestep {
    /// Clock ticking at `rate` steps per second, accumulating at most
    /// `max_steps` steps per frame
    pub fn new(rate: f64, max_steps: u32) -> Self {
        let step = 1.0 / rate;
        Self {
            step,
            max_accumulated: step * max_steps as f64,
            accumulated: 0.0,
            origin: 0.0,
            steps: 0,
        }
    }

    /// Step length in seconds
    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[inline]
    pub fn step_f32(&self) -> f32 {
        self.step as f32
    }

    /// Current physics time in seconds
    #[inline]
    pub fn time(&self) -> f64 {
        self.origin + self.steps as f64 * self.step
    }

    /// Steps taken since the clock was last reset
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    #[inline]
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    /// Add elapsed real time, clamped to the accumulation cap
    pub fn accumulate(&mut self, delta: f64) {
        self.accumulated = (self.accumulated + delta.max(0.0)).min(self.max_accumulated);
    }

    /// Consume one step if enough time has accumulated, advancing the clock
    pub fn try_step(&mut self) -> bool {
        if self.accumulated + STEP_TOLERANCE >= self.step {
            self.accumulated = (self.accumulated - self.step).max(0.0);
            self.steps += 1;
            true
        } else {
            false
        }
    }

    /// Accumulate `delta` and return how many steps are now due
    ///
    /// Steps are consumed immediately; use [`FixedTimestep::try_step`] to
    /// interleave work with each step.
    pub fn advance(&mut self, delta: f64) -> u32 {
        self.accumulate(delta);
        let mut n = 0;
        while self.try_step() {
            n += 1;
        }
        n
    }

    /// Restart the clock at `time` with `accumulated` seconds pending
    pub fn reset(&mut self, time: f64, accumulated: f64) {
        self.origin = time;
        self.steps = 0;
        self.accumulated = accumulated.min(self.max_accumulated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f64 = 60.001;

    #[test]
    fn test_steps_match_floor_of_elapsed() {
        let mut clock = FixedTimestep::new(RATE, 5);
        let mut total = 0;
        // 0.05 s per frame is 3 steps with a remainder carried over
        for _ in 0..100 {
            total += clock.advance(0.05);
        }
        let expected = (100.0 * 0.05 / clock.step()).floor() as u32;
        assert_eq!(total, expected);
    }

    #[test]
    fn test_stalled_frame_runs_every_capped_step() {
        for rate in [60.0, RATE, 144.0] {
            let mut clock = FixedTimestep::new(rate, 5);
            assert_eq!(clock.advance(10.0), 5, "rate {}", rate);
        }
    }

    #[test]
    fn test_accumulation_is_capped() {
        let mut clock = FixedTimestep::new(RATE, 5);
        assert_eq!(clock.advance(10.0), 5);
        assert!(clock.accumulated() < clock.step());
    }

    #[test]
    fn test_time_has_no_drift() {
        let mut clock = FixedTimestep::new(RATE, 5);
        for _ in 0..100_000 {
            clock.accumulate(clock.step());
            assert!(clock.try_step());
        }
        assert_eq!(clock.time(), 100_000.0 * clock.step());
    }

    #[test]
    fn test_reset_sets_origin() {
        let mut clock = FixedTimestep::new(RATE, 5);
        clock.advance(0.5);
        clock.reset(-1.99, clock.step() + 0.001);
        assert_eq!(clock.time(), -1.99);
        assert_eq!(clock.advance(0.0), 1);
        assert!((clock.time() - (-1.99 + clock.step())).abs() < 1e-12);
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mut clock = FixedTimestep::new(RATE, 5);
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.accumulated(), 0.0);
    }
}
