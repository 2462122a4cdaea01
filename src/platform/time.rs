//! Frame clock, fixed timestep accumulator and frame statistics

use std::time::Instant;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Frames kept in the frame-time ring
pub const HISTORY_LEN: usize = 60;
/// Seconds between refreshes of the averaged frame-time text
pub const AVERAGE_WINDOW: f32 = 0.25;

/// Monotonic clock sampled once per frame
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: Instant::now() }
    }

    /// Seconds since the previous call (or since creation)
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed timestep accumulator.
///
/// Frame deltas are capped, then drained in whole steps. Once a frame hits
/// the substep limit the remaining backlog is dropped so a slow machine runs
/// slow instead of spiralling.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f32,
    max_substeps: u32,
    max_frame_dt: f32,
    accumulator: f32,
}

impl FixedStep {
    pub fn new(step: f32, max_substeps: u32, max_frame_dt: f32) -> Self {
        Self {
            step,
            max_substeps,
            max_frame_dt,
            accumulator: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Add a frame delta and return how many steps to simulate
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, self.max_frame_dt);

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_substeps {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == self.max_substeps && self.accumulator >= self.step {
            log::debug!("Dropping {:.4} s of simulation backlog", self.accumulator);
            self.accumulator %= self.step;
        }
        steps
    }

    /// Unsimulated time carried to the next frame
    pub fn remainder(&self) -> f32 {
        self.accumulator
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_SUBSTEPS, MAX_FRAME_DT)
    }
}

/// Frame-time ring and a periodically refreshed average
#[derive(Debug, Clone)]
pub struct FrameStats {
    times: [f32; HISTORY_LEN],
    /// Next slot to write; also the oldest entry
    next: usize,
    window_time: f32,
    window_frames: u32,
    average: f32,
    text: String,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            times: [0.0; HISTORY_LEN],
            next: 0,
            window_time: 0.0,
            window_frames: 0,
            average: 0.0,
            text: format_average(0.0),
        }
    }

    pub fn record(&mut self, frame_dt: f32) {
        self.times[self.next] = frame_dt;
        self.next = (self.next + 1) % HISTORY_LEN;

        self.window_time += frame_dt;
        self.window_frames += 1;
        if self.window_time >= AVERAGE_WINDOW {
            self.average = self.window_time / self.window_frames as f32;
            self.text = format_average(self.average);
            self.window_time = 0.0;
            self.window_frames = 0;
        }
    }

    /// Recorded frame times, oldest first
    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.times[self.next..]
            .iter()
            .chain(&self.times[..self.next])
            .copied()
    }

    /// Average frame time over the last completed window, in seconds
    pub fn average(&self) -> f32 {
        self.average
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

fn format_average(secs: f32) -> String {
    format!("Avg Frame: {:.4} s, {:.3} ms", secs, secs * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixed_step_carries_remainder() {
        let mut fixed = FixedStep::new(0.01, 8, 0.1);
        assert_eq!(fixed.advance(0.025), 2);
        assert!((fixed.remainder() - 0.005).abs() < 1e-6);
        assert_eq!(fixed.advance(0.006), 1);
    }

    #[test]
    fn test_fixed_step_caps_long_frames() {
        let mut fixed = FixedStep::default();
        assert_eq!(fixed.advance(5.0), MAX_SUBSTEPS);
        assert!(fixed.remainder() < SIM_DT);
        assert_eq!(fixed.advance(-1.0), 0);
    }

    #[test]
    fn test_history_is_oldest_first() {
        let mut stats = FrameStats::new();
        for i in 0..(HISTORY_LEN + 2) {
            stats.record(i as f32 * 0.001);
        }
        let history: Vec<f32> = stats.history().collect();
        assert_eq!(history.len(), HISTORY_LEN);
        assert_eq!(history[0], 2.0 * 0.001);
        assert_eq!(history[HISTORY_LEN - 1], (HISTORY_LEN + 1) as f32 * 0.001);
    }

    #[test]
    fn test_average_refreshes_per_window() {
        let mut stats = FrameStats::new();
        assert_eq!(stats.text(), "Avg Frame: 0.0000 s, 0.000 ms");

        for _ in 0..10 {
            stats.record(0.02);
        }
        // 0.2 s so far, window not complete
        assert_eq!(stats.average(), 0.0);

        for _ in 0..3 {
            stats.record(0.02);
        }
        assert!((stats.average() - 0.02).abs() < 1e-6);
        assert_eq!(stats.text(), "Avg Frame: 0.0200 s, 20.000 ms");
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut clock = FrameClock::new();
        assert!(clock.tick() >= 0.0);
    }

    proptest! {
        #[test]
        fn prop_steps_bounded(deltas in prop::collection::vec(0.0f32..1.0, 1..50)) {
            let mut fixed = FixedStep::default();
            for dt in deltas {
                prop_assert!(fixed.advance(dt) <= MAX_SUBSTEPS);
                prop_assert!(fixed.remainder() >= 0.0);
            }
        }
    }
}
