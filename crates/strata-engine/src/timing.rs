//! Frame timing for the simulation driver.
//!
//! Turns variable frame deltas into a bounded number of fixed simulation
//! ticks.

use std::time::Instant;

/// Fixed-timestep accumulator.
#[derive(Debug)]
pub struct FixedTimestep {
    /// Seconds per simulation tick
    fixed_dt: f32,
    /// Unconsumed time
    accumulator: f32,
    /// Maximum ticks returned by one call to `accumulate`
    max_ticks: u32,
    /// Maximum frame delta accepted
    max_dt: f32,
    /// Time of the last `delta_time` call
    last_frame: Instant,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(60, 10)
    }
}

impl FixedTimestep {
    /// Creates an accumulator ticking `tick_rate` times per second.
    #[must_use]
    pub fn new(tick_rate: u32, max_ticks: u32) -> Self {
        Self {
            fixed_dt: 1.0 / tick_rate.max(1) as f32,
            accumulator: 0.0,
            max_ticks: max_ticks.max(1),
            max_dt: 0.25, // 250ms
            last_frame: Instant::now(),
        }
    }

    /// Seconds per tick.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Seconds since the previous call, clamped to a quarter second.
    pub fn delta_time(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        dt.min(self.max_dt)
    }

    /// Adds `dt` seconds and returns how many fixed ticks to run.
    ///
    /// At most `max_ticks` are returned. If the accumulator is still more
    /// than two ticks behind afterwards, the backlog is dropped instead of
    /// growing without bound.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.max(0.0);
        let mut count = 0;

        while self.accumulator >= self.fixed_dt && count < self.max_ticks {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        count
    }

    /// Clears the accumulator (after a pause or load).
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_frame = Instant::now();
    }
}
