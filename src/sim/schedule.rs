//! Fixed-step scheduling
//!
//! Converts measured wall time into a number of due ticks. Frame time is
//! accumulated; each due tick consumes one fixed step, and at most
//! `MAX_SUBSTEPS` run per frame so a stall cannot snowball.

use std::time::Duration;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS};

#[derive(Debug, Clone)]
pub struct FixedStep {
    dt: f32,
    accumulator: f32,
    /// Ticks dropped because a frame exceeded the substep cap
    dropped: u64,
}

impl FixedStep {
    pub fn new(hz: u32) -> Self {
        Self {
            dt: crate::tick_dt(hz),
            accumulator: 0.0,
            dropped: 0,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Account for `elapsed` wall time and return how many ticks to run now
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let frame_dt = elapsed.as_secs_f32().min(MAX_FRAME_DT);
        self.accumulator += frame_dt;

        let mut due = 0;
        while self.accumulator >= self.dt && due < MAX_SUBSTEPS {
            self.accumulator -= self.dt;
            due += 1;
        }

        // Whatever is still owed after the cap is forgotten
        if self.accumulator >= self.dt {
            let owed = (self.accumulator / self.dt) as u64;
            self.dropped += owed;
            self.accumulator -= owed as f32 * self.dt;
            log::debug!("Scheduler fell behind, dropped {} ticks", owed);
        }

        due
    }

    /// Wall time until the next tick is due
    pub fn until_next(&self) -> Duration {
        Duration::from_secs_f32((self.dt - self.accumulator).max(0.0))
    }
}
