//! Run loop
//!
//! Paces a `Simulation` against a `Frontend`: measure elapsed time, run the
//! ticks that are due (one input sample each), draw once, then wait for the
//! next tick.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::highscores::HighScores;
use crate::platform::{Frontend, FrontendError, Wake};
use crate::sim::{Control, FixedStep, Simulation, World};

/// Source of elapsed time between frames
pub trait Clock {
    /// Time since the previous call (or since creation)
    fn elapsed(&mut self) -> Duration;
}

/// Wall clock
#[derive(Debug)]
pub struct WallClock {
    last: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn elapsed(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now - self.last;
        self.last = now;
        elapsed
    }
}

/// Reports a fixed duration every frame (lockstep replays)
#[derive(Debug, Clone, Copy)]
pub struct SteppedClock(pub Duration);

impl SteppedClock {
    /// One tick per frame at `hz`; a microsecond long so rounding never loses a tick
    pub fn per_tick(hz: u32) -> Self {
        Self(Duration::from_nanos(1_000_000_000 / hz.max(1) as u64 + 1_000))
    }
}

impl Clock for SteppedClock {
    fn elapsed(&mut self) -> Duration {
        self.0
    }
}

/// Outcome of a session
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Score on screen when the session ended
    pub score: u64,
    /// Completed runs (GameOver transitions)
    pub runs: u32,
    /// Ticks of the run in progress at exit
    pub ticks: u64,
    pub high_scores: HighScores,
}

impl Summary {
    fn of<W: World>(sim: &Simulation<W>) -> Self {
        Self {
            score: sim.world().hud().score,
            runs: sim.runs(),
            ticks: sim.ticks(),
            high_scores: sim.high_scores().clone(),
        }
    }
}

/// Run in real time until the player quits
pub fn run<W: World, F: Frontend>(
    sim: &mut Simulation<W>,
    frontend: &mut F,
) -> Result<Summary, FrontendError> {
    drive(sim, frontend, &mut WallClock::new())
}

/// Run against an arbitrary clock until quit or a frontend failure
pub fn drive<W: World, F: Frontend, C: Clock>(
    sim: &mut Simulation<W>,
    frontend: &mut F,
    clock: &mut C,
) -> Result<Summary, FrontendError> {
    let mut schedule = FixedStep::new(W::TICK_HZ);
    let mut entities = Vec::new();
    log::info!("Loop started at {} Hz (seed {})", W::TICK_HZ, sim.seed());

    frontend.render(&sim.frame(&mut entities))?;

    loop {
        let due = schedule.advance(clock.elapsed());
        for _ in 0..due {
            let input = frontend.poll_input()?;
            if sim.step(&input) == Control::Quit {
                log::info!("Quit after {} ticks", sim.ticks());
                return Ok(Summary::of(sim));
            }
        }

        frontend.render(&sim.frame(&mut entities))?;

        if frontend.tick_delay(schedule.until_next())? == Wake::Quit {
            log::info!("Quit while waiting for tick {}", sim.ticks() + 1);
            return Ok(Summary::of(sim));
        }
    }
}
