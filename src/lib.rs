//! Arcade Trio - three small arcade games on one simulation core
//!
//! Core modules:
//! - `sim`: Fixed-timestep simulation loop (intents, AABB collision, phases)
//! - `titles`: The shooter, platformer and snake worlds
//! - `platform`: Rendering/input collaborators (terminal, scripted)
//! - `runner`: Drives a simulation against a collaborator at its tick rate

pub mod highscores;
pub mod platform;
pub mod runner;
pub mod settings;
pub mod sim;
pub mod titles;

pub use highscores::HighScores;
pub use settings::{Settings, Title};

/// Loop configuration constants
pub mod consts {
    /// Default simulation rate for the real-time titles
    pub const DEFAULT_TICK_HZ: u32 = 60;
    /// Maximum ticks run per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the scheduler will account for (seconds)
    pub const MAX_FRAME_DT: f32 = 0.25;
}

/// Fixed delta (seconds) for a tick rate
#[inline]
pub fn tick_dt(hz: u32) -> f32 {
    1.0 / hz.max(1) as f32
}
