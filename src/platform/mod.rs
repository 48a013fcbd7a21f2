//! Frontend abstraction layer
//!
//! The simulation never touches a terminal directly. A `Frontend` supplies
//! intent snapshots, draws frames and paces the loop:
//! - `terminal`: crossterm raw-mode terminal
//! - `scripted`: replays recorded intents (tests, headless runs)

pub mod scripted;
pub mod terminal;

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::sim::{Frame, IntentSet};

pub use scripted::ScriptedFrontend;
pub use terminal::TerminalFrontend;

/// Collaborator failures; all of them end the session
#[derive(Debug, Error)]
pub enum FrontendError {
    /// Input/output subsystem could not be set up
    #[error("failed to initialise frontend: {0}")]
    Init(#[source] io::Error),
    /// Terminal I/O failed mid-session
    #[error("frontend I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Input source, renderer and pacing timer for the run loop
pub trait Frontend {
    /// Snapshot of the intents active right now. Never blocks.
    fn poll_input(&mut self) -> Result<IntentSet, FrontendError>;

    /// Draw one frame. The frame is read-only.
    fn render(&mut self, frame: &Frame<'_>) -> Result<(), FrontendError>;

    /// Wait up to `timeout` before the next frame; returns early on quit
    fn tick_delay(&mut self, timeout: Duration) -> Result<Wake, FrontendError>;
}

/// How a `tick_delay` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The full timeout passed
    Elapsed,
    /// Cut short by a quit request
    Quit,
}
