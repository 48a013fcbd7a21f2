//! Scripted frontend
//!
//! Replays a fixed list of intent snapshots, one per poll, and records every
//! frame it is asked to draw. Once the script runs out it asks to quit.

use std::collections::VecDeque;
use std::time::Duration;

use super::{Frontend, FrontendError, Wake};
use crate::sim::{EntityView, Frame, Hud, Intent, IntentSet, Phase};

/// Owned copy of a rendered frame
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub entities: Vec<EntityView>,
    pub hud: Hud,
    pub phase: Phase,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedFrontend {
    script: VecDeque<IntentSet>,
    frames: Vec<RecordedFrame>,
    polls: usize,
    delays: Vec<Duration>,
}

impl ScriptedFrontend {
    pub fn new(script: impl IntoIterator<Item = IntentSet>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Default::default()
        }
    }

    /// `n` empty snapshots
    pub fn idle(n: usize) -> Self {
        Self::new(std::iter::repeat_n(IntentSet::EMPTY, n))
    }

    /// Append a snapshot to the end of the script
    pub fn push(&mut self, input: IntentSet) {
        self.script.push_back(input);
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }

    /// Number of input snapshots handed out
    pub fn polls(&self) -> usize {
        self.polls
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }
}

impl Frontend for ScriptedFrontend {
    fn poll_input(&mut self) -> Result<IntentSet, FrontendError> {
        self.polls += 1;
        Ok(self
            .script
            .pop_front()
            .unwrap_or_else(|| IntentSet::of(&[Intent::Quit])))
    }

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), FrontendError> {
        self.frames.push(RecordedFrame {
            entities: frame.entities.to_vec(),
            hud: frame.hud,
            phase: frame.phase,
        });
        Ok(())
    }

    fn tick_delay(&mut self, timeout: Duration) -> Result<Wake, FrontendError> {
        self.delays.push(timeout);
        Ok(Wake::Elapsed)
    }
}
