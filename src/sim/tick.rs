//! Fixed timestep simulation tick
//!
//! Owns a world and advances it one tick at a time:
//! update → collisions → cleanup → terminal check. Drawing is a separate,
//! read-only call.

use super::intent::{Intent, IntentSet};
use super::state::{EntityView, Frame, Phase, World};
use crate::highscores::HighScores;

/// What the caller should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// The simulation loop object; keeps its identity across restarts
#[derive(Debug)]
pub struct Simulation<W: World> {
    world: W,
    phase: Phase,
    /// Run seed, reused by every restart
    seed: u64,
    /// Ticks advanced since the last (re)start
    ticks: u64,
    /// Completed runs this session
    runs: u32,
    high_scores: HighScores,
}

impl<W: World> Simulation<W> {
    pub fn new(seed: u64) -> Self {
        Self {
            world: W::reset(seed),
            phase: Phase::Running,
            seed,
            ticks: 0,
            runs: 0,
            high_scores: HighScores::new(),
        }
    }

    /// Fixed delta for this world's tick rate
    pub fn dt(&self) -> f32 {
        crate::tick_dt(W::TICK_HZ)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    /// Direct world access (scenario setup in tests)
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// Advance by one fixed tick using an input snapshot
    pub fn step(&mut self, input: &IntentSet) -> Control {
        match self.phase {
            Phase::Running => {
                let dt = self.dt();
                self.world.update(input, dt);
                self.world.resolve_collisions();
                self.world.cleanup();
                self.ticks += 1;

                if self.world.is_terminal() {
                    self.finish_run();
                }
            }
            Phase::GameOver => {
                if input.contains(Intent::Restart) {
                    self.restart();
                }
            }
        }

        if input.contains(Intent::Quit) {
            Control::Quit
        } else {
            Control::Continue
        }
    }

    /// Replace the world with its initial-spawn state
    pub fn restart(&mut self) {
        self.world = W::reset(self.seed);
        self.phase = Phase::Running;
        self.ticks = 0;
        log::info!("Restarted (seed {})", self.seed);
    }

    fn finish_run(&mut self) {
        self.phase = Phase::GameOver;
        self.runs += 1;
        let hud = self.world.hud();
        let rank = self
            .high_scores
            .add_score(hud.score, hud.level.unwrap_or(0), self.ticks);
        match rank {
            Some(rank) => log::info!(
                "Game over after {} ticks: score {} (rank {})",
                self.ticks,
                hud.score,
                rank
            ),
            None => log::info!("Game over after {} ticks: score {}", self.ticks, hud.score),
        }
    }

    /// Collect the current draw data into `buf` and describe the frame
    pub fn frame<'a>(&self, buf: &'a mut Vec<EntityView>) -> Frame<'a> {
        buf.clear();
        self.world.collect_entities(buf);
        let entities: &'a Vec<EntityView> = buf;

        let mut hud = self.world.hud();
        hud.best = self.high_scores.top_score();

        Frame {
            entities,
            hud,
            phase: self.phase,
            playfield: self.world.playfield(),
            viewport: self.world.viewport(),
            walled: W::WALLED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::aabb::Aabb;
    use crate::sim::state::{Hud, Sprite};

    /// Loses a life whenever Shoot is held
    #[derive(Debug)]
    struct Countdown {
        lives: u8,
        score: u64,
        hurt: bool,
        updates: u32,
    }

    impl World for Countdown {
        const TICK_HZ: u32 = 60;

        fn reset(_seed: u64) -> Self {
            Self {
                lives: 2,
                score: 0,
                hurt: false,
                updates: 0,
            }
        }

        fn update(&mut self, input: &IntentSet, _dt: f32) {
            self.updates += 1;
            self.score += 5;
            self.hurt = input.contains(Intent::Shoot);
        }

        fn resolve_collisions(&mut self) {
            if self.hurt {
                self.lives = self.lives.saturating_sub(1);
            }
        }

        fn cleanup(&mut self) {
            self.hurt = false;
        }

        fn is_terminal(&self) -> bool {
            self.lives == 0
        }

        fn hud(&self) -> Hud {
            Hud {
                score: self.score,
                lives: Some(self.lives),
                ..Default::default()
            }
        }

        fn collect_entities(&self, out: &mut Vec<EntityView>) {
            out.push(EntityView::new(Sprite::Player, Aabb::new(0.0, 0.0, 1.0, 1.0)));
        }

        fn playfield(&self) -> Aabb {
            Aabb::new(0.0, 0.0, 10.0, 10.0)
        }
    }

    fn hit() -> IntentSet {
        IntentSet::of(&[Intent::Shoot])
    }

    #[test]
    fn test_running_to_game_over() {
        let mut sim = Simulation::<Countdown>::new(1);
        assert_eq!(sim.phase(), Phase::Running);

        sim.step(&IntentSet::EMPTY);
        assert_eq!(sim.world().lives, 2);

        sim.step(&hit());
        assert_eq!(sim.phase(), Phase::Running);
        sim.step(&hit());
        assert_eq!(sim.phase(), Phase::GameOver);
        assert_eq!(sim.runs(), 1);
    }

    #[test]
    fn test_game_over_freezes_world() {
        let mut sim = Simulation::<Countdown>::new(1);
        sim.step(&hit());
        sim.step(&hit());
        let updates = sim.world().updates;
        let ticks = sim.ticks();

        for _ in 0..10 {
            sim.step(&hit());
        }
        assert_eq!(sim.world().updates, updates);
        assert_eq!(sim.ticks(), ticks);
    }

    #[test]
    fn test_restart_only_from_game_over() {
        let mut sim = Simulation::<Countdown>::new(1);
        let restart = IntentSet::of(&[Intent::Restart]);

        sim.step(&restart);
        assert_eq!(sim.world().updates, 1, "restart is ignored while running");

        sim.step(&hit());
        sim.step(&hit());
        assert_eq!(sim.phase(), Phase::GameOver);

        sim.step(&restart);
        assert_eq!(sim.phase(), Phase::Running);
        assert_eq!(sim.world().lives, 2);
        assert_eq!(sim.world().score, 0);
        assert_eq!(sim.ticks(), 0);
    }

    #[test]
    fn test_quit_in_either_phase() {
        let mut sim = Simulation::<Countdown>::new(1);
        let quit = IntentSet::of(&[Intent::Quit]);
        assert_eq!(sim.step(&quit), Control::Quit);
        assert_eq!(sim.step(&IntentSet::EMPTY), Control::Continue);

        sim.step(&hit());
        sim.step(&hit());
        assert_eq!(sim.step(&quit), Control::Quit);
    }

    #[test]
    fn test_game_over_records_high_score() {
        let mut sim = Simulation::<Countdown>::new(1);
        sim.step(&hit());
        sim.step(&hit());
        assert_eq!(sim.high_scores().top_score(), Some(10));

        let mut buf = Vec::new();
        let frame = sim.frame(&mut buf);
        assert_eq!(frame.hud.best, Some(10));
        assert_eq!(frame.phase, Phase::GameOver);
        assert_eq!(frame.entities.len(), 1);
    }

    #[test]
    fn test_frame_reuses_buffer() {
        let sim = Simulation::<Countdown>::new(1);
        let mut buf = vec![EntityView::new(Sprite::Food, Aabb::default()); 4];
        let frame = sim.frame(&mut buf);
        assert_eq!(frame.entities.len(), 1);
        assert_eq!(frame.entities[0].sprite, Sprite::Player);
    }
}
