//! Arcade Trio entry point
//!
//! Loads settings, opens the terminal and runs the selected title until the
//! player quits.

use std::process::ExitCode;

use arcade_trio::platform::{FrontendError, TerminalFrontend};
use arcade_trio::runner::{self, Summary};
use arcade_trio::sim::{Simulation, World};
use arcade_trio::titles::{PlatformerWorld, ShooterWorld, SnakeWorld};
use arcade_trio::{Settings, Title};

fn main() -> ExitCode {
    env_logger::init();

    let settings = Settings::load();
    let seed = settings.resolve_seed();
    log::info!("Arcade Trio starting: {} (seed {})", settings.title.as_str(), seed);

    let result = match settings.title {
        Title::Shooter => play::<ShooterWorld>(&settings, seed),
        Title::Platformer => play::<PlatformerWorld>(&settings, seed),
        Title::Snake => play::<SnakeWorld>(&settings, seed),
    };

    match result {
        Ok(summary) => {
            report(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("arcade-trio: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// The terminal is restored when `frontend` drops, before anything is printed
fn play<W: World>(settings: &Settings, seed: u64) -> Result<Summary, FrontendError> {
    let mut frontend = TerminalFrontend::new(settings)?;
    let mut sim = Simulation::<W>::new(seed);
    runner::run(&mut sim, &mut frontend)
}

fn report(summary: &Summary) {
    println!("Final score: {} ({} runs)", summary.score, summary.runs);
    if summary.high_scores.is_empty() {
        return;
    }
    match summary.high_scores.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => log::warn!("Could not encode high scores: {}", e),
    }
}
