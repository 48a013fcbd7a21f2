//! The three games, each a `World` driven by the shared loop

pub mod platformer;
pub mod shooter;
pub mod snake;

pub use platformer::PlatformerWorld;
pub use shooter::ShooterWorld;
pub use snake::SnakeWorld;
