//! Fixed-timestep simulation core
//!
//! Shared by every title. This module must stay free of I/O:
//! - Fixed timestep only
//! - Seeded RNG only (owned by each world)
//! - Removal is two-phase (mark, then sweep)
//! - Drawing reads state, never writes it

pub mod aabb;
pub mod intent;
pub mod schedule;
pub mod state;
pub mod sweep;
pub mod tick;

pub use aabb::Aabb;
pub use intent::{Intent, IntentSet};
pub use schedule::FixedStep;
pub use state::{EntityView, Frame, Hud, Phase, Sprite, World};
pub use sweep::Doomed;
pub use tick::{Control, Simulation};
