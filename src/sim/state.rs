//! World contract and the read-only views handed to renderers
//!
//! A title implements `World`; the loop in `tick.rs` owns it and calls the
//! steps in a fixed order every tick.

use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::intent::IntentSet;

/// Current phase of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// World advances every tick
    Running,
    /// Run ended; only restart/quit are honoured
    GameOver,
}

/// What a renderer should draw for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sprite {
    Player,
    EnemyBasic,
    EnemyFast,
    EnemyShooter,
    PlayerBullet,
    EnemyBullet,
    Platform,
    SnakeHead,
    SnakeBody,
    Food,
}

/// Read-only view of one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub sprite: Sprite,
    pub bounds: Aabb,
}

impl EntityView {
    pub fn new(sprite: Sprite, bounds: Aabb) -> Self {
        Self { sprite, bounds }
    }
}

/// Scalar HUD values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hud {
    pub score: u64,
    /// None for titles without a life counter
    pub lives: Option<u8>,
    /// None for titles without levels
    pub level: Option<u32>,
    /// Best score recorded this session
    pub best: Option<u64>,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub entities: &'a [EntityView],
    pub hud: Hud,
    pub phase: Phase,
    /// Full logical playfield
    pub playfield: Aabb,
    /// Part of the playfield on screen (camera window)
    pub viewport: Aabb,
    /// Playfield border cells are walls (grid titles)
    pub walled: bool,
}

/// A title's world state.
///
/// The loop calls `update`, `resolve_collisions`, `cleanup` and then
/// `is_terminal`, once each per tick and in that order. None of them can
/// fail: all of them are total over the current entity set.
pub trait World: Sized {
    /// Simulation rate this world is tuned for
    const TICK_HZ: u32;

    /// Border cells of the playfield are walls
    const WALLED: bool = false;

    /// Fresh initial-spawn state
    fn reset(seed: u64) -> Self;

    /// Apply intents and each entity's motion rule (player, then
    /// enemies/platforms, then bullets). Entities leaving the playfield are
    /// dropped or returned here so collisions only see in-field boxes.
    fn update(&mut self, input: &IntentSet, dt: f32);

    /// Pairwise AABB tests; mark consumed entities, mutate score/lives
    fn resolve_collisions(&mut self);

    /// Apply removal marks and lifecycle predicates
    fn cleanup(&mut self);

    /// Lives exhausted or fatal collision
    fn is_terminal(&self) -> bool;

    fn hud(&self) -> Hud;

    /// Append draw views for every live entity
    fn collect_entities(&self, out: &mut Vec<EntityView>);

    /// Logical playfield bounds
    fn playfield(&self) -> Aabb;

    /// Camera window; the whole playfield unless the title scrolls
    fn viewport(&self) -> Aabb {
        self.playfield()
    }
}
