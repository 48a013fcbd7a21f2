//! Side-scrolling platformer
//!
//! A box runs and jumps across a 3400-wide level of seeded platforms under
//! constant gravity. The camera follows with a dead zone; falling out of the
//! bottom costs a life.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::{Aabb, EntityView, Hud, Intent, IntentSet, Sprite, World};

pub const SCREEN_WIDTH: f32 = 800.0;
pub const SCREEN_HEIGHT: f32 = 600.0;
pub const LEVEL_WIDTH: f32 = 3400.0;

/// Pixels per second squared
pub const GRAVITY: f32 = 3600.0;
/// Initial upward velocity of a jump (pixels per second)
pub const JUMP_VELOCITY: f32 = -900.0;
pub const RUN_SPEED: f32 = 300.0;

pub const PLAYER_WIDTH: f32 = 40.0;
pub const PLAYER_HEIGHT: f32 = 60.0;
pub const PLAYER_START: Vec2 = Vec2::new(100.0, SCREEN_HEIGHT - PLAYER_HEIGHT - 100.0);
pub const INITIAL_LIVES: u8 = 3;

/// Camera keeps the player at least this far from either screen edge
const SCROLL_MARGIN: f32 = 200.0;

const RANDOM_PLATFORMS: usize = 10;
const PLATFORM_HEIGHT: f32 = 30.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub bounds: Aabb,
    /// Player has landed here at least once
    pub visited: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runner {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Landed on a platform during the last collision pass
    pub grounded: bool,
    pub facing_right: bool,
    pub lives: u8,
    pub score: u64,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            pos: PLAYER_START,
            vel: Vec2::ZERO,
            grounded: false,
            facing_right: true,
            lives: INITIAL_LIVES,
            score: 0,
        }
    }
}

impl Runner {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_min_size(self.pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }

    /// Back to the start with a clean velocity; counters are kept
    fn respawn(&mut self) {
        self.pos = PLAYER_START;
        self.vel = Vec2::ZERO;
        self.grounded = false;
        self.facing_right = true;
    }
}

/// Complete platformer world
#[derive(Debug, Clone)]
pub struct PlatformerWorld {
    pub player: Runner,
    /// Sorted by id; the ground is id 1
    pub platforms: Vec<Platform>,
    /// Camera left edge in level units
    pub scroll: f32,
    /// Registered hits (falls) on the player
    pub falls: u64,
    /// Dropped out of the bottom this tick; settled by the collision pass
    pub fell: bool,
}

impl PlatformerWorld {
    /// Ground plus seeded random platforms
    fn build_level(rng: &mut Pcg32) -> Vec<Platform> {
        let mut platforms = Vec::with_capacity(RANDOM_PLATFORMS + 1);
        platforms.push(Platform {
            id: 1,
            bounds: Aabb::new(0.0, SCREEN_HEIGHT - 50.0, 1000.0, 50.0),
            visited: false,
        });
        for i in 0..RANDOM_PLATFORMS {
            let x = rng.random_range(400..=3000) as f32;
            let y = rng.random_range((SCREEN_HEIGHT as i32 - 300)..=(SCREEN_HEIGHT as i32 - 100)) as f32;
            let w = rng.random_range(100..=300) as f32;
            platforms.push(Platform {
                id: i as u32 + 2,
                bounds: Aabb::new(x, y, w, PLATFORM_HEIGHT),
                visited: false,
            });
        }
        platforms
    }

    /// Add a platform (level editing, tests); returns its id
    pub fn add_platform(&mut self, bounds: Aabb) -> u32 {
        let id = self.platforms.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        self.platforms.push(Platform {
            id,
            bounds,
            visited: false,
        });
        id
    }

    pub fn grounded(&self) -> bool {
        self.player.grounded
    }

    /// Dead-zone camera, clamped to the level
    fn follow_camera(&mut self) {
        let x = self.player.pos.x;
        if x - self.scroll > SCREEN_WIDTH - SCROLL_MARGIN {
            self.scroll = x - (SCREEN_WIDTH - SCROLL_MARGIN);
        } else if x - self.scroll < SCROLL_MARGIN {
            self.scroll = x - SCROLL_MARGIN;
        }
        self.scroll = self.scroll.clamp(0.0, LEVEL_WIDTH - SCREEN_WIDTH);
    }
}

impl World for PlatformerWorld {
    const TICK_HZ: u32 = crate::consts::DEFAULT_TICK_HZ;

    fn reset(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        Self {
            player: Runner::default(),
            platforms: Self::build_level(&mut rng),
            scroll: 0.0,
            falls: 0,
            fell: false,
        }
    }

    fn update(&mut self, input: &IntentSet, dt: f32) {
        let player = &mut self.player;

        let dir = input.horizontal();
        if dir > 0 {
            player.facing_right = true;
        } else if dir < 0 {
            player.facing_right = false;
        }
        player.pos.x += dir as f32 * RUN_SPEED * dt;

        // Only a landing in the last collision pass allows a jump
        let grounded = std::mem::take(&mut player.grounded);
        if input.contains(Intent::Jump) && grounded {
            player.vel.y = JUMP_VELOCITY;
        }

        player.vel.y += GRAVITY * dt;
        player.pos.y += player.vel.y * dt;

        // Walls and ceiling clamp; the floor is open
        player.pos.x = player.pos.x.clamp(0.0, LEVEL_WIDTH - PLAYER_WIDTH);
        if player.pos.y < 0.0 {
            player.pos.y = 0.0;
            player.vel.y = 0.0;
        }

        // Out of the bottom: pin to the floor edge and let collisions charge it
        if player.bounds().bottom() > SCREEN_HEIGHT {
            player.pos.y = SCREEN_HEIGHT - PLAYER_HEIGHT;
            self.fell = true;
        }

        self.follow_camera();
    }

    fn resolve_collisions(&mut self) {
        let player = &mut self.player;

        if std::mem::take(&mut self.fell) {
            self.falls += 1;
            player.lives = player.lives.saturating_sub(1);
            log::debug!("Fell out of the level, {} lives left", player.lives);
            player.respawn();
            self.scroll = 0.0;
            return;
        }

        for platform in &mut self.platforms {
            if !player.bounds().overlaps(&platform.bounds) {
                continue;
            }
            // Landing (or standing); rising through a platform is allowed
            if player.vel.y >= 0.0 {
                player.pos.y = platform.bounds.top() - PLAYER_HEIGHT;
                player.vel.y = 0.0;
                player.grounded = true;
                if !platform.visited {
                    platform.visited = true;
                    player.score += 1;
                }
            }
        }
    }

    fn cleanup(&mut self) {
        // Platforms are persistent and the runner respawns; nothing to remove
    }

    fn is_terminal(&self) -> bool {
        self.player.lives == 0
    }

    fn hud(&self) -> Hud {
        Hud {
            score: self.player.score,
            lives: Some(self.player.lives),
            level: None,
            best: None,
        }
    }

    fn collect_entities(&self, out: &mut Vec<EntityView>) {
        for platform in &self.platforms {
            out.push(EntityView::new(Sprite::Platform, platform.bounds));
        }
        out.push(EntityView::new(Sprite::Player, self.player.bounds()));
    }

    fn playfield(&self) -> Aabb {
        Aabb::new(0.0, 0.0, LEVEL_WIDTH, SCREEN_HEIGHT)
    }

    fn viewport(&self) -> Aabb {
        Aabb::new(self.scroll, 0.0, SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}
