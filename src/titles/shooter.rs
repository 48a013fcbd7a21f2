//! Fixed-formation shooter
//!
//! A ship in the lower half of an 800x600 field shoots upward at a drifting
//! enemy formation. Enemies occasionally dive at where the player was, and
//! the top row fires back.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::{Aabb, Doomed, EntityView, Hud, Intent, IntentSet, Sprite, World};

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;

pub const PLAYER_WIDTH: f32 = 40.0;
pub const PLAYER_HEIGHT: f32 = 30.0;
/// Pixels per second
pub const PLAYER_SPEED: f32 = 300.0;
pub const PLAYER_START: Vec2 = Vec2::new(FIELD_WIDTH / 2.0 - 20.0, FIELD_HEIGHT - 50.0);
pub const INITIAL_LIVES: u8 = 3;

pub const BULLET_WIDTH: f32 = 3.0;
pub const BULLET_HEIGHT: f32 = 8.0;
pub const PLAYER_BULLET_SPEED: f32 = 480.0;
pub const ENEMY_BULLET_SPEED: f32 = 240.0;

pub const ENEMY_WIDTH: f32 = 30.0;
pub const ENEMY_HEIGHT: f32 = 25.0;

const FORMATION_COLS: u32 = 8;
const FORMATION_BASE_ROWS: u32 = 4;
const FORMATION_MAX_ROWS: u32 = 8;
const FORMATION_LEFT: f32 = 100.0;
const FORMATION_TOP: f32 = 50.0;
const COL_SPACING: f32 = 60.0;
const ROW_SPACING: f32 = 50.0;

/// Formation phase advance, radians per second
const DRIFT_RATE: f32 = 1.2;
const DRIFT_X: f32 = 20.0;
const DRIFT_Y: f32 = 10.0;

/// Base dive speed, pixels per second (scaled by the kind's speed)
const DIVE_SPEED: f32 = 180.0;
/// Distance at which a diver counts as arrived
const DIVE_ARRIVE: f32 = 5.0;
/// Default per-tick dive chance is one in this many
pub const DIVE_ONE_IN: u32 = 500;

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    /// Carries the firing enemy's id
    Enemy(u32),
}

/// A bullet travelling in a straight line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    pub owner: Owner,
}

impl Bullet {
    pub fn new(pos: Vec2, vel: Vec2, owner: Owner) -> Self {
        Self { pos, vel, owner }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_min_size(self.pos, Vec2::new(BULLET_WIDTH, BULLET_HEIGHT))
    }
}

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Shooter,
}

/// Per-kind behaviour parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    /// Dive speed multiplier
    pub speed: f32,
    /// A shot goes out on the tick after this many have passed; None never shoots
    pub shoot_every: Option<u32>,
    pub points: u64,
    pub sprite: Sprite,
}

/// Indexed by `EnemyKind as usize`
const PROFILES: [EnemyProfile; 3] = [
    EnemyProfile {
        speed: 1.0,
        shoot_every: None,
        points: 100,
        sprite: Sprite::EnemyBasic,
    },
    EnemyProfile {
        speed: 2.0,
        shoot_every: None,
        points: 200,
        sprite: Sprite::EnemyFast,
    },
    EnemyProfile {
        speed: 1.0,
        shoot_every: Some(120),
        points: 300,
        sprite: Sprite::EnemyShooter,
    },
];

impl EnemyKind {
    pub fn profile(self) -> &'static EnemyProfile {
        &PROFILES[self as usize]
    }

    /// Formation row layout: shooters on top, fast second, basic below
    pub fn for_row(row: u32) -> Self {
        match row {
            0 => EnemyKind::Shooter,
            1 => EnemyKind::Fast,
            _ => EnemyKind::Basic,
        }
    }
}

/// What an enemy is doing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Maneuver {
    /// Drifting around its home slot
    Formation,
    /// Heading for a captured player position
    Diving { target: Vec2 },
    /// Arrived; falling straight down until off the field
    Leaving,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Formation slot
    pub home: Vec2,
    /// Drift phase (radians)
    pub phase: f32,
    pub maneuver: Maneuver,
    /// Ticks since last shot
    pub shoot_ticks: u32,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, home: Vec2) -> Self {
        Self {
            id,
            kind,
            pos: home,
            home,
            phase: 0.0,
            maneuver: Maneuver::Formation,
            shoot_ticks: 0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_min_size(self.pos, Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT))
    }

    /// Drifted position around the home slot for the current phase
    pub fn formation_pos(&self) -> Vec2 {
        self.home + Vec2::new(self.phase.sin() * DRIFT_X, (self.phase * 0.5).sin() * DRIFT_Y)
    }

    /// Abandon any dive and snap back to the formation
    pub fn return_to_formation(&mut self) {
        self.maneuver = Maneuver::Formation;
        self.pos = self.formation_pos();
    }
}

/// The player's ship; also carries score and lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub lives: u8,
    pub score: u64,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: PLAYER_START,
            lives: INITIAL_LIVES,
            score: 0,
        }
    }
}

impl Player {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_min_size(self.pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }

    /// Region the ship may occupy (lower half of the field)
    pub fn zone() -> Aabb {
        Aabb::new(0.0, FIELD_HEIGHT / 2.0, FIELD_WIDTH, FIELD_HEIGHT / 2.0)
    }

    /// Directions are applied in a fixed order; opposites cancel
    fn steer(&mut self, input: &IntentSet, dt: f32) {
        let step = PLAYER_SPEED * dt;
        let mut delta = Vec2::ZERO;
        if input.contains(Intent::Left) {
            delta.x -= step;
        }
        if input.contains(Intent::Right) {
            delta.x += step;
        }
        if input.contains(Intent::Up) {
            delta.y -= step;
        }
        if input.contains(Intent::Down) {
            delta.y += step;
        }
        let size = Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT);
        self.pos = Self::zone().clamp_min(self.pos + delta, size);
    }

    fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x + PLAYER_WIDTH / 2.0, self.pos.y)
    }
}

/// Bullet bookkeeping: live bullets always equal `fired - removed`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub fired: u64,
    pub removed: u64,
    /// Registered hits on the player
    pub hits_taken: u64,
    pub kills: u64,
}

/// Complete shooter world
#[derive(Debug, Clone)]
pub struct ShooterWorld {
    pub player: Player,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    /// 1-based
    pub level: u32,
    pub stats: Stats,
    /// Per-tick dive chance is 1 in this; 0 disables dives
    pub dive_one_in: u32,
    rng: Pcg32,
    next_id: u32,
    doomed_bullets: Doomed,
    doomed_enemies: Doomed,
}

impl ShooterWorld {
    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Lay out the formation for the current level
    pub fn spawn_formation(&mut self) {
        self.enemies.clear();
        let rows = (FORMATION_BASE_ROWS + self.level).min(FORMATION_MAX_ROWS);
        let spacing = Self::row_spacing(rows);
        for row in 0..rows {
            for col in 0..FORMATION_COLS {
                let home = Vec2::new(
                    FORMATION_LEFT + col as f32 * COL_SPACING,
                    FORMATION_TOP + row as f32 * spacing,
                );
                self.spawn_enemy(EnemyKind::for_row(row), home);
            }
        }
        log::debug!("Level {}: {} enemies in {} rows", self.level, self.enemies.len(), rows);
    }

    /// Row pitch for a formation of `rows`. Deep formations are packed
    /// tighter so a drifting slot never reaches the player's zone.
    pub fn row_spacing(rows: u32) -> f32 {
        if rows <= 1 {
            return ROW_SPACING;
        }
        // One pixel of clearance above the zone
        let room = Player::zone().top() - 1.0 - FORMATION_TOP - DRIFT_Y - ENEMY_HEIGHT;
        ROW_SPACING.min(room / (rows - 1) as f32)
    }

    /// Add one enemy at a formation slot; returns its id
    pub fn spawn_enemy(&mut self, kind: EnemyKind, home: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.enemies.push(Enemy::new(id, kind, home));
        id
    }

    /// Add a bullet and count it as fired
    pub fn fire(&mut self, bullet: Bullet) {
        self.bullets.push(bullet);
        self.stats.fired += 1;
    }

    pub fn enemy_bullets(&self) -> impl Iterator<Item = &Bullet> {
        self.bullets
            .iter()
            .filter(|b| matches!(b.owner, Owner::Enemy(_)))
    }

    fn update_enemies(&mut self, dt: f32) {
        let field = self.playfield();
        let player_pos = self.player.pos;

        for enemy in &mut self.enemies {
            let profile = enemy.kind.profile();
            enemy.phase += DRIFT_RATE * dt;

            match enemy.maneuver {
                Maneuver::Formation => {
                    enemy.pos = enemy.formation_pos();
                    if self.dive_one_in > 0 && self.rng.random_ratio(1, self.dive_one_in) {
                        enemy.maneuver = Maneuver::Diving { target: player_pos };
                        log::debug!("Enemy {} dives at ({:.0}, {:.0})", enemy.id, player_pos.x, player_pos.y);
                    }
                }
                Maneuver::Diving { target } => {
                    let step = DIVE_SPEED * profile.speed * dt;
                    let to_target = target - enemy.pos;
                    let distance = to_target.length();
                    if distance > DIVE_ARRIVE {
                        enemy.pos += to_target / distance * step;
                    } else {
                        enemy.pos.y += step;
                        enemy.maneuver = Maneuver::Leaving;
                    }
                }
                Maneuver::Leaving => {
                    enemy.pos.y += DIVE_SPEED * profile.speed * dt;
                }
            }

            // Persistent: returned to formation instead of removed
            if !field.contains(&enemy.bounds()) {
                enemy.return_to_formation();
            }

            if let Some(every) = profile.shoot_every {
                enemy.shoot_ticks += 1;
                if enemy.shoot_ticks > every {
                    enemy.shoot_ticks = 0;
                    let muzzle = enemy.pos + Vec2::new(ENEMY_WIDTH / 2.0, ENEMY_HEIGHT);
                    self.bullets.push(Bullet::new(
                        muzzle,
                        Vec2::new(0.0, ENEMY_BULLET_SPEED),
                        Owner::Enemy(enemy.id),
                    ));
                    self.stats.fired += 1;
                }
            }
        }
    }

    fn update_bullets(&mut self, dt: f32) {
        let field = self.playfield();
        for (idx, bullet) in self.bullets.iter_mut().enumerate() {
            bullet.pos += bullet.vel * dt;
            if !field.contains(&bullet.bounds()) {
                self.doomed_bullets.mark(idx);
            }
        }
        // Off-field bullets go this frame, before collisions see them
        self.stats.removed += self.doomed_bullets.sweep(&mut self.bullets) as u64;
    }
}

impl World for ShooterWorld {
    const TICK_HZ: u32 = crate::consts::DEFAULT_TICK_HZ;

    fn reset(seed: u64) -> Self {
        let mut world = Self {
            player: Player::default(),
            enemies: Vec::new(),
            bullets: Vec::new(),
            level: 1,
            stats: Stats::default(),
            dive_one_in: DIVE_ONE_IN,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            doomed_bullets: Doomed::new(),
            doomed_enemies: Doomed::new(),
        };
        world.spawn_formation();
        world
    }

    fn update(&mut self, input: &IntentSet, dt: f32) {
        self.player.steer(input, dt);
        if input.contains(Intent::Shoot) {
            let muzzle = self.player.muzzle();
            self.fire(Bullet::new(
                muzzle,
                Vec2::new(0.0, -PLAYER_BULLET_SPEED),
                Owner::Player,
            ));
        }

        self.update_enemies(dt);
        self.update_bullets(dt);
    }

    fn resolve_collisions(&mut self) {
        let player_box = self.player.bounds();
        // Enemies whose fire already hit the player this tick
        let mut hit_by: Vec<u32> = Vec::new();

        for (bi, bullet) in self.bullets.iter().enumerate() {
            if self.doomed_bullets.is_marked(bi) {
                continue;
            }
            let bullet_box = bullet.bounds();

            match bullet.owner {
                Owner::Player => {
                    // First overlapping enemy in iteration order wins
                    for (ei, enemy) in self.enemies.iter().enumerate() {
                        if self.doomed_enemies.is_marked(ei) {
                            continue;
                        }
                        if bullet_box.overlaps(&enemy.bounds()) {
                            self.doomed_bullets.mark(bi);
                            self.doomed_enemies.mark(ei);
                            self.player.score += enemy.kind.profile().points;
                            self.stats.kills += 1;
                            break;
                        }
                    }
                }
                Owner::Enemy(source) => {
                    // One hit per firing enemy per tick; later bullets fly on
                    if !hit_by.contains(&source) && bullet_box.overlaps(&player_box) {
                        hit_by.push(source);
                        self.doomed_bullets.mark(bi);
                        self.player.lives = self.player.lives.saturating_sub(1);
                        self.stats.hits_taken += 1;
                    }
                }
            }
        }

        // Rammers survive and are sent back to their slot
        for (ei, enemy) in self.enemies.iter_mut().enumerate() {
            if self.doomed_enemies.is_marked(ei) {
                continue;
            }
            if enemy.bounds().overlaps(&player_box) {
                self.player.lives = self.player.lives.saturating_sub(1);
                self.stats.hits_taken += 1;
                enemy.return_to_formation();
            }
        }
    }

    fn cleanup(&mut self) {
        self.stats.removed += self.doomed_bullets.sweep(&mut self.bullets) as u64;
        self.doomed_enemies.sweep(&mut self.enemies);

        if self.enemies.is_empty() {
            self.level += 1;
            log::info!("Formation cleared, level {}", self.level);
            self.spawn_formation();
        }
    }

    fn is_terminal(&self) -> bool {
        self.player.lives == 0
    }

    fn hud(&self) -> Hud {
        Hud {
            score: self.player.score,
            lives: Some(self.player.lives),
            level: Some(self.level),
            best: None,
        }
    }

    fn collect_entities(&self, out: &mut Vec<EntityView>) {
        out.push(EntityView::new(Sprite::Player, self.player.bounds()));
        for enemy in &self.enemies {
            out.push(EntityView::new(enemy.kind.profile().sprite, enemy.bounds()));
        }
        for bullet in &self.bullets {
            let sprite = match bullet.owner {
                Owner::Player => Sprite::PlayerBullet,
                Owner::Enemy(_) => Sprite::EnemyBullet,
            };
            out.push(EntityView::new(sprite, bullet.bounds()));
        }
    }

    fn playfield(&self) -> Aabb {
        Aabb::new(0.0, 0.0, FIELD_WIDTH, FIELD_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Phase, Simulation};
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    /// World with dives off and no enemies
    fn empty_world() -> ShooterWorld {
        let mut world = ShooterWorld::reset(7);
        world.dive_one_in = 0;
        world.enemies.clear();
        world
    }

    fn tick(world: &mut ShooterWorld, input: &IntentSet) {
        world.update(input, DT);
        world.resolve_collisions();
        world.cleanup();
    }

    #[test]
    fn test_initial_spawn() {
        let world = ShooterWorld::reset(1);
        assert_eq!(world.player.lives, INITIAL_LIVES);
        assert_eq!(world.player.score, 0);
        assert_eq!(world.level, 1);
        assert_eq!(world.enemies.len(), 5 * 8);
        assert!(world.bullets.is_empty());

        assert_eq!(world.enemies[0].kind, EnemyKind::Shooter);
        assert_eq!(world.enemies[8].kind, EnemyKind::Fast);
        assert_eq!(world.enemies[16].kind, EnemyKind::Basic);
        assert_eq!(world.enemies[9].home, Vec2::new(160.0, 100.0));
    }

    #[test]
    fn test_behaviour_table() {
        assert_eq!(EnemyKind::Basic.profile().points, 100);
        assert_eq!(EnemyKind::Fast.profile().points, 200);
        assert_eq!(EnemyKind::Shooter.profile().points, 300);
        assert_eq!(EnemyKind::Fast.profile().speed, 2.0);
        assert!(EnemyKind::Basic.profile().shoot_every.is_none());
        assert_eq!(EnemyKind::Shooter.profile().shoot_every, Some(120));
    }

    #[test]
    fn test_formation_rows_capped() {
        let mut world = ShooterWorld::reset(1);
        world.level = 20;
        world.spawn_formation();
        assert_eq!(world.enemies.len(), (FORMATION_MAX_ROWS * FORMATION_COLS) as usize);
        let field = world.playfield();
        assert!(world.enemies.iter().all(|e| field.contains(&e.bounds())));
    }

    #[test]
    fn test_formation_stays_above_player_zone() {
        assert_eq!(ShooterWorld::row_spacing(5), ROW_SPACING);
        let zone_top = Player::zone().top();
        for level in 1..=6 {
            let mut world = ShooterWorld::reset(1);
            world.dive_one_in = 0;
            world.level = level;
            world.spawn_formation();
            // Sweep a full drift cycle
            for _ in 0..700 {
                world.update_enemies(DT);
                let lowest = world.enemies.iter().map(|e| e.bounds().bottom()).fold(0.0, f32::max);
                assert!(lowest <= zone_top, "level {} reaches {}", level, lowest);
            }
        }
    }

    #[test]
    fn test_bullet_hits_enemy_scenario() {
        let mut world = empty_world();
        world.spawn_enemy(EnemyKind::Basic, Vec2::new(90.0, 40.0));
        // Second enemy keeps the level from advancing
        world.spawn_enemy(EnemyKind::Basic, Vec2::new(600.0, 40.0));
        world.fire(Bullet::new(Vec2::new(100.0, 50.0), Vec2::new(0.0, -8.0 / DT), Owner::Player));

        world.update(&IntentSet::EMPTY, DT);
        let bullet = &world.bullets[0];
        assert!((bullet.pos.y - 42.0).abs() < 1e-3);
        assert!((bullet.pos.x - 100.0).abs() < 1e-6);

        world.resolve_collisions();
        world.cleanup();
        assert!(world.bullets.is_empty());
        assert_eq!(world.enemies.len(), 1);
        assert_eq!(world.player.score, 100);
        assert_eq!(world.stats.fired, 1);
        assert_eq!(world.stats.removed, 1);
    }

    #[test]
    fn test_first_match_only() {
        let mut world = empty_world();
        // Two overlapping enemies; the bullet consumes the first in order
        world.spawn_enemy(EnemyKind::Fast, Vec2::new(90.0, 40.0));
        world.spawn_enemy(EnemyKind::Shooter, Vec2::new(95.0, 45.0));
        world.fire(Bullet::new(Vec2::new(100.0, 52.0), Vec2::ZERO, Owner::Player));

        tick(&mut world, &IntentSet::EMPTY);
        assert_eq!(world.enemies.len(), 1);
        assert_eq!(world.enemies[0].kind, EnemyKind::Shooter);
        assert_eq!(world.player.score, 200);
    }

    #[test]
    fn test_second_bullet_survives_consumed_enemy() {
        let mut world = empty_world();
        world.spawn_enemy(EnemyKind::Basic, Vec2::new(90.0, 40.0));
        world.spawn_enemy(EnemyKind::Basic, Vec2::new(600.0, 40.0));
        world.fire(Bullet::new(Vec2::new(100.0, 50.0), Vec2::ZERO, Owner::Player));
        world.fire(Bullet::new(Vec2::new(105.0, 50.0), Vec2::ZERO, Owner::Player));

        tick(&mut world, &IntentSet::EMPTY);
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.player.score, 100);
    }

    #[test]
    fn test_enemy_bullet_costs_life() {
        let mut world = empty_world();
        world.spawn_enemy(EnemyKind::Basic, Vec2::new(100.0, 40.0));
        let target = world.player.pos + Vec2::new(10.0, 10.0);
        world.fire(Bullet::new(target, Vec2::ZERO, Owner::Enemy(1)));

        tick(&mut world, &IntentSet::EMPTY);
        assert_eq!(world.player.lives, INITIAL_LIVES - 1);
        assert!(world.bullets.is_empty());
        assert_eq!(world.stats.hits_taken, 1);
    }

    #[test]
    fn test_player_bullets_ignore_player() {
        let mut world = empty_world();
        world.spawn_enemy(EnemyKind::Basic, Vec2::new(100.0, 40.0));
        world.fire(Bullet::new(world.player.pos + Vec2::new(5.0, 5.0), Vec2::ZERO, Owner::Player));
        tick(&mut world, &IntentSet::EMPTY);
        assert_eq!(world.player.lives, INITIAL_LIVES);
        assert_eq!(world.bullets.len(), 1);
    }

    #[test]
    fn test_ramming_enemy_returns_home() {
        let mut world = ShooterWorld::reset(4);
        world.dive_one_in = 0;
        let count = world.enemies.len();
        let enemy = &mut world.enemies[0];
        let id = enemy.id;
        enemy.maneuver = Maneuver::Leaving;
        enemy.pos = world.player.pos;

        tick(&mut world, &IntentSet::EMPTY);
        assert_eq!(world.player.lives, INITIAL_LIVES - 1);
        assert_eq!(world.player.score, 0);
        assert_eq!(world.enemies.len(), count);
        assert_eq!(world.level, 1);
        let enemy = world.enemies.iter().find(|e| e.id == id).unwrap();
        assert_eq!(enemy.maneuver, Maneuver::Formation);
        assert!(enemy.pos.distance(enemy.home) < DRIFT_X + DRIFT_Y);

        // Back in its slot it no longer touches the ship
        tick(&mut world, &IntentSet::EMPTY);
        assert_eq!(world.player.lives, INITIAL_LIVES - 1);
    }

    #[test]
    fn test_one_hit_per_firing_enemy() {
        let mut world = empty_world();
        world.spawn_enemy(EnemyKind::Basic, Vec2::new(100.0, 40.0));
        let at = world.player.pos + Vec2::new(5.0, 5.0);
        world.fire(Bullet::new(at, Vec2::ZERO, Owner::Enemy(7)));
        world.fire(Bullet::new(at, Vec2::ZERO, Owner::Enemy(7)));
        world.fire(Bullet::new(at, Vec2::ZERO, Owner::Enemy(8)));

        tick(&mut world, &IntentSet::EMPTY);
        // Sources 7 and 8 each land once; the second bullet from 7 survives
        assert_eq!(world.player.lives, INITIAL_LIVES - 2);
        assert_eq!(world.stats.hits_taken, 2);
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.bullets[0].owner, Owner::Enemy(7));

        tick(&mut world, &IntentSet::EMPTY);
        assert_eq!(world.player.lives, INITIAL_LIVES - 3);
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_off_field_bullet_removed_same_frame() {
        let mut world = empty_world();
        world.spawn_enemy(EnemyKind::Basic, Vec2::new(100.0, 40.0));
        world.fire(Bullet::new(Vec2::new(700.0, 2.0), Vec2::new(0.0, -PLAYER_BULLET_SPEED), Owner::Player));
        world.update(&IntentSet::EMPTY, DT);
        assert!(world.bullets.is_empty());
        assert_eq!(world.stats.removed, 1);
    }

    #[test]
    fn test_player_confined_to_lower_half() {
        let mut world = empty_world();
        world.spawn_enemy(EnemyKind::Basic, Vec2::new(100.0, 40.0));
        let up_left = IntentSet::of(&[Intent::Up, Intent::Left]);
        for _ in 0..200 {
            tick(&mut world, &up_left);
        }
        assert_eq!(world.player.pos, Vec2::new(0.0, FIELD_HEIGHT / 2.0));

        let down_right = IntentSet::of(&[Intent::Down, Intent::Right]);
        for _ in 0..300 {
            tick(&mut world, &down_right);
        }
        assert_eq!(
            world.player.pos,
            Vec2::new(FIELD_WIDTH - PLAYER_WIDTH, FIELD_HEIGHT - PLAYER_HEIGHT)
        );
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let mut world = empty_world();
        world.spawn_enemy(EnemyKind::Basic, Vec2::new(100.0, 40.0));
        let start = world.player.pos;
        tick(&mut world, &IntentSet::of(&[Intent::Left, Intent::Right]));
        assert_eq!(world.player.pos, start);
    }

    #[test]
    fn test_shooter_fires_on_tick_121() {
        let mut world = empty_world();
        let id = world.spawn_enemy(EnemyKind::Shooter, Vec2::new(100.0, 40.0));
        for _ in 0..120 {
            tick(&mut world, &IntentSet::EMPTY);
        }
        assert_eq!(world.enemy_bullets().count(), 0);

        tick(&mut world, &IntentSet::EMPTY);
        assert_eq!(world.enemy_bullets().count(), 1);
        assert_eq!(world.bullets[0].owner, Owner::Enemy(id));

        // Next shot another 121 ticks later
        for _ in 0..120 {
            tick(&mut world, &IntentSet::EMPTY);
        }
        assert_eq!(world.enemy_bullets().count(), 1);
        tick(&mut world, &IntentSet::EMPTY);
        assert_eq!(world.enemy_bullets().count(), 2);
    }

    #[test]
    fn test_dive_and_return() {
        let mut world = empty_world();
        let id = world.spawn_enemy(EnemyKind::Fast, Vec2::new(100.0, 40.0));
        world.player.pos = Vec2::new(700.0, 560.0);
        world.enemies[0].maneuver = Maneuver::Diving {
            target: Vec2::new(100.0, 300.0),
        };

        let mut left_formation = false;
        for _ in 0..600 {
            tick(&mut world, &IntentSet::EMPTY);
            let enemy = world.enemies.iter().find(|e| e.id == id).unwrap();
            if enemy.maneuver == Maneuver::Leaving {
                left_formation = true;
            }
            if left_formation && enemy.maneuver == Maneuver::Formation {
                return;
            }
        }
        panic!("diver never came back to the formation");
    }

    #[test]
    fn test_level_advances_when_cleared() {
        let mut world = empty_world();
        world.spawn_enemy(EnemyKind::Basic, Vec2::new(90.0, 40.0));
        world.fire(Bullet::new(Vec2::new(100.0, 50.0), Vec2::ZERO, Owner::Player));
        tick(&mut world, &IntentSet::EMPTY);
        assert_eq!(world.level, 2);
        assert_eq!(world.enemies.len(), 6 * 8);
    }

    #[test]
    fn test_game_over_and_exact_restart() {
        let mut sim = Simulation::<ShooterWorld>::new(99);
        let fresh = ShooterWorld::reset(99);
        sim.world_mut().dive_one_in = 0;
        sim.world_mut().player.lives = 1;
        let hit_at = sim.world().player.pos + Vec2::new(5.0, 5.0);
        sim.world_mut().fire(Bullet::new(hit_at, Vec2::ZERO, Owner::Enemy(1)));

        sim.step(&IntentSet::EMPTY);
        assert_eq!(sim.phase(), Phase::GameOver);

        sim.step(&IntentSet::of(&[Intent::Restart]));
        assert_eq!(sim.phase(), Phase::Running);
        let world = sim.world();
        assert_eq!(world.player.lives, fresh.player.lives);
        assert_eq!(world.player.score, fresh.player.score);
        assert_eq!(world.player.pos, fresh.player.pos);
        assert_eq!(world.level, fresh.level);
        assert_eq!(world.bullets.len(), 0);
        assert_eq!(world.stats, Stats::default());
        let homes: Vec<_> = world.enemies.iter().map(|e| (e.id, e.kind, e.home)).collect();
        let fresh_homes: Vec<_> = fresh.enemies.iter().map(|e| (e.id, e.kind, e.home)).collect();
        assert_eq!(homes, fresh_homes);
    }

    fn intent_strategy() -> impl Strategy<Value = IntentSet> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(l, r, u, d, s)| {
                let mut set = IntentSet::new();
                for (on, intent) in [
                    (l, Intent::Left),
                    (r, Intent::Right),
                    (u, Intent::Up),
                    (d, Intent::Down),
                    (s, Intent::Shoot),
                ] {
                    if on {
                        set.insert(intent);
                    }
                }
                set
            },
        )
    }

    proptest! {
        #[test]
        fn prop_bullet_conservation_and_lives(
            seed in any::<u64>(),
            inputs in proptest::collection::vec(intent_strategy(), 1..400),
        ) {
            let mut world = ShooterWorld::reset(seed);
            world.dive_one_in = 20;
            let field = world.playfield();

            for input in &inputs {
                let lives_before = world.player.lives;
                let hits_before = world.stats.hits_taken;

                world.update(input, DT);
                // Everything is inside the field when collisions run
                prop_assert!(field.contains(&world.player.bounds()));
                prop_assert!(world.enemies.iter().all(|e| field.contains(&e.bounds())));
                prop_assert!(world.bullets.iter().all(|b| field.contains(&b.bounds())));

                world.resolve_collisions();
                world.cleanup();

                prop_assert_eq!(
                    world.bullets.len() as u64,
                    world.stats.fired - world.stats.removed
                );
                prop_assert!(world.player.lives <= lives_before);
                if world.player.lives < lives_before {
                    prop_assert!(world.stats.hits_taken > hits_before);
                }
                if world.is_terminal() {
                    prop_assert_eq!(world.player.lives, 0);
                    break;
                }
            }
        }
    }
}
