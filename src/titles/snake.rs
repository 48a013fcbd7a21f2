//! Grid snake
//!
//! A 150x50 walled grid advanced ten times a second. The head moves one
//! cell per tick; eating food grows the body by one segment. Running into a
//! wall or the body ends the run.

use std::collections::{HashSet, VecDeque};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::{Aabb, EntityView, Hud, Intent, IntentSet, Sprite, World};

pub const GRID_WIDTH: i32 = 150;
pub const GRID_HEIGHT: i32 = 50;
pub const START: Cell = Cell::new(GRID_WIDTH / 2, GRID_HEIGHT / 2);

/// Random picks before falling back to scanning for a free cell
const FOOD_ATTEMPTS: usize = 64;

/// A grid cell (x right, y down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Border cells are walls
    pub fn is_wall(self) -> bool {
        self.x <= 0 || self.x >= GRID_WIDTH - 1 || self.y <= 0 || self.y >= GRID_HEIGHT - 1
    }

    pub fn bounds(self) -> Aabb {
        Aabb::cell(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Test order for turn intents; the first acceptable one wins
    pub const PRECEDENCE: [(Intent, Direction); 4] = [
        (Intent::Up, Direction::Up),
        (Intent::Down, Direction::Down),
        (Intent::Left, Direction::Left),
        (Intent::Right, Direction::Right),
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crash {
    Wall,
    Body,
    /// No free cell left for food
    BoardFull,
}

/// Complete snake world
#[derive(Debug, Clone)]
pub struct SnakeWorld {
    /// Head first
    pub body: VecDeque<Cell>,
    pub heading: Direction,
    /// Segments the body keeps after cleanup
    pub length: usize,
    pub food: Option<Cell>,
    pub score: u64,
    pub crash: Option<Crash>,
    rng: Pcg32,
}

impl SnakeWorld {
    pub fn head(&self) -> Cell {
        // The body is never empty
        self.body.front().copied().unwrap_or(START)
    }

    /// Segments that survive this tick, head excluded
    fn live_tail(&self) -> impl Iterator<Item = &Cell> {
        self.body.iter().take(self.length).skip(1)
    }

    /// Apply the first acceptable turn intent; reversals are ignored
    pub fn turn(&mut self, input: &IntentSet) {
        for (intent, dir) in Direction::PRECEDENCE {
            if input.contains(intent) && dir != self.heading.opposite() {
                self.heading = dir;
                return;
            }
        }
    }

    fn occupied(&self, cell: Cell) -> bool {
        self.body.iter().take(self.length).any(|c| *c == cell)
    }

    /// Pick an interior cell not covered by the snake
    pub fn place_food(&mut self) -> Option<Cell> {
        for _ in 0..FOOD_ATTEMPTS {
            let cell = Cell::new(
                self.rng.random_range(1..=GRID_WIDTH - 2),
                self.rng.random_range(1..=GRID_HEIGHT - 2),
            );
            if !self.occupied(cell) {
                return Some(cell);
            }
        }

        // Crowded board: choose uniformly among what is left
        let taken: HashSet<Cell> = self.body.iter().take(self.length).copied().collect();
        let free: Vec<Cell> = (1..GRID_HEIGHT - 1)
            .flat_map(|y| (1..GRID_WIDTH - 1).map(move |x| Cell::new(x, y)))
            .filter(|c| !taken.contains(c))
            .collect();
        if free.is_empty() {
            return None;
        }
        let pick = self.rng.random_range(0..free.len());
        Some(free[pick])
    }
}

impl World for SnakeWorld {
    const TICK_HZ: u32 = 10;
    const WALLED: bool = true;

    fn reset(seed: u64) -> Self {
        let mut world = Self {
            body: VecDeque::from([START]),
            heading: Direction::Right,
            length: 1,
            food: None,
            score: 0,
            crash: None,
            rng: Pcg32::seed_from_u64(seed),
        };
        world.food = world.place_food();
        world
    }

    fn update(&mut self, input: &IntentSet, _dt: f32) {
        self.turn(input);
        let head = self.head().step(self.heading);
        self.body.push_front(head);
    }

    fn resolve_collisions(&mut self) {
        let head = self.head();

        if head.is_wall() {
            self.crash = Some(Crash::Wall);
            return;
        }

        if self.food == Some(head) {
            self.length += 1;
            self.score += 1;
            self.food = self.place_food();
            if self.food.is_none() {
                self.crash = Some(Crash::BoardFull);
            }
        }

        // The tail cell being vacated this tick is not an obstacle
        if self.live_tail().any(|c| *c == head) {
            self.crash = Some(Crash::Body);
        }
    }

    fn cleanup(&mut self) {
        self.body.truncate(self.length);
    }

    fn is_terminal(&self) -> bool {
        self.crash.is_some()
    }

    fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            lives: None,
            level: None,
            best: None,
        }
    }

    fn collect_entities(&self, out: &mut Vec<EntityView>) {
        if let Some(food) = self.food {
            out.push(EntityView::new(Sprite::Food, food.bounds()));
        }
        for (i, cell) in self.body.iter().enumerate() {
            let sprite = if i == 0 { Sprite::SnakeHead } else { Sprite::SnakeBody };
            out.push(EntityView::new(sprite, cell.bounds()));
        }
    }

    fn playfield(&self) -> Aabb {
        Aabb::new(0.0, 0.0, GRID_WIDTH as f32, GRID_HEIGHT as f32)
    }
}
