//! Axis-aligned bounding boxes
//!
//! Every entity in every title collides as a box:
//! - min: top-left corner (y grows downward, screen convention)
//! - size: width and height, never negative

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned box in logical playfield units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    /// Top-left corner
    pub min: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w.max(0.0), h.max(0.0)),
        }
    }

    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            size: size.max(Vec2::ZERO),
        }
    }

    /// A one-by-one box covering a grid cell
    pub fn cell(x: i32, y: i32) -> Self {
        Self::new(x as f32, y as f32, 1.0, 1.0)
    }

    /// Bottom-right corner
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    /// Strict overlap test; boxes that only share an edge do not overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x && a_max.x > other.min.x && self.min.y < b_max.y && a_max.y > other.min.y
    }

    /// True if `other` lies entirely inside this box (edges inclusive)
    pub fn contains(&self, other: &Aabb) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && b_max.x <= a_max.x
            && b_max.y <= a_max.y
    }

    /// Top-left corner that keeps a box of `size` inside this box
    pub fn clamp_min(&self, min: Vec2, size: Vec2) -> Vec2 {
        let hi = (self.max() - size).max(self.min);
        min.clamp(self.min, hi)
    }
}
