//! Axis-aligned collision detection
//!
//! Everything in the playfield is a box: the player's hitbox, obstacles and
//! eco fragments. Screen coordinates, y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle given by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Strict overlap test: both axis projections must intersect with
    /// non-zero width. Boxes that only share an edge do not overlap, and a
    /// zero-size box never overlaps anything.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left().max(other.left()) < self.right().min(other.right())
            && self.top().max(other.top()) < self.bottom().min(other.bottom())
    }
}

/// Index of the first box in `others` that overlaps `probe`
pub fn first_overlap(probe: &Rect, others: impl IntoIterator<Item = Rect>) -> Option<usize> {
    others.into_iter().position(|r| probe.overlaps(&r))
}

/// Indices of every box in `others` that overlaps `probe`, in input order
pub fn all_overlaps(probe: &Rect, others: impl IntoIterator<Item = Rect>) -> Vec<usize> {
    others
        .into_iter()
        .enumerate()
        .filter(|(_, r)| probe.overlaps(r))
        .map(|(i, _)| i)
        .collect()
}
