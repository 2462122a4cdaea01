//! Axis-aligned boxes, circles and the penetration-direction classifier
//!
//! Screen space throughout: origin top-left, +x right, +y down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle stored as center + half-extents
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Box2D {
    pub center: Vec2,
    /// Half width / half height, both >= 0
    pub half: Vec2,
}

impl Box2D {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self {
            center,
            half: half.max(Vec2::ZERO),
        }
    }

    /// Build from a top-left corner and full size
    pub fn from_corner(min: Vec2, size: Vec2) -> Self {
        let half = size.max(Vec2::ZERO) * 0.5;
        Self::new(min + half, half)
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.half * 2.0
    }

    /// Inclusive AABB overlap (touching edges count)
    pub fn overlaps(&self, other: &Box2D) -> bool {
        let a_min = self.min();
        let a_max = self.max();
        let b_min = other.min();
        let b_max = other.max();
        a_max.x >= b_min.x && b_max.x >= a_min.x && a_max.y >= b_min.y && b_max.y >= a_min.y
    }
}

/// A circle (the ball's collision shape)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Bounding box of the circle
    pub fn bounds(&self) -> Box2D {
        Box2D::new(self.center, Vec2::splat(self.radius))
    }
}

/// Axis direction used to pick the bounce axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Test order; ties go to the earlier entry
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit vector in screen space (up is -y)
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::NEG_Y,
            Direction::Right => Vec2::X,
            Direction::Down => Vec2::Y,
            Direction::Left => Vec2::NEG_X,
        }
    }

    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Standard clamp
#[inline]
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

/// Closest point on (or inside) `bounds` to `point`
pub fn closest_point_on_box(point: Vec2, bounds: &Box2D) -> Vec2 {
    let offset = point - bounds.center;
    let clamped = Vec2::new(
        clamp(offset.x, -bounds.half.x, bounds.half.x),
        clamp(offset.y, -bounds.half.y, bounds.half.y),
    );
    bounds.center + clamped
}

/// Pick the axis direction `v` is most aligned with.
///
/// A zero vector has no direction; it resolves to `Up`.
pub fn primary_direction(v: Vec2) -> Direction {
    let Some(n) = v.try_normalize() else {
        return Direction::Up;
    };

    let mut best = Direction::Up;
    let mut max = f32::NEG_INFINITY;
    for dir in Direction::ALL {
        let dot = n.dot(dir.unit());
        if dot > max {
            max = dot;
            best = dir;
        }
    }
    best
}
