//! Brick grid layouts
//!
//! A layout is a byte table: grid width, grid height, then one byte per cell
//! in row-major order. 0 = empty, 1 = solid, n >= 2 = destructible type n-1.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::Box2D;
use super::state::Brick;
use crate::consts::{BRICK_REGION_HEIGHT_FRACTION, BRICK_REGION_TOP};

/// Cell value for a solid brick
pub const CELL_SOLID: u8 = 1;
/// Highest destructible cell value the generator emits
const GENERATED_MAX_CELL: u8 = 6;

/// Errors parsing a layout table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// Fewer than the two header bytes
    MissingHeader,
    /// Header says `expected` cells but the table holds `actual`
    CellCount { expected: usize, actual: usize },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::MissingHeader => write!(f, "level table is missing its size header"),
            LevelError::CellCount { expected, actual } => {
                write!(f, "level table has {actual} cells, header declares {expected}")
            }
        }
    }
}

impl std::error::Error for LevelError {}

/// A brick grid description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub width: u8,
    pub height: u8,
    /// Row-major, `width * height` entries
    pub cells: Vec<u8>,
}

#[rustfmt::skip]
const STANDARD: [u8; 2 + 15 * 8] = [
    15, 8,
    6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6,
    6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6,
    5, 5, 5, 5, 5, 0, 0, 0, 0, 0, 5, 5, 5, 5, 5,
    5, 1, 5, 1, 5, 0, 0, 1, 0, 0, 5, 1, 5, 1, 5,
    4, 4, 4, 4, 4, 0, 0, 0, 0, 0, 4, 4, 4, 4, 4,
    4, 4, 1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 1, 4, 4,
    3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3,
    2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
];

impl LevelLayout {
    /// The built-in first level
    pub fn standard() -> Self {
        // The table is a compile-time constant with a matching header.
        Self::from_bytes(&STANDARD).unwrap_or_else(|_| Self::empty())
    }

    fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
        }
    }

    /// Parse a byte table (header + cells). Trailing bytes are an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LevelError> {
        let [width, height, cells @ ..] = bytes else {
            return Err(LevelError::MissingHeader);
        };
        let expected = *width as usize * *height as usize;
        if cells.len() != expected {
            return Err(LevelError::CellCount {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width: *width,
            height: *height,
            cells: cells.to_vec(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.cells.len());
        out.push(self.width);
        out.push(self.height);
        out.extend_from_slice(&self.cells);
        out
    }

    /// Seeded random layout for levels after the first
    pub fn generate(seed: u64, level_index: u32) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed ^ (level_index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let width = 15u8;
        let height = 6 + (level_index % 3) as u8;
        // Solid bricks get more common as levels go on
        let solid_chance = (4 + level_index * 2).min(16);

        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for row in 0..height {
            for _ in 0..width {
                let roll = rng.random_range(0..100u32);
                let cell = if roll < 12 {
                    0
                } else if roll < 12 + solid_chance {
                    CELL_SOLID
                } else {
                    // Lower rows get the cheaper colors
                    let top = GENERATED_MAX_CELL.saturating_sub(row / 2).max(2);
                    rng.random_range(2..=top)
                };
                cells.push(cell);
            }
        }

        if !cells.iter().any(|&c| c > CELL_SOLID) {
            cells[0] = 2;
        }

        log::debug!("Generated level {} from seed {}", level_index + 1, seed);
        Self {
            width,
            height,
            cells,
        }
    }

    /// Pixel region the grid is stretched over for a playfield size
    pub fn default_region(width: f32, height: f32) -> Box2D {
        Box2D::from_corner(
            Vec2::new(0.0, BRICK_REGION_TOP),
            Vec2::new(width, height * BRICK_REGION_HEIGHT_FRACTION),
        )
    }

    /// Create one brick per non-empty cell, sized uniformly to fill `region`.
    ///
    /// Returns the bricks and how many of them are destructible.
    pub fn instantiate(&self, region: Box2D) -> (Vec<Brick>, u32) {
        if self.width == 0 || self.height == 0 {
            return (Vec::new(), 0);
        }

        let cell = region.size() / Vec2::new(self.width as f32, self.height as f32);
        let origin = region.min();
        let mut bricks = Vec::new();
        let mut non_solid = 0;

        for row in 0..self.height as usize {
            for col in 0..self.width as usize {
                let value = self.cells[row * self.width as usize + col];
                if value == 0 {
                    continue;
                }
                let kind = value - 1;
                if kind > 0 {
                    non_solid += 1;
                }
                let min = origin + cell * Vec2::new(col as f32, row as f32);
                bricks.push(Brick {
                    kind,
                    bounds: Box2D::from_corner(min, cell),
                });
            }
        }

        (bricks, non_solid)
    }
}
