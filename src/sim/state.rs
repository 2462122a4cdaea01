//! Game state and core simulation types
//!
//! Everything a session mutates lives in [`GameState`]; update and render
//! functions take it explicitly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Box2D, Circle, clamp};
use super::level::LevelLayout;
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball stuck to paddle, waiting for launch input
    Serve,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Level cleared, short rest before the next one
    Breather,
    /// Run ended
    GameOver,
}

/// Win/lose status derived from the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    InProgress,
    Won,
    Lost,
}

/// Tunable physics parameters (from settings)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub paddle_speed: f32,
    pub ball_speed: f32,
    pub ball_radius: f32,
    pub paddle_size: Vec2,
    pub start_lives: i32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            paddle_speed: PADDLE_SPEED,
            ball_speed: BALL_SPEED,
            ball_radius: BALL_RADIUS,
            paddle_size: Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT),
            start_lives: START_LIVES,
        }
    }
}

/// The ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub radius: f32,
    /// Unit direction; scaled by the ball speed when integrating
    pub vel: Vec2,
    /// Resting on the paddle, pre-launch
    pub stuck: bool,
}

impl Ball {
    /// Stuck ball resting on top of `paddle`, horizontally centered
    pub fn resting_on(paddle: &Paddle, radius: f32) -> Self {
        let top = paddle.bounds.min().y;
        Self {
            pos: Vec2::new(paddle.bounds.center.x, top - radius),
            radius,
            vel: Vec2::ZERO,
            stuck: true,
        }
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }

    pub fn bounds(&self) -> Box2D {
        self.circle().bounds()
    }
}

/// The player's paddle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub bounds: Box2D,
}

impl Paddle {
    /// Paddle centered horizontally near the bottom edge
    pub fn initial(width: f32, height: f32, size: Vec2) -> Self {
        let center = Vec2::new(width * 0.5, height - PADDLE_BOTTOM_OFFSET);
        Self {
            bounds: Box2D::new(center, size * 0.5),
        }
    }
}

/// A brick. `kind == 0` is solid (indestructible); anything else breaks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub kind: u8,
    pub bounds: Box2D,
}

impl Brick {
    #[inline]
    pub fn is_solid(&self) -> bool {
        self.kind == 0
    }

    /// Returns true if this brick must be destroyed to clear the level
    #[inline]
    pub fn counts_for_clear(&self) -> bool {
        self.kind > 0
    }
}

/// Order-unstable brick storage.
///
/// Removal is two-phase: bricks are marked while scanning, then
/// [`BrickList::compact`] swap-removes every marked brick at once, so
/// indices stay valid for the whole scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrickList {
    bricks: Vec<Brick>,
    #[serde(skip)]
    marked: Vec<usize>,
}

impl BrickList {
    pub fn new(bricks: Vec<Brick>) -> Self {
        Self {
            bricks,
            marked: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bricks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Brick> {
        self.bricks.iter()
    }

    pub fn as_slice(&self) -> &[Brick] {
        &self.bricks
    }

    pub fn push(&mut self, brick: Brick) {
        self.bricks.push(brick);
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Brick> {
        self.bricks.iter_mut()
    }

    /// Mark brick `index` for removal at the next compaction
    pub fn mark(&mut self, index: usize) {
        if index < self.bricks.len() && !self.marked.contains(&index) {
            self.marked.push(index);
        }
    }

    /// Remove all marked bricks (swap with last, then pop).
    ///
    /// Highest index first, so a swapped-in brick is never one still
    /// waiting to be removed. Returns how many bricks were removed.
    pub fn compact(&mut self) -> usize {
        self.marked.sort_unstable_by(|a, b| b.cmp(a));
        let removed = self.marked.len();
        for index in self.marked.drain(..) {
            self.bricks.swap_remove(index);
        }
        removed
    }

    /// Number of destructible bricks
    pub fn non_solid_count(&self) -> usize {
        self.bricks.iter().filter(|b| b.counts_for_clear()).count()
    }
}

impl<'a> IntoIterator for &'a BrickList {
    type Item = &'a Brick;
    type IntoIter = std::slice::Iter<'a, Brick>;

    fn into_iter(self) -> Self::IntoIter {
        self.bricks.iter()
    }
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Playfield size in pixels
    pub width: f32,
    pub height: f32,
    /// Seed for generated levels
    pub seed: u64,
    /// Current level (0 = built-in standard layout)
    pub level_index: u32,
    /// Lives left; the run is lost at -1
    pub lives: i32,
    /// Destructible bricks still standing
    pub non_solid_remaining: u32,
    pub phase: GamePhase,
    /// Seconds left in the breather phase
    pub breather_secs: f32,
    pub tuning: Tuning,
    pub paddle: Paddle,
    pub ball: Ball,
    pub bricks: BrickList,
}

impl GameState {
    /// New session with the standard first level
    pub fn new(width: f32, height: f32, seed: u64, tuning: Tuning) -> Self {
        let paddle = Paddle::initial(width, height, tuning.paddle_size);
        let ball = Ball::resting_on(&paddle, tuning.ball_radius);
        let mut state = Self {
            width,
            height,
            seed,
            level_index: 0,
            lives: tuning.start_lives,
            non_solid_remaining: 0,
            phase: GamePhase::Serve,
            breather_secs: 0.0,
            tuning,
            paddle,
            ball,
            bricks: BrickList::default(),
        };
        state.load_level(&LevelLayout::standard());
        state
    }

    /// Replace the bricks with `layout` and re-serve
    pub fn load_level(&mut self, layout: &LevelLayout) {
        let region = LevelLayout::default_region(self.width, self.height);
        let (bricks, non_solid) = layout.instantiate(region);
        self.bricks = BrickList::new(bricks);
        self.non_solid_remaining = non_solid;
        self.reset_ball_and_paddle();
        self.phase = GamePhase::Serve;
        log::info!(
            "Level {}: {} bricks ({} destructible)",
            self.level_index + 1,
            self.bricks.len(),
            non_solid
        );
    }

    /// Put paddle back in the middle and stick the ball on it
    pub fn reset_ball_and_paddle(&mut self) {
        self.paddle = Paddle::initial(self.width, self.height, self.tuning.paddle_size);
        self.ball = Ball::resting_on(&self.paddle, self.tuning.ball_radius);
    }

    /// Adapt to a new drawable size.
    ///
    /// Bricks are rescaled from the old grid region into the new one and the
    /// paddle is re-anchored above the bottom edge. While serving the paddle
    /// and ball are re-centered; otherwise the paddle keeps its x (clamped)
    /// and a free ball keeps its relative position.
    pub fn resize(&mut self, width: f32, height: f32) {
        let old_region = LevelLayout::default_region(self.width, self.height);
        let new_region = LevelLayout::default_region(width, height);
        let scale = new_region.size() / old_region.size().max(Vec2::ONE);
        for brick in self.bricks.iter_mut() {
            let offset = brick.bounds.center - old_region.min();
            brick.bounds = Box2D::new(new_region.min() + offset * scale, brick.bounds.half * scale);
        }

        let old_size = Vec2::new(self.width, self.height).max(Vec2::ONE);
        self.width = width;
        self.height = height;
        if self.phase == GamePhase::Serve {
            self.reset_ball_and_paddle();
            return;
        }

        let old_paddle_x = self.paddle.bounds.center.x;
        let half = self.paddle.bounds.half.x;
        self.paddle.bounds.center = Vec2::new(
            clamp(old_paddle_x, half, width - half),
            height - PADDLE_BOTTOM_OFFSET,
        );

        if self.ball.stuck {
            let offset = self.ball.pos.x - old_paddle_x;
            self.ball = Ball::resting_on(&self.paddle, self.ball.radius);
            self.ball.pos.x += offset;
        } else {
            let r = self.ball.radius;
            let pos = self.ball.pos * Vec2::new(width, height) / old_size;
            self.ball.pos = Vec2::new(clamp(pos.x, r, width - r), clamp(pos.y, r, height - r));
        }
    }

    pub fn outcome(&self) -> Outcome {
        if self.lives < 0 {
            Outcome::Lost
        } else if self.non_solid_remaining == 0 {
            Outcome::Won
        } else {
            Outcome::InProgress
        }
    }
}
