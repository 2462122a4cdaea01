//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep driven from the outside
//! - Seeded RNG only (level generation)
//! - Stable brick iteration order within a scan
//! - No rendering or platform dependencies

pub mod collision;
pub mod geometry;
pub mod level;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, check_collision, collide_ball_bricks};
pub use geometry::{Box2D, Circle, Direction, clamp, closest_point_on_box, primary_direction};
pub use level::{LevelError, LevelLayout};
pub use state::{Ball, Brick, BrickList, GamePhase, GameState, Outcome, Paddle, Tuning};
pub use tick::{BallEvent, TickInput, move_ball, move_paddle, tick};
