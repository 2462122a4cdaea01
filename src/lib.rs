//! Glyph Breakout - a brick breaker on a batched glyph renderer
//!
//! Core modules:
//! - `sim`: Simulation (collision, motion, bricks, game state)
//! - `renderer`: CPU glyph batching plus the WebGPU upload/draw path
//! - `platform`: Input mapping and frame timing
//! - `persistence`: Small file service used by the loaders
//! - `atlas`: Named UV rectangles, stored as a fixed-record blob
//! - `settings`: JSON configuration

pub mod atlas;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use atlas::{Atlas, UvQuad};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed into the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default playfield (drawable) size
    pub const DEFAULT_WIDTH: u32 = 800;
    pub const DEFAULT_HEIGHT: u32 = 600;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 20.0;
    /// Distance from the bottom edge to the paddle center
    pub const PADDLE_BOTTOM_OFFSET: f32 = 30.0;
    /// Pixels per second
    pub const PADDLE_SPEED: f32 = 500.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    /// Pixels per second along the (unit) velocity
    pub const BALL_SPEED: f32 = 420.0;

    /// Lives at the start of a session. Losing with lives at 0 ends the run.
    pub const START_LIVES: i32 = 3;

    /// Fraction of the playfield height the brick grid occupies
    pub const BRICK_REGION_HEIGHT_FRACTION: f32 = 0.5;
    /// Gap between the top edge and the first brick row
    pub const BRICK_REGION_TOP: f32 = 40.0;

    /// Seconds between clearing a level and serving the next one
    pub const BREATHER_SECS: f32 = 2.0;

    /// Render batch defaults
    pub const RENDER_LAYERS: u8 = 3;
    pub const MAX_GLYPHS: u32 = 4096;
    pub const CLIP_STACK_DEPTH: usize = 32;
}
