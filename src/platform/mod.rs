//! Platform layer: keyboard intents and frame timing

pub mod input;
pub mod time;

pub use input::{InputState, Intent};
pub use time::{FixedStep, FrameClock, FrameStats};
