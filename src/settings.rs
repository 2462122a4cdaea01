//! Game settings
//!
//! Read from a JSON file at startup. Missing fields take their defaults, so
//! a partial file only overrides what it names.

use std::io;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::file;
use crate::sim::Tuning;

/// Settings file used when none is given on the command line
pub const DEFAULT_SETTINGS_PATH: &str = "breakout.json";

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Window ===
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,

    // === Gameplay ===
    /// Paddle speed in pixels per second
    pub paddle_speed: f32,
    /// Ball speed in pixels per second
    pub ball_speed: f32,
    pub ball_radius: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub start_lives: i32,
    /// Seed for generated levels after the first
    pub seed: u64,

    // === Renderer ===
    pub render_layers: u8,
    /// Quad capacity per frame
    pub max_glyphs: u32,
    /// Atlas table blob; created with defaults if missing
    pub atlas_path: PathBuf,
    /// PNG atlas texture; the built-in texture is generated when unset
    pub texture_path: Option<PathBuf>,
    /// WGSL source; the built-in shader is used when unset
    pub shader_path: Option<PathBuf>,

    // === HUD ===
    /// Show the frame-time overlay
    pub show_stats: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            title: "Glyph Breakout".to_string(),
            vsync: true,

            paddle_speed: PADDLE_SPEED,
            ball_speed: BALL_SPEED,
            ball_radius: BALL_RADIUS,
            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            start_lives: START_LIVES,
            seed: 0x5EED,

            render_layers: RENDER_LAYERS,
            max_glyphs: MAX_GLYPHS,
            atlas_path: PathBuf::from("breakout.atlas"),
            texture_path: None,
            shader_path: None,

            show_stats: false,
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing or malformed file yields the
    /// defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !file::exists(path) {
            log::info!("No settings at {}, using defaults", path.display());
            return Self::default();
        }

        let parsed = file::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| serde_json::from_str::<Self>(&json).map_err(|e| e.to_string()));
        match parsed {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write settings to `path` as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        file::write(path.as_ref(), json.as_bytes())?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Physics parameters for the simulation
    pub fn tuning(&self) -> Tuning {
        Tuning {
            paddle_speed: self.paddle_speed.max(0.0),
            ball_speed: self.ball_speed.max(0.0),
            ball_radius: self.ball_radius.max(1.0),
            paddle_size: Vec2::new(self.paddle_width.max(1.0), self.paddle_height.max(1.0)),
            start_lives: self.start_lives.max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        assert_eq!(Settings::load(dir.path().join("missing.json")), Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        file::write(&path, br#"{ "ball_speed": 300.0, "show_stats": true }"#).unwrap();

        let settings = Settings::load(&path);
        assert_eq!(settings.ball_speed, 300.0);
        assert!(settings.show_stats);
        assert_eq!(settings.width, DEFAULT_WIDTH);
        assert_eq!(settings.atlas_path, PathBuf::from("breakout.atlas"));
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        file::write(&path, b"{ not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.json");
        let mut settings = Settings::default();
        settings.texture_path = Some(PathBuf::from("atlas.png"));
        settings.start_lives = 5;
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path), settings);
    }

    #[test]
    fn test_tuning_sanitizes_values() {
        let settings = Settings {
            paddle_speed: -10.0,
            ball_radius: 0.0,
            start_lives: -2,
            ..Settings::default()
        };
        let tuning = settings.tuning();
        assert_eq!(tuning.paddle_speed, 0.0);
        assert_eq!(tuning.ball_radius, 1.0);
        assert_eq!(tuning.start_lives, 0);
        assert_eq!(tuning.paddle_size, Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT));
    }
}
