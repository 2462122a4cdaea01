//! Turns a [`GameState`] into batch glyphs
//!
//! Layer 0 holds the playfield walls, layer 1 the bricks, paddle and ball,
//! layer 2 the HUD and the optional frame-time overlay.

use super::batch::{ClipRect, RenderBatch, RenderGlyph};
use super::texture::SOLID_GLYPH;
use super::vertex::palette;
use crate::atlas::Atlas;
use crate::consts::BRICK_REGION_TOP;
use crate::platform::FrameStats;
use crate::sim::{Box2D, GamePhase, GameState};

pub const LAYER_BACKGROUND: u8 = 0;
pub const LAYER_SPRITES: u8 = 1;
pub const LAYER_HUD: u8 = 2;

/// HUD text cell size in pixels
const HUD_CELL: u16 = 16;
/// Frame-stats text cell size
const STATS_CELL: u16 = 8;
/// Frame-graph bar width
const BAR_WIDTH: u16 = 3;
/// Wall thickness
const WALL: u16 = 4;

const CLEAR: [u8; 4] = [0, 0, 0, 0];

/// Brick tint by kind; index 0 is the solid brick
const BRICK_COLORS: [u8; 6] = [
    palette::LIGHT_GRAY,
    palette::LIGHT_GREEN,
    palette::LIGHT_CYAN,
    palette::YELLOW,
    palette::LIGHT_RED,
    palette::LIGHT_MAGENTA,
];

pub fn brick_color(kind: u8) -> [u8; 4] {
    palette::rgba(BRICK_COLORS[(kind as usize).min(BRICK_COLORS.len() - 1)])
}

/// Clear `batch` for the viewport and fill it with the whole frame
pub fn fill_batch(
    batch: &mut RenderBatch,
    state: &GameState,
    atlas: &Atlas,
    stats: Option<&FrameStats>,
) {
    let width = state.width.clamp(0.0, u16::MAX as f32) as u16;
    let height = state.height.clamp(0.0, u16::MAX as f32) as u16;
    batch.clear(width, height);

    push_playfield(batch);
    push_sprites(batch, state, atlas);
    push_hud(batch, state, atlas);
    if let Some(stats) = stats {
        push_frame_stats(batch, stats, atlas);
    }
}

/// Side and top walls
pub fn push_playfield(batch: &mut RenderBatch) {
    let (w, h) = batch.viewport();
    let right = w.saturating_sub(WALL) as i16;
    let wall = |x: i16, y: i16, w: u16, h: u16| {
        RenderGlyph::new(SOLID_GLYPH, x, y, w, h).with_colors(palette::DARK_GRAY, palette::BLACK)
    };

    batch.set_layer(LAYER_BACKGROUND);
    batch.push_glyphs(&[wall(0, 0, w, WALL), wall(0, 0, WALL, h), wall(right, 0, WALL, h)]);
}

/// Bricks, paddle and ball
pub fn push_sprites(batch: &mut RenderBatch, state: &GameState, atlas: &Atlas) {
    batch.set_layer(LAYER_SPRITES);

    let brick_uv = atlas.lookup("brick");
    let solid_uv = atlas.lookup("brick_solid");
    for brick in &state.bricks {
        let uv = if brick.is_solid() { solid_uv } else { brick_uv };
        batch.push_rgba_glyphs_ex(&[sprite(&brick.bounds)], &[uv], brick_color(brick.kind), CLEAR);
    }

    batch.push_rgba_glyphs_ex(
        &[sprite(&state.paddle.bounds)],
        &[atlas.lookup("paddle")],
        palette::rgba(palette::LIGHT_CYAN),
        CLEAR,
    );
    batch.push_rgba_glyphs_ex(
        &[sprite(&state.ball.bounds())],
        &[atlas.lookup("ball")],
        palette::rgba(palette::WHITE),
        CLEAR,
    );
}

/// Lives and level in the top strip, plus the phase banner
pub fn push_hud(batch: &mut RenderBatch, state: &GameState, atlas: &Atlas) {
    let font = atlas.lookup("font");
    let (w, h) = batch.viewport();
    let white = palette::rgba(palette::WHITE);

    batch.set_layer(LAYER_HUD);
    batch.push_refine_clip(ClipRect::new(0, 0, w, BRICK_REGION_TOP as u16));
    let y = ((BRICK_REGION_TOP as u16).saturating_sub(HUD_CELL) / 2) as i16;
    let lives = format!("LIVES {}", state.lives.max(0));
    batch.push_text(&lives, 12, y, HUD_CELL, HUD_CELL, font, white, CLEAR);

    let level = format!("LEVEL {}", state.level_index + 1);
    let x = w as i32 - 12 - text_width(&level, HUD_CELL);
    batch.push_text(&level, x as i16, y, HUD_CELL, HUD_CELL, font, white, CLEAR);
    batch.pop_clip();

    let banner = match state.phase {
        GamePhase::Serve => Some(("PRESS SPACE", palette::YELLOW)),
        GamePhase::Paused => Some(("PAUSED", palette::LIGHT_CYAN)),
        GamePhase::Breather => Some(("LEVEL CLEAR", palette::LIGHT_GREEN)),
        GamePhase::GameOver => Some(("GAME OVER - PRESS R", palette::LIGHT_RED)),
        GamePhase::Playing => None,
    };
    if let Some((text, color)) = banner {
        let x = (w as i32 - text_width(text, HUD_CELL)) / 2;
        let y = (h as i32 * 3 / 5) as i16;
        batch.push_text(text, x as i16, y, HUD_CELL, HUD_CELL, font, palette::rgba(color), CLEAR);
    }
}

/// Frame-time bar graph along the bottom edge and the averaged text.
///
/// A bar reaches half the viewport height at 1/60 s.
pub fn push_frame_stats(batch: &mut RenderBatch, stats: &FrameStats, atlas: &Atlas) {
    let (_, h) = batch.viewport();
    let half = h as f32 * 0.5;

    batch.set_layer(LAYER_HUD);
    let bars: Vec<RenderGlyph> = stats
        .history()
        .enumerate()
        .map(|(i, frame_time)| {
            let bar_h = (half * frame_time * 60.0).round().clamp(0.0, h as f32) as u16;
            RenderGlyph::new(
                SOLID_GLYPH,
                (i as u16 * BAR_WIDTH) as i16,
                (h - bar_h) as i16,
                BAR_WIDTH.saturating_sub(1),
                bar_h,
            )
            .with_colors(palette::LIGHT_GREEN, palette::BLACK)
        })
        .collect();
    batch.push_alpha_glyphs(&bars, 160, 0);

    let text_y = BRICK_REGION_TOP as i16 + 4;
    batch.push_text(
        stats.text(),
        WALL as i16 + 4,
        text_y,
        STATS_CELL,
        STATS_CELL,
        atlas.lookup("font"),
        palette::rgba(palette::LIGHT_GREEN),
        CLEAR,
    );
}

/// Screen-space glyph covering `bounds`
fn sprite(bounds: &Box2D) -> RenderGlyph {
    let min = bounds.min().round();
    let size = bounds.size().round().max(glam::Vec2::ZERO);
    RenderGlyph::new(0, min.x as i16, min.y as i16, size.x as u16, size.y as u16)
}

fn text_width(text: &str, cell: u16) -> i32 {
    text.len() as i32 * cell as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::UvQuad;
    use crate::consts::{MAX_GLYPHS, RENDER_LAYERS};
    use crate::sim::Tuning;

    fn state() -> GameState {
        GameState::new(800.0, 600.0, 1, Tuning::default())
    }

    /// Texture rectangle of the quad whose top-left vertex sits at `(x, y)`
    fn quad_uv_at(batch: &RenderBatch, x: f32, y: f32) -> Option<UvQuad> {
        batch.vertices().chunks_exact(4).find_map(|quad| {
            let top_left = quad[2];
            let bottom_right = quad[0];
            (top_left.position == [x, y]).then(|| {
                UvQuad::new(
                    top_left.uv[0],
                    top_left.uv[1],
                    bottom_right.uv[0] - top_left.uv[0],
                    bottom_right.uv[1] - top_left.uv[1],
                )
            })
        })
    }

    fn text_quads(text: &str) -> usize {
        text.bytes().filter(|&b| b != b' ').count()
    }

    #[test]
    fn test_fill_counts_every_sprite() {
        let state = state();
        let atlas = Atlas::builtin();
        let mut batch = RenderBatch::new(RENDER_LAYERS, MAX_GLYPHS);
        fill_batch(&mut batch, &state, &atlas, None);

        let hud = text_quads("LIVES 3") + text_quads("LEVEL 1") + text_quads("PRESS SPACE");
        assert_eq!(batch.quad_count(), 3 + state.bricks.len() + 2 + hud);
        assert_eq!(batch.viewport(), (800, 600));
        assert_eq!(batch.dropped(), 0);
    }

    #[test]
    fn test_ball_uses_atlas_rect() {
        let state = state();
        let atlas = Atlas::builtin();
        let mut batch = RenderBatch::new(RENDER_LAYERS, MAX_GLYPHS);
        fill_batch(&mut batch, &state, &atlas, None);

        let min = state.ball.bounds().min().round();
        assert_eq!(quad_uv_at(&batch, min.x, min.y), Some(atlas.lookup("ball")));
    }

    #[test]
    fn test_solid_bricks_use_hatch_tile() {
        let state = state();
        let atlas = Atlas::builtin();
        let mut batch = RenderBatch::new(RENDER_LAYERS, MAX_GLYPHS);
        fill_batch(&mut batch, &state, &atlas, None);

        let solid = state.bricks.iter().find(|b| b.is_solid()).unwrap();
        let min = solid.bounds.min().round();
        assert_eq!(quad_uv_at(&batch, min.x, min.y), Some(atlas.lookup("brick_solid")));
    }

    #[test]
    fn test_playing_has_no_banner() {
        let mut state = state();
        let atlas = Atlas::builtin();
        let mut batch = RenderBatch::new(RENDER_LAYERS, MAX_GLYPHS);

        fill_batch(&mut batch, &state, &atlas, None);
        let serving = batch.quad_count();
        state.phase = GamePhase::Playing;
        fill_batch(&mut batch, &state, &atlas, None);
        assert_eq!(serving - batch.quad_count(), text_quads("PRESS SPACE"));
    }

    #[test]
    fn test_frame_stats_overlay() {
        let state = state();
        let atlas = Atlas::builtin();
        let mut stats = FrameStats::new();
        for _ in 0..30 {
            stats.record(1.0 / 60.0);
        }
        let mut batch = RenderBatch::new(RENDER_LAYERS, MAX_GLYPHS);
        fill_batch(&mut batch, &state, &atlas, None);
        let without = batch.quad_count();
        fill_batch(&mut batch, &state, &atlas, Some(&stats));

        assert_eq!(batch.quad_count(), without + 60 + text_quads(stats.text()));
        // A 1/60 s bar is half the viewport tall
        let tall = batch
            .vertices()
            .chunks_exact(4)
            .any(|q| q[0].position[1] - q[1].position[1] == 300.0 && q[0].color1[3] == 160);
        assert!(tall);
    }

    #[test]
    fn test_brick_color_saturates() {
        assert_eq!(brick_color(0), palette::rgba(palette::LIGHT_GRAY));
        assert_eq!(brick_color(200), brick_color(5));
    }
}
