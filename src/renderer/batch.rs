//! CPU-side glyph batch
//!
//! Every pushed glyph becomes one quad (4 vertices, 6 indices) appended to a
//! shared vertex store and recorded in the current layer's quad list. At
//! render time the index ranges are packed layer by layer (layer 0 first) so
//! one indexed draw paints everything in layer order.

use glam::{Mat4, Vec4};

use super::vertex::{GlyphVertex, palette};
use crate::atlas::UvQuad;
use crate::consts::CLIP_STACK_DEPTH;

/// Index pattern of one quad, relative to its first vertex
pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Glyph cells per row/column of the glyph grid
const GRID_CELLS: u32 = 16;

/// A screen-space glyph quad
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderGlyph {
    /// Cell in the 16x16 glyph grid (0..=255)
    pub id: u32,
    pub x: i16,
    pub y: i16,
    pub w: u16,
    pub h: u16,
    /// Palette indices
    pub bg: u8,
    pub fg: u8,
}

impl RenderGlyph {
    pub const fn new(id: u32, x: i16, y: i16, w: u16, h: u16) -> Self {
        Self {
            id,
            x,
            y,
            w,
            h,
            bg: palette::BLACK,
            fg: palette::WHITE,
        }
    }

    pub const fn with_colors(mut self, fg: u8, bg: u8) -> Self {
        self.fg = fg;
        self.bg = bg;
        self
    }
}

/// Clipping rectangle in screen pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClipRect {
    pub x: i16,
    pub y: i16,
    pub w: u16,
    pub h: u16,
}

impl ClipRect {
    pub const fn new(x: i16, y: i16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// `[x0, y0, x1, y1]` in wide integers
    fn edges(&self) -> [i32; 4] {
        let x = self.x as i32;
        let y = self.y as i32;
        [x, y, x + self.w as i32, y + self.h as i32]
    }
}

#[derive(Debug, Clone, Copy)]
struct QuadRef {
    /// First of 6 entries in the index store
    first_index: u32,
}

/// UV rectangle of a cell in the 16x16 grid; ids past 255 get the zero quad
pub fn glyph_uv(id: u32) -> UvQuad {
    if id > 255 {
        return UvQuad::ZERO;
    }
    let d = 1.0 / GRID_CELLS as f32;
    UvQuad::new(
        d * (id % GRID_CELLS) as f32,
        d * (id / GRID_CELLS) as f32,
        d,
        d,
    )
}

/// UV rectangle of a cell in a 16x16 grid packed into `patch`
pub fn glyph_uv_in(patch: UvQuad, id: u32) -> UvQuad {
    let cell = glyph_uv(id);
    UvQuad::new(
        patch.u + cell.u * patch.du,
        patch.v + cell.v * patch.dv,
        cell.du * patch.du,
        cell.dv * patch.dv,
    )
}

/// Layered quad batch with a clip stack
pub struct RenderBatch {
    layers: Vec<Vec<QuadRef>>,
    vertices: Vec<GlyphVertex>,
    indices: Vec<u32>,
    max_glyphs: u32,
    clip_stack: [ClipRect; CLIP_STACK_DEPTH],
    clip_top: usize,
    /// Pushes ignored because the stack was full; popped before real entries
    clip_overflow: u32,
    layer: u8,
    width: u16,
    height: u16,
    /// Quads dropped this frame for lack of capacity
    dropped: u32,
}

impl RenderBatch {
    /// Allocate storage for `max_glyphs` quads spread over `layers` layers
    pub fn new(layers: u8, max_glyphs: u32) -> Self {
        let layers = layers.max(1);
        log::debug!("Render batch: {} layers, {} glyphs", layers, max_glyphs);
        Self {
            layers: (0..layers).map(|_| Vec::new()).collect(),
            vertices: Vec::with_capacity(max_glyphs as usize * 4),
            indices: Vec::with_capacity(max_glyphs as usize * 6),
            max_glyphs,
            clip_stack: [ClipRect::default(); CLIP_STACK_DEPTH],
            clip_top: 0,
            clip_overflow: 0,
            layer: 0,
            width: 0,
            height: 0,
            dropped: 0,
        }
    }

    /// Start a new frame for a `width` x `height` viewport
    pub fn clear(&mut self, width: u16, height: u16) {
        for layer in &mut self.layers {
            layer.clear();
        }
        self.vertices.clear();
        self.indices.clear();
        self.layer = 0;
        self.dropped = 0;
        self.width = width;
        self.height = height;
        self.clip_top = 0;
        self.clip_overflow = 0;
        self.clip_stack[0] = ClipRect::new(0, 0, width, height);
    }

    /// Route subsequent pushes to `layer`. Out-of-range layers are ignored.
    pub fn set_layer(&mut self, layer: u8) {
        if (layer as usize) < self.layers.len() {
            self.layer = layer;
        } else {
            log::warn!(
                "Layer {} out of range ({} layers), keeping {}",
                layer,
                self.layers.len(),
                self.layer
            );
        }
    }

    pub fn layer(&self) -> u8 {
        self.layer
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn viewport(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Push a clip rectangle as-is.
    ///
    /// A full stack ignores the push and returns false; the matching
    /// [`pop_clip`](Self::pop_clip) then undoes nothing, so pushes and pops
    /// stay balanced.
    pub fn push_clip(&mut self, clip: ClipRect) -> bool {
        if self.clip_top + 1 >= CLIP_STACK_DEPTH {
            if self.clip_overflow == 0 {
                log::warn!("Clip stack full ({} entries), push ignored", CLIP_STACK_DEPTH);
            }
            self.clip_overflow += 1;
            return false;
        }
        self.clip_top += 1;
        self.clip_stack[self.clip_top] = clip;
        true
    }

    /// Intersect `clip` with the current clip and push it. Disjoint
    /// rectangles collapse to zero width/height.
    ///
    /// Returns the clip now in effect: the refined rectangle, or the
    /// unchanged current clip when the stack is full.
    pub fn push_refine_clip(&mut self, clip: ClipRect) -> ClipRect {
        let [tx0, ty0, tx1, ty1] = self.current_clip().edges();
        let [cx0, cy0, cx1, cy1] = clip.edges();

        let x0 = cx0.max(tx0);
        let y0 = cy0.max(ty0);
        let x1 = cx1.min(tx1);
        let y1 = cy1.min(ty1);

        let refined = ClipRect {
            x: x0 as i16,
            y: y0 as i16,
            w: (x1 - x0).max(0) as u16,
            h: (y1 - y0).max(0) as u16,
        };
        self.push_clip(refined);
        self.current_clip()
    }

    /// Pop the top clip; the full-viewport base entry stays
    pub fn pop_clip(&mut self) {
        if self.clip_overflow > 0 {
            self.clip_overflow -= 1;
        } else if self.clip_top > 0 {
            self.clip_top -= 1;
        }
    }

    pub fn current_clip(&self) -> ClipRect {
        self.clip_stack[self.clip_top]
    }

    /// Glyph-grid quads colored through the palette. Not clipped.
    pub fn push_glyphs(&mut self, glyphs: &[RenderGlyph]) {
        for glyph in glyphs {
            let fg = palette::rgba(glyph.fg);
            let bg = palette::rgba(glyph.bg);
            self.push_quad(glyph, glyph_uv(glyph.id), fg, bg);
        }
    }

    /// Like [`push_glyphs`](Self::push_glyphs) with both alpha channels
    /// overridden
    pub fn push_alpha_glyphs(&mut self, glyphs: &[RenderGlyph], fg_alpha: u8, bg_alpha: u8) {
        for glyph in glyphs {
            let mut fg = palette::rgba(glyph.fg);
            let mut bg = palette::rgba(glyph.bg);
            fg[3] = fg_alpha;
            bg[3] = bg_alpha;
            self.push_quad(glyph, glyph_uv(glyph.id), fg, bg);
        }
    }

    /// Glyph-grid quads with explicit colors, clipped to the current clip
    pub fn push_rgba_glyphs(&mut self, glyphs: &[RenderGlyph], fg: [u8; 4], bg: [u8; 4]) {
        for glyph in glyphs {
            self.push_clipped(glyph, glyph_uv(glyph.id), fg, bg);
        }
    }

    /// Quads with explicit colors and one UV rectangle per glyph, clipped to
    /// the current clip. Extra glyphs or UVs beyond the shorter slice are
    /// ignored.
    pub fn push_rgba_glyphs_ex(
        &mut self,
        glyphs: &[RenderGlyph],
        uvs: &[UvQuad],
        fg: [u8; 4],
        bg: [u8; 4],
    ) {
        for (glyph, uv) in glyphs.iter().zip(uvs) {
            self.push_clipped(glyph, *uv, fg, bg);
        }
    }

    /// Lay out `text` left to right in `cell_w` x `cell_h` cells, one glyph
    /// per byte, sampling a 16x16 font grid packed into `font`.
    ///
    /// Returns the pixel width of the laid out text.
    #[allow(clippy::too_many_arguments)]
    pub fn push_text(
        &mut self,
        text: &str,
        x: i16,
        y: i16,
        cell_w: u16,
        cell_h: u16,
        font: UvQuad,
        fg: [u8; 4],
        bg: [u8; 4],
    ) -> i32 {
        let mut glyphs = Vec::with_capacity(text.len());
        let mut uvs = Vec::with_capacity(text.len());
        let mut pen = x as i32;
        for byte in text.bytes() {
            if byte != b' ' {
                glyphs.push(RenderGlyph::new(byte as u32, pen as i16, y, cell_w, cell_h));
                uvs.push(glyph_uv_in(font, byte as u32));
            }
            pen += cell_w as i32;
        }
        self.push_rgba_glyphs_ex(&glyphs, &uvs, fg, bg);
        pen - x as i32
    }

    fn push_clipped(&mut self, glyph: &RenderGlyph, uv: UvQuad, fg: [u8; 4], bg: [u8; 4]) {
        let [cx0, cy0, cx1, cy1] = self.current_clip().edges();
        let gx0 = glyph.x as i32;
        let gy0 = glyph.y as i32;
        let gx1 = gx0 + glyph.w as i32;
        let gy1 = gy0 + glyph.h as i32;

        let x0 = gx0.max(cx0);
        let y0 = gy0.max(cy0);
        let x1 = gx1.min(cx1);
        let y1 = gy1.min(cy1);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        // w, h > 0 here since the overlap is non-empty
        let w = glyph.w as f32;
        let h = glyph.h as f32;
        let u0 = uv.u + uv.du * ((x0 - gx0) as f32 / w);
        let u1 = uv.u + uv.du * ((x1 - gx0) as f32 / w);
        let v0 = uv.v + uv.dv * ((y0 - gy0) as f32 / h);
        let v1 = uv.v + uv.dv * ((y1 - gy0) as f32 / h);

        self.emit(
            [x0 as f32, y0 as f32, x1 as f32, y1 as f32],
            [u0, v0, u1, v1],
            fg,
            bg,
        );
    }

    fn push_quad(&mut self, glyph: &RenderGlyph, uv: UvQuad, fg: [u8; 4], bg: [u8; 4]) {
        let x0 = glyph.x as f32;
        let y0 = glyph.y as f32;
        self.emit(
            [x0, y0, x0 + glyph.w as f32, y0 + glyph.h as f32],
            [uv.u, uv.v, uv.u + uv.du, uv.v + uv.dv],
            fg,
            bg,
        );
    }

    /// Append one quad: corners `[x0, y0, x1, y1]`, texcoords `[u0, v0, u1, v1]`
    fn emit(&mut self, xy: [f32; 4], uv: [f32; 4], fg: [u8; 4], bg: [u8; 4]) {
        if self.quad_count() >= self.max_glyphs as usize {
            if self.dropped == 0 {
                log::warn!(
                    "Render batch full ({} glyphs), dropping quads this frame",
                    self.max_glyphs
                );
            }
            self.dropped += 1;
            return;
        }

        let [x0, y0, x1, y1] = xy;
        let [u0, v0, u1, v1] = uv;
        let base = self.vertices.len() as u32;
        let first_index = self.indices.len() as u32;

        self.vertices.extend_from_slice(&[
            GlyphVertex::new(x1, y1, u1, v1, bg, fg),
            GlyphVertex::new(x1, y0, u1, v0, bg, fg),
            GlyphVertex::new(x0, y0, u0, v0, bg, fg),
            GlyphVertex::new(x0, y1, u0, v1, bg, fg),
        ]);
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
        self.layers[self.layer as usize].push(QuadRef { first_index });
    }

    /// Quads pushed this frame across all layers
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Quads dropped this frame because the batch was full
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn max_glyphs(&self) -> u32 {
        self.max_glyphs
    }

    pub fn vertices(&self) -> &[GlyphVertex] {
        &self.vertices
    }

    /// Concatenate every layer's index ranges, layer 0 first, into `out`
    pub fn pack_indices(&self, out: &mut Vec<u32>) {
        out.clear();
        for layer in &self.layers {
            for quad in layer {
                let start = quad.first_index as usize;
                out.extend_from_slice(&self.indices[start..start + 6]);
            }
        }
    }

    pub fn packed_indices(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.indices.len());
        self.pack_indices(&mut out);
        out
    }

    /// Orthographic projection for the viewport: origin top-left, y down
    pub fn projection(&self) -> Mat4 {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        Mat4::from_cols(
            Vec4::new(2.0 / w, 0.0, 0.0, 0.0),
            Vec4::new(0.0, -2.0 / h, 0.0, 0.0),
            Vec4::new(0.0, 0.0, -1.0, 0.0),
            Vec4::new(-1.0, 1.0, 0.0, 1.0),
        )
    }
}
