//! Batched glyph renderer
//!
//! CPU side: [`RenderBatch`] collects quads per layer under a clip stack,
//! [`sprites`] fills it from the game state. GPU side: [`GpuContext`] owns
//! the device and surface, [`BatchRenderer`] uploads a batch and draws it
//! with one indexed call.

pub mod batch;
pub mod gpu;
pub mod pipeline;
pub mod sprites;
pub mod texture;
pub mod vertex;

pub use batch::{ClipRect, QUAD_INDICES, RenderBatch, RenderGlyph, glyph_uv, glyph_uv_in};
pub use gpu::{GpuContext, RenderError};
pub use pipeline::{BUILTIN_SHADER, BatchRenderer, load_shader_source};
pub use sprites::fill_batch;
pub use texture::{AtlasTexture, SOLID_GLYPH, TexturePixels};
pub use vertex::{GlyphVertex, palette};
