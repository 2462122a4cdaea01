//! Vertex type for batched glyph quads

use bytemuck::{Pod, Zeroable};

/// One corner of a glyph quad.
///
/// `color0` is the background, `color1` the foreground; the shader blends
/// between them by the texel's alpha.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GlyphVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color0: [u8; 4],
    pub color1: [u8; 4],
}

impl GlyphVertex {
    pub const fn new(x: f32, y: f32, u: f32, v: f32, bg: [u8; 4], fg: [u8; 4]) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
            color0: bg,
            color1: fg,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            0 => Float32x2,
            1 => Float32x2,
            2 => Unorm8x4,
            3 => Unorm8x4,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlyphVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// 16-color palette used to resolve glyph color indices
pub mod palette {
    pub const BLACK: u8 = 0;
    pub const BLUE: u8 = 1;
    pub const GREEN: u8 = 2;
    pub const CYAN: u8 = 3;
    pub const RED: u8 = 4;
    pub const MAGENTA: u8 = 5;
    pub const BROWN: u8 = 6;
    pub const LIGHT_GRAY: u8 = 7;
    pub const DARK_GRAY: u8 = 8;
    pub const LIGHT_BLUE: u8 = 9;
    pub const LIGHT_GREEN: u8 = 10;
    pub const LIGHT_CYAN: u8 = 11;
    pub const LIGHT_RED: u8 = 12;
    pub const LIGHT_MAGENTA: u8 = 13;
    pub const YELLOW: u8 = 14;
    pub const WHITE: u8 = 15;

    const COLORS: [[u8; 4]; 16] = [
        [0x00, 0x00, 0x00, 0xFF],
        [0x00, 0x00, 0xAA, 0xFF],
        [0x00, 0xAA, 0x00, 0xFF],
        [0x00, 0xAA, 0xAA, 0xFF],
        [0xAA, 0x00, 0x00, 0xFF],
        [0xAA, 0x00, 0xAA, 0xFF],
        [0xAA, 0x55, 0x00, 0xFF],
        [0xAA, 0xAA, 0xAA, 0xFF],
        [0x55, 0x55, 0x55, 0xFF],
        [0x55, 0x55, 0xFF, 0xFF],
        [0x55, 0xFF, 0x55, 0xFF],
        [0x55, 0xFF, 0xFF, 0xFF],
        [0xFF, 0x55, 0x55, 0xFF],
        [0xFF, 0x55, 0xFF, 0xFF],
        [0xFF, 0xFF, 0x55, 0xFF],
        [0xFF, 0xFF, 0xFF, 0xFF],
    ];

    /// Opaque RGBA for a color index (low nibble only)
    #[inline]
    pub fn rgba(index: u8) -> [u8; 4] {
        COLORS[(index & 0x0F) as usize]
    }
}
