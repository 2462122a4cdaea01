//! Atlas texture: decoded from an image file or generated at startup

use super::gpu::RenderError;

/// Side of the generated texture in pixels
pub const BUILTIN_SIZE: u32 = 256;
/// Cell in the full-texture 16x16 grid that is fully opaque
pub const SOLID_GLYPH: u32 = 8;

/// Pixels per font cell (font patch is 16x16 cells of 8x8)
const FONT_CELL: u32 = 8;
/// Sprite tiles are 32x32
const TILE: u32 = 32;

/// 3x5 bitmap font; each row is 3 bits, MSB on the left
#[rustfmt::skip]
const FONT_3X5: &[(u8, [u8; 5])] = &[
    (b'0', [0b111, 0b101, 0b101, 0b101, 0b111]),
    (b'1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    (b'2', [0b111, 0b001, 0b111, 0b100, 0b111]),
    (b'3', [0b111, 0b001, 0b111, 0b001, 0b111]),
    (b'4', [0b101, 0b101, 0b111, 0b001, 0b001]),
    (b'5', [0b111, 0b100, 0b111, 0b001, 0b111]),
    (b'6', [0b111, 0b100, 0b111, 0b101, 0b111]),
    (b'7', [0b111, 0b001, 0b001, 0b001, 0b001]),
    (b'8', [0b111, 0b101, 0b111, 0b101, 0b111]),
    (b'9', [0b111, 0b101, 0b111, 0b001, 0b111]),
    (b'A', [0b010, 0b101, 0b111, 0b101, 0b101]),
    (b'B', [0b110, 0b101, 0b110, 0b101, 0b110]),
    (b'C', [0b011, 0b100, 0b100, 0b100, 0b011]),
    (b'D', [0b110, 0b101, 0b101, 0b101, 0b110]),
    (b'E', [0b111, 0b100, 0b110, 0b100, 0b111]),
    (b'F', [0b111, 0b100, 0b110, 0b100, 0b100]),
    (b'G', [0b011, 0b100, 0b101, 0b101, 0b011]),
    (b'H', [0b101, 0b101, 0b111, 0b101, 0b101]),
    (b'I', [0b111, 0b010, 0b010, 0b010, 0b111]),
    (b'J', [0b001, 0b001, 0b001, 0b101, 0b010]),
    (b'K', [0b101, 0b101, 0b110, 0b101, 0b101]),
    (b'L', [0b100, 0b100, 0b100, 0b100, 0b111]),
    (b'M', [0b101, 0b111, 0b111, 0b101, 0b101]),
    (b'N', [0b110, 0b101, 0b101, 0b101, 0b101]),
    (b'O', [0b010, 0b101, 0b101, 0b101, 0b010]),
    (b'P', [0b110, 0b101, 0b110, 0b100, 0b100]),
    (b'Q', [0b010, 0b101, 0b101, 0b110, 0b011]),
    (b'R', [0b110, 0b101, 0b110, 0b101, 0b101]),
    (b'S', [0b011, 0b100, 0b010, 0b001, 0b110]),
    (b'T', [0b111, 0b010, 0b010, 0b010, 0b010]),
    (b'U', [0b101, 0b101, 0b101, 0b101, 0b111]),
    (b'V', [0b101, 0b101, 0b101, 0b101, 0b010]),
    (b'W', [0b101, 0b101, 0b111, 0b111, 0b101]),
    (b'X', [0b101, 0b101, 0b010, 0b101, 0b101]),
    (b'Y', [0b101, 0b101, 0b010, 0b010, 0b010]),
    (b'Z', [0b111, 0b001, 0b010, 0b100, 0b111]),
    (b':', [0b000, 0b010, 0b000, 0b010, 0b000]),
    (b'.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    (b',', [0b000, 0b000, 0b000, 0b010, 0b100]),
    (b'-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    (b'+', [0b000, 0b010, 0b111, 0b010, 0b000]),
    (b'=', [0b000, 0b111, 0b000, 0b111, 0b000]),
    (b'/', [0b001, 0b001, 0b010, 0b100, 0b100]),
    (b'!', [0b010, 0b010, 0b010, 0b000, 0b010]),
    (b'?', [0b110, 0b001, 0b010, 0b000, 0b010]),
    (b'%', [0b101, 0b001, 0b010, 0b100, 0b101]),
    (b'(', [0b001, 0b010, 0b010, 0b010, 0b001]),
    (b')', [0b100, 0b010, 0b010, 0b010, 0b100]),
];

/// RGBA8 pixels, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexturePixels {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl TexturePixels {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    /// Decode PNG bytes
    pub fn decode(bytes: &[u8]) -> Result<Self, RenderError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| RenderError::Texture(e.to_string()))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Ok(Self {
            width,
            height,
            data: image.into_raw(),
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    fn set(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            let i = ((y * self.width + x) * 4) as usize;
            self.data[i..i + 4].copy_from_slice(&rgba);
        }
    }

    /// Fill a tile with white at a per-pixel alpha
    fn paint(&mut self, x0: u32, y0: u32, size: u32, alpha: impl Fn(u32, u32) -> u8) {
        for y in 0..size {
            for x in 0..size {
                self.set(x0 + x, y0 + y, [255, 255, 255, alpha(x, y)]);
            }
        }
    }

    /// The generated 256x256 atlas matching `Atlas::builtin`
    pub fn builtin() -> Self {
        let mut tex = Self::new(BUILTIN_SIZE, BUILTIN_SIZE);

        // Font patch: top-left 128x128, 16x16 cells of 8x8
        for &(ch, rows) in FONT_3X5 {
            tex.paint_font_glyph(ch, &rows);
            if ch.is_ascii_uppercase() {
                tex.paint_font_glyph(ch.to_ascii_lowercase(), &rows);
            }
        }

        // white
        tex.paint(128, 0, TILE, |_, _| 255);

        // brick: opaque face, translucent 3px border
        tex.paint(160, 0, TILE, |x, y| {
            let edge = x.min(y).min(TILE - 1 - x).min(TILE - 1 - y);
            if edge < 3 { 96 } else { 255 }
        });

        // ball: disc
        tex.paint(192, 0, TILE, |x, y| {
            let c = (TILE as f32 - 1.0) * 0.5;
            let (dx, dy) = (x as f32 - c, y as f32 - c);
            let r = TILE as f32 * 0.5;
            if dx * dx + dy * dy <= r * r { 255 } else { 0 }
        });

        // paddle: 2px border, soft top highlight
        tex.paint(224, 0, TILE, |x, y| {
            let edge = x.min(y).min(TILE - 1 - x).min(TILE - 1 - y);
            if edge < 2 {
                64
            } else if y < 8 {
                200
            } else {
                255
            }
        });

        // brick_solid: diagonal hatch
        tex.paint(128, 32, TILE, |x, y| if (x + y) / 4 % 2 == 0 { 255 } else { 80 });

        tex
    }

    fn paint_font_glyph(&mut self, ch: u8, rows: &[u8; 5]) {
        let cx = (ch as u32 % 16) * FONT_CELL + 2;
        let cy = (ch as u32 / 16) * FONT_CELL + 1;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..3 {
                if bits & (0b100 >> col) != 0 {
                    self.set(cx + col, cy + row as u32, [255; 4]);
                }
            }
        }
    }
}

/// Atlas texture on the GPU plus its sampler
pub struct AtlasTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub size: (u32, u32),
}

impl AtlasTexture {
    pub fn from_pixels(device: &wgpu::Device, queue: &wgpu::Queue, pixels: &TexturePixels) -> Self {
        use wgpu::util::DeviceExt;

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("atlas_texture"),
                size: wgpu::Extent3d {
                    width: pixels.width,
                    height: pixels.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &pixels.data,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Nearest filtering keeps the pixel font crisp
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("atlas_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        log::info!("Atlas texture {}x{}", pixels.width, pixels.height);
        Self {
            texture,
            view,
            sampler,
            size: (pixels.width, pixels.height),
        }
    }
}
