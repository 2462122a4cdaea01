//! Glyph Breakout - native entry point
//!
//! Drives the winit event loop: keyboard events feed the input state, each
//! redraw advances the simulation in fixed steps, refills the glyph batch
//! and draws it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use glyph_breakout::platform::{FixedStep, FrameClock, FrameStats, InputState};
use glyph_breakout::renderer::{
    AtlasTexture, BatchRenderer, GpuContext, RenderBatch, TexturePixels, fill_batch,
    load_shader_source,
};
use glyph_breakout::settings::DEFAULT_SETTINGS_PATH;
use glyph_breakout::sim::{GameState, tick};
use glyph_breakout::{Atlas, Settings};

/// GPU objects, created once the window exists
struct Graphics {
    gpu: GpuContext,
    renderer: BatchRenderer,
}

struct App {
    settings: Settings,
    window: Option<Arc<Window>>,
    graphics: Option<Graphics>,
    texture: TexturePixels,
    atlas: Atlas,
    batch: RenderBatch,
    state: GameState,
    input: InputState,
    clock: FrameClock,
    fixed: FixedStep,
    stats: FrameStats,
    /// Fatal error raised inside the event loop, returned from main
    error: Option<anyhow::Error>,
}

impl App {
    fn new(settings: Settings) -> Self {
        let state = GameState::new(
            settings.width as f32,
            settings.height as f32,
            settings.seed,
            settings.tuning(),
        );
        Self {
            texture: load_texture(&settings),
            atlas: Atlas::load_or_create(&settings.atlas_path),
            batch: RenderBatch::new(settings.render_layers, settings.max_glyphs),
            input: InputState::new(settings.show_stats),
            window: None,
            graphics: None,
            state,
            clock: FrameClock::new(),
            fixed: FixedStep::default(),
            stats: FrameStats::new(),
            error: None,
            settings,
        }
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attrs = Window::default_attributes()
            .with_title(&self.settings.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.settings.width,
                self.settings.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = GpuContext::new(window.clone(), self.settings.vsync)?;
        let atlas_texture = AtlasTexture::from_pixels(&gpu.device, &gpu.queue, &self.texture);
        let shader = load_shader_source(self.settings.shader_path.as_deref());
        let renderer = BatchRenderer::new(&gpu, &atlas_texture, &shader, self.batch.max_glyphs());

        let (w, h) = gpu.size();
        self.state.resize(w as f32, h as f32);
        self.clock = FrameClock::new();

        self.graphics = Some(Graphics { gpu, renderer });
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    /// Advance the simulation by the time since the last frame
    fn update(&mut self) {
        let dt = self.clock.tick();
        self.stats.record(dt);

        for _ in 0..self.fixed.advance(dt) {
            let input = self.input.tick_input();
            tick(&mut self.state, &input, self.fixed.step());
            // Clear one-shot inputs after processing
            self.input.consume_one_shots();
        }
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let stats = self.input.show_stats().then_some(&self.stats);
        fill_batch(&mut self.batch, &self.state, &self.atlas, stats);

        let Some(graphics) = self.graphics.as_mut() else {
            return;
        };
        match graphics.renderer.render(&graphics.gpu, &self.batch) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                graphics.gpu.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory!");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_graphics(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(graphics) = self.graphics.as_mut() {
                    graphics.gpu.resize(size.width, size.height);
                }
                if size.width > 0 && size.height > 0 {
                    self.state.resize(size.width as f32, size.height as f32);
                }
            }

            WindowEvent::Focused(false) => self.input.release_all(),

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    let pressed = event.state == ElementState::Pressed;
                    self.input.handle_key(key, pressed, event.repeat);
                }
                if self.input.quit_requested() {
                    log::info!("Quit requested, exiting.");
                    event_loop.exit();
                }
            }

            WindowEvent::RedrawRequested => {
                self.update();
                self.render(event_loop);

                // Request next frame
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

/// Atlas texture pixels: the configured PNG, or the generated texture
fn load_texture(settings: &Settings) -> TexturePixels {
    let Some(path) = settings.texture_path.as_deref() else {
        return TexturePixels::builtin();
    };
    let decoded = glyph_breakout::persistence::read(path)
        .map_err(|e| e.to_string())
        .and_then(|bytes| TexturePixels::decode(&bytes).map_err(|e| e.to_string()));
    match decoded {
        Ok(pixels) => {
            log::info!(
                "Loaded texture {} ({}x{})",
                path.display(),
                pixels.width,
                pixels.height
            );
            pixels
        }
        Err(e) => {
            log::warn!("Could not load texture {}: {}, using built-in", path.display(), e);
            TexturePixels::builtin()
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Glyph Breakout starting...");

    let settings_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
    let settings = Settings::load(&settings_path);
    log::info!("Game initialized with seed: {}", settings.seed);

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(settings);
    event_loop.run_app(&mut app).context("event loop failed")?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
