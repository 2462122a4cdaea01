//! GPU context: wgpu instance, adapter, device, queue and surface

use std::fmt;
use std::sync::Arc;

use winit::window::Window;

/// Errors bringing up or feeding the GPU
#[derive(Debug)]
pub enum RenderError {
    /// Surface creation failed
    Surface(wgpu::CreateSurfaceError),
    /// No adapter compatible with the surface
    Adapter(wgpu::RequestAdapterError),
    /// Device request failed
    Device(wgpu::RequestDeviceError),
    /// Texture bytes could not be decoded
    Texture(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Surface(e) => write!(f, "failed to create surface: {e}"),
            RenderError::Adapter(e) => write!(f, "no suitable GPU adapter: {e}"),
            RenderError::Device(e) => write!(f, "failed to create device: {e}"),
            RenderError::Texture(e) => write!(f, "failed to decode texture: {e}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Device, queue and the window surface
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Create the GPU objects for `window`, blocking until the device is ready
    pub fn new(window: Arc<Window>, vsync: bool) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .map_err(RenderError::Surface)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(RenderError::Adapter)?;
        let info = adapter.get_info();
        log::info!("Adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("glyph-breakout-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                .using_resolution(adapter.limits()),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))
        .map_err(RenderError::Device)?;

        let caps = surface.get_capabilities(&adapter);
        log::debug!("Surface formats: {:?}", caps.formats);

        // Palette bytes are display values, so skip the sRGB encode on write
        let format = caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(caps.formats[0]);
        log::info!("Using surface format: {:?}", format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            device,
            queue,
            surface,
            config,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Re-apply the current configuration (after a lost/outdated surface)
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}
