//! The main rendering engine.

mod pipelines;
mod readback;
mod rendering;

use std::sync::Arc;

use crate::color_maps::ColorMapRegistry;
use crate::error::{RenderError, RenderResult};
use crate::labels::LabelRenderer;

pub use pipelines::ScenePipelines;

/// Color format of offscreen targets.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
/// Depth buffer format.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// GPU resources owned by one viewport.
struct ViewportResources {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Point instances, split to respect the device's buffer size limit.
    points: Vec<(wgpu::Buffer, u32)>,
    triangles: Option<(wgpu::Buffer, u32)>,
    lines: Option<(wgpu::Buffer, u32)>,
}

/// The main rendering engine backed by wgpu.
///
/// An engine draws one [`cloudview_core::Scene`] at a time, either to a
/// window surface or to an offscreen texture that can be read back.
pub struct RenderEngine {
    /// The wgpu instance.
    pub instance: wgpu::Instance,
    /// The wgpu adapter.
    pub adapter: wgpu::Adapter,
    /// The wgpu device.
    pub device: wgpu::Device,
    /// The wgpu queue.
    pub queue: wgpu::Queue,
    /// The window surface, if rendering to a window.
    pub surface: Option<wgpu::Surface<'static>>,
    /// Surface configuration. Headless engines keep one for the target format.
    pub surface_config: wgpu::SurfaceConfiguration,
    width: u32,
    height: u32,
    depth_view: wgpu::TextureView,
    offscreen: Option<(wgpu::Texture, wgpu::TextureView)>,
    pipelines: ScenePipelines,
    labels: LabelRenderer,
    color_maps: ColorMapRegistry,
    viewports: Vec<ViewportResources>,
    geometry_revision: Option<u64>,
}

impl RenderEngine {
    /// Creates a new windowed render engine.
    pub async fn new_windowed(window: Arc<winit::window::Window>) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = Self::request_device(&adapter, "cloudview device").await?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::SurfaceConfigurationFailed)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        log::info!(
            "windowed engine on '{}' ({:?}), {width}x{height}",
            adapter.get_info().name,
            surface_format
        );

        let depth_view = Self::create_depth_texture(&device, width, height);
        let pipelines = ScenePipelines::new(&device, surface_format);
        let labels = LabelRenderer::new(&device, &queue, surface_format);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface: Some(surface),
            surface_config,
            width,
            height,
            depth_view,
            offscreen: None,
            pipelines,
            labels,
            color_maps: ColorMapRegistry::new(),
            viewports: Vec::new(),
            geometry_revision: None,
        })
    }

    /// Creates a headless render engine with an offscreen target.
    ///
    /// Falls back to a software adapter when no hardware adapter is available.
    pub async fn new_headless(width: u32, height: u32) -> RenderResult<Self> {
        let width = width.max(1);
        let height = height.max(1);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(_) => {
                log::debug!("no hardware adapter, trying fallback adapter");
                instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::LowPower,
                        compatible_surface: None,
                        force_fallback_adapter: true,
                    })
                    .await
                    .map_err(|_| RenderError::AdapterCreationFailed)?
            }
        };

        let (device, queue) = Self::request_device(&adapter, "cloudview device (headless)").await?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: OFFSCREEN_FORMAT,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        log::info!(
            "headless engine on '{}', {width}x{height}",
            adapter.get_info().name
        );

        let depth_view = Self::create_depth_texture(&device, width, height);
        let offscreen = Self::create_offscreen_texture(&device, width, height, OFFSCREEN_FORMAT);
        let pipelines = ScenePipelines::new(&device, OFFSCREEN_FORMAT);
        let labels = LabelRenderer::new(&device, &queue, OFFSCREEN_FORMAT);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface: None,
            surface_config,
            width,
            height,
            depth_view,
            offscreen: Some(offscreen),
            pipelines,
            labels,
            color_maps: ColorMapRegistry::new(),
            viewports: Vec::new(),
            geometry_revision: None,
        })
    }

    async fn request_device(
        adapter: &wgpu::Adapter,
        label: &str,
    ) -> RenderResult<(wgpu::Device, wgpu::Queue)> {
        let device_and_queue = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some(label),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;
        Ok(device_and_queue)
    }

    /// Resizes the render target.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.width = width;
        self.height = height;
        self.surface_config.width = width;
        self.surface_config.height = height;

        if let Some(ref surface) = self.surface {
            surface.configure(&self.device, &self.surface_config);
        }

        self.depth_view = Self::create_depth_texture(&self.device, width, height);
        if self.offscreen.is_some() {
            self.offscreen = Some(Self::create_offscreen_texture(
                &self.device,
                width,
                height,
                self.surface_config.format,
            ));
        }
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_offscreen_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen color texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Returns the render target dimensions.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The color maps used for depth coloring.
    pub fn color_maps_mut(&mut self) -> &mut ColorMapRegistry {
        // Registered maps only take effect on the next upload.
        self.geometry_revision = None;
        &mut self.color_maps
    }
}
