//! GPU state management
//!
//! Device and queue shared by the window, plus the per-window surface. The
//! scene is rasterized by vello into an offscreen texture and copied onto
//! the surface with a blit pass.

use std::sync::Arc;

use anyhow::{Context, Result};
use neon_effects::{SceneComposer, SceneRenderer};
use winit::window::Window;

/// Shared GPU resources
pub struct GpuState {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuState {
    pub fn new() -> Result<Self> {
        log::debug!("Initializing GPU state");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        // Surfaces are created per window, so no compatible surface here
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .context("Failed to find suitable GPU adapter")?;

        log::debug!(
            "GPU adapter: {:?} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default()))
                .context("Failed to create device")?;

        log::debug!("GPU device created successfully");

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }
}

/// Per-window GPU state
pub struct WindowGpuState {
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,

    /// Vello rasterizer for the animated scene
    pub scene_renderer: SceneRenderer,

    /// Copies the scene texture onto the surface
    blitter: wgpu::util::TextureBlitter,
}

impl WindowGpuState {
    pub fn new(gpu: &GpuState, window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let surface = gpu
            .instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let caps = surface.get_capabilities(&gpu.adapter);
        // vello writes sRGB-encoded values, so keep them as-is on the way out
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("Surface reports no supported formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &config);
        log::info!(
            "Surface configured: {}x{} {:?}",
            config.width,
            config.height,
            config.format
        );

        let blitter = wgpu::util::TextureBlitter::new(&gpu.device, format);

        Ok(Self {
            surface,
            config,
            scene_renderer: SceneRenderer::new(),
            blitter,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(device, &self.config);
    }

    /// Render the composer's scene and present it
    pub fn render(&mut self, gpu: &GpuState, composer: &SceneComposer) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&gpu.device, &self.config);
                return;
            }
            Err(e) => {
                log::warn!("Failed to acquire surface texture: {:?}", e);
                return;
            }
        };
        let frame_view = frame.texture.create_view(&Default::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let size = (self.config.width, self.config.height);
        match self
            .scene_renderer
            .render(&gpu.device, &gpu.queue, composer, size)
        {
            Some(scene_view) => {
                self.blitter
                    .copy(&gpu.device, &mut encoder, scene_view, &frame_view);
            }
            None => {
                // Hidden scene: clear to the theme background
                let [r, g, b] = composer.theme().colors.background.to_rgb_f32();
                let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Clear Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &frame_view,
                        depth_slice: None,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: r as f64,
                                g: g as f64,
                                b: b as f64,
                                a: 1.0,
                            }),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}
