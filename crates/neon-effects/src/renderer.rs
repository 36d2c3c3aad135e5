//! Scene renderer - rasterizes the composed scene into a texture
//!
//! The host blits the returned texture onto its surface. The vello renderer
//! is created on first use and the target texture is recreated whenever
//! the requested size changes.

use vello::kurbo::Rect;
use vello::{AaConfig, RenderParams, Renderer, RendererOptions, Scene, peniko};

use crate::composer::SceneComposer;

/// Format of the offscreen target; vello writes it from a compute shader
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub struct SceneRenderer {
    /// Created lazily on the first frame
    renderer: Option<Renderer>,

    /// Vello scene rebuilt each frame
    scene: Scene,

    target_texture: Option<wgpu::Texture>,
    target_view: Option<wgpu::TextureView>,
    target_size: (u32, u32),
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self {
            renderer: None,
            scene: Scene::new(),
            target_texture: None,
            target_view: None,
            target_size: (0, 0),
        }
    }

    fn ensure_renderer(&mut self, device: &wgpu::Device) -> Option<&mut Renderer> {
        if self.renderer.is_none() {
            log::info!("Creating vello renderer");
            match Renderer::new(
                device,
                RendererOptions {
                    pipeline_cache: None,
                    ..Default::default()
                },
            ) {
                Ok(renderer) => self.renderer = Some(renderer),
                Err(e) => {
                    log::error!("Failed to create vello renderer: {:?}", e);
                    return None;
                }
            }
        }
        self.renderer.as_mut()
    }

    /// Ensure render target is sized correctly
    fn ensure_target(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.target_size == (width, height) && self.target_texture.is_some() {
            return;
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Render Target"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::STORAGE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());
        log::debug!("Scene target resized to {}x{}", width, height);

        self.target_texture = Some(texture);
        self.target_view = Some(view);
        self.target_size = (width, height);
    }

    /// Render the composer's scene to the offscreen target
    ///
    /// Returns `None` for a zero-sized or hidden scene, or if vello fails.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        composer: &SceneComposer,
        size: (u32, u32),
    ) -> Option<&wgpu::TextureView> {
        let (width, height) = size;
        if width == 0 || height == 0 || !composer.is_visible() {
            return None;
        }

        self.ensure_target(device, width, height);

        self.scene.reset();
        composer.build_scene(
            &mut self.scene,
            Rect::new(0.0, 0.0, width as f64, height as f64),
        );

        let params = RenderParams {
            base_color: peniko::Color::TRANSPARENT,
            width,
            height,
            antialiasing_method: AaConfig::Area,
        };

        self.ensure_renderer(device)?;
        let (Some(renderer), Some(target_view)) =
            (self.renderer.as_mut(), self.target_view.as_ref())
        else {
            return None;
        };

        if let Err(e) = renderer.render_to_texture(device, queue, &self.scene, target_view, &params)
        {
            log::error!("Failed to render scene: {:?}", e);
            return None;
        }

        self.target_view.as_ref()
    }

    pub fn target_size(&self) -> (u32, u32) {
        self.target_size
    }
}
