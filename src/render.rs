//! WebGPU renderer behind the scene's `SceneRenderer` seam.

mod helpers;
mod particles;
mod sphere;

use crate::constants::{CLEAR_RGBA, PLACEHOLDER_RGBA};
use particles::ParticlePass;
use sphere::SpherePass;
use sphere_core::uniforms::FrameState;
use sphere_core::{Result, SceneError, SceneRenderer};
use std::rc::Rc;
use web_sys as web;

// HTMLMediaElement.HAVE_CURRENT_DATA
const VIDEO_HAVE_CURRENT_DATA: u16 = 2;

/// Decoded texture content as the loader delivers it.
pub enum TextureSource {
    Pixels {
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    },
    /// A playing video; its current frame is copied in every frame it is bound.
    Video(web::HtmlVideoElement),
}

pub struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: wgpu::Extent3d,
    video: Option<web::HtmlVideoElement>,
}

pub type TextureHandle = Rc<GpuTexture>;

pub struct GpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    sphere: SpherePass,
    particles: ParticlePass,
    placeholder: TextureHandle,
    bound: Option<(TextureHandle, TextureHandle)>,
    texture_bg: wgpu::BindGroup,
    max_edge: u32,
}

impl GpuRenderer {
    pub async fn new(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        // The page shows through wherever the sphere is not drawn.
        let alpha_mode = caps
            .alpha_modes
            .iter()
            .copied()
            .find(|m| *m == wgpu::CompositeAlphaMode::PreMultiplied)
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let (_, depth_view) = helpers::create_depth_texture(&device, width, height);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("photo_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let sphere = SpherePass::new(&device, format);
        let particles = ParticlePass::new(&device, format);

        let (texture, view) = helpers::create_photo_texture(&device, "placeholder", 1, 1);
        helpers::write_rgba(&queue, &texture, 1, 1, &PLACEHOLDER_RGBA);
        let placeholder = Rc::new(GpuTexture {
            texture,
            view,
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            video: None,
        });
        let texture_bg =
            sphere.texture_bind_group(&device, &placeholder.view, &placeholder.view, &sampler);
        let max_edge = device.limits().max_texture_dimension_2d;

        log::info!("[render] WebGPU ready ({:?}, {}x{})", format, width, height);
        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            sampler,
            sphere,
            particles,
            placeholder,
            bound: None,
            texture_bg,
            max_edge,
        })
    }

    fn refresh_video(&self, tex: &GpuTexture) {
        let Some(video) = &tex.video else {
            return;
        };
        if video.ready_state() < VIDEO_HAVE_CURRENT_DATA {
            return;
        }
        if video.video_width() != tex.size.width || video.video_height() != tex.size.height {
            return;
        }
        self.queue.copy_external_image_to_texture(
            &wgpu::CopyExternalImageSourceInfo {
                source: wgpu::ExternalImageSource::HTMLVideoElement(video.clone()),
                origin: wgpu::Origin2d::ZERO,
                flip_y: false,
            },
            wgpu::CopyExternalImageDestInfo {
                texture: &tex.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
                color_space: wgpu::PredefinedColorSpace::Srgb,
                premultiplied_alpha: false,
            },
            tex.size,
        );
    }
}

impl SceneRenderer for GpuRenderer {
    type Texture = TextureHandle;
    type Image = TextureSource;

    fn placeholder(&self) -> TextureHandle {
        self.placeholder.clone()
    }

    fn upload(&mut self, image: &TextureSource) -> Result<TextureHandle> {
        let (width, height, video) = match image {
            TextureSource::Pixels { width, height, .. } => (*width, *height, None),
            TextureSource::Video(v) => (v.video_width(), v.video_height(), Some(v.clone())),
        };
        if width == 0 || height == 0 {
            return Err(SceneError::Render("empty image".into()));
        }
        if width > self.max_edge || height > self.max_edge {
            return Err(SceneError::Render(format!(
                "{}x{} exceeds the {} px texture limit",
                width, height, self.max_edge
            )));
        }
        let (texture, view) = helpers::create_photo_texture(&self.device, "photo", width, height);
        if let TextureSource::Pixels { rgba, .. } = image {
            if rgba.len() != (width * height * 4) as usize {
                return Err(SceneError::Render("pixel buffer size mismatch".into()));
            }
            helpers::write_rgba(&self.queue, &texture, width, height, rgba);
        }
        Ok(Rc::new(GpuTexture {
            texture,
            view,
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            video,
        }))
    }

    fn bind_morph_textures(&mut self, first: &TextureHandle, second: &TextureHandle) {
        self.texture_bg =
            self.sphere
                .texture_bind_group(&self.device, &first.view, &second.view, &self.sampler);
        self.bound = Some((first.clone(), second.clone()));
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if width == self.config.width && height == self.config.height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        let (_, depth_view) = helpers::create_depth_texture(&self.device, width, height);
        self.depth_view = depth_view;
    }

    fn render(&mut self, frame: &FrameState<'_>) -> Result<()> {
        if let Some((a, b)) = &self.bound {
            self.refresh_video(a);
            if !Rc::ptr_eq(a, b) {
                self.refresh_video(b);
            }
        }
        self.sphere.write_uniforms(&self.queue, &frame.sphere);
        self.particles
            .upload(&self.device, &self.queue, &frame.particles, frame.instances);

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Err(SceneError::Render("surface reconfigured".into()));
            }
            Err(e) => return Err(SceneError::Render(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let [r, g, b, a] = CLEAR_RGBA;
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.sphere.draw(&mut rpass, &self.texture_bg);
            self.particles.draw(&mut rpass);
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}
