use std::sync::Arc;

use glam::UVec2;
use thiserror::Error;
use winit::window::Window;

use crate::{
    color::Color,
    field::ParticleField,
    particles::ParticleSurface,
    render_loop::ParticleUniforms,
};

use self::particle_pass::ParticleRenderPass;

pub mod particle_pass;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("No compatible graphics adapter found")]
    NoAdapter,
    #[error("Failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("Surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("Graphics device ran out of memory")]
    OutOfMemory,
}

struct Gpu {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    particle_pass: ParticleRenderPass,
}

/// Window-backed wgpu renderer for a single particle field.
///
/// Dropping the GPU state happens exactly once, in [ParticleSurface::release];
/// afterwards every call is a no-op.
pub struct Renderer {
    // dropped before `window`
    gpu: Option<Gpu>,
    window: Arc<Window>,
    size: UVec2,
    clear_color: Color,
}

impl Renderer {
    pub fn new(window: Arc<Window>, clear_color: Color) -> Result<Self, RendererError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // SAFETY: the window is kept alive in `self.window` for as long as the
        // surface exists, and the surface is dropped first.
        let surface = unsafe { instance.create_surface(window.as_ref()) }?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(RendererError::NoAdapter)?;

        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Particle Device"),
                features: wgpu::Features::empty(),
                limits: wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
            },
            None,
        ))?;

        let surface_caps = surface.get_capabilities(&adapter);
        // palette colors are used as-is, so prefer a linear target
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(RendererError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let particle_pass = ParticleRenderPass::new(&device, format);

        Ok(Self {
            gpu: Some(Gpu {
                surface,
                device,
                queue,
                config,
                particle_pass,
            }),
            window,
            size: UVec2::new(size.width, size.height),
            clear_color,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn is_released(&self) -> bool {
        self.gpu.is_none()
    }

    fn reconfigure(&self) {
        if let Some(gpu) = &self.gpu {
            gpu.surface.configure(&gpu.device, &gpu.config);
        }
    }
}

impl ParticleSurface for Renderer {
    fn upload(&mut self, field: &ParticleField) -> anyhow::Result<()> {
        if let Some(gpu) = &mut self.gpu {
            gpu.particle_pass.upload(&gpu.device, field);
            log::debug!(
                "Uploaded {} particle instances",
                gpu.particle_pass.instance_count()
            );
        }
        Ok(())
    }

    fn size(&self) -> UVec2 {
        self.size
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = UVec2::new(width, height);

        let Some(gpu) = &mut self.gpu else {
            return;
        };
        // minimized windows report zero; keep the old configuration until
        // there is something to draw into again
        if width == 0 || height == 0 {
            return;
        }
        gpu.config.width = width;
        gpu.config.height = height;
        gpu.surface.configure(&gpu.device, &gpu.config);
    }

    fn draw(&mut self, uniforms: &ParticleUniforms) -> anyhow::Result<()> {
        if self.size.x == 0 || self.size.y == 0 {
            return Ok(());
        }
        let Some(gpu) = &self.gpu else {
            return Ok(());
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(RendererError::OutOfMemory.into());
            }
            Err(e) => {
                log::warn!("Skipping frame: {:?}", e);
                return Ok(());
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Particle Render Encoder"),
            });

        gpu.particle_pass.render(
            &gpu.queue,
            &mut encoder,
            &view,
            self.clear_color.to_wgpu(),
            uniforms,
        );

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn release(&mut self) {
        if let Some(mut gpu) = self.gpu.take() {
            gpu.particle_pass.release();
            log::debug!("Released particle surface");
        }
    }
}
