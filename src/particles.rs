use std::time::Instant;

use glam::{UVec2, Vec2};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    camera::PerspectiveCamera,
    config::ParticleConfig,
    field::ParticleField,
    host::{EventHub, FrameRequest, HostEvent, ListenerId},
    input::normalize_cursor,
    render_loop::{FrameState, FrameTask, ParticleUniforms, RenderContext},
};

/// Something a particle field can be drawn into.
pub trait ParticleSurface {
    /// Uploads the per-particle buffers. Called once, at mount.
    fn upload(&mut self, field: &ParticleField) -> anyhow::Result<()>;

    /// Current drawable size in pixels.
    fn size(&self) -> UVec2;

    fn resize(&mut self, width: u32, height: u32);

    /// Draws every particle once with the given uniforms.
    fn draw(&mut self, uniforms: &ParticleUniforms) -> anyhow::Result<()>;

    /// Frees GPU resources. The system calls this at most once.
    fn release(&mut self);
}

/// A mounted particle field: owns its buffers, clock, camera and frame loop.
pub struct ParticleSystem<S: ParticleSurface> {
    config: ParticleConfig,
    field: ParticleField,
    context: RenderContext,
    camera: PerspectiveCamera,
    surface: S,
    frame_task: FrameTask,
    resize_listener: Option<ListenerId>,
    pointer_listener: Option<ListenerId>,
}

impl<S: ParticleSurface> ParticleSystem<S> {
    /// Builds the field, hooks up listeners and starts the frame loop.
    pub fn mount(
        config: ParticleConfig,
        mut surface: S,
        hub: &mut EventHub,
        now: Instant,
    ) -> anyhow::Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let field = ParticleField::generate(config.particle_count, &config.particle_colors, &mut rng);
        surface.upload(&field)?;

        let mut camera = PerspectiveCamera::new(config.camera_distance);
        let size = surface.size();
        camera.set_viewport(size.x, size.y);

        let resize_listener = Some(hub.add_listener(HostEvent::Resize));
        let pointer_listener = config
            .move_particles_on_hover
            .then(|| hub.add_listener(HostEvent::PointerMove));

        let frame_task = FrameTask::start(hub);

        log::info!(
            "Mounted particle field: {} particles, spread {}, speed {}",
            field.len(),
            config.particle_spread,
            config.speed
        );

        Ok(Self {
            config,
            field,
            context: RenderContext::new(now),
            camera,
            surface,
            frame_task,
            resize_listener,
            pointer_listener,
        })
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn is_mounted(&self) -> bool {
        self.frame_task.is_active()
    }

    /// Resizes the surface and refits the projection. Safe at any time; the
    /// new size is picked up by the next frame.
    pub fn handle_resize(&mut self, width: u32, height: u32) {
        if self.resize_listener.is_none() {
            return;
        }
        log::debug!("Resizing particle surface to {}x{}", width, height);
        self.surface.resize(width, height);
        self.camera.set_viewport(width, height);
    }

    /// Records a cursor position given in surface pixels.
    pub fn handle_pointer(&mut self, position: Vec2) {
        if self.pointer_listener.is_none() {
            return;
        }
        let pointer = normalize_cursor(position, self.surface.size());
        self.context.set_pointer(pointer);
    }

    /// Runs one tick if `request` belongs to this system. Returns the frame
    /// that was drawn, or `None` if the request was not ours.
    pub fn handle_frame(
        &mut self,
        request: FrameRequest,
        now: Instant,
        hub: &mut EventHub,
    ) -> anyhow::Result<Option<FrameState>> {
        if !self.frame_task.is_active() || !self.frame_task.owns(request) {
            return Ok(None);
        }
        self.frame_task.reschedule(hub);

        let frame = self.context.advance(now, &self.config);
        let size = self.surface.size();
        let uniforms = ParticleUniforms::new(&frame, &self.camera, &self.config, (size.x, size.y));

        log::trace!("Particle frame at t = {:.3}s", frame.time);
        self.surface.draw(&uniforms)?;

        Ok(Some(frame))
    }

    /// Detaches listeners, cancels the frame loop and releases the surface.
    /// Later calls do nothing and return false.
    pub fn unmount(&mut self, hub: &mut EventHub) -> bool {
        if !self.frame_task.is_active() {
            return false;
        }

        if let Some(id) = self.resize_listener.take() {
            hub.remove_listener(id);
        }
        if let Some(id) = self.pointer_listener.take() {
            hub.remove_listener(id);
        }
        self.frame_task.cancel(hub);
        self.surface.release();

        log::info!("Unmounted particle field");
        true
    }
}
