use std::time::Instant;

use glam::{Mat4, Vec2, Vec4};

use crate::{
    camera::PerspectiveCamera,
    config::ParticleConfig,
    host::{EventHub, FrameRequest},
};

/// Radians added to the field's spin each frame, before scaling by speed.
pub const ROTATION_STEP: f32 = 0.002;

/// Per-instance state carried from one frame to the next.
#[derive(Debug, Clone)]
pub struct RenderContext {
    last_frame: Instant,
    /// Accumulated, speed-scaled milliseconds.
    elapsed: f64,
    pointer: Vec2,
    rotation_y: f32,
}

/// What a single tick produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Shader time, in seconds.
    pub time: f32,
    pub offset: Vec2,
    pub rotation_y: f32,
}

impl FrameState {
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.offset.extend(0.0)) * Mat4::from_rotation_y(self.rotation_y)
    }
}

impl RenderContext {
    pub fn new(start: Instant) -> Self {
        Self {
            last_frame: start,
            elapsed: 0.0,
            pointer: Vec2::ZERO,
            rotation_y: 0.0,
        }
    }

    /// Latest normalized cursor position.
    pub fn set_pointer(&mut self, pointer: Vec2) {
        self.pointer = pointer;
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Steps the clock to `now` and derives this frame's uniforms.
    pub fn advance(&mut self, now: Instant, config: &ParticleConfig) -> FrameState {
        let delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.elapsed += delta.as_secs_f64() * 1000.0 * config.speed as f64;

        let offset = if config.move_particles_on_hover {
            -self.pointer * config.particle_hover_factor * 0.5
        } else {
            Vec2::ZERO
        };

        if !config.disable_rotation {
            self.rotation_y += ROTATION_STEP * config.speed;
        }

        FrameState {
            time: (self.elapsed * 0.001) as f32,
            offset,
            rotation_y: self.rotation_y,
        }
    }
}

/// Uniform block shared by both shader stages. Layout must match `Uniforms`
/// in `particles.wgsl`.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct ParticleUniforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    /// time, spread, base size, size randomness
    pub params: Vec4,
    /// alpha toggle, surface width, surface height, opacity
    pub surface: Vec4,
}

static_assertions::const_assert_eq!(std::mem::size_of::<ParticleUniforms>() % 16, 0);

impl ParticleUniforms {
    pub fn new(
        frame: &FrameState,
        camera: &PerspectiveCamera,
        config: &ParticleConfig,
        surface_size: (u32, u32),
    ) -> Self {
        Self {
            model: frame.model_matrix(),
            view: camera.get_view_matrix(),
            projection: camera.get_projection_matrix(),
            params: Vec4::new(
                frame.time,
                config.particle_spread,
                config.particle_base_size,
                config.size_randomness,
            ),
            surface: Vec4::new(
                if config.alpha_particles { 1.0 } else { 0.0 },
                surface_size.0 as f32,
                surface_size.1 as f32,
                config.opacity,
            ),
        }
    }

    pub fn time(&self) -> f32 {
        self.params.x
    }

    pub fn offset(&self) -> Vec2 {
        self.model.w_axis.truncate().truncate()
    }
}

/// A cancellable, self-rescheduling frame callback.
///
/// The owner calls [FrameTask::reschedule] at the top of every tick it is
/// handed. [FrameTask::cancel] withdraws whatever request is outstanding and
/// stops further rescheduling; calling it again does nothing.
#[derive(Debug)]
pub struct FrameTask {
    pending: Option<FrameRequest>,
    cancelled: bool,
}

impl FrameTask {
    pub fn start(hub: &mut EventHub) -> Self {
        Self {
            pending: Some(hub.request_frame()),
            cancelled: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.cancelled
    }

    /// Whether `request` is the one this task is waiting on.
    pub fn owns(&self, request: FrameRequest) -> bool {
        self.pending == Some(request)
    }

    /// Consumes the fired request and queues the next one.
    pub fn reschedule(&mut self, hub: &mut EventHub) {
        if self.cancelled {
            self.pending = None;
            return;
        }
        self.pending = Some(hub.request_frame());
    }

    /// Returns true only on the call that actually stopped the task.
    pub fn cancel(&mut self, hub: &mut EventHub) -> bool {
        if self.cancelled {
            return false;
        }
        self.cancelled = true;
        if let Some(request) = self.pending.take() {
            hub.cancel_frame(request);
        }
        true
    }
}
