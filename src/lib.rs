pub mod app;
pub mod camera;
pub mod color;
pub mod config;
pub mod field;
pub mod host;
pub mod input;
pub mod particles;
pub mod render_loop;
pub mod renderer;
pub mod trajectory;

pub mod prelude {
    pub use crate::app::App;
    pub use crate::camera::PerspectiveCamera;
    pub use crate::color::{Color, Palette};
    pub use crate::config::{Args, ParticleConfig, Preset};
    pub use crate::field::ParticleField;
    pub use crate::host::{EventHub, FrameRequest, HostEvent, ListenerId};
    pub use crate::particles::{ParticleSurface, ParticleSystem};
    pub use crate::render_loop::{FrameState, FrameTask, ParticleUniforms, RenderContext};
    pub use crate::renderer::Renderer;
    pub use glam::*;
}
