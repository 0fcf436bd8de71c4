use std::{sync::Arc, time::Instant};

use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use crate::{
    color::Color,
    config::ParticleConfig,
    host::{EventHub, HostEvent},
    particles::ParticleSystem,
    renderer::Renderer,
};

/// Window plus event loop hosting one particle field.
pub struct App {
    event_loop: EventLoop<()>,
    hub: EventHub,
    system: ParticleSystem<Renderer>,
}

impl App {
    pub fn new(
        title: impl Into<String>,
        width: u32,
        height: u32,
        background: Color,
        config: ParticleConfig,
    ) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(winit::dpi::LogicalSize::new(width as f64, height as f64))
            .with_resizable(true)
            .build(&event_loop)?;
        let window = Arc::new(window);

        let renderer = Renderer::new(window, background)?;

        let mut hub = EventHub::new();
        let system = ParticleSystem::mount(config, renderer, &mut hub, Instant::now())?;

        Ok(Self {
            event_loop,
            hub,
            system,
        })
    }

    /// Runs until the window closes. The field is unmounted on every exit
    /// path before the loop returns.
    pub fn run(self) -> anyhow::Result<()> {
        let Self {
            event_loop,
            mut hub,
            mut system,
        } = self;

        event_loop.run(move |event, target| {
            target.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { event, window_id }
                    if window_id == system.surface().window().id() =>
                {
                    match event {
                        WindowEvent::CloseRequested => {
                            log::info!("Close requested");
                            target.exit();
                        }
                        WindowEvent::Resized(size) => {
                            if hub.has_listener(HostEvent::Resize) {
                                system.handle_resize(size.width, size.height);
                            }
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            if hub.has_listener(HostEvent::PointerMove) {
                                system.handle_pointer(glam::Vec2::new(
                                    position.x as f32,
                                    position.y as f32,
                                ));
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            let now = Instant::now();
                            for request in hub.take_due_frames() {
                                if let Err(err) = system.handle_frame(request, now, &mut hub) {
                                    log::error!("Frame failed: {}", err);
                                    target.exit();
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    // one redraw per display refresh, only while a frame is wanted
                    if hub.has_pending_frame() {
                        system.surface().window().request_redraw();
                    }
                }
                Event::LoopExiting => {
                    system.unmount(&mut hub);
                    debug_assert_eq!(hub.listener_count(), 0);
                    debug_assert!(!hub.has_pending_frame());
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}
