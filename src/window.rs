//! Native window host.
//!
//! Runs a particle field in a winit window rendered through wgpu. The window doubles as the
//! engine's [`Scheduler`]: a frame request is a redraw request, and resize events are forwarded
//! while the engine holds a watch.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::FieldConfig;
use crate::engine::{FrameRequest, ParticleEngine, ResizeWatch, Scheduler, SharedPointer};
use crate::error::WindowError;
use crate::gpu::GpuSurface;
use crate::input::PointerTracker;
use crate::time::FrameTimer;

const TITLE: &str = "Particle Field";

/// Open a window of the given logical size and animate a particle field in it until closed.
pub fn run(config: FieldConfig, size: (u32, u32)) -> Result<(), WindowError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, size);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Scheduler backed by winit redraw requests.
pub struct WindowScheduler {
    window: Arc<Window>,
    next_id: u64,
    pending: Option<FrameRequest>,
    watch: Option<ResizeWatch>,
}

impl WindowScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_id: 0,
            pending: None,
            watch: None,
        }
    }

    /// Whether resize events should be forwarded to the engine.
    pub fn is_watching_resize(&self) -> bool {
        self.watch.is_some()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Scheduler for WindowScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next_id());
        self.pending = Some(request);
        self.window.request_redraw();
        request
    }

    // A redraw cannot be withdrawn from winit. The engine ignores redraws it did not ask for.
    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }

    fn watch_resize(&mut self) -> ResizeWatch {
        let watch = ResizeWatch(self.next_id());
        self.watch = Some(watch);
        watch
    }

    fn unwatch_resize(&mut self, watch: ResizeWatch) {
        if self.watch == Some(watch) {
            self.watch = None;
        }
    }
}

type WindowEngine = ParticleEngine<GpuSurface, SharedPointer, WindowScheduler>;

struct Running {
    engine: WindowEngine,
    tracker: PointerTracker,
    timer: FrameTimer,
}

struct App {
    config: FieldConfig,
    size: (u32, u32),
    running: Option<Running>,
    error: Option<WindowError>,
}

impl App {
    fn new(config: FieldConfig, size: (u32, u32)) -> Self {
        Self {
            config,
            size,
            running: None,
            error: None,
        }
    }

    fn shut_down(&mut self) {
        if let Some(running) = &mut self.running {
            running.engine.destroy();
            log::info!(
                "Closed after {} frames ({:.1}s)",
                running.timer.frames(),
                running.timer.elapsed().as_secs_f32()
            );
        }
        self.running = None;
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(LogicalSize::new(self.size.0, self.size.1));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.error = Some(err.into());
                event_loop.exit();
                return;
            }
        };

        let tracker = PointerTracker::new(window.inner_size(), window.scale_factor());
        let scheduler = WindowScheduler::new(window.clone());
        let surface = GpuSurface::new(window);
        let engine =
            ParticleEngine::create(surface, tracker.source(), scheduler, self.config.clone());

        self.running = Some(Running {
            engine,
            tracker,
            timer: FrameTimer::new(),
        });
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if matches!(event, WindowEvent::CloseRequested) {
            self.shut_down();
            event_loop.exit();
            return;
        }

        let Some(running) = &mut self.running else {
            return;
        };
        running.tracker.handle_event(&event);

        match event {
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if running.engine.scheduler().is_watching_resize() {
                    running.engine.resized();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(stats) = running.engine.frame() {
                    if running.timer.tick() {
                        log::debug!(
                            "{:.1} fps, {} links, {} points",
                            running.timer.fps(),
                            stats.links,
                            stats.points
                        );
                    }
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shut_down();
    }
}
