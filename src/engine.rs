//! Engine controller: lifecycle, frame loop and resize handling.
//!
//! A [`ParticleEngine`] ties a [`ParticleField`] to a host. The host supplies three things:
//!
//! - a [`Surface`] to draw on
//! - a [`PointerSource`] reporting the pointer normalized to the surface
//! - a [`Scheduler`] that arranges for frames and resize notifications to be delivered
//!
//! The engine requests one frame at a time. When the host fires it, the host calls
//! [`ParticleEngine::frame`], which steps the field and requests the next one. Resize events
//! go to [`ParticleEngine::resized`]. [`ParticleEngine::destroy`] (or dropping the engine)
//! cancels the outstanding frame and the resize watch.
//!
//! ```ignore
//! let mut scheduler = ManualScheduler::new();
//! let mut surface = HeadlessSurface::new(800.0, 600.0);
//! let mut engine = ParticleEngine::create(&mut surface, || Vec2::splat(0.5), &mut scheduler, FieldConfig::new());
//! engine.frame();
//! engine.destroy();
//! ```

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use crate::config::FieldConfig;
use crate::field::ParticleField;
use crate::render::FrameStats;
use crate::surface::Surface;

/// Handle for a requested animation frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Handle for an active resize subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResizeWatch(pub u64);

/// Host facility for frame timing and resize notification.
///
/// Frames are one-shot: each request results in at most one call to
/// [`ParticleEngine::frame`] unless it is cancelled first.
pub trait Scheduler {
    /// Ask for a frame at the next display refresh.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraw a frame request that has not fired yet.
    fn cancel_frame(&mut self, request: FrameRequest);

    /// Start delivering resize notifications.
    fn watch_resize(&mut self) -> ResizeWatch;

    /// Stop delivering resize notifications.
    fn unwatch_resize(&mut self, watch: ResizeWatch);
}

impl<H: Scheduler + ?Sized> Scheduler for &mut H {
    fn request_frame(&mut self) -> FrameRequest {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        (**self).cancel_frame(request);
    }

    fn watch_resize(&mut self) -> ResizeWatch {
        (**self).watch_resize()
    }

    fn unwatch_resize(&mut self, watch: ResizeWatch) {
        (**self).unwatch_resize(watch);
    }
}

/// Current pointer position, normalized to `[0, 1] × [0, 1]` over the surface.
pub trait PointerSource {
    fn position(&self) -> Vec2;
}

impl<F: Fn() -> Vec2> PointerSource for F {
    fn position(&self) -> Vec2 {
        self()
    }
}

/// A pointer position shared between whoever tracks the pointer and the engine reading it.
#[derive(Clone, Debug, Default)]
pub struct SharedPointer(Rc<Cell<Vec2>>);

impl SharedPointer {
    pub fn new(position: Vec2) -> Self {
        Self(Rc::new(Cell::new(position)))
    }

    pub fn set(&self, position: Vec2) {
        self.0.set(position);
    }

    pub fn get(&self) -> Vec2 {
        self.0.get()
    }
}

impl PointerSource for SharedPointer {
    fn position(&self) -> Vec2 {
        self.get()
    }
}

/// A scheduler driven by hand, for headless hosts and tests.
///
/// It only records requests; the owner decides when to call [`ParticleEngine::frame`].
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Option<FrameRequest>,
    watches: Vec<ResizeWatch>,
    frames_requested: u64,
    frames_cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame request that has not fired or been cancelled yet.
    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Number of active resize watches.
    pub fn resize_watchers(&self) -> usize {
        self.watches.len()
    }

    /// Total frames requested so far.
    pub fn frames_requested(&self) -> u64 {
        self.frames_requested
    }

    /// Total frames cancelled so far.
    pub fn frames_cancelled(&self) -> u64 {
        self.frames_cancelled
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next_id());
        self.pending = Some(request);
        self.frames_requested += 1;
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
            self.frames_cancelled += 1;
        }
    }

    fn watch_resize(&mut self) -> ResizeWatch {
        let watch = ResizeWatch(self.next_id());
        self.watches.push(watch);
        watch
    }

    fn unwatch_resize(&mut self, watch: ResizeWatch) {
        self.watches.retain(|w| *w != watch);
    }
}

enum EngineState {
    /// The surface had no drawing context. Nothing is scheduled and nothing is drawn.
    Inert,
    Running {
        field: ParticleField,
        frame: Option<FrameRequest>,
        resize: ResizeWatch,
    },
    Destroyed,
}

/// A running particle field attached to a host.
pub struct ParticleEngine<S: Surface, P: PointerSource, H: Scheduler> {
    surface: S,
    pointer: P,
    scheduler: H,
    state: EngineState,
}

impl<S: Surface, P: PointerSource, H: Scheduler> ParticleEngine<S, P, H> {
    /// Attach a particle field to `surface` and start animating.
    ///
    /// If the surface cannot provide a drawing context the engine is created inert: it never
    /// schedules a frame and [`destroy`](Self::destroy) does nothing.
    pub fn create(mut surface: S, pointer: P, mut scheduler: H, config: FieldConfig) -> Self {
        if surface.canvas().is_none() {
            log::warn!("Surface has no drawing context; particle field disabled");
            return Self {
                surface,
                pointer,
                scheduler,
                state: EngineState::Inert,
            };
        }

        let bounds = fit_buffer(&mut surface);
        let field = ParticleField::new(config, bounds);
        let (cols, rows) = field.grid().dimensions();
        log::debug!(
            "Particle field started: {} particles on {}x{} ({}x{} cells)",
            field.particles().len(),
            bounds.x,
            bounds.y,
            cols,
            rows
        );

        let resize = scheduler.watch_resize();
        let frame = Some(scheduler.request_frame());

        Self {
            surface,
            pointer,
            scheduler,
            state: EngineState::Running {
                field,
                frame,
                resize,
            },
        }
    }

    /// Run the pending frame and schedule the next one.
    ///
    /// Returns `None` without doing anything if no frame is pending, which is the case for
    /// inert and destroyed engines.
    pub fn frame(&mut self) -> Option<FrameStats> {
        let EngineState::Running { field, frame, .. } = &mut self.state else {
            return None;
        };
        frame.take()?;

        let pointer = self.pointer.position();
        let stats = self
            .surface
            .canvas()
            .map(|canvas| field.step(pointer, canvas));

        *frame = Some(self.scheduler.request_frame());
        stats
    }

    /// React to a surface resize: refit the backing buffer and rebuild the grid dimensions.
    pub fn resized(&mut self) {
        let EngineState::Running { field, .. } = &mut self.state else {
            return;
        };

        let bounds = fit_buffer(&mut self.surface);
        field.resize(bounds);
        let (cols, rows) = field.grid().dimensions();
        log::debug!(
            "Particle field resized to {}x{} ({}x{} cells)",
            bounds.x,
            bounds.y,
            cols,
            rows
        );
    }

    /// Stop animating: cancel the pending frame and the resize watch.
    ///
    /// Safe to call any number of times.
    pub fn destroy(&mut self) {
        if let EngineState::Running { frame, resize, .. } =
            std::mem::replace(&mut self.state, EngineState::Destroyed)
        {
            if let Some(request) = frame {
                self.scheduler.cancel_frame(request);
            }
            self.scheduler.unwatch_resize(resize);
            log::debug!("Particle field destroyed");
        }
    }

    /// Whether frames are still being scheduled.
    pub fn is_running(&self) -> bool {
        matches!(self.state, EngineState::Running { .. })
    }

    /// Whether the engine was created without a drawing context.
    pub fn is_inert(&self) -> bool {
        matches!(self.state, EngineState::Inert)
    }

    /// The field being animated, while running.
    pub fn field(&self) -> Option<&ParticleField> {
        match &self.state {
            EngineState::Running { field, .. } => Some(field),
            EngineState::Inert | EngineState::Destroyed => None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn scheduler(&self) -> &H {
        &self.scheduler
    }
}

impl<S: Surface, P: PointerSource, H: Scheduler> Drop for ParticleEngine<S, P, H> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Size the backing buffer to the surface's on-screen size and return the new bounds.
fn fit_buffer<S: Surface>(surface: &mut S) -> Vec2 {
    let size = surface.client_size();
    let width = buffer_extent(size.x);
    let height = buffer_extent(size.y);
    surface.set_buffer_size(width, height);
    Vec2::new(width as f32, height as f32)
}

/// Round a logical length to whole buffer pixels. Negative and NaN lengths become 0.
fn buffer_extent(length: f32) -> u32 {
    length.max(0.0).round() as u32
}
