//! Pointer tracking from window events.
//!
//! [`PointerTracker`] turns winit cursor and resize events into the normalized pointer position
//! the engine reads every frame. Positions are kept in logical pixels so they line up with the
//! surface's unscaled client size.
//!
//! ```ignore
//! let mut tracker = PointerTracker::new(window.inner_size(), window.scale_factor());
//! let engine = ParticleEngine::create(surface, tracker.source(), scheduler, config);
//!
//! // in the event loop
//! tracker.handle_event(&event);
//! ```

use glam::Vec2;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;

use crate::engine::SharedPointer;

/// Where the pointer sits before the first cursor event: the surface center.
pub const INITIAL_POINTER: Vec2 = Vec2::new(0.5, 0.5);

/// Tracks the cursor over a window and publishes it normalized to `[0, 1] × [0, 1]`.
#[derive(Debug)]
pub struct PointerTracker {
    pointer: SharedPointer,
    // last cursor position in logical pixels
    position: Vec2,
    // window size in logical pixels
    window_size: Vec2,
    scale_factor: f64,
}

impl PointerTracker {
    /// Create a tracker for a window of the given physical size and scale factor.
    pub fn new(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let mut tracker = Self {
            pointer: SharedPointer::new(INITIAL_POINTER),
            position: Vec2::ZERO,
            window_size: Vec2::ZERO,
            scale_factor: sanitize_scale(scale_factor),
        };
        tracker.set_window_size(size);
        tracker.move_to(tracker.window_size * INITIAL_POINTER);
        tracker
    }

    /// A handle the engine can read the pointer from.
    pub fn source(&self) -> SharedPointer {
        self.pointer.clone()
    }

    /// Current normalized pointer position.
    pub fn normalized(&self) -> Vec2 {
        self.pointer.get()
    }

    /// Last cursor position in logical pixels.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(self.scale_factor);
                self.move_to(Vec2::new(logical.x, logical.y));
            }
            WindowEvent::Resized(size) => {
                self.set_window_size(*size);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = sanitize_scale(*scale_factor);
            }
            _ => {}
        }
    }

    /// Move the pointer to `position`, in logical pixels.
    pub fn move_to(&mut self, position: Vec2) {
        self.position = position;
        self.publish();
    }

    /// Update the window size, in physical pixels.
    pub fn set_window_size(&mut self, size: PhysicalSize<u32>) {
        let logical = size.to_logical::<f32>(self.scale_factor);
        self.window_size = Vec2::new(logical.width, logical.height);
        self.publish();
    }

    fn publish(&self) {
        if self.window_size.x <= 0.0 || self.window_size.y <= 0.0 {
            return;
        }
        let normalized = (self.position / self.window_size).clamp(Vec2::ZERO, Vec2::ONE);
        self.pointer.set(normalized);
    }
}

fn sanitize_scale(scale_factor: f64) -> f64 {
    if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PointerSource;

    #[test]
    fn test_starts_at_center() {
        let tracker = PointerTracker::new(PhysicalSize::new(800, 600), 1.0);
        assert_eq!(tracker.normalized(), INITIAL_POINTER);
        assert_eq!(tracker.position(), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_move_normalizes() {
        let mut tracker = PointerTracker::new(PhysicalSize::new(800, 600), 1.0);
        let source = tracker.source();

        tracker.move_to(Vec2::new(200.0, 450.0));

        assert_eq!(source.position(), Vec2::new(0.25, 0.75));
    }

    #[test]
    fn test_outside_window_is_clamped() {
        let mut tracker = PointerTracker::new(PhysicalSize::new(100, 100), 1.0);
        tracker.move_to(Vec2::new(-20.0, 250.0));
        assert_eq!(tracker.normalized(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_scale_factor_uses_logical_size() {
        // 1600x1200 physical at 2x is 800x600 logical
        let mut tracker = PointerTracker::new(PhysicalSize::new(1600, 1200), 2.0);
        tracker.move_to(Vec2::new(400.0, 150.0));
        assert_eq!(tracker.normalized(), Vec2::new(0.5, 0.25));
    }

    #[test]
    fn test_resize_renormalizes() {
        let mut tracker = PointerTracker::new(PhysicalSize::new(400, 400), 1.0);
        tracker.move_to(Vec2::new(100.0, 100.0));
        tracker.set_window_size(PhysicalSize::new(200, 200));
        assert_eq!(tracker.normalized(), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_zero_sized_window_keeps_last_position() {
        let mut tracker = PointerTracker::new(PhysicalSize::new(400, 400), 1.0);
        tracker.move_to(Vec2::new(100.0, 300.0));
        tracker.set_window_size(PhysicalSize::new(0, 0));
        tracker.move_to(Vec2::new(10.0, 10.0));
        assert_eq!(tracker.normalized(), Vec2::new(0.25, 0.75));
    }

    #[test]
    fn test_invalid_scale_factor() {
        assert_eq!(sanitize_scale(0.0), 1.0);
        assert_eq!(sanitize_scale(f64::NAN), 1.0);
        assert_eq!(sanitize_scale(1.5), 1.5);
    }
}
