//! # particle-field
//!
//! An interactive particle-field background: drifting points that link up with faint lines
//! when close and are drawn toward the pointer.
//!
//! The engine is host-agnostic. A host supplies a drawing [`Surface`], a pointer accessor and a
//! [`Scheduler`] that fires frames; the engine owns the particles, the spatial grid and the
//! frame loop.
//!
//! ## Quick Start
//!
//! ```ignore
//! use particle_field::prelude::*;
//!
//! let mut scheduler = ManualScheduler::new();
//! let mut surface = HeadlessSurface::new(1280.0, 720.0);
//! let mut engine = ParticleEngine::create(
//!     &mut surface,
//!     || Vec2::new(0.5, 0.5),
//!     &mut scheduler,
//!     FieldConfig::new().with_count(80),
//! );
//!
//! // whenever the host's frame fires:
//! engine.frame();
//!
//! // when the host's surface changes size:
//! engine.resized();
//!
//! engine.destroy();
//! ```
//!
//! ## Frame Anatomy
//!
//! Every frame runs [`ParticleField::step`]:
//!
//! 1. Clear the canvas.
//! 2. For each particle: attract toward the pointer if within `mouse_radius`, damp, move,
//!    wrap around the edges, and file it into the [`SpatialGrid`].
//! 3. Draw a line between every pair closer than `link_dist`, searching only neighboring
//!    grid cells.
//! 4. Draw every particle as a circle, enlarged and brightened near the pointer.
//!
//! Motion is measured per frame, not per second.
//!
//! ## Hosts
//!
//! | Host | Surface | Scheduler |
//! |------|---------|-----------|
//! | Tests and benchmarks | [`HeadlessSurface`] | [`ManualScheduler`] |
//! | [`headless::run`] | [`HeadlessSurface`] | [`ManualScheduler`] |
//! | [`window::run`] | [`gpu::GpuSurface`] | [`window::WindowScheduler`] |

pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod gpu;
pub mod headless;
pub mod input;
pub mod particle;
pub mod render;
pub mod simulation;
pub mod spatial;
pub mod surface;
pub mod time;
pub mod window;

pub use config::{FieldConfig, Rgb};
pub use engine::{
    FrameRequest, ManualScheduler, ParticleEngine, PointerSource, ResizeWatch, Scheduler,
    SharedPointer,
};
pub use error::{ConfigError, GpuError, WindowError};
pub use field::ParticleField;
pub use glam::Vec2;
pub use particle::Particle;
pub use render::FrameStats;
pub use spatial::SpatialGrid;
pub use surface::{Canvas, DrawCommand, HeadlessSurface, RecordingCanvas, Surface};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use particle_field::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{FieldConfig, Rgb};
    pub use crate::engine::{ManualScheduler, ParticleEngine, PointerSource, Scheduler, SharedPointer};
    pub use crate::field::ParticleField;
    pub use crate::render::FrameStats;
    pub use crate::surface::{Canvas, HeadlessSurface, Surface};
    pub use crate::Vec2;
}
