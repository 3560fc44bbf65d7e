//! The particle field state object.
//!
//! [`ParticleField`] owns everything one animated background needs between frames: its
//! configuration, the surface bounds, the particles and the spatial grid. The host decides when
//! a frame happens and calls [`ParticleField::step`]; nothing here knows about timers, windows
//! or event loops, so fields can be stepped deterministically and any number of them can
//! coexist.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::FieldConfig;
use crate::particle::{self, Particle};
use crate::render::{self, FrameStats};
use crate::simulation;
use crate::spatial::SpatialGrid;
use crate::surface::Canvas;

/// Simulation and render state for one particle field.
#[derive(Clone, Debug)]
pub struct ParticleField {
    config: FieldConfig,
    bounds: Vec2,
    particles: Vec<Particle>,
    grid: SpatialGrid,
}

impl ParticleField {
    /// Create a field filling `bounds`, seeded from `config.seed` or OS entropy.
    pub fn new(config: FieldConfig, bounds: Vec2) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, bounds, &mut rng)
    }

    /// Create a field using the given random source for particle placement.
    pub fn with_rng<R: Rng + ?Sized>(config: FieldConfig, bounds: Vec2, rng: &mut R) -> Self {
        let particles = particle::spawn(rng, config.count, bounds, config.speed);
        Self::from_particles(config, bounds, particles)
    }

    /// Create a field from explicit particles. `config.count` is ignored in favor of
    /// `particles.len()`.
    pub fn from_particles(config: FieldConfig, bounds: Vec2, particles: Vec<Particle>) -> Self {
        let grid = SpatialGrid::new(bounds, config.link_dist, particles.len());
        Self {
            config,
            bounds,
            particles,
            grid,
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Current surface bounds in pixels.
    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Adopt new surface bounds.
    ///
    /// Particles keep their coordinates; any that now lie outside are wrapped back in by the
    /// next [`simulate`](Self::simulate).
    pub fn resize(&mut self, bounds: Vec2) {
        self.bounds = bounds;
        self.grid.resize(bounds);
    }

    /// Move every particle by one frame and rebuild the grid. `pointer` is in surface pixels.
    pub fn simulate(&mut self, pointer: Vec2) {
        self.grid.begin();
        for (index, particle) in self.particles.iter_mut().enumerate() {
            simulation::advance(particle, pointer, self.config.mouse_radius, self.bounds);
            self.grid.insert(index, particle.position);
        }
        self.grid.finish();
    }

    /// Draw links, then points. Expects [`simulate`](Self::simulate) to have run this frame.
    pub fn render<C: Canvas + ?Sized>(&self, pointer: Vec2, canvas: &mut C) -> FrameStats {
        let links = render::draw_links(
            &self.particles,
            &self.grid,
            self.config.link_dist,
            self.config.color,
            canvas,
        );
        let points = render::draw_points(
            &self.particles,
            pointer,
            self.config.mouse_radius,
            self.config.color,
            canvas,
        );
        FrameStats { links, points }
    }

    /// Run one full frame: clear, simulate, draw and flush.
    ///
    /// `pointer` is normalized to the surface, `(0, 0)` top-left and `(1, 1)` bottom-right.
    pub fn step<C: Canvas + ?Sized>(&mut self, pointer: Vec2, canvas: &mut C) -> FrameStats {
        let pointer = pointer * self.bounds;
        canvas.clear();
        self.simulate(pointer);
        let stats = self.render(pointer, canvas);
        canvas.flush();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingCanvas};

    fn seeded(count: usize, bounds: Vec2) -> ParticleField {
        ParticleField::new(FieldConfig::new().with_count(count).with_seed(3), bounds)
    }

    fn assert_in_bounds(field: &ParticleField) {
        let bounds = field.bounds();
        for p in field.particles() {
            assert!(
                p.position.x >= 0.0 && p.position.x < bounds.x,
                "x out of bounds: {:?}",
                p.position
            );
            assert!(
                p.position.y >= 0.0 && p.position.y < bounds.y,
                "y out of bounds: {:?}",
                p.position
            );
        }
    }

    fn assert_partition(field: &ParticleField) {
        let grid = field.grid();
        let mut seen: Vec<usize> = (0..grid.cell_count())
            .flat_map(|c| grid.cell(c).iter().copied())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..field.particles().len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_seeded_fields_match() {
        let a = seeded(30, Vec2::new(400.0, 300.0));
        let b = seeded(30, Vec2::new(400.0, 300.0));
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_grid_matches_link_dist() {
        let field = ParticleField::new(
            FieldConfig::new().with_link_dist(100.0).with_seed(1),
            Vec2::new(1024.0, 768.0),
        );
        assert_eq!(field.grid().cell_size(), 100.0);
        assert_eq!(field.grid().dimensions(), (11, 8));
    }

    #[test]
    fn test_invariants_hold_over_many_steps() {
        let mut field = seeded(200, Vec2::new(800.0, 600.0));
        let mut canvas = RecordingCanvas::new();

        for frame in 0..300 {
            let t = frame as f32 * 0.05;
            let pointer = Vec2::new(0.5 + 0.4 * t.cos(), 0.5 + 0.4 * t.sin());
            field.step(pointer, &mut canvas);
            assert_in_bounds(&field);
            assert_partition(&field);
        }
        assert_eq!(canvas.frames(), 300);
    }

    #[test]
    fn test_step_draws_links_before_points() {
        let particles = vec![
            Particle::new(Vec2::new(10.0, 10.0), Vec2::ZERO, 1.0, 0.5),
            Particle::new(Vec2::new(20.0, 10.0), Vec2::ZERO, 1.0, 0.5),
        ];
        let mut field =
            ParticleField::from_particles(FieldConfig::new(), Vec2::splat(200.0), particles);
        let mut canvas = RecordingCanvas::new();

        let stats = field.step(Vec2::ONE, &mut canvas);

        assert_eq!(stats, FrameStats { links: 1, points: 2 });
        let commands = canvas.commands();
        assert_eq!(commands[0], DrawCommand::Clear);
        assert!(matches!(commands[1], DrawCommand::Line { .. }));
        assert!(matches!(commands[2], DrawCommand::Circle { .. }));
        assert!(matches!(commands[3], DrawCommand::Circle { .. }));
    }

    #[test]
    fn test_pointer_is_denormalized() {
        // one still particle at the surface center, pointer at the center
        let particles = vec![Particle::new(Vec2::new(100.0, 50.0), Vec2::ZERO, 1.0, 0.4)];
        let mut field =
            ParticleField::from_particles(FieldConfig::new(), Vec2::new(200.0, 100.0), particles);
        let mut canvas = RecordingCanvas::new();

        field.step(Vec2::splat(0.5), &mut canvas);

        match canvas.circles().next() {
            Some(DrawCommand::Circle { radius, .. }) => assert_eq!(*radius, 2.0),
            other => panic!("expected a circle, got {:?}", other),
        };
    }

    #[test]
    fn test_shrink_then_step_restores_bounds() {
        let mut field = seeded(100, Vec2::new(1000.0, 800.0));
        field.resize(Vec2::new(120.0, 90.0));
        assert_eq!(field.grid().dimensions(), (2, 1));

        field.step(Vec2::splat(0.5), &mut RecordingCanvas::new());
        assert_in_bounds(&field);
        assert_partition(&field);
    }

    #[test]
    fn test_resize_keeps_positions_until_next_step() {
        let particles = vec![
            Particle::new(Vec2::new(900.0, 700.0), Vec2::new(1.0, -1.0), 1.5, 0.5),
            Particle::new(Vec2::new(20.0, 30.0), Vec2::ZERO, 1.0, 0.3),
        ];
        let mut field =
            ParticleField::from_particles(FieldConfig::new(), Vec2::new(1000.0, 800.0), particles);
        let before = field.particles().to_vec();

        field.resize(Vec2::new(100.0, 100.0));

        assert_eq!(field.bounds(), Vec2::new(100.0, 100.0));
        assert_eq!(field.particles(), before.as_slice());

        field.step(Vec2::splat(0.5), &mut RecordingCanvas::new());
        assert_in_bounds(&field);
    }

    #[test]
    fn test_tiny_link_dist_steps_without_links() {
        let config = FieldConfig::new().with_count(3).with_seed(5).with_link_dist(1e-30);
        let mut field = ParticleField::new(config, Vec2::new(640.0, 480.0));
        let mut canvas = RecordingCanvas::new();

        let stats = field.step(Vec2::splat(0.5), &mut canvas);

        assert_eq!(stats, FrameStats { links: 0, points: 3 });
        assert!(field.grid().cell_count() <= crate::spatial::MAX_CELLS);
        assert_partition(&field);
    }

    #[test]
    fn test_zero_particles() {
        let mut field = seeded(0, Vec2::new(300.0, 200.0));
        let mut canvas = RecordingCanvas::new();
        let stats = field.step(Vec2::splat(0.5), &mut canvas);
        assert_eq!(stats, FrameStats::default());
        assert_eq!(canvas.commands(), &[DrawCommand::Clear]);
    }

    #[test]
    fn test_zero_sized_surface() {
        let mut field = seeded(10, Vec2::ZERO);
        field.step(Vec2::splat(0.5), &mut RecordingCanvas::new());
        assert_eq!(field.grid().dimensions(), (1, 1));
        assert!(field.particles().iter().all(|p| p.position == Vec2::ZERO));
    }
}
