//! Particles and their initial placement.

use glam::Vec2;
use rand::Rng;

/// Base radius range in pixels, `[min, min + span)`.
const RADIUS_MIN: f32 = 0.8;
const RADIUS_SPAN: f32 = 1.5;

/// Base opacity range, `[min, min + span)`.
const ALPHA_MIN: f32 = 0.2;
const ALPHA_SPAN: f32 = 0.5;

/// A simulated point mass.
///
/// Position and velocity are in surface pixels; velocity is applied once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Base radius before pointer highlighting.
    pub radius: f32,
    /// Base opacity before pointer highlighting.
    pub alpha: f32,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32, alpha: f32) -> Self {
        Self {
            position,
            velocity,
            radius,
            alpha,
        }
    }

    /// Spawn a particle somewhere inside `bounds` with a velocity of at most `speed / 2` per
    /// axis.
    ///
    /// Sampling multiplies unit randoms rather than using ranges so zero-sized bounds and a zero
    /// speed are fine.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, bounds: Vec2, speed: f32) -> Self {
        let position = Vec2::new(rng.gen::<f32>() * bounds.x, rng.gen::<f32>() * bounds.y);
        let velocity = Vec2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5) * speed;
        let radius = RADIUS_MIN + rng.gen::<f32>() * RADIUS_SPAN;
        let alpha = ALPHA_MIN + rng.gen::<f32>() * ALPHA_SPAN;
        Self::new(position, velocity, radius, alpha)
    }
}

/// Spawn `count` particles for a surface of the given size.
pub fn spawn<R: Rng + ?Sized>(rng: &mut R, count: usize, bounds: Vec2, speed: f32) -> Vec<Particle> {
    (0..count)
        .map(|_| Particle::random(rng, bounds, speed))
        .collect()
}
