//! Per-frame particle physics.
//!
//! One call to [`advance`] moves a particle by one frame: attraction toward the pointer, drag,
//! integration and toroidal wrap-around. Time is measured in frames, not seconds, so the motion
//! runs faster on high refresh-rate displays.

use glam::Vec2;

use crate::particle::Particle;

/// Velocity impulse per frame toward the pointer, per unit direction.
pub const ATTRACTION_GAIN: f32 = 0.015;

/// Velocity multiplier applied every frame.
pub const DAMPING: f32 = 0.985;

/// Below this pointer distance (pixels) no attraction is applied.
pub const MIN_ATTRACTION_DISTANCE: f32 = 1.0;

/// Pull a particle toward `pointer` if it is inside `mouse_radius`.
pub fn attract(particle: &mut Particle, pointer: Vec2, mouse_radius: f32) {
    let to_pointer = pointer - particle.position;
    let dist = to_pointer.length();
    if dist < mouse_radius && dist > MIN_ATTRACTION_DISTANCE {
        particle.velocity += to_pointer / dist * ATTRACTION_GAIN;
    }
}

/// Advance a particle by one frame inside `bounds`.
pub fn advance(particle: &mut Particle, pointer: Vec2, mouse_radius: f32, bounds: Vec2) {
    attract(particle, pointer, mouse_radius);
    particle.velocity *= DAMPING;
    particle.position += particle.velocity;
    particle.position = wrap(particle.position, bounds);
}

/// Wrap a position onto the torus `[0, bounds.x) × [0, bounds.y)`.
#[inline]
pub fn wrap(position: Vec2, bounds: Vec2) -> Vec2 {
    Vec2::new(wrap_coord(position.x, bounds.x), wrap_coord(position.y, bounds.y))
}

/// Wrap a single coordinate into `[0, extent)`.
///
/// A coordinate that left by less than one extent re-enters from the opposite edge. One that is
/// further out, which happens after the surface shrinks, is reduced modulo the extent. Empty or
/// invalid extents collapse the coordinate to 0.
pub fn wrap_coord(value: f32, extent: f32) -> f32 {
    if extent.is_nan() || extent <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    if (0.0..extent).contains(&value) {
        return value;
    }

    let shifted = if value < 0.0 { value + extent } else { value - extent };
    if (0.0..extent).contains(&shifted) {
        return shifted;
    }

    let reduced = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if reduced < extent {
        reduced
    } else {
        0.0
    }
}
