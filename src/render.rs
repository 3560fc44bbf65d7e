//! Link and point rendering.
//!
//! Links are searched through the [`SpatialGrid`]: each particle is only compared against the
//! rest of its own cell and the cell's forward neighbors, so every close pair is found exactly
//! once without an all-pairs scan.

use glam::Vec2;

use crate::config::Rgb;
use crate::particle::Particle;
use crate::spatial::SpatialGrid;
use crate::surface::Canvas;

/// Opacity of a link between two coincident particles. Fades linearly to 0 at the link
/// distance.
pub const LINK_MAX_ALPHA: f32 = 0.1;

/// Upper bound on the opacity multiplier of a highlighted particle.
pub const HIGHLIGHT_ALPHA_CAP: f32 = 1.5;

/// What was drawn in one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub links: usize,
    pub points: usize,
}

/// Opacity of a link of length `dist`.
#[inline]
pub fn link_alpha(dist: f32, link_dist: f32) -> f32 {
    LINK_MAX_ALPHA * (1.0 - dist / link_dist)
}

/// Radius and opacity multipliers for a particle `dist` pixels from the pointer.
///
/// Outside `mouse_radius` both are 1. Inside, the radius grows up to 2× at the pointer and the
/// opacity grows with it but is capped at [`HIGHLIGHT_ALPHA_CAP`].
#[inline]
pub fn highlight(dist: f32, mouse_radius: f32) -> (f32, f32) {
    if dist < mouse_radius {
        let boost = 1.0 + (1.0 - dist / mouse_radius);
        (boost, boost.min(HIGHLIGHT_ALPHA_CAP))
    } else {
        (1.0, 1.0)
    }
}

/// Draw a line between every pair of particles closer than `link_dist`.
///
/// `grid` must have been populated from `particles` this frame. Returns the number of lines.
/// A `link_dist` that is zero, negative or NaN draws nothing.
pub fn draw_links<C: Canvas + ?Sized>(
    particles: &[Particle],
    grid: &SpatialGrid,
    link_dist: f32,
    color: Rgb,
    canvas: &mut C,
) -> usize {
    if link_dist.is_nan() || link_dist <= 0.0 {
        return 0;
    }
    let max_dist_sq = link_dist * link_dist;
    let mut drawn = 0;

    let mut try_link = |i: usize, j: usize, canvas: &mut C| {
        let a = particles[i].position;
        let b = particles[j].position;
        let dist_sq = a.distance_squared(b);
        if dist_sq < max_dist_sq {
            canvas.stroke_line(a, b, color, link_alpha(dist_sq.sqrt(), link_dist));
            drawn += 1;
        }
    };

    for cell in 0..grid.cell_count() {
        let members = grid.cell(cell);
        if members.is_empty() {
            continue;
        }
        let neighbors = grid.forward_neighbors(cell);

        for (k, &i) in members.iter().enumerate() {
            for &j in &members[k + 1..] {
                try_link(i, j, canvas);
            }
            for neighbor in neighbors.into_iter().flatten() {
                for &j in grid.cell(neighbor) {
                    try_link(i, j, canvas);
                }
            }
        }
    }

    drawn
}

/// Draw every particle as a filled circle, enlarged and brightened near `pointer`.
///
/// Returns the number of circles.
pub fn draw_points<C: Canvas + ?Sized>(
    particles: &[Particle],
    pointer: Vec2,
    mouse_radius: f32,
    color: Rgb,
    canvas: &mut C,
) -> usize {
    for particle in particles {
        let (radius_scale, alpha_scale) =
            highlight(particle.position.distance(pointer), mouse_radius);
        let alpha = (particle.alpha * alpha_scale).clamp(0.0, 1.0);
        canvas.fill_circle(particle.position, particle.radius * radius_scale, color, alpha);
    }
    particles.len()
}
