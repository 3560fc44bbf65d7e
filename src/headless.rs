//! Headless host.
//!
//! Drives an engine for a fixed number of frames on a [`HeadlessSurface`] with a
//! [`ManualScheduler`], sweeping the pointer around the surface so the attraction and highlight
//! paths are exercised.

use std::time::Duration;

use glam::Vec2;

use crate::config::FieldConfig;
use crate::engine::{ManualScheduler, ParticleEngine, SharedPointer};
use crate::surface::HeadlessSurface;
use crate::time::FrameTimer;

/// Totals from a headless run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeadlessReport {
    pub frames: u64,
    pub links: usize,
    pub points: usize,
    pub elapsed: Duration,
}

impl HeadlessReport {
    /// Mean links drawn per frame.
    pub fn links_per_frame(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.links as f64 / self.frames as f64
    }

    /// Mean wall time per frame.
    pub fn frame_time(&self) -> Duration {
        if self.frames == 0 {
            return Duration::ZERO;
        }
        self.elapsed.div_f64(self.frames as f64)
    }
}

/// Pointer position for frame `frame` of a run: a slow ellipse around the center.
pub fn pointer_path(frame: u64) -> Vec2 {
    let t = frame as f32 * 0.02;
    Vec2::new(0.5 + 0.35 * t.cos(), 0.5 + 0.35 * (t * 1.3).sin())
}

/// Run `frames` frames on a surface of `size` logical pixels.
pub fn run(config: FieldConfig, size: (u32, u32), frames: u64) -> HeadlessReport {
    let pointer = SharedPointer::new(pointer_path(0));
    let surface = HeadlessSurface::new(size.0 as f32, size.1 as f32);
    let mut engine =
        ParticleEngine::create(surface, pointer.clone(), ManualScheduler::new(), config);

    let mut timer = FrameTimer::new();
    let mut report = HeadlessReport::default();

    for frame in 0..frames {
        pointer.set(pointer_path(frame));
        let Some(stats) = engine.frame() else {
            break;
        };
        report.frames += 1;
        report.links += stats.links;
        report.points += stats.points;

        if timer.tick() {
            log::debug!("frame {}: {:.1} fps", frame, timer.fps());
        }
    }

    engine.destroy();
    report.elapsed = timer.elapsed();
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_requested_frames() {
        let report = run(FieldConfig::new().with_seed(5), (640, 480), 20);
        assert_eq!(report.frames, 20);
        assert_eq!(report.points, 20 * 50);
    }

    #[test]
    fn test_empty_field() {
        let report = run(FieldConfig::new().with_count(0), (640, 480), 5);
        assert_eq!(report.frames, 5);
        assert_eq!(report.links, 0);
        assert_eq!(report.points, 0);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let config = FieldConfig::new().with_count(120).with_seed(9);
        let a = run(config.clone(), (800, 600), 30);
        let b = run(config, (800, 600), 30);
        assert_eq!(a.links, b.links);
    }

    #[test]
    fn test_zero_frames() {
        let report = run(FieldConfig::new().with_seed(1), (100, 100), 0);
        assert_eq!(report.frames, 0);
        assert_eq!(report.links_per_frame(), 0.0);
        assert_eq!(report.frame_time(), Duration::ZERO);
    }

    #[test]
    fn test_pointer_path_stays_on_surface() {
        for frame in 0..1000 {
            let p = pointer_path(frame);
            assert!(p.cmpge(Vec2::ZERO).all() && p.cmple(Vec2::ONE).all());
        }
    }
}
