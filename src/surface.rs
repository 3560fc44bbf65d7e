//! Drawing surfaces.
//!
//! A [`Surface`] is the region the engine renders into: it reports its on-screen size, owns a
//! backing buffer that can be resized, and may or may not be able to hand out a [`Canvas`] to
//! draw with. A surface that never yields a canvas puts the engine into its inert mode.
//!
//! [`HeadlessSurface`] records draw commands in memory instead of rasterizing them. It drives the
//! headless runner, the benchmarks and the tests.

use glam::Vec2;

use crate::config::Rgb;

/// 2D drawing operations used by the renderers.
pub trait Canvas {
    /// Erase the whole buffer.
    fn clear(&mut self);

    /// Stroke a line segment.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgb, alpha: f32);

    /// Fill a circle.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32);

    /// Called once after every frame has been drawn. Batching canvases submit here.
    fn flush(&mut self) {}
}

/// A drawable region with a resizable backing buffer.
pub trait Surface {
    type Canvas: Canvas;

    /// On-screen size in logical pixels, not multiplied by the display scale factor.
    fn client_size(&self) -> Vec2;

    /// Resize the backing buffer. Its contents are discarded.
    fn set_buffer_size(&mut self, width: u32, height: u32);

    /// The drawing context, or `None` if this surface cannot draw.
    fn canvas(&mut self) -> Option<&mut Self::Canvas>;
}

impl<S: Surface + ?Sized> Surface for &mut S {
    type Canvas = S::Canvas;

    fn client_size(&self) -> Vec2 {
        (**self).client_size()
    }

    fn set_buffer_size(&mut self, width: u32, height: u32) {
        (**self).set_buffer_size(width, height);
    }

    fn canvas(&mut self) -> Option<&mut Self::Canvas> {
        (**self).canvas()
    }
}

/// A single recorded drawing operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    Clear,
    Line {
        from: Vec2,
        to: Vec2,
        color: Rgb,
        alpha: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Rgb,
        alpha: f32,
    },
}

/// A canvas that keeps the commands of the current frame.
///
/// `clear` starts a new frame, so after a frame is drawn [`commands`](Self::commands) holds
/// exactly that frame.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
    frames: u64,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded since the last clear.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Iterate over the line segments of the current frame.
    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }

    /// Iterate over the circles of the current frame.
    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
    }

    /// Number of flushed frames.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            alpha,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            alpha,
        });
    }

    fn flush(&mut self) {
        self.frames += 1;
    }
}

/// An in-memory surface.
#[derive(Debug)]
pub struct HeadlessSurface {
    client_size: Vec2,
    buffer_size: (u32, u32),
    buffer_resizes: u32,
    canvas: Option<RecordingCanvas>,
}

impl HeadlessSurface {
    /// A surface of the given on-screen size with a recording canvas.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            client_size: Vec2::new(width, height),
            buffer_size: (0, 0),
            buffer_resizes: 0,
            canvas: Some(RecordingCanvas::new()),
        }
    }

    /// A surface that cannot provide a drawing context.
    pub fn without_context(width: f32, height: f32) -> Self {
        Self {
            canvas: None,
            ..Self::new(width, height)
        }
    }

    /// Change the on-screen size, as a window resize would. The backing buffer is left alone
    /// until [`Surface::set_buffer_size`] is called.
    pub fn set_client_size(&mut self, width: f32, height: f32) {
        self.client_size = Vec2::new(width, height);
    }

    /// Current backing buffer size.
    pub fn buffer_size(&self) -> (u32, u32) {
        self.buffer_size
    }

    /// How many times the backing buffer has been resized.
    pub fn buffer_resizes(&self) -> u32 {
        self.buffer_resizes
    }

    /// The recording canvas, if this surface has one.
    pub fn recording(&self) -> Option<&RecordingCanvas> {
        self.canvas.as_ref()
    }
}

impl Surface for HeadlessSurface {
    type Canvas = RecordingCanvas;

    fn client_size(&self) -> Vec2 {
        self.client_size
    }

    fn set_buffer_size(&mut self, width: u32, height: u32) {
        self.buffer_size = (width, height);
        self.buffer_resizes += 1;
        if let Some(canvas) = &mut self.canvas {
            canvas.commands.clear();
        }
    }

    fn canvas(&mut self) -> Option<&mut RecordingCanvas> {
        self.canvas.as_mut()
    }
}
