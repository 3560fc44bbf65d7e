//! wgpu-backed drawing surface for the native window host.
//!
//! [`GpuCanvas`] collects a frame's lines and circles into instance batches and draws them in
//! two passes at [`Canvas::flush`]: all lines, then all circles. The engine always emits every
//! link before any point, so batching preserves its draw order.
//!
//! The swapchain matches the window's physical size while the viewport uniform stays in
//! logical pixels, so the engine draws in logical coordinates and HiDPI output is rasterized
//! at full resolution.

mod pipelines;

use std::sync::Arc;

use glam::Vec2;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::window::Window;

use crate::config::Rgb;
use crate::error::GpuError;
use crate::surface::{Canvas, Surface};

pub use pipelines::{CircleInstance, LineInstance, SHADER};
use pipelines::{Pipelines, QUAD_VERTICES};

/// Stroke width of links, in pixels.
pub const LINE_WIDTH: f32 = 1.0;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.05,
    a: 1.0,
};

const INITIAL_INSTANCE_CAPACITY: usize = 256;

/// A window surface. Holds no canvas if the GPU could not be initialized.
pub struct GpuSurface {
    window: Arc<Window>,
    canvas: Option<GpuCanvas>,
}

impl GpuSurface {
    /// Initialize wgpu for `window`, blocking until the device is ready.
    ///
    /// Failure is not an error here: the surface is returned without a canvas and the engine
    /// attached to it stays inert.
    pub fn new(window: Arc<Window>) -> Self {
        let canvas = match pollster::block_on(GpuCanvas::new(window.clone())) {
            Ok(canvas) => Some(canvas),
            Err(err) => {
                log::warn!("GPU initialization failed: {err}");
                None
            }
        };
        Self { window, canvas }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl Surface for GpuSurface {
    type Canvas = GpuCanvas;

    fn client_size(&self) -> Vec2 {
        let size = self
            .window
            .inner_size()
            .to_logical::<f32>(self.window.scale_factor());
        Vec2::new(size.width, size.height)
    }

    fn set_buffer_size(&mut self, width: u32, height: u32) {
        if let Some(canvas) = &mut self.canvas {
            canvas.resize(self.window.inner_size(), width, height);
        }
    }

    fn canvas(&mut self) -> Option<&mut GpuCanvas> {
        self.canvas.as_mut()
    }
}

/// Batching canvas that renders through wgpu.
pub struct GpuCanvas {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipelines: Pipelines,
    lines: Vec<LineInstance>,
    circles: Vec<CircleInstance>,
    line_buffer: InstanceBuffer,
    circle_buffer: InstanceBuffer,
}

impl GpuCanvas {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();
        let logical: LogicalSize<u32> = size.to_logical(window.scale_factor());

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Particle Field Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        // blend in gamma space, like a 2D canvas
        let format = caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or(GpuError::NoAdapter)?;

        let (width, height) = swapchain_extent(size);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let pipelines = Pipelines::new(&device, format, logical.width, logical.height);
        let line_buffer = InstanceBuffer::new::<LineInstance>(&device, "Line Instance Buffer");
        let circle_buffer =
            InstanceBuffer::new::<CircleInstance>(&device, "Circle Instance Buffer");

        log::info!(
            "GPU ready: {} ({:?}), format {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            format
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipelines,
            lines: Vec::new(),
            circles: Vec::new(),
            line_buffer,
            circle_buffer,
        })
    }

    /// Reconfigure the swapchain to the window's `physical` size and map `width × height`
    /// logical pixels onto it. Pending batches are dropped.
    pub fn resize(&mut self, physical: PhysicalSize<u32>, width: u32, height: u32) {
        let (physical_width, physical_height) = swapchain_extent(physical);
        if (physical_width, physical_height) != (self.config.width, self.config.height) {
            self.config.width = physical_width;
            self.config.height = physical_height;
            self.surface.configure(&self.device, &self.config);
        }
        self.pipelines.write_viewport(&self.queue, width, height);
        self.lines.clear();
        self.circles.clear();
    }

    fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.line_buffer.upload(&self.device, &self.queue, &self.lines);
        self.circle_buffer.upload(&self.device, &self.queue, &self.circles);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Particle Field Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Field Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.pipelines.viewport_bind_group, &[]);

            if !self.lines.is_empty() {
                render_pass.set_pipeline(&self.pipelines.line);
                render_pass.set_vertex_buffer(
                    0,
                    self.line_buffer.slice::<LineInstance>(self.lines.len()),
                );
                render_pass.draw(0..QUAD_VERTICES, 0..self.lines.len() as u32);
            }

            if !self.circles.is_empty() {
                render_pass.set_pipeline(&self.pipelines.circle);
                render_pass.set_vertex_buffer(
                    0,
                    self.circle_buffer.slice::<CircleInstance>(self.circles.len()),
                );
                render_pass.draw(0..QUAD_VERTICES, 0..self.circles.len() as u32);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl Canvas for GpuCanvas {
    fn clear(&mut self) {
        self.lines.clear();
        self.circles.clear();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgb, alpha: f32) {
        self.lines.push(LineInstance {
            point_a: from.to_array(),
            point_b: to.to_array(),
            color: color.to_rgba(alpha),
            width: LINE_WIDTH,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        self.circles.push(CircleInstance {
            center: center.to_array(),
            radius,
            color: color.to_rgba(alpha),
        });
    }

    fn flush(&mut self) {
        match self.present() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
            }
            Err(err) => log::error!("Frame skipped: {err}"),
        }
    }
}

/// Swapchain extent for a window of `size` physical pixels. Surfaces cannot be zero-sized.
fn swapchain_extent(size: PhysicalSize<u32>) -> (u32, u32) {
    (size.width.max(1), size.height.max(1))
}

/// A vertex buffer of instances that grows to fit the largest batch seen.
struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
    label: &'static str,
}

impl InstanceBuffer {
    fn new<T: bytemuck::Pod>(device: &wgpu::Device, label: &'static str) -> Self {
        Self {
            buffer: create_instance_buffer::<T>(device, label, INITIAL_INSTANCE_CAPACITY),
            capacity: INITIAL_INSTANCE_CAPACITY,
            label,
        }
    }

    fn upload<T: bytemuck::Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[T]) {
        if data.is_empty() {
            return;
        }
        if data.len() > self.capacity {
            self.capacity = data.len().next_power_of_two();
            self.buffer = create_instance_buffer::<T>(device, self.label, self.capacity);
            log::debug!("{} grown to {} instances", self.label, self.capacity);
        }
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
    }

    fn slice<T>(&self, count: usize) -> wgpu::BufferSlice<'_> {
        let bytes = (count * std::mem::size_of::<T>()) as wgpu::BufferAddress;
        self.buffer.slice(..bytes)
    }
}

fn create_instance_buffer<T>(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (capacity * std::mem::size_of::<T>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swapchain_extent_is_physical() {
        // 1280x720 logical at 2x
        let physical: PhysicalSize<u32> = LogicalSize::new(1280.0, 720.0).to_physical(2.0);
        assert_eq!(swapchain_extent(physical), (2560, 1440));
    }

    #[test]
    fn test_swapchain_extent_never_zero() {
        assert_eq!(swapchain_extent(PhysicalSize::new(0, 0)), (1, 1));
        assert_eq!(swapchain_extent(PhysicalSize::new(0, 300)), (1, 300));
    }
}
