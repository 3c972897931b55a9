use bytemuck::Zeroable;
use glam::*;

use wgpu::util::DeviceExt;

use crate::buffer::BufferWrapper;

/// The points storage buffer, the candidate elements of the key generator.
///
/// The buffer holds at least one point, since an empty storage binding is
/// invalid. [`PointsBuffer::len`] reports the number of points it was
/// created with.
#[derive(Debug, Clone)]
pub struct PointsBuffer {
    buffer: wgpu::Buffer,
    len: usize,
}

impl PointsBuffer {
    /// Create a new points buffer.
    pub fn new(device: &wgpu::Device, points: &[PointPod]) -> Self {
        let padding = [PointPod::zeroed()];
        let contents = match points {
            [] => &padding[..],
            _ => points,
        };

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Points Buffer"),
            contents: bytemuck::cast_slice(contents),
            usage: Self::DEFAULT_USAGES,
        });

        Self {
            buffer,
            len: points.len(),
        }
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Update the buffer.
    pub fn update(&self, queue: &wgpu::Queue, points: &[PointPod]) {
        if points.len() != self.len() {
            log::error!(
                "Points count mismatch, buffer has {}, but {} were provided",
                self.len(),
                points.len()
            );
            return;
        }

        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(points));
    }
}

impl BufferWrapper for PointsBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::STORAGE.bits() | wgpu::BufferUsages::COPY_DST.bits(),
    );

    fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl From<PointsBuffer> for wgpu::Buffer {
    fn from(wrapper: PointsBuffer) -> Self {
        wrapper.buffer
    }
}

/// The POD representation of a point splat.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointPod {
    pub pos: Vec3,
    /// The splat radius in pixels.
    pub size: f32,
    pub color: Vec4,
}

impl PointPod {
    /// Create a new point.
    pub fn new(pos: Vec3, size: f32, color: Vec4) -> Self {
        Self { pos, size, color }
    }
}
