use wgpu::util::DeviceExt;

use crate::{
    FixedSizeBufferWrapperError,
    buffer::{BufferWrapper, FixedSizeBufferWrapper},
};

/// The draw indirect args buffer for [`Renderer`](crate::Renderer).
///
/// The instance count is the live count of the frame, the vertex count is a
/// static per-element topology constant.
#[derive(Debug, Clone)]
pub struct IndirectArgsBuffer(wgpu::Buffer);

impl IndirectArgsBuffer {
    /// The byte offset of [`wgpu::util::DrawIndirectArgs::instance_count`].
    pub const INSTANCE_COUNT_OFFSET: wgpu::BufferAddress =
        std::mem::offset_of!(wgpu::util::DrawIndirectArgs, instance_count) as wgpu::BufferAddress;

    /// Create a new indirect args buffer.
    pub fn new(device: &wgpu::Device, vertices_per_element: u32) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Indirect Args Buffer"),
            contents: wgpu::util::DrawIndirectArgs {
                vertex_count: vertices_per_element,
                instance_count: 0,
                first_vertex: 0,
                first_instance: 0,
            }
            .as_bytes(),
            usage: Self::DEFAULT_USAGES,
        });

        Self(buffer)
    }

    /// Zero the instance count, the vertex count is left untouched.
    pub fn reset(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.clear_buffer(
            &self.0,
            Self::INSTANCE_COUNT_OFFSET,
            Some(std::mem::size_of::<u32>() as wgpu::BufferAddress),
        );
    }
}

impl BufferWrapper for IndirectArgsBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::INDIRECT.bits()
            | wgpu::BufferUsages::COPY_SRC.bits()
            | wgpu::BufferUsages::COPY_DST.bits(),
    );

    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<IndirectArgsBuffer> for wgpu::Buffer {
    fn from(wrapper: IndirectArgsBuffer) -> Self {
        wrapper.0
    }
}

impl TryFrom<wgpu::Buffer> for IndirectArgsBuffer {
    type Error = FixedSizeBufferWrapperError;

    fn try_from(buffer: wgpu::Buffer) -> Result<Self, Self::Error> {
        Self::verify_buffer_size(&buffer).map(|()| Self(buffer))
    }
}

impl FixedSizeBufferWrapper for IndirectArgsBuffer {
    type Pod = wgpu::util::DrawIndirectArgs;
}
