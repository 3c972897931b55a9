use crate::{IndirectArgsBuffer, SortInfoBuffer, buffer::BufferWrapper};

/// Sizes the indirect draw of [`Renderer`](crate::Renderer) from the clamped
/// live count.
///
/// The count never leaves the GPU, [`IndirectSizer::size`] records a buffer
/// copy from [`SortInfoBuffer`] into the instance count of the draw args.
#[derive(Debug)]
pub struct IndirectSizer {
    /// The draw indirect args buffer.
    draw_args: IndirectArgsBuffer,
}

impl IndirectSizer {
    /// Create a new indirect sizer drawing `vertices_per_element` vertices per
    /// live element.
    pub fn new(device: &wgpu::Device, vertices_per_element: u32) -> Self {
        log::debug!("Creating indirect sizer draw args buffer");
        let draw_args = IndirectArgsBuffer::new(device, vertices_per_element);

        log::info!("Indirect sizer created");

        Self { draw_args }
    }

    /// Get the draw indirect args buffer.
    pub fn draw_args(&self) -> &IndirectArgsBuffer {
        &self.draw_args
    }

    /// Zero the instance count for a new frame.
    pub fn reset(&self, encoder: &mut wgpu::CommandEncoder) {
        self.draw_args.reset(encoder);
    }

    /// Copy the clamped live count into the instance count.
    ///
    /// Must be recorded after [`RadixSorter::sort`](crate::RadixSorter::sort),
    /// which writes the clamped count.
    pub fn size(&self, encoder: &mut wgpu::CommandEncoder, info: &SortInfoBuffer) {
        encoder.copy_buffer_to_buffer(
            info.buffer(),
            SortInfoBuffer::SORT_COUNT_OFFSET,
            self.draw_args.buffer(),
            IndirectArgsBuffer::INSTANCE_COUNT_OFFSET,
            std::mem::size_of::<u32>() as wgpu::BufferAddress,
        );
    }
}
