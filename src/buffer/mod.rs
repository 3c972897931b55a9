mod camera;
mod indirect_args;
mod point;
mod sort;

pub use camera::*;
pub use indirect_args::*;
pub use point::*;
pub use sort::*;

use crate::{Error, FixedSizeBufferWrapperError};

/// A wrapper around a [`wgpu::Buffer`] with a known role.
pub trait BufferWrapper {
    /// The default usages of the buffer.
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::STORAGE.bits()
            | wgpu::BufferUsages::COPY_SRC.bits()
            | wgpu::BufferUsages::COPY_DST.bits(),
    );

    /// Get the buffer.
    fn buffer(&self) -> &wgpu::Buffer;
}

impl BufferWrapper for wgpu::Buffer {
    fn buffer(&self) -> &wgpu::Buffer {
        self
    }
}

/// A [`BufferWrapper`] whose size is exactly one [`FixedSizeBufferWrapper::Pod`].
pub trait FixedSizeBufferWrapper: BufferWrapper {
    /// The POD type the buffer holds.
    type Pod;

    /// Verify that the buffer has the size of [`FixedSizeBufferWrapper::Pod`].
    fn verify_buffer_size(buffer: &wgpu::Buffer) -> Result<(), FixedSizeBufferWrapperError> {
        let expected_size = std::mem::size_of::<Self::Pod>() as wgpu::BufferAddress;
        if buffer.size() != expected_size {
            return Err(FixedSizeBufferWrapperError::BufferSizeMismatch {
                buffer_size: buffer.size(),
                expected_size,
            });
        }

        Ok(())
    }

    /// Download the buffer as one [`FixedSizeBufferWrapper::Pod`].
    fn download_pod(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> impl Future<Output = Result<Self::Pod, Error>>
    where
        Self: Sized,
        Self::Pod: bytemuck::Pod,
    {
        let download = self.download::<u8>(device, queue);
        async move { Ok(bytemuck::pod_read_unaligned(&download.await?)) }
    }
}

/// A [`BufferWrapper`] that can be read back to the host.
///
/// Readback is a diagnostic path, it waits on the device and must never be
/// part of the per-frame loop.
pub trait DownloadableBufferWrapper: BufferWrapper {
    /// Download the whole buffer as a [`Vec`] of `T`.
    ///
    /// The buffer must have [`wgpu::BufferUsages::COPY_SRC`].
    fn download<T: bytemuck::Pod>(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> impl Future<Output = Result<Vec<T>, Error>> {
        let size = self.buffer().size();
        let download = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Download Buffer"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Download Encoder"),
        });
        encoder.copy_buffer_to_buffer(self.buffer(), 0, &download, 0, size);
        queue.submit(Some(encoder.finish()));

        async move {
            let (tx, rx) = oneshot::channel();
            let buffer_slice = download.slice(..);
            buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
                if let Err(e) = tx.send(result) {
                    log::error!("Error occurred while sending buffer download data: {e:?}");
                }
            });
            device.poll(wgpu::PollType::Wait)?;
            rx.await??;

            let data = bytemuck::allocation::pod_collect_to_vec::<u8, T>(
                &buffer_slice.get_mapped_range(),
            );
            download.unmap();

            Ok(data)
        }
    }
}

impl<T: BufferWrapper> DownloadableBufferWrapper for T {}
