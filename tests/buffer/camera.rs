use glam::*;
use wgpu::util::DeviceExt;
use wgpu_3dgs_sort::{
    BufferWrapper, CameraBuffer, CameraPod, DownloadableBufferWrapper,
    FixedSizeBufferWrapperError,
};

use crate::common::{TestContext, given};

fn downloadable_camera_buffer(ctx: &TestContext) -> CameraBuffer {
    CameraBuffer::try_from(ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Test Camera Buffer"),
        size: std::mem::size_of::<CameraPod>() as wgpu::BufferAddress,
        usage: CameraBuffer::DEFAULT_USAGES | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    }))
    .expect("try_from")
}

#[test]
fn test_camera_buffer_new_should_return_correct_buffer() {
    let ctx = TestContext::new();
    let buffer = CameraBuffer::new(&ctx.device);

    assert_eq!(
        buffer.buffer().size(),
        std::mem::size_of::<CameraPod>() as wgpu::BufferAddress
    );
}

#[test]
fn test_camera_buffer_update_should_update_buffer_correctly() {
    let ctx = TestContext::new();
    let buffer = downloadable_camera_buffer(&ctx);
    let view = Mat4::look_at_rh(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y);
    let size = UVec2::new(800, 600);

    buffer.update(&ctx.queue, view, given::proj(), size);

    let downloaded = pollster::block_on(buffer.download::<CameraPod>(&ctx.device, &ctx.queue))
        .expect("download")[0];

    assert_eq!(downloaded, CameraPod::new(view, given::proj(), size));
    assert_eq!(downloaded.size, Vec2::new(800.0, 600.0));
}

#[test]
fn test_camera_buffer_try_from_when_size_mismatch_should_return_error() {
    let ctx = TestContext::new();
    let wgpu_buffer = ctx
        .device
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Test Camera Buffer"),
            contents: bytemuck::bytes_of(&Mat4::IDENTITY),
            usage: CameraBuffer::DEFAULT_USAGES,
        });

    assert!(matches!(
        CameraBuffer::try_from(wgpu_buffer),
        Err(FixedSizeBufferWrapperError::BufferSizeMismatch {
            buffer_size: 64,
            expected_size: 144,
        })
    ));
}
