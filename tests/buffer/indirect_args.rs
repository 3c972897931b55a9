use wgpu::util::DeviceExt;
use wgpu_3dgs_sort::{
    BufferWrapper, DownloadableBufferWrapper, IndirectArgsBuffer, IndirectSizer, SortInfoBuffer,
};

use crate::common::TestContext;

#[test]
fn test_indirect_args_buffer_new_should_return_correct_buffer() {
    let ctx = TestContext::new();
    let buffer = IndirectArgsBuffer::new(&ctx.device, 6);

    assert_eq!(
        buffer.buffer().size(),
        std::mem::size_of::<wgpu::util::DrawIndirectArgs>() as wgpu::BufferAddress
    );

    let downloaded = pollster::block_on(buffer.download::<u32>(&ctx.device, &ctx.queue))
        .expect("download");

    assert_eq!(downloaded, vec![6, 0, 0, 0]);
}

#[test]
fn test_indirect_args_buffer_try_from_and_into_wgpu_buffer_should_be_equal() {
    let ctx = TestContext::new();
    let draw_args = wgpu::util::DrawIndirectArgs {
        vertex_count: 6,
        instance_count: 100,
        first_vertex: 0,
        first_instance: 0,
    };
    let wgpu_buffer = ctx
        .device
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Test Indirect Args Buffer"),
            contents: draw_args.as_bytes(),
            usage: IndirectArgsBuffer::DEFAULT_USAGES,
        });

    let converted_buffer = IndirectArgsBuffer::try_from(wgpu_buffer.clone()).expect("try_from");
    let wgpu_converted_buffer = wgpu::Buffer::from(converted_buffer.clone());

    let converted_downloaded =
        pollster::block_on(converted_buffer.download::<u32>(&ctx.device, &ctx.queue))
            .expect("download");
    let wgpu_converted_downloaded =
        pollster::block_on(wgpu_converted_buffer.download::<u32>(&ctx.device, &ctx.queue))
            .expect("download");

    assert_eq!(converted_downloaded, vec![6, 100, 0, 0]);
    assert_eq!(converted_downloaded, wgpu_converted_downloaded);
}

#[test]
fn test_indirect_args_buffer_reset_should_only_zero_instance_count() {
    let ctx = TestContext::new();
    let buffer = IndirectArgsBuffer::new(&ctx.device, 6);
    ctx.queue.write_buffer(
        buffer.buffer(),
        IndirectArgsBuffer::INSTANCE_COUNT_OFFSET,
        bytemuck::bytes_of(&42u32),
    );

    let mut encoder = ctx.create_encoder();
    buffer.reset(&mut encoder);
    ctx.submit_and_wait(encoder);

    let downloaded = pollster::block_on(buffer.download::<u32>(&ctx.device, &ctx.queue))
        .expect("download");

    assert_eq!(downloaded, vec![6, 0, 0, 0]);
}

#[test]
fn test_indirect_sizer_size_should_copy_clamped_count_into_instance_count() {
    let ctx = TestContext::new();
    let sizer = IndirectSizer::new(&ctx.device, 6);
    let info = SortInfoBuffer::new(&ctx.device, 16);
    ctx.queue.write_buffer(
        info.buffer(),
        SortInfoBuffer::SORT_COUNT_OFFSET,
        bytemuck::bytes_of(&9u32),
    );

    let mut encoder = ctx.create_encoder();
    sizer.reset(&mut encoder);
    sizer.size(&mut encoder, &info);
    ctx.submit_and_wait(encoder);

    let downloaded = pollster::block_on(sizer.draw_args().download::<u32>(&ctx.device, &ctx.queue))
        .expect("download");

    assert_eq!(downloaded, vec![6, 9, 0, 0]);
}
