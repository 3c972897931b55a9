use glam::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use wgpu_3dgs_sort::{DownloadableBufferWrapper, PointPod};

use crate::common::TestContext;

pub const RENDER_TARGET_SIZE: u32 = 64;

pub fn random_keys(seed: u64, count: usize) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| rng.r#gen::<u32>()).collect()
}

pub fn identity_indices(count: usize) -> Vec<u32> {
    (0..count as u32).collect()
}

pub fn view() -> Mat4 {
    Mat4::IDENTITY
}

pub fn proj() -> Mat4 {
    Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0)
}

pub fn size() -> UVec2 {
    UVec2::splat(RENDER_TARGET_SIZE)
}

pub fn point_at(pos: Vec3) -> PointPod {
    PointPod::new(pos, 8.0, Vec4::new(1.0, 0.0, 0.0, 1.0))
}

pub fn render_target_texture(ctx: &TestContext) -> wgpu::Texture {
    ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Render Target Texture"),
        size: wgpu::Extent3d {
            width: RENDER_TARGET_SIZE,
            height: RENDER_TARGET_SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

/// Download the render target as RGBA8 pixels.
pub fn render_target_pixels(ctx: &TestContext, texture: &wgpu::Texture) -> Vec<U8Vec4> {
    // 64 RGBA8 texels per row is exactly the 256 byte row alignment.
    let bytes_per_row = RENDER_TARGET_SIZE * 4;
    let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Render Target Download Buffer"),
        size: (bytes_per_row * RENDER_TARGET_SIZE) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = ctx.create_encoder();
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(RENDER_TARGET_SIZE),
            },
        },
        texture.size(),
    );
    ctx.submit_and_wait(encoder);

    pollster::block_on(buffer.download::<u32>(&ctx.device, &ctx.queue))
        .expect("download")
        .into_iter()
        .map(|texel| U8Vec4::from_array(texel.to_le_bytes()))
        .collect()
}
