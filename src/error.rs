use thiserror::Error;

/// The error type for buffer readback.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    BufferDownloadOneShotReceive(#[from] oneshot::RecvError),
    #[error("{0}")]
    BufferDownloadAsync(#[from] wgpu::BufferAsyncError),
    #[error("{0}")]
    DevicePoll(#[from] wgpu::PollError),
}

/// The error type for wrapping a [`wgpu::Buffer`] of the wrong size.
#[derive(Debug, Error)]
pub enum FixedSizeBufferWrapperError {
    #[error("buffer size mismatch, expected {expected_size} bytes, got {buffer_size} bytes")]
    BufferSizeMismatch {
        buffer_size: wgpu::BufferAddress,
        expected_size: wgpu::BufferAddress,
    },
}

/// The error type for [`RadixSortConfig::validate`](crate::RadixSortConfig::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RadixSortConfigError {
    #[error("capacity must be greater than zero")]
    ZeroCapacity,
    #[error("radix bits must be in 1..={max}, got {radix_bits}")]
    RadixBitsOutOfRange { radix_bits: u32, max: u32 },
    #[error("key bits must be in 1..={max}, got {key_bits}")]
    KeyBitsOutOfRange { key_bits: u32, max: u32 },
    #[error("radix bits {radix_bits} do not evenly tile key bits {key_bits}")]
    RadixBitsNotDividingKeyBits { radix_bits: u32, key_bits: u32 },
    #[error("workgroup size must be in 1..={max}, got {workgroup_size}")]
    WorkgroupSizeOutOfRange { workgroup_size: u32, max: u32 },
    #[error("workgroup size {workgroup_size} exceeds device limit {device_limit}")]
    WorkgroupSizeExceedsDeviceLimit {
        workgroup_size: u32,
        device_limit: u32,
    },
    #[error("elements per thread must be greater than zero")]
    ZeroElementsPerThread,
    #[error("block size of {workgroup_size} x {elements_per_thread} overflows u32")]
    BlockSizeOverflow {
        workgroup_size: u32,
        elements_per_thread: u32,
    },
    #[error("block count {block_count} exceeds device dispatch limit {device_limit}")]
    BlockCountExceedsDeviceLimit { block_count: u32, device_limit: u32 },
    #[error("{name} buffer of {size} bytes exceeds device storage binding limit {device_limit}")]
    BufferSizeExceedsDeviceLimit {
        name: &'static str,
        size: wgpu::BufferAddress,
        device_limit: u32,
    },
}

/// The error type for [`ComputeBundleBuilder::build`](crate::ComputeBundleBuilder::build).
#[derive(Debug, Error)]
pub enum ComputeBundleCreateError {
    #[error("missing {0} for compute bundle")]
    MissingField(&'static str),
    #[error("failed to compile shader module {module}: {message}")]
    ShaderCompile { module: String, message: String },
}

/// The error type for [`RadixSorter::new`](crate::RadixSorter::new).
#[derive(Debug, Error)]
pub enum RadixSorterCreateError {
    #[error("{0}")]
    Config(#[from] RadixSortConfigError),
    #[error("{0}")]
    ComputeBundle(#[from] ComputeBundleCreateError),
}

/// The error type for [`Preprocessor::new`](crate::Preprocessor::new).
#[derive(Debug, Error)]
pub enum PreprocessorCreateError {
    #[error("{0}")]
    ComputeBundle(#[from] ComputeBundleCreateError),
    #[error("point count {point_count} exceeds sorter capacity {capacity}")]
    PointCountExceedsCapacity { point_count: u32, capacity: u32 },
    #[error("points size {points_size} exceeds device limit {device_limit}")]
    PointsSizeExceedsDeviceLimit {
        points_size: wgpu::BufferAddress,
        device_limit: u32,
    },
}

/// The error type for [`Renderer::new`](crate::Renderer::new).
#[derive(Debug, Error)]
pub enum RendererCreateError {
    #[error("failed to compile shader module {module}: {message}")]
    ShaderCompile { module: String, message: String },
}

/// The error type for [`Viewer::new`](crate::Viewer::new).
#[derive(Debug, Error)]
pub enum ViewerCreateError {
    #[error("{0}")]
    RadixSorter(#[from] RadixSorterCreateError),
    #[error("{0}")]
    Preprocessor(#[from] PreprocessorCreateError),
    #[error("{0}")]
    Renderer(#[from] RendererCreateError),
}
